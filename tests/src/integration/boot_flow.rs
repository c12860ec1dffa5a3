//! # Boot and Identity Lifecycle Flows
//!
//! Router boot through the job queue, then the recurring identity check
//! reacting to on-disk changes.

#[cfg(test)]
mod tests {
    use super::super::fixtures::TestRouter;
    use gr_03_router_identity::{IdentityFiles, RouterIdentityApi, RouterKeys, KEY_FILE_LENGTH};
    use router_runtime::adapters::PeerDatabaseFacade;
    use tempfile::TempDir;

    const CHECK_INTERVAL_MS: u64 = 45_000;

    #[test]
    fn test_first_boot_creates_identity() {
        let dir = TempDir::new().unwrap();
        let router = TestRouter::new(dir.path());
        router.boot();

        assert!(router.boot.is_finished());
        assert!(router.container.is_accepting_clients());
        assert!(router.container.peer_database.is_running());

        let files = IdentityFiles::in_dir(dir.path());
        let keys = files.read_keys().unwrap();
        let info = files.read_info().unwrap();
        assert!(info.is_valid());
        assert_eq!(info.identity(), &keys.identity());
        assert_eq!(
            std::fs::metadata(&files.keys).unwrap().len() as usize,
            KEY_FILE_LENGTH
        );
        assert!(!info.addresses().is_empty());
        assert!(info.options().contains_key("router.version"));
    }

    #[test]
    fn test_corrupt_key_file_heals_during_boot() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("router.keys"), [0u8; 17]).unwrap();

        let router = TestRouter::new(dir.path());
        router.boot();

        assert!(router.boot.is_finished());
        let keys = IdentityFiles::in_dir(dir.path()).read_keys().unwrap();
        let active = router.container.identity.active().unwrap();
        assert_eq!(active.identity(), &keys.identity());
    }

    #[test]
    fn test_lifecycle_idle_when_nothing_changed() {
        let dir = TempDir::new().unwrap();
        let router = TestRouter::new(dir.path());
        router.boot();
        let published = router.container.identity.active().unwrap().published();

        assert_eq!(router.advance(CHECK_INTERVAL_MS), 1);
        assert_eq!(router.advance(CHECK_INTERVAL_MS), 1);

        let current = router.container.identity.active().unwrap();
        assert_eq!(current.published(), published);
        assert_eq!(router.container.queue.stats().pending, 1);
    }

    #[test]
    fn test_operator_marker_republishes_same_identity() {
        let dir = TempDir::new().unwrap();
        let router = TestRouter::new(dir.path());
        router.boot();
        let before = router.container.identity.active().unwrap();

        let marker = dir.path().join("router.info.rebuild");
        std::fs::write(&marker, b"").unwrap();
        router.advance(CHECK_INTERVAL_MS);

        assert!(!marker.exists());
        let after = router.container.identity.active().unwrap();
        assert_eq!(after.identity(), before.identity());
        assert!(after.published() > before.published());
    }

    #[test]
    fn test_deleted_key_file_regenerates_identity() {
        let dir = TempDir::new().unwrap();
        let router = TestRouter::new(dir.path());
        router.boot();
        let before = router.container.identity.active().unwrap();

        std::fs::remove_file(dir.path().join("router.keys")).unwrap();
        router.advance(CHECK_INTERVAL_MS);

        let after = router.container.identity.active().unwrap();
        assert_ne!(after.identity(), before.identity());
        let on_disk: RouterKeys = IdentityFiles::in_dir(dir.path()).read_keys().unwrap();
        assert_eq!(after.identity(), &on_disk.identity());
    }

    #[test]
    fn test_corrupt_key_file_after_boot_keeps_identity() {
        let dir = TempDir::new().unwrap();
        let router = TestRouter::new(dir.path());
        router.boot();
        let before = router.container.identity.active().unwrap();

        std::fs::write(dir.path().join("router.keys"), [0xEEu8; 9]).unwrap();
        std::fs::write(dir.path().join("router.info.rebuild"), b"").unwrap();
        router.advance(CHECK_INTERVAL_MS);

        let after = router.container.identity.active().unwrap();
        assert_eq!(after.identity(), before.identity());
        let on_disk: RouterKeys = IdentityFiles::in_dir(dir.path()).read_keys().unwrap();
        assert_eq!(after.identity(), &on_disk.identity());
    }

    #[test]
    fn test_reboot_reuses_identity() {
        let dir = TempDir::new().unwrap();
        let first = TestRouter::new(dir.path());
        first.boot();
        let identity = first.container.identity.active().unwrap().identity().clone();
        drop(first);

        let second = TestRouter::new(dir.path());
        second.boot();
        assert_eq!(
            second.container.identity.active().unwrap().identity(),
            &identity
        );
    }
}
