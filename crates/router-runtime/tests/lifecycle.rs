//! Runtime start/boot/shutdown against a real tokio runtime.

use router_runtime::adapters::PeerDatabaseFacade;
use router_runtime::{RouterConfig, RouterRuntime};
use std::time::Duration;
use tempfile::TempDir;

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..300 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

fn config(dir: &TempDir) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.identity.config_dir = dir.path().to_path_buf();
    config.scheduler.idle_poll_ms = 20;
    config.network.outbound_poll_ms = 10;
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_boots_and_shuts_down() {
    let dir = TempDir::new().unwrap();
    let runtime = RouterRuntime::new(config(&dir));
    runtime.start();

    assert!(wait_until(|| runtime.boot_status().is_finished()).await);
    let container = runtime.container();
    assert!(container.is_accepting_clients());
    assert!(container.peer_database.is_running());
    assert!(dir.path().join("router.keys").exists());
    assert!(dir.path().join("router.info").exists());
    assert_eq!(runtime.boot_status().completed().len(), 4);

    runtime.shutdown().await;
    assert!(container.queue.is_stopped());
    assert!(!container.queue.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_keeps_identity() {
    let dir = TempDir::new().unwrap();

    let first = RouterRuntime::new(config(&dir));
    first.start();
    assert!(wait_until(|| first.boot_status().is_finished()).await);
    let hash = first
        .container()
        .identity
        .active_identity()
        .get()
        .map(|info| info.identity().hash());
    first.shutdown().await;

    let second = RouterRuntime::new(config(&dir));
    second.start();
    assert!(wait_until(|| second.boot_status().is_finished()).await);
    let reloaded = second
        .container()
        .identity
        .active_identity()
        .get()
        .map(|info| info.identity().hash());
    second.shutdown().await;

    assert!(hash.is_some());
    assert_eq!(hash, reloaded);
}
