//! # Identity Service
//!
//! Implements the rebuild procedure and the boot-time load.
//!
//! ## Rebuild
//!
//! 1. With keys already loaded, reuse them. A key file that is unreadable
//!    or holds another identity is rewritten from memory.
//! 2. Otherwise read the key file (private enc, private sign, public enc,
//!    public sign). A read fault deletes the file and starts over, at most
//!    `max_key_read_attempts` times, after which a new identity is generated.
//! 3. Refresh addresses, options and the publication time.
//! 4. Sign with the key manager's signing key. A signing fault aborts the
//!    pass; the record on disk stays authoritative.
//! 5. Write the record atomically, then make it the active identity.
//!
//! Without a key file, new keys are generated and written first.

use crate::adapters::storage::IdentityFiles;
use crate::domain::errors::IdentityError;
use crate::domain::keys::RouterKeys;
use crate::domain::lifecycle::{ActiveIdentity, RebuildOutcome, RebuildTrigger};
use crate::ports::inbound::RouterIdentityApi;
use crate::ports::outbound::{AddressSource, IdentityStore, KeyFileSource, StatisticsSource};
use gr_01_job_queue::Clock;
use parking_lot::Mutex;
use router_telemetry::{IDENTITY_REBUILDS, KEY_FILE_HEALS};
use shared_types::{RecordError, RouterIdentity, RouterInfo};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub files: IdentityFiles,
    /// Key-file reads attempted before falling back to a new identity.
    pub max_key_read_attempts: u32,
}

impl IdentitySettings {
    pub fn new(files: IdentityFiles) -> Self {
        Self {
            files,
            max_key_read_attempts: 3,
        }
    }
}

pub struct IdentityService {
    settings: IdentitySettings,
    keys: Arc<dyn IdentityStore>,
    key_file: Arc<dyn KeyFileSource>,
    addresses: Arc<dyn AddressSource>,
    statistics: Arc<dyn StatisticsSource>,
    clock: Arc<dyn Clock>,
    active: ActiveIdentity,
    // Serializes rebuilds triggered from outside the job queue
    rebuild_lock: Mutex<()>,
}

impl IdentityService {
    pub fn new(
        settings: IdentitySettings,
        keys: Arc<dyn IdentityStore>,
        addresses: Arc<dyn AddressSource>,
        statistics: Arc<dyn StatisticsSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let key_file = Arc::new(settings.files.clone());
        Self {
            settings,
            keys,
            key_file,
            addresses,
            statistics,
            clock,
            active: ActiveIdentity::new(),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Read and write the key file through `source` instead of the plain file.
    pub fn with_key_file(mut self, source: Arc<dyn KeyFileSource>) -> Self {
        self.key_file = source;
        self
    }

    pub fn files(&self) -> &IdentityFiles {
        &self.settings.files
    }

    /// Shared handle other components read the current record from.
    pub fn active_identity(&self) -> ActiveIdentity {
        self.active.clone()
    }

    fn rebuild_locked(&self) -> Result<RebuildOutcome, IdentityError> {
        if !self.key_file.exists() {
            return self.regenerate();
        }
        if let Some(loaded) = self.keys.keys() {
            self.sync_key_file(&loaded)?;
            return self.refresh(loaded.identity());
        }

        let path = &self.settings.files.keys;
        let max_attempts = self.settings.max_key_read_attempts.max(1);
        for attempt in 1..=max_attempts {
            if !self.key_file.exists() {
                return self.regenerate();
            }
            match self.key_file.read() {
                Ok(keys) => {
                    let identity = keys.identity();
                    self.keys.install(keys);
                    return self.refresh(identity);
                }
                Err(e) => {
                    error!(
                        path = %path.display(),
                        attempt,
                        error = %e,
                        "[gr-03] Key file unreadable, deleting it"
                    );
                    KEY_FILE_HEALS.inc();
                    self.key_file.remove()?;
                }
            }
        }

        warn!(
            attempts = max_attempts,
            "[gr-03] Key file kept failing to read, generating a new identity"
        );
        self.regenerate()
    }

    /// Make the key file agree with the keys already in memory.
    fn sync_key_file(&self, loaded: &RouterKeys) -> Result<(), IdentityError> {
        let path = &self.settings.files.keys;
        match self.key_file.read() {
            Ok(stored) if stored.identity() == loaded.identity() => return Ok(()),
            Ok(stored) => warn!(
                path = %path.display(),
                stored = %stored.identity().short_hash(),
                loaded = %loaded.identity().short_hash(),
                "[gr-03] Key file holds another identity, rewriting it from memory"
            ),
            Err(e) => {
                error!(path = %path.display(), error = %e, "[gr-03] Key file unreadable, rewriting it from memory");
                KEY_FILE_HEALS.inc();
            }
        }
        self.key_file.write(loaded)
    }

    /// Refresh the record of an identity whose keys are loaded.
    fn refresh(&self, identity: RouterIdentity) -> Result<RebuildOutcome, IdentityError> {
        let mut record = match self.active.get() {
            Some(current) if current.identity() == &identity => (*current).clone(),
            _ => RouterInfo::new(identity),
        };
        self.publish(&mut record)?;
        info!(
            router = %record.identity().short_hash(),
            addresses = record.addresses().len(),
            "[gr-03] Router info refreshed"
        );
        Ok(RebuildOutcome::Refreshed)
    }

    /// Brand-new keys and record.
    fn regenerate(&self) -> Result<RebuildOutcome, IdentityError> {
        let keys = RouterKeys::generate();
        self.key_file.write(&keys)?;
        self.keys.install(keys.clone());

        let mut record = RouterInfo::new(keys.identity());
        self.publish(&mut record)?;
        warn!(
            router = %record.identity().short_hash(),
            "[gr-03] New router identity created"
        );
        Ok(RebuildOutcome::Regenerated)
    }

    /// Refresh, sign, persist, then activate.
    fn publish(&self, record: &mut RouterInfo) -> Result<(), IdentityError> {
        record.set_addresses(self.addresses.addresses());
        record.set_options(self.statistics.published_options());
        record.set_published(self.clock.now());

        let signing = self
            .keys
            .keys()
            .ok_or(IdentityError::Signing(RecordError::Unsigned))?;
        if let Err(e) = record.sign(&signing.signing) {
            error!(error = %e, "[gr-03] Failed to sign router info, keeping the previous one");
            return Err(IdentityError::Signing(e));
        }

        if let Err(e) = self.settings.files.write_info(record) {
            error!(path = %self.settings.files.info.display(), error = %e, "[gr-03] Failed to write router info");
            return Err(e);
        }
        self.active.install(record.clone());
        Ok(())
    }
}

impl RouterIdentityApi for IdentityService {
    fn load_or_create(&self) -> Result<Arc<RouterInfo>, IdentityError> {
        let _guard = self.rebuild_lock.lock();
        let files = &self.settings.files;

        if self.key_file.exists() && files.info.exists() {
            match (self.key_file.read(), files.read_info()) {
                (Ok(keys), Ok(record))
                    if record.identity() == &keys.identity() && record.is_valid() =>
                {
                    self.keys.install(keys);
                    let record = self.active.install(record);
                    info!(
                        router = %record.identity().short_hash(),
                        published = record.published(),
                        "[gr-03] Router identity loaded"
                    );
                    return Ok(record);
                }
                (Err(e), _) => {
                    warn!(error = %e, "[gr-03] Stored keys unusable, rebuilding");
                }
                (_, Err(e)) => {
                    warn!(error = %e, "[gr-03] Stored router info unusable, rebuilding");
                }
                _ => {
                    warn!("[gr-03] Stored router info does not match key file, rebuilding");
                }
            }
        }

        let outcome = self.rebuild_locked()?;
        IDENTITY_REBUILDS.with_label_values(&[outcome.as_label()]).inc();
        self.active.get().ok_or(IdentityError::Record(RecordError::Unsigned))
    }

    fn rebuild(&self) -> Result<RebuildOutcome, IdentityError> {
        let _guard = self.rebuild_lock.lock();
        let outcome = self.rebuild_locked()?;
        IDENTITY_REBUILDS.with_label_values(&[outcome.as_label()]).inc();
        Ok(outcome)
    }

    fn check_triggers(&self) -> Result<Option<RebuildTrigger>, IdentityError> {
        let files = &self.settings.files;
        if IdentityFiles::remove(&files.rebuild_marker)? {
            info!(path = %files.rebuild_marker.display(), "[gr-03] Rebuild marker consumed");
            return Ok(Some(RebuildTrigger::OperatorMarker));
        }
        if !files.info.exists() {
            return Ok(Some(RebuildTrigger::MissingRecord));
        }
        if !self.key_file.exists() {
            return Ok(Some(RebuildTrigger::MissingKeyFile));
        }
        debug!("[gr-03] Identity files present");
        Ok(None)
    }

    fn active(&self) -> Option<Arc<RouterInfo>> {
        self.active.get()
    }
}
