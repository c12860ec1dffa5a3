//! On-disk identity files.
//!
//! Every write goes to `<name>.tmp`, is synced, read back and validated,
//! then renamed over the target, so a reader never sees a partial file.

use crate::domain::errors::{IdentityError, KeyFileError};
use crate::domain::keys::RouterKeys;
use crate::ports::outbound::KeyFileSource;
use shared_types::RouterInfo;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locations of the key file, identity record and operator marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFiles {
    pub keys: PathBuf,
    pub info: PathBuf,
    pub rebuild_marker: PathBuf,
}

impl IdentityFiles {
    pub fn new(dir: impl AsRef<Path>, keys: &str, info: &str, marker: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            keys: dir.join(keys),
            info: dir.join(info),
            rebuild_marker: dir.join(marker),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, "router.keys", "router.info", "router.info.rebuild")
    }

    pub fn read_keys(&self) -> Result<RouterKeys, KeyFileError> {
        let bytes = fs::read(&self.keys)?;
        RouterKeys::from_key_file(&bytes)
    }

    pub fn write_keys(&self, keys: &RouterKeys) -> Result<(), IdentityError> {
        write_atomic(&self.keys, &keys.to_key_file(), |bytes| {
            RouterKeys::from_key_file(bytes).map(|_| ()).map_err(IdentityError::from)
        })
    }

    pub fn read_info(&self) -> Result<RouterInfo, IdentityError> {
        let bytes = fs::read(&self.info)?;
        Ok(RouterInfo::from_bytes(&bytes)?)
    }

    /// Persist a signed record. Unsigned records are rejected.
    pub fn write_info(&self, info: &RouterInfo) -> Result<(), IdentityError> {
        let bytes = info.to_bytes()?;
        write_atomic(&self.info, &bytes, |bytes| {
            RouterInfo::from_bytes(bytes)?.verify_signature()?;
            Ok(())
        })
    }

    /// Delete `path`, treating an already missing file as success.
    pub fn remove(path: &Path) -> Result<bool, IdentityError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyFileSource for IdentityFiles {
    fn exists(&self) -> bool {
        self.keys.exists()
    }

    fn read(&self) -> Result<RouterKeys, KeyFileError> {
        self.read_keys()
    }

    fn write(&self, keys: &RouterKeys) -> Result<(), IdentityError> {
        self.write_keys(keys)
    }

    fn remove(&self) -> Result<bool, IdentityError> {
        IdentityFiles::remove(&self.keys)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic<F>(path: &Path, bytes: &[u8], validate: F) -> Result<(), IdentityError>
where
    F: FnOnce(&[u8]) -> Result<(), IdentityError>,
{
    let persist_err = |source| IdentityError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }

    let temp = temp_path(path);
    let mut file = fs::File::create(&temp).map_err(persist_err)?;
    file.write_all(bytes).map_err(persist_err)?;
    file.sync_all().map_err(persist_err)?;
    drop(file);

    let written = fs::read(&temp).map_err(persist_err)?;
    if let Err(e) = validate(&written) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    fs::rename(&temp, path).map_err(persist_err)?;
    debug!(path = %path.display(), len = bytes.len(), "[gr-03] File replaced");
    Ok(())
}
