//! Identity lifecycle states and the active identity holder.

use parking_lot::RwLock;
use shared_types::RouterInfo;
use std::fmt;
use std::sync::Arc;

/// State of the periodic self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Waiting for the next check.
    #[default]
    Idle,
    /// A check pass is in progress.
    Checking,
}

/// Why a rebuild was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildTrigger {
    /// The operator marker file was present.
    OperatorMarker,
    /// The identity record file is missing.
    MissingRecord,
    /// The key file is missing.
    MissingKeyFile,
}

impl fmt::Display for RebuildTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorMarker => write!(f, "operator marker"),
            Self::MissingRecord => write!(f, "missing router info"),
            Self::MissingKeyFile => write!(f, "missing key file"),
        }
    }
}

/// Result of a successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Existing keys, record refreshed and re-signed.
    Refreshed,
    /// New keys and a brand-new record.
    Regenerated,
}

impl RebuildOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Refreshed => "refresh",
            Self::Regenerated => "regenerate",
        }
    }
}

/// The router's current identity record, readable from any component.
#[derive(Clone, Default)]
pub struct ActiveIdentity {
    inner: Arc<RwLock<Option<Arc<RouterInfo>>>>,
}

impl ActiveIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<RouterInfo>> {
        self.inner.read().clone()
    }

    pub(crate) fn install(&self, info: RouterInfo) -> Arc<RouterInfo> {
        let info = Arc::new(info);
        *self.inner.write() = Some(Arc::clone(&info));
        info
    }
}

impl fmt::Debug for ActiveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(info) => write!(f, "ActiveIdentity({})", info.identity().short_hash()),
            None => write!(f, "ActiveIdentity(none)"),
        }
    }
}
