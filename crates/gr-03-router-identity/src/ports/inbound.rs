//! Inbound ports for the router identity.

use crate::domain::errors::IdentityError;
use crate::domain::lifecycle::{RebuildOutcome, RebuildTrigger};
use shared_types::RouterInfo;
use std::sync::Arc;

/// Identity management API used by the boot sequence and the lifecycle job.
pub trait RouterIdentityApi: Send + Sync {
    /// Install the on-disk identity, creating or repairing it if needed.
    fn load_or_create(&self) -> Result<Arc<RouterInfo>, IdentityError>;

    /// Run the rebuild procedure.
    fn rebuild(&self) -> Result<RebuildOutcome, IdentityError>;

    /// Whether a rebuild is due. Consumes the operator marker if present.
    fn check_triggers(&self) -> Result<Option<RebuildTrigger>, IdentityError>;

    /// The record currently published, if any.
    fn active(&self) -> Option<Arc<RouterInfo>>;
}
