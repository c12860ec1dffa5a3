//! Inbound ports for garlic dispatch.

use crate::application::service::DispatchRequest;
use crate::domain::errors::DispatchError;
use gr_01_job_queue::JobId;

/// Public dispatch API.
pub trait GarlicDispatchApi: Send + Sync {
    /// Queue the build phase for `request`.
    ///
    /// Returns the id of the build job. Failure after this point is
    /// reported only through the request's failure callbacks.
    fn dispatch(&self, request: DispatchRequest) -> Result<JobId, DispatchError>;
}
