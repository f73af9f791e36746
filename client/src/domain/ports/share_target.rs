//! Driven port for the platform share sheet.
//!
//! Sharing is best effort: callers treat every error as "nothing happened".

use async_trait::async_trait;

use super::define_port_error;

/// Content offered to the share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    /// Title shown by the share sheet.
    pub title: String,
    /// Text body being shared.
    pub text: String,
}

define_port_error! {
    /// Reasons a share did not complete.
    pub enum ShareError {
        /// The platform has no share action.
        Unsupported =>
            "sharing is not supported on this platform",
        /// The user dismissed the share sheet.
        Cancelled =>
            "share cancelled by user",
        /// The share action failed.
        Failed { message: String } =>
            "share failed: {message}",
    }
}

/// Port for invoking a platform share action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Offer `payload` to the platform share action.
    async fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// Share target for environments without a share sheet, such as a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedShareTarget;

#[async_trait]
impl ShareTarget for UnsupportedShareTarget {
    async fn share(&self, _payload: &SharePayload) -> Result<(), ShareError> {
        Err(ShareError::unsupported())
    }
}
