//! Uniform result envelope for API calls.
//!
//! The pipeline never fails with an `Err`; every outcome, including network
//! loss and expired sessions, is an [`ApiResult`] value.

use thiserror::Error;

/// Status reported when no HTTP response was received.
pub const NETWORK_FAILURE_STATUS: u16 = 0;

/// Status reported when the session could not be refreshed.
pub const UNAUTHORIZED_STATUS: u16 = 401;

pub(crate) const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";
pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub(crate) const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFailure {
    /// Transport failed before a response arrived. Terminal.
    Network,
    /// 401 that the refresh cycle could not recover. Credentials are cleared
    /// and the caller should send the user to login.
    AuthExpired,
    /// Other 4xx. Usually field validation; the caller re-prompts.
    Validation,
    /// 5xx or any other non-2xx status. The caller may retry manually.
    Server,
}

impl ApiFailure {
    /// Classify a non-2xx status.
    pub fn from_status(status: u16) -> Self {
        match status {
            NETWORK_FAILURE_STATUS => Self::Network,
            UNAUTHORIZED_STATUS => Self::AuthExpired,
            400..=499 => Self::Validation,
            _ => Self::Server,
        }
    }
}

/// Error form of a failed [`ApiResult`], for callers that prefer `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// Failure category.
    pub kind: ApiFailure,
    /// HTTP status, or 0 for network failures.
    pub status: u16,
    /// Human-readable message.
    pub message: String,
}

/// Outcome of one API call.
///
/// ## Invariants
/// - Successful results (2xx) carry no error message; `data` is `None` only
///   when the body was empty or not decodable.
/// - Failed results carry a non-empty error message and no data.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult<T> {
    data: Option<T>,
    status: u16,
    error: Option<String>,
}

impl<T> ApiResult<T> {
    /// Successful result for a 2xx status.
    pub fn success(status: u16, data: Option<T>) -> Self {
        Self {
            data,
            status,
            error: None,
        }
    }

    /// Failed result with a message.
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let error = if message.trim().is_empty() {
            REQUEST_FAILED_MESSAGE.to_owned()
        } else {
            message
        };
        Self {
            data: None,
            status,
            error: Some(error),
        }
    }

    /// Result for a transport failure.
    pub fn network_error() -> Self {
        Self::failure(NETWORK_FAILURE_STATUS, NETWORK_ERROR_MESSAGE)
    }

    /// Result for a 401 that could not be refreshed.
    pub fn session_expired() -> Self {
        Self::failure(UNAUTHORIZED_STATUS, SESSION_EXPIRED_MESSAGE)
    }

    /// Decoded response body.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the result and return the decoded body.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// HTTP status, or 0 for network failures.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Error message for failed results.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Failure category, or `None` on success.
    pub fn failure_kind(&self) -> Option<ApiFailure> {
        self.error
            .as_ref()
            .map(|_| ApiFailure::from_status(self.status))
    }

    /// Transform the decoded body, keeping status and error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            data: self.data.map(f),
            status: self.status,
            error: self.error,
        }
    }

    /// Convert into a `Result`, surfacing failures as [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call failed.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.error {
            None => Ok(self.data),
            Some(message) => Err(ApiError {
                kind: ApiFailure::from_status(self.status),
                status: self.status,
                message,
            }),
        }
    }
}
