//! Client domain: request pipeline, credentials, auth use-cases and the
//! identifier card.
//!
//! Purpose: Keep transport and storage behind ports so the refresh cycle and
//! error normalisation can be exercised without a network or a filesystem.
//!
//! Public surface:
//! - RequestPipeline (alias to `pipeline::RequestPipeline`): bearer token,
//!   single refresh-and-retry, uniform results.
//! - ApiResult / ApiFailure / ApiError: uniform call outcomes.
//! - describe_error: human-readable message from an error body.
//! - AuthApi: login, registration, logout and profile calls.
//! - IdentifierCard: rendered CPS pattern with copy, share and export.

pub mod api_result;
pub mod auth;
pub mod credentials;
pub mod error_message;
pub mod identifier_card;
pub mod pipeline;
pub mod ports;
pub mod request;

#[cfg(test)]
mod scripted_transport;

pub use self::api_result::{
    ApiError, ApiFailure, ApiResult, NETWORK_FAILURE_STATUS, UNAUTHORIZED_STATUS,
};
pub use self::auth::{
    AuthApi, AuthSession, LoginCredentials, LoginValidationError, ProfileUpdate, Registration,
    Role, User,
};
pub use self::credentials::{AccessToken, Credentials, RefreshToken};
pub use self::error_message::describe_error;
pub use self::identifier_card::{
    IdentifierCard, ShareOutcome, copy_identifier, share_identifier, share_payload,
};
pub use self::pipeline::{REFRESH_ENDPOINT, RequestPipeline};
pub use self::request::{HttpMethod, RequestDescriptor};
