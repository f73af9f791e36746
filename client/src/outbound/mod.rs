//! Outbound adapters implementing domain ports.
//!
//! - **http**: reqwest-backed `HttpTransport`
//! - **storage**: file-backed `CredentialStore`
//!
//! Adapters translate between domain types and infrastructure types and
//! contain no business logic.

pub mod http;
pub mod storage;
