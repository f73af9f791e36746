//! Driven port for issuing raw HTTP exchanges.
//!
//! The transport knows nothing about tokens or error bodies. It sends one
//! request and reports either the status and body bytes or a network-level
//! failure.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::HttpMethod;

/// Fully resolved HTTP request handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Header names and values.
    pub headers: BTreeMap<String, String>,
    /// Serialised body; `None` for bodiless requests.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Header value by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Status and body returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Build a response from a status and body bytes.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Network-level failures; no HTTP response was received.
    pub enum TransportError {
        /// Connection, TLS or body transfer failed.
        Connection { message: String } =>
            "http transport failed: {message}",
        /// The transport's own timeout elapsed.
        Timeout { message: String } =>
            "http transport timed out: {message}",
        /// The request could not be encoded, for example an invalid header.
        InvalidRequest { message: String } =>
            "http request is invalid: {message}",
    }
}

/// Port for sending HTTP requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and wait for the complete response.
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}
