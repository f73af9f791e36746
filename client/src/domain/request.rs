//! Request descriptors consumed by the pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// HTTP methods the backend API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical API call.
///
/// Authenticated by default; use [`RequestDescriptor::without_auth`] for
/// login, registration and other public endpoints.
///
/// # Examples
/// ```
/// use chakula_client::domain::{HttpMethod, RequestDescriptor};
/// use serde_json::json;
///
/// let descriptor = RequestDescriptor::new(HttpMethod::Post, "/api/users/login/")
///     .with_body(json!({ "phone_number": "0712345678", "password": "secret" }))
///     .without_auth();
/// assert!(!descriptor.requires_auth());
/// assert_eq!(descriptor.endpoint(), "/api/users/login/");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    endpoint: String,
    body: Option<Value>,
    headers: BTreeMap<String, String>,
    requires_auth: bool,
}

impl RequestDescriptor {
    /// Describe an authenticated, bodiless call.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: BTreeMap::new(),
            requires_auth: true,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a caller-supplied header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Send the call without a bearer token and skip the refresh cycle.
    #[must_use]
    pub fn without_auth(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path appended to the API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Caller-supplied headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Whether the bearer token is attached and a 401 triggers a refresh.
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}
