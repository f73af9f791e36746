//! Reqwest-backed HTTP transport adapter.
//!
//! This adapter owns wire details only: method and header conversion,
//! timeout configuration and error mapping. Status handling and token
//! refresh live in the domain pipeline.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};

use crate::domain::HttpMethod;
use crate::domain::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};

const DEFAULT_USER_AGENT: &str = concat!("chakula-client/", env!("CARGO_PKG_VERSION"));

/// Transport adapter that sends requests with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport, optionally with an overall request timeout.
    ///
    /// Without a timeout the reqwest defaults apply.
    ///
    /// ```rust
    /// use std::time::Duration;
    ///
    /// use chakula_client::outbound::http::ReqwestTransport;
    ///
    /// let bounded = ReqwestTransport::new(Some(Duration::from_secs(30)))?;
    /// let unbounded = ReqwestTransport::new(None)?;
    /// # drop((bounded, unbounded));
    /// # Ok::<(), reqwest::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
        let client = match timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        }
        .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let headers = header_map(&request.headers)?;
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.as_str())
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            TransportError::invalid_request(format!("header name {name:?}: {err}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            TransportError::invalid_request(format!("header {name} value: {err}"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::invalid_request(error.to_string())
    } else {
        TransportError::connection(error.to_string())
    }
}
