//! Authenticated request pipeline.
//!
//! Attaches the stored bearer token, performs at most one silent refresh when
//! the server answers 401, and normalises every outcome into an
//! [`ApiResult`]. Concurrent calls are not coordinated: two requests that
//! both see a 401 each run their own refresh.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use super::api_result::{ApiResult, UNAUTHORIZED_STATUS};
use super::credentials::bearer;
use super::error_message::describe_error;
use super::ports::{
    CredentialStore, HttpTransport, TransportError, TransportRequest, TransportResponse,
};
use super::{AccessToken, HttpMethod, RefreshToken, RequestDescriptor};

/// Endpoint exchanging a refresh token for a new access token.
pub const REFRESH_ENDPOINT: &str = "/api/users/token/refresh/";

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const AUTHORIZATION_HEADER: &str = "Authorization";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Request pipeline over a credential store and an HTTP transport.
pub struct RequestPipeline<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    base_url: String,
}

impl<S, T> Clone for RequestPipeline<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
        }
    }
}

impl<S, T> RequestPipeline<S, T>
where
    S: CredentialStore,
    T: HttpTransport,
{
    /// Build a pipeline rooted at `base_url`.
    pub fn new(base_url: &Url, store: Arc<S>, transport: Arc<T>) -> Self {
        Self {
            store,
            transport,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// Credential store shared with the pipeline.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one logical API call.
    ///
    /// Never fails: network loss, expired sessions, validation and server
    /// errors are all reported through the returned [`ApiResult`].
    pub async fn request<D>(&self, descriptor: &RequestDescriptor) -> ApiResult<D>
    where
        D: DeserializeOwned,
    {
        let access = if descriptor.requires_auth() {
            self.read_access_token()
        } else {
            None
        };
        let request = self.build_request(descriptor, access.as_ref());
        debug!(
            method = %descriptor.method(),
            endpoint = descriptor.endpoint(),
            authenticated = access.is_some(),
            "sending api request"
        );

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(err) => return network_failure(descriptor, &err),
        };

        if response.status == UNAUTHORIZED_STATUS && descriptor.requires_auth() {
            return self.refresh_and_retry(descriptor, request).await;
        }
        interpret(descriptor, response)
    }

    /// `GET` an authenticated endpoint.
    pub async fn get<D: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<D> {
        self.request(&RequestDescriptor::new(HttpMethod::Get, endpoint))
            .await
    }

    /// `POST` a JSON body to an authenticated endpoint.
    pub async fn post<D: DeserializeOwned>(&self, endpoint: &str, body: Value) -> ApiResult<D> {
        self.request(&RequestDescriptor::new(HttpMethod::Post, endpoint).with_body(body))
            .await
    }

    /// `PUT` a JSON body to an authenticated endpoint.
    pub async fn put<D: DeserializeOwned>(&self, endpoint: &str, body: Value) -> ApiResult<D> {
        self.request(&RequestDescriptor::new(HttpMethod::Put, endpoint).with_body(body))
            .await
    }

    /// `PATCH` a JSON body to an authenticated endpoint.
    pub async fn patch<D: DeserializeOwned>(&self, endpoint: &str, body: Value) -> ApiResult<D> {
        self.request(&RequestDescriptor::new(HttpMethod::Patch, endpoint).with_body(body))
            .await
    }

    /// `DELETE` an authenticated endpoint.
    pub async fn delete<D: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<D> {
        self.request(&RequestDescriptor::new(HttpMethod::Delete, endpoint))
            .await
    }

    fn build_request(
        &self,
        descriptor: &RequestDescriptor,
        access: Option<&AccessToken>,
    ) -> TransportRequest {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE_HEADER.to_owned(), JSON_CONTENT_TYPE.to_owned());
        headers.extend(
            descriptor
                .headers()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        if let Some(token) = access {
            headers.insert(AUTHORIZATION_HEADER.to_owned(), bearer(token));
        }
        TransportRequest {
            method: descriptor.method(),
            url: self.url_for(descriptor.endpoint()),
            headers,
            body: descriptor.body().map(|body| body.to_string().into_bytes()),
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn refresh_and_retry<D>(
        &self,
        descriptor: &RequestDescriptor,
        mut request: TransportRequest,
    ) -> ApiResult<D>
    where
        D: DeserializeOwned,
    {
        let Some(refresh) = self.read_refresh_token() else {
            debug!(
                endpoint = descriptor.endpoint(),
                "no refresh token stored; ending session"
            );
            return self.expire_session();
        };
        let Some(access) = self.refresh_access_token(&refresh).await else {
            return self.expire_session();
        };
        if let Err(err) = self.store.set_tokens(&access, &refresh) {
            warn!(kind = err.kind(), error = %err, "failed to persist refreshed access token");
        }
        info!(endpoint = descriptor.endpoint(), "access token refreshed; retrying request");

        request
            .headers
            .insert(AUTHORIZATION_HEADER.to_owned(), bearer(&access));
        match self.transport.send(&request).await {
            Ok(response) => interpret(descriptor, response),
            Err(err) => network_failure(descriptor, &err),
        }
    }

    async fn refresh_access_token(&self, refresh: &RefreshToken) -> Option<AccessToken> {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE_HEADER.to_owned(), JSON_CONTENT_TYPE.to_owned());
        let request = TransportRequest {
            method: HttpMethod::Post,
            url: self.url_for(REFRESH_ENDPOINT),
            headers,
            body: Some(json!({ "refresh": refresh.expose() }).to_string().into_bytes()),
        };

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "token refresh failed in transport");
                return None;
            }
        };
        if !response.is_success() {
            warn!(status = response.status, "token refresh rejected");
            return None;
        }
        match serde_json::from_slice::<RefreshResponse>(&response.body) {
            Ok(decoded) if !decoded.access.is_empty() => Some(AccessToken::new(decoded.access)),
            Ok(_) => {
                warn!("token refresh returned an empty access token");
                None
            }
            Err(err) => {
                warn!(error = %err, "token refresh returned an undecodable body");
                None
            }
        }
    }

    fn expire_session<D>(&self) -> ApiResult<D> {
        if let Err(err) = self.store.clear_tokens() {
            warn!(kind = err.kind(), error = %err, "failed to clear credentials");
        }
        ApiResult::session_expired()
    }

    fn read_access_token(&self) -> Option<AccessToken> {
        self.store.access_token().unwrap_or_else(|err| {
            warn!(kind = err.kind(), error = %err, "failed to read access token");
            None
        })
    }

    fn read_refresh_token(&self) -> Option<RefreshToken> {
        self.store.refresh_token().unwrap_or_else(|err| {
            warn!(kind = err.kind(), error = %err, "failed to read refresh token");
            None
        })
    }
}

fn network_failure<D>(descriptor: &RequestDescriptor, err: &TransportError) -> ApiResult<D> {
    warn!(
        method = %descriptor.method(),
        endpoint = descriptor.endpoint(),
        kind = err.kind(),
        error = %err,
        "api request failed in transport"
    );
    ApiResult::network_error()
}

fn interpret<D>(descriptor: &RequestDescriptor, response: TransportResponse) -> ApiResult<D>
where
    D: DeserializeOwned,
{
    let status = response.status;
    if response.is_success() {
        debug!(endpoint = descriptor.endpoint(), status, "api request succeeded");
        return ApiResult::success(status, decode_body(descriptor, &response.body));
    }
    let body = serde_json::from_slice::<Value>(&response.body)
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
    let message = describe_error(&body);
    debug!(endpoint = descriptor.endpoint(), status, %message, "api request failed");
    ApiResult::failure(status, message)
}

fn decode_body<D>(descriptor: &RequestDescriptor, body: &[u8]) -> Option<D>
where
    D: DeserializeOwned,
{
    let value = serde_json::from_slice::<Value>(body).ok()?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(
                endpoint = descriptor.endpoint(),
                error = %err,
                "response body did not match the expected shape"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
