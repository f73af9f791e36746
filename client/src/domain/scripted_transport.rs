//! Scripted HTTP transport double shared by domain tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::pipeline::REFRESH_ENDPOINT;
use super::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};

/// Transport that replays scripted outcomes and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        outcomes: impl IntoIterator<Item = Result<TransportResponse, TransportError>>,
    ) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.ends_with(REFRESH_ENDPOINT))
            .count()
    }

    /// Decode the JSON body of the request at `index`.
    pub(crate) fn json_body(&self, index: usize) -> Value {
        let requests = self.requests();
        let body = requests
            .get(index)
            .and_then(|request| request.body.as_deref())
            .expect("request with body recorded");
        serde_json::from_slice(body).expect("json request body")
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .expect("scripted outcome available")
    }
}

pub(crate) fn ok(status: u16, body: Value) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(status, body.to_string()))
}

pub(crate) fn raw(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(status, body))
}
