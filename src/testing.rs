//! Test doubles.

use crate::errors::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A [Transport] replaying scripted responses, in order, and recording requests.
///
/// Once the script is exhausted, every request gets a 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Duration,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every response takes `latency` to arrive.
    pub fn slow(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            ..Self::default()
        })
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.respond_text(status, body.to_string())
    }

    pub fn respond_text(&self, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap();
        let response = HttpResponse::new(status, body.into());
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, message: &'static str) {
        let error = TransportError::Middleware(anyhow::anyhow!(message));
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        next.unwrap_or_else(|| Ok(HttpResponse::new(StatusCode::NOT_FOUND, "")))
    }
}
