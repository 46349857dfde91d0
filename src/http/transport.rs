//! The capability which performs HTTP round-trips.

use super::Method;
use crate::errors::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use url::Url;

/// A fully-formed HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A received HTTP response, body included.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Reason phrase of the status.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("unknown reason")
    }
}

/// Sends an HTTP request and returns the response, whatever its status.
///
/// Only failing to get a response at all is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// [Transport] using [reqwest] with middleware.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ClientWithMiddleware,
}

impl ReqwestTransport {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = reqwest::Request::new(request.method.into(), request.url);
        *req.headers_mut() = request.headers;
        *req.body_mut() = request.body.map(reqwest::Body::from);
        let res = self.client.execute(req).await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
