use super::builder::HapiClientBuilder;
use crate::auth::AuthenticationMethod;
use crate::errors::{check, HapiError, InvalidInput, TransportError};
use crate::hal::{RegisteredRel, Resource};
use crate::http::template;
use crate::http::{Follow, HttpRequest, HttpResponse, Request, Transport};
use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

/// Client for a HAL API.
///
/// The entry point resource is fetched once, on first use, and kept for the
/// lifetime of the client.
pub struct HapiClient {
    pub(super) api_url: Option<Url>,
    pub(super) entry_point_url: String,
    pub(super) profile: Option<String>,
    pub(super) accept: HeaderValue,
    pub(super) authentication: Option<Arc<dyn AuthenticationMethod>>,
    pub(super) transport: Box<dyn Transport>,
    pub(super) entry_point: OnceCell<Resource>,
}

impl HapiClient {
    /// Create a client builder.
    pub fn builder() -> Result<HapiClientBuilder, reqwest::Error> {
        HapiClientBuilder::new()
    }

    pub fn api_url(&self) -> Option<&Url> {
        self.api_url.as_ref()
    }

    pub fn entry_point_url(&self) -> &str {
        &self.entry_point_url
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn authentication_method(&self) -> Option<&dyn AuthenticationMethod> {
        self.authentication.as_deref()
    }

    /// Send a request and get the resource it returns.
    ///
    /// When the response is a 401 and an authentication method is configured,
    /// the request is authorized again and sent a second time.
    pub async fn send_request(&self, request: &Request) -> Result<Resource, HapiError> {
        let mut http_request = self.create_http_request(request).await?;
        let mut response = self.execute(http_request.clone()).await?;

        if response.status == StatusCode::UNAUTHORIZED && self.authentication.is_some() {
            debug!("{} {} is unauthorized, retrying once", http_request.method, http_request.url);
            http_request = self.create_http_request(request).await?;
            response = self.execute(http_request.clone()).await?;
        }

        let response = check(http_request, response)?;
        Ok(Resource::from_slice(&response.body)?)
    }

    /// Follow the links of the given relation types, one after the other.
    ///
    /// The first link is looked up in `resource`, or in the entry point resource
    /// if none is given. Each link after that is looked up in the resource the
    /// previous one led to. Returns the last resource.
    pub async fn send_follow(
        &self,
        follow: impl AsRef<[Follow]>,
        resource: Option<&Resource>,
    ) -> Result<Resource, HapiError> {
        let mut current = match resource {
            Some(resource) => Cow::Borrowed(resource),
            None => Cow::Borrowed(self.get_entry_point_resource().await?),
        };
        for hop in follow.as_ref() {
            let request = hop.to_request(&current)?;
            current = Cow::Owned(self.send_request(&request).await?);
        }
        Ok(current.into_owned())
    }

    /// Get the entry point resource, fetching it the first time.
    ///
    /// Concurrent first calls share a single request. A failed fetch is not kept.
    pub async fn get_entry_point_resource(&self) -> Result<&Resource, HapiError> {
        self.entry_point
            .get_or_try_init(|| self.fetch_entry_point())
            .await
    }

    async fn fetch_entry_point(&self) -> Result<Resource, HapiError> {
        let request = Request::new(&self.entry_point_url)?;
        self.send_request(&request).await
    }

    /// Get the latest version of a resource from its `self` link.
    ///
    /// The resource is returned as is when it has no `self` link or when it
    /// can't be fetched.
    pub async fn refresh(&self, resource: &Resource) -> Resource {
        match self.fetch_self(resource).await {
            Ok(fresh) => fresh,
            Err(e) => {
                debug!("Could not refresh the resource: {e}");
                resource.clone()
            }
        }
    }

    async fn fetch_self(&self, resource: &Resource) -> Result<Resource, HapiError> {
        let link = resource.link(RegisteredRel::Self_)?;
        self.send_request(&Request::new(link.href())?).await
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}", request.method, request.url);
        self.transport.execute(request).await
    }

    async fn create_http_request(&self, request: &Request) -> Result<HttpRequest, HapiError> {
        let request = match &self.authentication {
            Some(authentication) => Cow::Owned(authentication.authorize_request(self, request.clone()).await?),
            None => Cow::Borrowed(request),
        };
        let url = self.resolve_url(&request)?;

        let mut headers = HeaderMap::new();
        let body = request.body().map(|body| {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.content_length()));
            Bytes::copy_from_slice(body.content())
        });
        headers.insert(ACCEPT, self.accept.clone());
        headers.extend(request.headers().clone());

        Ok(HttpRequest {
            method: request.method(),
            url,
            headers,
            body,
        })
    }

    fn resolve_url(&self, request: &Request) -> Result<Url, InvalidInput> {
        let url = request.url().trim().trim_start_matches('/');
        let url = if template::is_template(url) {
            template::expand(url, request.url_variables())?
        } else {
            url.to_string()
        };
        let resolved = match &self.api_url {
            Some(api_url) => api_url.join(&url),
            None => Url::parse(&url),
        };
        resolved.map_err(|source| InvalidInput::Url { url, source })
    }
}

impl fmt::Debug for HapiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HapiClient")
            .field("api_url", &self.api_url)
            .field("entry_point_url", &self.entry_point_url)
            .field("profile", &self.profile)
            .field("authentication", &self.authentication)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{HttpErrorKind, RelError};
    use crate::hal::Rel;
    use crate::http::{JsonBody, Method};
    use crate::testing::MockTransport;
    use async_trait::async_trait;
    use rstest::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const API_URL: &str = "https://api.example.com/v1";

    fn client(transport: &Arc<MockTransport>) -> HapiClient {
        HapiClient::builder()
            .unwrap()
            .api_url(API_URL)
            .transport(Arc::clone(transport))
            .build()
            .unwrap()
    }

    /// Authorizes each request with a new bearer token.
    #[derive(Debug, Default)]
    struct CountingAuthentication {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthenticationMethod for CountingAuthentication {
        async fn authorize_request(&self, _client: &HapiClient, request: Request) -> Result<Request, HapiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(request.with_header("Authorization", format!("Bearer token-{n}"))?)
        }
    }

    fn authed_client(transport: &Arc<MockTransport>, auth: &Arc<CountingAuthentication>) -> HapiClient {
        HapiClient::builder()
            .unwrap()
            .api_url(API_URL)
            .transport(Arc::clone(transport))
            .authentication(Arc::clone(auth))
            .build()
            .unwrap()
    }

    fn rel(name: &str) -> Rel {
        Rel::custom(name).unwrap()
    }

    #[fixture]
    fn entry_point() -> Value {
        json!({
            "_links": {
                "self": {"href": "/"},
                "creditors": {"href": "/creditors{?reference}", "templated": true}
            }
        })
    }

    #[fixture]
    fn creditor() -> Value {
        json!({
            "reference": "abc",
            "_links": {
                "self": {"href": "/creditors/abc"},
                "mandates": {"href": "/creditors/abc/mandates"}
            }
        })
    }

    fn urls(transport: &MockTransport) -> Vec<String> {
        transport
            .requests()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn test_entry_point_is_fetched_once(entry_point: Value) {
        let transport = MockTransport::new();
        transport.respond(200, entry_point);
        let client = client(&transport);

        let first = client.get_entry_point_resource().await.unwrap().clone();
        let second = client.get_entry_point_resource().await.unwrap();
        assert_eq!(&first, second);
        assert_eq!(urls(&transport), vec!["https://api.example.com/v1/"]);
        assert_eq!(transport.requests()[0].method, Method::Get);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_entry_point(entry_point: Value) {
        let expected = Resource::from_json(&entry_point).unwrap();
        let transport = MockTransport::slow(std::time::Duration::from_millis(50));
        transport.respond(200, entry_point);
        let client = Arc::new(client(&transport));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.get_entry_point_resource().await.map(Clone::clone) })
            })
            .collect();
        for task in tasks {
            let resource = task.await.unwrap().unwrap();
            assert_eq!(resource, expected);
        }
        assert_eq!(urls(&transport), vec!["https://api.example.com/v1/"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failed_entry_point_is_not_kept(entry_point: Value) {
        let transport = MockTransport::new();
        transport.respond(503, json!({}));
        transport.respond(200, entry_point);
        let client = client(&transport);

        let error = client.get_entry_point_resource().await.unwrap_err();
        assert_eq!(error.http_kind(), Some(HttpErrorKind::ServerError));
        assert!(client.get_entry_point_resource().await.is_ok());
        assert_eq!(transport.requests().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_follow_chain(entry_point: Value, creditor: Value) {
        let transport = MockTransport::new();
        transport.respond(200, entry_point);
        transport.respond(200, creditor);
        transport.respond(200, json!({"_embedded": {"mandates": [{"id": 1}, {"id": 2}]}}));
        let client = client(&transport);

        let chain = [
            Follow::new(rel("creditors")).with_variable("reference", "abc"),
            Follow::new(rel("mandates")),
        ];
        let mandates = client.send_follow(&chain, None).await.unwrap();
        assert_eq!(mandates.embedded_resources("mandates").unwrap().len(), 2);
        assert_eq!(
            urls(&transport),
            vec![
                "https://api.example.com/v1/",
                "https://api.example.com/v1/creditors?reference=abc",
                "https://api.example.com/v1/creditors/abc/mandates",
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_follow_chain_stops_at_failing_hop(entry_point: Value) {
        let transport = MockTransport::new();
        transport.respond(200, entry_point);
        transport.respond(404, json!({"message": "no such creditor"}));
        let client = client(&transport);

        let chain = vec![
            Follow::new(rel("creditors")).with_variable("reference", "xyz"),
            Follow::new(rel("mandates")),
            Follow::new(RegisteredRel::First),
        ];
        let error = client.send_follow(chain, None).await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(transport.requests().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_follow_chain_stops_at_missing_rel(creditor: Value) {
        let transport = MockTransport::new();
        let client = client(&transport);
        let start = Resource::from_json(&creditor).unwrap();

        let error = client
            .send_follow(Follow::new(RegisteredRel::Next), Some(&start))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            HapiError::Rel(RelError::NotFound { missing, .. }) if missing == "next"
        ));
        assert!(transport.requests().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_empty_chain_returns_start(creditor: Value) {
        let transport = MockTransport::new();
        let client = client(&transport);
        let start = Resource::from_json(&creditor).unwrap();

        let end = client.send_follow(Vec::<Follow>::new(), Some(&start)).await.unwrap();
        assert_eq!(end, start);
        assert!(transport.requests().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_follow_sends_method_body_and_headers(creditor: Value) {
        let transport = MockTransport::new();
        transport.respond(200, json!({"reference": "abc", "name": "ACME"}));
        let client = client(&transport);
        let start = Resource::from_json(&creditor).unwrap();

        let follow = Follow::new(RegisteredRel::Self_)
            .with_method(Method::Patch)
            .with_body(JsonBody::new(&json!({"name": "ACME"})).unwrap())
            .with_header("Accept", "application/vnd.acme+json")
            .unwrap();
        let updated = client.send_follow(follow, Some(&start)).await.unwrap();
        assert_eq!(updated.state()["name"], "ACME");

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.url.as_str(), "https://api.example.com/v1/creditors/abc");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[CONTENT_LENGTH], "15");
        assert_eq!(request.headers[ACCEPT], "application/vnd.acme+json");
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"ACME"}"#[..]));
    }

    #[tokio::test]
    async fn test_accept_with_profile() {
        let transport = MockTransport::new();
        transport.respond(200, json!({}));
        let client = HapiClient::builder()
            .unwrap()
            .api_url(API_URL)
            .profile("https://api.example.com/profiles/v1")
            .transport(Arc::clone(&transport))
            .build()
            .unwrap();

        client.get_entry_point_resource().await.unwrap();
        let request = &transport.requests()[0];
        assert_eq!(
            request.headers[ACCEPT],
            "application/hal+json; profile=\"https://api.example.com/profiles/v1\""
        );
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_retried_once() {
        let transport = MockTransport::new();
        transport.respond(401, json!({}));
        transport.respond(200, json!({"id": 1}));
        let auth = Arc::new(CountingAuthentication::default());
        let client = authed_client(&transport, &auth);

        let resource = client.send_request(&Request::new("/creditors/1").unwrap()).await.unwrap();
        assert_eq!(resource.state()["id"], 1);
        assert_eq!(auth.calls.load(Ordering::SeqCst), 2);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].headers["authorization"], "Bearer token-1");
        assert_eq!(requests[1].headers["authorization"], "Bearer token-2");
    }

    #[tokio::test]
    async fn test_unauthorized_twice() {
        let transport = MockTransport::new();
        transport.respond(401, json!({}));
        transport.respond(401, json!({}));
        transport.respond(200, json!({}));
        let auth = Arc::new(CountingAuthentication::default());
        let client = authed_client(&transport, &auth);

        let error = client.send_request(&Request::new("/").unwrap()).await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(error.http_kind(), Some(HttpErrorKind::ClientError));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_without_authentication() {
        let transport = MockTransport::new();
        transport.respond(401, json!({}));
        transport.respond(200, json!({}));
        let client = client(&transport);

        let error = client.send_request(&Request::new("/").unwrap()).await.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(transport.requests().len(), 1);
    }

    #[rstest]
    #[case(302, HttpErrorKind::Redirection)]
    #[case(409, HttpErrorKind::ClientError)]
    #[case(500, HttpErrorKind::ServerError)]
    #[tokio::test]
    async fn test_error_status(#[case] status: u16, #[case] kind: HttpErrorKind) {
        let transport = MockTransport::new();
        transport.respond(status, json!({"message": "nope"}));
        let client = client(&transport);

        let error = client.send_request(&Request::new("/").unwrap()).await.unwrap_err();
        let http = error.http().unwrap();
        assert_eq!(http.kind(), kind);
        assert_eq!(http.status().as_u16(), status);
        assert_eq!(http.request().url.as_str(), "https://api.example.com/v1/");
        assert_eq!(http.response_resource().unwrap().state()["message"], "nope");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = MockTransport::new();
        transport.fail("connection refused");
        let client = client(&transport);

        let error = client.send_request(&Request::new("/").unwrap()).await.unwrap_err();
        assert!(matches!(error, HapiError::Transport(_)));
        assert!(error.status().is_none());
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let transport = MockTransport::new();
        transport.respond_text(200, "<html></html>");
        let client = client(&transport);

        let error = client.send_request(&Request::new("/").unwrap()).await.unwrap_err();
        assert!(matches!(error, HapiError::InvalidInput(InvalidInput::Json(_))));
    }

    #[tokio::test]
    async fn test_empty_response_is_empty_resource() {
        let transport = MockTransport::new();
        transport.respond_text(204, "");
        let client = client(&transport);

        let resource = client
            .send_request(&Request::new("/creditors/abc").unwrap().with_method(Method::Delete))
            .await
            .unwrap();
        assert_eq!(resource, Resource::default());
    }

    #[rstest]
    #[case("https://other.example.com/creditors", "https://other.example.com/creditors")]
    #[case("creditors/abc", "https://api.example.com/v1/creditors/abc")]
    #[case("  /creditors/abc ", "https://api.example.com/v1/creditors/abc")]
    #[tokio::test]
    async fn test_resolve_url(#[case] url: &str, #[case] expected: &str) {
        let transport = MockTransport::new();
        transport.respond(200, json!({}));
        let client = client(&transport);

        client.send_request(&Request::new(url).unwrap()).await.unwrap();
        assert_eq!(urls(&transport), vec![expected]);
    }

    #[tokio::test]
    async fn test_relative_url_without_api_url() {
        let transport = MockTransport::new();
        let client = HapiClient::builder()
            .unwrap()
            .transport(Arc::clone(&transport))
            .build()
            .unwrap();

        let error = client.send_request(&Request::new("/creditors").unwrap()).await.unwrap_err();
        assert!(matches!(error, HapiError::InvalidInput(InvalidInput::Url { .. })));
        assert!(transport.requests().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_refresh(creditor: Value) {
        let transport = MockTransport::new();
        transport.respond(200, json!({"reference": "abc", "status": "active"}));
        let client = client(&transport);
        let stale = Resource::from_json(&creditor).unwrap();

        let fresh = client.refresh(&stale).await;
        assert_eq!(fresh.state()["status"], "active");
        assert_eq!(urls(&transport), vec!["https://api.example.com/v1/creditors/abc"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_refresh_failure_returns_original(creditor: Value) {
        let transport = MockTransport::new();
        transport.respond(500, json!({}));
        let client = client(&transport);
        let stale = Resource::from_json(&creditor).unwrap();

        assert_eq!(client.refresh(&stale).await, stale);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_self_link() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let resource = Resource::from_json(&json!({"id": 1, "_links": {"next": {"href": "/2"}}})).unwrap();

        assert_eq!(client.refresh(&resource).await, resource);
        assert!(transport.requests().is_empty());
    }
}
