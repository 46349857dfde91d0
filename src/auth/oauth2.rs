use super::{AuthenticationMethod, ExpirableToken};
use crate::errors::{HapiError, InvalidInput};
use crate::http::{Method, Request, UrlEncodedBody};
use crate::HapiClient;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Scalar,
    expires_in: Scalar,
}

/// Token endpoints disagree on whether to quote numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }

    /// Read as a number of seconds, possibly fractional.
    fn seconds(&self) -> Option<Duration> {
        let seconds = match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }?;
        seconds
            .is_finite()
            .then(|| Duration::milliseconds((seconds * 1000.0).round() as i64))
    }
}

/// [OAuth2](https://tools.ietf.org/html/rfc6749) authentication, using
/// [Basic authentication](https://tools.ietf.org/html/rfc2617#section-2)
/// to get the access token.
///
/// The token is cached and shared by all the requests of the client.
/// A new one is requested once it has expired.
pub struct Oauth2BasicAuthentication {
    token_endpoint_url: String,
    userid: String,
    password: String,
    scope: String,
    grant_type: String,
    token: Mutex<Option<ExpirableToken>>,
    clock: Clock,
}

impl Oauth2BasicAuthentication {
    /// Use the `api` scope and the `client_credentials` grant type.
    pub fn new(
        token_endpoint_url: impl Into<String>,
        userid: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint_url: token_endpoint_url.into(),
            userid: userid.into(),
            password: password.into(),
            scope: "api".to_string(),
            grant_type: "client_credentials".to_string(),
            token: Mutex::new(None),
            clock: Arc::new(OffsetDateTime::now_utc),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = grant_type.into();
        self
    }

    /// Start with a token obtained beforehand.
    pub fn with_token(self, token: ExpirableToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
            ..self
        }
    }

    /// Read the current time from the given clock rather than from the system.
    pub fn with_clock(mut self, clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn token_endpoint_url(&self) -> &str {
        &self.token_endpoint_url
    }

    pub fn userid(&self) -> &str {
        &self.userid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }

    /// The last token obtained.
    pub async fn token(&self) -> Option<ExpirableToken> {
        self.token.lock().await.clone()
    }

    /// Requests bearing credentials already, such as the token request itself, are left alone.
    fn is_request_authorized(request: &Request) -> bool {
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .map_or(false, |value| value.starts_with("Basic") || value.starts_with("Bearer"))
    }

    async fn request_access_token(&self, client: &HapiClient) -> Result<ExpirableToken, HapiError> {
        let body = UrlEncodedBody::new(&[
            ("grant_type", self.grant_type.as_str()),
            ("scope", self.scope.as_str()),
        ])?;
        let basic = STANDARD.encode(format!("{}:{}", self.userid, self.password));
        let request = Request::new(&self.token_endpoint_url)?
            .with_method(Method::Post)
            .with_body(body)
            .with_header_value(ACCEPT, HeaderValue::from_static("application/json"))
            .with_header_value(AUTHORIZATION, sensitive_header(&format!("Basic {basic}"))?);

        debug!("Requesting an access token from {}", self.token_endpoint_url);
        let resource = client.send_request(&request).await?;
        let response: TokenResponse = serde_json::from_value(Value::Object(resource.state().clone()))
            .map_err(|_| HapiError::MalformedToken)?;
        let expiration = response
            .expires_in
            .seconds()
            .and_then(|validity| (self.clock)().checked_add(validity))
            .ok_or(HapiError::MalformedToken)?;
        Ok(ExpirableToken::new(response.access_token.into_string(), expiration))
    }
}

#[async_trait]
impl AuthenticationMethod for Oauth2BasicAuthentication {
    async fn authorize_request(&self, client: &HapiClient, request: Request) -> Result<Request, HapiError> {
        if Self::is_request_authorized(&request) {
            return Ok(request);
        }

        // held across renewal: concurrent callers wait for one token request
        let mut token = self.token.lock().await;
        let now = (self.clock)();
        let cached = token
            .as_ref()
            .filter(|token| token.is_valid_until(now))
            .map(|token| token.value().to_string());
        let value = match cached {
            Some(value) => value,
            None => {
                let renewed = self.request_access_token(client).await?;
                debug!("Got an access token valid until {}", renewed.expiration());
                let value = renewed.value().to_string();
                *token = Some(renewed);
                value
            }
        };
        drop(token);

        let bearer = sensitive_header(&format!("Bearer {value}"))?;
        Ok(request.with_header_value(AUTHORIZATION, bearer))
    }
}

fn sensitive_header(value: &str) -> Result<HeaderValue, InvalidInput> {
    let mut value = HeaderValue::from_str(value).map_err(|e| InvalidInput::Header(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for Oauth2BasicAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oauth2BasicAuthentication")
            .field("token_endpoint_url", &self.token_endpoint_url)
            .field("userid", &self.userid)
            .field("password", &"***")
            .field("scope", &self.scope)
            .field("grant_type", &self.grant_type)
            .finish_non_exhaustive()
    }
}
