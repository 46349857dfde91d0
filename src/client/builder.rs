use super::hapi::HapiClient;
use crate::auth::AuthenticationMethod;
use crate::errors::InvalidInput;
use crate::http::{ReqwestTransport, Transport};
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

/// Configures a [HapiClient].
pub struct HapiClientBuilder {
    api_url: Option<String>,
    entry_point_url: String,
    profile: Option<String>,
    authentication: Option<Arc<dyn AuthenticationMethod>>,
    builder: reqwest_middleware::ClientBuilder,
    transport: Option<Box<dyn Transport>>,
}

impl HapiClientBuilder {
    pub(crate) fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()?;
        let builder = reqwest_middleware::ClientBuilder::new(client);
        Ok(Self {
            api_url: None,
            entry_point_url: "/".to_string(),
            profile: None,
            authentication: None,
            builder,
            transport: None,
        })
    }

    /// Base URL relative URLs are resolved against, e.g. `https://api.example.com/v1`.
    pub fn api_url(self, api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            ..self
        }
    }

    /// URL of the entry point resource, `/` by default.
    pub fn entry_point_url(self, entry_point_url: impl Into<String>) -> Self {
        Self {
            entry_point_url: entry_point_url.into(),
            ..self
        }
    }

    /// URL of the HAL profile, sent with the `Accept` header.
    pub fn profile(self, profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
            ..self
        }
    }

    pub fn authentication(self, authentication: impl AuthenticationMethod + 'static) -> Self {
        let authentication: Arc<dyn AuthenticationMethod> = Arc::new(authentication);
        Self {
            authentication: Some(authentication),
            ..self
        }
    }

    /// Add middleware to the HTTP client.
    pub fn with<M: reqwest_middleware::Middleware>(self, middleware: M) -> Self {
        Self {
            builder: self.builder.with(middleware),
            ..self
        }
    }

    /// Send requests with the given transport instead of the HTTP client.
    ///
    /// Middleware is ignored then.
    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        let transport: Box<dyn Transport> = Box::new(transport);
        Self {
            transport: Some(transport),
            ..self
        }
    }

    pub fn build(self) -> Result<HapiClient, InvalidInput> {
        let api_url = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(parse_api_url)
            .transpose()?;
        let entry_point_url = self.entry_point_url.trim().to_string();
        if entry_point_url.is_empty() {
            return Err(InvalidInput::BlankUrl);
        }
        let profile = self
            .profile
            .map(|profile| profile.trim().to_string())
            .filter(|profile| !profile.is_empty());
        let accept = accept(profile.as_deref())?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new(self.builder.build())),
        };
        Ok(HapiClient {
            api_url,
            entry_point_url,
            profile,
            accept,
            authentication: self.authentication,
            transport,
            entry_point: OnceCell::new(),
        })
    }
}

/// The base URL always ends with a slash, so that joining keeps its last segment.
fn parse_api_url(api_url: &str) -> Result<Url, InvalidInput> {
    let normalized = format!("{}/", api_url.trim_end_matches('/'));
    Url::parse(&normalized).map_err(|source| InvalidInput::Url {
        url: api_url.to_string(),
        source,
    })
}

fn accept(profile: Option<&str>) -> Result<HeaderValue, InvalidInput> {
    match profile {
        Some(profile) => HeaderValue::from_str(&format!("application/hal+json; profile=\"{profile}\""))
            .map_err(|e| InvalidInput::Header(e.to_string())),
        None => Ok(HeaderValue::from_static("application/json")),
    }
}
