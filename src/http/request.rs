//! Descriptions of HTTP calls which are not sent yet.

use super::body::MessageBody;
use super::method::Method;
use super::template::UrlVariable;
use crate::errors::{InvalidInput, RelError};
use crate::hal::{Rel, Resource};
use log::warn;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Values of the variables of a templated URL.
pub type UrlVariables = BTreeMap<String, UrlVariable>;

/// What [Request] and [Follow] have in common.
#[derive(Debug, Clone, Default)]
struct Parts {
    method: Method,
    url_variables: UrlVariables,
    body: Option<Arc<dyn MessageBody>>,
    headers: HeaderMap,
}

/// A request to a known URL.
///
/// The URL may be relative to the API URL of the client, and may be a
/// URI template expanded with the URL variables.
#[derive(Debug, Clone)]
pub struct Request {
    url: String,
    parts: Parts,
}

impl Request {
    /// Create a GET request. The URL is trimmed and must not be blank.
    pub fn new(url: impl AsRef<str>) -> Result<Self, InvalidInput> {
        let url = url.as_ref().trim();
        if url.is_empty() {
            return Err(InvalidInput::BlankUrl);
        }
        Ok(Self {
            url: url.to_string(),
            parts: Parts::default(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A request to the URL of a link, found in a resource by its relation type.
#[derive(Debug, Clone)]
pub struct Follow {
    rel: Rel,
    parts: Parts,
}

impl Follow {
    /// Create a GET request following the given relation.
    pub fn new(rel: impl Into<Rel>) -> Self {
        Self {
            rel: rel.into(),
            parts: Parts::default(),
        }
    }

    pub fn rel(&self) -> &Rel {
        &self.rel
    }

    /// Get the URL of the unique link referenced by the relation in the resource.
    pub fn url<'a>(&self, resource: &'a Resource) -> Result<&'a str, RelError> {
        resource.link(&self.rel).map(|link| link.href())
    }

    /// Turn this into a [Request] to the link found in the resource.
    pub(crate) fn to_request(&self, resource: &Resource) -> Result<Request, RelError> {
        let link = resource.link(&self.rel)?;
        if let Some(deprecation) = link.deprecation() {
            warn!(
                "The link \"{}\" to {} is deprecated, see {}",
                self.rel,
                link.href(),
                deprecation
            );
        }
        Ok(Request {
            url: link.href().to_string(),
            parts: self.parts.clone(),
        })
    }
}

impl AsRef<[Follow]> for Follow {
    fn as_ref(&self) -> &[Follow] {
        std::slice::from_ref(self)
    }
}

macro_rules! impl_parts {
    ($t:ty) => {
        impl $t {
            /// Set the HTTP method, GET by default.
            pub fn with_method(mut self, method: Method) -> Self {
                self.parts.method = method;
                self
            }

            /// Set the value of a variable of the templated URL.
            pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<UrlVariable>) -> Self {
                self.parts.url_variables.insert(name.into(), value.into());
                self
            }

            /// Set the values of the variables of the templated URL, replacing previous ones.
            pub fn with_variables(mut self, variables: UrlVariables) -> Self {
                self.parts.url_variables = variables;
                self
            }

            pub fn with_body(mut self, body: impl MessageBody + 'static) -> Self {
                let body: Arc<dyn MessageBody> = Arc::new(body);
                self.parts.body = Some(body);
                self
            }

            /// Set a header, replacing the value the client would send for it.
            pub fn with_header(
                self,
                name: impl AsRef<str>,
                value: impl AsRef<str>,
            ) -> Result<Self, InvalidInput> {
                let name = HeaderName::from_bytes(name.as_ref().as_bytes())
                    .map_err(|e| InvalidInput::Header(e.to_string()))?;
                let value = HeaderValue::from_str(value.as_ref())
                    .map_err(|e| InvalidInput::Header(e.to_string()))?;
                Ok(self.with_header_value(name, value))
            }

            pub fn with_header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
                self.parts.headers.insert(name, value);
                self
            }

            pub fn method(&self) -> Method {
                self.parts.method
            }

            pub fn url_variables(&self) -> &UrlVariables {
                &self.parts.url_variables
            }

            pub fn body(&self) -> Option<&dyn MessageBody> {
                self.parts.body.as_deref()
            }

            pub fn headers(&self) -> &HeaderMap {
                &self.parts.headers
            }
        }
    };
}

impl_parts!(Request);
impl_parts!(Follow);
