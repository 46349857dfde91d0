//! Errors for this crate.
//! About anyhow: see https://github.com/TrueLayer/reqwest-middleware/issues/119

use crate::hal::Resource;
use crate::http::{HttpRequest, HttpResponse};
use reqwest::StatusCode;
use std::borrow::Cow;
use std::fmt;

/// Errors raised while building links, resources, relations or requests.
#[derive(thiserror::Error, Debug)]
pub enum InvalidInput {
    #[error("The href property is mandatory.")]
    BlankHref,

    #[error("URL is empty.")]
    BlankUrl,

    #[error("The relation name can't be empty.")]
    BlankRel,

    #[error("Method must be one of GET, POST, PUT, PATCH or DELETE (\"{0}\" provided).")]
    UnsupportedMethod(String),

    /// The JSON given to build a [Resource] is not an object.
    #[error("JSON must be a string, an array or an object ({0} provided).")]
    JsonType(&'static str),

    /// A reserved section (`_links` or `_embedded`) is not an object.
    #[error("\"{section}\" must be an object ({found} provided).")]
    Section {
        section: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UrlEncoded(#[from] serde_urlencoded::ser::Error),

    #[error("Invalid header: {0}")]
    Header(String),

    #[error("Invalid URL \"{url}\": {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid URI template \"{template}\": {reason}")]
    Template { template: String, reason: String },
}

aliri_braid::from_infallible!(InvalidInput);

/// The section of a [Resource] a relation is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Links,
    Embedded,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Links => f.write_str("link"),
            Section::Embedded => f.write_str("embedded resource"),
        }
    }
}

/// Errors when looking up a link or an embedded resource by its relation type.
///
/// `NotUnique` and `Unique` are named after what the caller expected:
/// asking for one entry where there are many is `NotUnique`,
/// asking for many where there is one is `Unique`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelError {
    #[error("Rel not found: {missing}. Relation types available: {}.", .available.join(", "))]
    NotFound {
        section: Section,
        missing: String,
        available: Vec<String>,
    },

    #[error("The {section} referenced by \"{rel}\" is not unique.")]
    NotUnique { section: Section, rel: String },

    #[error("The {section} referenced by \"{rel}\" is unique.")]
    Unique { section: Section, rel: String },
}

/// Class of an unsuccessful HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Anything else which is not a success.
    Unclassified,
}

impl From<StatusCode> for HttpErrorKind {
    fn from(status: StatusCode) -> Self {
        if status.is_redirection() {
            HttpErrorKind::Redirection
        } else if status.is_client_error() {
            HttpErrorKind::ClientError
        } else if status.is_server_error() {
            HttpErrorKind::ServerError
        } else {
            HttpErrorKind::Unclassified
        }
    }
}

/// Raised when the server responds with an HTTP error code.
#[derive(Debug)]
pub struct HttpError {
    kind: HttpErrorKind,
    request: HttpRequest,
    response: HttpResponse,
}

impl HttpError {
    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    /// The HTTP request causing the error.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn reason(&self) -> &'static str {
        self.response.reason()
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.response.body)
    }

    /// The response body may be a representation of a resource describing the error.
    pub fn response_resource(&self) -> Result<Resource, InvalidInput> {
        Resource::from_slice(&self.response.body)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.reason())
    }
}

impl std::error::Error for HttpError {}

/// Network-level failures, as opposed to unsuccessful HTTP statuses.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Raw(#[from] reqwest::Error),

    /// Error from reqwest middleware function, or from a custom transport.
    #[error(transparent)]
    Middleware(anyhow::Error),
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(e) => TransportError::Middleware(e),
            reqwest_middleware::Error::Reqwest(e) => TransportError::Raw(e),
        }
    }
}

/// Errors representing failed interactions with a HAL API.
#[derive(thiserror::Error, Debug)]
pub enum HapiError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error(transparent)]
    Rel(#[from] RelError),

    #[error(transparent)]
    Http(Box<HttpError>),

    /// The token endpoint answered with a success which is not a token.
    #[error("The authentication was a success but the response did not contain the token or its validity limit.")]
    MalformedToken,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<HttpError> for HapiError {
    fn from(e: HttpError) -> Self {
        HapiError::Http(Box::new(e))
    }
}

impl HapiError {
    /// Get the HTTP error, if this is one.
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            HapiError::Http(e) => Some(e),
            _ => None,
        }
    }

    /// Get the status of the HTTP response, if this is an HTTP error.
    pub fn status(&self) -> Option<StatusCode> {
        self.http().map(HttpError::status)
    }

    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        self.http().map(HttpError::kind)
    }
}

/// Turn unsuccessful responses into an [HttpError].
pub(crate) fn check(request: HttpRequest, response: HttpResponse) -> Result<HttpResponse, HttpError> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(HttpError {
            kind: response.status.into(),
            request,
            response,
        })
    }
}
