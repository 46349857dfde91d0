use crate::errors::InvalidInput;
use serde::Serialize;
use std::fmt::Debug;

/// Content of a request, along with what describes it in the headers.
///
/// Bodies are encoded when they are created so that encoding errors
/// surface before anything is sent.
pub trait MessageBody: Debug + Send + Sync {
    /// Value of the `Content-Type` header.
    fn content_type(&self) -> &'static str;

    /// The encoded content.
    fn content(&self) -> &[u8];

    /// Value of the `Content-Length` header.
    fn content_length(&self) -> usize {
        self.content().len()
    }
}

/// A JSON request body (`application/json`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody {
    content: String,
}

impl JsonBody {
    /// Encode a value as JSON. Non-ASCII characters are written as is, not escaped.
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, InvalidInput> {
        let content = serde_json::to_string(value)?;
        Ok(Self { content })
    }

    /// Some already-encoded JSON text, sent as is.
    pub fn raw(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<serde_json::Value> for JsonBody {
    fn from(value: serde_json::Value) -> Self {
        Self {
            content: value.to_string(),
        }
    }
}

impl MessageBody for JsonBody {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn content(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// A form request body (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEncodedBody {
    content: String,
}

impl UrlEncodedBody {
    /// Encode a flat map, a struct or a sequence of pairs.
    pub fn new<T: Serialize + ?Sized>(query: &T) -> Result<Self, InvalidInput> {
        let content = serde_urlencoded::to_string(query)?;
        Ok(Self { content })
    }

    /// An already-encoded query string, sent as is.
    pub fn raw(query: impl Into<String>) -> Self {
        Self {
            content: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl MessageBody for UrlEncodedBody {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn content(&self) -> &[u8] {
        self.content.as_bytes()
    }
}
