use std::fmt;
use time::OffsetDateTime;

/// An access token which is valid until some point in time.
#[derive(Clone, PartialEq, Eq)]
pub struct ExpirableToken {
    value: String,
    expiration: OffsetDateTime,
}

impl ExpirableToken {
    /// Create a token. The value is trimmed.
    pub fn new(value: impl AsRef<str>, expiration: OffsetDateTime) -> Self {
        Self {
            value: value.as_ref().trim().to_string(),
            expiration,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expiration(&self) -> OffsetDateTime {
        self.expiration
    }

    /// A token with an empty value is never valid. A token is not valid anymore
    /// at its expiration instant.
    pub fn is_valid_until(&self, instant: OffsetDateTime) -> bool {
        !self.value.is_empty() && self.expiration > instant
    }
}

impl fmt::Debug for ExpirableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpirableToken")
            .field("value", &"***")
            .field("expiration", &self.expiration)
            .finish()
    }
}
