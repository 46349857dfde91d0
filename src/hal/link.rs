use crate::errors::InvalidInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A hyperlink from a resource to a URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    href: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    templated: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprecation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hreflang: Option<String>,
}

/// Link object as found in a document, not validated yet.
#[derive(Deserialize, Default)]
#[serde(default)]
struct LinkObject {
    href: Option<String>,
    templated: Option<bool>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    deprecation: Option<String>,
    name: Option<String>,
    profile: Option<String>,
    title: Option<String>,
    hreflang: Option<String>,
}

impl Link {
    /// Create a link. The href is trimmed and must not be blank.
    pub fn new(href: impl AsRef<str>) -> Result<Self, InvalidInput> {
        let href = href.as_ref().trim();
        if href.is_empty() {
            return Err(InvalidInput::BlankHref);
        }
        Ok(Self {
            href: href.to_string(),
            templated: false,
            media_type: None,
            deprecation: None,
            name: None,
            profile: None,
            title: None,
            hreflang: None,
        })
    }

    /// Create a link from a link object of a HAL document.
    ///
    /// Unknown properties are ignored.
    pub fn from_json(json: &Value) -> Result<Self, InvalidInput> {
        let object = match json {
            Value::Object(_) => LinkObject::deserialize(json)?,
            Value::String(text) if !text.trim().is_empty() => serde_json::from_str(text)?,
            _ => LinkObject::default(),
        };
        object.try_into()
    }

    pub fn with_templated(mut self, templated: bool) -> Self {
        self.templated = templated;
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_deprecation(mut self, deprecation: impl Into<String>) -> Self {
        self.deprecation = Some(deprecation.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    /// Either a URI or a URI template.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Whether the href is a URI template.
    pub fn is_templated(&self) -> bool {
        self.templated
    }

    /// Media type expected when dereferencing the link (the `type` property).
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// A URL giving information about the deprecation of the link.
    pub fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }

    /// Secondary key for selecting links sharing the same relation type.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn hreflang(&self) -> Option<&str> {
        self.hreflang.as_deref()
    }
}

impl TryFrom<LinkObject> for Link {
    type Error = InvalidInput;

    fn try_from(object: LinkObject) -> Result<Self, Self::Error> {
        let mut link = Link::new(object.href.unwrap_or_default())?;
        link.templated = object.templated.unwrap_or(false);
        link.media_type = object.media_type;
        link.deprecation = object.deprecation;
        link.name = object.name;
        link.profile = object.profile;
        link.title = object.title;
        link.hreflang = object.hreflang;
        Ok(link)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link (href={}", self.href)?;
        if self.templated {
            f.write_str(", templated=true")?;
        }
        let optional = [
            ("type", &self.media_type),
            ("deprecation", &self.deprecation),
            ("name", &self.name),
            ("profile", &self.profile),
            ("title", &self.title),
            ("hreflang", &self.hreflang),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                write!(f, ", {key}={value}")?;
            }
        }
        f.write_str(")")
    }
}
