//! Link relation types.

use crate::errors::InvalidInput;
use aliri_braid::braid;
use std::fmt;
use std::str::FromStr;

/// A relation type registered by IANA, or defined by HAL (`curies`).
///
/// See https://www.iana.org/assignments/link-relations/link-relations.xhtml
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisteredRel {
    Alternate,
    Collection,
    Curies,
    Describedby,
    Edit,
    First,
    Index,
    Item,
    Last,
    Next,
    Prev,
    Profile,
    Related,
    Search,
    /// The `self` relation type.
    Self_,
    Up,
}

impl RegisteredRel {
    pub const ALL: [RegisteredRel; 16] = [
        RegisteredRel::Alternate,
        RegisteredRel::Collection,
        RegisteredRel::Curies,
        RegisteredRel::Describedby,
        RegisteredRel::Edit,
        RegisteredRel::First,
        RegisteredRel::Index,
        RegisteredRel::Item,
        RegisteredRel::Last,
        RegisteredRel::Next,
        RegisteredRel::Prev,
        RegisteredRel::Profile,
        RegisteredRel::Related,
        RegisteredRel::Search,
        RegisteredRel::Self_,
        RegisteredRel::Up,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegisteredRel::Alternate => "alternate",
            RegisteredRel::Collection => "collection",
            RegisteredRel::Curies => "curies",
            RegisteredRel::Describedby => "describedby",
            RegisteredRel::Edit => "edit",
            RegisteredRel::First => "first",
            RegisteredRel::Index => "index",
            RegisteredRel::Item => "item",
            RegisteredRel::Last => "last",
            RegisteredRel::Next => "next",
            RegisteredRel::Prev => "prev",
            RegisteredRel::Profile => "profile",
            RegisteredRel::Related => "related",
            RegisteredRel::Search => "search",
            RegisteredRel::Self_ => "self",
            RegisteredRel::Up => "up",
        }
    }

    /// Find the registered relation type of the given name, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rel| rel.as_str().eq_ignore_ascii_case(name))
    }
}

impl AsRef<str> for RegisteredRel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RegisteredRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extension relation type: usually a URI or a CURIE (`prefix:reference`),
/// but any non-blank name is accepted.
#[braid(validator)]
pub struct CustomRel(String);

impl aliri_braid::Validator for CustomRel {
    type Error = InvalidInput;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if s.trim().is_empty() {
            Err(InvalidInput::BlankRel)
        } else {
            Ok(())
        }
    }
}

/// The relation type of a link or of an embedded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rel {
    Registered(RegisteredRel),
    Custom(CustomRel),
}

impl Rel {
    /// Create an extension relation type. The name is trimmed and must not be blank.
    pub fn custom(name: impl AsRef<str>) -> Result<Self, InvalidInput> {
        let name = name.as_ref().trim();
        Ok(Rel::Custom(CustomRel::try_from(name)?))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Rel::Registered(rel) => rel.as_str(),
            Rel::Custom(rel) => rel.as_str(),
        }
    }
}

impl FromStr for Rel {
    type Err = InvalidInput;

    /// Registered relation types are recognized regardless of case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match RegisteredRel::lookup(s.trim()) {
            Some(rel) => Ok(Rel::Registered(rel)),
            None => Rel::custom(s),
        }
    }
}

impl AsRef<str> for Rel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<RegisteredRel> for Rel {
    fn from(rel: RegisteredRel) -> Self {
        Rel::Registered(rel)
    }
}

impl From<CustomRel> for Rel {
    fn from(rel: CustomRel) -> Self {
        Rel::Custom(rel)
    }
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
