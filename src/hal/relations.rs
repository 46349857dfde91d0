use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Value of a relation: a single entry, or a sequence of entries.
///
/// A sequence is kept as such even when it holds a single entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_one(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[T]> {
        match self {
            OneOrMany::One(_) => None,
            OneOrMany::Many(values) => Some(values),
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }
}

/// Entries of a resource by relation type, in document order.
///
/// Lookups ignore case.
#[derive(Debug, Clone, PartialEq)]
pub struct Relations<T>(Vec<(String, OneOrMany<T>)>);

impl<T> Default for Relations<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Relations<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the value of a relation, replacing the value of a relation with the exact same name.
    pub fn insert(&mut self, rel: impl Into<String>, value: OneOrMany<T>) {
        let rel = rel.into();
        match self.0.iter_mut().find(|(name, _)| *name == rel) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((rel, value)),
        }
    }

    /// Find the value of the first relation matching the given name.
    ///
    /// Names are compared after full Unicode lowercasing.
    pub fn find(&self, rel: &str) -> Option<&OneOrMany<T>> {
        let rel = rel.to_lowercase();
        self.0
            .iter()
            .find(|(name, _)| name.to_lowercase() == rel)
            .map(|(_, value)| value)
    }

    /// Relation names, in document order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OneOrMany<T>)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> FromIterator<(String, OneOrMany<T>)> for Relations<T> {
    fn from_iter<I: IntoIterator<Item = (String, OneOrMany<T>)>>(iter: I) -> Self {
        let mut relations = Self::new();
        for (rel, value) in iter {
            relations.insert(rel, value);
        }
        relations
    }
}

impl<T: Serialize> Serialize for Relations<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (rel, value) in &self.0 {
            map.serialize_entry(rel, value)?;
        }
        map.end()
    }
}
