use super::link::Link;
use super::relations::{OneOrMany, Relations};
use crate::errors::{InvalidInput, RelError, Section};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;

const LINKS: &str = "_links";
const EMBEDDED: &str = "_embedded";

/// A HAL resource: its state, links to other resources, and embedded resources.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resource {
    state: Map<String, Value>,
    links: Relations<Link>,
    embedded: Relations<Resource>,
}

impl Resource {
    pub fn new(
        state: Map<String, Value>,
        links: Relations<Link>,
        embedded: Relations<Resource>,
    ) -> Self {
        Self {
            state,
            links,
            embedded,
        }
    }

    /// Create a resource from a decoded HAL document.
    ///
    /// - `null` is an empty resource.
    /// - A string is parsed as JSON text.
    /// - An array is treated as an object keyed by index.
    pub fn from_json(json: &Value) -> Result<Self, InvalidInput> {
        match json {
            Value::Null => Ok(Self::default()),
            Value::String(text) => text.parse(),
            Value::Object(object) => Self::from_object(object),
            Value::Array(items) => {
                let object: Map<String, Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item.clone()))
                    .collect();
                Self::from_object(&object)
            }
            other => Err(InvalidInput::JsonType(json_type(other))),
        }
    }

    /// Create a resource from JSON text. Blank text is an empty resource.
    pub fn from_slice(text: &[u8]) -> Result<Self, InvalidInput> {
        if text.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let json: Value = serde_json::from_slice(text)?;
        Self::from_json(&json)
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, InvalidInput> {
        let state = object
            .iter()
            .filter(|(key, _)| key.as_str() != LINKS && key.as_str() != EMBEDDED)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Self {
            state,
            links: extract_by_rel(object, LINKS, Link::from_json)?,
            embedded: extract_by_rel(object, EMBEDDED, Resource::from_json)?,
        })
    }

    /// Properties of the resource, without `_links` and `_embedded`.
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn all_links(&self) -> &Relations<Link> {
        &self.links
    }

    pub fn all_embedded_resources(&self) -> &Relations<Resource> {
        &self.embedded
    }

    /// Find the unique link of the given relation type, ignoring case.
    pub fn link(&self, rel: impl AsRef<str>) -> Result<&Link, RelError> {
        find_one(Section::Links, &self.links, rel.as_ref())
    }

    /// Find the sequence of links of the given relation type, ignoring case.
    pub fn links(&self, rel: impl AsRef<str>) -> Result<&[Link], RelError> {
        find_many(Section::Links, &self.links, rel.as_ref())
    }

    /// Find the unique embedded resource of the given relation type, ignoring case.
    pub fn embedded_resource(&self, rel: impl AsRef<str>) -> Result<&Resource, RelError> {
        find_one(Section::Embedded, &self.embedded, rel.as_ref())
    }

    /// Find the sequence of embedded resources of the given relation type, ignoring case.
    pub fn embedded_resources(&self, rel: impl AsRef<str>) -> Result<&[Resource], RelError> {
        find_many(Section::Embedded, &self.embedded, rel.as_ref())
    }
}

impl FromStr for Resource {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.state.len()
            + usize::from(!self.links.is_empty())
            + usize::from(!self.embedded.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.state {
            map.serialize_entry(key, value)?;
        }
        if !self.links.is_empty() {
            map.serialize_entry(LINKS, &self.links)?;
        }
        if !self.embedded.is_empty() {
            map.serialize_entry(EMBEDDED, &self.embedded)?;
        }
        map.end()
    }
}

fn extract_by_rel<T>(
    object: &Map<String, Value>,
    section: &'static str,
    parse: fn(&Value) -> Result<T, InvalidInput>,
) -> Result<Relations<T>, InvalidInput> {
    let entries = match object.get(section) {
        None | Some(Value::Null) => return Ok(Relations::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(InvalidInput::Section {
                section,
                found: json_type(other),
            })
        }
    };
    entries
        .iter()
        .map(|(rel, value)| -> Result<_, InvalidInput> {
            let value = match value {
                Value::Array(items) => {
                    OneOrMany::Many(items.iter().map(parse).collect::<Result<_, _>>()?)
                }
                single => OneOrMany::One(parse(single)?),
            };
            Ok((rel.clone(), value))
        })
        .collect()
}

fn find_one<'a, T>(section: Section, relations: &'a Relations<T>, rel: &str) -> Result<&'a T, RelError> {
    match relations.find(rel) {
        Some(OneOrMany::One(value)) => Ok(value),
        Some(OneOrMany::Many(_)) => Err(RelError::NotUnique {
            section,
            rel: rel.to_string(),
        }),
        None => Err(not_found(section, relations, rel)),
    }
}

fn find_many<'a, T>(section: Section, relations: &'a Relations<T>, rel: &str) -> Result<&'a [T], RelError> {
    match relations.find(rel) {
        Some(OneOrMany::Many(values)) => Ok(values),
        Some(OneOrMany::One(_)) => Err(RelError::Unique {
            section,
            rel: rel.to_string(),
        }),
        None => Err(not_found(section, relations, rel)),
    }
}

fn not_found<T>(section: Section, relations: &Relations<T>, rel: &str) -> RelError {
    RelError::NotFound {
        section,
        missing: rel.to_string(),
        available: relations.names(),
    }
}

fn json_type(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
