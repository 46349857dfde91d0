//! URI Template (RFC 6570) expansion of request URLs.

use super::UrlVariables;
use crate::errors::InvalidInput;
use iri_string::spec::UriSpec;
use iri_string::template::simple_context::{SimpleContext, Value};
use iri_string::template::UriTemplateStr;

/// Value of a variable of a templated URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlVariable {
    String(String),
    /// Expands to `a,b` or, exploded (`{?ids*}`), to `ids=a&ids=b`.
    List(Vec<String>),
    /// Key-value pairs, expanded in order.
    Assoc(Vec<(String, String)>),
}

impl From<&str> for UrlVariable {
    fn from(value: &str) -> Self {
        UrlVariable::String(value.to_string())
    }
}

impl From<String> for UrlVariable {
    fn from(value: String) -> Self {
        UrlVariable::String(value)
    }
}

impl From<Vec<String>> for UrlVariable {
    fn from(values: Vec<String>) -> Self {
        UrlVariable::List(values)
    }
}

impl From<Vec<(String, String)>> for UrlVariable {
    fn from(pairs: Vec<(String, String)>) -> Self {
        UrlVariable::Assoc(pairs)
    }
}

impl From<&UrlVariable> for Value {
    fn from(variable: &UrlVariable) -> Self {
        match variable {
            UrlVariable::String(value) => Value::String(value.clone()),
            UrlVariable::List(values) => Value::List(values.clone()),
            UrlVariable::Assoc(pairs) => Value::Assoc(pairs.clone()),
        }
    }
}

/// Whether the URL needs to be expanded before being sent.
pub(crate) fn is_template(url: &str) -> bool {
    url.contains('{')
}

/// Expand a URI template. Variables without a value expand to nothing.
pub(crate) fn expand(template: &str, variables: &UrlVariables) -> Result<String, InvalidInput> {
    let invalid = |reason: String| InvalidInput::Template {
        template: template.to_string(),
        reason,
    };
    let parsed = UriTemplateStr::new(template).map_err(|e| invalid(e.to_string()))?;
    let mut context = SimpleContext::new();
    for (name, value) in variables {
        context.insert(name.as_str(), Value::from(value));
    }
    let expanded = parsed
        .expand::<UriSpec, _>(&context)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(expanded.to_string())
}
