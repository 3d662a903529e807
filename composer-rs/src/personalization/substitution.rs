//! Literal placeholder substitution for test sends

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Ordered placeholder -> literal pairs.
///
/// Pairs are applied in insertion order. A literal introduced by an earlier
/// pair is visible to later pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements(Vec<(String, String)>);

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair
    pub fn with(mut self, placeholder: impl Into<String>, literal: impl Into<String>) -> Self {
        self.0.push((placeholder.into(), literal.into()));
        self
    }

    /// Build from a JSON object, keeping key order.
    ///
    /// Strings are used verbatim, `null` becomes the empty string and any
    /// other value its compact JSON text.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        map.iter()
            .map(|(placeholder, value)| (placeholder.clone(), literal_text(value)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, l)| (p.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for Replacements {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_json(&map))
    }
}

/// Replace every occurrence of each placeholder with its literal.
///
/// Matching is exact substring matching; no character in either the
/// placeholder or the literal has special meaning. Empty placeholders are
/// skipped.
pub fn substitute(html: &str, replacements: &Replacements) -> String {
    let mut result = html.to_string();

    for (placeholder, literal) in replacements.iter() {
        if placeholder.is_empty() {
            continue;
        }
        if result.contains(placeholder) {
            result = result.replace(placeholder, literal);
        }
    }

    result
}
