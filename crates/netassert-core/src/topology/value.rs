use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declared attribute value, resolved once at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
    Nested(AttributeSet),
}

impl AttributeValue {
    /// Render back into the declarative JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Scalar(s) => Value::String(s.clone()),
            AttributeValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::Nested(set) => set.to_json(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Recognized attributes plus an open bag of fields the schema does not know.
///
/// Extras are preserved verbatim so forward-compatible declarations survive a
/// build/serialise round trip; they are never compared against observed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    values: BTreeMap<String, AttributeValue>,
    extra: BTreeMap<String, Value>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.values.insert(name.into(), value);
    }

    pub fn insert_extra(&mut self, name: impl Into<String>, value: Value) {
        self.extra.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flatten nested sets into `(segments, leaf)` pairs, depth-first.
    ///
    /// A leaf is always a `Scalar` or a `List`. `serviceDelegation.actions`
    /// comes back as `(["serviceDelegation", "actions"], List(..))`.
    pub fn leaves(&self) -> Vec<(Vec<&str>, &AttributeValue)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        out: &mut Vec<(Vec<&'a str>, &'a AttributeValue)>,
    ) {
        for (name, value) in &self.values {
            prefix.push(name);
            match value {
                AttributeValue::Nested(set) => set.collect_leaves(prefix, out),
                leaf => out.push((prefix.clone(), leaf)),
            }
            prefix.pop();
        }
    }

    /// Recognized values and extras merged into one JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.extra {
            map.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.values {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}
