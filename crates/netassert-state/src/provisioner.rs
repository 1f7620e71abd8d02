//! Provisioner and observed-state trait definitions
//!
//! These traits define the narrow contract the validator depends on:
//! - `ObservedState`: key-addressed lookup of deployed attribute values
//! - `Provisioner`: deploys a declarative document, then acts as `ObservedState`
//!
//! All traits are async and backend-agnostic. An in-memory fake is provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProvisionerError;

/// Result type for provisioner operations
pub type ProvisionResult<T> = std::result::Result<T, ProvisionerError>;

// ---------------------------------------------------------------------------
// OutputKey
// ---------------------------------------------------------------------------

/// A sequenced path into the provisioner's output mapping.
///
/// Segments mirror the declarative document, e.g.
/// `["vnet1", "subnetworks", "subnet1", "addressPrefixes"]`, displayed as
/// `vnet1.subnetworks.subnet1.addressPrefixes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputKey {
    segments: Vec<String>,
}

impl OutputKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a dotted key (`a.b.c`). Empty segments are dropped.
    pub fn parse_dotted(key: &str) -> Self {
        Self::new(key.split('.').filter(|s| !s.is_empty()))
    }

    /// Return a new key with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` addresses this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &OutputKey) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl std::fmt::Display for OutputKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `key` against a nested JSON document.
///
/// Objects are entered by field name. Arrays are entered by numeric index,
/// or else by the first element whose `name` field equals the segment, which
/// is how most providers report named sub-resources (delegations, rules).
/// A JSON `null` at the end of the walk counts as not found.
pub fn resolve<'a>(root: &'a Value, key: &OutputKey) -> Option<&'a Value> {
    let mut current = root;
    for segment in key.segments() {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(index) => items.get(index)?,
                Err(_) => items
                    .iter()
                    .find(|item| item.get("name").and_then(Value::as_str) == Some(segment))?,
            },
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to deployed state.
///
/// Guarantees:
/// - `Ok(None)` means the key is not present (or is `null`).
/// - `Err(_)` is reserved for transport or tooling failures.
#[async_trait]
pub trait ObservedState: Send + Sync {
    /// Look up the value at `key`.
    async fn lookup(&self, key: &OutputKey) -> ProvisionResult<Option<Value>>;
}

/// An external system that deploys a declarative topology document and then
/// exposes the resulting attributes.
#[async_trait]
pub trait Provisioner: ObservedState {
    /// Deploy the given declarative document.
    async fn deploy(&self, document: &Value) -> ProvisionResult<()>;
}
