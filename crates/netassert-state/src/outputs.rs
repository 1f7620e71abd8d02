//! Read-only observed state over a captured outputs document.
//!
//! Accepts either the envelope printed by `terraform output -json`
//! (`{"vnets": {"sensitive": false, "type": [...], "value": {...}}}`) or a
//! plain JSON object. Envelopes are unwrapped once at load time.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ProvisionerError;
use crate::provisioner::{resolve, ObservedState, OutputKey, ProvisionResult};

/// An immutable outputs document.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDocument {
    root: Value,
}

impl OutputDocument {
    /// Build from an already-parsed document.
    pub fn from_value(document: Value) -> ProvisionResult<Self> {
        let Value::Object(map) = document else {
            return Err(ProvisionerError::InvalidDocument(
                "outputs document must be a JSON object".to_string(),
            ));
        };

        let root = if is_terraform_envelope(&map) {
            debug!(outputs = map.len(), "unwrapping terraform output envelope");
            Value::Object(
                map.into_iter()
                    .map(|(name, mut entry)| {
                        let value = entry
                            .as_object_mut()
                            .and_then(|o| o.remove("value"))
                            .unwrap_or(Value::Null);
                        (name, value)
                    })
                    .collect(),
            )
        } else {
            Value::Object(map)
        };

        Ok(Self { root })
    }

    pub fn from_json_str(json: &str) -> ProvisionResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Read and parse a document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> ProvisionResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&content)
    }

    /// The unwrapped document.
    pub fn root(&self) -> &Value {
        &self.root
    }
}

fn is_terraform_envelope(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.values().all(|entry| {
            entry
                .as_object()
                .is_some_and(|o| o.contains_key("value") && o.contains_key("type"))
        })
}

#[async_trait]
impl ObservedState for OutputDocument {
    async fn lookup(&self, key: &OutputKey) -> ProvisionResult<Option<Value>> {
        Ok(resolve(&self.root, key).cloned())
    }
}
