//! Typed topology model.
//!
//! A topology is a tree: networks contain subnetworks, subnetworks contain
//! delegations. It is built once from a loosely-typed declarative document
//! and is immutable afterwards.
//!
//! - `schema`: recognized fields and nesting per [`EntityKind`]
//! - `value`: the [`AttributeValue`] tagged union and [`AttributeSet`] bag
//! - `path`: [`EntityPath`], the declaration-key address of a node
//! - `builder`: document -> model, rejecting malformed input with [`SchemaError`]

mod builder;
pub mod path;
pub mod schema;
pub mod value;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

pub use path::{EntityPath, PathSegment};
pub use schema::{EntityKind, FieldShape, FieldSpec, KindSchema};
pub use value::{AttributeSet, AttributeValue};

pub(crate) use builder::scalar_string;

/// A named node in the topology tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    kind: EntityKind,
    path: EntityPath,
    attributes: AttributeSet,
    children: BTreeMap<String, Entity>,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn path(&self) -> &EntityPath {
        &self.path
    }

    /// Declaration key in the parent, which need not equal [`Entity::name`].
    pub fn key(&self) -> &str {
        self.path.last().map(|s| s.key.as_str()).unwrap_or_default()
    }

    /// Human-readable name; always present after a successful build.
    pub fn name(&self) -> &str {
        self.attributes
            .get(schema::NAME_FIELD)
            .and_then(AttributeValue::as_scalar)
            .unwrap_or_default()
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn children(&self) -> &BTreeMap<String, Entity> {
        &self.children
    }

    pub fn child(&self, key: &str) -> Option<&Entity> {
        self.children.get(key)
    }

    /// Serialise back into the declarative shape. Child collections are
    /// always written as maps keyed by declaration key.
    pub fn to_value(&self) -> Value {
        let mut object = match self.attributes.to_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if !self.children.is_empty() {
            if let Some(child_kind) = self.kind.schema().children {
                let children = self
                    .children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_value()))
                    .collect();
                object.insert(child_kind.collection().to_string(), Value::Object(children));
            }
        }
        Value::Object(object)
    }
}

/// The full declared tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    networks: BTreeMap<String, Entity>,
}

impl Topology {
    /// Build a topology from a declarative document whose top level maps
    /// declaration keys to network declarations.
    pub fn build(raw: &Value) -> Result<Self, SchemaError> {
        builder::build_topology(raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let raw: Value = serde_json::from_str(json)?;
        Self::build(&raw)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.networks
                .iter()
                .map(|(key, network)| (key.clone(), network.to_value()))
                .collect(),
        )
    }

    pub fn networks(&self) -> &BTreeMap<String, Entity> {
        &self.networks
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// The entity at `path`, if any.
    pub fn find(&self, path: &EntityPath) -> Option<&Entity> {
        let mut keys = path.keys();
        let mut current = self.networks.get(keys.next()?)?;
        for key in keys {
            current = current.child(key)?;
        }
        Some(current)
    }

    /// Every entity, depth-first, children in key order.
    pub fn walk(&self) -> Vec<&Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<&Entity> = self.networks.values().rev().collect();
        while let Some(entity) = stack.pop() {
            out.push(entity);
            stack.extend(entity.children.values().rev());
        }
        out
    }

    pub fn entity_count(&self) -> usize {
        self.walk().len()
    }
}

impl TryFrom<&Value> for Topology {
    type Error = SchemaError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        Self::build(raw)
    }
}
