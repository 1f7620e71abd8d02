//! Declarative document -> typed topology.
//!
//! Pure and deterministic: the same document always yields the same model.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::path::EntityPath;
use super::schema::{EntityKind, FieldShape, FieldSpec, NAME_FIELD};
use super::value::{AttributeSet, AttributeValue};
use super::{Entity, Topology};
use crate::error::SchemaError;

pub(super) fn build_topology(raw: &Value) -> Result<Topology, SchemaError> {
    let root = EntityPath::root();
    let declarations = raw.as_object().ok_or_else(|| SchemaError::Shape {
        path: root.to_string(),
        field: "<networks>".to_string(),
        expected: "object",
        found: json_kind(raw),
    })?;

    let networks = build_children(EntityKind::Network, &root, declarations)?;
    Ok(Topology { networks })
}

fn build_children(
    kind: EntityKind,
    parent: &EntityPath,
    declarations: &Map<String, Value>,
) -> Result<BTreeMap<String, Entity>, SchemaError> {
    declarations
        .iter()
        .map(|(key, decl)| {
            let entity = build_entity(kind, parent.child(kind, key.as_str()), decl)?;
            Ok((key.clone(), entity))
        })
        .collect()
}

/// A list of child declarations is keyed by each item's `name`.
fn build_child_list(
    kind: EntityKind,
    parent: &EntityPath,
    items: &[Value],
) -> Result<BTreeMap<String, Entity>, SchemaError> {
    let mut children = BTreeMap::new();
    for (index, item) in items.iter().enumerate() {
        let key = match item.get(NAME_FIELD) {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(SchemaError::MissingField {
                    path: parent.child(kind, format!("#{index}")).to_string(),
                    field: NAME_FIELD.to_string(),
                })
            }
        };
        if children.contains_key(&key) {
            return Err(SchemaError::DuplicateKey {
                path: format!("{}/{}", parent, kind.collection()),
                key,
            });
        }
        let entity = build_entity(kind, parent.child(kind, key.as_str()), item)?;
        children.insert(key, entity);
    }
    Ok(children)
}

fn build_entity(kind: EntityKind, path: EntityPath, decl: &Value) -> Result<Entity, SchemaError> {
    let object = decl.as_object().ok_or_else(|| SchemaError::Shape {
        path: path.to_string(),
        field: "<declaration>".to_string(),
        expected: "object",
        found: json_kind(decl),
    })?;

    let schema = kind.schema();
    let child_field = schema.children.map(EntityKind::collection);
    let attributes = build_set(schema.fields, object, &path, "", child_field)?;

    let children = match schema.children {
        None => BTreeMap::new(),
        Some(child_kind) => match object.get(child_kind.collection()) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(map)) => build_children(child_kind, &path, map)?,
            Some(Value::Array(items)) => build_child_list(child_kind, &path, items)?,
            Some(other) => {
                return Err(SchemaError::Shape {
                    path: path.to_string(),
                    field: child_kind.collection().to_string(),
                    expected: "object or list",
                    found: json_kind(other),
                })
            }
        },
    };

    Ok(Entity {
        kind,
        path,
        attributes,
        children,
    })
}

fn build_set(
    fields: &[FieldSpec],
    object: &Map<String, Value>,
    path: &EntityPath,
    prefix: &str,
    skip: Option<&str>,
) -> Result<AttributeSet, SchemaError> {
    let mut set = AttributeSet::new();

    for field in fields {
        let label = format!("{prefix}{}", field.name);
        match object.get(field.name).filter(|v| !v.is_null()) {
            Some(raw) => set.insert(field.name, coerce(field, raw, path, &label)?),
            None if field.required => {
                return Err(SchemaError::MissingField {
                    path: path.to_string(),
                    field: label,
                })
            }
            None => {}
        }
    }

    for (name, raw) in object {
        let known = fields.iter().any(|f| f.name == name.as_str()) || skip == Some(name.as_str());
        if !known {
            set.insert_extra(name.as_str(), raw.clone());
        }
    }

    Ok(set)
}

fn coerce(
    field: &FieldSpec,
    raw: &Value,
    path: &EntityPath,
    label: &str,
) -> Result<AttributeValue, SchemaError> {
    let shape_error = |found: &Value| SchemaError::Shape {
        path: path.to_string(),
        field: label.to_string(),
        expected: field.shape.describe(),
        found: json_kind(found),
    };

    match field.shape {
        FieldShape::Scalar => scalar_string(raw)
            .map(AttributeValue::Scalar)
            .ok_or_else(|| shape_error(raw)),
        FieldShape::OneOf(allowed) => {
            let value = scalar_string(raw).ok_or_else(|| shape_error(raw))?;
            if allowed.contains(&value.as_str()) {
                Ok(AttributeValue::Scalar(value))
            } else {
                Err(SchemaError::InvalidEnum {
                    path: path.to_string(),
                    field: label.to_string(),
                    value,
                    allowed: allowed.join(", "),
                })
            }
        }
        FieldShape::List => {
            let items = raw.as_array().ok_or_else(|| shape_error(raw))?;
            items
                .iter()
                .map(|item| scalar_string(item).ok_or_else(|| shape_error(item)))
                .collect::<Result<Vec<_>, _>>()
                .map(AttributeValue::List)
        }
        FieldShape::Nested(fields) => {
            let object = raw.as_object().ok_or_else(|| shape_error(raw))?;
            let nested = build_set(fields, object, path, &format!("{label}."), None)?;
            Ok(AttributeValue::Nested(nested))
        }
    }
}

/// Strings pass through untouched; numbers and booleans use their JSON text.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
