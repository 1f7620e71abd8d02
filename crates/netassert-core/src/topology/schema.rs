//! Recognized fields per entity kind.
//!
//! The builder and the validator are both driven by these tables; neither
//! hardcodes per-entity logic. Fields not listed here are carried through
//! as opaque extras.

use serde::{Deserialize, Serialize};

/// Kind of a node in the topology tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EntityKind {
    Network,
    Subnetwork,
    Delegation,
}

impl EntityKind {
    /// Field name under which entities of this kind are declared in their
    /// parent (and looked up in observed state).
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Network => "networks",
            EntityKind::Subnetwork => "subnetworks",
            EntityKind::Delegation => "delegations",
        }
    }

    pub fn schema(self) -> &'static KindSchema {
        match self {
            EntityKind::Network => &NETWORK,
            EntityKind::Subnetwork => &SUBNETWORK,
            EntityKind::Delegation => &DELEGATION,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Network => "network",
            EntityKind::Subnetwork => "subnetwork",
            EntityKind::Delegation => "delegation",
        };
        write!(f, "{s}")
    }
}

/// Expected shape of a recognized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    List,
    /// Scalar restricted to a fixed set of values.
    OneOf(&'static [&'static str]),
    Nested(&'static [FieldSpec]),
}

impl FieldShape {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldShape::Scalar | FieldShape::OneOf(_) => "scalar",
            FieldShape::List => "list",
            FieldShape::Nested(_) => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: FieldShape,
    pub required: bool,
}

const fn required(name: &'static str, shape: FieldShape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: true,
    }
}

const fn optional(name: &'static str, shape: FieldShape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: false,
    }
}

#[derive(Debug)]
pub struct KindSchema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    /// Kind of the nested entities, if this kind has any.
    pub children: Option<EntityKind>,
}

impl KindSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const NAME_FIELD: &str = "name";

pub const PRIVATE_ENDPOINT_POLICIES: &[&str] = &["Enabled", "Disabled"];

const SERVICE_DELEGATION_FIELDS: &[FieldSpec] = &[
    required(NAME_FIELD, FieldShape::Scalar),
    optional("actions", FieldShape::List),
];

static NETWORK: KindSchema = KindSchema {
    kind: EntityKind::Network,
    fields: &[
        required(NAME_FIELD, FieldShape::Scalar),
        optional("location", FieldShape::Scalar),
        optional("resourceGroup", FieldShape::Scalar),
        optional("addressSpace", FieldShape::List),
    ],
    children: Some(EntityKind::Subnetwork),
};

static SUBNETWORK: KindSchema = KindSchema {
    kind: EntityKind::Subnetwork,
    fields: &[
        required(NAME_FIELD, FieldShape::Scalar),
        optional("addressPrefixes", FieldShape::List),
        optional("nsgName", FieldShape::Scalar),
        optional("serviceEndpoints", FieldShape::List),
        optional(
            "privateEndpointNetworkPolicies",
            FieldShape::OneOf(PRIVATE_ENDPOINT_POLICIES),
        ),
    ],
    children: Some(EntityKind::Delegation),
};

static DELEGATION: KindSchema = KindSchema {
    kind: EntityKind::Delegation,
    fields: &[
        required(NAME_FIELD, FieldShape::Scalar),
        optional(
            "serviceDelegation",
            FieldShape::Nested(SERVICE_DELEGATION_FIELDS),
        ),
    ],
    children: None,
};
