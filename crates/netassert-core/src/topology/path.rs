use std::cmp::Ordering;

use netassert_state::OutputKey;
use serde::{Deserialize, Serialize};

use super::schema::EntityKind;

/// One step of an [`EntityPath`]: the declaration key of a node and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub kind: EntityKind,
    pub key: String,
}

/// Declaration keys from the root to a node, e.g. `vnet1/subnet1/aci`.
///
/// Paths order lexicographically by their key sequence, which is what keeps
/// report output stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityPath {
    segments: Vec<PathSegment>,
}

impl EntityPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, kind: EntityKind, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment {
            kind,
            key: key.into(),
        });
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.key.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The observed-state key of this node under `prefix`.
    ///
    /// Every segment below the top level is preceded by its collection name,
    /// so `vnet1/subnet1` maps to `<prefix>.vnet1.subnetworks.subnet1`.
    pub fn output_key(&self, prefix: &OutputKey) -> OutputKey {
        let mut key = prefix.clone();
        for (depth, segment) in self.segments.iter().enumerate() {
            if depth > 0 {
                key = key.child(segment.kind.collection());
            }
            key = key.child(segment.key.as_str());
        }
        key
    }
}

impl Ord for EntityPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.keys()
            .cmp(other.keys())
            .then_with(|| {
                self.segments
                    .iter()
                    .map(|s| s.kind)
                    .cmp(other.segments.iter().map(|s| s.kind))
            })
    }
}

impl PartialOrd for EntityPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for EntityPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        let keys: Vec<&str> = self.keys().collect();
        write!(f, "{}", keys.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet_path() -> EntityPath {
        EntityPath::root()
            .child(EntityKind::Network, "vnet1")
            .child(EntityKind::Subnetwork, "subnet1")
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityPath::root().to_string(), "<root>");
        assert_eq!(subnet_path().to_string(), "vnet1/subnet1");
    }

    #[test]
    fn test_output_key_interleaves_collections() {
        let key = subnet_path()
            .child(EntityKind::Delegation, "aci")
            .output_key(&OutputKey::new(["vnets"]));
        assert_eq!(
            key.to_string(),
            "vnets.vnet1.subnetworks.subnet1.delegations.aci"
        );
    }

    #[test]
    fn test_order_is_lexicographic_by_key() {
        let a = EntityPath::root().child(EntityKind::Network, "vnet1");
        let b = subnet_path();
        let c = EntityPath::root().child(EntityKind::Network, "vnet2");
        let mut paths = vec![c.clone(), b.clone(), a.clone()];
        paths.sort();
        assert_eq!(paths, vec![a, b, c]);
    }
}
