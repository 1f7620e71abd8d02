//! Error taxonomy for netassert.
//!
//! Content mismatches are never errors; they are recorded as findings in a
//! [`Report`]. Errors here are either malformed input (fatal before any
//! deployment) or observed-state failures.

use netassert_state::ProvisionerError;

use crate::report::Report;
use crate::topology::EntityPath;

/// Malformed declarative input.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{path}: field '{field}' must be a {expected}, found {found}")]
    Shape {
        path: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: String },

    #[error("{path}: field '{field}' has value '{value}', expected one of [{allowed}]")]
    InvalidEnum {
        path: String,
        field: String,
        value: String,
        allowed: String,
    },

    #[error("{path}: duplicate declaration key '{key}'")]
    DuplicateKey { path: String, key: String },

    #[error("topology is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An observed-state lookup that failed while checking one entity.
///
/// The entity's remaining attributes and its whole subtree are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFault {
    pub path: EntityPath,
    pub key: String,
    pub error: ProvisionerError,
}

impl std::fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.key, self.error)
    }
}

/// Errors surfaced by the validator and the deploy driver.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// One or more subtrees could not be checked. Findings from every other
    /// subtree are preserved in `partial`.
    #[error("observed state failed for {} subtree(s); first: {}", faults.len(), first_fault(faults))]
    Provider {
        faults: Vec<ProviderFault>,
        partial: Report,
    },

    #[error("deploy failed: {0}")]
    Deploy(#[source] ProvisionerError),
}

impl ValidateError {
    /// Findings collected before the error, if any traversal happened.
    pub fn partial(&self) -> Option<&Report> {
        match self {
            ValidateError::Provider { partial, .. } => Some(partial),
            ValidateError::Deploy(_) => None,
        }
    }
}

fn first_fault(faults: &[ProviderFault]) -> String {
    faults
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

/// Invalid validator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
