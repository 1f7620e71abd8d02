//! Error types for netassert-state

use thiserror::Error;

/// Errors raised by an observed-state accessor or a provisioner.
///
/// These are transport and tooling failures. A value that is simply absent
/// is not an error: `ObservedState::lookup` returns `Ok(None)` for that.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionerError {
    /// The backing tool or API could not be reached
    #[error("observed state unavailable for {key}: {reason}")]
    Unavailable { key: String, reason: String },

    /// A lookup did not complete within the caller-supplied bound
    #[error("lookup of {key} timed out after {after_ms}ms")]
    Timeout { key: String, after_ms: u64 },

    /// Deployment of the declared topology failed
    #[error("deploy failed: {0}")]
    Deploy(String),

    /// The accessor does not support the requested operation
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// An outputs document could not be parsed
    #[error("invalid outputs document: {0}")]
    InvalidDocument(String),

    /// Filesystem error while reading outputs
    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ProvisionerError {
    fn from(err: serde_json::Error) -> Self {
        ProvisionerError::InvalidDocument(err.to_string())
    }
}

impl From<std::io::Error> for ProvisionerError {
    fn from(err: std::io::Error) -> Self {
        ProvisionerError::Io(err.to_string())
    }
}
