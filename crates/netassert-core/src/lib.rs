//! netassert Core Library
//!
//! Builds a typed topology from a declarative network description and
//! validates it, attribute by attribute, against observed state exposed by
//! a provisioner.
//!
//! ```ignore
//! let topology = Topology::from_json_str(&declared)?;
//! let report = deploy_and_validate(provisioner, &topology, ValidatorConfig::from_env()?).await?;
//! assert!(report.all_passed(), "{}", report.format());
//! ```

pub mod config;
pub mod deploy;
pub mod error;
pub mod obs;
pub mod report;
pub mod reporting;
pub mod telemetry;
pub mod topology;
pub mod validator;

pub use config::{ListMode, ValidatorConfig};
pub use deploy::deploy_and_validate;
pub use error::{ConfigError, ProviderFault, SchemaError, ValidateError};
pub use report::{Finding, Outcome, Report, ReportSummary};
pub use reporting::{write_report_json, write_report_text, FindingArtifact, ReportArtifact};
pub use telemetry::init_tracing;
pub use topology::{
    AttributeSet, AttributeValue, Entity, EntityKind, EntityPath, PathSegment, Topology,
};
pub use validator::{compare, validate, Validator};

pub use netassert_state::{
    MemoryProvisioner, ObservedState, OutputDocument, OutputKey, Provisioner, ProvisionerError,
};

/// netassert version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
