//! netassert-state: the observed-state seam for netassert
//!
//! Everything the validator knows about deployed infrastructure flows through
//! the traits in this crate. The infrastructure tool itself (terraform,
//! bicep, a cloud SDK) lives behind them.
//!
//! ## Key Components
//!
//! - `ObservedState`: read side, resolves an `OutputKey` to a JSON value
//! - `Provisioner`: deploys a declarative document and exposes its outputs
//! - `MemoryProvisioner`: in-memory fake for tests
//! - `OutputDocument`: read-only view over a `terraform output -json` dump

mod error;
pub mod fakes;
pub mod outputs;
pub mod provisioner;

pub use error::ProvisionerError;
pub use fakes::MemoryProvisioner;
pub use outputs::OutputDocument;
pub use provisioner::{resolve, ObservedState, OutputKey, ProvisionResult, Provisioner};
