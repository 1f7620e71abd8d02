//! Deploy a topology through a [`Provisioner`], then validate it.
//!
//! The provisioner is injected; credentials, tool invocation and teardown
//! stay on the caller's side of the trait.

use std::sync::Arc;

use netassert_state::{ObservedState, Provisioner};

use crate::config::ValidatorConfig;
use crate::error::ValidateError;
use crate::obs;
use crate::report::Report;
use crate::topology::Topology;
use crate::validator::Validator;

/// Deploy `topology`, then validate the provisioner's outputs against it.
///
/// A deploy failure returns `ValidateError::Deploy` before any lookup runs.
pub async fn deploy_and_validate<P>(
    provisioner: Arc<P>,
    topology: &Topology,
    config: ValidatorConfig,
) -> Result<Report, ValidateError>
where
    P: Provisioner + 'static,
{
    obs::emit_deploy_started(topology.networks().len());

    if let Err(err) = provisioner.deploy(&topology.to_value()).await {
        obs::emit_deploy_failed(&err);
        return Err(ValidateError::Deploy(err));
    }

    let observed: Arc<dyn ObservedState> = provisioner;
    Validator::new(config).validate(topology, observed).await
}
