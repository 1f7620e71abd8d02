//! Structured observability hooks for validation runs.
//!
//! - `validation_span`: run-scoped span for the whole traversal
//! - `emit_*`: one function per lifecycle event
//!
//! Events are emitted at `info!`, per-finding events at `debug!`.

use tracing::{debug, info, warn};

use crate::error::ProviderFault;
use crate::report::{Finding, ReportSummary};

/// Run-scoped span named `netassert.validation`.
///
/// Attach it to the run future with `tracing::Instrument` so every event
/// emitted by the traversal, including spawned per-network tasks, carries
/// the run id.
pub fn validation_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("netassert.validation", run_id = %run_id)
}

pub fn emit_validation_started(run_id: &str, networks: usize, entities: usize) {
    info!(
        event = "validation.started",
        run_id = %run_id,
        networks = networks,
        entities = entities,
    );
}

pub fn emit_validation_finished(
    run_id: &str,
    summary: &ReportSummary,
    faults: usize,
    duration_ms: u64,
) {
    info!(
        event = "validation.finished",
        run_id = %run_id,
        total = summary.total,
        matched = summary.matched,
        mismatched = summary.mismatched,
        missing = summary.missing,
        faults = faults,
        duration_ms = duration_ms,
    );
}

pub fn emit_finding(finding: &Finding) {
    debug!(
        event = "validation.finding",
        path = %finding.path,
        attribute = %finding.attribute,
        outcome = ?finding.outcome,
    );
}

/// Provider faults are logged at warn; they abort a subtree.
pub fn emit_provider_fault(fault: &ProviderFault) {
    warn!(
        event = "validation.provider_fault",
        path = %fault.path,
        key = %fault.key,
        error = %fault.error,
    );
}

pub fn emit_deploy_started(networks: usize) {
    info!(event = "deploy.started", networks = networks);
}

pub fn emit_deploy_failed(error: &dyn std::fmt::Display) {
    warn!(event = "deploy.failed", error = %error);
}
