//! Structural validator: walks a [`Topology`] in lock-step with observed
//! state and records one [`Finding`] per declared attribute.
//!
//! Top-level networks share no data, so each is checked in its own tokio
//! task (bounded by `max_concurrent`). Every task returns its own findings;
//! they are merged and sorted once all tasks finish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use netassert_state::{ObservedState, OutputKey, ProvisionResult, ProvisionerError};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ListMode, ValidatorConfig};
use crate::error::{ProviderFault, ValidateError};
use crate::obs;
use crate::report::{Finding, Outcome, Report};
use crate::topology::{scalar_string, AttributeValue, Entity, Topology};

/// Findings and faults from one network subtree.
#[derive(Debug, Default)]
struct SubtreeOutcome {
    findings: Vec<Finding>,
    faults: Vec<ProviderFault>,
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `topology` against `observed`.
    ///
    /// Returns `Ok` whenever every lookup succeeded, however many findings
    /// failed. If any lookup failed, the affected subtrees are skipped, the
    /// rest are still checked, and `ValidateError::Provider` carries both the
    /// faults and the partial report.
    pub async fn validate(
        &self,
        topology: &Topology,
        observed: Arc<dyn ObservedState>,
    ) -> Result<Report, ValidateError> {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::validation_span(&run_id);
        self.run(&run_id, topology, observed).instrument(span).await
    }

    async fn run(
        &self,
        run_id: &str,
        topology: &Topology,
        observed: Arc<dyn ObservedState>,
    ) -> Result<Report, ValidateError> {
        let started = Instant::now();
        obs::emit_validation_started(run_id, topology.networks().len(), topology.entity_count());

        let config = Arc::new(self.config.clone());
        let sem = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

        let mut tasks = Vec::new();
        for network in topology.networks().values() {
            let network = network.clone();
            let observed = Arc::clone(&observed);
            let config = Arc::clone(&config);
            let sem = Arc::clone(&sem);

            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    check_subtree(&network, observed.as_ref(), &config).await
                }
                .in_current_span(),
            );
            tasks.push(task);
        }

        let mut findings = Vec::new();
        let mut faults = Vec::new();
        for task in tasks {
            match task.await {
                Ok(outcome) => {
                    findings.extend(outcome.findings);
                    faults.extend(outcome.faults);
                }
                Err(join_err) if join_err.is_panic() => {
                    std::panic::resume_unwind(join_err.into_panic())
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "network validation task cancelled");
                }
            }
        }

        let report = Report::new(findings);
        faults.sort_by(|a, b| a.path.cmp(&b.path));

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        obs::emit_validation_finished(run_id, &report.summary(), faults.len(), duration_ms);

        if faults.is_empty() {
            Ok(report)
        } else {
            Err(ValidateError::Provider {
                faults,
                partial: report,
            })
        }
    }
}

/// Validate with an explicit config; shorthand for `Validator::new(config).validate(..)`.
pub async fn validate(
    topology: &Topology,
    observed: Arc<dyn ObservedState>,
    config: ValidatorConfig,
) -> Result<Report, ValidateError> {
    Validator::new(config).validate(topology, observed).await
}

/// Depth-first walk of one subtree. A fault stops the faulting entity and
/// everything below it; siblings continue.
async fn check_subtree(
    root: &Entity,
    observed: &dyn ObservedState,
    config: &ValidatorConfig,
) -> SubtreeOutcome {
    let mut outcome = SubtreeOutcome::default();
    let mut stack = vec![root];

    while let Some(entity) = stack.pop() {
        let (findings, fault) = check_entity(entity, observed, config).await;
        outcome.findings.extend(findings);
        match fault {
            None => stack.extend(entity.children().values()),
            Some(fault) => {
                obs::emit_provider_fault(&fault);
                outcome.faults.push(fault);
            }
        }
    }

    outcome
}

async fn check_entity(
    entity: &Entity,
    observed: &dyn ObservedState,
    config: &ValidatorConfig,
) -> (Vec<Finding>, Option<ProviderFault>) {
    let base = entity.path().output_key(&config.output_prefix);
    let mut findings = Vec::new();

    for (segments, expected) in entity.attributes().leaves() {
        let key = segments.iter().fold(base.clone(), |key, s| key.child(*s));

        let observed_value = match lookup(observed, &key, config.lookup_timeout).await {
            Ok(value) => value,
            Err(error) => {
                let fault = ProviderFault {
                    path: entity.path().clone(),
                    key: key.to_string(),
                    error,
                };
                return (findings, Some(fault));
            }
        };

        let finding = Finding {
            path: entity.path().clone(),
            attribute: segments.join("."),
            outcome: compare(expected, observed_value.as_ref(), config.list_mode),
            expected: expected.clone(),
            observed: observed_value,
        };
        obs::emit_finding(&finding);
        findings.push(finding);
    }

    (findings, None)
}

async fn lookup(
    observed: &dyn ObservedState,
    key: &OutputKey,
    timeout: Option<Duration>,
) -> ProvisionResult<Option<Value>> {
    let value = match timeout {
        Some(limit) => tokio::time::timeout(limit, observed.lookup(key))
            .await
            .map_err(|_| ProvisionerError::Timeout {
                key: key.to_string(),
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })??,
        None => observed.lookup(key).await?,
    };
    Ok(value.filter(|v| !v.is_null()))
}

/// Compare one declared value with an observed value.
///
/// Scalars use exact, case-sensitive equality with no trimming. Lists follow
/// `mode`. Nested sets match only if every leaf matches.
pub fn compare(expected: &AttributeValue, observed: Option<&Value>, mode: ListMode) -> Outcome {
    let Some(observed) = observed.filter(|v| !v.is_null()) else {
        return Outcome::Missing;
    };

    let matched = match expected {
        AttributeValue::Scalar(want) => scalar_string(observed).is_some_and(|got| &got == want),
        AttributeValue::List(want) => observed
            .as_array()
            .and_then(|items| items.iter().map(scalar_string).collect::<Option<Vec<_>>>())
            .is_some_and(|got| list_matches(want, &got, mode)),
        AttributeValue::Nested(set) => set.leaves().into_iter().all(|(segments, leaf)| {
            let inner = segments
                .iter()
                .try_fold(observed, |value, segment| value.get(*segment));
            compare(leaf, inner, mode) == Outcome::Match
        }),
    };

    if matched {
        Outcome::Match
    } else {
        Outcome::Mismatch
    }
}

fn list_matches(want: &[String], got: &[String], mode: ListMode) -> bool {
    match mode {
        ListMode::Exact => {
            let mut want = want.to_vec();
            let mut got = got.to_vec();
            want.sort();
            got.sort();
            want == got
        }
        ListMode::ContainsAll => want.iter().all(|w| got.contains(w)),
    }
}
