//! In-memory fake provisioner (testing only)
//!
//! `MemoryProvisioner` satisfies the `Provisioner` contract without any
//! external tooling. By default a deploy "succeeds perfectly": the deployed
//! document becomes the observed outputs. Tests then perturb the outputs to
//! simulate drift, missing resources, slow or failing backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ProvisionerError;
use crate::provisioner::{resolve, ObservedState, OutputKey, ProvisionResult, Provisioner};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory provisioner backed by a single JSON outputs document.
#[derive(Debug)]
pub struct MemoryProvisioner {
    outputs: Mutex<Value>,
    deployments: Mutex<Vec<Value>>,
    failing: Mutex<Vec<OutputKey>>,
    deploy_failure: Mutex<Option<String>>,
    latency: Option<Duration>,
    mirror_on_deploy: bool,
    lookups: AtomicUsize,
}

impl Default for MemoryProvisioner {
    fn default() -> Self {
        Self {
            outputs: Mutex::new(Value::Object(Map::new())),
            deployments: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            deploy_failure: Mutex::new(None),
            latency: None,
            mirror_on_deploy: true,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl MemoryProvisioner {
    /// A provisioner whose outputs mirror whatever is deployed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provisioner with fixed outputs. Deploys are recorded but do not
    /// replace these outputs.
    pub fn with_outputs(outputs: Value) -> Self {
        Self {
            outputs: Mutex::new(outputs),
            mirror_on_deploy: false,
            ..Self::default()
        }
    }

    /// Delay every lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Snapshot of the current outputs document.
    pub fn outputs(&self) -> Value {
        locked(&self.outputs).clone()
    }

    /// Set the value at `key`, creating intermediate objects as needed.
    pub fn set_output(&self, key: &OutputKey, value: Value) {
        let mut outputs = locked(&self.outputs);
        let mut current = &mut *outputs;
        for segment in key.segments() {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
                _ => return,
            };
        }
        *current = value;
    }

    /// Remove the value at `key`, returning it if it was present.
    ///
    /// Only object fields can be removed.
    pub fn remove_output(&self, key: &OutputKey) -> Option<Value> {
        let (last, parents) = key.segments().split_last()?;
        let mut outputs = locked(&self.outputs);
        let mut current = &mut *outputs;
        for segment in parents {
            current = current.get_mut(segment.as_str())?;
        }
        current.as_object_mut()?.remove(last)
    }

    /// Make every lookup at or below `prefix` fail with `Unavailable`.
    pub fn fail_lookups_under(&self, prefix: OutputKey) {
        locked(&self.failing).push(prefix);
    }

    /// Make the next deploys fail with `reason`.
    pub fn fail_deploy(&self, reason: impl Into<String>) {
        *locked(&self.deploy_failure) = Some(reason.into());
    }

    /// Every document passed to `deploy`, in call order.
    pub fn deployments(&self) -> Vec<Value> {
        locked(&self.deployments).clone()
    }

    /// Number of `lookup` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObservedState for MemoryProvisioner {
    async fn lookup(&self, key: &OutputKey) -> ProvisionResult<Option<Value>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if locked(&self.failing).iter().any(|p| key.starts_with(p)) {
            return Err(ProvisionerError::Unavailable {
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let outputs = locked(&self.outputs);
        Ok(resolve(&outputs, key).cloned())
    }
}

#[async_trait]
impl Provisioner for MemoryProvisioner {
    async fn deploy(&self, document: &Value) -> ProvisionResult<()> {
        locked(&self.deployments).push(document.clone());

        if let Some(reason) = locked(&self.deploy_failure).clone() {
            return Err(ProvisionerError::Deploy(reason));
        }

        if self.mirror_on_deploy {
            *locked(&self.outputs) = document.clone();
        }
        debug!(mirrored = self.mirror_on_deploy, "memory provisioner deployed document");
        Ok(())
    }
}
