use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::report::{Outcome, Report, ReportSummary};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// One finding in the persisted report artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingArtifact {
    pub path: String,
    pub attribute: String,
    pub outcome: Outcome,
    pub expected: Value,
    pub observed: Option<Value>,
}

/// Machine-readable validation report written for CI consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub report_digest: String,
    pub all_passed: bool,
    pub summary: ReportSummary,
    pub findings: Vec<FindingArtifact>,
}

impl ReportArtifact {
    pub fn new(report: &Report) -> Self {
        Self::at(report, Uuid::new_v4(), Utc::now())
    }

    /// Fixed id and timestamp, for reproducible artifacts.
    pub fn at(report: &Report, run_id: Uuid, generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at,
            run_id,
            report_digest: report.digest(),
            all_passed: report.all_passed(),
            summary: report.summary(),
            findings: report
                .findings()
                .iter()
                .map(|f| FindingArtifact {
                    path: f.path.to_string(),
                    attribute: f.attribute.clone(),
                    outcome: f.outcome,
                    expected: f.expected.to_json(),
                    observed: f.observed.clone(),
                })
                .collect(),
        }
    }
}

/// Write the report artifact as pretty JSON.
pub fn write_report_json(path: &Path, artifact: &ReportArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize report artifact")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write [`Report::format`] output as plain text.
pub fn write_report_text(path: &Path, report: &Report) -> Result<()> {
    std::fs::write(path, report.format()).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
