//! Validation findings and the aggregated report.
//!
//! A [`Report`] is the sole output of a validation run. Findings are kept
//! sorted by `(path, attribute)` so that two runs over the same inputs
//! produce byte-identical [`Report::format`] output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::topology::{AttributeValue, EntityPath};

/// Outcome of comparing one declared attribute with observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Match,
    Mismatch,
    Missing,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Outcome::Match => "ok",
            Outcome::Mismatch => "mismatch",
            Outcome::Missing => "missing",
        }
    }
}

/// One `(EntityPath, attribute)` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub path: EntityPath,
    /// Dotted for nested attributes, e.g. `serviceDelegation.name`.
    pub attribute: String,
    pub outcome: Outcome,
    pub expected: AttributeValue,
    /// `None` when the observed state had no value.
    pub observed: Option<Value>,
}

impl Finding {
    pub fn is_failure(&self) -> bool {
        self.outcome != Outcome::Match
    }

    fn render_observed(&self) -> String {
        match &self.observed {
            Some(v) => v.to_string(),
            None => "<not found>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.attribute.cmp(&b.attribute))
        });
        Self { findings }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings whose outcome is not `Match`.
    pub fn failures(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.is_failure()).collect()
    }

    /// True iff [`Report::failures`] is empty.
    pub fn all_passed(&self) -> bool {
        !self.findings.iter().any(Finding::is_failure)
    }

    pub fn findings_at(&self, path: &EntityPath) -> Vec<&Finding> {
        self.findings.iter().filter(|f| &f.path == path).collect()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.findings.len(),
            ..ReportSummary::default()
        };
        for finding in &self.findings {
            match finding.outcome {
                Outcome::Match => summary.matched += 1,
                Outcome::Mismatch => summary.mismatched += 1,
                Outcome::Missing => summary.missing += 1,
            }
        }
        summary
    }

    /// Human-readable summary grouped by entity path.
    ///
    /// ```text
    /// 3 finding(s): 2 matched, 1 mismatched, 0 missing
    /// vnet1
    ///   [ok]       addressSpace = ["10.0.0.0/16"]
    ///   [ok]       name = "vnet-one"
    /// vnet1/subnet1
    ///   [mismatch] addressPrefixes: expected ["10.0.1.0/24"], observed ["10.0.2.0/24"]
    /// ```
    pub fn format(&self) -> String {
        let summary = self.summary();
        let mut out = format!(
            "{} finding(s): {} matched, {} mismatched, {} missing\n",
            summary.total, summary.matched, summary.mismatched, summary.missing
        );

        let mut current: Option<&EntityPath> = None;
        for finding in &self.findings {
            if current != Some(&finding.path) {
                out.push_str(&format!("{}\n", finding.path));
                current = Some(&finding.path);
            }
            let tag = format!("[{}]", finding.outcome.label());
            match finding.outcome {
                Outcome::Match => out.push_str(&format!(
                    "  {tag:<10} {} = {}\n",
                    finding.attribute, finding.expected
                )),
                Outcome::Mismatch | Outcome::Missing => out.push_str(&format!(
                    "  {tag:<10} {}: expected {}, observed {}\n",
                    finding.attribute,
                    finding.expected,
                    finding.render_observed()
                )),
            }
        }
        out
    }

    /// SHA-256 of [`Report::format`], for golden comparison across runs.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.format().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::EntityKind;
    use serde_json::json;

    fn finding(path: &[&str], attribute: &str, outcome: Outcome) -> Finding {
        let mut p = EntityPath::root();
        for (depth, key) in path.iter().enumerate() {
            let kind = match depth {
                0 => EntityKind::Network,
                1 => EntityKind::Subnetwork,
                _ => EntityKind::Delegation,
            };
            p = p.child(kind, *key);
        }
        Finding {
            path: p,
            attribute: attribute.to_string(),
            outcome,
            expected: AttributeValue::Scalar("x".to_string()),
            observed: match outcome {
                Outcome::Missing => None,
                Outcome::Match => Some(json!("x")),
                Outcome::Mismatch => Some(json!("y")),
            },
        }
    }

    #[test]
    fn test_all_passed_iff_no_failures() {
        let ok = Report::new(vec![finding(&["v"], "name", Outcome::Match)]);
        assert!(ok.all_passed());
        assert!(ok.failures().is_empty());

        let bad = Report::new(vec![
            finding(&["v"], "name", Outcome::Match),
            finding(&["v"], "location", Outcome::Missing),
        ]);
        assert!(!bad.all_passed());
        assert_eq!(bad.failures().len(), 1);
    }

    #[test]
    fn test_empty_report_passes() {
        assert!(Report::default().all_passed());
        assert_eq!(Report::default().summary().total, 0);
    }

    #[test]
    fn test_ordering_independent_of_insertion() {
        let a = finding(&["vnet2"], "name", Outcome::Match);
        let b = finding(&["vnet1", "s1"], "name", Outcome::Mismatch);
        let c = finding(&["vnet1"], "name", Outcome::Match);
        let r1 = Report::new(vec![a.clone(), b.clone(), c.clone()]);
        let r2 = Report::new(vec![c, a, b]);
        assert_eq!(r1, r2);
        assert_eq!(r1.format(), r2.format());
        assert_eq!(r1.digest(), r2.digest());
    }

    #[test]
    fn test_format_groups_by_path() {
        let report = Report::new(vec![
            finding(&["vnet1", "s1"], "nsgName", Outcome::Missing),
            finding(&["vnet1"], "name", Outcome::Match),
            finding(&["vnet1", "s1"], "name", Outcome::Mismatch),
        ]);
        let text = report.format();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3 finding(s): 1 matched, 1 mismatched, 1 missing");
        assert_eq!(lines[1], "vnet1");
        assert_eq!(lines[2], r#"  [ok]       name = "x""#);
        assert_eq!(lines[3], "vnet1/s1");
        assert_eq!(
            lines[4],
            r#"  [mismatch] name: expected "x", observed "y""#
        );
        assert_eq!(
            lines[5],
            r#"  [missing]  nsgName: expected "x", observed <not found>"#
        );
    }
}
