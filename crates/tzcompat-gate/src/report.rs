//! Validation report
//!
//! Collects the outcome of each check so a single run can show every
//! failure, not only the first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tzcompat_core::ErrorKind;

/// Single check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    /// Error class when the check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl Check {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            message: message.into(),
            error: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>, error: ErrorKind) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            message: message.into(),
            error: Some(error),
        }
    }
}

/// Overall outcome of a validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Trace id for correlating logs with this run
    pub trace_id: String,

    pub checked_at: DateTime<Utc>,

    /// "PASS" | "FAIL"
    pub verdict: String,

    pub checks: Vec<Check>,

    /// Digest of the version file preamble, when it could be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_digest: Option<String>,

    pub summary: String,
}

impl ValidationReport {
    pub(crate) fn from_checks(checks: Vec<Check>, descriptor_digest: Option<String>) -> Self {
        let failed: Vec<&str> = checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .map(|c| c.name.as_str())
            .collect();

        let (verdict, summary) = if failed.is_empty() {
            ("PASS", "All checks passed".to_string())
        } else {
            ("FAIL", format!("Failed: {}", failed.join(", ")))
        };

        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            checked_at: Utc::now(),
            verdict: verdict.to_string(),
            checks,
            descriptor_digest,
            summary,
        }
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status == CheckStatus::Pass)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.verdict, self.summary)?;
        for check in &self.checks {
            let mark = match check.status {
                CheckStatus::Pass => "ok",
                CheckStatus::Fail => "FAIL",
            };
            writeln!(f, "  [{}] {}: {}", mark, check.name, check.message)?;
        }
        if let Some(digest) = &self.descriptor_digest {
            writeln!(f, "  preamble {}", digest)?;
        }
        write!(f, "  trace {}", self.trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_checks() {
        let report = ValidationReport::from_checks(
            vec![
                Check::pass("compatibility", "release 34 (UPSIDE_DOWN_CAKE) expects 007"),
                Check::fail("tzdb_consistency", "icu disagrees", ErrorKind::Inconsistency),
            ],
            None,
        );

        assert!(!report.passed());
        assert_eq!(report.verdict, "FAIL");
        assert_eq!(report.summary, "Failed: tzdb_consistency");
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let report = ValidationReport::from_checks(
            vec![Check::pass("compatibility", "ok")],
            Some("blake3:abc".to_string()),
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["verdict"], "PASS");
        assert_eq!(value["checks"][0]["status"], "PASS");
        assert!(value["checks"][0].get("error").is_none());
        assert_eq!(value["descriptor_digest"], "blake3:abc");
    }

    #[test]
    fn test_display_lists_checks() {
        let report = ValidationReport::from_checks(
            vec![Check::fail("compatibility", "mismatch", ErrorKind::Compatibility)],
            None,
        );
        let text = report.to_string();
        assert!(text.starts_with("FAIL"));
        assert!(text.contains("[FAIL] compatibility: mismatch"));
    }
}
