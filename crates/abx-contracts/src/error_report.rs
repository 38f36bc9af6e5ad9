//! The error report record and its status state machine (§3, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    Verified,
    InProgress,
    Fixed,
    Closed,
    WontFix,
    NotReproduced,
}

impl ReportStatus {
    /// The state machine from §4.7: `(from, to)` pairs that are legal.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        if self == next {
            // Idempotent update: P8 requires this to be a no-op, not an error.
            return true;
        }
        matches!(
            (self, next),
            (New, Verified)
                | (New, NotReproduced)
                | (New, WontFix)
                | (Verified, InProgress)
                | (Verified, WontFix)
                | (InProgress, Fixed)
                | (InProgress, WontFix)
                | (Fixed, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReportStatus::Closed | ReportStatus::WontFix | ReportStatus::NotReproduced
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Contraindicated,
    WrongDrug,
    WrongDose,
    MissedAllergy,
    MissedInteraction,
    WrongRoute,
    Other,
}

/// Field names that may never appear as keys inside a submitted
/// `patient_case` (§4.7 de-identification deny-list).
pub const PHI_DENY_LIST: &[&str] = &["name", "mrn", "dob", "admission_date"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_id: String,
    pub status: ReportStatus,
    pub severity: Severity,
    pub error_type: ErrorType,
    pub description: String,
    pub expected: String,
    #[serde(default)]
    pub reporter: Option<String>,
    /// De-identified patient case, represented as a JSON object so the
    /// store can scan its keys against `PHI_DENY_LIST` without coupling to
    /// the full `PatientCase` type.
    pub patient_case: serde_json::Value,
    pub recommendation_given: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status_updated_at: Option<DateTime<Utc>>,
}

/// Filters accepted by `ErrorReportStore::list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub status: Option<ReportStatus>,
    pub severity: Option<Severity>,
    pub error_type: Option<ErrorType>,
    pub limit: Option<usize>,
}

impl ListFilters {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(50)
    }

    pub fn matches(&self, report: &ErrorReport) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if report.severity != severity {
                return false;
            }
        }
        if let Some(error_type) = self.error_type {
            if report.error_type != error_type {
                return false;
            }
        }
        true
    }
}
