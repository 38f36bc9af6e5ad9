//! `ErrorReportStore`: append-only intake for reviewer-submitted errors, plus
//! the constrained status machine that feeds the learning loop.
//!
//! Storage format: JSON Lines, one object per line, files named
//! `YYYY-MM-DD.jsonl` under the store's directory. A report's `error_id`
//! embeds the date it was filed under (`ERR-YYYYMMDD-<8 hex>`), so looking
//! it back up never requires scanning every file in the directory.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::error_report::{
    ErrorReport, ErrorType, ListFilters, ReportStatus, Severity, PHI_DENY_LIST,
};

/// Everything the caller supplies when filing a new report; the store fills
/// in `error_id`, `status`, and `created_at`.
#[derive(Debug, Clone)]
pub struct NewErrorReport {
    pub severity: Severity,
    pub error_type: ErrorType,
    pub description: String,
    pub expected: String,
    pub reporter: Option<String>,
    pub patient_case: serde_json::Value,
    pub recommendation_given: serde_json::Value,
}

pub struct ErrorReportStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

fn contains_phi_key(value: &serde_json::Value) -> Option<&'static str> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, nested) in map {
                if let Some(denied) = PHI_DENY_LIST.iter().find(|d| d.eq_ignore_ascii_case(key)) {
                    return Some(denied);
                }
                if let Some(found) = contains_phi_key(nested) {
                    return Some(found);
                }
            }
            None
        }
        serde_json::Value::Array(items) => items.iter().find_map(contains_phi_key),
        _ => None,
    }
}

impl ErrorReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> AbxResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ErrorReportStore {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn day_file(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", date))
    }

    /// Extract the `YYYYMMDD` segment embedded in an `error_id` and render
    /// it as the `YYYY-MM-DD` the day-file is named after.
    fn date_segment(error_id: &str) -> AbxResult<String> {
        let parts: Vec<&str> = error_id.split('-').collect();
        if parts.len() != 3 || parts[0] != "ERR" || parts[1].len() != 8 {
            return Err(AbxError::Io {
                reason: format!("malformed error_id: {}", error_id),
            });
        }
        let raw = parts[1];
        Ok(format!(
            "{}-{}-{}",
            &raw[0..4],
            &raw[4..6],
            &raw[6..8]
        ))
    }

    pub fn submit(&self, input: NewErrorReport) -> AbxResult<ErrorReport> {
        if let Some(field) = contains_phi_key(&input.patient_case) {
            return Err(AbxError::PhiField {
                field: field.to_string(),
            });
        }

        let now = Utc::now();
        let date = now.format("%Y%m%d").to_string();
        let hex = Uuid::new_v4().simple().to_string();
        let error_id = format!("ERR-{}-{}", date, &hex[..8]);

        let report = ErrorReport {
            error_id: error_id.clone(),
            status: ReportStatus::New,
            severity: input.severity,
            error_type: input.error_type,
            description: input.description,
            expected: input.expected,
            reporter: input.reporter,
            patient_case: input.patient_case,
            recommendation_given: input.recommendation_given,
            created_at: now,
            status_updated_at: None,
        };

        let _guard = self.lock.lock().map_err(|e| AbxError::Io {
            reason: format!("error report store lock poisoned: {}", e),
        })?;

        let line = serde_json::to_string(&report).map_err(|e| AbxError::Io {
            reason: format!("failed to serialize error report: {}", e),
        })?;
        let path = self.day_file(&now.format("%Y-%m-%d").to_string());
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;

        if matches!(report.severity, Severity::Critical) {
            error!(error_id = %error_id, "critical error report submitted");
        } else {
            info!(error_id = %error_id, severity = ?report.severity, "error report submitted");
        }

        Ok(report)
    }

    fn read_day_file(path: &Path) -> AbxResult<Vec<ErrorReport>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        let mut reports = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let report: ErrorReport = serde_json::from_str(line).map_err(|e| AbxError::Io {
                reason: format!("malformed error report at {}:{}: {}", path.display(), line_no + 1, e),
            })?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Lists reports across every day-file in the store directory, newest
    /// first, applying `filters` and its `effective_limit()`.
    pub fn list(&self, filters: &ListFilters) -> AbxResult<Vec<ErrorReport>> {
        let _guard = self.lock.lock().map_err(|e| AbxError::Io {
            reason: format!("error report store lock poisoned: {}", e),
        })?;

        let mut day_files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "jsonl").unwrap_or(false))
            .collect();
        day_files.sort();
        day_files.reverse();

        let mut matched = Vec::new();
        for path in day_files {
            let mut reports = Self::read_day_file(&path)?;
            reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            for report in reports {
                if filters.matches(&report) {
                    matched.push(report);
                    if matched.len() >= filters.effective_limit() {
                        return Ok(matched);
                    }
                }
            }
        }
        Ok(matched)
    }

    /// Rewrites the day-file containing `error_id` atomically
    /// (write-temp-then-rename), updating the single matching record.
    pub fn update_status(&self, error_id: &str, new_status: ReportStatus) -> AbxResult<ErrorReport> {
        let date = Self::date_segment(error_id)?;
        let path = self.day_file(&date);

        let _guard = self.lock.lock().map_err(|e| AbxError::Io {
            reason: format!("error report store lock poisoned: {}", e),
        })?;

        let mut reports = Self::read_day_file(&path)?;
        let idx = reports
            .iter()
            .position(|r| r.error_id == error_id)
            .ok_or_else(|| AbxError::Io {
                reason: format!("unknown error_id: {}", error_id),
            })?;

        if !reports[idx].status.can_transition_to(new_status) {
            return Err(AbxError::BadStatusTransition {
                from: format!("{:?}", reports[idx].status),
                to: format!("{:?}", new_status),
            });
        }

        reports[idx].status = new_status;
        reports[idx].status_updated_at = Some(Utc::now());
        let updated = reports[idx].clone();

        let tmp_path = path.with_extension("jsonl.tmp");
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            for report in &reports {
                let line = serde_json::to_string(report).map_err(|e| AbxError::Io {
                    reason: format!("failed to serialize error report: {}", e),
                })?;
                writeln!(tmp, "{}", line)?;
            }
        }
        fs::rename(&tmp_path, &path)?;

        info!(error_id = %error_id, new_status = ?new_status, "error report status updated");
        Ok(updated)
    }
}
