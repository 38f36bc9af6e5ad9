//! The audit record emitted per recommendation (§6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recommendation::{Provenance, RequestId};

/// De-identified snapshot of the inputs that drove a recommendation. Never
/// carries free text verbatim, and never carries any PHI deny-listed field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditInput {
    pub age: u32,
    pub sex: String,
    pub weight_kg: f64,
    pub infection_type: String,
    pub risk_factor_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub request_id: RequestId,
    pub status: String,
    pub input: AuditInput,
    pub infection_category: Option<String>,
    pub allergy_classification: Option<String>,
    pub pregnancy_state: bool,
    pub renal_band: Option<String>,
    pub chosen_drug_ids: Vec<String>,
    pub confidence: Option<f64>,
    pub duration_ms: u64,
    pub provenance: Option<Provenance>,
    pub error: Option<AuditError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditError {
    pub code: String,
    pub message: String,
}
