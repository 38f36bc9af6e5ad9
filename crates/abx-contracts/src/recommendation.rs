//! The recommendation record (§3) and its request/provenance scaffolding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditError;

/// Version of the recommendation engine's decision logic, distinct from the
/// per-file versions tracked in `Provenance`. Required on every response
/// (§6).
pub const ENGINE_VERSION: &str = "1.0.0";

/// Unique identifier for a single recommendation request. Newtype over
/// `Uuid` so request ids can't be confused with drug or infection ids at the
/// type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One drug within a chosen regimen, fully dosed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenDrug {
    pub drug_id: String,
    /// Verbatim dose string as resolved (post renal-adjustment), e.g.
    /// `"1 g"` or `"15-20 mg/kg (1200-1600 mg)"`.
    pub dose: String,
    pub frequency: String,
    pub route: String,
    pub loading_dose: Option<String>,
    pub monitoring: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenRegimen {
    pub drugs: Vec<ChosenDrug>,
    pub total_duration: String,
    pub indication_tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub infection_file_version: String,
    pub drug_file_versions: std::collections::BTreeMap<String, String>,
    pub modifier_versions: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub request_id: RequestId,
    pub engine_version: String,
    pub infection_category: String,
    pub allergy_classification: String,
    pub pregnancy_state: bool,
    pub chosen_regimen: ChosenRegimen,
    pub warnings: Vec<String>,
    pub confidence: f64,
    pub provenance: Provenance,
    pub emitted_at: DateTime<Utc>,
}

/// Status discriminant for `RecommendationResponse` (§6: "either `status:
/// ok` or `status: error` with a structured `error` object").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// The outer envelope a caller outside the engine (the demo CLI today, a
/// transport later) actually receives: `request_id`, `engine_version`, and
/// `provenance` are present on every response per §6, with either a
/// populated `recommendation` or a structured `error`, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: RequestId,
    pub engine_version: String,
    pub status: ResponseStatus,
    pub provenance: Option<Provenance>,
    pub recommendation: Option<Recommendation>,
    pub error: Option<AuditError>,
}

impl RecommendationResponse {
    pub fn ok(recommendation: Recommendation) -> Self {
        RecommendationResponse {
            request_id: recommendation.request_id,
            engine_version: recommendation.engine_version.clone(),
            status: ResponseStatus::Ok,
            provenance: Some(recommendation.provenance.clone()),
            recommendation: Some(recommendation),
            error: None,
        }
    }

    pub fn error(request_id: RequestId, error: AuditError) -> Self {
        RecommendationResponse {
            request_id,
            engine_version: ENGINE_VERSION.to_string(),
            status: ResponseStatus::Error,
            provenance: None,
            recommendation: None,
            error: Some(error),
        }
    }
}
