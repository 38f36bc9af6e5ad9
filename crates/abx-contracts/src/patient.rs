//! The patient case: the engine's only request-scoped input.
//!
//! A `PatientCase` is never persisted by the engine (see the audit module for
//! what *is* persisted). Free-text fields are bounded to 4 KiB per §6; the
//! bound is enforced by `RecommendationEngine::validate_case`, not here.

use serde::{Deserialize, Serialize};

/// Maximum length, in bytes, of any free-text field on a patient case.
pub const MAX_FREE_TEXT_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    M,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Ward,
    Icu,
    Ed,
    Community,
    Hospital,
    NursingHome,
}

/// Dialysis modality, when present, overrides a numeric CrCl band
/// unconditionally (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialysisModality {
    Hd,
    Cvvhdf,
}

/// Inputs sufficient to derive creatinine clearance via Cockcroft-Gault when
/// the caller does not supply `crcl` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatinineClearanceInputs {
    pub creatinine_mg_dl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultureResult {
    pub organism: Option<String>,
    pub susceptibilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientCase {
    pub age: u32,
    pub sex: Sex,
    pub weight_kg: f64,
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Directly supplied creatinine clearance in mL/min. When absent,
    /// `creatinine` must be present so the engine can derive it.
    #[serde(default)]
    pub crcl: Option<f64>,
    #[serde(default)]
    pub creatinine: Option<CreatinineClearanceInputs>,
    #[serde(default)]
    pub dialysis: Option<DialysisModality>,
    #[serde(default)]
    pub location: Option<Location>,
    pub infection_type: String,
    #[serde(default)]
    pub fever: bool,
    #[serde(default)]
    pub symptoms_text: Option<String>,
    #[serde(default)]
    pub allergies_text: Option<String>,
    #[serde(default)]
    pub prior_resistance: Vec<String>,
    /// Free-form risk markers, e.g. `mrsa_colonization`, `pregnancy_2nd_trimester`,
    /// `post_surgery`, `neutropenia`, `splenectomy`, `dialysis`,
    /// `central_line`, `hospital_onset_48h`, `mechanical_ventilation`,
    /// `aspiration_risk`.
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub current_outpatient_abx: Vec<String>,
    #[serde(default)]
    pub current_inpatient_abx: Vec<String>,
    #[serde(default)]
    pub culture: Option<CultureResult>,
}

impl PatientCase {
    pub fn has_risk_factor(&self, marker: &str) -> bool {
        self.risk_factors.iter().any(|f| f == marker)
    }

    pub fn is_pregnant(&self) -> bool {
        self.risk_factors.iter().any(|f| f.starts_with("pregnancy"))
    }

    /// The trimester token (e.g. `pregnancy_2nd_trimester`) if present, else
    /// `None` for an unqualified `pregnancy` flag.
    pub fn pregnancy_trimester(&self) -> Option<&str> {
        self.risk_factors
            .iter()
            .find(|f| f.starts_with("pregnancy_") && f.contains("trimester"))
            .map(|s| s.as_str())
    }

    pub fn is_elderly(&self) -> bool {
        self.age >= 75
    }

    pub fn has_neutropenia(&self) -> bool {
        self.has_risk_factor("neutropenia")
    }

    pub fn mrsa_risk(&self) -> bool {
        self.has_risk_factor("mrsa_colonization")
            || self.prior_resistance.iter().any(|r| r.eq_ignore_ascii_case("mrsa"))
            || (self.has_risk_factor("central_line") && self.location == Some(Location::Icu))
    }

    /// Every free-text field, for the 4 KiB size check in §6.
    pub fn free_text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(s) = &self.symptoms_text {
            out.push(("symptoms_text", s.as_str()));
        }
        if let Some(s) = &self.allergies_text {
            out.push(("allergies_text", s.as_str()));
        }
        out
    }
}
