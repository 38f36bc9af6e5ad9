//! Data model for the on-disk knowledge base: infection records, drug
//! records, and the three modifier tables (§3, §6).
//!
//! These types are pure data. Loading, validation, and querying live in the
//! `abx-kb` crate; this crate only fixes the shape every JSON file must
//! deserialize into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `route_required` on an infection's `classification_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRequirement {
    Iv,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Keyword triggers beyond the built-in promotion rules (§4.3), e.g.
    /// extra synonyms for this infection id.
    pub keyword_triggers: Vec<String>,
    pub route_required: Option<RouteRequirement>,
}

/// The allergy bucket a regimen is written for. `Any` matches regardless of
/// the patient's classified allergy severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergyStatus {
    NoAllergy,
    MildPcn,
    SeverePcn,
    Cephalosporin,
    Sulfa,
    Fluoroquinolone,
    Multiple,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regimen {
    pub allergy_status: Vec<AllergyStatus>,
    /// When present, this regimen is only offered to patients whose
    /// pregnancy trimester matches one of these tokens (e.g.
    /// `pregnancy_2nd_trimester`). Empty means "no pregnancy-specific
    /// restriction beyond the pregnancy contraindication filter".
    pub pregnancy_status: Vec<String>,
    pub mrsa_risk: Option<bool>,
    pub drug_ids: Vec<String>,
    pub rationale: String,
}

/// A KB-declared warning attached to an infection that always surfaces when
/// that infection is selected, independent of patient-specific warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalWarning {
    pub text: String,
    #[serde(default)]
    pub reduces_confidence: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfectionRecord {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub last_updated: String,
    #[serde(default)]
    pub classification_rules: ClassificationRules,
    pub regimens: Vec<Regimen>,
    #[serde(default)]
    pub critical_warnings: Vec<CriticalWarning>,
    pub default_duration: String,
}

/// A single dosing block: dose string as written in the KB (preserved
/// verbatim), frequency, route, and optional infusion/loading/max notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoseBlock {
    /// Verbatim dose expression, e.g. `"1 g"`, `"15-20 mg/kg"`.
    pub dose: String,
    pub frequency: String,
    pub route: String,
    pub infusion: Option<String>,
    pub loading_dose: Option<LoadingDose>,
    pub max_dose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingDose {
    /// Verbatim dose expression for the loading dose, e.g. `"25-30 mg/kg"`.
    pub dose: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Dosing {
    pub by_indication: HashMap<String, DoseBlock>,
    pub default: Option<DoseBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrclBandOverride {
    /// Inclusive lower bound in mL/min, or `None` for an open band such as
    /// `<10` or the dialysis bands.
    pub min: Option<f64>,
    /// Exclusive upper bound in mL/min, or `None` for an open band such as
    /// `>50`.
    pub max: Option<f64>,
    /// Band label matching `DoseCalculator`'s band names: `over_50`,
    /// `band_30_50`, `band_10_29`, `under_10_no_hd`, `hd`, `cvvhdf`.
    pub band: String,
    pub dose_override: Option<String>,
    pub frequency_override: Option<String>,
    /// `true` when the KB explicitly states no adjustment is needed for
    /// this band, satisfying invariant 4's escape hatch.
    #[serde(default)]
    pub no_adjustment: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenalAdjustment {
    pub required: bool,
    pub crcl_bands: Vec<CrclBandOverride>,
    pub monitoring_note: Option<String>,
}

/// Whether, and how, a drug overrides the default IBW/TBW/AdjBW
/// weight-selection rule (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightOverridePolicy {
    /// Use AdjBW whenever BMI is at or above the given threshold (tenths of
    /// a unit, e.g. `350` means BMI >= 35.0).
    AdjBwAboveBmiX10 { bmi_x10: u32 },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DrugRecord {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub last_updated: String,
    pub drug_class: String,
    pub routes: Vec<String>,
    #[serde(default)]
    pub spectrum_tags: Vec<String>,
    pub dosing: Dosing,
    #[serde(default)]
    pub renal_adjustment: RenalAdjustment,
    #[serde(default)]
    pub weight_override: Option<WeightOverridePolicy>,
    pub pregnancy_category: String,
    #[serde(default)]
    pub monitoring: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ── Modifier tables ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergySeverity {
    None,
    MildPcn,
    SeverePcn,
    Cephalosporin,
    Sulfa,
    Fluoroquinolone,
    Multiple,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllergyRule {
    pub severity: AllergySeverity,
    pub keyword_list: Vec<String>,
    #[serde(default)]
    pub allowed_classes: Vec<String>,
    pub forbidden_classes: Vec<String>,
    pub cross_reactivity_pct: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllergyRulesFile {
    pub version: String,
    pub last_updated: String,
    pub rules: Vec<AllergyRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PregnancyContraindication {
    pub severity: String,
    pub all_trimesters: bool,
    /// Only meaningful when `all_trimesters` is false: the trimester tokens
    /// this contraindication applies to.
    #[serde(default)]
    pub trimesters: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PregnancyRulesFile {
    pub version: String,
    pub last_updated: String,
    /// Keyed by drug id or drug class.
    pub contraindicated: HashMap<String, PregnancyContraindication>,
    #[serde(default)]
    pub preferred: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenalAdjustmentRulesFile {
    pub version: String,
    pub last_updated: String,
    /// Keyed by drug id; duplicates the per-drug `renal_adjustment` block on
    /// `DrugRecord` for drugs that need a KB-wide override table. In this
    /// implementation each drug's own `renal_adjustment` field is
    /// authoritative; this file exists for cross-referencing and future
    /// shared bands and is validated, not consulted, at request time.
    #[serde(default)]
    pub shared_bands: HashMap<String, Vec<CrclBandOverride>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexFile {
    pub loading_order: Vec<String>,
    #[serde(default)]
    pub cross_reference_rules: Vec<String>,
}
