//! Error taxonomy for the antibiotic recommendation engine.
//!
//! All fallible operations across the `abx-*` crates return `AbxResult<T>`.
//! Error variants carry enough context to produce actionable audit entries
//! and to let a human reviewer see which filter, file, or field failed.

use thiserror::Error;

/// The unified error type for the recommendation engine.
#[derive(Debug, Error)]
pub enum AbxError {
    /// The knowledge base failed to load or validate. Carries every failing
    /// file and field found in a single pass — partial loads are forbidden.
    #[error("knowledge base load error: {0:?}")]
    KbLoadError(Vec<String>),

    /// `get_infection` was called with an id absent from the loaded KB.
    #[error("unknown infection id: {id}")]
    UnknownInfection { id: String },

    /// `get_drug` was called with an id absent from the loaded KB.
    #[error("unknown drug id: {id}")]
    UnknownDrug { id: String },

    /// The infection classifier could not map the normalized infection type
    /// to any category known to the knowledge base.
    #[error("could not classify infection type: {normalized}")]
    UnclassifiedInfection { normalized: String },

    /// No regimen in the infection record survived the allergy, pregnancy,
    /// and route filters.
    #[error("no surviving regimen for {infection_category}: {reason}")]
    NoRegimen {
        infection_category: String,
        reason: String,
    },

    /// Neither `by_indication` nor `default` dosing exists for a chosen drug.
    #[error("no dose defined for drug '{drug_id}' under indication '{indication_tag}'")]
    NoDose {
        drug_id: String,
        indication_tag: String,
    },

    /// The drug requires renal adjustment but has no override for the
    /// computed creatinine-clearance band.
    #[error("renal adjustment band missing for drug '{drug_id}', band '{band}'")]
    RenalBandMissing { drug_id: String, band: String },

    /// The patient case is missing required fields or violates a field-size
    /// limit.
    #[error("malformed patient case: {reason}")]
    BadCase { reason: String },

    /// A submitted error report's `patient_case` contained a deny-listed PHI
    /// field.
    #[error("patient_case contains a disallowed field: {field}")]
    PhiField { field: String },

    /// An error report status update requested a transition the state
    /// machine does not allow.
    #[error("illegal status transition: {from} -> {to}")]
    BadStatusTransition { from: String, to: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An I/O failure while reading or writing audit logs or error reports.
    /// Transient: callers must not let this suppress a successful
    /// recommendation response.
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl AbxError {
    /// The machine-readable code drawn from the error taxonomy (§7), e.g.
    /// `ERR_NO_REGIMEN`. Transport layers serialize `{code, message}` from
    /// this and `Display` without re-deriving either.
    pub fn code(&self) -> &'static str {
        match self {
            AbxError::KbLoadError(_) => "KB_LOAD_ERROR",
            AbxError::UnknownInfection { .. } => "ERR_UNKNOWN_INFECTION",
            AbxError::UnknownDrug { .. } => "ERR_UNKNOWN_DRUG",
            AbxError::UnclassifiedInfection { .. } => "ERR_UNCLASSIFIED_INFECTION",
            AbxError::NoRegimen { .. } => "ERR_NO_REGIMEN",
            AbxError::NoDose { .. } => "ERR_NO_DOSE",
            AbxError::RenalBandMissing { .. } => "ERR_RENAL_BAND_MISSING",
            AbxError::BadCase { .. } => "ERR_BAD_CASE",
            AbxError::PhiField { .. } => "ERR_PHI_FIELD",
            AbxError::BadStatusTransition { .. } => "ERR_BAD_STATUS_TRANSITION",
            AbxError::ConfigError { .. } => "ERR_CONFIG",
            AbxError::Io { .. } => "ERR_IO",
        }
    }
}

impl From<std::io::Error> for AbxError {
    fn from(err: std::io::Error) -> Self {
        AbxError::Io {
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the `abx-*` crates.
pub type AbxResult<T> = Result<T, AbxError>;
