//! `InfectionClassifier` (§4.3): patient case → canonical infection
//! category known to the KB.

use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::patient::PatientCase;
use abx_kb::KnowledgeBase;

fn normalize(infection_type: &str) -> String {
    let lowered = infection_type.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    let trimmed = stripped.trim().to_string();
    match trimmed.as_str() {
        "uti" | "urinary tract infection" | "urinary_tract_infection" => "uti".to_string(),
        other => other.replace(' ', "_"),
    }
}

fn symptoms_suggest_fever(case: &PatientCase) -> bool {
    case.fever
        || case
            .symptoms_text
            .as_deref()
            .map(|s| {
                let lower = s.to_lowercase();
                ["fever", "febrile", "flank pain"]
                    .iter()
                    .any(|kw| lower.contains(kw))
            })
            .unwrap_or(false)
}

/// Apply the §4.3 promotion rules, in order, first match wins.
pub fn classify(case: &PatientCase, kb: &KnowledgeBase) -> AbxResult<String> {
    let normalized = normalize(&case.infection_type);

    if normalized == "uti" {
        return Ok(if symptoms_suggest_fever(case) {
            "pyelonephritis".to_string()
        } else {
            "cystitis".to_string()
        });
    }

    if normalized == "bacteremia" && case.mrsa_risk() {
        return Ok("bacteremia_mrsa".to_string());
    }

    if normalized == "pneumonia" {
        return Ok(if case.has_risk_factor("hospital_onset_48h") {
            "hap".to_string()
        } else if case.has_risk_factor("mechanical_ventilation") {
            "vap".to_string()
        } else if case.has_risk_factor("aspiration_risk") {
            "aspiration".to_string()
        } else {
            "cap".to_string()
        });
    }

    if kb.infection_ids().any(|id| id == normalized) {
        return Ok(normalized);
    }

    Err(AbxError::UnclassifiedInfection { normalized })
}
