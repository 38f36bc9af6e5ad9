//! `DrugSelector` (§4.4): candidate regimens → safety filters → chosen
//! regimen. Every filter here is a pure function; composition is linear and
//! auditable (§9).

use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::kb::{AllergyStatus, InfectionRecord, Regimen, RouteRequirement};
use abx_contracts::patient::PatientCase;
use abx_kb::KnowledgeBase;

use crate::classify::allergy::AllergyClassification;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRegimen {
    pub drug_ids: Vec<String>,
    pub indication_tag: String,
    pub preferred_route: String,
    pub rationale: String,
    /// Whether a pregnancy-specific regimen variant existed and matched
    /// (used by the engine's confidence scoring, §4.6 step 5).
    pub matched_pregnancy_specific: bool,
}

fn allergy_status_for(severity: abx_contracts::kb::AllergySeverity) -> AllergyStatus {
    use abx_contracts::kb::AllergySeverity as S;
    match severity {
        S::None => AllergyStatus::NoAllergy,
        S::MildPcn => AllergyStatus::MildPcn,
        S::SeverePcn => AllergyStatus::SeverePcn,
        S::Cephalosporin => AllergyStatus::Cephalosporin,
        S::Sulfa => AllergyStatus::Sulfa,
        S::Fluoroquinolone => AllergyStatus::Fluoroquinolone,
        S::Multiple => AllergyStatus::Multiple,
    }
}

fn regimen_matches_allergy(regimen: &Regimen, status: AllergyStatus) -> bool {
    regimen
        .allergy_status
        .iter()
        .any(|s| *s == status || *s == AllergyStatus::Any)
}

fn regimen_contains_forbidden_drug(
    regimen: &Regimen,
    kb: &KnowledgeBase,
    forbidden_classes: &[String],
) -> AbxResult<bool> {
    for drug_id in &regimen.drug_ids {
        let drug = kb.get_drug(drug_id)?;
        if forbidden_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&drug.drug_class))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn regimen_contraindicated_in_pregnancy(
    regimen: &Regimen,
    kb: &KnowledgeBase,
    trimester: Option<&str>,
) -> AbxResult<bool> {
    let rules = kb.pregnancy_rules();
    for drug_id in &regimen.drug_ids {
        let drug = kb.get_drug(drug_id)?;
        let lookups = [drug_id.as_str(), drug.drug_class.as_str()];
        for key in lookups {
            if let Some(c) = rules.contraindicated.get(key) {
                if c.all_trimesters {
                    return Ok(true);
                }
                if let Some(t) = trimester {
                    if c.trimesters.iter().any(|x| x == t) {
                        return Ok(true);
                    }
                }
            }
        }
    }
    Ok(false)
}

/// Chosen route for a single drug under an IV-required infection: IV if the
/// drug offers it, else the drug's first listed route.
fn chosen_route_for_drug(routes: &[String]) -> &str {
    routes
        .iter()
        .find(|r| r.eq_ignore_ascii_case("iv"))
        .or_else(|| routes.first())
        .map(|s| s.as_str())
        .unwrap_or("")
}

fn regimen_route_ok(regimen: &Regimen, kb: &KnowledgeBase, route_required: RouteRequirement) -> AbxResult<bool> {
    if route_required != RouteRequirement::Iv {
        return Ok(true);
    }
    for drug_id in &regimen.drug_ids {
        let drug = kb.get_drug(drug_id)?;
        if !chosen_route_for_drug(&drug.routes).eq_ignore_ascii_case("iv") {
            return Ok(false);
        }
    }
    Ok(true)
}

fn regimen_mrsa_ok(regimen: &Regimen, case: &PatientCase) -> bool {
    match regimen.mrsa_risk {
        None => true,
        Some(required) => required == case.mrsa_risk(),
    }
}

pub fn select(
    kb: &KnowledgeBase,
    infection: &InfectionRecord,
    allergy: &AllergyClassification,
    case: &PatientCase,
) -> AbxResult<SelectedRegimen> {
    let status = allergy_status_for(allergy.severity);
    let route_required = infection
        .classification_rules
        .route_required
        .unwrap_or(RouteRequirement::Any);

    let mut removed_by: Vec<String> = Vec::new();
    let mut matched_pregnancy_specific = false;

    for regimen in &infection.regimens {
        if !regimen_matches_allergy(regimen, status) {
            continue;
        }
        if regimen_contains_forbidden_drug(regimen, kb, &allergy.forbidden_classes)? {
            removed_by.push(format!(
                "regimen '{}' removed: contains a drug in a forbidden class for allergy '{:?}'",
                regimen.drug_ids.join("+"),
                status
            ));
            continue;
        }
        if case.is_pregnant()
            && regimen_contraindicated_in_pregnancy(regimen, kb, case.pregnancy_trimester())?
        {
            removed_by.push(format!(
                "regimen '{}' removed: contraindicated in pregnancy",
                regimen.drug_ids.join("+")
            ));
            continue;
        }
        if !regimen_route_ok(regimen, kb, route_required)? {
            removed_by.push(format!(
                "regimen '{}' removed: does not satisfy route_required=IV",
                regimen.drug_ids.join("+")
            ));
            continue;
        }
        if !regimen_mrsa_ok(regimen, case) {
            removed_by.push(format!(
                "regimen '{}' removed: mrsa_risk mismatch",
                regimen.drug_ids.join("+")
            ));
            continue;
        }

        if case.is_pregnant() && !regimen.pregnancy_status.is_empty() {
            if let Some(t) = case.pregnancy_trimester() {
                matched_pregnancy_specific = regimen.pregnancy_status.iter().any(|p| p == t);
            }
        }

        let preferred_route = regimen
            .drug_ids
            .iter()
            .filter_map(|id| kb.get_drug(id).ok())
            .map(|d| chosen_route_for_drug(&d.routes).to_string())
            .find(|r| r.eq_ignore_ascii_case("iv"))
            .unwrap_or_else(|| "po".to_string());

        return Ok(SelectedRegimen {
            drug_ids: regimen.drug_ids.clone(),
            indication_tag: infection.id.clone(),
            preferred_route,
            rationale: regimen.rationale.clone(),
            matched_pregnancy_specific,
        });
    }

    Err(AbxError::NoRegimen {
        infection_category: infection.id.clone(),
        reason: if removed_by.is_empty() {
            "no regimen in the knowledge base declares this allergy status".to_string()
        } else {
            removed_by.join("; ")
        },
    })
}
