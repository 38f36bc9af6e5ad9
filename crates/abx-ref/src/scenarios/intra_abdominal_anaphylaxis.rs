//! Scenario 3: complicated intra-abdominal infection with penicillin
//! anaphylaxis, post-surgical, CrCl 66.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 55,
        sex: Sex::M,
        weight_kg: 80.0,
        height_cm: None,
        crcl: Some(66.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "intra_abdominal".to_string(),
        fever: false,
        symptoms_text: None,
        allergies_text: Some("Penicillin (anaphylaxis)".to_string()),
        prior_resistance: vec![],
        risk_factors: vec!["post_surgery".to_string()],
        current_outpatient_abx: vec![],
        current_inpatient_abx: vec![],
        culture: None,
    }
}

pub fn run() -> AbxResult<Recommendation> {
    let (engine, _audit) = build_reference_engine()?;
    engine.recommend(&case())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severe_allergy_routes_around_beta_lactams() {
        let rec = run().expect("recommendation should succeed");
        assert_eq!(rec.allergy_classification, "SeverePcn");

        let ids: Vec<&str> = rec
            .chosen_regimen
            .drugs
            .iter()
            .map(|d| d.drug_id.as_str())
            .collect();
        assert_eq!(ids, ["aztreonam", "metronidazole", "vancomycin"]);
        assert!(!ids.contains(&"piperacillin_tazobactam"));
        assert!(!ids.iter().any(|id| id.contains("ceftriaxone") || id.contains("cefepime")));

        let vanc = rec
            .chosen_regimen
            .drugs
            .iter()
            .find(|d| d.drug_id == "vancomycin")
            .unwrap();
        assert!(vanc.dose.contains("mg/kg"));
        assert!(vanc.monitoring.iter().any(|m| m.contains("trough")));
    }
}
