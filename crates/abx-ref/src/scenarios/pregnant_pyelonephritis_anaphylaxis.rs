//! Scenario 6: second-trimester pregnancy, pyelonephritis, penicillin
//! anaphylaxis — two safety filters must both hold.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 28,
        sex: Sex::F,
        weight_kg: 68.0,
        height_cm: None,
        crcl: Some(95.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "pyelonephritis".to_string(),
        fever: false,
        symptoms_text: None,
        allergies_text: Some("Penicillin (anaphylaxis)".to_string()),
        prior_resistance: vec![],
        risk_factors: vec!["pregnancy_2nd_trimester".to_string()],
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
    fn pregnancy_and_severe_allergy_both_constrain_the_choice() {
        let rec = run().expect("recommendation should succeed");
        assert!(rec.pregnancy_state);
        assert_eq!(rec.allergy_classification, "SeverePcn");

        let ids: Vec<&str> = rec
            .chosen_regimen
            .drugs
            .iter()
            .map(|d| d.drug_id.as_str())
            .collect();
        assert_eq!(ids, ["aztreonam"]);

        for drug in &rec.chosen_regimen.drugs {
            assert_ne!(drug.drug_id, "ciprofloxacin");
            assert_ne!(drug.drug_id, "ceftriaxone");
        }
    }
}
