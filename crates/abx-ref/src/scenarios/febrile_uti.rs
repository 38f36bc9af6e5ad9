//! Scenario 2: febrile UTI promotes to pyelonephritis, otherwise identical
//! to the scenario 1 outcome.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 42,
        sex: Sex::F,
        weight_kg: 70.0,
        height_cm: None,
        crcl: Some(70.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "uti".to_string(),
        fever: true,
        symptoms_text: None,
        allergies_text: None,
        prior_resistance: vec![],
        risk_factors: vec![],
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
    fn fever_promotes_uti_to_pyelonephritis() {
        let rec = run().expect("recommendation should succeed");
        assert_eq!(rec.infection_category, "pyelonephritis");
        let ids: Vec<&str> = rec
            .chosen_regimen
            .drugs
            .iter()
            .map(|d| d.drug_id.as_str())
            .collect();
        assert_eq!(ids, ["ceftriaxone"]);
        let drug = &rec.chosen_regimen.drugs[0];
        assert_eq!(drug.route, "iv");
        assert_eq!(drug.dose, "1 g");
        assert_eq!(drug.frequency, "q24h");
        assert!(drug.loading_dose.is_none());
    }
}
