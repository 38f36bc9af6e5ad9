//! Scenario 1: pyelonephritis, no allergy, normal renal function.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 25,
        sex: Sex::F,
        weight_kg: 65.0,
        height_cm: None,
        crcl: Some(85.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "pyelonephritis".to_string(),
        fever: false,
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
    fn ceftriaxone_once_daily_iv_no_loading_dose() {
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
        assert_eq!(rec.chosen_regimen.total_duration, "7-14 days");
    }
}
