//! Scenario 5: bacterial meningitis, no allergy, normal renal function.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 25,
        sex: Sex::M,
        weight_kg: 75.0,
        height_cm: None,
        crcl: Some(90.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "meningitis".to_string(),
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
    fn high_dose_ceftriaxone_plus_vancomycin_loading_dose() {
        let rec = run().expect("recommendation should succeed");

        let ids: Vec<&str> = rec
            .chosen_regimen
            .drugs
            .iter()
            .map(|d| d.drug_id.as_str())
            .collect();
        assert_eq!(ids, ["ceftriaxone", "vancomycin"]);

        let ceftriaxone = &rec.chosen_regimen.drugs[0];
        assert_eq!(ceftriaxone.dose, "2 g");
        assert_eq!(ceftriaxone.frequency, "q12h");

        let vanc = &rec.chosen_regimen.drugs[1];
        let loading = vanc.loading_dose.as_ref().expect("meningitis vancomycin carries a loading dose");
        assert!(loading.starts_with("25-30 mg/kg"));
    }
}
