//! Scenario 4: bacteremia with MRSA colonization risk and penicillin
//! anaphylaxis in an elderly patient, CrCl 44.

use abx_contracts::error::AbxResult;
use abx_contracts::patient::{PatientCase, Sex};
use abx_contracts::recommendation::Recommendation;

use crate::build_reference_engine;

pub fn case() -> PatientCase {
    PatientCase {
        age: 88,
        sex: Sex::M,
        weight_kg: 70.0,
        height_cm: None,
        crcl: Some(44.0),
        creatinine: None,
        dialysis: None,
        location: None,
        infection_type: "bacteremia".to_string(),
        fever: false,
        symptoms_text: None,
        allergies_text: Some("Penicillin (anaphylaxis)".to_string()),
        prior_resistance: vec![],
        risk_factors: vec!["mrsa_colonization".to_string()],
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
    fn mrsa_risk_promotes_category_and_band_adjusts_vancomycin() {
        let rec = run().expect("recommendation should succeed");
        assert_eq!(rec.infection_category, "bacteremia_mrsa");

        let ids: Vec<&str> = rec
            .chosen_regimen
            .drugs
            .iter()
            .map(|d| d.drug_id.as_str())
            .collect();
        assert_eq!(ids, ["aztreonam", "vancomycin"]);

        let vanc = rec
            .chosen_regimen
            .drugs
            .iter()
            .find(|d| d.drug_id == "vancomycin")
            .unwrap();
        assert_eq!(vanc.frequency, "q24h");

        assert!(rec.warnings.iter().any(|w| w == "elderly"));
    }
}
