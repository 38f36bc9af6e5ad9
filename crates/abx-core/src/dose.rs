//! `DoseCalculator` (§4.5): indication-specific dose → renal adjustment →
//! loading-dose policy → weight-based numeric ranges.

use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::kb::{CrclBandOverride, DoseBlock, DrugRecord};
use abx_contracts::patient::{DialysisModality, PatientCase};
use abx_contracts::recommendation::ChosenDrug;

use crate::weight::weight_to_use;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenalBand {
    Over50,
    Band30to50,
    Band10to29,
    Under10NoHd,
    Hd,
    Cvvhdf,
}

impl RenalBand {
    pub fn label(self) -> &'static str {
        match self {
            RenalBand::Over50 => "over_50",
            RenalBand::Band30to50 => "band_30_50",
            RenalBand::Band10to29 => "band_10_29",
            RenalBand::Under10NoHd => "under_10_no_hd",
            RenalBand::Hd => "hd",
            RenalBand::Cvvhdf => "cvvhdf",
        }
    }

    pub fn requires_adjustment(self) -> bool {
        !matches!(self, RenalBand::Over50)
    }
}

/// Dialysis modality wins over numeric CrCl unconditionally (§4.5 step 3).
pub fn renal_band(crcl: f64, dialysis: Option<DialysisModality>) -> RenalBand {
    match dialysis {
        Some(DialysisModality::Hd) => return RenalBand::Hd,
        Some(DialysisModality::Cvvhdf) => return RenalBand::Cvvhdf,
        None => {}
    }
    if crcl > 50.0 {
        RenalBand::Over50
    } else if crcl >= 30.0 {
        RenalBand::Band30to50
    } else if crcl >= 10.0 {
        RenalBand::Band10to29
    } else {
        RenalBand::Under10NoHd
    }
}

fn find_band_override<'a>(bands: &'a [CrclBandOverride], band: RenalBand) -> Option<&'a CrclBandOverride> {
    bands.iter().find(|b| b.band == band.label())
}

/// Parses dose strings of the shape `"<lo>-<hi> mg/kg"` or `"<n> mg/kg"`.
/// Returns `None` for fixed, non-weight-based doses (e.g. `"1 g"`).
fn weight_based_range_mg_per_kg(dose: &str) -> Option<(f64, f64)> {
    let lower = dose.to_lowercase();
    if !lower.contains("mg/kg") {
        return None;
    }
    let numeric_part = lower.split("mg/kg").next()?.trim();
    if let Some((lo, hi)) = numeric_part.split_once('-') {
        Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
    } else {
        let v: f64 = numeric_part.trim().parse().ok()?;
        Some((v, v))
    }
}

fn render_weight_based_dose(verbatim: &str, weight_kg: f64) -> String {
    match weight_based_range_mg_per_kg(verbatim) {
        Some((lo, hi)) if (lo - hi).abs() < f64::EPSILON => {
            let mg = (lo * weight_kg).round() as i64;
            format!("{} ({} mg)", verbatim, mg)
        }
        Some((lo, hi)) => {
            let lo_mg = (lo * weight_kg).round() as i64;
            let hi_mg = (hi * weight_kg).round() as i64;
            format!("{} ({}-{} mg)", verbatim, lo_mg, hi_mg)
        }
        None => verbatim.to_string(),
    }
}

fn resolve_dose_block<'a>(drug: &'a DrugRecord, indication_tag: &str) -> AbxResult<&'a DoseBlock> {
    drug.dosing
        .by_indication
        .get(indication_tag)
        .or(drug.dosing.default.as_ref())
        .ok_or_else(|| AbxError::NoDose {
            drug_id: drug.id.clone(),
            indication_tag: indication_tag.to_string(),
        })
}

/// Compute the full per-drug dose record (§4.5 steps 1-6).
pub fn calculate(drug: &DrugRecord, indication_tag: &str, case: &PatientCase, band: RenalBand) -> AbxResult<ChosenDrug> {
    let block = resolve_dose_block(drug, indication_tag)?;
    let (weight_kg, _source) = weight_to_use(case, drug.weight_override);

    let mut dose = render_weight_based_dose(&block.dose, weight_kg);
    let mut frequency = block.frequency.clone();

    if drug.renal_adjustment.required {
        let override_entry = find_band_override(&drug.renal_adjustment.crcl_bands, band)
            .ok_or_else(|| AbxError::RenalBandMissing {
                drug_id: drug.id.clone(),
                band: band.label().to_string(),
            })?;
        if !override_entry.no_adjustment {
            if let Some(d) = &override_entry.dose_override {
                dose = render_weight_based_dose(d, weight_kg);
            }
            if let Some(f) = &override_entry.frequency_override {
                frequency = f.clone();
            }
        }
    }

    let loading_dose = block
        .loading_dose
        .as_ref()
        .map(|ld| render_weight_based_dose(&ld.dose, weight_kg));

    Ok(ChosenDrug {
        drug_id: drug.id.clone(),
        dose,
        frequency,
        route: block.route.clone(),
        loading_dose,
        monitoring: drug.monitoring.clone(),
        rationale: format!("{} dosed for indication '{}'", drug.display_name, indication_tag),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abx_contracts::kb::{Dosing, LoadingDose, RenalAdjustment};
    use abx_contracts::patient::Sex;
    use std::collections::HashMap;

    fn sample_case(crcl_unused: f64) -> PatientCase {
        let _ = crcl_unused;
        PatientCase {
            age: 40,
            sex: Sex::M,
            weight_kg: 70.0,
            height_cm: None,
            crcl: None,
            creatinine: None,
            dialysis: None,
            location: None,
            infection_type: "bacteremia".to_string(),
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

    fn vancomycin() -> DrugRecord {
        let mut by_indication = HashMap::new();
        by_indication.insert(
            "meningitis".to_string(),
            DoseBlock {
                dose: "15-20 mg/kg".to_string(),
                frequency: "q8-12h".to_string(),
                route: "iv".to_string(),
                infusion: None,
                loading_dose: Some(LoadingDose {
                    dose: "25-30 mg/kg".to_string(),
                    notes: None,
                }),
                max_dose: None,
            },
        );
        DrugRecord {
            id: "vancomycin".to_string(),
            display_name: "Vancomycin".to_string(),
            version: "1.0.0".to_string(),
            last_updated: "2026-01-01".to_string(),
            drug_class: "glycopeptide".to_string(),
            routes: vec!["iv".to_string()],
            spectrum_tags: vec![],
            dosing: Dosing {
                by_indication,
                default: None,
            },
            renal_adjustment: RenalAdjustment {
                required: true,
                crcl_bands: vec![
                    abx_contracts::kb::CrclBandOverride {
                        min: Some(30.0),
                        max: Some(50.0),
                        band: "band_30_50".to_string(),
                        dose_override: None,
                        frequency_override: Some("q24h".to_string()),
                        no_adjustment: false,
                    },
                    abx_contracts::kb::CrclBandOverride {
                        min: Some(50.0),
                        max: None,
                        band: "over_50".to_string(),
                        dose_override: None,
                        frequency_override: None,
                        no_adjustment: true,
                    },
                ],
                monitoring_note: Some("trough levels".to_string()),
            },
            weight_override: None,
            pregnancy_category: "C".to_string(),
            monitoring: vec!["trough levels".to_string()],
            notes: None,
        }
    }

    #[test]
    fn renal_band_boundaries() {
        assert_eq!(renal_band(51.0, None), RenalBand::Over50);
        assert_eq!(renal_band(50.0, None), RenalBand::Band30to50);
        assert_eq!(renal_band(30.0, None), RenalBand::Band30to50);
        assert_eq!(renal_band(29.9, None), RenalBand::Band10to29);
        assert_eq!(renal_band(10.0, None), RenalBand::Band10to29);
        assert_eq!(renal_band(9.9, None), RenalBand::Under10NoHd);
    }

    #[test]
    fn dialysis_modality_overrides_numeric_crcl() {
        assert_eq!(renal_band(90.0, Some(DialysisModality::Hd)), RenalBand::Hd);
        assert_eq!(renal_band(5.0, Some(DialysisModality::Cvvhdf)), RenalBand::Cvvhdf);
    }

    #[test]
    fn vancomycin_at_30_50_band_gets_frequency_override_and_loading_dose() {
        let drug = vancomycin();
        let case = sample_case(44.0);
        let dosed = calculate(&drug, "meningitis", &case, RenalBand::Band30to50).unwrap();
        assert_eq!(dosed.frequency, "q24h");
        assert!(dosed.loading_dose.is_some());
        assert!(dosed.loading_dose.unwrap().contains("mg"));
    }

    #[test]
    fn vancomycin_over_50_band_marked_no_adjustment_keeps_default_frequency() {
        let drug = vancomycin();
        let case = sample_case(85.0);
        let dosed = calculate(&drug, "meningitis", &case, RenalBand::Over50).unwrap();
        assert_eq!(dosed.frequency, "q8-12h");
    }

    #[test]
    fn missing_renal_band_is_a_structured_error() {
        let drug = vancomycin();
        let case = sample_case(5.0);
        let err = calculate(&drug, "meningitis", &case, RenalBand::Under10NoHd).unwrap_err();
        assert_eq!(err.code(), "ERR_RENAL_BAND_MISSING");
    }

    #[test]
    fn missing_dose_block_is_a_structured_error() {
        let drug = vancomycin();
        let case = sample_case(85.0);
        let err = calculate(&drug, "cystitis", &case, RenalBand::Over50).unwrap_err();
        assert_eq!(err.code(), "ERR_NO_DOSE");
    }

    #[test]
    fn weight_based_range_renders_both_endpoints_in_mg() {
        let rendered = render_weight_based_dose("15-20 mg/kg", 70.0);
        assert!(rendered.contains("1050"));
        assert!(rendered.contains("1400"));
    }
}
