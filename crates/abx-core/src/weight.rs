//! Weight selection (§4.5) and creatinine-clearance derivation (§9's open
//! question, resolved here).
//!
//! Open question resolution: this implementation uses the `ibw_adjbw`
//! Cockcroft-Gault weight policy — the same IBW/TBW/AdjBW selection used for
//! dosing also feeds Cockcroft-Gault when `crcl` must be derived from
//! creatinine rather than supplied directly. See DESIGN.md for the boundary
//! tests this decision implies.

use abx_contracts::kb::WeightOverridePolicy;
use abx_contracts::patient::{PatientCase, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSource {
    Tbw,
    Ibw,
    AdjBw,
}

impl WeightSource {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightSource::Tbw => "tbw",
            WeightSource::Ibw => "ibw",
            WeightSource::AdjBw => "adjbw",
        }
    }
}

/// Devine formula ideal body weight, in kg. `height_cm` must be positive.
pub fn ideal_body_weight(sex: Sex, height_cm: f64) -> f64 {
    let height_in = height_cm / 2.54;
    let inches_over_5ft = (height_in - 60.0).max(0.0);
    match sex {
        Sex::M => 50.0 + 2.3 * inches_over_5ft,
        Sex::F => 45.5 + 2.3 * inches_over_5ft,
    }
}

pub fn adjusted_body_weight(ibw: f64, tbw: f64) -> f64 {
    ibw + 0.4 * (tbw - ibw)
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Resolve the weight (kg) and its source, applying §4.5's TBW/IBW/AdjBW
/// rule and any drug-specific override.
pub fn weight_to_use(case: &PatientCase, override_policy: Option<WeightOverridePolicy>) -> (f64, WeightSource) {
    let tbw = case.weight_kg;

    let ibw = match case.height_cm {
        Some(h) if h > 0.0 => ideal_body_weight(case.sex, h),
        _ => return (tbw, WeightSource::Tbw),
    };

    if let Some(WeightOverridePolicy::AdjBwAboveBmiX10 { bmi_x10 }) = override_policy {
        if let Some(h) = case.height_cm {
            if bmi(tbw, h) * 10.0 >= bmi_x10 as f64 {
                return (adjusted_body_weight(ibw, tbw), WeightSource::AdjBw);
            }
        }
    }

    if tbw < ibw {
        (tbw, WeightSource::Tbw)
    } else if tbw > 1.2 * ibw {
        (adjusted_body_weight(ibw, tbw), WeightSource::AdjBw)
    } else {
        (ibw, WeightSource::Ibw)
    }
}

/// Cockcroft-Gault creatinine clearance in mL/min.
///
/// `use_ibw_adjbw` selects between the two policies this codebase allows
/// (§6's `cockcroft_gault_weight_policy`): when `true`, the same IBW/TBW/
/// AdjBW selection used for dosing feeds the formula; when `false`, raw
/// total body weight is used unconditionally (the `actual` policy).
pub fn cockcroft_gault(case: &PatientCase, creatinine_mg_dl: f64, use_ibw_adjbw: bool) -> f64 {
    let weight = if use_ibw_adjbw {
        weight_to_use(case, None).0
    } else {
        case.weight_kg
    };
    let sex_factor = match case.sex {
        Sex::F => 0.85,
        Sex::M => 1.0,
    };
    let creatinine = creatinine_mg_dl.max(0.1); // avoid division blow-up on bad data
    ((140.0 - case.age as f64) * weight * sex_factor) / (72.0 * creatinine)
}
