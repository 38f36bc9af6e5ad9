//! # abx-contracts
//!
//! Shared data definitions and error taxonomy for the antibiotic
//! recommendation engine. No business logic lives in this crate — only the
//! types every other `abx-*` crate builds on: the patient case, the
//! knowledge-base record shapes, the recommendation and audit records, the
//! error report, and the unified error type.

pub mod audit;
pub mod error;
pub mod error_report;
pub mod kb;
pub mod patient;
pub mod recommendation;

#[cfg(test)]
mod tests {
    use super::*;
    use error::AbxError;
    use error_report::ReportStatus;
    use patient::{PatientCase, Sex};
    use recommendation::RequestId;

    #[test]
    fn request_id_new_produces_unique_values() {
        let ids: Vec<RequestId> = (0..100).map(|_| RequestId::new()).collect();
        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn error_code_matches_taxonomy() {
        let err = AbxError::NoRegimen {
            infection_category: "pyelonephritis".to_string(),
            reason: "all regimens removed by allergy filter".to_string(),
        };
        assert_eq!(err.code(), "ERR_NO_REGIMEN");
        assert!(err.to_string().contains("pyelonephritis"));
    }

    #[test]
    fn error_unknown_drug_display() {
        let err = AbxError::UnknownDrug {
            id: "penicllinn".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unknown drug"));
        assert!(msg.contains("penicllinn"));
        assert_eq!(err.code(), "ERR_UNKNOWN_DRUG");
    }

    // ── ReportStatus transition table (P8) ──────────────────────────────────

    #[test]
    fn report_status_allows_documented_transitions() {
        assert!(ReportStatus::New.can_transition_to(ReportStatus::Verified));
        assert!(ReportStatus::New.can_transition_to(ReportStatus::NotReproduced));
        assert!(ReportStatus::Verified.can_transition_to(ReportStatus::InProgress));
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::Fixed));
        assert!(ReportStatus::Fixed.can_transition_to(ReportStatus::Closed));
    }

    #[test]
    fn report_status_rejects_skipping_in_progress() {
        assert!(!ReportStatus::New.can_transition_to(ReportStatus::Fixed));
        assert!(!ReportStatus::Verified.can_transition_to(ReportStatus::Closed));
    }

    #[test]
    fn report_status_terminal_states_reject_everything_but_self() {
        assert!(!ReportStatus::Closed.can_transition_to(ReportStatus::New));
        assert!(ReportStatus::Closed.can_transition_to(ReportStatus::Closed));
        assert!(ReportStatus::WontFix.is_terminal());
        assert!(ReportStatus::NotReproduced.is_terminal());
    }

    #[test]
    fn report_status_same_state_is_idempotent() {
        // P8: updating to the current status is a no-op, never an error.
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::InProgress));
    }

    // ── PatientCase helpers ──────────────────────────────────────────────────

    fn sample_case() -> PatientCase {
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

    #[test]
    fn patient_case_detects_elderly_and_mrsa_risk() {
        let case = sample_case();
        assert!(case.is_elderly());
        assert!(case.mrsa_risk());
        assert!(!case.is_pregnant());
    }

    #[test]
    fn patient_case_pregnancy_trimester_extraction() {
        let mut case = sample_case();
        case.risk_factors.push("pregnancy_2nd_trimester".to_string());
        assert!(case.is_pregnant());
        assert_eq!(case.pregnancy_trimester(), Some("pregnancy_2nd_trimester"));
    }
}
