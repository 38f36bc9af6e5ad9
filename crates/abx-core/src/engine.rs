//! `RecommendationEngine` (§4.6): composes classifier → selector →
//! calculator, assembles the recommendation, and emits an audit record.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use abx_contracts::audit::{AuditError, AuditInput, AuditRecord};
use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::patient::{PatientCase, MAX_FREE_TEXT_BYTES};
use abx_contracts::recommendation::{
    ChosenRegimen, Provenance, Recommendation, RequestId, ENGINE_VERSION,
};
use abx_kb::KnowledgeBase;

use crate::classify::{allergy, infection};
use crate::config::EngineConfig;
use crate::dose;
use crate::select;
use crate::traits::AuditWriter;

pub struct RecommendationEngine {
    kb: Arc<KnowledgeBase>,
    config: EngineConfig,
    audit: Arc<dyn AuditWriter>,
}

impl RecommendationEngine {
    pub fn new(kb: Arc<KnowledgeBase>, config: EngineConfig, audit: Arc<dyn AuditWriter>) -> Self {
        RecommendationEngine { kb, config, audit }
    }

    /// Swap in a freshly loaded, validated KB snapshot (§5 hot reload).
    /// In-flight callers holding the previous `Arc<KnowledgeBase>` (obtained
    /// via `knowledge_base()` before the swap) continue to see the old one.
    pub fn reload(&mut self, kb: Arc<KnowledgeBase>) {
        self.kb = kb;
    }

    pub fn knowledge_base(&self) -> Arc<KnowledgeBase> {
        Arc::clone(&self.kb)
    }

    fn validate_case(&self, case: &PatientCase) -> AbxResult<()> {
        if case.infection_type.trim().is_empty() {
            return Err(AbxError::BadCase {
                reason: "infection_type is required".to_string(),
            });
        }
        if case.crcl.is_none() && case.creatinine.is_none() && case.dialysis.is_none() {
            return Err(AbxError::BadCase {
                reason: "either crcl, creatinine inputs, or a dialysis modality is required"
                    .to_string(),
            });
        }
        for (field, text) in case.free_text_fields() {
            if text.len() > MAX_FREE_TEXT_BYTES {
                return Err(AbxError::BadCase {
                    reason: format!("field '{}' exceeds {} bytes", field, MAX_FREE_TEXT_BYTES),
                });
            }
        }
        Ok(())
    }

    fn resolve_crcl(&self, case: &PatientCase) -> AbxResult<f64> {
        if let Some(c) = case.crcl {
            return Ok(c);
        }
        if let Some(creatinine) = &case.creatinine {
            let use_ibw_adjbw = matches!(
                self.config.cockcroft_gault_weight_policy,
                crate::config::CockcroftGaultWeightPolicy::IbwAdjbw
            );
            return Ok(crate::weight::cockcroft_gault(
                case,
                creatinine.creatinine_mg_dl,
                use_ibw_adjbw,
            ));
        }
        // Dialysis without a numeric CrCl: the band is dialysis-driven, so
        // any finite placeholder works — it is never consulted when the
        // dialysis modality is set (see `dose::renal_band`).
        Ok(0.0)
    }

    /// Run the full pipeline for one patient case (§4.6).
    pub fn recommend(&self, case: &PatientCase) -> AbxResult<Recommendation> {
        let request_id = RequestId::new();
        let started = Instant::now();
        debug!(request_id = %request_id, "recommendation request received");

        let mut band_seen: Option<dose::RenalBand> = None;
        let result = self.recommend_inner(case, request_id, &mut band_seen);

        let duration_ms = started.elapsed().as_millis() as u64;
        self.emit_audit(case, request_id, &result, duration_ms, band_seen);

        result
    }

    fn recommend_inner(
        &self,
        case: &PatientCase,
        request_id: RequestId,
        band_out: &mut Option<dose::RenalBand>,
    ) -> AbxResult<Recommendation> {
        self.validate_case(case)?;

        let infection_category = infection::classify(case, &self.kb)?;
        let infection_record = self.kb.get_infection(&infection_category)?;

        let allergy_classification = allergy::classify(
            case.allergies_text.as_deref(),
            &self.kb.allergy_rules().rules,
        );
        if !allergy_classification.notes.is_empty() {
            warn!(request_id = %request_id, "allergy text did not match an explicit rule; treated conservatively");
        }

        let crcl = self.resolve_crcl(case)?;
        let band = dose::renal_band(crcl, case.dialysis);
        *band_out = Some(band);

        let selected = match select::select(&self.kb, infection_record, &allergy_classification, case) {
            Ok(s) => Some(s),
            Err(AbxError::NoRegimen { reason, .. }) if !self.config.refuse_on_no_regimen => {
                warn!(request_id = %request_id, reason = %reason, "no regimen matched; refuse_on_no_regimen is disabled, returning an empty recommendation");
                None
            }
            Err(e) => return Err(e),
        };

        let mut warnings = self.assemble_warnings(case, &allergy_classification, &band, infection_record);

        let (chosen_regimen, confidence, provenance) = match &selected {
            Some(sel) => {
                let mut drugs = Vec::with_capacity(sel.drug_ids.len());
                for drug_id in &sel.drug_ids {
                    let drug = self.kb.get_drug(drug_id)?;
                    let chosen = dose::calculate(drug, &sel.indication_tag, case, band)?;
                    drugs.push(chosen);
                }

                let chosen_regimen = ChosenRegimen {
                    drugs,
                    total_duration: infection_record.default_duration.clone(),
                    indication_tag: sel.indication_tag.clone(),
                };

                let confidence = self.compute_confidence(case, sel, infection_record, &warnings);
                let provenance = self.build_provenance(infection_record, &sel.drug_ids);
                (chosen_regimen, confidence, provenance)
            }
            None => {
                warnings.push(
                    "no regimen in the knowledge base matched this case; returning an empty recommendation"
                        .to_string(),
                );
                let chosen_regimen = ChosenRegimen {
                    drugs: Vec::new(),
                    total_duration: infection_record.default_duration.clone(),
                    indication_tag: infection_record.id.clone(),
                };
                let provenance = self.build_provenance(infection_record, &[]);
                (chosen_regimen, 0.0, provenance)
            }
        };

        Ok(Recommendation {
            request_id,
            engine_version: ENGINE_VERSION.to_string(),
            infection_category,
            allergy_classification: format!("{:?}", allergy_classification.severity),
            pregnancy_state: case.is_pregnant(),
            chosen_regimen,
            warnings,
            confidence,
            provenance,
            emitted_at: Utc::now(),
        })
    }

    fn assemble_warnings(
        &self,
        case: &PatientCase,
        allergy: &allergy::AllergyClassification,
        band: &dose::RenalBand,
        infection: &abx_contracts::kb::InfectionRecord,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        if case.is_elderly() {
            warnings.push("elderly".to_string());
        }
        if matches!(band, dose::RenalBand::Band10to29 | dose::RenalBand::Under10NoHd) {
            warnings.push("severe renal impairment".to_string());
        }
        if case.has_neutropenia() {
            warnings.push("neutropenia".to_string());
        }
        if case.is_pregnant() {
            warnings.push("pregnancy".to_string());
        }
        if !allergy.notes.is_empty() {
            warnings.push("no explicit allergy pattern matched — treated conservatively".to_string());
        }
        for cw in &infection.critical_warnings {
            warnings.push(cw.text.clone());
        }
        warnings
    }

    fn compute_confidence(
        &self,
        case: &PatientCase,
        selected: &select::SelectedRegimen,
        infection: &abx_contracts::kb::InfectionRecord,
        warnings: &[String],
    ) -> f64 {
        let mut confidence: f64 = 0.9;

        if case.is_pregnant() && case.pregnancy_trimester().is_some() && !selected.matched_pregnancy_specific {
            confidence -= 0.1;
        }

        let reduces_confidence_texts: Vec<&str> = infection
            .critical_warnings
            .iter()
            .filter(|cw| cw.reduces_confidence)
            .map(|cw| cw.text.as_str())
            .collect();
        if warnings.iter().any(|w| reduces_confidence_texts.contains(&w.as_str())) {
            confidence -= 0.2;
        }

        confidence.max(0.3).min(1.0)
    }

    fn build_provenance(
        &self,
        infection: &abx_contracts::kb::InfectionRecord,
        drug_ids: &[String],
    ) -> Provenance {
        let mut drug_file_versions = BTreeMap::new();
        for id in drug_ids {
            if let Ok(drug) = self.kb.get_drug(id) {
                drug_file_versions.insert(id.clone(), drug.version.clone());
            }
        }
        let mut modifier_versions = BTreeMap::new();
        modifier_versions.insert(
            "allergy_rules".to_string(),
            self.kb.allergy_rules().version.clone(),
        );
        modifier_versions.insert(
            "pregnancy_rules".to_string(),
            self.kb.pregnancy_rules().version.clone(),
        );
        modifier_versions.insert(
            "renal_adjustment_rules".to_string(),
            self.kb.renal_rules().version.clone(),
        );

        Provenance {
            infection_file_version: infection.version.clone(),
            drug_file_versions,
            modifier_versions,
        }
    }

    fn emit_audit(
        &self,
        case: &PatientCase,
        request_id: RequestId,
        result: &AbxResult<Recommendation>,
        duration_ms: u64,
        band: Option<dose::RenalBand>,
    ) {
        let renal_band = band.map(|b| b.label().to_string());
        let input = AuditInput {
            age: case.age,
            sex: format!("{:?}", case.sex),
            weight_kg: case.weight_kg,
            infection_type: case.infection_type.clone(),
            risk_factor_count: case.risk_factors.len(),
        };

        let record = match result {
            Ok(rec) => AuditRecord {
                timestamp: Utc::now(),
                request_id,
                status: "ok".to_string(),
                input,
                infection_category: Some(rec.infection_category.clone()),
                allergy_classification: Some(rec.allergy_classification.clone()),
                pregnancy_state: rec.pregnancy_state,
                renal_band: renal_band.clone(),
                chosen_drug_ids: rec
                    .chosen_regimen
                    .drugs
                    .iter()
                    .map(|d| d.drug_id.clone())
                    .collect(),
                confidence: Some(rec.confidence),
                duration_ms,
                provenance: Some(rec.provenance.clone()),
                error: None,
            },
            Err(e) => AuditRecord {
                timestamp: Utc::now(),
                request_id,
                status: "error".to_string(),
                input,
                infection_category: None,
                allergy_classification: None,
                pregnancy_state: case.is_pregnant(),
                renal_band,
                chosen_drug_ids: Vec::new(),
                confidence: None,
                duration_ms,
                provenance: None,
                error: Some(AuditError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
            },
        };

        if let Err(write_err) = self.audit.write(record) {
            // Transient per §7: never suppress the recommendation response.
            warn!(request_id = %request_id, error = %write_err, "failed to write audit record");
        } else {
            info!(request_id = %request_id, "audit record written");
        }
    }
}
