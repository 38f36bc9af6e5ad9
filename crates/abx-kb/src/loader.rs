//! Loads and validates the on-disk knowledge-base corpus (§4.1, §6).
//!
//! `KnowledgeBase::load` reads `index.json`, then every file it names, in
//! the order listed there. Structural shape is enforced by `serde`
//! deserialization; semantic cross-reference failures (dangling drug ids,
//! duplicate ids, orphan indication tags) are collected across the whole
//! corpus and returned together in a single `AbxError::KbLoadError` so a
//! reviewer sees every problem from one load attempt. Partial loads are
//! forbidden: any failure discards the entire in-progress KB.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use abx_contracts::error::{AbxError, AbxResult};
use abx_contracts::kb::{
    AllergyRulesFile, DrugRecord, IndexFile, InfectionRecord, PregnancyRulesFile,
    RenalAdjustmentRulesFile,
};

/// An immutable, validated snapshot of the guideline corpus.
///
/// Cheap to share: wrap in `Arc` at the call site and hand out clones freely
/// (§5 — the KB is read-only after `load()` and a reload produces a new
/// snapshot without disturbing holders of the old one).
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    infections: HashMap<String, InfectionRecord>,
    drugs: HashMap<String, DrugRecord>,
    allergy_rules: AllergyRulesFile,
    pregnancy_rules: PregnancyRulesFile,
    renal_adjustment_rules: RenalAdjustmentRulesFile,
}

impl KnowledgeBase {
    /// Read `index.json` under `base_dir`, then every file it lists, and
    /// validate the resulting corpus.
    pub fn load(base_dir: &Path) -> AbxResult<Self> {
        let mut problems: Vec<String> = Vec::new();

        let index_path = base_dir.join("index.json");
        let index: IndexFile = match read_json(&index_path) {
            Ok(v) => v,
            Err(e) => {
                // Nothing else can be loaded without the index.
                return Err(AbxError::KbLoadError(vec![format!(
                    "{}: {}",
                    index_path.display(),
                    e
                )]));
            }
        };

        let mut infections = HashMap::new();
        let mut drugs = HashMap::new();
        let mut allergy_rules: Option<AllergyRulesFile> = None;
        let mut pregnancy_rules: Option<PregnancyRulesFile> = None;
        let mut renal_adjustment_rules: Option<RenalAdjustmentRulesFile> = None;

        for rel_path in &index.loading_order {
            let full_path = base_dir.join(rel_path);
            debug!(file = %full_path.display(), "loading knowledge base file");

            if rel_path.starts_with("infections/") {
                match read_json::<InfectionRecord>(&full_path) {
                    Ok(record) => {
                        if infections.contains_key(&record.id) {
                            problems.push(format!(
                                "{}: duplicate infection id '{}'",
                                full_path.display(),
                                record.id
                            ));
                        }
                        infections.insert(record.id.clone(), record);
                    }
                    Err(e) => problems.push(format!("{}: {}", full_path.display(), e)),
                }
            } else if rel_path.starts_with("drugs/") {
                match read_json::<DrugRecord>(&full_path) {
                    Ok(record) => {
                        if drugs.contains_key(&record.id) {
                            problems.push(format!(
                                "{}: duplicate drug id '{}'",
                                full_path.display(),
                                record.id
                            ));
                        }
                        drugs.insert(record.id.clone(), record);
                    }
                    Err(e) => problems.push(format!("{}: {}", full_path.display(), e)),
                }
            } else if rel_path.ends_with("allergy_rules.json") {
                match read_json::<AllergyRulesFile>(&full_path) {
                    Ok(v) => allergy_rules = Some(v),
                    Err(e) => problems.push(format!("{}: {}", full_path.display(), e)),
                }
            } else if rel_path.ends_with("pregnancy_rules.json") {
                match read_json::<PregnancyRulesFile>(&full_path) {
                    Ok(v) => pregnancy_rules = Some(v),
                    Err(e) => problems.push(format!("{}: {}", full_path.display(), e)),
                }
            } else if rel_path.ends_with("renal_adjustment_rules.json") {
                match read_json::<RenalAdjustmentRulesFile>(&full_path) {
                    Ok(v) => renal_adjustment_rules = Some(v),
                    Err(e) => problems.push(format!("{}: {}", full_path.display(), e)),
                }
            } else {
                problems.push(format!(
                    "{}: index entry does not match any known file category",
                    rel_path
                ));
            }
        }

        let allergy_rules = allergy_rules.ok_or_else(|| {
            AbxError::KbLoadError(vec!["index.json: missing modifiers/allergy_rules.json entry".to_string()])
        });
        let pregnancy_rules = pregnancy_rules.ok_or_else(|| {
            AbxError::KbLoadError(vec!["index.json: missing modifiers/pregnancy_rules.json entry".to_string()])
        });
        let renal_adjustment_rules = renal_adjustment_rules.ok_or_else(|| {
            AbxError::KbLoadError(vec![
                "index.json: missing modifiers/renal_adjustment_rules.json entry".to_string(),
            ])
        });

        if !problems.is_empty() {
            return Err(AbxError::KbLoadError(problems));
        }

        let kb = KnowledgeBase {
            infections,
            drugs,
            allergy_rules: allergy_rules?,
            pregnancy_rules: pregnancy_rules?,
            renal_adjustment_rules: renal_adjustment_rules?,
        };

        kb.validate()?;
        Ok(kb)
    }

    pub fn get_infection(&self, id: &str) -> AbxResult<&InfectionRecord> {
        self.infections
            .get(id)
            .ok_or_else(|| AbxError::UnknownInfection { id: id.to_string() })
    }

    pub fn get_drug(&self, id: &str) -> AbxResult<&DrugRecord> {
        self.drugs
            .get(id)
            .ok_or_else(|| AbxError::UnknownDrug { id: id.to_string() })
    }

    pub fn allergy_rules(&self) -> &AllergyRulesFile {
        &self.allergy_rules
    }

    pub fn pregnancy_rules(&self) -> &PregnancyRulesFile {
        &self.pregnancy_rules
    }

    pub fn renal_rules(&self) -> &RenalAdjustmentRulesFile {
        &self.renal_adjustment_rules
    }

    pub fn infection_ids(&self) -> impl Iterator<Item = &str> {
        self.infections.keys().map(|s| s.as_str())
    }

    pub fn drug_ids(&self) -> impl Iterator<Item = &str> {
        self.drugs.keys().map(|s| s.as_str())
    }

    /// §4.1: every `drug_id` referenced in any infection regimen exists;
    /// every drug id is unique (enforced above, during load); every
    /// indication tag referenced in any drug's `by_indication` exists in at
    /// least one infection file; orphan drugs warn rather than fail.
    fn validate(&self) -> AbxResult<()> {
        let mut problems = Vec::new();

        let mut referenced_drug_ids: HashSet<&str> = HashSet::new();
        let mut referenced_indication_tags: HashSet<&str> = HashSet::new();

        for infection in self.infections.values() {
            for regimen in &infection.regimens {
                for drug_id in &regimen.drug_ids {
                    referenced_drug_ids.insert(drug_id.as_str());
                    if !self.drugs.contains_key(drug_id) {
                        problems.push(format!(
                            "infection '{}' regimen references unknown drug_id '{}'",
                            infection.id, drug_id
                        ));
                    }
                }
            }
        }

        for drug in self.drugs.values() {
            for tag in drug.dosing.by_indication.keys() {
                referenced_indication_tags.insert(tag.as_str());
            }
        }

        // Every indication tag must be reachable from at least one
        // infection's regimens (the indication_tag DrugSelector emits comes
        // from the infection side, so a tag with no infection backing it
        // could never be used and signals a stale KB entry).
        let known_indication_tags: HashSet<&str> =
            self.infections.keys().map(|s| s.as_str()).collect();
        for tag in &referenced_indication_tags {
            if !known_indication_tags.contains(tag) {
                problems.push(format!(
                    "drug dosing references indication tag '{}' with no matching infection id",
                    tag
                ));
            }
        }

        for drug_id in self.drugs.keys() {
            if !referenced_drug_ids.contains(drug_id.as_str()) {
                warn!(drug_id = %drug_id, "drug is not referenced by any infection regimen (orphan)");
            }
        }

        if !problems.is_empty() {
            return Err(AbxError::KbLoadError(problems));
        }
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}

/// Helper for callers that only know the KB directory as a string, e.g. from
/// configuration.
pub fn load_from_str_path(base_dir: &str) -> AbxResult<KnowledgeBase> {
    KnowledgeBase::load(&PathBuf::from(base_dir))
}
