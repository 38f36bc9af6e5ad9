//! # abx-kb
//!
//! Loads and validates the JSON knowledge-base corpus described in §6:
//! infection records, drug records, and the three modifier tables, read
//! from a directory tree rooted at an `index.json` registry.
//!
//! Validation is fatal and collected: a single `load()` call surfaces every
//! missing file, every dangling cross-reference, and every duplicate id in
//! one `AbxError::KbLoadError`, never a partial KB.

pub mod loader;

pub use loader::{load_from_str_path, KnowledgeBase};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn write_file(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn minimal_corpus(dir: &Path) {
        write_file(
            dir,
            "index.json",
            r#"{
              "loading_order": [
                "infections/cystitis.json",
                "drugs/nitrofurantoin.json",
                "modifiers/allergy_rules.json",
                "modifiers/pregnancy_rules.json",
                "modifiers/renal_adjustment_rules.json"
              ],
              "cross_reference_rules": []
            }"#,
        );
        write_file(
            dir,
            "infections/cystitis.json",
            r#"{
              "id": "cystitis",
              "display_name": "Acute cystitis",
              "version": "1.0.0",
              "last_updated": "2026-01-01",
              "classification_rules": {"keyword_triggers": [], "route_required": "any"},
              "regimens": [
                {"allergy_status": ["no_allergy", "any"], "pregnancy_status": [], "mrsa_risk": null,
                 "drug_ids": ["nitrofurantoin"], "rationale": "first line"}
              ],
              "critical_warnings": [],
              "default_duration": "5 days"
            }"#,
        );
        write_file(
            dir,
            "drugs/nitrofurantoin.json",
            r#"{
              "id": "nitrofurantoin",
              "display_name": "Nitrofurantoin",
              "version": "1.0.0",
              "last_updated": "2026-01-01",
              "drug_class": "nitrofuran",
              "routes": ["po"],
              "spectrum_tags": [],
              "dosing": {"by_indication": {"cystitis": {"dose": "100 mg", "frequency": "q12h", "route": "po"}}, "default": null},
              "renal_adjustment": {"required": false, "crcl_bands": [], "monitoring_note": null},
              "pregnancy_category": "B",
              "monitoring": [],
              "notes": null
            }"#,
        );
        write_file(
            dir,
            "modifiers/allergy_rules.json",
            r#"{"version": "1.0.0", "last_updated": "2026-01-01", "rules": []}"#,
        );
        write_file(
            dir,
            "modifiers/pregnancy_rules.json",
            r#"{"version": "1.0.0", "last_updated": "2026-01-01", "contraindicated": {}, "preferred": []}"#,
        );
        write_file(
            dir,
            "modifiers/renal_adjustment_rules.json",
            r#"{"version": "1.0.0", "last_updated": "2026-01-01", "shared_bands": {}}"#,
        );
    }

    #[test]
    fn loads_a_minimal_consistent_corpus() {
        let tmp = tempdir();
        minimal_corpus(tmp.path());
        let kb = KnowledgeBase::load(tmp.path()).expect("load should succeed");
        assert!(kb.get_infection("cystitis").is_ok());
        assert!(kb.get_drug("nitrofurantoin").is_ok());
    }

    #[test]
    fn unknown_infection_is_a_structured_error() {
        let tmp = tempdir();
        minimal_corpus(tmp.path());
        let kb = KnowledgeBase::load(tmp.path()).unwrap();
        let err = kb.get_infection("nope").unwrap_err();
        assert_eq!(err.code(), "ERR_UNKNOWN_INFECTION");
    }

    #[test]
    fn unknown_drug_is_a_structured_error() {
        let tmp = tempdir();
        minimal_corpus(tmp.path());
        let kb = KnowledgeBase::load(tmp.path()).unwrap();
        let err = kb.get_drug("nope").unwrap_err();
        assert_eq!(err.code(), "ERR_UNKNOWN_DRUG");
    }

    #[test]
    fn dangling_drug_reference_fails_load_with_every_problem_listed() {
        let tmp = tempdir();
        minimal_corpus(tmp.path());
        write_file(
            tmp.path(),
            "infections/cystitis.json",
            r#"{
              "id": "cystitis",
              "display_name": "Acute cystitis",
              "version": "1.0.0",
              "last_updated": "2026-01-01",
              "classification_rules": {"keyword_triggers": [], "route_required": "any"},
              "regimens": [
                {"allergy_status": ["no_allergy", "any"], "pregnancy_status": [], "mrsa_risk": null,
                 "drug_ids": ["nitrofurantoin", "ghost_drug"], "rationale": "first line"}
              ],
              "critical_warnings": [],
              "default_duration": "5 days"
            }"#,
        );

        let err = KnowledgeBase::load(tmp.path()).unwrap_err();
        match err {
            abx_contracts::error::AbxError::KbLoadError(problems) => {
                assert!(problems.iter().any(|p| p.contains("ghost_drug")));
            }
            other => panic!("expected KbLoadError, got {:?}", other),
        }
    }

    #[test]
    fn missing_index_file_fails_load() {
        let tmp = tempdir();
        let err = KnowledgeBase::load(tmp.path()).unwrap_err();
        assert_eq!(err.code(), "KB_LOAD_ERROR");
    }

    /// Minimal self-contained temp-directory helper; avoids pulling in the
    /// `tempfile` crate for a handful of loader tests.
    struct TempDir(std::path::PathBuf);
    impl TempDir {
        fn path(&self) -> &Path {
            &self.0
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
    fn tempdir() -> TempDir {
        let mut dir = std::env::temp_dir();
        let unique = format!(
            "abx-kb-test-{}-{}",
            std::process::id(),
            dir.as_os_str().len() + dir_nonce()
        );
        dir.push(unique);
        std::fs::create_dir_all(&dir).unwrap();
        TempDir(dir)
    }
    fn dir_nonce() -> usize {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static NONCE: AtomicUsize = AtomicUsize::new(0);
        NONCE.fetch_add(1, Ordering::Relaxed)
    }
}
