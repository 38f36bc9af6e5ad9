//! # abx-ref
//!
//! Reference runtime for the antibiotic empiric-therapy recommendation
//! engine. Wires a real `KnowledgeBase`, `RecommendationEngine`, and
//! `InMemoryAuditWriter` against the six canonical end-to-end clinical
//! scenarios. All patient data here is fictional.

use std::path::PathBuf;
use std::sync::Arc;

use abx_contracts::error::AbxResult;
use abx_core::config::EngineConfig;
use abx_core::RecommendationEngine;
use abx_kb::KnowledgeBase;

pub mod scenarios;

/// Resolve the `guidelines/` fixture corpus shipped at the workspace root,
/// regardless of which crate's directory `cargo test` runs from.
pub fn guidelines_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../guidelines"))
}

pub fn load_reference_kb() -> AbxResult<Arc<KnowledgeBase>> {
    Ok(Arc::new(KnowledgeBase::load(&guidelines_dir())?))
}

/// Build an engine over the reference KB with an in-memory audit writer,
/// handing back both so scenarios can inspect what was audited.
pub fn build_reference_engine() -> AbxResult<(RecommendationEngine, Arc<abx_audit::InMemoryAuditWriter>)> {
    let kb = load_reference_kb()?;
    let audit = Arc::new(abx_audit::InMemoryAuditWriter::new());
    let engine = RecommendationEngine::new(kb, EngineConfig::default(), audit.clone());
    Ok((engine, audit))
}
