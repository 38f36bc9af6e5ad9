//! The one seam the engine core genuinely needs pluggable.
//!
//! Classification, selection, and dose calculation each have exactly one
//! algorithm specified (§4.2–§4.5); they are plain functions in
//! [`crate::classify`], [`crate::select`], and [`crate::dose`], not trait
//! objects — there is nothing to swap. The audit sink, on the other hand,
//! genuinely varies between an in-memory writer (reference scenarios,
//! tests) and a file-backed one (`abx-audit::FileAuditWriter`), so it stays
//! a trait.

use abx_contracts::audit::AuditRecord;
use abx_contracts::error::AbxResult;

/// Persists one audit record per recommendation (§5, §6). Implementations
/// must serialize concurrent writes themselves; the engine calls `write`
/// once per request with no external locking.
pub trait AuditWriter: Send + Sync {
    fn write(&self, record: AuditRecord) -> AbxResult<()>;
}
