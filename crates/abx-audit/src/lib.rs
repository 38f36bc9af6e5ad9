//! # abx-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit trail for the
//! antibiotic recommendation engine.
//!
//! ## Overview
//!
//! Every recommendation the engine produces is wrapped in an `AuditEvent`
//! that links to the previous event via its SHA-256 hash. Tampering with any
//! event — even a single byte — breaks the chain and is detected by
//! `verify_chain`. `InMemoryAuditWriter` is the reference implementation
//! used by tests and reference scenarios; `FileAuditWriter` persists the
//! same chain to day-partitioned JSON-Lines files.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use abx_audit::InMemoryAuditWriter;
//! use abx_core::traits::AuditWriter;
//!
//! let writer = InMemoryAuditWriter::new();
//! writer.write(record)?;
//! assert!(writer.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod file;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use file::{verify_file_chain, FileAuditWriter};
pub use memory::InMemoryAuditWriter;
