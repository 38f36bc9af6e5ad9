//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps all events in a `Vec` protected by a
//! `Mutex`, making it safe to share across threads while the engine calls
//! `write()` once per recommendation. Use `export_log()` to obtain a sealed
//! `AuditLog`, and `verify_integrity()` at any time to confirm the chain has
//! not been tampered with in memory. This is the writer used by reference
//! scenarios and tests; `FileAuditWriter` is the persistent counterpart.

use std::sync::{Arc, Mutex};

use tracing::info;

use abx_contracts::audit::AuditRecord;
use abx_contracts::error::{AbxError, AbxResult};
use abx_core::traits::AuditWriter;

use crate::{
    chain::hash_event,
    event::{AuditEvent, AuditLog},
};

pub(crate) struct InMemoryState {
    pub(crate) events: Vec<AuditEvent>,
    pub(crate) sequence: u64,
    pub(crate) last_hash: String,
}

/// An in-memory, append-only audit writer backed by a SHA-256 hash chain.
pub struct InMemoryAuditWriter {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    pub fn new() -> Self {
        InMemoryAuditWriter {
            state: Arc::new(Mutex::new(InMemoryState {
                events: Vec::new(),
                sequence: 0,
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
            })),
        }
    }

    /// Export a sealed `AuditLog` containing all events written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.state.lock().expect("audit state lock poisoned");
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            events: state.events.clone(),
            finalized_at: chrono::Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("audit state lock poisoned");
        crate::chain::verify_chain(&state.events)
    }
}

impl Default for InMemoryAuditWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: AuditRecord) -> AbxResult<()> {
        let mut state = self.state.lock().map_err(|e| AbxError::Io {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(sequence, &record, &prev_hash);

        let request_id = record.request_id;
        let event = AuditEvent {
            sequence,
            record,
            prev_hash,
            this_hash: this_hash.clone(),
        };

        state.events.push(event);
        state.sequence += 1;
        state.last_hash = this_hash;
        drop(state);

        info!(request_id = %request_id, "audit record appended to in-memory chain");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abx_contracts::audit::AuditInput;
    use abx_contracts::recommendation::RequestId;
    use chrono::Utc;

    fn make_record() -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now(),
            request_id: RequestId::new(),
            status: "ok".to_string(),
            input: AuditInput::default(),
            infection_category: Some("cystitis".to_string()),
            allergy_classification: Some("NoAllergy".to_string()),
            pregnancy_state: false,
            renal_band: Some("over_50".to_string()),
            chosen_drug_ids: vec!["nitrofurantoin".to_string()],
            confidence: Some(0.9),
            duration_ms: 2,
            provenance: None,
            error: None,
        }
    }

    #[test]
    fn hash_chain_integrity_after_sequential_writes() {
        let writer = InMemoryAuditWriter::new();
        writer.write(make_record()).unwrap();
        writer.write(make_record()).unwrap();
        writer.write(make_record()).unwrap();
        assert!(writer.verify_integrity());
    }

    #[test]
    fn tampering_with_a_stored_event_breaks_the_chain() {
        let writer = InMemoryAuditWriter::new();
        writer.write(make_record()).unwrap();
        writer.write(make_record()).unwrap();

        {
            let mut state = writer.state.lock().unwrap();
            state.events[0].record.status = "tampered".to_string();
        }

        assert!(!writer.verify_integrity());
    }

    #[test]
    fn first_event_links_to_genesis() {
        let writer = InMemoryAuditWriter::new();
        writer.write(make_record()).unwrap();
        let log = writer.export_log();
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
    }

    #[test]
    fn sequence_numbers_are_monotonic_with_no_gaps() {
        let writer = InMemoryAuditWriter::new();
        for _ in 0..3 {
            writer.write(make_record()).unwrap();
        }
        let log = writer.export_log();
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
    }

    #[test]
    fn empty_chain_is_valid() {
        let writer = InMemoryAuditWriter::new();
        assert!(writer.verify_integrity());
        assert_eq!(writer.export_log().terminal_hash, "");
    }
}
