//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. canonical JSON of the audit record (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use abx_contracts::audit::AuditRecord;

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `record` cannot be serialized to JSON, which cannot happen for
/// the well-formed `AuditRecord` type.
pub fn hash_event(sequence: u64, record: &AuditRecord, prev_hash: &str) -> String {
    let record_json =
        serde_json::to_vec(record).expect("AuditRecord must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a hash chain.
///
/// Returns `true` when every event's `prev_hash` links to the preceding
/// event's `this_hash` (or `GENESIS_HASH` for the first event) and every
/// `this_hash` matches the value recomputed from its own fields. An empty
/// chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_event(event.sequence, &event.record, &event.prev_hash);
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = event.this_hash.clone();
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use abx_contracts::audit::AuditInput;
    use abx_contracts::recommendation::RequestId;
    use chrono::Utc;

    fn sample_record() -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now(),
            request_id: RequestId::new(),
            status: "ok".to_string(),
            input: AuditInput::default(),
            infection_category: Some("pyelonephritis".to_string()),
            allergy_classification: Some("NoAllergy".to_string()),
            pregnancy_state: false,
            renal_band: Some("over_50".to_string()),
            chosen_drug_ids: vec!["ceftriaxone".to_string()],
            confidence: Some(0.9),
            duration_ms: 1,
            provenance: None,
            error: None,
        }
    }

    #[test]
    fn same_inputs_hash_identically() {
        let r = sample_record();
        let h1 = hash_event(0, &r, AuditEvent::GENESIS_HASH);
        let h2 = hash_event(0, &r, AuditEvent::GENESIS_HASH);
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_sequence_changes_hash() {
        let r = sample_record();
        let h1 = hash_event(0, &r, AuditEvent::GENESIS_HASH);
        let h2 = hash_event(1, &r, AuditEvent::GENESIS_HASH);
        assert_ne!(h1, h2);
    }

    #[test]
    fn empty_chain_is_valid() {
        assert!(verify_chain(&[]));
    }
}
