//! Persistent, file-backed implementation of `AuditWriter`.
//!
//! `FileAuditWriter` appends one JSON-Lines record per call to a day-file
//! under its configured directory (`audit-YYYY-MM-DD.log`), continuing the
//! same SHA-256 hash chain `InMemoryAuditWriter` uses. A process-local mutex
//! serializes writes; the chain's `last_hash` lives only in that mutex, so a
//! fresh process starts a fresh chain (days are independent logs, not one
//! chain spanning the file's lifetime).

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use abx_contracts::audit::AuditRecord;
use abx_contracts::error::{AbxError, AbxResult};
use abx_core::traits::AuditWriter;

use crate::{chain::hash_event, event::AuditEvent};

struct FileState {
    sequence: u64,
    last_hash: String,
}

/// Appends audit records to `<dir>/audit-YYYY-MM-DD.log`, one JSON object
/// per line, each line an `AuditEvent` in the running hash chain.
pub struct FileAuditWriter {
    dir: PathBuf,
    state: Mutex<FileState>,
}

impl FileAuditWriter {
    /// `dir` is created if missing. The hash chain starts at genesis for
    /// every new writer instance, regardless of what a prior process already
    /// appended to today's file.
    pub fn new(dir: impl Into<PathBuf>) -> AbxResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileAuditWriter {
            dir,
            state: Mutex::new(FileState {
                sequence: 0,
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
            }),
        })
    }

    fn path_for_today(&self) -> PathBuf {
        self.path_for_date(&Utc::now().format("%Y-%m-%d").to_string())
    }

    fn path_for_date(&self, date: &str) -> PathBuf {
        self.dir.join(format!("audit-{}.log", date))
    }
}

impl AuditWriter for FileAuditWriter {
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

        let line = serde_json::to_string(&event).map_err(|e| AbxError::Io {
            reason: format!("failed to serialize audit event: {}", e),
        })?;

        let path = self.path_for_today();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;

        state.sequence += 1;
        state.last_hash = this_hash;
        drop(state);

        info!(request_id = %request_id, path = %path.display(), "audit record appended to file");
        Ok(())
    }
}

/// Replay and verify the hash chain stored in a single day-file.
pub fn verify_file_chain(path: &Path) -> AbxResult<bool> {
    let contents = fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: AuditEvent = serde_json::from_str(line).map_err(|e| AbxError::Io {
            reason: format!("malformed audit event at line {}: {}", line_no + 1, e),
        })?;
        events.push(event);
    }
    Ok(crate::chain::verify_chain(&events))
}
