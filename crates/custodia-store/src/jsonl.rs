//! Durable JSONL implementation of `AuditStore`.
//!
//! One JSON object per line, append-only, flushed per commit. On open the
//! store replays the file to restore its chain cursor: the next sequence
//! number and the last chain digest. Restore checks structure only (every
//! line parses, sequence numbering is continuous); digest verification is
//! deliberately left to the integrity verifier so that a tampered log
//! remains readable and can be reported on rather than refusing to open.
//!
//! The write path holds one mutex across "read cursor, digest, write line,
//! advance cursor", which is the same single-writer discipline as the
//! in-memory store. The cursor only advances after the line is flushed, so
//! a failed write leaves the logical log unchanged.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::info;

use custodia_chain::{canonical_bytes, chain_digest, event_digest, ChainSecret, GENESIS_CHAIN_DIGEST};
use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::{AuditEvent, AuditEventInput, EventId},
    store::{AppendReceipt, RangeSnapshot},
};
use custodia_core::traits::AuditStore;

use crate::snapshot_range;

/// The append cursor: everything the writer must read-then-advance
/// atomically.
#[derive(Debug)]
struct WriterState {
    sequence: u64,
    last_digest: String,
}

/// A file-backed, append-only audit store (one JSON object per line).
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    secret: Arc<ChainSecret>,
    state: Mutex<WriterState>,
}

impl JsonlStore {
    /// Open (or create) the log at `path`, restoring the chain cursor from
    /// any existing rows.
    ///
    /// # Errors
    ///
    /// `Storage` when the parent directory cannot be created, an existing
    /// line does not parse, or the sequence numbering is broken. A log with
    /// valid structure but tampered digests opens normally; run the
    /// verifier to get the report.
    pub fn open(path: impl Into<PathBuf>, secret: Arc<ChainSecret>) -> CustodiaResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CustodiaError::storage(format!(
                        "failed to create log directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let (sequence, last_digest) = Self::restore_state(&path)?;
        info!(path = %path.display(), sequence, "audit log opened");

        Ok(Self {
            path,
            secret,
            state: Mutex::new(WriterState {
                sequence,
                last_digest,
            }),
        })
    }

    fn lock(&self) -> CustodiaResult<MutexGuard<'_, WriterState>> {
        self.state
            .lock()
            .map_err(|e| CustodiaError::storage(format!("store lock poisoned: {}", e)))
    }

    /// Replay the file to find the next sequence number and last digest.
    fn restore_state(path: &Path) -> CustodiaResult<(u64, String)> {
        if !path.exists() {
            return Ok((0, GENESIS_CHAIN_DIGEST.to_string()));
        }

        let mut expected_seq: u64 = 0;
        let mut last_digest = GENESIS_CHAIN_DIGEST.to_string();

        for (line_num, line) in Self::read_lines(path)?.into_iter().enumerate() {
            let event: AuditEvent = serde_json::from_str(&line).map_err(|e| {
                CustodiaError::storage(format!(
                    "corrupt audit log '{}' at line {}: {}",
                    path.display(),
                    line_num + 1,
                    e
                ))
            })?;

            if event.sequence != expected_seq {
                return Err(CustodiaError::storage(format!(
                    "audit log '{}' has broken sequence at line {}: expected {}, found {}",
                    path.display(),
                    line_num + 1,
                    expected_seq,
                    event.sequence
                )));
            }

            last_digest = event.chain_hash;
            expected_seq += 1;
        }

        Ok((expected_seq, last_digest))
    }

    fn read_lines(path: &Path) -> CustodiaResult<Vec<String>> {
        let file = File::open(path).map_err(|e| {
            CustodiaError::storage(format!("failed to open '{}': {}", path.display(), e))
        })?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                CustodiaError::storage(format!("failed to read '{}': {}", path.display(), e))
            })?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// Parse every stored row in file order.
    fn read_events(&self) -> CustodiaResult<Vec<AuditEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        for (line_num, line) in Self::read_lines(&self.path)?.into_iter().enumerate() {
            let event: AuditEvent = serde_json::from_str(&line).map_err(|e| {
                CustodiaError::storage(format!(
                    "corrupt audit log '{}' at line {}: {}",
                    self.path.display(),
                    line_num + 1,
                    e
                ))
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

impl AuditStore for JsonlStore {
    fn append(&self, input: AuditEventInput) -> CustodiaResult<AppendReceipt> {
        let mut state = self.lock()?;

        let id = EventId::new();
        let timestamp = Utc::now();
        let sequence = state.sequence;

        let mut event = AuditEvent::from_input(input, id, sequence, timestamp);
        let canonical = canonical_bytes(&event)?;
        let event_hash = event_digest(&canonical);
        let chain_hash = chain_digest(&self.secret, &state.last_digest, &event_hash);
        event.event_hash = event_hash.clone();
        event.chain_hash = chain_hash.clone();

        let json = serde_json::to_string(&event)
            .map_err(|e| CustodiaError::storage(format!("failed to serialize event: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                CustodiaError::storage(format!("failed to open '{}': {}", self.path.display(), e))
            })?;
        writeln!(file, "{}", json).map_err(|e| {
            CustodiaError::storage(format!("failed to append to '{}': {}", self.path.display(), e))
        })?;
        file.flush().map_err(|e| {
            CustodiaError::storage(format!("failed to flush '{}': {}", self.path.display(), e))
        })?;

        // The cursor advances only after the row is durably written.
        state.sequence += 1;
        state.last_digest = chain_hash.clone();

        Ok(AppendReceipt {
            id,
            sequence,
            timestamp,
            event_digest: event_hash,
            chain_digest: chain_hash,
        })
    }

    /// Snapshot read: the file is parsed while holding the writer lock so
    /// the result is a consistent prefix, never a partially committed row.
    fn read_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CustodiaResult<RangeSnapshot> {
        let _state = self.lock()?;
        let events = self.read_events()?;
        Ok(snapshot_range(events, from, to))
    }

    fn last_chain_digest(&self) -> CustodiaResult<String> {
        Ok(self.lock()?.last_digest.clone())
    }

    fn event_count(&self) -> CustodiaResult<u64> {
        Ok(self.lock()?.sequence)
    }
}
