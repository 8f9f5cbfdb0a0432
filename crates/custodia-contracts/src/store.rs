//! Types crossing the append-store seam.
//!
//! `AppendReceipt` is what the store returns after committing one row.
//! `RangeSnapshot` is what it returns to readers: an ordered, consistent
//! prefix (or window) of the log plus the chain anchor needed to verify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{AuditEvent, EventId};

/// The values assigned by the append store when a row commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendReceipt {
    pub id: EventId,
    /// Position assigned at commit time; the ordering key of the log.
    pub sequence: u64,
    /// Commit-time wall clock, informational only.
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the canonical event fields (lowercase hex).
    pub event_digest: String,
    /// HMAC chain digest binding this row to its predecessor.
    pub chain_digest: String,
}

/// An ordered, consistent window of stored events.
///
/// `preceding_chain_digest` is the chain digest immediately before the first
/// event in `events`: the genesis constant when the window starts at the
/// head of the log, otherwise the stored chain hash of the predecessor row.
/// A verifier anchored on a stored predecessor can only claim relative
/// integrity, which is why `starts_at_genesis` travels with the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSnapshot {
    pub preceding_chain_digest: String,
    pub starts_at_genesis: bool,
    pub events: Vec<AuditEvent>,
}
