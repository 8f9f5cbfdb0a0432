//! In-memory implementation of `AuditStore`.
//!
//! `InMemoryStore` is the reference implementation: all rows live in a
//! `Vec` behind a `Mutex`. It backs tests and short-lived tooling; durable
//! deployments use `JsonlStore`.
//!
//! The mutex is the single-writer discipline in its simplest form. Every
//! append runs "assign identity, canonicalize, digest, link, push" while
//! holding the lock, so no two appends can ever read the same predecessor
//! digest and fork the chain.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use custodia_chain::{canonical_bytes, chain_digest, event_digest, ChainSecret, GENESIS_CHAIN_DIGEST};
use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::{AuditEvent, AuditEventInput, EventId},
    store::{AppendReceipt, RangeSnapshot},
};
use custodia_core::traits::AuditStore;

use crate::snapshot_range;

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryStore`.
pub(crate) struct StoreState {
    /// All committed rows in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// The chain digest of the last committed row, or the genesis constant
    /// before any row has been committed.
    pub(crate) last_digest: String,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, append-only audit store backed by an HMAC chain.
///
/// # Thread safety
///
/// All operations acquire an internal `Mutex`. Any number of threads may
/// share the store behind an `Arc` without further synchronization.
pub struct InMemoryStore {
    secret: Arc<ChainSecret>,
    pub(crate) state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store chained from the genesis constant.
    pub fn new(secret: Arc<ChainSecret>) -> Self {
        Self {
            secret,
            state: Mutex::new(StoreState {
                events: Vec::new(),
                sequence: 0,
                last_digest: GENESIS_CHAIN_DIGEST.to_string(),
            }),
        }
    }

    fn lock(&self) -> CustodiaResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|e| CustodiaError::storage(format!("store lock poisoned: {}", e)))
    }
}

impl AuditStore for InMemoryStore {
    /// Commit one row inside the single-writer critical section.
    ///
    /// Identity, timestamp, and sequence are assigned here, after which the
    /// canonical bytes and both digests are computed and the row is pushed.
    /// Any failure before the push leaves the store untouched.
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

        state.events.push(event);
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

    fn read_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CustodiaResult<RangeSnapshot> {
        let state = self.lock()?;
        Ok(snapshot_range(state.events.clone(), from, to))
    }

    fn last_chain_digest(&self) -> CustodiaResult<String> {
        Ok(self.lock()?.last_digest.clone())
    }

    fn event_count(&self) -> CustodiaResult<u64> {
        Ok(self.lock()?.sequence)
    }
}
