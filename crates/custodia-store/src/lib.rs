//! # custodia-store
//!
//! Append-only persistence for the CUSTODIA audit trail.
//!
//! Two implementations of the `AuditStore` trait:
//!
//! - [`InMemoryStore`] — reference implementation, used by tests and
//!   short-lived tooling.
//! - [`JsonlStore`]    — durable JSONL file, restores its chain cursor on
//!   open.
//!
//! Both serialize every append through an internal mutex: one logical
//! writer, total commit order, no chain forks. Sequence numbers and
//! timestamps are assigned at commit time inside the critical section;
//! timestamps are informational, the sequence is the ordering key.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;

use chrono::{DateTime, Utc};

use custodia_chain::GENESIS_CHAIN_DIGEST;
use custodia_contracts::{event::AuditEvent, store::RangeSnapshot};

/// Cut a timestamp window out of an ordered event list, carrying the chain
/// anchor the verifier needs.
///
/// The window is inclusive on both ends. When it starts at the head of the
/// log the anchor is the genesis constant and the snapshot is absolute;
/// otherwise the anchor is the stored chain hash of the predecessor row and
/// any verification over it is relative to that stored value.
pub(crate) fn snapshot_range(
    events: Vec<AuditEvent>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> RangeSnapshot {
    let start = match from {
        None => 0,
        Some(f) => events
            .iter()
            .position(|e| e.timestamp >= f)
            .unwrap_or(events.len()),
    };

    let (preceding_chain_digest, starts_at_genesis) = if start == 0 {
        (GENESIS_CHAIN_DIGEST.to_string(), true)
    } else {
        (events[start - 1].chain_hash.clone(), false)
    };

    let events = events
        .into_iter()
        .skip(start)
        .filter(|e| to.map_or(true, |t| e.timestamp <= t))
        .collect();

    RangeSnapshot {
        preceding_chain_digest,
        starts_at_genesis,
        events,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use custodia_chain::{
        canonical_bytes, chain_digest, event_digest, ChainSecret, GENESIS_CHAIN_DIGEST,
    };
    use custodia_contracts::event::{AuditEvent, AuditEventInput, RiskLevel};
    use custodia_core::traits::AuditStore;

    use super::{InMemoryStore, JsonlStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn test_secret() -> Arc<ChainSecret> {
        Arc::new(ChainSecret::new(b"store-test-secret".to_vec()).unwrap())
    }

    fn make_input(entity_id: &str) -> AuditEventInput {
        AuditEventInput {
            event_type: "compliance_check".to_string(),
            event_category: "claim_handling".to_string(),
            event_action: "evaluate".to_string(),
            entity_type: "claim".to_string(),
            entity_id: entity_id.to_string(),
            risk_level: RiskLevel::Low,
            description: format!("check on {}", entity_id),
            ..Default::default()
        }
    }

    /// Walk a stored chain and assert every digest recomputes from the
    /// stored fields, exactly as the verifier would.
    fn assert_chain_valid(secret: &ChainSecret, events: &[AuditEvent]) {
        let mut prev = GENESIS_CHAIN_DIGEST.to_string();
        for event in events {
            let recomputed = event_digest(&canonical_bytes(event).unwrap());
            assert_eq!(recomputed, event.event_hash, "event digest must recompute");
            let link = chain_digest(secret, &prev, &recomputed);
            assert_eq!(link, event.chain_hash, "chain digest must recompute");
            prev = event.chain_hash.clone();
        }
    }

    // ── InMemoryStore ─────────────────────────────────────────────────────────

    #[test]
    fn append_assigns_sequence_id_and_timestamp() {
        let store = InMemoryStore::new(test_secret());

        let a = store.append(make_input("claim-1")).unwrap();
        let b = store.append(make_input("claim-2")).unwrap();

        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);
        assert_ne!(a.id, b.id);
        assert_eq!(store.event_count().unwrap(), 2);
    }

    #[test]
    fn empty_store_reports_genesis_digest() {
        let store = InMemoryStore::new(test_secret());
        assert_eq!(store.last_chain_digest().unwrap(), GENESIS_CHAIN_DIGEST);
    }

    #[test]
    fn appended_chain_recomputes_from_stored_fields() {
        let secret = test_secret();
        let store = InMemoryStore::new(secret.clone());

        for i in 0..5 {
            store.append(make_input(&format!("claim-{}", i))).unwrap();
        }

        let snapshot = store.read_range(None, None).unwrap();
        assert_eq!(snapshot.events.len(), 5);
        assert!(snapshot.starts_at_genesis);
        assert_chain_valid(&secret, &snapshot.events);

        // The store's cursor matches the last committed row.
        assert_eq!(
            store.last_chain_digest().unwrap(),
            snapshot.events.last().unwrap().chain_hash
        );
    }

    #[test]
    fn tampering_with_a_stored_row_breaks_recomputation() {
        let secret = test_secret();
        let store = InMemoryStore::new(secret.clone());
        for i in 0..3 {
            store.append(make_input(&format!("claim-{}", i))).unwrap();
        }

        {
            let mut state = store.state.lock().unwrap();
            state.events[1].description = "TAMPERED".to_string();
        }

        let snapshot = store.read_range(None, None).unwrap();
        let event = &snapshot.events[1];
        let recomputed = event_digest(&canonical_bytes(event).unwrap());
        assert_ne!(
            recomputed, event.event_hash,
            "a mutated row must no longer match its stored event digest"
        );
    }

    #[test]
    fn concurrent_appends_produce_one_gapless_chain() {
        let secret = test_secret();
        let store = Arc::new(InMemoryStore::new(secret.clone()));

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store.append(make_input(&format!("claim-{}", i))).unwrap()
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.read_range(None, None).unwrap();
        assert_eq!(snapshot.events.len(), 100, "every append must commit");

        // One linear, gapless sequence in storage order.
        for (idx, event) in snapshot.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }

        // And a single unforked chain across all writers.
        assert_chain_valid(&secret, &snapshot.events);
    }

    // ── Range snapshots ───────────────────────────────────────────────────────

    #[test]
    fn range_snapshot_carries_predecessor_anchor() {
        let store = InMemoryStore::new(test_secret());
        for i in 0..4 {
            store.append(make_input(&format!("claim-{}", i))).unwrap();
            // Distinct commit timestamps so the window bounds are unambiguous.
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let all = store.read_range(None, None).unwrap();
        let cutoff = all.events[2].timestamp;

        let window = store.read_range(Some(cutoff), None).unwrap();
        assert!(!window.starts_at_genesis);
        assert_eq!(
            window.preceding_chain_digest, all.events[1].chain_hash,
            "the anchor must be the stored chain hash of the predecessor row"
        );
        assert_eq!(window.events.first().unwrap().sequence, 2);
    }

    #[test]
    fn range_snapshot_filters_upper_bound_inclusive() {
        let store = InMemoryStore::new(test_secret());
        for i in 0..4 {
            store.append(make_input(&format!("claim-{}", i))).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let all = store.read_range(None, None).unwrap();
        let cutoff = all.events[1].timestamp;

        let window = store.read_range(None, Some(cutoff)).unwrap();
        assert!(window.starts_at_genesis);
        assert_eq!(window.events.len(), 2);
        assert_eq!(window.events.last().unwrap().sequence, 1);
    }

    // ── JsonlStore ────────────────────────────────────────────────────────────

    #[test]
    fn jsonl_store_persists_and_restores_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let secret = test_secret();

        {
            let store = JsonlStore::open(&path, secret.clone()).unwrap();
            for i in 0..3 {
                store.append(make_input(&format!("claim-{}", i))).unwrap();
            }
        }

        // Reopen: the cursor continues where the file left off.
        let store = JsonlStore::open(&path, secret.clone()).unwrap();
        assert_eq!(store.event_count().unwrap(), 3);

        let receipt = store.append(make_input("claim-after-reopen")).unwrap();
        assert_eq!(receipt.sequence, 3);

        let snapshot = store.read_range(None, None).unwrap();
        assert_eq!(snapshot.events.len(), 4);
        assert_chain_valid(&secret, &snapshot.events);
    }

    #[test]
    fn jsonl_store_rejects_corrupt_lines_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let secret = test_secret();

        {
            let store = JsonlStore::open(&path, secret.clone()).unwrap();
            store.append(make_input("claim-1")).unwrap();
        }

        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("not json at all\n");
        std::fs::write(&path, contents).unwrap();

        let err = JsonlStore::open(&path, secret).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("line 2"));
    }

    #[test]
    fn jsonl_store_rejects_broken_sequence_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let secret = test_secret();

        {
            let store = JsonlStore::open(&path, secret.clone()).unwrap();
            for i in 0..3 {
                store.append(make_input(&format!("claim-{}", i))).unwrap();
            }
        }

        // Drop the middle line: structural corruption, not just tampering.
        let lines: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        std::fs::write(&path, format!("{}\n{}\n", lines[0], lines[2])).unwrap();

        let err = JsonlStore::open(&path, secret).unwrap_err();
        assert!(err.to_string().contains("broken sequence"));
    }

    #[test]
    fn jsonl_concurrent_appends_produce_one_gapless_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let secret = test_secret();
        let store = Arc::new(JsonlStore::open(&path, secret.clone()).unwrap());

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store.append(make_input(&format!("claim-{}", i))).unwrap()
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.read_range(None, None).unwrap();
        assert_eq!(snapshot.events.len(), 100);
        for (idx, event) in snapshot.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
        assert_chain_valid(&secret, &snapshot.events);
    }
}
