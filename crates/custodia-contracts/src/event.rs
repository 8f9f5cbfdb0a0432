//! Audit event types.
//!
//! `AuditEventInput` is what collaborators hand to the trail manager.
//! `AuditEvent` is the stored, immutable form: the input fields plus the
//! identifiers, timestamp, and digests assigned by the append store at
//! commit time. Once a row is committed no field is ever mutated;
//! corrections are new events referencing the original by `entity_id` or
//! `metadata`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a committed audit event, assigned at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new, unique event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Risk classification attached to every audit event.
///
/// Variant order matters: `Low < Medium < High < Critical`, so reports can
/// filter with a simple comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Lowercase name as it appears in stored rows and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller-supplied portion of an audit event.
///
/// Open key/value payloads (`event_data`, `metadata`) use `BTreeMap` so key
/// order is structural: two semantically equal inputs canonicalize to the
/// same bytes regardless of how the caller assembled them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEventInput {
    /// Event taxonomy, e.g. `"financial_transaction"`.
    pub event_type: String,
    /// Event taxonomy, e.g. `"transaction_processing"`.
    pub event_category: String,
    /// Event taxonomy, e.g. `"create"`, `"status_change"`.
    pub event_action: String,
    /// The business object this event concerns.
    pub entity_type: String,
    pub entity_id: String,

    // Optional provenance context.
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub transaction_id: Option<String>,

    /// Marks events that require stricter retention and controls.
    pub financial_impact: bool,
    /// Free-text statement of what control this event evidences.
    pub control_objective: Option<String>,
    pub risk_level: RiskLevel,
    /// Human-readable summary.
    pub description: String,

    /// Opaque snapshots for change events.
    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,

    /// Open payload, canonicalized in sorted key order.
    pub event_data: BTreeMap<String, serde_json::Value>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for AuditEventInput {
    fn default() -> Self {
        Self {
            event_type: String::new(),
            event_category: String::new(),
            event_action: String::new(),
            entity_type: String::new(),
            entity_id: String::new(),
            user_id: None,
            session_id: None,
            ip_address: None,
            user_agent: None,
            request_id: None,
            transaction_id: None,
            financial_impact: false,
            control_objective: None,
            risk_level: RiskLevel::Low,
            description: String::new(),
            before_state: None,
            after_state: None,
            event_data: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }
}

/// A committed, immutable audit event as persisted by the append store.
///
/// `sequence` is the ordering key, assigned by the store at commit time.
/// `timestamp` is informational only and must not be used to reconstruct
/// order. `event_hash` commits to every semantic field; `chain_hash` binds
/// this event to the entire preceding sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: EventId,
    /// Monotonic position in the chain, starting at 0. Gapless, fork-free.
    pub sequence: u64,

    pub event_type: String,
    pub event_category: String,
    pub event_action: String,
    pub entity_type: String,
    pub entity_id: String,

    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub transaction_id: Option<String>,

    pub financial_impact: bool,
    pub control_objective: Option<String>,
    pub risk_level: RiskLevel,
    pub description: String,

    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,

    pub event_data: BTreeMap<String, serde_json::Value>,
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// Assigned by the store at commit time; never client-supplied.
    pub timestamp: DateTime<Utc>,

    /// SHA-256 (lowercase hex) of the canonical semantic fields.
    pub event_hash: String,
    /// HMAC-SHA256 (lowercase hex) over the previous chain hash and this
    /// event's hash.
    pub chain_hash: String,
    /// Reserved for external signer integration.
    pub digital_signature: Option<String>,
}

impl AuditEvent {
    /// Assemble a stored event from validated input plus the values the
    /// store assigns at commit time. Digest fields start empty; the store
    /// fills them inside its append critical section.
    pub fn from_input(
        input: AuditEventInput,
        id: EventId,
        sequence: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sequence,
            event_type: input.event_type,
            event_category: input.event_category,
            event_action: input.event_action,
            entity_type: input.entity_type,
            entity_id: input.entity_id,
            user_id: input.user_id,
            session_id: input.session_id,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            request_id: input.request_id,
            transaction_id: input.transaction_id,
            financial_impact: input.financial_impact,
            control_objective: input.control_objective,
            risk_level: input.risk_level,
            description: input.description,
            before_state: input.before_state,
            after_state: input.after_state,
            event_data: input.event_data,
            metadata: input.metadata,
            timestamp,
            event_hash: String::new(),
            chain_hash: String::new(),
            digital_signature: None,
        }
    }
}
