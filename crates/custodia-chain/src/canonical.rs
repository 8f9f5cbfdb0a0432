//! Deterministic canonical serialization of audit events.
//!
//! The event digest is only as trustworthy as the bytes it is computed
//! over, so canonicalization must be stable across time and process
//! restarts: fixed field order, sorted map keys, a fixed UTC timestamp
//! format, no locale dependence. Two semantically equal events always
//! canonicalize to the same byte sequence.
//!
//! Canonical layout (compact JSON, fields in declaration order):
//!   id, taxonomy fields, provenance fields, financial_impact,
//!   control_objective, risk_level, description, before/after state,
//!   event_data, metadata, timestamp
//!
//! Excluded by definition: `sequence`, `event_hash`, `chain_hash`,
//! `digital_signature`. The sequence is bound to the event through the
//! chain digest instead.

use std::collections::BTreeMap;

use serde::Serialize;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::{AuditEvent, RiskLevel},
};

/// Fixed timestamp rendering: UTC, microsecond precision, trailing `Z`.
///
/// Chrono's serde default varies fractional precision with the value;
/// pinning the format here keeps the canonical bytes independent of how
/// many trailing zeros a particular commit instant happens to have.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Borrowed view of the hashable subset of an event.
///
/// serde_json emits struct fields in declaration order and `BTreeMap` keys
/// sorted, which together pin the byte layout. `Option` fields serialize as
/// JSON null so the shape is identical whether or not they are present.
#[derive(Serialize)]
struct CanonicalView<'a> {
    id: String,
    event_type: &'a str,
    event_category: &'a str,
    event_action: &'a str,
    entity_type: &'a str,
    entity_id: &'a str,
    user_id: &'a Option<String>,
    session_id: &'a Option<String>,
    ip_address: &'a Option<String>,
    user_agent: &'a Option<String>,
    request_id: &'a Option<String>,
    transaction_id: &'a Option<String>,
    financial_impact: bool,
    control_objective: &'a Option<String>,
    risk_level: RiskLevel,
    description: &'a str,
    before_state: &'a Option<serde_json::Value>,
    after_state: &'a Option<serde_json::Value>,
    event_data: &'a BTreeMap<String, serde_json::Value>,
    metadata: &'a BTreeMap<String, serde_json::Value>,
    timestamp: String,
}

/// Serialize the hashable subset of `event` into its canonical bytes.
///
/// Returns `CustodiaError::Validation` when the payload cannot be
/// serialized, which rejects the event before anything is written.
pub fn canonical_bytes(event: &AuditEvent) -> CustodiaResult<Vec<u8>> {
    let view = CanonicalView {
        id: event.id.to_string(),
        event_type: &event.event_type,
        event_category: &event.event_category,
        event_action: &event.event_action,
        entity_type: &event.entity_type,
        entity_id: &event.entity_id,
        user_id: &event.user_id,
        session_id: &event.session_id,
        ip_address: &event.ip_address,
        user_agent: &event.user_agent,
        request_id: &event.request_id,
        transaction_id: &event.transaction_id,
        financial_impact: event.financial_impact,
        control_objective: &event.control_objective,
        risk_level: event.risk_level,
        description: &event.description,
        before_state: &event.before_state,
        after_state: &event.after_state,
        event_data: &event.event_data,
        metadata: &event.metadata,
        timestamp: event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
    };

    serde_json::to_vec(&view).map_err(|e| CustodiaError::Validation {
        reason: format!("event payload is not serializable: {}", e),
    })
}
