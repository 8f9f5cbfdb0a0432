//! The audit trail manager: the public write API of the subsystem.
//!
//! Collaborators call `log_event`, `log_financial_transaction`, and
//! `update_transaction_status` after any compliance check, document
//! generation, or state transition that must be provably recorded. The
//! manager validates input before any write, then hands the event to the
//! append store, which assigns identity, order, and digests inside its
//! critical section. A call either commits one fully chained row or
//! nothing.
//!
//! Callers that receive an error must treat the triggering business action
//! as not-yet-proven-compliant and retry or escalate, never proceed as if
//! logging succeeded.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::{AuditEvent, AuditEventInput, EventId, RiskLevel},
    financial::{FinancialTransactionInput, TransactionStatus},
};

use crate::traits::{AuditStore, RiskPolicy};

/// Event type stamped on every financial event.
pub const FINANCIAL_EVENT_TYPE: &str = "financial_transaction";

/// Orchestrates validation, canonicalization, hashing, chaining, and
/// storage for every audit event.
///
/// Construct one manager at process start with an explicit store and risk
/// policy, and pass it (or a reference) to every producer. The manager
/// holds no mutable state of its own; all serialization happens in the
/// store.
pub struct AuditTrailManager {
    store: Arc<dyn AuditStore>,
    risk_policy: Box<dyn RiskPolicy>,
}

impl AuditTrailManager {
    pub fn new(store: Arc<dyn AuditStore>, risk_policy: Box<dyn RiskPolicy>) -> Self {
        Self { store, risk_policy }
    }

    /// Access to the underlying store, for wiring the verifier and the
    /// reporting layer against the same log.
    pub fn store(&self) -> Arc<dyn AuditStore> {
        Arc::clone(&self.store)
    }

    /// Validate and append one audit event. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// `Validation` when a required field is empty (nothing is written);
    /// `Storage` when the append store fails to commit.
    pub fn log_event(&self, input: AuditEventInput) -> CustodiaResult<EventId> {
        Self::validate(&input)?;

        let receipt = self.store.append(input)?;
        info!(
            event_id = %receipt.id,
            sequence = receipt.sequence,
            "audit event committed"
        );
        Ok(receipt.id)
    }

    /// Log a financial transaction as a chained audit event.
    ///
    /// The risk level is derived from the injected `RiskPolicy`; the event
    /// is stamped `financial_impact = true` and enters the lifecycle in
    /// `pending` status. Returns the transaction id, generated when the
    /// caller did not supply one.
    pub fn log_financial_transaction(
        &self,
        tx: FinancialTransactionInput,
    ) -> CustodiaResult<String> {
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(CustodiaError::validation(format!(
                "transaction amount must be a non-negative finite number, got {}",
                tx.amount
            )));
        }
        if tx.transaction_type.trim().is_empty() {
            return Err(CustodiaError::validation("transaction_type is required"));
        }
        if tx.currency.trim().is_empty() {
            return Err(CustodiaError::validation("currency is required"));
        }

        let transaction_id = tx
            .transaction_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let risk_level = self.risk_policy.classify(tx.amount);
        debug!(%transaction_id, amount = tx.amount, risk = %risk_level, "classified transaction");

        let mut event_data = tx.metadata.clone();
        event_data.insert("amount".to_string(), serde_json::json!(tx.amount));
        event_data.insert("currency".to_string(), serde_json::json!(tx.currency));
        event_data.insert(
            "transaction_type".to_string(),
            serde_json::json!(tx.transaction_type),
        );
        event_data.insert(
            "status".to_string(),
            serde_json::json!(TransactionStatus::Pending.as_str()),
        );

        let description = if tx.description.trim().is_empty() {
            format!(
                "{} of {} {} recorded",
                tx.transaction_type, tx.amount, tx.currency
            )
        } else {
            tx.description
        };

        let input = AuditEventInput {
            event_type: FINANCIAL_EVENT_TYPE.to_string(),
            event_category: "transaction_processing".to_string(),
            event_action: "create".to_string(),
            entity_type: tx.entity_type,
            entity_id: tx.entity_id,
            user_id: tx.user_id,
            session_id: tx.session_id,
            request_id: tx.request_id,
            transaction_id: Some(transaction_id.clone()),
            financial_impact: true,
            control_objective: Some("financial_transaction_integrity".to_string()),
            risk_level,
            description,
            event_data,
            metadata: tx.metadata,
            ..Default::default()
        };

        self.log_event(input)?;
        Ok(transaction_id)
    }

    /// Record a transaction status change as a new chained event.
    ///
    /// The original transaction row is never mutated; the new event
    /// references it through `transaction_id`.
    pub fn update_transaction_status(
        &self,
        transaction_id: &str,
        new_status: &str,
        updated_by: &str,
        reason: &str,
    ) -> CustodiaResult<EventId> {
        let status: TransactionStatus = new_status.parse()?;
        if transaction_id.trim().is_empty() {
            return Err(CustodiaError::validation("transaction_id is required"));
        }
        if updated_by.trim().is_empty() {
            return Err(CustodiaError::validation("updated_by is required"));
        }

        // Failed and reversed outcomes warrant reviewer attention.
        let risk_level = match status {
            TransactionStatus::Failed | TransactionStatus::Reversed => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };

        let mut event_data = std::collections::BTreeMap::new();
        event_data.insert("status".to_string(), serde_json::json!(status.as_str()));
        event_data.insert("updated_by".to_string(), serde_json::json!(updated_by));
        event_data.insert("reason".to_string(), serde_json::json!(reason));

        let input = AuditEventInput {
            event_type: FINANCIAL_EVENT_TYPE.to_string(),
            event_category: "transaction_processing".to_string(),
            event_action: "status_change".to_string(),
            entity_type: "financial_transaction".to_string(),
            entity_id: transaction_id.to_string(),
            user_id: Some(updated_by.to_string()),
            transaction_id: Some(transaction_id.to_string()),
            financial_impact: true,
            control_objective: Some("financial_transaction_integrity".to_string()),
            risk_level,
            description: format!("transaction {} moved to {}", transaction_id, status),
            event_data,
            ..Default::default()
        };

        self.log_event(input)
    }

    /// Replay the stored chain and return every event referencing the
    /// given transaction, in commit order. This is the transaction's audit
    /// trail: the creation event followed by its status changes.
    pub fn transaction_history(&self, transaction_id: &str) -> CustodiaResult<Vec<AuditEvent>> {
        let snapshot = self.store.read_range(None, None)?;
        Ok(snapshot
            .events
            .into_iter()
            .filter(|e| e.transaction_id.as_deref() == Some(transaction_id))
            .collect())
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Reject events missing required taxonomy or context fields before
    /// anything reaches the store.
    fn validate(input: &AuditEventInput) -> CustodiaResult<()> {
        let required = [
            ("event_type", &input.event_type),
            ("event_category", &input.event_category),
            ("event_action", &input.event_action),
            ("entity_type", &input.entity_type),
            ("description", &input.description),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CustodiaError::validation(format!("{} is required", name)));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
