//! Financial transaction summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custodia_contracts::{error::CustodiaResult, event::RiskLevel};
use custodia_core::{manager::FINANCIAL_EVENT_TYPE, traits::AuditStore};

/// Aggregated view of the financial transactions logged over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub generated_at: DateTime<Utc>,
    /// Creation events (one per transaction).
    pub transactions: u64,
    /// Status-change events across all transactions.
    pub status_changes: u64,
    /// Sum of created transaction amounts.
    pub total_amount: f64,
    pub by_status: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub high_risk: u64,
}

/// Roll up financial events: creations by type and amount, status changes
/// by resulting status.
pub fn transaction_summary(
    store: &dyn AuditStore,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> CustodiaResult<TransactionSummary> {
    let snapshot = store.read_range(from, to)?;

    let mut transactions = 0u64;
    let mut status_changes = 0u64;
    let mut total_amount = 0f64;
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
    let mut high_risk = 0u64;

    for event in &snapshot.events {
        if event.event_type != FINANCIAL_EVENT_TYPE {
            continue;
        }
        match event.event_action.as_str() {
            "create" => {
                transactions += 1;
                if let Some(amount) = event.event_data.get("amount").and_then(|v| v.as_f64()) {
                    total_amount += amount;
                }
                if let Some(kind) = event
                    .event_data
                    .get("transaction_type")
                    .and_then(|v| v.as_str())
                {
                    *by_type.entry(kind.to_string()).or_default() += 1;
                }
                if event.risk_level >= RiskLevel::High {
                    high_risk += 1;
                }
            }
            "status_change" => {
                status_changes += 1;
            }
            _ => {}
        }
        if let Some(status) = event.event_data.get("status").and_then(|v| v.as_str()) {
            *by_status.entry(status.to_string()).or_default() += 1;
        }
    }

    Ok(TransactionSummary {
        generated_at: Utc::now(),
        transactions,
        status_changes,
        total_amount,
        by_status,
        by_type,
        high_risk,
    })
}
