//! Financial transaction inputs and status lifecycle.
//!
//! A financial transaction is not stored separately: it is logged as an
//! `AuditEvent` with `event_type = "financial_transaction"`, and every
//! status change afterwards is itself a chained event referencing the same
//! transaction id. The history of a transaction is reconstructed from the
//! chain, never held in a mutable row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CustodiaError;

/// Caller-supplied fields for logging a financial transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransactionInput {
    /// Stable transaction identifier. Generated when absent.
    pub transaction_id: Option<String>,
    /// e.g. `"claim_payment"`, `"premium_refund"`.
    pub transaction_type: String,
    /// Monetary amount in major units. Must be finite and non-negative.
    pub amount: f64,
    /// ISO 4217 currency code, e.g. `"USD"`.
    pub currency: String,
    /// The business object the money movement concerns.
    pub entity_type: String,
    pub entity_id: String,

    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub request_id: Option<String>,

    pub description: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for FinancialTransactionInput {
    fn default() -> Self {
        Self {
            transaction_id: None,
            transaction_type: String::new(),
            amount: 0.0,
            currency: String::new(),
            entity_type: String::new(),
            entity_id: String::new(),
            user_id: None,
            session_id: None,
            request_id: None,
            description: String::new(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Lifecycle states of a logged financial transaction.
///
/// The expected progression is `pending` then `approved` then one of
/// `processed`, `failed`, or `reversed`. Each change is recorded as a new
/// chained event; the original row is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Processed,
    Failed,
    Reversed,
}

impl TransactionStatus {
    /// Lowercase name as it appears in stored rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Reversed => "reversed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = CustodiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            "reversed" => Ok(Self::Reversed),
            other => Err(CustodiaError::validation(format!(
                "unknown transaction status '{}'",
                other
            ))),
        }
    }
}
