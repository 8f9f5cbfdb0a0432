//! Control effectiveness reporting.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custodia_contracts::{error::CustodiaResult, event::RiskLevel};
use custodia_core::traits::AuditStore;

/// Per-objective rollup of the events evidencing a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub objective: String,
    pub events: u64,
    pub high_risk_events: u64,
}

/// Aggregated view of what the audit trail evidences over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlReport {
    pub generated_at: DateTime<Utc>,
    pub total_events: u64,
    pub financial_events: u64,
    pub by_category: BTreeMap<String, u64>,
    pub by_risk: BTreeMap<String, u64>,
    pub controls: Vec<ControlSummary>,
}

/// Roll up stored events per control objective, category, and risk level.
///
/// Events without a `control_objective` count toward the totals but not
/// toward any control summary.
pub fn control_effectiveness(
    store: &dyn AuditStore,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> CustodiaResult<ControlReport> {
    let snapshot = store.read_range(from, to)?;

    let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_risk: BTreeMap<String, u64> = BTreeMap::new();
    let mut per_control: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    let mut financial_events = 0u64;

    for event in &snapshot.events {
        *by_category.entry(event.event_category.clone()).or_default() += 1;
        *by_risk.entry(event.risk_level.to_string()).or_default() += 1;
        if event.financial_impact {
            financial_events += 1;
        }
        if let Some(objective) = &event.control_objective {
            let entry = per_control.entry(objective.clone()).or_default();
            entry.0 += 1;
            if event.risk_level >= RiskLevel::High {
                entry.1 += 1;
            }
        }
    }

    let controls = per_control
        .into_iter()
        .map(|(objective, (events, high_risk_events))| ControlSummary {
            objective,
            events,
            high_risk_events,
        })
        .collect();

    Ok(ControlReport {
        generated_at: Utc::now(),
        total_events: snapshot.events.len() as u64,
        financial_events,
        by_category,
        by_risk,
        controls,
    })
}
