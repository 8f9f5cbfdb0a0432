//! CUSTODIA — Audit Trail Demo CLI
//!
//! Exercises the full pipeline against a durable JSONL log: append sample
//! compliance and financial events, verify chain integrity, print the
//! reporting rollups, and demonstrate tamper detection by corrupting a row
//! behind the store's back.
//!
//! The chain secret is read from CUSTODIA_CHAIN_SECRET; a missing secret is
//! fatal at startup.
//!
//! Usage:
//!   cargo run -p demo -- log-samples
//!   cargo run -p demo -- verify
//!   cargo run -p demo -- controls
//!   cargo run -p demo -- transactions
//!   cargo run -p demo -- tamper

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custodia_chain::ChainSecret;
use custodia_contracts::{
    error::CustodiaResult,
    event::{AuditEventInput, RiskLevel},
    financial::FinancialTransactionInput,
};
use custodia_core::{traits::AuditStore, AuditTrailManager};
use custodia_policy::TomlRiskPolicy;
use custodia_report::{control_effectiveness, transaction_summary};
use custodia_store::JsonlStore;
use custodia_verify::IntegrityVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTODIA — tamper-evident audit trail demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CUSTODIA audit trail demo",
    long_about = "Appends chained audit events to a JSONL log, verifies chain\n\
                  integrity, and prints compliance reporting rollups."
)]
struct Cli {
    /// Path of the JSONL audit log.
    #[arg(long, default_value = "custodia-audit.jsonl")]
    log: PathBuf,

    /// Risk policy TOML file (defaults to the documented thresholds).
    #[arg(long)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append a sample set of compliance and financial events.
    LogSamples,
    /// Verify the integrity of the whole stored chain.
    Verify,
    /// Print the control effectiveness report.
    Controls,
    /// Print the financial transaction summary.
    Transactions,
    /// Corrupt one stored row, then verify to show detection.
    Tamper,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CustodiaResult<()> {
    let secret = Arc::new(ChainSecret::from_env()?);
    let policy = match &cli.policy {
        Some(path) => TomlRiskPolicy::from_file(path)?,
        None => TomlRiskPolicy::default(),
    };
    let store = Arc::new(JsonlStore::open(&cli.log, secret.clone())?);

    match cli.command {
        Command::LogSamples => log_samples(store, policy),
        Command::Verify => verify(store, secret),
        Command::Controls => controls(store),
        Command::Transactions => transactions(store),
        Command::Tamper => tamper(cli.log, store, secret),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn log_samples(store: Arc<JsonlStore>, policy: TomlRiskPolicy) -> CustodiaResult<()> {
    let manager = AuditTrailManager::new(store, Box::new(policy));

    let event_id = manager.log_event(AuditEventInput {
        event_type: "compliance_check".to_string(),
        event_category: "statute_deadline".to_string(),
        event_action: "evaluate".to_string(),
        entity_type: "claim".to_string(),
        entity_id: "claim-1001".to_string(),
        user_id: Some("adjuster-7".to_string()),
        control_objective: Some("statute_deadline_monitoring".to_string()),
        risk_level: RiskLevel::Low,
        description: "statute deadline evaluated, 45 days remaining".to_string(),
        ..Default::default()
    })?;
    println!("logged compliance check        {}", event_id);

    let tx_id = manager.log_financial_transaction(FinancialTransactionInput {
        transaction_type: "claim_payment".to_string(),
        amount: 15_000.0,
        currency: "USD".to_string(),
        entity_type: "claim".to_string(),
        entity_id: "claim-1001".to_string(),
        user_id: Some("adjuster-7".to_string()),
        description: "settlement payment for claim-1001".to_string(),
        ..Default::default()
    })?;
    println!("logged $15,000 claim payment   {} (high risk per policy)", tx_id);

    let status_id =
        manager.update_transaction_status(&tx_id, "approved", "supervisor-2", "within authority")?;
    println!("logged status change           {}", status_id);

    println!();
    println!(
        "{} events in the chain, last digest {}",
        manager.store().event_count()?,
        &manager.store().last_chain_digest()?[..16]
    );
    Ok(())
}

fn verify(store: Arc<JsonlStore>, secret: Arc<ChainSecret>) -> CustodiaResult<()> {
    let verifier = IntegrityVerifier::new(store, secret);
    let report = verifier.verify(None, None)?;

    println!("chain valid:      {}", report.valid);
    println!("total events:     {}", report.total_events);
    println!("verified events:  {}", report.verified_events);
    if let Some(seq) = report.reduced_trust_from {
        println!("reduced trust from sequence {}", seq);
    }
    for violation in &report.violations {
        println!(
            "  violation at sequence {} ({:?}): expected {} found {}",
            violation.sequence,
            violation.kind,
            &violation.expected[..16.min(violation.expected.len())],
            &violation.actual[..16.min(violation.actual.len())]
        );
    }
    Ok(())
}

fn controls(store: Arc<JsonlStore>) -> CustodiaResult<()> {
    let report = control_effectiveness(store.as_ref(), None, None)?;
    println!("total events:     {}", report.total_events);
    println!("financial events: {}", report.financial_events);
    for (risk, count) in &report.by_risk {
        println!("  risk {:<9} {}", risk, count);
    }
    for control in &report.controls {
        println!(
            "  control '{}': {} events, {} high risk",
            control.objective, control.events, control.high_risk_events
        );
    }
    Ok(())
}

fn transactions(store: Arc<JsonlStore>) -> CustodiaResult<()> {
    let summary = transaction_summary(store.as_ref(), None, None)?;
    println!("transactions:   {}", summary.transactions);
    println!("status changes: {}", summary.status_changes);
    println!("total amount:   {:.2}", summary.total_amount);
    println!("high risk:      {}", summary.high_risk);
    for (status, count) in &summary.by_status {
        println!("  status {:<10} {}", status, count);
    }
    Ok(())
}

/// Corrupt the description of the middle row, writing around the store the
/// way an attacker with file access would, then re-run verification.
fn tamper(
    log: PathBuf,
    store: Arc<JsonlStore>,
    secret: Arc<ChainSecret>,
) -> CustodiaResult<()> {
    use custodia_contracts::error::CustodiaError;

    let count = store.event_count()?;
    if count == 0 {
        return Err(CustodiaError::validation(
            "log is empty; run log-samples first",
        ));
    }
    let target = (count / 2) as usize;

    let contents = std::fs::read_to_string(&log)
        .map_err(|e| CustodiaError::storage(format!("failed to read log: {}", e)))?;
    let mut lines: Vec<String> = contents.lines().map(String::from).collect();
    let mut row: serde_json::Value = serde_json::from_str(&lines[target])
        .map_err(|e| CustodiaError::storage(format!("failed to parse row: {}", e)))?;
    row["description"] = serde_json::json!("amount quietly rewritten after the fact");
    lines[target] = row.to_string();
    std::fs::write(&log, lines.join("\n") + "\n")
        .map_err(|e| CustodiaError::storage(format!("failed to write log: {}", e)))?;

    println!("tampered with stored row at sequence {}", target);
    println!();

    verify(store, secret)
}
