//! TOML-driven risk threshold policy.
//!
//! `TomlRiskPolicy` loads amount thresholds from a TOML document and
//! implements the `RiskPolicy` trait from custodia-core. The defaults match
//! the documented policy (amount > 10 000 is high, > 1 000 is medium,
//! otherwise low); the financial-controls collaborator overrides them by
//! shipping its own policy file.
//!
//! Example policy file:
//!
//! ```toml
//! [thresholds]
//! high = 10000.0
//! medium = 1000.0
//! # critical = 100000.0   # optional extra tier
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::RiskLevel,
};
use custodia_core::traits::RiskPolicy;

/// Amount thresholds deserialized from the `[thresholds]` table.
///
/// Omitted fields fall back to the documented defaults, so an operator can
/// override a single tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Amounts strictly above this are high risk.
    #[serde(default = "default_high")]
    pub high: f64,
    /// Amounts strictly above this (and not above `high`) are medium risk.
    #[serde(default = "default_medium")]
    pub medium: f64,
    /// Optional extra tier: amounts strictly above this are critical.
    #[serde(default)]
    pub critical: Option<f64>,
}

fn default_high() -> f64 {
    10_000.0
}

fn default_medium() -> f64 {
    1_000.0
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            critical: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PolicyConfig {
    #[serde(default)]
    thresholds: RiskThresholds,
}

/// A `RiskPolicy` implementation that reads thresholds from TOML.
///
/// Construct via `Default` for the documented policy, or via
/// `from_toml_str` / `from_file` for an operator-supplied one.
#[derive(Debug, Clone, Default)]
pub struct TomlRiskPolicy {
    thresholds: RiskThresholds,
}

impl TomlRiskPolicy {
    /// Parse `s` as TOML and build a policy.
    ///
    /// Returns `CustodiaError::Config` when the TOML is malformed or the
    /// thresholds are inconsistent (medium above high).
    pub fn from_toml_str(s: &str) -> CustodiaResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| CustodiaError::Config {
            reason: format!("failed to parse risk policy TOML: {}", e),
        })?;
        Self::from_thresholds(config.thresholds)
    }

    /// Read the file at `path` and parse it as a TOML risk policy.
    pub fn from_file(path: &Path) -> CustodiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustodiaError::Config {
            reason: format!("failed to read risk policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build a policy from explicit thresholds, validating consistency.
    pub fn from_thresholds(thresholds: RiskThresholds) -> CustodiaResult<Self> {
        if thresholds.medium > thresholds.high {
            return Err(CustodiaError::config(format!(
                "medium threshold {} exceeds high threshold {}",
                thresholds.medium, thresholds.high
            )));
        }
        if let Some(critical) = thresholds.critical {
            if critical < thresholds.high {
                return Err(CustodiaError::config(format!(
                    "critical threshold {} is below high threshold {}",
                    critical, thresholds.high
                )));
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }
}

impl RiskPolicy for TomlRiskPolicy {
    fn classify(&self, amount: f64) -> RiskLevel {
        let level = if self
            .thresholds
            .critical
            .is_some_and(|critical| amount > critical)
        {
            RiskLevel::Critical
        } else if amount > self.thresholds.high {
            RiskLevel::High
        } else if amount > self.thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        debug!(amount, risk = %level, "risk classified");
        level
    }
}
