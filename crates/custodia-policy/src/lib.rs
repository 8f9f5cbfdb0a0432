//! # custodia-policy
//!
//! Risk threshold policy for CUSTODIA financial events.
//!
//! The trail manager asks a `RiskPolicy` to classify every transaction
//! amount. This crate ships the reference implementation,
//! [`risk::TomlRiskPolicy`], whose thresholds come from a TOML document so
//! the financial-controls collaborator can override the defaults without
//! code changes.

pub mod risk;

pub use risk::{RiskThresholds, TomlRiskPolicy};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use custodia_contracts::event::RiskLevel;
    use custodia_core::traits::RiskPolicy;

    use super::TomlRiskPolicy;

    // ── Default thresholds ───────────────────────────────────────────────────

    #[test]
    fn default_policy_matches_documented_thresholds() {
        let policy = TomlRiskPolicy::default();

        assert_eq!(policy.classify(15_000.0), RiskLevel::High);
        assert_eq!(policy.classify(10_000.0), RiskLevel::Medium);
        assert_eq!(policy.classify(5_000.0), RiskLevel::Medium);
        assert_eq!(policy.classify(1_000.0), RiskLevel::Low);
        assert_eq!(policy.classify(250.0), RiskLevel::Low);
        assert_eq!(policy.classify(0.0), RiskLevel::Low);
    }

    // ── TOML loading ─────────────────────────────────────────────────────────

    #[test]
    fn policy_loads_overridden_thresholds() {
        let policy = TomlRiskPolicy::from_toml_str(
            r#"
            [thresholds]
            high = 50000.0
            medium = 5000.0
            "#,
        )
        .unwrap();

        assert_eq!(policy.classify(15_000.0), RiskLevel::Medium);
        assert_eq!(policy.classify(60_000.0), RiskLevel::High);
    }

    #[test]
    fn policy_supports_optional_critical_tier() {
        let policy = TomlRiskPolicy::from_toml_str(
            r#"
            [thresholds]
            high = 10000.0
            medium = 1000.0
            critical = 100000.0
            "#,
        )
        .unwrap();

        assert_eq!(policy.classify(150_000.0), RiskLevel::Critical);
        assert_eq!(policy.classify(50_000.0), RiskLevel::High);
    }

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let policy = TomlRiskPolicy::from_toml_str("").unwrap();
        assert_eq!(policy.classify(15_000.0), RiskLevel::High);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = TomlRiskPolicy::from_toml_str("thresholds = 'not a table'").unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn inconsistent_thresholds_are_rejected() {
        let err = TomlRiskPolicy::from_toml_str(
            r#"
            [thresholds]
            high = 1000.0
            medium = 10000.0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds high threshold"));
    }
}
