//! Tunable domain thresholds
//!
//! These are domain-expert constants with no derivation of their own; they are
//! kept as configuration so they can be adjusted without touching rule code.

use serde::{Deserialize, Serialize};

/// Energy thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EnergyPolicy {
    /// Royalty rate (percent) below which a lease is below market
    pub market_royalty_rate: f64,
    /// Primary term (years) above which a lease is unusually long
    pub max_typical_primary_term_years: f64,
}

impl EnergyPolicy {
    /// Default market royalty rate, percent
    pub const MARKET_ROYALTY_RATE: f64 = 12.5;
    /// Default longest typical primary term, years
    pub const MAX_TYPICAL_PRIMARY_TERM_YEARS: f64 = 5.0;
}

impl Default for EnergyPolicy {
    fn default() -> Self {
        Self {
            market_royalty_rate: Self::MARKET_ROYALTY_RATE,
            max_typical_primary_term_years: Self::MAX_TYPICAL_PRIMARY_TERM_YEARS,
        }
    }
}

/// Government contracting thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GovernmentPolicy {
    /// Contract value above which a subcontracting plan is required (FAR 19.702)
    pub subcontracting_plan_threshold: f64,
    /// Contract value treated as high-value for termination exposure
    pub high_value_threshold: f64,
}

impl Default for GovernmentPolicy {
    fn default() -> Self {
        Self {
            subcontracting_plan_threshold: 750_000.0,
            high_value_threshold: 10_000_000.0,
        }
    }
}

/// Insurance thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct InsurancePolicy {
    /// Per-occurrence limit below which coverage is considered thin
    pub standard_occurrence_limit: f64,
    /// Largest acceptable deductible as a fraction of the coverage limit
    pub max_deductible_ratio: f64,
}

impl Default for InsurancePolicy {
    fn default() -> Self {
        Self {
            standard_occurrence_limit: 1_000_000.0,
            max_deductible_ratio: 0.10,
        }
    }
}

/// Policies for every domain agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainPolicies {
    /// Energy
    pub energy: EnergyPolicy,
    /// Government
    pub government: GovernmentPolicy,
    /// Insurance
    pub insurance: InsurancePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_market_constants() {
        let policies = DomainPolicies::default();
        assert!((policies.energy.market_royalty_rate - 12.5).abs() < f64::EPSILON);
        assert!((policies.government.subcontracting_plan_threshold - 750_000.0).abs() < f64::EPSILON);
        assert!((policies.insurance.max_deductible_ratio - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let policy: EnergyPolicy = serde_json::from_str(r#"{"market_royalty_rate": 15.0}"#).unwrap();
        assert!((policy.market_royalty_rate - 15.0).abs() < f64::EPSILON);
        assert!((policy.max_typical_primary_term_years - 5.0).abs() < f64::EPSILON);
    }
}
