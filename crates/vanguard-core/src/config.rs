//! Configuration
//!
//! Every section is optional; missing keys take the documented defaults.
//!
//! ```toml
//! [scoring.bands]
//! critical_below = 40.0
//! high_below = 60.0
//! medium_below = 80.0
//!
//! [scoring.lanes]
//! pass_at = 80.0
//! warn_at = 60.0
//!
//! [energy]
//! market_royalty_rate = 12.5
//!
//! [workflow]
//! default_failure_policy = "halt"
//! max_parallel_steps = 4
//! ```

use crate::error::VanguardError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vanguard_domain::{DomainPolicies, EnergyPolicy, GovernmentPolicy, InsurancePolicy};
use vanguard_scoring::ScoringConfig;
use vanguard_workflow::WorkflowConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VanguardConfig {
    /// Lane thresholds and risk bands
    pub scoring: ScoringConfig,
    /// Energy agent thresholds
    pub energy: EnergyPolicy,
    /// Government agent thresholds
    pub government: GovernmentPolicy,
    /// Insurance agent thresholds
    pub insurance: InsurancePolicy,
    /// Workflow engine settings
    pub workflow: WorkflowConfig,
}

impl VanguardConfig {
    /// Parse and validate TOML text
    ///
    /// # Errors
    /// `ConfigParse` for malformed TOML, `Config` when validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, VanguardError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigIo` when the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VanguardError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| VanguardError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// `VanguardError::Config` naming the first offending value.
    pub fn validate(&self) -> Result<(), VanguardError> {
        self.scoring
            .validate()
            .map_err(|e| VanguardError::config(e.to_string()))?;
        self.workflow
            .validate()
            .map_err(|e| VanguardError::config(e.to_string()))?;

        let positive = [
            ("energy.market_royalty_rate", self.energy.market_royalty_rate),
            (
                "energy.max_typical_primary_term_years",
                self.energy.max_typical_primary_term_years,
            ),
            (
                "government.subcontracting_plan_threshold",
                self.government.subcontracting_plan_threshold,
            ),
            ("government.high_value_threshold", self.government.high_value_threshold),
            (
                "insurance.standard_occurrence_limit",
                self.insurance.standard_occurrence_limit,
            ),
            ("insurance.max_deductible_ratio", self.insurance.max_deductible_ratio),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, value)| !(value.is_finite() && *value > 0.0)) {
            return Err(VanguardError::config(format!("{name} must be positive, got {value}")));
        }
        if self.energy.market_royalty_rate > 100.0 {
            return Err(VanguardError::config("energy.market_royalty_rate is a percentage"));
        }
        if self.insurance.max_deductible_ratio > 1.0 {
            return Err(VanguardError::config("insurance.max_deductible_ratio is a fraction"));
        }
        Ok(())
    }

    /// Domain agent policies
    #[must_use]
    pub fn policies(&self) -> DomainPolicies {
        DomainPolicies {
            energy: self.energy.clone(),
            government: self.government.clone(),
            insurance: self.insurance.clone(),
        }
    }
}
