//! Tracing subscriber setup
//!
//! Metrics are emitted through the `metrics` facade and are no-ops until the
//! host installs a recorder.

use crate::error::VanguardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single line
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = VanguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(VanguardError::config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `level` is used as the filter
/// directive. Returns `false` when a subscriber was already installed, in
/// which case nothing changes.
///
/// # Errors
/// `VanguardError::Config` when `level` is not a valid filter directive.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<bool, VanguardError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| VanguardError::config(format!("invalid log filter '{level}': {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let installed = match format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
    };
    if installed {
        tracing::debug!(level, ?format, "tracing initialised");
    }
    Ok(installed)
}
