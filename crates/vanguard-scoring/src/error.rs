//! Error types for scoring

/// Scoring error type
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// A lane could not produce a result
    #[error("{lane} lane failed: {message}")]
    Lane {
        /// Lane name
        lane: &'static str,
        /// Failure description
        message: String,
    },

    /// Band or threshold configuration is inconsistent
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// A detector pattern failed to compile
    #[error("invalid detector pattern '{name}': {source}")]
    Pattern {
        /// Detector name
        name: &'static str,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },
}

impl ScoringError {
    /// Build a lane error
    #[inline]
    pub fn lane(lane: &'static str, message: impl ToString) -> Self {
        Self::Lane {
            lane,
            message: message.to_string(),
        }
    }

    /// Whether the failure comes from configuration rather than input
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Pattern { .. })
    }
}
