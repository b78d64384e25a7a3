//! Error types for the domain agents
//!
//! Covers:
//! - Malformed or empty document input
//! - Unknown verticals / agent ids
//! - Pattern tables that fail to compile
//! - Unexpected failures inside a pipeline stage

/// Domain agent error type
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Input is absent, malformed, or has empty content
    #[error("validation failed: {0}")]
    Validation(String),

    /// No agent registered for the requested vertical or id
    #[error("no domain agent registered for '{0}'")]
    NotFound(String),

    /// A pattern table entry is not a valid regular expression
    #[error("invalid pattern for field '{field}': {source}")]
    Pattern {
        /// Field the pattern extracts
        field: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Unexpected failure inside a pipeline stage
    #[error("processing failed during {stage}: {message}")]
    Processing {
        /// Stage that failed
        stage: &'static str,
        /// Failure description
        message: String,
    },
}

impl DomainError {
    /// Build a validation error
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a processing error for a named stage
    #[inline]
    pub fn processing(stage: &'static str, message: impl ToString) -> Self {
        Self::Processing {
            stage,
            message: message.to_string(),
        }
    }

    /// Whether the caller supplied bad input (as opposed to an internal failure)
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = DomainError::validation("content is empty");
        assert!(err.to_string().contains("validation failed"));
        assert!(err.is_client_error());
    }

    #[test]
    fn processing_is_not_client_error() {
        let err = DomainError::processing("sections", "serialization failed");
        assert!(err.to_string().contains("sections"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn not_found_names_vertical() {
        let err = DomainError::NotFound("aerospace".to_string());
        assert!(err.to_string().contains("aerospace"));
    }
}
