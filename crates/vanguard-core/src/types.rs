//! Prompt and analysis records

use crate::error::VanguardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;
use vanguard_domain::{DocumentType, DomainInput, DomainOutput, FieldMap};
use vanguard_scoring::{AggregateAssessment, RiskLevel, VanguardTriple};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Ulid);

        impl $name {
            /// Fresh id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Prompt identifier
    PromptId
);
record_id!(
    /// Analysis identifier
    AnalysisId
);

/// A submitted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Identifier
    pub id: PromptId,
    /// Display title
    pub title: String,
    /// Raw document text
    pub content: String,
    /// Vertical alias or agent id
    pub vertical: String,
    /// Document category
    pub document_type: DocumentType,
    /// Explicit field values
    #[serde(default)]
    pub metadata: FieldMap,
    /// Caller context such as `state`
    #[serde(default)]
    pub context: FieldMap,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    /// New prompt with empty metadata and context
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        vertical: impl Into<String>,
        document_type: DocumentType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: PromptId::new(),
            title: title.into(),
            content: content.into(),
            vertical: vertical.into(),
            document_type,
            metadata: FieldMap::new(),
            context: FieldMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a metadata value
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a context value
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Domain agent input for this prompt
    #[must_use]
    pub fn to_input(&self) -> DomainInput {
        DomainInput {
            document_type: self.document_type,
            content: self.content.clone(),
            metadata: self.metadata.clone(),
            context: self.context.clone(),
        }
    }
}

/// Analysis lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Submitted, not yet picked up
    Pending,
    /// Pipeline running
    Processing,
    /// Results stored
    Completed,
    /// Error code and message stored
    Failed,
}

impl AnalysisStatus {
    /// Statuses reachable from `self`
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing],
            Self::Processing => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    /// Validate a transition
    ///
    /// # Errors
    /// `VanguardError::InvalidTransition`.
    pub fn validate_transition(self, to: Self) -> Result<(), VanguardError> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(VanguardError::InvalidTransition { from: self, to })
        }
    }

    /// No further transitions
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure recorded verbatim on a failed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    /// Stable error code
    pub code: String,
    /// Error message
    pub message: String,
}

impl From<&VanguardError> for AnalysisFailure {
    fn from(err: &VanguardError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Persisted result of running one prompt through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Identifier
    pub id: AnalysisId,
    /// Source prompt
    pub prompt_id: PromptId,
    /// Requested vertical
    pub vertical: String,
    /// Lifecycle status
    pub status: AnalysisStatus,
    /// Domain agent output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_agent_result: Option<DomainOutput>,
    /// Security, integrity and accuracy results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vanguard_results: Option<VanguardTriple>,
    /// Mean lane score, 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    /// Aggregate risk level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Failure details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AnalysisFailure>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
    /// When a terminal status was reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Analysis {
    /// Pending analysis for a prompt
    #[must_use]
    pub fn pending(prompt: &Prompt) -> Self {
        let now = Utc::now();
        Self {
            id: AnalysisId::new(),
            prompt_id: prompt.id,
            vertical: prompt.vertical.clone(),
            status: AnalysisStatus::Pending,
            domain_agent_result: None,
            vanguard_results: None,
            overall_score: None,
            risk_level: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Pending to processing
    ///
    /// # Errors
    /// `VanguardError::InvalidTransition`.
    pub fn begin_processing(&self) -> Result<Self, VanguardError> {
        self.transition(AnalysisStatus::Processing)
    }

    /// Processing to completed with results
    ///
    /// # Errors
    /// `VanguardError::InvalidTransition`.
    pub fn complete(
        &self,
        output: DomainOutput,
        triple: VanguardTriple,
        assessment: &AggregateAssessment,
    ) -> Result<Self, VanguardError> {
        let mut next = self.transition(AnalysisStatus::Completed)?;
        next.domain_agent_result = Some(output);
        next.vanguard_results = Some(triple);
        next.overall_score = Some(assessment.overall_score);
        next.risk_level = Some(assessment.risk_level);
        next.completed_at = Some(next.updated_at);
        Ok(next)
    }

    /// Processing to failed, recording the error verbatim
    ///
    /// # Errors
    /// `VanguardError::InvalidTransition`.
    pub fn fail(&self, err: &VanguardError) -> Result<Self, VanguardError> {
        let mut next = self.transition(AnalysisStatus::Failed)?;
        next.error = Some(AnalysisFailure::from(err));
        next.completed_at = Some(next.updated_at);
        Ok(next)
    }

    fn transition(&self, to: AnalysisStatus) -> Result<Self, VanguardError> {
        self.status.validate_transition(to)?;
        let mut next = self.clone();
        next.status = to;
        next.updated_at = Utc::now();
        Ok(next)
    }
}
