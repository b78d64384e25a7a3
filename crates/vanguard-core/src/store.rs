//! Record store seam for prompts and analyses

use crate::error::VanguardError;
use crate::types::{Analysis, AnalysisId, Prompt, PromptId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Prompt and analysis persistence
///
/// Writes are whole-record replacements; the pipeline never patches fields
/// in place.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Store a prompt
    async fn insert_prompt(&self, prompt: Prompt) -> Result<(), VanguardError>;

    /// Prompt by id
    async fn get_prompt(&self, id: PromptId) -> Result<Prompt, VanguardError>;

    /// Store a new analysis
    async fn insert(&self, analysis: Analysis) -> Result<(), VanguardError>;

    /// Analysis by id
    async fn get(&self, id: AnalysisId) -> Result<Analysis, VanguardError>;

    /// Replace an existing analysis
    async fn replace(&self, analysis: Analysis) -> Result<(), VanguardError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct InMemoryAnalysisStore {
    prompts: RwLock<HashMap<PromptId, Prompt>>,
    analyses: RwLock<HashMap<AnalysisId, Analysis>>,
}

impl InMemoryAnalysisStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored analyses
    #[must_use]
    pub fn analysis_count(&self) -> usize {
        self.analyses.read().len()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn insert_prompt(&self, prompt: Prompt) -> Result<(), VanguardError> {
        self.prompts.write().insert(prompt.id, prompt);
        Ok(())
    }

    async fn get_prompt(&self, id: PromptId) -> Result<Prompt, VanguardError> {
        self.prompts
            .read()
            .get(&id)
            .cloned()
            .ok_or(VanguardError::PromptNotFound(id))
    }

    async fn insert(&self, analysis: Analysis) -> Result<(), VanguardError> {
        self.analyses.write().insert(analysis.id, analysis);
        Ok(())
    }

    async fn get(&self, id: AnalysisId) -> Result<Analysis, VanguardError> {
        self.analyses
            .read()
            .get(&id)
            .cloned()
            .ok_or(VanguardError::AnalysisNotFound(id))
    }

    async fn replace(&self, analysis: Analysis) -> Result<(), VanguardError> {
        let mut analyses = self.analyses.write();
        match analyses.get_mut(&analysis.id) {
            Some(slot) => {
                *slot = analysis;
                Ok(())
            }
            None => Err(VanguardError::AnalysisNotFound(analysis.id)),
        }
    }
}
