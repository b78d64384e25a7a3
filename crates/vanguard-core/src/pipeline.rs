//! End-to-end analysis pipeline
//!
//! Prompt -> domain agent -> three Vanguard lanes -> aggregate -> stored
//! Analysis. Each stage runs to completion before the next starts; only the
//! lanes run concurrently.

use crate::config::VanguardConfig;
use crate::error::VanguardError;
use crate::store::AnalysisStore;
use crate::types::{Analysis, AnalysisId, AnalysisStatus, Prompt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vanguard_domain::{DomainAgentRegistry, DomainInput, DomainOutput};
use vanguard_scoring::{AggregateAssessment, Aggregator, VanguardScorer, VanguardTriple};

/// Store-less pipeline result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Domain agent output
    pub domain_agent_result: DomainOutput,
    /// Lane results
    pub vanguard_results: VanguardTriple,
    /// Overall score and risk level
    pub assessment: AggregateAssessment,
}

/// Runs prompts through the domain agents and the Vanguard lanes
#[derive(Clone)]
pub struct AnalysisPipeline {
    registry: Arc<DomainAgentRegistry>,
    scorer: VanguardScorer,
    aggregator: Aggregator,
    store: Arc<dyn AnalysisStore>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("agents", &self.registry.ids())
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    /// Pipeline with the default agents and lanes
    ///
    /// # Errors
    /// `CONFIG_ERROR` when the configuration is invalid or a pattern fails to compile.
    pub fn new(config: &VanguardConfig, store: Arc<dyn AnalysisStore>) -> Result<Self, VanguardError> {
        config.validate()?;
        let registry = DomainAgentRegistry::with_default_agents(&config.policies())?;
        let scorer = VanguardScorer::new(&config.scoring)?;
        Ok(Self::with_components(
            Arc::new(registry),
            scorer,
            Aggregator::new(config.scoring.bands.clone()),
            store,
        ))
    }

    /// Pipeline from pre-built parts
    #[must_use]
    pub fn with_components(
        registry: Arc<DomainAgentRegistry>,
        scorer: VanguardScorer,
        aggregator: Aggregator,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        Self {
            registry,
            scorer,
            aggregator,
            store,
        }
    }

    /// Agent registry
    #[must_use]
    pub fn registry(&self) -> &DomainAgentRegistry {
        &self.registry
    }

    /// Backing store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    /// Analyse one document without touching the store
    ///
    /// # Errors
    /// Domain errors unchanged (validation, unknown vertical, processing) and lane errors.
    pub async fn analyze(&self, vertical: &str, input: &DomainInput) -> Result<AnalysisReport, VanguardError> {
        let output = self.registry.process_with_domain_agent(vertical, input).await?;
        let triple = self.scorer.score(&output).await?;
        let assessment = self.aggregator.aggregate(&triple);
        tracing::debug!(
            vertical,
            overall_score = assessment.overall_score,
            risk_level = %assessment.risk_level,
            failed_lanes = assessment.failed_lanes.len(),
            "analysis scored"
        );
        Ok(AnalysisReport {
            domain_agent_result: output,
            vanguard_results: triple,
            assessment,
        })
    }

    /// Store a prompt and a pending analysis for it
    ///
    /// # Errors
    /// Store errors.
    pub async fn submit(&self, prompt: Prompt) -> Result<Analysis, VanguardError> {
        let analysis = Analysis::pending(&prompt);
        tracing::info!(analysis = %analysis.id, prompt = %prompt.id, vertical = %prompt.vertical, "prompt submitted");
        self.store.insert_prompt(prompt).await?;
        self.store.insert(analysis.clone()).await?;
        Ok(analysis)
    }

    /// Drive a pending analysis to completed or failed
    ///
    /// Pipeline failures are recorded on the analysis (code and message
    /// verbatim) and the failed record is returned; only store and status
    /// errors surface as `Err`.
    ///
    /// # Errors
    /// `NOT_FOUND` for unknown ids, `INVALID_TRANSITION` unless pending.
    #[tracing::instrument(skip(self), fields(analysis = %id))]
    pub async fn run(&self, id: AnalysisId) -> Result<Analysis, VanguardError> {
        let analysis = self.store.get(id).await?;
        let processing = analysis.begin_processing()?;
        self.store.replace(processing.clone()).await?;

        let outcome = match self.store.get_prompt(processing.prompt_id).await {
            Ok(prompt) => self.analyze(&prompt.vertical, &prompt.to_input()).await,
            Err(err) => Err(err),
        };

        let finished = match outcome {
            Ok(report) => {
                let done = processing.complete(
                    report.domain_agent_result,
                    report.vanguard_results,
                    &report.assessment,
                )?;
                tracing::info!(
                    overall_score = report.assessment.overall_score,
                    risk_level = %report.assessment.risk_level,
                    "analysis completed"
                );
                done
            }
            Err(err) => {
                tracing::error!(code = err.code(), error = %err, "analysis failed");
                processing.fail(&err)?
            }
        };
        record_analysis(finished.status);
        self.store.replace(finished.clone()).await?;
        Ok(finished)
    }

    /// [`submit`](Self::submit) then [`run`](Self::run)
    ///
    /// # Errors
    /// As for `submit` and `run`.
    pub async fn submit_and_run(&self, prompt: Prompt) -> Result<Analysis, VanguardError> {
        let analysis = self.submit(prompt).await?;
        self.run(analysis.id).await
    }
}

fn record_analysis(status: AnalysisStatus) {
    metrics::counter!("vanguard_analyses_total", "status" => status.as_str()).increment(1);
}
