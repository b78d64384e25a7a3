//! Analysis pipeline scenarios

use pretty_assertions::assert_eq;
use std::sync::Arc;
use vanguard_core::{AnalysisPipeline, AnalysisStatus, InMemoryAnalysisStore, Prompt, VanguardConfig};
use vanguard_domain::{DocumentType, Severity};
use vanguard_test_utils::{below_market_lease, documents, flood_claim, market_lease};

fn pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(&VanguardConfig::default(), Arc::new(InMemoryAnalysisStore::new())).unwrap()
}

#[tokio::test]
async fn test_lease_prompt_runs_to_completion() {
    let pipeline = pipeline();
    let prompt = Prompt::new("Midland lease", "energy", DocumentType::Lease, documents::BELOW_MARKET_LEASE);
    let submitted = pipeline.submit(prompt).await.unwrap();
    assert_eq!(submitted.status, AnalysisStatus::Pending);

    let analysis = pipeline.run(submitted.id).await.unwrap();
    assert_eq!(analysis.status, AnalysisStatus::Completed);
    assert!(analysis.error.is_none());

    let output = analysis.domain_agent_result.as_ref().unwrap();
    assert!(!output.analysis.compliance.federal);
    let score = analysis.overall_score.unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(analysis.risk_level.is_some());
    assert_eq!(analysis.vanguard_results.as_ref().unwrap().iter().count(), 3);

    let stored = pipeline.store().get(submitted.id).await.unwrap();
    assert_eq!(stored, analysis);
}

#[tokio::test]
async fn test_unknown_vertical_fails_with_code() {
    let pipeline = pipeline();
    let prompt = Prompt::new("Launch", "aerospace", DocumentType::Contract, "Satellite launch services");
    let analysis = pipeline.submit_and_run(prompt).await.unwrap();

    assert_eq!(analysis.status, AnalysisStatus::Failed);
    let failure = analysis.error.unwrap();
    assert_eq!(failure.code, "NOT_FOUND");
    assert_eq!(failure.message, "no domain agent registered for 'aerospace'");
    assert!(analysis.domain_agent_result.is_none());
}

#[tokio::test]
async fn test_empty_content_fails_validation() {
    let pipeline = pipeline();
    let prompt = Prompt::new("Blank", "insurance", DocumentType::Policy, "   ");
    let analysis = pipeline.submit_and_run(prompt).await.unwrap();
    assert_eq!(analysis.status, AnalysisStatus::Failed);
    assert_eq!(analysis.error.unwrap().code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_finished_analysis_cannot_rerun() {
    let pipeline = pipeline();
    let prompt = Prompt::new("Claim", "claims", DocumentType::Claim, documents::FLOOD_CLAIM);
    let analysis = pipeline.submit_and_run(prompt).await.unwrap();
    let err = pipeline.run(analysis.id).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_unknown_analysis_is_not_found() {
    let err = pipeline().run(vanguard_core::AnalysisId::new()).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_store_less_claim_analysis() {
    let report = pipeline().analyze("insurance", &flood_claim()).await.unwrap();
    let claims = report.domain_agent_result.section("claimsAnalysis").unwrap();
    assert_eq!(claims["covered"], serde_json::json!(false));
    assert_eq!(claims["exclusionsApplicable"], serde_json::json!(["flood"]));
}

#[tokio::test]
async fn test_failed_lane_never_yields_low_or_medium() {
    let pipeline = pipeline();
    for (vertical, input) in [("energy", below_market_lease()), ("energy", market_lease()), ("insurance", flood_claim())] {
        let report = pipeline.analyze(vertical, &input).await.unwrap();
        if !report.assessment.failed_lanes.is_empty() {
            assert!(report.assessment.risk_level >= Severity::High);
        }
        let lanes: Vec<&str> = report.vanguard_results.iter().map(|r| r.agent_name.as_str()).collect();
        assert_eq!(lanes.len(), 3);
    }
}

#[tokio::test]
async fn test_metadata_prompt_overrides_text() {
    let prompt = Prompt::new("Lease", "oil-gas", DocumentType::Lease, documents::BELOW_MARKET_LEASE)
        .with_metadata("royaltyRate", 15);
    let analysis = pipeline().submit_and_run(prompt).await.unwrap();
    let output = analysis.domain_agent_result.unwrap();
    assert_eq!(output.analysis.key_terms_extracted["royaltyRate"], serde_json::json!(15));
}

#[tokio::test]
async fn test_analysis_serializes_camel_case() {
    let prompt = Prompt::new("Lease", "energy", DocumentType::Lease, documents::MARKET_LEASE);
    let analysis = pipeline().submit_and_run(prompt).await.unwrap();
    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["status"], "completed");
    assert!(value["overallScore"].is_number());
    assert!(value["riskLevel"].is_string());
    assert!(value["vanguardResults"]["security"]["agentName"].is_string());
    assert!(value["domainAgentResult"]["analysis"]["keyTermsExtracted"].is_object());
}
