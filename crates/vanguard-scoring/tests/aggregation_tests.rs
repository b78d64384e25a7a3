//! Aggregation properties and scoring of real agent output

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vanguard_domain::{DocumentType, DomainAgentRegistry, DomainInput, DomainPolicies, Severity};
use vanguard_scoring::{Aggregator, LaneThresholds, ScoringConfig, VanguardResult, VanguardScorer, VanguardTriple};

fn triple(security: f64, integrity: f64, accuracy: f64) -> VanguardTriple {
    let thresholds = LaneThresholds::default();
    VanguardTriple {
        security: VanguardResult::scored("Security", security, &thresholds, vec![], vec![]),
        integrity: VanguardResult::scored("Integrity", integrity, &thresholds, vec![], vec![]),
        accuracy: VanguardResult::scored("Accuracy", accuracy, &thresholds, vec![], vec![]),
    }
}

proptest! {
    #[test]
    fn prop_failed_lane_is_never_low_or_medium(
        failing in 0.0f64..59.9,
        a in 0.0f64..=100.0,
        b in 0.0f64..=100.0,
        slot in 0usize..3,
    ) {
        let scores = match slot {
            0 => (failing, a, b),
            1 => (a, failing, b),
            _ => (a, b, failing),
        };
        let assessment = Aggregator::default().aggregate(&triple(scores.0, scores.1, scores.2));
        prop_assert!(assessment.risk_level >= Severity::High);
        prop_assert!(!assessment.failed_lanes.is_empty());
    }

    #[test]
    fn prop_overall_score_stays_in_range(
        a in 0.0f64..=100.0,
        b in 0.0f64..=100.0,
        c in 0.0f64..=100.0,
    ) {
        let assessment = Aggregator::default().aggregate(&triple(a, b, c));
        prop_assert!((0.0..=100.0).contains(&assessment.overall_score));
    }
}

#[tokio::test]
async fn test_scores_energy_agent_output() {
    let registry = DomainAgentRegistry::with_default_agents(&DomainPolicies::default()).unwrap();
    let input = DomainInput::new(
        DocumentType::Lease,
        "OIL AND GAS LEASE\nLessor: John Doe\nLessee: Acme Energy\nRoyalty: 10%\n\
         Primary term: 5 years\nThe lessee shall drill within one year of the effective date.",
    );
    let output = registry.process_with_domain_agent("energy", &input).await.unwrap();

    let scorer = VanguardScorer::new(&ScoringConfig::default()).unwrap();
    let triple = scorer.score(&output).await.unwrap();
    let assessment = Aggregator::default().aggregate(&triple);

    assert_eq!(triple.iter().count(), 3);
    assert!(triple.iter().all(|lane| (0.0..=100.0).contains(&lane.score)));
    let mean = triple.iter().map(|lane| lane.score).sum::<f64>() / 3.0;
    assert!((assessment.overall_score - mean).abs() < 1e-9);
}
