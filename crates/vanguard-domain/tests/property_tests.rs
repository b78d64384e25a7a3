//! Property tests for extraction and compliance

use proptest::prelude::*;
use serde_json::json;
use vanguard_domain::energy::PATTERNS as ENERGY_PATTERNS;
use vanguard_domain::insurance::PATTERNS as INSURANCE_PATTERNS;
use vanguard_domain::rules::check_compliance;
use vanguard_domain::{
    ComplianceRule, DocumentType, DomainInput, FieldMap, JurisdictionLevel, PatternExtractor, RuleContext,
};

fn document_text() -> impl Strategy<Value = String> {
    let fragments = prop::sample::select(vec![
        "Lessor: Jane Smith\n",
        "Royalty: 12.5%\n",
        "a 25% royalty ",
        "Primary term of 4 years\n",
        "Bonus payment: $1,200\n",
        "Coverage limit: $750,000\n",
        "Deductible: $5,000\n",
        "Cause of loss: hail\n",
        "random filler words ",
        "environmental protection ",
    ]);
    prop::collection::vec(fragments, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_extraction_is_deterministic(text in document_text()) {
        for table in [ENERGY_PATTERNS, INSURANCE_PATTERNS] {
            let extractor = PatternExtractor::compile(table).unwrap();
            let first = extractor.extract(&text, &FieldMap::new());
            let second = extractor.extract(&text, &FieldMap::new());
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_metadata_always_wins(text in document_text(), rate in 0u32..100) {
        let extractor = PatternExtractor::compile(ENERGY_PATTERNS).unwrap();
        let mut metadata = FieldMap::new();
        metadata.insert("royaltyRate".to_string(), json!(rate));
        let fields = extractor.extract(&text, &metadata);
        prop_assert_eq!(&fields["royaltyRate"], &json!(rate));
    }

    #[test]
    fn prop_compliance_flags_never_recover(outcomes in prop::collection::vec(any::<bool>(), 1..16)) {
        let rules: Vec<ComplianceRule> = outcomes
            .iter()
            .enumerate()
            .map(|(i, passes)| {
                let passes = *passes;
                ComplianceRule::new("generated", JurisdictionLevel::State, format!("rule {i}"), move |_| passes)
            })
            .collect();
        let input = DomainInput::new(DocumentType::Lease, "text");
        let fields = FieldMap::new();
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));

        let failures = outcomes.iter().filter(|passes| !**passes).count();
        prop_assert_eq!(result.state, failures == 0);
        prop_assert_eq!(result.issues.len(), failures);
        prop_assert!(result.federal && result.local);
    }
}
