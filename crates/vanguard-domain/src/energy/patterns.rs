//! Energy pattern table

use crate::extract::FieldPattern;

/// Ordered lease, permit and well field patterns
pub const PATTERNS: &[FieldPattern] = &[
    FieldPattern::text("lessor", r"lessor\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::text("lessee", r"lessee\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::number("royaltyRate", r"royalty(?:\s+rate)?\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*%"),
    FieldPattern::number("royaltyRate", r"(\d+(?:\.\d+)?)\s*%\s*royalty"),
    FieldPattern::number("primaryTerm", r"primary\s+term\s*(?:of|[:\-])?\s*(\d+)\s*years?"),
    FieldPattern::number(
        "bonusPayment",
        r"bonus(?:\s+payment)?\s*(?:of|[:\-])?\s*\$\s*([\d,]+(?:\.\d+)?)",
    ),
    FieldPattern::number("delayRental", r"delay\s+rental\s*(?:of|[:\-])?\s*\$\s*([\d,]+(?:\.\d+)?)"),
    FieldPattern::number(
        "shutInRoyalty",
        r"shut[\s\-]?in\s+royalty\s*(?:of|[:\-])?\s*\$\s*([\d,]+(?:\.\d+)?)",
    ),
    FieldPattern::number("acreage", r"([\d,]+(?:\.\d+)?)\s*(?:net\s+|gross\s+)?acres"),
    FieldPattern::text("county", r"county\s*[:\-]\s*([^\n,;]+)"),
    FieldPattern::text("county", r"([a-z]+)\s+county,\s+[a-z]"),
    FieldPattern::text("state", r"\bstate\s*[:\-]\s*([a-z][a-z ]*[a-z])"),
    FieldPattern::text(
        "state",
        r"county,\s+(texas|oklahoma|north dakota|new mexico|pennsylvania|colorado|wyoming|louisiana)",
    ),
    FieldPattern::text(
        "effectiveDate",
        r"effective\s+date\s*[:\-]?\s*([a-z]+\s+\d{1,2},\s+\d{4}|\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2})",
    ),
    FieldPattern::text("permitNumber", r"permit\s+(?:no\.?|number|#)\s*[:\-]?\s*([a-z0-9][a-z0-9\-]*)"),
    FieldPattern::text("operator", r"\boperator\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::text("wellName", r"well\s+name\s*[:\-]\s*([^\n;]+)"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PatternExtractor;
    use crate::types::FieldMap;
    use serde_json::json;

    fn extract(text: &str) -> FieldMap {
        PatternExtractor::compile(PATTERNS).unwrap().extract(text, &FieldMap::new())
    }

    #[test]
    fn table_compiles() {
        assert!(PatternExtractor::compile(PATTERNS).is_ok());
    }

    #[test]
    fn lease_header_fields() {
        let fields = extract(
            "Lessor: Jane Smith\nLessee: Permian Resources LLC\nRoyalty: 18.75%\n\
             Primary term of 3 years\nBonus payment: $450,000\n640 net acres",
        );
        assert_eq!(fields["lessor"], json!("Jane Smith"));
        assert_eq!(fields["lessee"], json!("Permian Resources LLC"));
        assert_eq!(fields["royaltyRate"], json!(18.75));
        assert_eq!(fields["primaryTerm"], json!(3));
        assert_eq!(fields["bonusPayment"], json!(450_000));
        assert_eq!(fields["acreage"], json!(640));
    }

    #[test]
    fn royalty_fraction_phrasing() {
        let fields = extract("Lessee shall pay a 20% royalty on all production.");
        assert_eq!(fields["royaltyRate"], json!(20));
    }

    #[test]
    fn county_and_state_from_location_phrase() {
        let fields = extract("Lands situated in Reeves County, Texas, described as follows");
        assert_eq!(fields["county"], json!("Reeves"));
        assert_eq!(fields["state"], json!("Texas"));
    }

    #[test]
    fn explicit_state_label_wins() {
        let fields = extract("State: North Dakota\nMcKenzie County, Texas");
        assert_eq!(fields["state"], json!("North Dakota"));
    }

    #[test]
    fn permit_fields() {
        let fields = extract("Permit No. W-1234\nOperator: Basin Drilling Co\nWell Name: Smith 1H");
        assert_eq!(fields["permitNumber"], json!("W-1234"));
        assert_eq!(fields["operator"], json!("Basin Drilling Co"));
        assert_eq!(fields["wellName"], json!("Smith 1H"));
    }
}
