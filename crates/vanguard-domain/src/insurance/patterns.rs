//! Insurance pattern table

use crate::extract::FieldPattern;

/// Ordered policy and claim field patterns
pub const PATTERNS: &[FieldPattern] = &[
    FieldPattern::text("policyNumber", r"policy\s+(?:no\.?|number|#)\s*[:\-]?\s*([a-z0-9][a-z0-9\-]*)"),
    FieldPattern::text("insured", r"(?:named\s+)?insured\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::text("insurer", r"\b(?:insurer|carrier)\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::text(
        "lineOfBusiness",
        r"\b(commercial\s+general\s+liability|general\s+liability|commercial\s+property|homeowners|commercial\s+auto|workers'?\s+compensation|professional\s+liability|umbrella|cyber)\b",
    ),
    FieldPattern::number(
        "coverageLimit",
        r"(?:coverage\s+limit|limits?\s+of\s+(?:liability|insurance)|(?:each|per)\s+occurrence(?:\s+limit)?)\s*[:\-]?\s*\$\s*([\d,]+(?:\.\d+)?)",
    ),
    FieldPattern::number("aggregateLimit", r"aggregate(?:\s+limit)?\s*[:\-]?\s*\$\s*([\d,]+(?:\.\d+)?)"),
    FieldPattern::number("deductible", r"deductible\s*[:\-]?\s*\$\s*([\d,]+(?:\.\d+)?)"),
    FieldPattern::number("premium", r"(?:annual\s+|total\s+)?premium\s*[:\-]?\s*\$\s*([\d,]+(?:\.\d+)?)"),
    FieldPattern::text("policyPeriod", r"policy\s+period\s*[:\-]?\s*([^\n;]+)"),
    FieldPattern::text(
        "effectiveDate",
        r"effective\s+date\s*[:\-]?\s*([a-z]+\s+\d{1,2},\s+\d{4}|\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2})",
    ),
    FieldPattern::number(
        "claimAmount",
        r"(?:claim(?:ed)?\s+amount|amount\s+claimed)\s*[:\-]?\s*\$\s*([\d,]+(?:\.\d+)?)",
    ),
    FieldPattern::text("dateOfLoss", r"date\s+of\s+loss\s*[:\-]?\s*([^\n;]+)"),
    FieldPattern::text("causeOfLoss", r"cause\s+of\s+loss\s*[:\-]\s*([^\n;]+)"),
];

/// Exclusion list lines, one capture per line
pub const EXCLUSION_LINE: &str = r"(?im)^\s*(?:policy\s+)?exclusions?\s*[:\-]\s*([^\n]+)$";

/// Separators inside an exclusion list
pub const EXCLUSION_SEPARATOR: &str = r"(?i)\s*(?:,|;|\band\b)\s*";
