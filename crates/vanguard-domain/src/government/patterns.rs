//! Government contracting pattern table

use crate::extract::FieldPattern;

/// Ordered contract and procurement field patterns
pub const PATTERNS: &[FieldPattern] = &[
    FieldPattern::text(
        "contractNumber",
        r"contract\s+(?:no\.?|number|#)\s*[:\-]?\s*([a-z0-9][a-z0-9\-]*[0-9][a-z0-9\-]*)",
    ),
    FieldPattern::text(
        "solicitationNumber",
        r"solicitation\s+(?:no\.?|number|#)\s*[:\-]?\s*([a-z0-9][a-z0-9\-]*[0-9][a-z0-9\-]*)",
    ),
    FieldPattern::text("agency", r"\bagency\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::number(
        "contractValue",
        r"(?:contract|total|estimated|award)\s+value\s*(?:of|[:\-])?\s*\$\s*([\d,]+(?:\.\d+)?)",
    ),
    FieldPattern::number("contractValue", r"ceiling(?:\s+price)?\s*(?:of|[:\-])?\s*\$\s*([\d,]+(?:\.\d+)?)"),
    FieldPattern::text(
        "contractType",
        r"\b(firm[\s\-]fixed[\s\-]price|cost[\s\-]plus[\s\-][a-z]+[\s\-]fee|cost[\s\-]reimbursement|time[\s\-]and[\s\-]materials|labor[\s\-]hour|idiq)\b",
    ),
    FieldPattern::text("periodOfPerformance", r"period\s+of\s+performance\s*[:\-]?\s*([^\n;]+)"),
    FieldPattern::text("naicsCode", r"naics(?:\s+code)?\s*[:\-]?\s*(\d{6})"),
    FieldPattern::text(
        "setAside",
        r"\b(small\s+business|8\(a\)|hubzone|sdvosb|service[\s\-]disabled\s+veteran[\s\-]owned|wosb|women[\s\-]owned)\s+set[\s\-]aside",
    ),
    FieldPattern::text("cageCode", r"cage(?:\s+code)?\s*[:\-]?\s*([a-z0-9]{5})\b"),
    FieldPattern::text("auditScope", r"audit\s+scope\s*[:\-]\s*([^\n;]+)"),
    FieldPattern::text(
        "securityClearance",
        r"\b(top\s+secret|secret|confidential)\s+(?:security\s+|facility\s+)?clearance",
    ),
];
