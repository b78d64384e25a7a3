//! Claim coverage determination against the policy's own exclusions

use super::patterns::{EXCLUSION_LINE, EXCLUSION_SEPARATOR};
use crate::error::DomainError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of checking one claim against its policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsAnalysis {
    /// No exclusion applies and the claim is within limits
    pub covered: bool,
    /// Policy exclusions matching the loss, in policy order
    pub exclusions_applicable: Vec<String>,
    /// Claimed amount
    pub claim_amount: Option<f64>,
    /// Per-occurrence limit
    pub coverage_limit: Option<f64>,
    /// Deductible
    pub deductible: Option<f64>,
    /// Claim does not exceed the limit; `false` when the limit is unknown
    pub within_limits: bool,
    /// `min(claim, limit) - deductible` when covered, otherwise zero
    pub estimated_payout: f64,
}

impl ClaimsAnalysis {
    /// Combine amounts with the applicable exclusions
    #[must_use]
    pub fn assess(
        claim_amount: Option<f64>,
        coverage_limit: Option<f64>,
        deductible: Option<f64>,
        exclusions_applicable: Vec<String>,
    ) -> Self {
        let within_limits = coverage_limit.is_some_and(|limit| claim_amount.map_or(true, |claim| claim <= limit));
        let covered = exclusions_applicable.is_empty() && within_limits;
        let estimated_payout = match (covered, claim_amount, coverage_limit) {
            (true, Some(claim), Some(limit)) => (claim.min(limit) - deductible.unwrap_or(0.0)).max(0.0),
            _ => 0.0,
        };
        Self {
            covered,
            exclusions_applicable,
            claim_amount,
            coverage_limit,
            deductible,
            within_limits,
            estimated_payout,
        }
    }

    /// Claim exceeds a known limit
    #[must_use]
    pub fn exceeds_limit(&self) -> bool {
        matches!((self.claim_amount, self.coverage_limit), (Some(claim), Some(limit)) if claim > limit)
    }
}

/// Reads `Exclusions: a, b and c` lines out of policy text
#[derive(Debug, Clone)]
pub struct ExclusionParser {
    line: Regex,
    separator: Regex,
}

impl ExclusionParser {
    /// Compile the exclusion patterns
    ///
    /// # Errors
    /// `DomainError::Pattern` if either pattern fails to compile.
    pub fn new() -> Result<Self, DomainError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| DomainError::Pattern {
                field: "exclusions".to_string(),
                source,
            })
        };
        Ok(Self {
            line: compile(EXCLUSION_LINE)?,
            separator: compile(EXCLUSION_SEPARATOR)?,
        })
    }

    /// Exclusions listed in the text, in order, without duplicates
    #[must_use]
    pub fn parse(&self, content: &str) -> Vec<String> {
        let mut exclusions: Vec<String> = Vec::new();
        for caps in self.line.captures_iter(content) {
            let Some(list) = caps.get(1) else { continue };
            for item in self.separator.split(list.as_str()) {
                push_unique(&mut exclusions, item);
            }
        }
        exclusions
    }

    /// Exclusions given as a value: an array of strings or one delimited string
    ///
    /// `None` for any other shape.
    #[must_use]
    pub fn list_from_value(&self, value: &Value) -> Option<Vec<String>> {
        let mut exclusions: Vec<String> = Vec::new();
        match value {
            Value::Array(items) => {
                for item in items.iter().filter_map(Value::as_str) {
                    push_unique(&mut exclusions, item);
                }
            }
            Value::String(list) => {
                for item in self.separator.split(list) {
                    push_unique(&mut exclusions, item);
                }
            }
            _ => return None,
        }
        Some(exclusions)
    }

    /// Content with the exclusion list lines removed
    #[must_use]
    pub fn strip(&self, content: &str) -> String {
        content
            .lines()
            .filter(|line| !self.line.is_match(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn push_unique(exclusions: &mut Vec<String>, item: &str) {
    let item = item.trim().trim_end_matches('.').trim();
    if !item.is_empty() && !exclusions.iter().any(|e| e.eq_ignore_ascii_case(item)) {
        exclusions.push(item.to_string());
    }
}

/// Whether `phrase` occurs in `haystack` as whole words, ignoring case and spacing
#[must_use]
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return false;
    }
    RegexBuilder::new(&format!(r"(?:^|\W){}(?:\W|$)", words.join(r"\s+")))
        .case_insensitive(true)
        .build()
        .is_ok_and(|re| re.is_match(haystack))
}

/// Exclusions that apply to the loss
///
/// With a stated cause of loss, an exclusion applies when either phrase
/// contains the other as whole words. Without one, the claim narrative (the
/// content minus the exclusion list itself) is searched for the exclusion.
#[must_use]
pub fn applicable_exclusions(exclusions: &[String], cause_of_loss: Option<&str>, narrative: &str) -> Vec<String> {
    let cause = cause_of_loss.map(str::trim).filter(|c| !c.is_empty());
    exclusions
        .iter()
        .filter(|exclusion| match cause {
            Some(cause) => contains_phrase(cause, exclusion) || contains_phrase(exclusion, cause),
            None => contains_phrase(narrative, exclusion),
        })
        .cloned()
        .collect()
}
