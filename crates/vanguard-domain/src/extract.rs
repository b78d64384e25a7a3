//! Pattern extraction
//!
//! Each domain declares an ordered table of [`FieldPattern`] entries as plain
//! data. [`PatternExtractor`] compiles a table once (case-insensitive) and
//! turns document text into a [`FieldMap`]:
//!
//! 1. entries are tried in table order, each independently
//! 2. the first capture group, trimmed, becomes the value
//! 3. when several entries target one field, the first match wins
//! 4. metadata values are merged last and overwrite parsed values

use crate::error::DomainError;
use crate::types::FieldMap;
use regex::{Regex, RegexBuilder};
use serde_json::{Number, Value};

/// How a captured value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string
    Text,
    /// Number with `$`, `,` and `%` stripped; kept as text if unparseable
    Number,
}

impl FieldKind {
    /// Convert a trimmed capture into a JSON value
    #[must_use]
    pub fn coerce(self, raw: &str) -> Value {
        match self {
            Self::Text => Value::String(raw.to_string()),
            Self::Number => parse_number_value(raw).unwrap_or_else(|| Value::String(raw.to_string())),
        }
    }
}

/// One `{fieldName, pattern}` table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPattern {
    /// Output field name
    pub field: &'static str,
    /// Regular expression; capture group 1 is the value
    pub pattern: &'static str,
    /// Value coercion
    pub kind: FieldKind,
}

impl FieldPattern {
    /// Text-valued entry
    #[must_use]
    pub const fn text(field: &'static str, pattern: &'static str) -> Self {
        Self {
            field,
            pattern,
            kind: FieldKind::Text,
        }
    }

    /// Number-valued entry
    #[must_use]
    pub const fn number(field: &'static str, pattern: &'static str) -> Self {
        Self {
            field,
            pattern,
            kind: FieldKind::Number,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    field: &'static str,
    kind: FieldKind,
    regex: Regex,
}

/// Compiled, reusable pattern table
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    entries: Vec<CompiledPattern>,
}

impl PatternExtractor {
    /// Compile a pattern table
    ///
    /// # Errors
    /// `DomainError::Pattern` naming the first entry that fails to compile.
    pub fn compile(table: &[FieldPattern]) -> Result<Self, DomainError> {
        let entries = table
            .iter()
            .map(|entry| {
                RegexBuilder::new(entry.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| CompiledPattern {
                        field: entry.field,
                        kind: entry.kind,
                        regex,
                    })
                    .map_err(|source| DomainError::Pattern {
                        field: entry.field.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Distinct field names in table order
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.field) {
                names.push(entry.field);
            }
        }
        names
    }

    /// Distinct numeric field names in table order
    #[must_use]
    pub fn numeric_field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.kind == FieldKind::Number) {
            if !names.contains(&entry.field) {
                names.push(entry.field);
            }
        }
        names
    }

    /// Number of distinct fields the table can produce
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_names().len()
    }

    /// Extract fields from text, then apply metadata overrides
    ///
    /// Deterministic: identical `(content, metadata)` always yields an equal map.
    #[must_use]
    pub fn extract(&self, content: &str, metadata: &FieldMap) -> FieldMap {
        let mut fields = FieldMap::new();

        for entry in &self.entries {
            if fields.contains_key(entry.field) {
                continue;
            }
            let captured = entry
                .regex
                .captures(content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim());
            match captured {
                Some(raw) if !raw.is_empty() => {
                    fields.insert(entry.field.to_string(), entry.kind.coerce(raw));
                }
                _ => {}
            }
        }

        for (key, value) in metadata {
            fields.insert(key.clone(), value.clone());
        }

        fields
    }
}

/// Parse `"$1,250.50"`, `"12.5%"`, `"640"` into a float
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse into a JSON number, integral values stay integers
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn parse_number_value(raw: &str) -> Option<Value> {
    let number = parse_number(raw)?;
    if number.fract() == 0.0 && number.abs() < 9.0e15 {
        return Some(Value::from(number as i64));
    }
    Number::from_f64(number).map(Value::Number)
}

/// Numeric field value, accepting JSON numbers and numeric strings
#[must_use]
pub fn number_field(fields: &FieldMap, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Text field value
#[must_use]
pub fn text_field<'a>(fields: &'a FieldMap, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Subset of `fields` with the given keys, in key order
#[must_use]
pub fn select_fields(fields: &FieldMap, keys: &[&str]) -> FieldMap {
    keys.iter()
        .filter_map(|key| fields.get(*key).map(|v| ((*key).to_string(), v.clone())))
        .collect()
}
