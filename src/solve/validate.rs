//! Strict decoding of backend output into a [`SolutionSet`].
//!
//! The backend is *asked* for a schema-conformant payload; this module makes
//! sure it actually got one.  Every deviation is reported with the JSON path
//! of the offending field (`solutions[2].audioText`), never passed through.
//!
//! # Line alignment
//!
//! `lineExplanations` is meant to have one entry per snippet line.  By
//! default a mismatch is logged and tolerated, and consumers look entries up
//! with [`SolutionVariant::explanation_for`].  With
//! [`ValidatorOptions::strict_line_alignment`] a mismatch is rejected.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ValidationConfig;
use crate::solve::model::{ApproachType, SolutionSet, SolutionVariant, SOLUTION_COUNT};

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The raw text is not well-formed JSON.
    #[error("backend payload is not valid JSON: {0}")]
    Parse(String),

    /// The JSON does not match the solution schema.
    #[error("schema violation at {field}: {reason}")]
    SchemaViolation { field: String, reason: String },
}

fn violation(field: impl Into<String>, reason: impl Into<String>) -> ValidationError {
    ValidationError::SchemaViolation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// ResponseValidator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Reject variants whose explanation count differs from the snippet
    /// line count.
    pub strict_line_alignment: bool,
}

impl From<&ValidationConfig> for ValidatorOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            strict_line_alignment: config.strict_line_alignment,
        }
    }
}

/// Validates raw backend text.  Pure; no I/O besides logging.
///
/// ```
/// use algo_solver::solve::{ResponseValidator, ValidationError};
///
/// let validator = ResponseValidator::default();
/// let err = validator.validate(r#"{"solutions": []}"#).unwrap_err();
/// assert!(matches!(err, ValidationError::SchemaViolation { .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    options: ValidatorOptions,
}

impl ResponseValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn validate(&self, raw: &str) -> Result<SolutionSet, ValidationError> {
        let root: Value = serde_json::from_str(raw).map_err(|e| {
            log::error!("solve: backend payload is not JSON ({e}); raw payload: {raw}");
            ValidationError::Parse(e.to_string())
        })?;

        let root = root
            .as_object()
            .ok_or_else(|| violation("$", "expected a JSON object"))?;
        let solutions = root
            .get("solutions")
            .ok_or_else(|| violation("solutions", "missing field"))?
            .as_array()
            .ok_or_else(|| violation("solutions", "expected an array"))?;

        if solutions.len() != SOLUTION_COUNT {
            return Err(violation(
                "solutions",
                format!(
                    "expected exactly {SOLUTION_COUNT} entries, got {}",
                    solutions.len()
                ),
            ));
        }

        let variants = solutions
            .iter()
            .enumerate()
            .map(|(index, item)| self.decode_variant(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        // Count and order were checked per entry above.
        SolutionSet::new(variants).map_err(|e| violation("solutions", e.to_string()))
    }

    fn decode_variant(&self, index: usize, item: &Value) -> Result<SolutionVariant, ValidationError> {
        let path = format!("solutions[{index}]");
        let obj = item
            .as_object()
            .ok_or_else(|| violation(&path, "expected an object"))?;

        let approach_field = format!("{path}.approachType");
        let approach_type: ApproachType = string_field(obj, &path, "approachType")?
            .parse()
            .map_err(|e: crate::solve::model::UnknownApproach| {
                violation(&approach_field, e.to_string())
            })?;
        let expected = ApproachType::ORDER[index];
        if approach_type != expected {
            return Err(violation(
                approach_field,
                format!("expected {expected:?} at position {index}, found {approach_type:?}"),
            ));
        }

        let snippet: Vec<String> = string_field(obj, &path, "snippet")?
            .lines()
            .map(str::to_string)
            .collect();
        let line_explanations = string_array_field(obj, &path, "lineExplanations")?;

        if snippet.len() != line_explanations.len() {
            if self.options.strict_line_alignment {
                return Err(violation(
                    format!("{path}.lineExplanations"),
                    format!(
                        "{} explanations for {} snippet lines",
                        line_explanations.len(),
                        snippet.len()
                    ),
                ));
            }
            log::warn!(
                "solve: {path} has {} explanations for {} snippet lines",
                line_explanations.len(),
                snippet.len()
            );
        }

        Ok(SolutionVariant {
            title: string_field(obj, &path, "title")?.to_string(),
            approach_type,
            snippet,
            theory: string_field(obj, &path, "theory")?.to_string(),
            complexity: string_field(obj, &path, "complexity")?.to_string(),
            line_explanations,
            audio_text: string_field(obj, &path, "audioText")?.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn string_field<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<&'a str, ValidationError> {
    let field = format!("{path}.{name}");
    obj.get(name)
        .ok_or_else(|| violation(&field, "missing field"))?
        .as_str()
        .ok_or_else(|| violation(&field, "expected a string"))
}

fn string_array_field(
    obj: &Map<String, Value>,
    path: &str,
    name: &str,
) -> Result<Vec<String>, ValidationError> {
    let field = format!("{path}.{name}");
    let items = obj
        .get(name)
        .ok_or_else(|| violation(&field, "missing field"))?
        .as_array()
        .ok_or_else(|| violation(&field, "expected an array of strings"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| violation(format!("{field}[{i}]"), "expected a string"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
