//! Domain types shared by the generation pipeline, the HTTP API and the viewer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language used when a query does not name one.
pub const DEFAULT_LANGUAGE: &str = "Python";

/// Number of variants in every [`SolutionSet`].
pub const SOLUTION_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// ProblemQuery
// ---------------------------------------------------------------------------

/// Rejected query input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("problem text is empty")]
    EmptyProblem,
}

/// One submission: the natural-language problem and the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemQuery {
    text: String,
    target_language: String,
}

impl ProblemQuery {
    /// Build a query, rejecting blank problem text.
    ///
    /// A missing or blank `language` falls back to [`DEFAULT_LANGUAGE`].
    ///
    /// ```
    /// use algo_solver::solve::ProblemQuery;
    ///
    /// let q = ProblemQuery::new("Two Sum", None).unwrap();
    /// assert_eq!(q.target_language(), "Python");
    /// assert!(ProblemQuery::new("   ", Some("Java")).is_err());
    /// ```
    pub fn new(text: &str, language: Option<&str>) -> Result<Self, QueryError> {
        Self::with_default_language(text, language, DEFAULT_LANGUAGE)
    }

    /// Like [`ProblemQuery::new`] with a configurable fallback language.
    pub fn with_default_language(
        text: &str,
        language: Option<&str>,
        default_language: &str,
    ) -> Result<Self, QueryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueryError::EmptyProblem);
        }
        let target_language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(default_language)
            .to_string();
        Ok(Self {
            text: text.to_string(),
            target_language,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }
}

// ---------------------------------------------------------------------------
// ApproachType
// ---------------------------------------------------------------------------

/// The four fixed solution categories, in their mandatory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproachType {
    BruteForce,
    TimeOptimized,
    SpaceOptimized,
    Ideal,
}

impl ApproachType {
    /// Mandatory order of variants within a [`SolutionSet`].
    pub const ORDER: [ApproachType; SOLUTION_COUNT] = [
        ApproachType::BruteForce,
        ApproachType::TimeOptimized,
        ApproachType::SpaceOptimized,
        ApproachType::Ideal,
    ];

    /// Human-readable label, also used verbatim in the generation prompt.
    pub fn label(&self) -> &'static str {
        match self {
            ApproachType::BruteForce => "Brute Force",
            ApproachType::TimeOptimized => "Time-Optimized",
            ApproachType::SpaceOptimized => "Space-Optimized",
            ApproachType::Ideal => "Ideal",
        }
    }

    /// Position of this approach in [`ApproachType::ORDER`].
    pub fn position(&self) -> usize {
        match self {
            ApproachType::BruteForce => 0,
            ApproachType::TimeOptimized => 1,
            ApproachType::SpaceOptimized => 2,
            ApproachType::Ideal => 3,
        }
    }
}

impl fmt::Display for ApproachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generator output for `approachType` that names none of the four categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown approach type {0:?}")]
pub struct UnknownApproach(pub String);

impl FromStr for ApproachType {
    type Err = UnknownApproach;

    /// Lenient parse: case, whitespace, `-` and `_` are ignored, so
    /// `"Brute Force"`, `"brute-force"` and `"BruteForce"` are all accepted.
    /// `"Optimal"` is accepted as [`ApproachType::Ideal`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "bruteforce" | "naive" => Ok(ApproachType::BruteForce),
            "timeoptimized" | "timeoptimised" => Ok(ApproachType::TimeOptimized),
            "spaceoptimized" | "spaceoptimised" => Ok(ApproachType::SpaceOptimized),
            "ideal" | "optimal" => Ok(ApproachType::Ideal),
            _ => Err(UnknownApproach(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SolutionVariant
// ---------------------------------------------------------------------------

/// One validated solution approach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionVariant {
    pub title: String,
    pub approach_type: ApproachType,
    /// Source code, one entry per line.
    pub snippet: Vec<String>,
    pub theory: String,
    pub complexity: String,
    /// Intended to align index-for-index with `snippet`; not guaranteed.
    pub line_explanations: Vec<String>,
    pub audio_text: String,
}

impl SolutionVariant {
    /// Explanation for snippet line `line`, if the generator supplied one.
    pub fn explanation_for(&self, line: usize) -> Option<&str> {
        self.line_explanations.get(line).map(String::as_str)
    }

    /// `true` when there is exactly one explanation per snippet line.
    pub fn is_aligned(&self) -> bool {
        self.snippet.len() == self.line_explanations.len()
    }
}

// ---------------------------------------------------------------------------
// SolutionSet
// ---------------------------------------------------------------------------

/// Count or order violation when assembling a [`SolutionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    #[error("expected 4 solutions, got {0}")]
    WrongCount(usize),
    #[error("solution {index} is {found}, expected {expected}")]
    OutOfOrder {
        index: usize,
        expected: ApproachType,
        found: ApproachType,
    },
}

/// Exactly four variants in [`ApproachType::ORDER`].
///
/// The only constructor checks both invariants, so holding a `SolutionSet`
/// is proof that the shape is right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SolutionSet {
    variants: Vec<SolutionVariant>,
}

impl SolutionSet {
    pub fn new(variants: Vec<SolutionVariant>) -> Result<Self, SetError> {
        if variants.len() != SOLUTION_COUNT {
            return Err(SetError::WrongCount(variants.len()));
        }
        for (index, (variant, expected)) in variants.iter().zip(ApproachType::ORDER).enumerate() {
            if variant.approach_type != expected {
                return Err(SetError::OutOfOrder {
                    index,
                    expected,
                    found: variant.approach_type,
                });
            }
        }
        Ok(Self { variants })
    }

    pub fn get(&self, index: usize) -> Option<&SolutionVariant> {
        self.variants.get(index)
    }

    pub fn variants(&self) -> &[SolutionVariant] {
        &self.variants
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SolutionVariant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn into_variants(self) -> Vec<SolutionVariant> {
        self.variants
    }
}

impl<'de> Deserialize<'de> for SolutionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let variants = Vec::<SolutionVariant>::deserialize(deserializer)?;
        SolutionSet::new(variants).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
