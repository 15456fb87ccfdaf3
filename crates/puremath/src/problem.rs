//! Core problem types for puremath.
//!
//! This module defines the fundamental data structures for representing
//! math questions and their narrated solutions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The category of mathematics a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Plain numeric computation.
    Arithmetic,
    /// Equations, factoring, expansion, simplification.
    Algebra,
    /// Shape formulas: areas, volumes, the Pythagorean theorem.
    Geometry,
    /// Derivatives, integrals, limits.
    Calculus,
}

impl Category {
    /// All categories, in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Arithmetic,
        Self::Algebra,
        Self::Geometry,
        Self::Calculus,
    ];

    /// Parse a category from its lowercase name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "arithmetic" => Some(Self::Arithmetic),
            "algebra" => Some(Self::Algebra),
            "geometry" => Some(Self::Geometry),
            "calculus" => Some(Self::Calculus),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arithmetic => write!(f, "arithmetic"),
            Self::Algebra => write!(f, "algebra"),
            Self::Geometry => write!(f, "geometry"),
            Self::Calculus => write!(f, "calculus"),
        }
    }
}

/// A normalized math question.
///
/// Carries both the text as the user typed it and the canonical form
/// produced by the normalizer, which is what gets parsed and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// The question exactly as the user typed it.
    pub raw: String,

    /// The normalized statement (canonical notation, collapsed whitespace).
    pub statement: String,

    /// BLAKE3 hash of the normalized statement, used as the cache key.
    pub statement_hash: String,

    /// When this question was asked.
    pub timestamp: DateTime<Utc>,
}

impl Problem {
    /// Create a new problem from raw and normalized question text.
    ///
    /// Automatically computes the statement hash and sets the timestamp to now.
    #[must_use]
    pub fn new(raw: String, statement: String) -> Self {
        let statement_hash = Self::compute_hash(&statement);
        Self {
            raw,
            statement,
            statement_hash,
            timestamp: Utc::now(),
        }
    }

    /// Compute the BLAKE3 hash of a normalized statement.
    #[must_use]
    pub fn compute_hash(statement: &str) -> String {
        blake3::hash(statement.as_bytes()).to_hex().to_string()
    }

    /// Check if this problem's statement matches the given hash.
    #[must_use]
    pub fn matches_hash(&self, hash: &str) -> bool {
        self.statement_hash == hash
    }
}

/// One narrated step of a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position of this step within the solution.
    pub ordinal: usize,

    /// What this step does, e.g. "Subtract 5 from both sides".
    pub title: String,

    /// The expression before the step, when the step rewrites one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// The expression after the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl Step {
    /// Check whether this step carries a `before -> after` rewrite pair.
    #[must_use]
    pub fn has_rewrite(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }
}

/// A complete worked solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The final answer, e.g. "x = 4" or "A = 25π ≈ 78.5398".
    pub answer: String,

    /// The narrated steps, in order.
    pub steps: Vec<Step>,

    /// The category whose solver produced this solution.
    pub category: Category,
}

impl Solution {
    /// Number of narrated steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
