//! Question text normalization.
//!
//! This module canonicalizes free-form question text before it reaches
//! the classifier and the expression parser:
//!
//! - **Rewrite rules**: LaTeX commands (`\frac{1}{2}`, `\sqrt{x}`,
//!   `\times`) become plain notation the parser accepts.
//!
//! - **Unicode folding**: math symbols (`×`, `÷`, `²`, `π`, `∞`) fold to
//!   their ASCII spellings.
//!
//! - **Canonical form**: lowercased, whitespace collapsed. Two questions
//!   that differ only in notation normalize to the same statement, so
//!   they share a cache key.
//!
//! # Example
//!
//! ```
//! use puremath::normalize::Normalizer;
//!
//! let normalizer = Normalizer::new();
//!
//! assert_eq!(normalizer.normalize(r"\frac{1}{2} × 4"), "(1)/(2) * 4");
//! assert_eq!(normalizer.normalize("Solve x² − 4 = 0"), "solve x^2 - 4 = 0");
//! ```

mod normalizer;
mod rules;

pub use normalizer::Normalizer;
pub use rules::{builtin_rules, RewriteRule};
