//! Question text normalizer.
//!
//! This module provides the normalizer that canonicalizes question text
//! before classification and parsing: notation rewrite rules, Unicode
//! folding, lowercasing, and whitespace collapse.

use regex::Regex;
use tracing::trace;

use super::rules::{builtin_rules, RewriteRule};
use crate::config::NormalizeConfig;

/// Normalizer for question text.
///
/// Produces the canonical statement that gets classified, parsed, and
/// hashed for cache lookups. Two questions that differ only in notation
/// (`2 \times 3` vs `2 × 3`) normalize to the same statement.
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<RewriteRule>,
    custom: Vec<(Regex, String)>,
}

impl Normalizer {
    /// Create a normalizer with the built-in rules and no custom rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&NormalizeConfig::default())
    }

    /// Create a normalizer from configuration.
    #[must_use]
    pub fn with_config(config: &NormalizeConfig) -> Self {
        let rules = if config.rules_enabled {
            builtin_rules()
        } else {
            Vec::new()
        };

        let custom = config
            .custom_rules
            .iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) => Some((regex, rule.replacement.clone())),
                Err(e) => {
                    tracing::warn!(pattern = %rule.pattern, error = %e, "Invalid custom rewrite rule");
                    None
                }
            })
            .collect();

        Self { rules, custom }
    }

    /// Normalize question text to the canonical statement.
    ///
    /// Applies, in order: the built-in rewrite rules, any custom rules,
    /// Unicode folding, lowercasing, and whitespace collapse. Unicode
    /// folding always runs, even when the rule table is disabled.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let mut result = text.to_string();

        for rule in &self.rules {
            if rule.matches(&result) {
                result = rule.apply(&result);
                trace!(rule = %rule.name, "applied rewrite rule");
            }
        }

        for (i, (regex, replacement)) in self.custom.iter().enumerate() {
            if regex.is_match(&result) {
                result = regex.replace_all(&result, replacement.as_str()).to_string();
                trace!(rule_index = %i, "applied custom rewrite rule");
            }
        }

        let folded = fold_chars(&result);
        collapse_whitespace(&folded.to_lowercase())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold Unicode math characters to their ASCII spellings.
fn fold_chars(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '×' | '·' | '⋅' => result.push('*'),
            '÷' => result.push('/'),
            '−' => result.push('-'),
            '¹' => result.push_str("^1"),
            '²' => result.push_str("^2"),
            '³' => result.push_str("^3"),
            '⁴' => result.push_str("^4"),
            'π' => result.push_str(" pi "),
            '∞' => result.push_str(" inf "),
            '→' => result.push_str(" -> "),
            _ => result.push(c),
        }
    }
    result
}

/// Collapse runs of whitespace to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomRule;

    #[test]
    fn test_normalizer_new_has_rules() {
        let normalizer = Normalizer::new();
        assert!(!normalizer.rules.is_empty());
        assert!(normalizer.custom.is_empty());
    }

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("  Solve   2X + 5 = 13  "),
            "solve 2x + 5 = 13"
        );
    }

    #[test]
    fn test_normalize_latex_fraction() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize(r"\frac{1}{2} + \frac{1}{3}"),
            "(1)/(2) + (1)/(3)"
        );
    }

    #[test]
    fn test_normalize_unicode_operators() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("2 × 3 ÷ 4"), "2 * 3 / 4");
        assert_eq!(normalizer.normalize("2 ⋅ 3"), "2 * 3");
    }

    #[test]
    fn test_normalize_superscripts_and_minus() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("x² − 4"), "x^2 - 4");
        assert_eq!(normalizer.normalize("x³"), "x^3");
    }

    #[test]
    fn test_normalize_pi() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("2π"), "2 pi");
        assert_eq!(normalizer.normalize(r"2\pi r"), "2 pi r");
    }

    #[test]
    fn test_normalize_sqrt_forms() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("√16"), "sqrt(16)");
        assert_eq!(normalizer.normalize("√(x+1)"), "sqrt(x+1)");
        assert_eq!(normalizer.normalize(r"\sqrt{25}"), "sqrt(25)");
    }

    #[test]
    fn test_normalize_limit_arrow() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("limit of 1/x as x → ∞"),
            "limit of 1/x as x -> inf"
        );
    }

    #[test]
    fn test_normalize_empty() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize("x² × √4");
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rules_disabled_keeps_latex() {
        let config = NormalizeConfig {
            rules_enabled: false,
            custom_rules: Vec::new(),
        };
        let normalizer = Normalizer::with_config(&config);

        // LaTeX commands survive, but Unicode folding still applies
        assert!(normalizer.normalize(r"\times").contains('\\'));
        assert_eq!(normalizer.normalize("2 × 3"), "2 * 3");
    }

    #[test]
    fn test_custom_rule_applied() {
        let config = NormalizeConfig {
            rules_enabled: true,
            custom_rules: vec![CustomRule {
                pattern: "(?i)please ".to_string(),
                replacement: String::new(),
            }],
        };
        let normalizer = Normalizer::with_config(&config);

        assert_eq!(normalizer.normalize("Please solve x + 1 = 2"), "solve x + 1 = 2");
    }

    #[test]
    fn test_invalid_custom_rule_skipped() {
        let config = NormalizeConfig {
            rules_enabled: true,
            custom_rules: vec![
                CustomRule {
                    pattern: r"\bvalid\b".to_string(),
                    replacement: "ok".to_string(),
                },
                CustomRule {
                    pattern: "[invalid".to_string(),
                    replacement: "x".to_string(),
                },
            ],
        };
        let normalizer = Normalizer::with_config(&config);

        // Only the valid rule compiles
        assert_eq!(normalizer.custom.len(), 1);
    }

    #[test]
    fn test_plain_question_unchanged() {
        let normalizer = Normalizer::new();
        assert_eq!(
            normalizer.normalize("area of a circle with radius 5"),
            "area of a circle with radius 5"
        );
    }
}
