//! Built-in notation rewrite rules.
//!
//! This module provides pre-defined regex rules that rewrite common math
//! notation (LaTeX commands, Unicode radicals) into the canonical form the
//! expression parser accepts.

use regex::Regex;

/// A compiled rewrite rule.
#[derive(Debug)]
pub struct RewriteRule {
    /// Name of the rule for identification.
    pub name: &'static str,

    /// Description of what this rule rewrites.
    pub description: &'static str,

    /// The compiled regex.
    regex: Regex,

    /// Replacement text (may use capture groups).
    replacement: &'static str,
}

impl RewriteRule {
    /// Create a new rewrite rule.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(
        name: &'static str,
        description: &'static str,
        pattern: &str,
        replacement: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            replacement,
        }
    }

    /// Check if the text contains anything this rule would rewrite.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Apply this rule to the text, rewriting all matches.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.regex.replace_all(text, self.replacement).to_string()
    }
}

/// Get all built-in rewrite rules, in application order.
///
/// Order matters: structural rules (fractions, roots) run before the
/// cleanup rules that strip leftover braces.
#[must_use]
pub fn builtin_rules() -> Vec<RewriteRule> {
    vec![
        // Environment wrappers
        RewriteRule::new(
            "latex_environment",
            "Strip \\begin{..} and \\end{..} wrappers",
            r"\\(?:begin|end)\{[^}]*\}",
            "",
        ),
        RewriteRule::new(
            "latex_left_right",
            "Strip \\left and \\right bracket sizing",
            r"\\left|\\right",
            "",
        ),
        RewriteRule::new(
            "latex_spacing",
            "Collapse LaTeX spacing commands to a space",
            r"\\(?:qquad|quad|[,;!])",
            " ",
        ),
        // Text wrappers
        RewriteRule::new(
            "latex_text",
            "Unwrap \\text{..} content",
            r"\\text\{([^}]*)\}",
            "$1",
        ),
        RewriteRule::new(
            "latex_boxed",
            "Unwrap \\boxed{..} content",
            r"\\boxed\{([^}]*)\}",
            "$1",
        ),
        // Operators
        RewriteRule::new(
            "latex_times",
            "\\times to the * operator",
            r"\\times\b",
            "*",
        ),
        RewriteRule::new("latex_cdot", "\\cdot to the * operator", r"\\cdot\b", "*"),
        RewriteRule::new("latex_div", "\\div to the / operator", r"\\div\b", "/"),
        // Structures
        RewriteRule::new(
            "latex_frac",
            "\\frac{a}{b} to (a)/(b)",
            r"\\[dt]?frac\{([^}]*)\}\{([^}]*)\}",
            "($1)/($2)",
        ),
        RewriteRule::new(
            "latex_sqrt",
            "\\sqrt{x} to sqrt(x)",
            r"\\sqrt\{([^}]*)\}",
            "sqrt($1)",
        ),
        RewriteRule::new(
            "unicode_sqrt_group",
            "Unicode radical over a parenthesized group",
            r"√\s*\(",
            "sqrt(",
        ),
        RewriteRule::new(
            "unicode_sqrt_atom",
            "Unicode radical over a number or name",
            r"√\s*([0-9]+(?:\.[0-9]+)?|[a-zA-Z]+)",
            "sqrt($1)",
        ),
        // Names
        RewriteRule::new("latex_pi", "\\pi to the pi constant", r"\\pi\b", " pi "),
        RewriteRule::new(
            "latex_function",
            "Named LaTeX functions to plain names",
            r"\\(sin|cos|tan|ln|log|exp)\b",
            "$1",
        ),
        RewriteRule::new("latex_infinity", "\\infty to inf", r"\\infty\b", " inf "),
        RewriteRule::new("latex_to", "\\to to the -> arrow", r"\\to\b", " -> "),
        // Scripts
        RewriteRule::new(
            "latex_superscript",
            "Braced exponents to parenthesized exponents",
            r"\^\{([^}]*)\}",
            "^($1)",
        ),
        RewriteRule::new(
            "latex_subscript",
            "Braced subscripts to plain subscripts",
            r"_\{([^}]*)\}",
            "_$1",
        ),
        // Cleanup, applied last
        RewriteRule::new(
            "stray_braces",
            "Remove leftover grouping braces",
            r"[{}]",
            "",
        ),
    ]
}
