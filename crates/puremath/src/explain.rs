//! Step tracing and transcript rendering.
//!
//! Solvers narrate their work through a [`Tracer`]; the transcript
//! renderers turn a finished [`Solution`] into user-facing text. The
//! plain format is the contract the chat surface promises:
//!
//! ```text
//! Problem: solve 2x + 5 = 13
//! Step 1: Subtract 5 from both sides
//! 2x + 5 = 13 → 2x = 8
//! Step 2: Divide both sides by 2
//! 2x = 8 → x = 4
//! Solution: [x = 4]
//! ```

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::problem::{Category, Problem, Solution, Step};

/// Collects narrated steps while a solver works.
#[derive(Debug, Default)]
pub struct Tracer {
    steps: Vec<Step>,
}

impl Tracer {
    /// Create an empty tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purely narrative step.
    pub fn note(&mut self, title: impl Into<String>) {
        self.steps.push(Step {
            ordinal: self.steps.len() + 1,
            title: title.into(),
            before: None,
            after: None,
        });
    }

    /// Record a step that rewrites one expression into another.
    pub fn rewrite(
        &mut self,
        title: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) {
        self.steps.push(Step {
            ordinal: self.steps.len() + 1,
            title: title.into(),
            before: Some(before.into()),
            after: Some(after.into()),
        });
    }

    /// Record a step that states a result without a before form,
    /// e.g. writing down a formula.
    pub fn show(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.steps.push(Step {
            ordinal: self.steps.len() + 1,
            title: title.into(),
            before: None,
            after: Some(text.into()),
        });
    }

    /// Whether any steps have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Finish tracing and produce the solution.
    #[must_use]
    pub fn finish(self, answer: impl Into<String>, category: Category) -> Solution {
        Solution {
            answer: answer.into(),
            steps: self.steps,
            category,
        }
    }
}

/// Output format for rendered transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptFormat {
    /// The plain chat format.
    #[default]
    Plain,
    /// Markdown with emphasized step headers and code spans.
    Markdown,
    /// The full solution serialized as JSON.
    Json,
}

impl TranscriptFormat {
    /// Parse a format from its lowercase name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "plain" | "text" => Some(Self::Plain),
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct TranscriptView<'a> {
    problem: &'a Problem,
    solution: &'a Solution,
}

/// Render a solved problem as a transcript in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(problem: &Problem, solution: &Solution, format: TranscriptFormat) -> Result<String> {
    match format {
        TranscriptFormat::Plain => Ok(render_plain(problem, solution)),
        TranscriptFormat::Markdown => Ok(render_markdown(problem, solution)),
        TranscriptFormat::Json => {
            let view = TranscriptView { problem, solution };
            Ok(serde_json::to_string_pretty(&view)?)
        }
    }
}

fn render_plain(problem: &Problem, solution: &Solution) -> String {
    let mut out = String::new();
    out.push_str(&format!("Problem: {}\n", problem.statement));
    for step in &solution.steps {
        out.push_str(&format!("Step {}: {}\n", step.ordinal, step.title));
        match (&step.before, &step.after) {
            (Some(before), Some(after)) => {
                out.push_str(&format!("{} → {}\n", prettify(before), prettify(after)));
            }
            (None, Some(after)) => {
                out.push_str(&format!("{}\n", prettify(after)));
            }
            _ => {}
        }
    }
    out.push_str(&format!("Solution: [{}]", prettify(&solution.answer)));
    out
}

fn render_markdown(problem: &Problem, solution: &Solution) -> String {
    let mut out = String::new();
    out.push_str(&format!("**Problem:** {}\n", problem.statement));
    for step in &solution.steps {
        out.push_str(&format!("\n**Step {}:** {}\n", step.ordinal, step.title));
        match (&step.before, &step.after) {
            (Some(before), Some(after)) => {
                out.push_str(&format!("`{} → {}`\n", prettify(before), prettify(after)));
            }
            (None, Some(after)) => {
                out.push_str(&format!("`{}`\n", prettify(after)));
            }
            _ => {}
        }
    }
    out.push_str(&format!("\n**Solution:** `{}`", prettify(&solution.answer)));
    out
}

/// Restore reader-friendly notation in canonical expression text.
///
/// The display inverse of the normalizer: `*` shows as `×`, small integer
/// powers as superscripts, `pi` as `π`, `sqrt` as the radical sign.
#[must_use]
pub fn prettify(text: &str) -> String {
    let mut result = text.replace(" * ", " × ").replace("sqrt(", "√(");
    // \b keeps digits after the exponent intact: x^25 is not x²5
    for (pattern, replacement) in [
        (r"\^2\b", "²"),
        (r"\^3\b", "³"),
        (r"\bpi\b", "π"),
        (r"\binf\b", "∞"),
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            result = regex.replace_all(&result, replacement).to_string();
        }
    }
    result.replace("->", "→")
}
