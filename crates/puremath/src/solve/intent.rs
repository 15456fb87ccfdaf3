//! Question classification.
//!
//! Turns normalized question text into a [`Task`]: filler words are
//! peeled off the front, then a priority-ordered table of intent
//! patterns decides what kind of work is being asked for, and the
//! relevant fragment is parsed into an expression or equation. Text
//! that matches no pattern is treated as a bare expression or equation.

use regex::Regex;

use crate::error::{Error, Result};
use crate::parse::{format_number, parse_expression, parse_statement, Equation, Expr, Statement};
use crate::problem::Category;

use super::geometry::{self, GeometryRequest};

/// Where a limit variable is headed.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitTarget {
    /// A finite value.
    Value(f64),
    /// Positive infinity.
    PosInfinity,
    /// Negative infinity.
    NegInfinity,
}

impl std::fmt::Display for LimitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", format_number(*v)),
            Self::PosInfinity => write!(f, "inf"),
            Self::NegInfinity => write!(f, "-inf"),
        }
    }
}

/// A classified, parsed unit of work for the solver engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Evaluate a constant expression step by step.
    Evaluate(Expr),
    /// Solve an equation for one variable.
    SolveEquation {
        equation: Equation,
        var: String,
    },
    /// Collect like terms.
    Simplify(Expr),
    /// Factor a polynomial.
    Factor(Expr),
    /// Multiply out products and powers.
    Expand(Expr),
    /// Differentiate with respect to a variable.
    Differentiate {
        expr: Expr,
        var: String,
    },
    /// Find an antiderivative.
    Integrate {
        expr: Expr,
        var: String,
    },
    /// Evaluate a limit.
    Limit {
        expr: Expr,
        var: String,
        target: LimitTarget,
    },
    /// A named-shape measurement question.
    Geometry(GeometryRequest),
}

impl Task {
    /// The category whose solver handles this task.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Evaluate(_) => Category::Arithmetic,
            Self::SolveEquation { .. } | Self::Simplify(_) | Self::Factor(_) | Self::Expand(_) => {
                Category::Algebra
            }
            Self::Differentiate { .. } | Self::Integrate { .. } | Self::Limit { .. } => {
                Category::Calculus
            }
            Self::Geometry(_) => Category::Geometry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    DerivativeLeibniz,
    Derivative,
    Integral,
    Limit,
    Factor,
    Expand,
    Simplify,
    Geometry,
    Solve,
}

/// A named regex that recognizes one kind of question.
///
/// Patterns are tried in table order; the first match wins, so more
/// specific phrasings sit above generic ones.
#[derive(Debug, Clone)]
pub struct IntentPattern {
    /// Short name used in logs and errors.
    pub name: &'static str,
    /// What the pattern recognizes.
    pub description: &'static str,
    intent: Intent,
    regex: Regex,
}

impl IntentPattern {
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid. Table entries are fixed
    /// strings covered by tests, so this only fires on a typo.
    fn new(name: &'static str, description: &'static str, intent: Intent, pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid intent pattern '{name}': {e}"));
        Self {
            name,
            description,
            intent,
            regex,
        }
    }

    /// Whether this pattern matches the question text.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The built-in intent patterns in priority order.
#[must_use]
pub fn builtin_intents() -> Vec<IntentPattern> {
    vec![
        IntentPattern::new(
            "derivative_leibniz",
            "Derivative in d/dx notation",
            Intent::DerivativeLeibniz,
            r"^d/d([a-z])\s+(.+)$",
        ),
        IntentPattern::new(
            "derivative",
            "Derivative requests in words",
            Intent::Derivative,
            r"^(?:differentiate|derivative\s+of)\s+(.+)$",
        ),
        IntentPattern::new(
            "integral",
            "Antiderivative requests",
            Intent::Integral,
            r"^(?:integrate|integral\s+of|antiderivative\s+of)\s+(.+)$",
        ),
        IntentPattern::new(
            "limit",
            "Limits as a variable approaches a target",
            Intent::Limit,
            r"^(?:limit\s+of|limit|lim)\s+(.+?)\s+as\s+([a-z][a-z0-9_]*)\s*(?:->|approaches|tends\s+to|goes\s+to)\s*(.+)$",
        ),
        IntentPattern::new(
            "factor",
            "Polynomial factoring",
            Intent::Factor,
            r"^factor(?:ise|ize)?\s+(.+)$",
        ),
        IntentPattern::new(
            "expand",
            "Multiplying out products and powers",
            Intent::Expand,
            r"^(?:expand|multiply\s+out)\s+(.+)$",
        ),
        IntentPattern::new(
            "simplify",
            "Collecting like terms",
            Intent::Simplify,
            r"^simplify\s+(.+)$",
        ),
        IntentPattern::new(
            "geometry",
            "Named-shape measurement questions",
            Intent::Geometry,
            r"\b(?:circle|rectangle|square|triangle|sphere|cylinder|cone|hypotenuse|pythagor)",
        ),
        IntentPattern::new(
            "solve",
            "Equation solving",
            Intent::Solve,
            r"^solve\s+(.+)$",
        ),
    ]
}

const FILLER_PATTERNS: [&str; 7] = [
    r"^(?:hi|hello|hey)[,!.\s]+",
    r"^please\s+",
    r"^(?:can|could|would|will)\s+you\s+(?:please\s+)?",
    r"^what(?:'s|s|\s+is|\s+are)\s+",
    r"^how\s+much\s+is\s+",
    r"^(?:find|compute|calculate|evaluate|determine|work\s+out|tell\s+me|give\s+me|show\s+me|help\s+me\s+with)\s+",
    r"^the\s+",
];

/// Classifies normalized question text into tasks.
#[derive(Debug)]
pub struct Classifier {
    fillers: Vec<Regex>,
    intents: Vec<IntentPattern>,
    leading_noun: Regex,
    respect_to: Regex,
    differential: Regex,
    solve_for: Regex,
    trailing_please: Regex,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Build a classifier with the built-in pattern table.
    ///
    /// # Panics
    ///
    /// Panics if a built-in pattern fails to compile; the patterns are
    /// fixed strings covered by tests.
    #[must_use]
    pub fn new() -> Self {
        let fillers = FILLER_PATTERNS
            .iter()
            .map(|p| compile(p))
            .collect();
        Self {
            fillers,
            intents: builtin_intents(),
            leading_noun: compile(r"^(?:the\s+)?(?:expression|equation|polynomial|function|quadratic)\s+"),
            respect_to: compile(r"^(.+?)\s+with\s+respect\s+to\s+([a-z][a-z0-9_]*)$"),
            differential: compile(r"^(.+?)\s+d([a-z])$"),
            solve_for: compile(r"^(.+?)\s+for\s+([a-z][a-z0-9_]*)$"),
            trailing_please: compile(r"[,\s]*please[.!?\s]*$"),
        }
    }

    /// Classify a normalized question into a task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProblem`] when no task can be
    /// recognized, and parse errors when the mathematical fragment is
    /// malformed.
    pub fn classify(&self, text: &str) -> Result<Task> {
        let text = self.strip_fillers(text);
        if text.is_empty() {
            return Err(Error::unsupported(
                "no math problem found in the message; try something like 'solve 2x + 5 = 13'",
            ));
        }
        for pattern in &self.intents {
            if let Some(caps) = pattern.regex.captures(&text) {
                tracing::debug!(pattern = pattern.name, "intent matched");
                return self.build(pattern.intent, &caps, &text);
            }
        }
        // No verb at all: treat the whole text as a bare statement.
        match parse_statement(&text)? {
            Statement::Equation(equation) => self.solve_task(equation, None),
            Statement::Expression(expr) => Ok(Task::Evaluate(expr)),
        }
    }

    fn strip_fillers(&self, text: &str) -> String {
        let mut text = text.trim().to_string();
        text = self.trailing_please.replace(&text, "").to_string();
        for _ in 0..8 {
            let before = text.len();
            for filler in &self.fillers {
                text = filler.replace(&text, "").to_string();
            }
            if text.len() == before {
                break;
            }
        }
        let mut text = text
            .trim_end_matches(['?', '.', ',', ';', ':'])
            .trim()
            .to_string();
        if let Some(stripped) = text.strip_suffix('=') {
            text = stripped.trim().to_string();
        }
        text
    }

    fn build(&self, intent: Intent, caps: &regex::Captures<'_>, text: &str) -> Result<Task> {
        match intent {
            Intent::DerivativeLeibniz => {
                let var = caps[1].to_string();
                let expr = parse_expression(self.strip_noun(&caps[2]))?;
                Ok(Task::Differentiate { expr, var })
            }
            Intent::Derivative => {
                let (fragment, var) = self.split_respect_to(self.strip_noun(&caps[1]));
                let expr = parse_expression(&fragment)?;
                let var = match var {
                    Some(v) => v,
                    None => infer_var(&expr)?,
                };
                Ok(Task::Differentiate { expr, var })
            }
            Intent::Integral => {
                let rest = self.strip_noun(&caps[1]);
                let (fragment, var) = match self.split_respect_to(rest) {
                    (f, Some(v)) => (f, Some(v)),
                    (f, None) => self.split_differential(&f),
                };
                let expr = parse_expression(&fragment)?;
                let var = match var {
                    Some(v) => v,
                    None => infer_var(&expr)?,
                };
                Ok(Task::Integrate { expr, var })
            }
            Intent::Limit => {
                let expr = parse_expression(&caps[1])?;
                let var = caps[2].to_string();
                let target = parse_limit_target(&caps[3])?;
                Ok(Task::Limit { expr, var, target })
            }
            Intent::Factor => Ok(Task::Factor(parse_expression(self.strip_noun(&caps[1]))?)),
            Intent::Expand => Ok(Task::Expand(parse_expression(self.strip_noun(&caps[1]))?)),
            Intent::Simplify => Ok(Task::Simplify(parse_expression(self.strip_noun(&caps[1]))?)),
            Intent::Geometry => Ok(Task::Geometry(geometry::parse_request(text)?)),
            Intent::Solve => {
                let rest = self.strip_noun(&caps[1]);
                let (fragment, var) = match self.solve_for.captures(rest) {
                    Some(c) => (c[1].to_string(), Some(c[2].to_string())),
                    None => (rest.to_string(), None),
                };
                match parse_statement(&fragment)? {
                    Statement::Equation(equation) => self.solve_task(equation, var),
                    // "solve x^2 - 4" means "solve x^2 - 4 = 0"
                    Statement::Expression(expr) => {
                        let equation = Equation::new(expr, Expr::number(0.0));
                        self.solve_task(equation, var)
                    }
                }
            }
        }
    }

    fn solve_task(&self, equation: Equation, var: Option<String>) -> Result<Task> {
        let var = match var {
            Some(v) => v,
            None => {
                let vars = equation.variables();
                match vars.len() {
                    0 => {
                        return Err(Error::unsupported(
                            "the equation has no variable to solve for",
                        ))
                    }
                    1 => vars.into_iter().next().unwrap_or_default(),
                    _ => {
                        let list = vars.into_iter().collect::<Vec<_>>().join(", ");
                        return Err(Error::unsupported(format!(
                            "the equation mixes several variables ({list}); solve for one, e.g. 'solve ... for x'"
                        )));
                    }
                }
            }
        };
        Ok(Task::SolveEquation { equation, var })
    }

    fn strip_noun<'a>(&self, text: &'a str) -> &'a str {
        match self.leading_noun.find(text) {
            Some(m) => &text[m.end()..],
            None => text,
        }
    }

    fn split_respect_to(&self, text: &str) -> (String, Option<String>) {
        match self.respect_to.captures(text) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (text.to_string(), None),
        }
    }

    /// Split a trailing differential like `dx` off `x^2 dx`.
    fn split_differential(&self, text: &str) -> (String, Option<String>) {
        match self.differential.captures(text) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (text.to_string(), None),
        }
    }
}

/// Classify with a freshly built [`Classifier`].
///
/// # Errors
///
/// See [`Classifier::classify`].
pub fn classify(text: &str) -> Result<Task> {
    Classifier::new().classify(text)
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid classifier pattern: {e}"))
}

fn infer_var(expr: &Expr) -> Result<String> {
    let vars = expr.variables();
    match vars.len() {
        0 => Ok("x".to_string()),
        1 => Ok(vars.into_iter().next().unwrap_or_default()),
        _ => {
            let list = vars.into_iter().collect::<Vec<_>>().join(", ");
            Err(Error::unsupported(format!(
                "say which variable to use, e.g. 'with respect to x'; found {list}"
            )))
        }
    }
}

fn parse_limit_target(text: &str) -> Result<LimitTarget> {
    match text.trim() {
        "inf" | "infinity" | "+inf" | "+infinity" => Ok(LimitTarget::PosInfinity),
        "-inf" | "-infinity" => Ok(LimitTarget::NegInfinity),
        other => {
            let expr = parse_expression(other)?;
            if !expr.is_constant() {
                return Err(Error::unsupported(format!(
                    "the limit target '{other}' must be a number or infinity"
                )));
            }
            Ok(LimitTarget::Value(expr.eval(&[])?))
        }
    }
}
