//! Solver dispatch across problem categories.
//!
//! The engine owns one solver per [`Category`] plus the classifier that
//! turns normalized question text into a [`Task`]. Callers go through
//! [`SolverEngine::solve_text`]; everything below it is synchronous and
//! CPU-bound, so async callers run it on a blocking thread.

use tracing::debug;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::parse::format_number;
use crate::problem::{Category, Solution};

use super::algebra::AlgebraSolver;
use super::arithmetic::ArithmeticSolver;
use super::calculus::CalculusSolver;
use super::geometry::GeometrySolver;
use super::intent::{Classifier, Task};

/// A solver for one problem category.
///
/// Implementors narrate every transformation they apply; a returned
/// [`Solution`] always carries at least one step.
pub trait CategorySolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The category this solver handles.
    fn category(&self) -> Category;

    /// Solve a classified task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProblem`](crate::Error::UnsupportedProblem)
    /// when the task is outside what the solver can do, and
    /// [`Error::MathDomain`](crate::Error::MathDomain) when the math itself
    /// is undefined (division by zero, square root of a negative, ...).
    fn solve(&self, task: &Task) -> Result<Solution>;
}

/// Dispatches classified tasks to per-category solvers.
#[derive(Debug)]
pub struct SolverEngine {
    classifier: Classifier,
    arithmetic: ArithmeticSolver,
    algebra: AlgebraSolver,
    calculus: CalculusSolver,
    geometry: GeometrySolver,
}

impl SolverEngine {
    /// Build an engine from solver configuration.
    #[must_use]
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            classifier: Classifier::new(),
            arithmetic: ArithmeticSolver::new(config.max_steps, config.approx_decimals),
            algebra: AlgebraSolver::new(config.approx_decimals),
            calculus: CalculusSolver::new(config.approx_decimals),
            geometry: GeometrySolver::new(config.approx_decimals),
        }
    }

    /// Classify normalized question text, then solve it.
    ///
    /// # Errors
    ///
    /// Propagates classification, parse, and solver errors.
    pub fn solve_text(&self, text: &str) -> Result<Solution> {
        let task = self.classifier.classify(text)?;
        self.solve_task(&task)
    }

    /// Classify without solving.
    ///
    /// # Errors
    ///
    /// Returns an error when no task can be recognized in the text.
    pub fn classify(&self, text: &str) -> Result<Task> {
        self.classifier.classify(text)
    }

    /// Solve an already classified task.
    ///
    /// # Errors
    ///
    /// Propagates the category solver's errors.
    pub fn solve_task(&self, task: &Task) -> Result<Solution> {
        let solver = self.solver_for(task.category());
        debug!(solver = solver.name(), category = %task.category(), "dispatching task");
        let solution = solver.solve(task)?;
        debug!(steps = solution.steps.len(), "task solved");
        Ok(solution)
    }

    fn solver_for(&self, category: Category) -> &dyn CategorySolver {
        match category {
            Category::Arithmetic => &self.arithmetic,
            Category::Algebra => &self.algebra,
            Category::Calculus => &self.calculus,
            Category::Geometry => &self.geometry,
        }
    }
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}

/// Format a value exactly when it survives rounding, otherwise with an
/// approximation marker, e.g. `4` versus `≈ 2.3333`.
pub(crate) fn approx_text(value: f64, decimals: u8) -> String {
    let rounded = round_to(value, decimals);
    if rounded == value {
        format_number(rounded)
    } else {
        format!("≈ {}", format_number(rounded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SolverEngine {
        SolverEngine::new(&SolverConfig::default())
    }

    #[test]
    fn test_solve_text_arithmetic() {
        let solution = engine().solve_text("what is 15 + 27 * 2").unwrap();
        assert_eq!(solution.category, Category::Arithmetic);
        assert_eq!(solution.answer, "69");
        assert!(!solution.steps.is_empty());
    }

    #[test]
    fn test_solve_text_algebra() {
        let solution = engine().solve_text("solve 2x + 5 = 13").unwrap();
        assert_eq!(solution.category, Category::Algebra);
        assert_eq!(solution.answer, "x = 4");
    }

    #[test]
    fn test_solve_text_calculus() {
        let solution = engine().solve_text("differentiate x^2").unwrap();
        assert_eq!(solution.category, Category::Calculus);
        assert_eq!(solution.answer, "2x");
    }

    #[test]
    fn test_solve_text_geometry() {
        let solution = engine()
            .solve_text("area of a circle with radius 5")
            .unwrap();
        assert_eq!(solution.category, Category::Geometry);
        assert!(solution.answer.contains("25"));
    }

    #[test]
    fn test_solve_text_rejects_gibberish() {
        let err = engine().solve_text("tell me a joke").unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.33333, 4), 2.3333);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(78.53981633, 4), 78.5398);
    }

    #[test]
    fn test_approx_text() {
        assert_eq!(approx_text(4.0, 4), "4");
        assert_eq!(approx_text(1.0 / 3.0, 4), "≈ 0.3333");
        assert_eq!(approx_text(2.5, 4), "2.5");
    }
}
