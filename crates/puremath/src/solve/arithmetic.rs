//! Step-by-step evaluation of constant expressions.
//!
//! The solver repeatedly finds the innermost leftmost operation whose
//! operands are plain numbers, computes it, and narrates the rewrite,
//! so `15 + 27 * 2` becomes two steps rather than one opaque result.

use crate::error::{Error, Result};
use crate::explain::Tracer;
use crate::parse::{Expr, Func};
use crate::problem::{Category, Solution};

use super::engine::{approx_text, round_to, CategorySolver};
use super::intent::Task;

/// Narrated evaluator for constant expressions.
#[derive(Debug)]
pub struct ArithmeticSolver {
    max_steps: usize,
    decimals: u8,
}

impl ArithmeticSolver {
    #[must_use]
    pub fn new(max_steps: usize, decimals: u8) -> Self {
        Self {
            max_steps,
            decimals,
        }
    }

    fn evaluate(&self, expr: &Expr) -> Result<Solution> {
        let vars = expr.variables();
        if !vars.is_empty() {
            let list = vars.into_iter().collect::<Vec<_>>().join(", ");
            return Err(Error::unsupported(format!(
                "the expression contains {list}; give numbers only, or ask to solve an equation"
            )));
        }

        let mut tracer = Tracer::new();
        let mut current = expr.clone();
        while let Some((next, title)) = reduce_once(&current, self.decimals)? {
            if tracer.len() >= self.max_steps {
                return Err(Error::unsupported(format!(
                    "the expression needs more than {} steps to evaluate",
                    self.max_steps
                )));
            }
            tracer.rewrite(title, show(&current, self.decimals), show(&next, self.decimals));
            current = next;
        }
        let value = current.eval(&[])?;

        if tracer.is_empty() {
            tracer.note("The value is already in simplest form");
        }
        Ok(tracer.finish(approx_text(value, self.decimals), Category::Arithmetic))
    }
}

impl CategorySolver for ArithmeticSolver {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn category(&self) -> Category {
        Category::Arithmetic
    }

    fn solve(&self, task: &Task) -> Result<Solution> {
        match task {
            Task::Evaluate(expr) => self.evaluate(expr),
            other => Err(Error::internal(format!(
                "arithmetic solver received {other:?}"
            ))),
        }
    }
}

/// Find the innermost leftmost reducible node, compute it, and return the
/// rewritten tree with a step title. `None` means fully reduced.
fn reduce_once(expr: &Expr, decimals: u8) -> Result<Option<(Expr, String)>> {
    match expr {
        Expr::Number(_) => Ok(None),
        Expr::Variable(name) => match name.as_str() {
            "pi" => Ok(Some((
                Expr::number(std::f64::consts::PI),
                "Substitute pi".to_string(),
            ))),
            "e" => Ok(Some((
                Expr::number(std::f64::consts::E),
                "Substitute e".to_string(),
            ))),
            "inf" => Err(Error::math_domain("cannot do arithmetic with infinity")),
            other => Err(Error::unsupported(format!(
                "the variable {other} has no value"
            ))),
        },
        Expr::Neg(inner) => {
            // A negated literal is already an atom; -5 needs no step.
            if matches!(**inner, Expr::Number(_)) {
                return Ok(None);
            }
            reduce_child(inner, decimals, Expr::neg)
        }
        Expr::Add(lhs, rhs) => {
            if let Some(step) = reduce_child(lhs, decimals, |e| Expr::add(e, (**rhs).clone()))? {
                return Ok(Some(step));
            }
            if let Some(step) = reduce_child(rhs, decimals, |e| Expr::add((**lhs).clone(), e))? {
                return Ok(Some(step));
            }
            let title = format!("Add {} and {}", show(lhs, decimals), show(rhs, decimals));
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Sub(lhs, rhs) => {
            if let Some(step) = reduce_child(lhs, decimals, |e| Expr::sub(e, (**rhs).clone()))? {
                return Ok(Some(step));
            }
            if let Some(step) = reduce_child(rhs, decimals, |e| Expr::sub((**lhs).clone(), e))? {
                return Ok(Some(step));
            }
            let title = format!(
                "Subtract {} from {}",
                show(rhs, decimals),
                show(lhs, decimals)
            );
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Mul(lhs, rhs) => {
            if let Some(step) = reduce_child(lhs, decimals, |e| Expr::mul(e, (**rhs).clone()))? {
                return Ok(Some(step));
            }
            if let Some(step) = reduce_child(rhs, decimals, |e| Expr::mul((**lhs).clone(), e))? {
                return Ok(Some(step));
            }
            let title = format!(
                "Multiply {} by {}",
                show(lhs, decimals),
                show(rhs, decimals)
            );
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Div(lhs, rhs) => {
            if let Some(step) = reduce_child(lhs, decimals, |e| Expr::div(e, (**rhs).clone()))? {
                return Ok(Some(step));
            }
            if let Some(step) = reduce_child(rhs, decimals, |e| Expr::div((**lhs).clone(), e))? {
                return Ok(Some(step));
            }
            let title = format!("Divide {} by {}", show(lhs, decimals), show(rhs, decimals));
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Pow(lhs, rhs) => {
            if let Some(step) = reduce_child(lhs, decimals, |e| Expr::pow(e, (**rhs).clone()))? {
                return Ok(Some(step));
            }
            if let Some(step) = reduce_child(rhs, decimals, |e| Expr::pow((**lhs).clone(), e))? {
                return Ok(Some(step));
            }
            let title = format!(
                "Raise {} to the power {}",
                show(lhs, decimals),
                show(rhs, decimals)
            );
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Call(func, arg) => {
            if let Some(step) = reduce_child(arg, decimals, |e| Expr::call(*func, e))? {
                return Ok(Some(step));
            }
            let title = match func {
                Func::Sqrt => format!("Take the square root of {}", show(arg, decimals)),
                Func::Abs => format!("Take the absolute value of {}", show(arg, decimals)),
                Func::Ln => format!("Take the natural log of {}", show(arg, decimals)),
                _ => format!("Evaluate {}({})", func.name(), show(arg, decimals)),
            };
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
        Expr::Factorial(inner) => {
            if let Some(step) = reduce_child(inner, decimals, Expr::factorial)? {
                return Ok(Some(step));
            }
            let title = format!("Compute {}!", show(inner, decimals));
            Ok(Some((Expr::number(expr.eval(&[])?), title)))
        }
    }
}

fn reduce_child(
    child: &Expr,
    decimals: u8,
    rebuild: impl FnOnce(Expr) -> Expr,
) -> Result<Option<(Expr, String)>> {
    Ok(reduce_once(child, decimals)?.map(|(reduced, title)| (rebuild(reduced), title)))
}

/// Render an expression with numeric literals rounded for display.
/// Internal state keeps full precision; only the narration rounds.
fn show(expr: &Expr, decimals: u8) -> String {
    rounded(expr, decimals).to_string()
}

fn rounded(expr: &Expr, decimals: u8) -> Expr {
    match expr {
        Expr::Number(n) => Expr::number(round_to(*n, decimals)),
        Expr::Variable(_) => expr.clone(),
        Expr::Neg(a) => Expr::neg(rounded(a, decimals)),
        Expr::Add(a, b) => Expr::add(rounded(a, decimals), rounded(b, decimals)),
        Expr::Sub(a, b) => Expr::sub(rounded(a, decimals), rounded(b, decimals)),
        Expr::Mul(a, b) => Expr::mul(rounded(a, decimals), rounded(b, decimals)),
        Expr::Div(a, b) => Expr::div(rounded(a, decimals), rounded(b, decimals)),
        Expr::Pow(a, b) => Expr::pow(rounded(a, decimals), rounded(b, decimals)),
        Expr::Call(f, a) => Expr::call(*f, rounded(a, decimals)),
        Expr::Factorial(a) => Expr::factorial(rounded(a, decimals)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expression;

    fn solver() -> ArithmeticSolver {
        ArithmeticSolver::new(64, 4)
    }

    fn solve(text: &str) -> Solution {
        let expr = parse_expression(text).unwrap();
        solver().evaluate(&expr).unwrap()
    }

    #[test]
    fn test_precedence_order_of_steps() {
        let solution = solve("15 + 27 * 2");
        assert_eq!(solution.answer, "69");
        assert_eq!(solution.steps.len(), 2);
        assert_eq!(solution.steps[0].title, "Multiply 27 by 2");
        assert_eq!(solution.steps[0].before.as_deref(), Some("15 + 27 * 2"));
        assert_eq!(solution.steps[0].after.as_deref(), Some("15 + 54"));
        assert_eq!(solution.steps[1].title, "Add 15 and 54");
    }

    #[test]
    fn test_parentheses_first() {
        let solution = solve("(2 + 3) * 4");
        assert_eq!(solution.steps[0].title, "Add 2 and 3");
        assert_eq!(solution.steps[0].after.as_deref(), Some("5 * 4"));
        assert_eq!(solution.answer, "20");
    }

    #[test]
    fn test_leftmost_innermost_order() {
        let solution = solve("(1 + 2) * (3 + 4)");
        assert_eq!(solution.steps[0].title, "Add 1 and 2");
        assert_eq!(solution.steps[1].title, "Add 3 and 4");
        assert_eq!(solution.steps[2].title, "Multiply 3 by 7");
        assert_eq!(solution.answer, "21");
    }

    #[test]
    fn test_single_number_still_narrates() {
        let solution = solve("42");
        assert_eq!(solution.steps.len(), 1);
        assert_eq!(solution.answer, "42");
    }

    #[test]
    fn test_negative_literal_is_an_atom() {
        let solution = solve("-5 + 3");
        assert_eq!(solution.steps.len(), 1);
        assert_eq!(solution.steps[0].title, "Add -5 and 3");
        assert_eq!(solution.answer, "-2");
    }

    #[test]
    fn test_factorial_before_power() {
        let solution = solve("2^3!");
        assert_eq!(solution.steps[0].title, "Compute 3!");
        assert_eq!(solution.steps[1].title, "Raise 2 to the power 6");
        assert_eq!(solution.answer, "64");
    }

    #[test]
    fn test_square_root_narration() {
        let solution = solve("sqrt(16) + 1");
        assert_eq!(solution.steps[0].title, "Take the square root of 16");
        assert_eq!(solution.answer, "5");
    }

    #[test]
    fn test_pi_substitution_rounds_display_only() {
        let solution = solve("2 * pi");
        assert_eq!(solution.steps[0].title, "Substitute pi");
        assert_eq!(solution.steps[0].after.as_deref(), Some("2 * 3.1416"));
        assert_eq!(solution.answer, "≈ 6.2832");
    }

    #[test]
    fn test_inexact_division_marks_approximation() {
        let solution = solve("7/3");
        assert_eq!(solution.answer, "≈ 2.3333");
    }

    #[test]
    fn test_division_by_zero() {
        let expr = parse_expression("10/0").unwrap();
        let err = solver().evaluate(&expr).unwrap_err();
        assert!(matches!(err, Error::MathDomain { .. }));
    }

    #[test]
    fn test_free_variable_is_rejected() {
        let expr = parse_expression("2x + 1").unwrap();
        let err = solver().evaluate(&expr).unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains('x'));
    }

    #[test]
    fn test_step_ceiling() {
        let tight = ArithmeticSolver::new(2, 4);
        let expr = parse_expression("1 + 2 + 3 + 4 + 5").unwrap();
        let err = tight.evaluate(&expr).unwrap_err();
        assert!(err.to_string().contains("steps"));
    }

    #[test]
    fn test_solve_rejects_foreign_task() {
        let expr = parse_expression("x").unwrap();
        let err = solver().solve(&Task::Simplify(expr)).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_nested_functions() {
        let solution = solve("sqrt(sqrt(16))");
        assert_eq!(solution.steps[0].title, "Take the square root of 16");
        assert_eq!(solution.steps[1].title, "Take the square root of 4");
        assert_eq!(solution.answer, "2");
    }
}
