//! Linear and quadratic algebra with textbook narration.
//!
//! Equations are lowered to [`Poly`] form to decide the degree, but the
//! narration keeps both sides alive and isolates the variable the way a
//! textbook does: move terms, then divide. Factoring runs on integer
//! coefficients through the discriminant; expanding narrates the
//! term-by-term products before collecting.

use crate::error::{Error, Result};
use crate::explain::Tracer;
use crate::parse::{format_number, Equation, Expr};
use crate::problem::{Category, Solution};

use super::engine::{approx_text, round_to, CategorySolver};
use super::intent::Task;
use super::polynomial::{fraction_text, gcd, Poly};

/// Solver for equations, simplification, factoring, and expansion.
#[derive(Debug)]
pub struct AlgebraSolver {
    decimals: u8,
}

impl AlgebraSolver {
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    fn solve_equation(&self, equation: &Equation, var: &str) -> Result<Solution> {
        let lhs = Poly::from_expr(&equation.lhs, var)?;
        let rhs = Poly::from_expr(&equation.rhs, var)?;
        let diff = lhs.sub(&rhs);

        if diff.is_zero() {
            let mut tracer = Tracer::new();
            tracer.rewrite(
                "Collect every term on one side",
                eq_text(&lhs, &rhs),
                "0 = 0",
            );
            tracer.note("Both sides are the same, so any value works");
            return Ok(tracer.finish(
                format!("every value of {var} is a solution"),
                Category::Algebra,
            ));
        }
        match diff.degree() {
            0 => {
                let mut tracer = Tracer::new();
                tracer.rewrite(
                    "Collect every term on one side",
                    eq_text(&lhs, &rhs),
                    format!("{diff} = 0"),
                );
                tracer.note("A nonzero constant can never equal zero");
                Ok(tracer.finish("no solution", Category::Algebra))
            }
            1 => self.linear(lhs, rhs, var),
            2 => self.quadratic(&lhs, &rhs, var),
            d => Err(Error::unsupported(format!(
                "equations of degree {d} are not supported; try degree 1 or 2"
            ))),
        }
    }

    fn linear(&self, mut left: Poly, mut right: Poly, var: &str) -> Result<Solution> {
        let mut tracer = Tracer::new();

        if left.degree() < right.degree() {
            let old = eq_text(&left, &right);
            std::mem::swap(&mut left, &mut right);
            tracer.rewrite(
                format!("Swap sides so {var} is on the left"),
                old,
                eq_text(&left, &right),
            );
        }

        let moving = right.coeff(1);
        if moving != 0.0 {
            let old = eq_text(&left, &right);
            let shift = Poly::monomial(var, moving, 1);
            left = left.sub(&shift);
            right = right.sub(&shift);
            let term = Poly::monomial(var, moving.abs(), 1);
            let title = if moving > 0.0 {
                format!("Subtract {term} from both sides")
            } else {
                format!("Add {term} to both sides")
            };
            tracer.rewrite(title, old, eq_text(&left, &right));
        }

        let constant = left.coeff(0);
        if constant != 0.0 {
            let old = eq_text(&left, &right);
            let shift = Poly::constant(var, constant);
            left = left.sub(&shift);
            right = right.sub(&shift);
            let title = if constant > 0.0 {
                format!("Subtract {} from both sides", format_number(constant))
            } else {
                format!("Add {} to both sides", format_number(-constant))
            };
            tracer.rewrite(title, old, eq_text(&left, &right));
        }

        let a = left.coeff(1);
        if a == 0.0 {
            return Err(Error::internal("linear equation lost its variable"));
        }
        let c = right.coeff(0);
        let root = c / a;
        let frac = fraction_text(c, a);
        if (a - 1.0).abs() > f64::EPSILON {
            let old = eq_text(&left, &right);
            tracer.rewrite(
                format!("Divide both sides by {}", format_number(a)),
                old,
                format!("{var} = {frac}"),
            );
        }
        if tracer.is_empty() {
            tracer.note("The equation is already solved");
        }

        let answer = if frac.contains('/') {
            format!("{var} = {frac} {}", approx_text(root, self.decimals))
        } else {
            format!("{var} = {frac}")
        };
        Ok(tracer.finish(answer, Category::Algebra))
    }

    fn quadratic(&self, lhs: &Poly, rhs: &Poly, var: &str) -> Result<Solution> {
        let mut tracer = Tracer::new();
        let std_form = lhs.sub(rhs);
        if !rhs.is_zero() {
            tracer.rewrite(
                "Move every term to one side",
                eq_text(lhs, rhs),
                format!("{std_form} = 0"),
            );
        }

        let (a, b, c) = (std_form.coeff(2), std_form.coeff(1), std_form.coeff(0));
        tracer.note(format!(
            "This is a quadratic with a = {}, b = {}, c = {}",
            format_number(a),
            format_number(b),
            format_number(c)
        ));
        let d = b * b - 4.0 * a * c;
        tracer.rewrite(
            "Compute the discriminant",
            "d = b^2 - 4ac",
            format!(
                "d = {}^2 - 4 * {} * {} = {}",
                paren(b),
                paren(a),
                paren(c),
                format_number(d)
            ),
        );

        let two_a = 2.0 * a;
        if d > 0.0 {
            let s = d.sqrt();
            let formula = format!(
                "{var} = ({} ± sqrt({}))/{}",
                format_number(-b),
                format_number(d),
                format_number(two_a)
            );
            tracer.show("Apply the quadratic formula", formula.clone());
            if s.fract() == 0.0 {
                let evaluated = format!(
                    "{var} = ({} ± {})/{}",
                    format_number(-b),
                    format_number(s),
                    format_number(two_a)
                );
                tracer.rewrite("Evaluate the square root", formula, evaluated.clone());
                let r1 = fraction_text(-b + s, two_a);
                let r2 = fraction_text(-b - s, two_a);
                let answer = format!("{var} = {r1} or {var} = {r2}");
                tracer.rewrite("Split into the two roots", evaluated, answer.clone());
                Ok(tracer.finish(answer, Category::Algebra))
            } else {
                let evaluated = format!(
                    "{var} ≈ ({} ± {})/{}",
                    format_number(-b),
                    format_number(round_to(s, self.decimals)),
                    format_number(two_a)
                );
                tracer.rewrite("Evaluate the square root", formula, evaluated.clone());
                let r1 = format_number(round_to((-b + s) / two_a, self.decimals));
                let r2 = format_number(round_to((-b - s) / two_a, self.decimals));
                let answer = format!("{var} ≈ {r1} or {var} ≈ {r2}");
                tracer.rewrite("Split into the two roots", evaluated, answer.clone());
                Ok(tracer.finish(answer, Category::Algebra))
            }
        } else if d == 0.0 {
            tracer.note("The discriminant is zero, so there is one repeated root");
            let frac = fraction_text(-b, two_a);
            tracer.show(
                "Apply the quadratic formula",
                format!("{var} = -b/(2a) = {frac}"),
            );
            Ok(tracer.finish(
                format!("{var} = {frac} (double root)"),
                Category::Algebra,
            ))
        } else {
            tracer.note("The discriminant is negative, so the roots are complex");
            let formula = format!(
                "{var} = ({} ± sqrt({}))/{}",
                format_number(-b),
                format_number(d),
                format_number(two_a)
            );
            tracer.show("Apply the quadratic formula", formula.clone());

            let s = (-d).sqrt();
            let re_text = fraction_text(-b, two_a);
            let im_value = (s / two_a).abs();
            let im_text = if s.fract() == 0.0 {
                fraction_text(s, two_a.abs())
            } else {
                format_number(round_to(im_value, self.decimals))
            };
            let unit = if im_text == "1" {
                "i".to_string()
            } else {
                format!("{im_text}i")
            };
            let answer = if re_text == "0" {
                format!("{var} = {unit} or {var} = -{unit}")
            } else {
                format!("{var} = {re_text} + {unit} or {var} = {re_text} - {unit}")
            };
            tracer.rewrite(
                "Write the square root of the negative discriminant with i",
                formula,
                answer.clone(),
            );
            Ok(tracer.finish(answer, Category::Algebra))
        }
    }

    fn simplify(&self, expr: &Expr) -> Result<Solution> {
        let vars = expr.variables();
        if vars.len() > 1 {
            let list = vars.into_iter().collect::<Vec<_>>().join(", ");
            return Err(Error::unsupported(format!(
                "simplifying with several variables ({list}) is not supported"
            )));
        }
        let has_var = !vars.is_empty();
        let var = vars
            .into_iter()
            .next()
            .unwrap_or_else(|| "x".to_string());
        let poly = Poly::from_expr(expr, &var)?;

        let original = expr.to_string();
        let result = poly.to_string();
        let mut tracer = Tracer::new();
        if original == result {
            tracer.note("The expression is already in simplest form");
        } else {
            let title = if !has_var {
                "Combine the constants"
            } else if has_distribution(expr) {
                "Distribute and combine like terms"
            } else {
                "Combine like terms"
            };
            tracer.rewrite(title, original, result.clone());
        }
        Ok(tracer.finish(result, Category::Algebra))
    }

    fn expand(&self, expr: &Expr) -> Result<Solution> {
        let vars = expr.variables();
        if vars.len() > 1 {
            let list = vars.into_iter().collect::<Vec<_>>().join(", ");
            return Err(Error::unsupported(format!(
                "expanding with several variables ({list}) is not supported"
            )));
        }
        let var = vars
            .into_iter()
            .next()
            .unwrap_or_else(|| "x".to_string());
        let poly = Poly::from_expr(expr, &var)?;
        let original = expr.to_string();
        let result = poly.to_string();
        let mut tracer = Tracer::new();

        match expr {
            Expr::Mul(l, r) => {
                let pl = Poly::from_expr(l, &var)?;
                let pr = Poly::from_expr(r, &var)?;
                self.narrate_product(&mut tracer, &original, &pl, &pr, &result);
            }
            Expr::Pow(base, exp)
                if matches!(**exp, Expr::Number(n) if n == 2.0)
                    && !matches!(**base, Expr::Number(_) | Expr::Variable(_)) =>
            {
                let pb = Poly::from_expr(base, &var)?;
                let product = format!("({base}) * ({base})");
                tracer.rewrite("Write the square as a product", original.clone(), product.clone());
                self.narrate_product(&mut tracer, &product, &pb, &pb, &result);
            }
            _ => {
                if original == result {
                    tracer.note("The expression is already expanded");
                } else {
                    tracer.rewrite("Expand the expression", original, result.clone());
                }
            }
        }
        Ok(tracer.finish(result, Category::Algebra))
    }

    fn narrate_product(
        &self,
        tracer: &mut Tracer,
        from: &str,
        pl: &Poly,
        pr: &Poly,
        result: &str,
    ) {
        let cross = cross_terms(pl, pr);
        tracer.rewrite("Multiply term by term", from.to_string(), cross.clone());
        if cross != result {
            tracer.rewrite("Combine like terms", cross, result.to_string());
        }
    }

    fn factor(&self, expr: &Expr) -> Result<Solution> {
        let vars = expr.variables();
        let var = match vars.len() {
            0 => {
                return Err(Error::unsupported(
                    "give a polynomial with a variable to factor",
                ))
            }
            1 => vars.into_iter().next().unwrap_or_default(),
            _ => {
                let list = vars.into_iter().collect::<Vec<_>>().join(", ");
                return Err(Error::unsupported(format!(
                    "factoring with several variables ({list}) is not supported"
                )));
            }
        };
        let poly = Poly::from_expr(expr, &var)?;
        if poly.degree() == 0 {
            return Err(Error::unsupported("a constant has no polynomial factors"));
        }
        if poly.integer_coeffs().is_none() {
            return Err(Error::unsupported(
                "factoring needs integer coefficients",
            ));
        }

        let mut tracer = Tracer::new();
        let original = poly.to_string();
        let mut work = poly.clone();
        let mut prefix = String::new();

        // Pull out sign, numeric content, and any common power of the variable.
        let negative = work.leading() < 0.0;
        if negative {
            work = work.neg();
        }
        let g = work.content().unwrap_or(1);
        let m = work.min_degree();
        if negative || g > 1 || m > 0 {
            for _ in 0..m {
                work = work.deflate(0.0);
            }
            #[allow(clippy::cast_precision_loss)]
            if g > 1 {
                work = work.scale(1.0 / g as f64);
            }
            #[allow(clippy::cast_precision_loss)]
            let magnitude = if g > 1 || m > 0 {
                Poly::monomial(&var, g as f64, m).to_string()
            } else {
                String::new()
            };
            prefix = match (negative, magnitude.is_empty()) {
                (true, true) => "-".to_string(),
                (true, false) => format!("-{magnitude}"),
                (false, _) => magnitude,
            };
            let label = if prefix == "-" { "-1" } else { &prefix };
            tracer.rewrite(
                format!("Factor out {label}"),
                original.clone(),
                format!("{prefix}({work})"),
            );
        }

        match work.degree() {
            1 => {
                if prefix.is_empty() {
                    tracer.note("A linear polynomial has no further factors");
                    Ok(tracer.finish(original, Category::Algebra))
                } else {
                    Ok(tracer.finish(format!("{prefix}({work})"), Category::Algebra))
                }
            }
            2 => self.factor_quadratic(tracer, &work, &prefix, &var),
            d => Err(Error::unsupported(format!(
                "factoring degree {d} polynomials is not supported"
            ))),
        }
    }

    fn factor_quadratic(
        &self,
        mut tracer: Tracer,
        work: &Poly,
        prefix: &str,
        var: &str,
    ) -> Result<Solution> {
        let (a, b, c) = (work.coeff(2), work.coeff(1), work.coeff(0));
        let work_text = work.to_string();
        let framed = |factors: &str| {
            if prefix.is_empty() {
                factors.to_string()
            } else {
                format!("{prefix}{factors}")
            }
        };

        // Difference of squares reads better than the generic root dance.
        if b == 0.0 && c < 0.0 && a.sqrt().fract() == 0.0 && (-c).sqrt().fract() == 0.0 {
            let sa = a.sqrt();
            let sc = (-c).sqrt();
            let left = Poly::monomial(var, sa, 1).sub(&Poly::constant(var, sc));
            let right = Poly::monomial(var, sa, 1).add(&Poly::constant(var, sc));
            let factors = format!("({left})({right})");
            tracer.rewrite("Recognize a difference of squares", work_text, factors.clone());
            return Ok(tracer.finish(framed(&factors), Category::Algebra));
        }

        let d = b * b - 4.0 * a * c;
        tracer.rewrite(
            "Compute the discriminant",
            "d = b^2 - 4ac",
            format!(
                "d = {}^2 - 4 * {} * {} = {}",
                paren(b),
                paren(a),
                paren(c),
                format_number(d)
            ),
        );
        let stuck = if prefix.is_empty() {
            work_text.clone()
        } else {
            format!("{prefix}({work_text})")
        };
        if d < 0.0 {
            tracer.note("The discriminant is negative, so there are no real factors");
            let answer = format!("{stuck} cannot be factored over the integers");
            return Ok(tracer.finish(answer, Category::Algebra));
        }
        let s = d.sqrt();
        if s.fract() != 0.0 {
            tracer.note(format!(
                "The discriminant {} is not a perfect square, so the roots are irrational",
                format_number(d)
            ));
            let answer = format!("{stuck} cannot be factored over the integers");
            return Ok(tracer.finish(answer, Category::Algebra));
        }

        let two_a = 2.0 * a;
        let (p1, q1) = reduce_ratio(-b + s, two_a);
        let (p2, q2) = reduce_ratio(-b - s, two_a);
        tracer.rewrite(
            "Find the rational roots",
            format!(
                "{var} = ({} ± {})/{}",
                format_number(-b),
                format_number(s),
                format_number(two_a)
            ),
            format!(
                "{var} = {} or {var} = {}",
                fraction_text(-b + s, two_a),
                fraction_text(-b - s, two_a)
            ),
        );

        #[allow(clippy::cast_precision_loss)]
        let f1 = Poly::monomial(var, q1 as f64, 1).sub(&Poly::constant(var, p1 as f64));
        #[allow(clippy::cast_precision_loss)]
        let f2 = Poly::monomial(var, q2 as f64, 1).sub(&Poly::constant(var, p2 as f64));
        let mut factors = if f1 == f2 {
            format!("({f1})^2")
        } else {
            format!("({f1})({f2})")
        };
        #[allow(clippy::cast_precision_loss)]
        let leftover = a / (q1 * q2) as f64;
        if (leftover - 1.0).abs() > f64::EPSILON {
            factors = format!("{}{factors}", format_number(leftover));
        }
        tracer.rewrite(
            "Rebuild the factors from the roots",
            work_text,
            factors.clone(),
        );
        Ok(tracer.finish(framed(&factors), Category::Algebra))
    }
}

impl CategorySolver for AlgebraSolver {
    fn name(&self) -> &'static str {
        "algebra"
    }

    fn category(&self) -> Category {
        Category::Algebra
    }

    fn solve(&self, task: &Task) -> Result<Solution> {
        match task {
            Task::SolveEquation { equation, var } => self.solve_equation(equation, var),
            Task::Simplify(expr) => self.simplify(expr),
            Task::Factor(expr) => self.factor(expr),
            Task::Expand(expr) => self.expand(expr),
            other => Err(Error::internal(format!("algebra solver received {other:?}"))),
        }
    }
}

fn eq_text(left: &Poly, right: &Poly) -> String {
    format!("{left} = {right}")
}

fn paren(n: f64) -> String {
    if n < 0.0 {
        format!("({})", format_number(n))
    } else {
        format_number(n)
    }
}

/// Reduce `numerator / denominator` to lowest terms with a positive
/// denominator. Inputs are integral `f64`s.
fn reduce_ratio(numerator: f64, denominator: f64) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    let (mut n, mut d) = (numerator as i64, denominator as i64);
    if d < 0 {
        n = -n;
        d = -d;
    }
    let g = gcd(n.abs(), d).max(1);
    (n / g, d / g)
}

/// Whether the expression multiplies into a sum somewhere, which decides
/// between "combine" and "distribute" wording.
fn has_distribution(expr: &Expr) -> bool {
    let is_sum = |e: &Expr| matches!(e, Expr::Add(..) | Expr::Sub(..));
    match expr {
        Expr::Mul(a, b) => {
            is_sum(a) || is_sum(b) || has_distribution(a) || has_distribution(b)
        }
        Expr::Pow(base, _) => is_sum(base) || has_distribution(base),
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Div(a, b) => {
            has_distribution(a) || has_distribution(b)
        }
        Expr::Neg(a) | Expr::Call(_, a) | Expr::Factorial(a) => has_distribution(a),
        Expr::Number(_) | Expr::Variable(_) => false,
    }
}

/// The raw term-by-term products of two polynomials, before collecting,
/// e.g. `x^2 - 2x + x - 2` for `(x + 1)(x - 2)`.
fn cross_terms(pl: &Poly, pr: &Poly) -> String {
    let mut out = String::new();
    for (dl, cl) in descending_terms(pl) {
        for (dr, cr) in descending_terms(pr) {
            let coeff = cl * cr;
            if coeff == 0.0 {
                continue;
            }
            let magnitude = Poly::monomial(pl.var(), coeff.abs(), dl + dr).to_string();
            if out.is_empty() {
                if coeff < 0.0 {
                    out.push('-');
                }
                out.push_str(&magnitude);
            } else {
                out.push_str(if coeff < 0.0 { " - " } else { " + " });
                out.push_str(&magnitude);
            }
        }
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn descending_terms(poly: &Poly) -> Vec<(usize, f64)> {
    (0..=poly.degree())
        .rev()
        .filter_map(|d| {
            let c = poly.coeff(d);
            if c == 0.0 {
                None
            } else {
                Some((d, c))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_equation, parse_expression};

    fn solver() -> AlgebraSolver {
        AlgebraSolver::new(4)
    }

    fn solve_eq(text: &str, var: &str) -> Solution {
        let equation = parse_equation(text).unwrap();
        solver().solve_equation(&equation, var).unwrap()
    }

    #[test]
    fn test_linear_textbook_steps() {
        let solution = solve_eq("2x + 5 = 13", "x");
        assert_eq!(solution.answer, "x = 4");
        assert_eq!(solution.steps.len(), 2);
        assert_eq!(solution.steps[0].title, "Subtract 5 from both sides");
        assert_eq!(solution.steps[0].before.as_deref(), Some("2x + 5 = 13"));
        assert_eq!(solution.steps[0].after.as_deref(), Some("2x = 8"));
        assert_eq!(solution.steps[1].title, "Divide both sides by 2");
        assert_eq!(solution.steps[1].after.as_deref(), Some("x = 4"));
    }

    #[test]
    fn test_linear_negative_constant() {
        let solution = solve_eq("3x - 6 = 0", "x");
        assert_eq!(solution.steps[0].title, "Add 6 to both sides");
        assert_eq!(solution.answer, "x = 2");
    }

    #[test]
    fn test_linear_variable_on_both_sides() {
        let solution = solve_eq("5x = 2x + 9", "x");
        assert_eq!(solution.steps[0].title, "Subtract 2x from both sides");
        assert_eq!(solution.steps[0].after.as_deref(), Some("3x = 9"));
        assert_eq!(solution.answer, "x = 3");
    }

    #[test]
    fn test_linear_swaps_sides() {
        let solution = solve_eq("7 = x + 2", "x");
        assert_eq!(solution.steps[0].title, "Swap sides so x is on the left");
        assert_eq!(solution.answer, "x = 5");
    }

    #[test]
    fn test_linear_fractional_root() {
        let solution = solve_eq("3x = 8", "x");
        assert_eq!(solution.answer, "x = 8/3 ≈ 2.6667");
    }

    #[test]
    fn test_linear_negative_coefficient() {
        let solution = solve_eq("3 - x = 7", "x");
        assert_eq!(solution.answer, "x = -4");
    }

    #[test]
    fn test_already_solved() {
        let solution = solve_eq("x = 5", "x");
        assert_eq!(solution.steps.len(), 1);
        assert_eq!(solution.answer, "x = 5");
    }

    #[test]
    fn test_identity_equation() {
        let solution = solve_eq("x + 1 = x + 1", "x");
        assert_eq!(solution.answer, "every value of x is a solution");
    }

    #[test]
    fn test_contradiction() {
        let solution = solve_eq("x + 1 = x + 2", "x");
        assert_eq!(solution.answer, "no solution");
    }

    #[test]
    fn test_quadratic_integer_roots() {
        let solution = solve_eq("x^2 - 5x + 6 = 0", "x");
        assert_eq!(solution.answer, "x = 3 or x = 2");
        assert!(solution
            .steps
            .iter()
            .any(|s| s.title == "Compute the discriminant"));
    }

    #[test]
    fn test_quadratic_moves_terms_first() {
        let solution = solve_eq("x^2 = 4", "x");
        assert_eq!(solution.steps[0].title, "Move every term to one side");
        assert_eq!(solution.steps[0].after.as_deref(), Some("x^2 - 4 = 0"));
        assert_eq!(solution.answer, "x = 2 or x = -2");
    }

    #[test]
    fn test_quadratic_irrational_roots() {
        let solution = solve_eq("x^2 - 2x - 1 = 0", "x");
        assert_eq!(solution.answer, "x ≈ 2.4142 or x ≈ -0.4142");
    }

    #[test]
    fn test_quadratic_double_root() {
        let solution = solve_eq("x^2 - 2x + 1 = 0", "x");
        assert_eq!(solution.answer, "x = 1 (double root)");
    }

    #[test]
    fn test_quadratic_complex_roots() {
        let solution = solve_eq("x^2 + 2x + 5 = 0", "x");
        assert_eq!(solution.answer, "x = -1 + 2i or x = -1 - 2i");
        assert!(solution
            .steps
            .iter()
            .any(|s| s.title.contains("complex")
                || s.title == "The discriminant is negative, so the roots are complex"));
    }

    #[test]
    fn test_quadratic_pure_imaginary() {
        let solution = solve_eq("x^2 + 4 = 0", "x");
        assert_eq!(solution.answer, "x = 2i or x = -2i");
    }

    #[test]
    fn test_cubic_rejected() {
        let equation = parse_equation("x^3 = 8").unwrap();
        let err = solver().solve_equation(&equation, "x").unwrap_err();
        assert!(err.to_string().contains("degree 3"));
    }

    #[test]
    fn test_simplify_like_terms() {
        let expr = parse_expression("2x + 3x - 1").unwrap();
        let solution = solver().simplify(&expr).unwrap();
        assert_eq!(solution.answer, "5x - 1");
        assert_eq!(solution.steps[0].title, "Combine like terms");
    }

    #[test]
    fn test_simplify_with_distribution() {
        let expr = parse_expression("2(x + 3) + x").unwrap();
        let solution = solver().simplify(&expr).unwrap();
        assert_eq!(solution.answer, "3x + 6");
        assert_eq!(solution.steps[0].title, "Distribute and combine like terms");
    }

    #[test]
    fn test_simplify_already_simple() {
        let expr = parse_expression("x + 1").unwrap();
        let solution = solver().simplify(&expr).unwrap();
        assert_eq!(solution.answer, "x + 1");
        assert!(solution.steps[0].title.contains("already"));
    }

    #[test]
    fn test_simplify_rejects_two_variables() {
        let expr = parse_expression("x + y").unwrap();
        let err = solver().simplify(&expr).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_expand_binomials() {
        let expr = parse_expression("(x + 1)(x - 2)").unwrap();
        let solution = solver().expand(&expr).unwrap();
        assert_eq!(solution.answer, "x^2 - x - 2");
        assert_eq!(solution.steps[0].title, "Multiply term by term");
        assert_eq!(
            solution.steps[0].after.as_deref(),
            Some("x^2 - 2x + x - 2")
        );
        assert_eq!(solution.steps[1].title, "Combine like terms");
    }

    #[test]
    fn test_expand_square() {
        let expr = parse_expression("(x + 1)^2").unwrap();
        let solution = solver().expand(&expr).unwrap();
        assert_eq!(solution.steps[0].title, "Write the square as a product");
        assert_eq!(solution.answer, "x^2 + 2x + 1");
    }

    #[test]
    fn test_factor_simple_quadratic() {
        let expr = parse_expression("x^2 - 5x + 6").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert_eq!(solution.answer, "(x - 3)(x - 2)");
    }

    #[test]
    fn test_factor_difference_of_squares() {
        let expr = parse_expression("x^2 - 9").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert_eq!(solution.answer, "(x - 3)(x + 3)");
        assert_eq!(solution.steps[0].title, "Recognize a difference of squares");
    }

    #[test]
    fn test_factor_common_monomial() {
        let expr = parse_expression("x^3 - x").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert_eq!(solution.steps[0].title, "Factor out x");
        assert_eq!(solution.answer, "x(x - 1)(x + 1)");
    }

    #[test]
    fn test_factor_content_and_square() {
        let expr = parse_expression("2x^2 + 4x + 2").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert_eq!(solution.steps[0].title, "Factor out 2");
        assert_eq!(solution.answer, "2(x + 1)^2");
    }

    #[test]
    fn test_factor_leading_coefficient() {
        let expr = parse_expression("2x^2 + 5x + 3").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert_eq!(solution.answer, "(x + 1)(2x + 3)");
    }

    #[test]
    fn test_factor_irreducible() {
        let expr = parse_expression("x^2 + x + 1").unwrap();
        let solution = solver().factor(&expr).unwrap();
        assert!(solution.answer.contains("cannot be factored"));
    }

    #[test]
    fn test_factor_rejects_constants() {
        let expr = parse_expression("42").unwrap();
        let err = solver().factor(&expr).unwrap_err();
        assert!(err.is_user_error());
    }
}
