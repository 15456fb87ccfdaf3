//! Dense single-variable polynomials over `f64` coefficients.
//!
//! The algebra solver lowers parsed expressions into this form to collect
//! like terms, solve linear and quadratic equations, and factor. The
//! calculus solver reuses it for rational-function limits.

use crate::error::{Error, Result};
use crate::parse::{format_number, Expr};

/// Largest exponent `from_expr` will multiply out.
const MAX_EXPAND_POW: i64 = 12;

/// A polynomial in one variable, stored densely with `coeffs[i]` the
/// coefficient of degree `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    coeffs: Vec<f64>,
    var: String,
}

impl Poly {
    /// The zero polynomial.
    #[must_use]
    pub fn zero(var: &str) -> Self {
        Self {
            coeffs: vec![0.0],
            var: var.to_string(),
        }
    }

    /// A constant polynomial.
    #[must_use]
    pub fn constant(var: &str, value: f64) -> Self {
        Self {
            coeffs: vec![value],
            var: var.to_string(),
        }
    }

    /// The monomial `c * var^degree`.
    #[must_use]
    pub fn monomial(var: &str, coeff: f64, degree: usize) -> Self {
        let mut coeffs = vec![0.0; degree + 1];
        coeffs[degree] = coeff;
        let mut poly = Self {
            coeffs,
            var: var.to_string(),
        };
        poly.trim();
        poly
    }

    /// Lower an expression into polynomial form.
    ///
    /// Constant subtrees are folded numerically, products and integer
    /// powers are multiplied out, and division by a nonzero constant is
    /// folded into the coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProblem`] when the expression is not a
    /// polynomial in `var` (other variables, `var` in a denominator or
    /// exponent, function calls of `var`), and [`Error::MathDomain`] for
    /// division by zero or non-finite constants.
    pub fn from_expr(expr: &Expr, var: &str) -> Result<Self> {
        if expr.is_constant() {
            let value = expr.eval(&[])?;
            return Ok(Self::constant(var, value));
        }
        match expr {
            Expr::Variable(name) if name == var => Ok(Self::monomial(var, 1.0, 1)),
            Expr::Variable(name) => Err(Error::unsupported(format!(
                "expected a polynomial in {var}, but found the variable {name}"
            ))),
            Expr::Neg(inner) => Ok(Self::from_expr(inner, var)?.neg()),
            Expr::Add(lhs, rhs) => {
                Ok(Self::from_expr(lhs, var)?.add(&Self::from_expr(rhs, var)?))
            }
            Expr::Sub(lhs, rhs) => {
                Ok(Self::from_expr(lhs, var)?.sub(&Self::from_expr(rhs, var)?))
            }
            Expr::Mul(lhs, rhs) => {
                Ok(Self::from_expr(lhs, var)?.mul(&Self::from_expr(rhs, var)?))
            }
            Expr::Div(lhs, rhs) => {
                if rhs.contains_var(var) {
                    return Err(Error::unsupported(format!(
                        "{var} appears in a denominator, which is not polynomial"
                    )));
                }
                let divisor = rhs.eval(&[])?;
                if divisor == 0.0 {
                    return Err(Error::math_domain("division by zero"));
                }
                Ok(Self::from_expr(lhs, var)?.scale(1.0 / divisor))
            }
            Expr::Pow(base, exp) => {
                if exp.contains_var(var) {
                    return Err(Error::unsupported(format!(
                        "{var} appears in an exponent, which is not polynomial"
                    )));
                }
                let power = exp.eval(&[])?;
                if power.fract() != 0.0 || power < 0.0 {
                    return Err(Error::unsupported(
                        "polynomial exponents must be non-negative integers",
                    ));
                }
                #[allow(clippy::cast_possible_truncation)]
                let power = power as i64;
                if power > MAX_EXPAND_POW {
                    return Err(Error::unsupported(format!(
                        "exponent {power} is too large to expand"
                    )));
                }
                let base = Self::from_expr(base, var)?;
                let mut result = Self::constant(var, 1.0);
                for _ in 0..power {
                    result = result.mul(&base);
                }
                Ok(result)
            }
            Expr::Call(func, arg) => Err(Error::unsupported(format!(
                "{}({arg}) is not polynomial",
                func.name()
            ))),
            Expr::Factorial(inner) => Err(Error::unsupported(format!(
                "({inner})! is not polynomial"
            ))),
            Expr::Number(_) => unreachable!("numbers are constant"),
        }
    }

    /// The variable this polynomial is written in.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }

    /// Degree of the polynomial; the zero polynomial reports degree 0.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Coefficient of the given degree, zero beyond the stored length.
    #[must_use]
    pub fn coeff(&self, degree: usize) -> f64 {
        self.coeffs.get(degree).copied().unwrap_or(0.0)
    }

    /// Leading coefficient.
    #[must_use]
    pub fn leading(&self) -> f64 {
        self.coeffs[self.coeffs.len() - 1]
    }

    /// Whether every coefficient is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0.0)
    }

    /// Lowest degree with a nonzero coefficient; 0 for the zero polynomial.
    #[must_use]
    pub fn min_degree(&self) -> usize {
        self.coeffs
            .iter()
            .position(|c| *c != 0.0)
            .unwrap_or(0)
    }

    /// Evaluate at `x` by Horner's method.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut coeffs = vec![0.0; len];
        for (i, slot) in coeffs.iter_mut().enumerate() {
            *slot = self.coeff(i) + other.coeff(i);
        }
        let mut result = Self {
            coeffs,
            var: self.var.clone(),
        };
        result.trim();
        result
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    pub fn scale(&self, factor: f64) -> Self {
        let mut result = Self {
            coeffs: self.coeffs.iter().map(|c| c * factor).collect(),
            var: self.var.clone(),
        };
        result.trim();
        result
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        let mut result = Self {
            coeffs,
            var: self.var.clone(),
        };
        result.trim();
        result
    }

    /// Divide by `(var - root)` by synthetic division, discarding the
    /// remainder. Callers check that `root` actually is a root first.
    #[must_use]
    pub fn deflate(&self, root: f64) -> Self {
        let n = self.degree();
        if n == 0 {
            return Self::zero(&self.var);
        }
        let mut quotient = vec![0.0; n];
        let mut carry = 0.0;
        for i in (1..=n).rev() {
            carry = self.coeffs[i] + root * carry;
            quotient[i - 1] = carry;
        }
        let mut result = Self {
            coeffs: quotient,
            var: self.var.clone(),
        };
        result.trim();
        result
    }

    /// All coefficients as integers, when they are integral.
    #[must_use]
    pub fn integer_coeffs(&self) -> Option<Vec<i64>> {
        self.coeffs
            .iter()
            .map(|c| {
                if c.fract() == 0.0 && c.abs() < 9e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    Some(*c as i64)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Positive gcd of the integer coefficients, ignoring zeros.
    /// `None` when coefficients are not integral or the polynomial is zero.
    #[must_use]
    pub fn content(&self) -> Option<i64> {
        let ints = self.integer_coeffs()?;
        let mut g = 0;
        for c in ints {
            g = gcd(g, c.abs());
        }
        if g == 0 {
            None
        } else {
            Some(g)
        }
    }

    /// Render back into an expression tree, highest degree first.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        if self.is_zero() {
            return Expr::number(0.0);
        }
        let mut acc: Option<Expr> = None;
        for degree in (0..=self.degree()).rev() {
            let c = self.coeff(degree);
            if c == 0.0 {
                continue;
            }
            let magnitude = self.term_expr(c.abs(), degree);
            acc = Some(match acc {
                None => {
                    if c < 0.0 {
                        if degree == 0 {
                            Expr::number(c)
                        } else {
                            Expr::neg(magnitude)
                        }
                    } else {
                        magnitude
                    }
                }
                Some(lhs) => {
                    if c < 0.0 {
                        Expr::sub(lhs, magnitude)
                    } else {
                        Expr::add(lhs, magnitude)
                    }
                }
            });
        }
        acc.unwrap_or_else(|| Expr::number(0.0))
    }

    fn term_expr(&self, coeff: f64, degree: usize) -> Expr {
        let power = match degree {
            0 => return Expr::number(coeff),
            1 => Expr::variable(&self.var),
            #[allow(clippy::cast_precision_loss)]
            n => Expr::pow(Expr::variable(&self.var), Expr::number(n as f64)),
        };
        if (coeff - 1.0).abs() < f64::EPSILON {
            power
        } else {
            Expr::mul(Expr::number(coeff), power)
        }
    }

    fn trim(&mut self) {
        while self.coeffs.len() > 1 && self.coeffs[self.coeffs.len() - 1] == 0.0 {
            self.coeffs.pop();
        }
    }
}

impl std::fmt::Display for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_expr())
    }
}

/// Greatest common divisor of two non-negative integers.
pub fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Render `numerator / denominator` as a reduced fraction, or a plain
/// integer when the division is exact.
#[must_use]
pub fn fraction_text(numerator: f64, denominator: f64) -> String {
    if numerator.fract() == 0.0
        && denominator.fract() == 0.0
        && denominator != 0.0
        && numerator.abs() < 9e15
        && denominator.abs() < 9e15
    {
        #[allow(clippy::cast_possible_truncation)]
        let (mut n, mut d) = (numerator as i64, denominator as i64);
        if d < 0 {
            n = -n;
            d = -d;
        }
        let g = gcd(n.abs(), d).max(1);
        n /= g;
        d /= g;
        if d == 1 {
            return n.to_string();
        }
        return format!("{n}/{d}");
    }
    format_number(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expression;

    fn poly(text: &str) -> Poly {
        let expr = parse_expression(text).unwrap();
        Poly::from_expr(&expr, "x").unwrap()
    }

    #[test]
    fn test_from_expr_collects_like_terms() {
        let p = poly("2x + 3x - 1");
        assert_eq!(p.degree(), 1);
        assert_eq!(p.coeff(1), 5.0);
        assert_eq!(p.coeff(0), -1.0);
    }

    #[test]
    fn test_from_expr_expands_product() {
        let p = poly("(x + 1)(x - 2)");
        assert_eq!(p.coeff(2), 1.0);
        assert_eq!(p.coeff(1), -1.0);
        assert_eq!(p.coeff(0), -2.0);
    }

    #[test]
    fn test_from_expr_expands_power() {
        let p = poly("(x + 1)^2");
        assert_eq!(p.coeff(2), 1.0);
        assert_eq!(p.coeff(1), 2.0);
        assert_eq!(p.coeff(0), 1.0);
    }

    #[test]
    fn test_from_expr_folds_constants() {
        let p = poly("sqrt(4) x + 2^3");
        assert_eq!(p.coeff(1), 2.0);
        assert_eq!(p.coeff(0), 8.0);
    }

    #[test]
    fn test_from_expr_divides_by_constant() {
        let p = poly("(4x + 2)/2");
        assert_eq!(p.coeff(1), 2.0);
        assert_eq!(p.coeff(0), 1.0);
    }

    #[test]
    fn test_from_expr_rejects_other_variable() {
        let expr = parse_expression("x + y").unwrap();
        let err = Poly::from_expr(&expr, "x").unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_from_expr_rejects_var_in_denominator() {
        let expr = parse_expression("1/x").unwrap();
        assert!(Poly::from_expr(&expr, "x").is_err());
    }

    #[test]
    fn test_from_expr_rejects_var_in_exponent() {
        let expr = parse_expression("2^x").unwrap();
        assert!(Poly::from_expr(&expr, "x").is_err());
    }

    #[test]
    fn test_from_expr_rejects_function_of_var() {
        let expr = parse_expression("sin(x)").unwrap();
        assert!(Poly::from_expr(&expr, "x").is_err());
    }

    #[test]
    fn test_degree_and_leading() {
        let p = poly("3x^2 - x + 4");
        assert_eq!(p.degree(), 2);
        assert_eq!(p.leading(), 3.0);
    }

    #[test]
    fn test_zero_cancellation() {
        let p = poly("x^2 - x^2 + 1");
        assert_eq!(p.degree(), 0);
        assert_eq!(p.coeff(0), 1.0);
    }

    #[test]
    fn test_eval_horner() {
        let p = poly("x^2 - 3x + 2");
        assert_eq!(p.eval(1.0), 0.0);
        assert_eq!(p.eval(2.0), 0.0);
        assert_eq!(p.eval(3.0), 2.0);
    }

    #[test]
    fn test_deflate_removes_root() {
        let p = poly("x^2 - 4");
        let q = p.deflate(2.0);
        assert_eq!(q.degree(), 1);
        assert_eq!(q.coeff(1), 1.0);
        assert_eq!(q.coeff(0), 2.0);
    }

    #[test]
    fn test_min_degree() {
        assert_eq!(poly("x^3 - x^2").min_degree(), 2);
        assert_eq!(poly("x + 1").min_degree(), 0);
    }

    #[test]
    fn test_content() {
        assert_eq!(poly("2x^2 + 4x + 6").content(), Some(2));
        assert_eq!(poly("x + 1").content(), Some(1));
        assert_eq!(poly("0.5x").content(), None);
    }

    #[test]
    fn test_to_expr_display() {
        assert_eq!(poly("x^2 + 2x + 1").to_string(), "x^2 + 2x + 1");
        assert_eq!(poly("2x - 3x + 1").to_string(), "-x + 1");
        assert_eq!(poly("-x^2 + 3").to_string(), "-x^2 + 3");
        assert_eq!(poly("x^2 - x - 2").to_string(), "x^2 - x - 2");
        assert_eq!(poly("0").to_string(), "0");
    }

    #[test]
    fn test_fraction_text() {
        assert_eq!(fraction_text(8.0, 2.0), "4");
        assert_eq!(fraction_text(8.0, 3.0), "8/3");
        assert_eq!(fraction_text(-6.0, 4.0), "-3/2");
        assert_eq!(fraction_text(6.0, -4.0), "-3/2");
        assert_eq!(fraction_text(1.5, 2.0), "0.75");
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(7, 0), 7);
    }
}
