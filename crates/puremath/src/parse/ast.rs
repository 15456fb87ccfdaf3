//! Expression AST for parsed math statements.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// A named function the expression language knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Inverse sine.
    Asin,
    /// Inverse cosine.
    Acos,
    /// Inverse tangent.
    Atan,
    /// Natural logarithm.
    Ln,
    /// Base-10 logarithm.
    Log,
    /// Natural exponential.
    Exp,
    /// Square root.
    Sqrt,
    /// Absolute value.
    Abs,
}

impl Func {
    /// The function's name as written in expressions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Ln => "ln",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
        }
    }

    /// Look a function up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "asin" | "arcsin" => Some(Self::Asin),
            "acos" | "arccos" => Some(Self::Acos),
            "atan" | "arctan" => Some(Self::Atan),
            "ln" => Some(Self::Ln),
            "log" => Some(Self::Log),
            "exp" => Some(Self::Exp),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    /// Evaluate the function at `x`, checking its domain.
    ///
    /// # Errors
    ///
    /// Returns a math domain error when `x` lies outside the function's
    /// domain, e.g. `sqrt` of a negative number or `ln` of zero.
    pub fn eval(&self, x: f64) -> Result<f64> {
        let value = match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(Error::math_domain(format!(
                        "asin is undefined for {} (requires -1 to 1)",
                        format_number(x)
                    )));
                }
                x.asin()
            }
            Self::Acos => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(Error::math_domain(format!(
                        "acos is undefined for {} (requires -1 to 1)",
                        format_number(x)
                    )));
                }
                x.acos()
            }
            Self::Atan => x.atan(),
            Self::Ln => {
                if x <= 0.0 {
                    return Err(Error::math_domain(format!(
                        "ln is undefined for {} (requires a positive argument)",
                        format_number(x)
                    )));
                }
                x.ln()
            }
            Self::Log => {
                if x <= 0.0 {
                    return Err(Error::math_domain(format!(
                        "log is undefined for {} (requires a positive argument)",
                        format_number(x)
                    )));
                }
                x.log10()
            }
            Self::Exp => {
                let value = x.exp();
                if value.is_infinite() {
                    return Err(Error::math_domain("result is too large to represent"));
                }
                value
            }
            Self::Sqrt => {
                if x < 0.0 {
                    return Err(Error::math_domain("square root of a negative number"));
                }
                x.sqrt()
            }
            Self::Abs => x.abs(),
        };
        Ok(value)
    }
}

/// A parsed math expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),
    /// A variable (or the constants `pi` and `e`).
    Variable(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// Addition.
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction.
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication.
    Mul(Box<Expr>, Box<Expr>),
    /// Division.
    Div(Box<Expr>, Box<Expr>),
    /// Exponentiation.
    Pow(Box<Expr>, Box<Expr>),
    /// A function applied to an argument.
    Call(Func, Box<Expr>),
    /// Factorial.
    Factorial(Box<Expr>),
}

/// Names that denote constants rather than unknowns.
#[must_use]
pub fn is_constant_name(name: &str) -> bool {
    matches!(name, "pi" | "e" | "inf")
}

impl Expr {
    /// A numeric literal.
    #[must_use]
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// A variable reference.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// `lhs + rhs`
    #[must_use]
    pub fn add(lhs: Self, rhs: Self) -> Self {
        Self::Add(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs - rhs`
    #[must_use]
    pub fn sub(lhs: Self, rhs: Self) -> Self {
        Self::Sub(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs * rhs`
    #[must_use]
    pub fn mul(lhs: Self, rhs: Self) -> Self {
        Self::Mul(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs / rhs`
    #[must_use]
    pub fn div(lhs: Self, rhs: Self) -> Self {
        Self::Div(Box::new(lhs), Box::new(rhs))
    }

    /// `base ^ exp`
    #[must_use]
    pub fn pow(base: Self, exp: Self) -> Self {
        Self::Pow(Box::new(base), Box::new(exp))
    }

    /// `-inner`
    #[must_use]
    pub fn neg(inner: Self) -> Self {
        Self::Neg(Box::new(inner))
    }

    /// `func(arg)`
    #[must_use]
    pub fn call(func: Func, arg: Self) -> Self {
        Self::Call(func, Box::new(arg))
    }

    /// `inner!`
    #[must_use]
    pub fn factorial(inner: Self) -> Self {
        Self::Factorial(Box::new(inner))
    }

    /// Collect the free variables of the expression, excluding the
    /// constants `pi`, `e`, and `inf`.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_variables(&mut set);
        set
    }

    fn collect_variables(&self, set: &mut BTreeSet<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => {
                if !is_constant_name(name) {
                    set.insert(name.clone());
                }
            }
            Self::Neg(a) | Self::Call(_, a) | Self::Factorial(a) => a.collect_variables(set),
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b)
            | Self::Pow(a, b) => {
                a.collect_variables(set);
                b.collect_variables(set);
            }
        }
    }

    /// Check whether the expression mentions the given variable.
    #[must_use]
    pub fn contains_var(&self, name: &str) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Variable(v) => v == name,
            Self::Neg(a) | Self::Call(_, a) | Self::Factorial(a) => a.contains_var(name),
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b)
            | Self::Pow(a, b) => a.contains_var(name) || b.contains_var(name),
        }
    }

    /// Check whether the expression is free of variables.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.variables().is_empty()
    }

    /// Evaluate the expression numerically.
    ///
    /// `bindings` supplies values for variables; `pi` and `e` resolve to
    /// their mathematical values automatically.
    ///
    /// # Errors
    ///
    /// Returns a math domain error for division by zero, function domain
    /// violations, invalid factorials, unbound variables, and results too
    /// large for an `f64`.
    pub fn eval(&self, bindings: &[(&str, f64)]) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Variable(name) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                "inf" => Err(Error::math_domain("cannot evaluate infinity")),
                _ => bindings
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| {
                        Error::math_domain(format!("variable '{name}' has no value"))
                    }),
            },
            Self::Neg(inner) => Ok(-inner.eval(bindings)?),
            Self::Add(a, b) => Ok(a.eval(bindings)? + b.eval(bindings)?),
            Self::Sub(a, b) => Ok(a.eval(bindings)? - b.eval(bindings)?),
            Self::Mul(a, b) => Ok(a.eval(bindings)? * b.eval(bindings)?),
            Self::Div(a, b) => {
                let denominator = b.eval(bindings)?;
                if denominator == 0.0 {
                    return Err(Error::math_domain("division by zero"));
                }
                Ok(a.eval(bindings)? / denominator)
            }
            Self::Pow(a, b) => {
                let base = a.eval(bindings)?;
                let exponent = b.eval(bindings)?;
                if base == 0.0 && exponent < 0.0 {
                    return Err(Error::math_domain(
                        "zero cannot be raised to a negative power",
                    ));
                }
                let value = base.powf(exponent);
                if value.is_nan() {
                    return Err(Error::math_domain(format!(
                        "{} cannot be raised to the power {}",
                        format_number(base),
                        format_number(exponent)
                    )));
                }
                if value.is_infinite() {
                    return Err(Error::math_domain("result is too large to represent"));
                }
                Ok(value)
            }
            Self::Call(func, arg) => func.eval(arg.eval(bindings)?),
            Self::Factorial(inner) => factorial(inner.eval(bindings)?),
        }
    }

    /// Effective precedence for parenthesization.
    fn precedence(&self) -> u8 {
        match self {
            Self::Add(..) | Self::Sub(..) => 1,
            Self::Number(n) if *n < 0.0 => 2,
            Self::Mul(..) | Self::Div(..) | Self::Neg(..) => 2,
            Self::Pow(..) => 4,
            Self::Factorial(..) => 5,
            Self::Number(_) | Self::Variable(_) | Self::Call(..) => 6,
        }
    }

    /// Render with minimal parentheses given the surrounding precedence.
    fn fmt_prec(&self, f: &mut std::fmt::Formatter<'_>, prec: u8) -> std::fmt::Result {
        let wrap = self.precedence() < prec;
        if wrap {
            write!(f, "(")?;
        }
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n))?,
            Self::Variable(name) => write!(f, "{name}")?,
            Self::Neg(inner) => {
                write!(f, "-")?;
                inner.fmt_prec(f, 2)?;
            }
            Self::Add(lhs, rhs) => {
                lhs.fmt_prec(f, 1)?;
                // "a + -b" reads better as "a - b"
                if let Self::Neg(inner) = &**rhs {
                    write!(f, " - ")?;
                    inner.fmt_prec(f, 2)?;
                } else {
                    write!(f, " + ")?;
                    rhs.fmt_prec(f, 1)?;
                }
            }
            Self::Sub(lhs, rhs) => {
                lhs.fmt_prec(f, 1)?;
                write!(f, " - ")?;
                rhs.fmt_prec(f, 2)?;
            }
            Self::Mul(lhs, rhs) => {
                lhs.fmt_prec(f, 2)?;
                // Numbers juxtapose with what follows: "2x", "3(x + 1)"
                if !(matches!(**lhs, Self::Number(_)) && !leading_digit(rhs)) {
                    write!(f, " * ")?;
                }
                rhs.fmt_prec(f, 3)?;
            }
            Self::Div(lhs, rhs) => {
                lhs.fmt_prec(f, 2)?;
                write!(f, "/")?;
                rhs.fmt_prec(f, 3)?;
            }
            Self::Pow(base, exp) => {
                base.fmt_prec(f, 5)?;
                write!(f, "^")?;
                exp.fmt_prec(f, 4)?;
            }
            Self::Call(func, arg) => {
                write!(f, "{}(", func.name())?;
                arg.fmt_prec(f, 0)?;
                write!(f, ")")?;
            }
            Self::Factorial(inner) => {
                inner.fmt_prec(f, 6)?;
                write!(f, "!")?;
            }
        }
        if wrap {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_prec(f, 0)
    }
}

/// Whether the rendering of `expr` (in multiplicand position) would start
/// with a digit or a sign, which forbids juxtaposition after a number.
fn leading_digit(expr: &Expr) -> bool {
    match expr {
        Expr::Number(_) | Expr::Neg(_) => true,
        Expr::Pow(base, _) => leading_digit(base),
        Expr::Factorial(inner) => leading_digit(inner),
        _ => false,
    }
}

/// Factorial of a non-negative integer value.
fn factorial(value: f64) -> Result<f64> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(Error::math_domain(
            "factorial is only defined for non-negative integers",
        ));
    }
    if value > 170.0 {
        return Err(Error::math_domain(format!(
            "factorial of {} is too large to represent",
            format_number(value)
        )));
    }
    let mut result = 1.0;
    let mut k = 2.0;
    while k <= value {
        result *= k;
        k += 1.0;
    }
    Ok(result)
}

/// Format a number without a trailing `.0` on integral values.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Normalizes -0
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// An equation: two expressions joined by `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Left-hand side.
    pub lhs: Expr,
    /// Right-hand side.
    pub rhs: Expr,
}

impl Equation {
    /// Create an equation.
    #[must_use]
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// Free variables of both sides.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut set = self.lhs.variables();
        set.extend(self.rhs.variables());
        set
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// A parsed statement: either a bare expression or an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A bare expression.
    Expression(Expr),
    /// An equation.
    Equation(Equation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_func_name_round_trip() {
        for func in [
            Func::Sin,
            Func::Cos,
            Func::Tan,
            Func::Asin,
            Func::Acos,
            Func::Atan,
            Func::Ln,
            Func::Log,
            Func::Exp,
            Func::Sqrt,
            Func::Abs,
        ] {
            assert_eq!(Func::from_name(func.name()), Some(func));
        }
    }

    #[test]
    fn test_func_arc_aliases() {
        assert_eq!(Func::from_name("arcsin"), Some(Func::Asin));
        assert_eq!(Func::from_name("arctan"), Some(Func::Atan));
    }

    #[test]
    fn test_func_eval_domains() {
        assert!(Func::Sqrt.eval(-1.0).is_err());
        assert!(Func::Ln.eval(0.0).is_err());
        assert!(Func::Asin.eval(2.0).is_err());
        assert_eq!(Func::Sqrt.eval(16.0).unwrap(), 4.0);
        assert!((Func::Ln.eval(std::f64::consts::E).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_precedence() {
        let e = Expr::mul(
            Expr::number(3.0),
            Expr::add(Expr::variable("x"), Expr::number(1.0)),
        );
        assert_eq!(e.to_string(), "3(x + 1)");

        let e = Expr::add(
            Expr::mul(Expr::number(2.0), Expr::variable("x")),
            Expr::number(5.0),
        );
        assert_eq!(e.to_string(), "2x + 5");
    }

    #[test]
    fn test_display_subtraction_associativity() {
        let e = Expr::sub(
            Expr::sub(Expr::variable("a"), Expr::variable("b")),
            Expr::variable("c"),
        );
        assert_eq!(e.to_string(), "a - b - c");

        let e = Expr::sub(
            Expr::variable("a"),
            Expr::sub(Expr::variable("b"), Expr::variable("c")),
        );
        assert_eq!(e.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_display_powers() {
        let e = Expr::pow(Expr::variable("x"), Expr::number(2.0));
        assert_eq!(e.to_string(), "x^2");

        let e = Expr::pow(
            Expr::add(Expr::variable("x"), Expr::number(1.0)),
            Expr::number(2.0),
        );
        assert_eq!(e.to_string(), "(x + 1)^2");

        let e = Expr::pow(Expr::variable("x"), Expr::neg(Expr::number(1.0)));
        assert_eq!(e.to_string(), "x^(-1)");

        let e = Expr::pow(Expr::neg(Expr::variable("x")), Expr::number(2.0));
        assert_eq!(e.to_string(), "(-x)^2");
    }

    #[test]
    fn test_display_negative_number_base() {
        let e = Expr::pow(Expr::number(-2.0), Expr::number(2.0));
        assert_eq!(e.to_string(), "(-2)^2");
    }

    #[test]
    fn test_display_division() {
        let e = Expr::div(
            Expr::number(1.0),
            Expr::mul(Expr::number(2.0), Expr::variable("x")),
        );
        assert_eq!(e.to_string(), "1/(2x)");
    }

    #[test]
    fn test_display_add_neg_as_subtraction() {
        let e = Expr::add(Expr::variable("x"), Expr::neg(Expr::number(3.0)));
        assert_eq!(e.to_string(), "x - 3");
    }

    #[test]
    fn test_display_no_juxtaposition_between_numbers() {
        let e = Expr::mul(Expr::number(2.0), Expr::number(3.0));
        assert_eq!(e.to_string(), "2 * 3");
    }

    #[test]
    fn test_display_call_and_factorial() {
        let e = Expr::call(Func::Sin, Expr::variable("x"));
        assert_eq!(e.to_string(), "sin(x)");

        let e = Expr::factorial(Expr::number(5.0));
        assert_eq!(e.to_string(), "5!");

        let e = Expr::factorial(Expr::add(Expr::variable("n"), Expr::number(1.0)));
        assert_eq!(e.to_string(), "(n + 1)!");
    }

    #[test]
    fn test_eval_arithmetic() {
        let e = Expr::add(
            Expr::number(2.0),
            Expr::mul(Expr::number(3.0), Expr::number(4.0)),
        );
        assert_eq!(e.eval(&[]).unwrap(), 14.0);
    }

    #[test]
    fn test_eval_division_by_zero() {
        let e = Expr::div(Expr::number(1.0), Expr::number(0.0));
        let err = e.eval(&[]).unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn test_eval_with_bindings() {
        let e = Expr::pow(Expr::variable("x"), Expr::number(2.0));
        assert_eq!(e.eval(&[("x", 3.0)]).unwrap(), 9.0);
    }

    #[test]
    fn test_eval_unbound_variable() {
        let e = Expr::variable("y");
        assert!(e.eval(&[("x", 1.0)]).is_err());
    }

    #[test]
    fn test_eval_constants() {
        let e = Expr::variable("pi");
        assert!((e.eval(&[]).unwrap() - std::f64::consts::PI).abs() < 1e-12);

        let e = Expr::variable("e");
        assert!((e.eval(&[]).unwrap() - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_eval_factorial() {
        let e = Expr::factorial(Expr::number(5.0));
        assert_eq!(e.eval(&[]).unwrap(), 120.0);

        let e = Expr::factorial(Expr::number(0.0));
        assert_eq!(e.eval(&[]).unwrap(), 1.0);

        let e = Expr::factorial(Expr::number(2.5));
        assert!(e.eval(&[]).is_err());

        let e = Expr::factorial(Expr::number(171.0));
        assert!(e.eval(&[]).is_err());
    }

    #[test]
    fn test_eval_zero_to_negative_power() {
        let e = Expr::pow(Expr::number(0.0), Expr::number(-1.0));
        assert!(e.eval(&[]).is_err());
    }

    #[test]
    fn test_eval_negative_base_fractional_exponent() {
        let e = Expr::pow(Expr::number(-8.0), Expr::number(0.5));
        assert!(e.eval(&[]).is_err());
    }

    #[test]
    fn test_variables_excludes_constants() {
        let e = Expr::mul(
            Expr::mul(Expr::number(2.0), Expr::variable("pi")),
            Expr::variable("r"),
        );
        let vars = e.variables();
        assert_eq!(vars.len(), 1);
        assert!(vars.contains("r"));
    }

    #[test]
    fn test_contains_var() {
        let e = Expr::add(Expr::variable("x"), Expr::number(1.0));
        assert!(e.contains_var("x"));
        assert!(!e.contains_var("y"));
    }

    #[test]
    fn test_is_constant() {
        assert!(Expr::number(3.0).is_constant());
        assert!(Expr::variable("pi").is_constant());
        assert!(!Expr::variable("x").is_constant());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_equation_display() {
        let eq = Equation::new(
            Expr::add(
                Expr::mul(Expr::number(2.0), Expr::variable("x")),
                Expr::number(5.0),
            ),
            Expr::number(13.0),
        );
        assert_eq!(eq.to_string(), "2x + 5 = 13");
    }

    #[test]
    fn test_equation_variables() {
        let eq = Equation::new(Expr::variable("x"), Expr::variable("y"));
        assert_eq!(eq.variables().len(), 2);
    }
}
