//! Symbolic differentiation, table integration, and limits.
//!
//! Derivatives walk the expression tree with the usual rules and record
//! which ones fired so the narration can name them. Integrals work
//! term by term against a small table. Limits try direct substitution
//! first, then the standard indeterminate forms.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::explain::Tracer;
use crate::parse::{format_number, Expr, Func};
use crate::problem::{Category, Solution};

use super::engine::{approx_text, round_to, CategorySolver};
use super::intent::{LimitTarget, Task};
use super::polynomial::{fraction_text, Poly};

/// Solver for derivatives, antiderivatives, and limits.
#[derive(Debug)]
pub struct CalculusSolver {
    decimals: u8,
}

impl CalculusSolver {
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    fn differentiate(&self, expr: &Expr, var: &str) -> Result<Solution> {
        let mut rules = BTreeSet::new();
        let raw = derive(expr, var, &mut rules)?;
        let simplified = simplify_expr(&raw);

        let mut tracer = Tracer::new();
        let head = format!("d/d{var} ({expr})");
        tracer.show(format!("Differentiate with respect to {var}"), head.clone());
        let raw_text = raw.to_string();
        if rules.is_empty() {
            // No rule fired: either a constant or the bare variable.
            let title = if raw_text == "0" {
                "The expression does not depend on the variable"
            } else {
                "The derivative of the variable itself is 1"
            };
            tracer.rewrite(title, head, raw_text.clone());
        } else {
            tracer.rewrite(
                format!("Apply {}", rule_list(&rules)),
                head,
                raw_text.clone(),
            );
        }
        let result = simplified.to_string();
        if result != raw_text {
            tracer.rewrite("Simplify", raw_text, result.clone());
        }
        Ok(tracer.finish(result, Category::Calculus))
    }

    fn integrate(&self, expr: &Expr, var: &str) -> Result<Solution> {
        let mut terms = Vec::new();
        split_terms(expr, 1.0, &mut terms);

        let mut tracer = Tracer::new();
        tracer.show(
            format!("Integrate with respect to {var}"),
            format!("∫ {expr} d{var}"),
        );
        if terms.len() > 1 {
            tracer.note("Integrate term by term");
        }

        let mut assembled: Option<Expr> = None;
        for (sign, term) in &terms {
            let (anti, rule) = integrate_term(term, var)?;
            let anti = simplify_expr(&anti);
            tracer.rewrite(
                format!("Apply the {rule}"),
                format!("∫ {term} d{var}"),
                anti.to_string(),
            );
            assembled = Some(match assembled {
                None => {
                    if *sign < 0.0 {
                        Expr::neg(anti)
                    } else {
                        anti
                    }
                }
                Some(acc) => {
                    if *sign < 0.0 {
                        Expr::sub(acc, anti)
                    } else {
                        Expr::add(acc, anti)
                    }
                }
            });
        }
        let result = simplify_expr(&assembled.unwrap_or_else(|| Expr::number(0.0)));
        let answer = format!("{result} + C");
        tracer.show("Add the constant of integration", answer.clone());
        Ok(tracer.finish(answer, Category::Calculus))
    }

    fn limit(&self, expr: &Expr, var: &str, target: &LimitTarget) -> Result<Solution> {
        match target {
            LimitTarget::Value(a) => self.limit_at_value(expr, var, *a),
            LimitTarget::PosInfinity => self.limit_at_infinity(expr, var, false),
            LimitTarget::NegInfinity => self.limit_at_infinity(expr, var, true),
        }
    }

    fn limit_at_value(&self, expr: &Expr, var: &str, a: f64) -> Result<Solution> {
        let mut tracer = Tracer::new();
        let head = format!("lim {expr} as {var} -> {}", format_number(a));
        tracer.show(
            format!("Evaluate the limit as {var} approaches {}", format_number(a)),
            head.clone(),
        );

        if let Ok(v) = expr.eval(&[(var, a)]) {
            if v.is_finite() {
                tracer.rewrite(
                    format!("Substitute {var} = {}", format_number(a)),
                    head,
                    format_number(round_to(v, self.decimals)),
                );
                return Ok(tracer.finish(approx_text(v, self.decimals), Category::Calculus));
            }
        }
        tracer.note(format!(
            "Substituting {var} = {} gives an indeterminate form",
            format_number(a)
        ));

        if let Expr::Div(num, den) = expr {
            if let Some((name, value)) = standard_zero_limit(num, den) {
                tracer.rewrite(
                    format!("Recognize the standard limit {name}"),
                    head,
                    format_number(value),
                );
                return Ok(tracer.finish(format_number(value), Category::Calculus));
            }
            if let (Ok(pn), Ok(pd)) = (Poly::from_expr(num, var), Poly::from_expr(den, var)) {
                return self.rational_limit(tracer, head, &pn, &pd, var, a);
            }
        }
        Err(Error::unsupported(
            "this limit is not supported; try a rational function or a standard form like sin(x)/x",
        ))
    }

    fn rational_limit(
        &self,
        mut tracer: Tracer,
        head: String,
        pn: &Poly,
        pd: &Poly,
        var: &str,
        a: f64,
    ) -> Result<Solution> {
        let (n0, d0) = (pn.eval(a), pd.eval(a));
        if near_zero(d0) && !near_zero(n0) {
            tracer.note("The denominator vanishes but the numerator does not");
            return Ok(tracer.finish(
                format!(
                    "the limit does not exist; the expression is unbounded near {var} = {}",
                    format_number(a)
                ),
                Category::Calculus,
            ));
        }

        let mut qn = pn.clone();
        let mut qd = pd.clone();
        let mut cancelled = 0;
        while cancelled < 4 && near_zero(qn.eval(a)) && near_zero(qd.eval(a)) {
            qn = qn.deflate(a);
            qd = qd.deflate(a);
            cancelled += 1;
        }
        if cancelled == 0 {
            return Err(Error::unsupported(
                "this limit is not supported; try a rational function or a standard form like sin(x)/x",
            ));
        }

        let ratio = ratio_text(&qn, &qd);
        tracer.rewrite(
            format!("Cancel the common factor ({var} - {})", format_number(a)),
            head,
            ratio.clone(),
        );
        let dv = qd.eval(a);
        if near_zero(dv) {
            tracer.note("The denominator still vanishes after cancelling");
            return Ok(tracer.finish("the limit does not exist", Category::Calculus));
        }
        let v = qn.eval(a) / dv;
        tracer.rewrite(
            format!("Substitute {var} = {}", format_number(a)),
            ratio,
            format_number(round_to(v, self.decimals)),
        );
        Ok(tracer.finish(approx_text(v, self.decimals), Category::Calculus))
    }

    fn limit_at_infinity(&self, expr: &Expr, var: &str, negative: bool) -> Result<Solution> {
        let target = if negative { "-inf" } else { "inf" };
        let mut tracer = Tracer::new();
        let head = format!("lim {expr} as {var} -> {target}");
        tracer.show(
            format!("Evaluate the limit as {var} grows without bound"),
            head.clone(),
        );

        if is_euler_form(expr, var) {
            tracer.rewrite(
                "Recognize the standard limit (1 + 1/n)^n -> e",
                head,
                "e".to_string(),
            );
            return Ok(tracer.finish("e", Category::Calculus));
        }
        if let Expr::Div(num, den) = expr {
            if matches!(**num, Expr::Call(Func::Sin | Func::Cos, _)) {
                if let Ok(pd) = Poly::from_expr(den, var) {
                    if pd.degree() >= 1 {
                        tracer.note(
                            "The numerator stays between -1 and 1 while the denominator grows",
                        );
                        tracer.rewrite("Squeeze the quotient to zero", head, "0".to_string());
                        return Ok(tracer.finish("0", Category::Calculus));
                    }
                }
            }
            if let (Ok(pn), Ok(pd)) = (Poly::from_expr(num, var), Poly::from_expr(den, var)) {
                return self.end_behavior(tracer, head, &pn, &pd, negative);
            }
        }
        if let Ok(poly) = Poly::from_expr(expr, var) {
            let one = Poly::constant(var, 1.0);
            return self.end_behavior(tracer, head, &poly, &one, negative);
        }
        Err(Error::unsupported(
            "limits at infinity are only supported for rational functions",
        ))
    }

    fn end_behavior(
        &self,
        mut tracer: Tracer,
        head: String,
        pn: &Poly,
        pd: &Poly,
        negative: bool,
    ) -> Result<Solution> {
        let (n_deg, d_deg) = (pn.degree(), pd.degree());
        if n_deg == 0 && d_deg == 0 {
            let v = pn.coeff(0) / pd.coeff(0);
            tracer.rewrite(
                "The expression does not depend on the variable",
                head,
                format_number(round_to(v, self.decimals)),
            );
            return Ok(tracer.finish(approx_text(v, self.decimals), Category::Calculus));
        }
        if n_deg < d_deg {
            tracer.note("The denominator grows faster than the numerator");
            tracer.rewrite("The quotient shrinks to zero", head, "0".to_string());
            return Ok(tracer.finish("0", Category::Calculus));
        }
        if n_deg == d_deg {
            tracer.note("Only the leading terms matter for large values");
            let frac = fraction_text(pn.leading(), pd.leading());
            tracer.rewrite("Divide the leading coefficients", head, frac.clone());
            let v = pn.leading() / pd.leading();
            let answer = if frac.contains('/') {
                format!("{frac} {}", approx_text(v, self.decimals))
            } else {
                frac
            };
            return Ok(tracer.finish(answer, Category::Calculus));
        }
        // Numerator dominates; the sign comes from the leading ratio and,
        // heading to -inf, the parity of the degree gap.
        let mut sign = pn.leading() / pd.leading();
        if negative && (n_deg - d_deg) % 2 == 1 {
            sign = -sign;
        }
        let answer = if sign > 0.0 { "inf" } else { "-inf" };
        tracer.note("The numerator grows faster than the denominator");
        tracer.rewrite("The quotient grows without bound", head, answer.to_string());
        Ok(tracer.finish(answer, Category::Calculus))
    }
}

impl CategorySolver for CalculusSolver {
    fn name(&self) -> &'static str {
        "calculus"
    }

    fn category(&self) -> Category {
        Category::Calculus
    }

    fn solve(&self, task: &Task) -> Result<Solution> {
        match task {
            Task::Differentiate { expr, var } => self.differentiate(expr, var),
            Task::Integrate { expr, var } => self.integrate(expr, var),
            Task::Limit { expr, var, target } => self.limit(expr, var, target),
            other => Err(Error::internal(format!(
                "calculus solver received {other:?}"
            ))),
        }
    }
}

/// Differentiate, recording the names of the rules that fired.
fn derive(expr: &Expr, var: &str, rules: &mut BTreeSet<&'static str>) -> Result<Expr> {
    match expr {
        Expr::Number(_) => Ok(Expr::number(0.0)),
        Expr::Variable(name) if name == var => Ok(Expr::number(1.0)),
        Expr::Variable(_) => Ok(Expr::number(0.0)),
        Expr::Neg(inner) => Ok(Expr::neg(derive(inner, var, rules)?)),
        Expr::Add(a, b) => {
            rules.insert("the sum rule");
            Ok(Expr::add(derive(a, var, rules)?, derive(b, var, rules)?))
        }
        Expr::Sub(a, b) => {
            rules.insert("the sum rule");
            Ok(Expr::sub(derive(a, var, rules)?, derive(b, var, rules)?))
        }
        Expr::Mul(a, b) => {
            if !a.contains_var(var) {
                rules.insert("the constant multiple rule");
                Ok(Expr::mul((**a).clone(), derive(b, var, rules)?))
            } else if !b.contains_var(var) {
                rules.insert("the constant multiple rule");
                Ok(Expr::mul((**b).clone(), derive(a, var, rules)?))
            } else {
                rules.insert("the product rule");
                let da = derive(a, var, rules)?;
                let db = derive(b, var, rules)?;
                Ok(Expr::add(
                    Expr::mul(da, (**b).clone()),
                    Expr::mul((**a).clone(), db),
                ))
            }
        }
        Expr::Div(a, b) => {
            if !b.contains_var(var) {
                rules.insert("the constant multiple rule");
                Ok(Expr::div(derive(a, var, rules)?, (**b).clone()))
            } else if !a.contains_var(var) {
                rules.insert("the quotient rule");
                let db = derive(b, var, rules)?;
                Ok(Expr::neg(Expr::div(
                    Expr::mul((**a).clone(), db),
                    Expr::pow((**b).clone(), Expr::number(2.0)),
                )))
            } else {
                rules.insert("the quotient rule");
                let da = derive(a, var, rules)?;
                let db = derive(b, var, rules)?;
                Ok(Expr::div(
                    Expr::sub(
                        Expr::mul(da, (**b).clone()),
                        Expr::mul((**a).clone(), db),
                    ),
                    Expr::pow((**b).clone(), Expr::number(2.0)),
                ))
            }
        }
        Expr::Pow(base, exp) => match (base.contains_var(var), exp.contains_var(var)) {
            (false, false) => Ok(Expr::number(0.0)),
            (true, false) => {
                rules.insert("the power rule");
                let new_exp = if let Expr::Number(k) = **exp {
                    Expr::number(k - 1.0)
                } else {
                    Expr::sub((**exp).clone(), Expr::number(1.0))
                };
                let outer = Expr::mul((**exp).clone(), Expr::pow((**base).clone(), new_exp));
                if matches!(&**base, Expr::Variable(v) if v == var) {
                    Ok(outer)
                } else {
                    rules.insert("the chain rule");
                    Ok(Expr::mul(outer, derive(base, var, rules)?))
                }
            }
            (false, true) => {
                rules.insert("the exponential rule");
                let mut out = expr.clone();
                if !matches!(&**base, Expr::Variable(v) if v == "e") {
                    out = Expr::mul(out, Expr::call(Func::Ln, (**base).clone()));
                }
                if !matches!(&**exp, Expr::Variable(v) if v == var) {
                    rules.insert("the chain rule");
                    out = Expr::mul(out, derive(exp, var, rules)?);
                }
                Ok(out)
            }
            (true, true) => Err(Error::unsupported(
                "powers with the variable in both the base and the exponent are not supported",
            )),
        },
        Expr::Call(func, arg) => {
            let outer = match func {
                Func::Sin => {
                    rules.insert("the trig rules");
                    Expr::call(Func::Cos, (**arg).clone())
                }
                Func::Cos => {
                    rules.insert("the trig rules");
                    Expr::neg(Expr::call(Func::Sin, (**arg).clone()))
                }
                Func::Tan => {
                    rules.insert("the trig rules");
                    Expr::div(
                        Expr::number(1.0),
                        Expr::pow(Expr::call(Func::Cos, (**arg).clone()), Expr::number(2.0)),
                    )
                }
                Func::Ln => {
                    rules.insert("the log rule");
                    Expr::div(Expr::number(1.0), (**arg).clone())
                }
                Func::Log => {
                    rules.insert("the log rule");
                    Expr::div(
                        Expr::number(1.0),
                        Expr::mul(
                            (**arg).clone(),
                            Expr::call(Func::Ln, Expr::number(10.0)),
                        ),
                    )
                }
                Func::Exp => {
                    rules.insert("the exponential rule");
                    Expr::call(Func::Exp, (**arg).clone())
                }
                Func::Sqrt => {
                    rules.insert("the power rule");
                    Expr::div(
                        Expr::number(1.0),
                        Expr::mul(Expr::number(2.0), Expr::call(Func::Sqrt, (**arg).clone())),
                    )
                }
                Func::Asin => {
                    rules.insert("the inverse trig rules");
                    Expr::div(
                        Expr::number(1.0),
                        Expr::call(
                            Func::Sqrt,
                            Expr::sub(
                                Expr::number(1.0),
                                Expr::pow((**arg).clone(), Expr::number(2.0)),
                            ),
                        ),
                    )
                }
                Func::Acos => {
                    rules.insert("the inverse trig rules");
                    Expr::neg(Expr::div(
                        Expr::number(1.0),
                        Expr::call(
                            Func::Sqrt,
                            Expr::sub(
                                Expr::number(1.0),
                                Expr::pow((**arg).clone(), Expr::number(2.0)),
                            ),
                        ),
                    ))
                }
                Func::Atan => {
                    rules.insert("the inverse trig rules");
                    Expr::div(
                        Expr::number(1.0),
                        Expr::add(
                            Expr::number(1.0),
                            Expr::pow((**arg).clone(), Expr::number(2.0)),
                        ),
                    )
                }
                Func::Abs => {
                    return Err(Error::unsupported(
                        "the derivative of abs is not supported",
                    ))
                }
            };
            if matches!(&**arg, Expr::Variable(v) if v == var) {
                Ok(outer)
            } else {
                rules.insert("the chain rule");
                Ok(Expr::mul(outer, derive(arg, var, rules)?))
            }
        }
        Expr::Factorial(_) => Err(Error::unsupported(
            "factorials cannot be differentiated",
        )),
    }
}

fn rule_list(rules: &BTreeSet<&'static str>) -> String {
    let items: Vec<&str> = rules.iter().copied().collect();
    match items.len() {
        0 => String::new(),
        1 => items[0].to_string(),
        2 => format!("{} and {}", items[0], items[1]),
        _ => {
            let head = items[..items.len() - 1].join(", ");
            format!("{head}, and {}", items[items.len() - 1])
        }
    }
}

/// Flatten an additive expression into signed terms.
fn split_terms(expr: &Expr, sign: f64, out: &mut Vec<(f64, Expr)>) {
    match expr {
        Expr::Add(a, b) => {
            split_terms(a, sign, out);
            split_terms(b, sign, out);
        }
        Expr::Sub(a, b) => {
            split_terms(a, sign, out);
            split_terms(b, -sign, out);
        }
        Expr::Neg(a) => split_terms(a, -sign, out),
        other => out.push((sign, other.clone())),
    }
}

/// Antiderivative of a single term, with the rule name for narration.
fn integrate_term(term: &Expr, var: &str) -> Result<(Expr, &'static str)> {
    let x = || Expr::variable(var);

    if let Some((c, n)) = coeff_power(term, var) {
        if (n + 1.0).abs() < f64::EPSILON {
            let log = Expr::call(Func::Ln, Expr::call(Func::Abs, x()));
            return Ok((mul_coeff(c, log), "log rule"));
        }
        let rule = if n == 0.0 { "constant rule" } else { "power rule" };
        let anti = Expr::div(
            mul_coeff(c, Expr::pow(x(), Expr::number(n + 1.0))),
            Expr::number(n + 1.0),
        );
        return Ok((anti, rule));
    }

    match term {
        t if !t.contains_var(var) => {
            Ok((Expr::mul(t.clone(), x()), "constant rule"))
        }
        Expr::Mul(a, b) if !a.contains_var(var) => {
            let (anti, rule) = integrate_term(b, var)?;
            Ok((Expr::mul((**a).clone(), anti), rule))
        }
        Expr::Mul(a, b) if !b.contains_var(var) => {
            let (anti, rule) = integrate_term(a, var)?;
            Ok((Expr::mul((**b).clone(), anti), rule))
        }
        Expr::Div(a, b) if !b.contains_var(var) => {
            let (anti, rule) = integrate_term(a, var)?;
            Ok((Expr::div(anti, (**b).clone()), rule))
        }
        Expr::Call(func, arg) if matches!(&**arg, Expr::Variable(v) if v == var) => {
            let anti = match func {
                Func::Sin => Expr::neg(Expr::call(Func::Cos, x())),
                Func::Cos => Expr::call(Func::Sin, x()),
                Func::Exp => Expr::call(Func::Exp, x()),
                Func::Tan => Expr::neg(Expr::call(
                    Func::Ln,
                    Expr::call(Func::Abs, Expr::call(Func::Cos, x())),
                )),
                Func::Ln => Expr::sub(Expr::mul(x(), Expr::call(Func::Ln, x())), x()),
                Func::Sqrt => Expr::div(
                    Expr::mul(
                        Expr::number(2.0),
                        Expr::pow(x(), Expr::div(Expr::number(3.0), Expr::number(2.0))),
                    ),
                    Expr::number(3.0),
                ),
                _ => {
                    return Err(Error::unsupported(format!(
                        "the integral of {}({var}) is not supported",
                        func.name()
                    )))
                }
            };
            let rule = match func {
                Func::Tan => "log rule",
                Func::Ln => "integration by parts",
                _ => "table of integrals",
            };
            Ok((anti, rule))
        }
        Expr::Call(func, arg) => {
            let a = linear_coeff(arg, var).ok_or_else(|| {
                Error::unsupported(format!("the integral of {term} is not supported"))
            })?;
            let outer = match func {
                Func::Sin => Expr::neg(Expr::call(Func::Cos, (**arg).clone())),
                Func::Cos => Expr::call(Func::Sin, (**arg).clone()),
                Func::Exp => Expr::call(Func::Exp, (**arg).clone()),
                _ => {
                    return Err(Error::unsupported(format!(
                        "the integral of {term} is not supported"
                    )))
                }
            };
            Ok((Expr::div(outer, Expr::number(a)), "linear substitution"))
        }
        // Exponentials: constant base, linear exponent.
        Expr::Pow(base, exp) if !base.contains_var(var) && exp.contains_var(var) => {
            let a = linear_coeff(exp, var).ok_or_else(|| {
                Error::unsupported(format!("the integral of {term} is not supported"))
            })?;
            let anti = if matches!(&**base, Expr::Variable(v) if v == "e") {
                Expr::div(term.clone(), Expr::number(a))
            } else {
                Expr::div(
                    term.clone(),
                    Expr::mul(Expr::number(a), Expr::call(Func::Ln, (**base).clone())),
                )
            };
            Ok((anti, "exponential rule"))
        }
        Expr::Pow(base, exp) => {
            let Expr::Number(n) = **exp else {
                return Err(Error::unsupported(format!(
                    "the integral of {term} is not supported"
                )));
            };
            let a = linear_coeff(base, var).ok_or_else(|| {
                Error::unsupported(format!("the integral of {term} is not supported"))
            })?;
            if (n + 1.0).abs() < f64::EPSILON {
                let log = Expr::call(Func::Ln, Expr::call(Func::Abs, (**base).clone()));
                return Ok((Expr::div(log, Expr::number(a)), "log rule"));
            }
            let anti = Expr::div(
                Expr::pow((**base).clone(), Expr::number(n + 1.0)),
                Expr::number(a * (n + 1.0)),
            );
            Ok((anti, "linear substitution"))
        }
        _ => Err(Error::unsupported(format!(
            "the integral of {term} is not supported; try expanding it first"
        ))),
    }
}

/// Match `c * var^n` shapes, including `c/x^n` as negative powers.
fn coeff_power(term: &Expr, var: &str) -> Option<(f64, f64)> {
    match term {
        Expr::Number(n) => Some((*n, 0.0)),
        Expr::Variable(v) if v == var => Some((1.0, 1.0)),
        Expr::Neg(inner) => coeff_power(inner, var).map(|(c, n)| (-c, n)),
        Expr::Mul(a, b) => {
            if let Expr::Number(c) = **a {
                coeff_power(b, var).map(|(c2, n)| (c * c2, n))
            } else if let Expr::Number(c) = **b {
                coeff_power(a, var).map(|(c2, n)| (c * c2, n))
            } else {
                None
            }
        }
        Expr::Div(a, b) => {
            if let Expr::Number(d) = **b {
                if d == 0.0 {
                    return None;
                }
                return coeff_power(a, var).map(|(c, n)| (c / d, n));
            }
            let Expr::Number(c) = **a else { return None };
            match &**b {
                Expr::Variable(v) if v == var => Some((c, -1.0)),
                Expr::Pow(base, exp) => {
                    let (Expr::Variable(v), Expr::Number(k)) = (&**base, &**exp) else {
                        return None;
                    };
                    if v == var {
                        Some((c, -k))
                    } else {
                        None
                    }
                }
                _ => None,
            }
        }
        Expr::Pow(base, exp) => {
            let (Expr::Variable(v), Expr::Number(k)) = (&**base, &**exp) else {
                return None;
            };
            if v == var {
                Some((1.0, *k))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The slope of an expression that is linear in `var`.
fn linear_coeff(expr: &Expr, var: &str) -> Option<f64> {
    let poly = Poly::from_expr(expr, var).ok()?;
    if poly.degree() == 1 {
        Some(poly.coeff(1))
    } else {
        None
    }
}

fn mul_coeff(c: f64, expr: Expr) -> Expr {
    if (c - 1.0).abs() < f64::EPSILON {
        expr
    } else if (c - -1.0).abs() < f64::EPSILON {
        Expr::neg(expr)
    } else {
        Expr::mul(Expr::number(c), expr)
    }
}

fn near_zero(v: f64) -> bool {
    v.abs() < 1e-9
}

fn ratio_text(qn: &Poly, qd: &Poly) -> String {
    if qd.degree() == 0 && (qd.coeff(0) - 1.0).abs() < f64::EPSILON {
        qn.to_string()
    } else {
        format!("({qn})/({qd})")
    }
}

fn standard_zero_limit(num: &Expr, den: &Expr) -> Option<(&'static str, f64)> {
    match num {
        Expr::Call(Func::Sin, u) if **u == *den => Some(("sin(u)/u -> 1", 1.0)),
        Expr::Call(Func::Tan, u) if **u == *den => Some(("tan(u)/u -> 1", 1.0)),
        Expr::Sub(one, cos) => {
            let Expr::Number(n) = **one else { return None };
            let Expr::Call(Func::Cos, u) = &**cos else {
                return None;
            };
            if n == 1.0 && **u == *den {
                Some(("(1 - cos(u))/u -> 0", 0.0))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_euler_form(expr: &Expr, var: &str) -> bool {
    let Expr::Pow(base, exp) = expr else {
        return false;
    };
    let pattern = Expr::add(
        Expr::number(1.0),
        Expr::div(Expr::number(1.0), Expr::variable(var)),
    );
    **base == pattern && matches!(&**exp, Expr::Variable(v) if v == var)
}

/// Fold constants and strip arithmetic identities, to a fixpoint.
fn simplify_expr(expr: &Expr) -> Expr {
    let mut current = expr.clone();
    for _ in 0..16 {
        let next = simplify_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[allow(clippy::too_many_lines)]
fn simplify_pass(expr: &Expr) -> Expr {
    let as_number = |e: &Expr| -> Option<f64> {
        if let Expr::Number(n) = e {
            Some(*n)
        } else {
            None
        }
    };
    match expr {
        Expr::Number(_) | Expr::Variable(_) => expr.clone(),
        Expr::Neg(inner) => {
            let inner = simplify_pass(inner);
            match inner {
                Expr::Number(n) => Expr::number(-n),
                Expr::Neg(deep) => *deep,
                other => Expr::neg(other),
            }
        }
        Expr::Add(a, b) => {
            let (a, b) = (simplify_pass(a), simplify_pass(b));
            match (as_number(&a), as_number(&b)) {
                (Some(x), Some(y)) => Expr::number(x + y),
                (Some(x), None) if x == 0.0 => b,
                (None, Some(y)) if y == 0.0 => a,
                _ => {
                    if let Expr::Neg(rhs) = b {
                        Expr::sub(a, *rhs)
                    } else {
                        Expr::add(a, b)
                    }
                }
            }
        }
        Expr::Sub(a, b) => {
            let (a, b) = (simplify_pass(a), simplify_pass(b));
            match (as_number(&a), as_number(&b)) {
                (Some(x), Some(y)) => Expr::number(x - y),
                (None, Some(y)) if y == 0.0 => a,
                (Some(x), None) if x == 0.0 => Expr::neg(b),
                _ => {
                    if let Expr::Neg(rhs) = b {
                        Expr::add(a, *rhs)
                    } else {
                        Expr::sub(a, b)
                    }
                }
            }
        }
        Expr::Mul(a, b) => {
            let (a, b) = (simplify_pass(a), simplify_pass(b));
            if let (Some(x), Some(y)) = (as_number(&a), as_number(&b)) {
                return Expr::number(x * y);
            }
            if let Some(x) = as_number(&a) {
                if x == 0.0 {
                    return Expr::number(0.0);
                }
                if x == 1.0 {
                    return b;
                }
                if x == -1.0 {
                    return Expr::neg(b);
                }
                // collect nested constants: 2 * (3 * y) -> 6y
                if let Expr::Mul(b1, b2) = &b {
                    if let Some(y) = as_number(b1) {
                        return Expr::mul(Expr::number(x * y), (**b2).clone());
                    }
                }
                return Expr::mul(a, b);
            }
            if let Some(y) = as_number(&b) {
                if y == 0.0 {
                    return Expr::number(0.0);
                }
                if y == 1.0 {
                    return a;
                }
                if y == -1.0 {
                    return Expr::neg(a);
                }
                // constants read better in front
                return Expr::mul(b, a);
            }
            if let Expr::Neg(lhs) = a {
                return Expr::neg(Expr::mul(*lhs, b));
            }
            if let Expr::Neg(rhs) = b {
                return Expr::neg(Expr::mul(a, *rhs));
            }
            Expr::mul(a, b)
        }
        Expr::Div(a, b) => {
            let (a, b) = (simplify_pass(a), simplify_pass(b));
            if let (Some(x), Some(y)) = (as_number(&a), as_number(&b)) {
                if y != 0.0 && (x / y).fract() == 0.0 {
                    return Expr::number(x / y);
                }
            }
            if as_number(&a) == Some(0.0) {
                return Expr::number(0.0);
            }
            if as_number(&b) == Some(1.0) {
                return a;
            }
            if as_number(&b) == Some(-1.0) {
                return Expr::neg(a);
            }
            if let Some(d) = as_number(&b) {
                // cancel an integral constant ratio: (2x^2)/2 -> x^2
                if let Expr::Mul(c, rest) = &a {
                    if let Some(cv) = as_number(c) {
                        if d != 0.0 && (cv / d).fract() == 0.0 {
                            return mul_coeff(cv / d, (**rest).clone());
                        }
                    }
                }
            }
            Expr::div(a, b)
        }
        Expr::Pow(base, exp) => {
            let (base, exp) = (simplify_pass(base), simplify_pass(exp));
            if let (Some(x), Some(y)) = (as_number(&base), as_number(&exp)) {
                let v = x.powf(y);
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e12 {
                    return Expr::number(v);
                }
            }
            if as_number(&exp) == Some(1.0) {
                return base;
            }
            if as_number(&exp) == Some(0.0) {
                return Expr::number(1.0);
            }
            Expr::pow(base, exp)
        }
        Expr::Call(func, arg) => {
            let arg = simplify_pass(arg);
            if let Expr::Number(n) = arg {
                if let Ok(v) = func.eval(n) {
                    if v.fract() == 0.0 && v.abs() < 1e12 {
                        return Expr::number(v);
                    }
                }
            }
            Expr::call(*func, arg)
        }
        Expr::Factorial(inner) => Expr::factorial(simplify_pass(inner)),
    }
}
