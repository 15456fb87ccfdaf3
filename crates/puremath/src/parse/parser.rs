//! Recursive-descent parser for math statements.
//!
//! Standard precedence climbing: `^` is right-associative and binds
//! tightest after postfix `!`, unary minus sits between `*`/`/` and `^`,
//! and adjacency is multiplication where it is unambiguous (`2x`,
//! `3(x + 1)`, `(x + 1)(x - 2)`).

use super::ast::{Equation, Expr, Func, Statement};
use super::token::{tokenize, SpannedToken, Token};
use crate::error::{Error, Result};

/// Parenthesis nesting ceiling, so pathological input cannot blow the stack.
const MAX_DEPTH: usize = 256;

/// Parse a bare expression.
///
/// # Errors
///
/// Returns a positional parse error for malformed input, including input
/// containing `=`.
pub fn parse_expression(text: &str) -> Result<Expr> {
    match parse_statement(text)? {
        Statement::Expression(expr) => Ok(expr),
        Statement::Equation(_) => Err(Error::parse(
            "expected an expression, found an equation",
            0,
        )),
    }
}

/// Parse an equation (`lhs = rhs`).
///
/// # Errors
///
/// Returns a parse error if the input is malformed or contains no `=`.
pub fn parse_equation(text: &str) -> Result<Equation> {
    match parse_statement(text)? {
        Statement::Equation(eq) => Ok(eq),
        Statement::Expression(_) => Err(Error::parse(
            "expected an equation containing '='",
            text.chars().count(),
        )),
    }
}

/// Parse a statement: an expression, optionally `= expression`.
///
/// # Errors
///
/// Returns a positional parse error for malformed input.
pub fn parse_statement(text: &str) -> Result<Statement> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(Error::parse("empty expression", 0));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.chars().count(),
        depth: 0,
    };

    let lhs = parser.expr()?;
    let statement = if parser.eat(&Token::Equals) {
        let rhs = parser.expr()?;
        Statement::Equation(Equation::new(lhs, rhs))
    } else {
        Statement::Expression(lhs)
    };

    match parser.peek() {
        None => Ok(statement),
        Some(token) => Err(Error::parse(
            format!("unexpected token '{token}'"),
            parser.peek_pos(),
        )),
    }
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_pos(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.pos)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it equals `token`.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// `expr := term (('+' | '-') term)*`
    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                let rhs = self.term()?;
                lhs = Expr::add(lhs, rhs);
            } else if self.eat(&Token::Minus) {
                let rhs = self.term()?;
                lhs = Expr::sub(lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    /// `term := unary (('*' | '/') unary | <adjacent unary>)*`
    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                let rhs = self.unary()?;
                lhs = Expr::mul(lhs, rhs);
            } else if self.eat(&Token::Slash) {
                let rhs = self.unary()?;
                lhs = Expr::div(lhs, rhs);
            } else if matches!(self.peek(), Some(Token::Ident(_) | Token::LParen)) {
                // Implicit multiplication; numbers on the right stay
                // ambiguous ("2 3") and are rejected at the statement level
                let rhs = self.unary()?;
                lhs = Expr::mul(lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    /// `unary := '-' unary | power`
    fn unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            let inner = self.unary()?;
            return Ok(Expr::neg(inner));
        }
        self.power()
    }

    /// `power := postfix ('^' unary)?`
    fn power(&mut self) -> Result<Expr> {
        let base = self.postfix()?;
        if self.eat(&Token::Caret) {
            // Right-associative, and allows a negated exponent: 2^-3
            let exp = self.unary()?;
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    /// `postfix := primary '!'*`
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while self.eat(&Token::Bang) {
            expr = Expr::factorial(expr);
        }
        Ok(expr)
    }

    /// `primary := number | ident ['(' expr ')'] | '(' expr ')'`
    fn primary(&mut self) -> Result<Expr> {
        let pos = self.peek_pos();
        let Some(spanned) = self.advance() else {
            return Err(Error::parse("unexpected end of input", pos));
        };

        match spanned.token.clone() {
            Token::Number(n) => Ok(Expr::number(n)),
            Token::Ident(name) => {
                // A known function name must be a call; any other name is
                // a variable (a following '(' then reads as implicit
                // multiplication)
                if let Some(func) = Func::from_name(&name) {
                    if self.eat(&Token::LParen) {
                        self.depth += 1;
                        self.check_depth(pos)?;
                        let arg = self.expr()?;
                        self.expect_rparen()?;
                        self.depth -= 1;
                        return Ok(Expr::call(func, arg));
                    }
                    return Err(Error::parse(
                        format!(
                            "function '{}' requires parentheses, e.g. {}(x)",
                            func.name(),
                            func.name()
                        ),
                        pos,
                    ));
                }
                Ok(Expr::variable(name))
            }
            Token::LParen => {
                self.depth += 1;
                self.check_depth(pos)?;
                let inner = self.expr()?;
                self.expect_rparen()?;
                self.depth -= 1;
                Ok(inner)
            }
            token => Err(Error::parse(format!("unexpected token '{token}'"), pos)),
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.peek() {
            Some(Token::RParen) => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(Error::parse(
                format!("expected ')', found '{token}'"),
                self.peek_pos(),
            )),
            None => Err(Error::parse("missing closing ')'", self.end)),
        }
    }

    fn check_depth(&self, pos: usize) -> Result<()> {
        if self.depth > MAX_DEPTH {
            return Err(Error::parse("expression is nested too deeply", pos));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precedence() {
        let e = parse_expression("2 + 3 * 4").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 14.0);

        let e = parse_expression("(2 + 3) * 4").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 20.0);
    }

    #[test]
    fn test_parse_power_right_associative() {
        let e = parse_expression("2 ^ 3 ^ 2").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 512.0);
    }

    #[test]
    fn test_parse_negative_exponent() {
        let e = parse_expression("2^-3").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 0.125);
    }

    #[test]
    fn test_parse_implicit_multiplication() {
        let e = parse_expression("2x").unwrap();
        assert_eq!(
            e,
            Expr::mul(Expr::number(2.0), Expr::variable("x"))
        );

        let e = parse_expression("3(x + 1)").unwrap();
        assert_eq!(e.eval(&[("x", 1.0)]).unwrap(), 6.0);

        let e = parse_expression("(x + 1)(x - 2)").unwrap();
        assert_eq!(e.eval(&[("x", 3.0)]).unwrap(), 4.0);
    }

    #[test]
    fn test_parse_implicit_with_constants() {
        let e = parse_expression("2 pi r").unwrap();
        let vars = e.variables();
        assert_eq!(vars.len(), 1);
        assert!(vars.contains("r"));
        let circumference = e.eval(&[("r", 1.0)]).unwrap();
        assert!((circumference - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_adjacent_numbers_rejected() {
        let err = parse_expression("2 3").unwrap_err();
        assert!(err.to_string().contains("unexpected token '3'"));
    }

    #[test]
    fn test_parse_unary_minus_binds_below_power() {
        let e = parse_expression("-x^2").unwrap();
        assert_eq!(e.eval(&[("x", 3.0)]).unwrap(), -9.0);
    }

    #[test]
    fn test_parse_function_call() {
        let e = parse_expression("sqrt(16)").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 4.0);

        let e = parse_expression("sin(0)").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_name_with_parens_is_multiplication() {
        let e = parse_expression("k(2)").unwrap();
        assert_eq!(
            e,
            Expr::mul(Expr::variable("k"), Expr::number(2.0))
        );
    }

    #[test]
    fn test_function_without_parens_rejected() {
        let err = parse_expression("sin x").unwrap_err();
        assert!(err.to_string().contains("requires parentheses"));
    }

    #[test]
    fn test_parse_factorial() {
        let e = parse_expression("5!").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 120.0);

        let e = parse_expression("3!!").unwrap();
        assert_eq!(e.eval(&[]).unwrap(), 720.0);
    }

    #[test]
    fn test_parse_equation() {
        let eq = parse_equation("2x + 5 = 13").unwrap();
        assert_eq!(eq.to_string(), "2x + 5 = 13");
    }

    #[test]
    fn test_parse_equation_requires_equals() {
        let err = parse_equation("2x + 5").unwrap_err();
        assert!(err.to_string().contains("'='"));
    }

    #[test]
    fn test_parse_statement_dispatch() {
        assert!(matches!(
            parse_statement("x + 1").unwrap(),
            Statement::Expression(_)
        ));
        assert!(matches!(
            parse_statement("x + 1 = 2").unwrap(),
            Statement::Equation(_)
        ));
    }

    #[test]
    fn test_parse_double_equals_rejected() {
        let err = parse_statement("a = b = c").unwrap_err();
        assert!(err.to_string().contains("unexpected token '='"));
    }

    #[test]
    fn test_parse_empty() {
        let err = parse_expression("").unwrap_err();
        assert!(err.to_string().contains("empty expression"));
    }

    #[test]
    fn test_parse_trailing_operator() {
        let err = parse_expression("2 +").unwrap_err();
        assert!(err.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_parse_misplaced_operator() {
        let err = parse_expression("2 + * 3").unwrap_err();
        assert!(err.to_string().contains("unexpected token '*'"));
    }

    #[test]
    fn test_parse_unclosed_paren() {
        let err = parse_expression("(2 + 3").unwrap_err();
        assert!(err.to_string().contains("missing closing ')'"));
    }

    #[test]
    fn test_parse_depth_limit() {
        let mut input = String::new();
        for _ in 0..300 {
            input.push('(');
        }
        input.push('1');
        for _ in 0..300 {
            input.push(')');
        }
        let err = parse_expression(&input).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["2x + 5", "x^2 - 4", "sin(x)", "1/(2x)", "(x + 1)^2"] {
            let parsed = parse_expression(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
