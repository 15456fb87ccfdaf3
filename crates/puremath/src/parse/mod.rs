//! Expression parsing.
//!
//! This module turns normalized statement text into an AST:
//!
//! - **Tokenizer**: a character scanner producing numbers, names, and
//!   operator tokens with positions, so errors can point at the offending
//!   character.
//!
//! - **Parser**: recursive descent with the usual precedence, implicit
//!   multiplication (`2x`, `3(x + 1)`), right-associative `^`, postfix
//!   `!`, and the function table (`sin`, `cos`, `ln`, `sqrt`, ...).
//!
//! - **AST**: [`Expr`] and [`Equation`] with numeric evaluation and a
//!   `Display` that prints canonical notation with minimal parentheses.
//!
//! # Example
//!
//! ```
//! use puremath::parse::parse_expression;
//!
//! let expr = parse_expression("2x + 5").unwrap();
//! assert_eq!(expr.to_string(), "2x + 5");
//! assert_eq!(expr.eval(&[("x", 4.0)]).unwrap(), 13.0);
//! ```

mod ast;
mod parser;
mod token;

pub use ast::{format_number, is_constant_name, Equation, Expr, Func, Statement};
pub use parser::{parse_equation, parse_expression, parse_statement};
pub use token::{tokenize, SpannedToken, Token};
