//! Tokenizer for the expression language.

use crate::error::{Error, Result};

/// A lexical token of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal.
    Number(f64),
    /// A variable or function name.
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `=`
    Equals,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `!`
    Bang,
    /// `->`
    Arrow,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Caret => write!(f, "^"),
            Self::Equals => write!(f, "="),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Bang => write!(f, "!"),
            Self::Arrow => write!(f, "->"),
        }
    }
}

/// A token together with its character offset in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Character offset where the token starts.
    pub pos: usize,
}

/// Tokenize expression text.
///
/// # Errors
///
/// Returns a positional parse error on unknown characters or malformed
/// numeric literals.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().enumerate().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() {
            let mut literal = String::new();
            let mut seen_dot = false;
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                    chars.next();
                } else if c == '.' && !seen_dot {
                    seen_dot = true;
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = literal
                .parse()
                .map_err(|_| Error::parse(format!("invalid number '{literal}'"), pos))?;
            tokens.push(SpannedToken {
                token: Token::Number(value),
                pos,
            });
            continue;
        }

        if c.is_ascii_alphabetic() {
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(SpannedToken {
                token: Token::Ident(name),
                pos,
            });
            continue;
        }

        chars.next();
        let token = match c {
            '+' => Token::Plus,
            '-' => {
                // A '-' directly followed by '>' is the limit arrow
                if let Some(&(_, '>')) = chars.peek() {
                    chars.next();
                    Token::Arrow
                } else {
                    Token::Minus
                }
            }
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '=' => Token::Equals,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '!' => Token::Bang,
            _ => {
                return Err(Error::parse(format!("unexpected character '{c}'"), pos));
            }
        };
        tokens.push(SpannedToken { token, pos });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(kinds("42"), vec![Token::Number(42.0)]);
        assert_eq!(kinds("3.25"), vec![Token::Number(3.25)]);
        assert_eq!(
            kinds("1 2.5"),
            vec![Token::Number(1.0), Token::Number(2.5)]
        );
    }

    #[test]
    fn test_tokenize_identifiers() {
        assert_eq!(kinds("x"), vec![Token::Ident("x".to_string())]);
        assert_eq!(kinds("sin"), vec![Token::Ident("sin".to_string())]);
        assert_eq!(kinds("x_1"), vec![Token::Ident("x_1".to_string())]);
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("+ - * / ^ = !"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Caret,
                Token::Equals,
                Token::Bang,
            ]
        );
    }

    #[test]
    fn test_tokenize_parens_and_comma() {
        assert_eq!(
            kinds("(x, y)"),
            vec![
                Token::LParen,
                Token::Ident("x".to_string()),
                Token::Comma,
                Token::Ident("y".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_arrow() {
        assert_eq!(
            kinds("x -> 0"),
            vec![
                Token::Ident("x".to_string()),
                Token::Arrow,
                Token::Number(0.0),
            ]
        );
    }

    #[test]
    fn test_minus_not_arrow_without_gt() {
        assert_eq!(
            kinds("x - 1"),
            vec![
                Token::Ident("x".to_string()),
                Token::Minus,
                Token::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_implicit_multiplication_splits() {
        // "2x" stays two tokens; the parser turns adjacency into multiplication
        assert_eq!(
            kinds("2x"),
            vec![Token::Number(2.0), Token::Ident("x".to_string())]
        );
    }

    #[test]
    fn test_tokenize_expression() {
        assert_eq!(
            kinds("2x + 5 = 13"),
            vec![
                Token::Number(2.0),
                Token::Ident("x".to_string()),
                Token::Plus,
                Token::Number(5.0),
                Token::Equals,
                Token::Number(13.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_unknown_char() {
        let err = tokenize("2 @ 3").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unexpected character '@'"));
        assert!(msg.contains("position 2"));
    }

    #[test]
    fn test_tokenize_number_stops_at_second_dot() {
        // "1.2.3" tokenizes "1.2" then errors on the stray dot
        let err = tokenize("1.2.3").unwrap_err();
        assert!(err.to_string().contains("unexpected character '.'"));
    }

    #[test]
    fn test_tokenize_positions() {
        let tokens = tokenize("ab + 1").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 3);
        assert_eq!(tokens[2].pos, 5);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
