// 🔤 Expression Tokenizer
// Characters → tokens, then implicit multiplication is made explicit

use crate::errors::{CalcError, CalcResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `^` and `**`
    Caret,
    Bang,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::Bang => write!(f, "!"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Names that stand for values rather than function calls
pub fn is_constant(name: &str) -> bool {
    matches!(name, "pi" | "π" | "e")
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let (number, next) = read_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = next;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect::<String>().to_lowercase();
                tokens.push(Token::Ident(name));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' | '−' => Token::Minus,
                    '*' | '×' => Token::Star,
                    '/' | '÷' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Caret,
                    '!' => Token::Bang,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    other => return Err(CalcError::syntax(format!("Unexpected character '{}'", other))),
                };
                tokens.push(token);
                i += 1;
            }
        }
    }

    Ok(insert_implicit_multiplication(tokens))
}

/// Digits with an optional fraction and an optional exponent (`1.5e-3`).
/// A trailing `e` with no digits after it is left for the constant.
fn read_number(chars: &[char], start: usize) -> CalcResult<(f64, usize)> {
    let mut i = start;
    let mut seen_dot = false;
    while i < chars.len() && (chars[i].is_ascii_digit() || (chars[i] == '.' && !seen_dot)) {
        if chars[i] == '.' {
            seen_dot = true;
        }
        i += 1;
    }

    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, i))
        .map_err(|_| CalcError::syntax(format!("Invalid number '{}'", text)))
}

fn ends_value(token: &Token, next: &Token) -> bool {
    match token {
        Token::Number(_) | Token::RParen | Token::Bang => true,
        // a function name followed by `(` is a call, not a product
        Token::Ident(name) => is_constant(name) || *next != Token::LParen,
        _ => false,
    }
}

fn starts_value(token: &Token) -> bool {
    matches!(token, Token::Number(_) | Token::Ident(_) | Token::LParen)
}

/// `2(3)`, `(1)(2)`, `2pi`, `3!(2)`, `pi(2)` become explicit products
fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last() {
            if starts_value(&token) && ends_value(prev, &token) {
                out.push(Token::Star);
            }
        }
        out.push(token);
    }
    out
}

/// Canonical text of a token stream, as evaluated
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("3 + 4.5 * 2").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Number(3.0), Token::Plus, Token::Number(4.5), Token::Star, Token::Number(2.0)]
        );
    }

    #[test]
    fn test_double_star_is_power() {
        let tokens = tokenize("2**3").unwrap();
        assert_eq!(tokens, vec![Token::Number(2.0), Token::Caret, Token::Number(3.0)]);
    }

    #[test]
    fn test_exponent_notation_vs_constant_e() {
        assert_eq!(tokenize("1.5e3").unwrap(), vec![Token::Number(1500.0)]);
        assert_eq!(tokenize("2e-2").unwrap(), vec![Token::Number(0.02)]);
        // no digits after e: number times the constant
        assert_eq!(
            tokenize("2e").unwrap(),
            vec![Token::Number(2.0), Token::Star, Token::Ident("e".into())]
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(render(&tokenize("2(3+4)").unwrap()), "2*(3+4)");
        assert_eq!(render(&tokenize("(1+1)(2)").unwrap()), "(1+1)*(2)");
        assert_eq!(render(&tokenize("2pi").unwrap()), "2*pi");
        assert_eq!(render(&tokenize("3!2").unwrap()), "3!*2");
        assert_eq!(render(&tokenize("2sqrt(4)").unwrap()), "2*sqrt(4)");
        assert_eq!(render(&tokenize("pi(2)").unwrap()), "pi*(2)");
        // function call stays a call
        assert_eq!(render(&tokenize("sin(30)").unwrap()), "sin(30)");
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("2 $ 3").unwrap_err();
        assert_eq!(err.kind(), "syntax");
        assert!(tokenize(".").is_err());
    }
}
