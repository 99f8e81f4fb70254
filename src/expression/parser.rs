// 🌳 Expression Parser
// Recursive descent over the token stream into an AST
//
// expr    := term (('+' | '-') term)*
// term    := unary (('*' | '/' | '%') unary)*
// unary   := ('+' | '-') unary | power
// power   := postfix ('^' unary)?          right-associative
// postfix := primary '!'*
// primary := number | ident | ident '(' args ')' | '(' expr ')'

use super::lexer::Token;
use crate::errors::{CalcError, CalcResult};

/// Nested parentheses, signs, exponents and calls
pub const MAX_DEPTH: usize = 256;
/// Operands plus operators in one expression
pub const MAX_NODES: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Bare name (constant); resolved at evaluation
    Name(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Factorial(Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Operator and call count, for complexity scoring
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Name(_) => 1,
            Expr::Unary(_, inner) | Expr::Factorial(inner) => 1 + inner.node_count(),
            Expr::Binary(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Call(_, args) => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            nodes: 0,
        }
    }

    /// Parse the whole stream; leftover tokens are an error
    pub fn parse(mut self) -> CalcResult<Expr> {
        if self.tokens.is_empty() {
            return Err(CalcError::syntax("Expression cannot be empty"));
        }
        let expr = self.expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(CalcError::syntax(format!("Unexpected '{}'", token))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> CalcResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(CalcError::syntax(format!("Expected '{}' but found '{}'", expected, found))),
                None => Err(CalcError::syntax(format!("Expected '{}' at end of expression", expected))),
            }
        }
    }

    /// Every tree node passes through here; evaluation recurses once per level
    fn grow(&mut self) -> CalcResult<()> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(CalcError::syntax(format!(
                "Expression too long (more than {} operands and operators)",
                MAX_NODES
            )));
        }
        Ok(())
    }

    fn expr(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            self.grow()?;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            self.grow()?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    /// Each nesting level (parentheses, call arguments, signs, exponents) enters here once
    fn unary(&mut self) -> CalcResult<Expr> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::syntax("Expression too deeply nested"));
        }
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> CalcResult<Expr> {
        let op = if self.eat(&Token::Minus) {
            UnaryOp::Neg
        } else if self.eat(&Token::Plus) {
            UnaryOp::Plus
        } else {
            return self.power();
        };
        self.grow()?;
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    /// `-2^2` is `-(2^2)`; `2^-1` is allowed; `2^3^2` is `2^(3^2)`
    fn power(&mut self) -> CalcResult<Expr> {
        let base = self.postfix()?;
        if self.eat(&Token::Caret) {
            self.grow()?;
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> CalcResult<Expr> {
        let mut expr = self.primary()?;
        while self.eat(&Token::Bang) {
            self.grow()?;
            expr = Expr::Factorial(Box::new(expr));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> CalcResult<Expr> {
        self.grow()?;
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Name(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(token) => Err(CalcError::syntax(format!("Unexpected '{}'", token))),
            None => Err(CalcError::syntax("Unexpected end of expression")),
        }
    }

    fn arguments(&mut self) -> CalcResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen)?;
            return Ok(args);
        }
    }
}

pub fn parse(tokens: Vec<Token>) -> CalcResult<Expr> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::lexer::tokenize;

    fn ast(input: &str) -> Expr {
        parse(tokenize(input).unwrap()).unwrap()
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            ast("1 + 2 * 3"),
            Expr::Binary(BinaryOp::Add, num(1.0), Box::new(Expr::Binary(BinaryOp::Mul, num(2.0), num(3.0))))
        );
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        assert_eq!(
            ast("-2^2"),
            Expr::Unary(UnaryOp::Neg, Box::new(Expr::Binary(BinaryOp::Pow, num(2.0), num(2.0))))
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            ast("2^3^2"),
            Expr::Binary(BinaryOp::Pow, num(2.0), Box::new(Expr::Binary(BinaryOp::Pow, num(3.0), num(2.0))))
        );
    }

    #[test]
    fn test_calls_and_factorial() {
        assert_eq!(
            ast("max(1, 2, 3)"),
            Expr::Call("max".into(), vec![Expr::Number(1.0), Expr::Number(2.0), Expr::Number(3.0)])
        );
        assert_eq!(ast("5!"), Expr::Factorial(num(5.0)));
    }

    #[test]
    fn test_malformed_input() {
        for bad in ["", "(1 + 2", "1 +", "1 2 )", "*3", "max(1,", ","] {
            let result = tokenize(bad).and_then(parse);
            assert!(result.is_err(), "'{}' should not parse", bad);
            assert_eq!(result.unwrap_err().kind(), "syntax");
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let nested = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let err = tokenize(&nested).and_then(parse).unwrap_err();
        assert_eq!(err.kind(), "syntax");
        assert!(err.to_string().contains("too deeply nested"), "got: {}", err);

        let signs = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert!(tokenize(&signs).and_then(parse).is_err());

        let tower = vec!["2"; MAX_DEPTH + 1].join("^");
        assert!(tokenize(&tower).and_then(parse).is_err());

        // right at the limit still parses
        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert!(tokenize(&ok).and_then(parse).is_ok());
    }

    #[test]
    fn test_long_chains_are_rejected() {
        let chain = format!("1{}", "+1".repeat(100_000));
        let err = tokenize(&chain).and_then(parse).unwrap_err();
        assert_eq!(err.kind(), "syntax");
        assert!(err.to_string().contains("too long"), "got: {}", err);

        let fits = format!("1{}", "+1".repeat(400));
        assert_eq!(ast(&fits).node_count(), 801);
        println!("✅ Expression size limits test PASSED");
    }
}
