// 🧮 Expression Engine
// tokenize → parse → evaluate, with no access to anything outside the allow-list

pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::{AngleMode, Evaluator, FUNCTIONS};
pub use lexer::{tokenize, Token};
pub use parser::{parse, BinaryOp, Expr, UnaryOp};

use crate::errors::CalcResult;
use crate::rounding::round_dp;

/// Decimal places kept on results
pub const DEFAULT_PRECISION: u32 = 10;

/// A parsed and evaluated expression
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Canonical form with implicit products made explicit
    pub processed: String,
    pub ast: Expr,
    pub value: f64,
}

pub fn evaluate(input: &str, angle_mode: AngleMode, precision: u32) -> CalcResult<Evaluation> {
    let tokens = tokenize(input)?;
    let processed = lexer::render(&tokens);
    let ast = parse(tokens)?;
    let value = Evaluator::new(angle_mode).eval(&ast)?;
    Ok(Evaluation {
        processed,
        ast,
        value: round_dp(value, precision),
    })
}

/// Integral values print without a fractional part
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_rounds_to_precision() {
        let e = evaluate("1/3", AngleMode::Degrees, DEFAULT_PRECISION).unwrap();
        assert_eq!(e.value, 0.3333333333);
        // 0.1 + 0.2 noise disappears
        let e = evaluate("0.1 + 0.2", AngleMode::Degrees, DEFAULT_PRECISION).unwrap();
        assert_eq!(e.value, 0.3);
    }

    #[test]
    fn test_processed_form() {
        let e = evaluate("2(3 + 4)", AngleMode::Degrees, DEFAULT_PRECISION).unwrap();
        assert_eq!(e.processed, "2*(3+4)");
        assert_eq!(e.value, 14.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
