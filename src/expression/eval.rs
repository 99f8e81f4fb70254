// ⚙️ Expression Evaluator
// Tree-walking evaluation against a fixed allow-list of functions and constants

use super::parser::{BinaryOp, Expr, UnaryOp};
use crate::errors::{CalcError, CalcResult};
use crate::rounding::ensure_finite;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};

/// Largest n with a finite n!
const MAX_FACTORIAL: f64 = 170.0;

pub const FUNCTIONS: [&str; 21] = [
    "sin", "cos", "tan", "asin", "acos", "atan", "sqrt", "cbrt", "log", "ln", "log2", "exp", "abs", "ceil",
    "floor", "round", "min", "max", "sum", "pow", "factorial",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

impl AngleMode {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "degrees" | "deg" | "" => Ok(AngleMode::Degrees),
            "radians" | "rad" => Ok(AngleMode::Radians),
            _ => Err(CalcError::unsupported("angle mode", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AngleMode::Degrees => "degrees",
            AngleMode::Radians => "radians",
        }
    }

    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Degrees => angle.to_radians(),
            AngleMode::Radians => angle,
        }
    }

    fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Degrees => angle.to_degrees(),
            AngleMode::Radians => angle,
        }
    }
}

pub struct Evaluator {
    angle_mode: AngleMode,
}

impl Evaluator {
    pub fn new(angle_mode: AngleMode) -> Self {
        Evaluator { angle_mode }
    }

    pub fn eval(&self, expr: &Expr) -> CalcResult<f64> {
        let value = match expr {
            Expr::Number(n) => *n,
            Expr::Name(name) => constant(name)?,
            Expr::Unary(UnaryOp::Plus, inner) => self.eval(inner)?,
            Expr::Unary(UnaryOp::Neg, inner) => -self.eval(inner)?,
            Expr::Binary(op, lhs, rhs) => binary(*op, self.eval(lhs)?, self.eval(rhs)?)?,
            Expr::Factorial(inner) => factorial(self.eval(inner)?)?,
            Expr::Call(name, args) => {
                let values = args.iter().map(|a| self.eval(a)).collect::<CalcResult<Vec<_>>>()?;
                self.call(name, &values)?
            }
        };
        ensure_finite(value, "expression")
    }

    fn call(&self, name: &str, args: &[f64]) -> CalcResult<f64> {
        let mode = self.angle_mode;
        match name {
            "min" | "max" | "sum" => {
                if args.is_empty() {
                    return Err(CalcError::syntax(format!("{}() needs at least one argument", name)));
                }
                Ok(match name {
                    "min" => args.iter().copied().fold(f64::INFINITY, f64::min),
                    "max" => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    _ => args.iter().sum(),
                })
            }
            "pow" => {
                let [base, exponent] = exact_args::<2>(name, args)?;
                binary(BinaryOp::Pow, base, exponent)
            }
            "factorial" => factorial(exact_args::<1>(name, args)?[0]),
            _ => {
                let [x] = exact_args::<1>(name, args)?;
                let value = match name {
                    "sin" => mode.to_radians(x).sin(),
                    "cos" => mode.to_radians(x).cos(),
                    "tan" => mode.to_radians(x).tan(),
                    "asin" => mode.from_radians(x.asin()),
                    "acos" => mode.from_radians(x.acos()),
                    "atan" => mode.from_radians(x.atan()),
                    "sqrt" => x.sqrt(),
                    "cbrt" => x.cbrt(),
                    "log" => x.log10(),
                    "ln" => x.ln(),
                    "log2" => x.log2(),
                    "exp" => x.exp(),
                    "abs" => x.abs(),
                    "ceil" => x.ceil(),
                    "floor" => x.floor(),
                    "round" => x.round(),
                    _ => return Err(CalcError::syntax(format!("Unknown function '{}'", name))),
                };
                Ok(value)
            }
        }
    }
}

fn exact_args<const N: usize>(name: &str, args: &[f64]) -> CalcResult<[f64; N]> {
    <[f64; N]>::try_from(args).map_err(|_| {
        CalcError::syntax(format!("{}() takes {} argument(s), got {}", name, N, args.len()))
    })
}

fn constant(name: &str) -> CalcResult<f64> {
    match name {
        "pi" | "π" => Ok(PI),
        "e" => Ok(E),
        _ => Err(CalcError::syntax(format!("Unknown name '{}'", name))),
    }
}

fn binary(op: BinaryOp, lhs: f64, rhs: f64) -> CalcResult<f64> {
    match op {
        BinaryOp::Add => Ok(lhs + rhs),
        BinaryOp::Sub => Ok(lhs - rhs),
        BinaryOp::Mul => Ok(lhs * rhs),
        BinaryOp::Div if rhs == 0.0 => Err(CalcError::division_by_zero("division")),
        BinaryOp::Div => Ok(lhs / rhs),
        BinaryOp::Mod if rhs == 0.0 => Err(CalcError::division_by_zero("modulo")),
        // result takes the sign of the divisor
        BinaryOp::Mod => Ok(lhs - rhs * (lhs / rhs).floor()),
        BinaryOp::Pow if lhs == 0.0 && rhs < 0.0 => Err(CalcError::division_by_zero("power")),
        BinaryOp::Pow => Ok(lhs.powf(rhs)),
    }
}

/// Non-negative integers only
fn factorial(n: f64) -> CalcResult<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::Validation(ValidationError::new(
            "factorial",
            "is only defined for non-negative integers",
            "math",
        )));
    }
    if n > MAX_FACTORIAL {
        return Err(CalcError::Infinite {
            context: "factorial".to_string(),
        });
    }
    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{lexer::tokenize, parser::parse};

    fn eval_in(input: &str, mode: AngleMode) -> CalcResult<f64> {
        let ast = parse(tokenize(input)?)?;
        Evaluator::new(mode).eval(&ast)
    }

    fn eval(input: &str) -> CalcResult<f64> {
        eval_in(input, AngleMode::Degrees)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(eval("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(eval("2^10").unwrap(), 1024.0);
        assert_eq!(eval("2**3**2").unwrap(), 512.0);
        assert_eq!(eval("-2^2").unwrap(), -4.0);
        assert_eq!(eval("7 % 3").unwrap(), 1.0);
        assert_eq!(eval("-7 % 3").unwrap(), 2.0);
        assert_eq!(eval("5!").unwrap(), 120.0);
        assert_eq!(eval("2(3+4)").unwrap(), 14.0);
    }

    #[test]
    fn test_functions_and_angle_mode() {
        assert!(approx(eval("sin(30)").unwrap(), 0.5));
        assert!(approx(eval_in("cos(pi)", AngleMode::Radians).unwrap(), -1.0));
        assert!(approx(eval("asin(1)").unwrap(), 90.0));
        assert!(approx(eval("sqrt(16) + log(1000) + ln(1)").unwrap(), 7.0));
        assert_eq!(eval("max(1, 5, 3) + min(4, 2) + sum(1, 2, 3)").unwrap(), 13.0);
        assert_eq!(eval("pow(2, 5)").unwrap(), 32.0);
        assert!(approx(eval("cbrt(27)").unwrap(), 3.0));
        assert_eq!(eval("log2(8)").unwrap(), 3.0);
        assert!(approx(eval("2π").unwrap(), 2.0 * PI));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(eval("1/0").unwrap_err().kind(), "division_by_zero");
        assert_eq!(eval("5 % 0").unwrap_err().kind(), "division_by_zero");
        assert_eq!(eval("sqrt(-1)").unwrap_err().kind(), "not_a_number");
        assert_eq!(eval("10^400").unwrap_err().kind(), "infinite");
        assert_eq!(eval("171!").unwrap_err().kind(), "infinite");
        assert_eq!(eval("foo(2)").unwrap_err().kind(), "syntax");
        assert_eq!(eval("x + 1").unwrap_err().kind(), "syntax");
        assert_eq!(eval("pow(2)").unwrap_err().kind(), "syntax");
        assert_eq!(eval("2.5!").unwrap_err().kind(), "validation");
    }

    #[test]
    fn test_sandbox_names_rejected() {
        for name in ["__import__('os')", "exec(1)", "open(1)", "eval(2)"] {
            assert!(eval(name).is_err(), "{} must not evaluate", name);
        }
        println!("✅ Expression sandbox test PASSED");
    }
}
