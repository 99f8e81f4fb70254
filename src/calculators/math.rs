// ➗ Math Calculator
// Sandboxed expression evaluation, plus descriptive statistics and a quadratic solver

use crate::errors::{CalcError, CalcResult};
use crate::expression::{self, lexer, AngleMode, Token, DEFAULT_PRECISION};
use crate::result::Calculator;
use crate::rounding::{ensure_finite, round_dp, safe_div};
use crate::validation::{ValidationError, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::{E, PI};

const MAX_PRECISION: u32 = 15;
const MAX_EXPRESSION_CHARS: usize = 1_000;
const FRACTION_MAX_DENOMINATOR: i64 = 1000;
/// Integers inside this range also get binary/octal/hex forms
const RADIX_LIMIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathMode {
    #[default]
    Expression,
    Statistics,
    Quadratic,
}

fn default_angle_mode() -> String {
    "degrees".to_string()
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

#[derive(Debug, Clone, Deserialize)]
pub struct MathRequest {
    #[serde(default, rename = "type")]
    pub mode: MathMode,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default = "default_angle_mode")]
    pub angle_mode: String,
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default)]
    pub numbers: Option<Vec<f64>>,
    #[serde(default)]
    pub a: Option<f64>,
    #[serde(default)]
    pub b: Option<f64>,
    #[serde(default)]
    pub c: Option<f64>,
}

impl Default for MathRequest {
    fn default() -> Self {
        MathRequest {
            mode: MathMode::Expression,
            expression: None,
            angle_mode: default_angle_mode(),
            precision: DEFAULT_PRECISION,
            numbers: None,
            a: None,
            b: None,
            c: None,
        }
    }
}

impl MathRequest {
    pub fn expression(expr: &str) -> Self {
        MathRequest {
            expression: Some(expr.to_string()),
            ..Default::default()
        }
    }

    pub fn in_radians(mut self) -> Self {
        self.angle_mode = "radians".to_string();
        self
    }

    pub fn statistics(numbers: Vec<f64>) -> Self {
        MathRequest {
            mode: MathMode::Statistics,
            numbers: Some(numbers),
            ..Default::default()
        }
    }

    pub fn quadratic(a: f64, b: f64, c: f64) -> Self {
        MathRequest {
            mode: MathMode::Quadratic,
            a: Some(a),
            b: Some(b),
            c: Some(c),
            ..Default::default()
        }
    }
}

/// JSON integer when the value is integral, float otherwise
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

// ============================================================================
// EXPRESSION MODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionResult {
    pub result: Value,
    pub expression: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultProperties {
    pub is_integer: bool,
    pub is_positive: bool,
    pub is_negative: bool,
    pub is_zero: bool,
    pub absolute_value: f64,
    pub sign: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionAnalysis {
    pub contains_trigonometry: bool,
    pub contains_logarithm: bool,
    pub contains_exponent: bool,
    pub contains_root: bool,
    pub contains_factorial: bool,
    pub expression_length: usize,
    pub complexity: &'static str,
    pub result_properties: ResultProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlternativeForms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_terms_of_pi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_terms_of_e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub octal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hexadecimal: Option<String>,
}

impl AlternativeForms {
    fn is_empty(&self) -> bool {
        *self == AlternativeForms::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionDetailed {
    #[serde(flatten)]
    pub simple: ExpressionResult,
    pub original_expression: String,
    pub processed_expression: String,
    pub result_type: &'static str,
    pub scientific_notation: String,
    pub analysis: ExpressionAnalysis,
    pub angle_mode: &'static str,
    pub precision: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_forms: Option<AlternativeForms>,
}

fn evaluate_request(request: &MathRequest) -> CalcResult<(expression::Evaluation, AngleMode)> {
    let input = request.expression.as_deref().unwrap_or("").trim();
    Validator::new(MathCalculator::NAME)
        .at_most("precision", request.precision as f64, MAX_PRECISION as f64)
        .at_most("expression length", input.chars().count() as f64, MAX_EXPRESSION_CHARS as f64)
        .finish()?;
    let angle_mode = AngleMode::parse(&request.angle_mode)?;
    let evaluation = expression::evaluate(input, angle_mode, request.precision)?;
    Ok((evaluation, angle_mode))
}

/// Operators + 2 × function calls + opening parentheses
pub fn complexity(tokens: &[Token]) -> &'static str {
    let operators = tokens
        .iter()
        .filter(|t| matches!(t, Token::Plus | Token::Minus | Token::Star | Token::Slash | Token::Caret))
        .count();
    let calls = tokens
        .windows(2)
        .filter(|w| matches!(&w[0], Token::Ident(name) if !lexer::is_constant(name)) && w[1] == Token::LParen)
        .count();
    let parens = tokens.iter().filter(|t| **t == Token::LParen).count();

    match operators + calls * 2 + parens {
        0..=3 => "Simple",
        4..=8 => "Moderate",
        9..=15 => "Complex",
        _ => "Very Complex",
    }
}

fn analyse(original: &str, tokens: &[Token], value: f64) -> ExpressionAnalysis {
    let lower = original.to_lowercase();
    let has_call = |names: &[&str]| {
        tokens
            .iter()
            .any(|t| matches!(t, Token::Ident(name) if names.contains(&name.as_str())))
    };
    ExpressionAnalysis {
        contains_trigonometry: has_call(&["sin", "cos", "tan", "asin", "acos", "atan"]),
        contains_logarithm: has_call(&["log", "ln", "log2"]),
        contains_exponent: tokens.contains(&Token::Caret) || has_call(&["exp", "pow"]),
        contains_root: has_call(&["sqrt", "cbrt"]),
        contains_factorial: lower.contains('!') || has_call(&["factorial"]),
        expression_length: original.chars().count(),
        complexity: complexity(tokens),
        result_properties: ResultProperties {
            is_integer: value.fract() == 0.0,
            is_positive: value > 0.0,
            is_negative: value < 0.0,
            is_zero: value == 0.0,
            absolute_value: value.abs(),
            sign: if value > 0.0 {
                "positive"
            } else if value < 0.0 {
                "negative"
            } else {
                "zero"
            },
        },
    }
}

/// Closest p/q with q ≤ `max_denominator` (continued fractions + semiconvergent)
pub fn limit_denominator(value: f64, max_denominator: i64) -> (i64, i64) {
    let sign = if value < 0.0 { -1 } else { 1 };
    let target = value.abs();
    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let mut x = target;

    loop {
        let a = x.floor() as i64;
        let q2 = q0 + a * q1;
        if q2 > max_denominator {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        let frac = x - a as f64;
        if frac < 1e-12 {
            return (sign * p1, q1);
        }
        x = 1.0 / frac;
    }

    let k = (max_denominator - q0) / q1;
    let (bp, bq) = (p0 + k * p1, q0 + k * q1);
    let bound_error = (bp as f64 / bq as f64 - target).abs();
    let convergent_error = (p1 as f64 / q1 as f64 - target).abs();
    if bound_error < convergent_error {
        (sign * bp, bq)
    } else {
        (sign * p1, q1)
    }
}

fn multiple_of(value: f64, constant: f64, symbol: &str) -> Option<String> {
    let ratio = value / constant;
    let multiple = ratio.round();
    if (ratio - multiple).abs() >= 0.01 || multiple == 0.0 {
        return None;
    }
    Some(match multiple as i64 {
        1 => symbol.to_string(),
        -1 => format!("-{}", symbol),
        m => format!("{}{}", m, symbol),
    })
}

fn radix(value: i64, prefix: &str, digits: String) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}{}", sign, prefix, digits)
}

pub fn alternative_forms(value: f64) -> Option<AlternativeForms> {
    let mut forms = AlternativeForms::default();

    if value.fract() != 0.0 {
        let (num, den) = limit_denominator(value, FRACTION_MAX_DENOMINATOR);
        if (num as f64 / den as f64 - value).abs() < 0.0001 {
            forms.fraction = Some(format!("{}/{}", num, den));
        }
        forms.in_terms_of_pi = multiple_of(value, PI, "π");
        forms.in_terms_of_e = multiple_of(value, E, "e");
    } else if value.abs() < RADIX_LIMIT {
        let n = value as i64;
        let abs = n.unsigned_abs();
        forms.binary = Some(radix(n, "0b", format!("{:b}", abs)));
        forms.octal = Some(radix(n, "0o", format!("{:o}", abs)));
        forms.hexadecimal = Some(radix(n, "0x", format!("{:x}", abs)));
    }

    if forms.is_empty() {
        None
    } else {
        Some(forms)
    }
}

/// `1.2340000000e+03`: signed, two-digit exponent
pub fn scientific(value: f64, precision: u32) -> String {
    let raw = format!("{:.*e}", precision as usize, value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exponent: i32 = exp.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => raw,
    }
}

// ============================================================================
// STATISTICS MODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Every value sharing the highest count, in first-seen order
    pub mode: Vec<f64>,
    pub range: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    pub standard_deviation: f64,
}

/// Population variance and standard deviation
pub fn statistics(numbers: &[f64]) -> CalcResult<Statistics> {
    let mut validator = Validator::new(MathCalculator::NAME).not_empty("numbers", numbers);
    for n in numbers {
        validator = validator.finite("numbers", *n);
    }
    validator.finish()?;

    let count = numbers.len();
    let sum: f64 = numbers.iter().sum();
    let mean = safe_div(sum, count as f64, "mean")?;

    let mut sorted = numbers.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &n in numbers {
        match counts.iter_mut().find(|(v, _)| *v == n) {
            Some((_, c)) => *c += 1,
            None => counts.push((n, 1)),
        }
    }
    let top = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mode = counts.iter().filter(|(_, c)| *c == top).map(|(v, _)| *v).collect();

    let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
    let min = sorted[0];
    let max = sorted[count - 1];

    Ok(Statistics {
        count,
        sum,
        mean: round_dp(mean, 6),
        median: round_dp(median, 6),
        mode,
        range: max - min,
        min,
        max,
        variance: round_dp(variance, 6),
        standard_deviation: round_dp(variance.sqrt(), 6),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsDetailed {
    #[serde(flatten)]
    pub stats: Statistics,
    /// Standard deviation as a percentage of the mean; absent when the mean is 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficient_of_variation: Option<f64>,
    pub sorted: Vec<f64>,
    pub spread: &'static str,
}

// ============================================================================
// QUADRATIC MODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Root {
    Real(f64),
    /// `re + imi` text form
    Complex(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadraticSolution {
    pub roots: Vec<Root>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub discriminant: f64,
}

/// ax² + bx + c = 0
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> CalcResult<QuadraticSolution> {
    Validator::new(MathCalculator::NAME)
        .finite("a", a)
        .finite("b", b)
        .finite("c", c)
        .check(a != 0.0, "a", "cannot be zero for a quadratic equation")
        .finish()?;

    let discriminant = ensure_finite(b * b - 4.0 * a * c, "discriminant")?;
    let two_a = 2.0 * a;

    let solution = if discriminant > 0.0 {
        let root = discriminant.sqrt();
        QuadraticSolution {
            roots: vec![
                Root::Real(round_dp((-b + root) / two_a, 6)),
                Root::Real(round_dp((-b - root) / two_a, 6)),
            ],
            kind: "Two real roots",
            discriminant,
        }
    } else if discriminant == 0.0 {
        QuadraticSolution {
            roots: vec![Root::Real(round_dp(-b / two_a, 6))],
            kind: "One real root (repeated)",
            discriminant,
        }
    } else {
        let re = expression::format_number(round_dp(-b / two_a, 6) + 0.0);
        let im = expression::format_number(round_dp((discriminant.abs().sqrt() / two_a).abs(), 6));
        QuadraticSolution {
            roots: vec![
                Root::Complex(format!("{} + {}i", re, im)),
                Root::Complex(format!("{} - {}i", re, im)),
            ],
            kind: "Two complex roots",
            discriminant,
        }
    };
    Ok(solution)
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadraticDetailed {
    #[serde(flatten)]
    pub solution: QuadraticSolution,
    pub equation: String,
    pub vertex: (f64, f64),
    pub axis_of_symmetry: f64,
    pub y_intercept: f64,
    pub opens: &'static str,
}

fn quadratic_coefficients(request: &MathRequest) -> CalcResult<(f64, f64, f64)> {
    let missing = |field: &str| {
        CalcError::Validation(ValidationError::new(field, "is required for a quadratic", MathCalculator::NAME))
    };
    Ok((
        request.a.ok_or_else(|| missing("a"))?,
        request.b.unwrap_or(0.0),
        request.c.unwrap_or(0.0),
    ))
}

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MathSimple {
    Expression(ExpressionResult),
    Statistics(Statistics),
    Quadratic(QuadraticSolution),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MathDetailed {
    Expression(Box<ExpressionDetailed>),
    Statistics(StatisticsDetailed),
    Quadratic(QuadraticDetailed),
}

pub struct MathCalculator;

impl Calculator for MathCalculator {
    type Request = MathRequest;
    type Simple = MathSimple;
    type Detailed = MathDetailed;
    const NAME: &'static str = "math";

    fn simple(request: &MathRequest) -> CalcResult<MathSimple> {
        match request.mode {
            MathMode::Expression => {
                let (evaluation, _) = evaluate_request(request)?;
                Ok(MathSimple::Expression(ExpressionResult {
                    result: number_value(evaluation.value),
                    expression: evaluation.processed,
                    success: true,
                }))
            }
            MathMode::Statistics => {
                statistics(request.numbers.as_deref().unwrap_or(&[])).map(MathSimple::Statistics)
            }
            MathMode::Quadratic => {
                let (a, b, c) = quadratic_coefficients(request)?;
                solve_quadratic(a, b, c).map(MathSimple::Quadratic)
            }
        }
    }

    fn detailed(request: &MathRequest) -> CalcResult<MathDetailed> {
        match request.mode {
            MathMode::Expression => {
                let (evaluation, angle_mode) = evaluate_request(request)?;
                let original = request.expression.as_deref().unwrap_or("").trim().to_string();
                let tokens = lexer::tokenize(&original)?;
                let value = evaluation.value;
                Ok(MathDetailed::Expression(Box::new(ExpressionDetailed {
                    simple: ExpressionResult {
                        result: number_value(value),
                        expression: evaluation.processed.clone(),
                        success: true,
                    },
                    analysis: analyse(&original, &tokens, value),
                    original_expression: original,
                    processed_expression: evaluation.processed,
                    result_type: if value.fract() == 0.0 { "int" } else { "float" },
                    scientific_notation: scientific(value, request.precision),
                    angle_mode: angle_mode.as_str(),
                    precision: request.precision,
                    alternative_forms: alternative_forms(value),
                })))
            }
            MathMode::Statistics => {
                let numbers = request.numbers.as_deref().unwrap_or(&[]);
                let stats = statistics(numbers)?;
                let cv = if stats.mean == 0.0 {
                    None
                } else {
                    Some(round_dp(stats.standard_deviation / stats.mean.abs() * 100.0, 2))
                };
                let spread = match cv {
                    Some(v) if v < 10.0 => "Low variability",
                    Some(v) if v < 30.0 => "Moderate variability",
                    Some(_) => "High variability",
                    None => "Centred on zero",
                };
                let mut sorted = numbers.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                Ok(MathDetailed::Statistics(StatisticsDetailed {
                    stats,
                    coefficient_of_variation: cv,
                    sorted,
                    spread,
                }))
            }
            MathMode::Quadratic => {
                let (a, b, c) = quadratic_coefficients(request)?;
                let solution = solve_quadratic(a, b, c)?;
                let axis = -b / (2.0 * a);
                let vertex_y = a * axis * axis + b * axis + c;
                Ok(MathDetailed::Quadratic(QuadraticDetailed {
                    solution,
                    equation: format!(
                        "{}x² + {}x + {} = 0",
                        expression::format_number(a),
                        expression::format_number(b),
                        expression::format_number(c)
                    ),
                    vertex: (round_dp(axis + 0.0, 6), round_dp(vertex_y, 6)),
                    axis_of_symmetry: round_dp(axis + 0.0, 6),
                    y_intercept: c,
                    opens: if a > 0.0 { "upward" } else { "downward" },
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_expr(input: &str) -> ExpressionResult {
        match MathCalculator::simple(&MathRequest::expression(input)).unwrap() {
            MathSimple::Expression(r) => r,
            other => panic!("expected expression result, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_expression_shape() {
        let r = simple_expr("2(3+4)");
        assert_eq!(r.result, json!(14));
        assert_eq!(r.expression, "2*(3+4)");
        assert!(r.success);

        let r = simple_expr("1/4");
        assert_eq!(r.result, json!(0.25));
    }

    #[test]
    fn test_oversized_expressions_fail_cleanly() {
        let nested = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let err = MathCalculator::simple(&MathRequest::expression(&nested)).unwrap_err();
        assert_eq!(err.kind(), "validation");

        let chain = format!("1{}", "+1".repeat(100_000));
        let err = crate::run_calculator(crate::CalculatorKind::Math, &json!({"expression": chain})).unwrap_err();
        assert_eq!(err.kind(), "validation");

        // under the length cap but past the nesting limit
        let nested = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        let err = MathCalculator::simple(&MathRequest::expression(&nested)).unwrap_err();
        assert_eq!(err.kind(), "syntax");

        let chain = format!("1{}", "+1".repeat(450));
        match MathCalculator::simple(&MathRequest::expression(&chain)).unwrap() {
            MathSimple::Expression(r) => assert_eq!(r.result, json!(451)),
            other => panic!("expected expression result, got {:?}", other),
        }
    }

    #[test]
    fn test_radians_mode() {
        let req = MathRequest::expression("sin(pi/2)").in_radians();
        match MathCalculator::simple(&req).unwrap() {
            MathSimple::Expression(r) => assert_eq!(r.result.as_f64(), Some(1.0)),
            other => panic!("expected expression result, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_are_typed() {
        let err = MathCalculator::simple(&MathRequest::expression("1/0")).unwrap_err();
        assert_eq!(err.kind(), "division_by_zero");
        let err = MathCalculator::simple(&MathRequest::expression("   ")).unwrap_err();
        assert_eq!(err.kind(), "syntax");
        let mut req = MathRequest::expression("1+1");
        req.angle_mode = "gradians".to_string();
        assert_eq!(MathCalculator::simple(&req).unwrap_err().kind(), "unsupported_option");
    }

    #[test]
    fn test_detailed_expression() {
        let d = match MathCalculator::detailed(&MathRequest::expression("sin(30) + 2^3")).unwrap() {
            MathDetailed::Expression(d) => d,
            _ => panic!("expected expression detail"),
        };
        assert_eq!(d.simple.result, json!(8.5));
        assert!(d.analysis.contains_trigonometry);
        assert!(d.analysis.contains_exponent);
        assert_eq!(d.result_type, "float");
        assert_eq!(d.scientific_notation, "8.5000000000e+00");
        assert_eq!(d.alternative_forms.unwrap().fraction.as_deref(), Some("17/2"));
    }

    #[test]
    fn test_alternative_forms() {
        let forms = alternative_forms(255.0).unwrap();
        assert_eq!(forms.binary.as_deref(), Some("0b11111111"));
        assert_eq!(forms.octal.as_deref(), Some("0o377"));
        assert_eq!(forms.hexadecimal.as_deref(), Some("0xff"));
        assert_eq!(alternative_forms(-5.0).unwrap().binary.as_deref(), Some("-0b101"));

        let forms = alternative_forms(2.0 * PI).unwrap();
        assert_eq!(forms.in_terms_of_pi.as_deref(), Some("2π"));
        assert_eq!(limit_denominator(0.3333333333, 1000), (1, 3));
        assert_eq!(limit_denominator(-0.75, 1000), (-3, 4));
    }

    #[test]
    fn test_statistics() {
        let s = statistics(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.median, 4.5);
        assert_eq!(s.mode, vec![4.0]);
        assert_eq!(s.variance, 4.0);
        assert_eq!(s.standard_deviation, 2.0);
        assert_eq!(s.range, 7.0);
        assert!(statistics(&[]).is_err());

        let s = statistics(&[1.0, 2.0]).unwrap();
        assert_eq!(s.mode, vec![1.0, 2.0]);
    }

    #[test]
    fn test_quadratic() {
        let q = solve_quadratic(1.0, -3.0, 2.0).unwrap();
        assert_eq!(q.roots, vec![Root::Real(2.0), Root::Real(1.0)]);
        assert_eq!(q.kind, "Two real roots");

        let q = solve_quadratic(1.0, 2.0, 1.0).unwrap();
        assert_eq!(q.roots, vec![Root::Real(-1.0)]);

        let q = solve_quadratic(1.0, 2.0, 5.0).unwrap();
        assert_eq!(q.discriminant, -16.0);
        assert_eq!(q.roots[0], Root::Complex("-1 + 2i".to_string()));

        assert_eq!(solve_quadratic(0.0, 1.0, 1.0).unwrap_err().kind(), "validation");
        println!("✅ Quadratic solver test PASSED");
    }

    #[test]
    fn test_modes_through_json() {
        let out = crate::result::run_json::<MathCalculator>(&json!({
            "type": "statistics",
            "numbers": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(out["mean"], json!(2.0));

        let out = crate::result::run_json::<MathCalculator>(&json!({"expression": "2^10"})).unwrap();
        assert_eq!(out, json!({"result": 1024, "expression": "2^10", "success": true}));
    }
}
