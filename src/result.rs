// 🧩 Result Assembler
// Two typed result shapes per calculator: a stable simple shape and a detailed one

use crate::errors::{CalcError, CalcResult};
use crate::validation::ValidationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// MODE & OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Minimal, field-stable shape
    #[default]
    Simple,
    /// Simple fields plus classification, scenario tables and advice
    Detailed,
}

impl Mode {
    pub fn from_flag(detailed: bool) -> Self {
        if detailed {
            Mode::Detailed
        } else {
            Mode::Simple
        }
    }

    /// Read the `detailed` flag from a raw request body
    pub fn from_payload(payload: &Value) -> Self {
        Mode::from_flag(
            payload
                .get("detailed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Mode::Simple => "simple",
            Mode::Detailed => "detailed",
        }
    }
}

/// Serialises untagged: the caller sees exactly one of the two shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<S, D> {
    Simple(S),
    Detailed(D),
}

// ============================================================================
// CALCULATOR TRAIT
// ============================================================================

/// Calculator - one pure `(validated params) → result` function pair.
///
/// `simple` and `detailed` both validate first and never return a result
/// alongside an error.
pub trait Calculator {
    type Request: DeserializeOwned;
    type Simple: Serialize;
    type Detailed: Serialize;

    /// Stable identifier (history `calculator_type`)
    const NAME: &'static str;

    fn simple(request: &Self::Request) -> CalcResult<Self::Simple>;

    fn detailed(request: &Self::Request) -> CalcResult<Self::Detailed>;

    fn assemble(
        request: &Self::Request,
        mode: Mode,
    ) -> CalcResult<Outcome<Self::Simple, Self::Detailed>> {
        match mode {
            Mode::Simple => Self::simple(request).map(Outcome::Simple),
            Mode::Detailed => Self::detailed(request).map(Outcome::Detailed),
        }
    }
}

/// Deserialize a JSON body into the calculator's request type
pub fn parse_request<C: Calculator>(payload: &Value) -> CalcResult<C::Request> {
    serde_json::from_value(payload.clone()).map_err(|e| {
        CalcError::Validation(ValidationError::new("request", &e.to_string(), C::NAME))
    })
}

/// JSON in, JSON out, for transports
pub fn run_json<C: Calculator>(payload: &Value) -> CalcResult<Value> {
    let request = parse_request::<C>(payload)?;
    let outcome = C::assemble(&request, Mode::from_payload(payload))?;
    serde_json::to_value(outcome).map_err(|e| CalcError::syntax(e.to_string()))
}

/// Error body shared by every transport: `{success: false, message}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub kind: String,
}

impl From<&CalcError> for ErrorBody {
    fn from(err: &CalcError) -> Self {
        ErrorBody {
            success: false,
            message: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Doubler;

    #[derive(Deserialize)]
    struct DoubleRequest {
        value: f64,
    }

    #[derive(Serialize)]
    struct DoubleSimple {
        result: f64,
    }

    #[derive(Serialize)]
    struct DoubleDetailed {
        #[serde(flatten)]
        simple: DoubleSimple,
        note: &'static str,
    }

    impl Calculator for Doubler {
        type Request = DoubleRequest;
        type Simple = DoubleSimple;
        type Detailed = DoubleDetailed;
        const NAME: &'static str = "doubler";

        fn simple(request: &DoubleRequest) -> CalcResult<DoubleSimple> {
            if request.value < 0.0 {
                return Err(CalcError::unsupported("value", "negative"));
            }
            Ok(DoubleSimple { result: request.value * 2.0 })
        }

        fn detailed(request: &DoubleRequest) -> CalcResult<DoubleDetailed> {
            Ok(DoubleDetailed {
                simple: Self::simple(request)?,
                note: "doubled",
            })
        }
    }

    #[test]
    fn test_simple_shape_is_flat() {
        let out = run_json::<Doubler>(&json!({"value": 2.5})).unwrap();
        assert_eq!(out, json!({"result": 5.0}));
    }

    #[test]
    fn test_detailed_shape_extends_simple() {
        let out = run_json::<Doubler>(&json!({"value": 2.5, "detailed": true})).unwrap();
        assert_eq!(out["result"], json!(5.0));
        assert_eq!(out["note"], json!("doubled"));
    }

    #[test]
    fn test_bad_request_is_validation_error() {
        let err = run_json::<Doubler>(&json!({"value": "abc"})).unwrap_err();
        assert_eq!(err.kind(), "validation");
        let body = ErrorBody::from(&err);
        assert!(!body.success);
    }
}
