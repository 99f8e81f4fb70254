// 🚨 Error Taxonomy
// One error type for every calculator: validation, arithmetic, unsupported options, syntax

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Out-of-domain input, rejected before any computation
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Result is not a number in {context}")]
    NotANumber { context: String },

    #[error("Result is infinite in {context}")]
    Infinite { context: String },

    /// Unknown enum-like value (activity, currency code, unit, grade letter...)
    #[error("Unsupported {field}: '{value}'")]
    UnsupportedOption { field: String, value: String },

    /// Expression tokenizer / parser / name-resolution failures
    #[error("Invalid expression: {message}")]
    Syntax { message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CalcError {
    pub fn division_by_zero(context: &str) -> Self {
        CalcError::DivisionByZero {
            context: context.to_string(),
        }
    }

    pub fn unsupported(field: &str, value: &str) -> Self {
        CalcError::UnsupportedOption {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        CalcError::Syntax {
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used in logs and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Validation(_) => "validation",
            CalcError::DivisionByZero { .. } => "division_by_zero",
            CalcError::NotANumber { .. } => "not_a_number",
            CalcError::Infinite { .. } => "infinite",
            CalcError::UnsupportedOption { .. } => "unsupported_option",
            CalcError::Syntax { .. } => "syntax",
            CalcError::Storage(_) => "storage",
        }
    }
}

impl From<ValidationError> for CalcError {
    fn from(err: ValidationError) -> Self {
        CalcError::Validation(err)
    }
}

impl From<rusqlite::Error> for CalcError {
    fn from(err: rusqlite::Error) -> Self {
        CalcError::Storage(err.to_string())
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_names_field() {
        let err: CalcError = ValidationError::new("height", "must be between 50 and 300 cm", "bmi").into();
        let msg = err.to_string();
        assert!(msg.contains("height"), "message should name the field: {}", msg);
        assert!(msg.contains("50 and 300"), "message should name the constraint: {}", msg);
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_unsupported_option_display() {
        let err = CalcError::unsupported("currency", "XYZ");
        assert_eq!(err.to_string(), "Unsupported currency: 'XYZ'");
        assert_eq!(err.kind(), "unsupported_option");
    }
}
