// 📐 Shape Layer - Input Validation
// Validates calculator inputs against domain bounds before any formula runs

use crate::errors::{CalcError, CalcResult};
use chrono::NaiveDate;

/// Conversion factors applied right after validation
pub const CM_PER_INCH: f64 = 2.54;
pub const KG_PER_POUND: f64 = 0.453592;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str, context: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// VALIDATOR
// ============================================================================

/// Collects every violation for one calculator request.
///
/// Checks are chained; `finish()` fails with the first violation so callers
/// get a single message naming the field and the constraint.
pub struct Validator {
    context: String,
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new(context: &str) -> Self {
        Validator {
            context: context.to_string(),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message,
            context: self.context.clone(),
        });
    }

    /// Value must be a real number (no NaN / infinity)
    pub fn finite(mut self, field: &str, value: f64) -> Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number".to_string());
        }
        self
    }

    /// Inclusive range check
    pub fn range(mut self, field: &str, value: f64, min: f64, max: f64) -> Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number".to_string());
        } else if value < min || value > max {
            self.push(field, format!("must be between {} and {}, got {}", min, max, value));
        }
        self
    }

    /// Strictly greater than zero
    pub fn positive(mut self, field: &str, value: f64) -> Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number".to_string());
        } else if value <= 0.0 {
            self.push(field, format!("must be greater than zero, got {}", value));
        }
        self
    }

    pub fn non_negative(mut self, field: &str, value: f64) -> Self {
        if !value.is_finite() {
            self.push(field, "must be a finite number".to_string());
        } else if value < 0.0 {
            self.push(field, format!("cannot be negative, got {}", value));
        }
        self
    }

    pub fn at_most(mut self, field: &str, value: f64, max: f64) -> Self {
        if value > max {
            self.push(field, format!("must not exceed {}, got {}", max, value));
        }
        self
    }

    /// Arbitrary rule with a caller-supplied message
    pub fn check(mut self, condition: bool, field: &str, message: &str) -> Self {
        if !condition {
            self.push(field, message.to_string());
        }
        self
    }

    pub fn not_empty<T>(mut self, field: &str, items: &[T]) -> Self {
        if items.is_empty() {
            self.push(field, "must contain at least one entry".to_string());
        }
        self
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_result(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn finish(self) -> CalcResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(CalcError::Validation(first)),
        }
    }
}

// ============================================================================
// OPTION / DATE HELPERS
// ============================================================================

/// Normalise an enum-like string option and check it against an allow-list
pub fn require_one_of(field: &str, value: &str, allowed: &[&str]) -> CalcResult<String> {
    let normalized = value.trim().to_lowercase();
    if allowed.iter().any(|a| *a == normalized) {
        Ok(normalized)
    } else {
        Err(CalcError::unsupported(field, value))
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str, context: &str) -> CalcResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CalcError::Validation(ValidationError::new(
            field,
            &format!("invalid date '{}', expected YYYY-MM-DD", value),
            context,
        ))
    })
}

/// Reference date for date-dependent calculators (injectable for determinism)
pub fn reference_date(value: Option<&str>, context: &str) -> CalcResult<NaiveDate> {
    match value {
        Some(s) => parse_date("reference_date", s, context),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Unit system for body measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn name(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Height to centimetres (imperial input is inches)
    pub fn height_cm(&self, height: f64) -> f64 {
        match self {
            UnitSystem::Metric => height,
            UnitSystem::Imperial => height * CM_PER_INCH,
        }
    }

    /// Weight to kilograms (imperial input is pounds)
    pub fn weight_kg(&self, weight: f64) -> f64 {
        match self {
            UnitSystem::Metric => weight,
            UnitSystem::Imperial => weight * KG_PER_POUND,
        }
    }
}

/// `kg` / `lbs` weight unit used by the activity calculators
pub fn weight_to_kg(weight: f64, unit: &str) -> CalcResult<f64> {
    match unit.trim().to_lowercase().as_str() {
        "kg" | "" => Ok(weight),
        "lbs" | "lb" => Ok(weight * KG_PER_POUND),
        other => Err(CalcError::unsupported("weight_unit", other)),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_passes_in_range() {
        let result = Validator::new("bmi")
            .range("height", 170.0, 50.0, 300.0)
            .range("weight", 70.0, 20.0, 500.0)
            .finish();
        assert!(result.is_ok());
    }

    #[test]
    fn test_validator_reports_first_violation() {
        let result = Validator::new("bmi")
            .range("height", 10.0, 50.0, 300.0)
            .range("weight", 1000.0, 20.0, 500.0)
            .finish();

        match result {
            Err(CalcError::Validation(e)) => {
                assert_eq!(e.field, "height");
                assert_eq!(e.context, "bmi");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validator_collects_all() {
        let v = Validator::new("loan")
            .positive("amount", 0.0)
            .non_negative("rate", -1.0)
            .positive("duration", 5.0);
        assert_eq!(v.errors().len(), 2);
        assert!(v.into_result().is_err());
    }

    #[test]
    fn test_nan_is_rejected() {
        let result = Validator::new("bmi").range("height", f64::NAN, 50.0, 300.0).finish();
        assert!(result.is_err(), "NaN must never pass a range check");
    }

    #[test]
    fn test_require_one_of_normalises() {
        assert_eq!(require_one_of("gender", " Male ", &["male", "female"]).unwrap(), "male");
        assert!(require_one_of("gender", "other", &["male", "female"]).is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("dob", "2000-02-29", "age").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
        assert!(parse_date("dob", "29/02/2000", "age").is_err());
    }

    #[test]
    fn test_imperial_normalisation() {
        assert!((UnitSystem::Imperial.height_cm(10.0) - 25.4).abs() < 1e-9);
        assert!((UnitSystem::Imperial.weight_kg(100.0) - 45.3592).abs() < 1e-9);
        assert_eq!(UnitSystem::Metric.height_cm(170.0), 170.0);
    }
}
