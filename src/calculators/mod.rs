// 🗂️ Calculator Registry
// Every calculator by stable name and route, and JSON dispatch to each

pub mod age;
pub mod attendance;
pub mod bmi;
pub mod bmr;
pub mod body;
pub mod calorie;
pub mod calorie_burn;
pub mod compound_interest;
pub mod currency;
pub mod discount;
pub mod gpa;
pub mod grade;
pub mod loan;
pub mod macros;
pub mod math;
pub mod mortgage;
pub mod percentage;
pub mod pregnancy;
pub mod sleep;
pub mod units;
pub mod water_intake;

use crate::errors::{CalcError, CalcResult};
use crate::result::{run_json, Calculator};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

pub use age::AgeCalculator;
pub use attendance::AttendanceCalculator;
pub use bmi::BmiCalculator;
pub use bmr::BmrCalculator;
pub use calorie::CalorieCalculator;
pub use calorie_burn::CalorieBurnCalculator;
pub use compound_interest::CompoundInterestCalculator;
pub use currency::CurrencyCalculator;
pub use discount::DiscountCalculator;
pub use gpa::GpaCalculator;
pub use grade::GradeCalculator;
pub use loan::LoanCalculator;
pub use macros::MacrosCalculator;
pub use math::MathCalculator;
pub use mortgage::MortgageCalculator;
pub use percentage::PercentageCalculator;
pub use pregnancy::PregnancyCalculator;
pub use sleep::SleepCalculator;
pub use units::UnitCalculator;
pub use water_intake::WaterIntakeCalculator;

// ============================================================================
// CALCULATOR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculatorKind {
    Bmi,
    Bmr,
    Calorie,
    Macros,
    CalorieBurn,
    WaterIntake,
    Pregnancy,
    Sleep,
    Age,
    Loan,
    Mortgage,
    CompoundInterest,
    Discount,
    Currency,
    Gpa,
    Grade,
    Percentage,
    Attendance,
    Math,
    Units,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 20] = [
        CalculatorKind::Bmi,
        CalculatorKind::Bmr,
        CalculatorKind::Calorie,
        CalculatorKind::Macros,
        CalculatorKind::CalorieBurn,
        CalculatorKind::WaterIntake,
        CalculatorKind::Pregnancy,
        CalculatorKind::Sleep,
        CalculatorKind::Age,
        CalculatorKind::Loan,
        CalculatorKind::Mortgage,
        CalculatorKind::CompoundInterest,
        CalculatorKind::Discount,
        CalculatorKind::Currency,
        CalculatorKind::Gpa,
        CalculatorKind::Grade,
        CalculatorKind::Percentage,
        CalculatorKind::Attendance,
        CalculatorKind::Math,
        CalculatorKind::Units,
    ];

    /// Stable identifier, stored as the history `calculator_type`
    pub fn name(&self) -> &'static str {
        match self {
            CalculatorKind::Bmi => BmiCalculator::NAME,
            CalculatorKind::Bmr => BmrCalculator::NAME,
            CalculatorKind::Calorie => CalorieCalculator::NAME,
            CalculatorKind::Macros => MacrosCalculator::NAME,
            CalculatorKind::CalorieBurn => CalorieBurnCalculator::NAME,
            CalculatorKind::WaterIntake => WaterIntakeCalculator::NAME,
            CalculatorKind::Pregnancy => PregnancyCalculator::NAME,
            CalculatorKind::Sleep => SleepCalculator::NAME,
            CalculatorKind::Age => AgeCalculator::NAME,
            CalculatorKind::Loan => LoanCalculator::NAME,
            CalculatorKind::Mortgage => MortgageCalculator::NAME,
            CalculatorKind::CompoundInterest => CompoundInterestCalculator::NAME,
            CalculatorKind::Discount => DiscountCalculator::NAME,
            CalculatorKind::Currency => CurrencyCalculator::NAME,
            CalculatorKind::Gpa => GpaCalculator::NAME,
            CalculatorKind::Grade => GradeCalculator::NAME,
            CalculatorKind::Percentage => PercentageCalculator::NAME,
            CalculatorKind::Attendance => AttendanceCalculator::NAME,
            CalculatorKind::Math => MathCalculator::NAME,
            CalculatorKind::Units => UnitCalculator::NAME,
        }
    }

    /// URL segment under `/api/`
    pub fn route(&self) -> &'static str {
        match self {
            CalculatorKind::Bmi => "bmi",
            CalculatorKind::Bmr => "bmr",
            CalculatorKind::Calorie => "calorie",
            CalculatorKind::Macros => "macros",
            CalculatorKind::CalorieBurn => "calorie-burn",
            CalculatorKind::WaterIntake => "water-intake",
            CalculatorKind::Pregnancy => "pregnancy",
            CalculatorKind::Sleep => "sleep",
            CalculatorKind::Age => "age",
            CalculatorKind::Loan => "loan",
            CalculatorKind::Mortgage => "mortgage",
            CalculatorKind::CompoundInterest => "compound-interest",
            CalculatorKind::Discount => "discount",
            CalculatorKind::Currency => "currency-converter",
            CalculatorKind::Gpa => "gpa",
            CalculatorKind::Grade => "grade",
            CalculatorKind::Percentage => "percentage",
            CalculatorKind::Attendance => "attendance",
            CalculatorKind::Math => "math",
            CalculatorKind::Units => "unit-converter",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CalculatorKind::Bmi => "BMI Calculator",
            CalculatorKind::Bmr => "BMR Calculator",
            CalculatorKind::Calorie => "Calorie Calculator",
            CalculatorKind::Macros => "Macros Calculator",
            CalculatorKind::CalorieBurn => "Calorie Burn Calculator",
            CalculatorKind::WaterIntake => "Water Intake Calculator",
            CalculatorKind::Pregnancy => "Pregnancy Calculator",
            CalculatorKind::Sleep => "Sleep Calculator",
            CalculatorKind::Age => "Age Calculator",
            CalculatorKind::Loan => "Loan / EMI Calculator",
            CalculatorKind::Mortgage => "Mortgage Calculator",
            CalculatorKind::CompoundInterest => "Compound Interest Calculator",
            CalculatorKind::Discount => "Discount Calculator",
            CalculatorKind::Currency => "Currency Converter",
            CalculatorKind::Gpa => "GPA Calculator",
            CalculatorKind::Grade => "Grade Calculator",
            CalculatorKind::Percentage => "Percentage Calculator",
            CalculatorKind::Attendance => "Attendance Calculator",
            CalculatorKind::Math => "Math Calculator",
            CalculatorKind::Units => "Unit Converter",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            CalculatorKind::Bmi
            | CalculatorKind::Bmr
            | CalculatorKind::Calorie
            | CalculatorKind::Macros
            | CalculatorKind::CalorieBurn
            | CalculatorKind::WaterIntake
            | CalculatorKind::Pregnancy
            | CalculatorKind::Sleep => "health",
            CalculatorKind::Loan
            | CalculatorKind::Mortgage
            | CalculatorKind::CompoundInterest
            | CalculatorKind::Discount
            | CalculatorKind::Currency => "finance",
            CalculatorKind::Gpa | CalculatorKind::Grade | CalculatorKind::Percentage | CalculatorKind::Attendance => {
                "academic"
            }
            CalculatorKind::Age | CalculatorKind::Math | CalculatorKind::Units => "utility",
        }
    }

    /// Accepts the stable name or the route (`compound_interest` / `compound-interest`)
    pub fn parse(value: &str) -> CalcResult<Self> {
        let wanted = value.trim().to_lowercase();
        CalculatorKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == wanted || k.route() == wanted)
            .ok_or_else(|| CalcError::unsupported("calculator", value))
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Deserialize the body, run the calculator, serialize the chosen shape
pub fn run_calculator(kind: CalculatorKind, payload: &Value) -> CalcResult<Value> {
    debug!(calculator = kind.name(), "dispatching calculation");
    let result = match kind {
        CalculatorKind::Bmi => run_json::<BmiCalculator>(payload),
        CalculatorKind::Bmr => run_json::<BmrCalculator>(payload),
        CalculatorKind::Calorie => run_json::<CalorieCalculator>(payload),
        CalculatorKind::Macros => run_json::<MacrosCalculator>(payload),
        CalculatorKind::CalorieBurn => run_json::<CalorieBurnCalculator>(payload),
        CalculatorKind::WaterIntake => run_json::<WaterIntakeCalculator>(payload),
        CalculatorKind::Pregnancy => run_json::<PregnancyCalculator>(payload),
        CalculatorKind::Sleep => run_json::<SleepCalculator>(payload),
        CalculatorKind::Age => run_json::<AgeCalculator>(payload),
        CalculatorKind::Loan => run_json::<LoanCalculator>(payload),
        CalculatorKind::Mortgage => run_json::<MortgageCalculator>(payload),
        CalculatorKind::CompoundInterest => run_json::<CompoundInterestCalculator>(payload),
        CalculatorKind::Discount => run_json::<DiscountCalculator>(payload),
        CalculatorKind::Currency => run_json::<CurrencyCalculator>(payload),
        CalculatorKind::Gpa => run_json::<GpaCalculator>(payload),
        CalculatorKind::Grade => run_json::<GradeCalculator>(payload),
        CalculatorKind::Percentage => run_json::<PercentageCalculator>(payload),
        CalculatorKind::Attendance => run_json::<AttendanceCalculator>(payload),
        CalculatorKind::Math => run_json::<MathCalculator>(payload),
        CalculatorKind::Units => run_json::<UnitCalculator>(payload),
    };
    if let Err(ref err) = result {
        debug!(calculator = kind.name(), kind = err.kind(), "calculation rejected");
    }
    result
}

// ============================================================================
// LISTINGS
// ============================================================================

pub fn activity_listing() -> Value {
    let activities: Vec<Value> = calorie_burn::ACTIVITY_METS
        .iter()
        .map(|(key, a)| json!({"key": key, "name": a.name, "met": a.met}))
        .collect();
    json!({"success": true, "activities": activities})
}

pub fn currency_listing() -> Value {
    json!({"success": true, "currencies": currency::all_currencies()})
}

pub fn unit_category_listing() -> Value {
    json!({"success": true, "categories": units::all_categories()})
}

pub fn unit_listing(category: &str) -> CalcResult<Value> {
    let units = units::units_for(category)?;
    Ok(json!({"success": true, "category": category.trim().to_lowercase(), "units": units}))
}

pub fn sleep_tips_listing() -> Value {
    json!({"success": true, "tips": sleep::SLEEP_TIPS})
}

pub fn calculator_listing() -> Vec<Value> {
    CalculatorKind::ALL
        .iter()
        .map(|k| json!({"name": k.name(), "route": k.route(), "title": k.title(), "category": k.category()}))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_routes_are_unique() {
        let mut names: Vec<_> = CalculatorKind::ALL.iter().map(|k| k.name()).collect();
        let mut routes: Vec<_> = CalculatorKind::ALL.iter().map(|k| k.route()).collect();
        names.sort();
        names.dedup();
        routes.sort();
        routes.dedup();
        assert_eq!(names.len(), 20);
        assert_eq!(routes.len(), 20);
    }

    #[test]
    fn test_parse_by_name_or_route() {
        assert_eq!(CalculatorKind::parse("compound-interest").unwrap(), CalculatorKind::CompoundInterest);
        assert_eq!(CalculatorKind::parse("compound_interest").unwrap(), CalculatorKind::CompoundInterest);
        assert_eq!(CalculatorKind::parse("Unit-Converter").unwrap(), CalculatorKind::Units);
        assert_eq!(CalculatorKind::parse("lottery").unwrap_err().kind(), "unsupported_option");
    }

    #[test]
    fn test_dispatch_simple_and_detailed() {
        let simple = run_calculator(CalculatorKind::Math, &json!({"expression": "6*7"})).unwrap();
        assert_eq!(simple["result"], json!(42));

        let detailed = run_calculator(
            CalculatorKind::Units,
            &json!({"value": 100, "from_unit": "celsius", "to_unit": "fahrenheit", "category": "temperature", "detailed": true}),
        )
        .unwrap();
        assert_eq!(detailed["converted_value"], json!(212.0));
        assert!(detailed.get("equivalents").is_some());
    }

    #[test]
    fn test_dispatch_errors() {
        let err = run_calculator(CalculatorKind::Currency, &json!({"amount": 5, "from_currency": "USD", "to_currency": "ZZZ"}))
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_option");
        let err = run_calculator(CalculatorKind::Attendance, &json!({"attended": "x"})).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_listings() {
        assert_eq!(currency_listing()["currencies"].as_array().unwrap().len(), 24);
        assert_eq!(unit_listing("length").unwrap()["units"][0], json!("meter"));
        assert!(unit_listing("time").is_err());
        assert_eq!(sleep_tips_listing()["tips"].as_array().unwrap().len(), 10);
        assert_eq!(activity_listing()["activities"].as_array().unwrap().len(), 30);
        assert_eq!(calculator_listing().len(), 20);
    }
}
