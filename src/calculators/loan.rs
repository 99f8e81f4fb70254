// 🏦 Loan EMI Calculator
// Reducing-balance and flat-rate loans with a full amortization ledger

use crate::amortization::{
    break_even, build_flat_ledger, build_ledger, level_payment, monthly_rate, totals, yearly_rollups,
    BreakEven, PeriodEntry, Prepayment, ScheduleRow, YearlyRollup,
};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{money, round_money, round_money_decimal, to_decimal, to_f64};
use crate::validation::Validator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_LOAN_AMOUNT: f64 = 100_000_000.0;
pub const MAX_LOAN_RATE: f64 = 50.0;
pub const MAX_LOAN_YEARS: f64 = 40.0;

/// Share of monthly income an EMI should stay under
const AFFORDABLE_EMI_SHARE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanType {
    Reducing,
    Flat,
}

impl LoanType {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "reducing" | "" => Ok(LoanType::Reducing),
            "flat" => Ok(LoanType::Flat),
            _ => Err(CalcError::unsupported("loan_type", value)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanType::Reducing => "Reducing Balance",
            LoanType::Flat => "Flat Rate",
        }
    }
}

fn default_loan_type() -> String {
    "reducing".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoanRequest {
    pub amount: f64,
    pub rate: f64,
    /// Years
    pub duration: f64,
    #[serde(default = "default_loan_type")]
    pub loan_type: String,
    #[serde(default)]
    pub prepayment: Option<f64>,
    #[serde(default)]
    pub prepayment_month: Option<u32>,
}

impl LoanRequest {
    pub fn new(amount: f64, rate: f64, duration: f64) -> Self {
        LoanRequest {
            amount,
            rate,
            duration,
            loan_type: default_loan_type(),
            prepayment: None,
            prepayment_month: None,
        }
    }

    pub fn with_loan_type(mut self, loan_type: &str) -> Self {
        self.loan_type = loan_type.to_string();
        self
    }

    pub fn with_prepayment(mut self, amount: f64, month: u32) -> Self {
        self.prepayment = Some(amount);
        self.prepayment_month = Some(month);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSimple {
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub principal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    pub recommended_monthly_income: f64,
    pub recommended_annual_income: f64,
    pub emi_to_income_ratio: String,
    pub note: String,
    pub loan_to_value_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBreakdown {
    pub principal: f64,
    pub interest: f64,
    pub principal_percentage: f64,
    pub interest_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanDetailed {
    #[serde(flatten)]
    pub simple: LoanSimple,
    pub loan_type: &'static str,
    pub monthly_payment: f64,
    pub interest_rate: f64,
    pub duration_years: f64,
    pub duration_months: u32,
    pub actual_months_to_payoff: u32,
    pub interest_to_principal_ratio: f64,
    pub amortization_schedule: Vec<ScheduleRow>,
    pub yearly_summary: Vec<YearlyRollup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_even_analysis: Option<BreakEven>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affordability_metrics: Option<Affordability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_month_breakdown: Option<MonthBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_month_breakdown: Option<MonthBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

// ============================================================================
// LEDGER CONSTRUCTION
// ============================================================================

/// A priced loan: the level payment and the ledger it produces
pub struct PricedLoan {
    pub loan_type: LoanType,
    pub principal: Decimal,
    pub emi: Decimal,
    pub months: u32,
    pub ledger: Vec<PeriodEntry>,
}

impl PricedLoan {
    pub fn total_interest(&self) -> Decimal {
        totals(&self.ledger).interest
    }
}

fn validate(request: &LoanRequest) -> CalcResult<u32> {
    Validator::new(LoanCalculator::NAME)
        .positive("amount", request.amount)
        .at_most("amount", request.amount, MAX_LOAN_AMOUNT)
        .non_negative("rate", request.rate)
        .at_most("rate", request.rate, MAX_LOAN_RATE)
        .positive("duration", request.duration)
        .at_most("duration", request.duration, MAX_LOAN_YEARS)
        .finish()?;

    let months = (request.duration * 12.0).floor() as u32;
    Validator::new(LoanCalculator::NAME)
        .check(months >= 1, "duration", "must cover at least one month")
        .finish()?;

    if let Some(amount) = request.prepayment {
        Validator::new(LoanCalculator::NAME)
            .non_negative("prepayment", amount)
            .check(
                matches!(request.prepayment_month, Some(m) if m >= 1 && m <= months),
                "prepayment_month",
                "must fall within the loan term",
            )
            .finish()?;
    }
    Ok(months)
}

fn decimal(value: f64, field: &str) -> CalcResult<Decimal> {
    to_decimal(value).ok_or_else(|| CalcError::NotANumber {
        context: field.to_string(),
    })
}

/// Price a reducing-balance loan of `months` periods
pub fn price_reducing(
    amount: f64,
    rate: f64,
    months: u32,
    prepayments: &[Prepayment],
) -> CalcResult<PricedLoan> {
    let principal = decimal(amount, "amount")?;
    let emi = round_money_decimal(decimal(
        level_payment(amount, rate / 1200.0, months)?,
        "emi",
    )?);
    let ledger = build_ledger(principal, monthly_rate(rate), months, emi, prepayments)?;
    Ok(PricedLoan {
        loan_type: LoanType::Reducing,
        principal,
        emi,
        months,
        ledger,
    })
}

/// Price a flat-rate loan: interest on the original principal for the whole term
pub fn price_flat(amount: f64, rate: f64, years: f64, months: u32) -> CalcResult<PricedLoan> {
    let principal = decimal(amount, "amount")?;
    let total_interest =
        round_money_decimal(principal * decimal(rate, "rate")? / Decimal::from(100) * decimal(years, "duration")?);
    let emi = round_money_decimal((principal + total_interest) / Decimal::from(months));
    let ledger = build_flat_ledger(principal, total_interest, months)?;
    Ok(PricedLoan {
        loan_type: LoanType::Flat,
        principal,
        emi,
        months,
        ledger,
    })
}

fn price(request: &LoanRequest) -> CalcResult<PricedLoan> {
    let months = validate(request)?;
    match LoanType::parse(&request.loan_type)? {
        LoanType::Flat => price_flat(request.amount, request.rate, request.duration, months),
        LoanType::Reducing => {
            let prepayments = match (request.prepayment, request.prepayment_month) {
                (Some(amount), Some(period)) if amount > 0.0 => vec![Prepayment {
                    period,
                    amount: decimal(amount, "prepayment")?,
                }],
                _ => Vec::new(),
            };
            price_reducing(request.amount, request.rate, months, &prepayments)
        }
    }
}

fn month_breakdown(entry: &PeriodEntry, emi: f64) -> MonthBreakdown {
    let principal = money(entry.principal_portion);
    let interest = money(entry.interest_portion);
    MonthBreakdown {
        principal,
        interest,
        principal_percentage: round_money(principal / emi * 100.0),
        interest_percentage: round_money(interest / emi * 100.0),
    }
}

pub fn affordability(emi: f64) -> Affordability {
    let monthly_income = emi / AFFORDABLE_EMI_SHARE;
    Affordability {
        recommended_monthly_income: round_money(monthly_income),
        recommended_annual_income: round_money(monthly_income * 12.0),
        emi_to_income_ratio: "40%".to_string(),
        note: "EMI should ideally not exceed 40% of monthly income".to_string(),
        loan_to_value_info: "For home loans, LTV ratio typically ranges from 75-90%".to_string(),
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

pub struct LoanCalculator;

fn simple_of(loan: &PricedLoan) -> LoanSimple {
    let interest = loan.total_interest();
    LoanSimple {
        emi: money(loan.emi),
        total_interest: money(interest),
        total_payment: money(loan.principal + interest),
        principal: to_f64(loan.principal),
    }
}

impl Calculator for LoanCalculator {
    type Request = LoanRequest;
    type Simple = LoanSimple;
    type Detailed = LoanDetailed;
    const NAME: &'static str = "loan";

    fn simple(request: &LoanRequest) -> CalcResult<LoanSimple> {
        price(request).map(|loan| simple_of(&loan))
    }

    fn detailed(request: &LoanRequest) -> CalcResult<LoanDetailed> {
        let loan = price(request)?;
        let simple = simple_of(&loan);
        let emi = simple.emi;
        let ratio = round_money(simple.total_interest / simple.principal * 100.0);
        let reducing = loan.loan_type == LoanType::Reducing;

        Ok(LoanDetailed {
            loan_type: loan.loan_type.label(),
            monthly_payment: emi,
            interest_rate: request.rate,
            duration_years: request.duration,
            duration_months: loan.months,
            actual_months_to_payoff: loan.ledger.len() as u32,
            interest_to_principal_ratio: ratio,
            amortization_schedule: loan.ledger.iter().map(PeriodEntry::to_row).collect(),
            yearly_summary: yearly_rollups(&loan.ledger),
            break_even_analysis: reducing.then(|| break_even(&loan.ledger, loan.months)),
            affordability_metrics: reducing.then(|| affordability(emi)),
            first_month_breakdown: loan
                .ledger
                .first()
                .filter(|_| reducing)
                .map(|e| month_breakdown(e, emi)),
            last_month_breakdown: loan
                .ledger
                .last()
                .filter(|_| reducing)
                .map(|e| month_breakdown(e, emi)),
            note: (!reducing)
                .then_some("Flat rate loans have equal interest payments throughout the loan term"),
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_reducing_loan() {
        let result = LoanCalculator::simple(&LoanRequest::new(100_000.0, 10.0, 5.0)).unwrap();
        assert_eq!(result.emi, 2124.70);
        assert!(
            (result.total_interest - 27482.0).abs() <= 0.5,
            "total interest {} outside tolerance",
            result.total_interest
        );
        assert_eq!(result.total_payment, round_money(100_000.0 + result.total_interest));
        assert_eq!(result.principal, 100_000.0);
        println!("✅ Reference loan test PASSED");
    }

    #[test]
    fn test_reference_ledger_rows() {
        let detailed = LoanCalculator::detailed(&LoanRequest::new(100_000.0, 10.0, 5.0)).unwrap();
        assert_eq!(detailed.amortization_schedule.len(), 60);
        assert_eq!(detailed.amortization_schedule.last().unwrap().balance, 0.0);
        assert_eq!(detailed.duration_months, 60);
        assert_eq!(detailed.yearly_summary.len(), 5);
        assert_eq!(detailed.loan_type, "Reducing Balance");
        let first = detailed.first_month_breakdown.unwrap();
        // 100000 × 10/1200
        assert_eq!(first.interest, 833.33);
        assert_eq!(detailed.affordability_metrics.unwrap().recommended_monthly_income, 5311.75);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let result = LoanCalculator::simple(&LoanRequest::new(12_000.0, 0.0, 1.0)).unwrap();
        assert_eq!(result.emi, 1000.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_flat_rate_loan() {
        let req = LoanRequest::new(100_000.0, 10.0, 5.0).with_loan_type("flat");
        let detailed = LoanCalculator::detailed(&req).unwrap();
        assert_eq!(detailed.simple.total_interest, 50_000.0);
        assert_eq!(detailed.simple.emi, 2500.0);
        assert_eq!(detailed.simple.total_payment, 150_000.0);
        assert!(detailed.note.is_some());
        assert!(detailed.break_even_analysis.is_none());
    }

    #[test]
    fn test_prepayment_shortens_term() {
        let base = LoanCalculator::detailed(&LoanRequest::new(100_000.0, 10.0, 5.0)).unwrap();
        let req = LoanRequest::new(100_000.0, 10.0, 5.0).with_prepayment(20_000.0, 12);
        let prepaid = LoanCalculator::detailed(&req).unwrap();

        assert!(prepaid.actual_months_to_payoff < base.actual_months_to_payoff);
        assert!(prepaid.simple.total_interest < base.simple.total_interest);
        assert_eq!(prepaid.simple.emi, base.simple.emi, "no re-amortization");
        assert_eq!(prepaid.amortization_schedule[11].prepayment, 20_000.0);
    }

    #[test]
    fn test_interest_monotonic_in_rate() {
        let mut previous = -1.0;
        for rate in [0.0, 2.5, 5.0, 7.5, 10.0, 20.0] {
            let r = LoanCalculator::simple(&LoanRequest::new(250_000.0, rate, 20.0)).unwrap();
            assert!(r.total_interest >= previous, "interest fell at rate {}", rate);
            previous = r.total_interest;
        }
    }

    #[test]
    fn test_validation() {
        assert!(LoanCalculator::simple(&LoanRequest::new(0.0, 10.0, 5.0)).is_err());
        assert!(LoanCalculator::simple(&LoanRequest::new(1000.0, -1.0, 5.0)).is_err());
        assert!(LoanCalculator::simple(&LoanRequest::new(1000.0, 60.0, 5.0)).is_err());
        assert!(LoanCalculator::simple(&LoanRequest::new(1000.0, 10.0, 41.0)).is_err());
        assert!(LoanCalculator::simple(&LoanRequest::new(1000.0, 10.0, 0.05)).is_err());
        let req = LoanRequest::new(1000.0, 10.0, 1.0).with_prepayment(100.0, 13);
        assert!(LoanCalculator::simple(&req).is_err());
        let req = LoanRequest::new(1000.0, 10.0, 1.0).with_loan_type("balloon");
        assert!(matches!(
            LoanCalculator::simple(&req),
            Err(CalcError::UnsupportedOption { .. })
        ));
    }
}
