// 🏠 Mortgage Calculator
// Monthly housing cost: principal & interest plus tax, insurance, PMI and HOA

use super::loan::price_reducing;
use crate::amortization::{totals, PeriodEntry, ScheduleRow};
use crate::errors::CalcResult;
use crate::result::Calculator;
use crate::rounding::{money, round_money, to_decimal};
use crate::validation::Validator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Front-end ratio used for the income recommendation (28%)
const HOUSING_INCOME_SHARE: Decimal = dec!(0.28);
const SCHEDULE_PREVIEW_MONTHS: usize = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct MortgageRequest {
    pub home_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    /// Years
    pub loan_term: u32,
    /// Annual
    #[serde(default)]
    pub property_tax: f64,
    /// Annual
    #[serde(default)]
    pub home_insurance: f64,
    /// Monthly
    #[serde(default)]
    pub pmi: f64,
    /// Monthly
    #[serde(default)]
    pub hoa_fees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageSimple {
    pub loan_amount: f64,
    pub monthly_principal_interest: f64,
    pub total_monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MortgageDetailed {
    #[serde(flatten)]
    pub simple: MortgageSimple,
    pub home_price: f64,
    pub down_payment: f64,
    pub down_payment_percent: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub monthly_property_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub monthly_hoa: f64,
    pub total_cost: f64,
    pub ltv_ratio: f64,
    pub recommended_income: f64,
    pub amortization_schedule: Vec<ScheduleRow>,
}

struct Costs {
    simple: MortgageSimple,
    monthly_tax: Decimal,
    monthly_insurance: Decimal,
    total_monthly: Decimal,
    ledger: Vec<PeriodEntry>,
}

fn costs(request: &MortgageRequest) -> CalcResult<Costs> {
    Validator::new(MortgageCalculator::NAME)
        .positive("home_price", request.home_price)
        .non_negative("down_payment", request.down_payment)
        .check(
            request.down_payment < request.home_price,
            "down_payment",
            "must be less than the home price",
        )
        .range("interest_rate", request.interest_rate, 0.0, 50.0)
        .range("loan_term", f64::from(request.loan_term), 1.0, 40.0)
        .non_negative("property_tax", request.property_tax)
        .non_negative("home_insurance", request.home_insurance)
        .non_negative("pmi", request.pmi)
        .non_negative("hoa_fees", request.hoa_fees)
        .finish()?;

    let loan_amount = request.home_price - request.down_payment;
    let loan = price_reducing(loan_amount, request.interest_rate, request.loan_term * 12, &[])?;

    let twelve = Decimal::from(12);
    let monthly_tax = to_decimal(request.property_tax).unwrap_or_default() / twelve;
    let monthly_insurance = to_decimal(request.home_insurance).unwrap_or_default() / twelve;
    let monthly_extras = to_decimal(request.pmi).unwrap_or_default()
        + to_decimal(request.hoa_fees).unwrap_or_default();
    let total_monthly = loan.emi + monthly_tax + monthly_insurance + monthly_extras;

    let ledger_totals = totals(&loan.ledger);

    Ok(Costs {
        simple: MortgageSimple {
            loan_amount: round_money(loan_amount),
            monthly_principal_interest: money(loan.emi),
            total_monthly_payment: money(total_monthly),
            total_interest: money(ledger_totals.interest),
            total_paid: money(ledger_totals.paid),
        },
        monthly_tax,
        monthly_insurance,
        total_monthly,
        ledger: loan.ledger,
    })
}

pub struct MortgageCalculator;

impl Calculator for MortgageCalculator {
    type Request = MortgageRequest;
    type Simple = MortgageSimple;
    type Detailed = MortgageDetailed;
    const NAME: &'static str = "mortgage";

    fn simple(request: &MortgageRequest) -> CalcResult<MortgageSimple> {
        costs(request).map(|c| c.simple)
    }

    fn detailed(request: &MortgageRequest) -> CalcResult<MortgageDetailed> {
        let c = costs(request)?;
        Ok(MortgageDetailed {
            home_price: request.home_price,
            down_payment: request.down_payment,
            down_payment_percent: round_money(request.down_payment / request.home_price * 100.0),
            interest_rate: request.interest_rate,
            loan_term_years: request.loan_term,
            monthly_property_tax: money(c.monthly_tax),
            monthly_insurance: money(c.monthly_insurance),
            monthly_pmi: round_money(request.pmi),
            monthly_hoa: round_money(request.hoa_fees),
            total_cost: round_money(c.simple.total_paid + request.down_payment),
            ltv_ratio: round_money(c.simple.loan_amount / request.home_price * 100.0),
            recommended_income: money(c.total_monthly / HOUSING_INCOME_SHARE),
            amortization_schedule: c
                .ledger
                .iter()
                .take(SCHEDULE_PREVIEW_MONTHS)
                .map(PeriodEntry::to_row)
                .collect(),
            simple: c.simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MortgageRequest {
        MortgageRequest {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            interest_rate: 6.0,
            loan_term: 30,
            property_tax: 4_800.0,
            home_insurance: 1_200.0,
            pmi: 0.0,
            hoa_fees: 50.0,
        }
    }

    #[test]
    fn test_monthly_payment_breakdown() {
        let result = MortgageCalculator::simple(&request()).unwrap();
        assert_eq!(result.loan_amount, 320_000.0);
        assert_eq!(result.monthly_principal_interest, 1918.56);
        // 1918.56 + 400 + 100 + 50
        assert_eq!(result.total_monthly_payment, 2468.56);
    }

    #[test]
    fn test_detailed_ratios() {
        let detailed = MortgageCalculator::detailed(&request()).unwrap();
        assert_eq!(detailed.down_payment_percent, 20.0);
        assert_eq!(detailed.ltv_ratio, 80.0);
        assert_eq!(detailed.amortization_schedule.len(), 12);
        assert_eq!(
            detailed.total_cost,
            round_money(detailed.simple.total_paid + 80_000.0)
        );
        assert!((detailed.recommended_income - 8816.29).abs() < 0.01);
    }

    #[test]
    fn test_down_payment_must_be_below_price() {
        let mut req = request();
        req.down_payment = 400_000.0;
        assert!(MortgageCalculator::simple(&req).is_err());
        req.down_payment = 0.0;
        req.loan_term = 0;
        assert!(MortgageCalculator::simple(&req).is_err());
    }
}
