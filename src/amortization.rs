// 📉 Amortization & Projection Engine
// Discrete-period ledger (Accumulating → PaidOff), rollups, break-even, growth projections
//
// The ledger is kept in Decimal cents: every row satisfies
//   principal + interest == payment
//   closing = opening - principal - extra   (never below zero)
// and on payoff Σ principal + Σ extra == original principal, exactly.

use crate::errors::{CalcError, CalcResult};
use crate::rounding::{money, round_dp, round_money, round_money_decimal, to_decimal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 40 years of monthly periods
pub const MAX_PERIODS: u32 = 480;

// ============================================================================
// LEDGER TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// Balance outstanding and periods remain
    Accumulating,
    /// Balance reached zero (terminal)
    PaidOff,
}

/// One ledger row. Generated once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodEntry {
    pub period_index: u32,
    pub opening_balance: Decimal,
    /// Scheduled payment actually applied (interest + principal)
    pub payment_amount: Decimal,
    pub interest_portion: Decimal,
    pub principal_portion: Decimal,
    pub extra_payment: Decimal,
    pub closing_balance: Decimal,
}

impl PeriodEntry {
    /// Payment shown to users: the scheduled payment plus any prepayment
    pub fn displayed_payment(&self) -> Decimal {
        self.payment_amount + self.extra_payment
    }

    /// Principal reduction including prepayment
    pub fn total_principal(&self) -> Decimal {
        self.principal_portion + self.extra_payment
    }

    pub fn state(&self) -> LedgerState {
        if self.closing_balance.is_zero() {
            LedgerState::PaidOff
        } else {
            LedgerState::Accumulating
        }
    }

    pub fn to_row(&self) -> ScheduleRow {
        ScheduleRow {
            month: self.period_index,
            emi: money(self.displayed_payment()),
            principal: money(self.total_principal()),
            interest: money(self.interest_portion),
            balance: money(self.closing_balance),
            prepayment: money(self.extra_payment),
        }
    }
}

/// JSON view of a ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub emi: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
    pub prepayment: f64,
}

/// One-time extra payment applied in full during `period`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prepayment {
    pub period: u32,
    pub amount: Decimal,
}

// ============================================================================
// PAYMENT FORMULA
// ============================================================================

/// Level payment `P·r·(1+r)^n / ((1+r)^n − 1)`; straight-line `P/n` when r = 0
pub fn level_payment(principal: f64, periodic_rate: f64, periods: u32) -> CalcResult<f64> {
    if periods == 0 {
        return Err(CalcError::division_by_zero("level payment (zero periods)"));
    }
    if periodic_rate == 0.0 {
        return Ok(principal / periods as f64);
    }
    let growth = (1.0 + periodic_rate).powi(periods as i32);
    let payment = principal * periodic_rate * growth / (growth - 1.0);
    crate::rounding::ensure_finite(payment, "level payment")
}

/// Monthly rate from an annual percentage, as Decimal
pub fn monthly_rate(annual_rate_percent: f64) -> Decimal {
    to_decimal(annual_rate_percent).unwrap_or_default() / Decimal::from(1200)
}

// ============================================================================
// LEDGER GENERATION
// ============================================================================

/// Walk the periods until the balance is paid off or the term ends.
///
/// The payment stays fixed after a prepayment (no re-amortization), so a
/// prepayment shortens the payoff instead of lowering later payments. The
/// final nominal period, or any period whose scheduled principal would
/// overshoot, pays exactly the remaining balance.
pub fn build_ledger(
    principal: Decimal,
    periodic_rate: Decimal,
    periods: u32,
    payment: Decimal,
    prepayments: &[Prepayment],
) -> CalcResult<Vec<PeriodEntry>> {
    if periods == 0 || periods > MAX_PERIODS {
        return Err(CalcError::Validation(crate::validation::ValidationError::new(
            "periods",
            &format!("must be between 1 and {}, got {}", MAX_PERIODS, periods),
            "amortization",
        )));
    }

    let mut ledger = Vec::with_capacity(periods as usize);
    let mut balance = principal;

    for period in 1..=periods {
        let opening = balance;
        let interest = round_money_decimal(opening * periodic_rate);

        let mut principal_part = (payment - interest).max(Decimal::ZERO);
        if principal_part >= opening || period == periods {
            principal_part = opening;
        }

        let scheduled_extra: Decimal = prepayments
            .iter()
            .filter(|p| p.period == period)
            .map(|p| p.amount)
            .sum();
        let extra = scheduled_extra
            .max(Decimal::ZERO)
            .min(opening - principal_part);

        let closing = (opening - principal_part - extra).max(Decimal::ZERO);

        let entry = PeriodEntry {
            period_index: period,
            opening_balance: opening,
            payment_amount: principal_part + interest,
            interest_portion: interest,
            principal_portion: principal_part,
            extra_payment: extra,
            closing_balance: closing,
        };
        let state = entry.state();
        ledger.push(entry);
        balance = closing;

        if state == LedgerState::PaidOff {
            break;
        }
    }

    Ok(ledger)
}

/// Fixed principal and interest every period (flat-rate loans)
pub fn build_flat_ledger(
    principal: Decimal,
    total_interest: Decimal,
    periods: u32,
) -> CalcResult<Vec<PeriodEntry>> {
    if periods == 0 || periods > MAX_PERIODS {
        return Err(CalcError::division_by_zero("flat ledger (invalid period count)"));
    }
    let n = Decimal::from(periods);
    let principal_each = round_money_decimal(principal / n);
    let interest_each = round_money_decimal(total_interest / n);

    let mut ledger = Vec::with_capacity(periods as usize);
    let mut balance = principal;
    let mut interest_left = total_interest;

    for period in 1..=periods {
        let opening = balance;
        let (principal_part, interest) = if period == periods {
            (opening, interest_left)
        } else {
            (principal_each.min(opening), interest_each)
        };
        let closing = (opening - principal_part).max(Decimal::ZERO);
        ledger.push(PeriodEntry {
            period_index: period,
            opening_balance: opening,
            payment_amount: principal_part + interest,
            interest_portion: interest,
            principal_portion: principal_part,
            extra_payment: Decimal::ZERO,
            closing_balance: closing,
        });
        balance = closing;
        interest_left -= interest;
    }

    Ok(ledger)
}

// ============================================================================
// LEDGER SUMMARIES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTotals {
    pub interest: Decimal,
    pub principal: Decimal,
    pub extra: Decimal,
    pub paid: Decimal,
}

pub fn totals(ledger: &[PeriodEntry]) -> LedgerTotals {
    let mut t = LedgerTotals {
        interest: Decimal::ZERO,
        principal: Decimal::ZERO,
        extra: Decimal::ZERO,
        paid: Decimal::ZERO,
    };
    for entry in ledger {
        t.interest += entry.interest_portion;
        t.principal += entry.principal_portion;
        t.extra += entry.extra_payment;
        t.paid += entry.displayed_payment();
    }
    t
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRollup {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub total_paid: f64,
    pub ending_balance: f64,
}

/// Consecutive 12-period groups; the last group may be partial
pub fn yearly_rollups(ledger: &[PeriodEntry]) -> Vec<YearlyRollup> {
    ledger
        .chunks(12)
        .enumerate()
        .map(|(i, group)| {
            let principal: Decimal = group.iter().map(|e| e.total_principal()).sum();
            let interest: Decimal = group.iter().map(|e| e.interest_portion).sum();
            let paid: Decimal = group.iter().map(|e| e.displayed_payment()).sum();
            let ending = group
                .last()
                .map(|e| e.closing_balance)
                .unwrap_or(Decimal::ZERO);
            YearlyRollup {
                year: i as u32 + 1,
                principal_paid: money(principal),
                interest_paid: money(interest),
                total_paid: money(paid),
                ending_balance: money(ending),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    pub break_even_month: u32,
    pub break_even_year: f64,
    pub reached: bool,
    pub message: String,
}

/// First period where cumulative principal exceeds cumulative interest;
/// the nominal term when that never happens.
pub fn break_even(ledger: &[PeriodEntry], nominal_periods: u32) -> BreakEven {
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;
    let mut found = None;

    for entry in ledger {
        cumulative_principal += entry.total_principal();
        cumulative_interest += entry.interest_portion;
        if cumulative_principal > cumulative_interest {
            found = Some(entry.period_index);
            break;
        }
    }

    let month = found.unwrap_or(nominal_periods);
    BreakEven {
        break_even_month: month,
        break_even_year: round_dp(month as f64 / 12.0, 1),
        reached: found.is_some(),
        message: format!(
            "Principal paid exceeds interest paid after {} months",
            month
        ),
    }
}

// ============================================================================
// PROJECTION HELPERS (compounding)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContributionTiming {
    /// Annuity due
    Start,
    /// Ordinary annuity
    #[default]
    End,
}

impl ContributionTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionTiming::Start => "start",
            ContributionTiming::End => "end",
        }
    }
}

/// Future value split into its parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FutureValue {
    pub principal_growth: f64,
    pub contribution_growth: f64,
    pub total_contributions: f64,
}

impl FutureValue {
    pub fn total(&self) -> f64 {
        self.principal_growth + self.contribution_growth
    }

    /// Growth above everything paid in
    pub fn interest(&self, principal: f64) -> f64 {
        self.total() - principal - self.total_contributions
    }
}

/// `P(1+r/n)^(nt)` plus the annuity value of `monthly×12/n` per period
pub fn future_value(
    principal: f64,
    annual_rate_percent: f64,
    frequency: u32,
    years: f64,
    monthly_contribution: f64,
    timing: ContributionTiming,
) -> FutureValue {
    let r = annual_rate_percent / 100.0;
    let n = frequency as f64;
    let periodic = r / n;
    let total_periods = n * years;

    let principal_growth = principal * (1.0 + periodic).powf(total_periods);

    let total_contributions = monthly_contribution * 12.0 * years;
    let contribution_growth = if monthly_contribution <= 0.0 {
        0.0
    } else if periodic == 0.0 {
        total_contributions
    } else {
        let per_period = monthly_contribution * 12.0 / n;
        let ordinary = per_period * (((1.0 + periodic).powf(total_periods) - 1.0) / periodic);
        match timing {
            ContributionTiming::End => ordinary,
            ContributionTiming::Start => ordinary * (1.0 + periodic),
        }
    };

    FutureValue {
        principal_growth,
        contribution_growth,
        total_contributions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthYear {
    pub year: u32,
    pub starting_balance: f64,
    pub contributions: f64,
    pub interest_earned: f64,
    pub ending_balance: f64,
    pub total_contributed: f64,
    pub total_interest: f64,
}

/// Month-stepped year-by-year growth table
pub fn growth_table(
    principal: f64,
    annual_rate_percent: f64,
    frequency: u32,
    years: u32,
    monthly_contribution: f64,
    timing: ContributionTiming,
) -> Vec<GrowthYear> {
    let r = annual_rate_percent / 100.0;
    let n = frequency as f64;
    let monthly_factor = (1.0 + r / n).powf(n / 12.0);

    let mut balance = principal;
    let mut total_contributed = principal;
    let mut table = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let start = balance;
        let year_contributions = monthly_contribution * 12.0;

        if monthly_contribution > 0.0 {
            for _ in 0..12 {
                if timing == ContributionTiming::Start {
                    balance += monthly_contribution;
                    total_contributed += monthly_contribution;
                }
                balance *= monthly_factor;
                if timing == ContributionTiming::End {
                    balance += monthly_contribution;
                    total_contributed += monthly_contribution;
                }
            }
        } else {
            balance *= (1.0 + r / n).powf(n);
        }

        table.push(GrowthYear {
            year,
            starting_balance: round_money(start),
            contributions: round_money(year_contributions),
            interest_earned: round_money(balance - start - year_contributions),
            ending_balance: round_money(balance),
            total_contributed: round_money(total_contributed),
            total_interest: round_money(balance - total_contributed),
        });
    }

    table
}

/// `((1 + r/n)^n − 1) × 100`
pub fn effective_annual_rate(annual_rate_percent: f64, frequency: u32) -> f64 {
    let r = annual_rate_percent / 100.0;
    let n = frequency as f64;
    ((1.0 + r / n).powf(n) - 1.0) * 100.0
}

/// Years to double: `ln 2 / (n · ln(1 + r/n))`; None at a zero rate
pub fn doubling_time(annual_rate_percent: f64, frequency: u32) -> Option<f64> {
    if annual_rate_percent <= 0.0 {
        return None;
    }
    let r = annual_rate_percent / 100.0;
    let n = frequency as f64;
    Some(std::f64::consts::LN_2 / (n * (1.0 + r / n).ln()))
}

pub fn rule_of_72(annual_rate_percent: f64) -> Option<f64> {
    if annual_rate_percent > 0.0 {
        Some(72.0 / annual_rate_percent)
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_ledger() -> Vec<PeriodEntry> {
        let rate = monthly_rate(10.0);
        let emi = level_payment(100_000.0, 10.0 / 1200.0, 60).unwrap();
        let payment = round_money_decimal(to_decimal(emi).unwrap());
        build_ledger(dec!(100000), rate, 60, payment, &[]).unwrap()
    }

    #[test]
    fn test_level_payment_reference_loan() {
        let emi = level_payment(100_000.0, 10.0 / 1200.0, 60).unwrap();
        assert_eq!(round_money(emi), 2124.70);
    }

    #[test]
    fn test_zero_rate_uses_straight_line() {
        let payment = level_payment(12_000.0, 0.0, 12).unwrap();
        assert_eq!(payment, 1000.0);

        let ledger = build_ledger(dec!(12000), Decimal::ZERO, 12, dec!(1000), &[]).unwrap();
        assert_eq!(ledger.len(), 12);
        assert!(ledger.iter().all(|e| e.interest_portion.is_zero()));
        assert_eq!(ledger.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_reference_ledger_shape() {
        let ledger = standard_ledger();
        assert_eq!(ledger.len(), 60, "60 monthly rows expected");
        assert_eq!(ledger.last().unwrap().closing_balance, Decimal::ZERO);

        let t = totals(&ledger);
        let interest = money(t.interest);
        assert!(
            (interest - 27482.0).abs() <= 0.5,
            "total interest {} should be ≈ 27482.0",
            interest
        );
    }

    #[test]
    fn test_conservation() {
        let ledger = standard_ledger();
        let t = totals(&ledger);
        assert_eq!(t.principal + t.extra, dec!(100000), "principal must be fully conserved");

        for e in &ledger {
            assert_eq!(
                e.principal_portion + e.interest_portion,
                e.payment_amount,
                "period {} must balance",
                e.period_index
            );
            assert_eq!(
                e.closing_balance,
                e.opening_balance - e.principal_portion - e.extra_payment
            );
        }
        println!("✅ Ledger conservation test PASSED");
    }

    #[test]
    fn test_prepayment_shortens_without_reamortizing() {
        let rate = monthly_rate(10.0);
        let payment = dec!(2124.70);
        let prepay = [Prepayment { period: 12, amount: dec!(20000) }];
        let ledger = build_ledger(dec!(100000), rate, 60, payment, &prepay).unwrap();

        assert!(ledger.len() < 60, "prepayment should shorten payoff, got {}", ledger.len());
        assert_eq!(ledger[11].extra_payment, dec!(20000));
        assert_eq!(ledger[11].displayed_payment(), ledger[11].payment_amount + dec!(20000));
        // Payment after the prepayment is unchanged
        assert_eq!(ledger[12].payment_amount, payment);

        let t = totals(&ledger);
        assert_eq!(t.principal + t.extra, dec!(100000));
        assert_eq!(ledger.last().unwrap().state(), LedgerState::PaidOff);
    }

    #[test]
    fn test_oversized_prepayment_is_clamped() {
        let rate = monthly_rate(5.0);
        let prepay = [Prepayment { period: 2, amount: dec!(1000000) }];
        let ledger = build_ledger(dec!(10000), rate, 24, dec!(438.71), &prepay).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].closing_balance, Decimal::ZERO);
        let t = totals(&ledger);
        assert_eq!(t.principal + t.extra, dec!(10000));
    }

    #[test]
    fn test_flat_ledger_conserves() {
        let ledger = build_flat_ledger(dec!(10000), dec!(1000), 7).unwrap();
        let t = totals(&ledger);
        assert_eq!(t.principal, dec!(10000));
        assert_eq!(t.interest, dec!(1000));
        assert_eq!(ledger.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_yearly_rollups_partition() {
        let ledger = standard_ledger();
        let years = yearly_rollups(&ledger);
        assert_eq!(years.len(), 5);
        assert_eq!(years[4].ending_balance, 0.0);
        assert_eq!(years[0].ending_balance, money(ledger[11].closing_balance));

        let partial = &ledger[..30];
        let rollups = yearly_rollups(partial);
        assert_eq!(rollups.len(), 3, "30 periods → 2 full years + 1 partial");
    }

    #[test]
    fn test_break_even() {
        let ledger = standard_ledger();
        let be = break_even(&ledger, 60);
        assert!(be.reached);
        assert!(be.break_even_month >= 1 && be.break_even_month <= 60);

        // Cumulative principal must not exceed interest before the break-even month
        let mut p = Decimal::ZERO;
        let mut i = Decimal::ZERO;
        for e in &ledger[..(be.break_even_month as usize - 1)] {
            p += e.total_principal();
            i += e.interest_portion;
            assert!(p <= i);
        }
    }

    #[test]
    fn test_break_even_defaults_to_term() {
        let be = break_even(&[], 360);
        assert!(!be.reached);
        assert_eq!(be.break_even_month, 360);
        assert_eq!(be.break_even_year, 30.0);
    }

    #[test]
    fn test_future_value_reference() {
        let fv = future_value(1000.0, 5.0, 1, 10.0, 0.0, ContributionTiming::End);
        assert_eq!(round_money(fv.total()), 1628.89);
    }

    #[test]
    fn test_zero_rate_contributions_sum_linearly() {
        let fv = future_value(1000.0, 0.0, 12, 2.0, 100.0, ContributionTiming::Start);
        assert_eq!(fv.total(), 1000.0 + 2400.0);
        assert_eq!(fv.interest(1000.0), 0.0);
    }

    #[test]
    fn test_annuity_due_exceeds_ordinary() {
        let ordinary = future_value(0.0, 6.0, 12, 5.0, 100.0, ContributionTiming::End);
        let due = future_value(0.0, 6.0, 12, 5.0, 100.0, ContributionTiming::Start);
        assert!(due.total() > ordinary.total());
    }

    #[test]
    fn test_growth_table_matches_closed_form_without_contributions() {
        let table = growth_table(1000.0, 5.0, 1, 10, 0.0, ContributionTiming::End);
        assert_eq!(table.len(), 10);
        assert_eq!(table[9].ending_balance, 1628.89);
        assert_eq!(table[0].ending_balance, 1050.0);
    }

    #[test]
    fn test_effective_rate_and_doubling() {
        assert!((effective_annual_rate(12.0, 12) - 12.6825).abs() < 1e-3);
        assert!(doubling_time(0.0, 12).is_none());
        let years = doubling_time(7.2, 1).unwrap();
        assert!((years - 10.0).abs() < 0.5);
        assert_eq!(rule_of_72(8.0), Some(9.0));
    }
}
