// 📈 Compound Interest Calculator
// Future value with periodic compounding, monthly contributions and inflation

use crate::amortization::{
    doubling_time, effective_annual_rate, future_value, growth_table, rule_of_72,
    ContributionTiming, GrowthYear,
};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{ensure_finite, round_dp, round_money};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

pub const FREQUENCIES: [u32; 6] = [1, 2, 4, 12, 52, 365];

pub fn frequency_name(frequency: u32) -> String {
    match frequency {
        1 => "Annually".to_string(),
        2 => "Semi-annually".to_string(),
        4 => "Quarterly".to_string(),
        12 => "Monthly".to_string(),
        52 => "Weekly".to_string(),
        365 => "Daily".to_string(),
        other => format!("{} times per year", other),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompoundInterestRequest {
    pub principal: f64,
    pub rate: f64,
    /// Years
    pub time: u32,
    pub frequency: u32,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default)]
    pub contribution_timing: ContributionTiming,
    #[serde(default)]
    pub inflation_rate: f64,
}

impl CompoundInterestRequest {
    pub fn new(principal: f64, rate: f64, time: u32, frequency: u32) -> Self {
        CompoundInterestRequest {
            principal,
            rate,
            time,
            frequency,
            monthly_contribution: 0.0,
            contribution_timing: ContributionTiming::End,
            inflation_rate: 0.0,
        }
    }

    pub fn with_contribution(mut self, monthly: f64, timing: ContributionTiming) -> Self {
        self.monthly_contribution = monthly;
        self.contribution_timing = timing;
        self
    }

    pub fn with_inflation(mut self, inflation_rate: f64) -> Self {
        self.inflation_rate = inflation_rate;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestSimple {
    pub principal: f64,
    pub rate: f64,
    pub time: u32,
    pub frequency: u32,
    pub compound_interest: f64,
    pub total_amount: f64,
    pub breakdown: Vec<GrowthYear>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentSummary {
    pub initial_principal: f64,
    pub total_contributions: f64,
    pub total_invested: f64,
    pub compound_interest_earned: f64,
    pub final_amount: f64,
    pub total_return_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestDetails {
    pub annual_rate: f64,
    pub effective_annual_rate: f64,
    pub compounding_frequency: String,
    pub compounds_per_year: u32,
    pub total_compounds: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributionDetails {
    pub monthly_contribution: f64,
    pub contribution_timing: &'static str,
    pub total_contributions: f64,
    pub contribution_growth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeAnalysis {
    pub investment_period_years: u32,
    pub investment_period_months: u32,
    /// None when the rate is zero (never doubles)
    pub doubling_time_years: Option<f64>,
    pub rule_of_72_estimate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RealReturns {
    Nominal {
        note: &'static str,
        nominal_return: f64,
    },
    Adjusted {
        nominal_final_amount: f64,
        inflation_rate: f64,
        inflation_adjusted_value: f64,
        purchasing_power_loss: f64,
        real_gain: f64,
        real_return_percentage: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestmentMetrics {
    pub roi_percentage: f64,
    pub cagr_percentage: f64,
    pub average_annual_return: f64,
    pub interest_to_principal_ratio: f64,
    pub final_to_initial_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyOption {
    pub name: &'static str,
    pub frequency: u32,
    pub final_amount: f64,
    pub interest_earned: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompoundInterestDetailed {
    #[serde(flatten)]
    pub simple: CompoundInterestSimple,
    pub investment_summary: InvestmentSummary,
    pub interest_details: InterestDetails,
    pub contribution_details: ContributionDetails,
    pub time_analysis: TimeAnalysis,
    pub real_returns: RealReturns,
    pub investment_metrics: InvestmentMetrics,
    pub frequency_comparison: Vec<FrequencyOption>,
    pub recommendations: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

struct Projection {
    total_amount: f64,
    interest: f64,
    contributions: f64,
    contribution_growth: f64,
}

fn validate(request: &CompoundInterestRequest) -> CalcResult<()> {
    Validator::new(CompoundInterestCalculator::NAME)
        .non_negative("principal", request.principal)
        .range("rate", request.rate, 0.0, 100.0)
        .range("time", f64::from(request.time), 1.0, 100.0)
        .non_negative("monthly_contribution", request.monthly_contribution)
        .range("inflation_rate", request.inflation_rate, 0.0, 100.0)
        .finish()?;
    if !FREQUENCIES.contains(&request.frequency) {
        return Err(CalcError::unsupported(
            "frequency",
            &request.frequency.to_string(),
        ));
    }
    Ok(())
}

fn project(request: &CompoundInterestRequest) -> CalcResult<Projection> {
    validate(request)?;
    let fv = future_value(
        request.principal,
        request.rate,
        request.frequency,
        f64::from(request.time),
        request.monthly_contribution,
        request.contribution_timing,
    );
    let total_amount = ensure_finite(fv.total(), "compound interest total")?;
    Ok(Projection {
        total_amount,
        interest: fv.interest(request.principal),
        contributions: fv.total_contributions,
        contribution_growth: fv.contribution_growth - fv.total_contributions,
    })
}

pub struct CompoundInterestCalculator;

impl Calculator for CompoundInterestCalculator {
    type Request = CompoundInterestRequest;
    type Simple = CompoundInterestSimple;
    type Detailed = CompoundInterestDetailed;
    const NAME: &'static str = "compound_interest";

    fn simple(request: &CompoundInterestRequest) -> CalcResult<CompoundInterestSimple> {
        let p = project(request)?;
        Ok(CompoundInterestSimple {
            principal: request.principal,
            rate: request.rate,
            time: request.time,
            frequency: request.frequency,
            compound_interest: round_money(p.interest),
            total_amount: round_money(p.total_amount),
            breakdown: growth_table(
                request.principal,
                request.rate,
                request.frequency,
                request.time,
                request.monthly_contribution,
                request.contribution_timing,
            ),
        })
    }

    fn detailed(request: &CompoundInterestRequest) -> CalcResult<CompoundInterestDetailed> {
        let simple = Self::simple(request)?;
        let p = project(request)?;
        let invested = request.principal + p.contributions;
        let years = f64::from(request.time);

        let ratio_or_zero = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };

        Ok(CompoundInterestDetailed {
            investment_summary: InvestmentSummary {
                initial_principal: round_money(request.principal),
                total_contributions: round_money(p.contributions),
                total_invested: round_money(invested),
                compound_interest_earned: round_money(p.interest),
                final_amount: round_money(p.total_amount),
                total_return_percentage: round_money(ratio_or_zero(p.interest, invested) * 100.0),
            },
            interest_details: InterestDetails {
                annual_rate: request.rate,
                effective_annual_rate: round_dp(
                    effective_annual_rate(request.rate, request.frequency),
                    4,
                ),
                compounding_frequency: frequency_name(request.frequency),
                compounds_per_year: request.frequency,
                total_compounds: request.frequency * request.time,
            },
            contribution_details: ContributionDetails {
                monthly_contribution: request.monthly_contribution,
                contribution_timing: request.contribution_timing.as_str(),
                total_contributions: round_money(p.contributions),
                contribution_growth: round_money(p.contribution_growth),
            },
            time_analysis: TimeAnalysis {
                investment_period_years: request.time,
                investment_period_months: request.time * 12,
                doubling_time_years: doubling_time(request.rate, request.frequency).map(round_money),
                rule_of_72_estimate: rule_of_72(request.rate).map(round_money),
            },
            real_returns: real_returns(p.total_amount, invested, request.inflation_rate, years),
            investment_metrics: InvestmentMetrics {
                roi_percentage: round_money(ratio_or_zero(p.interest, invested) * 100.0),
                cagr_percentage: if invested > 0.0 {
                    round_money(((p.total_amount / invested).powf(1.0 / years) - 1.0) * 100.0)
                } else {
                    0.0
                },
                average_annual_return: round_money(p.interest / years),
                interest_to_principal_ratio: round_money(ratio_or_zero(p.interest, request.principal)),
                final_to_initial_ratio: round_money(ratio_or_zero(p.total_amount, invested)),
            },
            frequency_comparison: compare_frequencies(request),
            recommendations: recommendations(request),
            notes: vec![
                "Compound interest is calculated on principal + accumulated interest",
                "More frequent compounding results in higher returns",
                "Regular contributions significantly boost long-term growth",
                "Past performance does not guarantee future results",
                "Consider taxes and fees in real-world scenarios",
            ],
            simple,
        })
    }
}

fn real_returns(final_amount: f64, invested: f64, inflation_rate: f64, years: f64) -> RealReturns {
    if inflation_rate == 0.0 {
        return RealReturns::Nominal {
            note: "No inflation rate provided",
            nominal_return: round_money(final_amount - invested),
        };
    }
    let real_value = final_amount / (1.0 + inflation_rate / 100.0).powf(years);
    let real_gain = real_value - invested;
    RealReturns::Adjusted {
        nominal_final_amount: round_money(final_amount),
        inflation_rate,
        inflation_adjusted_value: round_money(real_value),
        purchasing_power_loss: round_money(final_amount - real_value),
        real_gain: round_money(real_gain),
        real_return_percentage: if invested > 0.0 {
            round_money(real_gain / invested * 100.0)
        } else {
            0.0
        },
    }
}

fn compare_frequencies(request: &CompoundInterestRequest) -> Vec<FrequencyOption> {
    [
        ("annually", 1),
        ("semi_annually", 2),
        ("quarterly", 4),
        ("monthly", 12),
        ("daily", 365),
    ]
    .iter()
    .map(|&(name, frequency)| {
        let fv = future_value(
            request.principal,
            request.rate,
            frequency,
            f64::from(request.time),
            request.monthly_contribution,
            ContributionTiming::End,
        );
        FrequencyOption {
            name,
            frequency,
            final_amount: round_money(fv.total()),
            interest_earned: round_money(fv.interest(request.principal)),
        }
    })
    .collect()
}

fn recommendations(request: &CompoundInterestRequest) -> Vec<&'static str> {
    let mut recs = Vec::new();
    if request.monthly_contribution == 0.0 {
        recs.push("Consider adding regular monthly contributions to accelerate growth");
    }
    if request.rate < 5.0 {
        recs.push("Low interest rate - consider diversifying into higher-yield investments");
    } else if request.rate > 15.0 {
        recs.push("High return rate - ensure you understand the associated risks");
    }
    if request.time < 5 {
        recs.push("Short investment horizon - consider extending for better compound growth");
    } else if request.time >= 20 {
        recs.push("Long investment horizon - excellent for maximizing compound interest");
    }
    if request.principal < 10_000.0 && request.monthly_contribution > 0.0 {
        recs.push("Regular contributions are key - you're building wealth systematically");
    }
    recs.extend([
        "Start investing early to maximize compound interest benefits",
        "Reinvest dividends and interest for exponential growth",
        "Review and rebalance your portfolio annually",
        "Consider tax-advantaged accounts for better returns",
        "Diversify across different asset classes to manage risk",
    ]);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_annual_compounding() {
        let result =
            CompoundInterestCalculator::simple(&CompoundInterestRequest::new(1000.0, 5.0, 10, 1))
                .unwrap();
        assert_eq!(result.total_amount, 1628.89);
        assert_eq!(result.compound_interest, 628.89);
        assert_eq!(result.breakdown.len(), 10);
        assert_eq!(result.breakdown[9].ending_balance, 1628.89);
        println!("✅ Compound interest reference test PASSED");
    }

    #[test]
    fn test_zero_rate_with_contributions() {
        let req = CompoundInterestRequest::new(1000.0, 0.0, 2, 12)
            .with_contribution(100.0, ContributionTiming::End);
        let result = CompoundInterestCalculator::simple(&req).unwrap();
        assert_eq!(result.total_amount, 3400.0);
        assert_eq!(result.compound_interest, 0.0);
    }

    #[test]
    fn test_invalid_frequency() {
        let err = CompoundInterestCalculator::simple(&CompoundInterestRequest::new(1000.0, 5.0, 10, 3))
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_option");
    }

    #[test]
    fn test_detailed_sections() {
        let req = CompoundInterestRequest::new(10_000.0, 8.0, 20, 12)
            .with_contribution(200.0, ContributionTiming::Start)
            .with_inflation(3.0);
        let detailed = CompoundInterestCalculator::detailed(&req).unwrap();

        assert_eq!(detailed.interest_details.compounding_frequency, "Monthly");
        assert_eq!(detailed.interest_details.effective_annual_rate, 8.3);
        assert_eq!(detailed.frequency_comparison.len(), 5);
        assert!(matches!(detailed.real_returns, RealReturns::Adjusted { .. }));
        assert!(detailed
            .recommendations
            .contains(&"Long investment horizon - excellent for maximizing compound interest"));
        let daily = &detailed.frequency_comparison[4];
        let annual = &detailed.frequency_comparison[0];
        assert!(daily.final_amount > annual.final_amount);
    }

    #[test]
    fn test_no_inflation_note() {
        let detailed =
            CompoundInterestCalculator::detailed(&CompoundInterestRequest::new(1000.0, 0.0, 5, 1))
                .unwrap();
        assert!(matches!(detailed.real_returns, RealReturns::Nominal { .. }));
        assert!(detailed.time_analysis.doubling_time_years.is_none());
    }
}
