// 💱 Currency Converter
// Static USD-based rate table: convert, compare against several targets, list codes

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money, safe_div};
use crate::validation::Validator;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// (code, name, units per USD)
const RATES: [(&str, &str, f64); 24] = [
    ("USD", "US Dollar", 1.0),
    ("EUR", "Euro", 0.92),
    ("GBP", "British Pound", 0.79),
    ("JPY", "Japanese Yen", 149.50),
    ("CNY", "Chinese Yuan", 7.24),
    ("INR", "Indian Rupee", 83.12),
    ("AUD", "Australian Dollar", 1.52),
    ("CAD", "Canadian Dollar", 1.36),
    ("CHF", "Swiss Franc", 0.88),
    ("MXN", "Mexican Peso", 17.08),
    ("BRL", "Brazilian Real", 4.97),
    ("ZAR", "South African Rand", 18.65),
    ("RUB", "Russian Ruble", 92.50),
    ("KRW", "South Korean Won", 1310.50),
    ("SGD", "Singapore Dollar", 1.34),
    ("HKD", "Hong Kong Dollar", 7.82),
    ("NOK", "Norwegian Krone", 10.58),
    ("SEK", "Swedish Krona", 10.35),
    ("DKK", "Danish Krone", 6.86),
    ("NZD", "New Zealand Dollar", 1.63),
    ("AED", "UAE Dirham", 3.67),
    ("SAR", "Saudi Riyal", 3.75),
    ("THB", "Thai Baht", 35.20),
    ("MYR", "Malaysian Ringgit", 4.68),
];

static BY_CODE: Lazy<HashMap<&'static str, Currency>> = Lazy::new(|| {
    RATES
        .iter()
        .map(|&(code, name, per_usd)| (code, Currency { code, name, per_usd }))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    #[serde(rename = "rate")]
    pub per_usd: f64,
}

/// Case-insensitive code lookup
pub fn lookup_currency(code: &str) -> CalcResult<Currency> {
    BY_CODE
        .get(code.trim().to_uppercase().as_str())
        .copied()
        .ok_or_else(|| CalcError::unsupported("currency", code))
}

/// Every supported currency, in table order
pub fn all_currencies() -> Vec<Currency> {
    RATES
        .iter()
        .map(|&(code, name, per_usd)| Currency { code, name, per_usd })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub original_amount: f64,
    pub converted_amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub from_currency_name: String,
    pub to_currency_name: String,
    pub exchange_rate: f64,
    pub inverse_rate: f64,
}

/// Through USD: amount / from.rate × to.rate
pub fn convert(amount: f64, from: &str, to: &str) -> CalcResult<Conversion> {
    let from = lookup_currency(from)?;
    let to = lookup_currency(to)?;
    Validator::new(CurrencyCalculator::NAME).positive("amount", amount).finish()?;

    let in_usd = safe_div(amount, from.per_usd, "currency conversion")?;
    let rate = safe_div(to.per_usd, from.per_usd, "exchange rate")?;
    let inverse = safe_div(1.0, rate, "inverse rate")?;

    Ok(Conversion {
        original_amount: round_money(amount),
        converted_amount: round_money(in_usd * to.per_usd),
        from_currency: from.code.to_string(),
        to_currency: to.code.to_string(),
        from_currency_name: from.name.to_string(),
        to_currency_name: to.name.to_string(),
        exchange_rate: round_dp(rate, 6),
        inverse_rate: round_dp(inverse, 6),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub original_amount: f64,
    pub from_currency: String,
    pub conversions: Vec<Conversion>,
}

/// One conversion per target; any unknown target fails the whole comparison
pub fn compare(amount: f64, from: &str, targets: &[String]) -> CalcResult<Comparison> {
    let from_code = lookup_currency(from)?.code;
    let conversions = targets
        .iter()
        .map(|to| convert(amount, from, to))
        .collect::<CalcResult<Vec<_>>>()?;
    Ok(Comparison {
        original_amount: amount,
        from_currency: from_code.to_string(),
        conversions,
    })
}

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    /// Extra targets for the comparison table (detailed only)
    #[serde(default)]
    pub to_currencies: Vec<String>,
}

impl CurrencyRequest {
    pub fn new(amount: f64, from: &str, to: &str) -> Self {
        CurrencyRequest {
            amount,
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            to_currencies: Vec::new(),
        }
    }

    pub fn compared_with(mut self, targets: &[&str]) -> Self {
        self.to_currencies = targets.iter().map(|t| t.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickRate {
    pub amount: f64,
    pub converted: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyDetailed {
    #[serde(flatten)]
    pub simple: Conversion,
    pub quick_reference: Vec<QuickRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    pub notes: Vec<&'static str>,
}

pub struct CurrencyCalculator;

impl Calculator for CurrencyCalculator {
    type Request = CurrencyRequest;
    type Simple = Conversion;
    type Detailed = CurrencyDetailed;
    const NAME: &'static str = "currency_converter";

    fn simple(request: &CurrencyRequest) -> CalcResult<Conversion> {
        convert(request.amount, &request.from_currency, &request.to_currency)
    }

    fn detailed(request: &CurrencyRequest) -> CalcResult<CurrencyDetailed> {
        let simple = Self::simple(request)?;
        let quick_reference = [1.0, 10.0, 100.0, 1000.0]
            .iter()
            .map(|&amount| {
                convert(amount, &simple.from_currency, &simple.to_currency).map(|c| QuickRate {
                    amount,
                    converted: c.converted_amount,
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;

        let comparison = if request.to_currencies.is_empty() {
            None
        } else {
            Some(compare(request.amount, &request.from_currency, &request.to_currencies)?)
        };

        Ok(CurrencyDetailed {
            simple,
            quick_reference,
            comparison,
            notes: vec![
                "Rates are indicative reference values, not live market quotes",
                "Banks and exchange services add fees or spreads to these rates",
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_to_eur() {
        let c = CurrencyCalculator::simple(&CurrencyRequest::new(100.0, "usd", "EUR")).unwrap();
        assert_eq!(c.converted_amount, 92.0);
        assert_eq!(c.exchange_rate, 0.92);
        assert_eq!(c.inverse_rate, 1.086957);
        assert_eq!(c.from_currency, "USD");
        assert_eq!(c.to_currency_name, "Euro");
    }

    #[test]
    fn test_cross_rate_through_usd() {
        let c = convert(1000.0, "JPY", "USD").unwrap();
        assert_eq!(c.converted_amount, 6.69);
        let same = convert(50.0, "GBP", "GBP").unwrap();
        assert_eq!(same.converted_amount, 50.0);
        assert_eq!(same.exchange_rate, 1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(convert(10.0, "USD", "XYZ").unwrap_err().kind(), "unsupported_option");
        assert_eq!(convert(0.0, "USD", "EUR").unwrap_err().kind(), "validation");
        assert!(compare(10.0, "USD", &["EUR".to_string(), "ABC".to_string()]).is_err());
    }

    #[test]
    fn test_compare_and_listing() {
        let d = CurrencyCalculator::detailed(&CurrencyRequest::new(10.0, "USD", "INR").compared_with(&["EUR", "GBP"]))
            .unwrap();
        let cmp = d.comparison.unwrap();
        assert_eq!(cmp.conversions.len(), 2);
        assert_eq!(cmp.conversions[1].converted_amount, 7.9);
        assert_eq!(d.quick_reference[0].converted, 83.12);

        let all = all_currencies();
        assert_eq!(all.len(), 24);
        assert_eq!(all[0].code, "USD");
    }
}
