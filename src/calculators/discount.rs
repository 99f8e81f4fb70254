// 🏷️ Discount Calculator
// Single, successive and bulk discounts, plus tax applied before or after

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::round_money;
use crate::validation::{ValidationError, Validator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    #[default]
    Simple,
    Multiple,
    Bulk,
    Tax,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulkTier {
    pub min_qty: u32,
    pub discount_percent: f64,
}

pub fn default_bulk_tiers() -> Vec<BulkTier> {
    vec![
        BulkTier { min_qty: 10, discount_percent: 5.0 },
        BulkTier { min_qty: 50, discount_percent: 10.0 },
        BulkTier { min_qty: 100, discount_percent: 15.0 },
    ]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountRequest {
    #[serde(default, rename = "type")]
    pub mode: DiscountMode,
    #[serde(default)]
    pub original_price: f64,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    /// Successive percentages (`multiple`)
    #[serde(default)]
    pub discounts: Vec<f64>,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub bulk_tiers: Option<Vec<BulkTier>>,
    #[serde(default)]
    pub tax_percent: f64,
    #[serde(default = "default_true")]
    pub apply_tax_after_discount: bool,
}

impl DiscountRequest {
    pub fn percent_off(price: f64, percent: f64) -> Self {
        DiscountRequest {
            original_price: price,
            discount_percent: Some(percent),
            apply_tax_after_discount: true,
            ..Default::default()
        }
    }

    pub fn successive(price: f64, discounts: Vec<f64>) -> Self {
        DiscountRequest {
            mode: DiscountMode::Multiple,
            original_price: price,
            discounts,
            apply_tax_after_discount: true,
            ..Default::default()
        }
    }

    pub fn bulk(unit_price: f64, quantity: u32) -> Self {
        DiscountRequest {
            mode: DiscountMode::Bulk,
            unit_price,
            quantity,
            apply_tax_after_discount: true,
            ..Default::default()
        }
    }

    pub fn with_tax(price: f64, percent: f64, tax: f64) -> Self {
        DiscountRequest {
            mode: DiscountMode::Tax,
            original_price: price,
            discount_percent: Some(percent),
            tax_percent: tax,
            apply_tax_after_discount: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCut {
    pub original_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub final_price: f64,
    pub you_save: f64,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountStep {
    pub step: usize,
    pub discount_percent: f64,
    pub price_before: f64,
    pub discount_amount: f64,
    pub price_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessiveDiscount {
    pub original_price: f64,
    pub final_price: f64,
    pub total_savings: f64,
    pub effective_discount_percent: f64,
    pub breakdown: Vec<DiscountStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkDiscount {
    pub unit_price: f64,
    pub quantity: u32,
    pub discount_percent: f64,
    pub original_total: f64,
    pub discount_amount: f64,
    pub final_total: f64,
    pub final_unit_price: f64,
    pub savings_per_unit: f64,
    pub bulk_tiers: Vec<BulkTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxedDiscount {
    pub original_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub price_after_discount: f64,
    pub tax_percent: f64,
    pub tax_amount: f64,
    pub final_price: f64,
    pub total_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscountSimple {
    Single(PriceCut),
    Successive(SuccessiveDiscount),
    Bulk(BulkDiscount),
    Taxed(TaxedDiscount),
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscountDetailed {
    #[serde(flatten)]
    pub simple: DiscountSimple,
    pub summary: String,
    pub notes: Vec<&'static str>,
}

fn invalid(field: &str, message: &str) -> CalcError {
    CalcError::Validation(ValidationError::new(field, message, DiscountCalculator::NAME))
}

/// One discount given as percent, sale price or amount (checked in that order)
pub fn price_cut(
    original: f64,
    percent: Option<f64>,
    sale_price: Option<f64>,
    amount: Option<f64>,
) -> CalcResult<PriceCut> {
    Validator::new(DiscountCalculator::NAME)
        .positive("original_price", original)
        .finish()?;

    let (cut, pct, final_price) = match (percent, sale_price, amount) {
        (Some(p), _, _) => {
            Validator::new(DiscountCalculator::NAME)
                .range("discount_percent", p, 0.0, 100.0)
                .finish()?;
            let cut = original * p / 100.0;
            (cut, p, original - cut)
        }
        (None, Some(sale), _) => {
            Validator::new(DiscountCalculator::NAME)
                .range("sale_price", sale, 0.0, original)
                .finish()?;
            let cut = original - sale;
            (cut, cut / original * 100.0, sale)
        }
        (None, None, Some(a)) => {
            Validator::new(DiscountCalculator::NAME)
                .range("discount_amount", a, 0.0, original)
                .finish()?;
            (a, a / original * 100.0, original - a)
        }
        (None, None, None) => {
            return Err(invalid(
                "discount_percent",
                "provide discount_percent, sale_price or discount_amount",
            ))
        }
    };

    Ok(PriceCut {
        original_price: round_money(original),
        discount_percent: round_money(pct),
        discount_amount: round_money(cut),
        final_price: round_money(final_price),
        you_save: round_money(cut),
        savings_percent: round_money(pct),
    })
}

/// Each percentage applies to the price left by the previous one
pub fn successive_discounts(original: f64, discounts: &[f64]) -> CalcResult<SuccessiveDiscount> {
    let mut v = Validator::new(DiscountCalculator::NAME)
        .positive("original_price", original)
        .not_empty("discounts", discounts);
    for d in discounts {
        v = v.range("discounts", *d, 0.0, 100.0);
    }
    v.finish()?;

    let mut price = original;
    let breakdown = discounts
        .iter()
        .enumerate()
        .map(|(i, &pct)| {
            let cut = price * pct / 100.0;
            let step = DiscountStep {
                step: i + 1,
                discount_percent: pct,
                price_before: round_money(price),
                discount_amount: round_money(cut),
                price_after: round_money(price - cut),
            };
            price -= cut;
            step
        })
        .collect();

    let saved = original - price;
    Ok(SuccessiveDiscount {
        original_price: round_money(original),
        final_price: round_money(price),
        total_savings: round_money(saved),
        effective_discount_percent: round_money(saved / original * 100.0),
        breakdown,
    })
}

/// Highest tier whose minimum quantity is met
pub fn bulk_discount(
    unit_price: f64,
    quantity: u32,
    tiers: Option<&[BulkTier]>,
) -> CalcResult<BulkDiscount> {
    Validator::new(DiscountCalculator::NAME)
        .positive("unit_price", unit_price)
        .check(quantity >= 1, "quantity", "must be at least 1")
        .finish()?;

    let tiers: Vec<BulkTier> = tiers.map(<[BulkTier]>::to_vec).unwrap_or_else(default_bulk_tiers);
    let mut v = Validator::new(DiscountCalculator::NAME);
    for t in &tiers {
        v = v.range("bulk_tiers.discount_percent", t.discount_percent, 0.0, 100.0);
    }
    v.finish()?;

    let pct = tiers
        .iter()
        .filter(|t| quantity >= t.min_qty)
        .max_by_key(|t| t.min_qty)
        .map(|t| t.discount_percent)
        .unwrap_or(0.0);

    let original_total = unit_price * f64::from(quantity);
    let cut = original_total * pct / 100.0;
    let final_total = original_total - cut;
    let final_unit = final_total / f64::from(quantity);

    Ok(BulkDiscount {
        unit_price: round_money(unit_price),
        quantity,
        discount_percent: pct,
        original_total: round_money(original_total),
        discount_amount: round_money(cut),
        final_total: round_money(final_total),
        final_unit_price: round_money(final_unit),
        savings_per_unit: round_money(unit_price - final_unit),
        bulk_tiers: tiers,
    })
}

pub fn tax_and_discount(
    original: f64,
    percent: f64,
    tax_percent: f64,
    tax_after_discount: bool,
) -> CalcResult<TaxedDiscount> {
    Validator::new(DiscountCalculator::NAME)
        .positive("original_price", original)
        .range("discount_percent", percent, 0.0, 100.0)
        .range("tax_percent", tax_percent, 0.0, 100.0)
        .finish()?;

    let cut = original * percent / 100.0;
    let after = original - cut;
    let (tax, final_price) = if tax_after_discount {
        let tax = after * tax_percent / 100.0;
        (tax, after + tax)
    } else {
        let tax = original * tax_percent / 100.0;
        (tax, original + tax - cut)
    };

    Ok(TaxedDiscount {
        original_price: round_money(original),
        discount_percent: round_money(percent),
        discount_amount: round_money(cut),
        price_after_discount: round_money(after),
        tax_percent: round_money(tax_percent),
        tax_amount: round_money(tax),
        final_price: round_money(final_price),
        total_savings: round_money(cut),
    })
}

pub struct DiscountCalculator;

impl Calculator for DiscountCalculator {
    type Request = DiscountRequest;
    type Simple = DiscountSimple;
    type Detailed = DiscountDetailed;
    const NAME: &'static str = "discount";

    fn simple(request: &DiscountRequest) -> CalcResult<DiscountSimple> {
        match request.mode {
            DiscountMode::Simple => price_cut(
                request.original_price,
                request.discount_percent,
                request.sale_price,
                request.discount_amount,
            )
            .map(DiscountSimple::Single),
            DiscountMode::Multiple => {
                successive_discounts(request.original_price, &request.discounts)
                    .map(DiscountSimple::Successive)
            }
            DiscountMode::Bulk => bulk_discount(
                request.unit_price,
                request.quantity,
                request.bulk_tiers.as_deref(),
            )
            .map(DiscountSimple::Bulk),
            DiscountMode::Tax => tax_and_discount(
                request.original_price,
                request.discount_percent.unwrap_or(0.0),
                request.tax_percent,
                request.apply_tax_after_discount,
            )
            .map(DiscountSimple::Taxed),
        }
    }

    fn detailed(request: &DiscountRequest) -> CalcResult<DiscountDetailed> {
        let simple = Self::simple(request)?;
        let summary = match &simple {
            DiscountSimple::Single(c) => format!(
                "Pay {:.2} instead of {:.2} and save {:.2} ({}% off)",
                c.final_price, c.original_price, c.you_save, c.discount_percent
            ),
            DiscountSimple::Successive(s) => format!(
                "{} successive discounts add up to {}% off, not {}%",
                s.breakdown.len(),
                s.effective_discount_percent,
                round_money(s.breakdown.iter().map(|b| b.discount_percent).sum::<f64>())
            ),
            DiscountSimple::Bulk(b) => format!(
                "Buying {} units at {}% off saves {:.2} per unit",
                b.quantity, b.discount_percent, b.savings_per_unit
            ),
            DiscountSimple::Taxed(t) => format!(
                "Final price {:.2} including {:.2} tax after saving {:.2}",
                t.final_price, t.tax_amount, t.total_savings
            ),
        };
        Ok(DiscountDetailed {
            simple,
            summary,
            notes: vec![
                "Successive discounts compound on the reduced price",
                "Compare unit prices when buying in bulk",
                "Tax rules differ by region",
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_sale_and_amount_agree() {
        let by_pct = price_cut(200.0, Some(25.0), None, None).unwrap();
        let by_sale = price_cut(200.0, None, Some(150.0), None).unwrap();
        let by_amount = price_cut(200.0, None, None, Some(50.0)).unwrap();
        assert_eq!(by_pct.final_price, 150.0);
        assert_eq!(by_pct, by_sale);
        assert_eq!(by_sale, by_amount);
        println!("✅ Discount equivalence test PASSED");
    }

    #[test]
    fn test_successive_discounts() {
        let r = successive_discounts(100.0, &[20.0, 10.0]).unwrap();
        assert_eq!(r.final_price, 72.0);
        assert_eq!(r.effective_discount_percent, 28.0);
        assert_eq!(r.breakdown[1].price_before, 80.0);
    }

    #[test]
    fn test_bulk_tiers() {
        assert_eq!(bulk_discount(10.0, 5, None).unwrap().discount_percent, 0.0);
        let r = bulk_discount(10.0, 60, None).unwrap();
        assert_eq!(r.discount_percent, 10.0);
        assert_eq!(r.final_total, 540.0);
        assert_eq!(r.final_unit_price, 9.0);
        assert!(bulk_discount(10.0, 0, None).is_err());
    }

    #[test]
    fn test_tax_order() {
        let after = tax_and_discount(100.0, 10.0, 10.0, true).unwrap();
        let before = tax_and_discount(100.0, 10.0, 10.0, false).unwrap();
        assert_eq!(after.final_price, 99.0);
        assert_eq!(before.final_price, 100.0);
    }

    #[test]
    fn test_validation_and_dispatch() {
        assert!(price_cut(100.0, None, None, None).is_err());
        assert!(price_cut(100.0, Some(120.0), None, None).is_err());
        assert!(price_cut(100.0, None, Some(150.0), None).is_err());
        assert!(price_cut(0.0, Some(10.0), None, None).is_err());

        let simple = DiscountCalculator::simple(&DiscountRequest::bulk(2.0, 100)).unwrap();
        assert!(matches!(simple, DiscountSimple::Bulk(ref b) if b.discount_percent == 15.0));
        let detailed =
            DiscountCalculator::detailed(&DiscountRequest::successive(100.0, vec![20.0, 10.0]))
                .unwrap();
        assert!(detailed.summary.contains("28"));
        assert!(DiscountCalculator::simple(&DiscountRequest::with_tax(50.0, 10.0, 8.0)).is_ok());
        assert!(DiscountCalculator::simple(&DiscountRequest::percent_off(50.0, 10.0)).is_ok());
    }
}
