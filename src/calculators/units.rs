// 📏 Unit Converter
// Factor-to-base conversion for length, weight, volume, area, speed; formulas for temperature

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{ensure_finite, round_dp};
use serde::{Deserialize, Serialize};

// ============================================================================
// UNIT TABLES (factor = value of one unit in the base unit)
// ============================================================================

const LENGTH: &[(&str, f64)] = &[
    ("meter", 1.0),
    ("kilometer", 1000.0),
    ("centimeter", 0.01),
    ("millimeter", 0.001),
    ("mile", 1609.34),
    ("yard", 0.9144),
    ("foot", 0.3048),
    ("inch", 0.0254),
];

const WEIGHT: &[(&str, f64)] = &[
    ("kilogram", 1.0),
    ("gram", 0.001),
    ("milligram", 0.000001),
    ("metric_ton", 1000.0),
    ("pound", 0.453592),
    ("ounce", 0.0283495),
    ("stone", 6.35029),
];

const VOLUME: &[(&str, f64)] = &[
    ("liter", 1.0),
    ("milliliter", 0.001),
    ("cubic_meter", 1000.0),
    ("gallon_us", 3.78541),
    ("gallon_uk", 4.54609),
    ("quart", 0.946353),
    ("pint", 0.473176),
    ("cup", 0.236588),
    ("fluid_ounce", 0.0295735),
    ("tablespoon", 0.0147868),
    ("teaspoon", 0.00492892),
];

const AREA: &[(&str, f64)] = &[
    ("square_meter", 1.0),
    ("square_kilometer", 1_000_000.0),
    ("square_centimeter", 0.0001),
    ("hectare", 10_000.0),
    ("acre", 4046.86),
    ("square_mile", 2_589_988.0),
    ("square_yard", 0.836127),
    ("square_foot", 0.092903),
    ("square_inch", 0.00064516),
];

const SPEED: &[(&str, f64)] = &[
    ("meter_per_second", 1.0),
    ("kilometer_per_hour", 0.277778),
    ("mile_per_hour", 0.44704),
    ("foot_per_second", 0.3048),
    ("knot", 0.514444),
];

const TEMPERATURE: &[&str] = &["celsius", "fahrenheit", "kelvin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Weight,
    Volume,
    Temperature,
    Area,
    Speed,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 6] = [
        UnitCategory::Length,
        UnitCategory::Weight,
        UnitCategory::Volume,
        UnitCategory::Temperature,
        UnitCategory::Area,
        UnitCategory::Speed,
    ];

    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "length" => Ok(UnitCategory::Length),
            "weight" => Ok(UnitCategory::Weight),
            "volume" => Ok(UnitCategory::Volume),
            "temperature" => Ok(UnitCategory::Temperature),
            "area" => Ok(UnitCategory::Area),
            "speed" => Ok(UnitCategory::Speed),
            _ => Err(CalcError::unsupported("category", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Weight => "weight",
            UnitCategory::Volume => "volume",
            UnitCategory::Temperature => "temperature",
            UnitCategory::Area => "area",
            UnitCategory::Speed => "speed",
        }
    }

    pub fn base_unit(&self) -> &'static str {
        match self {
            UnitCategory::Temperature => "celsius",
            other => other.factors().first().map(|(name, _)| *name).unwrap_or("celsius"),
        }
    }

    /// Empty for temperature, which converts by formula
    fn factors(&self) -> &'static [(&'static str, f64)] {
        match self {
            UnitCategory::Length => LENGTH,
            UnitCategory::Weight => WEIGHT,
            UnitCategory::Volume => VOLUME,
            UnitCategory::Area => AREA,
            UnitCategory::Speed => SPEED,
            UnitCategory::Temperature => &[],
        }
    }

    pub fn units(&self) -> Vec<&'static str> {
        match self {
            UnitCategory::Temperature => TEMPERATURE.to_vec(),
            other => other.factors().iter().map(|(name, _)| *name).collect(),
        }
    }

    fn factor(&self, unit: &str) -> CalcResult<f64> {
        self.factors()
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, f)| *f)
            .ok_or_else(|| CalcError::unsupported(&format!("{} unit", self.as_str()), unit))
    }
}

pub fn all_categories() -> Vec<&'static str> {
    UnitCategory::ALL.iter().map(|c| c.as_str()).collect()
}

/// Units of a category by name; unknown category is an error
pub fn units_for(category: &str) -> CalcResult<Vec<&'static str>> {
    Ok(UnitCategory::parse(category)?.units())
}

fn to_celsius(value: f64, unit: &str) -> CalcResult<f64> {
    match unit {
        "celsius" => Ok(value),
        "fahrenheit" => Ok((value - 32.0) * 5.0 / 9.0),
        "kelvin" => Ok(value - 273.15),
        _ => Err(CalcError::unsupported("temperature unit", unit)),
    }
}

fn from_celsius(celsius: f64, unit: &str) -> CalcResult<f64> {
    match unit {
        "celsius" => Ok(celsius),
        "fahrenheit" => Ok(celsius * 9.0 / 5.0 + 32.0),
        "kelvin" => Ok(celsius + 273.15),
        _ => Err(CalcError::unsupported("temperature unit", unit)),
    }
}

/// Unrounded conversion through the category's base unit
pub fn convert_value(value: f64, from: &str, to: &str, category: UnitCategory) -> CalcResult<f64> {
    let result = match category {
        UnitCategory::Temperature => from_celsius(to_celsius(value, from)?, to)?,
        other => value * other.factor(from)? / other.factor(to)?,
    };
    ensure_finite(result, "unit conversion")
}

fn precision(category: UnitCategory) -> u32 {
    if category == UnitCategory::Temperature {
        2
    } else {
        6
    }
}

/// Integral values print without a fractional part
fn display_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UnitRequest {
    pub value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub category: String,
}

impl UnitRequest {
    pub fn new(value: f64, from_unit: &str, to_unit: &str, category: &str) -> Self {
        UnitRequest {
            value,
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSimple {
    pub original_value: f64,
    pub converted_value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub category: String,
    pub formula: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitEquivalent {
    pub unit: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitDetailed {
    #[serde(flatten)]
    pub simple: UnitSimple,
    pub base_unit: &'static str,
    pub value_in_base_unit: f64,
    /// The same input expressed in every unit of the category
    pub equivalents: Vec<UnitEquivalent>,
    pub reverse_formula: String,
}

pub struct UnitCalculator;

impl Calculator for UnitCalculator {
    type Request = UnitRequest;
    type Simple = UnitSimple;
    type Detailed = UnitDetailed;
    const NAME: &'static str = "unit_converter";

    fn simple(request: &UnitRequest) -> CalcResult<UnitSimple> {
        ensure_finite(request.value, "value")?;
        let category = UnitCategory::parse(&request.category)?;
        let from = request.from_unit.trim().to_lowercase();
        let to = request.to_unit.trim().to_lowercase();
        let converted = round_dp(convert_value(request.value, &from, &to, category)?, precision(category));

        let formula = match category {
            UnitCategory::Temperature => format!(
                "{}° {} = {}° {}",
                display_number(request.value),
                capitalize(&from),
                display_number(converted),
                capitalize(&to)
            ),
            _ => format!(
                "{} {} = {} {}",
                display_number(request.value),
                from,
                display_number(converted),
                to
            ),
        };

        Ok(UnitSimple {
            original_value: request.value,
            converted_value: converted,
            from_unit: from,
            to_unit: to,
            category: category.as_str().to_string(),
            formula,
        })
    }

    fn detailed(request: &UnitRequest) -> CalcResult<UnitDetailed> {
        let simple = Self::simple(request)?;
        let category = UnitCategory::parse(&simple.category)?;
        let dp = precision(category);
        let base = category.base_unit();
        let value_in_base = convert_value(request.value, &simple.from_unit, base, category)?;

        let equivalents = category
            .units()
            .into_iter()
            .map(|unit| {
                convert_value(request.value, &simple.from_unit, unit, category).map(|v| UnitEquivalent {
                    unit,
                    value: round_dp(v, dp),
                })
            })
            .collect::<CalcResult<Vec<_>>>()?;

        let one_back = round_dp(convert_value(1.0, &simple.to_unit, &simple.from_unit, category)?, dp);
        let reverse_formula = format!("1 {} = {} {}", simple.to_unit, display_number(one_back), simple.from_unit);

        Ok(UnitDetailed {
            base_unit: base,
            value_in_base_unit: round_dp(value_in_base, dp),
            equivalents,
            reverse_formula,
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_fixed_points() {
        let r = UnitCalculator::simple(&UnitRequest::new(100.0, "celsius", "fahrenheit", "temperature")).unwrap();
        assert_eq!(r.converted_value, 212.0);
        assert_eq!(r.formula, "100° Celsius = 212° Fahrenheit");

        let r = UnitCalculator::simple(&UnitRequest::new(0.0, "celsius", "kelvin", "temperature")).unwrap();
        assert_eq!(r.converted_value, 273.15);
        let r = UnitCalculator::simple(&UnitRequest::new(32.0, "fahrenheit", "celsius", "temperature")).unwrap();
        assert_eq!(r.converted_value, 0.0);
    }

    #[test]
    fn test_length_conversion() {
        let r = UnitCalculator::simple(&UnitRequest::new(1.0, "mile", "kilometer", "length")).unwrap();
        assert_eq!(r.converted_value, 1.60934);
        assert_eq!(r.formula, "1 mile = 1.60934 kilometer");
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        for category in UnitCategory::ALL {
            let units = category.units();
            for from in &units {
                for to in &units {
                    let there = convert_value(123.456, from, to, category).unwrap();
                    let back = convert_value(there, to, from, category).unwrap();
                    assert!(
                        ((back - 123.456) / 123.456).abs() < 1e-6,
                        "{} -> {} -> {} drifted to {}",
                        from,
                        to,
                        from,
                        back
                    );
                }
            }
        }
        println!("✅ Unit round-trip test PASSED");
    }

    #[test]
    fn test_unknown_category_and_unit() {
        let err = UnitCalculator::simple(&UnitRequest::new(1.0, "meter", "foot", "time")).unwrap_err();
        assert_eq!(err.kind(), "unsupported_option");
        let err = UnitCalculator::simple(&UnitRequest::new(1.0, "meter", "parsec", "length")).unwrap_err();
        assert_eq!(err.kind(), "unsupported_option");
        assert!(units_for("time").is_err());
    }

    #[test]
    fn test_listings() {
        assert_eq!(all_categories(), vec!["length", "weight", "volume", "temperature", "area", "speed"]);
        assert_eq!(units_for("temperature").unwrap(), vec!["celsius", "fahrenheit", "kelvin"]);
        assert_eq!(units_for("speed").unwrap().len(), 5);
    }

    #[test]
    fn test_detailed_equivalents() {
        let d = UnitCalculator::detailed(&UnitRequest::new(2.0, "kilogram", "pound", "weight")).unwrap();
        assert_eq!(d.base_unit, "kilogram");
        assert_eq!(d.value_in_base_unit, 2.0);
        assert_eq!(d.equivalents.len(), 7);
        let grams = d.equivalents.iter().find(|e| e.unit == "gram").unwrap();
        assert_eq!(grams.value, 2000.0);
        assert_eq!(d.reverse_formula, "1 pound = 0.453592 kilogram");
    }
}
