// 🔥 BMR Calculator
// Basal metabolic rate by three formulas with TDEE per activity level

use super::body::{
    harris_benedict, katch_mcardle, macro_split, mifflin_st_jeor, ActivityLevel, Gender,
    MacroSplit,
};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{UnitSystem, Validator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmrFormula {
    HarrisBenedict,
    MifflinStJeor,
    KatchMcArdle,
}

impl BmrFormula {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "harris-benedict" | "harris_benedict" => Ok(BmrFormula::HarrisBenedict),
            "mifflin-st-jeor" | "mifflin_st_jeor" => Ok(BmrFormula::MifflinStJeor),
            "katch-mcardle" | "katch_mcardle" => Ok(BmrFormula::KatchMcArdle),
            _ => Err(CalcError::unsupported("formula", value)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BmrFormula::HarrisBenedict => "Harris-Benedict Equation (Revised)",
            BmrFormula::MifflinStJeor => "Mifflin-St Jeor Equation",
            BmrFormula::KatchMcArdle => "Katch-McArdle Formula",
        }
    }
}

fn default_formula() -> String {
    "harris-benedict".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BmrRequest {
    pub gender: String,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default = "default_formula")]
    pub formula: String,
    #[serde(default)]
    pub body_fat_percentage: Option<f64>,
    #[serde(default)]
    pub unit_system: UnitSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrSimple {
    pub bmr: f64,
    pub sedentary: f64,
    pub light: f64,
    pub moderate: f64,
    pub active: f64,
    pub very_active: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TdeeLevel {
    pub level: &'static str,
    pub calories: f64,
    pub description: &'static str,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaloricGoal {
    pub goal: &'static str,
    pub calories: f64,
    pub weekly_change: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacroPlan {
    pub plan: &'static str,
    #[serde(flatten)]
    pub split: MacroSplit,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaComparison {
    pub harris_benedict: f64,
    pub mifflin_st_jeor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub katch_mcardle: Option<f64>,
    pub average: f64,
    pub range: f64,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmrHealthMetrics {
    pub bmi: f64,
    pub ideal_weight_min_kg: f64,
    pub ideal_weight_max_kg: f64,
    pub daily_water_intake_liters: f64,
    pub resting_heart_rate_estimate: &'static str,
    pub recommended_meal_frequency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmrDetailed {
    #[serde(flatten)]
    pub simple: BmrSimple,
    pub formula_used: &'static str,
    pub tdee_by_activity: Vec<TdeeLevel>,
    pub caloric_goals: Vec<CaloricGoal>,
    pub macronutrient_recommendations: Vec<MacroPlan>,
    pub formula_comparison: FormulaComparison,
    pub health_metrics: BmrHealthMetrics,
    pub notes: Vec<&'static str>,
}

/// Validated metric inputs plus the chosen BMR
struct Metabolism {
    gender: Gender,
    age: f64,
    height_cm: f64,
    weight_kg: f64,
    body_fat: Option<f64>,
    formula: BmrFormula,
    bmr: f64,
}

fn evaluate(request: &BmrRequest) -> CalcResult<Metabolism> {
    let gender = Gender::parse(&request.gender)?;
    Validator::new(BmrCalculator::NAME)
        .range("age", request.age, 1.0, 120.0)
        .positive("height", request.height)
        .positive("weight", request.weight)
        .finish()?;

    let height_cm = request.unit_system.height_cm(request.height);
    let weight_kg = request.unit_system.weight_kg(request.weight);
    Validator::new(BmrCalculator::NAME)
        .range("height", height_cm, 50.0, 300.0)
        .range("weight", weight_kg, 20.0, 500.0)
        .finish()?;

    let formula = BmrFormula::parse(&request.formula)?;
    let bmr = match formula {
        BmrFormula::HarrisBenedict => harris_benedict(gender, weight_kg, height_cm, request.age),
        BmrFormula::MifflinStJeor => mifflin_st_jeor(gender, weight_kg, height_cm, request.age),
        BmrFormula::KatchMcArdle => {
            let body_fat = request.body_fat_percentage.unwrap_or(f64::NAN);
            Validator::new(BmrCalculator::NAME)
                .check(
                    request.body_fat_percentage.is_some(),
                    "body_fat_percentage",
                    "required for Katch-McArdle formula",
                )
                .range("body_fat_percentage", body_fat, 3.0, 60.0)
                .finish()?;
            katch_mcardle(weight_kg, body_fat)
        }
    };

    Ok(Metabolism {
        gender,
        age: request.age,
        height_cm,
        weight_kg,
        body_fat: request.body_fat_percentage,
        formula,
        bmr,
    })
}

fn tdee(bmr: f64, level: ActivityLevel) -> f64 {
    round_money(bmr * level.multiplier())
}

pub struct BmrCalculator;

impl Calculator for BmrCalculator {
    type Request = BmrRequest;
    type Simple = BmrSimple;
    type Detailed = BmrDetailed;
    const NAME: &'static str = "bmr";

    fn simple(request: &BmrRequest) -> CalcResult<BmrSimple> {
        let m = evaluate(request)?;
        Ok(BmrSimple {
            bmr: round_money(m.bmr),
            sedentary: tdee(m.bmr, ActivityLevel::Sedentary),
            light: tdee(m.bmr, ActivityLevel::Light),
            moderate: tdee(m.bmr, ActivityLevel::Moderate),
            active: tdee(m.bmr, ActivityLevel::Active),
            very_active: tdee(m.bmr, ActivityLevel::VeryActive),
        })
    }

    fn detailed(request: &BmrRequest) -> CalcResult<BmrDetailed> {
        let simple = Self::simple(request)?;
        let m = evaluate(request)?;
        let maintenance = simple.moderate;

        let tdee_by_activity = ActivityLevel::ALL
            .iter()
            .map(|level| TdeeLevel {
                level: level.bmr_key(),
                calories: tdee(m.bmr, *level),
                description: level.description(),
                multiplier: level.multiplier(),
            })
            .collect();

        let goal = |goal, delta: f64, weekly_change, description| CaloricGoal {
            goal,
            calories: round_money(maintenance + delta),
            weekly_change,
            description,
        };
        let caloric_goals = vec![
            goal("extreme_weight_loss", -1000.0, "-1 kg (-2 lbs)", "Aggressive deficit (not recommended without supervision)"),
            goal("weight_loss", -500.0, "-0.5 kg (-1 lb)", "Moderate deficit for sustainable fat loss"),
            goal("mild_weight_loss", -250.0, "-0.25 kg (-0.5 lbs)", "Small deficit for slow, steady weight loss"),
            goal("maintenance", 0.0, "0 kg (0 lbs)", "Maintain current weight"),
            goal("mild_weight_gain", 250.0, "+0.25 kg (+0.5 lbs)", "Small surplus for lean muscle gain"),
            goal("weight_gain", 500.0, "+0.5 kg (+1 lb)", "Moderate surplus for muscle building"),
        ];

        let macronutrient_recommendations = vec![
            MacroPlan {
                plan: "balanced",
                split: macro_split(maintenance, 30, 40, 30),
                description: "Balanced diet for general health",
            },
            MacroPlan {
                plan: "high_protein",
                split: macro_split(maintenance, 40, 30, 30),
                description: "For muscle building and recovery",
            },
            MacroPlan {
                plan: "low_carb",
                split: macro_split(maintenance, 35, 20, 45),
                description: "For fat loss and blood sugar control",
            },
        ];

        let height_m2 = (m.height_cm / 100.0).powi(2);

        Ok(BmrDetailed {
            simple,
            formula_used: m.formula.name(),
            tdee_by_activity,
            caloric_goals,
            macronutrient_recommendations,
            formula_comparison: compare_formulas(&m),
            health_metrics: BmrHealthMetrics {
                bmi: round_money(m.weight_kg / height_m2),
                ideal_weight_min_kg: round_dp(18.5 * height_m2, 1),
                ideal_weight_max_kg: round_dp(24.9 * height_m2, 1),
                daily_water_intake_liters: round_dp(m.weight_kg * 0.033, 1),
                resting_heart_rate_estimate: "60-100 bpm (measure for accuracy)",
                recommended_meal_frequency: "3-6 meals per day based on preference",
            },
            notes: vec![
                "BMR represents calories burned at complete rest",
                "TDEE includes daily activity and exercise",
                "Individual metabolism may vary by ±10-15%",
                "Consult healthcare provider for personalized advice",
            ],
        })
    }
}

fn compare_formulas(m: &Metabolism) -> FormulaComparison {
    let hb = round_money(harris_benedict(m.gender, m.weight_kg, m.height_cm, m.age));
    let msj = round_money(mifflin_st_jeor(m.gender, m.weight_kg, m.height_cm, m.age));
    let km = m.body_fat.map(|bf| round_money(katch_mcardle(m.weight_kg, bf)));

    let mut values = vec![hb, msj];
    values.extend(km);
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);

    FormulaComparison {
        harris_benedict: hb,
        mifflin_st_jeor: msj,
        katch_mcardle: km,
        average: round_money(values.iter().sum::<f64>() / values.len() as f64),
        range: round_money(max - min),
        note: "Mifflin-St Jeor is generally considered most accurate for modern populations",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(formula: &str) -> BmrRequest {
        BmrRequest {
            gender: "male".to_string(),
            age: 30.0,
            height: 175.0,
            weight: 70.0,
            formula: formula.to_string(),
            body_fat_percentage: None,
            unit_system: UnitSystem::Metric,
        }
    }

    #[test]
    fn test_mifflin_activity_levels() {
        let result = BmrCalculator::simple(&request("mifflin-st-jeor")).unwrap();
        assert_eq!(result.bmr, 1648.75);
        assert_eq!(result.sedentary, 1978.5);
        assert_eq!(result.moderate, 2555.56);
        assert!((result.very_active - 3132.63).abs() < 0.011);
    }

    #[test]
    fn test_default_formula_is_harris_benedict() {
        let req: BmrRequest = serde_json::from_value(serde_json::json!({
            "gender": "Male", "age": 30, "height": 175, "weight": 70
        }))
        .unwrap();
        let detailed = BmrCalculator::detailed(&req).unwrap();
        assert_eq!(detailed.formula_used, "Harris-Benedict Equation (Revised)");
        assert_eq!(detailed.simple.bmr, 1695.67);
        assert_eq!(detailed.tdee_by_activity.len(), 5);
        assert_eq!(detailed.caloric_goals.len(), 6);
        assert!(detailed.formula_comparison.katch_mcardle.is_none());
    }

    #[test]
    fn test_katch_requires_body_fat() {
        assert!(matches!(
            BmrCalculator::simple(&request("katch-mcardle")),
            Err(CalcError::Validation(_))
        ));
        let mut req = request("katch-mcardle");
        req.body_fat_percentage = Some(20.0);
        assert_eq!(BmrCalculator::simple(&req).unwrap().bmr, 1579.6);
        req.body_fat_percentage = Some(75.0);
        assert!(BmrCalculator::simple(&req).is_err());
    }

    #[test]
    fn test_unknown_formula() {
        assert!(matches!(
            BmrCalculator::simple(&request("guesswork")),
            Err(CalcError::UnsupportedOption { .. })
        ));
    }
}
