// 🥩 Macros Calculator
// Protein / carbs / fat targets for a weight goal

use super::body::{mifflin_st_jeor, ActivityLevel, Gender};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{weight_to_kg, Validator};
use serde::{Deserialize, Serialize};

/// Protein intake below this (g per kg) triggers an extra recommendation
const MIN_PROTEIN_PER_KG: f64 = 1.6;
const MEALS_PER_DAY: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroGoal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl MacroGoal {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "lose_weight" => Ok(MacroGoal::LoseWeight),
            "maintain" => Ok(MacroGoal::Maintain),
            "gain_muscle" => Ok(MacroGoal::GainMuscle),
            _ => Err(CalcError::unsupported("goal", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroGoal::LoseWeight => "lose_weight",
            MacroGoal::Maintain => "maintain",
            MacroGoal::GainMuscle => "gain_muscle",
        }
    }

    /// (calorie adjustment, protein, carbs, fat)
    fn profile(&self) -> (f64, f64, f64, f64) {
        match self {
            MacroGoal::LoseWeight => (-500.0, 0.35, 0.30, 0.35),
            MacroGoal::GainMuscle => (300.0, 0.30, 0.45, 0.25),
            MacroGoal::Maintain => (0.0, 0.30, 0.40, 0.30),
        }
    }
}

fn default_weight_unit() -> String {
    "kg".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MacrosRequest {
    pub weight: f64,
    pub height: f64,
    pub age: f64,
    pub gender: String,
    pub activity_level: String,
    pub goal: String,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    pub grams: f64,
    pub calories: f64,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_kg_bodyweight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein: Macro,
    pub carbs: Macro,
    pub fats: Macro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacrosSimple {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
    pub macros: MacroTargets,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerMeal {
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealBreakdown {
    pub meals_per_day: u32,
    pub per_meal: PerMeal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacrosDetailed {
    #[serde(flatten)]
    pub simple: MacrosSimple,
    pub goal: &'static str,
    pub activity_level: &'static str,
    pub meal_breakdown: MealBreakdown,
    pub recommendations: Vec<&'static str>,
}

/// Unrounded grams and per-kg protein
struct Budget {
    protein_g: f64,
    carbs_g: f64,
    fats_g: f64,
    protein_per_kg: f64,
    goal: MacroGoal,
    activity: ActivityLevel,
}

fn budget(request: &MacrosRequest) -> CalcResult<(MacrosSimple, Budget)> {
    let gender = Gender::parse(&request.gender)?;
    let weight_kg = weight_to_kg(request.weight, &request.weight_unit)?;
    Validator::new(MacrosCalculator::NAME)
        .range("age", request.age, 1.0, 120.0)
        .range("height", request.height, 50.0, 300.0)
        .range("weight", weight_kg, 20.0, 500.0)
        .finish()?;
    let activity = ActivityLevel::parse(&request.activity_level)?;
    let goal = MacroGoal::parse(&request.goal)?;

    let bmr = mifflin_st_jeor(gender, weight_kg, request.height, request.age);
    let tdee = bmr * activity.multiplier();
    let (adjustment, protein_ratio, carb_ratio, fat_ratio) = goal.profile();
    let target = tdee + adjustment;

    let protein_kcal = target * protein_ratio;
    let carb_kcal = target * carb_ratio;
    let fat_kcal = target * fat_ratio;
    let protein_g = protein_kcal / 4.0;
    let carbs_g = carb_kcal / 4.0;
    let fats_g = fat_kcal / 9.0;
    let protein_per_kg = protein_g / weight_kg;

    let simple = MacrosSimple {
        bmr: round_dp(bmr, 0),
        tdee: round_dp(tdee, 0),
        target_calories: round_dp(target, 0),
        macros: MacroTargets {
            protein: Macro {
                grams: round_dp(protein_g, 1),
                calories: round_dp(protein_kcal, 0),
                percentage: round_dp(protein_ratio * 100.0, 1),
                per_kg_bodyweight: Some(round_money(protein_per_kg)),
            },
            carbs: Macro {
                grams: round_dp(carbs_g, 1),
                calories: round_dp(carb_kcal, 0),
                percentage: round_dp(carb_ratio * 100.0, 1),
                per_kg_bodyweight: None,
            },
            fats: Macro {
                grams: round_dp(fats_g, 1),
                calories: round_dp(fat_kcal, 0),
                percentage: round_dp(fat_ratio * 100.0, 1),
                per_kg_bodyweight: None,
            },
        },
    };

    Ok((
        simple,
        Budget {
            protein_g,
            carbs_g,
            fats_g,
            protein_per_kg,
            goal,
            activity,
        },
    ))
}

fn recommendations(goal: MacroGoal, protein_per_kg: f64) -> Vec<&'static str> {
    let mut recs = match goal {
        MacroGoal::LoseWeight => vec![
            "Maintain high protein to preserve muscle mass",
            "Focus on complex carbs and fiber",
            "Include healthy fats for satiety",
            "Stay in caloric deficit consistently",
        ],
        MacroGoal::GainMuscle => vec![
            "Consume protein within 2 hours post-workout",
            "Eat carbs around training for energy",
            "Don't fear healthy fats for hormone production",
            "Stay in slight caloric surplus",
        ],
        MacroGoal::Maintain => vec![
            "Balance all three macronutrients",
            "Adjust based on activity level",
            "Focus on whole food sources",
            "Stay consistent with meal timing",
        ],
    };
    if protein_per_kg < MIN_PROTEIN_PER_KG {
        recs.push("Consider increasing protein intake for optimal results");
    }
    recs
}

pub struct MacrosCalculator;

impl Calculator for MacrosCalculator {
    type Request = MacrosRequest;
    type Simple = MacrosSimple;
    type Detailed = MacrosDetailed;
    const NAME: &'static str = "macros";

    fn simple(request: &MacrosRequest) -> CalcResult<MacrosSimple> {
        budget(request).map(|(simple, _)| simple)
    }

    fn detailed(request: &MacrosRequest) -> CalcResult<MacrosDetailed> {
        let (simple, b) = budget(request)?;
        let per_meal_kcal = (b.protein_g * 4.0 + b.carbs_g * 4.0 + b.fats_g * 9.0) / MEALS_PER_DAY;

        Ok(MacrosDetailed {
            simple,
            goal: b.goal.as_str(),
            activity_level: b.activity.key(),
            meal_breakdown: MealBreakdown {
                meals_per_day: MEALS_PER_DAY as u32,
                per_meal: PerMeal {
                    protein_grams: round_dp(b.protein_g / MEALS_PER_DAY, 1),
                    carbs_grams: round_dp(b.carbs_g / MEALS_PER_DAY, 1),
                    fats_grams: round_dp(b.fats_g / MEALS_PER_DAY, 1),
                    calories: round_dp(per_meal_kcal, 0),
                },
            },
            recommendations: recommendations(b.goal, b.protein_per_kg),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(goal: &str) -> MacrosRequest {
        MacrosRequest {
            weight: 80.0,
            height: 180.0,
            age: 25.0,
            gender: "male".to_string(),
            activity_level: "moderate".to_string(),
            goal: goal.to_string(),
            weight_unit: "kg".to_string(),
        }
    }

    #[test]
    fn test_maintain_split() {
        // Mifflin: 800 + 1125 - 125 + 5 = 1805; × 1.55 = 2797.75
        let result = MacrosCalculator::simple(&request("maintain")).unwrap();
        assert_eq!(result.bmr, 1805.0);
        assert_eq!(result.target_calories, 2798.0);
        assert_eq!(result.macros.protein.percentage, 30.0);
        assert_eq!(result.macros.carbs.grams, 279.8);
    }

    #[test]
    fn test_goal_adjustments() {
        let lose = MacrosCalculator::simple(&request("lose_weight")).unwrap();
        let gain = MacrosCalculator::simple(&request("gain_muscle")).unwrap();
        assert_eq!(gain.target_calories - lose.target_calories, 800.0);
        assert!(MacrosCalculator::simple(&request("bulk")).is_err());
    }

    #[test]
    fn test_meal_breakdown_and_protein_advice() {
        let detailed = MacrosCalculator::detailed(&request("maintain")).unwrap();
        assert_eq!(detailed.meal_breakdown.meals_per_day, 3);
        // 209.8 g / 80 kg is above 1.6 g/kg
        assert_eq!(detailed.recommendations.len(), 4);
        assert!((detailed.meal_breakdown.per_meal.calories - 933.0).abs() < 1.0);
    }
}
