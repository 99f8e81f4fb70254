// 🍽️ Calorie Planner
// Daily calorie targets from Mifflin-St Jeor TDEE and a weight goal

use super::body::{harris_benedict, macro_split, mifflin_st_jeor, ActivityLevel, Gender, MacroSplit};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{UnitSystem, Validator, CM_PER_INCH};
use serde::{Deserialize, Serialize};

const KCAL_PER_KG: f64 = 7700.0;
const WEEKS_PER_MONTH: f64 = 4.33;
const LBS_PER_KG: f64 = 2.20462;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightGoal {
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "lose" => Ok(WeightGoal::Lose),
            "maintain" => Ok(WeightGoal::Maintain),
            "gain" => Ok(WeightGoal::Gain),
            _ => Err(CalcError::unsupported("goal", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightGoal::Lose => "lose",
            WeightGoal::Maintain => "maintain",
            WeightGoal::Gain => "gain",
        }
    }

    /// Protein / carbs / fat percentages
    fn macro_ratio(&self) -> (u32, u32, u32) {
        match self {
            WeightGoal::Lose => (40, 30, 30),
            WeightGoal::Gain => (30, 45, 25),
            WeightGoal::Maintain => (30, 40, 30),
        }
    }
}

fn default_goal() -> String {
    "maintain".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalorieRequest {
    pub gender: String,
    pub age: f64,
    pub weight: f64,
    pub height: f64,
    pub activity: String,
    #[serde(default = "default_goal")]
    pub goal: String,
    #[serde(default)]
    pub unit_system: UnitSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieSimple {
    pub calories: f64,
    pub bmr: f64,
    pub maintain: f64,
    pub lose: f64,
    pub gain: f64,
    pub activity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalOption {
    pub option: &'static str,
    pub calories: f64,
    pub rate: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalCalories {
    pub calories: f64,
    pub rate: &'static str,
    pub description: &'static str,
    pub options: Vec<GoalOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalMacros {
    #[serde(flatten)]
    pub split: MacroSplit,
    pub fiber_grams: f64,
    pub distribution_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealSlot {
    pub meal: &'static str,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub meals_per_day: u32,
    pub slots: Vec<MealSlot>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hydration {
    pub liters_per_day: f64,
    pub ml_per_day: f64,
    pub cups_per_day: f64,
    pub ounces_per_day: f64,
    pub recommendation: String,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyProjection {
    pub daily_difference: f64,
    pub weekly_difference: f64,
    pub weekly_weight_change_kg: f64,
    pub weekly_weight_change_lbs: f64,
    pub monthly_weight_change_kg: f64,
    pub monthly_weight_change_lbs: f64,
    pub projection_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityOption {
    pub level: &'static str,
    pub calories: f64,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalorieDetailed {
    #[serde(flatten)]
    pub simple: CalorieSimple,
    pub harris_benedict_bmr: f64,
    pub activity_multiplier: f64,
    pub goal: &'static str,
    pub goal_calories: GoalCalories,
    pub all_activity_levels: Vec<ActivityOption>,
    pub macronutrients: GoalMacros,
    pub meal_distribution: Vec<MealPlan>,
    pub hydration: Hydration,
    pub weekly_projection: WeeklyProjection,
    pub weight_kg: f64,
    pub weight_lbs: f64,
    pub height_cm: f64,
    pub height_inches: f64,
    pub recommendations: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

struct Plan {
    gender: Gender,
    age: f64,
    weight_kg: f64,
    height_cm: f64,
    activity: ActivityLevel,
    goal: WeightGoal,
    bmr: f64,
    maintenance: f64,
}

fn plan(request: &CalorieRequest) -> CalcResult<Plan> {
    let gender = Gender::parse(&request.gender)?;
    Validator::new(CalorieCalculator::NAME)
        .range("age", request.age, 1.0, 120.0)
        .positive("weight", request.weight)
        .positive("height", request.height)
        .finish()?;

    let height_cm = request.unit_system.height_cm(request.height);
    let weight_kg = request.unit_system.weight_kg(request.weight);
    Validator::new(CalorieCalculator::NAME)
        .range("height", height_cm, 50.0, 300.0)
        .range("weight", weight_kg, 20.0, 500.0)
        .finish()?;

    let activity = ActivityLevel::parse(&request.activity)?;
    let goal = WeightGoal::parse(&request.goal)?;
    let bmr = mifflin_st_jeor(gender, weight_kg, height_cm, request.age);

    Ok(Plan {
        gender,
        age: request.age,
        weight_kg,
        height_cm,
        activity,
        goal,
        bmr,
        maintenance: bmr * activity.multiplier(),
    })
}

fn goal_calories(maintenance: f64, goal: WeightGoal) -> GoalCalories {
    let option = |option, delta: f64, rate, description| GoalOption {
        option,
        calories: round_money(maintenance + delta),
        rate,
        description,
    };
    match goal {
        WeightGoal::Lose => GoalCalories {
            calories: round_money(maintenance - 500.0),
            rate: "0.5 kg/week",
            description: "Sustainable weight loss",
            options: vec![
                option("extreme", -1000.0, "1 kg/week", "Aggressive weight loss"),
                option("moderate", -500.0, "0.5 kg/week", "Sustainable weight loss"),
                option("mild", -250.0, "0.25 kg/week", "Slow weight loss"),
            ],
        },
        WeightGoal::Gain => GoalCalories {
            calories: round_money(maintenance + 500.0),
            rate: "0.5 kg/week",
            description: "Muscle building",
            options: vec![
                option("mild", 250.0, "0.25 kg/week", "Lean muscle gain"),
                option("moderate", 500.0, "0.5 kg/week", "Muscle building"),
                option("aggressive", 750.0, "0.75 kg/week", "Rapid muscle gain"),
            ],
        },
        WeightGoal::Maintain => GoalCalories {
            calories: round_money(maintenance),
            rate: "0 kg/week",
            description: "Maintain current weight",
            options: Vec::new(),
        },
    }
}

/// Meal splits for 3 to 6 meals a day
pub fn meal_distribution(total: f64) -> Vec<MealPlan> {
    let slots = |shares: &[(&'static str, f64)]| {
        shares
            .iter()
            .map(|&(meal, share)| MealSlot {
                meal,
                calories: round_dp(total * share, 0),
            })
            .collect::<Vec<_>>()
    };
    let sixth = 1.0 / 6.0;

    vec![
        MealPlan {
            meals_per_day: 3,
            slots: slots(&[("breakfast", 0.30), ("lunch", 0.40), ("dinner", 0.30)]),
            description: "Traditional 3 meals per day",
        },
        MealPlan {
            meals_per_day: 4,
            slots: slots(&[("breakfast", 0.25), ("lunch", 0.30), ("snack", 0.15), ("dinner", 0.30)]),
            description: "3 meals + 1 snack",
        },
        MealPlan {
            meals_per_day: 5,
            slots: slots(&[
                ("breakfast", 0.20),
                ("morning_snack", 0.15),
                ("lunch", 0.25),
                ("afternoon_snack", 0.15),
                ("dinner", 0.25),
            ]),
            description: "3 meals + 2 snacks (recommended for muscle gain)",
        },
        MealPlan {
            meals_per_day: 6,
            slots: slots(&[
                ("meal_1", sixth),
                ("meal_2", sixth),
                ("meal_3", sixth),
                ("meal_4", sixth),
                ("meal_5", sixth),
                ("meal_6", sixth),
            ]),
            description: "Frequent small meals (for athletes/bodybuilders)",
        },
    ]
}

fn hydration(weight_kg: f64, activity: ActivityLevel) -> Hydration {
    let bonus = match activity {
        ActivityLevel::Sedentary => 0.0,
        ActivityLevel::Light => 0.5,
        ActivityLevel::Moderate => 1.0,
        ActivityLevel::Active => 1.5,
        ActivityLevel::VeryActive => 2.0,
    };
    let liters = weight_kg * 0.033 + bonus;
    let rounded = round_dp(liters, 1);
    Hydration {
        liters_per_day: rounded,
        ml_per_day: round_dp(liters * 1000.0, 0),
        cups_per_day: round_dp(liters * 4.22, 1),
        ounces_per_day: round_dp(liters * 33.814, 1),
        recommendation: format!("Drink {}L throughout the day", rounded),
        note: "Increase during hot weather or intense exercise",
    }
}

fn weekly_projection(maintenance: f64, target: f64) -> WeeklyProjection {
    let daily = target - maintenance;
    let weekly = daily * 7.0;
    let weekly_kg = weekly / KCAL_PER_KG;
    let monthly_kg = weekly_kg * WEEKS_PER_MONTH;
    WeeklyProjection {
        daily_difference: round_dp(daily, 0),
        weekly_difference: round_dp(weekly, 0),
        weekly_weight_change_kg: round_money(weekly_kg),
        weekly_weight_change_lbs: round_money(weekly_kg * LBS_PER_KG),
        monthly_weight_change_kg: round_money(monthly_kg),
        monthly_weight_change_lbs: round_money(monthly_kg * LBS_PER_KG),
        projection_type: if daily > 0.0 {
            "gain"
        } else if daily < 0.0 {
            "loss"
        } else {
            "maintenance"
        },
    }
}

fn recommendations(goal: WeightGoal, activity: ActivityLevel, age: f64) -> Vec<&'static str> {
    let mut recs = match goal {
        WeightGoal::Lose => vec![
            "Prioritize protein to preserve muscle mass during weight loss",
            "Eat plenty of vegetables for volume and nutrients",
            "Track your food intake consistently",
            "Aim for 0.5-1 kg weight loss per week for sustainability",
            "Don't go below 1200 calories (women) or 1500 calories (men)",
            "Include strength training to maintain muscle",
        ],
        WeightGoal::Gain => vec![
            "Eat in a slight surplus (250-500 calories above maintenance)",
            "Consume protein with every meal (1.6-2.2g per kg body weight)",
            "Focus on nutrient-dense, calorie-rich foods",
            "Combine with progressive resistance training",
            "Be patient - aim for 0.25-0.5 kg gain per week",
            "Track progress with measurements, not just scale weight",
        ],
        WeightGoal::Maintain => vec![
            "Maintain consistent eating patterns",
            "Focus on whole, unprocessed foods",
            "Balance macronutrients for sustained energy",
            "Listen to hunger and fullness cues",
            "Stay active and exercise regularly",
        ],
    };
    if matches!(activity, ActivityLevel::Sedentary | ActivityLevel::Light) {
        recs.push("Consider increasing daily activity for better health");
    }
    if age > 50.0 {
        recs.push("Ensure adequate protein and calcium for bone health");
    }
    recs
}

pub struct CalorieCalculator;

impl Calculator for CalorieCalculator {
    type Request = CalorieRequest;
    type Simple = CalorieSimple;
    type Detailed = CalorieDetailed;
    const NAME: &'static str = "calorie";

    fn simple(request: &CalorieRequest) -> CalcResult<CalorieSimple> {
        let p = plan(request)?;
        Ok(CalorieSimple {
            calories: goal_calories(p.maintenance, p.goal).calories,
            bmr: round_money(p.bmr),
            maintain: round_money(p.maintenance),
            lose: round_money(p.maintenance - 500.0),
            gain: round_money(p.maintenance + 500.0),
            activity: request.activity.clone(),
        })
    }

    fn detailed(request: &CalorieRequest) -> CalcResult<CalorieDetailed> {
        let simple = Self::simple(request)?;
        let p = plan(request)?;
        let goal = goal_calories(p.maintenance, p.goal);
        let target = goal.calories;
        let (protein, carbs, fat) = p.goal.macro_ratio();

        Ok(CalorieDetailed {
            simple,
            harris_benedict_bmr: round_money(harris_benedict(p.gender, p.weight_kg, p.height_cm, p.age)),
            activity_multiplier: p.activity.multiplier(),
            goal: p.goal.as_str(),
            all_activity_levels: ActivityLevel::ALL
                .iter()
                .map(|level| ActivityOption {
                    level: level.key(),
                    calories: round_money(p.bmr * level.multiplier()),
                    description: level.description(),
                })
                .collect(),
            macronutrients: GoalMacros {
                split: macro_split(target, protein, carbs, fat),
                fiber_grams: round_dp(target / 1000.0 * 14.0, 1),
                distribution_type: format!("Optimized for {}", p.goal.as_str()),
            },
            meal_distribution: meal_distribution(target),
            hydration: hydration(p.weight_kg, p.activity),
            weekly_projection: weekly_projection(p.maintenance, target),
            goal_calories: goal,
            weight_kg: round_money(p.weight_kg),
            weight_lbs: round_money(p.weight_kg * LBS_PER_KG),
            height_cm: round_money(p.height_cm),
            height_inches: round_money(p.height_cm / CM_PER_INCH),
            recommendations: recommendations(p.goal, p.activity, p.age),
            notes: vec![
                "Caloric needs are estimates and may vary by individual",
                "Adjust based on actual results over 2-4 weeks",
                "Consult healthcare provider before major dietary changes",
                "Quality of calories matters as much as quantity",
                "Stay consistent with tracking for best results",
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(activity: &str, goal: &str) -> CalorieRequest {
        CalorieRequest {
            gender: "female".to_string(),
            age: 28.0,
            weight: 60.0,
            height: 165.0,
            activity: activity.to_string(),
            goal: goal.to_string(),
            unit_system: UnitSystem::Metric,
        }
    }

    #[test]
    fn test_simple_targets() {
        // Mifflin female: 600 + 1031.25 - 140 - 161 = 1330.25
        let result = CalorieCalculator::simple(&request("sedentary", "lose")).unwrap();
        assert_eq!(result.bmr, 1330.25);
        assert_eq!(result.maintain, 1596.3);
        assert_eq!(result.lose, 1096.3);
        assert_eq!(result.gain, 2096.3);
        assert_eq!(result.calories, result.lose, "lose goal targets the moderate deficit");
        assert_eq!(result.activity, "sedentary");
    }

    #[test]
    fn test_unknown_activity_rejected() {
        let err = CalorieCalculator::simple(&request("couch", "maintain")).unwrap_err();
        assert_eq!(err.kind(), "unsupported_option");
        assert!(CalorieCalculator::simple(&request("light", "bulk")).is_err());
    }

    #[test]
    fn test_detailed_projection_and_meals() {
        let detailed = CalorieCalculator::detailed(&request("moderate", "gain")).unwrap();
        assert_eq!(detailed.weekly_projection.projection_type, "gain");
        assert_eq!(detailed.weekly_projection.weekly_difference, 3500.0);
        assert_eq!(detailed.meal_distribution.len(), 4);
        assert_eq!(detailed.macronutrients.split.carbs.percentage, 45);
        assert_eq!(detailed.goal_calories.options.len(), 3);
        // 60 × 0.033 + 1.0
        assert_eq!(detailed.hydration.liters_per_day, 3.0);
    }
}
