// 💧 Water Intake Calculator
// 33 ml/kg scaled by activity, climate, gender, age and pregnancy status

use super::body::{ActivityLevel, Gender};
use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{weight_to_kg, Validator};
use serde::{Deserialize, Serialize};

const ML_PER_KG: f64 = 33.0;
const OZ_PER_ML: f64 = 0.033814;
const ML_PER_GLASS: f64 = 250.0;
const WAKING_HOURS: f64 = 16.0;
const FOOD_SHARE: f64 = 0.2;

/// (time, base ml, note); scaled to the daily total
const SCHEDULE: [(&str, f64, &str); 8] = [
    ("7:00 AM", 250.0, "Start your day hydrated"),
    ("9:00 AM", 250.0, "Mid-morning hydration"),
    ("11:00 AM", 250.0, "Before lunch"),
    ("1:00 PM", 250.0, "After lunch"),
    ("3:00 PM", 250.0, "Afternoon boost"),
    ("5:00 PM", 250.0, "Before dinner"),
    ("7:00 PM", 250.0, "Evening hydration"),
    ("9:00 PM", 200.0, "Before bed (light)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Climate {
    Cold,
    Moderate,
    Hot,
}

impl Climate {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "cold" => Ok(Climate::Cold),
            "moderate" | "" => Ok(Climate::Moderate),
            "hot" => Ok(Climate::Hot),
            _ => Err(CalcError::unsupported("climate", value)),
        }
    }

    pub fn adjustment_ml(&self) -> f64 {
        match self {
            Climate::Cold => 0.0,
            Climate::Moderate => 200.0,
            Climate::Hot => 500.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Climate::Cold => "Cold",
            Climate::Moderate => "Moderate",
            Climate::Hot => "Hot",
        }
    }
}

pub fn hydration_multiplier(activity: ActivityLevel) -> f64 {
    match activity {
        ActivityLevel::Sedentary => 1.0,
        ActivityLevel::Light => 1.1,
        ActivityLevel::Moderate => 1.2,
        ActivityLevel::Active => 1.3,
        ActivityLevel::VeryActive => 1.5,
    }
}

fn default_climate() -> String {
    "moderate".to_string()
}

fn default_gender() -> String {
    "male".to_string()
}

fn default_age() -> f64 {
    30.0
}

fn default_weight_unit() -> String {
    "kg".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaterIntakeRequest {
    pub weight: f64,
    pub activity_level: String,
    #[serde(default = "default_climate")]
    pub climate: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default = "default_age")]
    pub age: f64,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default)]
    pub breastfeeding: bool,
}

impl WaterIntakeRequest {
    pub fn new(weight: f64, activity_level: &str) -> Self {
        WaterIntakeRequest {
            weight,
            activity_level: activity_level.to_string(),
            climate: default_climate(),
            gender: default_gender(),
            age: default_age(),
            weight_unit: default_weight_unit(),
            pregnant: false,
            breastfeeding: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntakeSimple {
    pub total_intake_ml: f64,
    pub total_intake_liters: f64,
    pub total_intake_oz: f64,
    pub total_intake_cups: f64,
    pub total_intake_glasses: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrinkSlot {
    pub time: &'static str,
    pub amount_ml: f64,
    pub amount_oz: f64,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaterIntakeDetailed {
    #[serde(flatten)]
    pub simple: WaterIntakeSimple,
    pub weight: f64,
    pub weight_unit: String,
    pub activity_level: String,
    pub climate: &'static str,
    pub water_to_drink_ml: f64,
    pub water_to_drink_liters: f64,
    pub food_hydration_ml: f64,
    pub hourly_intake_ml: f64,
    pub hourly_intake_oz: f64,
    pub drinking_schedule: Vec<DrinkSlot>,
    pub recommendations: Vec<&'static str>,
    pub hydration_tips: Vec<&'static str>,
    pub signs_of_dehydration: Vec<&'static str>,
    pub benefits: Vec<&'static str>,
}

struct Intake {
    total_ml: f64,
    activity: ActivityLevel,
    climate: Climate,
}

fn intake(request: &WaterIntakeRequest) -> CalcResult<Intake> {
    let weight_kg = weight_to_kg(request.weight, &request.weight_unit)?;
    Validator::new(WaterIntakeCalculator::NAME)
        .positive("weight", weight_kg)
        .range("age", request.age, 1.0, 120.0)
        .finish()?;
    let activity = ActivityLevel::parse(&request.activity_level)?;
    let climate = Climate::parse(&request.climate)?;
    let gender = Gender::parse(&request.gender)?;

    let mut total = weight_kg * ML_PER_KG * hydration_multiplier(activity) + climate.adjustment_ml();
    if gender == Gender::Male {
        total *= 1.05;
    }
    if request.age > 65.0 {
        total *= 1.1;
    } else if request.age < 18.0 {
        total *= 0.9;
    }
    if request.pregnant {
        total += 300.0;
    }
    if request.breastfeeding {
        total += 700.0;
    }

    Ok(Intake {
        total_ml: total,
        activity,
        climate,
    })
}

pub fn drinking_schedule(total_ml: f64) -> Vec<DrinkSlot> {
    let planned: f64 = SCHEDULE.iter().map(|(_, ml, _)| ml).sum();
    let ratio = total_ml / planned;
    SCHEDULE
        .iter()
        .map(|&(time, ml, note)| {
            let amount = round_dp(ml * ratio, 0);
            DrinkSlot {
                time,
                amount_ml: amount,
                amount_oz: round_dp(amount * OZ_PER_ML, 1),
                note,
            }
        })
        .collect()
}

fn recommendations(request: &WaterIntakeRequest, i: &Intake) -> Vec<&'static str> {
    let mut recs = Vec::new();
    if matches!(i.activity, ActivityLevel::Active | ActivityLevel::VeryActive) {
        recs.push("Drink extra water before, during, and after exercise");
        recs.push("Consider electrolyte drinks for intense workouts");
    }
    if i.climate == Climate::Hot {
        recs.push("Increase water intake in hot weather to prevent dehydration");
        recs.push("Avoid prolonged sun exposure during peak hours");
    }
    if request.age > 65.0 {
        recs.push("Elderly individuals may not feel thirsty - drink regularly");
    }
    if request.pregnant {
        recs.push("Adequate hydration is crucial during pregnancy");
    }
    if request.breastfeeding {
        recs.push("Breastfeeding mothers need extra fluids");
    }
    recs.extend([
        "Drink water consistently throughout the day",
        "Monitor urine color - pale yellow indicates good hydration",
        "Eat water-rich foods like fruits and vegetables",
    ]);
    recs
}

pub struct WaterIntakeCalculator;

impl Calculator for WaterIntakeCalculator {
    type Request = WaterIntakeRequest;
    type Simple = WaterIntakeSimple;
    type Detailed = WaterIntakeDetailed;
    const NAME: &'static str = "water_intake";

    fn simple(request: &WaterIntakeRequest) -> CalcResult<WaterIntakeSimple> {
        let ml = intake(request)?.total_ml;
        let oz = ml * OZ_PER_ML;
        Ok(WaterIntakeSimple {
            total_intake_ml: round_dp(ml, 0),
            total_intake_liters: round_money(ml / 1000.0),
            total_intake_oz: round_dp(oz, 1),
            total_intake_cups: round_dp(oz / 8.0, 1),
            total_intake_glasses: round_dp(ml / ML_PER_GLASS, 1),
        })
    }

    fn detailed(request: &WaterIntakeRequest) -> CalcResult<WaterIntakeDetailed> {
        let simple = Self::simple(request)?;
        let i = intake(request)?;
        let food = i.total_ml * FOOD_SHARE;
        let drink = i.total_ml - food;
        let hourly = i.total_ml / WAKING_HOURS;

        Ok(WaterIntakeDetailed {
            weight: request.weight,
            weight_unit: request.weight_unit.clone(),
            activity_level: i.activity.label().to_string(),
            climate: i.climate.label(),
            water_to_drink_ml: round_dp(drink, 0),
            water_to_drink_liters: round_money(drink / 1000.0),
            food_hydration_ml: round_dp(food, 0),
            hourly_intake_ml: round_dp(hourly, 0),
            hourly_intake_oz: round_dp(hourly * OZ_PER_ML, 1),
            drinking_schedule: drinking_schedule(i.total_ml),
            recommendations: recommendations(request, &i),
            hydration_tips: vec![
                "Carry a reusable water bottle with you",
                "Set reminders on your phone to drink water",
                "Drink a glass of water before each meal",
                "Flavor water with lemon, cucumber, or mint if plain water is boring",
                "Track your water intake with an app or journal",
                "Drink water when you wake up to rehydrate after sleep",
            ],
            signs_of_dehydration: vec![
                "Dark yellow urine",
                "Dry mouth and lips",
                "Headache",
                "Fatigue and dizziness",
                "Decreased urination",
                "Dry skin",
                "Rapid heartbeat",
            ],
            benefits: vec![
                "Improved physical performance",
                "Better cognitive function and concentration",
                "Healthy skin and complexion",
                "Proper digestion and metabolism",
                "Temperature regulation",
                "Joint lubrication",
                "Toxin removal and kidney function",
                "Weight management support",
            ],
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_intake() {
        // (70 × 33 × 1.2 + 200) × 1.05 = 3120.6
        let r = WaterIntakeCalculator::simple(&WaterIntakeRequest::new(70.0, "moderate")).unwrap();
        assert_eq!(r.total_intake_ml, 3121.0);
        assert_eq!(r.total_intake_liters, 3.12);
        println!("✅ Water intake baseline test PASSED");
    }

    #[test]
    fn test_adjustments() {
        let mut req = WaterIntakeRequest::new(60.0, "sedentary");
        req.gender = "female".to_string();
        req.climate = "cold".to_string();
        let base = WaterIntakeCalculator::simple(&req).unwrap();
        // 60 × 33
        assert_eq!(base.total_intake_ml, 1980.0);

        req.pregnant = true;
        req.breastfeeding = true;
        let more = WaterIntakeCalculator::simple(&req).unwrap();
        assert_eq!(more.total_intake_ml, 2980.0);

        req.pregnant = false;
        req.breastfeeding = false;
        req.age = 70.0;
        assert_eq!(WaterIntakeCalculator::simple(&req).unwrap().total_intake_ml, 2178.0);
    }

    #[test]
    fn test_unknown_options_rejected() {
        let mut req = WaterIntakeRequest::new(70.0, "couch");
        assert!(WaterIntakeCalculator::simple(&req).is_err());
        req.activity_level = "active".to_string();
        req.climate = "arctic".to_string();
        assert!(WaterIntakeCalculator::simple(&req).is_err());
        req.climate = "hot".to_string();
        req.age = 0.0;
        assert!(WaterIntakeCalculator::simple(&req).is_err());
    }

    #[test]
    fn test_schedule_sums_to_total() {
        let schedule = drinking_schedule(3900.0);
        assert_eq!(schedule.len(), 8);
        let sum: f64 = schedule.iter().map(|s| s.amount_ml).sum();
        assert!((sum - 3900.0).abs() <= 4.0);

        let mut req = WaterIntakeRequest::new(80.0, "very_active");
        req.climate = "hot".to_string();
        let d = WaterIntakeCalculator::detailed(&req).unwrap();
        assert_eq!(d.activity_level, "Very Active");
        assert!(d.recommendations.len() >= 7);
    }
}
