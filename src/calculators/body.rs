// 🧍 Body Metrics - shared by the health calculators
// Gender, BMR formulas and activity multipliers in one canonical (metric) place

use crate::errors::{CalcError, CalcResult};
use crate::rounding::round_dp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(CalcError::unsupported("gender", value)),
        }
    }

    pub fn parse_opt(value: Option<&str>) -> CalcResult<Option<Self>> {
        value.map(Gender::parse).transpose()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

// ============================================================================
// BMR FORMULAS (weight kg, height cm, age years)
// ============================================================================

/// Harris-Benedict, revised 1984 coefficients
pub fn harris_benedict(gender: Gender, weight: f64, height: f64, age: f64) -> f64 {
    match gender {
        Gender::Male => 88.362 + 13.397 * weight + 4.799 * height - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight + 3.098 * height - 4.330 * age,
    }
}

pub fn mifflin_st_jeor(gender: Gender, weight: f64, height: f64, age: f64) -> f64 {
    let base = 10.0 * weight + 6.25 * height - 5.0 * age;
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Katch-McArdle on lean body mass
pub fn katch_mcardle(weight: f64, body_fat_percent: f64) -> f64 {
    let lean_mass = weight * (1.0 - body_fat_percent / 100.0);
    370.0 + 21.6 * lean_mass
}

// ============================================================================
// ACTIVITY LEVELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// Short keys, plus the unambiguous long forms
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Ok(ActivityLevel::Light),
            "moderate" | "moderately_active" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" | "extremely_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(CalcError::unsupported("activity level", value)),
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Long label used by the BMR activity table, where "very_active" means 1.725
    pub fn bmr_key(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "lightly_active",
            ActivityLevel::Moderate => "moderately_active",
            ActivityLevel::Active => "very_active",
            ActivityLevel::VeryActive => "extremely_active",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very Active",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise, desk job",
            ActivityLevel::Light => "Light exercise 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days/week",
            ActivityLevel::Active => "Hard exercise 6-7 days/week",
            ActivityLevel::VeryActive => "Very hard exercise, physical job, training twice/day",
        }
    }
}

// ============================================================================
// MACRONUTRIENTS
// ============================================================================

pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroAmount {
    pub grams: f64,
    pub percentage: u32,
    pub calories: f64,
}

impl MacroAmount {
    fn of(calories: f64, percentage: u32, kcal_per_gram: f64) -> Self {
        let share = calories * f64::from(percentage) / 100.0;
        MacroAmount {
            grams: round_dp(share / kcal_per_gram, 1),
            percentage,
            calories: round_dp(share, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: MacroAmount,
    pub carbs: MacroAmount,
    pub fats: MacroAmount,
}

/// Split a calorie budget by protein/carbs/fat percentages
pub fn macro_split(calories: f64, protein: u32, carbs: u32, fat: u32) -> MacroSplit {
    MacroSplit {
        protein: MacroAmount::of(calories, protein, KCAL_PER_GRAM_PROTEIN),
        carbs: MacroAmount::of(calories, carbs, KCAL_PER_GRAM_CARBS),
        fats: MacroAmount::of(calories, fat, KCAL_PER_GRAM_FAT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Male").unwrap(), Gender::Male);
        assert_eq!(Gender::parse(" female ").unwrap(), Gender::Female);
        assert!(Gender::parse("robot").is_err());
        assert_eq!(Gender::parse_opt(None).unwrap(), None);
    }

    #[test]
    fn test_bmr_formulas() {
        // 30 y, 70 kg, 175 cm male
        let hb = harris_benedict(Gender::Male, 70.0, 175.0, 30.0);
        assert!((hb - 1695.667).abs() < 0.01, "got {}", hb);
        let msj = mifflin_st_jeor(Gender::Male, 70.0, 175.0, 30.0);
        assert!((msj - 1648.75).abs() < 1e-9);
        let km = katch_mcardle(70.0, 20.0);
        assert!((km - 1579.6).abs() < 1e-9);
    }

    #[test]
    fn test_activity_aliases() {
        assert_eq!(ActivityLevel::parse("lightly_active").unwrap(), ActivityLevel::Light);
        assert_eq!(ActivityLevel::parse("extremely_active").unwrap(), ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::parse("moderate").unwrap().multiplier(), 1.55);
        assert!(ActivityLevel::parse("couch").is_err());
    }

    #[test]
    fn test_macro_split() {
        let split = macro_split(2000.0, 30, 40, 30);
        assert_eq!(split.protein.grams, 150.0);
        assert_eq!(split.carbs.grams, 200.0);
        assert_eq!(split.fats.grams, 66.7);
        assert_eq!(split.fats.calories, 600.0);
    }
}
