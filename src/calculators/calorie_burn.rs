// 🔥 Calorie Burn Calculator
// MET × kg × hours for single activities and whole sessions

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{weight_to_kg, KG_PER_POUND, ValidationError, Validator};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const KCAL_PER_POUND_FAT: f64 = 3500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetActivity {
    pub name: &'static str,
    pub met: f64,
}

/// Compendium MET values, keyed by activity id
pub static ACTIVITY_METS: Lazy<BTreeMap<&'static str, MetActivity>> = Lazy::new(|| {
    [
        ("walking_slow", "Walking (2 mph)", 2.5),
        ("walking_moderate", "Walking (3.5 mph)", 4.0),
        ("walking_fast", "Walking (4.5 mph)", 5.0),
        ("running_5mph", "Running (5 mph)", 8.0),
        ("running_6mph", "Running (6 mph)", 10.0),
        ("running_8mph", "Running (8 mph)", 13.5),
        ("cycling_leisure", "Cycling (leisure)", 4.0),
        ("cycling_moderate", "Cycling (12-14 mph)", 8.0),
        ("cycling_vigorous", "Cycling (16-19 mph)", 12.0),
        ("swimming_leisure", "Swimming (leisure)", 6.0),
        ("swimming_moderate", "Swimming (moderate)", 8.0),
        ("swimming_vigorous", "Swimming (vigorous)", 11.0),
        ("yoga", "Yoga", 2.5),
        ("pilates", "Pilates", 3.0),
        ("weight_training", "Weight Training", 6.0),
        ("aerobics_low", "Aerobics (low impact)", 5.0),
        ("aerobics_high", "Aerobics (high impact)", 7.0),
        ("dancing", "Dancing", 4.5),
        ("basketball", "Basketball", 6.5),
        ("soccer", "Soccer", 7.0),
        ("tennis", "Tennis", 7.3),
        ("hiking", "Hiking", 6.0),
        ("jump_rope", "Jump Rope", 12.0),
        ("rowing", "Rowing Machine", 7.0),
        ("elliptical", "Elliptical", 5.0),
        ("stair_climbing", "Stair Climbing", 8.0),
        ("gardening", "Gardening", 4.0),
        ("cleaning", "House Cleaning", 3.5),
        ("golf", "Golf (walking)", 4.8),
        ("bowling", "Bowling", 3.0),
    ]
    .into_iter()
    .map(|(key, name, met)| (key, MetActivity { name, met }))
    .collect()
});

pub fn lookup_activity(key: &str) -> CalcResult<MetActivity> {
    ACTIVITY_METS
        .get(key.trim().to_lowercase().as_str())
        .copied()
        .ok_or_else(|| CalcError::unsupported("activity", key))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub activity: String,
    pub duration: f64,
}

fn default_weight_unit() -> String {
    "kg".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalorieBurnRequest {
    pub weight: f64,
    #[serde(default)]
    pub activity: Option<String>,
    /// Minutes
    #[serde(default)]
    pub duration: Option<f64>,
    /// Whole session; takes precedence over `activity`
    #[serde(default)]
    pub activities: Option<Vec<ActivityEntry>>,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
}

impl CalorieBurnRequest {
    pub fn single(weight: f64, activity: &str, minutes: f64) -> Self {
        CalorieBurnRequest {
            weight,
            activity: Some(activity.to_string()),
            duration: Some(minutes),
            activities: None,
            weight_unit: default_weight_unit(),
        }
    }

    pub fn session(weight: f64, activities: Vec<ActivityEntry>) -> Self {
        CalorieBurnRequest {
            weight,
            activity: None,
            duration: None,
            activities: Some(activities),
            weight_unit: default_weight_unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBurn {
    pub activity: String,
    pub duration_minutes: f64,
    pub met_value: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieBurnSimple {
    pub calories_burned: f64,
    pub duration_minutes: f64,
    pub calories_per_minute: f64,
    pub calories_per_hour: f64,
    pub weight: f64,
    pub weight_unit: String,
    pub activities: Vec<ActivityBurn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Equivalents {
    pub walking_minutes: f64,
    pub running_minutes: f64,
    pub cycling_minutes: f64,
    pub swimming_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalorieBurnDetailed {
    #[serde(flatten)]
    pub simple: CalorieBurnSimple,
    /// Duration-weighted for sessions
    pub average_met: f64,
    pub intensity: &'static str,
    pub fat_burned_lbs: f64,
    pub fat_burned_kg: f64,
    pub equivalents: Equivalents,
    pub recommendations: Vec<&'static str>,
}

pub fn intensity(met: f64) -> &'static str {
    match met {
        m if m < 3.0 => "Light",
        m if m < 6.0 => "Moderate",
        m if m < 9.0 => "Vigorous",
        _ => "Very Vigorous",
    }
}

/// kcal = MET × kg × hours
pub fn calories_burned(met: f64, weight_kg: f64, minutes: f64) -> f64 {
    met * weight_kg * minutes / 60.0
}

fn equivalents(calories: f64, weight_kg: f64) -> Equivalents {
    let minutes_at = |met: f64| round_dp(calories / (met * weight_kg / 60.0), 0);
    Equivalents {
        walking_minutes: minutes_at(4.0),
        running_minutes: minutes_at(10.0),
        cycling_minutes: minutes_at(8.0),
        swimming_minutes: minutes_at(8.0),
    }
}

fn recommendations(met: f64, minutes: f64) -> Vec<&'static str> {
    let mut recs = Vec::new();
    if met < 3.0 {
        recs.push("Consider increasing intensity for better calorie burn");
    }
    if minutes < 30.0 {
        recs.push("Aim for at least 30 minutes of activity for optimal benefits");
    }
    if met >= 6.0 {
        recs.push("Great job! This is a vigorous activity");
    }
    recs.push("Stay hydrated during and after exercise");
    recs.push("Combine with a balanced diet for best results");
    recs
}

struct Session {
    weight_kg: f64,
    entries: Vec<ActivityBurn>,
    calories: f64,
    minutes: f64,
    met_minutes: f64,
}

fn session(request: &CalorieBurnRequest) -> CalcResult<Session> {
    let weight_kg = weight_to_kg(request.weight, &request.weight_unit)?;
    Validator::new(CalorieBurnCalculator::NAME)
        .positive("weight", weight_kg)
        .finish()?;

    let entries: Vec<ActivityEntry> = match (&request.activities, &request.activity) {
        (Some(list), _) => list.clone(),
        (None, Some(activity)) => vec![ActivityEntry {
            activity: activity.clone(),
            duration: request.duration.unwrap_or(0.0),
        }],
        (None, None) => {
            return Err(CalcError::Validation(ValidationError::new(
                "activity",
                "provide an activity or a list of activities",
                CalorieBurnCalculator::NAME,
            )))
        }
    };

    let mut v = Validator::new(CalorieBurnCalculator::NAME).not_empty("activities", &entries);
    for e in &entries {
        v = v.positive("duration", e.duration);
    }
    v.finish()?;

    let mut burns = Vec::with_capacity(entries.len());
    let (mut calories, mut minutes, mut met_minutes) = (0.0, 0.0, 0.0);
    for e in &entries {
        let met = lookup_activity(&e.activity)?;
        let kcal = calories_burned(met.met, weight_kg, e.duration);
        calories += kcal;
        minutes += e.duration;
        met_minutes += met.met * e.duration;
        burns.push(ActivityBurn {
            activity: met.name.to_string(),
            duration_minutes: e.duration,
            met_value: met.met,
            calories_burned: round_money(kcal),
        });
    }

    Ok(Session {
        weight_kg,
        entries: burns,
        calories,
        minutes,
        met_minutes,
    })
}

pub struct CalorieBurnCalculator;

impl Calculator for CalorieBurnCalculator {
    type Request = CalorieBurnRequest;
    type Simple = CalorieBurnSimple;
    type Detailed = CalorieBurnDetailed;
    const NAME: &'static str = "calorie_burn";

    fn simple(request: &CalorieBurnRequest) -> CalcResult<CalorieBurnSimple> {
        let s = session(request)?;
        let per_minute = s.calories / s.minutes;
        Ok(CalorieBurnSimple {
            calories_burned: round_money(s.calories),
            duration_minutes: s.minutes,
            calories_per_minute: round_money(per_minute),
            calories_per_hour: round_money(per_minute * 60.0),
            weight: request.weight,
            weight_unit: request.weight_unit.clone(),
            activities: s.entries,
        })
    }

    fn detailed(request: &CalorieBurnRequest) -> CalcResult<CalorieBurnDetailed> {
        let simple = Self::simple(request)?;
        let s = session(request)?;
        let average_met = s.met_minutes / s.minutes;
        let fat_lbs = s.calories / KCAL_PER_POUND_FAT;

        Ok(CalorieBurnDetailed {
            average_met: round_money(average_met),
            intensity: intensity(average_met),
            fat_burned_lbs: round_dp(fat_lbs, 4),
            fat_burned_kg: round_dp(fat_lbs * KG_PER_POUND, 4),
            equivalents: equivalents(s.calories, s.weight_kg),
            recommendations: recommendations(average_met, s.minutes),
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_activity() {
        let r = CalorieBurnCalculator::simple(&CalorieBurnRequest::single(70.0, "running_6mph", 30.0))
            .unwrap();
        // 10 × 70 × 0.5
        assert_eq!(r.calories_burned, 350.0);
        assert_eq!(r.calories_per_hour, 700.0);
        assert_eq!(r.activities[0].activity, "Running (6 mph)");
        println!("✅ Calorie burn single activity test PASSED");
    }

    #[test]
    fn test_unknown_activity_is_rejected() {
        let err = CalorieBurnCalculator::simple(&CalorieBurnRequest::single(70.0, "parkour", 30.0));
        assert!(matches!(err, Err(CalcError::UnsupportedOption { .. })));
    }

    #[test]
    fn test_session_totals() {
        let req = CalorieBurnRequest::session(
            80.0,
            vec![
                ActivityEntry { activity: "yoga".into(), duration: 60.0 },
                ActivityEntry { activity: "jump_rope".into(), duration: 15.0 },
            ],
        );
        let r = CalorieBurnCalculator::simple(&req).unwrap();
        // 2.5 × 80 + 12 × 80 × 0.25
        assert_eq!(r.calories_burned, 440.0);
        assert_eq!(r.duration_minutes, 75.0);

        let d = CalorieBurnCalculator::detailed(&req).unwrap();
        // (2.5·60 + 12·15) / 75
        assert_eq!(d.average_met, 4.4);
        assert_eq!(d.intensity, "Moderate");
    }

    #[test]
    fn test_detailed_equivalents_and_pounds() {
        let mut req = CalorieBurnRequest::single(154.0, "walking_moderate", 20.0);
        req.weight_unit = "lbs".to_string();
        let d = CalorieBurnCalculator::detailed(&req).unwrap();
        assert_eq!(d.equivalents.walking_minutes, 20.0);
        assert_eq!(d.equivalents.running_minutes, 8.0);
        assert!(d
            .recommendations
            .contains(&"Aim for at least 30 minutes of activity for optimal benefits"));
        assert_eq!(ACTIVITY_METS.len(), 30);
    }

    #[test]
    fn test_validation() {
        assert!(CalorieBurnCalculator::simple(&CalorieBurnRequest::single(0.0, "yoga", 30.0)).is_err());
        assert!(CalorieBurnCalculator::simple(&CalorieBurnRequest::single(70.0, "yoga", 0.0)).is_err());
        assert!(CalorieBurnCalculator::simple(&CalorieBurnRequest::session(70.0, vec![])).is_err());
    }
}
