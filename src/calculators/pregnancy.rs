// 🤰 Pregnancy Calculator
// Naegele's rule adjusted for cycle length, trimester tracking and milestones

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::round_dp;
use crate::validation::{parse_date, reference_date, ValidationError, Validator};
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GESTATION_DAYS: i64 = 280;
const MAX_WEEKS: i64 = 45;

#[derive(Debug, Clone, Copy)]
pub struct FetalStage {
    pub size: &'static str,
    pub length_mm: f64,
    pub weight_g: f64,
    pub milestone: &'static str,
}

/// Reference snapshots keyed by gestational week
static FETAL_STAGES: Lazy<BTreeMap<i64, FetalStage>> = Lazy::new(|| {
    let stage = |size, length_mm, weight_g, milestone| FetalStage {
        size,
        length_mm,
        weight_g,
        milestone,
    };
    BTreeMap::from([
        (4, stage("Poppy seed", 2.0, 0.5, "Embryo implants in uterus")),
        (8, stage("Raspberry", 16.0, 1.0, "All major organs forming")),
        (12, stage("Lime", 54.0, 14.0, "Reflexes developing")),
        (16, stage("Avocado", 116.0, 100.0, "Can hear sounds")),
        (20, stage("Banana", 166.0, 300.0, "Halfway point, movements felt")),
        (24, stage("Corn", 300.0, 600.0, "Lungs developing")),
        (28, stage("Eggplant", 375.0, 1000.0, "Eyes can open")),
        (32, stage("Squash", 425.0, 1700.0, "Rapid brain development")),
        (36, stage("Papaya", 475.0, 2600.0, "Preparing for birth")),
        (40, stage("Watermelon", 510.0, 3400.0, "Full term, ready for birth")),
    ])
});

const MILESTONE_WEEKS: [(i64, &str); 14] = [
    (4, "Positive pregnancy test possible"),
    (8, "First prenatal visit recommended"),
    (10, "End of embryonic period, now a fetus"),
    (12, "End of first trimester, miscarriage risk decreases"),
    (16, "Amniocentesis window (if needed)"),
    (18, "Anatomy scan ultrasound"),
    (20, "Halfway point"),
    (24, "Viability milestone"),
    (28, "Third trimester begins"),
    (32, "Baby may move into head-down position"),
    (36, "Weekly checkups begin"),
    (37, "Early term - baby considered full term"),
    (40, "Due date"),
    (42, "Post-term, induction may be considered"),
];

fn default_cycle() -> i64 {
    28
}

#[derive(Debug, Clone, Deserialize)]
pub struct PregnancyRequest {
    pub last_period: String,
    #[serde(default = "default_cycle")]
    pub cycle_length: i64,
    #[serde(default)]
    pub reference_date: Option<String>,
}

impl PregnancyRequest {
    pub fn new(last_period: &str) -> Self {
        PregnancyRequest {
            last_period: last_period.to_string(),
            cycle_length: default_cycle(),
            reference_date: None,
        }
    }

    pub fn on(mut self, reference: &str) -> Self {
        self.reference_date = Some(reference.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancySimple {
    pub due_date: String,
    pub weeks_pregnant: i64,
    pub days_pregnant: i64,
    pub days_remaining: i64,
    pub trimester: u8,
    pub conception_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrimesterInfo {
    pub trimester: u8,
    pub name: &'static str,
    pub weeks_range: &'static str,
    pub weeks_completed: i64,
    pub weeks_remaining_in_trimester: i64,
    pub description: &'static str,
    pub key_developments: Vec<&'static str>,
    pub common_symptoms: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetalDevelopment {
    pub week: i64,
    pub approximate_size: &'static str,
    pub length_mm: f64,
    pub length_cm: f64,
    pub length_inches: f64,
    pub weight_grams: f64,
    pub weight_ounces: f64,
    pub weight_pounds: f64,
    pub key_milestone: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PregnancyMilestone {
    pub week: i64,
    pub date: String,
    pub description: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_ago: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DueDateRange {
    pub early: String,
    pub expected: String,
    pub late: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportantDates {
    pub first_trimester_end: String,
    pub second_trimester_start: String,
    pub second_trimester_end: String,
    pub third_trimester_start: String,
    pub viability_date: String,
    pub full_term_start: String,
    pub post_term_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PregnancyDetailed {
    #[serde(flatten)]
    pub simple: PregnancySimple,
    pub days_in_current_week: i64,
    pub gestational_age: String,
    pub percentage_complete: f64,
    pub trimester_name: &'static str,
    pub last_menstrual_period: String,
    pub current_date: String,
    pub weeks_remaining: i64,
    pub months_remaining: f64,
    pub due_date_range: DueDateRange,
    pub trimester_information: TrimesterInfo,
    pub fetal_development: FetalDevelopment,
    pub pregnancy_milestones: Vec<PregnancyMilestone>,
    pub important_dates: ImportantDates,
    pub health_tips: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

fn fmt(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn trimester_for(weeks: i64) -> u8 {
    match weeks {
        w if w < 13 => 1,
        w if w < 27 => 2,
        _ => 3,
    }
}

pub fn trimester_name(trimester: u8) -> &'static str {
    match trimester {
        1 => "First Trimester",
        2 => "Second Trimester",
        _ => "Third Trimester",
    }
}

fn trimester_info(weeks: i64) -> TrimesterInfo {
    match trimester_for(weeks) {
        1 => TrimesterInfo {
            trimester: 1,
            name: trimester_name(1),
            weeks_range: "1-12 weeks",
            weeks_completed: weeks,
            weeks_remaining_in_trimester: 12 - weeks,
            description: "Early pregnancy - crucial development period",
            key_developments: vec![
                "Major organs begin to form",
                "Heart starts beating",
                "Neural tube develops",
                "Limbs begin to form",
                "Baby is size of a grape to lime",
            ],
            common_symptoms: vec![
                "Morning sickness",
                "Fatigue",
                "Breast tenderness",
                "Frequent urination",
                "Food aversions or cravings",
            ],
        },
        2 => TrimesterInfo {
            trimester: 2,
            name: trimester_name(2),
            weeks_range: "13-26 weeks",
            weeks_completed: weeks - 13,
            weeks_remaining_in_trimester: 26 - weeks,
            description: "Middle pregnancy - often called the \"golden period\"",
            key_developments: vec![
                "Baby can hear sounds",
                "Movement becomes noticeable",
                "Sex can be determined",
                "Fingerprints form",
                "Baby is size of an avocado to cauliflower",
            ],
            common_symptoms: vec![
                "Reduced nausea",
                "Increased energy",
                "Baby movements (quickening)",
                "Growing belly",
                "Back pain",
            ],
        },
        _ => TrimesterInfo {
            trimester: 3,
            name: trimester_name(3),
            weeks_range: "27-40+ weeks",
            weeks_completed: weeks - 27,
            weeks_remaining_in_trimester: (40 - weeks).max(0),
            description: "Final pregnancy stage - preparing for birth",
            key_developments: vec![
                "Rapid weight gain",
                "Lungs mature",
                "Brain develops rapidly",
                "Baby moves into birth position",
                "Baby is size of a pineapple to watermelon",
            ],
            common_symptoms: vec![
                "Braxton Hicks contractions",
                "Shortness of breath",
                "Frequent urination",
                "Swelling in feet and ankles",
                "Difficulty sleeping",
            ],
        },
    }
}

/// Snapshot from the closest tabulated week (earlier week wins ties)
pub fn fetal_development(weeks: i64) -> FetalDevelopment {
    let (_, stage) = FETAL_STAGES
        .iter()
        .min_by_key(|(week, _)| (*week - weeks).abs())
        .map(|(w, s)| (*w, *s))
        .unwrap_or((40, FETAL_STAGES_FALLBACK));
    FetalDevelopment {
        week: weeks,
        approximate_size: stage.size,
        length_mm: stage.length_mm,
        length_cm: round_dp(stage.length_mm / 10.0, 1),
        length_inches: round_dp(stage.length_mm / 25.4, 1),
        weight_grams: stage.weight_g,
        weight_ounces: round_dp(stage.weight_g / 28.35, 1),
        weight_pounds: round_dp(stage.weight_g / 453.59, 2),
        key_milestone: stage.milestone,
    }
}

const FETAL_STAGES_FALLBACK: FetalStage = FetalStage {
    size: "Watermelon",
    length_mm: 510.0,
    weight_g: 3400.0,
    milestone: "Full term, ready for birth",
};

fn health_tips(trimester: u8) -> Vec<&'static str> {
    match trimester {
        1 => vec![
            "Take prenatal vitamins with folic acid daily",
            "Avoid alcohol, smoking, and certain medications",
            "Stay hydrated and eat small, frequent meals",
            "Get plenty of rest - fatigue is normal",
            "Schedule your first prenatal appointment",
            "Avoid raw or undercooked foods",
            "Manage morning sickness with ginger or crackers",
        ],
        2 => vec![
            "Continue prenatal vitamins",
            "Stay active with pregnancy-safe exercises",
            "Monitor baby movements",
            "Maintain healthy weight gain (0.5-1 lb/week)",
            "Stay hydrated - drink 8-10 glasses of water daily",
            "Sleep on your left side for better circulation",
            "Attend all prenatal appointments and screenings",
        ],
        _ => vec![
            "Prepare hospital bag by week 36",
            "Attend childbirth education classes",
            "Practice relaxation and breathing techniques",
            "Monitor for signs of labor",
            "Count baby kicks daily",
            "Avoid lying flat on your back",
            "Discuss birth plan with healthcare provider",
            "Watch for signs of preterm labor",
            "Stay close to home after week 36",
        ],
    }
}

struct Timeline {
    lmp: NaiveDate,
    today: NaiveDate,
    conception: NaiveDate,
    due: NaiveDate,
    days_pregnant: i64,
    term_days: i64,
}

fn invalid(field: &str, message: &str) -> CalcError {
    CalcError::Validation(ValidationError::new(field, message, PregnancyCalculator::NAME))
}

fn timeline(request: &PregnancyRequest) -> CalcResult<Timeline> {
    let lmp = parse_date("last_period", &request.last_period, PregnancyCalculator::NAME)?;
    let today = reference_date(request.reference_date.as_deref(), PregnancyCalculator::NAME)?;
    Validator::new(PregnancyCalculator::NAME)
        .range("cycle_length", request.cycle_length as f64, 21.0, 35.0)
        .finish()?;
    if lmp > today {
        return Err(invalid("last_period", "cannot be in the future"));
    }

    let days_pregnant = (today - lmp).num_days();
    if days_pregnant / 7 > MAX_WEEKS {
        return Err(invalid(
            "last_period",
            "pregnancy duration exceeds normal range, please verify the date",
        ));
    }

    let adjustment = request.cycle_length - 28;
    Ok(Timeline {
        lmp,
        today,
        conception: lmp + Duration::days(request.cycle_length - 14),
        due: lmp + Duration::days(GESTATION_DAYS + adjustment),
        days_pregnant,
        term_days: GESTATION_DAYS + adjustment,
    })
}

pub struct PregnancyCalculator;

impl Calculator for PregnancyCalculator {
    type Request = PregnancyRequest;
    type Simple = PregnancySimple;
    type Detailed = PregnancyDetailed;
    const NAME: &'static str = "pregnancy";

    fn simple(request: &PregnancyRequest) -> CalcResult<PregnancySimple> {
        let t = timeline(request)?;
        let weeks = t.days_pregnant / 7;
        Ok(PregnancySimple {
            due_date: fmt(t.due),
            weeks_pregnant: weeks,
            days_pregnant: t.days_pregnant,
            days_remaining: (t.due - t.today).num_days().max(0),
            trimester: trimester_for(weeks),
            conception_date: fmt(t.conception),
        })
    }

    fn detailed(request: &PregnancyRequest) -> CalcResult<PregnancyDetailed> {
        let simple = Self::simple(request)?;
        let t = timeline(request)?;
        let weeks = simple.weeks_pregnant;
        let in_week = t.days_pregnant % 7;
        let after = |w: i64| fmt(t.lmp + Duration::weeks(w));

        let percentage_complete = if t.days_pregnant <= t.term_days {
            round_dp(t.days_pregnant as f64 / t.term_days as f64 * 100.0, 1)
        } else {
            100.0
        };

        let milestones = MILESTONE_WEEKS
            .iter()
            .map(|&(week, description)| {
                let date = t.lmp + Duration::weeks(week);
                let until = (date - t.today).num_days();
                PregnancyMilestone {
                    week,
                    date: fmt(date),
                    description,
                    status: if until >= 0 { "Upcoming" } else { "Completed" },
                    days_until: (until >= 0).then_some(until),
                    days_ago: (until < 0).then_some(-until),
                }
            })
            .collect();

        Ok(PregnancyDetailed {
            days_in_current_week: in_week,
            gestational_age: format!("{} weeks, {} days", weeks, in_week),
            percentage_complete,
            trimester_name: trimester_name(simple.trimester),
            last_menstrual_period: fmt(t.lmp),
            current_date: fmt(t.today),
            weeks_remaining: simple.days_remaining / 7,
            months_remaining: round_dp(simple.days_remaining as f64 / 30.44, 1),
            due_date_range: DueDateRange {
                early: fmt(t.due - Duration::days(14)),
                expected: fmt(t.due),
                late: fmt(t.due + Duration::days(14)),
            },
            trimester_information: trimester_info(weeks),
            fetal_development: fetal_development(weeks),
            pregnancy_milestones: milestones,
            important_dates: ImportantDates {
                first_trimester_end: after(12),
                second_trimester_start: after(13),
                second_trimester_end: after(26),
                third_trimester_start: after(27),
                viability_date: after(24),
                full_term_start: after(37),
                post_term_date: after(42),
            },
            health_tips: health_tips(simple.trimester),
            notes: vec![
                "Due date is an estimate - only 5% of babies are born on their due date",
                "Full term is considered 37-42 weeks",
                "Regular prenatal care is essential for healthy pregnancy",
                "Consult healthcare provider for personalized medical advice",
                "This calculator uses Naegele's rule adjusted for cycle length",
            ],
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_standard_cycle() {
        let r = PregnancyCalculator::simple(&PregnancyRequest::new("2024-01-01").on("2024-03-01"))
            .unwrap();
        assert_eq!(r.due_date, "2024-10-07");
        assert_eq!(r.conception_date, "2024-01-15");
        assert_eq!(r.days_pregnant, 60);
        assert_eq!(r.weeks_pregnant, 8);
        assert_eq!(r.trimester, 1);
        assert_eq!(r.days_remaining, 220);
        println!("✅ Pregnancy due date test PASSED");
    }

    #[test]
    fn test_cycle_adjustment() {
        let mut req = PregnancyRequest::new("2024-01-01").on("2024-03-01");
        req.cycle_length = 32;
        let r = PregnancyCalculator::simple(&req).unwrap();
        assert_eq!(r.due_date, "2024-10-11");
        assert_eq!(r.conception_date, "2024-01-19");
    }

    #[test]
    fn test_validation() {
        let mut req = PregnancyRequest::new("2024-01-01").on("2024-03-01");
        req.cycle_length = 40;
        assert!(PregnancyCalculator::simple(&req).is_err());
        assert!(
            PregnancyCalculator::simple(&PregnancyRequest::new("2024-05-01").on("2024-03-01"))
                .is_err()
        );
        assert!(
            PregnancyCalculator::simple(&PregnancyRequest::new("2023-01-01").on("2024-03-01"))
                .is_err()
        );
    }

    #[test]
    fn test_detailed_snapshot() {
        let d = PregnancyCalculator::detailed(&PregnancyRequest::new("2024-01-01").on("2024-06-10"))
            .unwrap();
        // 161 days → 23 weeks
        assert_eq!(d.simple.weeks_pregnant, 23);
        assert_eq!(d.simple.trimester, 2);
        assert_eq!(d.fetal_development.approximate_size, "Corn");
        assert_eq!(d.pregnancy_milestones.len(), 14);
        assert_eq!(d.pregnancy_milestones[0].status, "Completed");
        assert_eq!(d.important_dates.viability_date, "2024-06-17");
        assert_eq!(d.percentage_complete, 57.5);
    }

    #[test]
    fn test_fetal_tie_prefers_earlier_week() {
        assert_eq!(fetal_development(6).approximate_size, "Poppy seed");
        assert_eq!(fetal_development(44).approximate_size, "Watermelon");
    }
}
