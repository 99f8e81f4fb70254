// 😴 Sleep Calculator
// Bedtimes / wake times from 90-minute cycles plus weekly sleep-debt analysis

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::round_dp;
use crate::validation::{ValidationError, Validator};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

pub const SLEEP_CYCLE_MINUTES: i64 = 90;
pub const FALL_ASLEEP_MINUTES: i64 = 15;
const OPTIMAL_HOURS: f64 = 8.0;
const MAX_NIGHTS: usize = 14;

pub const SLEEP_TIPS: [&str; 10] = [
    "Keep bedroom cool (60-67°F / 15-19°C)",
    "Use blackout curtains or eye mask",
    "Avoid screens 1 hour before bed",
    "No caffeine after 2 PM",
    "Exercise regularly, but not before bed",
    "Keep consistent sleep schedule",
    "Avoid large meals before bedtime",
    "Use white noise if needed",
    "Reserve bed for sleep only",
    "Try relaxation techniques (meditation, deep breathing)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPlan {
    /// Wake time given, find bedtimes
    Bedtimes,
    /// Bedtime given, find wake times
    WakeTimes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepMode {
    #[default]
    SleepTimes,
    SleepDebt,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepRequest {
    #[serde(default, rename = "type")]
    pub mode: SleepMode,
    #[serde(default)]
    pub wake_time: Option<String>,
    #[serde(default)]
    pub sleep_time: Option<String>,
    #[serde(default)]
    pub hours_slept: Option<Vec<f64>>,
}

impl SleepRequest {
    pub fn waking_at(time: &str) -> Self {
        SleepRequest {
            wake_time: Some(time.to_string()),
            ..Default::default()
        }
    }

    pub fn sleeping_at(time: &str) -> Self {
        SleepRequest {
            sleep_time: Some(time.to_string()),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, hours: Vec<f64>) -> Self {
        self.hours_slept = Some(hours);
        self
    }

    pub fn debt_only(hours: Vec<f64>) -> Self {
        SleepRequest {
            mode: SleepMode::SleepDebt,
            hours_slept: Some(hours),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepOption {
    pub cycles: u32,
    pub time: String,
    pub sleep_duration_hours: f64,
    pub total_hours: f64,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSchedule {
    pub plan: SleepPlan,
    pub input_time: String,
    pub options: Vec<SleepOption>,
    pub recommended: SleepOption,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepDebt {
    pub average_sleep_hours: f64,
    pub total_sleep_debt_hours: f64,
    pub status: &'static str,
    pub recovery_nights_needed: f64,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SleepSimple {
    Schedule(SleepSchedule),
    Debt(SleepDebt),
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepDetailed {
    #[serde(flatten)]
    pub simple: SleepSimple,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_debt: Option<SleepDebt>,
    pub tips: Vec<&'static str>,
}

pub fn quality(cycles: u32) -> &'static str {
    match cycles {
        c if c >= 6 => "Excellent",
        5 => "Good",
        4 => "Adequate",
        _ => "Insufficient",
    }
}

/// Parse 24-hour `HH:MM`
pub fn parse_clock(field: &str, value: &str) -> CalcResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        CalcError::Validation(ValidationError::new(
            field,
            &format!("invalid time '{}', use HH:MM (e.g. 07:00)", value),
            SleepCalculator::NAME,
        ))
    })
}

fn option(cycles: u32, at: NaiveTime) -> SleepOption {
    let sleep_minutes = i64::from(cycles) * SLEEP_CYCLE_MINUTES;
    SleepOption {
        cycles,
        time: at.format("%H:%M").to_string(),
        sleep_duration_hours: round_dp(sleep_minutes as f64 / 60.0, 1),
        total_hours: round_dp((sleep_minutes + FALL_ASLEEP_MINUTES) as f64 / 60.0, 1),
        quality: quality(cycles).to_string(),
    }
}

/// Bedtimes for a wake time, longest sleep first; the clock wraps past midnight
pub fn bedtimes(wake: NaiveTime) -> Vec<SleepOption> {
    [6u32, 5, 4]
        .iter()
        .map(|&cycles| {
            let minutes = i64::from(cycles) * SLEEP_CYCLE_MINUTES + FALL_ASLEEP_MINUTES;
            option(cycles, wake - Duration::minutes(minutes))
        })
        .collect()
}

/// Wake times for a bedtime, shortest sleep first
pub fn wake_times(bed: NaiveTime) -> Vec<SleepOption> {
    let asleep = bed + Duration::minutes(FALL_ASLEEP_MINUTES);
    [4u32, 5, 6]
        .iter()
        .map(|&cycles| {
            option(
                cycles,
                asleep + Duration::minutes(i64::from(cycles) * SLEEP_CYCLE_MINUTES),
            )
        })
        .collect()
}

/// Debt against 8 hours a night
pub fn sleep_debt(hours: &[f64]) -> CalcResult<SleepDebt> {
    let mut v = Validator::new(SleepCalculator::NAME)
        .not_empty("hours_slept", hours)
        .check(
            hours.len() <= MAX_NIGHTS,
            "hours_slept",
            "at most 14 nights are supported",
        );
    for h in hours {
        v = v.range("hours_slept", *h, 0.0, 24.0);
    }
    v.finish()?;

    let debt: f64 = hours.iter().map(|h| OPTIMAL_HOURS - h).sum();
    let average = hours.iter().sum::<f64>() / hours.len() as f64;

    let (status, recs): (&str, Vec<&str>) = if debt <= 0.0 {
        (
            "No sleep debt - well rested!",
            vec![
                "Maintain your current sleep schedule",
                "Continue prioritizing sleep hygiene",
                "Keep consistent sleep/wake times",
            ],
        )
    } else if debt <= 5.0 {
        (
            "Minor sleep debt",
            vec![
                "Try to get an extra hour of sleep tonight",
                "Avoid caffeine after 2 PM",
                "Take a 20-minute power nap if needed",
            ],
        )
    } else if debt <= 10.0 {
        (
            "Moderate sleep debt",
            vec![
                "Prioritize 8-9 hours of sleep for the next few nights",
                "Avoid screens 1 hour before bed",
                "Create a relaxing bedtime routine",
                "Consider going to bed 30 minutes earlier",
            ],
        )
    } else {
        (
            "Severe sleep debt",
            vec![
                "Consult a healthcare provider about sleep issues",
                "Aim for 9 hours of sleep per night this week",
                "Eliminate all caffeine and alcohol",
                "Create a dark, cool sleep environment",
                "Consider cognitive behavioral therapy for insomnia",
            ],
        )
    };

    Ok(SleepDebt {
        average_sleep_hours: round_dp(average, 1),
        total_sleep_debt_hours: round_dp(debt, 1),
        status,
        recovery_nights_needed: round_dp(debt / 2.0, 0).max(0.0),
        recommendations: recs,
    })
}

fn schedule(request: &SleepRequest) -> CalcResult<SleepSchedule> {
    let (plan, input, options, pick) = match (&request.wake_time, &request.sleep_time) {
        (Some(wake), _) => {
            let at = parse_clock("wake_time", wake)?;
            (SleepPlan::Bedtimes, wake, bedtimes(at), 0)
        }
        (None, Some(bed)) => {
            let at = parse_clock("sleep_time", bed)?;
            (SleepPlan::WakeTimes, bed, wake_times(at), 1)
        }
        (None, None) => {
            return Err(CalcError::Validation(ValidationError::new(
                "wake_time",
                "provide either wake_time or sleep_time",
                SleepCalculator::NAME,
            )))
        }
    };
    Ok(SleepSchedule {
        plan,
        input_time: input.trim().to_string(),
        recommended: options[pick].clone(),
        options,
        note: "Times include 15 minutes to fall asleep",
    })
}

pub struct SleepCalculator;

impl Calculator for SleepCalculator {
    type Request = SleepRequest;
    type Simple = SleepSimple;
    type Detailed = SleepDetailed;
    const NAME: &'static str = "sleep";

    fn simple(request: &SleepRequest) -> CalcResult<SleepSimple> {
        match request.mode {
            SleepMode::SleepDebt => {
                let hours = request.hours_slept.as_deref().unwrap_or(&[]);
                sleep_debt(hours).map(SleepSimple::Debt)
            }
            SleepMode::SleepTimes => schedule(request).map(SleepSimple::Schedule),
        }
    }

    fn detailed(request: &SleepRequest) -> CalcResult<SleepDetailed> {
        let simple = Self::simple(request)?;
        let sleep_debt = match (&simple, request.hours_slept.as_deref()) {
            (SleepSimple::Schedule(_), Some(hours)) => Some(sleep_debt(hours)?),
            _ => None,
        };
        Ok(SleepDetailed {
            simple,
            sleep_debt,
            tips: SLEEP_TIPS.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_of(request: SleepRequest) -> SleepSchedule {
        match SleepCalculator::simple(&request).unwrap() {
            SleepSimple::Schedule(s) => s,
            other => panic!("expected a schedule, got {:?}", other),
        }
    }

    #[test]
    fn test_bedtimes_for_wake_time() {
        let r = schedule_of(SleepRequest::waking_at("07:00"));
        let times: Vec<&str> = r.options.iter().map(|o| o.time.as_str()).collect();
        assert_eq!(times, vec!["21:45", "23:15", "00:45"]);
        assert_eq!(r.recommended.cycles, 6);
        assert_eq!(r.options[0].total_hours, 9.3);
        println!("✅ Sleep bedtimes test PASSED");
    }

    #[test]
    fn test_wake_times_for_bedtime() {
        let r = schedule_of(SleepRequest::sleeping_at("23:00"));
        let times: Vec<&str> = r.options.iter().map(|o| o.time.as_str()).collect();
        assert_eq!(times, vec!["05:15", "06:45", "08:15"]);
        assert_eq!(r.recommended.quality, "Good");
    }

    #[test]
    fn test_invalid_time_and_missing_input() {
        assert!(SleepCalculator::simple(&SleepRequest::waking_at("25:00")).is_err());
        assert!(SleepCalculator::simple(&SleepRequest::waking_at("7am")).is_err());
        assert!(SleepCalculator::simple(&SleepRequest::default()).is_err());
    }

    #[test]
    fn test_sleep_debt() {
        let debt = sleep_debt(&[6.0, 6.5, 7.0, 5.0, 8.0, 9.0, 6.0]).unwrap();
        // 2 + 1.5 + 1 + 3 + 0 - 1 + 2
        assert_eq!(debt.total_sleep_debt_hours, 8.5);
        assert_eq!(debt.status, "Moderate sleep debt");
        assert_eq!(debt.recommendations.len(), 4);

        assert!(sleep_debt(&[]).is_err());
        assert!(sleep_debt(&[25.0]).is_err());

        let d = SleepCalculator::detailed(&SleepRequest::waking_at("06:30").with_history(vec![9.0]))
            .unwrap();
        assert_eq!(d.sleep_debt.unwrap().status, "No sleep debt - well rested!");
        assert_eq!(d.tips.len(), 10);
    }

    #[test]
    fn test_debt_mode() {
        let r = SleepCalculator::simple(&SleepRequest::debt_only(vec![4.0, 4.0, 4.0])).unwrap();
        match r {
            SleepSimple::Debt(debt) => {
                assert_eq!(debt.total_sleep_debt_hours, 12.0);
                assert_eq!(debt.status, "Severe sleep debt");
                assert_eq!(debt.recovery_nights_needed, 6.0);
            }
            other => panic!("expected debt, got {:?}", other),
        }
        assert!(SleepCalculator::simple(&SleepRequest::debt_only(vec![])).is_err());
    }
}
