// 📅 Attendance Calculator
// Current percentage, classes needed / skippable for a target, and projections

use crate::errors::CalcResult;
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money, safe_div};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

const LOOKAHEAD: [u32; 4] = [5, 10, 15, 20];

fn default_target() -> f64 {
    75.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRequest {
    pub attended: u32,
    pub total: u32,
    /// Percent, 0–100 inclusive. At 100 any missed class makes the target
    /// unreachable, and at 0 absences are unlimited; both edges fail with
    /// `DivisionByZero` when the count they ask for has no finite answer.
    #[serde(default = "default_target")]
    pub target: f64,
    #[serde(default)]
    pub total_classes_in_semester: Option<u32>,
}

impl AttendanceRequest {
    pub fn new(attended: u32, total: u32) -> Self {
        AttendanceRequest {
            attended,
            total,
            target: default_target(),
            total_classes_in_semester: None,
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    pub fn with_semester(mut self, total: u32) -> Self {
        self.total_classes_in_semester = Some(total);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    Excellent,
    Good,
    Warning,
    Critical,
    Danger,
}

impl AttendanceStatus {
    /// Bands relative to the target, lower-inclusive
    pub fn classify(percentage: f64, target: f64) -> Self {
        if percentage >= target + 10.0 {
            AttendanceStatus::Excellent
        } else if percentage >= target {
            AttendanceStatus::Good
        } else if percentage >= target - 5.0 {
            AttendanceStatus::Warning
        } else if percentage >= target - 10.0 {
            AttendanceStatus::Critical
        } else {
            AttendanceStatus::Danger
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttendanceStatus::Excellent => "Excellent",
            AttendanceStatus::Good => "Good",
            AttendanceStatus::Warning => "Warning",
            AttendanceStatus::Critical => "Critical",
            AttendanceStatus::Danger => "Danger",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AttendanceStatus::Excellent => "Well above target, great attendance!",
            AttendanceStatus::Good => "Meeting attendance requirements",
            AttendanceStatus::Warning => "Close to minimum requirement",
            AttendanceStatus::Critical => "Below requirement, immediate action needed",
            AttendanceStatus::Danger => "Significantly below requirement",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AttendanceStatus::Excellent => "#2ecc71",
            AttendanceStatus::Good => "#27ae60",
            AttendanceStatus::Warning => "#f39c12",
            AttendanceStatus::Critical => "#e67e22",
            AttendanceStatus::Danger => "#e74c3c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSimple {
    pub percentage: f64,
    pub attended: u32,
    pub total: u32,
    pub target: f64,
    pub classes_needed: u32,
    pub can_miss: u32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetAnalysis {
    pub difference_from_target: f64,
    pub is_on_track: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassOutcome {
    pub percentage: f64,
    pub attended: u32,
    pub total: u32,
    pub meets_target: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lookahead {
    pub next_classes: u32,
    pub attend_all: ClassOutcome,
    pub attend_none: ClassOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterProjection {
    pub total_semester_classes: u32,
    pub classes_completed: u32,
    pub classes_remaining: u32,
    pub minimum_classes_to_attend: u32,
    pub maximum_classes_can_miss: u32,
    pub target_reachable: bool,
    pub attendance_required_percentage: f64,
    pub if_attend_all: f64,
    pub if_attend_none: f64,
    pub if_attend_half: f64,
    pub if_maintain_current_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStatistics {
    pub missed: u32,
    pub attendance_rate: f64,
    pub attendance_ratio: String,
    pub absence_ratio: String,
    pub classes_per_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceDetailed {
    #[serde(flatten)]
    pub simple: AttendanceSimple,
    pub status_description: &'static str,
    pub color: &'static str,
    pub message: String,
    pub target_analysis: TargetAnalysis,
    pub scenarios: Vec<Lookahead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_projection: Option<SemesterProjection>,
    pub statistics: AttendanceStatistics,
    pub recommendations: Vec<String>,
    pub notes: Vec<&'static str>,
}

/// Consecutive classes to attend before reaching `target`
pub fn classes_needed(attended: u32, total: u32, target: f64) -> CalcResult<u32> {
    let (a, t) = (f64::from(attended), f64::from(total));
    if a / t * 100.0 >= target {
        return Ok(0);
    }
    let needed = safe_div(
        target * t - 100.0 * a,
        100.0 - target,
        "classes needed (a 100% target is unreachable after a missed class)",
    )?;
    Ok(needed.ceil().max(0.0) as u32)
}

/// Classes that can be skipped while staying at or above `target`
pub fn classes_can_miss(attended: u32, total: u32, target: f64) -> CalcResult<u32> {
    let (a, t) = (f64::from(attended), f64::from(total));
    if a / t * 100.0 <= target {
        return Ok(0);
    }
    let spare = safe_div(
        100.0 * a - target * t,
        target,
        "classes can miss (a 0% target has no absence limit)",
    )?;
    Ok(spare.floor().max(0.0) as u32)
}

fn validate(request: &AttendanceRequest) -> CalcResult<f64> {
    let mut v = Validator::new(AttendanceCalculator::NAME)
        .positive("total", f64::from(request.total))
        .check(
            request.attended <= request.total,
            "attended",
            "cannot exceed total classes",
        )
        .range("target", request.target, 0.0, 100.0);
    if let Some(semester) = request.total_classes_in_semester {
        v = v.check(
            semester >= request.total,
            "total_classes_in_semester",
            "cannot be less than current total",
        );
    }
    v.finish()?;
    Ok(f64::from(request.attended) / f64::from(request.total) * 100.0)
}

fn outcome(attended: u32, total: u32, target: f64) -> ClassOutcome {
    let pct = f64::from(attended) / f64::from(total) * 100.0;
    ClassOutcome {
        percentage: round_money(pct),
        attended,
        total,
        meets_target: pct >= target,
    }
}

fn project_semester(attended: u32, total: u32, target: f64, semester: u32) -> SemesterProjection {
    let remaining = semester - total;
    let sem = f64::from(semester);
    let pct_of = |n: u32| round_money(f64::from(n) / sem * 100.0);

    let min_to_attend = (0..=remaining)
        .find(|&i| f64::from(attended + i) / sem * 100.0 >= target);
    let rate = f64::from(attended) / f64::from(total);
    let expected = (sem * rate).floor() as u32;

    SemesterProjection {
        total_semester_classes: semester,
        classes_completed: total,
        classes_remaining: remaining,
        minimum_classes_to_attend: min_to_attend.unwrap_or(remaining),
        maximum_classes_can_miss: min_to_attend.map(|m| remaining - m).unwrap_or(0),
        target_reachable: min_to_attend.is_some(),
        attendance_required_percentage: match (min_to_attend, remaining) {
            (Some(m), r) if r > 0 => round_money(f64::from(m) / f64::from(r) * 100.0),
            _ => 0.0,
        },
        if_attend_all: pct_of(attended + remaining),
        if_attend_none: pct_of(attended),
        if_attend_half: pct_of(attended + remaining / 2),
        if_maintain_current_rate: pct_of(expected),
    }
}

fn recommendations(status: AttendanceStatus, needed: u32, can_miss: u32) -> Vec<String> {
    let mut recs: Vec<String> = match status {
        AttendanceStatus::Excellent => vec![
            "Excellent attendance! Keep up the good work".to_string(),
            format!("You can safely miss up to {} classes and still meet requirements", can_miss),
            "Consider helping classmates who struggle with attendance".to_string(),
            "Use your buffer wisely for emergencies".to_string(),
        ],
        AttendanceStatus::Good => vec![
            "Good attendance, you're meeting requirements".to_string(),
            if can_miss > 0 {
                format!("You can miss {} more classes safely", can_miss)
            } else {
                "Avoid missing any more classes".to_string()
            },
            "Try to build a buffer for unexpected situations".to_string(),
            "Maintain consistency in attendance".to_string(),
        ],
        _ if needed > 0 => vec![
            format!("⚠️ You need to attend the next {} classes consecutively", needed),
            "Avoid any further absences".to_string(),
            "Plan ahead for important dates".to_string(),
            "Consider speaking with your instructor about your situation".to_string(),
            "Set reminders for all upcoming classes".to_string(),
        ],
        _ => Vec::new(),
    };
    recs.extend(
        [
            "Regular attendance improves learning outcomes",
            "Track your attendance weekly",
            "Inform instructors in advance for planned absences",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    recs
}

pub struct AttendanceCalculator;

impl Calculator for AttendanceCalculator {
    type Request = AttendanceRequest;
    type Simple = AttendanceSimple;
    type Detailed = AttendanceDetailed;
    const NAME: &'static str = "attendance";

    fn simple(request: &AttendanceRequest) -> CalcResult<AttendanceSimple> {
        let percentage = validate(request)?;
        let status = AttendanceStatus::classify(percentage, request.target);
        Ok(AttendanceSimple {
            percentage: round_money(percentage),
            attended: request.attended,
            total: request.total,
            target: request.target,
            classes_needed: classes_needed(request.attended, request.total, request.target)?,
            can_miss: classes_can_miss(request.attended, request.total, request.target)?,
            status: status.name().to_string(),
        })
    }

    fn detailed(request: &AttendanceRequest) -> CalcResult<AttendanceDetailed> {
        let simple = Self::simple(request)?;
        let percentage = validate(request)?;
        let status = AttendanceStatus::classify(percentage, request.target);
        let (attended, total, target) = (request.attended, request.total, request.target);
        let missed = total - attended;

        let message = if simple.classes_needed > 0 {
            format!(
                "Attend the next {} classes to reach {}%",
                simple.classes_needed, target
            )
        } else if simple.can_miss > 0 {
            format!("You can miss {} classes and stay at {}%", simple.can_miss, target)
        } else {
            format!("You are exactly at the {}% threshold", target)
        };

        Ok(AttendanceDetailed {
            status_description: status.description(),
            color: status.color(),
            message,
            target_analysis: TargetAnalysis {
                difference_from_target: round_money(percentage - target),
                is_on_track: percentage >= target,
            },
            scenarios: LOOKAHEAD
                .iter()
                .map(|&next| Lookahead {
                    next_classes: next,
                    attend_all: outcome(attended + next, total + next, target),
                    attend_none: outcome(attended, total + next, target),
                })
                .collect(),
            semester_projection: request
                .total_classes_in_semester
                .map(|semester| project_semester(attended, total, target, semester)),
            statistics: AttendanceStatistics {
                missed,
                attendance_rate: round_dp(f64::from(attended) / f64::from(total), 4),
                attendance_ratio: format!("{}:{}", attended, total),
                absence_ratio: format!("{}:{}", missed, total),
                classes_per_percentage: round_money(f64::from(total) / 100.0),
            },
            recommendations: recommendations(status, simple.classes_needed, simple.can_miss),
            notes: vec![
                "Maintain consistent attendance for better academic performance",
                "Plan ahead for unavoidable absences",
                "Some institutions have strict attendance policies",
                "Medical emergencies may have separate consideration",
            ],
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    #[test]
    fn test_exactly_at_target_is_good() {
        let r = AttendanceCalculator::simple(&AttendanceRequest::new(60, 80)).unwrap();
        assert_eq!(r.percentage, 75.0);
        assert_eq!(r.status, "Good");
        assert_eq!(r.classes_needed, 0);
        assert_eq!(r.can_miss, 0);
        println!("✅ Attendance boundary test PASSED");
    }

    #[test]
    fn test_needed_and_can_miss() {
        // (75·40 − 100·25) / 25 = 20
        let below = AttendanceCalculator::simple(&AttendanceRequest::new(25, 40)).unwrap();
        assert_eq!(below.classes_needed, 20);
        assert_eq!(below.status, "Danger");

        // (100·45 − 75·50) / 75 = 10
        let above = AttendanceCalculator::simple(&AttendanceRequest::new(45, 50)).unwrap();
        assert_eq!(above.can_miss, 10);
        assert_eq!(above.status, "Excellent");
    }

    #[test]
    fn test_needed_rounds_up() {
        // (75·10 − 100·7) / 25 = 2
        assert_eq!(classes_needed(7, 10, 75.0).unwrap(), 2);
        // (75·10 − 100·6) / 25 = 6
        assert_eq!(classes_needed(6, 10, 75.0).unwrap(), 6);
        // (80·9 − 100·6) / 20 = 6
        assert_eq!(classes_needed(6, 9, 80.0).unwrap(), 6);
        // (75·11 − 100·7) / 25 = 5
        assert_eq!(classes_needed(7, 11, 75.0).unwrap(), 5);
    }

    #[test]
    fn test_unreachable_target_is_division_by_zero() {
        let err = AttendanceCalculator::simple(&AttendanceRequest::new(9, 10).with_target(100.0));
        assert!(matches!(err, Err(CalcError::DivisionByZero { .. })));
    }

    #[test]
    fn test_target_edges() {
        // 0% target: nothing attended means nothing to spare, otherwise unbounded
        let r = AttendanceCalculator::simple(&AttendanceRequest::new(0, 10).with_target(0.0)).unwrap();
        assert_eq!(r.can_miss, 0);
        assert_eq!(r.status, "Good");
        let err = AttendanceCalculator::simple(&AttendanceRequest::new(5, 10).with_target(0.0)).unwrap_err();
        assert_eq!(err.kind(), "division_by_zero");
        assert!(err.to_string().contains("no absence limit"), "got: {}", err);

        // 100% target: fine while attendance is perfect
        let r = AttendanceCalculator::simple(&AttendanceRequest::new(10, 10).with_target(100.0)).unwrap();
        assert_eq!((r.classes_needed, r.can_miss), (0, 0));
        assert_eq!(r.status, "Good");
        let err = AttendanceCalculator::simple(&AttendanceRequest::new(9, 10).with_target(100.0)).unwrap_err();
        assert!(err.to_string().contains("unreachable"), "got: {}", err);
    }

    #[test]
    fn test_percentage_monotonic_in_attended() {
        let mut last = -1.0;
        for attended in 0..=30 {
            let r = AttendanceCalculator::simple(&AttendanceRequest::new(attended, 30)).unwrap();
            assert!(r.percentage >= last);
            last = r.percentage;
        }
    }

    #[test]
    fn test_validation() {
        assert!(AttendanceCalculator::simple(&AttendanceRequest::new(1, 0)).is_err());
        assert!(AttendanceCalculator::simple(&AttendanceRequest::new(11, 10)).is_err());
        assert!(AttendanceCalculator::simple(&AttendanceRequest::new(5, 10).with_target(120.0))
            .is_err());
        assert!(AttendanceCalculator::simple(&AttendanceRequest::new(5, 10).with_semester(8))
            .is_err());
    }

    #[test]
    fn test_detailed_projection() {
        let d = AttendanceCalculator::detailed(&AttendanceRequest::new(30, 40).with_semester(100))
            .unwrap();
        assert_eq!(d.scenarios.len(), 4);
        assert_eq!(d.scenarios[0].attend_all.total, 45);
        let p = d.semester_projection.unwrap();
        assert_eq!(p.classes_remaining, 60);
        assert_eq!(p.minimum_classes_to_attend, 45);
        assert_eq!(p.maximum_classes_can_miss, 15);
        assert_eq!(p.if_attend_all, 90.0);
        assert_eq!(p.if_attend_none, 30.0);
        assert_eq!(p.if_maintain_current_rate, 75.0);
        assert_eq!(d.color, "#27ae60");
    }
}
