// 💯 Percentage Calculator
// Subject-wise marks aggregation with pass rules and an improvement plan

use crate::errors::CalcResult;
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

const OVERALL_PASS: f64 = 40.0;
const SUBJECT_PASS: f64 = 35.0;
const PLAN_TARGETS: [u32; 4] = [60, 70, 80, 90];

/// (min, grade, description, color)
const GRADES: [(f64, &str, &str, &str); 7] = [
    (90.0, "A+", "Outstanding", "#2ecc71"),
    (80.0, "A", "Excellent", "#27ae60"),
    (70.0, "B+", "Very Good", "#3498db"),
    (60.0, "B", "Good", "#2980b9"),
    (50.0, "C", "Average", "#f39c12"),
    (40.0, "D", "Pass", "#e67e22"),
    (0.0, "F", "Fail", "#e74c3c"),
];

fn grade_for(percentage: f64) -> (&'static str, &'static str, &'static str) {
    GRADES
        .iter()
        .find(|(min, ..)| percentage >= *min)
        .map(|&(_, g, d, c)| (g, d, c))
        .unwrap_or(("F", "Fail", "#e74c3c"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectMark {
    pub subject: String,
    pub scored: f64,
    pub max: f64,
}

fn default_overall() -> f64 {
    OVERALL_PASS
}

fn default_subject() -> f64 {
    SUBJECT_PASS
}

#[derive(Debug, Clone, Deserialize)]
pub struct PercentageRequest {
    pub marks: Vec<SubjectMark>,
    #[serde(default = "default_overall")]
    pub passing_percentage: f64,
    #[serde(default = "default_subject")]
    pub subject_passing_percentage: f64,
}

impl PercentageRequest {
    pub fn new(marks: Vec<SubjectMark>) -> Self {
        PercentageRequest {
            marks,
            passing_percentage: OVERALL_PASS,
            subject_passing_percentage: SUBJECT_PASS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub subject: String,
    pub scored: f64,
    pub max: f64,
    pub percentage: f64,
    pub grade: String,
    pub grade_color: String,
    pub passed: bool,
    pub marks_lost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageSimple {
    pub percentage: f64,
    pub total_scored: f64,
    pub total_max: f64,
    pub grade: String,
    pub color: String,
    pub status: String,
    pub subjects: Vec<SubjectResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectRef {
    pub name: String,
    pub percentage: f64,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectCategories {
    pub excellent: Vec<String>,
    pub good: Vec<String>,
    pub average: Vec<String>,
    pub weak: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectAnalysis {
    pub best_subject: SubjectRef,
    pub worst_subject: SubjectRef,
    pub average_percentage: f64,
    pub highest_percentage: f64,
    pub lowest_percentage: f64,
    pub percentage_range: f64,
    pub standard_deviation: f64,
    pub subject_categories: SubjectCategories,
    pub consistency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub overall_passed: bool,
    pub subjects_passed: usize,
    pub subjects_failed: usize,
    pub failed_subjects: Vec<String>,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallPerformance {
    pub performance_level: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub margin_from_passing: f64,
    pub distance_to_excellence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetScenario {
    pub target_percentage: u32,
    pub additional_marks_needed: f64,
    pub achievable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrioritySubject {
    pub subject: String,
    pub current_percentage: f64,
    pub marks_lost: f64,
    pub potential_gain: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementPlan {
    pub target_scenarios: Vec<TargetScenario>,
    pub priority_subjects: Vec<PrioritySubject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentageDetailed {
    #[serde(flatten)]
    pub simple: PercentageSimple,
    pub grade_description: &'static str,
    pub total_marks_lost: f64,
    pub passing_percentage: f64,
    pub subject_analysis: SubjectAnalysis,
    pub pass_status: PassSummary,
    pub performance_analysis: OverallPerformance,
    pub improvement_plan: ImprovementPlan,
    pub recommendations: Vec<String>,
    pub notes: Vec<&'static str>,
}

struct Tally {
    subjects: Vec<SubjectResult>,
    failed: Vec<String>,
    total_scored: f64,
    total_max: f64,
    percentage: f64,
    passed: bool,
}

fn tally(request: &PercentageRequest) -> CalcResult<Tally> {
    let mut v = Validator::new(PercentageCalculator::NAME)
        .not_empty("marks", &request.marks)
        .range("passing_percentage", request.passing_percentage, 0.0, 100.0)
        .range(
            "subject_passing_percentage",
            request.subject_passing_percentage,
            0.0,
            100.0,
        );
    for mark in &request.marks {
        v = v
            .non_negative(&format!("{}.scored", mark.subject), mark.scored)
            .positive(&format!("{}.max", mark.subject), mark.max)
            .check(
                mark.scored <= mark.max,
                &format!("{}.scored", mark.subject),
                "cannot exceed maximum marks",
            );
    }
    v.finish()?;

    let mut subjects = Vec::with_capacity(request.marks.len());
    let mut failed = Vec::new();
    let mut total_scored = 0.0;
    let mut total_max = 0.0;

    for mark in &request.marks {
        let pct = mark.scored / mark.max * 100.0;
        let (grade, _, color) = grade_for(pct);
        let passed = pct >= request.subject_passing_percentage;
        if !passed {
            failed.push(mark.subject.clone());
        }
        subjects.push(SubjectResult {
            subject: mark.subject.clone(),
            scored: mark.scored,
            max: mark.max,
            percentage: round_money(pct),
            grade: grade.to_string(),
            grade_color: color.to_string(),
            passed,
            marks_lost: mark.max - mark.scored,
        });
        total_scored += mark.scored;
        total_max += mark.max;
    }

    let percentage = total_scored / total_max * 100.0;
    let passed = percentage >= request.passing_percentage && failed.is_empty();
    Ok(Tally {
        subjects,
        failed,
        total_scored,
        total_max,
        percentage,
        passed,
    })
}

fn analyze_subjects(subjects: &[SubjectResult]) -> SubjectAnalysis {
    let pcts: Vec<f64> = subjects.iter().map(|s| s.percentage).collect();
    let n = pcts.len() as f64;
    let mean = pcts.iter().sum::<f64>() / n;
    let variance = pcts.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let high = pcts.iter().cloned().fold(f64::MIN, f64::max);
    let low = pcts.iter().cloned().fold(f64::MAX, f64::min);
    let spread = high - low;

    let to_ref = |s: &SubjectResult| SubjectRef {
        name: s.subject.clone(),
        percentage: s.percentage,
        grade: s.grade.clone(),
    };
    // First subject wins ties in both directions
    let best = subjects
        .iter()
        .fold(&subjects[0], |acc, s| if s.percentage > acc.percentage { s } else { acc });
    let worst = subjects
        .iter()
        .fold(&subjects[0], |acc, s| if s.percentage < acc.percentage { s } else { acc });

    let names = |pred: &dyn Fn(f64) -> bool| -> Vec<String> {
        subjects
            .iter()
            .filter(|s| pred(s.percentage))
            .map(|s| s.subject.clone())
            .collect()
    };

    SubjectAnalysis {
        best_subject: to_ref(best),
        worst_subject: to_ref(worst),
        average_percentage: round_money(mean),
        highest_percentage: high,
        lowest_percentage: low,
        percentage_range: round_money(spread),
        standard_deviation: round_money(variance.sqrt()),
        subject_categories: SubjectCategories {
            excellent: names(&|p| p >= 80.0),
            good: names(&|p| (60.0..80.0).contains(&p)),
            average: names(&|p| (40.0..60.0).contains(&p)),
            weak: names(&|p| p < 40.0),
        },
        consistency: if spread < 20.0 {
            "High"
        } else if spread < 40.0 {
            "Moderate"
        } else {
            "Low"
        },
    }
}

fn overall_performance(percentage: f64, passing: f64) -> OverallPerformance {
    let (level, description, color) = if percentage >= 90.0 {
        ("Exceptional", "Outstanding performance across all subjects", "#2ecc71")
    } else if percentage >= 80.0 {
        ("Excellent", "Excellent overall performance", "#27ae60")
    } else if percentage >= 70.0 {
        ("Good", "Good performance with room for improvement", "#3498db")
    } else if percentage >= 60.0 {
        ("Satisfactory", "Satisfactory performance, meeting expectations", "#f39c12")
    } else if percentage >= passing {
        ("Passing", "Passing grade but needs improvement", "#e67e22")
    } else {
        ("Failing", "Below passing standard, immediate action needed", "#e74c3c")
    };
    OverallPerformance {
        performance_level: level,
        description,
        color,
        margin_from_passing: round_money(percentage - passing),
        distance_to_excellence: if percentage < 90.0 {
            round_money(90.0 - percentage)
        } else {
            0.0
        },
    }
}

fn improvement_plan(t: &Tally) -> ImprovementPlan {
    let lost: f64 = t.subjects.iter().map(|s| s.marks_lost).sum();
    let target_scenarios = PLAN_TARGETS
        .iter()
        .filter(|&&target| f64::from(target) > t.percentage)
        .map(|&target| {
            let needed = f64::from(target) * t.total_max / 100.0 - t.total_scored;
            TargetScenario {
                target_percentage: target,
                additional_marks_needed: round_money(needed),
                achievable: needed <= lost,
            }
        })
        .collect();

    let mut weak: Vec<&SubjectResult> =
        t.subjects.iter().filter(|s| s.percentage < 60.0).collect();
    weak.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));

    ImprovementPlan {
        target_scenarios,
        priority_subjects: weak
            .into_iter()
            .take(3)
            .map(|s| PrioritySubject {
                subject: s.subject.clone(),
                current_percentage: s.percentage,
                marks_lost: s.marks_lost,
                potential_gain: s.marks_lost,
            })
            .collect(),
    }
}

fn recommendations(t: &Tally, passing: f64, spread: f64) -> Vec<String> {
    let pct = t.percentage;
    let base: &[&str] = if pct >= 90.0 {
        &[
            "Exceptional performance! Maintain your excellence",
            "You're performing at the highest level across all subjects",
            "Consider mentoring peers who need help",
        ]
    } else if pct >= 80.0 {
        &[
            "Excellent work! You're doing very well",
            "Focus on maintaining consistency across all subjects",
            "Aim for 90%+ by strengthening weaker areas",
        ]
    } else if pct >= 70.0 {
        &[
            "Good performance overall",
            "Identify and strengthen subjects below 70%",
            "Increase practice in challenging topics",
        ]
    } else if pct >= passing {
        &[
            "You've passed, but there's room for improvement",
            "Focus on building stronger fundamentals",
            "Dedicate more time to regular study and practice",
        ]
    } else {
        &[
            "⚠️ Below passing percentage - immediate action needed",
            "Meet with teachers to create an improvement plan",
            "Focus on understanding core concepts",
            "Consider additional tutoring or study support",
        ]
    };
    let mut recs: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    if !t.failed.is_empty() {
        recs.push(format!(
            "⚠️ Priority: Focus on failed subjects - {}",
            t.failed.join(", ")
        ));
    }
    if spread > 30.0 {
        recs.push("Large variation between subjects - work on consistency".to_string());
    }
    let weak: Vec<&str> = t
        .subjects
        .iter()
        .filter(|s| s.percentage < 50.0)
        .map(|s| s.subject.as_str())
        .collect();
    if !weak.is_empty() {
        recs.push(format!("Strengthen weak subjects: {}", weak.join(", ")));
    }
    recs
}

pub struct PercentageCalculator;

impl Calculator for PercentageCalculator {
    type Request = PercentageRequest;
    type Simple = PercentageSimple;
    type Detailed = PercentageDetailed;
    const NAME: &'static str = "percentage";

    fn simple(request: &PercentageRequest) -> CalcResult<PercentageSimple> {
        let t = tally(request)?;
        let (grade, _, color) = grade_for(t.percentage);
        Ok(PercentageSimple {
            percentage: round_money(t.percentage),
            total_scored: round_money(t.total_scored),
            total_max: round_money(t.total_max),
            grade: grade.to_string(),
            color: color.to_string(),
            status: if t.passed { "Pass" } else { "Fail" }.to_string(),
            subjects: t.subjects,
        })
    }

    fn detailed(request: &PercentageRequest) -> CalcResult<PercentageDetailed> {
        let simple = Self::simple(request)?;
        let t = tally(request)?;
        let (_, description, _) = grade_for(t.percentage);
        let analysis = analyze_subjects(&t.subjects);
        let count = t.subjects.len();
        let failed_count = t.failed.len();

        Ok(PercentageDetailed {
            grade_description: description,
            total_marks_lost: round_money(t.total_max - t.total_scored),
            passing_percentage: request.passing_percentage,
            pass_status: PassSummary {
                overall_passed: t.passed,
                subjects_passed: count - failed_count,
                subjects_failed: failed_count,
                failed_subjects: t.failed.clone(),
                pass_rate: round_dp((count - failed_count) as f64 / count as f64 * 100.0, 1),
            },
            performance_analysis: overall_performance(t.percentage, request.passing_percentage),
            improvement_plan: improvement_plan(&t),
            recommendations: recommendations(&t, request.passing_percentage, analysis.percentage_range),
            subject_analysis: analysis,
            notes: vec![
                "Overall percentage is calculated from total marks across all subjects",
                "Some institutions require passing in each subject individually",
                "Focus on weak subjects to improve overall performance",
                "Consistent effort across all subjects is important",
            ],
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(subject: &str, scored: f64, max: f64) -> SubjectMark {
        SubjectMark {
            subject: subject.to_string(),
            scored,
            max,
        }
    }

    #[test]
    fn test_overall_percentage() {
        let req = PercentageRequest::new(vec![
            mark("Math", 90.0, 100.0),
            mark("Physics", 70.0, 100.0),
            mark("Art", 40.0, 50.0),
        ]);
        let r = PercentageCalculator::simple(&req).unwrap();
        // 200 / 250
        assert_eq!(r.percentage, 80.0);
        assert_eq!(r.grade, "A");
        assert_eq!(r.status, "Pass");
        assert_eq!(r.subjects.len(), 3);
        println!("✅ Percentage overall test PASSED");
    }

    #[test]
    fn test_failing_subject_fails_overall() {
        let req = PercentageRequest::new(vec![mark("Math", 95.0, 100.0), mark("Bio", 30.0, 100.0)]);
        let r = PercentageCalculator::simple(&req).unwrap();
        assert_eq!(r.percentage, 62.5);
        assert_eq!(r.status, "Fail");

        let d = PercentageCalculator::detailed(&req).unwrap();
        assert_eq!(d.pass_status.failed_subjects, vec!["Bio".to_string()]);
        assert_eq!(d.pass_status.pass_rate, 50.0);
        assert_eq!(d.subject_analysis.consistency, "Low");
        assert_eq!(d.subject_analysis.worst_subject.name, "Bio");
        assert_eq!(d.improvement_plan.priority_subjects[0].subject, "Bio");
        assert!(d.recommendations.iter().any(|r| r.contains("failed subjects - Bio")));
    }

    #[test]
    fn test_validation() {
        assert!(PercentageCalculator::simple(&PercentageRequest::new(vec![])).is_err());
        assert!(
            PercentageCalculator::simple(&PercentageRequest::new(vec![mark("X", 11.0, 10.0)]))
                .is_err()
        );
        assert!(
            PercentageCalculator::simple(&PercentageRequest::new(vec![mark("X", 1.0, 0.0)]))
                .is_err()
        );
    }
}
