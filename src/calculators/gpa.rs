// 🎓 GPA Calculator
// Credit-weighted GPA on 4.0 / 5.0 scales with cumulative and what-if analysis

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::Validator;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

static FOUR_POINT: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("A+", 4.0), ("A", 4.0), ("A-", 3.7),
        ("B+", 3.3), ("B", 3.0), ("B-", 2.7),
        ("C+", 2.3), ("C", 2.0), ("C-", 1.7),
        ("D+", 1.3), ("D", 1.0), ("D-", 0.7),
        ("F", 0.0),
    ])
});

static FIVE_POINT: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("A+", 5.0), ("A", 5.0), ("A-", 4.7),
        ("B+", 4.3), ("B", 4.0), ("B-", 3.7),
        ("C+", 3.3), ("C", 3.0), ("C-", 2.7),
        ("D+", 2.3), ("D", 2.0), ("D-", 1.7),
        ("F", 0.0),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpaScale {
    Four,
    Five,
}

impl GpaScale {
    /// Accepts "4.0" / "5.0" / "4" / "5" as string or number
    pub fn from_value(value: &Value) -> CalcResult<Self> {
        let text = match value {
            Value::Null => return Ok(GpaScale::Four),
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        };
        match text.as_str() {
            "4.0" | "4" => Ok(GpaScale::Four),
            "5.0" | "5" => Ok(GpaScale::Five),
            _ => Err(CalcError::unsupported("scale", &text)),
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            GpaScale::Four => 4.0,
            GpaScale::Five => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GpaScale::Four => "4.0",
            GpaScale::Five => "5.0",
        }
    }

    fn table(&self) -> &'static HashMap<&'static str, f64> {
        match self {
            GpaScale::Four => &FOUR_POINT,
            GpaScale::Five => &FIVE_POINT,
        }
    }

    /// Grade points for a letter; letters are trimmed and upper-cased first
    pub fn points(&self, grade: &str) -> CalcResult<f64> {
        let key = grade.trim().to_uppercase();
        self.table()
            .get(key.as_str())
            .copied()
            .ok_or_else(|| CalcError::unsupported("grade", grade))
    }

    pub fn letter(&self, gpa: f64) -> &'static str {
        let cuts: [(f64, &'static str); 8] = match self {
            GpaScale::Four => [
                (3.7, "A"), (3.3, "A-"), (3.0, "B+"), (2.7, "B"),
                (2.3, "B-"), (2.0, "C+"), (1.7, "C"), (1.0, "D"),
            ],
            GpaScale::Five => [
                (4.7, "A"), (4.3, "A-"), (4.0, "B+"), (3.7, "B"),
                (3.3, "B-"), (3.0, "C+"), (2.7, "C"), (2.0, "D"),
            ],
        };
        cuts.iter()
            .find(|(min, _)| gpa >= *min)
            .map(|(_, letter)| *letter)
            .unwrap_or("F")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub name: Option<String>,
    pub grade: String,
    pub credits: f64,
}

fn default_scale() -> Value {
    Value::String("4.0".to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GpaRequest {
    pub courses: Vec<Course>,
    #[serde(default = "default_scale")]
    pub scale: Value,
    #[serde(default)]
    pub previous_gpa: Option<f64>,
    #[serde(default)]
    pub previous_credits: Option<f64>,
}

impl GpaRequest {
    pub fn new(courses: Vec<Course>) -> Self {
        GpaRequest {
            courses,
            scale: default_scale(),
            previous_gpa: None,
            previous_credits: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaSimple {
    pub gpa: f64,
    pub total_credits: f64,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course_name: String,
    pub grade: String,
    pub credits: f64,
    pub grade_points: f64,
    pub quality_points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeBucket {
    pub count: usize,
    pub percentage: f64,
    pub grade_points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeDistribution {
    pub by_grade: BTreeMap<String, GradeBucket>,
    pub total_courses: usize,
    pub highest_grade: f64,
    pub lowest_grade: f64,
    pub average_grade_points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeGpa {
    pub gpa: f64,
    pub letter_grade: &'static str,
    pub total_credits: f64,
    pub previous_gpa: f64,
    pub previous_credits: f64,
    pub gpa_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceAnalysis {
    pub performance_level: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub percentage_of_max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_vs_cumulative: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub future_credits: u32,
    pub best_case: f64,
    pub worst_case: f64,
    pub if_maintain_current: f64,
    pub total_credits: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequiredGpa {
    pub credits: u32,
    pub required_semester_gpa: f64,
    pub achievable: bool,
    pub difficulty: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatIf {
    pub target_gpa: f64,
    pub scenarios: Vec<RequiredGpa>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GpaDetailed {
    #[serde(flatten)]
    pub simple: GpaSimple,
    pub scale: &'static str,
    pub quality_points: f64,
    pub course_details: Vec<CourseDetail>,
    pub grade_distribution: GradeDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_gpa: Option<CumulativeGpa>,
    pub performance_analysis: PerformanceAnalysis,
    pub predictions: Vec<Prediction>,
    pub what_if_scenarios: Vec<WhatIf>,
    pub recommendations: Vec<String>,
    pub notes: Vec<&'static str>,
}

// ============================================================================
// COMPUTATION
// ============================================================================

struct Transcript {
    scale: GpaScale,
    courses: Vec<CourseDetail>,
    total_points: f64,
    total_credits: f64,
    gpa: f64,
    /// (gpa, credits) including previous terms
    cumulative: Option<(f64, f64)>,
}

impl Transcript {
    /// Cumulative when known, otherwise this term
    fn standing(&self) -> (f64, f64) {
        self.cumulative.unwrap_or((self.gpa, self.total_credits))
    }
}

fn transcript(request: &GpaRequest) -> CalcResult<Transcript> {
    let scale = GpaScale::from_value(&request.scale)?;
    Validator::new(GpaCalculator::NAME)
        .not_empty("courses", &request.courses)
        .finish()?;

    let mut courses = Vec::with_capacity(request.courses.len());
    let mut total_points = 0.0;
    let mut total_credits = 0.0;

    for course in &request.courses {
        Validator::new(GpaCalculator::NAME)
            .positive("credits", course.credits)
            .finish()?;
        let grade_points = scale.points(&course.grade)?;
        let quality = grade_points * course.credits;
        total_points += quality;
        total_credits += course.credits;
        courses.push(CourseDetail {
            course_name: course.name.clone().unwrap_or_else(|| "Unnamed Course".to_string()),
            grade: course.grade.trim().to_uppercase(),
            credits: course.credits,
            grade_points,
            quality_points: round_money(quality),
        });
    }

    let gpa = total_points / total_credits;

    let cumulative = match (request.previous_gpa, request.previous_credits) {
        (Some(prev_gpa), Some(prev_credits)) => {
            Validator::new(GpaCalculator::NAME)
                .non_negative("previous_credits", prev_credits)
                .range("previous_gpa", prev_gpa, 0.0, scale.max())
                .finish()?;
            let credits = prev_credits + total_credits;
            Some(((prev_gpa * prev_credits + total_points) / credits, credits))
        }
        _ => None,
    };

    Ok(Transcript {
        scale,
        courses,
        total_points,
        total_credits,
        gpa,
        cumulative,
    })
}

fn distribution(courses: &[CourseDetail]) -> GradeDistribution {
    let total = courses.len();
    let mut by_grade: BTreeMap<String, GradeBucket> = BTreeMap::new();
    for course in courses {
        let bucket = by_grade.entry(course.grade.clone()).or_insert(GradeBucket {
            count: 0,
            percentage: 0.0,
            grade_points: course.grade_points,
        });
        bucket.count += 1;
    }
    for bucket in by_grade.values_mut() {
        bucket.percentage = round_dp(bucket.count as f64 / total as f64 * 100.0, 1);
    }

    let points: Vec<f64> = courses.iter().map(|c| c.grade_points).collect();
    GradeDistribution {
        by_grade,
        total_courses: total,
        highest_grade: points.iter().cloned().fold(f64::MIN, f64::max),
        lowest_grade: points.iter().cloned().fold(f64::MAX, f64::min),
        average_grade_points: round_money(points.iter().sum::<f64>() / total as f64),
    }
}

/// Performance band as a share of the scale maximum
pub fn performance_band(gpa: f64, max: f64) -> (&'static str, &'static str, &'static str) {
    if gpa >= max * 0.9 {
        ("Excellent", "Outstanding academic performance", "#2ecc71")
    } else if gpa >= max * 0.75 {
        ("Good", "Strong academic performance", "#27ae60")
    } else if gpa >= max * 0.60 {
        ("Satisfactory", "Acceptable academic performance", "#f39c12")
    } else if gpa >= max * 0.50 {
        ("Needs Improvement", "Below average performance", "#e67e22")
    } else {
        ("Critical", "Significant improvement needed", "#e74c3c")
    }
}

fn analyze(t: &Transcript) -> PerformanceAnalysis {
    let max = t.scale.max();
    let (gpa, _) = t.standing();
    let (level, description, color) = performance_band(gpa, max);
    let (trend, diff) = match t.cumulative {
        Some((cumulative, _)) => {
            let trend = if t.gpa > cumulative {
                "improving"
            } else if t.gpa < cumulative {
                "declining"
            } else {
                "stable"
            };
            (Some(trend), Some(round_money(t.gpa - cumulative)))
        }
        None => (None, None),
    };

    PerformanceAnalysis {
        performance_level: level,
        description,
        color,
        percentage_of_max: round_dp(gpa / max * 100.0, 1),
        trend,
        semester_vs_cumulative: diff,
    }
}

fn predictions(gpa: f64, credits: f64, max: f64) -> Vec<Prediction> {
    [12u32, 15, 18, 30, 60]
        .iter()
        .map(|&future| {
            let f = f64::from(future);
            let total = credits + f;
            Prediction {
                future_credits: future,
                best_case: round_money((gpa * credits + max * f) / total),
                worst_case: round_money(gpa * credits / total),
                if_maintain_current: round_money(gpa),
                total_credits: total,
            }
        })
        .collect()
}

pub fn difficulty(required: f64, max: f64) -> &'static str {
    if required > max {
        "Impossible"
    } else if required >= max * 0.95 {
        "Very Difficult"
    } else if required >= max * 0.85 {
        "Difficult"
    } else if required >= max * 0.75 {
        "Moderate"
    } else if required >= max * 0.60 {
        "Achievable"
    } else {
        "Easy"
    }
}

fn what_if(gpa: f64, credits: f64, scale: GpaScale) -> Vec<WhatIf> {
    let max = scale.max();
    let targets: &[f64] = match scale {
        GpaScale::Four => &[3.0, 3.5, 4.0],
        GpaScale::Five => &[3.5, 4.0, 4.5, 5.0],
    };
    targets
        .iter()
        .map(|&target| WhatIf {
            target_gpa: target,
            scenarios: [12u32, 15, 18, 30]
                .iter()
                .map(|&next| {
                    let n = f64::from(next);
                    let required = (target * (credits + n) - gpa * credits) / n;
                    RequiredGpa {
                        credits: next,
                        required_semester_gpa: round_money(required),
                        achievable: (0.0..=max).contains(&required),
                        difficulty: difficulty(required, max),
                    }
                })
                .collect(),
        })
        .collect()
}

fn recommendations(gpa: f64, max: f64, courses: &[CourseDetail]) -> Vec<String> {
    let base: &[&str] = if gpa >= max * 0.9 {
        &[
            "Excellent work! Maintain your study habits",
            "Consider taking more challenging courses",
            "You're on track for academic honors",
            "Share your study strategies with peers",
        ]
    } else if gpa >= max * 0.75 {
        &[
            "Good performance! Keep up the consistent effort",
            "Identify areas where you can improve further",
            "Consider joining study groups for challenging subjects",
            "Aim for higher grades in your major courses",
        ]
    } else if gpa >= max * 0.60 {
        &[
            "Focus on improving study habits and time management",
            "Seek help from professors during office hours",
            "Consider tutoring for difficult subjects",
            "Review and strengthen foundational concepts",
            "Create a structured study schedule",
        ]
    } else {
        &[
            "⚠️ Immediate action needed to improve GPA",
            "Meet with academic advisor to create improvement plan",
            "Utilize all available academic support resources",
            "Consider reducing course load to focus on quality",
            "Identify and address underlying challenges",
            "Set specific, achievable goals for each course",
        ]
    };
    let mut recs: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    // Distinct low letters, counted once each
    let mut low: Vec<&str> = courses
        .iter()
        .filter(|c| c.grade_points < max * 0.6)
        .map(|c| c.grade.as_str())
        .collect();
    low.sort_unstable();
    low.dedup();
    if !low.is_empty() {
        recs.push(format!(
            "Focus on improving performance in {} course(s) with lower grades",
            low.len()
        ));
    }
    recs
}

// ============================================================================
// CALCULATOR
// ============================================================================

pub struct GpaCalculator;

impl Calculator for GpaCalculator {
    type Request = GpaRequest;
    type Simple = GpaSimple;
    type Detailed = GpaDetailed;
    const NAME: &'static str = "gpa";

    fn simple(request: &GpaRequest) -> CalcResult<GpaSimple> {
        let t = transcript(request)?;
        Ok(GpaSimple {
            gpa: round_money(t.gpa),
            total_credits: t.total_credits,
            grade: t.scale.letter(t.gpa).to_string(),
        })
    }

    fn detailed(request: &GpaRequest) -> CalcResult<GpaDetailed> {
        let simple = Self::simple(request)?;
        let t = transcript(request)?;
        let max = t.scale.max();
        let (standing_gpa, standing_credits) = t.standing();

        let cumulative_gpa = match (t.cumulative, request.previous_gpa, request.previous_credits) {
            (Some((gpa, credits)), Some(prev_gpa), Some(prev_credits)) => Some(CumulativeGpa {
                gpa: round_money(gpa),
                letter_grade: t.scale.letter(gpa),
                total_credits: credits,
                previous_gpa: prev_gpa,
                previous_credits: prev_credits,
                gpa_change: round_money(gpa - prev_gpa),
            }),
            _ => None,
        };

        Ok(GpaDetailed {
            simple,
            scale: t.scale.as_str(),
            quality_points: round_money(t.total_points),
            grade_distribution: distribution(&t.courses),
            cumulative_gpa,
            performance_analysis: analyze(&t),
            predictions: predictions(standing_gpa, standing_credits, max),
            what_if_scenarios: what_if(standing_gpa, standing_credits, t.scale),
            recommendations: recommendations(standing_gpa, max, &t.courses),
            course_details: t.courses,
            notes: vec![
                "GPA is calculated as total quality points divided by total credits",
                "Quality points = grade points × credit hours",
                "Maintain consistent performance across all courses",
                "Seek help early if struggling in any course",
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(grade: &str, credits: f64) -> Course {
        Course {
            name: None,
            grade: grade.to_string(),
            credits,
        }
    }

    #[test]
    fn test_reference_gpa() {
        let result =
            GpaCalculator::simple(&GpaRequest::new(vec![course("A", 3.0), course("B", 4.0)]))
                .unwrap();
        // (4.0×3 + 3.0×4) / 7
        assert_eq!(result.gpa, 3.43);
        assert_eq!(result.total_credits, 7.0);
        assert_eq!(result.grade, "A-");
        println!("✅ GPA reference test PASSED");
    }

    #[test]
    fn test_scale_maximum_is_top_letter() {
        assert_eq!(GpaScale::Four.letter(4.0), "A");
        assert_eq!(GpaScale::Five.letter(5.0), "A");
        assert_eq!(GpaScale::Four.letter(0.99), "F");

        let mut req = GpaRequest::new(vec![course("a+", 3.0)]);
        req.scale = json!(5.0);
        let result = GpaCalculator::simple(&req).unwrap();
        assert_eq!(result.gpa, 5.0);
        assert_eq!(result.grade, "A");
    }

    #[test]
    fn test_grade_letters_are_normalised() {
        let result =
            GpaCalculator::simple(&GpaRequest::new(vec![course(" b+ ", 3.0)])).unwrap();
        assert_eq!(result.gpa, 3.3);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(GpaCalculator::simple(&GpaRequest::new(vec![])).is_err());
        assert!(matches!(
            GpaCalculator::simple(&GpaRequest::new(vec![course("Z", 3.0)])),
            Err(CalcError::UnsupportedOption { .. })
        ));
        assert!(GpaCalculator::simple(&GpaRequest::new(vec![course("A", 0.0)])).is_err());
        let mut req = GpaRequest::new(vec![course("A", 3.0)]);
        req.scale = json!("10.0");
        assert!(GpaCalculator::simple(&req).is_err());
    }

    #[test]
    fn test_cumulative_and_what_if() {
        let mut req = GpaRequest::new(vec![course("A", 3.0), course("A", 3.0)]);
        req.previous_gpa = Some(3.0);
        req.previous_credits = Some(30.0);
        let detailed = GpaCalculator::detailed(&req).unwrap();

        let cumulative = detailed.cumulative_gpa.unwrap();
        // (90 + 24) / 36
        assert_eq!(cumulative.gpa, 3.17);
        assert_eq!(cumulative.total_credits, 36.0);
        assert_eq!(detailed.performance_analysis.trend, Some("improving"));
        assert_eq!(detailed.what_if_scenarios.len(), 3);
        assert_eq!(detailed.predictions.len(), 5);
        let target_four = &detailed.what_if_scenarios[2].scenarios[0];
        assert!(!target_four.achievable);
        assert_eq!(target_four.difficulty, "Impossible");
    }
}
