// 📝 Grade Calculator
// Marks → percentage → letter grade under standard / strict / lenient systems

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

/// One row of a grading table: lower bound (inclusive) and what it maps to
#[derive(Debug, Clone, Copy)]
struct Band {
    min: f64,
    grade: &'static str,
    description: &'static str,
    grade_points: f64,
    color: &'static str,
}

const fn band(
    min: f64,
    grade: &'static str,
    description: &'static str,
    grade_points: f64,
    color: &'static str,
) -> Band {
    Band {
        min,
        grade,
        description,
        grade_points,
        color,
    }
}

const STANDARD: [Band; 7] = [
    band(90.0, "A+", "Outstanding", 4.0, "#2ecc71"),
    band(80.0, "A", "Excellent", 4.0, "#27ae60"),
    band(70.0, "B+", "Very Good", 3.3, "#3498db"),
    band(60.0, "B", "Good", 3.0, "#2980b9"),
    band(50.0, "C", "Average", 2.0, "#f39c12"),
    band(40.0, "D", "Pass", 1.0, "#e67e22"),
    band(0.0, "F", "Fail", 0.0, "#e74c3c"),
];

const STRICT: [Band; 10] = [
    band(95.0, "A+", "Outstanding", 4.0, "#2ecc71"),
    band(90.0, "A", "Excellent", 4.0, "#27ae60"),
    band(85.0, "A-", "Very Good", 3.7, "#229954"),
    band(80.0, "B+", "Good", 3.3, "#3498db"),
    band(75.0, "B", "Above Average", 3.0, "#2980b9"),
    band(70.0, "B-", "Average", 2.7, "#5dade2"),
    band(65.0, "C+", "Below Average", 2.3, "#f39c12"),
    band(60.0, "C", "Satisfactory", 2.0, "#e67e22"),
    band(50.0, "D", "Pass", 1.0, "#e74c3c"),
    band(0.0, "F", "Fail", 0.0, "#c0392b"),
];

const LENIENT: [Band; 7] = [
    band(85.0, "A+", "Outstanding", 4.0, "#2ecc71"),
    band(75.0, "A", "Excellent", 4.0, "#27ae60"),
    band(65.0, "B+", "Very Good", 3.3, "#3498db"),
    band(55.0, "B", "Good", 3.0, "#2980b9"),
    band(45.0, "C", "Average", 2.0, "#f39c12"),
    band(35.0, "D", "Pass", 1.0, "#e67e22"),
    band(0.0, "F", "Fail", 0.0, "#e74c3c"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingSystem {
    Standard,
    Strict,
    Lenient,
}

impl GradingSystem {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" | "" => Ok(GradingSystem::Standard),
            "strict" => Ok(GradingSystem::Strict),
            "lenient" => Ok(GradingSystem::Lenient),
            _ => Err(CalcError::unsupported("grading_system", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradingSystem::Standard => "standard",
            GradingSystem::Strict => "strict",
            GradingSystem::Lenient => "lenient",
        }
    }

    fn bands(&self) -> &'static [Band] {
        match self {
            GradingSystem::Standard => &STANDARD,
            GradingSystem::Strict => &STRICT,
            GradingSystem::Lenient => &LENIENT,
        }
    }

    fn band_for(&self, percentage: f64) -> Band {
        let bands = self.bands();
        bands
            .iter()
            .find(|b| percentage >= b.min)
            .copied()
            .unwrap_or(bands[bands.len() - 1])
    }
}

fn default_system() -> String {
    "standard".to_string()
}

fn default_passing() -> f64 {
    40.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeRequest {
    pub scored: f64,
    pub total: f64,
    #[serde(default = "default_system")]
    pub grading_system: String,
    #[serde(default = "default_passing")]
    pub passing_percentage: f64,
}

impl GradeRequest {
    pub fn new(scored: f64, total: f64) -> Self {
        GradeRequest {
            scored,
            total,
            grading_system: default_system(),
            passing_percentage: default_passing(),
        }
    }

    pub fn with_system(mut self, system: &str) -> Self {
        self.grading_system = system.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSimple {
    pub percentage: f64,
    pub grade: String,
    pub color: String,
    pub scored: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub marks_lost: f64,
    pub fraction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeInfo {
    pub grade_description: &'static str,
    pub grade_points: f64,
    pub grading_system: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassStatus {
    pub passed: bool,
    pub passing_percentage: f64,
    pub margin: f64,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradePerformance {
    pub performance_level: &'static str,
    pub description: &'static str,
    pub estimated_percentile: u32,
    pub above_passing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementScenario {
    pub target_percentage: u32,
    pub additional_marks_needed: f64,
    pub additional_percentage_needed: f64,
    pub achievable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeBoundary {
    pub grade: &'static str,
    pub min_percentage: f64,
    pub max_percentage: f64,
    pub min_marks: f64,
    pub max_marks: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeDetailed {
    #[serde(flatten)]
    pub simple: GradeSimple,
    pub score_summary: ScoreSummary,
    pub grade_info: GradeInfo,
    pub pass_status: PassStatus,
    pub performance_analysis: GradePerformance,
    pub improvement_scenarios: Vec<ImprovementScenario>,
    pub grade_boundaries: Vec<GradeBoundary>,
    pub recommendations: Vec<String>,
    pub notes: Vec<&'static str>,
}

const IMPROVEMENT_TARGETS: [u32; 8] = [40, 50, 60, 70, 80, 90, 95, 100];

fn validate(request: &GradeRequest) -> CalcResult<(GradingSystem, f64)> {
    Validator::new(GradeCalculator::NAME)
        .non_negative("scored", request.scored)
        .positive("total", request.total)
        .check(
            request.scored <= request.total,
            "scored",
            "cannot exceed total marks",
        )
        .range("passing_percentage", request.passing_percentage, 0.0, 100.0)
        .finish()?;
    let system = GradingSystem::parse(&request.grading_system)?;
    Ok((system, request.scored / request.total * 100.0))
}

fn performance(percentage: f64, passing: f64) -> GradePerformance {
    let (level, description) = if percentage >= 90.0 {
        ("Exceptional", "Outstanding performance, top of the class")
    } else if percentage >= 80.0 {
        ("Excellent", "Excellent work, well above average")
    } else if percentage >= 70.0 {
        ("Good", "Good performance, above average")
    } else if percentage >= 60.0 {
        ("Satisfactory", "Satisfactory work, meeting expectations")
    } else if percentage >= passing {
        ("Passing", "Passing grade, but room for improvement")
    } else {
        ("Failing", "Below passing standard, needs significant improvement")
    };

    // Rough estimate from the percentage band
    let percentile = match percentage {
        p if p >= 90.0 => 95,
        p if p >= 80.0 => 85,
        p if p >= 70.0 => 70,
        p if p >= 60.0 => 55,
        p if p >= 50.0 => 40,
        _ => 25,
    };

    GradePerformance {
        performance_level: level,
        description,
        estimated_percentile: percentile,
        above_passing: percentage >= passing,
    }
}

fn improvement(scored: f64, total: f64, percentage: f64) -> Vec<ImprovementScenario> {
    IMPROVEMENT_TARGETS
        .iter()
        .filter(|&&target| f64::from(target) > percentage)
        .map(|&target| {
            let needed = f64::from(target) * total / 100.0 - scored;
            ImprovementScenario {
                target_percentage: target,
                additional_marks_needed: round_money(needed),
                additional_percentage_needed: round_money(f64::from(target) - percentage),
                achievable: needed <= total - scored,
            }
        })
        .collect()
}

/// Marks needed for each grade of a system, top band first
pub fn grade_boundaries(system: GradingSystem, total: f64) -> Vec<GradeBoundary> {
    let bands = system.bands();
    bands
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let max_percentage = if i == 0 { 100.0 } else { bands[i - 1].min - 0.01 };
            GradeBoundary {
                grade: b.grade,
                min_percentage: b.min,
                max_percentage,
                min_marks: round_money(b.min * total / 100.0),
                max_marks: round_money(max_percentage * total / 100.0),
            }
        })
        .collect()
}

fn recommendations(percentage: f64, passing: f64, marks_lost: f64, total: f64) -> Vec<String> {
    let base: &[&str] = if percentage >= 90.0 {
        &[
            "Excellent work! You're performing at the highest level",
            "Maintain your study habits and consistency",
            "Consider helping peers who are struggling",
            "Challenge yourself with advanced topics",
        ]
    } else if percentage >= 80.0 {
        &[
            "Great performance! You're doing very well",
            "Review areas where you lost marks to reach 90%+",
            "Keep up the consistent effort",
            "Focus on perfecting your understanding",
        ]
    } else if percentage >= 70.0 {
        &[
            "Good work! Solid performance overall",
            "Identify weak areas and strengthen them",
            "Practice more problems in challenging topics",
            "Aim for 80%+ in your next assessment",
        ]
    } else if percentage >= 60.0 {
        &[
            "Satisfactory performance with room for improvement",
            "Review fundamental concepts thoroughly",
            "Increase study time and practice",
            "Seek help from teachers for difficult topics",
            "Create a structured study plan",
        ]
    } else if percentage >= passing {
        &[
            "You've passed, but there's significant room for improvement",
            "Focus on building strong fundamentals",
            "Dedicate more time to regular study",
            "Practice previous papers and exercises",
            "Don't hesitate to ask for help",
        ]
    } else {
        &[
            "⚠️ Immediate action needed - below passing grade",
            "Meet with your teacher to discuss improvement strategies",
            "Identify specific topics causing difficulty",
            "Create a detailed study schedule",
            "Consider tutoring or study groups",
            "Focus on understanding, not memorization",
        ]
    };
    let mut recs: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    let loss_percentage = marks_lost / total * 100.0;
    if loss_percentage > 20.0 {
        recs.push(format!(
            "You lost {}% - review these areas carefully",
            round_dp(loss_percentage, 1)
        ));
    }
    recs
}

pub struct GradeCalculator;

impl Calculator for GradeCalculator {
    type Request = GradeRequest;
    type Simple = GradeSimple;
    type Detailed = GradeDetailed;
    const NAME: &'static str = "grade";

    fn simple(request: &GradeRequest) -> CalcResult<GradeSimple> {
        let (system, percentage) = validate(request)?;
        let band = system.band_for(percentage);
        Ok(GradeSimple {
            percentage: round_money(percentage),
            grade: band.grade.to_string(),
            color: band.color.to_string(),
            scored: request.scored,
            total: request.total,
        })
    }

    fn detailed(request: &GradeRequest) -> CalcResult<GradeDetailed> {
        let simple = Self::simple(request)?;
        let (system, percentage) = validate(request)?;
        let band = system.band_for(percentage);
        let passing = request.passing_percentage;
        let marks_lost = request.total - request.scored;
        let passed = percentage >= passing;

        Ok(GradeDetailed {
            score_summary: ScoreSummary {
                marks_lost,
                fraction: format!("{}/{}", request.scored, request.total),
            },
            grade_info: GradeInfo {
                grade_description: band.description,
                grade_points: band.grade_points,
                grading_system: system.as_str(),
            },
            pass_status: PassStatus {
                passed,
                passing_percentage: passing,
                margin: round_money(percentage - passing),
                status: if passed { "Passed" } else { "Failed" },
            },
            performance_analysis: performance(percentage, passing),
            improvement_scenarios: improvement(request.scored, request.total, percentage),
            grade_boundaries: grade_boundaries(system, request.total),
            recommendations: recommendations(percentage, passing, marks_lost, request.total),
            notes: vec![
                "Grade is calculated based on percentage scored",
                "Different institutions may use different grading systems",
                "Focus on understanding concepts, not just grades",
                "Consistent effort leads to better results",
            ],
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grades() {
        let r = GradeCalculator::simple(&GradeRequest::new(85.0, 100.0)).unwrap();
        assert_eq!(r.percentage, 85.0);
        assert_eq!(r.grade, "A");
        assert_eq!(r.color, "#27ae60");

        let r = GradeCalculator::simple(&GradeRequest::new(39.0, 100.0)).unwrap();
        assert_eq!(r.grade, "F");
        println!("✅ Standard grading test PASSED");
    }

    #[test]
    fn test_systems_differ_on_same_score() {
        let strict = GradeCalculator::simple(&GradeRequest::new(87.0, 100.0).with_system("strict"))
            .unwrap();
        let lenient =
            GradeCalculator::simple(&GradeRequest::new(87.0, 100.0).with_system("lenient"))
                .unwrap();
        assert_eq!(strict.grade, "A-");
        assert_eq!(lenient.grade, "A+");
        assert!(GradeCalculator::simple(&GradeRequest::new(87.0, 100.0).with_system("curve"))
            .is_err());
    }

    #[test]
    fn test_validation() {
        assert!(GradeCalculator::simple(&GradeRequest::new(-1.0, 100.0)).is_err());
        assert!(GradeCalculator::simple(&GradeRequest::new(10.0, 0.0)).is_err());
        assert!(GradeCalculator::simple(&GradeRequest::new(101.0, 100.0)).is_err());
    }

    #[test]
    fn test_detailed_scenarios_and_boundaries() {
        let d = GradeCalculator::detailed(&GradeRequest::new(36.0, 50.0)).unwrap();
        // 72%
        assert_eq!(d.simple.grade, "B+");
        assert!(d.pass_status.passed);
        assert_eq!(d.pass_status.margin, 32.0);
        assert_eq!(d.performance_analysis.estimated_percentile, 70);
        let targets: Vec<u32> = d
            .improvement_scenarios
            .iter()
            .map(|s| s.target_percentage)
            .collect();
        assert_eq!(targets, vec![80, 90, 95, 100]);
        assert_eq!(d.improvement_scenarios[0].additional_marks_needed, 4.0);

        assert_eq!(d.grade_boundaries.len(), 7);
        assert_eq!(d.grade_boundaries[1].max_percentage, 89.99);
        assert_eq!(d.grade_boundaries[1].min_marks, 40.0);
        // 28% lost
        assert!(d.recommendations.iter().any(|r| r.contains("28")));
    }
}
