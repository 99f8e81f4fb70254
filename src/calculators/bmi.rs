// ⚖️ BMI Calculator
// Body-mass index with WHO categories, ideal weight and body metrics

use super::body::{mifflin_st_jeor, Gender};
use crate::errors::CalcResult;
use crate::result::Calculator;
use crate::rounding::{round_dp, round_money};
use crate::validation::{UnitSystem, Validator, CM_PER_INCH};
use serde::{Deserialize, Serialize};

const LBS_PER_KG: f64 = 2.20462;

/// Weekly change assumed by the weight-goal estimates (kg)
const SAFE_WEEKLY_CHANGE_KG: f64 = 0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct BmiRequest {
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub waist_circumference: Option<f64>,
    #[serde(default)]
    pub hip_circumference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiSimple {
    pub bmi: f64,
    pub category: String,
    pub color: String,
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    SevereUnderweight,
    ModerateUnderweight,
    MildUnderweight,
    Normal,
    Overweight,
    ObeseI,
    ObeseII,
    ObeseIII,
    /// Adult cut-offs do not apply under 20
    Pediatric,
}

impl BmiCategory {
    /// Lower-inclusive thresholds: 18.5 is already Normal Weight
    pub fn classify(bmi: f64, age: Option<f64>) -> Self {
        if matches!(age, Some(a) if a < 20.0) {
            return BmiCategory::Pediatric;
        }
        if bmi < 16.0 {
            BmiCategory::SevereUnderweight
        } else if bmi < 17.0 {
            BmiCategory::ModerateUnderweight
        } else if bmi < 18.5 {
            BmiCategory::MildUnderweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else if bmi < 35.0 {
            BmiCategory::ObeseI
        } else if bmi < 40.0 {
            BmiCategory::ObeseII
        } else {
            BmiCategory::ObeseIII
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BmiCategory::SevereUnderweight => "Severe Underweight",
            BmiCategory::ModerateUnderweight => "Moderate Underweight",
            BmiCategory::MildUnderweight => "Mild Underweight",
            BmiCategory::Normal => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseI => "Obese Class I",
            BmiCategory::ObeseII => "Obese Class II",
            BmiCategory::ObeseIII => "Obese Class III",
            BmiCategory::Pediatric => "See pediatric BMI chart",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::SevereUnderweight => "Significantly below healthy weight",
            BmiCategory::ModerateUnderweight => "Below healthy weight",
            BmiCategory::MildUnderweight => "Slightly below healthy weight",
            BmiCategory::Normal => "Healthy weight range",
            BmiCategory::Overweight => "Above healthy weight",
            BmiCategory::ObeseI => "Moderately obese",
            BmiCategory::ObeseII => "Severely obese",
            BmiCategory::ObeseIII => "Morbidly obese",
            BmiCategory::Pediatric => "BMI interpretation differs for individuals under 20",
        }
    }

    pub fn health_risk(&self) -> &'static str {
        match self {
            BmiCategory::SevereUnderweight => "High risk - malnutrition, weakened immunity",
            BmiCategory::ModerateUnderweight => "Moderate risk - nutritional deficiency",
            BmiCategory::MildUnderweight => "Low to moderate risk",
            BmiCategory::Normal => "Low risk - optimal health range",
            BmiCategory::Overweight => "Moderate risk - increased disease risk",
            BmiCategory::ObeseI => "High risk - cardiovascular, diabetes",
            BmiCategory::ObeseII => "Very high risk - serious health complications",
            BmiCategory::ObeseIII => "Extremely high risk - life-threatening conditions",
            BmiCategory::Pediatric => "Consult pediatrician",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BmiCategory::SevereUnderweight => "#3498db",
            BmiCategory::ModerateUnderweight => "#5dade2",
            BmiCategory::MildUnderweight => "#85c1e9",
            BmiCategory::Normal => "#2ecc71",
            BmiCategory::Overweight => "#f39c12",
            BmiCategory::ObeseI => "#e67e22",
            BmiCategory::ObeseII => "#d35400",
            BmiCategory::ObeseIII => "#e74c3c",
            BmiCategory::Pediatric => "#95a5a6",
        }
    }
}

// ============================================================================
// DETAILED SHAPE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthyRange {
    pub min_kg: f64,
    pub max_kg: f64,
    pub min_lbs: f64,
    pub max_lbs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdealWeight {
    pub healthy_bmi_range: HealthyRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hamwi_formula_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devine_formula_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robinson_formula_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightGoal {
    pub target_bmi: f64,
    pub weight_kg: f64,
    pub change_kg: f64,
    pub change_lbs: f64,
    pub weeks_to_goal: f64,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightGoals {
    pub to_normal_max: WeightGoal,
    pub to_normal_mid: WeightGoal,
    pub to_normal_min: WeightGoal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyMetrics {
    pub body_surface_area_m2: f64,
    pub ponderal_index: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_percentile: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyComposition {
    pub waist_to_hip_ratio: f64,
    pub health_risk: &'static str,
    pub waist_cm: f64,
    pub hip_cm: f64,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthRiskAssessment {
    pub potential_health_risks: Vec<&'static str>,
    pub waist_circumference_risk: Option<&'static str>,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaloricNeeds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_loss_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_gain_calories: Option<f64>,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputEcho {
    pub unit_system: &'static str,
    pub height_cm: f64,
    pub height_inches: f64,
    pub weight_kg: f64,
    pub weight_lbs: f64,
    pub age: Option<f64>,
    pub gender: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiDetailed {
    #[serde(flatten)]
    pub simple: BmiSimple,
    pub bmi_prime: f64,
    pub category_description: &'static str,
    pub health_risk: &'static str,
    pub ideal_weight_range: IdealWeight,
    pub weight_goals: WeightGoals,
    pub body_metrics: BodyMetrics,
    pub body_composition: Option<BodyComposition>,
    pub health_risk_assessment: HealthRiskAssessment,
    pub caloric_recommendations: CaloricNeeds,
    pub input_parameters: InputEcho,
    pub recommendations: Vec<&'static str>,
    pub notes: Vec<&'static str>,
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Normalised metric inputs after validation
struct Measured {
    height_cm: f64,
    weight_kg: f64,
    age: Option<f64>,
    gender: Option<Gender>,
    waist_cm: Option<f64>,
    hip_cm: Option<f64>,
    bmi: f64,
}

fn measure(request: &BmiRequest) -> CalcResult<Measured> {
    let mut v = Validator::new(BmiCalculator::NAME)
        .positive("height", request.height)
        .positive("weight", request.weight);
    if let Some(age) = request.age {
        v = v.range("age", age, 1.0, 120.0);
    }
    v.finish()?;
    let gender = Gender::parse_opt(request.gender.as_deref())?;

    let units = request.unit_system;
    let height_cm = units.height_cm(request.height);
    let weight_kg = units.weight_kg(request.weight);

    Validator::new(BmiCalculator::NAME)
        .range("height", height_cm, 50.0, 300.0)
        .range("weight", weight_kg, 20.0, 500.0)
        .finish()?;

    let height_m = height_cm / 100.0;
    let bmi = round_money(weight_kg / (height_m * height_m));

    Ok(Measured {
        height_cm,
        weight_kg,
        age: request.age,
        gender,
        waist_cm: request.waist_circumference.map(|w| units.height_cm(w)),
        hip_cm: request.hip_circumference.map(|h| units.height_cm(h)),
        bmi,
    })
}

pub struct BmiCalculator;

impl Calculator for BmiCalculator {
    type Request = BmiRequest;
    type Simple = BmiSimple;
    type Detailed = BmiDetailed;
    const NAME: &'static str = "bmi";

    fn simple(request: &BmiRequest) -> CalcResult<BmiSimple> {
        let m = measure(request)?;
        let category = BmiCategory::classify(m.bmi, m.age);
        Ok(BmiSimple {
            bmi: m.bmi,
            category: category.name().to_string(),
            color: category.color().to_string(),
        })
    }

    fn detailed(request: &BmiRequest) -> CalcResult<BmiDetailed> {
        let m = measure(request)?;
        let category = BmiCategory::classify(m.bmi, m.age);

        let body_composition = match (m.waist_cm, m.hip_cm) {
            (Some(waist), Some(hip)) if hip > 0.0 => Some(body_ratios(waist, hip, m.gender)),
            _ => None,
        };

        let bmi_percentile = match (m.age, m.gender) {
            (Some(age), Some(_)) if age < 20.0 => {
                Some("Consult pediatric BMI percentile charts for accurate assessment")
            }
            (Some(_), Some(_)) => Some("N/A (for ages 2-19 only)"),
            _ => None,
        };

        Ok(BmiDetailed {
            simple: BmiSimple {
                bmi: m.bmi,
                category: category.name().to_string(),
                color: category.color().to_string(),
            },
            bmi_prime: round_money(m.bmi / 25.0),
            category_description: category.description(),
            health_risk: category.health_risk(),
            ideal_weight_range: ideal_weight(m.height_cm, m.gender),
            weight_goals: weight_goals(m.weight_kg, m.height_cm),
            body_metrics: BodyMetrics {
                body_surface_area_m2: round_money(((m.height_cm * m.weight_kg) / 3600.0).sqrt()),
                ponderal_index: round_money(m.weight_kg / (m.height_cm / 100.0).powi(3)),
                bmi_percentile,
            },
            body_composition,
            health_risk_assessment: assess_health_risks(m.bmi, m.gender, m.waist_cm),
            caloric_recommendations: caloric_needs(&m),
            input_parameters: InputEcho {
                unit_system: request.unit_system.name(),
                height_cm: round_money(m.height_cm),
                height_inches: round_money(m.height_cm / CM_PER_INCH),
                weight_kg: round_money(m.weight_kg),
                weight_lbs: round_money(m.weight_kg * LBS_PER_KG),
                age: m.age,
                gender: m.gender.map(|g| g.as_str()),
            },
            recommendations: recommendations(m.bmi, m.age),
            notes: vec![
                "BMI is a screening tool, not a diagnostic measure",
                "Athletes and muscular individuals may have high BMI despite low body fat",
                "Consult healthcare provider for personalized health assessment",
                "BMI may not be accurate for children, elderly, or pregnant women",
            ],
        })
    }
}

// ============================================================================
// DERIVED METRICS
// ============================================================================

fn ideal_weight(height_cm: f64, gender: Option<Gender>) -> IdealWeight {
    let height_m2 = (height_cm / 100.0).powi(2);
    let min_healthy = 18.5 * height_m2;
    let max_healthy = 24.9 * height_m2;
    // Inches over five feet
    let over = height_cm / CM_PER_INCH - 60.0;

    let formula = |male: (f64, f64), female: (f64, f64)| {
        gender.map(|g| {
            let (base, per_inch) = match g {
                Gender::Male => male,
                Gender::Female => female,
            };
            round_dp(base + per_inch * over, 1)
        })
    };

    IdealWeight {
        healthy_bmi_range: HealthyRange {
            min_kg: round_dp(min_healthy, 1),
            max_kg: round_dp(max_healthy, 1),
            min_lbs: round_dp(min_healthy * LBS_PER_KG, 1),
            max_lbs: round_dp(max_healthy * LBS_PER_KG, 1),
        },
        hamwi_formula_kg: formula((48.0, 2.7), (45.5, 2.2)),
        devine_formula_kg: formula((50.0, 2.3), (45.5, 2.3)),
        robinson_formula_kg: formula((52.0, 1.9), (49.0, 1.7)),
    }
}

fn weight_goals(current_kg: f64, height_cm: f64) -> WeightGoals {
    let height_m2 = (height_cm / 100.0).powi(2);
    let goal = |target_bmi: f64, description: &'static str| {
        let weight_kg = round_dp(target_bmi * height_m2, 1);
        let change = weight_kg - current_kg;
        WeightGoal {
            target_bmi,
            weight_kg,
            change_kg: round_dp(change, 1),
            change_lbs: round_dp(change * LBS_PER_KG, 1),
            weeks_to_goal: round_dp(change / SAFE_WEEKLY_CHANGE_KG, 0).abs(),
            description,
        }
    };

    WeightGoals {
        to_normal_max: goal(24.9, "Upper limit of normal weight"),
        to_normal_mid: goal(21.7, "Middle of normal weight range"),
        to_normal_min: goal(18.5, "Lower limit of normal weight"),
    }
}

fn body_ratios(waist: f64, hip: f64, gender: Option<Gender>) -> BodyComposition {
    let whr = round_money(waist / hip);
    let health_risk = match gender {
        Some(Gender::Male) if whr < 0.90 => "Low risk",
        Some(Gender::Male) if whr < 1.0 => "Moderate risk",
        Some(Gender::Male) => "High risk",
        Some(Gender::Female) if whr < 0.80 => "Low risk",
        Some(Gender::Female) if whr < 0.85 => "Moderate risk",
        Some(Gender::Female) => "High risk",
        None => "Unknown (gender not specified)",
    };

    BodyComposition {
        waist_to_hip_ratio: whr,
        health_risk,
        waist_cm: round_dp(waist, 1),
        hip_cm: round_dp(hip, 1),
        note: "WHR indicates body fat distribution and cardiovascular risk",
    }
}

fn assess_health_risks(bmi: f64, gender: Option<Gender>, waist_cm: Option<f64>) -> HealthRiskAssessment {
    let potential_health_risks = if bmi < 18.5 {
        vec!["Malnutrition", "Weakened immune system", "Osteoporosis", "Anemia"]
    } else if bmi >= 30.0 {
        vec![
            "Type 2 diabetes",
            "Heart disease",
            "Stroke",
            "Certain cancers",
            "Osteoarthritis",
            "Sleep apnea",
            "Fatty liver disease",
        ]
    } else if bmi >= 25.0 {
        vec!["Type 2 diabetes", "High blood pressure", "Heart disease", "Sleep apnea"]
    } else {
        vec!["Low risk - maintain healthy lifestyle"]
    };

    let waist_circumference_risk = match (waist_cm, gender) {
        (Some(w), Some(Gender::Male)) if w > 102.0 => {
            Some("High risk - waist circumference exceeds 102 cm")
        }
        (Some(w), Some(Gender::Female)) if w > 88.0 => {
            Some("High risk - waist circumference exceeds 88 cm")
        }
        (Some(_), Some(_)) => Some("Normal - waist circumference within healthy range"),
        _ => None,
    };

    HealthRiskAssessment {
        potential_health_risks,
        waist_circumference_risk,
        recommendation: "Consult healthcare provider for personalized assessment",
    }
}

fn caloric_needs(m: &Measured) -> CaloricNeeds {
    match (m.age, m.gender) {
        (Some(age), Some(gender)) => {
            let maintenance = mifflin_st_jeor(gender, m.weight_kg, m.height_cm, age) * 1.55;
            CaloricNeeds {
                maintenance_calories: Some(round_dp(maintenance, 0)),
                weight_loss_calories: Some(round_dp(maintenance - 500.0, 0)),
                weight_gain_calories: Some(round_dp(maintenance + 500.0, 0)),
                note: "Based on moderate activity level (3-5 days/week exercise)",
            }
        }
        _ => CaloricNeeds {
            maintenance_calories: None,
            weight_loss_calories: None,
            weight_gain_calories: None,
            note: "Age and gender required for caloric estimation",
        },
    }
}

fn recommendations(bmi: f64, age: Option<f64>) -> Vec<&'static str> {
    let mut recs = if bmi < 18.5 {
        vec![
            "Increase caloric intake with nutrient-dense foods",
            "Include protein-rich foods in every meal",
            "Consider strength training to build muscle mass",
            "Consult a nutritionist for personalized meal plan",
            "Rule out underlying medical conditions",
        ]
    } else if bmi < 25.0 {
        vec![
            "Maintain current healthy weight through balanced diet",
            "Engage in regular physical activity (150 min/week)",
            "Stay hydrated with 8-10 glasses of water daily",
            "Get adequate sleep (7-9 hours per night)",
            "Regular health check-ups",
        ]
    } else if bmi < 30.0 {
        vec![
            "Create a moderate caloric deficit (500 cal/day)",
            "Increase physical activity to 200-300 min/week",
            "Focus on whole foods, reduce processed foods",
            "Practice portion control",
            "Track food intake and exercise",
            "Consider consulting a dietitian",
        ]
    } else {
        vec![
            "Consult healthcare provider for comprehensive weight management plan",
            "Consider medically supervised weight loss program",
            "Start with low-impact exercises (walking, swimming)",
            "Focus on sustainable lifestyle changes",
            "Address emotional eating patterns",
            "Regular monitoring of blood pressure, blood sugar",
            "Consider support groups or counseling",
        ]
    };

    match age {
        Some(a) if a > 65.0 => recs.push("Focus on maintaining muscle mass and bone density"),
        Some(a) if a < 20.0 => recs.push("Consult pediatrician for age-appropriate guidance"),
        _ => {}
    }
    recs
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    fn request(height: f64, weight: f64) -> BmiRequest {
        BmiRequest {
            height,
            weight,
            age: None,
            gender: None,
            unit_system: UnitSystem::Metric,
            waist_circumference: None,
            hip_circumference: None,
        }
    }

    #[test]
    fn test_reference_bmi() {
        let result = BmiCalculator::simple(&request(170.0, 70.0)).unwrap();
        assert_eq!(result.bmi, 24.22);
        assert_eq!(result.category, "Normal Weight");
        assert_eq!(result.color, "#2ecc71");
        println!("✅ BMI reference test PASSED");
    }

    #[test]
    fn test_lower_boundary_is_normal() {
        // 74 / 2.0² = 18.5 exactly
        let result = BmiCalculator::simple(&request(200.0, 74.0)).unwrap();
        assert_eq!(result.bmi, 18.5);
        assert_eq!(result.category, "Normal Weight", "18.5 is lower-inclusive");
        assert_eq!(BmiCategory::classify(18.49, None), BmiCategory::MildUnderweight);
        assert_eq!(BmiCategory::classify(40.0, None), BmiCategory::ObeseIII);
    }

    #[test]
    fn test_imperial_inputs_convert() {
        let mut req = request(67.0, 154.0);
        req.unit_system = UnitSystem::Imperial;
        let result = BmiCalculator::simple(&req).unwrap();
        // 170.18 cm, 69.85 kg
        assert!((result.bmi - 24.12).abs() < 0.01, "got {}", result.bmi);
    }

    #[test]
    fn test_under_twenty_uses_pediatric_label() {
        let mut req = request(170.0, 70.0);
        req.age = Some(15.0);
        let result = BmiCalculator::simple(&req).unwrap();
        assert_eq!(result.category, "See pediatric BMI chart");
        assert_eq!(result.color, "#95a5a6");
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            BmiCalculator::simple(&request(0.0, 70.0)),
            Err(CalcError::Validation(_))
        ));
        assert!(matches!(
            BmiCalculator::simple(&request(170.0, 600.0)),
            Err(CalcError::Validation(_))
        ));
        let mut req = request(170.0, 70.0);
        req.gender = Some("other".to_string());
        assert!(matches!(
            BmiCalculator::simple(&req),
            Err(CalcError::UnsupportedOption { .. })
        ));
    }

    #[test]
    fn test_detailed_extends_simple() {
        let mut req = request(170.0, 70.0);
        req.age = Some(30.0);
        req.gender = Some("male".to_string());
        req.waist_circumference = Some(85.0);
        req.hip_circumference = Some(95.0);
        let detailed = BmiCalculator::detailed(&req).unwrap();

        assert_eq!(detailed.simple, BmiCalculator::simple(&req).unwrap());
        assert_eq!(detailed.bmi_prime, 0.97);
        assert_eq!(detailed.ideal_weight_range.healthy_bmi_range.min_kg, 53.5);
        assert!(detailed.ideal_weight_range.devine_formula_kg.is_some());
        assert_eq!(detailed.body_metrics.body_surface_area_m2, 1.82);
        let composition = detailed.body_composition.unwrap();
        assert_eq!(composition.waist_to_hip_ratio, 0.89);
        assert_eq!(composition.health_risk, "Low risk");
        // Mifflin 1617.5 × 1.55
        assert_eq!(detailed.caloric_recommendations.maintenance_calories, Some(2507.0));
        assert_eq!(detailed.notes.len(), 4);
    }

    #[test]
    fn test_idempotent() {
        let req = request(182.0, 91.0);
        let a = serde_json::to_value(BmiCalculator::detailed(&req).unwrap()).unwrap();
        let b = serde_json::to_value(BmiCalculator::detailed(&req).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
