// 💡 Advisor - canned recommendations, explanations and keyword chat
// Deterministic text keyed off calculator results; no external service

use crate::amortization::level_payment;
use crate::calculators::bmi::BmiCategory;
use crate::calculators::gpa::{Course, GpaScale};
use crate::errors::CalcResult;
use crate::rounding::{round_dp, round_money};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// BMI
// ============================================================================

/// Coarse BMI band used for advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiBand {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiBand {
    pub fn from_bmi(bmi: f64) -> Self {
        match BmiCategory::classify(bmi, None) {
            BmiCategory::SevereUnderweight
            | BmiCategory::ModerateUnderweight
            | BmiCategory::MildUnderweight => BmiBand::Underweight,
            BmiCategory::Normal | BmiCategory::Pediatric => BmiBand::Normal,
            BmiCategory::Overweight => BmiBand::Overweight,
            BmiCategory::ObeseI | BmiCategory::ObeseII | BmiCategory::ObeseIII => BmiBand::Obese,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "Underweight",
            BmiBand::Normal => "Normal",
            BmiBand::Overweight => "Overweight",
            BmiBand::Obese => "Obese",
        }
    }

    fn meaning(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "Your body weight is below the healthy range. This may indicate insufficient nutrition or underlying health issues.",
            BmiBand::Normal => "Your body weight is within the healthy range. This is associated with lower risk of weight-related health problems.",
            BmiBand::Overweight => "Your body weight is above the healthy range. This increases risk of certain health conditions.",
            BmiBand::Obese => "Your body weight is significantly above the healthy range. This substantially increases health risks.",
        }
    }

    fn implications(&self) -> Vec<&'static str> {
        match self {
            BmiBand::Underweight => vec![
                "Weakened immune system",
                "Nutritional deficiencies",
                "Decreased bone density",
                "Fertility issues",
                "Slower wound healing",
            ],
            BmiBand::Normal => vec![
                "Lower risk of chronic diseases",
                "Better cardiovascular health",
                "Improved energy levels",
                "Optimal metabolic function",
            ],
            BmiBand::Overweight => vec![
                "Increased risk of type 2 diabetes",
                "Higher blood pressure",
                "Elevated cholesterol",
                "Joint stress and pain",
                "Sleep apnea risk",
            ],
            BmiBand::Obese => vec![
                "High risk of heart disease",
                "Type 2 diabetes",
                "Certain cancers",
                "Stroke risk",
                "Severe joint problems",
                "Respiratory issues",
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BmiAdviceRequest {
    pub bmi: f64,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaloriePlan {
    pub goal: &'static str,
    pub weekly_target: &'static str,
    pub daily_adjustment: &'static str,
    pub timeline: &'static str,
    pub tips: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Explanation {
    pub formula: &'static str,
    pub your_calculation: String,
    pub what_it_means: String,
    pub why_this_value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub health_implications: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiAdvice {
    pub band: &'static str,
    pub calorie_plan: CaloriePlan,
    pub explanation: Explanation,
    pub visual_insight: Value,
}

pub fn calorie_plan(band: BmiBand) -> CaloriePlan {
    match band {
        BmiBand::Underweight => CaloriePlan {
            goal: "Gain weight healthily",
            weekly_target: "+0.5 kg per week",
            daily_adjustment: "+500 calories",
            timeline: "12-16 weeks to reach healthy weight",
            tips: vec![
                "Eat 5-6 meals per day",
                "Include protein in every meal",
                "Add healthy fats (nuts, avocado, olive oil)",
                "Strength training to build muscle",
            ],
        },
        BmiBand::Normal => CaloriePlan {
            goal: "Maintain healthy weight",
            weekly_target: "Maintain current weight",
            daily_adjustment: "0 calories (maintenance)",
            timeline: "Ongoing",
            tips: vec![
                "Continue balanced eating",
                "Stay active regularly",
                "Monitor weight monthly",
                "Adjust calories if needed",
            ],
        },
        BmiBand::Overweight => CaloriePlan {
            goal: "Lose weight gradually",
            weekly_target: "-0.5 kg per week",
            daily_adjustment: "-500 calories",
            timeline: "12-20 weeks to reach healthy weight",
            tips: vec![
                "Reduce portion sizes by 20%",
                "Cut out sugary drinks",
                "Increase vegetable intake",
                "Eat protein with each meal",
                "Track your food intake",
            ],
        },
        BmiBand::Obese => CaloriePlan {
            goal: "Significant weight loss",
            weekly_target: "-0.5 to -1 kg per week",
            daily_adjustment: "-500 to -750 calories",
            timeline: "24-52 weeks for substantial improvement",
            tips: vec![
                "Consult with a healthcare provider",
                "Start with small, sustainable changes",
                "Focus on whole foods",
                "Consider working with a nutritionist",
            ],
        },
    }
}

pub fn explain_bmi(bmi: f64) -> Explanation {
    let band = BmiBand::from_bmi(bmi);
    let why = match band {
        BmiBand::Underweight => format!(
            "Your BMI of {} is below 18.5, suggesting your body weight is low relative to your height.",
            bmi
        ),
        BmiBand::Normal => format!(
            "Your BMI of {} falls between 18.5-24.9, indicating a healthy balance between your height and weight.",
            bmi
        ),
        BmiBand::Overweight => format!(
            "Your BMI of {} is between 25-29.9, indicating excess body weight.",
            bmi
        ),
        BmiBand::Obese => format!(
            "Your BMI of {} is 30 or above, indicating significant excess body weight.",
            bmi
        ),
    };
    Explanation {
        formula: "BMI = weight (kg) / (height (m))²",
        your_calculation: format!(
            "Your BMI of {} indicates you are in the {} category",
            bmi,
            band.name()
        ),
        what_it_means: band.meaning().to_string(),
        why_this_value: why,
        health_implications: band.implications(),
        components: None,
    }
}

fn bmi_gauge(bmi: f64) -> Value {
    json!({
        "chart_type": "gauge",
        "ranges": [
            {"min": 0, "max": 18.5, "label": "Underweight", "color": "#3498db"},
            {"min": 18.5, "max": 25, "label": "Normal", "color": "#2ecc71"},
            {"min": 25, "max": 30, "label": "Overweight", "color": "#f39c12"},
            {"min": 30, "max": 50, "label": "Obese", "color": "#e74c3c"}
        ],
        "your_position": bmi,
        "interpretation": format!("Your BMI of {} places you in the {} range", bmi, BmiBand::from_bmi(bmi).name()),
    })
}

pub fn bmi_recommendations(request: &BmiAdviceRequest) -> CalcResult<BmiAdvice> {
    Validator::new("bmi_recommendations")
        .positive("bmi", request.bmi)
        .at_most("bmi", request.bmi, 200.0)
        .finish()?;
    let band = BmiBand::from_bmi(request.bmi);
    Ok(BmiAdvice {
        band: band.name(),
        calorie_plan: calorie_plan(band),
        explanation: explain_bmi(request.bmi),
        visual_insight: bmi_gauge(request.bmi),
    })
}

// ============================================================================
// LOAN
// ============================================================================

const TENURE_YEARS: [u32; 6] = [5, 10, 15, 20, 25, 30];

#[derive(Debug, Clone, Deserialize)]
pub struct LoanAdviceRequest {
    pub amount: f64,
    pub rate: f64,
    pub duration: f64,
    pub emi: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TenureOption {
    pub years: u32,
    pub monthly_emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub affordability: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenureAdvice {
    pub options: Vec<TenureOption>,
    pub recommendation: &'static str,
    pub best_option: Option<TenureOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateOutlook {
    pub current_rate: f64,
    pub trend: &'static str,
    pub predictions: Value,
    pub advice: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepaymentStrategy {
    pub strategy: &'static str,
    pub recommendations: Vec<String>,
    pub savings_potential: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanAdvice {
    pub best_tenure: TenureAdvice,
    pub future_rates: RateOutlook,
    pub prepayment_strategy: PrepaymentStrategy,
    pub explanation: Explanation,
    pub visual_insight: Value,
}

/// EMI at each standard tenure; affordability is relative to the current EMI
pub fn tenure_options(amount: f64, rate: f64, current_emi: f64) -> CalcResult<TenureAdvice> {
    let mut options = Vec::with_capacity(TENURE_YEARS.len());
    for years in TENURE_YEARS {
        let months = years * 12;
        let emi = level_payment(amount, rate / 1200.0, months)?;
        let total_payment = emi * months as f64;
        let affordability = if emi < current_emi * 0.8 {
            "High"
        } else if emi < current_emi * 1.2 {
            "Medium"
        } else {
            "Low"
        };
        options.push(TenureOption {
            years,
            monthly_emi: round_money(emi),
            total_interest: round_money(total_payment - amount),
            total_payment: round_money(total_payment),
            affordability,
        });
    }

    // first minimum wins on ties
    let best_option = options
        .iter()
        .fold(None::<&TenureOption>, |best, o| match best {
            Some(b) if b.total_interest <= o.total_interest => Some(b),
            _ => Some(o),
        })
        .cloned();

    Ok(TenureAdvice {
        options,
        recommendation: "Choose shorter tenure if you can afford higher EMI to save on interest",
        best_option,
    })
}

pub fn rate_outlook(rate: f64) -> RateOutlook {
    let trend = if (5.0..=8.0).contains(&rate) {
        "stable"
    } else if rate > 8.0 {
        "high"
    } else {
        "low"
    };
    RateOutlook {
        current_rate: rate,
        trend,
        predictions: json!({
            "6_months": round_money(rate + 0.25),
            "1_year": round_money(rate + 0.5),
            "2_years": round_money(rate + 0.75),
        }),
        advice: if rate < 7.0 {
            "Consider fixed rate if rates are expected to rise"
        } else {
            "Current rates are moderate, good time to lock in"
        },
    }
}

pub fn prepayment_strategy(amount: f64, rate: f64, duration: f64, emi: f64) -> PrepaymentStrategy {
    PrepaymentStrategy {
        strategy: "Aggressive Prepayment",
        recommendations: vec![
            format!(
                "Pay extra ${:.2} per month to save significantly on interest",
                round_money(emi * 0.1)
            ),
            "Make lump sum payments from bonuses or tax refunds".to_string(),
            "Prepay during initial years for maximum impact".to_string(),
            format!(
                "Could reduce loan tenure by {} years with 10% extra payment",
                (duration * 0.2).round()
            ),
        ],
        savings_potential: json!({
            "10_percent_extra": format!("Save approximately ${:.2} in interest", amount * rate * 0.15 / 100.0),
            "20_percent_extra": format!("Save approximately ${:.2} in interest", amount * rate * 0.25 / 100.0),
        }),
    }
}

pub fn explain_loan(amount: f64, rate: f64, duration: f64, emi: f64) -> Explanation {
    Explanation {
        formula: "EMI = [P × R × (1+R)^N] / [(1+R)^N-1]",
        your_calculation: format!("Your EMI of ${} on a principal of ${}", emi, amount),
        what_it_means: format!(
            "Your EMI of ${} includes both principal and interest. Initially, more goes to interest, but over time, more goes to principal.",
            emi
        ),
        why_this_value: format!(
            "The EMI is calculated to ensure the loan is fully repaid in {} years with equal monthly payments.",
            duration
        ),
        health_implications: Vec::new(),
        components: Some(json!({
            "P": format!("Principal Amount = ${}", amount),
            "R": format!("Monthly Interest Rate = {}% / 12 = {}%", rate, round_dp(rate / 12.0, 4)),
            "N": format!("Number of Months = {} years × 12 = {} months", duration, (duration * 12.0).floor()),
        })),
    }
}

pub fn loan_recommendations(request: &LoanAdviceRequest) -> CalcResult<LoanAdvice> {
    Validator::new("loan_recommendations")
        .positive("amount", request.amount)
        .non_negative("rate", request.rate)
        .at_most("rate", request.rate, 50.0)
        .positive("duration", request.duration)
        .positive("emi", request.emi)
        .finish()?;

    Ok(LoanAdvice {
        best_tenure: tenure_options(request.amount, request.rate, request.emi)?,
        future_rates: rate_outlook(request.rate),
        prepayment_strategy: prepayment_strategy(
            request.amount,
            request.rate,
            request.duration,
            request.emi,
        ),
        explanation: explain_loan(request.amount, request.rate, request.duration, request.emi),
        visual_insight: json!({
            "chart_type": "breakdown",
            "message": format!("Your EMI of ${} will be split between principal and interest over time", request.emi),
            "tip": "Early payments go mostly to interest, later payments to principal",
        }),
    })
}

// ============================================================================
// GPA
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GpaAdviceRequest {
    pub gpa: f64,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FocusSubject {
    pub course: String,
    pub current_grade: String,
    pub credits: f64,
    pub priority: &'static str,
    pub potential_impact: f64,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GpaPrediction {
    pub current_gpa: f64,
    pub if_maintain: f64,
    pub if_improve_10_percent: f64,
    pub if_improve_20_percent: f64,
    pub realistic_target: f64,
    pub timeline: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovementPlan {
    pub status: &'static str,
    pub goal: &'static str,
    pub strategies: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GpaAdvice {
    pub focus_subjects: Vec<FocusSubject>,
    pub predicted_gpa: GpaPrediction,
    pub improvement_plan: ImprovementPlan,
    pub explanation: Explanation,
    pub visual_insight: Value,
}

/// Courses below a B, largest credit-weighted gap first
pub fn focus_subjects(courses: &[Course]) -> CalcResult<Vec<FocusSubject>> {
    let mut focus = Vec::new();
    for course in courses {
        let points = GpaScale::Four.points(&course.grade)?;
        if points >= 3.0 {
            continue;
        }
        focus.push(FocusSubject {
            course: course.name.clone().unwrap_or_else(|| "Course".to_string()),
            current_grade: course.grade.trim().to_uppercase(),
            credits: course.credits,
            priority: if points < 2.0 { "High" } else { "Medium" },
            potential_impact: round_money(course.credits * (3.0 - points)),
            recommendation: if points < 2.0 {
                "Needs immediate attention"
            } else {
                "Room for improvement"
            },
        });
    }
    focus.sort_by(|a, b| b.potential_impact.total_cmp(&a.potential_impact));
    Ok(focus)
}

pub fn predict_gpa(gpa: f64) -> GpaPrediction {
    GpaPrediction {
        current_gpa: gpa,
        if_maintain: round_money(gpa),
        if_improve_10_percent: round_money((gpa * 1.1).min(4.0)),
        if_improve_20_percent: round_money((gpa * 1.2).min(4.0)),
        realistic_target: round_money((gpa + 0.3).min(4.0)),
        timeline: "Next 2 semesters with focused effort",
    }
}

pub fn improvement_plan(gpa: f64) -> ImprovementPlan {
    if gpa >= 3.5 {
        ImprovementPlan {
            status: "Excellent",
            goal: "Maintain and excel",
            strategies: vec![
                "Continue current study habits",
                "Consider advanced courses",
                "Mentor other students",
                "Focus on research opportunities",
            ],
        }
    } else if gpa >= 3.0 {
        ImprovementPlan {
            status: "Good",
            goal: "Push towards excellence",
            strategies: vec![
                "Identify and strengthen weak subjects",
                "Form study groups",
                "Attend office hours regularly",
                "Set specific grade goals per course",
            ],
        }
    } else if gpa >= 2.5 {
        ImprovementPlan {
            status: "Average",
            goal: "Significant improvement needed",
            strategies: vec![
                "Meet with academic advisor",
                "Create structured study schedule",
                "Use tutoring services",
                "Start assignments early",
            ],
        }
    } else {
        ImprovementPlan {
            status: "Needs Attention",
            goal: "Immediate intervention required",
            strategies: vec![
                "Seek academic counseling immediately",
                "Consider reducing course load",
                "Get professional tutoring",
                "Meet with professors for extra help",
            ],
        }
    }
}

fn gpa_meaning(gpa: f64) -> &'static str {
    if gpa >= 3.7 {
        "Outstanding academic performance. You are in the top tier of students."
    } else if gpa >= 3.3 {
        "Excellent performance. You are well above average."
    } else if gpa >= 3.0 {
        "Good performance. You are meeting academic standards well."
    } else if gpa >= 2.5 {
        "Satisfactory performance. There is room for improvement."
    } else if gpa >= 2.0 {
        "Below average performance. Significant improvement needed."
    } else {
        "Poor performance. Immediate action required to improve."
    }
}

pub fn explain_gpa(gpa: f64) -> Explanation {
    Explanation {
        formula: "GPA = (Sum of Grade Points × Credits) / Total Credits",
        your_calculation: format!(
            "Your GPA of {} is calculated by averaging all course grades weighted by credits",
            gpa
        ),
        what_it_means: gpa_meaning(gpa).to_string(),
        why_this_value: "Your GPA reflects your overall academic performance across all courses".to_string(),
        health_implications: Vec::new(),
        components: Some(json!({
            "scale": "GPA is on a 4.0 scale where A=4.0, B=3.0, C=2.0, D=1.0, F=0.0"
        })),
    }
}

pub fn gpa_recommendations(request: &GpaAdviceRequest) -> CalcResult<GpaAdvice> {
    Validator::new("gpa_recommendations")
        .range("gpa", request.gpa, 0.0, 4.0)
        .finish()?;
    let percentage = round_dp(request.gpa / 4.0 * 100.0, 1);
    Ok(GpaAdvice {
        focus_subjects: focus_subjects(&request.courses)?,
        predicted_gpa: predict_gpa(request.gpa),
        improvement_plan: improvement_plan(request.gpa),
        explanation: explain_gpa(request.gpa),
        visual_insight: json!({
            "chart_type": "progress",
            "scale": 4.0,
            "your_score": request.gpa,
            "percentage": percentage,
            "message": format!("You are at {}% of the maximum GPA", percentage),
        }),
    })
}

// ============================================================================
// CHAT & EXPLANATIONS
// ============================================================================

/// (keyword, answer) pairs checked in order
fn chat_answers(calculator_type: &str) -> &'static [(&'static str, &'static str)] {
    match calculator_type {
        "bmi" => &[
            ("how to calculate", "BMI is calculated by dividing your weight in kilograms by the square of your height in meters: BMI = weight(kg) / height(m)²"),
            ("what is bmi", "BMI (Body Mass Index) is a measure of body fat based on height and weight that applies to adult men and women."),
            ("is bmi accurate", "BMI is a useful screening tool but has limitations. It doesn't account for muscle mass, bone density, or fat distribution."),
            ("how to improve", "To improve your BMI, focus on balanced nutrition, regular exercise, adequate sleep, and stress management."),
        ],
        "loan" => &[
            ("what is emi", "EMI (Equated Monthly Installment) is the fixed amount you pay every month to repay your loan, including both principal and interest."),
            ("how to reduce emi", "You can reduce EMI by increasing the loan tenure, making a larger down payment, negotiating a lower interest rate, or making prepayments."),
            ("prepayment", "Prepayment means paying extra towards your loan principal. This reduces total interest and can shorten loan duration."),
            ("interest rate", "Interest rate is the cost of borrowing money, expressed as a percentage of the loan amount per year."),
        ],
        "gpa" => &[
            ("how to calculate", "GPA is calculated by multiplying each grade's point value by credits, summing these, and dividing by total credits."),
            ("what is good gpa", "Generally, 3.5+ is excellent, 3.0-3.5 is good, 2.5-3.0 is average, and below 2.5 needs improvement."),
            ("how to improve", "Improve GPA by attending all classes, studying regularly, seeking help when needed, and staying organized."),
            ("grade scale", "Typically: A=4.0, A-=3.7, B+=3.3, B=3.0, B-=2.7, C+=2.3, C=2.0, C-=1.7, D=1.0, F=0.0"),
        ],
        _ => &[],
    }
}

fn chat_default(calculator_type: &str) -> &'static str {
    match calculator_type {
        "bmi" => "I can help you understand BMI calculations, health implications, and improvement strategies. What would you like to know?",
        "loan" => "I can explain EMI calculations, interest rates, prepayment strategies, and loan optimization. How can I assist you?",
        "gpa" => "I can help with GPA calculations, grade improvements, and academic planning. What's your question?",
        "calorie" => "I can explain calorie needs, weight management, and nutrition planning. What would you like to know?",
        _ => "I'm here to help! Please ask me about calculations, formulas, or recommendations.",
    }
}

/// Case-insensitive keyword match against the calculator's answer table
pub fn chat(message: &str, calculator_type: &str) -> &'static str {
    let lowered = message.to_lowercase();
    chat_answers(calculator_type)
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, answer)| *answer)
        .unwrap_or_else(|| chat_default(calculator_type))
}

fn num(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Explanation for a stored or fresh result; generic text for other calculators
pub fn smart_explanation(calculator_type: &str, result: &Value, inputs: &Value) -> Explanation {
    match calculator_type {
        "bmi" => explain_bmi(num(result, "bmi")),
        "loan" => explain_loan(
            num(inputs, "amount"),
            num(inputs, "rate"),
            num(inputs, "duration"),
            num(result, "emi"),
        ),
        "gpa" => explain_gpa(num(result, "gpa")),
        _ => Explanation {
            formula: "Calculation formula",
            your_calculation: "Detailed explanation of your results".to_string(),
            what_it_means: "What your results mean".to_string(),
            why_this_value: "Values follow directly from the inputs you entered".to_string(),
            health_implications: Vec::new(),
            components: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_band_boundaries() {
        assert_eq!(BmiBand::from_bmi(18.49), BmiBand::Underweight);
        assert_eq!(BmiBand::from_bmi(18.5), BmiBand::Normal);
        assert_eq!(BmiBand::from_bmi(29.99), BmiBand::Overweight);
        assert_eq!(BmiBand::from_bmi(42.0), BmiBand::Obese);
    }

    #[test]
    fn test_bmi_recommendations() {
        let advice = bmi_recommendations(&BmiAdviceRequest { bmi: 27.3, weight: Some(80.0) }).unwrap();
        assert_eq!(advice.band, "Overweight");
        assert_eq!(advice.calorie_plan.daily_adjustment, "-500 calories");
        assert!(advice.explanation.why_this_value.contains("25-29.9"));
        assert_eq!(advice.visual_insight["your_position"], json!(27.3));

        assert!(bmi_recommendations(&BmiAdviceRequest { bmi: -1.0, weight: None }).is_err());
    }

    #[test]
    fn test_tenure_options() {
        let advice = tenure_options(100_000.0, 12.0, 2000.0).unwrap();
        assert_eq!(advice.options.len(), 6);
        // 5 years at 12%: 2224.44
        assert_eq!(advice.options[0].monthly_emi, 2224.44);
        // 2224.44 is within 20% of 2000
        assert_eq!(advice.options[0].affordability, "Medium");
        let tight = tenure_options(100_000.0, 12.0, 1800.0).unwrap();
        assert_eq!(tight.options[0].affordability, "Low");
        assert_eq!(advice.best_option.unwrap().years, 5);

        // zero rate: every tenure costs nothing extra, first one wins
        let flat = tenure_options(60_000.0, 0.0, 1000.0).unwrap();
        assert_eq!(flat.options[0].monthly_emi, 1000.0);
        assert_eq!(flat.best_option.unwrap().years, 5);
        println!("✅ Tenure options test PASSED");
    }

    #[test]
    fn test_rate_outlook() {
        assert_eq!(rate_outlook(6.0).trend, "stable");
        assert_eq!(rate_outlook(9.5).trend, "high");
        assert_eq!(rate_outlook(3.0).trend, "low");
        assert_eq!(rate_outlook(6.0).predictions["1_year"], json!(6.5));
    }

    #[test]
    fn test_focus_subjects_sorted_by_impact() {
        let courses = vec![
            Course { name: Some("Art".into()), grade: "b-".into(), credits: 2.0 },
            Course { name: Some("Math".into()), grade: "D".into(), credits: 4.0 },
            Course { name: Some("History".into()), grade: "A".into(), credits: 3.0 },
        ];
        let focus = focus_subjects(&courses).unwrap();
        assert_eq!(focus.len(), 2);
        assert_eq!(focus[0].course, "Math");
        assert_eq!(focus[0].priority, "High");
        assert_eq!(focus[0].potential_impact, 8.0);
        assert_eq!(focus[1].current_grade, "B-");
        assert_eq!(focus[1].potential_impact, 0.6);

        let bad = vec![Course { name: None, grade: "Z".into(), credits: 3.0 }];
        assert!(focus_subjects(&bad).is_err());
    }

    #[test]
    fn test_gpa_recommendations() {
        let advice = gpa_recommendations(&GpaAdviceRequest { gpa: 3.8, courses: vec![] }).unwrap();
        assert_eq!(advice.improvement_plan.status, "Excellent");
        assert_eq!(advice.predicted_gpa.if_improve_10_percent, 4.0);
        assert_eq!(advice.visual_insight["percentage"], json!(95.0));
    }

    #[test]
    fn test_chat_keywords() {
        assert!(chat("What is EMI exactly?", "loan").starts_with("EMI (Equated"));
        assert!(chat("tell me a joke", "gpa").starts_with("I can help with GPA"));
        assert!(chat("anything", "sleep").starts_with("I'm here to help"));
    }

    #[test]
    fn test_smart_explanation() {
        let e = smart_explanation(
            "loan",
            &json!({"emi": 2224.44}),
            &json!({"amount": 100000, "rate": 12, "duration": 5}),
        );
        assert!(e.components.unwrap()["N"].as_str().unwrap().contains("60 months"));
        assert_eq!(smart_explanation("age", &json!({}), &json!({})).formula, "Calculation formula");
    }
}
