// 🔗 Sharing - share text, social links and share-card data for results

use crate::analytics::format_currency;
use serde::Serialize;
use serde_json::Value;

const HASHTAGS: &str = "Calculator,Health,Fitness,Education";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareLinks {
    pub whatsapp: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub telegram: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShareCard {
    pub title: String,
    pub main_value: String,
    pub subtitle: String,
    pub details: Vec<String>,
    pub color_scheme: &'static str,
    pub icon: &'static str,
}

/// Builds share links against a public base URL
#[derive(Debug, Clone)]
pub struct Sharer {
    base_url: String,
}

fn num(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text<'a>(value: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(fallback)
}

/// Raw JSON scalar as shown to people: strings unquoted, missing as 0
fn plain(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "0".to_string(),
        Some(other) => other.to_string(),
    }
}

fn count(value: &Value, key: &str) -> usize {
    value.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn bmi_color(category: &str) -> &'static str {
    if category.contains("Underweight") {
        "#3498db"
    } else if category.starts_with("Normal") {
        "#2ecc71"
    } else if category.starts_with("Overweight") {
        "#f39c12"
    } else if category.starts_with("Obese") {
        "#e74c3c"
    } else {
        "#95a5a6"
    }
}

fn gpa_label(gpa: f64) -> &'static str {
    if gpa >= 3.7 {
        "Outstanding"
    } else if gpa >= 3.3 {
        "Excellent"
    } else if gpa >= 3.0 {
        "Good"
    } else if gpa >= 2.5 {
        "Satisfactory"
    } else {
        "Needs Improvement"
    }
}

impl Sharer {
    pub fn new(base_url: &str) -> Self {
        Sharer {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public page for a calculator, e.g. `<base>/compound-interest`
    pub fn page_url(&self, calculator_type: &str) -> String {
        format!("{}/{}", self.base_url, calculator_type.replace('_', "-"))
    }

    pub fn share_text(&self, calculator_type: &str, result: &Value, inputs: &Value) -> String {
        match calculator_type {
            "bmi" => format!(
                "My BMI is {} ({}). Calculate yours!",
                plain(result, "bmi"),
                text(result, "category", "Unknown")
            ),
            "gpa" => format!("My GPA is {:.2}! Track your academic progress too!", num(result, "gpa")),
            "loan" => format!(
                "Calculated my loan EMI: {}/month. Plan your finances!",
                format_currency(num(result, "emi"))
            ),
            "calorie" => format!(
                "My daily calorie needs: {} calories. Find yours!",
                plain(result, "maintain")
            ),
            "attendance" => format!("My attendance: {:.1}%. Track yours!", num(result, "percentage")),
            "age" => format!(
                "I'm {} years, {} months old!",
                plain(result, "years"),
                plain(result, "months")
            ),
            "percentage" => format!(
                "Scored {:.1}%! Calculate your percentage!",
                num(result, "percentage")
            ),
            "grade" => format!(
                "Got {} grade with {:.1}%!",
                text(result, "grade", "N/A"),
                num(result, "percentage")
            ),
            "compound_interest" => format!(
                "Investment projection: {}! Plan your future!",
                format_currency(num(result, "total_amount"))
            ),
            "bmr" => format!("My BMR is {} calories/day. Calculate yours!", plain(result, "bmr")),
            "pregnancy" => format!(
                "Due date: {}. Track your pregnancy journey!",
                text(result, "due_date", "N/A")
            ),
            "math" => format!(
                "Calculated: {} = {}",
                text(inputs, "expression", ""),
                result.get("result").map_or("N/A".to_string(), |v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            ),
            _ => "Check out this calculator!".to_string(),
        }
    }

    pub fn links(&self, calculator_type: &str, result: &Value, inputs: &Value) -> ShareLinks {
        let share = self.share_text(calculator_type, result, inputs);
        let page = self.page_url(calculator_type);
        let encoded_page = urlencoding::encode(&page);

        let whatsapp_text = format!("{}\n\n🔗 Try it: {}", share, page);
        let subject = format!("Check out my {} results!", title_case(calculator_type));
        let body = format!("{}\n\nCalculate yours at: {}", share, page);

        ShareLinks {
            whatsapp: format!("https://wa.me/?text={}", urlencoding::encode(&whatsapp_text)),
            twitter: format!(
                "https://twitter.com/intent/tweet?text={}&hashtags={}",
                urlencoding::encode(&share),
                HASHTAGS
            ),
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={}", encoded_page),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={}", encoded_page),
            telegram: format!(
                "https://t.me/share/url?url={}&text={}",
                encoded_page,
                urlencoding::encode(&share)
            ),
            email: format!(
                "mailto:?subject={}&body={}",
                urlencoding::encode(&subject),
                urlencoding::encode(&body)
            ),
        }
    }

    pub fn card(&self, calculator_type: &str, result: &Value, inputs: &Value) -> ShareCard {
        let card = |title: &str, main: String, subtitle: &str, details: Vec<String>, color, icon| ShareCard {
            title: title.to_string(),
            main_value: main,
            subtitle: subtitle.to_string(),
            details,
            color_scheme: color,
            icon,
        };

        match calculator_type {
            "bmi" => {
                let category = text(result, "category", "Unknown");
                card(
                    "My BMI Result",
                    plain(result, "bmi"),
                    category,
                    vec![
                        format!("Height: {} cm", plain(inputs, "height")),
                        format!("Weight: {} kg", plain(inputs, "weight")),
                    ],
                    bmi_color(category),
                    "⚖️",
                )
            }
            "gpa" => card(
                "My GPA",
                format!("{:.2}", num(result, "gpa")),
                "Academic Performance",
                vec![
                    format!("Courses: {}", count(inputs, "courses")),
                    format!("Performance: {}", gpa_label(num(result, "gpa"))),
                ],
                "#9b59b6",
                "🎓",
            ),
            "loan" => card(
                "Loan EMI Calculation",
                format_currency(num(result, "emi")),
                "Monthly Payment",
                vec![
                    format!("Principal: {}", format_currency(num(inputs, "amount"))),
                    format!("Duration: {} years", plain(inputs, "duration")),
                    format!("Rate: {}%", plain(inputs, "rate")),
                ],
                "#3498db",
                "💰",
            ),
            "calorie" => card(
                "Daily Calorie Needs",
                plain(result, "maintain"),
                "Maintenance Calories",
                vec![
                    format!("BMR: {} cal", plain(result, "bmr")),
                    format!("Activity: {}", title_case(text(inputs, "activity", "moderate"))),
                ],
                "#2ecc71",
                "🔥",
            ),
            "attendance" => card(
                "My Attendance",
                format!("{:.1}%", num(result, "percentage")),
                "Current Status",
                vec![
                    format!("Attended: {}", plain(inputs, "attended")),
                    format!("Total: {}", plain(inputs, "total")),
                    format!("Status: {}", text(result, "status", "N/A")),
                ],
                "#e74c3c",
                "📊",
            ),
            "percentage" => card(
                "My Score",
                format!("{:.1}%", num(result, "percentage")),
                "Academic Performance",
                vec![
                    format!("Subjects: {}", count(inputs, "marks")),
                    format!("Grade: {}", text(result, "grade", "N/A")),
                ],
                "#f39c12",
                "📝",
            ),
            "compound_interest" => card(
                "Investment Growth",
                format_currency(num(result, "total_amount")),
                "Future Value",
                vec![
                    format!("Principal: {}", format_currency(num(inputs, "principal"))),
                    format!("Interest: {}", format_currency(num(result, "compound_interest"))),
                    format!("Duration: {} years", plain(inputs, "time")),
                ],
                "#1abc9c",
                "📈",
            ),
            _ => card(
                &title_case(calculator_type),
                "Result".to_string(),
                "Calculator Result",
                Vec::new(),
                "#34495e",
                "🧮",
            ),
        }
    }

    /// Clipboard text: share line, page link and hashtags
    pub fn copy_text(&self, calculator_type: &str, result: &Value, inputs: &Value) -> String {
        format!(
            "{}\n\n📱 Calculate yours at: {}\n\n#Calculator #Health #Fitness #Education",
            self.share_text(calculator_type, result, inputs),
            self.page_url(calculator_type)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sharer() -> Sharer {
        Sharer::new("https://calc.example.org/")
    }

    #[test]
    fn test_share_text() {
        let s = sharer();
        assert_eq!(
            s.share_text("bmi", &json!({"bmi": 22.86, "category": "Normal Weight"}), &json!({})),
            "My BMI is 22.86 (Normal Weight). Calculate yours!"
        );
        assert_eq!(
            s.share_text("loan", &json!({"emi": 2224.44}), &json!({})),
            "Calculated my loan EMI: $2,224.44/month. Plan your finances!"
        );
        assert_eq!(
            s.share_text("math", &json!({"result": 14}), &json!({"expression": "2(3+4)"})),
            "Calculated: 2(3+4) = 14"
        );
        assert_eq!(s.share_text("sleep", &json!({}), &json!({})), "Check out this calculator!");
    }

    #[test]
    fn test_links_are_encoded() {
        let links = sharer().links("compound_interest", &json!({"total_amount": 1500.0}), &json!({}));
        assert!(links.facebook.ends_with("https%3A%2F%2Fcalc.example.org%2Fcompound-interest"));
        assert!(links.twitter.contains("Investment%20projection%3A%20%241%2C500.00"));
        assert!(links.email.starts_with("mailto:?subject=Check%20out%20my%20Compound%20Interest%20results%21"));
        assert!(!links.whatsapp.contains(' '));
        println!("✅ Share links test PASSED");
    }

    #[test]
    fn test_cards() {
        let s = sharer();
        let card = s.card("bmi", &json!({"bmi": 31.2, "category": "Obese Class I"}), &json!({"height": 170, "weight": 90}));
        assert_eq!(card.color_scheme, "#e74c3c");
        assert_eq!(card.details[0], "Height: 170 cm");

        let gpa = s.card("gpa", &json!({"gpa": 3.456}), &json!({"courses": [{}, {}]}));
        assert_eq!(gpa.main_value, "3.46");
        assert_eq!(gpa.details, vec!["Courses: 2", "Performance: Excellent"]);

        let other = s.card("water_intake", &json!({}), &json!({}));
        assert_eq!(other.title, "Water Intake");
        assert_eq!(other.icon, "🧮");
    }

    #[test]
    fn test_copy_text() {
        let text = sharer().copy_text("bmr", &json!({"bmr": 1650.5}), &json!({}));
        assert!(text.starts_with("My BMR is 1650.5 calories/day."));
        assert!(text.contains("https://calc.example.org/bmr"));
        assert!(text.ends_with("#Education"));
    }
}
