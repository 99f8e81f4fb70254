// 📈 Analytics - chart data, trends and insights derived from saved history
// Entries arrive newest first (as the history store returns them)

use crate::amortization::ScheduleRow;
use crate::calculators::loan::price_reducing;
use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryEntry;
use crate::rounding::{money, round_dp};
use crate::validation::Validator;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Points shown on trend charts
const CHART_WINDOW: usize = 10;
/// Entries considered for trend recommendations
const TREND_WINDOW: usize = 5;

const PALETTE: [&str; 8] = [
    "#3498db", "#2ecc71", "#f39c12", "#e74c3c", "#9b59b6", "#1abc9c", "#34495e", "#e67e22",
];

// ============================================================================
// CHART TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Colors {
    One(&'static str),
    Many(Vec<&'static str>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<&'static str>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

impl Dataset {
    fn filled(label: &'static str, data: Vec<f64>, color: &'static str) -> Self {
        Dataset {
            label: Some(label),
            data,
            border_color: None,
            background_color: Colors::One(color),
            tension: None,
            fill: None,
            border_width: None,
        }
    }

    fn line(label: &'static str, data: Vec<f64>, border: &'static str, background: &'static str) -> Self {
        Dataset {
            label: Some(label),
            data,
            border_color: Some(border),
            background_color: Colors::One(background),
            tension: Some(0.4),
            fill: None,
            border_width: None,
        }
    }

    fn with_fill(mut self) -> Self {
        self.fill = Some(true);
        self
    }
}

/// Chart.js-shaped chart description; chart-specific keys go in `extras`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chart {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Chart {
    fn new(kind: &'static str, labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Chart {
            kind,
            labels,
            datasets,
            extras: Map::new(),
        }
    }

    fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extras.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bmi,
    Calorie,
    Gpa,
    Attendance,
}

impl ChartKind {
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "bmi" => Ok(ChartKind::Bmi),
            "calorie" => Ok(ChartKind::Calorie),
            "gpa" => Ok(ChartKind::Gpa),
            "attendance" => Ok(ChartKind::Attendance),
            _ => Err(CalcError::unsupported("chart type", value)),
        }
    }

    /// History `calculator_type` the chart reads
    pub fn calculator_type(&self) -> &'static str {
        match self {
            ChartKind::Bmi => "bmi",
            ChartKind::Calorie => "calorie",
            ChartKind::Gpa => "gpa",
            ChartKind::Attendance => "attendance",
        }
    }

    pub fn build(&self, history: &[HistoryEntry]) -> Chart {
        match self {
            ChartKind::Bmi => bmi_chart(history),
            ChartKind::Calorie => calorie_chart(history),
            ChartKind::Gpa => gpa_chart(history),
            ChartKind::Attendance => attendance_chart(history),
        }
    }
}

// ============================================================================
// FIELD ACCESS
// ============================================================================

fn result_num(entry: &HistoryEntry, key: &str) -> f64 {
    entry.results.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn input_num(entry: &HistoryEntry, key: &str) -> f64 {
    entry.inputs.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn result_text(entry: &HistoryEntry, key: &str) -> String {
    entry
        .results
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

/// The headline number each calculator is tracked by
fn headline_key(calculator_type: &str) -> Option<&'static str> {
    match calculator_type {
        "bmi" => Some("bmi"),
        "gpa" => Some("gpa"),
        "attendance" => Some("percentage"),
        _ => None,
    }
}

/// Most recent `CHART_WINDOW` entries, oldest first
fn chart_window(history: &[HistoryEntry]) -> Vec<&HistoryEntry> {
    history.iter().take(CHART_WINDOW).rev().collect()
}

fn labels(window: &[&HistoryEntry]) -> Vec<String> {
    window.iter().map(|e| e.date.clone()).collect()
}

// ============================================================================
// CHARTS
// ============================================================================

pub fn bmi_chart(history: &[HistoryEntry]) -> Chart {
    let window = chart_window(history);
    let data = window.iter().map(|e| result_num(e, "bmi")).collect();
    let categories: Vec<String> = window.iter().map(|e| result_text(e, "category")).collect();

    Chart::new(
        "line",
        labels(&window),
        vec![Dataset::line("BMI Trend", data, "#3498db", "rgba(52, 152, 219, 0.1)")],
    )
    .with_extra("categories", json!(categories))
    .with_extra(
        "ranges",
        json!([
            {"value": 18.5, "label": "Underweight", "color": "#3498db"},
            {"value": 25, "label": "Normal", "color": "#2ecc71"},
            {"value": 30, "label": "Overweight", "color": "#f39c12"},
            {"value": 40, "label": "Obese", "color": "#e74c3c"}
        ]),
    )
}

pub fn calorie_chart(history: &[HistoryEntry]) -> Chart {
    let window = chart_window(history);
    Chart::new(
        "bar",
        labels(&window),
        vec![
            Dataset::filled(
                "BMR (Basal Metabolic Rate)",
                window.iter().map(|e| result_num(e, "bmr")).collect(),
                "#3498db",
            ),
            Dataset::filled(
                "Maintenance Calories",
                window.iter().map(|e| result_num(e, "maintain")).collect(),
                "#2ecc71",
            ),
        ],
    )
}

pub fn gpa_chart(history: &[HistoryEntry]) -> Chart {
    let window = chart_window(history);
    let data = window.iter().map(|e| result_num(e, "gpa")).collect();
    Chart::new(
        "line",
        labels(&window),
        vec![Dataset::line("GPA Progress", data, "#9b59b6", "rgba(155, 89, 182, 0.1)").with_fill()],
    )
    .with_extra("yAxis", json!({"min": 0, "max": 4.0, "ticks": [0, 1.0, 2.0, 3.0, 4.0]}))
    .with_extra(
        "annotations",
        json!([
            {"y": 3.5, "label": "Excellent", "color": "#2ecc71"},
            {"y": 3.0, "label": "Good", "color": "#3498db"},
            {"y": 2.5, "label": "Average", "color": "#f39c12"}
        ]),
    )
}

pub fn attendance_chart(history: &[HistoryEntry]) -> Chart {
    let window = chart_window(history);
    let data = window.iter().map(|e| result_num(e, "percentage")).collect();
    Chart::new(
        "line",
        labels(&window),
        vec![Dataset::line("Attendance %", data, "#e74c3c", "rgba(231, 76, 60, 0.1)").with_fill()],
    )
    .with_extra("yAxis", json!({"min": 0, "max": 100}))
    .with_extra("threshold", json!({"value": 75, "label": "Minimum Required", "color": "#f39c12"}))
}

/// Previous vs current headline value, for calculators that have one
pub fn comparison_chart(calculator_type: &str, current: &Value, previous: &Value) -> Option<Chart> {
    let (label, color) = match calculator_type {
        "bmi" => ("BMI", "#3498db"),
        "gpa" => ("GPA", "#9b59b6"),
        _ => return None,
    };
    let key = headline_key(calculator_type)?;
    let pick = |v: &Value| v.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    Some(Chart::new(
        "bar",
        vec!["Previous".to_string(), "Current".to_string()],
        vec![Dataset {
            label: Some(label),
            data: vec![pick(previous), pick(current)],
            border_color: None,
            background_color: Colors::Many(vec!["#95a5a6", color]),
            tension: None,
            fill: None,
            border_width: None,
        }],
    ))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanVisualization {
    pub chart: Chart,
    pub center_text: String,
    pub subtitle: &'static str,
    /// First year of the payment schedule
    pub schedule: Vec<ScheduleRow>,
}

/// Thousands separators, two decimals
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Principal vs interest doughnut plus the first 12 schedule rows
pub fn loan_visualization(amount: f64, rate: f64, years: f64) -> CalcResult<LoanVisualization> {
    Validator::new("loan_visualization")
        .positive("amount", amount)
        .non_negative("rate", rate)
        .at_most("rate", rate, 50.0)
        .positive("years", years)
        .at_most("years", years, 40.0)
        .finish()?;
    let months = (years * 12.0).floor() as u32;
    Validator::new("loan_visualization")
        .check(months >= 1, "years", "must cover at least one month")
        .finish()?;
    let loan = price_reducing(amount, rate, months, &[])?;
    let interest = money(loan.total_interest());
    let total = round_dp(amount + interest, 2);

    let chart = Chart::new(
        "doughnut",
        vec!["Principal Amount".to_string(), "Total Interest".to_string()],
        vec![Dataset {
            label: None,
            data: vec![amount, interest],
            border_color: None,
            background_color: Colors::Many(vec!["#3498db", "#e74c3c"]),
            tension: None,
            fill: None,
            border_width: Some(2),
        }],
    );

    Ok(LoanVisualization {
        chart,
        center_text: format_currency(total),
        subtitle: "Total Payment",
        schedule: loan.ledger.iter().take(12).map(|p| p.to_row()).collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub chart: Chart,
    pub total: usize,
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pie of calculator usage, most used first (ties keep first-seen order)
pub fn usage_stats(history: &[HistoryEntry]) -> UsageStats {
    let mut usage: Vec<(String, usize)> = Vec::new();
    for entry in history {
        match usage.iter_mut().find(|(k, _)| *k == entry.calculator_type) {
            Some((_, count)) => *count += 1,
            None => usage.push((entry.calculator_type.clone(), 1)),
        }
    }
    usage.sort_by(|a, b| b.1.cmp(&a.1));

    let chart = Chart::new(
        "pie",
        usage.iter().map(|(k, _)| title_case(k)).collect(),
        vec![Dataset {
            label: None,
            data: usage.iter().map(|(_, c)| *c as f64).collect(),
            border_color: None,
            background_color: Colors::Many(PALETTE.to_vec()),
            tension: None,
            fill: None,
            border_width: None,
        }],
    );
    UsageStats {
        chart,
        total: history.len(),
    }
}

/// Calculations per day
pub fn activity_heatmap(history: &[HistoryEntry]) -> Value {
    let mut days: Map<String, Value> = Map::new();
    for entry in history {
        let count = days.get(&entry.date).and_then(Value::as_u64).unwrap_or(0);
        days.insert(entry.date.clone(), json!(count + 1));
    }
    json!({
        "type": "heatmap",
        "data": days,
        "colorScale": {"low": "#ebedf0", "medium": "#9be9a8", "high": "#40c463", "highest": "#30a14e"}
    })
}

// ============================================================================
// TRENDS (history analytics)
// ============================================================================

pub fn trend_points(calculator_type: &str, history: &[HistoryEntry]) -> Vec<Value> {
    history
        .iter()
        .filter_map(|e| match calculator_type {
            "bmi" => Some(json!({
                "date": e.date,
                "value": result_num(e, "bmi"),
                "category": result_text(e, "category"),
            })),
            "calorie" => Some(json!({
                "date": e.date,
                "bmr": result_num(e, "bmr"),
                "maintain": result_num(e, "maintain"),
                "activity": e.inputs.get("activity").and_then(Value::as_str).unwrap_or("unknown"),
            })),
            "loan" => Some(json!({
                "date": e.date,
                "emi": result_num(e, "emi"),
                "total_interest": result_num(e, "total_interest"),
                "amount": input_num(e, "amount"),
            })),
            "gpa" => Some(json!({
                "date": e.date,
                "gpa": result_num(e, "gpa"),
                "courses": e.inputs.get("courses").and_then(Value::as_array).map_or(0, Vec::len),
            })),
            "attendance" => Some(json!({
                "date": e.date,
                "percentage": result_num(e, "percentage"),
                "attended": input_num(e, "attended"),
                "total": input_num(e, "total"),
            })),
            _ => None,
        })
        .collect()
}

/// Average / lowest / highest and newest-minus-oldest change of the headline value
pub fn trend_statistics(calculator_type: &str, history: &[HistoryEntry]) -> Value {
    let (key, name, change_key) = match calculator_type {
        "bmi" => ("bmi", "bmi", "change"),
        "gpa" => ("gpa", "gpa", "improvement"),
        "attendance" => ("percentage", "attendance", "improvement"),
        _ => return json!({}),
    };
    if history.is_empty() {
        return json!({});
    }

    let values: Vec<f64> = history.iter().map(|e| result_num(e, key)).collect();
    let average = values.iter().sum::<f64>() / values.len() as f64;
    let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let change = if values.len() > 1 {
        round_dp(values[0] - values[values.len() - 1], 2)
    } else {
        0.0
    };

    let mut stats = Map::new();
    stats.insert(format!("average_{}", name), json!(round_dp(average, 2)));
    stats.insert(format!("lowest_{}", name), json!(lowest));
    stats.insert(format!("highest_{}", name), json!(highest));
    stats.insert(change_key.to_string(), json!(change));
    Value::Object(stats)
}

/// Plain-language observations about the tracked value
pub fn insights(calculator_type: &str, history: &[HistoryEntry], current: &Value) -> Vec<String> {
    if history.len() < 2 {
        return vec!["Start tracking your progress to see insights and trends!".to_string()];
    }
    let mut out = Vec::new();

    if calculator_type == "loan" {
        let interest = current.get("total_interest").and_then(Value::as_f64).unwrap_or(0.0);
        out.push(format!("💰 Total interest over loan period: {}", format_currency(interest)));
        out.push(format!("📅 You've calculated {} loan scenarios", history.len()));
        return out;
    }

    let Some(key) = headline_key(calculator_type) else {
        return out;
    };
    let values: Vec<f64> = history.iter().map(|e| result_num(e, key)).collect();
    let newest = values[0];
    let change = newest - values[values.len() - 1];

    match calculator_type {
        "bmi" => {
            if change > 0.0 {
                out.push(format!("📈 Your BMI has increased by {:.1} points", change.abs()));
            } else if change < 0.0 {
                out.push(format!("📉 Great! Your BMI has decreased by {:.1} points", change.abs()));
            } else {
                out.push("➡️ Your BMI has remained stable".to_string());
            }
            let average = values.iter().sum::<f64>() / values.len() as f64;
            out.push(format!("📊 Your average BMI over time: {:.1}", average));
        }
        "gpa" => {
            if change > 0.0 {
                out.push(format!("🎓 Excellent! Your GPA improved by {:.2} points", change.abs()));
            } else if change < 0.0 {
                out.push(format!("⚠️ Your GPA decreased by {:.2} points - time to focus!", change.abs()));
            } else {
                out.push("➡️ Your GPA has remained consistent".to_string());
            }
            if newest >= 3.5 {
                out.push("⭐ You're maintaining excellent academic performance!".to_string());
            }
        }
        _ => {
            if change > 0.0 {
                out.push(format!("✅ Your attendance improved by {:.1}%", change.abs()));
            } else if change < 0.0 {
                out.push(format!("⚠️ Your attendance dropped by {:.1}%", change.abs()));
            }
            if newest >= 75.0 {
                out.push("🎯 You're meeting the attendance requirement!".to_string());
            } else {
                out.push("📌 Focus on improving attendance to meet requirements".to_string());
            }
        }
    }
    out
}

/// Advice from the average step over the latest entries (needs at least 3)
pub fn trend_recommendations(calculator_type: &str, history: &[HistoryEntry]) -> Vec<String> {
    if history.len() < 3 {
        return Vec::new();
    }
    let (key, threshold) = match calculator_type {
        "bmi" => ("bmi", 0.5),
        "gpa" => ("gpa", 0.1),
        _ => return Vec::new(),
    };

    // chronological order, latest TREND_WINDOW entries
    let values: Vec<f64> = history
        .iter()
        .take(TREND_WINDOW)
        .rev()
        .map(|e| result_num(e, key))
        .collect();
    let steps = values.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (values.len() - 1) as f64;

    let advice = match (calculator_type, steps) {
        ("bmi", s) if s > threshold => {
            "Your BMI is trending upward. Consider reviewing your diet and exercise routine."
        }
        ("bmi", s) if s < -threshold => "Great progress! Your BMI is trending downward. Keep up the good work!",
        ("gpa", s) if s < -threshold => "Your GPA is declining. Consider meeting with an academic advisor.",
        ("gpa", s) if s > threshold => "Excellent! Your GPA is improving. Maintain your study habits!",
        _ => return Vec::new(),
    };
    vec![advice.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Newest first, like the history store
    fn history(kind: &str, key: &str, values: &[f64]) -> Vec<HistoryEntry> {
        let mut out: Vec<HistoryEntry> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let when = NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap();
                HistoryEntry::at(when, "u", kind, json!({}), json!({ key: v }))
            })
            .collect();
        out.reverse();
        out
    }

    #[test]
    fn test_chart_uses_latest_ten_oldest_first() {
        let values: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let chart = bmi_chart(&history("bmi", "bmi", &values));
        assert_eq!(chart.datasets[0].data, (3..=12).map(|v| v as f64).collect::<Vec<_>>());
        assert_eq!(chart.labels.first().map(String::as_str), Some("2024-01-03"));
        assert_eq!(chart.kind, "line");
        let out = serde_json::to_value(&chart).unwrap();
        assert!(out.get("ranges").is_some());
        assert_eq!(out["datasets"][0]["borderColor"], json!("#3498db"));
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!(ChartKind::parse("GPA").unwrap(), ChartKind::Gpa);
        assert!(ChartKind::parse("loan").is_err());
        let empty = ChartKind::Attendance.build(&[]);
        assert!(empty.labels.is_empty());
    }

    #[test]
    fn test_insights_direction() {
        // oldest 26 → newest 24
        let h = history("bmi", "bmi", &[26.0, 25.0, 24.0]);
        let text = insights("bmi", &h, &json!({}));
        assert!(text[0].contains("decreased by 2.0"), "{:?}", text);
        assert!(text[1].contains("25.0"));

        let single = history("gpa", "gpa", &[3.0]);
        assert_eq!(insights("gpa", &single, &json!({})).len(), 1);
    }

    #[test]
    fn test_trend_recommendations() {
        let rising = history("bmi", "bmi", &[22.0, 23.0, 24.0, 25.0]);
        assert_eq!(trend_recommendations("bmi", &rising).len(), 1);
        let flat = history("gpa", "gpa", &[3.0, 3.0, 3.0]);
        assert!(trend_recommendations("gpa", &flat).is_empty());
    }

    #[test]
    fn test_usage_and_heatmap() {
        let mut h = history("bmi", "bmi", &[1.0, 2.0]);
        h.extend(history("compound_interest", "x", &[1.0]));
        let usage = usage_stats(&h);
        assert_eq!(usage.total, 3);
        assert_eq!(usage.chart.labels, vec!["Bmi", "Compound Interest"]);
        assert_eq!(usage.chart.datasets[0].data, vec![2.0, 1.0]);

        let heat = activity_heatmap(&h);
        assert_eq!(heat["data"]["2024-01-01"], json!(2));
    }

    #[test]
    fn test_loan_visualization() {
        let viz = loan_visualization(100_000.0, 12.0, 1.0).unwrap();
        assert_eq!(viz.schedule.len(), 12);
        assert_eq!(viz.schedule[11].balance, 0.0);
        assert_eq!(viz.chart.datasets[0].data[0], 100_000.0);
        assert!(viz.center_text.starts_with("$106,"), "{}", viz.center_text);
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_comparison_chart() {
        let chart = comparison_chart("gpa", &json!({"gpa": 3.6}), &json!({"gpa": 3.2})).unwrap();
        assert_eq!(chart.datasets[0].data, vec![3.2, 3.6]);
        assert!(comparison_chart("loan", &json!({}), &json!({})).is_none());
    }
}
