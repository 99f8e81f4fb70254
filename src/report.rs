// 📄 Report Renderer - paginated plain-text documents from result JSON
// Objects flatten to `Label: value` lines, arrays of objects become aligned tables

use crate::calculators::{run_calculator, CalculatorKind};
use crate::errors::CalcResult;
use crate::validation::Validator;
use chrono::NaiveDateTime;
use serde_json::{Map, Value};

const PAGE_WIDTH: usize = 78;
const INDENT: usize = 2;
const DISCLAIMER: &str =
    "Disclaimer: This report is for informational purposes only. Please consult with qualified professionals for personalized advice.";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub subtitle: Option<String>,
    pub generated_at: NaiveDateTime,
    /// Body lines per page, header/footer excluded
    pub pages: Vec<Vec<String>>,
}

impl Report {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages separated by form feeds
    pub fn render(&self) -> String {
        let total = self.pages.len();
        let generated = self.generated_at.format("%B %d, %Y at %I:%M %p");
        let mut out = Vec::with_capacity(total);

        for (i, body) in self.pages.iter().enumerate() {
            let mut page = Vec::with_capacity(body.len() + 6);
            let counter = format!("Page {} of {}", i + 1, total);
            let gap = PAGE_WIDTH.saturating_sub(self.title.chars().count() + counter.len()).max(1);
            page.push(format!("{}{}{}", self.title, " ".repeat(gap), counter));
            if let Some(subtitle) = &self.subtitle {
                page.push(subtitle.clone());
            }
            page.push("=".repeat(PAGE_WIDTH));
            page.extend(body.iter().cloned());
            page.push("-".repeat(PAGE_WIDTH));
            page.push(format!("Generated on: {}", generated));
            out.push(page.join("\n"));
        }
        out.join("\n\x0c\n")
    }
}

// ============================================================================
// FLATTENING
// ============================================================================

/// `total_interest` → `Total Interest`
pub fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
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

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Columns in first-seen order across all rows
fn table(rows: &[&Map<String, Value>], indent: usize, out: &mut Vec<String>) {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).map_or_else(String::new, scalar))
                .collect()
        })
        .collect();
    let headers: Vec<String> = columns.iter().map(|c| humanize(c)).collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad = " ".repeat(indent);
    let line = |values: &[String]| {
        let joined = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{}{}", pad, joined.trim_end())
    };

    out.push(line(&headers));
    out.push(format!(
        "{}{}",
        pad,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    ));
    for row in &cells {
        out.push(line(row));
    }
}

fn flatten_into(label: &str, value: &Value, indent: usize, out: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    match value {
        Value::Object(map) => {
            out.push(format!("{}{}:", pad, label));
            for (key, nested) in map {
                flatten_into(&humanize(key), nested, indent + INDENT, out);
            }
        }
        Value::Array(items) if items.is_empty() => out.push(format!("{}{}: -", pad, label)),
        Value::Array(items) if items.iter().all(is_scalar) => {
            out.push(format!(
                "{}{}: {}",
                pad,
                label,
                items.iter().map(scalar).collect::<Vec<_>>().join(", ")
            ));
        }
        Value::Array(items) => {
            out.push(format!("{}{}:", pad, label));
            let rows: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
            if rows.len() == items.len() {
                table(&rows, indent + INDENT, out);
            } else {
                for (i, item) in items.iter().enumerate() {
                    flatten_into(&format!("#{}", i + 1), item, indent + INDENT, out);
                }
            }
        }
        other => out.push(format!("{}{}: {}", pad, label, scalar(other))),
    }
}

/// Top-level object keys become lines at column 0
pub fn flatten(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&humanize(key), nested, 0, &mut out);
            }
        }
        other => flatten_into("Value", other, 0, &mut out),
    }
    out
}

fn section(title: &str, value: &Value, out: &mut Vec<String>) {
    out.push(title.to_uppercase());
    out.push(String::new());
    out.extend(flatten(value));
    out.push(String::new());
}

// ============================================================================
// BUILDERS
// ============================================================================

pub fn build_report(
    title: &str,
    subtitle: Option<&str>,
    inputs: &Value,
    results: &Value,
    generated_at: NaiveDateTime,
    lines_per_page: usize,
) -> CalcResult<Report> {
    Validator::new("report")
        .check(lines_per_page > 0, "lines_per_page", "must be at least 1")
        .check(!title.trim().is_empty(), "title", "must not be empty")
        .finish()?;

    let mut body = Vec::new();
    section("Your Inputs", inputs, &mut body);
    section("Results", results, &mut body);
    body.push(DISCLAIMER.to_string());

    let pages = body.chunks(lines_per_page).map(<[String]>::to_vec).collect();
    Ok(Report {
        title: title.to_string(),
        subtitle: subtitle.map(str::to_string),
        generated_at,
        pages,
    })
}

/// Runs the calculator in detailed mode and renders its output
pub fn calculator_report(
    kind: CalculatorKind,
    payload: &Value,
    generated_at: NaiveDateTime,
    lines_per_page: usize,
) -> CalcResult<Report> {
    let mut request = payload.clone();
    if let Value::Object(map) = &mut request {
        map.insert("detailed".to_string(), Value::Bool(true));
    }
    let results = run_calculator(kind, &request)?;

    let mut inputs = payload.clone();
    if let Value::Object(map) = &mut inputs {
        map.remove("detailed");
    }
    build_report(
        &format!("{} Report", kind.title()),
        Some("Complete Analysis and Recommendations"),
        &inputs,
        &results,
        generated_at,
        lines_per_page,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(12, 30, 0).unwrap()
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("total_interest"), "Total Interest");
        assert_eq!(humanize("emi"), "Emi");
    }

    #[test]
    fn test_flatten_nested_and_lists() {
        let lines = flatten(&json!({
            "bmi": 22.5,
            "ideal_weight": {"min": 53.5, "max": 72.0},
            "tips": ["Sleep", "Walk"],
            "passed": true
        }));
        assert!(lines.contains(&"Bmi: 22.5".to_string()));
        assert!(lines.contains(&"Ideal Weight:".to_string()));
        assert!(lines.contains(&"  Max: 72.0".to_string()));
        assert!(lines.contains(&"Tips: Sleep, Walk".to_string()));
        assert!(lines.contains(&"Passed: Yes".to_string()));
    }

    #[test]
    fn test_table_alignment() {
        let lines = flatten(&json!({
            "schedule": [
                {"month": 1, "balance": 900.5},
                {"month": 12, "balance": 0.0}
            ]
        }));
        // object keys iterate in sorted order
        assert_eq!(lines[0], "Schedule:");
        assert_eq!(lines[1], "  Balance | Month");
        assert_eq!(lines[2], "  --------+------");
        assert_eq!(lines[3], "  900.5   | 1");
        assert_eq!(lines[4], "  0.0     | 12");
    }

    #[test]
    fn test_pagination() {
        let results = json!({"items": (0..25).map(|i| json!(i)).collect::<Vec<_>>(),
                             "a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6});
        let report = build_report("Demo", None, &json!({"x": 1}), &results, noon(), 5).unwrap();
        // 4 input lines, 2 result headers, 7 result lines, blank, disclaimer
        assert_eq!(report.page_count(), 3);
        let text = report.render();
        assert!(text.contains("Page 1 of 3"));
        assert!(text.contains("Page 3 of 3"));
        assert_eq!(text.matches('\x0c').count(), 2);
        assert!(text.contains("Generated on: March 05, 2024 at 12:30 PM"));

        assert!(build_report("Demo", None, &json!({}), &json!({}), noon(), 0).is_err());
    }

    #[test]
    fn test_calculator_report() {
        let report = calculator_report(
            CalculatorKind::Loan,
            &json!({"amount": 100000, "rate": 12, "duration": 1}),
            noon(),
            40,
        )
        .unwrap();
        assert_eq!(report.title, "Loan / EMI Calculator Report");
        let text = report.render();
        assert!(text.contains("Emi: 8884.88"), "{}", text);
        assert!(!text.contains("Detailed: Yes"));
        println!("✅ Calculator report test PASSED");
    }
}
