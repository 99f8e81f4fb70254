// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use serde_json::Value;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use multi_calc::{
    calculator_listing, calculator_report, export_csv, export_json, get_user_history,
    open_database, run_calculator, save_calculation, AppConfig, CalculatorKind, ErrorBody,
};

const USAGE: &str = "Usage:
  multi-calc                               open the history browser
  multi-calc calc <name> '<json>' [--save] run a calculator
  multi-calc report <name> '<json>'        print a paginated report
  multi-calc history [calculator]          list saved calculations
  multi-calc export <csv|json> <path>      export saved calculations
  multi-calc list                          list calculators";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => run_ui_mode(&config)?,
        Some("calc") => run_calc(&config, &args[1..])?,
        Some("report") => run_report(&config, &args[1..])?,
        Some("history") => run_history(&config, args.get(1).map(String::as_str))?,
        Some("export") => run_export(&config, &args[1..])?,
        Some("list") => run_list(),
        Some("help") | Some("--help") | Some("-h") => println!("{}", USAGE),
        Some(other) => {
            eprintln!("❌ Unknown command: {}\n", other);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

fn parse_payload(raw: &str) -> Result<Value> {
    let payload: Value = serde_json::from_str(raw).context("Request must be a JSON object")?;
    if !payload.is_object() {
        bail!("Request must be a JSON object");
    }
    Ok(payload)
}

/// Calculator errors print the transport error body and exit non-zero
fn fail(err: &multi_calc::CalcError) -> ! {
    let body = ErrorBody::from(err);
    println!("{}", serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.message.clone()));
    std::process::exit(1);
}

fn run_calc(config: &AppConfig, args: &[String]) -> Result<()> {
    let (name, raw) = match args {
        [name, raw, ..] => (name, raw),
        _ => bail!("calc needs a calculator name and a JSON request\n\n{}", USAGE),
    };
    let save = args.iter().any(|a| a == "--save");

    let kind = CalculatorKind::parse(name).unwrap_or_else(|e| fail(&e));
    let payload = parse_payload(raw)?;
    let result = run_calculator(kind, &payload).unwrap_or_else(|e| fail(&e));

    println!("{}", serde_json::to_string_pretty(&result)?);

    if save {
        let conn = open_database(Path::new(&config.database_path))?;
        let entry = save_calculation(&conn, &config.default_user, kind.name(), payload, result)?;
        eprintln!("💾 Saved as {}", entry.id);
    }
    Ok(())
}

fn run_report(config: &AppConfig, args: &[String]) -> Result<()> {
    let (name, raw) = match args {
        [name, raw, ..] => (name, raw),
        _ => bail!("report needs a calculator name and a JSON request\n\n{}", USAGE),
    };
    let kind = CalculatorKind::parse(name).unwrap_or_else(|e| fail(&e));
    let payload = parse_payload(raw)?;
    let report = calculator_report(kind, &payload, Local::now().naive_local(), config.report_page_lines)
        .unwrap_or_else(|e| fail(&e));

    println!("{}", report.render());
    Ok(())
}

fn run_history(config: &AppConfig, calculator: Option<&str>) -> Result<()> {
    let filter = match calculator {
        Some(name) => Some(CalculatorKind::parse(name).unwrap_or_else(|e| fail(&e)).name()),
        None => None,
    };
    let conn = open_database(Path::new(&config.database_path))?;
    let entries = get_user_history(&conn, &config.default_user, filter, None)?;

    println!("📊 {} saved calculation(s)", entries.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in &entries {
        println!(
            "{} {}  {:<20} {}",
            entry.date, entry.time, entry.calculator_type, entry.results
        );
    }
    Ok(())
}

fn run_export(config: &AppConfig, args: &[String]) -> Result<()> {
    let (format, path) = match args {
        [format, path, ..] => (format.as_str(), Path::new(path)),
        _ => bail!("export needs a format and a path\n\n{}", USAGE),
    };
    let conn = open_database(Path::new(&config.database_path))?;

    println!("📤 Exporting history...");
    let written = match format {
        "csv" => export_csv(&conn, &config.default_user, path)?,
        "json" => export_json(&conn, &config.default_user, path)?,
        other => bail!("Unsupported export format: {} (use csv or json)", other),
    };
    println!("✓ Wrote {} entries to {}", written, path.display());
    Ok(())
}

fn run_list() {
    println!("🧮 Available calculators");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for calc in calculator_listing() {
        println!(
            "{:<20} {:<10} {}",
            calc["name"].as_str().unwrap_or_default(),
            calc["category"].as_str().unwrap_or_default(),
            calc["title"].as_str().unwrap_or_default()
        );
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    println!("🖥️  Loading calculation history...\n");

    let conn = open_database(Path::new(&config.database_path))?;
    let entries = get_user_history(&conn, &config.default_user, None, None)?;
    let total_count = multi_calc::verify_count(&conn)?;

    println!("✓ Loaded {} calculations\n", entries.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(entries, total_count);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand:\n\n{}", USAGE);
    std::process::exit(1);
}
