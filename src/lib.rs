// Multi Calculator - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod errors;
pub mod validation;
pub mod rounding;
pub mod amortization;   // Ledger engine shared by loan, mortgage and compound interest
pub mod result;         // Calculator trait + simple/detailed outcomes
pub mod calculators;
pub mod expression;     // Safe arithmetic: tokenizer → parser → evaluator
pub mod advisor;
pub mod sharing;
pub mod history;        // SQLite history + audit events
pub mod analytics;
pub mod report;
pub mod config;

// Re-export commonly used types
pub use errors::{CalcError, CalcResult};
pub use validation::{ValidationError, Validator};
pub use result::{run_json, Calculator, ErrorBody, Mode, Outcome};
pub use calculators::{
    run_calculator, CalculatorKind,
    activity_listing, calculator_listing, currency_listing,
    sleep_tips_listing, unit_category_listing, unit_listing,
};
pub use amortization::{PeriodEntry, Prepayment, ScheduleRow};
pub use expression::{evaluate, AngleMode, Evaluation};
pub use history::{
    HistoryEntry, Event, MonthlySummary, AnalyticsData,
    setup_database, open_database, save_calculation, get_user_history,
    get_monthly_summary, get_analytics_data, delete_entry, clear_history,
    verify_count, export_csv, export_json, insert_event, get_events_for_entity,
};
pub use analytics::{Chart, ChartKind};
pub use sharing::{ShareCard, ShareLinks, Sharer};
pub use report::{build_report, calculator_report, Report};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
