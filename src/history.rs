// 🗄️ Calculation History - SQLite store with audit trail
// One row per saved calculation; every save/delete/clear is also logged as an event

use crate::analytics;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// ============================================================================
// TYPES
// ============================================================================

/// One saved calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub calculator_type: String,
    pub inputs: Value,
    pub results: Value,
    /// Local time, ISO-8601 without offset
    pub timestamp: String,
    pub date: String,
    pub time: String,
}

impl HistoryEntry {
    pub fn new(user_id: &str, calculator_type: &str, inputs: Value, results: Value) -> Self {
        HistoryEntry::at(
            Local::now().naive_local(),
            user_id,
            calculator_type,
            inputs,
            results,
        )
    }

    /// Entry stamped at a given local time
    pub fn at(
        when: NaiveDateTime,
        user_id: &str,
        calculator_type: &str,
        inputs: Value,
        results: Value,
    ) -> Self {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            calculator_type: calculator_type.to_string(),
            inputs,
            results,
            timestamp: when.format(TIMESTAMP_FORMAT).to_string(),
            date: when.format("%Y-%m-%d").to_string(),
            time: when.format("%H:%M:%S").to_string(),
        }
    }

    /// SHA-256 over calculator type + inputs; equal for repeated calculations
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}{}", self.calculator_type, self.inputs));
        format!("{:x}", hasher.finalize())
    }

    pub fn naive_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: Value,
    pub actor: String,
}

impl Event {
    pub fn new(event_type: &str, entity_type: &str, entity_id: &str, data: Value, actor: &str) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_calculations: usize,
    pub by_calculator: BTreeMap<String, usize>,
    pub most_used: Option<String>,
    pub calculations: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsData {
    pub calculator_type: String,
    pub total_entries: usize,
    pub date_range: DateRange,
    pub trends: Vec<Value>,
    pub statistics: Value,
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            calculator_type TEXT NOT NULL,
            inputs TEXT NOT NULL,
            results TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_user ON history(user_id, calculator_type)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_fingerprint ON history(fingerprint)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Open (creating if needed) the history file and ensure the schema
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open history database at {}", path.display()))?;
    setup_database(&conn).context("Failed to set up history schema")?;
    Ok(conn)
}

// ============================================================================
// WRITES
// ============================================================================

pub fn insert_entry(conn: &Connection, entry: &HistoryEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO history (
            id, user_id, calculator_type, inputs, results, timestamp, date, time, fingerprint
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.id,
            entry.user_id,
            entry.calculator_type,
            serde_json::to_string(&entry.inputs)?,
            serde_json::to_string(&entry.results)?,
            entry.timestamp,
            entry.date,
            entry.time,
            entry.fingerprint(),
        ],
    )?;

    let event = Event::new(
        "calculation_saved",
        "calculation",
        &entry.id,
        serde_json::json!({"calculator_type": entry.calculator_type}),
        &entry.user_id,
    );
    insert_event(conn, &event)?;

    info!(id = %entry.id, calculator = %entry.calculator_type, "calculation saved");
    Ok(())
}

/// Save a calculation stamped now; returns the stored entry
pub fn save_calculation(
    conn: &Connection,
    user_id: &str,
    calculator_type: &str,
    inputs: Value,
    results: Value,
) -> Result<HistoryEntry> {
    let entry = HistoryEntry::new(user_id, calculator_type, inputs, results);
    insert_entry(conn, &entry)?;
    Ok(entry)
}

/// Delete one entry, only if it belongs to `user_id`
pub fn delete_entry(conn: &Connection, user_id: &str, entry_id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM history WHERE id = ?1 AND user_id = ?2",
        params![entry_id, user_id],
    )?;
    if removed == 0 {
        return Ok(false);
    }

    let event = Event::new("calculation_deleted", "calculation", entry_id, serde_json::json!({}), user_id);
    insert_event(conn, &event)?;
    info!(id = %entry_id, "calculation deleted");
    Ok(true)
}

/// Clear a user's history, optionally only one calculator's entries
pub fn clear_history(conn: &Connection, user_id: &str, calculator_type: Option<&str>) -> Result<usize> {
    let removed = match calculator_type {
        Some(kind) => conn.execute(
            "DELETE FROM history WHERE user_id = ?1 AND calculator_type = ?2",
            params![user_id, kind],
        )?,
        None => conn.execute("DELETE FROM history WHERE user_id = ?1", params![user_id])?,
    };

    let event = Event::new(
        "history_cleared",
        "user",
        user_id,
        serde_json::json!({"calculator_type": calculator_type, "removed": removed}),
        user_id,
    );
    insert_event(conn, &event)?;
    info!(user = %user_id, removed, "history cleared");
    Ok(removed)
}

// ============================================================================
// READS
// ============================================================================

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let id: String = row.get(0)?;
    let inputs_json: String = row.get(3)?;
    let results_json: String = row.get(4)?;

    let parse = |json: &str, column: &str| {
        serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(id = %id, column, error = %e, "unparsable stored JSON");
            Value::Null
        })
    };

    Ok(HistoryEntry {
        inputs: parse(&inputs_json, "inputs"),
        results: parse(&results_json, "results"),
        user_id: row.get(1)?,
        calculator_type: row.get(2)?,
        timestamp: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        id,
    })
}

/// Newest first
pub fn get_user_history(
    conn: &Connection,
    user_id: &str,
    calculator_type: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<HistoryEntry>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT id, user_id, calculator_type, inputs, results, timestamp, date, time
         FROM history
         WHERE user_id = ?1 AND (?2 IS NULL OR calculator_type = ?2)
         ORDER BY timestamp DESC
         LIMIT ?3",
    )?;

    let entries = stmt
        .query_map(params![user_id, calculator_type, limit], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

pub fn get_entry(conn: &Connection, user_id: &str, entry_id: &str) -> Result<Option<HistoryEntry>> {
    let entry = conn
        .query_row(
            "SELECT id, user_id, calculator_type, inputs, results, timestamp, date, time
             FROM history WHERE id = ?1 AND user_id = ?2",
            params![entry_id, user_id],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// Counts per calculator for one calendar month; ties for most used go to
/// the calculator seen first (newest)
pub fn get_monthly_summary(conn: &Connection, user_id: &str, year: i32, month: u32) -> Result<MonthlySummary> {
    let calculations: Vec<HistoryEntry> = get_user_history(conn, user_id, None, None)?
        .into_iter()
        .filter(|e| {
            e.naive_timestamp()
                .map(|ts| ts.year() == year && ts.month() == month)
                .unwrap_or(false)
        })
        .collect();

    let mut order: Vec<(String, usize)> = Vec::new();
    for entry in &calculations {
        match order.iter_mut().find(|(kind, _)| *kind == entry.calculator_type) {
            Some((_, count)) => *count += 1,
            None => order.push((entry.calculator_type.clone(), 1)),
        }
    }

    let mut most_used: Option<(String, usize)> = None;
    for (kind, count) in &order {
        if most_used.as_ref().map_or(true, |(_, best)| count > best) {
            most_used = Some((kind.clone(), *count));
        }
    }

    Ok(MonthlySummary {
        year,
        month,
        total_calculations: calculations.len(),
        by_calculator: order.into_iter().collect(),
        most_used: most_used.map(|(kind, _)| kind),
        calculations,
    })
}

pub fn date_range(entries: &[HistoryEntry]) -> DateRange {
    DateRange {
        start: entries.iter().map(|e| e.date.clone()).min(),
        end: entries.iter().map(|e| e.date.clone()).max(),
    }
}

/// Trend points and summary statistics for one calculator's entries
pub fn get_analytics_data(conn: &Connection, user_id: &str, calculator_type: &str) -> Result<AnalyticsData> {
    let entries = get_user_history(conn, user_id, Some(calculator_type), None)?;
    Ok(AnalyticsData {
        calculator_type: calculator_type.to_string(),
        total_entries: entries.len(),
        date_range: date_range(&entries),
        trends: analytics::trend_points(calculator_type, &entries),
        statistics: analytics::trend_statistics(calculator_type, &entries),
    })
}

/// How many times each distinct calculation was repeated (only counts > 1)
pub fn repeated_calculations(conn: &Connection, user_id: &str) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT calculator_type, COUNT(*) FROM history
         WHERE user_id = ?1
         GROUP BY fingerprint, calculator_type
         HAVING COUNT(*) > 1
         ORDER BY COUNT(*) DESC, calculator_type",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// EVENTS
// ============================================================================

pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let timestamp_str: String = row.get(1)?;
    let data_json: String = row.get(5)?;

    Ok(Event {
        event_id: row.get(0)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?
            .with_timezone(&Utc),
        event_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        data: serde_json::from_str(&data_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?,
        actor: row.get(6)?,
    })
}

pub fn get_events_for_entity(conn: &Connection, entity_type: &str, entity_id: &str) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

/// Latest events performed by one user
pub fn get_user_events(conn: &Connection, actor: &str, limit: usize) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE actor = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )?;

    let events = stmt
        .query_map(params![actor, limit as i64], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// EXPORT
// ============================================================================

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    calculator_type: &'a str,
    date: &'a str,
    time: &'a str,
    inputs: String,
    results: String,
}

pub fn entries_to_csv(entries: &[HistoryEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in entries {
        writer.serialize(CsvRow {
            id: &entry.id,
            calculator_type: &entry.calculator_type,
            date: &entry.date,
            time: &entry.time,
            inputs: entry.inputs.to_string(),
            results: entry.results.to_string(),
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

pub fn entries_to_json(entries: &[HistoryEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).context("Failed to serialize history")
}

/// Write a user's full history to `path`; returns the number of entries
pub fn export_csv(conn: &Connection, user_id: &str, path: &Path) -> Result<usize> {
    let entries = get_user_history(conn, user_id, None, None)?;
    std::fs::write(path, entries_to_csv(&entries)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(entries.len())
}

pub fn export_json(conn: &Connection, user_id: &str, path: &Path) -> Result<usize> {
    let entries = get_user_history(conn, user_id, None, None)?;
    std::fs::write(path, entries_to_json(&entries)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn stamp(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn add(conn: &Connection, when: NaiveDateTime, user: &str, kind: &str, results: Value) -> HistoryEntry {
        let entry = HistoryEntry::at(when, user, kind, json!({"n": 1}), results);
        insert_entry(conn, &entry).unwrap();
        entry
    }

    #[test]
    fn test_save_and_fetch_newest_first() {
        let conn = test_db();
        add(&conn, stamp(2024, 3, 1, 9), "alice", "bmi", json!({"bmi": 24.0}));
        add(&conn, stamp(2024, 3, 5, 9), "alice", "bmi", json!({"bmi": 23.5}));
        add(&conn, stamp(2024, 3, 3, 9), "alice", "gpa", json!({"gpa": 3.2}));
        add(&conn, stamp(2024, 3, 4, 9), "bob", "bmi", json!({"bmi": 30.0}));

        let all = get_user_history(&conn, "alice", None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, "2024-03-05");
        assert_eq!(all[2].date, "2024-03-01");

        let bmi_only = get_user_history(&conn, "alice", Some("bmi"), Some(1)).unwrap();
        assert_eq!(bmi_only.len(), 1);
        assert_eq!(bmi_only[0].results["bmi"], json!(23.5));

        assert_eq!(verify_count(&conn).unwrap(), 4);
        println!("✅ History save/fetch test PASSED");
    }

    #[test]
    fn test_delete_is_scoped_to_user() {
        let conn = test_db();
        let entry = add(&conn, stamp(2024, 1, 1, 8), "alice", "loan", json!({"emi": 100.0}));

        assert!(get_entry(&conn, "mallory", &entry.id).unwrap().is_none());
        assert_eq!(get_entry(&conn, "alice", &entry.id).unwrap().map(|e| e.id), Some(entry.id.clone()));

        assert!(!delete_entry(&conn, "mallory", &entry.id).unwrap(), "other users cannot delete");
        assert!(delete_entry(&conn, "alice", &entry.id).unwrap());
        assert!(!delete_entry(&conn, "alice", &entry.id).unwrap(), "second delete finds nothing");
        assert_eq!(verify_count(&conn).unwrap(), 0);

        let events = get_events_for_entity(&conn, "calculation", &entry.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "calculation_deleted");
    }

    #[test]
    fn test_clear_history_by_type() {
        let conn = test_db();
        add(&conn, stamp(2024, 1, 1, 8), "alice", "bmi", json!({}));
        add(&conn, stamp(2024, 1, 2, 8), "alice", "gpa", json!({}));
        add(&conn, stamp(2024, 1, 3, 8), "bob", "gpa", json!({}));

        assert_eq!(clear_history(&conn, "alice", Some("gpa")).unwrap(), 1);
        assert_eq!(get_user_history(&conn, "alice", None, None).unwrap().len(), 1);
        assert_eq!(clear_history(&conn, "alice", None).unwrap(), 1);
        assert_eq!(verify_count(&conn).unwrap(), 1, "bob's entry survives");

        let events = get_user_events(&conn, "alice", 10).unwrap();
        assert_eq!(events[0].event_type, "history_cleared");
    }

    #[test]
    fn test_monthly_summary() {
        let conn = test_db();
        add(&conn, stamp(2024, 2, 28, 8), "alice", "bmi", json!({}));
        add(&conn, stamp(2024, 3, 1, 8), "alice", "gpa", json!({}));
        add(&conn, stamp(2024, 3, 2, 8), "alice", "bmi", json!({}));
        add(&conn, stamp(2024, 3, 3, 8), "alice", "bmi", json!({}));

        let summary = get_monthly_summary(&conn, "alice", 2024, 3).unwrap();
        assert_eq!(summary.total_calculations, 3);
        assert_eq!(summary.by_calculator.get("bmi"), Some(&2));
        assert_eq!(summary.most_used.as_deref(), Some("bmi"));

        let empty = get_monthly_summary(&conn, "alice", 2023, 3).unwrap();
        assert_eq!(empty.total_calculations, 0);
        assert!(empty.most_used.is_none());
    }

    #[test]
    fn test_analytics_data_for_bmi() {
        let conn = test_db();
        add(&conn, stamp(2024, 1, 1, 8), "alice", "bmi", json!({"bmi": 26.0, "category": "Overweight"}));
        add(&conn, stamp(2024, 2, 1, 8), "alice", "bmi", json!({"bmi": 24.0, "category": "Normal Weight"}));

        let data = get_analytics_data(&conn, "alice", "bmi").unwrap();
        assert_eq!(data.total_entries, 2);
        assert_eq!(data.date_range.start.as_deref(), Some("2024-01-01"));
        assert_eq!(data.date_range.end.as_deref(), Some("2024-02-01"));
        assert_eq!(data.trends.len(), 2);
        assert_eq!(data.statistics["average_bmi"], json!(25.0));
        assert_eq!(data.statistics["change"], json!(-2.0));
    }

    #[test]
    fn test_repeated_calculations_use_fingerprint() {
        let conn = test_db();
        add(&conn, stamp(2024, 1, 1, 8), "alice", "bmi", json!({}));
        add(&conn, stamp(2024, 1, 2, 8), "alice", "bmi", json!({}));
        add(&conn, stamp(2024, 1, 3, 8), "alice", "gpa", json!({}));

        let repeats = repeated_calculations(&conn, "alice").unwrap();
        assert_eq!(repeats, vec![("bmi".to_string(), 2)]);

        let a = HistoryEntry::new("x", "bmi", json!({"h": 1}), json!({}));
        assert_eq!(a.fingerprint().len(), 64, "SHA-256 hash should be 64 hex characters");
    }

    #[test]
    fn test_exports() {
        let conn = test_db();
        add(&conn, stamp(2024, 1, 1, 8), "alice", "math", json!({"result": 4}));

        let entries = get_user_history(&conn, "alice", None, None).unwrap();
        let csv = entries_to_csv(&entries).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,calculator_type,date,time,inputs,results"));
        assert!(lines.next().unwrap().contains("math"));

        let json_text = entries_to_json(&entries).unwrap();
        let parsed: Vec<HistoryEntry> = serde_json::from_str(&json_text).unwrap();
        assert_eq!(parsed, entries);
    }
}
