// ⚙️ Configuration - defaults, optional JSON file, environment overrides
// Load order: defaults → $MULTI_CALC_CONFIG (if set) → MULTI_CALC_* variables

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_ENV: &str = "MULTI_CALC_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite history file
    pub database_path: String,
    pub bind_address: String,
    /// Public URL used in share links
    pub share_base_url: String,
    /// Default tracing filter directive
    pub log_level: String,
    pub log_json: bool,
    pub report_page_lines: usize,
    /// User id when the caller does not supply one
    pub default_user: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: "multi_calc_history.db".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            share_base_url: "https://your-calculator-app.com".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            report_page_lines: 40,
            default_user: "local".to_string(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Apply `MULTI_CALC_*` overrides from a variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 5] = [
            ("MULTI_CALC_DB", &mut self.database_path),
            ("MULTI_CALC_ADDR", &mut self.bind_address),
            ("MULTI_CALC_SHARE_URL", &mut self.share_base_url),
            ("MULTI_CALC_LOG", &mut self.log_level),
            ("MULTI_CALC_USER", &mut self.default_user),
        ];
        for (name, field) in overrides {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.trim().is_empty() {
            bail!("database_path must not be empty");
        }
        if self.bind_address.trim().is_empty() {
            bail!("bind_address must not be empty");
        }
        if self.report_page_lines == 0 {
            bail!("report_page_lines must be at least 1");
        }
        Ok(())
    }

    /// Full load from the process environment
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => AppConfig::from_file(&path)?,
            _ => AppConfig::default(),
        };
        let config = base.with_overrides(|name| std::env::var(name).ok());
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.report_page_lines, 40);
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MULTI_CALC_DB", "/tmp/calc.db"),
            ("MULTI_CALC_USER", "alice"),
            ("MULTI_CALC_ADDR", "  "),
        ]);
        let config = AppConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database_path, "/tmp/calc.db");
        assert_eq!(config.default_user, "alice");
        // blank values are ignored
        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_from_file_partial_and_invalid() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("multi_calc_cfg_{}.json", uuid::Uuid::new_v4()));
        fs::write(&good, r#"{"report_page_lines": 25, "log_json": true}"#).unwrap();
        let config = AppConfig::from_file(&good).unwrap();
        assert_eq!(config.report_page_lines, 25);
        assert!(config.log_json);
        assert_eq!(config.default_user, "local");
        fs::remove_file(&good).unwrap();

        let bad = dir.join(format!("multi_calc_cfg_{}.json", uuid::Uuid::new_v4()));
        fs::write(&bad, "{not json").unwrap();
        assert!(AppConfig::from_file(&bad).is_err());
        fs::remove_file(&bad).unwrap();

        assert!(AppConfig::from_file(dir.join("does-not-exist.json")).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page_lines() {
        let config = AppConfig {
            report_page_lines: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
