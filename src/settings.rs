use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FinboardError, Result};
use crate::fmt::DisplayFormat;

/// Names of the three sheets read from the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub accounts: String,
    pub payments: String,
    pub receipts: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            accounts: "Chart of Accounts".to_string(),
            payments: "Payments".to_string(),
            receipts: "Receipts".to_string(),
        }
    }
}

/// Column headers the pipeline reads. Reference-sheet headers are compared
/// after trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub transaction_account_code: String,
    pub reference_account_code: String,
    pub supplier: String,
    pub issue_date: String,
    pub paid_amount: String,
    pub received_amount: String,
    pub account_category: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            transaction_account_code: "Account Code".to_string(),
            reference_account_code: "Account Code".to_string(),
            supplier: "Supplier".to_string(),
            issue_date: "Issue Date".to_string(),
            paid_amount: "Amount Paid".to_string(),
            received_amount: "Amount Received".to_string(),
            account_category: "Level-3 Account".to_string(),
        }
    }
}

/// What to do with a transaction whose issue date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDatePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub workbook: String,
    #[serde(default)]
    pub sheets: SheetNames,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub format: DisplayFormat,
    #[serde(default)]
    pub invalid_dates: InvalidDatePolicy,
    #[serde(default = "default_unclassified_label")]
    pub unclassified_label: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_unclassified_label() -> String {
    "Unclassified".to_string()
}

fn default_page_size() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workbook: String::new(),
            sheets: SheetNames::default(),
            columns: ColumnNames::default(),
            format: DisplayFormat::default(),
            invalid_dates: InvalidDatePolicy::default(),
            unclassified_label: default_unclassified_label(),
            page_size: default_page_size(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finboard")
}

/// `FINBOARD_CONFIG` overrides the default `~/.config/finboard/settings.json`.
pub fn settings_path() -> PathBuf {
    match std::env::var_os("FINBOARD_CONFIG") {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => config_dir().join("settings.json"),
    }
}

/// Read settings from disk. A missing file yields defaults; a malformed one is an error.
pub fn load_settings() -> Result<Settings> {
    let path = settings_path();
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    parse_settings(&content)
        .map_err(|e| FinboardError::Settings(format!("{}: {e}", path.display())))
}

fn parse_settings(content: &str) -> std::result::Result<Settings, String> {
    let settings: Settings = serde_json::from_str(content).map_err(|e| e.to_string())?;
    settings.format.validate()?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FinboardError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.workbook.is_empty());
        assert_eq!(s.sheets.accounts, "Chart of Accounts");
        assert_eq!(s.page_size, 10);
        assert_eq!(s.invalid_dates, InvalidDatePolicy::Abort);
        assert_eq!(s.format.currency_prefix, "$");
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let json = r#"{
            "workbook": "/tmp/book.xlsx",
            "columns": {"supplier": "Fornecedor"},
            "format": {"currency_prefix": "R$ "},
            "invalid_dates": "skip"
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.workbook, "/tmp/book.xlsx");
        assert_eq!(s.columns.supplier, "Fornecedor");
        assert_eq!(s.columns.issue_date, "Issue Date");
        assert_eq!(s.format.currency_prefix, "R$ ");
        assert_eq!(s.format.decimal_separator, ".");
        assert_eq!(s.invalid_dates, InvalidDatePolicy::Skip);
        assert_eq!(s.unclassified_label, "Unclassified");
    }

    #[test]
    fn test_invalid_date_pattern_is_rejected() {
        let err = parse_settings(r#"{"format": {"display_date": "%Q"}}"#).unwrap_err();
        assert!(err.contains("display_date"));
        let s = parse_settings(r#"{"format": {"display_date": "%Y-%m-%d"}}"#).unwrap();
        assert_eq!(s.format.display_date, "%Y-%m-%d");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            workbook: "/data/book.xlsx".to_string(),
            page_size: 25,
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let loaded: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, settings);
    }
}
