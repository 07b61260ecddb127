//! Report settings
//!
//! This module handles:
//! - Settings: tunables for ingest and the report tables, with defaults
//! - load_settings: read an optional JSON settings file
//! - get / set: string key-value access used by the settings commands

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const PARETO_TARGET_RANGE: (f64, f64) = (10.0, 100.0);
pub const BIN_WIDTH_RANGE: (f64, f64) = (5.0, 500.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zero-based row holding the column headers
    pub header_row: usize,
    pub pareto_target_pct: f64,
    /// Rows shown in detail tables (0 = all)
    pub detail_rows: usize,
    pub zip_top_n: usize,
    pub histogram_bin_width: f64,
    pub histogram_max_amount: f64,
    pub geonames_country: String,
    pub geonames_max_age_days: u32,
    /// Where the GeoNames cache lives; geocoding is off when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_row: 1,
            pareto_target_pct: 80.0,
            detail_rows: 10,
            zip_top_n: 20,
            histogram_bin_width: 50.0,
            histogram_max_amount: 1000.0,
            geonames_country: "US".to_string(),
            geonames_max_age_days: 30,
            data_dir: None,
        }
    }
}

pub const SETTING_KEYS: &[&str] = &[
    "header_row",
    "pareto_target_pct",
    "detail_rows",
    "zip_top_n",
    "histogram_bin_width",
    "histogram_max_amount",
    "geonames_country",
    "geonames_max_age_days",
    "data_dir",
];

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        check_range("pareto_target_pct", self.pareto_target_pct, PARETO_TARGET_RANGE)?;
        check_range("histogram_bin_width", self.histogram_bin_width, BIN_WIDTH_RANGE)?;
        if !self.histogram_max_amount.is_finite() || self.histogram_max_amount <= 0.0 {
            return Err("histogram_max_amount must be a positive number".to_string());
        }
        if self.geonames_country.len() != 2 || !self.geonames_country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!(
                "geonames_country must be a two-letter country code, got '{}'",
                self.geonames_country
            ));
        }
        Ok(())
    }

    /// Current value of `key` rendered as text
    pub fn get(&self, key: &str) -> Result<Option<String>, String> {
        let value = match key {
            "header_row" => self.header_row.to_string(),
            "pareto_target_pct" => self.pareto_target_pct.to_string(),
            "detail_rows" => self.detail_rows.to_string(),
            "zip_top_n" => self.zip_top_n.to_string(),
            "histogram_bin_width" => self.histogram_bin_width.to_string(),
            "histogram_max_amount" => self.histogram_max_amount.to_string(),
            "geonames_country" => self.geonames_country.clone(),
            "geonames_max_age_days" => self.geonames_max_age_days.to_string(),
            "data_dir" => match &self.data_dir {
                Some(dir) => dir.display().to_string(),
                None => return Ok(None),
            },
            _ => return Err(format!("Unknown setting: {}", key)),
        };
        Ok(Some(value))
    }

    /// Parse and apply `value` to `key`; the settings are unchanged on error
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut next = self.clone();
        let value = value.trim();

        match key {
            "header_row" => next.header_row = parse_value(key, value)?,
            "pareto_target_pct" => next.pareto_target_pct = parse_value(key, value)?,
            "detail_rows" => next.detail_rows = parse_value(key, value)?,
            "zip_top_n" => next.zip_top_n = parse_value(key, value)?,
            "histogram_bin_width" => next.histogram_bin_width = parse_value(key, value)?,
            "histogram_max_amount" => next.histogram_max_amount = parse_value(key, value)?,
            "geonames_country" => next.geonames_country = value.to_uppercase(),
            "geonames_max_age_days" => next.geonames_max_age_days = parse_value(key, value)?,
            "data_dir" => {
                next.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => return Err(format!("Unknown setting: {}", key)),
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Limit for detail tables, `None` meaning unlimited
    pub fn detail_limit(&self) -> Option<usize> {
        (self.detail_rows > 0).then_some(self.detail_rows)
    }
}

/// Load settings from a JSON file, missing keys falling back to defaults
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;
    let settings: Settings = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid settings file {}: {}", path.display(), e))?;
    settings.validate()?;

    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: '{}'", key, value))
}

fn check_range(key: &str, value: f64, (min, max): (f64, f64)) -> Result<(), String> {
    if value.is_nan() || value < min || value > max {
        return Err(format!("{} must be between {} and {}, got {}", key, min, max, value));
    }
    Ok(())
}
