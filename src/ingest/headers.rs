// Header cleanup and the canonical column map
//
// GiveButter exports use human-readable headers ("Transaction Date (UTC)",
// "Business/Organization Name", ...). This module trims and deduplicates
// them, then resolves each one against HEADER_MAP. The first header that
// claims a canonical field wins; everything else passes through unchanged.

use std::collections::HashMap;

/// Bump when HEADER_MAP changes meaning
pub const HEADER_MAP_VERSION: u32 = 1;

/// Canonical donation fields a source column can map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Amount,
    ZipCode,
    FirstName,
    LastName,
    OrganizationName,
    Email,
    CampaignTitle,
}

/// Source header → canonical field (exact match after trimming)
pub const HEADER_MAP: &[(&str, Field)] = &[
    ("Transaction Date (UTC)", Field::Date),
    ("Date", Field::Date),
    ("Amount", Field::Amount),
    ("Donation Amount", Field::Amount),
    ("Postal Code", Field::ZipCode),
    ("ZIP", Field::ZipCode),
    ("First Name", Field::FirstName),
    ("Last Name", Field::LastName),
    ("Business/Organization Name", Field::OrganizationName),
    ("Email", Field::Email),
    ("Campaign Title", Field::CampaignTitle),
];

/// What each column of a table turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Mapped(Field),
    PassThrough(String),
}

/// Resolved header layout for one table
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    pub columns: Vec<Column>,
    /// Headers with no entry in HEADER_MAP
    pub unrecognized: Vec<String>,
}

impl ColumnPlan {
    /// Index of the column mapped onto `field`, if any
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| *c == Column::Mapped(field))
    }
}

/// Trim headers and name blank ones after their position
pub fn clean_headers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

/// Make header names unique: `name`, `name_2`, `name_3`, ...
pub fn deduplicate(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|h| {
            let count = seen.entry(h.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                h.clone()
            } else {
                format!("{}_{}", h, count)
            }
        })
        .collect()
}

pub fn lookup(header: &str) -> Option<Field> {
    HEADER_MAP
        .iter()
        .find(|(name, _)| *name == header)
        .map(|(_, field)| *field)
}

/// Clean, deduplicate and map a raw header row
pub fn plan_columns(raw: &[String]) -> ColumnPlan {
    let headers = deduplicate(&clean_headers(raw));
    let mut claimed: Vec<Field> = Vec::new();
    let mut columns = Vec::with_capacity(headers.len());
    let mut unrecognized = Vec::new();

    for header in headers {
        match lookup(&header) {
            Some(field) if !claimed.contains(&field) => {
                claimed.push(field);
                columns.push(Column::Mapped(field));
            }
            Some(field) => {
                log::warn!("Header '{}' maps to {:?} which is already claimed; keeping it as-is", header, field);
                columns.push(Column::PassThrough(header));
            }
            None => {
                log::debug!("Unrecognized header '{}' (map v{})", header, HEADER_MAP_VERSION);
                unrecognized.push(header.clone());
                columns.push(Column::PassThrough(header));
            }
        }
    }

    ColumnPlan { columns, unrecognized }
}
