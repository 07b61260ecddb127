//! Field Coercion
//!
//! Best-effort conversion of raw cells into typed donation fields. A value
//! that cannot be read becomes `None` ("missing"); it is never turned into
//! zero and never drops the row.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use super::reader::RawCell;

/// Timestamp layouts seen in donation exports, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Largest Excel serial date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Cell contents as trimmed text, `None` for blanks
pub fn cell_text(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        RawCell::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(n.to_string())
            }
        }
        RawCell::Bool(b) => Some(b.to_string()),
        RawCell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

/// Donation amount; text must be a plain decimal number
pub fn coerce_amount(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(n) => *n,
        RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Transaction timestamp, normalized to naive UTC
pub fn coerce_date(cell: &RawCell) -> Option<NaiveDateTime> {
    match cell {
        RawCell::DateTime(dt) => Some(*dt),
        RawCell::Number(n) => excel_serial_to_datetime(*n),
        RawCell::Text(s) => parse_datetime_text(s),
        _ => None,
    }
}

/// Convert an Excel serial date (days since 1899-12-30) to a timestamp
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Parse a timestamp string in any of the supported layouts
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let clean = text.trim();
    if clean.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(clean) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(clean, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(clean, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// ZIP code, left-padded with zeros to 5 characters
pub fn coerce_zip(cell: &RawCell) -> Option<String> {
    let text = match cell {
        RawCell::Number(n) if n.fract() == 0.0 && *n >= 0.0 => format!("{}", *n as u64),
        other => cell_text(other)?,
    };
    Some(pad_zip(&text))
}

pub fn pad_zip(zip: &str) -> String {
    format!("{:0>5}", zip.trim())
}
