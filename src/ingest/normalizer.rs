// Row Normalizer
// Raw table → canonical donation records for a single upload.

use std::collections::BTreeMap;

use serde::Serialize;

use super::coerce::{cell_text, coerce_amount, coerce_date, coerce_zip};
use super::headers::{plan_columns, Column, ColumnPlan, Field};
use super::reader::{RawCell, RawTable, EMPTY_CELL};
use crate::store::DonationRecord;

/// Result of normalizing one upload
#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
    pub source_file: String,
    pub records: Vec<DonationRecord>,
    pub stats: NormalizeStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeStats {
    pub total_rows: usize,
    /// Rows without a first name or organization name
    pub dropped_rows: usize,
    pub missing_amounts: usize,
    pub missing_dates: usize,
    pub unrecognized_headers: Vec<String>,
}

/// Normalize every row of `table`, stamping `source_file`
pub fn normalize_table(source_file: &str, table: &RawTable) -> NormalizedSheet {
    let plan = plan_columns(&table.headers);

    let mut stats = NormalizeStats {
        total_rows: table.rows.len(),
        unrecognized_headers: plan.unrecognized.clone(),
        ..Default::default()
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        match normalize_row(source_file, &plan, table, row) {
            Some(record) => {
                if record.amount.is_none() {
                    stats.missing_amounts += 1;
                }
                if record.date.is_none() {
                    stats.missing_dates += 1;
                }
                records.push(record);
            }
            None => stats.dropped_rows += 1,
        }
    }

    log::info!(
        "Normalized {}: {} rows, {} kept, {} dropped, {} missing amounts, {} missing dates",
        source_file,
        stats.total_rows,
        records.len(),
        stats.dropped_rows,
        stats.missing_amounts,
        stats.missing_dates
    );

    NormalizedSheet {
        source_file: source_file.to_string(),
        records,
        stats,
    }
}

fn normalize_row(
    source_file: &str,
    plan: &ColumnPlan,
    table: &RawTable,
    row: usize,
) -> Option<DonationRecord> {
    let field = |f: Field| cell_for(plan, table, row, f);

    let first_name = cell_text(field(Field::FirstName));
    let organization_name = cell_text(field(Field::OrganizationName));

    // Blank trailer rows and other non-donation artifacts
    if first_name.is_none() && organization_name.is_none() {
        return None;
    }

    let mut extra_fields = BTreeMap::new();
    for (col, column) in plan.columns.iter().enumerate() {
        if let Column::PassThrough(header) = column {
            if let Some(value) = cell_text(table.cell(row, col)) {
                extra_fields.insert(header.clone(), value);
            }
        }
    }

    Some(DonationRecord {
        source_file: source_file.to_string(),
        donor_email: cell_text(field(Field::Email)),
        first_name,
        last_name: cell_text(field(Field::LastName)),
        organization_name,
        amount: coerce_amount(field(Field::Amount)),
        date: coerce_date(field(Field::Date)),
        campaign_title: cell_text(field(Field::CampaignTitle)),
        zip_code: coerce_zip(field(Field::ZipCode)),
        extra_fields,
    })
}

fn cell_for<'a>(plan: &ColumnPlan, table: &'a RawTable, row: usize, field: Field) -> &'a RawCell {
    match plan.position(field) {
        Some(col) => table.cell(row, col),
        None => &EMPTY_CELL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DonorType;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn sample_table() -> RawTable {
        RawTable {
            headers: vec![
                "First Name".to_string(),
                "Business/Organization Name".to_string(),
                "Email".to_string(),
                "Amount".to_string(),
                "Transaction Date (UTC)".to_string(),
                "Campaign Title".to_string(),
                "Postal Code".to_string(),
                "Payment Method".to_string(),
            ],
            rows: vec![
                vec![
                    text("Ada"),
                    RawCell::Empty,
                    text("ada@example.org"),
                    RawCell::Number(100.0),
                    text("2023-01-15 10:00:00"),
                    text("Spring Gala 2023"),
                    RawCell::Number(2134.0),
                    text("card"),
                ],
                vec![
                    RawCell::Empty,
                    text("Acme Foundation"),
                    text("grants@acme.org"),
                    text("not a number"),
                    text("garbage"),
                    RawCell::Empty,
                    RawCell::Empty,
                ],
                // Trailer row with no donor
                vec![RawCell::Empty, RawCell::Empty, RawCell::Empty, RawCell::Number(999.0)],
            ],
        }
    }

    #[test]
    fn test_normalize_table() {
        let sheet = normalize_table("jan.xlsx", &sample_table());
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.stats.total_rows, 3);
        assert_eq!(sheet.stats.dropped_rows, 1);
        assert_eq!(sheet.stats.missing_amounts, 1);
        assert_eq!(sheet.stats.missing_dates, 1);
        assert_eq!(sheet.stats.unrecognized_headers, vec!["Payment Method".to_string()]);

        let ada = &sheet.records[0];
        assert_eq!(ada.source_file, "jan.xlsx");
        assert_eq!(ada.amount, Some(100.0));
        assert!(ada.date.is_some());
        assert_eq!(ada.zip_code.as_deref(), Some("02134"));
        assert_eq!(ada.donor_type(), DonorType::Individual);
        assert_eq!(ada.extra_fields.get("Payment Method").map(String::as_str), Some("card"));

        let acme = &sheet.records[1];
        assert_eq!(acme.donor_type(), DonorType::Organization);
        assert_eq!(acme.amount, None);
        assert_eq!(acme.date, None);
        assert_eq!(acme.campaign_title, None);
    }

    #[test]
    fn test_table_without_name_columns_drops_everything() {
        let table = RawTable {
            headers: vec!["Amount".to_string()],
            rows: vec![vec![RawCell::Number(5.0)]],
        };
        let sheet = normalize_table("odd.csv", &table);
        assert!(sheet.records.is_empty());
        assert_eq!(sheet.stats.dropped_rows, 1);
    }
}
