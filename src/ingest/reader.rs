// Spreadsheet Readers
// Turns an uploaded file (workbook or CSV) into a header row plus raw cells.
//
// Workbooks: first sheet only, via calamine (xlsx, xlsm, xls, ods).
// CSV: every cell is text.
// In both cases rows above `header_row` are skipped (GiveButter exports put
// a title line above the header).

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;

use super::error::IngestError;

/// A single cell before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

pub(crate) static EMPTY_CELL: RawCell = RawCell::Empty;

/// Header row and data rows of one sheet
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Cell at (row, col), blank when the row is short
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Read a file from disk
pub fn read_path(path: &Path, header_row: usize) -> Result<RawTable, IngestError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    read_table(&name, &bytes, header_row)
}

/// Read uploaded bytes, picking the reader from the file name
pub fn read_table(file_name: &str, bytes: &[u8], header_row: usize) -> Result<RawTable, IngestError> {
    if file_name.to_lowercase().ends_with(".csv") {
        read_csv(bytes, header_row)
    } else {
        read_workbook(bytes, header_row)
    }
}

/// First sheet of a workbook
pub fn read_workbook(bytes: &[u8], header_row: usize) -> Result<RawTable, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet)?;

    // calamine ranges start at the first non-empty cell; header_row is a
    // physical row index, so translate it
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let start_row = start_row as usize;
    if header_row < start_row {
        return Err(IngestError::MissingHeaderRow { row: header_row });
    }

    let mut rows = range.rows().skip(header_row - start_row);
    let header_cells = rows
        .next()
        .ok_or(IngestError::MissingHeaderRow { row: header_row })?;

    let headers = header_cells
        .iter()
        .map(|c| match convert_cell(c) {
            RawCell::Text(s) => s,
            RawCell::Empty => String::new(),
            other => super::coerce::cell_text(&other).unwrap_or_default(),
        })
        .collect();

    let rows = rows
        .map(|r| r.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// CSV export with the same layout as the workbooks
pub fn read_csv(bytes: &[u8], header_row: usize) -> Result<RawTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records().skip(header_row);
    let headers: Vec<String> = match records.next() {
        Some(rec) => rec?.iter().map(|s| s.to_string()).collect(),
        None => return Err(IngestError::MissingHeaderRow { row: header_row }),
    };

    let mut rows = Vec::new();
    for rec in records {
        let rec = rec?;
        rows.push(
            rec.iter()
                .map(|s| {
                    if s.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => RawCell::DateTime(ndt),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(_) => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "Donations export,,\n\
First Name,Amount,Email\n\
Ada,25,ada@example.org\n\
,,\n\
Grace,abc,grace@example.org\n";

    #[test]
    fn test_read_csv_skips_title_row() {
        let table = read_table("export.csv", EXPORT.as_bytes(), 1).unwrap();
        assert_eq!(table.headers, vec!["First Name", "Amount", "Email"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.cell(0, 0), &RawCell::Text("Ada".to_string()));
        assert_eq!(table.cell(1, 1), &RawCell::Empty);
        assert_eq!(table.cell(2, 1), &RawCell::Text("abc".to_string()));
        assert_eq!(table.cell(9, 9), &RawCell::Empty);
    }

    #[test]
    fn test_read_csv_missing_header_row() {
        let err = read_table("short.csv", b"only one line\n", 1).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeaderRow { row: 1 }));
    }

    /// One-donation GiveButter sheet with the header at `header_at`
    fn workbook(title: bool, header_at: u32) -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        if title {
            sheet.write_string(0, 0, "GiveButter Transactions").unwrap();
        }
        let headers = ["First Name", "Amount", "Transaction Date (UTC)", "Postal Code"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(header_at, col as u16, *header).unwrap();
        }

        let row = header_at + 1;
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let date = ExcelDateTime::parse_from_str("2023-03-15T10:30:00").unwrap();
        sheet.write_string(row, 0, "Ada").unwrap();
        sheet.write_number(row, 1, 25.0).unwrap();
        sheet.write_datetime_with_format(row, 2, &date, &date_format).unwrap();
        sheet.write_number(row, 3, 2134.0).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    fn march_15() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2023, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_read_workbook_with_title_row() {
        let table = read_table("export.xlsx", &workbook(true, 1), 1).unwrap();
        assert_eq!(table.headers[0], "First Name");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 0), &RawCell::Text("Ada".to_string()));
        assert_eq!(table.cell(0, 1), &RawCell::Number(25.0));
        assert_eq!(table.cell(0, 2), &RawCell::DateTime(march_15()));
        assert_eq!(table.cell(0, 3), &RawCell::Number(2134.0));
    }

    #[test]
    fn test_read_workbook_without_title_row() {
        // Row 0 is blank, so calamine's range starts at the header row
        let table = read_table("export.xlsx", &workbook(false, 1), 1).unwrap();
        assert_eq!(table.headers[3], "Postal Code");
        assert_eq!(table.cell(0, 2), &RawCell::DateTime(march_15()));

        // Header on the first physical row
        let table = read_table("export.xlsx", &workbook(false, 0), 0).unwrap();
        assert_eq!(table.headers[1], "Amount");
        assert_eq!(table.rows.len(), 1);

        // A header row above the first populated row does not exist
        let err = read_table("export.xlsx", &workbook(false, 1), 0).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeaderRow { row: 0 }));
    }

    #[test]
    fn test_workbook_normalizes_date_and_zip() {
        let table = read_table("export.xlsx", &workbook(true, 1), 1).unwrap();
        let sheet = crate::ingest::normalize_table("export.xlsx", &table);
        let ada = &sheet.records[0];
        assert_eq!(ada.amount, Some(25.0));
        assert_eq!(ada.date, Some(march_15()));
        assert_eq!(ada.zip_code.as_deref(), Some("02134"));
    }

    #[test]
    fn test_corrupt_workbook_is_an_error() {
        let err = read_table("broken.xlsx", b"definitely not a zip archive", 1).unwrap_err();
        assert!(matches!(err, IngestError::Workbook(_)));
    }

    #[test]
    fn test_read_path_missing_file() {
        let err = read_path(Path::new("/nonexistent/donations.xlsx"), 1).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
