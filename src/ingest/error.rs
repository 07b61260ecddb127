// File-level ingest failures
//
// Any of these skips the offending upload; other uploads keep going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("header row {row} is past the end of the data")]
    MissingHeaderRow { row: usize },
}
