// Donation export ingestion
// Reads GiveButter spreadsheet exports and normalizes them into donation records.

pub mod coerce;
pub mod error;
pub mod headers;
pub mod normalizer;
pub mod reader;

pub use error::IngestError;
pub use headers::{Field, HEADER_MAP, HEADER_MAP_VERSION};
pub use normalizer::{normalize_table, NormalizeStats, NormalizedSheet};
pub use reader::{RawCell, RawTable};

use std::path::Path;

/// Read and normalize uploaded bytes
pub fn load_upload(file_name: &str, bytes: &[u8], header_row: usize) -> Result<NormalizedSheet, IngestError> {
    let table = reader::read_table(file_name, bytes, header_row)?;
    Ok(normalize_table(file_name, &table))
}

/// Read and normalize a file on disk; the source name is the file name
pub fn load_path(path: &Path, header_row: usize) -> Result<NormalizedSheet, IngestError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let table = reader::read_path(path, header_row)?;
    Ok(normalize_table(&name, &table))
}
