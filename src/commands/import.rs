//! Upload commands
//!
//! This module handles:
//! - import_files: Normalize uploaded exports and add them to the session
//! - import_paths: Same, for files on disk
//! - sync_uploads: Mirror the uploader's current file list into the store
//! - remove_files / clear_session / list_files: Store housekeeping

use std::path::PathBuf;

use serde::Serialize;

use super::state::Session;
use crate::ingest::{self, IngestError, NormalizedSheet};

// ============================================================================
// Data Types
// ============================================================================

/// One uploaded file: its display name and raw bytes
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub imported_files: Vec<String>,
    /// Already registered, left untouched
    pub skipped_duplicates: Vec<String>,
    pub imported_records: usize,
    pub dropped_rows: usize,
    pub unrecognized_headers: Vec<String>,
    pub failures: Vec<FileFailure>,
    /// Names removed because they left the uploader (sync_uploads only)
    pub removed_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileList {
    pub files: Vec<String>,
    pub record_count: usize,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fold one file's outcome into the running result
fn apply_sheet(
    session: &mut Session,
    result: &mut ImportResult,
    file_name: &str,
    outcome: Result<NormalizedSheet, IngestError>,
) {
    let sheet = match outcome {
        Ok(sheet) => sheet,
        Err(e) => {
            log::warn!("Skipping {}: {}", file_name, e);
            result.failures.push(FileFailure {
                file_name: file_name.to_string(),
                error: e.to_string(),
            });
            return;
        }
    };

    let record_count = sheet.records.len();
    if !session.store.add(&sheet.source_file, sheet.records) {
        result.skipped_duplicates.push(sheet.source_file);
        return;
    }

    result.imported_records += record_count;
    result.dropped_rows += sheet.stats.dropped_rows;
    for header in sheet.stats.unrecognized_headers {
        if !result.unrecognized_headers.contains(&header) {
            result.unrecognized_headers.push(header);
        }
    }
    result.imported_files.push(sheet.source_file);
}

fn log_result(result: &ImportResult) {
    log::info!(
        "Import complete: {} files, {} records, {} dropped rows, {} duplicates, {} failures",
        result.imported_files.len(),
        result.imported_records,
        result.dropped_rows,
        result.skipped_duplicates.len(),
        result.failures.len()
    );
}

// ============================================================================
// Commands
// ============================================================================

/// Import uploaded files; a failing file never stops the others
pub fn import_files(session: &mut Session, uploads: &[Upload]) -> Result<ImportResult, String> {
    let header_row = session.settings.header_row;
    let mut result = ImportResult::default();

    for upload in uploads {
        // Duplicates are skipped before any parsing
        if session.store.contains(&upload.name) {
            log::debug!("{} already loaded", upload.name);
            result.skipped_duplicates.push(upload.name.clone());
            continue;
        }
        let outcome = ingest::load_upload(&upload.name, &upload.bytes, header_row);
        apply_sheet(session, &mut result, &upload.name, outcome);
    }

    log_result(&result);
    Ok(result)
}

/// Import files from disk, named by their file name
pub fn import_paths(session: &mut Session, paths: &[PathBuf]) -> Result<ImportResult, String> {
    let header_row = session.settings.header_row;
    let mut result = ImportResult::default();

    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if session.store.contains(&file_name) {
            log::debug!("{} already loaded", file_name);
            result.skipped_duplicates.push(file_name);
            continue;
        }
        let outcome = ingest::load_path(path, header_row);
        apply_sheet(session, &mut result, &file_name, outcome);
    }

    log_result(&result);
    Ok(result)
}

/// Make the store mirror the uploader
///
/// Files that were in the previous upload set but not in this one are
/// removed first; new names are then imported.
pub fn sync_uploads(session: &mut Session, uploads: &[Upload]) -> Result<ImportResult, String> {
    let current: Vec<String> = uploads.iter().map(|u| u.name.clone()).collect();
    let withdrawn: Vec<String> = session
        .last_uploaded
        .iter()
        .filter(|name| !current.contains(name))
        .cloned()
        .collect();

    if !withdrawn.is_empty() {
        let removed = session.store.remove(&withdrawn);
        log::info!("Removed {} records from {} withdrawn files", removed, withdrawn.len());
    }

    let mut result = import_files(session, uploads)?;
    result.removed_files = withdrawn;
    session.last_uploaded = current;
    Ok(result)
}

/// Remove files by name, returning the number of records deleted
pub fn remove_files(session: &mut Session, file_names: &[String]) -> Result<usize, String> {
    let removed = session.store.remove(file_names);
    session.last_uploaded.retain(|name| !file_names.contains(name));
    Ok(removed)
}

/// Drop every record and file; settings and geocoder survive
pub fn clear_session(session: &mut Session) -> Result<(), String> {
    log::info!("Clearing session {}", session.id);
    session.store.clear();
    session.last_uploaded.clear();
    Ok(())
}

pub fn list_files(session: &Session) -> Result<FileList, String> {
    Ok(FileList {
        files: session.store.file_names().to_vec(),
        record_count: session.store.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, rows: &[&str]) -> Upload {
        let mut text = String::from("Export,,,\nFirst Name,Email,Amount,Transaction Date (UTC),Source\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        Upload {
            name: name.to_string(),
            bytes: text.into_bytes(),
        }
    }

    fn jan() -> Upload {
        upload(
            "jan.csv",
            &[
                "Ada,ada@example.org,100,2023-01-10",
                "Grace,grace@example.org,50,2023-01-20",
                ",nobody@example.org,5,2023-01-21",
            ],
        )
    }

    fn feb() -> Upload {
        upload("feb.csv", &["Ada,ada@example.org,25,2023-02-01"])
    }

    #[test]
    fn test_import_files() {
        let mut session = Session::default();
        let result = import_files(&mut session, &[jan(), feb()]).unwrap();

        assert_eq!(result.imported_files, vec!["jan.csv", "feb.csv"]);
        assert_eq!(result.imported_records, 3);
        assert_eq!(result.dropped_rows, 1);
        assert_eq!(result.unrecognized_headers, vec!["Source"]);
        assert!(result.failures.is_empty());
        assert_eq!(session.store.len(), 3);
    }

    #[test]
    fn test_duplicate_upload_is_noop() {
        let mut session = Session::default();
        import_files(&mut session, &[jan()]).unwrap();
        let before = session.store.snapshot().to_vec();

        let result = import_files(&mut session, &[jan()]).unwrap();
        assert_eq!(result.skipped_duplicates, vec!["jan.csv"]);
        assert!(result.imported_files.is_empty());
        assert_eq!(session.store.snapshot(), before.as_slice());
    }

    #[test]
    fn test_bad_file_does_not_stop_others() {
        let mut session = Session::default();
        let broken = Upload {
            name: "broken.xlsx".to_string(),
            bytes: b"not a workbook".to_vec(),
        };
        let result = import_files(&mut session, &[broken, feb()]).unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].file_name, "broken.xlsx");
        assert_eq!(result.imported_files, vec!["feb.csv"]);
        assert!(!session.store.contains("broken.xlsx"));
    }

    #[test]
    fn test_sync_removes_withdrawn_files() {
        let mut session = Session::default();
        sync_uploads(&mut session, &[jan(), feb()]).unwrap();
        assert_eq!(session.store.len(), 3);

        let result = sync_uploads(&mut session, &[feb()]).unwrap();
        assert_eq!(result.removed_files, vec!["jan.csv"]);
        assert_eq!(result.skipped_duplicates, vec!["feb.csv"]);
        assert_eq!(session.store.len(), 1);
        assert!(session.store.snapshot().iter().all(|r| r.source_file == "feb.csv"));

        // Re-adding a withdrawn file is accepted
        let result = sync_uploads(&mut session, &[feb(), jan()]).unwrap();
        assert_eq!(result.imported_files, vec!["jan.csv"]);
        assert_eq!(session.store.len(), 3);
    }

    #[test]
    fn test_import_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jan.csv");
        std::fs::write(&path, jan().bytes).unwrap();
        let missing = dir.path().join("missing.csv");

        let mut session = Session::default();
        let result = import_paths(&mut session, &[path, missing]).unwrap();
        assert_eq!(result.imported_files, vec!["jan.csv"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].file_name, "missing.csv");
    }

    #[test]
    fn test_remove_list_and_clear() {
        let mut session = Session::default();
        sync_uploads(&mut session, &[jan(), feb()]).unwrap();

        let removed = remove_files(&mut session, &["jan.csv".to_string(), "other.csv".to_string()]).unwrap();
        assert_eq!(removed, 2);
        let list = list_files(&session).unwrap();
        assert_eq!(list.files, vec!["feb.csv"]);
        assert_eq!(list.record_count, 1);
        assert_eq!(session.last_uploaded, vec!["feb.csv"]);

        clear_session(&mut session).unwrap();
        assert!(session.store.is_empty());
        assert!(list_files(&session).unwrap().files.is_empty());
    }
}
