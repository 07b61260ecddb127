//! Donation Store
//!
//! In-memory accumulator for one analysis session. Normalized tables are
//! appended per source file and withdrawn per source file; nothing is
//! persisted once the session ends.

pub mod record;

pub use record::{DonationRecord, DonorType};

use std::collections::HashSet;

/// Cumulative donation table for a single session
#[derive(Debug, Default, Clone)]
pub struct DonationStore {
    records: Vec<DonationRecord>,
    /// Registered source files, in the order they were added
    files: Vec<String>,
}

impl DonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records of a newly uploaded file.
    ///
    /// Returns false (and changes nothing) when `file_name` is already
    /// registered, so repeated upload events never double count.
    pub fn add(&mut self, file_name: &str, records: Vec<DonationRecord>) -> bool {
        if self.contains(file_name) {
            log::debug!("Store: {} already registered, skipping", file_name);
            return false;
        }

        let before = self.records.len();
        let mut rejected = 0usize;
        for record in records {
            if record.source_file != file_name || !record.is_attributable() {
                rejected += 1;
                continue;
            }
            self.records.push(record);
        }
        if rejected > 0 {
            log::warn!("Store: rejected {} malformed records from {}", rejected, file_name);
        }

        self.files.push(file_name.to_string());
        log::info!(
            "Store: added {} records from {} ({} total)",
            self.records.len() - before,
            file_name,
            self.records.len()
        );
        true
    }

    /// Withdraw every record belonging to the given files.
    ///
    /// Unknown names are treated as already removed. Returns the number of
    /// records deleted.
    pub fn remove<S: AsRef<str>>(&mut self, file_names: &[S]) -> usize {
        let doomed: HashSet<&str> = file_names.iter().map(|s| s.as_ref()).collect();
        if doomed.is_empty() {
            return 0;
        }

        let before = self.records.len();
        self.records.retain(|r| !doomed.contains(r.source_file.as_str()));
        self.files.retain(|f| !doomed.contains(f.as_str()));

        let removed = before - self.records.len();
        log::info!("Store: removed {} records from {} file(s)", removed, doomed.len());
        removed
    }

    /// Current table, in the order records were added
    pub fn snapshot(&self) -> &[DonationRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.files.clear();
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.iter().any(|f| f == file_name)
    }

    pub fn file_names(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
