// Donation Record
// One row per transaction, produced by the ingest normalizer.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Donor classification derived from the organization name field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DonorType {
    Individual,
    Organization,
}

/// A single normalized donation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Name of the upload this row came from
    pub source_file: String,
    pub donor_email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization_name: Option<String>,
    /// Missing when the source value could not be read as a number
    pub amount: Option<f64>,
    /// Missing when the source value could not be read as a timestamp
    pub date: Option<NaiveDateTime>,
    pub campaign_title: Option<String>,
    /// Zero-padded to 5 characters
    pub zip_code: Option<String>,
    /// Source columns without a canonical mapping, keyed by their header
    pub extra_fields: BTreeMap<String, String>,
}

impl DonationRecord {
    pub fn donor_type(&self) -> DonorType {
        if self.organization_name.is_some() {
            DonorType::Organization
        } else {
            DonorType::Individual
        }
    }

    /// Display name: "First Last" for individuals, organization name otherwise
    pub fn donor_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            _ => self.organization_name.clone(),
        }
    }

    /// Rows need a first name or an organization name to count as donations
    pub fn is_attributable(&self) -> bool {
        self.first_name.is_some() || self.organization_name.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.donor_email.as_deref()
    }
}
