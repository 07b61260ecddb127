//! Metrics Engine
//!
//! Pure aggregation passes over a store snapshot. Nothing here mutates the
//! store; every function takes `&[DonationRecord]` and returns typed rows.
//!
//! ## Module Organization
//! - `period` - Month / Quarter grouping keys
//! - `trend` - Monthly totals, cumulative trend, interval growth
//! - `campaign` - Campaign summary and year-over-year growth
//! - `geography` - ZIP totals and geocoded distribution
//! - `retention` - Overview stats, retention classification, quarterly churn
//! - `cohort` - Cohort retention and monetary matrices
//! - `pareto` - Donor concentration ranking and cutoff
//! - `distribution` - Donor type counts and gift size histogram
//!
//! Missing values are never treated as zero: a record with a missing field
//! is left out of every metric that depends on that field.

pub mod campaign;
pub mod cohort;
pub mod distribution;
pub mod geography;
pub mod pareto;
pub mod period;
pub mod retention;
pub mod trend;

pub use period::{Month, Quarter};

use serde::Serialize;

use crate::store::DonationRecord;

/// A percentage that may have no defined value (zero denominator)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rate {
    Defined(f64),
    Undefined,
}

impl Rate {
    /// `numerator / denominator × 100`, undefined when the denominator is 0
    pub fn percent(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 || !denominator.is_finite() {
            Rate::Undefined
        } else {
            Rate::Defined(numerator / denominator * 100.0)
        }
    }

    /// `(current − previous) / previous × 100`
    pub fn growth(previous: f64, current: f64) -> Self {
        Self::percent(current - previous, previous)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Rate::Defined(v) => Some(*v),
            Rate::Undefined => None,
        }
    }
}

/// Records with both a date and an amount
pub fn dated_gifts(records: &[DonationRecord]) -> impl Iterator<Item = &DonationRecord> {
    records.iter().filter(|r| r.date.is_some() && r.amount.is_some())
}

/// Records with both a date and a donor email
pub fn dated_donors(records: &[DonationRecord]) -> impl Iterator<Item = &DonationRecord> {
    records
        .iter()
        .filter(|r| r.date.is_some() && r.donor_email.is_some())
}
