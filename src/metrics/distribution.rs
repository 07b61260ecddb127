// Donor type counts and gift size histogram

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::{DonationRecord, DonorType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorTypeCount {
    pub donor_type: DonorType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive
    pub lower: f64,
    /// Exclusive
    pub upper: f64,
    pub count: usize,
}

/// Donations with a known amount, counted by donor type (largest first)
pub fn donor_types(records: &[DonationRecord]) -> Vec<DonorTypeCount> {
    let mut counts: BTreeMap<DonorType, usize> = BTreeMap::new();
    for record in records.iter().filter(|r| r.amount.is_some()) {
        *counts.entry(record.donor_type()).or_insert(0) += 1;
    }

    let mut rows: Vec<DonorTypeCount> = counts
        .into_iter()
        .map(|(donor_type, count)| DonorTypeCount { donor_type, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Gift sizes up to `max_amount`, in bins of `bin_width` aligned to zero
///
/// Empty bins are omitted. A non-positive width yields no bins.
pub fn amount_histogram(records: &[DonationRecord], bin_width: f64, max_amount: f64) -> Vec<HistogramBin> {
    if bin_width.is_nan() || bin_width <= 0.0 {
        return Vec::new();
    }

    let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
    for amount in records.iter().filter_map(|r| r.amount) {
        if amount > max_amount {
            continue;
        }
        let slot = (amount / bin_width).floor() as i64;
        *bins.entry(slot).or_insert(0) += 1;
    }

    bins.into_iter()
        .map(|(slot, count)| HistogramBin {
            lower: slot as f64 * bin_width,
            upper: (slot + 1) as f64 * bin_width,
            count,
        })
        .collect()
}
