// Donor retention
//
// Headline overview numbers, per-donor New/Returning classification and
// quarter-over-quarter churn. Donors are keyed by email; records without
// an email are not attributed to any donor.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{dated_donors, Quarter, Rate};
use crate::store::{DonationRecord, DonorType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub total_raised: f64,
    pub donation_count: usize,
    pub unique_donors: usize,
    /// Donors (by email) with more than one donation
    pub repeat_donors: usize,
    /// Donations made by organizations
    pub organization_donations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RetentionStatus {
    New,
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorRetention {
    pub donor_email: String,
    /// Name on the donor's first record
    pub donor_name: Option<String>,
    pub first_date: Option<NaiveDateTime>,
    pub last_date: Option<NaiveDateTime>,
    pub donation_count: usize,
    pub status: RetentionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetentionBreakdown {
    pub new: usize,
    pub returning: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterChurn {
    pub quarter: Quarter,
    /// Active this quarter, absent the next
    pub churned: usize,
    /// Active this quarter and the next
    pub retained: usize,
    pub previously_active: usize,
    pub churn_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnSummary {
    /// Mean of the defined quarterly rates
    pub average_rate: Rate,
    pub best_quarter: Option<QuarterChurn>,
    pub worst_quarter: Option<QuarterChurn>,
}

pub fn overview(records: &[DonationRecord]) -> OverviewStats {
    let mut per_donor: HashMap<&str, usize> = HashMap::new();
    for email in records.iter().filter_map(|r| r.email()) {
        *per_donor.entry(email).or_insert(0) += 1;
    }

    OverviewStats {
        total_raised: records.iter().filter_map(|r| r.amount).sum(),
        donation_count: records.len(),
        unique_donors: per_donor.len(),
        repeat_donors: per_donor.values().filter(|&&n| n > 1).count(),
        organization_donations: records
            .iter()
            .filter(|r| r.donor_type() == DonorType::Organization)
            .count(),
    }
}

/// One row per donor: first/last known date, donation count, status
///
/// Only dated records count as donations here, so a gift with an
/// unreadable date cannot make a donor returning.
pub fn classify_retention(records: &[DonationRecord]) -> Vec<DonorRetention> {
    let mut donors: BTreeMap<&str, DonorRetention> = BTreeMap::new();

    for record in records {
        let Some(email) = record.email() else { continue };
        let entry = donors.entry(email).or_insert_with(|| DonorRetention {
            donor_email: email.to_string(),
            donor_name: record.donor_name(),
            first_date: None,
            last_date: None,
            donation_count: 0,
            status: RetentionStatus::New,
        });

        if let Some(date) = record.date {
            entry.donation_count += 1;
            entry.first_date = Some(entry.first_date.map_or(date, |d| d.min(date)));
            entry.last_date = Some(entry.last_date.map_or(date, |d| d.max(date)));
        }
    }

    donors
        .into_values()
        .map(|mut d| {
            d.status = if d.donation_count > 1 {
                RetentionStatus::Returning
            } else {
                RetentionStatus::New
            };
            d
        })
        .collect()
}

pub fn retention_breakdown(donors: &[DonorRetention]) -> RetentionBreakdown {
    let returning = donors
        .iter()
        .filter(|d| d.status == RetentionStatus::Returning)
        .count();
    RetentionBreakdown {
        new: donors.len() - returning,
        returning,
    }
}

/// Quarter-over-quarter churn across the full calendar range of activity
///
/// The last quarter has no successor to compare against and is not
/// reported. Quarters with no active donors get `Rate::Undefined`.
pub fn quarterly_churn(records: &[DonationRecord]) -> Vec<QuarterChurn> {
    let mut active: BTreeMap<Quarter, HashSet<&str>> = BTreeMap::new();
    for record in dated_donors(records) {
        let (Some(date), Some(email)) = (record.date, record.email()) else {
            continue;
        };
        active.entry(Quarter::of(&date)).or_default().insert(email);
    }

    let (Some(&first), Some(&last)) = (active.keys().next(), active.keys().next_back()) else {
        return Vec::new();
    };

    let empty = HashSet::new();
    let quarters = Quarter::range(first, last);
    quarters
        .windows(2)
        .map(|pair| {
            let now = active.get(&pair[0]).unwrap_or(&empty);
            let next = active.get(&pair[1]).unwrap_or(&empty);
            let retained = now.intersection(next).count();
            let churned = now.len() - retained;
            let previously_active = churned + retained;
            QuarterChurn {
                quarter: pair[0],
                churned,
                retained,
                previously_active,
                churn_rate: Rate::percent(churned as f64, previously_active as f64),
            }
        })
        .collect()
}

/// Average, best (lowest) and worst (highest) churn; earliest wins ties
pub fn churn_summary(churn: &[QuarterChurn]) -> ChurnSummary {
    let defined: Vec<(&QuarterChurn, f64)> = churn
        .iter()
        .filter_map(|q| q.churn_rate.value().map(|v| (q, v)))
        .collect();

    let average_rate = if defined.is_empty() {
        Rate::Undefined
    } else {
        Rate::Defined(defined.iter().map(|(_, v)| v).sum::<f64>() / defined.len() as f64)
    };

    let mut best: Option<(&QuarterChurn, f64)> = None;
    let mut worst: Option<(&QuarterChurn, f64)> = None;
    for &(q, v) in &defined {
        if best.map_or(true, |(_, b)| v < b) {
            best = Some((q, v));
        }
        if worst.map_or(true, |(_, w)| v > w) {
            worst = Some((q, v));
        }
    }

    ChurnSummary {
        average_rate,
        best_quarter: best.map(|(q, _)| q.clone()),
        worst_quarter: worst.map(|(q, _)| q.clone()),
    }
}
