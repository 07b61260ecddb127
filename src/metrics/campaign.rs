// Campaign performance
//
// Campaign summary (total / count / average gift) and year-over-year growth
// of each campaign. A missing campaign title is its own group.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use super::{dated_gifts, Rate};
use crate::store::DonationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub campaign_title: Option<String>,
    pub total_raised: f64,
    pub donation_count: usize,
    pub average_gift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignYearGrowth {
    /// Campaign title without its trailing year
    pub campaign: Option<String>,
    pub year: i32,
    pub previous_total: f64,
    pub total: f64,
    pub growth: Rate,
}

/// Sum, count and mean of known amounts per campaign
///
/// Groups with no known amount have no numeric total and are left out.
/// Ordered by title; the untitled group comes last.
pub fn campaign_summary(records: &[DonationRecord]) -> Vec<CampaignSummary> {
    let mut groups: BTreeMap<Option<&str>, (f64, usize)> = BTreeMap::new();
    for record in records {
        let Some(amount) = record.amount else { continue };
        let entry = groups
            .entry(record.campaign_title.as_deref())
            .or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    let mut rows: Vec<CampaignSummary> = groups
        .into_iter()
        .map(|(title, (total, count))| CampaignSummary {
            campaign_title: title.map(str::to_string),
            total_raised: total,
            donation_count: count,
            average_gift: total / count as f64,
        })
        .collect();

    // BTreeMap puts None first
    if rows.first().map_or(false, |r| r.campaign_title.is_none()) {
        rows.rotate_left(1);
    }
    rows
}

/// Drop a trailing 4-digit year ("Spring Gala 2023" → "Spring Gala")
pub fn strip_year_suffix(title: &str) -> &str {
    let trimmed = title.trim_end();
    let bytes = trimmed.as_bytes();
    if bytes.len() < 4 {
        return trimmed;
    }

    let split = bytes.len() - 4;
    if !bytes[split..].iter().all(u8::is_ascii_digit) {
        return trimmed;
    }
    if split > 0 && bytes[split - 1].is_ascii_alphanumeric() {
        return trimmed;
    }

    let stem = trimmed[..split].trim_end_matches(|c: char| c.is_whitespace() || "-–_:|,".contains(c));
    if stem.is_empty() {
        trimmed
    } else {
        stem
    }
}

/// Year-over-year growth per campaign
///
/// Sums are pivoted by (campaign, calendar year) over records with a date
/// and amount. For each pair of consecutive years present in the data, a
/// row is produced only when the campaign raised money in both years;
/// growth from a zero year is `Rate::Undefined`.
pub fn yoy_growth(records: &[DonationRecord]) -> Vec<CampaignYearGrowth> {
    let mut pivot: BTreeMap<Option<String>, BTreeMap<i32, f64>> = BTreeMap::new();
    let mut years: BTreeSet<i32> = BTreeSet::new();

    for record in dated_gifts(records) {
        let (Some(date), Some(amount)) = (record.date, record.amount) else {
            continue;
        };
        let year = date.year();
        years.insert(year);
        let campaign = record
            .campaign_title
            .as_deref()
            .map(|t| strip_year_suffix(t).to_string());
        *pivot.entry(campaign).or_default().entry(year).or_insert(0.0) += amount;
    }

    let years: Vec<i32> = years.into_iter().collect();
    let mut rows = Vec::new();
    for (campaign, by_year) in &pivot {
        for pair in years.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let (Some(&previous_total), Some(&total)) = (by_year.get(&prev), by_year.get(&curr)) else {
                continue;
            };
            rows.push(CampaignYearGrowth {
                campaign: campaign.clone(),
                year: curr,
                previous_total,
                total,
                growth: Rate::growth(previous_total, total),
            });
        }
    }
    rows
}
