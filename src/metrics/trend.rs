// Fundraising over time
//
// Monthly totals with a running cumulative sum, plus the growth of that
// cumulative line between two caller-chosen months.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Month, Rate};
use crate::store::DonationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalGrowth {
    pub start_month: Month,
    pub end_month: Month,
    pub start_cumulative: f64,
    pub end_cumulative: f64,
    pub growth: Rate,
}

/// Group dated records by calendar month and accumulate
///
/// A month appears as soon as it has a dated record; its total only counts
/// known amounts.
pub fn monthly_cumulative(records: &[DonationRecord]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<Month, f64> = BTreeMap::new();
    for record in records {
        let Some(date) = record.date else { continue };
        let total = months.entry(Month::of(&date)).or_insert(0.0);
        if let Some(amount) = record.amount {
            *total += amount;
        }
    }

    let mut running = 0.0;
    months
        .into_iter()
        .map(|(month, total)| {
            running += total;
            MonthlyTotal {
                month,
                total,
                cumulative: running,
            }
        })
        .collect()
}

/// Growth of the cumulative total across `[from, to]`
///
/// Uses the first month at or after `from` and the last month at or before
/// `to`. Returns None when no month falls inside the interval.
pub fn interval_growth(trend: &[MonthlyTotal], from: Month, to: Month) -> Option<IntervalGrowth> {
    let start = trend.iter().find(|m| m.month >= from && m.month <= to)?;
    let end = trend.iter().rev().find(|m| m.month <= to && m.month >= from)?;

    Some(IntervalGrowth {
        start_month: start.month,
        end_month: end.month,
        start_cumulative: start.cumulative,
        end_cumulative: end.cumulative,
        growth: Rate::growth(start.cumulative, end.cumulative),
    })
}
