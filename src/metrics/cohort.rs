// Cohort analysis
//
// Each donor belongs to the cohort of the quarter they first gave in.
// For every cohort and every offset k (quarters since the cohort quarter)
// we report how many of its donors were active and how much they gave.
// A cell with no activity is None: nobody from that cohort gave at that
// offset inside the data window. That is different from a zero.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::{dated_donors, Quarter};
use crate::store::DonationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRow {
    pub cohort: Quarter,
    /// Donors active at offset 0
    pub size: usize,
    pub active_donors: Vec<Option<usize>>,
    pub amounts: Vec<Option<f64>>,
    /// active / size × 100; offset 0 is always 100
    pub retention_rate: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohortAnalysis {
    /// Number of offset columns: quarters from first to last activity
    pub offsets: usize,
    pub cohorts: Vec<CohortRow>,
}

#[derive(Default)]
struct Cell<'a> {
    donors: HashSet<&'a str>,
    amount: f64,
}

pub fn cohort_analysis(records: &[DonationRecord]) -> CohortAnalysis {
    let gifts: Vec<(&str, Quarter, Option<f64>)> = dated_donors(records)
        .filter_map(|r| Some((r.email()?, Quarter::of(&r.date?), r.amount)))
        .collect();

    let (Some(first), Some(last)) = (
        gifts.iter().map(|g| g.1).min(),
        gifts.iter().map(|g| g.1).max(),
    ) else {
        return CohortAnalysis::default();
    };
    let offsets = (last.index() - first.index() + 1) as usize;

    let mut cohort_of: HashMap<&str, Quarter> = HashMap::new();
    for &(email, quarter, _) in &gifts {
        cohort_of
            .entry(email)
            .and_modify(|q| *q = (*q).min(quarter))
            .or_insert(quarter);
    }

    let mut cells: BTreeMap<(Quarter, usize), Cell> = BTreeMap::new();
    for &(email, quarter, amount) in &gifts {
        let cohort = cohort_of[email];
        let offset = (quarter.index() - cohort.index()) as usize;
        let cell = cells.entry((cohort, offset)).or_default();
        cell.donors.insert(email);
        if let Some(amount) = amount {
            cell.amount += amount;
        }
    }

    let mut rows: BTreeMap<Quarter, CohortRow> = BTreeMap::new();
    for ((cohort, offset), cell) in cells {
        let row = rows.entry(cohort).or_insert_with(|| CohortRow {
            cohort,
            size: 0,
            active_donors: vec![None; offsets],
            amounts: vec![None; offsets],
            retention_rate: vec![None; offsets],
        });
        if offset == 0 {
            row.size = cell.donors.len();
        }
        row.active_donors[offset] = Some(cell.donors.len());
        row.amounts[offset] = Some(cell.amount);
    }

    let cohorts = rows
        .into_values()
        .map(|mut row| {
            let size = row.size as f64;
            row.retention_rate = row
                .active_donors
                .iter()
                .map(|n| n.map(|n| n as f64 / size * 100.0))
                .collect();
            row
        })
        .collect();

    CohortAnalysis { offsets, cohorts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{at, gift, three_gifts};

    #[test]
    fn test_cohort_scenario() {
        let analysis = cohort_analysis(&three_gifts());
        assert_eq!(analysis.offsets, 2);
        assert_eq!(analysis.cohorts.len(), 1);

        let q1 = &analysis.cohorts[0];
        assert_eq!(q1.cohort.to_string(), "2023Q1");
        assert_eq!(q1.size, 2);
        assert_eq!(q1.active_donors, vec![Some(2), Some(1)]);
        assert_eq!(q1.amounts, vec![Some(300.0), Some(50.0)]);
        assert_eq!(q1.retention_rate, vec![Some(100.0), Some(50.0)]);
    }

    #[test]
    fn test_offset_zero_is_always_full() {
        let records = vec![
            gift("a@example.org", 10.0, at(2022, 11, 1)),
            gift("b@example.org", 10.0, at(2023, 2, 1)),
            gift("c@example.org", 10.0, at(2023, 2, 1)),
            gift("a@example.org", 10.0, at(2023, 8, 1)),
        ];
        let analysis = cohort_analysis(&records);
        assert_eq!(analysis.offsets, 4);
        for row in &analysis.cohorts {
            assert_eq!(row.retention_rate[0], Some(100.0));
        }
    }

    #[test]
    fn test_inactive_cells_are_missing_not_zero() {
        let records = vec![
            gift("a@example.org", 10.0, at(2023, 1, 1)),
            gift("a@example.org", 20.0, at(2023, 7, 1)),
            gift("b@example.org", 5.0, at(2023, 4, 1)),
        ];
        let analysis = cohort_analysis(&records);
        let q1 = &analysis.cohorts[0];
        assert_eq!(q1.active_donors, vec![Some(1), None, Some(1)]);
        assert_eq!(q1.amounts[1], None);

        let q2 = &analysis.cohorts[1];
        assert_eq!(q2.cohort.to_string(), "2023Q2");
        assert_eq!(q2.active_donors, vec![Some(1), None, None]);
    }

    #[test]
    fn test_records_without_email_or_date_are_ignored() {
        let mut records = three_gifts();
        let mut no_email = gift("x", 1.0, at(2022, 1, 1));
        no_email.donor_email = None;
        let mut no_date = gift("y@example.org", 1.0, at(2022, 1, 1));
        no_date.date = None;
        records.push(no_email);
        records.push(no_date);
        assert_eq!(cohort_analysis(&records), cohort_analysis(&three_gifts()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(cohort_analysis(&[]), CohortAnalysis::default());
    }
}
