// Pareto (80/20) donor concentration

use std::collections::HashMap;

use serde::Serialize;

use crate::store::DonationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoDonor {
    pub rank: usize,
    pub donor_email: String,
    pub total: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoReport {
    pub target_pct: f64,
    pub cutoff: usize,
    pub donor_count: usize,
    /// Top `cutoff` donors
    pub top_donors: Vec<ParetoDonor>,
}

/// Donors ranked by total giving with their cumulative share
///
/// Donors with no known amount, or a net total of zero or less (refunds),
/// contribute nothing and are left out, so shares only grow and stop at
/// exactly 100. Ties are broken by email.
pub fn pareto_ranking(records: &[DonationRecord]) -> Vec<ParetoDonor> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        let (Some(email), Some(amount)) = (record.email(), record.amount) else {
            continue;
        };
        *totals.entry(email).or_insert(0.0) += amount;
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().filter(|(_, t)| *t > 0.0).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut running = Vec::with_capacity(ranked.len());
    let mut sum = 0.0;
    for (_, total) in &ranked {
        sum += total;
        running.push(sum);
    }

    // Dividing by the final running value makes the last share exactly 100
    let grand_total = sum;
    if grand_total == 0.0 {
        return Vec::new();
    }

    ranked
        .into_iter()
        .zip(running)
        .enumerate()
        .map(|(i, ((email, total), cumulative))| ParetoDonor {
            rank: i + 1,
            donor_email: email.to_string(),
            total,
            cumulative_pct: cumulative / grand_total * 100.0,
        })
        .collect()
}

/// Number of top donors reported for a target share
///
/// Counts the donors whose cumulative share is at most `target_pct` and
/// includes one more, the donor that crosses the target. Never exceeds the
/// number of ranked donors.
pub fn pareto_cutoff(ranking: &[ParetoDonor], target_pct: f64) -> usize {
    let within = ranking
        .iter()
        .filter(|d| d.cumulative_pct <= target_pct)
        .count();
    (within + 1).min(ranking.len())
}

pub fn pareto_report(records: &[DonationRecord], target_pct: f64) -> ParetoReport {
    let ranking = pareto_ranking(records);
    let cutoff = pareto_cutoff(&ranking, target_pct);
    let donor_count = ranking.len();
    let mut top_donors = ranking;
    top_donors.truncate(cutoff);

    ParetoReport {
        target_pct,
        cutoff,
        donor_count,
        top_donors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{at, gift};

    fn giving(amounts: &[(&str, f64)]) -> Vec<DonationRecord> {
        amounts
            .iter()
            .map(|(email, amount)| gift(email, *amount, at(2023, 1, 1)))
            .collect()
    }

    #[test]
    fn test_ranking_is_monotonic_and_ends_at_100() {
        let records = giving(&[
            ("a@x.org", 13.37),
            ("b@x.org", 0.1),
            ("c@x.org", 0.2),
            ("d@x.org", 700.0),
            ("a@x.org", 3.3),
        ]);
        let ranking = pareto_ranking(&records);
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking[0].donor_email, "d@x.org");
        assert_eq!(ranking[0].rank, 1);
        assert!(ranking.windows(2).all(|w| w[0].cumulative_pct <= w[1].cumulative_pct));
        assert_eq!(ranking.last().unwrap().cumulative_pct, 100.0);
    }

    #[test]
    fn test_cutoff_includes_crossing_donor() {
        // Shares: 50, 80, 95, 100
        let records = giving(&[("a", 50.0), ("b", 30.0), ("c", 15.0), ("d", 5.0)]);
        let ranking = pareto_ranking(&records);
        assert_eq!(pareto_cutoff(&ranking, 80.0), 3);
        assert_eq!(pareto_cutoff(&ranking, 60.0), 2);
        assert_eq!(pareto_cutoff(&ranking, 10.0), 1);
        assert_eq!(pareto_cutoff(&ranking, 100.0), 4);
    }

    #[test]
    fn test_zero_total_donors_are_excluded() {
        let mut records = giving(&[("a", 60.0), ("b", 40.0)]);
        let mut blank = gift("ghost", 0.0, at(2023, 1, 1));
        blank.amount = None;
        records.push(blank);
        records.push(gift("zero", 0.0, at(2023, 1, 1)));

        let report = pareto_report(&records, 80.0);
        assert_eq!(report.donor_count, 2);
        assert!(report.top_donors.iter().all(|d| d.donor_email != "ghost"));
        assert_eq!(report.cutoff, 2);
    }

    #[test]
    fn test_refunded_donors_are_excluded() {
        let ranking = pareto_ranking(&giving(&[("a", 100.0), ("b", 30.0), ("b", -50.0)]));
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].donor_email, "a");
        assert_eq!(ranking[0].cumulative_pct, 100.0);

        let ranking = pareto_ranking(&giving(&[("a", 50.0), ("b", -50.0), ("c", 25.0)]));
        assert_eq!(ranking.len(), 2);
        assert!(ranking.windows(2).all(|w| w[0].cumulative_pct <= w[1].cumulative_pct));
        assert_eq!(ranking.last().unwrap().cumulative_pct, 100.0);
    }

    #[test]
    fn test_empty_ranking() {
        assert!(pareto_ranking(&[]).is_empty());
        assert_eq!(pareto_cutoff(&[], 80.0), 0);
    }
}
