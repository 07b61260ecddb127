//! Report commands
//!
//! This module handles:
//! - One handler per metric table (overview, trend, campaigns, ZIPs, map,
//!   retention, churn, cohorts, Pareto, YoY, donor types, histogram)
//! - get_dashboard: Every table in one payload
//!
//! All handlers refuse to run on an empty session.

use serde::Serialize;

use super::state::Session;
use crate::metrics::campaign::{campaign_summary, yoy_growth, CampaignSummary, CampaignYearGrowth};
use crate::metrics::cohort::{cohort_analysis, CohortAnalysis};
use crate::metrics::distribution::{amount_histogram, donor_types, DonorTypeCount, HistogramBin};
use crate::metrics::geography::{geo_distribution, zip_summary, GeoZipTotal, ZipTotal};
use crate::metrics::pareto::{pareto_report, ParetoReport};
use crate::metrics::retention::{
    churn_summary, classify_retention, overview, quarterly_churn, retention_breakdown, ChurnSummary,
    DonorRetention, OverviewStats, QuarterChurn, RetentionBreakdown,
};
use crate::metrics::trend::{interval_growth, monthly_cumulative, IntervalGrowth, MonthlyTotal};
use crate::metrics::Month;
use crate::store::DonationRecord;

pub const NO_DATA: &str = "No donation data loaded";

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub months: Vec<MonthlyTotal>,
    pub growth: Option<IntervalGrowth>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetentionReport {
    pub breakdown: RetentionBreakdown,
    pub total_donors: usize,
    /// First `detail_rows` donors by email
    pub donors: Vec<DonorRetention>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChurnReport {
    pub quarters: Vec<QuarterChurn>,
    pub summary: ChurnSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub session_id: String,
    pub files: Vec<String>,
    pub overview: OverviewStats,
    pub trend: TrendReport,
    pub campaigns: Vec<CampaignSummary>,
    pub zip_codes: Vec<ZipTotal>,
    /// Present once the postal index is loaded
    pub geo: Option<Vec<GeoZipTotal>>,
    pub retention: RetentionReport,
    pub churn: ChurnReport,
    pub cohorts: CohortAnalysis,
    pub pareto: ParetoReport,
    pub yoy_growth: Vec<CampaignYearGrowth>,
    pub donor_types: Vec<DonorTypeCount>,
    pub histogram: Vec<HistogramBin>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn records(session: &Session) -> Result<&[DonationRecord], String> {
    if session.store.is_empty() {
        return Err(NO_DATA.to_string());
    }
    Ok(session.store.snapshot())
}

fn parse_month(label: &str) -> Result<Month, String> {
    Month::parse(label).ok_or_else(|| format!("Invalid month '{}', expected YYYY-MM", label))
}

// ============================================================================
// Commands
// ============================================================================

pub fn get_overview(session: &Session) -> Result<OverviewStats, String> {
    Ok(overview(records(session)?))
}

/// Monthly cumulative trend plus growth across `[from, to]`
///
/// Either bound defaults to the first/last month with data.
pub fn get_monthly_trend(
    session: &Session,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<TrendReport, String> {
    let months = monthly_cumulative(records(session)?);

    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Ok(TrendReport { months, growth: None });
    };

    let from = match from {
        Some(label) => parse_month(label)?,
        None => first.month,
    };
    let to = match to {
        Some(label) => parse_month(label)?,
        None => last.month,
    };
    if from > to {
        return Err(format!("Interval start {} is after its end {}", from, to));
    }

    let growth = interval_growth(&months, from, to);
    Ok(TrendReport { months, growth })
}

pub fn get_campaign_summary(session: &Session) -> Result<Vec<CampaignSummary>, String> {
    Ok(campaign_summary(records(session)?))
}

pub fn get_zip_summary(session: &Session) -> Result<Vec<ZipTotal>, String> {
    let top_n = session.settings.zip_top_n;
    Ok(zip_summary(records(session)?, (top_n > 0).then_some(top_n)))
}

/// ZIP totals with coordinates; needs `sync_postal_index` first
pub fn get_geo_distribution(session: &mut Session) -> Result<Vec<GeoZipTotal>, String> {
    records(session)?;
    let Session { store, geocoder, .. } = session;
    let geocoder = geocoder
        .as_mut()
        .ok_or("Postal index not loaded")?;
    Ok(geo_distribution(store.snapshot(), geocoder))
}

pub fn get_retention(session: &Session) -> Result<RetentionReport, String> {
    let mut donors = classify_retention(records(session)?);
    let breakdown = retention_breakdown(&donors);
    let total_donors = donors.len();
    if let Some(limit) = session.settings.detail_limit() {
        donors.truncate(limit);
    }

    Ok(RetentionReport {
        breakdown,
        total_donors,
        donors,
    })
}

pub fn get_churn(session: &Session) -> Result<ChurnReport, String> {
    let quarters = quarterly_churn(records(session)?);
    let summary = churn_summary(&quarters);
    Ok(ChurnReport { quarters, summary })
}

pub fn get_cohorts(session: &Session) -> Result<CohortAnalysis, String> {
    Ok(cohort_analysis(records(session)?))
}

pub fn get_pareto(session: &Session) -> Result<ParetoReport, String> {
    Ok(pareto_report(records(session)?, session.settings.pareto_target_pct))
}

pub fn get_yoy_growth(session: &Session) -> Result<Vec<CampaignYearGrowth>, String> {
    Ok(yoy_growth(records(session)?))
}

pub fn get_donor_types(session: &Session) -> Result<Vec<DonorTypeCount>, String> {
    Ok(donor_types(records(session)?))
}

pub fn get_histogram(session: &Session) -> Result<Vec<HistogramBin>, String> {
    let settings = &session.settings;
    Ok(amount_histogram(
        records(session)?,
        settings.histogram_bin_width,
        settings.histogram_max_amount,
    ))
}

/// Every table at once; `geo` is filled only when the postal index is loaded
pub fn get_dashboard(
    session: &mut Session,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Dashboard, String> {
    records(session)?;

    let geo = match session.geocoder {
        Some(_) => Some(get_geo_distribution(session)?),
        None => None,
    };

    let dashboard = Dashboard {
        session_id: session.id.to_string(),
        files: session.store.file_names().to_vec(),
        overview: get_overview(session)?,
        trend: get_monthly_trend(session, from, to)?,
        campaigns: get_campaign_summary(session)?,
        zip_codes: get_zip_summary(session)?,
        geo,
        retention: get_retention(session)?,
        churn: get_churn(session)?,
        cohorts: get_cohorts(session)?,
        pareto: get_pareto(session)?,
        yoy_growth: get_yoy_growth(session)?,
        donor_types: get_donor_types(session)?,
        histogram: get_histogram(session)?,
    };

    log::info!(
        "Built dashboard for session {}: {} records across {} files",
        session.id,
        session.store.len(),
        dashboard.files.len()
    );
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{CachingGeocoder, GeoPoint, PostalIndex};
    use crate::metrics::fixtures::three_gifts;
    use crate::metrics::Rate;
    use std::collections::HashMap;

    fn loaded() -> Session {
        let mut session = Session::default();
        let mut records = three_gifts();
        records[0].zip_code = Some("60614".to_string());
        records[2].zip_code = Some("99999".to_string());
        session.store.add("test.xlsx", records);
        session
    }

    #[test]
    fn test_empty_session_is_refused() {
        let mut session = Session::default();
        assert_eq!(get_overview(&session).unwrap_err(), NO_DATA);
        assert_eq!(get_pareto(&session).unwrap_err(), NO_DATA);
        assert_eq!(get_dashboard(&mut session, None, None).unwrap_err(), NO_DATA);
    }

    #[test]
    fn test_trend_defaults_to_full_range() {
        let session = loaded();
        let report = get_monthly_trend(&session, None, None).unwrap();
        assert_eq!(report.months.len(), 3);

        let growth = report.growth.unwrap();
        assert_eq!(growth.start_month.to_string(), "2023-01");
        assert_eq!(growth.end_month.to_string(), "2023-04");
        assert_eq!(growth.growth, Rate::Defined(250.0));
    }

    #[test]
    fn test_trend_rejects_bad_bounds() {
        let session = loaded();
        assert!(get_monthly_trend(&session, Some("2023-13"), None).is_err());
        assert!(get_monthly_trend(&session, Some("2023-04"), Some("2023-01")).is_err());
        let report = get_monthly_trend(&session, Some("2024-01"), Some("2024-06")).unwrap();
        assert!(report.growth.is_none());
    }

    #[test]
    fn test_retention_respects_detail_rows() {
        let mut session = loaded();
        session.settings.detail_rows = 1;
        let report = get_retention(&session).unwrap();
        assert_eq!(report.total_donors, 2);
        assert_eq!(report.donors.len(), 1);
        assert_eq!(report.breakdown.returning, 1);
        assert_eq!(report.breakdown.new, 1);
    }

    #[test]
    fn test_geo_needs_postal_index() {
        let mut session = loaded();
        assert!(get_geo_distribution(&mut session).is_err());

        let mut points = HashMap::new();
        points.insert(
            "60614".to_string(),
            GeoPoint {
                latitude: 41.9,
                longitude: -87.6,
            },
        );
        session.geocoder = Some(CachingGeocoder::new(PostalIndex::from_points(points)));

        let geo = get_geo_distribution(&mut session).unwrap();
        assert_eq!(geo.len(), 1);
        assert_eq!(geo[0].zip_code, "60614");
    }

    #[test]
    fn test_dashboard() {
        let mut session = loaded();
        let dashboard = get_dashboard(&mut session, None, None).unwrap();

        assert_eq!(dashboard.files, vec!["test.xlsx"]);
        assert_eq!(dashboard.overview.total_raised, 350.0);
        assert!(dashboard.geo.is_none());
        assert_eq!(dashboard.cohorts.cohorts.len(), 1);
        assert_eq!(dashboard.pareto.donor_count, 2);
        assert_eq!(dashboard.zip_codes.len(), 2);

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["cohorts"]["cohorts"][0]["cohort"], "2023Q1");
    }
}
