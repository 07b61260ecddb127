// Donations by ZIP code
//
// ZIP totals for the bar/pie views, and the same totals joined with
// geocoded coordinates for the map. ZIPs the geocoder cannot place are
// left off the map rather than plotted at (0, 0).

use std::collections::HashMap;

use serde::Serialize;

use crate::geo::Geocoder;
use crate::store::DonationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipTotal {
    pub zip_code: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoZipTotal {
    pub zip_code: String,
    pub total: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Sum known amounts per ZIP, largest first; `top_n` keeps the first N
pub fn zip_summary(records: &[DonationRecord], top_n: Option<usize>) -> Vec<ZipTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        let (Some(zip), Some(amount)) = (record.zip_code.as_deref(), record.amount) else {
            continue;
        };
        *totals.entry(zip).or_insert(0.0) += amount;
    }

    let mut rows: Vec<ZipTotal> = totals
        .into_iter()
        .map(|(zip, total)| ZipTotal {
            zip_code: zip.to_string(),
            total,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.zip_code.cmp(&b.zip_code))
    });

    if let Some(n) = top_n {
        rows.truncate(n);
    }
    rows
}

/// ZIP totals with coordinates; lookup misses are excluded
pub fn geo_distribution<G: Geocoder + ?Sized>(records: &[DonationRecord], geocoder: &mut G) -> Vec<GeoZipTotal> {
    let totals = zip_summary(records, None);
    let mut misses = 0usize;

    let located: Vec<GeoZipTotal> = totals
        .into_iter()
        .filter_map(|z| match geocoder.locate(&z.zip_code) {
            Some(point) => Some(GeoZipTotal {
                zip_code: z.zip_code,
                total: z.total,
                latitude: point.latitude,
                longitude: point.longitude,
            }),
            None => {
                misses += 1;
                None
            }
        })
        .collect();

    if misses > 0 {
        log::debug!("Geo distribution: {} ZIP codes could not be located", misses);
    }
    located
}
