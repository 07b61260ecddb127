// ZIP Code Geocoding Module
//
// Resolves 5-digit ZIP codes to coordinates for the geographic donation
// map. Backed by the GeoNames postal code dump, downloaded once per
// country and cached on disk.
//
// Data source: https://download.geonames.org/export/zip/<CC>.zip
// Update frequency: refreshed when the cached file is older than the
// configured max age (30 days by default)

mod download;
mod parser;

pub use download::{download_postal_file, postal_path};
pub use parser::{parse_postal_file, parse_postal_lines};

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// ZIP → coordinate lookup
///
/// Takes `&mut self` so implementations can remember what they've seen.
pub trait Geocoder {
    fn locate(&mut self, zip: &str) -> Option<GeoPoint>;
}

/// Lookup key: the first 5 characters of a ZIP (ZIP+4 is truncated)
fn zip5(zip: &str) -> &str {
    let zip = zip.trim();
    match zip.char_indices().nth(5) {
        Some((end, _)) => &zip[..end],
        None => zip,
    }
}

// ============================================================================
// Postal Index
// ============================================================================

/// In-memory postal code table
#[derive(Debug, Default, Clone)]
pub struct PostalIndex {
    points: HashMap<String, GeoPoint>,
}

impl PostalIndex {
    pub fn from_points(points: HashMap<String, GeoPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Geocoder for PostalIndex {
    fn locate(&mut self, zip: &str) -> Option<GeoPoint> {
        self.points.get(zip5(zip)).copied()
    }
}

// ============================================================================
// Session Cache
// ============================================================================

/// Remembers every answer (hits and misses) of the wrapped geocoder
pub struct CachingGeocoder<G> {
    inner: G,
    cache: HashMap<String, Option<GeoPoint>>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn locate(&mut self, zip: &str) -> Option<GeoPoint> {
        let key = zip5(zip);
        if let Some(hit) = self.cache.get(key) {
            return *hit;
        }

        let point = self.inner.locate(key);
        if point.is_none() {
            log::debug!("No coordinates for ZIP {}", key);
        }
        self.cache.insert(key.to_string(), point);
        point
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Download and parse the postal index for `country`
pub async fn download_postal_index(data_dir: &Path, country: &str) -> Result<PostalIndex, String> {
    let path = download_postal_file(data_dir, country).await?;
    parse_postal_file(&path)
}

/// Load the cached postal index, downloading it first if missing or stale
pub async fn ensure_postal_index(
    data_dir: &Path,
    country: &str,
    max_age_days: u32,
) -> Result<PostalIndex, String> {
    let path = postal_path(data_dir, country);

    if is_fresh(&path, max_age_days) {
        log::info!("Using cached postal file {}", path.display());
        return parse_postal_file(&path);
    }

    download_postal_index(data_dir, country).await
}

/// Syncs if: never downloaded, or last download older than `max_age_days`
fn is_fresh(path: &Path, max_age_days: u32) -> bool {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => {
            log::info!("Postal file {} not cached, will download", path.display());
            return false;
        }
    };

    let age_days = match modified.elapsed() {
        Ok(age) => age.as_secs() / 86_400,
        Err(_) => 0,
    };

    if age_days > u64::from(max_age_days) {
        log::info!("Postal file is {} days old, will download", age_days);
        false
    } else {
        log::debug!("Postal file is {} days old, no download needed", age_days);
        true
    }
}
