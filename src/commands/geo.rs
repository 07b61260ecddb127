//! Postal index commands
//!
//! This module handles:
//! - sync_postal_index: Load (downloading if stale) the GeoNames index
//! - get_geocoder_status: Whether the map can be drawn

use std::path::PathBuf;

use serde::Serialize;

use super::state::Session;
use crate::geo::{ensure_postal_index, CachingGeocoder};

#[derive(Debug, Clone, Serialize)]
pub struct GeocoderStatus {
    pub loaded: bool,
    pub country: String,
    pub data_dir: Option<PathBuf>,
    pub cached_lookups: usize,
}

/// Load the postal index for the configured country into the session
///
/// Returns the number of postal codes indexed.
pub async fn sync_postal_index(session: &mut Session) -> Result<usize, String> {
    let data_dir = session
        .settings
        .data_dir
        .clone()
        .ok_or("No data directory configured for the postal index")?;
    let country = session.settings.geonames_country.clone();

    let index = ensure_postal_index(&data_dir, &country, session.settings.geonames_max_age_days).await?;
    let count = index.len();
    log::info!("Postal index for {} ready: {} codes", country, count);

    session.geocoder = Some(CachingGeocoder::new(index));
    Ok(count)
}

pub fn get_geocoder_status(session: &Session) -> Result<GeocoderStatus, String> {
    Ok(GeocoderStatus {
        loaded: session.geocoder.is_some(),
        country: session.settings.geonames_country.clone(),
        data_dir: session.settings.data_dir.clone(),
        cached_lookups: session.geocoder.as_ref().map_or(0, |g| g.cached()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::postal_path;

    #[tokio::test]
    async fn test_sync_requires_data_dir() {
        let mut session = Session::default();
        assert!(sync_postal_index(&mut session).await.is_err());
        assert!(!get_geocoder_status(&session).unwrap().loaded);
    }

    #[tokio::test]
    async fn test_sync_from_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = postal_path(dir.path(), "US");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "US\t02134\tAllston\tMassachusetts\tMA\tSuffolk\t025\t\t\t42.3539\t-71.1337\t4\n",
        )
        .unwrap();

        let mut session = Session::default();
        session.settings.data_dir = Some(dir.path().to_path_buf());

        assert_eq!(sync_postal_index(&mut session).await.unwrap(), 1);
        let status = get_geocoder_status(&session).unwrap();
        assert!(status.loaded);
        assert_eq!(status.country, "US");
    }
}
