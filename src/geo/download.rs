// GeoNames Postal Code Download
//
// Downloads the GeoNames postal code dump for one country (<CC>.zip)
// and extracts <CC>.txt next to it for parsing.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use zip::ZipArchive;

/// GeoNames postal code dumps, one zip per country
const GEONAMES_ZIP_URL: &str = "https://download.geonames.org/export/zip";

pub fn postal_url(country: &str) -> String {
    format!("{}/{}.zip", GEONAMES_ZIP_URL, country.to_uppercase())
}

/// Path the extracted postal file lives at inside `data_dir`
pub fn postal_path(data_dir: &Path, country: &str) -> PathBuf {
    data_dir
        .join("geonames_cache")
        .join(format!("{}.txt", country.to_uppercase()))
}

/// Download the postal code dump for `country`
///
/// Returns the path to the extracted <CC>.txt file
pub async fn download_postal_file(data_dir: &Path, country: &str) -> Result<PathBuf, String> {
    let url = postal_url(country);
    log::info!("Starting GeoNames postal download from {}", url);

    let cache_dir = data_dir.join("geonames_cache");
    fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| format!("Failed to create GeoNames cache directory: {}", e))?;

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("Failed to download postal codes: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("GeoNames download failed with status: {}", response.status()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read GeoNames response: {}", e))?;

    log::info!("Downloaded {} bytes, extracting...", bytes.len());

    // zip types aren't Send
    let target = postal_path(data_dir, country);
    let target_clone = target.clone();
    let entry_name = format!("{}.TXT", country.to_uppercase());
    let bytes_vec = bytes.to_vec();

    tokio::task::spawn_blocking(move || extract_postal_file(&bytes_vec, &entry_name, &target_clone))
        .await
        .map_err(|e| format!("Failed to spawn blocking task: {}", e))??;

    Ok(target)
}

/// Pull `entry_name` (case-insensitive) out of the archive into `target`
pub fn extract_postal_file(bytes: &[u8], entry_name: &str, target: &Path) -> Result<(), String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("Failed to open GeoNames zip archive: {}", e))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read zip entry: {}", e))?;

        if file.name().to_uppercase() != entry_name.to_uppercase() {
            continue;
        }

        log::info!("Extracting {} ({} bytes compressed)", file.name(), file.compressed_size());

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| format!("Failed to read {}: {}", entry_name, e))?;

        std::fs::write(target, &contents)
            .map_err(|e| format!("Failed to write {}: {}", target.display(), e))?;

        log::info!("Extracted {}: {} bytes", target.display(), contents.len());
        return Ok(());
    }

    Err(format!("{} not found in GeoNames archive", entry_name))
}
