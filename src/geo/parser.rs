// GeoNames Postal Code Parser
//
// Parses the <CC>.txt file from the GeoNames postal code dump.
//
// Format: Tab-delimited, no header, with the following columns:
// 0:  Country code
// 1:  Postal code
// 2:  Place name
// 3:  Admin name 1 (state)
// 4:  Admin code 1
// 5:  Admin name 2 (county)
// 6:  Admin code 2
// 7:  Admin name 3
// 8:  Admin code 3
// 9:  Latitude
// 10: Longitude
// 11: Accuracy

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{GeoPoint, PostalIndex};

/// Parse a GeoNames postal file from disk
pub fn parse_postal_file(path: &Path) -> Result<PostalIndex, String> {
    log::info!("Parsing GeoNames postal file: {:?}", path);

    let file = File::open(path).map_err(|e| format!("Failed to open postal file: {}", e))?;
    parse_postal_lines(BufReader::new(file))
}

/// Parse GeoNames rows from any reader
pub fn parse_postal_lines<R: BufRead>(reader: R) -> Result<PostalIndex, String> {
    let mut points: HashMap<String, GeoPoint> = HashMap::new();
    let mut line_count = 0;
    let mut skipped = 0;

    for line in reader.lines() {
        line_count += 1;

        let line = match line {
            Ok(l) => l,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();

        // Need at least 11 fields for longitude
        if fields.len() < 11 {
            skipped += 1;
            continue;
        }

        let postal_code = fields[1].trim();
        let latitude = fields[9].trim().parse::<f64>();
        let longitude = fields[10].trim().parse::<f64>();

        let (Ok(latitude), Ok(longitude)) = (latitude, longitude) else {
            skipped += 1;
            continue;
        };
        if postal_code.is_empty() || !latitude.is_finite() || !longitude.is_finite() {
            skipped += 1;
            continue;
        }

        // First entry wins when a code is listed for several places
        points
            .entry(postal_code.to_string())
            .or_insert(GeoPoint { latitude, longitude });
    }

    log::info!(
        "Parsed {} postal lines, {} codes, {} skipped",
        line_count,
        points.len(),
        skipped
    );

    if points.is_empty() {
        return Err("Postal file contained no usable rows".to_string());
    }

    Ok(PostalIndex::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Geocoder;

    const SAMPLE: &str = "US\t60614\tChicago\tIllinois\tIL\tCook\t031\t\t\t41.9227\t-87.6533\t4\n\
US\t02134\tAllston\tMassachusetts\tMA\tSuffolk\t025\t\t\t42.3539\t-71.1337\t4\n\
US\t99999\tNowhere\tNone\tNN\t\t\t\t\t\t\t\n\
short\tline\n";

    #[test]
    fn test_parse_postal_lines() {
        let mut index = parse_postal_lines(SAMPLE.as_bytes()).unwrap();
        assert_eq!(index.len(), 2);

        let chicago = index.locate("60614").unwrap();
        assert_eq!(chicago.latitude, 41.9227);
        assert_eq!(chicago.longitude, -87.6533);
        assert!(index.locate("99999").is_none());
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(parse_postal_lines("".as_bytes()).is_err());
    }
}
