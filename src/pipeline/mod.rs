//! The three batch jobs and the stages they are built from
//!
//! Every job reads its whole input, transforms it in memory and writes the
//! whole output; inputs are never modified.

pub mod cleanup;
pub mod clip;
pub mod land;
pub mod reduce;

pub use cleanup::{CleanupReport, cleanup};
pub use clip::{ClipReport, clip};
pub use land::{LandPolygon, LandReport, assemble};
pub use reduce::reduce;

use crate::config::{CleanupConfig, CombineConfig, ReduceConfig};
use crate::error::Result;
use crate::io::{read_document, read_feature_collection, write_document, write_feature_collection};

#[derive(Debug, Clone, PartialEq)]
pub struct CombineReport {
    pub land: LandReport,
    pub land_parts: usize,
    pub clip: ClipReport,
}

/// Clip regions to the land rebuilt from a coastline and write the result
pub fn run_combine(config: &CombineConfig) -> Result<CombineReport> {
    let regions = read_feature_collection(&config.regions)?;
    let coastline = read_feature_collection(&config.coastline)?;
    log::info!(
        "Loaded {} regions and {} coastline features",
        regions.len(),
        coastline.len()
    );
    if regions.crs != coastline.crs {
        log::warn!(
            "Regions are in {} but coastline is in {}; intersecting raw coordinates",
            regions.crs,
            coastline.crs
        );
    }

    let land = assemble(&coastline);
    log::info!("Assembled land from {} closed rings into {} parts", land.report.rings, land.part_count());

    let (clipped, clip_report) = clip(regions, &land);
    write_feature_collection(&config.output, &clipped, config.style)?;

    Ok(CombineReport {
        land: land.report.clone(),
        land_parts: land.part_count(),
        clip: clip_report,
    })
}

/// Explode, filter and close gaps in a polygon file
pub fn run_cleanup(config: &CleanupConfig) -> Result<CleanupReport> {
    let collection = read_feature_collection(&config.input)?;
    log::info!("Loaded {} features from {}", collection.len(), config.input.display());

    let (cleaned, report) = cleanup(collection, config)?;
    write_feature_collection(&config.output, &cleaned, config.style)?;
    Ok(report)
}

/// Strip properties down to the configured keys
///
/// Returns the number of features written.
pub fn run_reduce(config: &ReduceConfig) -> Result<usize> {
    let mut document = read_document(&config.input)?;
    let features = reduce(&mut document, &config.keep);
    write_document(&config.output_path(), &document, config.style)?;
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::io::OutputStyle;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_json(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn region(id: &str, ring: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": {"id": id, "nam": format!("Region {}", id)},
            "geometry": {"type": "Polygon", "coordinates": [ring]}
        })
    }

    #[test]
    fn test_run_combine() {
        let dir = tempdir().unwrap();
        let config = CombineConfig {
            regions: dir.path().join("regions.geojson"),
            coastline: dir.path().join("coast.geojson"),
            output: dir.path().join("land_only.geojson"),
            style: OutputStyle::Compact,
        };

        write_json(
            &config.regions,
            &json!({
                "type": "FeatureCollection",
                "features": [
                    region("1", json!([[-1.0, 0.0], [1.0, 0.0], [1.0, 1.0], [-1.0, 1.0], [-1.0, 0.0]])),
                    region("2", json!([[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]))
                ]
            }),
        );
        // an island [0,2]x[0,2] drawn as two open halves plus a stray spit
        write_json(
            &config.coastline,
            &json!({
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"id": "a"},
                     "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0]]}},
                    {"type": "Feature", "properties": {"id": "b"},
                     "geometry": {"type": "LineString", "coordinates": [[2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]}},
                    {"type": "Feature", "properties": {"id": "c"},
                     "geometry": {"type": "LineString", "coordinates": [[2.0, 2.0], [3.0, 3.0]]}}
                ]
            }),
        );

        let report = run_combine(&config).unwrap();
        assert_eq!(report.land.rings, 1);
        assert_eq!(report.land.dangles, 1);
        assert_eq!(report.land_parts, 1);
        assert_eq!(report.clip.features, 2);
        assert_eq!(report.clip.degenerate, 1);

        let output = read_json(&config.output);
        let features = output["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["nam"], json!("Region 1"));
        assert_eq!(features[0]["geometry"]["type"], json!("Polygon"));
        assert_eq!(
            features[1]["geometry"],
            json!({"type": "MultiPolygon", "coordinates": []})
        );
    }

    #[test]
    fn test_run_combine_missing_input() {
        let dir = tempdir().unwrap();
        let config = CombineConfig {
            regions: dir.path().join("missing.geojson"),
            coastline: dir.path().join("missing_too.geojson"),
            output: dir.path().join("out.geojson"),
            style: OutputStyle::Compact,
        };
        assert!(matches!(run_combine(&config), Err(Error::Io { .. })));
        assert!(!config.output.exists());
    }

    #[test]
    fn test_run_reduce() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("coastline.geojson");
        write_json(
            &input,
            &json!({
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"id": "42", "name": "北海道"},
                     "geometry": {"type": "LineString", "coordinates": [[141.0, 43.0, 12.5], [141.5, 43.2, 7.0]]},
                     "bbox": [141.0, 43.0, 141.5, 43.2]},
                    {"type": "Feature", "properties": {"name": "X"},
                     "geometry": {"type": "LineString", "coordinates": [[140.0, 42.0], [140.5, 42.2]]}}
                ]
            }),
        );

        let config = ReduceConfig {
            input: input.clone(),
            ..Default::default()
        };
        assert_eq!(run_reduce(&config).unwrap(), 2);

        let output_path = dir.path().join("coastline_filtered.geojson");
        let written = fs::read_to_string(&output_path).unwrap();
        assert!(written.contains("\n  \"type\": \"FeatureCollection\""));

        let output = read_json(&output_path);
        assert_eq!(output["features"][0]["properties"], json!({"id": "42"}));
        assert_eq!(output["features"][1]["properties"], json!({}));
        assert_eq!(
            output["features"][0]["geometry"]["coordinates"],
            json!([[141.0, 43.0, 12.5], [141.5, 43.2, 7.0]])
        );
        assert_eq!(output["features"][0]["bbox"], json!([141.0, 43.0, 141.5, 43.2]));
        assert_eq!(
            output["features"][1]["geometry"]["coordinates"],
            json!([[140.0, 42.0], [140.5, 42.2]])
        );
    }

    #[test]
    fn test_run_cleanup() {
        let dir = tempdir().unwrap();
        let config = CleanupConfig {
            input: dir.path().join("clean.geojson"),
            output: dir.path().join("closed.geojson"),
            ..Default::default()
        };
        write_json(
            &config.input,
            &json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"id": "13"},
                    "geometry": {"type": "MultiPolygon", "coordinates": [
                        [[[139.5, 35.5], [139.6, 35.5], [139.6, 35.6], [139.5, 35.6], [139.5, 35.5]]],
                        [[[139.9, 35.9], [139.9001, 35.9], [139.9001, 35.9001], [139.9, 35.9]]]
                    ]}
                }]
            }),
        );

        let report = run_cleanup(&config).unwrap();
        assert_eq!(report.parts, 2);
        assert_eq!(report.written, 1);

        let output = read_json(&config.output);
        assert_eq!(output["features"][0]["properties"], json!({"id": "13"}));
        assert!(output.get("crs").is_none());
    }
}
