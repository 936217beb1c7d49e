use geo::{Buffer, Geometry};

use crate::config::CleanupConfig;
use crate::domain::{Feature, FeatureCollection};
use crate::error::{Error, Result};
use crate::geometry::{Crs, collapse, explode, is_empty, polygonal_area, reproject};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanupReport {
    /// Features read
    pub features: usize,
    /// Single-part features after exploding
    pub parts: usize,
    /// Parts dropped for being smaller than the minimum area
    pub dropped_small: usize,
    /// Parts that vanished while closing gaps
    pub degenerate: usize,
    /// Features written
    pub written: usize,
}

/// Explode, drop small parts and close slivers, in meters
///
/// # Steps
/// 1. Reproject from the collection's CRS to `metric_crs`
/// 2. Split multi-part geometries into one feature per part
/// 3. Keep parts with `area >= min_area`
/// 4. Buffer by `+buffer_distance` then `-buffer_distance`
/// 5. Reproject to `geographic_crs`
pub fn cleanup(
    collection: FeatureCollection,
    config: &CleanupConfig,
) -> Result<(FeatureCollection, CleanupReport)> {
    validate(config)?;
    let metric = Crs::from_epsg(config.metric_crs)?;
    if !metric.is_metric() {
        return Err(Error::InvalidConfig(format!(
            "metric_crs {} does not measure in meters",
            metric
        )));
    }
    let geographic = Crs::from_epsg(config.geographic_crs)?;
    let source = collection.crs;

    let mut report = CleanupReport {
        features: collection.len(),
        ..Default::default()
    };

    let projected: Vec<Feature> = collection
        .features
        .iter()
        .map(|f| f.with_geometry(f.geometry.as_ref().map(|g| reproject(g, source, metric))))
        .collect();

    let parts = explode_features(projected);
    report.parts = parts.len();

    let (kept, dropped) = retain_min_area(parts, config.min_area);
    report.dropped_small = dropped;
    log::debug!(
        "{} parts at least {} m², {} smaller dropped",
        kept.len(),
        config.min_area,
        dropped
    );

    let features: Vec<Feature> = kept
        .into_iter()
        .map(|mut feature| {
            feature.geometry = feature.geometry.take().map(|g| {
                let closed = close_gaps(&g, config.buffer_distance);
                if is_empty(&closed) {
                    report.degenerate += 1;
                }
                reproject(&closed, metric, geographic)
            });
            feature
        })
        .collect();
    report.written = features.len();

    if report.degenerate > 0 {
        log::warn!(
            "{} parts became empty while closing gaps",
            report.degenerate
        );
    }

    let mut output = collection.with_features(features);
    output.crs = geographic;
    Ok((output, report))
}

fn validate(config: &CleanupConfig) -> Result<()> {
    if !config.buffer_distance.is_finite() || config.buffer_distance < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "buffer_distance must be a non-negative number, got {}",
            config.buffer_distance
        )));
    }
    if !config.min_area.is_finite() || config.min_area < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "min_area must be a non-negative number, got {}",
            config.min_area
        )));
    }
    if config.min_area > 0.0 && 2.0 * config.buffer_distance >= config.min_area.sqrt() {
        log::warn!(
            "buffer_distance {} is not small next to the smallest kept part ({} m²); shapes may change",
            config.buffer_distance,
            config.min_area
        );
    }
    Ok(())
}

/// One feature per single-part geometry, attributes copied onto every part
pub fn explode_features(features: Vec<Feature>) -> Vec<Feature> {
    let mut exploded = Vec::with_capacity(features.len());
    for mut feature in features {
        match feature.geometry.take() {
            Some(geometry) => {
                exploded.extend(
                    explode(geometry)
                        .into_iter()
                        .map(|part| feature.with_geometry(Some(part))),
                );
            }
            None => exploded.push(feature),
        }
    }
    exploded
}

/// Keep features whose area is at least `min_area`; returns the number dropped
///
/// Features without geometry have no area and are always dropped.
pub fn retain_min_area(features: Vec<Feature>, min_area: f64) -> (Vec<Feature>, usize) {
    let before = features.len();
    let kept: Vec<Feature> = features
        .into_iter()
        .filter(|f| {
            f.geometry
                .as_ref()
                .is_some_and(|g| polygonal_area(g) >= min_area)
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Grow then shrink by the same distance to dissolve hairline gaps
pub fn close_gaps(geometry: &Geometry<f64>, distance: f64) -> Geometry<f64> {
    if distance == 0.0 {
        return geometry.clone();
    }
    let grown = geometry.buffer(distance);
    collapse(grown.buffer(-distance))
}
