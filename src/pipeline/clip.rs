use geo::{
    BooleanOps, BoundingRect, Geometry, GeometryCollection, Intersects, LineString,
    MultiLineString, MultiPoint, MultiPolygon,
};

use super::land::LandPolygon;
use crate::domain::FeatureCollection;
use crate::geometry::{as_multi_polygon, collapse, is_empty};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClipReport {
    pub features: usize,
    /// Features left with an empty geometry
    pub degenerate: usize,
    /// Features without geometry, passed through as-is
    pub missing_geometry: usize,
}

/// Reduce every region to the part of it that lies on land
///
/// Feature count, order and properties are unchanged; a region entirely at
/// sea keeps its place with an empty geometry.
pub fn clip(regions: FeatureCollection, land: &LandPolygon) -> (FeatureCollection, ClipReport) {
    let mut report = ClipReport {
        features: regions.len(),
        ..Default::default()
    };

    let features = regions
        .features
        .iter()
        .map(|feature| match feature.geometry {
            Some(ref geometry) => {
                let clipped = clip_geometry(geometry, land);
                if is_empty(&clipped) {
                    report.degenerate += 1;
                }
                feature.with_geometry(Some(clipped))
            }
            None => {
                report.missing_geometry += 1;
                feature.clone()
            }
        })
        .collect();

    if report.degenerate > 0 {
        log::warn!(
            "{} of {} regions have no land left after clipping",
            report.degenerate,
            report.features
        );
    }

    (regions.with_features(features), report)
}

/// Intersection of one geometry with the land
///
/// Areas are intersected, lines are cut to the land and points are kept
/// only where they touch it.
pub fn clip_geometry(geometry: &Geometry<f64>, land: &LandPolygon) -> Geometry<f64> {
    let nearby = land.parts_near(geometry.bounding_rect());

    if let Some(area) = as_multi_polygon(geometry) {
        return collapse(area.intersection(&nearby));
    }

    match geometry {
        Geometry::Line(line) => clip_lines(
            MultiLineString::new(vec![LineString::from(*line)]),
            &nearby,
        ),
        Geometry::LineString(ls) => clip_lines(MultiLineString::new(vec![ls.clone()]), &nearby),
        Geometry::MultiLineString(mls) => clip_lines(mls.clone(), &nearby),
        Geometry::Point(p) => {
            if nearby.intersects(p) {
                Geometry::Point(*p)
            } else {
                Geometry::MultiPoint(MultiPoint::new(Vec::new()))
            }
        }
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(
            mp.iter()
                .filter(|p| nearby.intersects(*p))
                .copied()
                .collect(),
        ),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.iter()
                .map(|member| clip_geometry(member, land))
                .filter(|member| !is_empty(member))
                .collect(),
        )),
        // areal variants were handled above
        _ => Geometry::MultiPolygon(MultiPolygon::new(Vec::new())),
    }
}

fn clip_lines(lines: MultiLineString<f64>, land: &MultiPolygon<f64>) -> Geometry<f64> {
    let mut clipped = land.clip(&lines, false);
    if clipped.0.len() == 1 {
        Geometry::LineString(clipped.0.remove(0))
    } else {
        Geometry::MultiLineString(clipped)
    }
}
