pub mod noding;
pub mod polygonize;
pub mod projection;

pub use polygonize::{Polygonized, polygonize};
pub use projection::{Crs, reproject};

use geo::{Area, Geometry, MultiPolygon};

/// Split multi-part geometries and collections into their single parts
pub fn explode(geometry: Geometry<f64>) -> Vec<Geometry<f64>> {
    match geometry {
        Geometry::MultiPoint(m) => m.0.into_iter().map(Geometry::Point).collect(),
        Geometry::MultiLineString(m) => m.0.into_iter().map(Geometry::LineString).collect(),
        Geometry::MultiPolygon(m) => m.0.into_iter().map(Geometry::Polygon).collect(),
        Geometry::GeometryCollection(gc) => gc.0.into_iter().flat_map(explode).collect(),
        other => vec![other],
    }
}

/// A one-part multipolygon as a plain polygon, anything else unchanged
pub fn collapse(multi: MultiPolygon<f64>) -> Geometry<f64> {
    if multi.0.len() == 1 {
        let mut parts = multi.0;
        Geometry::Polygon(parts.remove(0))
    } else {
        Geometry::MultiPolygon(multi)
    }
}

/// The areal part of a geometry, if it has one
pub fn as_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(m) => Some(m.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}

/// Whether a geometry covers no points at all
pub fn is_empty(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(m) => m.0.is_empty(),
        Geometry::MultiLineString(m) => m.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(m) => m.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
            false
        }
    }
}

/// Planar area in squared CRS units; points and lines have none
pub fn polygonal_area(geometry: &Geometry<f64>) -> f64 {
    geometry.unsigned_area()
}
