use geo::{BoundingRect, Geometry, Intersects, Line, LinesIter, MultiPolygon, Polygon, Rect};

use crate::domain::FeatureCollection;
use crate::geometry::polygonize;

/// What went into and came out of land assembly
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LandReport {
    /// Coastline features read
    pub features: usize,
    /// Features with no linework (null geometry, points)
    pub skipped: usize,
    /// Line segments fed to the polygonizer
    pub segments: usize,
    /// Closed faces found in the network
    pub rings: usize,
    pub dangles: usize,
    pub cut_edges: usize,
}

/// Union of every area enclosed by the coastline
///
/// Transient: built once per run and only ever read by the clipper.
#[derive(Debug, Clone)]
pub struct LandPolygon {
    parts: Vec<(Polygon<f64>, Option<Rect<f64>>)>,
    pub report: LandReport,
}

impl LandPolygon {
    pub fn new(area: MultiPolygon<f64>, report: LandReport) -> Self {
        let parts = area
            .0
            .into_iter()
            .map(|p| {
                let bounds = p.bounding_rect();
                (p, bounds)
            })
            .collect();
        Self { parts, report }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// The whole land area as one geometry
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.parts.iter().map(|(p, _)| p.clone()).collect())
    }

    /// Land parts whose bounding box touches `bounds`
    ///
    /// Parts outside the box cannot contribute to an intersection with
    /// anything inside it.
    pub fn parts_near(&self, bounds: Option<Rect<f64>>) -> MultiPolygon<f64> {
        let Some(bounds) = bounds else {
            return MultiPolygon::new(Vec::new());
        };
        MultiPolygon::new(
            self.parts
                .iter()
                .filter(|(_, b)| b.is_some_and(|b| b.intersects(&bounds)))
                .map(|(p, _)| p.clone())
                .collect(),
        )
    }
}

/// Rebuild land from coastline linework
///
/// All line geometries (and polygon rings, if the coastline comes as areas)
/// are merged into one network, every closed face of that network becomes a
/// polygon and the faces are unioned into one land geometry. Network
/// pieces that do not close a loop contribute nothing. If nothing closes,
/// the land is empty; that is reported, not raised.
pub fn assemble(coastline: &FeatureCollection) -> LandPolygon {
    let mut report = LandReport {
        features: coastline.len(),
        ..Default::default()
    };

    let mut lines: Vec<Line<f64>> = Vec::new();
    for feature in &coastline.features {
        let before = lines.len();
        if let Some(ref geometry) = feature.geometry {
            collect_lines(geometry, &mut lines);
        }
        if lines.len() == before {
            report.skipped += 1;
        }
    }
    report.segments = lines.len();
    log::debug!(
        "Coastline: {} features, {} segments, {} without linework",
        report.features,
        report.segments,
        report.skipped
    );

    let polygonized = polygonize(&lines);
    report.rings = polygonized.polygons.len();
    report.dangles = polygonized.dangles;
    report.cut_edges = polygonized.cut_edges;
    log::debug!(
        "Polygonized {} faces ({} dangling and {} cut edges removed)",
        report.rings,
        report.dangles,
        report.cut_edges
    );

    let land = geo::unary_union(&polygonized.polygons);
    if land.0.is_empty() {
        log::warn!("Coastline encloses no area; every clipped region will be empty");
    }

    LandPolygon::new(land, report)
}

fn collect_lines(geometry: &Geometry<f64>, lines: &mut Vec<Line<f64>>) {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        Geometry::GeometryCollection(gc) => {
            for member in gc {
                collect_lines(member, lines);
            }
        }
        Geometry::Line(l) => lines.push(*l),
        Geometry::LineString(ls) => lines.extend(ls.lines_iter()),
        Geometry::MultiLineString(mls) => lines.extend(mls.lines_iter()),
        Geometry::Polygon(p) => lines.extend(p.lines_iter()),
        Geometry::MultiPolygon(mp) => lines.extend(mp.lines_iter()),
        Geometry::Rect(r) => lines.extend(r.to_lines()),
        Geometry::Triangle(t) => lines.extend(t.to_lines()),
    }
}
