use geo::Geometry;
use geojson::feature::Id;

use crate::geometry::Crs;

/// Non-geometry attributes of a feature
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// One geographic record: an optional geometry plus its properties
///
/// Identity is positional; `id` is only carried through when the source
/// file had one.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<Id>,
    pub geometry: Option<Geometry<f64>>,
    pub properties: Properties,
    pub foreign_members: Option<Properties>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, properties: Properties) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties,
            foreign_members: None,
        }
    }

    /// Same record with a different geometry
    pub fn with_geometry(&self, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            id: self.id.clone(),
            geometry,
            properties: self.properties.clone(),
            foreign_members: self.foreign_members.clone(),
        }
    }
}

/// Ordered features sharing one coordinate reference system
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs: Crs,
    pub foreign_members: Option<Properties>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>, crs: Crs) -> Self {
        Self {
            features,
            crs,
            foreign_members: None,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Replace every feature while keeping the CRS and collection members
    pub fn with_features(self, features: Vec<Feature>) -> Self {
        Self { features, ..self }
    }
}
