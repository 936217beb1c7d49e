//! Coordinate reference systems understood by the pipeline
//!
//! Only two are needed: geographic WGS84 for input/output and spherical
//! ("web") Mercator for area comparisons in meters. Both are handled in
//! closed form, so there is no dependency on libproj.

use geo::{Coord, Geometry, MapCoords};
use std::fmt;

use crate::error::{Error, Result};

/// Sphere radius used by EPSG:3857
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which web Mercator becomes a square world
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// EPSG:4326 / OGC:CRS84, longitude-latitude degrees
    #[default]
    Wgs84,
    /// EPSG:3857, meters
    WebMercator,
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 | 900913 => Ok(Crs::WebMercator),
            other => Err(Error::UnsupportedCrs(format!("EPSG:{}", other))),
        }
    }

    /// Parse a CRS name as found in the legacy GeoJSON `crs` member
    ///
    /// Accepts `EPSG:4326`, `urn:ogc:def:crs:EPSG::3857`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84` and similar spellings.
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }

        let code = upper
            .rsplit(':')
            .next()
            .and_then(|c| c.parse::<u32>().ok())
            .filter(|_| upper.contains("EPSG"));

        match code {
            Some(code) => Self::from_epsg(code).map_err(|_| Error::UnsupportedCrs(name.to_string())),
            None => Err(Error::UnsupportedCrs(name.to_string())),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }

    /// URN written into the legacy `crs` member
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg())
    }

    /// Whether planar areas in this CRS are square meters
    pub fn is_metric(&self) -> bool {
        matches!(self, Crs::WebMercator)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Project a longitude/latitude coordinate to web Mercator meters
///
/// Latitudes beyond ±85.0511° are clamped, as the projection diverges at the poles.
pub fn to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = EARTH_RADIUS * c.x.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    Coord { x, y }
}

/// Inverse of [`to_web_mercator`]
pub fn from_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let lon = (c.x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (c.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Coord { x: lon, y: lat }
}

/// Reproject a geometry between two supported CRSs
pub fn reproject(geometry: &Geometry<f64>, from: Crs, to: Crs) -> Geometry<f64> {
    match (from, to) {
        (Crs::Wgs84, Crs::WebMercator) => geometry.map_coords(to_web_mercator),
        (Crs::WebMercator, Crs::Wgs84) => geometry.map_coords(from_web_mercator),
        _ => geometry.clone(),
    }
}
