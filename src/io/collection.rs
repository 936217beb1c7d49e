use clap::ValueEnum;
use geojson::{GeoJson, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{Feature, FeatureCollection};
use crate::error::{Error, Result};
use crate::geometry::Crs;

/// Layout of written GeoJSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Two-space indentation, stable for diffs
    Pretty,
    /// Everything on one line
    Compact,
}

/// Read a whole GeoJSON FeatureCollection into memory
///
/// The legacy `crs` member is honored; without it the collection is WGS84
/// as RFC 7946 requires.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature_collection(&contents, path)
}

fn parse_feature_collection(contents: &str, path: &Path) -> Result<FeatureCollection> {
    let geojson: GeoJson = contents.parse().map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::NotFeatureCollection {
            path: path.to_path_buf(),
        });
    };

    let mut foreign_members = collection.foreign_members;
    let crs = match foreign_members.as_mut().and_then(|m| m.remove("crs")) {
        Some(member) => parse_crs_member(&member)?,
        None => Crs::Wgs84,
    };

    let features = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| convert_feature(index, feature))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        features,
        crs,
        foreign_members: foreign_members.filter(|m| !m.is_empty()),
    })
}

fn parse_crs_member(member: &JsonValue) -> Result<Crs> {
    let name = member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::UnsupportedCrs(member.to_string()))?;
    Crs::from_name(name)
}

fn convert_feature(index: usize, feature: geojson::Feature) -> Result<Feature> {
    let geometry = match feature.geometry {
        Some(g) => Some(
            geo::Geometry::<f64>::try_from(g.value).map_err(|e| Error::Geometry {
                index,
                message: e.to_string(),
            })?,
        ),
        None => None,
    };

    Ok(Feature {
        id: feature.id,
        geometry,
        properties: feature.properties.unwrap_or_default(),
        foreign_members: feature.foreign_members,
    })
}

fn to_geojson(collection: &FeatureCollection) -> geojson::FeatureCollection {
    let features = collection
        .features
        .iter()
        .map(|f| geojson::Feature {
            bbox: None,
            geometry: f
                .geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id: f.id.clone(),
            properties: Some(f.properties.clone()),
            foreign_members: f.foreign_members.clone(),
        })
        .collect();

    let mut foreign_members = collection.foreign_members.clone().unwrap_or_default();
    if collection.crs != Crs::Wgs84 {
        foreign_members.insert("crs".to_string(), crs_member(collection.crs));
    }

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members).filter(|m| !m.is_empty()),
    }
}

fn crs_member(crs: Crs) -> JsonValue {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(crs.urn()));

    let mut member = JsonObject::new();
    member.insert("type".to_string(), JsonValue::from("name"));
    member.insert("properties".to_string(), JsonValue::Object(properties));
    JsonValue::Object(member)
}

/// Write a FeatureCollection as GeoJSON, replacing any existing file
///
/// Non-ASCII text is written as-is, never escaped.
pub fn write_feature_collection(
    path: &Path,
    collection: &FeatureCollection,
    style: OutputStyle,
) -> Result<()> {
    write_json(path, &to_geojson(collection), style)
}

/// Read a FeatureCollection as plain JSON
///
/// Nothing is converted: coordinates keep every dimension and precision,
/// rings stay as written and members such as `bbox` survive untouched.
pub fn read_document(path: &Path) -> Result<JsonObject> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&contents, path)
}

fn parse_document(contents: &str, path: &Path) -> Result<JsonObject> {
    let document: JsonObject = serde_json::from_str(contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source: Box::new(geojson::Error::MalformedJson(source)),
    })?;

    let is_collection = document.get("type").and_then(JsonValue::as_str)
        == Some("FeatureCollection")
        && document.get("features").is_some_and(JsonValue::is_array);
    if !is_collection {
        return Err(Error::NotFeatureCollection {
            path: path.to_path_buf(),
        });
    }
    Ok(document)
}

/// Write a JSON document read by [`read_document`], replacing any existing file
pub fn write_document(path: &Path, document: &JsonObject, style: OutputStyle) -> Result<()> {
    write_json(path, document, style)
}

fn write_json<T: Serialize>(path: &Path, document: &T, style: OutputStyle) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    match style {
        OutputStyle::Pretty => serde_json::to_writer_pretty(&mut writer, document)?,
        OutputStyle::Compact => serde_json::to_writer(&mut writer, document)?,
    }

    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, MultiPolygon, polygon};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    const PREFECTURES: &str = r#"{
        "type": "FeatureCollection",
        "name": "prefectures",
        "features": [
            {
                "type": "Feature",
                "id": 13,
                "properties": {"id": "13", "nam_ja": "東京都"},
                "geometry": {"type": "Polygon", "coordinates": [[[139.0, 35.5], [140.0, 35.5], [140.0, 36.0], [139.0, 35.5]]]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_collection() {
        let collection = parse_feature_collection(PREFECTURES, Path::new("p.geojson")).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.crs, Crs::Wgs84);
        assert!(matches!(
            collection.features[0].geometry,
            Some(Geometry::Polygon(_))
        ));
        assert_eq!(collection.features[0].properties["nam_ja"], json!("東京都"));
        assert!(collection.features[1].geometry.is_none());
        assert!(collection.features[1].properties.is_empty());
        assert_eq!(
            collection.foreign_members.unwrap()["name"],
            json!("prefectures")
        );
    }

    #[test]
    fn test_rejects_bare_feature() {
        let json = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let err = parse_feature_collection(json, Path::new("f.geojson")).unwrap_err();
        assert!(matches!(err, Error::NotFeatureCollection { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = parse_feature_collection("{\"type\": ", Path::new("bad.geojson")).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_feature_collection(Path::new("/nonexistent/coast.geojson")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_reads_legacy_crs_member() {
        let json = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": []
        }"#;
        let collection = parse_feature_collection(json, Path::new("m.geojson")).unwrap();
        assert_eq!(collection.crs, Crs::WebMercator);
        assert!(collection.foreign_members.is_none());
    }

    #[test]
    fn test_unknown_crs_is_an_error() {
        let json = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:6668"}},
            "features": []
        }"#;
        let err = parse_feature_collection(json, Path::new("j.geojson")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCrs(_)));
    }

    #[test]
    fn test_write_pretty_keeps_unicode_and_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.geojson");

        let collection = parse_feature_collection(PREFECTURES, Path::new("p.geojson")).unwrap();
        write_feature_collection(&path, &collection, OutputStyle::Pretty).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("東京都"));
        assert!(written.contains("\n  \"features\": ["));

        let reread = read_feature_collection(&path).unwrap();
        assert_eq!(reread, collection);
    }

    #[test]
    fn test_write_compact_is_single_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.geojson");

        let collection = parse_feature_collection(PREFECTURES, Path::new("p.geojson")).unwrap();
        write_feature_collection(&path, &collection, OutputStyle::Compact).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim_end().lines().count(), 1);
    }

    #[test]
    fn test_write_empty_geometry_and_crs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.geojson");

        let mut collection = FeatureCollection::new(Vec::new(), Crs::WebMercator);
        collection.features.push(Feature::new(
            Geometry::MultiPolygon(MultiPolygon::new(Vec::new())),
            Default::default(),
        ));
        collection.features.push(Feature::new(
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
            Default::default(),
        ));
        write_feature_collection(&path, &collection, OutputStyle::Compact).unwrap();

        let value: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value["features"][0]["geometry"],
            json!({"type": "MultiPolygon", "coordinates": []})
        );
        assert_eq!(
            value["crs"]["properties"]["name"],
            json!("urn:ogc:def:crs:EPSG::3857")
        );

        let reread = read_feature_collection(&path).unwrap();
        assert_eq!(reread.crs, Crs::WebMercator);
        assert_eq!(reread.len(), 2);
    }

    #[test]
    fn test_document_keeps_coordinates_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coast.geojson");
        let json = r#"{"type":"FeatureCollection","bbox":[0,0,1,1],"features":[{"type":"Feature","properties":{"id":"1"},"geometry":{"type":"LineString","coordinates":[[0.0,0.0,12.5],[1.0,1.0,7.0]]}}]}"#;

        let document = parse_document(json, Path::new("coast.geojson")).unwrap();
        write_document(&path, &document, OutputStyle::Compact).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim_end(), json);
    }

    #[test]
    fn test_document_must_be_a_collection() {
        let json = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        let err = parse_document(json, Path::new("f.geojson")).unwrap_err();
        assert!(matches!(err, Error::NotFeatureCollection { .. }));

        let json = r#"{"type": "FeatureCollection"}"#;
        let err = parse_document(json, Path::new("f.geojson")).unwrap_err();
        assert!(matches!(err, Error::NotFeatureCollection { .. }));

        let err = parse_document("[1, 2]", Path::new("a.geojson")).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
