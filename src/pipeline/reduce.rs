use geojson::{JsonObject, JsonValue};

use crate::domain::Properties;

/// Strip every feature of a raw FeatureCollection down to the listed
/// property keys; returns the number of features
///
/// Only `properties` is rewritten. Geometry, ids, bounding boxes and member
/// order are left exactly as they were read.
pub fn reduce(document: &mut JsonObject, keep: &[String]) -> usize {
    let Some(JsonValue::Array(features)) = document.get_mut("features") else {
        return 0;
    };

    for feature in features.iter_mut() {
        let Some(feature) = feature.as_object_mut() else {
            continue;
        };
        let reduced = match feature.get("properties") {
            Some(JsonValue::Object(properties)) => reduce_properties(properties, keep),
            _ => Properties::new(),
        };
        feature.insert("properties".to_string(), JsonValue::Object(reduced));
    }
    features.len()
}

/// Only the listed keys, skipping those that are absent or null
pub fn reduce_properties(properties: &Properties, keep: &[String]) -> Properties {
    keep.iter()
        .filter_map(|key| {
            properties
                .get(key)
                .filter(|value| !value.is_null())
                .map(|value| (key.clone(), value.clone()))
        })
        .collect()
}
