/*!
This module contains the struct definition for the GeoJSON format.
They are use to (de)serialize GeoJSON files into Rust structs.
The coordinates are kept as raw JSON and only typed once converted into a [`crate::geometry::Geometry`].
 */
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Reference system stamped on every written collection (WGS84 lon/lat)
pub const DEFAULT_CRS: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
}

impl Geometry {
    /// Coordinates given as an empty array, valid GeoJSON for any geometry kind
    pub fn is_empty(&self) -> bool {
        matches!(&self.coordinates, Some(Value::Array(coordinates)) if coordinates.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_tag")]
    pub typ: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
    pub features: Vec<Feature>,
}

fn feature_tag() -> String {
    "Feature".to_string()
}

fn collection_tag() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    /// Collection stamped with [`DEFAULT_CRS`]
    pub fn with_default_crs(features: Vec<Feature>) -> Self {
        FeatureCollection {
            typ: collection_tag(),
            crs: Some(json!({ "type": "name", "properties": { "name": DEFAULT_CRS } })),
            features,
        }
    }
}

/**
Reads the features out of a GeoJSON document.
Accepts a `FeatureCollection`, a single `Feature` or a bare array of features (as exported by some annotation tools).
 */
pub fn parse_features(document: Value) -> Result<Vec<Feature>> {
    if document.is_array() {
        return Ok(serde_json::from_value(document)?);
    }
    if !document.is_object() {
        return Err(Error::TypeUsage(
            "expected a FeatureCollection, a Feature or an array of features".to_string(),
        ));
    }
    let typ = document.get("type").and_then(Value::as_str).map(str::to_string);
    match typ.as_deref() {
        Some("FeatureCollection") => {
            let collection: FeatureCollection = serde_json::from_value(document)?;
            Ok(collection.features)
        }
        Some("Feature") => Ok(vec![serde_json::from_value(document)?]),
        Some(other) => Err(Error::TypeUsage(format!(
            "expected a FeatureCollection, a Feature or an array of features, found a '{}' object",
            other
        ))),
        None => Err(Error::TypeUsage("JSON object without a 'type' member".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_single_feature_and_array() {
        let feature = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] },
            "properties": { "name": "a" }
        });
        let collection = json!({ "type": "FeatureCollection", "features": [feature.clone(), feature.clone()] });

        assert_eq!(parse_features(collection).unwrap().len(), 2);
        assert_eq!(parse_features(feature.clone()).unwrap().len(), 1);
        assert_eq!(parse_features(json!([feature])).unwrap().len(), 1);
    }

    #[test]
    fn bare_geometry_is_a_type_usage_error() {
        let geometry = json!({ "type": "Point", "coordinates": [1.0, 2.0] });
        assert!(matches!(parse_features(geometry), Err(Error::TypeUsage(_))));
        assert!(matches!(parse_features(json!(3)), Err(Error::TypeUsage(_))));
    }

    #[test]
    fn null_geometry_and_properties_are_accepted() {
        let feature = json!({ "type": "Feature", "geometry": null, "properties": null });
        let features = parse_features(feature).unwrap();
        assert!(features[0].geometry.is_none());
        assert!(features[0].properties.is_none());
    }

    #[test]
    fn written_collection_carries_default_crs() {
        let collection = FeatureCollection::with_default_crs(vec![]);
        let text = serde_json::to_string(&collection).unwrap();
        assert!(text.contains(DEFAULT_CRS));
        assert!(text.contains("\"type\":\"FeatureCollection\""));
    }
}
