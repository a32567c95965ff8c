//! Core data structures for derived features.
//!
//! Defines the feature and collection types produced by conversion, and
//! their export to GeoJSON.

use geo_types::Geometry;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

/// Column name to decoded cell value
pub type Properties = BTreeMap<String, String>;

/// One row's geometry and its string attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Convert to a GeoJSON feature with string-valued properties
    pub fn to_geojson(&self) -> geojson::Feature {
        let properties: geojson::JsonObject = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Features in source row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.features.iter().map(Feature::to_geojson).collect(),
            foreign_members: None,
        }
    }

    /// Serialize as a GeoJSON document
    pub fn to_geojson_string(&self, pretty: bool) -> Result<String> {
        let collection = self.to_geojson();
        let json = if pretty {
            serde_json::to_string_pretty(&collection)?
        } else {
            serde_json::to_string(&collection)?
        };
        Ok(json)
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::point;

    fn sample_feature() -> Feature {
        let mut properties = Properties::new();
        properties.insert("id".to_string(), "1".to_string());
        properties.insert("x".to_string(), "2".to_string());
        Feature::new(Geometry::Point(point!(x: 2.0, y: 49.0)), properties)
    }

    #[test]
    fn test_feature_to_geojson() {
        let feature = sample_feature().to_geojson();

        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![2.0, 49.0]));

        let properties = feature.properties.unwrap();
        assert_eq!(properties.get("id"), Some(&Value::String("1".to_string())));
        assert_eq!(properties.get("x"), Some(&Value::String("2".to_string())));
    }

    #[test]
    fn test_collection_serializes_as_feature_collection() {
        let collection: FeatureCollection = vec![sample_feature(), sample_feature()]
            .into_iter()
            .collect();

        let json = collection.to_geojson_string(false).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["features"][0]["geometry"]["type"], "Point");
        assert_eq!(parsed["features"][0]["properties"]["id"], "1");
    }

    #[test]
    fn test_empty_collection() {
        let collection = FeatureCollection::new();
        assert!(collection.is_empty());

        let json = collection.to_geojson_string(true).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["features"], Value::Array(vec![]));
    }
}
