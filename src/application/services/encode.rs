//! GeoJSON serialization of a layer

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AttributeValue, Layer, LayerFeature};

/// Output formatting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indented JSON instead of a single line
    pub pretty: bool,
    /// Emit the feature index as string `id`
    pub feature_ids: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            feature_ids: true,
        }
    }
}

/// Serialize a layer as a `FeatureCollection`.
///
/// No `crs` member is written: RFC 7946 documents are WGS 84 by definition.
pub fn encode_layer(layer: &Layer, options: EncodeOptions) -> ApplicationResult<String> {
    let collection = FeatureCollection {
        bbox: None,
        features: layer
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| to_feature(index, feature, options))
            .collect(),
        foreign_members: None,
    };

    let text = if options.pretty {
        serde_json::to_string_pretty(&collection)
    } else {
        serde_json::to_string(&collection)
    };
    text.map_err(|e| ApplicationError::OperationFailed {
        context: format!("serialize layer '{}' as GeoJSON", layer.name),
        source: Box::new(e),
    })
}

fn to_feature(index: usize, feature: &LayerFeature, options: EncodeOptions) -> Feature {
    let properties: JsonObject = feature
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), property_value(value)))
        .collect();

    Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|g| Geometry::new(geojson::Value::from(g))),
        id: options
            .feature_ids
            .then(|| geojson::feature::Id::String(index.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn property_value(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Integer(i) => JsonValue::from(*i),
        AttributeValue::Float(f) => JsonValue::from(*f),
        AttributeValue::Text(s) => JsonValue::String(s.clone()),
    }
}
