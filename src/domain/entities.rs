//! Domain entities: core data structures

use std::fmt;

use geo::Geometry;

use crate::domain::crs::LayerCrs;

/// EPSG authority code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epsg(pub u16);

impl Epsg {
    /// WGS 84 geographic coordinates, the canonical GeoJSON reference system.
    pub const WGS84: Epsg = Epsg(4326);

    pub fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Typed attribute value of a feature.
///
/// Mirrors the dBASE column types a shapefile can carry, collapsed to
/// what JSON can express.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Build a numeric value, keeping whole numbers integral.
    ///
    /// dBASE stores integer columns as numerics without decimals; they come
    /// back as `f64` and should stay integers in the output.
    pub fn number(value: f64) -> Self {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
        if !value.is_finite() {
            AttributeValue::Null
        } else if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
            AttributeValue::Integer(value as i64)
        } else {
            AttributeValue::Float(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// A geometry paired with its attributes.
///
/// `geometry` is `None` for null shapes. Attributes keep the column order
/// of the attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFeature {
    pub geometry: Option<Geometry<f64>>,
    pub attributes: Vec<(String, AttributeValue)>,
}

/// Named collection of features sharing one CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    /// Declared CRS (`None` when the layer ships without a `.prj`)
    pub crs: Option<LayerCrs>,
    pub features: Vec<LayerFeature>,
}

impl Layer {
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

/// Default output file name for an exported layer.
pub fn default_output_name(layer: &str) -> String {
    // qualified names ("dir/roads") keep only the last segment
    let base = layer.rsplit('/').next().unwrap_or(layer);
    format!("{base}.geojson")
}
