//! Reprojection of layer geometries to WGS 84
//!
//! Projection definitions come from the bundled EPSG database
//! (`crs-definitions`) unless overridden in the settings. A `.prj` without
//! a usable EPSG code is converted from its WKT directly (`proj4wkt`).

use std::collections::BTreeMap;
use std::fmt;

use geo::{Coord, Geometry, MapCoords};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, Epsg, Layer, LayerCrs};

const WGS84_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Look up the proj string for an EPSG code.
///
/// Overrides are keyed either by the bare code (`"2056"`) or by
/// `"EPSG:2056"`.
pub fn proj_definition(epsg: Epsg, overrides: &BTreeMap<String, String>) -> Option<String> {
    overrides
        .get(&epsg.code().to_string())
        .or_else(|| overrides.get(&epsg.to_string()))
        .cloned()
        .or_else(|| crs_definitions::from_code(epsg.code()).map(|def| def.proj4.to_string()))
}

/// Convert WKT (ESRI or OGC flavour) to a proj string.
pub fn wkt_definition(wkt: &str) -> Option<String> {
    match proj4wkt::wkt_to_projstring(wkt) {
        Ok(definition) => Some(definition),
        Err(e) => {
            debug!("wkt_definition: {e}");
            None
        }
    }
}

/// CRS a layer is reprojected from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCrs {
    /// Resolved through an authority code or a known name
    Epsg(Epsg),
    /// Taken from the WKT itself
    Definition { name: String, proj: String },
}

impl fmt::Display for SourceCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCrs::Epsg(epsg) => write!(f, "{epsg}"),
            SourceCrs::Definition { name, .. } => f.write_str(name),
        }
    }
}

/// Datum-aware transformation from one CRS to WGS 84.
pub struct Reprojector {
    from: String,
    source: Proj,
    target: Proj,
}

impl Reprojector {
    pub fn to_wgs84(from: Epsg, overrides: &BTreeMap<String, String>) -> ApplicationResult<Self> {
        let definition =
            proj_definition(from, overrides).ok_or(DomainError::UnknownEpsgCode(from.code()))?;
        Self::from_definition(&from.to_string(), &definition)
    }

    pub fn from_source(
        from: &SourceCrs,
        overrides: &BTreeMap<String, String>,
    ) -> ApplicationResult<Self> {
        match from {
            SourceCrs::Epsg(epsg) => Self::to_wgs84(*epsg, overrides),
            SourceCrs::Definition { name, proj } => Self::from_definition(name, proj),
        }
    }

    fn from_definition(from: &str, definition: &str) -> ApplicationResult<Self> {
        debug!("from_definition: {} = {}", from, definition);
        let source = Proj::from_proj_string(definition).map_err(|e| {
            ApplicationError::Reprojection {
                from: from.to_string(),
                message: format!("invalid definition '{definition}': {e}"),
            }
        })?;
        let target =
            Proj::from_proj_string(WGS84_DEFINITION).map_err(|e| ApplicationError::Reprojection {
                from: from.to_string(),
                message: format!("invalid WGS 84 definition: {e}"),
            })?;

        Ok(Self {
            from: from.to_string(),
            source,
            target,
        })
    }

    /// Transform one coordinate; output is longitude/latitude in degrees.
    pub fn transform_coord(&self, coord: Coord<f64>) -> ApplicationResult<Coord<f64>> {
        // proj4rs works in radians for geographic systems
        let mut point = if self.source.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.source, &self.target, &mut point).map_err(|e| {
            ApplicationError::Reprojection {
                from: self.from.clone(),
                message: format!("({}, {}): {e}", coord.x, coord.y),
            }
        })?;
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }

    pub fn reproject(&self, geometry: &Geometry<f64>) -> ApplicationResult<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }

    /// Reproject every geometry of the layer in place; attributes are untouched.
    pub fn reproject_layer(&self, layer: &mut Layer) -> ApplicationResult<()> {
        for feature in &mut layer.features {
            if let Some(geometry) = &feature.geometry {
                feature.geometry = Some(self.reproject(geometry)?);
            }
        }
        layer.crs = Some(LayerCrs::wgs84());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Point};

    const EPS: f64 = 1e-6;

    #[test]
    fn given_web_mercator_origin_when_reprojecting_then_zero_zero() {
        let r = Reprojector::to_wgs84(Epsg(3857), &BTreeMap::new()).unwrap();
        let c = r.transform_coord(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(c.x.abs() < EPS && c.y.abs() < EPS, "got {:?}", c);
    }

    #[test]
    fn given_web_mercator_point_when_reprojecting_then_degrees() {
        let r = Reprojector::to_wgs84(Epsg(3857), &BTreeMap::new()).unwrap();
        // 10 degrees east on the equator
        let geometry = Geometry::Point(point!(x: 1_113_194.907_932_735_7, y: 0.0));

        let Geometry::Point(p) = r.reproject(&geometry).unwrap() else {
            panic!("expected point");
        };
        assert!((p.x() - 10.0).abs() < EPS, "got {:?}", p);
        assert!(p.y().abs() < EPS, "got {:?}", p);
    }

    #[test]
    fn given_wgs84_source_when_reprojecting_then_coordinates_kept() {
        let r = Reprojector::to_wgs84(Epsg::WGS84, &BTreeMap::new()).unwrap();
        let p: Point<f64> = point!(x: 10.0, y: 50.0);

        let Geometry::Point(out) = r.reproject(&Geometry::Point(p)).unwrap() else {
            panic!("expected point");
        };
        assert!((out.x() - 10.0).abs() < EPS && (out.y() - 50.0).abs() < EPS);
    }

    #[test]
    fn given_unknown_code_when_creating_then_domain_error() {
        let err = Reprojector::to_wgs84(Epsg(1), &BTreeMap::new())
            .err()
            .expect("unknown code must fail");
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UnknownEpsgCode(1))
        ));
    }

    #[test]
    fn given_override_when_looking_up_definition_then_override_wins() {
        let mut overrides = BTreeMap::new();
        overrides.insert("EPSG:3857".to_string(), "+proj=merc +a=6378137 +b=6378137".to_string());

        let def = proj_definition(Epsg(3857), &overrides).unwrap();
        assert_eq!(def, "+proj=merc +a=6378137 +b=6378137");
    }

    #[test]
    fn given_transverse_mercator_wkt_when_reprojecting_then_degrees() {
        // Arrange
        let wkt = r#"PROJCS["Custom_TM",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",9.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;
        let source = SourceCrs::Definition {
            name: "Custom_TM".to_string(),
            proj: wkt_definition(wkt).expect("WKT converts"),
        };

        // Act
        let r = Reprojector::from_source(&source, &BTreeMap::new()).unwrap();
        let c = r.transform_coord(Coord { x: 500_000.0, y: 0.0 }).unwrap();

        // Assert
        assert!((c.x - 9.0).abs() < EPS && c.y.abs() < EPS, "got {:?}", c);
    }

    #[test]
    fn given_garbage_wkt_when_converting_then_none() {
        assert_eq!(wkt_definition("not a coordinate system"), None);
    }

    #[test]
    fn test_source_crs_display() {
        assert_eq!(SourceCrs::Epsg(Epsg(3857)).to_string(), "EPSG:3857");
        let def = SourceCrs::Definition {
            name: "Local_Grid".to_string(),
            proj: "+proj=tmerc".to_string(),
        };
        assert_eq!(def.to_string(), "Local_Grid");
    }

    #[test]
    fn given_invalid_override_when_creating_then_reprojection_error() {
        let mut overrides = BTreeMap::new();
        overrides.insert("3857".to_string(), "+proj=nonsense".to_string());

        let err = Reprojector::to_wgs84(Epsg(3857), &overrides).err().unwrap();
        assert!(matches!(err, ApplicationError::Reprojection { .. }));
    }
}
