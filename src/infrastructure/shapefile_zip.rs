//! Shapefile layers packed in a ZIP archive
//!
//! Every `.shp` entry is one layer; its `.dbf` (attributes) and `.prj`
//! (CRS) sidecars share the entry path up to the extension. Entries are read
//! into memory; the archive is closed when each call returns.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::path::Path;

use geo::Geometry;
use itertools::Itertools;
use shapefile::dbase::{self, FieldValue};
use shapefile::{Shape, ShapeReader};
use tracing::{debug, instrument};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::{AttributeValue, Layer, LayerCrs, LayerFeature};
use crate::infrastructure::traits::LayerSource;

/// Archive entries making up one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayerEntries {
    name: String,
    shp: String,
    dbf: Option<String>,
    prj: Option<String>,
}

/// [`LayerSource`] for ZIP archives of ESRI shapefiles.
#[derive(Debug, Default)]
pub struct ZipShapefileSource;

impl ZipShapefileSource {
    fn open(archive: &Path) -> io::Result<ZipArchive<BufReader<File>>> {
        let file = File::open(archive)?;
        ZipArchive::new(BufReader::new(file)).map_err(zip_error)
    }

    fn layers<R: Read + Seek>(archive: &mut ZipArchive<R>) -> io::Result<Vec<LayerEntries>> {
        let names = entry_names(archive)?;
        Ok(layer_entries(&names))
    }
}

impl LayerSource for ZipShapefileSource {
    #[instrument(level = "debug", skip(self))]
    fn list_layers(&self, archive: &Path) -> io::Result<Vec<String>> {
        let mut zip = Self::open(archive)?;
        let layers = Self::layers(&mut zip)?;
        debug!("list_layers: {} layers", layers.len());
        Ok(layers.into_iter().map(|l| l.name).collect())
    }

    #[instrument(level = "debug", skip(self))]
    fn read_layer(&self, archive: &Path, layer: &str) -> io::Result<Layer> {
        let mut zip = Self::open(archive)?;
        let entries = Self::layers(&mut zip)?
            .into_iter()
            .find(|l| l.name == layer)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("layer '{layer}' not found"))
            })?;
        debug!("read_layer: entries={:?}", entries);

        let shp = read_entry(&mut zip, &entries.shp)?;
        let dbf = entries
            .dbf
            .as_deref()
            .map(|name| read_entry(&mut zip, name))
            .transpose()?;
        let prj = entries
            .prj
            .as_deref()
            .map(|name| read_entry(&mut zip, name))
            .transpose()?;

        let crs = prj
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .filter(|wkt| !wkt.trim().is_empty())
            .map(|wkt| LayerCrs::from_wkt(&wkt));
        let features = read_features(shp, dbf)?;
        debug!("read_layer: {} features, crs={:?}", features.len(), crs.as_ref().map(|c| &c.name));

        Ok(Layer {
            name: layer.to_string(),
            crs,
            features,
        })
    }
}

fn zip_error(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// File entry names in archive order, without folders and macOS metadata.
fn entry_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> io::Result<Vec<String>> {
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name();
        let file_name = name.rsplit('/').next().unwrap_or(name);
        if name.starts_with("__MACOSX/") || file_name.starts_with("._") {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Strip a case-insensitive extension (`ext` includes the dot).
fn strip_extension<'a>(name: &'a str, ext: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(ext.len())?;
    let tail = name.get(split..)?;
    tail.eq_ignore_ascii_case(ext).then(|| &name[..split])
}

fn file_stem(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Group entry names into layers.
///
/// A layer is named after its `.shp` file stem. Stems that occur in more
/// than one folder keep their folder path so names stay unique.
fn layer_entries(names: &[String]) -> Vec<LayerEntries> {
    let by_lowercase: HashMap<String, &String> =
        names.iter().map(|n| (n.to_lowercase(), n)).collect();

    let shapes: Vec<(&String, &str)> = names
        .iter()
        .filter_map(|n| strip_extension(n, ".shp").map(|stem| (n, stem)))
        .collect();
    let stem_counts = shapes.iter().map(|(_, stem)| file_stem(stem)).counts();

    shapes
        .iter()
        .map(|(shp, stem)| {
            let short = file_stem(stem);
            let name = if stem_counts.get(short).copied().unwrap_or(0) > 1 {
                stem.to_string()
            } else {
                short.to_string()
            };
            let sidecar = |ext: &str| {
                by_lowercase
                    .get(&format!("{}{}", stem.to_lowercase(), ext))
                    .map(|n| n.to_string())
            };
            LayerEntries {
                name,
                shp: shp.to_string(),
                dbf: sidecar(".dbf"),
                prj: sidecar(".prj"),
            }
        })
        .collect()
}

/// Upper bound for preallocating an entry buffer; larger entries grow as read.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> io::Result<Vec<u8>> {
    let mut entry = archive.by_name(name).map_err(zip_error)?;
    let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// The size in the zip header is untrusted input.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

fn read_features(shp: Vec<u8>, dbf: Option<Vec<u8>>) -> io::Result<Vec<LayerFeature>> {
    let shape_reader = ShapeReader::new(Cursor::new(shp))
        .map_err(|e| invalid_data(format!("invalid .shp: {e}")))?;

    let Some(dbf) = dbf else {
        // no attribute table: geometry only
        return shape_reader
            .read()
            .map_err(|e| invalid_data(format!("invalid .shp: {e}")))?
            .into_iter()
            .map(|shape| {
                Ok(LayerFeature {
                    geometry: shape_to_geometry(shape)?,
                    attributes: Vec::new(),
                })
            })
            .collect();
    };

    let dbase_reader = dbase::Reader::new(Cursor::new(dbf))
        .map_err(|e| invalid_data(format!("invalid .dbf: {e}")))?;
    let columns: Vec<String> = dbase_reader
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    reader
        .iter_shapes_and_records()
        .map(|result| {
            let (shape, record) = result.map_err(|e| invalid_data(format!("invalid record: {e}")))?;
            Ok(LayerFeature {
                geometry: shape_to_geometry(shape)?,
                attributes: record_attributes(&columns, record),
            })
        })
        .collect()
}

fn shape_to_geometry(shape: Shape) -> io::Result<Option<Geometry<f64>>> {
    match shape {
        Shape::NullShape => Ok(None),
        Shape::Multipatch(_) => Err(invalid_data(
            "unsupported geometry type: Multipatch".to_string(),
        )),
        shape => Geometry::<f64>::try_from(shape)
            .map(|geometry| Some(single_part(geometry)))
            .map_err(|e| invalid_data(format!("unsupported geometry: {e}"))),
    }
}

/// Shapefile polygons and polylines are always multi-part; unwrap the
/// single-part ones.
fn single_part(geometry: Geometry<f64>) -> Geometry<f64> {
    match geometry {
        Geometry::MultiPolygon(mut polygons) if polygons.0.len() == 1 => {
            Geometry::Polygon(polygons.0.remove(0))
        }
        Geometry::MultiLineString(mut lines) if lines.0.len() == 1 => {
            Geometry::LineString(lines.0.remove(0))
        }
        other => other,
    }
}

/// Attribute values in table column order.
fn record_attributes(columns: &[String], record: dbase::Record) -> Vec<(String, AttributeValue)> {
    let mut fields: HashMap<String, FieldValue> = record.into();
    columns
        .iter()
        .filter_map(|name| {
            let value = fields.remove(name)?;
            Some((name.clone(), attribute_value(value)))
        })
        .collect()
}

#[allow(unreachable_patterns)]
fn attribute_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s),
        FieldValue::Numeric(Some(n)) => AttributeValue::number(n),
        FieldValue::Float(Some(n)) => AttributeValue::number(f64::from(n)),
        FieldValue::Integer(n) => AttributeValue::Integer(i64::from(n)),
        FieldValue::Double(n) | FieldValue::Currency(n) => AttributeValue::number(n),
        FieldValue::Logical(Some(b)) => AttributeValue::Bool(b),
        FieldValue::Date(Some(d)) => {
            AttributeValue::Text(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::DateTime(dt) => {
            let (d, t) = (dt.date(), dt.time());
            AttributeValue::Text(format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                d.year(),
                d.month(),
                d.day(),
                t.hours(),
                t.minutes(),
                t.seconds()
            ))
        }
        FieldValue::Memo(s) => AttributeValue::Text(s),
        _ => AttributeValue::Null,
    }
}
