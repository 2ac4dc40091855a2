//! Shared fixtures: real shapefiles zipped into archives, scripted prompts
//! and a recording reporter.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shapefile::dbase::{self, FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use shason::infrastructure::traits::{Reporter, SelectionItem, Selector, TextPrompt};

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

pub const WEB_MERCATOR_PRJ: &str = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Mercator_Auxiliary_Sphere"],PARAMETER["False_Easting",0.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",0.0],PARAMETER["Standard_Parallel_1",0.0],PARAMETER["Auxiliary_Sphere_Type",0.0],UNIT["Meter",1.0]]"#;

/// ESRI California zone III in US survey feet; carries no EPSG authority.
pub const STATE_PLANE_CA3_FEET_PRJ: &str = r#"PROJCS["NAD_1983_StatePlane_California_III_FIPS_0403_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",6561666.666666666],PARAMETER["False_Northing",1640416.666666667],PARAMETER["Central_Meridian",-120.5],PARAMETER["Standard_Parallel_1",37.06666666666667],PARAMETER["Standard_Parallel_2",38.43333333333333],PARAMETER["Latitude_Of_Origin",36.5],UNIT["Foot_US",0.3048006096012192]]"#;

/// 10 degrees east on the equator in EPSG:3857 metres
pub const MERCATOR_10_EAST: f64 = 1_113_194.907_932_735_7;

/// Unit square, clockwise as shapefiles store outer rings.
pub fn unit_square() -> Polygon {
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 0.0),
    ]))
}

fn field(name: &str) -> FieldName {
    FieldName::try_from(name).unwrap()
}

/// Write `<dir>/<name>.shp|shx|dbf` with polygons and `id`/`area` attributes.
pub fn write_polygons(dir: &Path, name: &str, polygons: &[(Polygon, f64)]) -> Vec<PathBuf> {
    let table = TableWriterBuilder::new()
        .add_numeric_field(field("id"), 10, 0)
        .add_numeric_field(field("area"), 10, 0);
    let shp = dir.join(format!("{name}.shp"));
    let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();
    for (index, (polygon, area)) in polygons.iter().enumerate() {
        let mut record = Record::default();
        record.insert("id".to_string(), FieldValue::Numeric(Some(index as f64 + 1.0)));
        record.insert("area".to_string(), FieldValue::Numeric(Some(*area)));
        writer.write_shape_and_record(polygon, &record).unwrap();
    }
    drop(writer);
    sidecars(dir, name)
}

/// Write `<dir>/<name>.shp|shx|dbf` with points and a `name` attribute.
pub fn write_points(dir: &Path, name: &str, points: &[(f64, f64, &str)]) -> Vec<PathBuf> {
    let table = TableWriterBuilder::new().add_character_field(field("name"), 32);
    let shp = dir.join(format!("{name}.shp"));
    let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();
    for (x, y, label) in points {
        let mut record = Record::default();
        record.insert(
            "name".to_string(),
            FieldValue::Character(Some(label.to_string())),
        );
        writer
            .write_shape_and_record(&Point::new(*x, *y), &record)
            .unwrap();
    }
    drop(writer);
    sidecars(dir, name)
}

fn sidecars(dir: &Path, name: &str) -> Vec<PathBuf> {
    ["shp", "shx", "dbf"]
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .collect()
}

/// Write a `.prj` next to the layer files.
pub fn write_prj(dir: &Path, name: &str, wkt: &str) -> PathBuf {
    let path = dir.join(format!("{name}.prj"));
    std::fs::write(&path, wkt).unwrap();
    path
}

/// Zip files under their archive names.
pub fn zip_files(archive: &Path, entries: &[(String, PathBuf)]) {
    let file = File::create(archive).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, path) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(&std::fs::read(path).unwrap()).unwrap();
    }
    writer.finish().unwrap();
}

fn entries(files: &[PathBuf]) -> Vec<(String, PathBuf)> {
    files
        .iter()
        .map(|p| {
            (
                p.file_name().unwrap().to_string_lossy().to_string(),
                p.clone(),
            )
        })
        .collect()
}

/// Archive with `points_layer` (two points) and `polygons_layer` (one unit
/// square, area 100), both declared as WGS 84.
pub fn two_layer_archive(temp: &TempDir) -> PathBuf {
    let src = temp.path().join("src");
    std::fs::create_dir_all(&src).unwrap();

    let mut files = write_points(&src, "points_layer", &[(10.0, 50.0, "a"), (11.5, 51.25, "b")]);
    files.push(write_prj(&src, "points_layer", WGS84_PRJ));
    files.extend(write_polygons(&src, "polygons_layer", &[(unit_square(), 100.0)]));
    files.push(write_prj(&src, "polygons_layer", WGS84_PRJ));

    let archive = temp.path().join("layers.zip");
    zip_files(&archive, &entries(&files));
    archive
}

/// Archive with one point layer in web mercator.
pub fn mercator_archive(temp: &TempDir) -> PathBuf {
    let src = temp.path().join("src");
    std::fs::create_dir_all(&src).unwrap();

    let mut files = write_points(&src, "mercator", &[(MERCATOR_10_EAST, 0.0, "east")]);
    files.push(write_prj(&src, "mercator", WEB_MERCATOR_PRJ));

    let archive = temp.path().join("mercator.zip");
    zip_files(&archive, &entries(&files));
    archive
}

/// Archive with one polygon layer in web mercator: the square spanning
/// 0..10 degrees east and north of the equator by 0..10 degrees, area 100.
pub fn mercator_polygon_archive(temp: &TempDir) -> PathBuf {
    let src = temp.path().join("src");
    std::fs::create_dir_all(&src).unwrap();

    let m = MERCATOR_10_EAST;
    let square = Polygon::new(PolygonRing::Outer(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, m),
        Point::new(m, m),
        Point::new(m, 0.0),
        Point::new(0.0, 0.0),
    ]));
    let mut files = write_polygons(&src, "mercator_polygons", &[(square, 100.0)]);
    files.push(write_prj(&src, "mercator_polygons", WEB_MERCATOR_PRJ));

    let archive = temp.path().join("mercator_polygons.zip");
    zip_files(&archive, &entries(&files));
    archive
}

/// Archive with one point layer whose `.prj` is the given text.
pub fn point_archive_with_prj(temp: &TempDir, name: &str, prj: &str, x: f64, y: f64) -> PathBuf {
    let src = temp.path().join("src");
    std::fs::create_dir_all(&src).unwrap();

    let mut files = write_points(&src, name, &[(x, y, "site")]);
    files.push(write_prj(&src, name, prj));

    let archive = temp.path().join(format!("{name}.zip"));
    zip_files(&archive, &entries(&files));
    archive
}

/// Archive holding only non-shapefile content.
pub fn empty_archive(temp: &TempDir) -> PathBuf {
    let readme = temp.path().join("README.txt");
    std::fs::write(&readme, "no layers here").unwrap();
    let archive = temp.path().join("empty.zip");
    zip_files(&archive, &[("README.txt".to_string(), readme)]);
    archive
}

// ============================================================
// Scripted interaction
// ============================================================

/// Selector picking an item by value, or cancelling.
pub struct MockSelector {
    pick: Option<String>,
    pub seen: Mutex<Vec<String>>,
}

impl MockSelector {
    pub fn pick(value: &str) -> Self {
        Self {
            pick: Some(value.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn cancel() -> Self {
        Self {
            pick: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Selector for MockSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        _prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        *self.seen.lock().unwrap() = items.iter().map(|i| i.value.clone()).collect();
        match &self.pick {
            Some(value) => Ok(items.iter().find(|i| &i.value == value).cloned()),
            None => Ok(None),
        }
    }
}

/// Text prompt with a scripted answer.
pub enum MockPrompt {
    /// Accept the default name, placed inside this directory
    DefaultIn(PathBuf),
    /// Answer with this text verbatim
    Answer(String),
    /// Decline (end of input)
    Decline,
}

impl TextPrompt for MockPrompt {
    fn input(&self, _message: &str, default: &str) -> Result<Option<String>, String> {
        match self {
            MockPrompt::DefaultIn(dir) => Ok(Some(dir.join(default).to_string_lossy().to_string())),
            MockPrompt::Answer(text) => Ok(Some(text.clone())),
            MockPrompt::Decline => Ok(None),
        }
    }
}

/// Reporter keeping every message as `"<kind>: <text>"`.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    fn push(&self, kind: &str, msg: &str) {
        self.messages.lock().unwrap().push(format!("{kind}: {msg}"));
    }
}

impl Reporter for RecordingReporter {
    fn header(&self, msg: &str) {
        self.push("header", msg);
    }

    fn step(&self, msg: &str) {
        self.push("step", msg);
    }

    fn success(&self, msg: &str) {
        self.push("success", msg);
    }

    fn warning(&self, msg: &str) {
        self.push("warning", msg);
    }

    fn failure(&self, label: &str, details: &[String]) {
        self.push("failure", &format!("{label}: {}", details.join("; ")));
    }
}
