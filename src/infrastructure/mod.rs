//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod shapefile_zip;
pub mod traits;

pub use shapefile_zip::ZipShapefileSource;
