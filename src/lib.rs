//! shason: export one layer of a Shapefile ZIP archive as GeoJSON
//!
//! Layers, from the inside out:
//! - `domain`: layer model and CRS resolution, no I/O
//! - `application`: listing, extraction, reprojection, encoding and the
//!   interactive export session
//! - `infrastructure`: archive reader, filesystem, prompts, service container
//! - `cli`: argument parsing, terminal output, exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
