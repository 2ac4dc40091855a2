//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, ValueHint};

/// Pick one layer of a Shapefile ZIP archive and save it as GeoJSON (WGS 84)
///
/// Log output is controlled by SHASON_LOG (or RUST_LOG), e.g. SHASON_LOG=debug.
#[derive(Parser, Debug)]
#[command(name = "shason")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// ZIP archive containing one or more shapefile layers
    #[arg(value_hint = ValueHint::FilePath)]
    pub archive: PathBuf,
}
