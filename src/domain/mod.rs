//! Domain layer: layer model and CRS resolution
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod crs;
pub mod entities;
pub mod error;

pub use crs::{CrsAliases, LayerCrs};
pub use entities::*;
pub use error::DomainError;
