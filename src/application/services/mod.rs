//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (LayerSource, Reporter, etc.)
//! but are themselves concrete structs, not traits.

pub mod encode;
mod layers;
pub mod reproject;

pub use encode::{encode_layer, EncodeOptions};
pub use layers::LayerService;
pub use reproject::{Reprojector, SourceCrs};
