//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::LayerService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, LayerSource, RealFileSystem};
use crate::infrastructure::ZipShapefileSource;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Layer reader for archives
    pub source: Arc<dyn LayerSource>,

    layers: Arc<LayerService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(ZipShapefileSource),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        source: Arc<dyn LayerSource>,
    ) -> Self {
        let settings = Arc::new(settings);
        let layers = Arc::new(LayerService::with_settings(source.clone(), &settings));

        Self {
            settings,
            fs,
            source,
            layers,
        }
    }

    pub fn layer_service(&self) -> Arc<LayerService> {
        self.layers.clone()
    }
}
