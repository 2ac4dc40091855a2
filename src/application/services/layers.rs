//! Layer listing and extraction to GeoJSON

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::encode::{encode_layer, EncodeOptions};
use crate::application::services::reproject::{wkt_definition, Reprojector, SourceCrs};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{CrsAliases, Epsg, Layer};
use crate::infrastructure::traits::{LayerSource, Reporter};

/// Lists the layers of an archive and turns one of them into GeoJSON.
pub struct LayerService {
    source: Arc<dyn LayerSource>,
    aliases: CrsAliases,
    proj_definitions: BTreeMap<String, String>,
    encode: EncodeOptions,
}

impl LayerService {
    /// Service with built-in CRS aliases and default output options.
    pub fn new(source: Arc<dyn LayerSource>) -> Self {
        Self {
            source,
            aliases: CrsAliases::builtin(),
            proj_definitions: BTreeMap::new(),
            encode: EncodeOptions::default(),
        }
    }

    pub fn with_settings(source: Arc<dyn LayerSource>, settings: &Settings) -> Self {
        Self {
            source,
            aliases: CrsAliases::builtin().with_extra(&settings.crs_aliases),
            proj_definitions: settings.proj_definitions.clone(),
            encode: EncodeOptions {
                pretty: settings.pretty,
                feature_ids: settings.feature_ids,
            },
        }
    }

    /// Names of all layers in the archive, in archive order.
    ///
    /// An empty list is a valid result; the caller decides what it means.
    #[instrument(level = "debug", skip(self))]
    pub fn list_layers(&self, archive: &Path) -> ApplicationResult<Vec<String>> {
        let layers = self.source.list_layers(archive).or_archive_read(archive)?;
        debug!("list_layers: {} layer(s)", layers.len());
        Ok(layers)
    }

    /// Load a layer by name.
    ///
    /// The name must be one returned by [`Self::list_layers`].
    pub fn read_layer(&self, archive: &Path, name: &str) -> ApplicationResult<Layer> {
        let layers = self.list_layers(archive)?;
        if !layers.iter().any(|l| l == name) {
            return Err(ApplicationError::LayerNotFound {
                layer: name.to_string(),
                path: archive.to_path_buf(),
            });
        }

        self.source
            .read_layer(archive, name)
            .map_err(|e| ApplicationError::LayerExtraction {
                layer: name.to_string(),
                source: Box::new(e),
            })
    }

    /// CRS to reproject from, or `None` if the layer is already WGS 84 or
    /// declares no CRS at all.
    ///
    /// An EPSG code (authority or known name) is preferred; otherwise the
    /// WKT itself is converted to a projection definition.
    pub fn reprojection_source(&self, layer: &Layer) -> ApplicationResult<Option<SourceCrs>> {
        let Some(crs) = &layer.crs else {
            debug!("reprojection_source: '{}' has no .prj", layer.name);
            return Ok(None);
        };
        match crs.resolve(&self.aliases) {
            Ok(epsg) if epsg == Epsg::WGS84 => Ok(None),
            Ok(epsg) => Ok(Some(SourceCrs::Epsg(epsg))),
            Err(unresolved) => {
                let proj = wkt_definition(&crs.wkt).ok_or(unresolved)?;
                debug!("reprojection_source: '{}' from WKT: {}", layer.name, proj);
                Ok(Some(SourceCrs::Definition {
                    name: crs.display_name(),
                    proj,
                }))
            }
        }
    }

    /// Read the named layer, reproject it to WGS 84 when needed and encode
    /// it as a GeoJSON `FeatureCollection`.
    #[instrument(level = "debug", skip(self, out))]
    pub fn extract(
        &self,
        archive: &Path,
        name: &str,
        out: &dyn Reporter,
    ) -> ApplicationResult<String> {
        out.step(&format!("Reading layer '{name}'..."));
        let mut layer = self.read_layer(archive, name)?;
        info!("read layer '{}' with {} feature(s)", name, layer.feature_count());

        self.to_wgs84(&mut layer, out)
            .map_err(|e| extraction_error(name, e))?;

        let text = encode_layer(&layer, self.encode)?;
        out.success("Successfully read and processed the layer.");
        Ok(text)
    }

    fn to_wgs84(&self, layer: &mut Layer, out: &dyn Reporter) -> ApplicationResult<()> {
        let Some(from) = self.reprojection_source(layer)? else {
            return Ok(());
        };
        let crs_name = layer
            .crs
            .as_ref()
            .map(|crs| crs.display_name())
            .unwrap_or_else(|| from.to_string());
        out.step(&format!(
            "Reprojecting CRS from {crs_name} to WGS 84 (EPSG:4326)..."
        ));

        let reprojector = Reprojector::from_source(&from, &self.proj_definitions)?;
        reprojector.reproject_layer(layer)
    }
}

fn extraction_error(layer: &str, err: ApplicationError) -> ApplicationError {
    match err {
        ApplicationError::LayerExtraction { .. } | ApplicationError::LayerNotFound { .. } => err,
        other => ApplicationError::LayerExtraction {
            layer: layer.to_string(),
            source: Box::new(other),
        },
    }
}
