//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/shason/shason.toml`
//! 3. Environment variables: `SHASON_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::ApplicationError;

/// Unified configuration for shason.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Log filter used when neither SHASON_LOG nor RUST_LOG is set
    pub log_level: String,
    /// Pretty-print the GeoJSON output
    pub pretty: bool,
    /// Emit the feature index as `id`
    pub feature_ids: bool,
    /// CRS name -> EPSG code, extends the built-in alias table
    pub crs_aliases: BTreeMap<String, u16>,
    /// EPSG code -> proj string, overrides the bundled EPSG database
    pub proj_definitions: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            pretty: false,
            feature_ids: true,
            crs_aliases: BTreeMap::new(),
            proj_definitions: BTreeMap::new(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub log_level: Option<String>,
    pub pretty: Option<bool>,
    pub feature_ids: Option<bool>,
    pub crs_aliases: Option<BTreeMap<String, u16>>,
    pub proj_definitions: Option<BTreeMap<String, String>>,
}

/// Get the XDG config directory for shason.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shason").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("shason.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn environment() -> Environment {
    Environment::with_prefix("SHASON")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    /// Apply a config file onto self.
    ///
    /// Scalars replace; the two tables extend the current entries, file wins
    /// on equal keys.
    fn apply_global(&self, global: &RawSettings) -> Self {
        let mut crs_aliases = self.crs_aliases.clone();
        if let Some(extra) = &global.crs_aliases {
            crs_aliases.extend(extra.iter().map(|(k, v)| (k.clone(), *v)));
        }
        let mut proj_definitions = self.proj_definitions.clone();
        if let Some(extra) = &global.proj_definitions {
            proj_definitions.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Self {
            log_level: global
                .log_level
                .clone()
                .unwrap_or_else(|| self.log_level.clone()),
            pretty: global.pretty.unwrap_or(self.pretty),
            feature_ids: global.feature_ids.unwrap_or(self.feature_ids),
            crs_aliases,
            proj_definitions,
        }
    }

    /// Load settings from the global config location.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings with layered precedence from an explicit config file.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.apply_global(&raw);
            }
        }

        Self::apply_env_overrides(current, environment())
    }

    /// Apply SHASON_* environment variables as explicit overrides.
    ///
    /// Table entries use a double underscore between table and key, e.g.
    /// `SHASON_CRS_ALIASES__LOCAL_GRID=2056`. Keys arrive lowercased.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("log_level") {
            settings.log_level = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_bool("feature_ids") {
            settings.feature_ids = val;
        }
        if let Ok(extra) = config.get::<BTreeMap<String, u16>>("crs_aliases") {
            settings.crs_aliases.extend(extra);
        }
        if let Ok(extra) = config.get::<BTreeMap<String, String>>("proj_definitions") {
            settings.proj_definitions.extend(extra);
        }

        Ok(settings)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
