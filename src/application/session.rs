//! Interactive export session
//!
//! Drives one run: list the layers of an archive, let the user pick one,
//! extract it as GeoJSON, ask for an output name and write the file.
//! Failures are returned to the caller; declining a prompt ends the session
//! with [`SessionOutcome::Aborted`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::services::LayerService;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::default_output_name;
use crate::infrastructure::traits::{FileSystem, Reporter, SelectionItem, Selector, TextPrompt};
use crate::util::path::expand_output_path;

pub const TITLE: &str = "Shapefile ZIP to GeoJSON Extractor";
pub const SELECT_PROMPT: &str = "Select a layer to extract";
pub const OUTPUT_PROMPT: &str = "Enter the filename to save the GeoJSON:";

/// Why the user ended the session early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoLayerSelected,
    NoOutputName,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NoLayerSelected => f.write_str("No layer selected"),
            AbortReason::NoOutputName => f.write_str("No filename provided"),
        }
    }
}

/// How a session ended, if it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Exported { layer: String, output: PathBuf },
    Aborted(AbortReason),
}

enum SessionState {
    Start,
    Listing,
    Selecting { layers: Vec<String> },
    Extracting { layer: String },
    NamingOutput { layer: String, geojson: String },
    Writing { layer: String, geojson: String, output: PathBuf },
    Done { layer: String, output: PathBuf },
    Aborted(AbortReason),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Start => "start",
            SessionState::Listing => "listing",
            SessionState::Selecting { .. } => "selecting",
            SessionState::Extracting { .. } => "extracting",
            SessionState::NamingOutput { .. } => "naming_output",
            SessionState::Writing { .. } => "writing",
            SessionState::Done { .. } => "done",
            SessionState::Aborted(_) => "aborted",
        }
    }
}

pub struct ExportSession {
    layers: Arc<LayerService>,
    fs: Arc<dyn FileSystem>,
    selector: Arc<dyn Selector>,
    prompt: Arc<dyn TextPrompt>,
    out: Arc<dyn Reporter>,
}

impl ExportSession {
    pub fn new(
        layers: Arc<LayerService>,
        fs: Arc<dyn FileSystem>,
        selector: Arc<dyn Selector>,
        prompt: Arc<dyn TextPrompt>,
        out: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            layers,
            fs,
            selector,
            prompt,
            out,
        }
    }

    /// Run the session to completion.
    ///
    /// The output file is written only after the layer was fully extracted.
    pub fn run(&self, archive: &Path) -> ApplicationResult<SessionOutcome> {
        let mut state = SessionState::Start;
        loop {
            debug!("session state: {}", state.name());
            state = match state {
                SessionState::Start => {
                    self.out.header(TITLE);
                    SessionState::Listing
                }
                SessionState::Listing => {
                    self.out
                        .step(&format!("Inspecting zip archive: {}", archive.display()));
                    let layers = self.layers.list_layers(archive)?;
                    if layers.is_empty() {
                        return Err(ApplicationError::NoLayers(archive.to_path_buf()));
                    }
                    SessionState::Selecting { layers }
                }
                SessionState::Selecting { layers } => match self.select_layer(&layers)? {
                    Some(layer) => SessionState::Extracting { layer },
                    None => SessionState::Aborted(AbortReason::NoLayerSelected),
                },
                SessionState::Extracting { layer } => {
                    let geojson = self.layers.extract(archive, &layer, self.out.as_ref())?;
                    SessionState::NamingOutput { layer, geojson }
                }
                SessionState::NamingOutput { layer, geojson } => {
                    match self.output_name(&layer)? {
                        Some(output) => SessionState::Writing {
                            layer,
                            geojson,
                            output,
                        },
                        None => SessionState::Aborted(AbortReason::NoOutputName),
                    }
                }
                SessionState::Writing {
                    layer,
                    geojson,
                    output,
                } => {
                    self.write_output(&output, &geojson)?;
                    SessionState::Done { layer, output }
                }
                SessionState::Done { layer, output } => {
                    self.out.success(&format!(
                        "Layer '{}' was saved to {}",
                        layer,
                        output.display()
                    ));
                    return Ok(SessionOutcome::Exported { layer, output });
                }
                SessionState::Aborted(reason) => {
                    self.out.warning(&format!("{reason}. Exiting."));
                    return Ok(SessionOutcome::Aborted(reason));
                }
            };
        }
    }

    fn select_layer(&self, layers: &[String]) -> ApplicationResult<Option<String>> {
        let items: Vec<SelectionItem> = layers.iter().map(|l| SelectionItem::plain(l)).collect();
        let selected = self
            .selector
            .select_one(&items, SELECT_PROMPT)
            .map_err(|message| ApplicationError::Prompt { message })?;
        Ok(selected.map(|item| item.value))
    }

    fn output_name(&self, layer: &str) -> ApplicationResult<Option<PathBuf>> {
        let answer = self
            .prompt
            .input(OUTPUT_PROMPT, &default_output_name(layer))
            .map_err(|message| ApplicationError::Prompt { message })?;
        Ok(answer
            .filter(|name| !name.trim().is_empty())
            .map(|name| expand_output_path(&name)))
    }

    fn write_output(&self, output: &Path, geojson: &str) -> ApplicationResult<()> {
        if self.fs.is_dir(output) {
            return Err(ApplicationError::OutputWrite {
                path: output.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
            });
        }
        if self.fs.exists(output) {
            debug!("write_output: replacing {}", output.display());
        }
        self.fs.write(output, geojson).or_output_write(output)
    }
}
