//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use crate::domain::Layer;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Write string content to file, replacing it if present.
    ///
    /// The file either ends up with the complete content or is left
    /// untouched: no truncated output on failure.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Reader for named vector layers inside an archive.
pub trait LayerSource: Send + Sync {
    /// Layer names in archive order.
    fn list_layers(&self, archive: &Path) -> io::Result<Vec<String>>;

    /// Load every feature of one layer, with its declared CRS.
    fn read_layer(&self, archive: &Path, layer: &str) -> io::Result<Layer>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., layer name)
    pub value: String,
}

impl SelectionItem {
    pub fn plain(value: &str) -> Self {
        Self {
            display: value.to_string(),
            value: value.to_string(),
        }
    }
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

/// Free-text prompt abstraction.
pub trait TextPrompt: Send + Sync {
    /// Ask for a line of text, pre-filled with `default`.
    /// Returns None if the user declines to answer.
    fn input(&self, message: &str, default: &str) -> Result<Option<String>, String>;
}

/// Sink for user-facing messages.
pub trait Reporter: Send + Sync {
    /// Title banner.
    fn header(&self, msg: &str);

    /// Progress of the current step.
    fn step(&self, msg: &str);

    /// Completed step.
    fn success(&self, msg: &str);

    /// Non-fatal notice (e.g. user aborted).
    fn warning(&self, msg: &str);

    /// Fatal failure: short label plus diagnostic details.
    fn failure(&self, label: &str, details: &[String]);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        use std::io::Write;

        // temp file next to the target so the final rename stays on one device
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = temp_file_in(dir)?;
        if let Ok(meta) = std::fs::metadata(path) {
            // replacing: keep the permissions of the existing file
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Temp file created like a regular new file: mode 0666 minus umask.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        // Build input as newline-separated display strings
        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        let output = Skim::run_with(&options, Some(items_arc));

        match output {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => {
                if let Some(selected) = out.selected_items.first() {
                    let display = selected.output().to_string();
                    // Find the matching item
                    let item = items.iter().find(|i| i.display == display).cloned();
                    Ok(item)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}

/// Line-based prompt on stdin/stdout.
///
/// An empty line accepts the default; end of input declines.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl TextPrompt for StdinPrompt {
    fn input(&self, message: &str, default: &str) -> Result<Option<String>, String> {
        use colored::Colorize;
        use std::io::{BufRead, Write};

        print!("{} [{}] ", message.cyan(), default);
        io::stdout()
            .flush()
            .map_err(|e| format!("failed to flush stdout: {e}"))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("failed to read input: {e}"))?;
        if read == 0 {
            println!();
            return Ok(None);
        }

        let answer = line.trim();
        if answer.is_empty() {
            Ok(Some(default.to_string()))
        } else {
            Ok(Some(answer.to_string()))
        }
    }
}
