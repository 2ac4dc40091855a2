//! Application-level errors (wraps domain errors)

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("could not read layers from '{}'", path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no vector layers found in '{}'", .0.display())]
    NoLayers(PathBuf),

    #[error("layer '{layer}' not found in '{}'", path.display())]
    LayerNotFound { layer: String, path: PathBuf },

    #[error("failed to extract layer '{layer}'")]
    LayerExtraction {
        layer: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to reproject from {from} to WGS 84: {message}")]
    Reprojection { from: String, message: String },

    #[error("could not save file to '{}'", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt failed: {message}")]
    Prompt { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse failure category, used for the short user-facing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ArchiveRead,
    LayerExtraction,
    OutputWrite,
    Prompt,
    Config,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ArchiveRead => "archive read error",
            ErrorKind::LayerExtraction => "layer extraction error",
            ErrorKind::OutputWrite => "output write error",
            ErrorKind::Prompt => "prompt error",
            ErrorKind::Config => "configuration error",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(label)
    }
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::ArchiveRead { .. } | ApplicationError::NoLayers(_) => {
                ErrorKind::ArchiveRead
            }
            ApplicationError::Domain(_)
            | ApplicationError::LayerNotFound { .. }
            | ApplicationError::LayerExtraction { .. }
            | ApplicationError::Reprojection { .. } => ErrorKind::LayerExtraction,
            ApplicationError::OutputWrite { .. } => ErrorKind::OutputWrite,
            ApplicationError::Prompt { .. } => ErrorKind::Prompt,
            ApplicationError::Config { .. } => ErrorKind::Config,
            ApplicationError::OperationFailed { .. } => ErrorKind::Internal,
        }
    }

    /// Underlying diagnostic chain, outermost cause first.
    pub fn details(&self) -> Vec<String> {
        let mut details = Vec::new();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            details.push(err.to_string());
            source = err.source();
        }
        details
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
