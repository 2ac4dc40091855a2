//! Error conversion helpers for common I/O operations
//!
//! Maps `io::Result` into the archive/output error variants with the path attached.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Map to [`ApplicationError::ArchiveRead`].
    fn or_archive_read(self, archive: &Path) -> ApplicationResult<T>;

    /// Map to [`ApplicationError::OutputWrite`].
    fn or_output_write(self, output: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn or_archive_read(self, archive: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::ArchiveRead {
            path: archive.to_path_buf(),
            source,
        })
    }

    fn or_output_write(self, output: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::OutputWrite {
            path: output.to_path_buf(),
            source,
        })
    }
}
