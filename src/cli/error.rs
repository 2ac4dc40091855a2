//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Every failure is fatal in the same way: exit 1.
    pub fn exit_code(&self) -> i32 {
        crate::exitcode::FAILURE
    }

    /// Short category label, e.g. "archive read error".
    pub fn label(&self) -> String {
        match self {
            CliError::Application(e) => e.kind().to_string(),
            CliError::InvalidArgs(_) => "usage error".to_string(),
        }
    }

    /// Message followed by the underlying causes.
    pub fn details(&self) -> Vec<String> {
        let mut details = vec![self.to_string()];
        if let CliError::Application(e) = self {
            details.extend(e.details());
        }
        details
    }
}
