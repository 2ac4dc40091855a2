//! Command execution

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ExportSession, SessionOutcome};
use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{Reporter, SkimSelector, StdinPrompt};

/// Run the interactive export for the archive named on the command line.
#[instrument(skip(container, out))]
pub fn execute(
    cli: &Cli,
    container: &ServiceContainer,
    out: Arc<dyn Reporter>,
) -> CliResult<SessionOutcome> {
    if container.fs.is_dir(&cli.archive) {
        return Err(CliError::InvalidArgs(format!(
            "'{}' is a directory, expected a ZIP archive",
            cli.archive.display()
        )));
    }

    let session = ExportSession::new(
        container.layer_service(),
        container.fs.clone(),
        Arc::new(SkimSelector),
        Arc::new(StdinPrompt),
        out,
    );
    let outcome = session.run(&cli.archive)?;
    debug!("execute: {:?}", outcome);
    Ok(outcome)
}
