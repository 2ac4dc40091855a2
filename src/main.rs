use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use shason::cli::commands::execute;
use shason::cli::output::TerminalReporter;
use shason::cli::{Cli, CliError};
use shason::config::Settings;
use shason::exitcode;
use shason::infrastructure::di::ServiceContainer;
use shason::infrastructure::traits::Reporter;

fn main() {
    let cli = Cli::parse();
    let out = Arc::new(TerminalReporter);

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            let err = CliError::from(e);
            out.failure(&err.label(), &err.details());
            process::exit(err.exit_code());
        }
    };

    setup_logging(&settings.log_level);

    let container = ServiceContainer::new(settings);
    match execute(&cli, &container, out.clone()) {
        Ok(_) => process::exit(exitcode::OK),
        Err(e) => {
            out.failure(&e.label(), &e.details());
            process::exit(e.exit_code());
        }
    }
}

fn setup_logging(default_level: &str) {
    // SHASON_LOG wins over RUST_LOG, both over the configured level
    let filter = EnvFilter::try_from_env("SHASON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let noisy_modules = ["skim", "tuikit"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();
    tracing::debug!("logging initialized");
}
