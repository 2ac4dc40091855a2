//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::infrastructure::traits::Reporter;

/// Print error (red bold label prefix) to stderr
pub fn error(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", label.red().bold(), msg);
}

/// Print warning (yellow) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().yellow());
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print indented detail to stderr (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// [`Reporter`] writing to the terminal.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn header(&self, msg: &str) {
        header(msg);
    }

    fn step(&self, msg: &str) {
        info(msg);
    }

    fn success(&self, msg: &str) {
        success(msg);
    }

    fn warning(&self, msg: &str) {
        warning(msg);
    }

    fn failure(&self, label: &str, details: &[String]) {
        match details.split_first() {
            Some((first, rest)) => {
                error(label, first);
                for cause in rest {
                    detail(cause);
                }
            }
            None => error(label, "unknown failure"),
        }
    }
}
