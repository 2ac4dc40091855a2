use std::path::PathBuf;

/// Expand a leading `~` in a user-entered output path.
pub fn expand_output_path(input: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(input.trim()).into_owned())
}
