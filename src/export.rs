//! The export module writes a summary to a plain-text file.

use log::info;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `text` to `output_path`, replacing any existing file.
/// The file always ends with a single newline.
///
/// # Arguments
///
/// * `output_path` - Path to the output file
/// * `text` - Summary text to write
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn export_summary(output_path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_path)
        .with_context(|| format!("Failed to open {}", output_path.display()))?;

    file.write_all(format!("{}\n", text.trim_end()).as_bytes())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!("Saved summary to {}", output_path.display());
    Ok(())
}
