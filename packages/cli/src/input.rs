// ABOUTME: Resolves command input from a file, piped stdin, or nothing
// ABOUTME: Callers fall back to built-in samples when no input is found

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;

/// Read input text from `file`, else from `stdin` when it is piped.
///
/// Returns `None` when neither yields non-blank text.
pub fn read_input<R: Read>(file: Option<&Path>, stdin: Option<R>) -> Result<Option<String>> {
    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?;
        info!(path = %path.display(), "Read input from file");
        return Ok(Some(text));
    }

    if let Some(mut reader) = stdin {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .context("Failed to read input from stdin")?;
        if !text.trim().is_empty() {
            info!("Read input from stdin");
            return Ok(Some(text));
        }
    }

    Ok(None)
}

/// Parse a JSON document, tolerating a UTF-8 byte order mark
pub fn parse_json<T: DeserializeOwned>(text: &str, what: &str) -> Result<T> {
    serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .with_context(|| format!("Input is not a valid {} JSON document", what))
}
