// ABOUTME: Persists raw provider output from failed generations
// ABOUTME: One uniquely named file per failure so concurrent runs never collide

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use copilot_agents::{AgentError, StageName};
use tracing::{info, warn};
use uuid::Uuid;

/// Write `raw` to `<dir>/<stage>-<uuid>.txt`
pub fn write_diagnostic(dir: &Path, stage: StageName, raw: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}-{}.txt", stage, Uuid::new_v4()));
    fs::write(&path, raw)?;
    Ok(path)
}

/// Save the raw output carried by `err`, if any. Write failures are logged, not raised.
pub fn persist_failure(dir: &Path, err: &AgentError) -> Option<PathBuf> {
    let stage = err.stage_name()?;
    let raw = err.raw_output()?;

    match write_diagnostic(dir, stage, raw) {
        Ok(path) => {
            info!(path = %path.display(), %stage, "Saved raw provider output");
            Some(path)
        }
        Err(e) => {
            warn!(dir = %dir.display(), "Could not save raw provider output: {}", e);
            None
        }
    }
}
