// Env file export
// NAME="value" lines in key order; the target file is truncated on every write

use std::path::Path;

use tracing::info;

use crate::domain::MergedEnvironment;
use crate::error::{AppError, Result};

/// Render the mapping as `NAME="value"\n` lines, escaping `"` as `\"`
pub fn render_env_file(env: &MergedEnvironment) -> String {
    let mut out = String::new();
    for (name, value) in env {
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "\\\""));
        out.push_str("\"\n");
    }
    out
}

/// Write the rendered mapping to `path`, replacing any existing content
///
/// # Errors
/// - AppError::Export if the file cannot be created or written
pub async fn write_env_file(path: &Path, env: &MergedEnvironment) -> Result<()> {
    tokio::fs::write(path, render_env_file(env))
        .await
        .map_err(|source| AppError::Export {
            path: path.display().to_string(),
            source,
        })?;

    info!(path = %path.display(), keys = env.len(), "Wrote env file");
    Ok(())
}
