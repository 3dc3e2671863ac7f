//! Reading statements from disk.
//!
//! A statement file holds a `title` and a list of `rows`, each with a `key`,
//! optional `vals`, an optional pre-assigned `type` and optional `scores`.
//! JSON and TOML are accepted, chosen by file extension.

use std::path::Path;

use crate::error::FincatError;
use crate::summary::Summary;

/// Loads a summary from a `.json` or `.toml` file. An empty title is
/// replaced by the file stem.
pub fn load_summary(path: &Path) -> Result<Summary, FincatError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let contents = match ext.as_str() {
        "json" | "toml" => std::fs::read_to_string(path)?,
        _ => return Err(FincatError::UnsupportedFormat(path.display().to_string())),
    };
    let mut summary = parse_summary(&contents, &ext)?;

    if summary.title.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            summary.title = stem.to_string();
        }
    }
    Ok(summary)
}

/// Parses a summary from text in the given format (`json` or `toml`).
pub fn parse_summary(contents: &str, format: &str) -> Result<Summary, FincatError> {
    match format {
        "json" => Ok(serde_json::from_str(contents)?),
        "toml" => Ok(toml::from_str(contents)?),
        other => Err(FincatError::UnsupportedFormat(other.to_string())),
    }
}
