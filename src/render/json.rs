//! JSON rendering of comparison reports.

use crate::error::{Error, Result};
use crate::report::Report;
use std::fs;
use std::path::Path;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a report to JSON.
pub fn to_json(report: &Report, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(report),
        JsonFormat::Compact => serde_json::to_string(report),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Read a report back from its JSON form.
pub fn from_json(json: &str) -> Result<Report> {
    serde_json::from_str(json)
        .map_err(|e| Error::Render(format!("JSON deserialization error: {}", e)))
}

/// Convert a report to JSON and write it to `path`.
pub fn write_json(report: &Report, format: JsonFormat, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(report, format)?;
    fs::write(path, json).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote JSON report to {}", path.display());
    Ok(())
}
