//! JSON and YAML document handling shared by catalogues and snapshots.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::{CoordinationError, Result};

/// Text format of a catalogue or snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a `.json`, `.yaml` or `.yml` extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml" | "yml") => Ok(DocumentFormat::Yaml),
            _ => Err(CoordinationError::invalid_argument(format!(
                "cannot infer document format from {}",
                path.display()
            ))),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, text: &str, context: &str) -> Result<T> {
        match self {
            DocumentFormat::Json => serde_json::from_str(text)
                .map_err(|e| CoordinationError::parse_error(context, e)),
            DocumentFormat::Yaml => serde_yaml_ng::from_str(text)
                .map_err(|e| CoordinationError::parse_error(context, e)),
        }
    }

    /// Encode `value`. Failures are reported as `Parse` errors whose context
    /// ends in `encoding`.
    pub fn render<T: Serialize>(self, value: &T, context: &str) -> Result<String> {
        let context = format!("{context} encoding");
        match self {
            DocumentFormat::Json => serde_json::to_string_pretty(value)
                .map_err(|e| CoordinationError::parse_error(context, e)),
            DocumentFormat::Yaml => serde_yaml_ng::to_string(value)
                .map_err(|e| CoordinationError::parse_error(context, e)),
        }
    }
}

/// Read and decode a document, choosing the format by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path, context: &str) -> Result<T> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| CoordinationError::file_error(path.to_path_buf(), e))?;
    format.parse(&text, context)
}

/// Encode and write a document, choosing the format by extension.
pub fn write_document<T: Serialize>(path: &Path, value: &T, context: &str) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let text = format.render(value, context)?;
    std::fs::write(path, text)
        .map_err(|e| CoordinationError::file_error(path.to_path_buf(), e))
}
