//! Reading the item manifest written by the external metadata reader.
//!
//! The manifest is JSON: either a bare array of records or an object with
//! an `items` array. Field-level problems are not errors here; they are
//! handled by the lenient conversion in `parse`.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::parse::RawItemRecord;

/// Errors that can occur while reading a manifest.
#[derive(Debug)]
pub enum ManifestError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not a JSON array of records (or `{ "items": [...] }`).
    Parse(serde_json::Error),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io(e) => write!(f, "I/O error: {e}"),
            ManifestError::Parse(e) => write!(f, "Malformed manifest: {e}"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io(e) => Some(e),
            ManifestError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ManifestError {
    fn from(e: std::io::Error) -> Self {
        ManifestError::Io(e)
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(e: serde_json::Error) -> Self {
        ManifestError::Parse(e)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestShape {
    Bare(Vec<RawItemRecord>),
    Wrapped { items: Vec<RawItemRecord> },
}

/// Parse manifest JSON text.
pub fn parse_manifest(text: &str) -> Result<Vec<RawItemRecord>, ManifestError> {
    let shape: ManifestShape = serde_json::from_str(text)?;
    Ok(match shape {
        ManifestShape::Bare(items) | ManifestShape::Wrapped { items } => items,
    })
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<RawItemRecord>, ManifestError> {
    let text = std::fs::read_to_string(path)?;
    parse_manifest(&text)
}
