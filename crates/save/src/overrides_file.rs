//! Reading and writing the manual layout overrides file.
//!
//! The file is a [`file_header`](crate::file_header) followed by the
//! bitcode-encoded [`LayoutOverrides`].

use std::io::ErrorKind;
use std::path::Path;

use simulation::layout::LayoutOverrides;

use crate::atomic_write::atomic_write;
use crate::file_header::{unwrap_header, wrap_with_header};
use crate::save_error::SaveError;

pub fn encode_overrides(overrides: &LayoutOverrides) -> Vec<u8> {
    wrap_with_header(&bitcode::encode(overrides))
}

pub fn decode_overrides(bytes: &[u8]) -> Result<LayoutOverrides, SaveError> {
    let (_, payload) = unwrap_header(bytes)?;
    Ok(bitcode::decode(payload)?)
}

/// Atomically write `overrides` to `path`.
pub fn save_overrides(path: &Path, overrides: &LayoutOverrides) -> Result<(), SaveError> {
    atomic_write(path, &encode_overrides(overrides))?;
    Ok(())
}

/// Read the overrides at `path`. `Ok(None)` when no file exists yet.
pub fn load_overrides(path: &Path) -> Result<Option<LayoutOverrides>, SaveError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode_overrides(&bytes).map(Some)
}
