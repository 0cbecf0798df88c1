// ---------------------------------------------------------------------------
// SaveError: error type for reading and writing the overrides file
// ---------------------------------------------------------------------------

use std::fmt;

#[derive(Debug)]
pub enum SaveError {
    /// I/O error (permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Bitcode decoding failed (corrupt or invalid payload).
    Decode(String),
    /// The file does not start with the expected magic bytes.
    BadMagic,
    /// The header or payload is shorter than declared.
    Truncated { expected: u64, found: u64 },
    /// The file was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// The payload checksum does not match the header.
    ChecksumMismatch { expected: u32, found: u32 },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::BadMagic => write!(f, "Not an overrides file (bad magic bytes)"),
            SaveError::Truncated { expected, found } => {
                write!(f, "File truncated: expected {expected} bytes, found {found}")
            }
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: file is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "File is corrupted: checksum mismatch (expected {expected:#010X}, got {found:#010X})"
            ),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_display_io() {
        let err = SaveError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_version_mismatch() {
        let err = SaveError::VersionMismatch {
            expected_max: 1,
            found: 7,
        };
        let msg = format!("{err}");
        assert!(msg.contains("v7"), "got: {msg}");
        assert!(msg.contains("v1"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_checksum() {
        let err = SaveError::ChecksumMismatch {
            expected: 0xDEAD_BEEF,
            found: 0x1234_5678,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0xDEADBEEF"), "got: {msg}");
        assert!(msg.contains("corrupted"), "got: {msg}");
    }

    #[test]
    fn test_save_error_from_io_has_source() {
        let save_err: SaveError =
            std::io::Error::new(std::io::ErrorKind::Other, "test").into();
        assert!(matches!(save_err, SaveError::Io(_)));
        assert!(std::error::Error::source(&save_err).is_some());
        assert!(std::error::Error::source(&SaveError::BadMagic).is_none());
    }
}
