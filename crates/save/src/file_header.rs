// ---------------------------------------------------------------------------
// file_header – Overrides file header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (20 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "PCTY" (0x50435459)
//   [4..8]   Format version (u32)
//   [8..16]  Payload length in bytes (u64)
//   [16..20] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode LayoutOverrides -> prepend header (with checksum of payload)
// On load: check magic -> check length -> validate checksum -> strip header

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

/// Magic bytes identifying a project city overrides file.
pub const MAGIC: [u8; 4] = *b"PCTY";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Current header/payload format version.
pub const FORMAT_VERSION: u32 = 1;

/// Seed for xxHash32 checksum.
const XXHASH_SEED: u32 = 0;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub payload_len: u64,
    pub checksum: u32,
}

impl FileHeader {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            payload_len: payload.len() as u64,
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        out[8..16].copy_from_slice(&self.payload_len.to_le_bytes());
        out[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

/// Prepend a header to `payload`.
pub fn wrap_with_header(payload: &[u8]) -> Vec<u8> {
    let header = FileHeader::new(payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Validate the header and return it with the payload that follows.
///
/// # Errors
///
/// - `BadMagic` when the file does not start with `PCTY`
/// - `Truncated` when the header or the declared payload is cut short
/// - `VersionMismatch` for files written by a newer build
/// - `ChecksumMismatch` when the payload was modified or damaged
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
        return Err(SaveError::BadMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Truncated {
            expected: HEADER_SIZE as u64,
            found: bytes.len() as u64,
        });
    }

    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        payload_len: read_u64(bytes, 8),
        checksum: read_u32(bytes, 16),
    };

    if header.format_version > FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let available = (bytes.len() - HEADER_SIZE) as u64;
    if available < header.payload_len {
        return Err(SaveError::Truncated {
            expected: header.payload_len,
            found: available,
        });
    }
    // Trailing bytes beyond the declared length are ignored.
    let payload = &bytes[HEADER_SIZE..HEADER_SIZE + header.payload_len as usize];

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found: computed,
        });
    }

    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let wrapped = wrap_with_header(b"abc");
        assert_eq!(&wrapped[..4], b"PCTY");
        assert_eq!(wrapped.len(), HEADER_SIZE + 3);
        assert_eq!(read_u32(&wrapped, 4), FORMAT_VERSION);
        assert_eq!(read_u64(&wrapped, 8), 3);
        assert_eq!(read_u32(&wrapped, 16), xxh32(b"abc", XXHASH_SEED));
    }

    #[test]
    fn test_unwrap_returns_payload() {
        let wrapped = wrap_with_header(b"override payload");
        let (header, payload) = unwrap_header(&wrapped).expect("valid header");
        assert_eq!(header.payload_len, 16);
        assert_eq!(payload, b"override payload");
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let mut wrapped = wrap_with_header(b"data");
        wrapped[0] = b'X';
        assert!(matches!(unwrap_header(&wrapped), Err(SaveError::BadMagic)));
        assert!(matches!(unwrap_header(b""), Err(SaveError::BadMagic)));
    }

    #[test]
    fn test_truncated_header_detected() {
        let err = unwrap_header(b"PCTY\x01\x00").unwrap_err();
        assert!(matches!(
            err,
            SaveError::Truncated {
                expected: 20,
                found: 6
            }
        ));
    }

    #[test]
    fn test_truncated_payload_detected() {
        let mut wrapped = wrap_with_header(b"0123456789");
        wrapped.truncate(wrapped.len() - 4);
        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(matches!(
            err,
            SaveError::Truncated {
                expected: 10,
                found: 6
            }
        ));
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut wrapped = wrap_with_header(b"test payload");
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(matches!(err, SaveError::ChecksumMismatch { .. }));
        assert!(err.to_string().contains("checksum"), "got: {err}");
    }

    #[test]
    fn test_future_version_rejected() {
        let mut wrapped = wrap_with_header(b"test payload");
        wrapped[4..8].copy_from_slice(&999u32.to_le_bytes());
        let err = unwrap_header(&wrapped).unwrap_err();
        assert!(matches!(
            err,
            SaveError::VersionMismatch {
                expected_max: FORMAT_VERSION,
                found: 999
            }
        ));
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let wrapped = wrap_with_header(b"");
        assert_eq!(wrapped.len(), HEADER_SIZE);
        let (header, payload) = unwrap_header(&wrapped).expect("valid header");
        assert_eq!(header.payload_len, 0);
        assert!(payload.is_empty());
    }
}
