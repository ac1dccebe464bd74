//! Binary file header shared by all five kinds.
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 4]   (e.g. "CSF\0")
//! 0x04: version u32     (699..=919 accepted, 919 written)
//! ```

use cal_shared::{CURRENT_FILE_VERSION, EARLIEST_COMPATIBLE_FILE_VERSION, ResourceFormat};

use super::io::ByteReader;
use crate::error::{CodecError, CodecResult};

/// Binary file header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct BinaryHeader {
    pub magic: [u8; 4],
    pub version: u32,
}

impl BinaryHeader {
    pub const SIZE: usize = 8;

    /// Header for a file written by this toolkit.
    pub fn new(format: &ResourceFormat) -> Self {
        Self {
            magic: *format.binary_magic,
            version: CURRENT_FILE_VERSION,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Consume and check the header for `format`, returning the file version.
    pub fn read(reader: &mut ByteReader<'_>, format: &ResourceFormat) -> CodecResult<u32> {
        let raw = reader.take(Self::SIZE)?;
        let header = Self::from_bytes(raw).ok_or_else(|| CodecError::malformed("short header"))?;
        if &header.magic != format.binary_magic {
            return Err(CodecError::BadMagic {
                expected: String::from_utf8_lossy(format.binary_magic).into_owned(),
                found: String::from_utf8_lossy(&header.magic).into_owned(),
            });
        }
        if !(EARLIEST_COMPATIBLE_FILE_VERSION..=CURRENT_FILE_VERSION).contains(&header.version) {
            return Err(CodecError::UnsupportedVersion(header.version));
        }
        Ok(header.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_shared::{MESH_FORMAT, SKELETON_FORMAT};

    #[test]
    fn test_header_roundtrip() {
        let header = BinaryHeader::new(&SKELETON_FORMAT);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"CSF\0");
        assert_eq!(BinaryHeader::from_bytes(&bytes), Some(header));
    }

    #[test]
    fn test_header_from_short_bytes() {
        assert!(BinaryHeader::from_bytes(&[0u8; 4]).is_none());
    }

    #[test]
    fn test_read_rejects_other_kind() {
        let bytes = BinaryHeader::new(&SKELETON_FORMAT).to_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            BinaryHeader::read(&mut reader, &MESH_FORMAT),
            Err(CodecError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_read_rejects_old_version() {
        let header = BinaryHeader {
            magic: *SKELETON_FORMAT.binary_magic,
            version: 600,
        };
        let bytes = header.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            BinaryHeader::read(&mut reader, &SKELETON_FORMAT),
            Err(CodecError::UnsupportedVersion(600))
        );
    }
}
