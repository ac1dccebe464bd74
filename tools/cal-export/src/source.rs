//! Input bytes, owned or memory-mapped

use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

/// Bytes of one input file.
///
/// Both variants expose the whole file as one contiguous slice, so a mapped
/// file and an in-memory copy of it are indistinguishable to the cache.
#[derive(Debug)]
pub enum ByteSource {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl ByteSource {
    /// Read the whole file into memory.
    pub fn read(path: &Path) -> io::Result<Self> {
        std::fs::read(path).map(ByteSource::Owned)
    }

    /// Map the file read-only.
    ///
    /// Empty files cannot be mapped on every platform; they are returned as an
    /// empty owned buffer instead.
    pub fn map(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(ByteSource::Owned(Vec::new()));
        }
        // SAFETY: the map is read-only and lives no longer than this value.
        // Another process truncating the file while it is mapped is outside
        // what this tool guards against.
        let map = unsafe { Mmap::map(&file)? };
        Ok(ByteSource::Mapped(map))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteSource::Owned(bytes) => bytes,
            ByteSource::Mapped(map) => map,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, ByteSource::Mapped(_))
    }
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSource::Owned(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mapped_matches_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("material.xrf");
        std::fs::write(&path, b"<HEADER MAGIC=\"XRF\" VERSION=\"919\"/>").unwrap();

        let mapped = ByteSource::map(&path).unwrap();
        let owned = ByteSource::read(&path).unwrap();
        assert!(mapped.is_mapped());
        assert!(!owned.is_mapped());
        assert_eq!(mapped.as_bytes(), owned.as_bytes());
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.cmf");
        std::fs::write(&path, b"").unwrap();
        assert!(ByteSource::map(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(ByteSource::map(&dir.path().join("missing.xmf")).is_err());
    }
}
