//! Little-endian cursor helpers shared by every binary codec.

use glam::{Quat, Vec2, Vec3};

use crate::error::{CodecError, CodecResult};

/// Bounds-checked reader over a byte slice.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    pub fn vec2(&mut self) -> CodecResult<Vec2> {
        Ok(Vec2::new(self.f32()?, self.f32()?))
    }

    pub fn vec3(&mut self) -> CodecResult<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    pub fn quat(&mut self) -> CodecResult<Quat> {
        Ok(Quat::from_xyzw(self.f32()?, self.f32()?, self.f32()?, self.f32()?))
    }

    pub fn rgba(&mut self) -> CodecResult<[u8; 4]> {
        self.array()
    }

    /// Length-prefixed UTF-8 string.
    pub fn string(&mut self) -> CodecResult<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CodecError::malformed(format!("string at {} is not UTF-8", self.offset)))
    }

    /// Read an element count and check that `count` elements of at least
    /// `min_element_size` bytes could still fit, so hostile counts fail before
    /// any allocation.
    pub fn count(&mut self, min_element_size: usize) -> CodecResult<usize> {
        let count = self.u32()? as usize;
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Fails unless every byte was consumed.
    pub fn finish(&self) -> CodecResult<()> {
        if self.remaining() != 0 {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after offset {}",
                self.remaining(),
                self.offset
            )));
        }
        Ok(())
    }
}

/// Append-only little-endian writer.
#[derive(Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn bytes(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    pub fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn f32(&mut self, v: f32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn vec2(&mut self, v: Vec2) {
        self.f32(v.x);
        self.f32(v.y);
    }

    pub fn vec3(&mut self, v: Vec3) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
    }

    pub fn quat(&mut self, q: Quat) {
        self.f32(q.x);
        self.f32(q.y);
        self.f32(q.z);
        self.f32(q.w);
    }

    /// Write a collection length, rejecting anything that does not fit in u32.
    pub fn count(&mut self, len: usize, what: &str) -> CodecResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| CodecError::unrepresentable(format!("{len} {what} exceed u32")))?;
        self.u32(len);
        Ok(())
    }

    pub fn string(&mut self, s: &str) -> CodecResult<()> {
        self.count(s.len(), "string bytes")?;
        self.bytes(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reports_truncation() {
        let mut reader = ByteReader::new(&[1, 0]);
        match reader.u32() {
            Err(CodecError::Truncated {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_string_and_numbers() {
        let mut writer = ByteWriter::new();
        writer.string("PelvisNode").unwrap();
        writer.i32(-1);
        writer.f32(0.5);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.string().unwrap(), "PelvisNode");
        assert_eq!(reader.i32().unwrap(), -1);
        assert_eq!(reader.f32().unwrap(), 0.5);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_hostile_count_rejected_before_allocation() {
        let mut writer = ByteWriter::new();
        writer.u32(u32::MAX);
        let bytes = writer.into_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(reader.count(12), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn test_non_utf8_string_rejected() {
        let mut writer = ByteWriter::new();
        writer.u32(2);
        writer.bytes(&[0xff, 0xfe]);
        let bytes = writer.into_bytes();
        assert!(matches!(
            ByteReader::new(&bytes).string(),
            Err(CodecError::Malformed(_))
        ));
    }
}
