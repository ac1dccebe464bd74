//! Binary skeletal animation format (.caf)
//!
//! # Layout
//! ```text
//! header (8 bytes, magic "CAF\0")
//! duration f32 (> 0)
//! track_count u32
//! tracks (track_count ×):
//!   TrackHeader (9 bytes): bone_id u32, flags u8, keyframe_count u32
//!   keyframes (keyframe_count ×):
//!     time f32
//!     has_translation u8, translation [f32; 3] if set
//!     rotation u32 (smallest-three)
//! ```
//!
//! A keyframe without translation inherits the previous keyframe's translation
//! when its track requires translation.

mod encoding;

pub use encoding::{decode_quat_smallest_three, encode_quat_smallest_three};

use cal_shared::SKELETAL_ANIMATION_FORMAT;
use glam::Quat;

use super::header::BinaryHeader;
use super::io::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};
use crate::model::{Animation, Keyframe, Track};

const MIN_KEYFRAME_SIZE: usize = 4 + 1 + 4;

/// Per-track header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct TrackHeader {
    pub bone_id: u32,
    pub flags: u8,
    pub keyframe_count: u32,
}

impl TrackHeader {
    pub const SIZE: usize = 9;

    pub const TRANSLATION_REQUIRED: u8 = 0x01;
    pub const TRANSLATION_IS_DYNAMIC: u8 = 0x02;
    pub const HIGH_RANGE_REQUIRED: u8 = 0x04;

    fn of(track: &Track) -> CodecResult<Self> {
        let mut flags = 0;
        if track.translation_required {
            flags |= Self::TRANSLATION_REQUIRED;
        }
        if track.translation_is_dynamic {
            flags |= Self::TRANSLATION_IS_DYNAMIC;
        }
        if track.high_range_required {
            flags |= Self::HIGH_RANGE_REQUIRED;
        }
        let keyframe_count = u32::try_from(track.keyframes.len()).map_err(|_| {
            CodecError::unrepresentable(format!("{} keyframes", track.keyframes.len()))
        })?;
        Ok(Self {
            bone_id: track.bone_id,
            flags,
            keyframe_count,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.bone_id.to_le_bytes());
        bytes[4] = self.flags;
        bytes[5..9].copy_from_slice(&self.keyframe_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            bone_id: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            flags: bytes[4],
            keyframe_count: u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
        })
    }

    fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

pub fn read_animation(bytes: &[u8]) -> CodecResult<Animation> {
    let mut r = ByteReader::new(bytes);
    BinaryHeader::read(&mut r, &SKELETAL_ANIMATION_FORMAT)?;

    let duration = r.f32()?;
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(CodecError::malformed(format!("duration {duration}")));
    }

    let track_count = r.count(TrackHeader::SIZE + MIN_KEYFRAME_SIZE)?;
    let mut tracks = Vec::with_capacity(track_count);
    for _ in 0..track_count {
        let header = TrackHeader::from_bytes(r.take(TrackHeader::SIZE)?)
            .ok_or_else(|| CodecError::malformed("short track header"))?;
        let keyframe_count = header.keyframe_count as usize;
        if keyframe_count == 0 {
            return Err(CodecError::malformed(format!(
                "track for bone {} has no keyframes",
                header.bone_id
            )));
        }
        if keyframe_count.saturating_mul(MIN_KEYFRAME_SIZE) > r.remaining() {
            return Err(CodecError::Truncated {
                offset: r.offset(),
                needed: keyframe_count * MIN_KEYFRAME_SIZE,
                available: r.remaining(),
            });
        }

        let mut track = Track {
            bone_id: header.bone_id,
            translation_required: header.has(TrackHeader::TRANSLATION_REQUIRED),
            translation_is_dynamic: header.has(TrackHeader::TRANSLATION_IS_DYNAMIC),
            high_range_required: header.has(TrackHeader::HIGH_RANGE_REQUIRED),
            keyframes: Vec::with_capacity(keyframe_count),
        };
        for _ in 0..keyframe_count {
            let time = r.f32()?;
            let translation = if r.u8()? != 0 {
                Some(r.vec3()?)
            } else if track.translation_required {
                track.keyframes.last().and_then(|k| k.translation)
            } else {
                None
            };
            let rotation = Quat::from_array(decode_quat_smallest_three(r.u32()?));
            track.keyframes.push(Keyframe {
                time,
                translation,
                rotation,
            });
        }
        tracks.push(track);
    }
    r.finish()?;

    Ok(Animation { duration, tracks })
}

pub fn write_animation(animation: &Animation) -> CodecResult<Vec<u8>> {
    if !(animation.duration > 0.0 && animation.duration.is_finite()) {
        return Err(CodecError::unrepresentable(format!(
            "duration {}",
            animation.duration
        )));
    }

    let mut w = ByteWriter::new();
    w.bytes(&BinaryHeader::new(&SKELETAL_ANIMATION_FORMAT).to_bytes());
    w.f32(animation.duration);
    w.count(animation.tracks.len(), "tracks")?;

    for track in &animation.tracks {
        if track.keyframes.is_empty() {
            return Err(CodecError::unrepresentable(format!(
                "track for bone {} has no keyframes",
                track.bone_id
            )));
        }
        w.bytes(&TrackHeader::of(track)?.to_bytes());
        for (index, keyframe) in track.keyframes.iter().enumerate() {
            if !keyframe.is_valid() {
                return Err(CodecError::unrepresentable(format!(
                    "keyframe {index} of bone {} at time {}",
                    track.bone_id, keyframe.time
                )));
            }
            w.f32(keyframe.time);
            match keyframe.translation {
                Some(translation) if track.writes_translation(index) => {
                    w.u8(1);
                    w.vec3(translation);
                }
                _ => w.u8(0),
            }
            let rotation = keyframe.rotation.normalize();
            w.u32(encode_quat_smallest_three(rotation.to_array()));
        }
    }
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests;
