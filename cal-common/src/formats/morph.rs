//! Binary morph animation format (.cpf)
//!
//! # Layout
//! ```text
//! header (8 bytes, magic "CPF\0")
//! duration f32 (> 0)
//! track_count u32
//! tracks (track_count ×):
//!   morph_name (u32 len + UTF-8)
//!   keyframe_count u32 (may be 0)
//!   keyframes (× time f32, weight f32)
//! ```

use cal_shared::MORPH_ANIMATION_FORMAT;

use super::header::BinaryHeader;
use super::io::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};
use crate::model::{MorphAnimation, MorphKeyframe, MorphTrack};

pub fn read_morph_animation(bytes: &[u8]) -> CodecResult<MorphAnimation> {
    let mut r = ByteReader::new(bytes);
    BinaryHeader::read(&mut r, &MORPH_ANIMATION_FORMAT)?;

    let duration = r.f32()?;
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(CodecError::malformed(format!("duration {duration}")));
    }

    let track_count = r.count(8)?;
    let mut tracks = Vec::with_capacity(track_count);
    for _ in 0..track_count {
        let morph_name = r.string()?;
        let keyframe_count = r.count(8)?;
        let mut keyframes = Vec::with_capacity(keyframe_count);
        for _ in 0..keyframe_count {
            keyframes.push(MorphKeyframe {
                time: r.f32()?,
                weight: r.f32()?,
            });
        }
        tracks.push(MorphTrack {
            morph_name,
            keyframes,
        });
    }
    r.finish()?;

    Ok(MorphAnimation { duration, tracks })
}

pub fn write_morph_animation(animation: &MorphAnimation) -> CodecResult<Vec<u8>> {
    if !(animation.duration > 0.0 && animation.duration.is_finite()) {
        return Err(CodecError::unrepresentable(format!(
            "duration {}",
            animation.duration
        )));
    }

    let mut w = ByteWriter::new();
    w.bytes(&BinaryHeader::new(&MORPH_ANIMATION_FORMAT).to_bytes());
    w.f32(animation.duration);
    w.count(animation.tracks.len(), "tracks")?;
    for track in &animation.tracks {
        w.string(&track.morph_name)?;
        w.count(track.keyframes.len(), "keyframes")?;
        for keyframe in &track.keyframes {
            if !keyframe.is_valid() {
                return Err(CodecError::unrepresentable(format!(
                    "morph {} keyframe at time {} weight {}",
                    track.morph_name, keyframe.time, keyframe.weight
                )));
            }
            w.f32(keyframe.time);
            w.f32(keyframe.weight);
        }
    }
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blink() -> MorphAnimation {
        let weights = [0.0, 0.5, 1.0, 0.740741, 0.259259, 0.0];
        MorphAnimation {
            duration: 0.166667,
            tracks: vec![
                MorphTrack {
                    morph_name: "eyes.Blink.Clamped".into(),
                    keyframes: weights
                        .iter()
                        .enumerate()
                        .map(|(i, &weight)| MorphKeyframe {
                            time: i as f32 / 30.0,
                            weight,
                        })
                        .collect(),
                },
                MorphTrack {
                    morph_name: "eyeseyes.exclusive".into(),
                    keyframes: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_morph_roundtrip_keeps_empty_tracks() {
        let animation = blink();
        let bytes = write_morph_animation(&animation).unwrap();
        assert_eq!(&bytes[0..4], b"CPF\0");
        let decoded = read_morph_animation(&bytes).unwrap();
        assert_eq!(decoded, animation);
        assert!(decoded.tracks[1].keyframes.is_empty());
    }

    #[test]
    fn test_skeletal_animation_is_not_a_morph() {
        let mut bytes = write_morph_animation(&blink()).unwrap();
        bytes[0..4].copy_from_slice(b"CAF\0");
        assert!(matches!(
            read_morph_animation(&bytes),
            Err(CodecError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_morph_every_prefix_is_truncated() {
        let bytes = write_morph_animation(&blink()).unwrap();
        for len in 0..bytes.len() {
            assert!(read_morph_animation(&bytes[..len]).is_err(), "prefix {len} accepted");
        }
    }
}
