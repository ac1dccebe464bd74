//! Tests for the binary skeletal animation format

use super::*;
use crate::model::Tolerance;
use glam::Vec3;

fn keyframe(time: f32, translation: Option<Vec3>, rotation: [f32; 4]) -> Keyframe {
    Keyframe {
        time,
        translation,
        rotation: Quat::from_array(rotation).normalize(),
    }
}

fn walk_cycle() -> Animation {
    let mut arm = Track::new(56);
    let shoulder = Vec3::new(95.4475, -0.29209, -0.0204049);
    arm.keyframes = vec![
        keyframe(0.0, Some(shoulder), [0.569964, -0.437345, 0.517176, -0.465187]),
        keyframe(3.0, Some(shoulder), [0.564503, -0.461901, 0.501256, -0.465538]),
        keyframe(3.03333, Some(shoulder), [0.564902, -0.460634, 0.501926, -0.465589]),
    ];

    let mut spine = Track::new(0);
    spine.translation_required = false;
    spine.translation_is_dynamic = false;
    spine.keyframes = vec![
        keyframe(0.0, None, [0.5, 0.5, 0.5, -0.5]),
        keyframe(40.0, None, [0.5, 0.5, 0.5, -0.5]),
    ];

    Animation {
        duration: 40.0,
        tracks: vec![arm, spine],
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_animation_roundtrip() {
    let animation = walk_cycle();
    let bytes = write_animation(&animation).unwrap();
    assert_eq!(&bytes[0..4], b"CAF\0");

    let decoded = read_animation(&bytes).unwrap();
    assert!(decoded.approx_eq(&animation, Tolerance::default()));
    assert_eq!(decoded.tracks[1].keyframes[0].translation, None);
}

#[test]
fn test_static_translation_is_inherited() {
    let mut animation = walk_cycle();
    animation.tracks[0].translation_is_dynamic = false;
    let bytes = write_animation(&animation).unwrap();
    let dynamic_len = write_animation(&walk_cycle()).unwrap().len();
    assert_eq!(bytes.len(), dynamic_len - 2 * 12);

    let decoded = read_animation(&bytes).unwrap();
    let expected = Vec3::new(95.4475, -0.29209, -0.0204049);
    for keyframe in &decoded.tracks[0].keyframes {
        assert_eq!(keyframe.translation, Some(expected));
    }
}

#[test]
fn test_track_flags_survive() {
    let decoded = read_animation(&write_animation(&walk_cycle()).unwrap()).unwrap();
    let spine = &decoded.tracks[1];
    assert!(!spine.translation_required);
    assert!(!spine.translation_is_dynamic);
    assert!(spine.high_range_required);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_nan_keyframe_is_unrepresentable() {
    let mut animation = walk_cycle();
    animation.tracks[0].keyframes[1].rotation = Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0);
    assert!(matches!(
        write_animation(&animation),
        Err(CodecError::Unrepresentable(_))
    ));
}

#[test]
fn test_zero_duration_is_unrepresentable() {
    let mut animation = walk_cycle();
    animation.duration = 0.0;
    assert!(write_animation(&animation).is_err());
}

#[test]
fn test_every_prefix_is_truncated() {
    let bytes = write_animation(&walk_cycle()).unwrap();
    for len in 0..bytes.len() {
        assert!(read_animation(&bytes[..len]).is_err(), "prefix {len} accepted");
    }
}

#[test]
fn test_track_header_layout() {
    let header = TrackHeader {
        bone_id: 0x0102_0304,
        flags: TrackHeader::TRANSLATION_IS_DYNAMIC,
        keyframe_count: 2,
    };
    let bytes = header.to_bytes();
    assert_eq!(bytes, [4, 3, 2, 1, 2, 2, 0, 0, 0]);
    assert_eq!(TrackHeader::from_bytes(&bytes), Some(header));
    assert!(TrackHeader::from_bytes(&bytes[..8]).is_none());
}
