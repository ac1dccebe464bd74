//! Markup skeletal animation (.xaf)
//!
//! ```text
//! <ANIMATION NUMTRACKS="n" DURATION="seconds">
//!     <TRACK BONEID="b" [TRANSLATIONREQUIRED="0|1"] [TRANSLATIONISDYNAMIC="0|1"]
//!            [HIGHRANGEREQUIRED="0|1"] NUMKEYFRAMES="k">
//!         <KEYFRAME TIME="t">
//!             [<TRANSLATION>x y z</TRANSLATION>]
//!             <ROTATION>x y z w</ROTATION>
//!         </KEYFRAME>...
//!     </TRACK>...
//! </ANIMATION>
//! ```
//!
//! Track flags default to true when absent. Keyframe numbers that do not parse
//! are read as NaN and left for the keyframe filter.

use cal_shared::SKELETAL_ANIMATION_FORMAT;
use glam::{Quat, Vec3};

use super::{
    Element, MarkupWriter, format_float, parse_float_lenient, parse_floats_lenient, read_document,
};
use crate::error::{CodecError, CodecResult};
use crate::model::{Animation, Keyframe, Track};

pub fn read_animation(bytes: &[u8]) -> CodecResult<Animation> {
    let (_, root) = read_document(bytes, &SKELETAL_ANIMATION_FORMAT)?;

    let duration: f32 = root.parse_attr("DURATION")?;
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(CodecError::markup(format!("DURATION={duration}")));
    }

    let tracks = root
        .children
        .iter()
        .map(read_track)
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Animation { duration, tracks })
}

fn read_track(element: &Element) -> CodecResult<Track> {
    if !element.is("TRACK") {
        return Err(CodecError::markup(format!(
            "expected <TRACK>, found <{}>",
            element.name
        )));
    }
    let declared: i64 = element.parse_attr("NUMKEYFRAMES")?;
    if declared <= 0 {
        return Err(CodecError::markup(format!("NUMKEYFRAMES={declared}")));
    }

    let mut track = Track {
        bone_id: element.parse_attr("BONEID")?,
        translation_required: element.flag_attr("TRANSLATIONREQUIRED", true)?,
        translation_is_dynamic: element.flag_attr("TRANSLATIONISDYNAMIC", true)?,
        high_range_required: element.flag_attr("HIGHRANGEREQUIRED", true)?,
        keyframes: Vec::with_capacity(element.children.len()),
    };

    for keyframe in &element.children {
        if !keyframe.is("KEYFRAME") {
            return Err(CodecError::markup(format!(
                "expected <KEYFRAME>, found <{}>",
                keyframe.name
            )));
        }
        let time = parse_float_lenient(keyframe.required_attr("TIME")?);
        let mut cursor = keyframe.cursor();

        let translation = match cursor.next_if("TRANSLATION") {
            Some(t) => Some(Vec3::from_array(parse_floats_lenient(&t.text, "TRANSLATION")?)),
            None if track.translation_required => {
                track.keyframes.last().and_then(|k| k.translation)
            }
            None => None,
        };
        let rotation = cursor.expect("ROTATION")?;
        let rotation = Quat::from_array(parse_floats_lenient(&rotation.text, "ROTATION")?);
        cursor.finish()?;

        track.keyframes.push(Keyframe {
            time,
            translation,
            rotation,
        });
    }

    if track.keyframes.is_empty() {
        return Err(CodecError::markup(format!(
            "track for bone {} has no keyframes",
            track.bone_id
        )));
    }
    Ok(track)
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

pub fn write_animation(animation: &Animation) -> CodecResult<Vec<u8>> {
    if !(animation.duration > 0.0 && animation.duration.is_finite()) {
        return Err(CodecError::unrepresentable(format!(
            "duration {}",
            animation.duration
        )));
    }

    let mut w = MarkupWriter::new(&SKELETAL_ANIMATION_FORMAT)?;
    let track_count = animation.tracks.len().to_string();
    let duration = format_float(animation.duration);
    w.start(
        "ANIMATION",
        &[
            ("NUMTRACKS", track_count.as_str()),
            ("DURATION", duration.as_str()),
        ],
    )?;

    for track in &animation.tracks {
        if track.keyframes.is_empty() {
            return Err(CodecError::unrepresentable(format!(
                "track for bone {} has no keyframes",
                track.bone_id
            )));
        }
        let bone_id = track.bone_id.to_string();
        let keyframe_count = track.keyframes.len().to_string();
        w.start(
            "TRACK",
            &[
                ("BONEID", bone_id.as_str()),
                ("TRANSLATIONREQUIRED", flag(track.translation_required)),
                ("TRANSLATIONISDYNAMIC", flag(track.translation_is_dynamic)),
                ("HIGHRANGEREQUIRED", flag(track.high_range_required)),
                ("NUMKEYFRAMES", keyframe_count.as_str()),
            ],
        )?;
        for (index, keyframe) in track.keyframes.iter().enumerate() {
            w.start("KEYFRAME", &[("TIME", format_float(keyframe.time).as_str())])?;
            if let Some(translation) = keyframe.translation {
                if track.writes_translation(index) {
                    w.floats("TRANSLATION", &translation.to_array())?;
                }
            }
            w.floats("ROTATION", &keyframe.rotation.to_array())?;
            w.end("KEYFRAME")?;
        }
        w.end("TRACK")?;
    }

    w.end("ANIMATION")?;
    Ok(w.finish())
}
