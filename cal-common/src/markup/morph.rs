//! Markup morph animation (.xpf)
//!
//! ```text
//! <ANIMATION NUMTRACKS="n" DURATION="seconds">
//!     <TRACK NUMKEYFRAMES="k" MORPHNAME="name">
//!         <KEYFRAME TIME="t">
//!             <WEIGHT>w</WEIGHT>
//!         </KEYFRAME>...
//!     </TRACK>...
//! </ANIMATION>
//! ```

use cal_shared::MORPH_ANIMATION_FORMAT;

use super::{
    Element, MarkupWriter, format_float, parse_float_lenient, parse_floats_lenient, read_document,
};
use crate::error::{CodecError, CodecResult};
use crate::model::{MorphAnimation, MorphKeyframe, MorphTrack};

pub fn read_morph_animation(bytes: &[u8]) -> CodecResult<MorphAnimation> {
    let (_, root) = read_document(bytes, &MORPH_ANIMATION_FORMAT)?;

    let duration: f32 = root.parse_attr("DURATION")?;
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(CodecError::markup(format!("DURATION={duration}")));
    }

    let tracks = root
        .children
        .iter()
        .map(read_track)
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(MorphAnimation { duration, tracks })
}

fn read_track(element: &Element) -> CodecResult<MorphTrack> {
    if !element.is("TRACK") {
        return Err(CodecError::markup(format!(
            "expected <TRACK>, found <{}>",
            element.name
        )));
    }
    let morph_name = element.required_attr("MORPHNAME")?.to_owned();

    let mut keyframes = Vec::with_capacity(element.children.len());
    for keyframe in &element.children {
        if !keyframe.is("KEYFRAME") {
            return Err(CodecError::markup(format!(
                "expected <KEYFRAME>, found <{}>",
                keyframe.name
            )));
        }
        let mut cursor = keyframe.cursor();
        let [weight] = parse_floats_lenient(&cursor.expect("WEIGHT")?.text, "WEIGHT")?;
        cursor.finish()?;
        keyframes.push(MorphKeyframe {
            time: parse_float_lenient(keyframe.required_attr("TIME")?),
            weight,
        });
    }

    Ok(MorphTrack {
        morph_name,
        keyframes,
    })
}

pub fn write_morph_animation(animation: &MorphAnimation) -> CodecResult<Vec<u8>> {
    if !(animation.duration > 0.0 && animation.duration.is_finite()) {
        return Err(CodecError::unrepresentable(format!(
            "duration {}",
            animation.duration
        )));
    }

    let mut w = MarkupWriter::new(&MORPH_ANIMATION_FORMAT)?;
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
        let keyframe_count = track.keyframes.len().to_string();
        let attributes = [
            ("NUMKEYFRAMES", keyframe_count.as_str()),
            ("MORPHNAME", track.morph_name.as_str()),
        ];
        if track.keyframes.is_empty() {
            w.empty("TRACK", &attributes)?;
            continue;
        }
        w.start("TRACK", &attributes)?;
        for keyframe in &track.keyframes {
            w.start("KEYFRAME", &[("TIME", format_float(keyframe.time).as_str())])?;
            w.text("WEIGHT", &[], &format_float(keyframe.weight))?;
            w.end("KEYFRAME")?;
        }
        w.end("TRACK")?;
    }

    w.end("ANIMATION")?;
    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLINK: &str = r#"<HEADER VERSION="910" MAGIC="XPF" />
<ANIMATION NUMTRACKS="2" DURATION="0.166667">
    <TRACK NUMKEYFRAMES="3" MORPHNAME="eyes.Blink.Clamped">
        <KEYFRAME TIME="0">
            <WEIGHT>0</WEIGHT>
        </KEYFRAME>
        <KEYFRAME TIME="0.0333333">
            <WEIGHT>0.5</WEIGHT>
        </KEYFRAME>
        <KEYFRAME TIME="0.0666667">
            <WEIGHT>1</WEIGHT>
        </KEYFRAME>
    </TRACK>
    <TRACK NUMKEYFRAMES="0" MORPHNAME="eyeseyes.exclusive" />
</ANIMATION>"#;

    #[test]
    fn test_read_morph_animation() {
        let animation = read_morph_animation(BLINK.as_bytes()).unwrap();
        assert_eq!(animation.duration, 0.166667);
        assert_eq!(animation.tracks[0].morph_name, "eyes.Blink.Clamped");
        assert_eq!(animation.tracks[0].keyframes[1].time, 0.0333333);
        assert_eq!(animation.tracks[0].keyframes[1].weight, 0.5);
        assert!(animation.tracks[1].keyframes.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let animation = read_morph_animation(BLINK.as_bytes()).unwrap();
        let text = write_morph_animation(&animation).unwrap();
        assert_eq!(read_morph_animation(&text).unwrap(), animation);
    }

    #[test]
    fn test_skeletal_animation_is_not_a_morph() {
        let doc = BLINK.replacen(r#"MAGIC="XPF""#, r#"MAGIC="XAF""#, 1);
        assert!(read_morph_animation(doc.as_bytes()).is_err());
    }
}
