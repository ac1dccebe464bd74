//! Markup skeleton (.xsf)
//!
//! ```text
//! <SKELETON SCENEAMBIENTCOLOR="r g b" NUMBONES="n">
//!     <BONE NAME="..." NUMCHILDS="c" ID="i" [LIGHTTYPE="t" LIGHTCOLOR="r g b"]>
//!         <TRANSLATION>x y z</TRANSLATION>
//!         <ROTATION>x y z w</ROTATION>
//!         <LOCALTRANSLATION>x y z</LOCALTRANSLATION>
//!         <LOCALROTATION>x y z w</LOCALROTATION>
//!         <PARENTID>p</PARENTID>
//!         <CHILDID>c</CHILDID>...
//!     </BONE>
//! </SKELETON>
//! ```

use cal_shared::SKELETON_FORMAT;
use glam::{Quat, Vec3};

use super::writer::format_floats;
use super::{Element, MarkupWriter, parse_numbers, read_document};
use crate::error::{CodecError, CodecResult};
use crate::model::{Bone, BoneLight, Skeleton};

pub fn read_skeleton(bytes: &[u8]) -> CodecResult<Skeleton> {
    let (_, root) = read_document(bytes, &SKELETON_FORMAT)?;

    let scene_ambient_color = match root.attr("SCENEAMBIENTCOLOR") {
        Some(text) => Some(Vec3::from_array(parse_numbers(text, "SCENEAMBIENTCOLOR")?)),
        None => None,
    };

    let mut bones = Vec::with_capacity(root.children.len());
    let mut child_ids = Vec::new();
    for element in &root.children {
        let (bone, children) = read_bone(element)?;
        bones.push(bone);
        child_ids.extend(children);
    }

    // Stored child lists are advisory; the hierarchy comes from PARENTID.
    if let Some(bad) = child_ids
        .iter()
        .find(|&&id| id < 0 || id as usize >= bones.len())
    {
        return Err(CodecError::markup(format!(
            "CHILDID {bad} outside 0..{}",
            bones.len()
        )));
    }

    let skeleton = Skeleton {
        scene_ambient_color,
        bones,
    };
    skeleton.validate().map_err(CodecError::Markup)?;
    Ok(skeleton)
}

fn read_bone(element: &Element) -> CodecResult<(Bone, Vec<i32>)> {
    if !element.is("BONE") {
        return Err(CodecError::markup(format!(
            "expected <BONE>, found <{}>",
            element.name
        )));
    }
    let name = element.required_attr("NAME")?.to_owned();

    let light_type = element.parse_optional_attr::<i32>("LIGHTTYPE")?;
    let light_color = match element.attr("LIGHTCOLOR") {
        Some(text) => Some(Vec3::from_array(parse_numbers(text, "LIGHTCOLOR")?)),
        None => None,
    };
    let light = (light_type.is_some() || light_color.is_some()).then(|| BoneLight {
        light_type: light_type.unwrap_or(0),
        color: light_color.unwrap_or(Vec3::ZERO),
    });

    let mut cursor = element.cursor();
    let translation = vec3(cursor.expect("TRANSLATION")?)?;
    let rotation = quat(cursor.expect("ROTATION")?)?;
    let local_translation = vec3(cursor.expect("LOCALTRANSLATION")?)?;
    let local_rotation = quat(cursor.expect("LOCALROTATION")?)?;
    let [parent_id] = parse_numbers::<i32, 1>(&cursor.expect("PARENTID")?.text, "PARENTID")?;
    let mut children = Vec::new();
    while let Some(child) = cursor.next_if("CHILDID") {
        let [id] = parse_numbers::<i32, 1>(&child.text, "CHILDID")?;
        children.push(id);
    }
    cursor.finish()?;

    let bone = Bone {
        name,
        translation,
        rotation,
        local_translation,
        local_rotation,
        parent_id,
        light,
    };
    Ok((bone, children))
}

fn vec3(element: &Element) -> CodecResult<Vec3> {
    Ok(Vec3::from_array(parse_numbers(&element.text, &element.name)?))
}

fn quat(element: &Element) -> CodecResult<Quat> {
    Ok(Quat::from_array(parse_numbers(&element.text, &element.name)?))
}

pub fn write_skeleton(skeleton: &Skeleton) -> CodecResult<Vec<u8>> {
    skeleton.validate().map_err(CodecError::Unrepresentable)?;

    let mut w = MarkupWriter::new(&SKELETON_FORMAT)?;
    let bone_count = skeleton.bones.len().to_string();
    let ambient = skeleton
        .scene_ambient_color
        .map(|c| format_floats(&c.to_array()));
    let mut attributes = Vec::new();
    if let Some(ambient) = &ambient {
        attributes.push(("SCENEAMBIENTCOLOR", ambient.as_str()));
    }
    attributes.push(("NUMBONES", bone_count.as_str()));
    w.start("SKELETON", &attributes)?;

    for (id, bone) in skeleton.bones.iter().enumerate() {
        let children: Vec<usize> = skeleton.children(id).collect();
        let child_count = children.len().to_string();
        let id_text = id.to_string();
        let light_type = bone.light.map(|l| l.light_type.to_string());
        let light_color = bone.light.map(|l| format_floats(&l.color.to_array()));

        let mut attributes = vec![
            ("NAME", bone.name.as_str()),
            ("NUMCHILDS", child_count.as_str()),
            ("ID", id_text.as_str()),
        ];
        if let (Some(light_type), Some(light_color)) = (&light_type, &light_color) {
            attributes.push(("LIGHTTYPE", light_type.as_str()));
            attributes.push(("LIGHTCOLOR", light_color.as_str()));
        }

        w.start("BONE", &attributes)?;
        w.floats("TRANSLATION", &bone.translation.to_array())?;
        w.floats("ROTATION", &bone.rotation.to_array())?;
        w.floats("LOCALTRANSLATION", &bone.local_translation.to_array())?;
        w.floats("LOCALROTATION", &bone.local_rotation.to_array())?;
        w.text("PARENTID", &[], &bone.parent_id.to_string())?;
        for child in children {
            w.text("CHILDID", &[], &child.to_string())?;
        }
        w.end("BONE")?;
    }

    w.end("SKELETON")?;
    Ok(w.finish())
}
