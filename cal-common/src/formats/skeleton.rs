//! Binary skeleton format (.csf)
//!
//! # Layout
//! ```text
//! header (8 bytes, magic "CSF\0")
//! bone_count u32
//! has_ambient u8, ambient [f32; 3]
//! bones (bone_count ×):
//!   name (u32 len + UTF-8)
//!   translation [f32; 3], rotation [f32; 4]
//!   local_translation [f32; 3], local_rotation [f32; 4]
//!   parent_id i32
//!   has_light u8, light_type i32, light_color [f32; 3]
//!   child_count u32, child_ids (child_count × i32)
//! ```
//!
//! Child ids are written for readers that want them; on load the hierarchy is
//! rebuilt from parent ids and the stored child ids are only range-checked.

use cal_shared::SKELETON_FORMAT;
use glam::Vec3;

use super::header::BinaryHeader;
use super::io::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};
use crate::model::{Bone, BoneLight, Skeleton};

/// Smallest possible encoded bone: empty name, no children
const MIN_BONE_SIZE: usize = 4 + 12 + 16 + 12 + 16 + 4 + 1 + 4 + 12 + 4;

pub fn read_skeleton(bytes: &[u8]) -> CodecResult<Skeleton> {
    let mut r = ByteReader::new(bytes);
    BinaryHeader::read(&mut r, &SKELETON_FORMAT)?;

    let bone_count = r.count(MIN_BONE_SIZE)?;
    let has_ambient = r.u8()? != 0;
    let ambient = r.vec3()?;

    let mut bones = Vec::with_capacity(bone_count);
    for _ in 0..bone_count {
        let name = r.string()?;
        let translation = r.vec3()?;
        let rotation = r.quat()?;
        let local_translation = r.vec3()?;
        let local_rotation = r.quat()?;
        let parent_id = r.i32()?;
        let has_light = r.u8()? != 0;
        let light_type = r.i32()?;
        let light_color = r.vec3()?;
        let child_count = r.count(4)?;
        for _ in 0..child_count {
            let child = r.i32()?;
            if child < 0 || child as usize >= bone_count {
                return Err(CodecError::malformed(format!(
                    "bone {name} lists child {child}, skeleton has {bone_count} bones"
                )));
            }
        }
        bones.push(Bone {
            name,
            translation,
            rotation,
            local_translation,
            local_rotation,
            parent_id,
            light: has_light.then_some(BoneLight {
                light_type,
                color: light_color,
            }),
        });
    }
    r.finish()?;

    let skeleton = Skeleton {
        scene_ambient_color: has_ambient.then_some(ambient),
        bones,
    };
    skeleton.validate().map_err(CodecError::Malformed)?;
    Ok(skeleton)
}

pub fn write_skeleton(skeleton: &Skeleton) -> CodecResult<Vec<u8>> {
    skeleton.validate().map_err(CodecError::Unrepresentable)?;

    let mut w = ByteWriter::new();
    w.bytes(&BinaryHeader::new(&SKELETON_FORMAT).to_bytes());
    w.count(skeleton.bones.len(), "bones")?;
    w.u8(skeleton.scene_ambient_color.is_some() as u8);
    w.vec3(skeleton.scene_ambient_color.unwrap_or(Vec3::ZERO));

    for (id, bone) in skeleton.bones.iter().enumerate() {
        w.string(&bone.name)?;
        w.vec3(bone.translation);
        w.quat(bone.rotation);
        w.vec3(bone.local_translation);
        w.quat(bone.local_rotation);
        w.i32(bone.parent_id);
        let light = bone.light.unwrap_or(BoneLight {
            light_type: 0,
            color: Vec3::ZERO,
        });
        w.u8(bone.light.is_some() as u8);
        w.i32(light.light_type);
        w.vec3(light.color);

        let children: Vec<usize> = skeleton.children(id).collect();
        w.count(children.len(), "children")?;
        for child in children {
            w.i32(child as i32);
        }
    }
    Ok(w.into_bytes())
}
