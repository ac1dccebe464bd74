//! Bone hierarchy.

use glam::{Quat, Vec3};

use super::Tolerance;

/// Light attached to a bone (files from version 911 on).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneLight {
    pub light_type: i32,
    pub color: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Translation relative to the parent bone
    pub translation: Vec3,
    /// Rotation relative to the parent bone
    pub rotation: Quat,
    /// Translation from model space into bone space
    pub local_translation: Vec3,
    /// Rotation from model space into bone space
    pub local_rotation: Quat,
    /// Index of the parent bone, -1 for a root
    pub parent_id: i32,
    pub light: Option<BoneLight>,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent_id: i32) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            local_translation: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            parent_id,
            light: None,
        }
    }

    fn approx_eq(&self, other: &Bone, tol: Tolerance) -> bool {
        self.name == other.name
            && self.parent_id == other.parent_id
            && tol.vec3(self.translation, other.translation)
            && tol.quat(self.rotation, other.rotation)
            && tol.vec3(self.local_translation, other.local_translation)
            && tol.quat(self.local_rotation, other.local_rotation)
            && match (&self.light, &other.light) {
                (None, None) => true,
                (Some(a), Some(b)) => a.light_type == b.light_type && tol.vec3(a.color, b.color),
                _ => false,
            }
    }
}

/// Bones are addressed by their index in `bones`. Children are derived from
/// `parent_id`, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub scene_ambient_color: Option<Vec3>,
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Ids of the bones whose parent is `id`, in index order.
    pub fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.parent_id >= 0 && bone.parent_id as usize == id)
            .map(|(index, _)| index)
    }

    /// Every parent id is -1 or refers to another bone.
    pub fn validate(&self) -> Result<(), String> {
        for (index, bone) in self.bones.iter().enumerate() {
            if bone.parent_id < -1 || bone.parent_id >= self.bones.len() as i32 {
                return Err(format!(
                    "bone {index} ({}) has parent {} outside 0..{}",
                    bone.name,
                    bone.parent_id,
                    self.bones.len()
                ));
            }
            if bone.parent_id == index as i32 {
                return Err(format!("bone {index} ({}) is its own parent", bone.name));
            }
        }
        Ok(())
    }

    pub fn approx_eq(&self, other: &Skeleton, tol: Tolerance) -> bool {
        let ambient = match (self.scene_ambient_color, other.scene_ambient_color) {
            (None, None) => true,
            (Some(a), Some(b)) => tol.vec3(a, b),
            _ => false,
        };
        ambient
            && self.bones.len() == other.bones.len()
            && self
                .bones
                .iter()
                .zip(&other.bones)
                .all(|(a, b)| a.approx_eq(b, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_bones() -> Skeleton {
        Skeleton {
            scene_ambient_color: None,
            bones: vec![Bone::new("root", -1), Bone::new("hip", 0), Bone::new("spine", 0)],
        }
    }

    #[test]
    fn test_children_derived_from_parents() {
        let skeleton = three_bones();
        assert_eq!(skeleton.children(0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(skeleton.children(1).count(), 0);
    }

    #[test]
    fn test_validate_rejects_dangling_parent() {
        let mut skeleton = three_bones();
        assert!(skeleton.validate().is_ok());
        skeleton.bones[2].parent_id = 7;
        assert!(skeleton.validate().is_err());
        skeleton.bones[2].parent_id = 2;
        assert!(skeleton.validate().is_err());
    }

    #[test]
    fn test_approx_eq_accepts_negated_rotation() {
        let a = three_bones();
        let mut b = a.clone();
        b.bones[1].rotation = -b.bones[1].rotation;
        assert!(a.approx_eq(&b, Tolerance::default()));
        b.bones[1].name = "pelvis".into();
        assert!(!a.approx_eq(&b, Tolerance::default()));
    }
}
