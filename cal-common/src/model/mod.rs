//! In-memory resource model shared by the markup and binary codecs.

mod animation;
mod material;
mod mesh;
mod skeleton;

pub use animation::{Animation, Keyframe, MorphAnimation, MorphKeyframe, MorphTrack, Track};
pub use material::{DEFAULT_MAP_ROLE, Material, MaterialMap};
pub use mesh::{BlendVertex, Influence, Mesh, MorphTarget, Submesh, Vertex};
pub use skeleton::{Bone, BoneLight, Skeleton};

use cal_shared::ResourceKind;
use glam::{Quat, Vec2, Vec3};

/// A decoded resource of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Skeleton(Skeleton),
    Mesh(Mesh),
    Material(Material),
    SkeletalAnimation(Animation),
    MorphAnimation(MorphAnimation),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Skeleton(_) => ResourceKind::Skeleton,
            Resource::Mesh(_) => ResourceKind::Mesh,
            Resource::Material(_) => ResourceKind::Material,
            Resource::SkeletalAnimation(_) => ResourceKind::SkeletalAnimation,
            Resource::MorphAnimation(_) => ResourceKind::MorphAnimation,
        }
    }

    pub fn as_skeleton(&self) -> Option<&Skeleton> {
        match self {
            Resource::Skeleton(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Resource::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&Material> {
        match self {
            Resource::Material(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_animation(&self) -> Option<&Animation> {
        match self {
            Resource::SkeletalAnimation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_morph_animation(&self) -> Option<&MorphAnimation> {
        match self {
            Resource::MorphAnimation(a) => Some(a),
            _ => None,
        }
    }

    /// Remove keyframes carrying non-finite or otherwise invalid numbers.
    ///
    /// Skeletal tracks left without keyframes are removed too. Other kinds are
    /// untouched. Returns the number of keyframes removed.
    pub fn retain_valid_keyframes(&mut self) -> usize {
        match self {
            Resource::SkeletalAnimation(a) => a.retain_valid_keyframes(),
            Resource::MorphAnimation(a) => a.retain_valid_keyframes(),
            _ => 0,
        }
    }

    /// Semantic equality within `tol`.
    pub fn approx_eq(&self, other: &Resource, tol: Tolerance) -> bool {
        match (self, other) {
            (Resource::Skeleton(a), Resource::Skeleton(b)) => a.approx_eq(b, tol),
            (Resource::Mesh(a), Resource::Mesh(b)) => a.approx_eq(b, tol),
            (Resource::Material(a), Resource::Material(b)) => a.approx_eq(b, tol),
            (Resource::SkeletalAnimation(a), Resource::SkeletalAnimation(b)) => a.approx_eq(b, tol),
            (Resource::MorphAnimation(a), Resource::MorphAnimation(b)) => a.approx_eq(b, tol),
            _ => false,
        }
    }
}

/// Float comparison bounds for [`Resource::approx_eq`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Largest absolute difference between two scalars
    pub absolute: f32,
    /// Rotations match when `|dot|` of their normalized forms reaches `1 - rotation`
    pub rotation: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: 1e-3,
            rotation: 1e-4,
        }
    }
}

impl Tolerance {
    pub fn scalar(&self, a: f32, b: f32) -> bool {
        a == b || (a - b).abs() <= self.absolute
    }

    pub fn vec2(&self, a: Vec2, b: Vec2) -> bool {
        self.scalar(a.x, b.x) && self.scalar(a.y, b.y)
    }

    pub fn vec3(&self, a: Vec3, b: Vec3) -> bool {
        self.scalar(a.x, b.x) && self.scalar(a.y, b.y) && self.scalar(a.z, b.z)
    }

    pub fn vec2s(&self, a: &[Vec2], b: &[Vec2]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.vec2(*x, *y))
    }

    /// `q` and `-q` describe the same rotation.
    pub fn quat(&self, a: Quat, b: Quat) -> bool {
        if a == b {
            return true;
        }
        let (la, lb) = (a.length(), b.length());
        if la <= f32::EPSILON || lb <= f32::EPSILON {
            return false;
        }
        (a.dot(b) / (la * lb)).abs() >= 1.0 - self.rotation
    }
}
