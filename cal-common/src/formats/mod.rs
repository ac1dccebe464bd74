//! Binary encodings of the five resource kinds.
//!
//! Every file starts with a [`BinaryHeader`] (magic + version) followed by a
//! packed little-endian payload. Each kind's module documents its layout.

pub mod animation;
mod header;
pub mod io;
mod material;
mod mesh;
mod morph;
mod skeleton;

pub use animation::{TrackHeader, read_animation, write_animation};
pub use header::BinaryHeader;
pub use material::{read_material, write_material};
pub use mesh::{MAX_FACE_INDEX, read_mesh, write_mesh};
pub use morph::{read_morph_animation, write_morph_animation};
pub use skeleton::{read_skeleton, write_skeleton};

use cal_shared::ResourceKind;

use crate::error::{CodecError, CodecResult};
use crate::model::Resource;

/// Decode a binary file of the given kind.
pub fn read_binary(kind: ResourceKind, bytes: &[u8]) -> CodecResult<Resource> {
    Ok(match kind {
        ResourceKind::Skeleton => Resource::Skeleton(read_skeleton(bytes)?),
        ResourceKind::Mesh => Resource::Mesh(read_mesh(bytes)?),
        ResourceKind::Material => Resource::Material(read_material(bytes)?),
        ResourceKind::SkeletalAnimation => Resource::SkeletalAnimation(read_animation(bytes)?),
        ResourceKind::MorphAnimation => Resource::MorphAnimation(read_morph_animation(bytes)?),
    })
}

/// Encode `resource`, which must be of `kind`.
pub fn write_binary(kind: ResourceKind, resource: &Resource) -> CodecResult<Vec<u8>> {
    match (kind, resource) {
        (ResourceKind::Skeleton, Resource::Skeleton(s)) => write_skeleton(s),
        (ResourceKind::Mesh, Resource::Mesh(m)) => write_mesh(m),
        (ResourceKind::Material, Resource::Material(m)) => write_material(m),
        (ResourceKind::SkeletalAnimation, Resource::SkeletalAnimation(a)) => write_animation(a),
        (ResourceKind::MorphAnimation, Resource::MorphAnimation(a)) => write_morph_animation(a),
        (expected, other) => Err(CodecError::WrongKind {
            expected,
            found: other.kind(),
        }),
    }
}
