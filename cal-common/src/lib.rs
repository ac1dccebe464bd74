//! Resource model and codecs for Cal character assets.
//!
//! Each [`ResourceKind`] has a markup encoding (an XML-like document with a
//! `HEADER` element) and a packed binary encoding. Both decode into the same
//! [`Resource`] model, which is what makes conversion between them possible.

pub mod codec;
pub mod error;
pub mod formats;
pub mod markup;
pub mod model;

pub use codec::{BinaryCodec, Codec, MarkupCodec, builtin_codec};
pub use error::{CodecError, CodecResult};
pub use formats::{read_binary, write_binary};
pub use markup::{read_markup, write_markup};
pub use model::{
    Animation, Bone, Material, MaterialMap, Mesh, MorphAnimation, Resource, Skeleton, Submesh,
    Tolerance,
};

pub use cal_shared::{Encoding, ResourceKind};
