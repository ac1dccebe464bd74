//! Shared types for the Cal character asset toolkit.
//!
//! Holds the closed set of resource kinds, their two encodings and the static
//! format table. Codec logic lives in `cal-common`.

pub mod kind;
pub mod resource_format;

pub use kind::{Encoding, ResourceKind};
pub use resource_format::{
    CURRENT_FILE_VERSION, EARLIEST_COMPATIBLE_FILE_VERSION, FIRST_FILE_VERSION_WITH_VERTEX_COLORS,
    MARKUP_DOCUMENT_MARKER, MATERIAL_FORMAT, MESH_FORMAT, MORPH_ANIMATION_FORMAT,
    RESOURCE_FORMATS, ResourceFormat, SKELETAL_ANIMATION_FORMAT, SKELETON_FORMAT, format_of,
};
