//! Format specifications for the five Cal resource kinds.
//!
//! This module defines the `ResourceFormat` struct which serves as the single source of truth
//! for all per-kind file constants (extensions, binary magic bytes, markup magic).
//!
//! # Example
//!
//! ```
//! use cal_shared::{ResourceKind, format_of};
//!
//! let format = format_of(ResourceKind::Skeleton);
//! assert_eq!(format.markup_ext, "xsf");
//! assert_eq!(format.binary_ext, "csf");
//! assert_eq!(format.binary_magic, b"CSF\0");
//! ```

use crate::kind::{Encoding, ResourceKind};

/// Version written into every file we produce.
pub const CURRENT_FILE_VERSION: u32 = 919;

/// Oldest file version the decoders accept.
pub const EARLIEST_COMPATIBLE_FILE_VERSION: u32 = 699;

/// Files older than this carry no vertex colors, bone lights or material map types.
pub const FIRST_FILE_VERSION_WITH_VERTEX_COLORS: u32 = 911;

/// Opening bytes of every markup document this toolkit writes.
pub const MARKUP_DOCUMENT_MARKER: &[u8] = b"<HEADER";

/// File format specification for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct ResourceFormat {
    /// Kind this format describes
    pub kind: ResourceKind,

    /// Markup file extension without dot (e.g., "xsf")
    pub markup_ext: &'static str,

    /// Binary file extension without dot (e.g., "csf")
    pub binary_ext: &'static str,

    /// Magic bytes at start of a binary file (4 bytes)
    pub binary_magic: &'static [u8; 4],

    /// Value of the `MAGIC` attribute in a markup `HEADER` (e.g., "XSF")
    pub markup_magic: &'static str,

    /// Name of the root element following the markup `HEADER`
    pub markup_root: &'static str,
}

impl ResourceFormat {
    /// Create a new format specification.
    pub const fn new(
        kind: ResourceKind,
        markup_ext: &'static str,
        binary_ext: &'static str,
        binary_magic: &'static [u8; 4],
        markup_magic: &'static str,
        markup_root: &'static str,
    ) -> Self {
        Self {
            kind,
            markup_ext,
            binary_ext,
            binary_magic,
            markup_magic,
            markup_root,
        }
    }

    /// File extension for the given encoding.
    pub const fn extension(&self, encoding: Encoding) -> &'static str {
        match encoding {
            Encoding::Markup => self.markup_ext,
            Encoding::Binary => self.binary_ext,
        }
    }
}

pub const SKELETON_FORMAT: ResourceFormat = ResourceFormat::new(
    ResourceKind::Skeleton,
    "xsf",
    "csf",
    b"CSF\0",
    "XSF",
    "SKELETON",
);

pub const MESH_FORMAT: ResourceFormat =
    ResourceFormat::new(ResourceKind::Mesh, "xmf", "cmf", b"CMF\0", "XMF", "MESH");

pub const MATERIAL_FORMAT: ResourceFormat = ResourceFormat::new(
    ResourceKind::Material,
    "xrf",
    "crf",
    b"CRF\0",
    "XRF",
    "MATERIAL",
);

pub const SKELETAL_ANIMATION_FORMAT: ResourceFormat = ResourceFormat::new(
    ResourceKind::SkeletalAnimation,
    "xaf",
    "caf",
    b"CAF\0",
    "XAF",
    "ANIMATION",
);

pub const MORPH_ANIMATION_FORMAT: ResourceFormat = ResourceFormat::new(
    ResourceKind::MorphAnimation,
    "xpf",
    "cpf",
    b"CPF\0",
    "XPF",
    "ANIMATION",
);

/// All formats, in [`ResourceKind::ALL`] order.
pub const RESOURCE_FORMATS: [ResourceFormat; 5] = [
    SKELETON_FORMAT,
    MESH_FORMAT,
    MATERIAL_FORMAT,
    SKELETAL_ANIMATION_FORMAT,
    MORPH_ANIMATION_FORMAT,
];

/// Format table entry for `kind`.
pub const fn format_of(kind: ResourceKind) -> &'static ResourceFormat {
    match kind {
        ResourceKind::Skeleton => &SKELETON_FORMAT,
        ResourceKind::Mesh => &MESH_FORMAT,
        ResourceKind::Material => &MATERIAL_FORMAT,
        ResourceKind::SkeletalAnimation => &SKELETAL_ANIMATION_FORMAT,
        ResourceKind::MorphAnimation => &MORPH_ANIMATION_FORMAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_follow_kind_order() {
        for (format, kind) in RESOURCE_FORMATS.iter().zip(ResourceKind::ALL) {
            assert_eq!(format.kind, kind);
            assert_eq!(format_of(kind).kind, kind);
        }
    }

    #[test]
    fn test_binary_magic() {
        assert_eq!(SKELETON_FORMAT.binary_magic, b"CSF\0");
        assert_eq!(MESH_FORMAT.binary_magic, b"CMF\0");
        assert_eq!(MATERIAL_FORMAT.binary_magic, b"CRF\0");
        assert_eq!(SKELETAL_ANIMATION_FORMAT.binary_magic, b"CAF\0");
        assert_eq!(MORPH_ANIMATION_FORMAT.binary_magic, b"CPF\0");
    }

    #[test]
    fn test_extensions_are_unique_and_lowercase() {
        let mut seen = Vec::new();
        for format in RESOURCE_FORMATS {
            for ext in [format.markup_ext, format.binary_ext] {
                assert_eq!(ext, ext.to_ascii_lowercase());
                assert!(!seen.contains(&ext), "duplicate extension {ext}");
                seen.push(ext);
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_markup_magic_matches_extension() {
        for format in RESOURCE_FORMATS {
            assert!(format.markup_magic.eq_ignore_ascii_case(format.markup_ext));
        }
    }

    #[test]
    fn test_version_window() {
        assert!(EARLIEST_COMPATIBLE_FILE_VERSION < FIRST_FILE_VERSION_WITH_VERTEX_COLORS);
        assert!(FIRST_FILE_VERSION_WITH_VERTEX_COLORS < CURRENT_FILE_VERSION);
    }
}
