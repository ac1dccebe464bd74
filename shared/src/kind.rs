//! Resource kinds and their two encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five kinds of character resource.
///
/// The declaration order is significant: [`ResourceKind::ALL`] is the order in
/// which format sniffing probes the kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Skeleton,
    Mesh,
    Material,
    SkeletalAnimation,
    MorphAnimation,
}

impl ResourceKind {
    /// Every kind, in probing order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Skeleton,
        ResourceKind::Mesh,
        ResourceKind::Material,
        ResourceKind::SkeletalAnimation,
        ResourceKind::MorphAnimation,
    ];

    /// Stable lower-case name, as used in manifests and CLI output.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Skeleton => "skeleton",
            ResourceKind::Mesh => "mesh",
            ResourceKind::Material => "material",
            ResourceKind::SkeletalAnimation => "skeletal_animation",
            ResourceKind::MorphAnimation => "morph_animation",
        }
    }

    /// Parse a kind from its [`name`](Self::name), ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a resource is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Tag-based text document (`HEADER` element followed by a root element).
    Markup,
    /// Magic-prefixed little-endian payload.
    Binary,
}

impl Encoding {
    /// The opposite encoding; conversion always targets this.
    pub const fn other(self) -> Self {
        match self {
            Encoding::Markup => Encoding::Binary,
            Encoding::Binary => Encoding::Markup,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Markup => "markup",
            Encoding::Binary => "binary",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_is_fixed() {
        assert_eq!(ResourceKind::ALL[0], ResourceKind::Skeleton);
        assert_eq!(ResourceKind::ALL[1], ResourceKind::Mesh);
        assert_eq!(ResourceKind::ALL[2], ResourceKind::Material);
        assert_eq!(ResourceKind::ALL[3], ResourceKind::SkeletalAnimation);
        assert_eq!(ResourceKind::ALL[4], ResourceKind::MorphAnimation);
    }

    #[test]
    fn test_kind_from_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ResourceKind::from_name("MESH"), Some(ResourceKind::Mesh));
        assert_eq!(ResourceKind::from_name("texture"), None);
    }

    #[test]
    fn test_encoding_other() {
        assert_eq!(Encoding::Markup.other(), Encoding::Binary);
        assert_eq!(Encoding::Binary.other(), Encoding::Markup);
    }
}
