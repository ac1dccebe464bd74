//! Content sniffing
//!
//! Identification works by trial decoding: each kind's markup codec gets a
//! chance at the bytes, in registry order, and the first to accept names the
//! kind. Binary payloads are never probed; they are identified by extension.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use cal_common::{Codec, CodecError, Resource};
use cal_shared::{Encoding, MARKUP_DOCUMENT_MARKER, ResourceKind};

use crate::error::UnrecognizedInput;
use crate::registry::Registry;
use crate::resolver::resolve_path;

/// Outcome of one trial decode.
#[derive(Debug)]
pub enum Attempt {
    Accepted(Resource),
    Rejected(CodecError),
    /// The codec panicked. Treated like a rejection by every caller.
    Panicked,
}

impl Attempt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Attempt::Accepted(_))
    }

    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Attempt::Accepted(resource) => Some(resource),
            Attempt::Rejected(_) | Attempt::Panicked => None,
        }
    }
}

/// Run `codec.decode(bytes)`, turning errors and panics into values.
pub fn attempt(codec: &dyn Codec, bytes: &[u8]) -> Attempt {
    match panic::catch_unwind(AssertUnwindSafe(|| codec.decode(bytes))) {
        Ok(Ok(resource)) => Attempt::Accepted(resource),
        Ok(Err(e)) => {
            tracing::trace!("{} {} codec rejected input: {}", codec.kind(), codec.encoding(), e);
            Attempt::Rejected(e)
        }
        Err(_) => {
            tracing::trace!("{} {} codec panicked", codec.kind(), codec.encoding());
            Attempt::Panicked
        }
    }
}

/// Identify `bytes` by content alone.
///
/// The encoding is `Markup` when the bytes open with `<HEADER`, otherwise
/// `Binary`.
pub fn sniff(registry: &Registry, bytes: &[u8]) -> Option<(ResourceKind, Encoding)> {
    registry.all_kinds().iter().find_map(|&kind| {
        let codec = registry.describe(kind).codec(Encoding::Markup);
        attempt(codec, bytes)
            .is_accepted()
            .then(|| (kind, encoding_of(bytes)))
    })
}

/// Markup when `bytes` open with the `<HEADER` marker, otherwise binary.
pub fn encoding_of(bytes: &[u8]) -> Encoding {
    if bytes.starts_with(MARKUP_DOCUMENT_MARKER) {
        Encoding::Markup
    } else {
        Encoding::Binary
    }
}

/// Identify by content, falling back to the extension of `hint`.
pub fn identify(
    registry: &Registry,
    bytes: &[u8],
    hint: Option<&Path>,
) -> Result<(ResourceKind, Encoding), UnrecognizedInput> {
    if let Some(found) = sniff(registry, bytes) {
        return Ok(found);
    }
    match hint.and_then(resolve_path) {
        Some(found) => {
            tracing::debug!("identified {:?} by extension as {} {}", hint, found.0, found.1);
            Ok(found)
        }
        None => Err(UnrecognizedInput {
            hint: hint.map(|p| p.display().to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_common::CodecResult;
    use std::sync::Arc;

    const SKELETON: &str = r#"<HEADER VERSION="910" MAGIC="XSF" />
<SKELETON NUMBONES="1">
    <BONE NAME="Root" NUMCHILDS="0" ID="0">
        <TRANSLATION>0 0 0</TRANSLATION>
        <ROTATION>0 0 0 1</ROTATION>
        <LOCALTRANSLATION>0 0 0</LOCALTRANSLATION>
        <LOCALROTATION>0 0 0 1</LOCALROTATION>
        <PARENTID>-1</PARENTID>
    </BONE>
</SKELETON>"#;

    const MATERIAL: &str = r#"<HEADER VERSION="910" MAGIC="XRF" />
<MATERIAL NUMMAPS="0">
    <AMBIENT>255 255 255 255</AMBIENT>
    <DIFFUSE>255 255 255 255</DIFFUSE>
    <SPECULAR>255 255 255 255</SPECULAR>
    <SHININESS>0</SHININESS>
</MATERIAL>"#;

    struct Explodes;

    impl Codec for Explodes {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Skeleton
        }

        fn encoding(&self) -> Encoding {
            Encoding::Markup
        }

        fn decode(&self, _bytes: &[u8]) -> CodecResult<Resource> {
            panic!("decoder bug")
        }

        fn encode(&self, _resource: &Resource) -> CodecResult<Vec<u8>> {
            panic!("encoder bug")
        }
    }

    #[test]
    fn test_sniff_markup() {
        let registry = Registry::standard();
        assert_eq!(
            sniff(registry, SKELETON.as_bytes()),
            Some((ResourceKind::Skeleton, Encoding::Markup))
        );
        assert_eq!(
            sniff(registry, MATERIAL.as_bytes()),
            Some((ResourceKind::Material, Encoding::Markup))
        );
    }

    #[test]
    fn test_leading_whitespace_classified_binary() {
        let padded = format!("\n{MATERIAL}");
        assert_eq!(
            sniff(Registry::standard(), padded.as_bytes()),
            Some((ResourceKind::Material, Encoding::Binary))
        );
    }

    #[test]
    fn test_binary_payload_not_probed() {
        let registry = Registry::standard();
        let material = registry.describe(ResourceKind::Material);
        let resource = material
            .codec(Encoding::Markup)
            .decode(MATERIAL.as_bytes())
            .unwrap();
        let packed = material.codec(Encoding::Binary).encode(&resource).unwrap();
        assert_eq!(sniff(registry, &packed), None);
    }

    #[test]
    fn test_garbage() {
        let registry = Registry::standard();
        let inputs: [&[u8]; 4] = [b"", b"\xff\xfe\x00garbage", b"<HEADER", b"<<<>>>"];
        for bytes in inputs {
            assert_eq!(sniff(registry, bytes), None);
        }
    }

    #[test]
    fn test_panicking_codec_is_a_rejection() {
        assert!(matches!(
            attempt(&Explodes, SKELETON.as_bytes()),
            Attempt::Panicked
        ));

        let registry = Registry::builder().with_codec(Arc::new(Explodes)).build();
        assert_eq!(sniff(&registry, SKELETON.as_bytes()), None);
        assert_eq!(
            sniff(&registry, MATERIAL.as_bytes()),
            Some((ResourceKind::Material, Encoding::Markup))
        );
    }

    #[test]
    fn test_identify_falls_back_to_extension() {
        let registry = Registry::standard();
        assert_eq!(
            identify(registry, b"CSF\0...", Some(Path::new("bones.csf"))),
            Ok((ResourceKind::Skeleton, Encoding::Binary))
        );
        assert_eq!(
            identify(registry, MATERIAL.as_bytes(), Some(Path::new("bones.csf"))),
            Ok((ResourceKind::Material, Encoding::Markup))
        );
        let err = identify(registry, b"nothing", Some(Path::new("notes.txt"))).unwrap_err();
        assert_eq!(err.hint.as_deref(), Some("notes.txt"));
        assert!(identify(registry, b"nothing", None).is_err());
    }
}
