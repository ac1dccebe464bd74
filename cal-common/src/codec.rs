//! The codec seam: one decoder/encoder pair per (kind, encoding).

use std::sync::Arc;

use cal_shared::{Encoding, ResourceKind};

use crate::error::CodecResult;
use crate::formats::{read_binary, write_binary};
use crate::markup::{read_markup, write_markup};
use crate::model::Resource;

/// Decodes and encodes one resource kind in one encoding.
///
/// Implementations hold no mutable state; the same codec is shared across
/// threads by the registry.
pub trait Codec: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn encoding(&self) -> Encoding;

    fn decode(&self, bytes: &[u8]) -> CodecResult<Resource>;

    /// Fails with `WrongKind` when `resource` is not of [`Codec::kind`].
    fn encode(&self, resource: &Resource) -> CodecResult<Vec<u8>>;
}

/// Markup documents (`.xsf`, `.xmf`, ...).
#[derive(Debug, Clone, Copy)]
pub struct MarkupCodec {
    kind: ResourceKind,
}

impl MarkupCodec {
    pub const fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Codec for MarkupCodec {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn encoding(&self) -> Encoding {
        Encoding::Markup
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Resource> {
        read_markup(self.kind, bytes)
    }

    fn encode(&self, resource: &Resource) -> CodecResult<Vec<u8>> {
        write_markup(self.kind, resource)
    }
}

/// Packed binary files (`.csf`, `.cmf`, ...).
#[derive(Debug, Clone, Copy)]
pub struct BinaryCodec {
    kind: ResourceKind,
}

impl BinaryCodec {
    pub const fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Codec for BinaryCodec {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Resource> {
        read_binary(self.kind, bytes)
    }

    fn encode(&self, resource: &Resource) -> CodecResult<Vec<u8>> {
        write_binary(self.kind, resource)
    }
}

/// The built-in codec for `kind` in `encoding`.
pub fn builtin_codec(kind: ResourceKind, encoding: Encoding) -> Arc<dyn Codec> {
    match encoding {
        Encoding::Markup => Arc::new(MarkupCodec::new(kind)),
        Encoding::Binary => Arc::new(BinaryCodec::new(kind)),
    }
}
