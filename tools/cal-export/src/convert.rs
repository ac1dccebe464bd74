//! Markup ⇄ binary conversion

use std::path::Path;
use std::sync::Arc;

use cal_common::{Resource, Tolerance};
use cal_shared::{Encoding, ResourceKind};
use serde::Serialize;

use crate::error::{ConversionError, ExportError};
use crate::registry::Registry;
use crate::sniff::identify;

/// Result of [`ConversionService::convert_auto`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub kind: ResourceKind,
    pub from: Encoding,
    pub to: Encoding,
    pub bytes: Vec<u8>,
}

/// Outcome of a there-and-back-again conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTripReport {
    pub kind: ResourceKind,
    pub source_encoding: Encoding,
    pub source_len: usize,
    pub converted_len: usize,
    /// Corrupt keyframes removed by the integrity filter.
    pub dropped_keyframes: usize,
    /// Whether the resource survived both conversions within tolerance.
    pub equivalent: bool,
}

impl RoundTripReport {
    /// Converted size relative to the source; below 1.0 means smaller.
    pub fn size_ratio(&self) -> f64 {
        if self.source_len == 0 {
            return 0.0;
        }
        self.converted_len as f64 / self.source_len as f64
    }
}

/// Converts resources between their two encodings.
///
/// Every conversion passes the decoded resource through the keyframe
/// integrity filter before encoding, so corrupt keyframes never reach the
/// output.
#[derive(Clone, Debug)]
pub struct ConversionService {
    registry: Arc<Registry>,
}

impl ConversionService {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Decode `bytes` as `kind` in `source_encoding` and encode the result in
    /// the other encoding.
    pub fn convert(
        &self,
        kind: ResourceKind,
        source_encoding: Encoding,
        bytes: &[u8],
    ) -> Result<Vec<u8>, ConversionError> {
        self.transcode(kind, source_encoding, source_encoding.other(), bytes)
    }

    pub fn to_binary(&self, kind: ResourceKind, markup: &[u8]) -> Result<Vec<u8>, ConversionError> {
        self.convert(kind, Encoding::Markup, markup)
    }

    pub fn to_markup(&self, kind: ResourceKind, binary: &[u8]) -> Result<Vec<u8>, ConversionError> {
        self.convert(kind, Encoding::Binary, binary)
    }

    /// Like [`convert`](Self::convert) with an explicit target, which may equal
    /// the source to re-emit a file in canonical form.
    pub fn transcode(
        &self,
        kind: ResourceKind,
        from: Encoding,
        to: Encoding,
        bytes: &[u8],
    ) -> Result<Vec<u8>, ConversionError> {
        let (resource, _) = self.decode_filtered(kind, from, bytes)?;
        let out = self.encode(kind, to, &resource)?;
        tracing::debug!(
            "converted {kind} {from} -> {to}: {} -> {} bytes",
            bytes.len(),
            out.len()
        );
        Ok(out)
    }

    /// Identify `bytes` (by content, then by the extension of `hint`) and
    /// convert them to the other encoding.
    pub fn convert_auto(&self, bytes: &[u8], hint: Option<&Path>) -> Result<Converted, ExportError> {
        let (kind, from) = identify(&self.registry, bytes, hint)?;
        let to = from.other();
        let bytes = self.transcode(kind, from, to, bytes)?;
        Ok(Converted {
            kind,
            from,
            to,
            bytes,
        })
    }

    /// Convert to the other encoding and back, and compare the result with
    /// the (filtered) source.
    pub fn roundtrip(
        &self,
        kind: ResourceKind,
        source_encoding: Encoding,
        bytes: &[u8],
    ) -> Result<RoundTripReport, ConversionError> {
        let (original, dropped_keyframes) = self.decode_filtered(kind, source_encoding, bytes)?;
        let target = source_encoding.other();

        let converted = self.encode(kind, target, &original)?;
        let (intermediate, _) = self.decode_filtered(kind, target, &converted)?;
        let restored = self.encode(kind, source_encoding, &intermediate)?;
        let (restored, _) = self.decode_filtered(kind, source_encoding, &restored)?;

        Ok(RoundTripReport {
            kind,
            source_encoding,
            source_len: bytes.len(),
            converted_len: converted.len(),
            dropped_keyframes,
            equivalent: restored.approx_eq(&original, Tolerance::default()),
        })
    }

    fn decode_filtered(
        &self,
        kind: ResourceKind,
        encoding: Encoding,
        bytes: &[u8],
    ) -> Result<(Resource, usize), ConversionError> {
        let codec = self.registry.describe(kind).codec(encoding);
        let mut resource = codec
            .decode(bytes)
            .map_err(|source| ConversionError::DecodeFailed {
                kind,
                encoding,
                source,
            })?;
        let dropped = resource.retain_valid_keyframes();
        if dropped > 0 {
            tracing::warn!("dropped {dropped} corrupt keyframes from {kind}");
        }
        Ok((resource, dropped))
    }

    fn encode(
        &self,
        kind: ResourceKind,
        encoding: Encoding,
        resource: &Resource,
    ) -> Result<Vec<u8>, ConversionError> {
        self.registry
            .describe(kind)
            .codec(encoding)
            .encode(resource)
            .map_err(|source| ConversionError::EncodeFailed {
                kind,
                encoding,
                source,
            })
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new(Arc::new(Registry::standard().clone()))
    }
}
