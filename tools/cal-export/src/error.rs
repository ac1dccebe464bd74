//! Error types for identification, conversion and summary decoding.

use cal_common::CodecError;
use cal_shared::{Encoding, ResourceKind};

/// Neither sniffing nor the path hint identified the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized input{}", hint_suffix(.hint))]
pub struct UnrecognizedInput {
    /// The path hint that was consulted, if any.
    pub hint: Option<String>,
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}

/// A conversion failed in one of its two codec steps.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot decode {kind} from {encoding}: {source}")]
    DecodeFailed {
        kind: ResourceKind,
        encoding: Encoding,
        source: CodecError,
    },

    #[error("cannot encode {kind} as {encoding}: {source}")]
    EncodeFailed {
        kind: ResourceKind,
        encoding: Encoding,
        source: CodecError,
    },
}

/// Neither encoding of `kind` decoded the bytes handed to the cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot decode {kind}: {source}")]
pub struct DecodeError {
    pub kind: ResourceKind,
    pub source: CodecError,
}

/// Identification or conversion failure from [`crate::ConversionService::convert_auto`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedInput),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
