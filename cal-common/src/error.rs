//! Codec error type.

use cal_shared::ResourceKind;

/// Why a codec rejected its input (decode) or its resource (encode).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("input truncated: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: String, found: String },

    #[error("unsupported file version {0}")]
    UnsupportedVersion(u32),

    #[error("resource is a {found}, codec handles {expected}")]
    WrongKind {
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("markup error: {0}")]
    Markup(String),

    #[error("value cannot be encoded: {0}")]
    Unrepresentable(String),
}

impl CodecError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::Malformed(msg.into())
    }

    pub(crate) fn markup(msg: impl Into<String>) -> Self {
        CodecError::Markup(msg.into())
    }

    pub(crate) fn unrepresentable(msg: impl Into<String>) -> Self {
        CodecError::Unrepresentable(msg.into())
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
