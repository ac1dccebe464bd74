//! cal-export library
//!
//! Identification, conversion and introspection of Cal character resources.
//! The `cal-export` binary is a thin CLI over these modules.

pub mod cache;
pub mod convert;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod sniff;
pub mod source;
pub mod summary;

pub use cache::{DashMapStore, IntrospectionCache, SummaryStore};
pub use convert::{ConversionService, Converted, RoundTripReport};
pub use error::{ConversionError, DecodeError, ExportError, UnrecognizedInput};
pub use fingerprint::ContentFingerprint;
pub use manifest::{Manifest, ManifestError};
pub use registry::{Registry, RegistryBuilder, ResourceDescriptor};
pub use resolver::{resolve_extension, resolve_path};
pub use sniff::{Attempt, attempt, identify, sniff};
pub use source::ByteSource;
pub use summary::{MaterialSummary, MeshSummary, SubmeshStat};

// Re-export the resource model so tools only need this crate
pub use cal_common::{Codec, CodecError, Resource};
pub use cal_shared::{Encoding, ResourceKind};
