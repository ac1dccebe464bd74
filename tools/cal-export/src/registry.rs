//! Codec registry
//!
//! Maps every [`ResourceKind`] to its format constants and its two codecs.
//! The standard registry wires in the built-in codecs; tests and tooling can
//! build one with substitute codecs through [`Registry::builder`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use cal_common::{Codec, builtin_codec};
use cal_shared::{Encoding, ResourceFormat, ResourceKind, format_of};
use hashbrown::HashMap;

/// Everything the toolkit knows about one resource kind.
#[derive(Clone)]
pub struct ResourceDescriptor {
    format: &'static ResourceFormat,
    markup: Arc<dyn Codec>,
    binary: Arc<dyn Codec>,
}

impl ResourceDescriptor {
    pub fn kind(&self) -> ResourceKind {
        self.format.kind
    }

    pub fn format(&self) -> &'static ResourceFormat {
        self.format
    }

    /// File extension (without dot) for `encoding`.
    pub fn extension(&self, encoding: Encoding) -> &'static str {
        self.format.extension(encoding)
    }

    pub fn codec(&self, encoding: Encoding) -> &dyn Codec {
        match encoding {
            Encoding::Markup => self.markup.as_ref(),
            Encoding::Binary => self.binary.as_ref(),
        }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("kind", &self.kind())
            .field("markup_ext", &self.format.markup_ext)
            .field("binary_ext", &self.format.binary_ext)
            .finish()
    }
}

/// One descriptor per kind, in [`ResourceKind::ALL`] order.
///
/// Immutable after construction, so a registry can be shared freely between
/// threads.
#[derive(Clone, Debug)]
pub struct Registry {
    descriptors: Vec<ResourceDescriptor>,
}

impl Registry {
    /// The process-wide registry with the built-in codecs.
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| Registry::builder().build())
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Descriptor for `kind`. Every kind is always present.
    pub fn describe(&self, kind: ResourceKind) -> &ResourceDescriptor {
        &self.descriptors[kind_index(kind)]
    }

    /// Every kind, in sniffing order.
    pub fn all_kinds(&self) -> &'static [ResourceKind] {
        &ResourceKind::ALL
    }

    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        &self.descriptors
    }

    /// Extension a file of `kind` in `encoding` should carry.
    pub fn extension_for(&self, kind: ResourceKind, encoding: Encoding) -> &'static str {
        self.describe(kind).extension(encoding)
    }
}

fn kind_index(kind: ResourceKind) -> usize {
    match kind {
        ResourceKind::Skeleton => 0,
        ResourceKind::Mesh => 1,
        ResourceKind::Material => 2,
        ResourceKind::SkeletalAnimation => 3,
        ResourceKind::MorphAnimation => 4,
    }
}

/// Collects codec overrides; any slot left empty gets the built-in codec.
#[derive(Default)]
pub struct RegistryBuilder {
    overrides: HashMap<(ResourceKind, Encoding), Arc<dyn Codec>>,
}

impl RegistryBuilder {
    /// Use `codec` for the (kind, encoding) slot it reports.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.overrides
            .insert((codec.kind(), codec.encoding()), codec);
        self
    }

    pub fn build(mut self) -> Registry {
        let mut slot = |kind, encoding| {
            self.overrides
                .remove(&(kind, encoding))
                .unwrap_or_else(|| builtin_codec(kind, encoding))
        };
        let descriptors = ResourceKind::ALL
            .into_iter()
            .map(|kind| ResourceDescriptor {
                format: format_of(kind),
                markup: slot(kind, Encoding::Markup),
                binary: slot(kind, Encoding::Binary),
            })
            .collect();
        Registry { descriptors }
    }
}
