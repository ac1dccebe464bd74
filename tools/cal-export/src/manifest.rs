//! Manifest parsing and batch conversion
//!
//! Parses a TOML asset list and converts every entry into the output
//! directory.
//!
//! ```toml
//! [output]
//! dir = "out"
//! encoding = "binary"
//!
//! [[assets]]
//! path = "skeleton.xsf"
//!
//! [[assets]]
//! path = "legacy/hair.bin"
//! kind = "material"
//! encoding = "markup"
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::io;
use std::path::{Path, PathBuf};

use cal_shared::{Encoding, ResourceKind};
use serde::Deserialize;

use crate::convert::ConversionService;
use crate::error::{ConversionError, UnrecognizedInput};
use crate::resolver::resolve_path;
use crate::sniff::{encoding_of, identify};
use crate::source::ByteSource;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to access {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse manifest {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("asset source not found: {0:?}")]
    MissingSource(PathBuf),

    #[error("asset {path:?} is declared as {declared} but its extension says {found}")]
    KindMismatch {
        path: PathBuf,
        declared: ResourceKind,
        found: ResourceKind,
    },

    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedInput),

    #[error("failed to convert {path:?}: {source}")]
    Convert {
        path: PathBuf,
        source: ConversionError,
    },
}

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Defaults to the manifest's directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_encoding")]
    pub encoding: Encoding,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            encoding: default_encoding(),
        }
    }
}

fn default_encoding() -> Encoding {
    Encoding::Binary
}

#[derive(Debug, Deserialize)]
pub struct AssetEntry {
    pub path: PathBuf,
    /// Skip identification and decode as this kind.
    #[serde(default)]
    pub kind: Option<ResourceKind>,
    /// Overrides `output.encoding` for this entry.
    #[serde(default)]
    pub encoding: Option<Encoding>,
}

/// One written output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltAsset {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: ResourceKind,
    pub from: Encoding,
    pub to: Encoding,
}

impl Manifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::parse(&content).map_err(|e| match e {
            ManifestError::Parse { source, .. } => ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest text; relative paths resolve against the working directory.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: PathBuf::new(),
            source,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn source_path(&self, entry: &AssetEntry) -> PathBuf {
        self.base_dir.join(&entry.path)
    }

    /// Output directory: `output_override`, else `output.dir`, else the
    /// manifest's directory.
    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match (output_override, &self.output.dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => self.base_dir.join(dir),
            (None, None) => self.base_dir.clone(),
        }
    }

    /// Validate a manifest without building
    pub fn validate(&self) -> Result<(), ManifestError> {
        for entry in &self.assets {
            let source = self.source_path(entry);
            if !source.is_file() {
                return Err(ManifestError::MissingSource(source));
            }
            if let (Some(declared), Some((found, _))) = (entry.kind, resolve_path(&source)) {
                if declared != found {
                    return Err(ManifestError::KindMismatch {
                        path: source,
                        declared,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    /// Convert every asset into the output directory.
    pub fn build_all(
        &self,
        service: &ConversionService,
        output_override: Option<&Path>,
    ) -> Result<Vec<BuiltAsset>, ManifestError> {
        self.validate()?;
        let output_dir = self.output_dir(output_override);
        std::fs::create_dir_all(&output_dir).map_err(|source| ManifestError::Io {
            path: output_dir.clone(),
            source,
        })?;

        let mut built = Vec::with_capacity(self.assets.len());
        for entry in &self.assets {
            built.push(self.build_one(service, entry, &output_dir)?);
        }
        Ok(built)
    }

    fn build_one(
        &self,
        service: &ConversionService,
        entry: &AssetEntry,
        output_dir: &Path,
    ) -> Result<BuiltAsset, ManifestError> {
        let source = self.source_path(entry);
        let bytes = ByteSource::read(&source).map_err(|e| ManifestError::Io {
            path: source.clone(),
            source: e,
        })?;

        let (kind, from) = match entry.kind {
            Some(kind) => (kind, encoding_of(&bytes)),
            None => identify(service.registry(), &bytes, Some(&source))?,
        };
        let to = entry.encoding.unwrap_or(self.output.encoding);

        let stem = source.file_stem().unwrap_or(source.as_os_str());
        let output = output_dir.join(format!(
            "{}.{}",
            stem.to_string_lossy(),
            service.registry().extension_for(kind, to)
        ));
        tracing::info!("Converting {kind}: {:?} -> {:?}", source, output);

        let converted = service
            .transcode(kind, from, to, &bytes)
            .map_err(|e| ManifestError::Convert {
                path: source.clone(),
                source: e,
            })?;
        std::fs::write(&output, converted).map_err(|e| ManifestError::Io {
            path: output.clone(),
            source: e,
        })?;

        Ok(BuiltAsset {
            source,
            output,
            kind,
            from,
            to,
        })
    }
}
