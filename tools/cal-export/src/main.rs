//! cal-export - Cal character asset tool
//!
//! Identifies, converts, verifies and inspects skeletons, meshes, materials
//! and animations in their markup (.xsf, .xmf, .xrf, .xaf, .xpf) and binary
//! (.csf, .cmf, .crf, .caf, .cpf) encodings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cal_export::sniff::encoding_of;
use cal_export::{
    ByteSource, ConversionService, Encoding, IntrospectionCache, Manifest, ResourceKind,
    identify, resolve_path, sniff,
};

#[derive(Parser)]
#[command(name = "cal-export")]
#[command(about = "Cal character asset tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify files by content
    Sniff {
        /// Files to identify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Convert a file to the other encoding
    Convert {
        /// Input file (markup or binary)
        input: PathBuf,

        /// Output file (default: input with the target extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Resource kind, skipping identification (e.g. skeleton, mesh)
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,

        /// Target encoding: markup or binary (default: the other one)
        #[arg(short, long, value_parser = parse_encoding)]
        to: Option<Encoding>,
    },

    /// Print a summary of a material or mesh
    Inspect {
        #[command(subcommand)]
        target: InspectTarget,
    },

    /// Convert files there and back again and compare
    Verify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Build assets from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },
}

#[derive(Subcommand)]
enum InspectTarget {
    /// Texture bindings of a material (.xrf/.crf)
    Material {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Submesh statistics of a mesh (.xmf/.cmf)
    Mesh {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::from_name(s).ok_or_else(|| {
        let names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.name()).collect();
        format!("unknown kind {s:?} (expected one of {})", names.join(", "))
    })
}

fn parse_encoding(s: &str) -> Result<Encoding, String> {
    [Encoding::Markup, Encoding::Binary]
        .into_iter()
        .find(|e| e.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown encoding {s:?} (expected markup or binary)"))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = ConversionService::default();

    match cli.command {
        Commands::Sniff { files } => {
            for file in files {
                let bytes = read(&file)?;
                match sniff(service.registry(), &bytes) {
                    Some((kind, encoding)) => println!("{}: {kind} {encoding}", file.display()),
                    None => println!("{}: unrecognized", file.display()),
                }
            }
        }

        Commands::Convert {
            input,
            output,
            kind,
            to,
        } => {
            let bytes = read(&input)?;
            let (kind, from) = match kind {
                Some(kind) => {
                    let from = resolve_path(&input)
                        .filter(|(found, _)| *found == kind)
                        .map_or_else(|| encoding_of(&bytes), |(_, encoding)| encoding);
                    (kind, from)
                }
                None => identify(service.registry(), &bytes, Some(&input))?,
            };
            let to = to.unwrap_or(from.other());
            let output = output.unwrap_or_else(|| {
                input.with_extension(service.registry().extension_for(kind, to))
            });
            if output == input {
                anyhow::bail!("Refusing to overwrite {:?}; pass --output", input);
            }

            tracing::info!("Converting {kind} {:?} -> {:?}", input, output);
            let converted = service.transcode(kind, from, to, &bytes)?;
            std::fs::write(&output, converted)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("Done!");
        }

        Commands::Inspect { target } => {
            let cache = IntrospectionCache::new(service.registry().clone().into());
            match target {
                InspectTarget::Material { file, json } => {
                    let source = map(&file)?;
                    let summary = cache.material_summary(&source)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(summary.as_ref())?);
                    } else {
                        let mut bindings: Vec<_> = summary.texture_bindings.iter().collect();
                        bindings.sort();
                        for (role, filename) in bindings {
                            println!("{role}: {filename}");
                        }
                    }
                }
                InspectTarget::Mesh { file, json } => {
                    let source = map(&file)?;
                    let summary = cache.mesh_summary(&source)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(summary.as_ref())?);
                    } else {
                        for (index, submesh) in summary.submeshes.iter().enumerate() {
                            let lod = submesh
                                .lod_step_count
                                .map_or_else(|| "-".to_string(), |n| n.to_string());
                            println!(
                                "submesh {index}: material {}, {} faces, {} vertices, lod steps {lod}",
                                submesh.material_thread_id, submesh.face_count, submesh.vertex_count
                            );
                        }
                        println!(
                            "total: {} submeshes, {} faces, {} vertices",
                            summary.submeshes.len(),
                            summary.face_count(),
                            summary.vertex_count()
                        );
                    }
                }
            }
        }

        Commands::Verify { files } => {
            let mut failures = 0;
            for file in &files {
                let bytes = read(file)?;
                let (kind, encoding) = identify(service.registry(), &bytes, Some(file))?;
                let report = service.roundtrip(kind, encoding, &bytes)?;
                println!(
                    "{}: {kind} {encoding} {} ({} -> {} bytes, {} corrupt keyframes dropped)",
                    file.display(),
                    if report.equivalent { "ok" } else { "MISMATCH" },
                    report.source_len,
                    report.converted_len,
                    report.dropped_keyframes
                );
                if !report.equivalent {
                    failures += 1;
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} of {} files did not survive a round trip", files.len());
            }
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building assets from {:?}", manifest);
            }
            let config = Manifest::load(&manifest)?;
            let built = config.build_all(&service, output.as_deref())?;
            tracing::info!("Build complete! {} assets written", built.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = Manifest::load(&manifest)?;
            config.validate()?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<ByteSource> {
    ByteSource::read(path).with_context(|| format!("Failed to read {:?}", path))
}

fn map(path: &Path) -> Result<ByteSource> {
    ByteSource::map(path).with_context(|| format!("Failed to map {:?}", path))
}
