//! SimScene CLI - Command-line tool for inspecting TS2 scene resources.
//!
//! This is the main entry point for the SimScene command-line application.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use simscene::prelude::*;

/// SimScene - GMDC/CRES scene resource inspection tool
#[derive(Parser)]
#[command(name = "simscene")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Decide from the file extension
    Auto,
    /// Geometry data container
    Gmdc,
    /// Skeleton resource
    Cres,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a GMDC or CRES file
    Info {
        /// Input file
        #[arg(short, long, env = "INPUT_FILE")]
        input: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: Format,
    },

    /// Decode a file, re-encode it, and check the bytes match
    Verify {
        /// Input file
        #[arg(short, long, env = "INPUT_FILE")]
        input: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value = "auto")]
        format: Format,
    },

    /// Cross-check a geometry file against its skeleton
    Validate {
        /// Input GMDC file
        #[arg(short, long)]
        gmdc: PathBuf,

        /// Input CRES file; bone checks are skipped when omitted
        #[arg(short, long)]
        cres: Option<PathBuf>,

        /// Report bone weight sums further than this from 1.0
        #[arg(short, long, default_value_t = 1e-3)]
        weight_tolerance: f32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, format } => cmd_info(&input, format)?,
        Commands::Verify { input, format } => cmd_verify(&input, format)?,
        Commands::Validate {
            gmdc,
            cres,
            weight_tolerance,
        } => cmd_validate(&gmdc, cres.as_deref(), weight_tolerance)?,
    }

    Ok(())
}

fn resolve_format(path: &Path, format: Format) -> Result<Format> {
    if format != Format::Auto {
        return Ok(format);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("gmdc") => Ok(Format::Gmdc),
        Some(ext) if ext.eq_ignore_ascii_case("cres") => Ok(Format::Cres),
        _ => anyhow::bail!(
            "cannot infer format of {}; pass --format gmdc or --format cres",
            path.display()
        ),
    }
}

fn cmd_info(input: &Path, format: Format) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    match resolve_format(input, format)? {
        Format::Gmdc => {
            let file = decode_gmdc(&data).context("Failed to decode GMDC file")?;
            println!("GMDC: {} ({} bytes)", input.display(), data.len());
            print_links(&file.links);
            if let Some(geometry) = file.geometry() {
                println!("{geometry}");
            }
            print_opaque_count(
                file.chunks
                    .iter()
                    .filter(|c| matches!(c, simscene::gmdc::GmdcChunk::Opaque(_)))
                    .count(),
            );
        }
        Format::Cres => {
            let file = decode_cres(&data).context("Failed to decode CRES file")?;
            println!("CRES: {} ({} bytes)", input.display(), data.len());
            print_links(&file.links);
            if let Some(skeleton) = file.skeleton() {
                print!("{skeleton}");
            }
            print_opaque_count(
                file.chunks
                    .iter()
                    .filter(|c| matches!(c, simscene::cres::CresChunk::Opaque(_)))
                    .count(),
            );
        }
        Format::Auto => unreachable!(),
    }

    Ok(())
}

fn print_links(links: &[simscene::common::chunk::LinkedResource]) {
    if !links.is_empty() {
        println!("--Linked resources ({}):", links.len());
        for link in links {
            println!(
                "  type {:08X}, group {:08X}, instance {:08X}, resource {:08X}",
                link.type_id, link.group_id, link.instance_id, link.resource_id
            );
        }
    }
}

fn print_opaque_count(count: usize) {
    if count > 0 {
        println!("--Opaque chunks carried verbatim: {count}");
    }
}

fn cmd_verify(input: &Path, format: Format) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    let reencoded = match resolve_format(input, format)? {
        Format::Gmdc => {
            let file = decode_gmdc(&data).context("Failed to decode GMDC file")?;
            encode_gmdc(&file).context("Failed to re-encode GMDC file")?
        }
        Format::Cres => {
            let file = decode_cres(&data).context("Failed to decode CRES file")?;
            encode_cres(&file).context("Failed to re-encode CRES file")?
        }
        Format::Auto => unreachable!(),
    };

    if reencoded == data {
        println!("OK: {} round-trips byte-identically", input.display());
        Ok(())
    } else {
        let divergence = data
            .iter()
            .zip(&reencoded)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| data.len().min(reencoded.len()));
        anyhow::bail!(
            "round-trip mismatch: {} bytes in, {} bytes out, first divergence at offset {}",
            data.len(),
            reencoded.len(),
            divergence
        );
    }
}

fn cmd_validate(gmdc_path: &Path, cres_path: Option<&Path>, tolerance: f32) -> Result<()> {
    let gmdc_data = fs::read(gmdc_path).context("Failed to read GMDC file")?;
    let gmdc = decode_gmdc(&gmdc_data).context("Failed to decode GMDC file")?;

    let cres = match cres_path {
        Some(path) => {
            let data = fs::read(path).context("Failed to read CRES file")?;
            decode_cres(&data).context("Failed to decode CRES file")?
        }
        None => CresFile::default(),
    };

    let issues = validate(&gmdc, &cres);
    for issue in &issues {
        println!("issue: {issue}");
    }

    let warnings = weight_issues(&gmdc, tolerance);
    for warning in &warnings {
        println!("warning: {warning}");
    }

    if issues.is_empty() {
        println!(
            "OK: no consistency issues ({} weight warnings)",
            warnings.len()
        );
        Ok(())
    } else {
        anyhow::bail!("{} consistency issues found", issues.len());
    }
}
