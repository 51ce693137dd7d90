mod cli;
mod manifest;
mod output;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use docslice_core::config::{load_dotenv, Config};
use docslice_ingest::{assemble_archive, chunk, chunk_str, normalize, ArchiveEntry};

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let config = resolve_config(&args)?;

    match args.command {
        Command::Normalize { file } => {
            let text = read_text(&file)?;
            println!("{}", normalize(&text));
        }
        Command::Chunk { file, raw } => {
            let text = read_text(&file)?;
            let chunks = if raw {
                chunk_str(&text, &config.assembly.chunking)?
            } else {
                chunk(&normalize(&text), &config.assembly.chunking)?
            };
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
        Command::Assemble { manifests, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.output.output_dir.clone());
            run_assemble(&manifests, &out_dir, &config)?;
        }
    }

    Ok(())
}

/// Environment config with command-line overrides applied on top.
fn resolve_config(args: &CliArgs) -> Result<Config> {
    let env = Config::try_from_env().context("invalid environment configuration")?;
    let config = apply_overrides(env, args)?;
    config.log_summary();
    Ok(config)
}

/// Command-line flags win over whatever the environment said. The merged
/// result is validated again.
fn apply_overrides(mut config: Config, args: &CliArgs) -> Result<Config> {
    let assembly = &mut config.assembly;
    if let Some(n) = args.max_chunk_size {
        assembly.chunking.max_chunk_size = n;
    }
    if let Some(n) = args.overlap {
        assembly.chunking.overlap = n;
    }
    if let Some(n) = args.preview_chars {
        assembly.preview_chars = n;
    }
    if let Some(n) = args.jobs {
        assembly.max_parallel_documents = n;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_assemble(manifests: &[PathBuf], out_dir: &Path, config: &Config) -> Result<()> {
    let mut entries = Vec::with_capacity(manifests.len());
    let mut image_files = Vec::new();
    for path in manifests {
        let name = path.display().to_string();
        match manifest::load(path) {
            Ok(loaded) => {
                image_files.push(loaded.image_files);
                entries.push(ArchiveEntry::ok(name, loaded.extraction));
            }
            Err(e) => entries.push(ArchiveEntry::failed(name, e)),
        }
    }

    let report = assemble_archive(entries, &config.assembly).context("assembling documents")?;

    // Every successfully loaded manifest yields exactly one document, in order.
    let dirs = output::document_dirs(&report.documents);
    let mut write_failures = 0;
    for ((doc, files), dir) in report.documents.iter().zip(&image_files).zip(&dirs) {
        if let Err(e) = output::write_document(&out_dir.join(dir), doc, files) {
            warn!(document = %doc.source_identifier(), error = %format!("{e:#}"), "failed to write document");
            write_failures += 1;
        }
    }

    let failed = report.failures.len() + write_failures;
    info!(
        documents = report.documents.len() - write_failures,
        chunks = report.total_chunks(),
        images = report.total_images(),
        degraded_images = report.degraded_images(),
        failed,
        out_dir = %out_dir.display(),
        "assemble finished"
    );

    if failed > 0 {
        bail!("{failed} of {} documents failed", manifests.len());
    }
    Ok(())
}
