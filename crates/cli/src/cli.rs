use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Turn raw PDF extractions into chunked, image-correlated documents.
#[derive(Parser, Debug)]
#[command(name = "docslice", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Maximum chunk length in characters (overrides CHUNK_MAX_SIZE)
    #[arg(long, global = true)]
    pub max_chunk_size: Option<usize>,

    /// Characters carried over between neighbouring chunks (overrides CHUNK_OVERLAP)
    #[arg(long, global = true)]
    pub overlap: Option<usize>,

    /// Length of the stored text preview (overrides PREVIEW_CHARS)
    #[arg(long, global = true)]
    pub preview_chars: Option<usize>,

    /// Documents assembled at once (overrides MAX_PARALLEL_DOCUMENTS)
    #[arg(long, global = true)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the normalized form of a raw text file
    Normalize {
        /// Text file as produced by the extractor
        file: PathBuf,
    },
    /// Print the chunks of a text file as JSON
    Chunk {
        /// Text file to chunk
        file: PathBuf,

        /// Chunk the file as-is, without normalizing it first
        #[arg(long)]
        raw: bool,
    },
    /// Assemble extraction manifests and write the results to disk
    Assemble {
        /// One manifest per document
        #[arg(required = true)]
        manifests: Vec<PathBuf>,

        /// Output root (overrides OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}
