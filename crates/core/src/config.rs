use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Where configuration values come from. The process environment in
/// production, a plain map in tests.
trait Source {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl Source for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|s| !s.is_empty())
    }
}

impl Source for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|s| !s.is_empty()).cloned()
    }
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt(src: &dyn Source, profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = src.get(&prefixed) {
            return Some(v);
        }
    }
    src.get(key)
}

fn profiled_or(src: &dyn Source, profile: &str, key: &str, default: &str) -> String {
    profiled_opt(src, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_usize(
    src: &dyn Source,
    profile: &str,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match profiled_opt(src, profile, key) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v,
        }),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub assembly: AssemblyConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCSLICE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let profile = ProcessEnv
            .get("DOCSLICE_PROFILE")
            .unwrap_or_default()
            .to_uppercase();
        Self::from_source(&ProcessEnv, &profile)
    }

    /// Build config from an explicit key/value map instead of the process
    /// environment.
    pub fn from_map(vars: &HashMap<String, String>, profile: &str) -> Result<Self, ConfigError> {
        Self::from_source(vars, &profile.to_uppercase())
    }

    fn from_source(src: &dyn Source, profile: &str) -> Result<Self, ConfigError> {
        let config = Self {
            profile: profile.to_string(),
            assembly: AssemblyConfig::from_source(src, profile)?,
            output: OutputConfig::from_source(src, profile),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assembly.validate()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        let chunking = &self.assembly.chunking;
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:  max_chunk_size={}, overlap={}",
            chunking.max_chunk_size,
            chunking.overlap
        );
        tracing::info!(
            "  assembly:  preview_chars={}, max_parallel_documents={}",
            self.assembly.preview_chars,
            self.assembly.max_parallel_documents
        );
        tracing::info!("  output:    dir={}", self.output.output_dir.display());
    }
}

// ── Chunking ──────────────────────────────────────────────────

/// Recursive chunker settings. Sizes are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Upper bound on a chunk's character length (default: 1000).
    pub max_chunk_size: usize,
    /// Trailing characters of a chunk repeated at the start of the next (default: 0).
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 0,
        }
    }
}

impl ChunkConfig {
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        let config = Self { max_chunk_size, overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.overlap >= self.max_chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.overlap,
                max_chunk_size: self.max_chunk_size,
            });
        }
        Ok(())
    }
}

// ── Assembly ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    pub chunking: ChunkConfig,
    /// Length of `ParsedDocument::text_preview`, in characters.
    pub preview_chars: usize,
    /// Upper bound on documents assembled at once during archive ingestion.
    pub max_parallel_documents: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkConfig::default(),
            preview_chars: 10_000,
            max_parallel_documents: 4,
        }
    }
}

impl AssemblyConfig {
    fn from_source(src: &dyn Source, p: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            chunking: ChunkConfig {
                max_chunk_size: profiled_usize(
                    src,
                    p,
                    "CHUNK_MAX_SIZE",
                    defaults.chunking.max_chunk_size,
                )?,
                overlap: profiled_usize(src, p, "CHUNK_OVERLAP", defaults.chunking.overlap)?,
            },
            preview_chars: profiled_usize(src, p, "PREVIEW_CHARS", defaults.preview_chars)?,
            max_parallel_documents: profiled_usize(
                src,
                p,
                "MAX_PARALLEL_DOCUMENTS",
                defaults.max_parallel_documents,
            )?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;
        if self.max_parallel_documents == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Ok(())
    }
}

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for per-document `parsed.json` / `images.json` folders.
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/processed"),
        }
    }
}

impl OutputConfig {
    fn from_source(src: &dyn Source, p: &str) -> Self {
        Self {
            output_dir: PathBuf::from(profiled_or(src, p, "OUTPUT_DIR", "data/processed")),
        }
    }
}
