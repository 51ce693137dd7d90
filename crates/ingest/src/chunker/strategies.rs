//! Recursive descent over the separator hierarchy.

use std::ops::Range;

use docslice_core::{Chunk, ChunkConfig, ConfigError};

use super::helpers::{char_len, split_units};
use super::packer::Packer;
use super::types::Level;
use crate::normalize::NormalizedText;

/// Chunk normalized text.
pub fn chunk(text: &NormalizedText, config: &ChunkConfig) -> Result<Vec<Chunk>, ConfigError> {
    chunk_str(text.as_str(), config)
}

/// Chunk any string. Empty or whitespace-only input yields no chunks.
/// Fails only on an invalid `config`, before looking at the text.
pub fn chunk_str(text: &str, config: &ChunkConfig) -> Result<Vec<Chunk>, ConfigError> {
    config.validate()?;
    Ok(chunk_validated(text, config))
}

/// Chunk with a config the caller has already validated.
pub(crate) fn chunk_validated(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut packer = Packer::new(text, config);
    descend(text, 0..text.len(), Level::Paragraph, &mut packer);
    let chunks = packer.finish();

    tracing::debug!(
        chunks = chunks.len(),
        oversized = chunks.iter().filter(|c| c.oversized).count(),
        max_chunk_size = config.max_chunk_size,
        overlap = config.overlap,
        "chunked text"
    );
    chunks
}

/// Feed the units of `span` to the packer, splitting any unit over the limit
/// at the next finer level.
fn descend(text: &str, span: Range<usize>, level: Level, packer: &mut Packer<'_>) {
    for unit in split_units(text, span, level) {
        if char_len(text, unit.clone()) <= packer.max() {
            packer.push(unit);
            continue;
        }
        match level.next() {
            Some(finer) => descend(text, unit, finer, packer),
            None => packer.push_oversized(unit),
        }
    }
}
