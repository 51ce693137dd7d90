//! Greedy accumulation of units into chunks, with overlap carry-over.

use std::ops::Range;

use docslice_core::{ChunkConfig, Chunk};

use super::helpers::{back_chars, char_len, trimmed};

pub(crate) struct Packer<'a> {
    text: &'a str,
    max: usize,
    overlap: usize,
    acc: Option<Range<usize>>,
    chunks: Vec<Chunk>,
}

impl<'a> Packer<'a> {
    pub(crate) fn new(text: &'a str, config: &ChunkConfig) -> Self {
        Self {
            text,
            max: config.max_chunk_size,
            overlap: config.overlap,
            acc: None,
            chunks: Vec::new(),
        }
    }

    pub(crate) fn max(&self) -> usize {
        self.max
    }

    /// Append a unit that fits within the limit on its own.
    pub(crate) fn push(&mut self, unit: Range<usize>) {
        match self.acc.take() {
            None => self.acc = Some(self.open(unit)),
            Some(acc) => {
                let candidate = acc.start..unit.end;
                if char_len(self.text, candidate.clone()) <= self.max {
                    self.acc = Some(candidate);
                } else {
                    self.emit(acc, false);
                    self.acc = Some(self.open(unit));
                }
            }
        }
    }

    /// Emit a unit that cannot be split and is over the limit, verbatim.
    pub(crate) fn push_oversized(&mut self, unit: Range<usize>) {
        self.flush();
        let oversized = char_len(self.text, unit.clone()) > self.max;
        self.emit(unit, oversized);
    }

    pub(crate) fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }

    fn flush(&mut self) {
        if let Some(acc) = self.acc.take() {
            self.emit(acc, false);
        }
    }

    /// Start a new accumulator at `unit`, reaching back into the previous
    /// chunk for up to `overlap` characters. The carry shrinks so the
    /// accumulator never starts out over the limit.
    fn open(&self, unit: Range<usize>) -> Range<usize> {
        if self.overlap == 0 {
            return unit;
        }
        let Some((prev_start, prev_end)) = self.chunks.last().and_then(|c| c.source_range)
        else {
            return unit;
        };
        let room = self
            .max
            .saturating_sub(char_len(self.text, prev_end..unit.end));
        let carry = self.overlap.min(room);
        if carry == 0 {
            return unit;
        }
        back_chars(self.text, prev_start, prev_end, carry)..unit.end
    }

    fn emit(&mut self, range: Range<usize>, oversized: bool) {
        let Some(range) = trimmed(self.text, range) else {
            return;
        };
        let text = &self.text[range.clone()];
        self.chunks.push(Chunk {
            sequence_index: self.chunks.len(),
            text: text.to_string(),
            char_length: text.chars().count(),
            source_range: Some((range.start, range.end)),
            oversized,
        });
    }
}
