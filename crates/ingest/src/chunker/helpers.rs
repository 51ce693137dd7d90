//! Byte-range utilities shared by the packer and the splitting strategy.

use std::ops::Range;

use super::types::Level;

/// Character count of `text[range]`.
pub(crate) fn char_len(text: &str, range: Range<usize>) -> usize {
    text[range].chars().count()
}

/// Shrink `range` so it neither starts nor ends with whitespace.
/// `None` when nothing but whitespace is left.
pub(crate) fn trimmed(text: &str, range: Range<usize>) -> Option<Range<usize>> {
    let s = &text[range.clone()];
    let body = s.trim_start();
    if body.is_empty() {
        return None;
    }
    let lead = s.len() - body.len();
    let trail = body.len() - body.trim_end().len();
    Some(range.start + lead..range.end - trail)
}

/// Byte offset `n` characters before `end`, never earlier than `floor`.
pub(crate) fn back_chars(text: &str, floor: usize, end: usize, n: usize) -> usize {
    if n == 0 {
        return end;
    }
    text[floor..end]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| floor + i)
        .unwrap_or(floor)
}

/// Cut `text[span]` at every separator of `level`. Units are trimmed,
/// non-empty and in order; the bytes between two units are separator
/// whitespace (plus nothing else).
pub(crate) fn split_units(text: &str, span: Range<usize>, level: Level) -> Vec<Range<usize>> {
    let (sep, keep) = level.separator();
    let base = span.start;
    let slice = &text[span];

    let mut units = Vec::new();
    let mut cursor = 0;
    for m in sep.find_iter(slice) {
        if let Some(unit) = trimmed(text, base + cursor..base + m.start() + keep) {
            units.push(unit);
        }
        cursor = m.end();
    }
    if let Some(unit) = trimmed(text, base + cursor..base + slice.len()) {
        units.push(unit);
    }
    units
}
