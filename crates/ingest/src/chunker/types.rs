//! Separator hierarchy.

use std::sync::LazyLock;

use regex::Regex;

static PARAGRAPH_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n)+").expect("paragraph separator"));
static SENTENCE_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence separator"));
static WORD_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("word separator"));

/// Split granularity, coarsest first. Below `Word` there is no split point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Paragraph,
    Sentence,
    Word,
}

impl Level {
    /// The next finer level, if any.
    pub(crate) fn next(self) -> Option<Level> {
        match self {
            Level::Paragraph => Some(Level::Sentence),
            Level::Sentence => Some(Level::Word),
            Level::Word => None,
        }
    }

    /// Separator pattern plus how many bytes of each match stay with the
    /// unit on its left (the terminal punctuation of a sentence).
    pub(crate) fn separator(self) -> (&'static Regex, usize) {
        match self {
            Level::Paragraph => (&*PARAGRAPH_SEP, 0),
            Level::Sentence => (&*SENTENCE_SEP, 1),
            Level::Word => (&*WORD_SEP, 0),
        }
    }
}
