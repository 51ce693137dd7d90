//! Text repair for extractor output: line endings, hyphenation across line
//! wraps, and paragraph reflow.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Two or more newlines, with whitespace-only lines in between counting as blank.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n)+").expect("paragraph regex"));

/// Text produced by [`normalize`].
///
/// Paragraphs are single lines separated by exactly one blank line; there is
/// no leading or trailing whitespace and no hyphen left dangling at a line end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.0.split("\n\n").filter(|p| !p.is_empty())
    }

    /// The first `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize raw extracted text. Never fails; input without any paragraph
/// break simply becomes a single paragraph.
pub fn normalize(raw: &str) -> NormalizedText {
    let text = unify_line_endings(raw);
    let text = dehyphenate(&text);
    let text = join_soft_breaks(&text);

    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(&text)
        .filter_map(reflow_paragraph)
        .collect();

    NormalizedText(paragraphs.join("\n\n"))
}

fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `word-\nlowercase` becomes `wordlowercase`. Chains such as `a-\nb-\nc`
/// are handled in the same pass because the check looks at emitted output.
fn dehyphenate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '-'
            && chars.get(i + 1) == Some(&'\n')
            && chars.get(i + 2).is_some_and(|n| n.is_lowercase())
            && out.chars().next_back().is_some_and(is_word_char)
        {
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

/// A single newline between an ASCII digit or lowercase letter and a
/// lowercase letter is a layout wrap, not a break.
fn join_soft_breaks(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n'
            && i > 0
            && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit())
            && chars.get(i + 1).is_some_and(|n| n.is_lowercase())
        {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn reflow_paragraph(para: &str) -> Option<String> {
    let joined = para
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
