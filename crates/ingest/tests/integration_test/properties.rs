use std::collections::HashSet;

use proptest::prelude::*;

use docslice_core::{ChunkConfig, RawImage};
use docslice_ingest::{chunk, correlate, normalize};

/// Prose-like raw text: words, punctuation, line wraps and blank lines,
/// including the CR and hyphen cases the normalizer repairs.
fn raw_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"([A-Za-z]{1,14}(-\r?\n|[ .,!?]{1,2}|\r?\n|\n[ \t]*\n\n?)){0,120}")
        .expect("valid regex")
}

fn chunk_config() -> impl Strategy<Value = ChunkConfig> {
    (1usize..160).prop_flat_map(|max| {
        (Just(max), 0..max).prop_map(|(max_chunk_size, overlap)| ChunkConfig {
            max_chunk_size,
            overlap,
        })
    })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in raw_text()) {
        let once = normalize(&raw);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_text_has_clean_paragraphs(raw in raw_text()) {
        let text = normalize(&raw);
        let s = text.as_str();
        prop_assert!(!s.contains('\r'));
        prop_assert!(!s.contains("\n\n\n"));
        prop_assert_eq!(s.trim(), s);
        let expected = if s.is_empty() { 0 } else { s.matches("\n\n").count() + 1 };
        prop_assert_eq!(text.paragraphs().count(), expected);
        for paragraph in text.paragraphs() {
            prop_assert!(!paragraph.contains('\n'));
            prop_assert_eq!(paragraph.trim(), paragraph);
        }
    }

    #[test]
    fn chunks_respect_the_size_limit(raw in raw_text(), config in chunk_config()) {
        let text = normalize(&raw);
        let chunks = chunk(&text, &config).unwrap();
        for c in &chunks {
            if c.oversized {
                prop_assert!(c.char_length > config.max_chunk_size);
                prop_assert!(!c.text.contains(char::is_whitespace));
            } else {
                prop_assert!(c.char_length <= config.max_chunk_size);
            }
        }
    }

    #[test]
    fn chunks_are_ordered_slices_of_the_text(raw in raw_text(), config in chunk_config()) {
        let text = normalize(&raw);
        let s = text.as_str();
        let chunks = chunk(&text, &config).unwrap();
        prop_assert_eq!(chunks.is_empty(), s.is_empty());

        let mut covered = 0;
        for (i, c) in chunks.iter().enumerate() {
            prop_assert_eq!(c.sequence_index, i);
            let (start, end) = c.source_range.unwrap();
            prop_assert_eq!(&s[start..end], c.text.as_str());
            prop_assert_eq!(c.char_length, c.text.chars().count());
            if i == 0 {
                prop_assert_eq!(start, 0);
            } else {
                prop_assert!(end > covered);
                if start >= covered {
                    prop_assert!(s[covered..start].trim().is_empty());
                }
            }
            covered = end;
        }
        prop_assert_eq!(covered, s.len());
    }

    #[test]
    fn without_overlap_chunks_never_share_text(raw in raw_text(), max in 1usize..160) {
        let text = normalize(&raw);
        let config = ChunkConfig { max_chunk_size: max, overlap: 0 };
        let chunks = chunk(&text, &config).unwrap();
        for pair in chunks.windows(2) {
            let (_, prev_end) = pair[0].source_range.unwrap();
            let (next_start, _) = pair[1].source_range.unwrap();
            prop_assert!(next_start >= prev_end);
        }
    }

    #[test]
    fn chunking_is_deterministic(raw in raw_text(), config in chunk_config()) {
        let text = normalize(&raw);
        prop_assert_eq!(chunk(&text, &config).unwrap(), chunk(&text, &config).unwrap());
    }

    #[test]
    fn every_image_gets_a_unique_artifact(
        sizes in prop::collection::vec(0usize..16, 0..24),
        document in "[A-Za-z0-9 ._-]{1,20}",
    ) {
        let images: Vec<RawImage> = sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| RawImage::new(1 + (i / 5) as u32, (i % 5) as u32, vec![0xab; n]))
            .collect();
        let artifacts = correlate(&images, &document);
        prop_assert_eq!(artifacts.len(), images.len());

        let names: HashSet<_> = artifacts.iter().map(|a| a.stable_filename.as_str()).collect();
        prop_assert_eq!(names.len(), artifacts.len());
        for (artifact, image) in artifacts.iter().zip(&images) {
            prop_assert_eq!((artifact.page, artifact.index), (image.page_number, image.image_index));
            // 0xab matches no known signature and there is no hint.
            prop_assert!(artifact.is_degraded());
            prop_assert_eq!(artifact.byte_length, 0);
        }
    }
}
