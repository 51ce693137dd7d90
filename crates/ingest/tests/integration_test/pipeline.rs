use serde_json::json;

use docslice_core::{
    AssemblyConfig, ConfigError, DocsliceError, ExtractionError, ImageStatus, ParsedDocument,
    RawExtraction, RawImage, RawPage,
};
use docslice_ingest::{
    assemble, assemble_archive, attach_figure_bboxes, chunk, chunk_str, normalize,
    parse_figure_blocks, ArchiveEntry,
};

use crate::helpers::{filler, make_config, report_with_broken_image, text_only, JPEG, PNG};

// ── Normalization ───────────────────────────────────────────────────

#[test]
fn hyphenated_page_text_reads_as_prose() {
    let raw = text_only(
        "notes.pdf",
        &["multi-\nple para-\ngraphs here.\n\n\nNext one."],
    );
    let doc = assemble(raw, &AssemblyConfig::default()).unwrap();
    assert_eq!(doc.chunks().len(), 1);
    assert_eq!(doc.chunks()[0].text, "multiple paragraphs here.\n\nNext one.");
    assert_eq!(doc.text_preview(), "multiple paragraphs here.\n\nNext one.");
}

#[test]
fn word_split_across_pages_is_not_rejoined() {
    // The page join inserts a paragraph break, so the hyphen stays.
    let raw = text_only("split.pdf", &["continu-", "ation of text"]);
    let doc = assemble(raw, &AssemblyConfig::default()).unwrap();
    assert_eq!(doc.chunks()[0].text, "continu-\n\nation of text");
}

// ── Chunking ────────────────────────────────────────────────────────

#[test]
fn long_document_chunks_within_limit() {
    let text = normalize(&format!("{}\n\n{}", filler(1200), filler(1298)));
    assert_eq!(text.char_len(), 2500);

    let chunks = chunk(&text, &make_config(1000, 0).chunking).unwrap();
    assert_eq!(chunks.len(), 3);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.sequence_index, i);
        assert!(c.char_length <= 1000);
        assert!(!c.oversized);
    }
    let break_at = text.as_str().find("\n\n").unwrap();
    let (_, first_end) = chunks[0].source_range.unwrap();
    assert!(first_end <= break_at);
}

#[test]
fn unsplittable_text_is_kept_whole() {
    let chunks = chunk_str("supercalifragilistic", &make_config(10, 0).chunking).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].char_length, 20);
    assert!(chunks[0].oversized);
}

#[test]
fn overlap_is_visible_between_neighbours() {
    let raw = text_only("overlap.pdf", &["alpha beta gamma delta epsilon zeta eta theta"]);
    let doc = assemble(raw, &make_config(20, 5)).unwrap();
    assert!(doc.chunks().len() > 1);
    for pair in doc.chunks().windows(2) {
        let (_, prev_end) = pair[0].source_range.unwrap();
        let (next_start, _) = pair[1].source_range.unwrap();
        assert!(next_start < prev_end, "neighbouring chunks should share text");
    }
    assert!(doc.chunks().iter().all(|c| c.char_length <= 20));
}

#[test]
fn bad_overlap_fails_before_any_work() {
    let raw = text_only("a.pdf", &["text"]);
    assert_eq!(
        assemble(raw, &make_config(100, 100)).unwrap_err(),
        ConfigError::OverlapTooLarge {
            overlap: 100,
            max_chunk_size: 100
        }
    );
}

// ── Images ──────────────────────────────────────────────────────────

#[test]
fn broken_image_is_degraded_without_affecting_siblings() {
    let doc = assemble(report_with_broken_image(), &AssemblyConfig::default()).unwrap();
    let images = doc.images();
    assert_eq!(images.len(), 3);

    let order: Vec<_> = images.iter().map(|i| (i.page, i.index)).collect();
    assert_eq!(order, vec![(2, 0), (2, 1), (2, 2)]);

    assert!(images[1].is_degraded());
    assert_eq!(images[1].byte_length, 0);
    assert!(!images[0].is_degraded());
    assert!(!images[2].is_degraded());
    assert_eq!(images[0].stable_filename, "quarterly-report_p2_img0.png");
    assert_eq!(images[2].stable_filename, "quarterly-report_p2_img2.jpg");
    assert_eq!(doc.degraded_images(), 1);
}

#[test]
fn artifacts_follow_image_index_not_listing_order() {
    let raw = RawExtraction::new(
        "scrambled.pdf",
        vec![
            RawPage::new(1, "cover", vec![]),
            RawPage::new(
                2,
                "plates",
                vec![
                    RawImage::new(2, 2, JPEG.to_vec()),
                    RawImage::new(2, 0, PNG.to_vec()),
                    RawImage::new(2, 1, Vec::new()),
                ],
            ),
        ],
    )
    .unwrap();
    let doc = assemble(raw, &AssemblyConfig::default()).unwrap();

    let order: Vec<_> = doc.images().iter().map(|i| (i.page, i.index)).collect();
    assert_eq!(order, vec![(2, 0), (2, 1), (2, 2)]);
    assert_eq!(doc.images()[0].mime_type, "image/png");
    assert!(doc.images()[1].is_degraded());
    assert_eq!(doc.images()[2].mime_type, "image/jpeg");
}

#[test]
fn reprocessing_produces_identical_output() {
    let config = make_config(40, 8);
    let first = assemble(report_with_broken_image(), &config).unwrap();
    let second = assemble(report_with_broken_image(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn figure_boxes_reach_the_artifacts() {
    let mut raw = report_with_broken_image();
    let converter_output = json!({
        "blocks": [
            {"type": "text", "page": 2, "bbox": [0, 0, 600, 40]},
            {"type": "figure", "page": 2, "bbox": [10, 50, 300, 250]},
            {"type": "figure", "page": 2, "bbox": [10, 260, 300, 460]},
            {"type": "figure", "page": 2, "bbox": [310, 50, 590, 250]}
        ]
    });
    let figures = parse_figure_blocks(&converter_output);
    assert_eq!(figures.len(), 3);
    assert_eq!(attach_figure_bboxes(&mut raw, &figures), 3);

    let doc = assemble(raw, &AssemblyConfig::default()).unwrap();
    let widths: Vec<_> = doc
        .images()
        .iter()
        .map(|i| i.bbox.map(|b| b.width()))
        .collect();
    assert_eq!(widths, vec![Some(290.0), Some(290.0), Some(280.0)]);
}

// ── Serialized form ─────────────────────────────────────────────────

#[test]
fn parsed_document_json_shape() {
    let doc = assemble(report_with_broken_image(), &AssemblyConfig::default()).unwrap();
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(value["source_identifier"], "quarterly-report.pdf");
    assert_eq!(value["page_count"], 2);
    assert_eq!(value["chunks"][0]["sequence_index"], 0);
    assert_eq!(value["images"][0]["status"], "extracted");
    assert_eq!(value["images"][1]["status"], "degraded");
    assert_eq!(value["images"][1]["note"], "empty image buffer");
    assert!(value["images"][1]["sha256"].is_null());

    let back: ParsedDocument = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);
    assert!(matches!(back.images()[1].status, ImageStatus::Degraded { .. }));
}

// ── Archives ────────────────────────────────────────────────────────

#[test]
fn archive_reports_bad_members_and_keeps_the_rest() {
    let bad = RawExtraction::new("broken.pdf", vec![RawPage::new(0, "x", vec![])])
        .map_err(DocsliceError::from);
    let entries = vec![
        ArchiveEntry::ok("intro.pdf", text_only("intro.pdf", &["Welcome."])),
        ArchiveEntry {
            name: "broken.pdf".into(),
            extraction: bad,
        },
        ArchiveEntry::ok("report.pdf", report_with_broken_image()),
        ArchiveEntry::failed(
            "duplicate.pdf",
            ExtractionError::DuplicateImageIndex { page: 1, index: 0 }.into(),
        ),
    ];

    let report = assemble_archive(entries, &make_config(200, 20)).unwrap();
    let names: Vec<_> = report
        .documents
        .iter()
        .map(|d| d.source_identifier())
        .collect();
    assert_eq!(names, vec!["intro.pdf", "quarterly-report.pdf"]);

    let failed: Vec<_> = report.failures.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["broken.pdf", "duplicate.pdf"]);
    assert_eq!(report.total_images(), 3);
    assert_eq!(report.degraded_images(), 1);
}

#[test]
fn archive_results_match_single_document_assembly() {
    let config = make_config(60, 10);
    let sources: Vec<String> = (0..12).map(|i| format!("{} {i}", filler(150 + i * 7))).collect();

    let entries = sources
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let name = format!("doc{i}.pdf");
            ArchiveEntry::ok(name.clone(), text_only(&name, &[text.as_str()]))
        })
        .collect();
    let report = assemble_archive(entries, &config).unwrap();

    for (i, text) in sources.iter().enumerate() {
        let name = format!("doc{i}.pdf");
        let single = assemble(text_only(&name, &[text.as_str()]), &config).unwrap();
        assert_eq!(report.documents[i], single);
    }
}

#[test]
fn archive_rejects_zero_parallelism() {
    let config = AssemblyConfig {
        max_parallel_documents: 0,
        ..AssemblyConfig::default()
    };
    let err = assemble_archive(
        vec![ArchiveEntry::ok("a.pdf", text_only("a.pdf", &["a"]))],
        &config,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DocsliceError::Config(ConfigError::ZeroParallelism)
    ));
}

#[test]
fn image_hint_rescues_unknown_signature() {
    let raw = RawExtraction::new(
        "scan.pdf",
        vec![RawPage::new(
            1,
            "scanned",
            vec![RawImage::new(1, 0, vec![0, 1, 2, 3]).with_mime_hint("image/png")],
        )],
    )
    .unwrap();
    let doc = assemble(raw, &AssemblyConfig::default()).unwrap();
    assert!(!doc.images()[0].is_degraded());
    assert_eq!(doc.images()[0].stable_filename, "scan_p1_img0.png");
}
