//! On-disk layout of assembled documents:
//!
//! ```text
//! <out>/<slug>/parsed.json
//! <out>/<slug>/images.json
//! <out>/<slug>/<stable_filename>   (one per non-degraded image)
//! ```
//!
//! Two documents of one run never share a folder: when a slug is already
//! taken, later documents get `<slug>-2`, `<slug>-3`, and so on.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use docslice_core::ParsedDocument;
use docslice_ingest::images::document_slug;

/// What was written for one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub dir: PathBuf,
    pub images_written: usize,
    pub images_skipped: usize,
}

/// Output folder name for each document, in order. Names are unique within
/// the batch and depend only on the source identifiers and their order.
pub fn document_dirs(docs: &[ParsedDocument]) -> Vec<String> {
    let mut taken = HashSet::new();
    docs.iter()
        .map(|doc| {
            let slug = document_slug(doc.source_identifier());
            let mut name = slug.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{slug}-{n}");
            }
            if n > 1 {
                tracing::warn!(
                    document = %doc.source_identifier(),
                    dir = %name,
                    "output folder name already used in this run, writing to a suffixed folder"
                );
            }
            name
        })
        .collect()
}

/// Write one document into `dir`. Image bytes are copied from
/// `image_files`, keyed by `(page, index)`; degraded artifacts and images
/// whose source file has gone missing are skipped.
pub fn write_document(
    dir: &Path,
    doc: &ParsedDocument,
    image_files: &BTreeMap<(u32, u32), PathBuf>,
) -> Result<WriteSummary> {
    let dir = dir.to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    write_json(&dir.join("parsed.json"), doc)?;
    write_json(&dir.join("images.json"), doc.images())?;

    let mut summary = WriteSummary {
        dir: dir.clone(),
        ..WriteSummary::default()
    };
    for artifact in doc.images() {
        if artifact.is_degraded() {
            summary.images_skipped += 1;
            continue;
        }
        let Some(src) = image_files.get(&(artifact.page, artifact.index)) else {
            summary.images_skipped += 1;
            continue;
        };
        let dest = dir.join(&artifact.stable_filename);
        match fs::copy(src, &dest) {
            Ok(_) => summary.images_written += 1,
            Err(e) => {
                tracing::warn!(
                    src = %src.display(),
                    dest = %dest.display(),
                    error = %e,
                    "failed to copy image"
                );
                summary.images_skipped += 1;
            }
        }
    }

    tracing::debug!(
        document = %doc.source_identifier(),
        dir = %summary.dir.display(),
        images_written = summary.images_written,
        images_skipped = summary.images_skipped,
        "wrote document"
    );
    Ok(summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("writing {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))
}
