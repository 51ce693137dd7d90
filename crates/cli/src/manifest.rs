//! Extraction manifests: a JSON description of one extracted document whose
//! page texts and image files live next to it on disk.
//!
//! ```json
//! {
//!   "source": "report.pdf",
//!   "pages": [
//!     {"page_number": 1, "text_file": "page-1.txt",
//!      "images": [{"image_index": 0, "file": "p1-0.png", "bbox": [0, 0, 100, 80]}]}
//!   ],
//!   "figures": "report.converter.json"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use docslice_core::{BoundingBox, DocsliceError, RawExtraction, RawImage, RawPage};
use docslice_ingest::{attach_figure_bboxes, parse_figure_blocks};

#[derive(Debug, Deserialize)]
struct Manifest {
    source: Option<String>,
    #[serde(default)]
    pages: Vec<PageEntry>,
    /// Structured converter output carrying figure bounding boxes.
    figures: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    page_number: u32,
    text: Option<String>,
    text_file: Option<PathBuf>,
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    image_index: u32,
    file: Option<PathBuf>,
    mime_hint: Option<String>,
    bbox: Option<BoundingBox>,
}

/// A manifest resolved into an extraction, plus where each image came from
/// so that the bytes can be copied to the output without holding them.
#[derive(Debug)]
pub struct LoadedManifest {
    pub extraction: RawExtraction,
    pub image_files: BTreeMap<(u32, u32), PathBuf>,
}

/// Read a manifest. Paths inside it are relative to the manifest's directory.
///
/// Unreadable image files become empty buffers, which the correlator turns
/// into degraded artifacts. A missing text file, a malformed manifest, or a
/// page layout that breaks the extraction invariants fails the document.
pub fn load(path: &Path) -> Result<LoadedManifest, DocsliceError> {
    let body = fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&body)?;
    let base = path.parent().unwrap_or(Path::new("."));

    let source = manifest.source.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    });

    let mut image_files = BTreeMap::new();
    let mut pages = Vec::with_capacity(manifest.pages.len());
    for page in manifest.pages {
        let text = match (page.text, page.text_file) {
            (Some(text), _) => text,
            (None, Some(file)) => fs::read_to_string(base.join(&file)).map_err(|e| {
                DocsliceError::Other(format!(
                    "page {}: cannot read {}: {e}",
                    page.page_number,
                    file.display()
                ))
            })?,
            (None, None) => String::new(),
        };

        let mut images = Vec::with_capacity(page.images.len());
        for entry in page.images {
            let bytes = match &entry.file {
                Some(file) => {
                    let full = base.join(file);
                    let bytes = read_image(&full, page.page_number, entry.image_index);
                    image_files.insert((page.page_number, entry.image_index), full);
                    bytes
                }
                None => Vec::new(),
            };
            let mut image = RawImage::new(page.page_number, entry.image_index, bytes);
            if let Some(hint) = entry.mime_hint {
                image = image.with_mime_hint(hint);
            }
            if let Some(bbox) = entry.bbox {
                image = image.with_bbox(bbox);
            }
            images.push(image);
        }

        pages.push(RawPage::new(page.page_number, text, images));
    }

    let mut extraction = RawExtraction::new(source, pages)?;
    if let Some(figures) = manifest.figures {
        attach_figures(&mut extraction, &base.join(figures));
    }

    Ok(LoadedManifest {
        extraction,
        image_files,
    })
}

fn read_image(path: &Path, page: u32, index: u32) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                page,
                index,
                error = %e,
                "cannot read image file, continuing with an empty buffer"
            );
            Vec::new()
        }
    }
}

fn attach_figures(extraction: &mut RawExtraction, path: &Path) {
    let parsed = fs::read_to_string(path)
        .map_err(DocsliceError::from)
        .and_then(|body| Ok(serde_json::from_str::<serde_json::Value>(&body)?));
    match parsed {
        Ok(doc) => {
            let figures = parse_figure_blocks(&doc);
            attach_figure_bboxes(extraction, &figures);
        }
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "skipping figure positions"
        ),
    }
}
