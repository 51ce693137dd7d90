//! Value types flowing through the ingestion core: raw extraction input,
//! chunks, image artifacts and the assembled `ParsedDocument`.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

// ── Geometry ────────────────────────────────────────────────────────

/// Rectangle in page coordinate space, serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    /// Returns `None` for non-finite coordinates or an inverted rectangle.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Self> {
        let finite = [x0, y0, x1, y1].iter().all(|v| v.is_finite());
        if !finite || x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Self { x0, y0, x1, y1 })
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = String;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        BoundingBox::new(v[0], v[1], v[2], v[3])
            .ok_or_else(|| format!("invalid bounding box {:?}", v))
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

// ── Raw extraction (input) ──────────────────────────────────────────

/// One embedded raster image as handed over by the extraction collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    /// 1-based page the image was found on.
    pub page_number: u32,
    /// 0-based position of the image within its page.
    pub image_index: u32,
    pub bytes: Vec<u8>,
    pub mime_hint: Option<String>,
    pub bbox: Option<BoundingBox>,
}

impl RawImage {
    pub fn new(page_number: u32, image_index: u32, bytes: Vec<u8>) -> Self {
        Self {
            page_number,
            image_index,
            bytes,
            mime_hint: None,
            bbox: None,
        }
    }

    pub fn with_mime_hint(mut self, mime: impl Into<String>) -> Self {
        self.mime_hint = Some(mime.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// A page of extracted text plus the images found on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    page_number: u32,
    text: String,
    images: Vec<RawImage>,
}

impl RawPage {
    pub fn new(page_number: u32, text: impl Into<String>, images: Vec<RawImage>) -> Self {
        Self {
            page_number,
            text: text.into(),
            images,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[RawImage] {
        &self.images
    }
}

/// Everything the upstream extractor produced for one document.
///
/// Page numbers are 1-based and strictly increasing, and image indices are
/// unique within their page. Both are checked by [`RawExtraction::new`],
/// which also puts each page's images in ascending index order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtraction {
    source_identifier: String,
    pages: Vec<RawPage>,
}

impl RawExtraction {
    pub fn new(
        source_identifier: impl Into<String>,
        mut pages: Vec<RawPage>,
    ) -> Result<Self, ExtractionError> {
        let mut previous: Option<u32> = None;
        for page in &mut pages {
            if page.page_number == 0 {
                return Err(ExtractionError::InvalidPageNumber);
            }
            if let Some(prev) = previous {
                if page.page_number <= prev {
                    return Err(ExtractionError::PageOrder {
                        previous: prev,
                        found: page.page_number,
                    });
                }
            }
            previous = Some(page.page_number);

            let mut seen = std::collections::HashSet::new();
            for image in &page.images {
                if image.page_number != page.page_number {
                    return Err(ExtractionError::ImagePageMismatch {
                        page: page.page_number,
                        image_page: image.page_number,
                        index: image.image_index,
                    });
                }
                if !seen.insert(image.image_index) {
                    return Err(ExtractionError::DuplicateImageIndex {
                        page: page.page_number,
                        index: image.image_index,
                    });
                }
            }
            page.images.sort_by_key(|img| img.image_index);
        }

        Ok(Self {
            source_identifier: source_identifier.into(),
            pages,
        })
    }

    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn pages(&self) -> &[RawPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page texts joined with a blank line so page breaks survive as
    /// paragraph breaks.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// All images, page ascending, then index ascending.
    pub fn images(&self) -> impl Iterator<Item = &RawImage> {
        self.pages.iter().flat_map(|p| p.images.iter())
    }

    /// Set the bounding box of one image. Returns `false` when no image has
    /// that `(page, index)`.
    pub fn set_image_bbox(&mut self, page: u32, index: u32, bbox: BoundingBox) -> bool {
        let image = self
            .pages
            .iter_mut()
            .filter(|p| p.page_number == page)
            .flat_map(|p| p.images.iter_mut())
            .find(|img| img.image_index == index);
        match image {
            Some(img) => {
                img.bbox = Some(bbox);
                true
            }
            None => false,
        }
    }
}

// ── Chunks ──────────────────────────────────────────────────────────

/// A bounded slice of normalized text ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in emission order.
    pub sequence_index: usize,
    pub text: String,
    /// Length of `text` in characters.
    pub char_length: usize,
    /// Byte range of `text` within the normalized document text.
    pub source_range: Option<(usize, usize)>,
    /// Set when a single unsplittable unit is longer than the size limit.
    #[serde(default)]
    pub oversized: bool,
}

// ── Images ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageStatus {
    Extracted,
    /// The image could not be decoded; it is listed but carries no payload.
    Degraded { note: String },
}

/// An image after correlation: named, typed, positioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub page: u32,
    pub index: u32,
    /// Deterministic in `(document, page, index)`, unique within the document.
    pub stable_filename: String,
    pub bbox: Option<BoundingBox>,
    pub byte_length: usize,
    pub mime_type: String,
    /// Lowercase hex SHA-256 of the image bytes (absent when degraded).
    pub sha256: Option<String>,
    #[serde(flatten)]
    pub status: ImageStatus,
}

impl ImageArtifact {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ImageStatus::Degraded { .. })
    }

    pub fn degradation_note(&self) -> Option<&str> {
        match &self.status {
            ImageStatus::Degraded { note } => Some(note),
            ImageStatus::Extracted => None,
        }
    }
}

// ── Parsed document (output) ────────────────────────────────────────

/// The assembled result for one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    source_identifier: String,
    page_count: usize,
    chunks: Vec<Chunk>,
    images: Vec<ImageArtifact>,
    text_preview: String,
}

impl ParsedDocument {
    pub fn new(
        source_identifier: impl Into<String>,
        page_count: usize,
        chunks: Vec<Chunk>,
        images: Vec<ImageArtifact>,
        text_preview: impl Into<String>,
    ) -> Self {
        Self {
            source_identifier: source_identifier.into(),
            page_count,
            chunks,
            images,
            text_preview: text_preview.into(),
        }
    }

    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn images(&self) -> &[ImageArtifact] {
        &self.images
    }

    pub fn text_preview(&self) -> &str {
        &self.text_preview
    }

    pub fn degraded_images(&self) -> usize {
        self.images.iter().filter(|i| i.is_degraded()).count()
    }
}
