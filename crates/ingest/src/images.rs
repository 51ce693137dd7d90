//! Image correlation: turn raw extracted images into named, typed artifacts.
//!
//! Names are a pure function of `(document, page, index)` so re-processing the
//! same document overwrites the same objects instead of piling up copies.
//! An image that cannot be identified is kept in the manifest as degraded
//! instead of failing the whole document.

use sha2::{Digest, Sha256};

use docslice_core::{ImageArtifact, ImageStatus, RawImage};

/// Known raster formats: magic prefix, MIME type, file extension.
const SIGNATURES: &[(&[u8], &str, &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png", "png"),
    (b"\xff\xd8\xff", "image/jpeg", "jpg"),
    (b"GIF87a", "image/gif", "gif"),
    (b"GIF89a", "image/gif", "gif"),
    (b"BM", "image/bmp", "bmp"),
    (b"II*\x00", "image/tiff", "tiff"),
    (b"MM\x00*", "image/tiff", "tiff"),
    (b"\x00\x00\x00\x0cjP  \r\n\x87\n", "image/jp2", "jp2"),
];

const OCTET_STREAM: &str = "application/octet-stream";

/// Detected or hinted format of an image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Format {
    mime: String,
    ext: String,
}

fn sniff(bytes: &[u8]) -> Option<Format> {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(Format {
            mime: "image/webp".into(),
            ext: "webp".into(),
        });
    }
    SIGNATURES
        .iter()
        .find(|(magic, _, _)| bytes.starts_with(magic))
        .map(|(_, mime, ext)| Format {
            mime: mime.to_string(),
            ext: ext.to_string(),
        })
}

/// Interpret an extractor-supplied MIME hint. Only `image/*` hints count.
fn from_hint(hint: Option<&str>) -> Option<Format> {
    let mime = hint?.trim().to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/")?;
    let ext = match subtype {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        "x-ms-bmp" => "bmp",
        other => other,
    };
    let ext: String = ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if ext.is_empty() {
        return None;
    }
    Some(Format { mime, ext })
}

/// File-name-safe form of a document identifier: its file stem with anything
/// outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn document_slug(document_id: &str) -> String {
    let name = document_id
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(document_id);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let slug: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug
    }
}

/// Deterministic artifact name for one image of a document.
pub fn stable_filename(document_id: &str, page: u32, index: u32, ext: &str) -> String {
    format!("{}_p{}_img{}.{}", document_slug(document_id), page, index, ext)
}

/// Correlate one image. Never fails: problems become a degraded artifact.
pub fn correlate_one(image: &RawImage, document_id: &str) -> ImageArtifact {
    let hinted = from_hint(image.mime_hint.as_deref());

    let outcome = if image.bytes.is_empty() {
        Err("empty image buffer".to_string())
    } else {
        match (sniff(&image.bytes), hinted.clone()) {
            (Some(found), hint) => {
                if let Some(hint) = hint.filter(|h| h.mime != found.mime) {
                    tracing::debug!(
                        page = image.page_number,
                        index = image.image_index,
                        hinted = %hint.mime,
                        detected = %found.mime,
                        "mime hint disagrees with image signature, using signature"
                    );
                }
                Ok(found)
            }
            (None, Some(hint)) => Ok(hint),
            (None, None) => Err("unrecognized image format".to_string()),
        }
    };

    match outcome {
        Ok(format) => {
            let digest = Sha256::digest(&image.bytes);
            ImageArtifact {
                page: image.page_number,
                index: image.image_index,
                stable_filename: stable_filename(
                    document_id,
                    image.page_number,
                    image.image_index,
                    &format.ext,
                ),
                bbox: image.bbox,
                byte_length: image.bytes.len(),
                mime_type: format.mime,
                sha256: Some(format!("{digest:x}")),
                status: ImageStatus::Extracted,
            }
        }
        Err(note) => {
            tracing::warn!(
                document = %document_id,
                page = image.page_number,
                index = image.image_index,
                %note,
                "degraded image"
            );
            let format = hinted.unwrap_or(Format {
                mime: OCTET_STREAM.into(),
                ext: "bin".into(),
            });
            ImageArtifact {
                page: image.page_number,
                index: image.image_index,
                stable_filename: stable_filename(
                    document_id,
                    image.page_number,
                    image.image_index,
                    &format.ext,
                ),
                bbox: image.bbox,
                byte_length: 0,
                mime_type: format.mime,
                sha256: None,
                status: ImageStatus::Degraded { note },
            }
        }
    }
}

/// Correlate every image of a document, preserving input order.
pub fn correlate<'a, I>(raw_images: I, document_id: &str) -> Vec<ImageArtifact>
where
    I: IntoIterator<Item = &'a RawImage>,
{
    raw_images
        .into_iter()
        .map(|image| correlate_one(image, document_id))
        .collect()
}
