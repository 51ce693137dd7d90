//! Figure positions from a structured PDF converter's JSON output.
//!
//! Raw image extraction gives bytes but no placement. Converters that lay out
//! the page emit figure blocks with a page number and a bounding box; this
//! module reads those blocks and attaches their boxes to the raw images.

use std::collections::BTreeMap;

use serde_json::Value;

use docslice_core::{BoundingBox, RawExtraction};

/// Top-level keys a converter may use for its block list.
const BLOCK_LIST_KEYS: &[&str] = &["blocks", "content", "elements"];
const FIGURE_TYPES: &[&str] = &["figure", "picture"];

/// A figure region reported by the converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureBlock {
    pub page: u32,
    pub bbox: BoundingBox,
}

/// Collect figure blocks in document order. Blocks without a usable bbox are
/// skipped; a missing page defaults to 1.
pub fn parse_figure_blocks(doc: &Value) -> Vec<FigureBlock> {
    let mut figures = Vec::new();
    let blocks = BLOCK_LIST_KEYS
        .iter()
        .find_map(|key| doc.get(key).and_then(Value::as_array));
    if let Some(blocks) = blocks {
        for block in blocks {
            walk(block, None, &mut figures);
        }
    }
    figures
}

fn walk(block: &Value, inherited_page: Option<u32>, out: &mut Vec<FigureBlock>) {
    let page = block_page(block).or(inherited_page);

    if is_figure(block) {
        if let Some(bbox) = block.get("bbox").and_then(parse_bbox) {
            out.push(FigureBlock {
                page: page.unwrap_or(1),
                bbox,
            });
        }
    }

    if let Some(children) = block.get("children").and_then(Value::as_array) {
        for child in children {
            walk(child, page, out);
        }
    }
}

fn is_figure(block: &Value) -> bool {
    ["type", "block_type"].iter().any(|key| {
        block
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|t| FIGURE_TYPES.iter().any(|f| t.eq_ignore_ascii_case(f)))
    })
}

fn block_page(block: &Value) -> Option<u32> {
    block
        .get("page")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .filter(|p| *p >= 1)
}

fn parse_bbox(value: &Value) -> Option<BoundingBox> {
    let coords = value.as_array()?;
    if coords.len() != 4 {
        return None;
    }
    let v: Vec<f64> = coords.iter().filter_map(Value::as_f64).collect();
    if v.len() != 4 {
        return None;
    }
    BoundingBox::new(v[0], v[1], v[2], v[3])
}

/// Give each image without a bbox the box of the matching figure on its page:
/// the k-th such image (by ascending index) takes the k-th figure of that
/// page. Images that already have a bbox keep it and consume no figure.
/// Returns the number of images updated.
pub fn attach_figure_bboxes(extraction: &mut RawExtraction, figures: &[FigureBlock]) -> usize {
    let mut by_page: BTreeMap<u32, Vec<BoundingBox>> = BTreeMap::new();
    for figure in figures {
        by_page.entry(figure.page).or_default().push(figure.bbox);
    }

    let mut assignments = Vec::new();
    for page in extraction.pages() {
        let Some(boxes) = by_page.get(&page.page_number()) else {
            continue;
        };
        let mut missing: Vec<u32> = page
            .images()
            .iter()
            .filter(|img| img.bbox.is_none())
            .map(|img| img.image_index)
            .collect();
        missing.sort_unstable();
        for (index, bbox) in missing.into_iter().zip(boxes.iter()) {
            assignments.push((page.page_number(), index, *bbox));
        }
    }

    let mut attached = 0;
    for (page, index, bbox) in assignments {
        if extraction.set_image_bbox(page, index, bbox) {
            attached += 1;
        }
    }
    if attached > 0 {
        tracing::debug!(
            document = %extraction.source_identifier(),
            attached,
            figures = figures.len(),
            "attached figure bounding boxes"
        );
    }
    attached
}
