//! Burning annotations into page content streams.
//!
//! Flattened output draws every text object and redaction area directly
//! into the content stream of its (possibly reordered) page, so any viewer
//! shows them without knowing about the editor's sidecar data.

use std::collections::{BTreeMap, HashSet};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::warn;

use inkmark_types::{
    flip_y_for_baseline, flip_y_for_box, hex_to_rgb, Direction, RedactionArea, TextObject,
};

use crate::document::{page_size, structure_err};
use crate::error::EditorError;

/// Resource name under which the flatten font is registered on each page.
const FONT_RESOURCE: &str = "InkmarkF1";

/// Rough advance width for right-alignment of RTL text, in em.
const AVG_GLYPH_WIDTH_EM: f64 = 0.5;

/// Line spacing as a multiple of the font size.
const LINE_LEADING: f64 = 1.2;

/// Draw all annotations into `doc`. Pages are resolved through
/// `page_order`: an object's `original_page_num` is looked up in the order
/// list and the resulting index selects the page in the document's original
/// sequence. Objects that cannot be drawn are skipped with a warning.
pub fn flatten_into(
    doc: &mut Document,
    page_order: &[u32],
    text_objects: &[TextObject],
    redaction_areas: &[RedactionArea],
) -> Result<(), EditorError> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let mut ops_by_page: BTreeMap<usize, Vec<Operation>> = BTreeMap::new();
    let mut pages_needing_font: HashSet<usize> = HashSet::new();

    for text in text_objects {
        let Some(index) = resolve_page_index(page_order, pages.len(), text.original_page_num)
        else {
            warn!(
                id = %text.id,
                page = text.original_page_num,
                "skipping text object on missing page"
            );
            continue;
        };
        let (_, page_height) = page_size(doc, pages[index])?;
        match text_operations(text, page_height) {
            Some(ops) => {
                pages_needing_font.insert(index);
                ops_by_page.entry(index).or_default().extend(ops);
            }
            None => {
                warn!(id = %text.id, "skipping text object with invalid fields");
            }
        }
    }

    for area in redaction_areas {
        let Some(index) = resolve_page_index(page_order, pages.len(), area.original_page_num)
        else {
            warn!(
                page = area.original_page_num,
                "skipping redaction on missing page"
            );
            continue;
        };
        let (_, page_height) = page_size(doc, pages[index])?;
        match redaction_operations(area, page_height) {
            Some(ops) => ops_by_page.entry(index).or_default().extend(ops),
            None => {
                warn!(
                    page = area.original_page_num,
                    "skipping redaction with invalid geometry"
                );
            }
        }
    }

    for index in pages_needing_font {
        add_font_to_page(doc, pages[index])?;
    }
    for (index, ops) in ops_by_page {
        append_page_operations(doc, pages[index], ops)?;
    }
    Ok(())
}

/// Map an original page number through the reorder list to a document page
/// index. Returns `None` for annotations pointing at pages that no longer
/// exist.
fn resolve_page_index(page_order: &[u32], page_count: usize, original_page_num: u32) -> Option<usize> {
    let index = page_order.iter().position(|&p| p == original_page_num)?;
    (index < page_count).then_some(index)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Content operations drawing one text object, or `None` if its numeric
/// fields or color cannot be used.
fn text_operations(text: &TextObject, page_height: f64) -> Option<Vec<Operation>> {
    if ![text.x, text.y, text.font_size, text.width]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }
    let rgb = hex_to_rgb(&text.color)?;
    let (r, g, b) = rgb.to_normalized();
    let baseline_y = flip_y_for_baseline(page_height, text.y, text.font_size);
    let leading = text.font_size * LINE_LEADING;

    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                real(text.font_size),
            ],
        ),
        Operation::new(
            "rg",
            vec![real(r as f64), real(g as f64), real(b as f64)],
        ),
    ];

    let mut current_x = f64::NAN;
    let mut current_y = f64::NAN;
    let mut first = true;
    for (line_index, line) in text.text.split('\n').enumerate() {
        let line_x = match text.direction {
            Direction::Rtl => {
                let estimated = line.chars().count() as f64 * text.font_size * AVG_GLYPH_WIDTH_EM;
                (text.x + text.width - estimated).max(text.x)
            }
            Direction::Ltr => text.x,
        };
        let line_y = baseline_y - line_index as f64 * leading;
        if first {
            ops.push(Operation::new("Td", vec![real(line_x), real(line_y)]));
            first = false;
        } else {
            // Td offsets are relative to the previous line origin.
            ops.push(Operation::new(
                "Td",
                vec![real(line_x - current_x), real(line_y - current_y)],
            ));
        }
        current_x = line_x;
        current_y = line_y;
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.as_bytes().to_vec())],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    Some(ops)
}

/// Content operations drawing one black redaction rectangle.
fn redaction_operations(area: &RedactionArea, page_height: f64) -> Option<Vec<Operation>> {
    if ![area.x, area.y, area.width, area.height]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }
    let y = flip_y_for_box(page_height, area.y, area.height);
    Some(vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new(
            "re",
            vec![real(area.x), real(y), real(area.width), real(area.height)],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ])
}

/// Register a standard Helvetica font on the page under [`FONT_RESOURCE`].
fn add_font_to_page(doc: &mut Document, page_id: ObjectId) -> Result<(), EditorError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    // Resources may live inline on the page or behind a reference.
    let resources_ref = {
        let page = doc.get_dictionary(page_id).map_err(structure_err)?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    if let Some(resources_id) = resources_ref {
        let resources = doc
            .get_object_mut(resources_id)
            .and_then(Object::as_dict_mut)
            .map_err(structure_err)?;
        set_font_entry(resources, font_id);
    } else {
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(structure_err)?;
        match page.get_mut(b"Resources").and_then(Object::as_dict_mut) {
            Ok(resources) => set_font_entry(resources, font_id),
            Err(_) => {
                let mut resources = Dictionary::new();
                set_font_entry(&mut resources, font_id);
                page.set("Resources", Object::Dictionary(resources));
            }
        }
    }
    Ok(())
}

fn set_font_entry(resources: &mut Dictionary, font_id: ObjectId) {
    match resources.get_mut(b"Font").and_then(Object::as_dict_mut) {
        Ok(fonts) => fonts.set(FONT_RESOURCE, Object::Reference(font_id)),
        Err(_) => {
            let mut fonts = Dictionary::new();
            fonts.set(FONT_RESOURCE, Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }
    }
}

/// Append `ops` after the page's existing content, with the original
/// content bracketed in q/Q so leftover graphics state cannot shift our
/// coordinates.
fn append_page_operations(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<Operation>,
) -> Result<(), EditorError> {
    let addition = Content { operations: ops }
        .encode()
        .map_err(structure_err)?;

    let has_contents = doc
        .get_dictionary(page_id)
        .map(|dict| dict.has(b"Contents"))
        .unwrap_or(false);

    if has_contents {
        let existing = doc.get_page_content(page_id).map_err(structure_err)?;
        let mut combined = Vec::with_capacity(existing.len() + addition.len() + 8);
        combined.extend_from_slice(b"q\n");
        combined.extend_from_slice(&existing);
        combined.extend_from_slice(b"\nQ\n");
        combined.extend_from_slice(&addition);
        doc.change_page_content(page_id, combined)
            .map_err(structure_err)
    } else {
        let stream_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, addition)));
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(structure_err)?;
        page.set("Contents", Object::Reference(stream_id));
        Ok(())
    }
}
