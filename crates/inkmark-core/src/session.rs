//! Editing session: in-memory annotation state over an opened PDF, plus
//! the two save paths (editable sidecar vs. flattened).
//!
//! The session never mutates the bytes it was opened with. Every save
//! re-parses the original bytes into a fresh document, applies the current
//! state, and serializes, so repeated saves cannot accumulate artifacts.

use lopdf::Document;
use tracing::debug;

use inkmark_types::{
    PixelPoint, PixelRect, RedactionArea, RenderScale, TextObject, MIN_DRAG_PX,
};

use crate::codec::{self, CustomData};
use crate::document;
use crate::error::EditorError;
use crate::flatten;

/// Which save path produced (or will produce) an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// Annotations stored as sidecar data; reopening restores editing.
    Editable,
    /// Annotations burned into page content; sidecar data removed.
    Flattened,
}

/// Default on-screen size of a freshly created text box, in pixels.
const NEW_TEXT_WIDTH_PX: f64 = 100.0;
const NEW_TEXT_HEIGHT_PX: f64 = 20.0;

/// Output name for a save, derived from the source file name.
pub fn suggested_file_name(original: &str, kind: SaveKind) -> String {
    // Compare the trailing bytes: a match is all ASCII, so the cut is a
    // valid char boundary even for multi-byte stems.
    let bytes = original.as_bytes();
    let stem = if bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf") {
        &original[..original.len() - 4]
    } else {
        original
    };
    let suffix = match kind {
        SaveKind::Editable => "editable",
        SaveKind::Flattened => "shared",
    };
    format!("{stem}-{suffix}.pdf")
}

/// One open document plus its working annotation state.
pub struct EditorSession {
    original_bytes: Vec<u8>,
    page_count: usize,
    /// Current display order as original 1-based page numbers.
    page_order: Vec<u32>,
    text_objects: Vec<TextObject>,
    redaction_areas: Vec<RedactionArea>,
}

impl EditorSession {
    /// Parse `bytes` and restore any annotation state stored in the
    /// document. Undecodable or absent sidecar data yields an empty
    /// session over the same pages.
    pub fn open(bytes: Vec<u8>) -> Result<Self, EditorError> {
        let doc = Document::load_mem(&bytes).map_err(|e| EditorError::Parse(e.to_string()))?;
        let page_count = doc.get_pages().len();

        let restored = codec::decode(document::custom_data_value(&doc)).unwrap_or_default();
        debug!(
            pages = page_count,
            texts = restored.text_objects.len(),
            redactions = restored.redaction_areas.len(),
            "opened document"
        );

        Ok(Self {
            original_bytes: bytes,
            page_count,
            page_order: (1..=page_count as u32).collect(),
            text_objects: restored.text_objects,
            redaction_areas: restored.redaction_areas,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn page_order(&self) -> &[u32] {
        &self.page_order
    }

    pub fn text_objects(&self) -> &[TextObject] {
        &self.text_objects
    }

    pub fn redaction_areas(&self) -> &[RedactionArea] {
        &self.redaction_areas
    }

    fn check_page(&self, original_page_num: u32) -> Result<(), EditorError> {
        if original_page_num == 0 || original_page_num as usize > self.page_count {
            return Err(EditorError::PageOutOfRange(original_page_num as usize));
        }
        Ok(())
    }

    /// Create a text box with the editor defaults at a clicked canvas
    /// position. Returns the index of the new object.
    pub fn add_text_at(
        &mut self,
        original_page_num: u32,
        at: PixelPoint,
        scale: RenderScale,
    ) -> Result<usize, EditorError> {
        self.check_page(original_page_num)?;
        let rect = scale.rect_to_pdf(PixelRect {
            x: at.x,
            y: at.y,
            width: NEW_TEXT_WIDTH_PX,
            height: NEW_TEXT_HEIGHT_PX,
        });
        self.text_objects
            .push(TextObject::new(original_page_num, rect));
        Ok(self.text_objects.len() - 1)
    }

    /// Create a redaction from a pointer drag. Drags smaller than
    /// [`MIN_DRAG_PX`] in either dimension are treated as accidental and
    /// produce nothing.
    pub fn create_redaction_from_drag(
        &mut self,
        original_page_num: u32,
        start: PixelPoint,
        end: PixelPoint,
        scale: RenderScale,
    ) -> Result<Option<usize>, EditorError> {
        self.check_page(original_page_num)?;
        let drag = PixelRect::from_drag(start, end);
        if drag.width <= MIN_DRAG_PX || drag.height <= MIN_DRAG_PX {
            debug!(
                width = drag.width,
                height = drag.height,
                "drag below threshold, no redaction created"
            );
            return Ok(None);
        }
        self.redaction_areas
            .push(RedactionArea::new(original_page_num, scale.rect_to_pdf(drag)));
        Ok(Some(self.redaction_areas.len() - 1))
    }

    /// Move or resize a text box. Returns false for a stale index.
    pub fn set_text_rect(&mut self, index: usize, rect: PixelRect, scale: RenderScale) -> bool {
        match self.text_objects.get_mut(index) {
            Some(text) => {
                text.set_rect(scale.rect_to_pdf(rect));
                true
            }
            None => false,
        }
    }

    pub fn set_redaction_rect(&mut self, index: usize, rect: PixelRect, scale: RenderScale) -> bool {
        match self.redaction_areas.get_mut(index) {
            Some(area) => {
                area.set_rect(scale.rect_to_pdf(rect));
                true
            }
            None => false,
        }
    }

    /// Replace a text box's content; direction is re-derived from it.
    pub fn set_text_content(&mut self, index: usize, text: &str) -> bool {
        match self.text_objects.get_mut(index) {
            Some(obj) => {
                obj.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Set font size; rejects non-finite or non-positive values.
    pub fn set_font_size(&mut self, index: usize, size: f64) -> bool {
        if !size.is_finite() || size <= 0.0 {
            return false;
        }
        match self.text_objects.get_mut(index) {
            Some(obj) => {
                obj.font_size = size;
                true
            }
            None => false,
        }
    }

    /// Set text color; rejects strings that do not parse as hex colors.
    pub fn set_text_color(&mut self, index: usize, color: &str) -> bool {
        if inkmark_types::hex_to_rgb(color).is_none() {
            return false;
        }
        match self.text_objects.get_mut(index) {
            Some(obj) => {
                obj.color = color.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_auto_size(&mut self, index: usize, auto_size: bool) -> bool {
        match self.text_objects.get_mut(index) {
            Some(obj) => {
                obj.auto_size = auto_size;
                true
            }
            None => false,
        }
    }

    pub fn delete_text(&mut self, index: usize) -> Option<TextObject> {
        (index < self.text_objects.len()).then(|| self.text_objects.remove(index))
    }

    pub fn delete_redaction(&mut self, index: usize) -> Option<RedactionArea> {
        (index < self.redaction_areas.len()).then(|| self.redaction_areas.remove(index))
    }

    /// Move the page at display position `from` to display position `to`.
    /// Annotations keep their original page numbers and follow the page.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        if from >= self.page_order.len() {
            return Err(EditorError::PageOutOfRange(from));
        }
        if to >= self.page_order.len() {
            return Err(EditorError::PageOutOfRange(to));
        }
        let page = self.page_order.remove(from);
        self.page_order.insert(to, page);
        Ok(())
    }

    /// Serialize with the annotation state stored as sidecar data in the
    /// document catalog.
    pub fn save_editable(&self) -> Result<Vec<u8>, EditorError> {
        let mut doc = self.fresh_document()?;
        let data = CustomData {
            text_objects: self.text_objects.clone(),
            redaction_areas: self.redaction_areas.clone(),
        };
        document::set_custom_data(&mut doc, codec::encode(&data)?)?;
        Self::serialize(doc)
    }

    /// Serialize with annotations burned into page content and the sidecar
    /// data removed, so the output carries no editable state.
    pub fn save_flattened(&self) -> Result<Vec<u8>, EditorError> {
        let mut doc = self.fresh_document()?;
        document::remove_custom_data(&mut doc)?;
        flatten::flatten_into(
            &mut doc,
            &self.page_order,
            &self.text_objects,
            &self.redaction_areas,
        )?;
        Self::serialize(doc)
    }

    fn fresh_document(&self) -> Result<Document, EditorError> {
        Document::load_mem(&self.original_bytes).map_err(|e| EditorError::Parse(e.to_string()))
    }

    fn serialize(mut doc: Document) -> Result<Vec<u8>, EditorError> {
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| EditorError::Save(e.to_string()))?;
        Ok(out)
    }
}
