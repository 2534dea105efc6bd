//! WASM bindings for the Inkmark PDF markup editor.
//!
//! All editing state lives in Rust inside [`InkmarkSession`]; JavaScript
//! handles rendering (PDF.js), DOM events, and file I/O, passing canvas
//! coordinates plus the page's render scale across this boundary.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { InkmarkSession, suggestedFileName } from './pkg/inkmark_wasm.js';
//!
//! await init();
//!
//! const session = new InkmarkSession(bytes);
//! const scale = canvas.width / pageWidthAtScale1;
//! session.addTextAt(1, clickX, clickY, scale);
//! session.createRedactionFromDrag(1, x0, y0, x1, y1, scale);
//! session.movePage(2, 0);
//! downloadBlob(session.saveEditable(), suggestedFileName(name, false));
//! ```

use wasm_bindgen::prelude::*;

use inkmark_core::{EditorSession, SaveKind};
use inkmark_types::{PixelPoint, PixelRect, RenderScale};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Output name for a save: `report.pdf` becomes `report-editable.pdf` or
/// `report-shared.pdf`.
#[wasm_bindgen(js_name = suggestedFileName)]
pub fn suggested_file_name(original: &str, flattened: bool) -> String {
    let kind = if flattened {
        SaveKind::Flattened
    } else {
        SaveKind::Editable
    };
    inkmark_core::suggested_file_name(original, kind)
}

fn parse_scale(scale: f64) -> Result<RenderScale, JsValue> {
    RenderScale::from_factor(scale)
        .ok_or_else(|| JsValue::from_str(&format!("Invalid render scale: {scale}")))
}

fn to_bytes(data: &[u8]) -> js_sys::Uint8Array {
    let array = js_sys::Uint8Array::new_with_length(data.len() as u32);
    array.copy_from(data);
    array
}

/// Session for marking up a single PDF document
#[wasm_bindgen]
pub struct InkmarkSession {
    inner: EditorSession,
}

#[wasm_bindgen]
impl InkmarkSession {
    /// Open a PDF and restore any annotation state stored in it
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8]) -> Result<InkmarkSession, JsValue> {
        let inner = EditorSession::open(bytes.to_vec())
            .map_err(|e| JsValue::from_str(&format!("Parse error: {}", e)))?;
        Ok(InkmarkSession { inner })
    }

    /// Get page count
    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.inner.page_count() as u32
    }

    /// Current display order as original 1-based page numbers
    #[wasm_bindgen(js_name = pageOrder)]
    pub fn page_order(&self) -> Vec<u32> {
        self.inner.page_order().to_vec()
    }

    /// All text objects, for rendering overlays
    #[wasm_bindgen(js_name = textObjects)]
    pub fn text_objects(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.text_objects())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// All redaction areas, for rendering overlays
    #[wasm_bindgen(js_name = redactionAreas)]
    pub fn redaction_areas(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.redaction_areas())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Create a text box at a clicked canvas position. Returns the index of
    /// the new object.
    #[wasm_bindgen(js_name = addTextAt)]
    pub fn add_text_at(&mut self, page: u32, x: f64, y: f64, scale: f64) -> Result<u32, JsValue> {
        let scale = parse_scale(scale)?;
        self.inner
            .add_text_at(page, PixelPoint { x, y }, scale)
            .map(|index| index as u32)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Create a redaction from a pointer drag in canvas coordinates.
    /// Returns the new index, or undefined for a drag too small to count.
    #[wasm_bindgen(js_name = createRedactionFromDrag)]
    pub fn create_redaction_from_drag(
        &mut self,
        page: u32,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        scale: f64,
    ) -> Result<Option<u32>, JsValue> {
        let scale = parse_scale(scale)?;
        self.inner
            .create_redaction_from_drag(
                page,
                PixelPoint {
                    x: start_x,
                    y: start_y,
                },
                PixelPoint { x: end_x, y: end_y },
                scale,
            )
            .map(|created| created.map(|index| index as u32))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Move or resize a text box (canvas coordinates)
    #[wasm_bindgen(js_name = setTextRect)]
    pub fn set_text_rect(
        &mut self,
        index: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale: f64,
    ) -> bool {
        match RenderScale::from_factor(scale) {
            Some(scale) => self.inner.set_text_rect(
                index as usize,
                PixelRect {
                    x,
                    y,
                    width,
                    height,
                },
                scale,
            ),
            None => false,
        }
    }

    /// Move or resize a redaction (canvas coordinates)
    #[wasm_bindgen(js_name = setRedactionRect)]
    pub fn set_redaction_rect(
        &mut self,
        index: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale: f64,
    ) -> bool {
        match RenderScale::from_factor(scale) {
            Some(scale) => self.inner.set_redaction_rect(
                index as usize,
                PixelRect {
                    x,
                    y,
                    width,
                    height,
                },
                scale,
            ),
            None => false,
        }
    }

    /// Replace a text box's content; direction is re-derived from it
    #[wasm_bindgen(js_name = setTextContent)]
    pub fn set_text_content(&mut self, index: u32, text: &str) -> bool {
        self.inner.set_text_content(index as usize, text)
    }

    #[wasm_bindgen(js_name = setFontSize)]
    pub fn set_font_size(&mut self, index: u32, size: f64) -> bool {
        self.inner.set_font_size(index as usize, size)
    }

    #[wasm_bindgen(js_name = setTextColor)]
    pub fn set_text_color(&mut self, index: u32, color: &str) -> bool {
        self.inner.set_text_color(index as usize, color)
    }

    #[wasm_bindgen(js_name = setAutoSize)]
    pub fn set_auto_size(&mut self, index: u32, auto_size: bool) -> bool {
        self.inner.set_auto_size(index as usize, auto_size)
    }

    #[wasm_bindgen(js_name = deleteText)]
    pub fn delete_text(&mut self, index: u32) -> bool {
        self.inner.delete_text(index as usize).is_some()
    }

    #[wasm_bindgen(js_name = deleteRedaction)]
    pub fn delete_redaction(&mut self, index: u32) -> bool {
        self.inner.delete_redaction(index as usize).is_some()
    }

    /// Move the page at display position `from` to display position `to`
    #[wasm_bindgen(js_name = movePage)]
    pub fn move_page(&mut self, from: u32, to: u32) -> Result<(), JsValue> {
        self.inner
            .move_page(from as usize, to as usize)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Serialize with annotations kept editable (sidecar data in the catalog)
    #[wasm_bindgen(js_name = saveEditable)]
    pub fn save_editable(&self) -> Result<js_sys::Uint8Array, JsValue> {
        self.inner
            .save_editable()
            .map(|bytes| to_bytes(&bytes))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Serialize with annotations burned in and sidecar data removed
    #[wasm_bindgen(js_name = saveFlattened)]
    pub fn save_flattened(&self) -> Result<js_sys::Uint8Array, JsValue> {
        self.inner
            .save_flattened()
            .map(|bytes| to_bytes(&bytes))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
