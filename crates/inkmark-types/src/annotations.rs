//! Annotation entities persisted into the PDF catalog.
//!
//! Geometry is stored in PDF page-space units at scale 1.0 with `y` measured
//! from the page's *top* edge (matching on-screen interaction, not the PDF
//! format's bottom-left origin). Content-stream drawing flips the axis via
//! [`crate::coords`].
//!
//! Serde field names are camelCase because the serialized form is the wire
//! format read back by every published version of the editor.

use serde::{Deserialize, Serialize};

use crate::coords::PdfRect;

/// Minimum pointer-drag extent, in screen pixels, for a redaction to be
/// created. Anything smaller is treated as an accidental click.
pub const MIN_DRAG_PX: f64 = 5.0;

/// Returns true if the string contains at least one code point in the
/// Hebrew or Arabic Unicode blocks.
pub fn has_rtl(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\u{0590}'..='\u{05FF}' | '\u{0600}'..='\u{06FF}'))
}

/// Text direction of a text box, derived from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// Re-derive direction from text content. Must be called on every edit;
    /// direction is not cached beyond the field the caller sets.
    pub fn detect(text: &str) -> Self {
        if has_rtl(text) {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

fn default_font_size() -> f64 {
    12.0
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_auto_size() -> bool {
    true
}

/// A positioned, styled, editable text overlay.
///
/// Styling fields carry serde defaults so documents written by older editor
/// versions (which sometimes omitted them) still load; identity and geometry
/// fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextObject {
    /// Opaque unique identifier, stable for the object's lifetime.
    pub id: String,
    /// 1-based index into the original, unreordered page sequence.
    pub original_page_num: u32,
    #[serde(default)]
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub direction: Direction,
    /// True while dimensions track content measurement; false once the user
    /// has manually resized.
    #[serde(default = "default_auto_size")]
    pub auto_size: bool,
}

impl TextObject {
    /// A freshly tapped-in text box with the editor defaults.
    pub fn new(original_page_num: u32, rect: PdfRect) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_page_num,
            text: "New Text".to_string(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            font_size: 12.0,
            color: "#000000".to_string(),
            direction: Direction::Ltr,
            auto_size: true,
        }
    }

    pub fn rect(&self) -> PdfRect {
        PdfRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_rect(&mut self, rect: PdfRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Replace the text content and re-derive direction.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.direction = Direction::detect(&self.text);
    }
}

/// A rectangle to be burned into the page as opaque black on flatten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionArea {
    pub original_page_num: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RedactionArea {
    pub fn new(original_page_num: u32, rect: PdfRect) -> Self {
        Self {
            original_page_num,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    pub fn rect(&self) -> PdfRect {
        PdfRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_rect(&mut self, rect: PdfRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}
