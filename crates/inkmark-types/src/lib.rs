//! Shared data model for the Inkmark PDF markup editor.
//!
//! This crate holds the annotation entities, the pixel-space/PDF-space
//! coordinate transform, and small color/script utilities. It is pure data:
//! no PDF parsing and no I/O, so it can be depended on from both the core
//! engine and the browser boundary.

pub mod annotations;
pub mod color;
pub mod coords;

pub use annotations::{has_rtl, Direction, RedactionArea, TextObject, MIN_DRAG_PX};
pub use color::{hex_to_rgb, Rgb};
pub use coords::{
    flip_y_for_baseline, flip_y_for_box, PdfPoint, PdfRect, PixelPoint, PixelRect, RenderScale,
};
