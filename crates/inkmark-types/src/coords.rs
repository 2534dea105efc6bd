//! Coordinate transformation between screen pixels and PDF page units.
//!
//! Stored geometry lives in PDF page-space units at scale 1.0 with a
//! top-left-origin `y`. The screen overlay works in canvas pixels. The two
//! spaces are kept apart by distinct types; [`RenderScale`] is the only way
//! to cross between them, so a missed conversion fails to compile instead
//! of rendering a mispositioned box.
//!
//! The flip to the PDF format's native bottom-left origin happens only at
//! content-stream drawing time, via [`flip_y_for_box`] and
//! [`flip_y_for_baseline`].

/// A point in canvas pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A point in PDF page units at scale 1.0, top-left-origin `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in PDF page units at scale 1.0, top-left-origin `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Normalize a pointer drag into a rectangle with positive extent.
    pub fn from_drag(start: PixelPoint, end: PixelPoint) -> Self {
        Self {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            width: (start.x - end.x).abs(),
            height: (start.y - end.y).abs(),
        }
    }
}

/// The live render scale of a page: `canvas_width_px / page_width_at_scale_1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScale(f64);

impl RenderScale {
    /// Build from the rendered canvas width and the page width at scale 1.0.
    /// Returns `None` when either dimension is non-finite or non-positive.
    pub fn new(canvas_width_px: f64, page_width_pt: f64) -> Option<Self> {
        if !canvas_width_px.is_finite() || !page_width_pt.is_finite() {
            return None;
        }
        if canvas_width_px <= 0.0 || page_width_pt <= 0.0 {
            return None;
        }
        Some(Self(canvas_width_px / page_width_pt))
    }

    /// Wrap an already-computed scale factor.
    pub fn from_factor(factor: f64) -> Option<Self> {
        if factor.is_finite() && factor > 0.0 {
            Some(Self(factor))
        } else {
            None
        }
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn point_to_pdf(&self, p: PixelPoint) -> PdfPoint {
        PdfPoint {
            x: p.x / self.0,
            y: p.y / self.0,
        }
    }

    pub fn point_to_pixels(&self, p: PdfPoint) -> PixelPoint {
        PixelPoint {
            x: p.x * self.0,
            y: p.y * self.0,
        }
    }

    pub fn rect_to_pdf(&self, r: PixelRect) -> PdfRect {
        PdfRect {
            x: r.x / self.0,
            y: r.y / self.0,
            width: r.width / self.0,
            height: r.height / self.0,
        }
    }

    pub fn rect_to_pixels(&self, r: PdfRect) -> PixelRect {
        PixelRect {
            x: r.x * self.0,
            y: r.y * self.0,
            width: r.width * self.0,
            height: r.height * self.0,
        }
    }

    /// Convert a pixel-space drag delta into PDF units.
    pub fn delta_to_pdf(&self, dx_px: f64, dy_px: f64) -> (f64, f64) {
        (dx_px / self.0, dy_px / self.0)
    }
}

/// Bottom-left-origin `y` for a box whose stored `y` is top-relative.
pub fn flip_y_for_box(page_height: f64, y: f64, height: f64) -> f64 {
    page_height - y - height
}

/// Bottom-left-origin baseline `y` for text whose stored `y` is top-relative.
pub fn flip_y_for_baseline(page_height: f64, y: f64, font_size: f64) -> f64 {
    page_height - y - font_size
}
