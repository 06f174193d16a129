//! The canonical transform between PDF page space and viewport space.
//!
//! Page space: the field storage units, y-down from the page's top-left
//! corner. Viewport space: screen pixels at the active zoom. The two
//! are related by a single uniform scalar — no rotation or skew.

use serde::{Deserialize, Serialize};

/// Smallest legal field dimension in page units. Resize gestures floor
/// here so a field can never collapse to zero or negative size.
pub const MIN_FIELD_SIZE: f32 = 20.0;

/// Project a page-space value into viewport pixels.
#[inline]
pub fn to_viewport(v: f32, scale: f32) -> f32 {
    v * scale
}

/// Project a viewport-pixel value back into page space.
#[inline]
pub fn to_page(v: f32, scale: f32) -> f32 {
    v / scale
}

/// The visible canvas, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Clamp a field's top-left page-space position so the field stays
    /// on the canvas at the given scale. The legal maximum is computed
    /// in viewport space from the field's projected size, then mapped
    /// back to page space.
    pub fn clamp_position(
        &self,
        x: f32,
        y: f32,
        field_width: f32,
        field_height: f32,
        scale: f32,
    ) -> (f32, f32) {
        let max_x = to_page((self.width - to_viewport(field_width, scale)).max(0.0), scale);
        let max_y = to_page(
            (self.height - to_viewport(field_height, scale)).max(0.0),
            scale,
        );
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }

    /// Page-space position that centers a field of the given size in
    /// the viewport. Used when a field is created without an explicit
    /// position.
    pub fn centered_position(&self, field_width: f32, field_height: f32, scale: f32) -> (f32, f32) {
        let x = to_page(self.width / 2.0, scale) - field_width / 2.0;
        let y = to_page(self.height / 2.0, scale) - field_height / 2.0;
        (x.max(0.0), y.max(0.0))
    }
}
