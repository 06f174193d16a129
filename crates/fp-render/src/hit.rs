//! Hit testing: viewport point → field lookup.
//!
//! Walks the page's fields front-to-back (reverse insertion order) so
//! overlapping fields resolve to the topmost one. The selected field
//! additionally exposes a resize-handle zone at its bottom-right
//! corner, which wins over plain body hits.

use fp_core::geom::to_page;
use fp_core::model::Field;
use fp_core::store::FieldStore;
use fp_core::FieldId;

/// Half-size of the square resize-handle hit zone, in viewport pixels.
/// Kept in pixels (not page units) so the handle stays tappable at any
/// zoom level.
pub const RESIZE_HANDLE_PX: f32 = 12.0;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The body of a field.
    Field(FieldId),
    /// The bottom-right resize handle of the selected field.
    ResizeHandle(FieldId),
    /// Empty canvas.
    Canvas,
}

/// Resolve a viewport-space point against the fields on `page`.
pub fn hit_test(store: &FieldStore, page: u32, scale: f32, px: f32, py: f32) -> HitTarget {
    // Handle first: it extends slightly outside the field frame and
    // must stay grabbable even when another field overlaps the corner.
    if let Some(selected) = store.selected() {
        if let Some(field) = store.get(selected) {
            if field.page == page && hits_resize_handle(field, scale, px, py) {
                return HitTarget::ResizeHandle(selected);
            }
        }
    }

    let fields: Vec<&Field> = store.fields_for_page(page).collect();
    for field in fields.iter().rev() {
        if field.contains(to_page(px, scale), to_page(py, scale)) {
            return HitTarget::Field(field.id);
        }
    }
    HitTarget::Canvas
}

fn hits_resize_handle(field: &Field, scale: f32, px: f32, py: f32) -> bool {
    let corner_x = (field.x + field.width) * scale;
    let corner_y = (field.y + field.height) * scale;
    (px - corner_x).abs() <= RESIZE_HANDLE_PX && (py - corner_y).abs() <= RESIZE_HANDLE_PX
}
