//! Field → view projection.
//!
//! Walks the fields on the active page and emits a display description
//! for each: the viewport-space frame plus per-kind content. This is a
//! pure function of field, scale, and cursor flags — the actual pixels
//! are drawn by the embedding UI.

use fp_core::geom::to_viewport;
use fp_core::model::{Color, Field, FieldContent, FieldKind};
use fp_core::store::FieldStore;

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// What to show inside a field's frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayContent {
    /// Committed text (or the kind's placeholder when `placeholder`).
    Label { text: String, placeholder: bool },
    /// An editable input pre-seeded with the committed content.
    TextInput { seed: String },
    Checkbox { checked: bool },
    /// Signature image to decode and show.
    Image { data_uri: String },
    /// Empty signature slot: "tap to sign".
    SignaturePrompt,
}

/// The visual description of one field at the current scale.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub id: fp_core::FieldId,
    pub kind: FieldKind,
    pub frame: ViewRect,
    pub content: DisplayContent,
    /// Projected font size in pixels (textual kinds).
    pub font_px: f32,
    pub color: Color,
    pub selected: bool,
    pub editing: bool,
    /// Selected, non-editing fields show the bottom-right resize handle.
    pub resizable: bool,
}

/// Project one field.
pub fn project_field(field: &Field, scale: f32, selected: bool, editing: bool) -> FieldView {
    let frame = ViewRect {
        x: to_viewport(field.x, scale),
        y: to_viewport(field.y, scale),
        width: to_viewport(field.width, scale),
        height: to_viewport(field.height, scale),
    };

    let content = match (field.kind, &field.content) {
        (FieldKind::Checkbox, content) => DisplayContent::Checkbox {
            checked: content.is_checked(),
        },
        (FieldKind::Signature, FieldContent::ImageData(data)) if !data.is_empty() => {
            DisplayContent::Image {
                data_uri: data.clone(),
            }
        }
        (FieldKind::Signature, _) => DisplayContent::SignaturePrompt,
        (kind, content) => {
            let committed = content.as_text().unwrap_or("");
            if editing {
                DisplayContent::TextInput {
                    seed: committed.to_string(),
                }
            } else if content.is_blank() {
                DisplayContent::Label {
                    text: kind.placeholder().to_string(),
                    placeholder: true,
                }
            } else {
                DisplayContent::Label {
                    text: committed.to_string(),
                    placeholder: false,
                }
            }
        }
    };

    FieldView {
        id: field.id,
        kind: field.kind,
        frame,
        content,
        font_px: to_viewport(field.font_size, scale),
        color: field.color,
        selected,
        editing,
        resizable: selected && !editing,
    }
}

/// Project every field on `page`, back to front. The store's insertion
/// order is the z-order, so the last view paints on top.
pub fn project_page(store: &FieldStore, page: u32, scale: f32) -> Vec<FieldView> {
    store
        .fields_for_page(page)
        .map(|f| {
            let selected = store.selected() == Some(f.id);
            let editing = store.editing() == Some(f.id);
            project_field(f, scale, selected, editing)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::geom::Viewport;
    use fp_core::store::CreateOutcome;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn make(kind: FieldKind, store: &mut FieldStore) -> fp_core::FieldId {
        match store.create(kind, 1, Some((10.0, 20.0)), VIEWPORT, 1.0, None) {
            CreateOutcome::Created(id) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn frame_scales_uniformly() {
        let mut store = FieldStore::new();
        let id = make(FieldKind::Text, &mut store);
        let views = project_page(&store, 1, 2.0);
        assert_eq!(views.len(), 1);
        let v = &views[0];
        assert_eq!(v.id, id);
        assert_eq!(v.frame.x, 20.0);
        assert_eq!(v.frame.y, 40.0);
        assert_eq!(v.frame.width, 300.0);
        assert_eq!(v.font_px, 24.0);
    }

    #[test]
    fn empty_text_shows_placeholder() {
        let mut store = FieldStore::new();
        make(FieldKind::Text, &mut store);
        store.select(None);
        let views = project_page(&store, 1, 1.0);
        assert_eq!(
            views[0].content,
            DisplayContent::Label {
                text: "Enter text".into(),
                placeholder: true
            }
        );
    }

    #[test]
    fn editing_swaps_in_a_seeded_input() {
        let mut store = FieldStore::new();
        let id = make(FieldKind::Text, &mut store);
        store.update(
            id,
            fp_core::FieldPatch::content(FieldContent::Text("Jane".into())),
        );
        store.set_editing(Some(id));
        let views = project_page(&store, 1, 1.0);
        assert_eq!(
            views[0].content,
            DisplayContent::TextInput {
                seed: "Jane".into()
            }
        );
        assert!(views[0].editing);
        assert!(!views[0].resizable);
    }

    #[test]
    fn signature_views() {
        let mut store = FieldStore::new();
        let id = store
            .attach_signature(
                1,
                Some((0.0, 0.0)),
                VIEWPORT,
                1.0,
                "data:image/png;base64,QQ==".into(),
            )
            .unwrap();
        let views = project_page(&store, 1, 1.0);
        assert!(matches!(views[0].content, DisplayContent::Image { .. }));

        // Wiping content turns it back into the sign prompt
        store.update(
            id,
            fp_core::FieldPatch::content(FieldContent::ImageData(String::new())),
        );
        let views = project_page(&store, 1, 1.0);
        assert_eq!(views[0].content, DisplayContent::SignaturePrompt);
    }

    #[test]
    fn only_active_page_is_projected() {
        let mut store = FieldStore::new();
        make(FieldKind::Text, &mut store);
        store.create(FieldKind::Checkbox, 2, None, VIEWPORT, 1.0, None);
        assert_eq!(project_page(&store, 1, 1.0).len(), 1);
        assert_eq!(project_page(&store, 2, 1.0).len(), 1);
        assert_eq!(project_page(&store, 3, 1.0).len(), 0);
    }
}
