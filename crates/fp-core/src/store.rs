//! The field store: the authoritative ordered list of fields plus the
//! selection and editing cursors.
//!
//! Every mutation is synchronous and immediately visible to the
//! renderer. Mutations never raise user-visible errors: missing ids
//! are no-ops, bad geometry is clamped. Insertion order is z-order —
//! later-created fields render and hit-test on top.

use crate::geom::{Viewport, MIN_FIELD_SIZE};
use crate::id::FieldId;
use crate::model::{Field, FieldContent, FieldKind};
use crate::prefs::SessionPrefs;

/// Result of a `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The field exists in the store.
    Created(FieldId),
    /// Signature fields are not materialized until image content
    /// exists; the caller should open the capture flow and then call
    /// `attach_signature`.
    SignatureCaptureRequested,
}

/// Partial update merged into an existing field by `update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub content: Option<FieldContent>,
    pub font_size: Option<f32>,
    pub color: Option<crate::model::Color>,
}

impl FieldPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn content(content: FieldContent) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }
}

/// Owns the field list and the two ephemeral cursors. At most one
/// field is selected and at most one is editing; editing implies
/// selected.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    fields: Vec<Field>,
    selected: Option<FieldId>,
    editing: Option<FieldId>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Creation ────────────────────────────────────────────────────

    /// Allocate a new field on `page`, either at an explicit page-space
    /// position or centered in the viewport. Signature creation is
    /// deferred unless the prefs carry a saved signature (see
    /// `CreateOutcome`). The new field becomes the selection.
    pub fn create(
        &mut self,
        kind: FieldKind,
        page: u32,
        position: Option<(f32, f32)>,
        viewport: Viewport,
        scale: f32,
        prefs: Option<&SessionPrefs>,
    ) -> CreateOutcome {
        let saved_signature = prefs.and_then(|p| p.saved_signature.clone());
        if kind == FieldKind::Signature && saved_signature.is_none() {
            log::debug!("signature create deferred until capture completes");
            return CreateOutcome::SignatureCaptureRequested;
        }

        let (w, h) = kind.default_size();
        let (x, y) = position.unwrap_or_else(|| viewport.centered_position(w, h, scale));
        let mut field = Field::new(kind, page, x, y);
        if kind == FieldKind::Signature {
            // Only reachable with a saved signature present.
            if let Some(data) = saved_signature {
                field.content = FieldContent::ImageData(data);
            }
        }
        let id = field.id;
        log::debug!("create {id} ({}) on page {page}", kind.name());
        self.fields.push(field);
        self.select(Some(id));
        CreateOutcome::Created(id)
    }

    /// Seed a text field from the saved display name, when present.
    pub fn create_name_field(
        &mut self,
        page: u32,
        position: Option<(f32, f32)>,
        viewport: Viewport,
        scale: f32,
        prefs: &SessionPrefs,
    ) -> CreateOutcome {
        let outcome = self.create(FieldKind::Text, page, position, viewport, scale, None);
        if let CreateOutcome::Created(id) = outcome {
            if let Some(name) = &prefs.saved_name {
                self.update(id, FieldPatch::content(FieldContent::Text(name.clone())));
            }
        }
        outcome
    }

    /// Materialize a signature field once the capture flow produced an
    /// image. This is the second half of the deferred-creation policy:
    /// empty signature placeholders are never persisted.
    pub fn attach_signature(
        &mut self,
        page: u32,
        position: Option<(f32, f32)>,
        viewport: Viewport,
        scale: f32,
        data_uri: String,
    ) -> Option<FieldId> {
        if data_uri.is_empty() {
            log::debug!("signature capture returned no image; nothing created");
            return None;
        }
        let (w, h) = FieldKind::Signature.default_size();
        let (x, y) = position.unwrap_or_else(|| viewport.centered_position(w, h, scale));
        let field = Field::new(FieldKind::Signature, page, x, y)
            .with_content(FieldContent::ImageData(data_uri));
        let id = field.id;
        self.fields.push(field);
        self.select(Some(id));
        Some(id)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Merge a partial update into an existing field. No-op if the id
    /// is not in the store. Geometry is sanitized: positions floor at
    /// zero, sizes at `MIN_FIELD_SIZE`.
    pub fn update(&mut self, id: FieldId, patch: FieldPatch) {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            log::debug!("update {id}: not found, ignoring");
            return;
        };
        if let Some(x) = patch.x {
            field.x = x.max(0.0);
        }
        if let Some(y) = patch.y {
            field.y = y.max(0.0);
        }
        if let Some(w) = patch.width {
            field.width = w.max(MIN_FIELD_SIZE);
        }
        if let Some(h) = patch.height {
            field.height = h.max(MIN_FIELD_SIZE);
        }
        if let Some(content) = patch.content {
            field.content = content;
        }
        if let Some(size) = patch.font_size {
            field.font_size = size.max(1.0);
        }
        if let Some(color) = patch.color {
            field.color = color;
        }
    }

    /// Remove a field; clears any cursor that referenced it.
    pub fn delete(&mut self, id: FieldId) {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        if self.fields.len() != before {
            log::debug!("delete {id}");
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    /// Empty the store and both cursors. The confirmation prompt for a
    /// non-empty store lives at the UI boundary, not here.
    pub fn clear_all(&mut self) {
        self.fields.clear();
        self.selected = None;
        self.editing = None;
    }

    /// Toggle a checkbox field's state. No-op for other kinds.
    pub fn toggle_checkbox(&mut self, id: FieldId) {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            return;
        };
        if field.kind != FieldKind::Checkbox {
            return;
        }
        let next = !field.content.is_checked();
        field.content = FieldContent::Checked(next);
        log::debug!("toggle {id} -> {next}");
    }

    // ─── Cursors ─────────────────────────────────────────────────────

    /// Change the selection. Selecting a different field (or nothing)
    /// while editing ends the edit.
    pub fn select(&mut self, id: Option<FieldId>) {
        if self.editing.is_some() && self.editing != id {
            self.editing = None;
        }
        self.selected = id;
    }

    /// Enter or leave edit mode. Editing a field implicitly selects it.
    pub fn set_editing(&mut self, id: Option<FieldId>) {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return;
            }
            self.selected = Some(id);
        }
        self.editing = id;
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn editing(&self) -> Option<FieldId> {
        self.editing
    }

    // ─── Queries ─────────────────────────────────────────────────────

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in insertion order (z-order back to front).
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields on a page, insertion order preserved.
    pub fn fields_for_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.page == page)
    }
}

// ─── Document session ────────────────────────────────────────────────────

/// Per-document state: source bytes, paging, scale, and the store.
/// Created when a PDF is loaded; dropped when the document closes.
#[derive(Debug, Clone)]
pub struct Session {
    pub pdf_bytes: Vec<u8>,
    pub file_name: String,
    pub page: u32,
    pub page_count: u32,
    pub scale: f32,
    pub store: FieldStore,
}

impl Session {
    pub fn new(pdf_bytes: Vec<u8>, file_name: impl Into<String>, page_count: u32) -> Self {
        Self {
            pdf_bytes,
            file_name: file_name.into(),
            page: 1,
            page_count: page_count.max(1),
            scale: 1.0,
            store: FieldStore::new(),
        }
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.page_count);
    }

    /// Change zoom. Stored field geometry is untouched; only the
    /// projection changes.
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }
}
