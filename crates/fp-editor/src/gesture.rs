//! The overlay gesture engine.
//!
//! Translates pointer events into `EditorAction` values applied to the
//! field store. Drag and resize are two mutually exclusive short-lived
//! state machines keyed by an origin snapshot taken at pointer-down;
//! each move event recomputes the absolute target geometry from that
//! snapshot, so dropped or reordered events cannot accumulate error.
//!
//! Nothing here raises a user-visible error: releases without a
//! matching press are ignored, out-of-bounds targets are clamped.

use crate::input::PointerEvent;
use fp_core::geom::{to_page, to_viewport, Viewport, MIN_FIELD_SIZE};
use fp_core::model::{FieldContent, FieldKind};
use fp_core::store::{FieldPatch, FieldStore};
use fp_core::FieldId;
use fp_render::hit::{hit_test, HitTarget};

/// Movement below this many viewport pixels is still a tap.
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

/// Two taps on the same field within this window count as a double-tap.
pub const DOUBLE_TAP_MS: f64 = 300.0;

/// The canvas the gestures happen on: active page, zoom, and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasState {
    pub page: u32,
    pub scale: f32,
    pub viewport: Viewport,
}

/// A store mutation or control signal produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Select(Option<FieldId>),
    BeginEdit(FieldId),
    ToggleCheckbox(FieldId),
    /// Ask the host to open the signature capture surface for an
    /// existing (emptied) signature field.
    RequestSignatureCapture(FieldId),
    /// Absolute page-space position, already clamped.
    Move { id: FieldId, x: f32, y: f32 },
    /// Absolute page-space size, already floored.
    Resize {
        id: FieldId,
        width: f32,
        height: f32,
    },
}

/// How a tap on a field resolves, keyed by field kind. Centralizing the
/// dispatch keeps the per-kind behavior exhaustive instead of scattered
/// through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapBehavior {
    /// Select; double-tap enters text editing.
    EditOnDoubleTap,
    /// Toggle immediately; no editing state.
    Toggle,
    /// Open capture when empty, otherwise just select.
    CaptureWhenEmpty,
}

fn tap_behavior(kind: FieldKind) -> TapBehavior {
    match kind {
        FieldKind::Text | FieldKind::Date | FieldKind::Timestamp => TapBehavior::EditOnDoubleTap,
        FieldKind::Checkbox => TapBehavior::Toggle,
        FieldKind::Signature => TapBehavior::CaptureWhenEmpty,
    }
}

// ─── Gesture state ───────────────────────────────────────────────────────

/// What the press intends to become if movement exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PressIntent {
    /// Pressed a field body: may become a drag.
    Drag {
        id: FieldId,
        /// Pointer-to-field-origin offset in viewport pixels.
        grab_dx: f32,
        grab_dy: f32,
        /// Field was in edit mode at press time; drags are suppressed.
        editing: bool,
    },
    /// Pressed the resize handle: may become a resize.
    Resize {
        id: FieldId,
        start_x: f32,
        start_y: f32,
        /// Field size at press time, page units.
        origin_w: f32,
        origin_h: f32,
        /// Field was in edit mode at press time; resizes are suppressed
        /// just like drags (the handle is hidden while editing).
        editing: bool,
    },
    /// Pressed empty canvas: release clears the selection.
    Canvas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    /// Pressed, movement still under the threshold.
    Pending {
        intent: PressIntent,
        down_x: f32,
        down_y: f32,
    },
    Dragging {
        id: FieldId,
        grab_dx: f32,
        grab_dy: f32,
    },
    Resizing {
        id: FieldId,
        start_x: f32,
        start_y: f32,
        origin_w: f32,
        origin_h: f32,
    },
}

/// The per-canvas gesture engine. Feed it every pointer event; apply
/// the returned actions with `apply_actions`.
#[derive(Debug)]
pub struct GestureEngine {
    state: GestureState,
    /// Last completed tap, for double-tap detection.
    last_tap: Option<(FieldId, f64)>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            last_tap: None,
        }
    }

    /// True while a drag or resize is in flight.
    pub fn gesture_active(&self) -> bool {
        matches!(
            self.state,
            GestureState::Dragging { .. } | GestureState::Resizing { .. }
        )
    }

    pub fn handle(
        &mut self,
        event: &PointerEvent,
        store: &FieldStore,
        canvas: &CanvasState,
    ) -> Vec<EditorAction> {
        match *event {
            PointerEvent::Down { x, y, .. } => self.on_down(x, y, store, canvas),
            PointerEvent::Move { x, y, .. } => self.on_move(x, y, store, canvas),
            PointerEvent::Up { x, y, time_ms } => self.on_up(x, y, time_ms, store),
        }
    }

    fn on_down(
        &mut self,
        x: f32,
        y: f32,
        store: &FieldStore,
        canvas: &CanvasState,
    ) -> Vec<EditorAction> {
        let mut actions = Vec::new();
        let intent = match hit_test(store, canvas.page, canvas.scale, x, y) {
            HitTarget::ResizeHandle(id) => {
                let (w, h) = store
                    .get(id)
                    .map(|f| (f.width, f.height))
                    .unwrap_or_else(|| FieldKind::Text.default_size());
                PressIntent::Resize {
                    id,
                    start_x: x,
                    start_y: y,
                    origin_w: w,
                    origin_h: h,
                    editing: store.editing() == Some(id),
                }
            }
            HitTarget::Field(id) => {
                // Press on an unselected field selects it right away so
                // a drag can begin from the same gesture.
                if store.selected() != Some(id) {
                    actions.push(EditorAction::Select(Some(id)));
                }
                let (fx, fy) = store.get(id).map(|f| (f.x, f.y)).unwrap_or((0.0, 0.0));
                PressIntent::Drag {
                    id,
                    grab_dx: x - to_viewport(fx, canvas.scale),
                    grab_dy: y - to_viewport(fy, canvas.scale),
                    editing: store.editing() == Some(id),
                }
            }
            HitTarget::Canvas => PressIntent::Canvas,
        };
        log::trace!("press at ({x}, {y}) -> {intent:?}");
        self.state = GestureState::Pending {
            intent,
            down_x: x,
            down_y: y,
        };
        actions
    }

    fn on_move(
        &mut self,
        x: f32,
        y: f32,
        store: &FieldStore,
        canvas: &CanvasState,
    ) -> Vec<EditorAction> {
        match self.state {
            GestureState::Pending {
                intent,
                down_x,
                down_y,
            } => {
                let moved = (x - down_x).hypot(y - down_y);
                if moved <= DRAG_THRESHOLD_PX {
                    return Vec::new();
                }
                // Threshold crossed: promote the press to a gesture.
                match intent {
                    PressIntent::Drag {
                        id,
                        grab_dx,
                        grab_dy,
                        editing,
                    } => {
                        if editing {
                            // No dragging while the field is being edited.
                            return Vec::new();
                        }
                        log::trace!("drag begins on {id}");
                        self.state = GestureState::Dragging {
                            id,
                            grab_dx,
                            grab_dy,
                        };
                        self.drag_to(x, y, store, canvas)
                    }
                    PressIntent::Resize {
                        id,
                        start_x,
                        start_y,
                        origin_w,
                        origin_h,
                        editing,
                    } => {
                        if editing {
                            // No resizing while the field is being edited.
                            return Vec::new();
                        }
                        log::trace!("resize begins on {id}");
                        self.state = GestureState::Resizing {
                            id,
                            start_x,
                            start_y,
                            origin_w,
                            origin_h,
                        };
                        self.resize_to(x, y, canvas)
                    }
                    // A swipe that started on empty canvas does nothing.
                    PressIntent::Canvas => Vec::new(),
                }
            }
            GestureState::Dragging { .. } => self.drag_to(x, y, store, canvas),
            GestureState::Resizing { .. } => self.resize_to(x, y, canvas),
            // Move without a press: platform glitch, ignore.
            GestureState::Idle => Vec::new(),
        }
    }

    fn on_up(&mut self, _x: f32, _y: f32, time_ms: f64, store: &FieldStore) -> Vec<EditorAction> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Pending { intent, .. } => self.resolve_tap(intent, time_ms, store),
            // A completed drag/resize suppresses the tap side effect;
            // the field stays where the last move left it.
            GestureState::Dragging { id, .. } => {
                log::trace!("drag ends on {id}");
                self.last_tap = None;
                Vec::new()
            }
            GestureState::Resizing { id, .. } => {
                log::trace!("resize ends on {id}");
                self.last_tap = None;
                Vec::new()
            }
            // Release without a matching press: ignore.
            GestureState::Idle => Vec::new(),
        }
    }

    // ─── Tap resolution ──────────────────────────────────────────────

    fn resolve_tap(
        &mut self,
        intent: PressIntent,
        time_ms: f64,
        store: &FieldStore,
    ) -> Vec<EditorAction> {
        let id = match intent {
            PressIntent::Canvas => {
                self.last_tap = None;
                return vec![EditorAction::Select(None)];
            }
            // A handle press that never moved behaves like a body tap.
            PressIntent::Drag { id, .. } | PressIntent::Resize { id, .. } => id,
        };
        let Some(field) = store.get(id) else {
            return Vec::new();
        };

        let mut actions = vec![EditorAction::Select(Some(id))];
        match tap_behavior(field.kind) {
            TapBehavior::Toggle => {
                actions.push(EditorAction::ToggleCheckbox(id));
                self.last_tap = None;
            }
            TapBehavior::CaptureWhenEmpty => {
                if field.content.is_blank() {
                    actions.push(EditorAction::RequestSignatureCapture(id));
                }
                self.last_tap = None;
            }
            TapBehavior::EditOnDoubleTap => {
                let double = matches!(
                    self.last_tap,
                    Some((prev, prev_ms)) if prev == id && time_ms - prev_ms <= DOUBLE_TAP_MS
                );
                if double {
                    actions.push(EditorAction::BeginEdit(id));
                    self.last_tap = None;
                } else {
                    self.last_tap = Some((id, time_ms));
                }
            }
        }
        actions
    }

    // ─── Absolute geometry recomputation ─────────────────────────────

    fn drag_to(
        &self,
        x: f32,
        y: f32,
        store: &FieldStore,
        canvas: &CanvasState,
    ) -> Vec<EditorAction> {
        let GestureState::Dragging {
            id,
            grab_dx,
            grab_dy,
        } = self.state
        else {
            return Vec::new();
        };
        let Some(field) = store.get(id) else {
            return Vec::new();
        };
        let page_x = to_page(x - grab_dx, canvas.scale);
        let page_y = to_page(y - grab_dy, canvas.scale);
        let (cx, cy) =
            canvas
                .viewport
                .clamp_position(page_x, page_y, field.width, field.height, canvas.scale);
        vec![EditorAction::Move { id, x: cx, y: cy }]
    }

    fn resize_to(&self, x: f32, y: f32, canvas: &CanvasState) -> Vec<EditorAction> {
        let GestureState::Resizing {
            id,
            start_x,
            start_y,
            origin_w,
            origin_h,
        } = self.state
        else {
            return Vec::new();
        };
        let width = (origin_w + to_page(x - start_x, canvas.scale)).max(MIN_FIELD_SIZE);
        let height = (origin_h + to_page(y - start_y, canvas.scale)).max(MIN_FIELD_SIZE);
        vec![EditorAction::Resize { id, width, height }]
    }
}

// ─── Applying actions ────────────────────────────────────────────────────

/// Apply engine actions to the store. `RequestSignatureCapture` is a
/// control signal for the host and leaves the store untouched.
pub fn apply_actions(store: &mut FieldStore, actions: &[EditorAction]) {
    for action in actions {
        match action {
            EditorAction::Select(id) => store.select(*id),
            EditorAction::BeginEdit(id) => store.set_editing(Some(*id)),
            EditorAction::ToggleCheckbox(id) => store.toggle_checkbox(*id),
            EditorAction::RequestSignatureCapture(_) => {}
            EditorAction::Move { id, x, y } => store.update(*id, FieldPatch::position(*x, *y)),
            EditorAction::Resize { id, width, height } => {
                store.update(*id, FieldPatch::size(*width, *height))
            }
        }
    }
}

/// Commit an in-progress text edit: write the new content to the
/// editing field and return to the selected state.
pub fn commit_text_edit(store: &mut FieldStore, text: String) {
    if let Some(id) = store.editing() {
        store.update(id, FieldPatch::content(FieldContent::Text(text)));
        store.set_editing(None);
    }
}

/// Discard an in-progress edit, keeping the last committed content.
pub fn cancel_edit(store: &mut FieldStore) {
    store.set_editing(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::store::CreateOutcome;

    const CANVAS: CanvasState = CanvasState {
        page: 1,
        scale: 1.0,
        viewport: Viewport {
            width: 800.0,
            height: 600.0,
        },
    };

    fn make_at(store: &mut FieldStore, kind: FieldKind, x: f32, y: f32) -> FieldId {
        match store.create(kind, 1, Some((x, y)), CANVAS.viewport, CANVAS.scale, None) {
            CreateOutcome::Created(id) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tap_selects_field() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        store.select(None);
        let mut engine = GestureEngine::new();

        let down = engine.handle(&PointerEvent::down(110.0, 110.0, 0.0), &store, &CANVAS);
        assert_eq!(down, vec![EditorAction::Select(Some(id))]);
        apply_actions(&mut store, &down);

        let up = engine.handle(&PointerEvent::up(110.0, 110.0, 50.0), &store, &CANVAS);
        assert_eq!(up[0], EditorAction::Select(Some(id)));
        apply_actions(&mut store, &up);
        assert_eq!(store.selected(), Some(id));
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn sub_threshold_movement_is_still_a_tap() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        engine.handle(&PointerEvent::down(110.0, 110.0, 0.0), &store, &CANVAS);
        let moves = engine.handle(&PointerEvent::moved(112.0, 111.0, 5.0), &store, &CANVAS);
        assert!(moves.is_empty(), "movement under threshold must not drag");
        let up = engine.handle(&PointerEvent::up(112.0, 111.0, 50.0), &store, &CANVAS);
        assert!(up.contains(&EditorAction::Select(Some(id))));
    }

    #[test]
    fn drag_recomputes_absolute_position() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        // Grab 10px into the field
        engine.handle(&PointerEvent::down(110.0, 110.0, 0.0), &store, &CANVAS);
        let actions = engine.handle(&PointerEvent::moved(150.0, 130.0, 16.0), &store, &CANVAS);
        assert_eq!(
            actions,
            vec![EditorAction::Move {
                id,
                x: 140.0,
                y: 120.0
            }]
        );
        apply_actions(&mut store, &actions);
        assert!(engine.gesture_active());

        // Each move is absolute: jumping the pointer jumps the field,
        // no delta accumulation.
        let actions = engine.handle(&PointerEvent::moved(300.0, 200.0, 32.0), &store, &CANVAS);
        apply_actions(&mut store, &actions);
        let f = store.get(id).unwrap();
        assert_eq!((f.x, f.y), (290.0, 190.0));

        // Release ends the gesture and suppresses the tap side effect.
        let up = engine.handle(&PointerEvent::up(300.0, 200.0, 48.0), &store, &CANVAS);
        assert!(up.is_empty());
        assert!(!engine.gesture_active());
    }

    #[test]
    fn drag_clamps_to_canvas() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        engine.handle(&PointerEvent::down(110.0, 110.0, 0.0), &store, &CANVAS);
        let actions = engine.handle(
            &PointerEvent::moved(-500.0, 9000.0, 16.0),
            &store,
            &CANVAS,
        );
        let EditorAction::Move { x, y, .. } = actions[0] else {
            panic!("expected Move");
        };
        assert_eq!(x, 0.0);
        // Max y keeps the 28-unit-tall field on the 600px canvas.
        assert_eq!(y, 600.0 - store.get(id).unwrap().height);
    }

    #[test]
    fn resize_from_handle_floors_at_min_size() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        // create() left the field selected; press its handle (250, 128).
        engine.handle(&PointerEvent::down(250.0, 128.0, 0.0), &store, &CANVAS);
        let actions = engine.handle(&PointerEvent::moved(280.0, 148.0, 16.0), &store, &CANVAS);
        assert_eq!(
            actions,
            vec![EditorAction::Resize {
                id,
                width: 180.0,
                height: 48.0
            }]
        );

        // Dragging far past the origin collapses to the floor, not zero.
        let actions = engine.handle(&PointerEvent::moved(0.0, 0.0, 32.0), &store, &CANVAS);
        assert_eq!(
            actions,
            vec![EditorAction::Resize {
                id,
                width: MIN_FIELD_SIZE,
                height: MIN_FIELD_SIZE
            }]
        );
    }

    #[test]
    fn resize_is_suppressed_while_editing() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        store.set_editing(Some(id));
        let mut engine = GestureEngine::new();

        // The hidden handle zone still intercepts the press; moving
        // past the threshold must not grow the field.
        engine.handle(&PointerEvent::down(250.0, 128.0, 0.0), &store, &CANVAS);
        let actions = engine.handle(&PointerEvent::moved(300.0, 170.0, 16.0), &store, &CANVAS);
        assert!(actions.is_empty());
        assert!(!engine.gesture_active());
        apply_actions(&mut store, &actions);
        let f = store.get(id).unwrap();
        assert_eq!((f.width, f.height), (150.0, 28.0));
    }

    #[test]
    fn checkbox_tap_toggles_immediately() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Checkbox, 50.0, 50.0);
        store.select(None);
        let mut engine = GestureEngine::new();

        let mut all = engine.handle(&PointerEvent::down(55.0, 55.0, 0.0), &store, &CANVAS);
        all.extend(engine.handle(&PointerEvent::up(55.0, 55.0, 40.0), &store, &CANVAS));
        apply_actions(&mut store, &all);
        assert!(store.get(id).unwrap().content.is_checked());
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn double_tap_enters_edit_mode() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        for (down_t, up_t) in [(0.0, 40.0), (150.0, 190.0)] {
            let mut a = engine.handle(&PointerEvent::down(110.0, 110.0, down_t), &store, &CANVAS);
            a.extend(engine.handle(&PointerEvent::up(110.0, 110.0, up_t), &store, &CANVAS));
            apply_actions(&mut store, &a);
        }
        assert_eq!(store.editing(), Some(id));
    }

    #[test]
    fn slow_second_tap_does_not_edit() {
        let mut store = FieldStore::new();
        make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        for (down_t, up_t) in [(0.0, 40.0), (800.0, 840.0)] {
            let mut a = engine.handle(&PointerEvent::down(110.0, 110.0, down_t), &store, &CANVAS);
            a.extend(engine.handle(&PointerEvent::up(110.0, 110.0, up_t), &store, &CANVAS));
            apply_actions(&mut store, &a);
        }
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn canvas_tap_clears_selection() {
        let mut store = FieldStore::new();
        make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        let mut engine = GestureEngine::new();

        engine.handle(&PointerEvent::down(700.0, 500.0, 0.0), &store, &CANVAS);
        let up = engine.handle(&PointerEvent::up(700.0, 500.0, 30.0), &store, &CANVAS);
        assert_eq!(up, vec![EditorAction::Select(None)]);
        apply_actions(&mut store, &up);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn orphan_release_is_ignored() {
        let store = FieldStore::new();
        let mut engine = GestureEngine::new();
        let actions = engine.handle(&PointerEvent::up(10.0, 10.0, 0.0), &store, &CANVAS);
        assert!(actions.is_empty());
        let actions = engine.handle(&PointerEvent::moved(10.0, 10.0, 5.0), &store, &CANVAS);
        assert!(actions.is_empty());
    }

    #[test]
    fn commit_and_cancel_edit() {
        let mut store = FieldStore::new();
        let id = make_at(&mut store, FieldKind::Text, 100.0, 100.0);
        store.set_editing(Some(id));
        commit_text_edit(&mut store, "signed by hand".into());
        assert_eq!(store.editing(), None);
        assert_eq!(
            store.get(id).unwrap().content,
            FieldContent::Text("signed by hand".into())
        );

        store.set_editing(Some(id));
        cancel_edit(&mut store);
        assert_eq!(store.editing(), None);
        // Content untouched by cancel
        assert_eq!(
            store.get(id).unwrap().content,
            FieldContent::Text("signed by hand".into())
        );
    }
}
