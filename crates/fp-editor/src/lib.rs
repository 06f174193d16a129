pub mod gesture;
pub mod input;

pub use gesture::{
    apply_actions, cancel_edit, commit_text_edit, CanvasState, EditorAction, GestureEngine,
    DOUBLE_TAP_MS, DRAG_THRESHOLD_PX,
};
pub use input::PointerEvent;
