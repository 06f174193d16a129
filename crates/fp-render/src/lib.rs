pub mod hit;
pub mod view;

pub use hit::{hit_test, HitTarget, RESIZE_HANDLE_PX};
pub use view::{project_page, DisplayContent, FieldView, ViewRect};
