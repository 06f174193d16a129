pub mod geom;
pub mod id;
pub mod model;
pub mod prefs;
pub mod store;
pub mod validate;

pub use geom::{to_page, to_viewport, Viewport, MIN_FIELD_SIZE};
pub use id::FieldId;
pub use model::*;
pub use prefs::SessionPrefs;
pub use store::{CreateOutcome, FieldPatch, FieldStore, Session};
pub use validate::{validate_fields, ValidationReport};
