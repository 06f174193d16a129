//! PDF flattening: draw every field's content into the page streams of
//! a copy of the source document. The output has no interactive form
//! widgets, just drawn marks.

pub mod flatten;
pub mod image_embed;
pub mod metrics;

pub use flatten::{export_document, flatten, page_count};
pub use metrics::{string_width, wrap_text};

use fp_core::validate::ValidationReport;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not read the source PDF: {0}")]
    Parse(String),

    #[error("could not write the output PDF: {0}")]
    Save(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document is not ready to export:\n{}", .0.summary())]
    Invalid(ValidationReport),

    #[error("an export is already in progress")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Serializes exports: at most one in flight at a time. The UI can
/// poll `is_busy` to disable its trigger control while one runs.
#[derive(Debug, Default)]
pub struct Exporter {
    busy: AtomicBool,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Validate and flatten, refusing re-entry while an export runs.
    pub fn export(&self, pdf_bytes: &[u8], fields: &[fp_core::Field]) -> Result<Vec<u8>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ExportError::Busy);
        }
        let result = export_document(pdf_bytes, fields);
        self.busy.store(false, Ordering::SeqCst);
        result
    }
}

/// Default output name for a flattened document:
/// `contract.pdf` → `contract_filled.pdf`.
pub fn export_filename(original: &str) -> String {
    let stem = original.strip_suffix(".pdf").unwrap_or(original);
    format!("{stem}_filled.pdf")
}
