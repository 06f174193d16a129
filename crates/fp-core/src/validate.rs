//! Pre-export validation.
//!
//! Checks every field and collects all violations — export is gated on
//! the aggregate result, and the caller surfaces the whole list as one
//! failure message rather than failing fast on the first problem.

use crate::model::Field;

/// Aggregate validation result: a validity flag plus one human-readable
/// message per violation, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Single user-facing message, one violation per line.
    pub fn summary(&self) -> String {
        self.errors.join("\n")
    }
}

/// Run all checks over the field list. Field positions in messages are
/// 1-based, matching what the user sees in a field list UI.
#[must_use]
pub fn validate_fields(fields: &[Field]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (i, field) in fields.iter().enumerate() {
        let label = format!("Field {} ({})", i + 1, field.kind.name());
        if field.required == Some(true) && field.content.is_blank() {
            report.errors.push(format!("{label}: required but empty"));
        }
        if field.x < 0.0 || field.y < 0.0 {
            report.errors.push(format!(
                "{label}: position ({}, {}) is outside the page",
                field.x, field.y
            ));
        }
        if field.width <= 0.0 || field.height <= 0.0 {
            report.errors.push(format!(
                "{label}: size {}x{} is not positive",
                field.width, field.height
            ));
        }
    }
    if !report.is_valid() {
        log::debug!("validation failed with {} error(s)", report.errors.len());
    }
    report
}
