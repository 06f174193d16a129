//! Core data model for FormPad documents.
//!
//! A document is an opaque PDF plus a flat, ordered list of `Field`
//! records overlaid on its pages. Geometry is stored in PDF-page units
//! with the origin at the page's top-left corner; the viewport scale
//! factor only ever affects the on-screen projection, never the stored
//! values.

use crate::id::FieldId;
use serde::{Deserialize, Serialize};

// ─── Color ───────────────────────────────────────────────────────────────

/// RGB color. Stored as 3 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex string (leading `#` optional).
    /// Returns black on malformed input — field colors are cosmetic and
    /// a bad value should never break a mutation or an export.
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return Self::BLACK;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .unwrap_or(0.0)
        };
        Self::rgb(channel(0), channel(2), channel(4))
    }

    pub fn to_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─── Field kinds ─────────────────────────────────────────────────────────

/// The closed set of field types. Immutable after creation; determines
/// rendering, interaction, and export behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    Timestamp,
    Checkbox,
    Signature,
}

impl FieldKind {
    /// Stable lowercase name, used for id prefixes and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Signature => "signature",
        }
    }

    /// Default geometry `(width, height)` in page units.
    pub fn default_size(&self) -> (f32, f32) {
        match self {
            FieldKind::Text => (150.0, 28.0),
            FieldKind::Date => (110.0, 28.0),
            FieldKind::Timestamp => (180.0, 28.0),
            FieldKind::Checkbox => (22.0, 22.0),
            FieldKind::Signature => (180.0, 56.0),
        }
    }

    /// Whether this kind carries a text payload drawn at `font_size`.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Date | FieldKind::Timestamp
        )
    }

    /// Placeholder label shown when the field has no content yet.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FieldKind::Text => "Enter text",
            FieldKind::Date => "Select date",
            FieldKind::Timestamp => "Add timestamp",
            FieldKind::Checkbox => "",
            FieldKind::Signature => "Tap to sign",
        }
    }
}

// ─── Content payload ─────────────────────────────────────────────────────

/// Variant payload of a field. Which variant is legal depends on the
/// field's kind; mismatches are tolerated by the renderer and exporter
/// (they fall back to a placeholder) but never produced by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldContent {
    /// No value yet.
    #[default]
    Empty,
    /// Text, date, or timestamp string.
    Text(String),
    /// Checkbox state.
    Checked(bool),
    /// Signature image as a data URI (`data:image/png;base64,...`).
    ImageData(String),
}

impl FieldContent {
    /// True when there is nothing to draw: empty variant, blank text,
    /// or an empty data URI.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldContent::Empty => true,
            FieldContent::Text(s) => s.trim().is_empty(),
            FieldContent::Checked(_) => false,
            FieldContent::ImageData(s) => s.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldContent::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldContent::Checked(true))
    }
}

// ─── Field ───────────────────────────────────────────────────────────────

pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// A positioned overlay field. `x`/`y` is the top-left corner in PDF
/// page units (y-down); `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub kind: FieldKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: FieldContent,
    pub font_size: f32,
    pub color: Color,
    pub page: u32,
    /// Unset means "not required". Nothing in the creation paths sets
    /// this; it is reserved for an external field-configuration surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Field {
    /// Create a field of `kind` at a top-left position on `page`, with
    /// the kind's default geometry and a freshly generated id.
    pub fn new(kind: FieldKind, page: u32, x: f32, y: f32) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: FieldId::generate(kind.name()),
            kind,
            x: x.max(0.0),
            y: y.max(0.0),
            width,
            height,
            content: FieldContent::Empty,
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            page,
            required: None,
        }
    }

    pub fn with_content(mut self, content: FieldContent) -> Self {
        self.content = content;
        self
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#2D6CDF");
        assert_eq!(c.to_hex(), "#2D6CDF");
        // Malformed input degrades to black
        assert_eq!(Color::from_hex("nope").to_hex(), "#000000");
    }

    #[test]
    fn defaults_per_kind() {
        let f = Field::new(FieldKind::Checkbox, 1, 40.0, 40.0);
        assert_eq!((f.width, f.height), (22.0, 22.0));
        assert_eq!(f.content, FieldContent::Empty);
        assert_eq!(f.required, None);

        let (w, h) = FieldKind::Signature.default_size();
        assert!(w >= 150.0 && h >= 50.0);
    }

    #[test]
    fn negative_position_is_clamped_at_creation() {
        let f = Field::new(FieldKind::Text, 1, -10.0, -5.0);
        assert_eq!((f.x, f.y), (0.0, 0.0));
    }

    #[test]
    fn blank_detection() {
        assert!(FieldContent::Empty.is_blank());
        assert!(FieldContent::Text("   ".into()).is_blank());
        assert!(!FieldContent::Text("hi".into()).is_blank());
        assert!(!FieldContent::Checked(false).is_blank());
        assert!(FieldContent::ImageData(String::new()).is_blank());
    }
}
