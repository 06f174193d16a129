//! Session-scoped preference values.
//!
//! The two values the app remembers across sessions: a previously
//! drawn signature (as a data URI) and a display name. They are loaded
//! by the embedding application at session start and passed explicitly
//! into the store's creation operations — never ambient global state.
//! Persistence itself is an external collaborator; this module only
//! provides the JSON round-trip it consumes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPrefs {
    /// Saved signature image as a `data:image/...;base64,` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_signature: Option<String>,
    /// Saved display name, offered when creating name/text fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_name: Option<String>,
}

impl SessionPrefs {
    pub fn to_json(&self) -> String {
        // Serialization of this struct cannot fail: two optional strings.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse saved prefs; malformed input yields empty prefs rather
    /// than an error — a corrupt prefs file must not block the editor.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_roundtrip() {
        let prefs = SessionPrefs {
            saved_signature: Some("data:image/png;base64,AAAA".into()),
            saved_name: Some("Ada Lovelace".into()),
        };
        let back = SessionPrefs::from_json(&prefs.to_json());
        assert_eq!(back, prefs);
    }

    #[test]
    fn malformed_json_yields_empty() {
        assert_eq!(SessionPrefs::from_json("{nope"), SessionPrefs::default());
    }
}
