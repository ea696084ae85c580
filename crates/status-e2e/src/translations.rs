//! Translation table for locators addressed by translation key.

use crate::result::{E2eError, E2eResult};
use std::collections::HashMap;
use std::path::Path;

/// Keys the built-in views address by translation, with their English text
const BUILTIN: &[(&str, &str)] = &[
    ("all", "All"),
    ("select", "Select"),
    ("import", "Import"),
    ("import-community", "Import community"),
    ("user-found", "User found"),
    ("membership-title", "Membership requirement"),
    ("membership-approval", "Require approval"),
    ("community-thumbnail-upload", "Upload thumbnail"),
    ("community-image-pick", "Pick an image"),
    ("mark-all-notifications-as-read", "Mark all notifications as read"),
    (
        "community-admins-will-review-your-request",
        "Community admins will review your request",
    ),
    ("mute-for-15-mins", "For 15 min"),
    ("mute-for-1-hour", "For 1 hour"),
    ("mute-for-8-hours", "For 8 hours"),
    ("mute-for-1-week", "For 7 days"),
    ("mute-till-unmute", "Until you turn it back on"),
];

/// English text for translation keys
#[derive(Debug, Clone, Default)]
pub struct Translations {
    table: HashMap<String, String>,
}

impl Translations {
    /// Table covering every key the bundled views use
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    /// Build from key/text pairs
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Parse the app's flat `{"key": "text"}` translation JSON
    pub fn from_json(json: &str) -> E2eResult<Self> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { table })
    }

    /// Load the app's translation file from disk
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> E2eResult<&str> {
        self.table
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| E2eError::MissingTranslation {
                key: key.to_string(),
            })
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_view_keys() {
        let tr = Translations::builtin();
        assert_eq!(tr.get("select").unwrap(), "Select");
        assert_eq!(tr.get("mute-till-unmute").unwrap(), "Until you turn it back on");
        assert!(!tr.is_empty());
    }

    #[test]
    fn test_missing_key() {
        let tr = Translations::builtin();
        let err = tr.get("does-not-exist").unwrap_err();
        assert!(matches!(err, E2eError::MissingTranslation { .. }));
    }

    #[test]
    fn test_from_json() {
        let tr = Translations::from_json(r#"{"join-community": "Join community"}"#).unwrap();
        assert_eq!(tr.len(), 1);
        assert_eq!(tr.get("join-community").unwrap(), "Join community");
    }

    #[test]
    fn test_from_json_rejects_nested() {
        assert!(Translations::from_json(r#"{"a": {"b": "c"}}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.json");
        std::fs::write(&path, r#"{"select": "Pick"}"#).unwrap();
        let tr = Translations::from_file(&path).unwrap();
        assert_eq!(tr.get("select").unwrap(), "Pick");
    }
}
