//! Saved themes
//!
//! `ThemeStore` keeps the theme list in memory and writes the whole array to
//! the `savedThemes` key after every mutation. A failed write is reported as
//! [`ThemeError::Storage`], but the in-memory list keeps the change, so the two
//! can diverge until the next successful write.

use crate::color::model::Color;
use crate::core::error::{Result, ThemeError};
use crate::core::storage::{read_collection, write_collection, KeyValueStore, SAVED_THEMES_KEY};
use crate::font::Font;
use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A named bundle of colors and fonts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Creation time in milliseconds
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub fonts: Vec<Font>,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
}

impl Theme {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.fonts.is_empty()
    }
}

/// Theme collection backed by a key-value store
pub struct ThemeStore {
    store: Arc<dyn KeyValueStore>,
    themes: Vec<Theme>,
}

impl ThemeStore {
    /// Load saved themes. A missing key is an empty list.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let themes: Vec<Theme> = read_collection(store.as_ref(), SAVED_THEMES_KEY)?;
        debug!("Loaded {} saved themes", themes.len());
        Ok(Self { store, themes })
    }

    /// All themes, oldest first
    pub fn list(&self) -> &[Theme] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    /// Case-insensitive lookup on the trimmed name
    pub fn find_by_name(&self, name: &str) -> Option<&Theme> {
        let wanted = name.trim().to_lowercase();
        self.themes.iter().find(|t| t.name.to_lowercase() == wanted)
    }

    /// Save a new theme.
    ///
    /// Rejects an empty selection first, then an empty name, then a name that
    /// already exists (ignoring case). Rejected saves leave the store untouched.
    pub fn save(&mut self, name: &str, colors: Vec<Color>, fonts: Vec<Font>) -> Result<Theme> {
        if colors.is_empty() && fonts.is_empty() {
            return Err(ThemeError::NoSelection);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ThemeError::EmptyName);
        }

        if self.find_by_name(name).is_some() {
            return Err(ThemeError::DuplicateName(name.to_string()));
        }

        let now = Utc::now();
        let mut id = now.timestamp_millis();
        while self.get(id).is_some() {
            id += 1;
        }

        let theme = Theme {
            id,
            name: name.to_string(),
            colors,
            fonts,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        self.themes.push(theme.clone());
        self.persist()?;

        info!(
            "Saved theme '{}' ({} colors, {} fonts)",
            theme.name,
            theme.colors.len(),
            theme.fonts.len()
        );
        Ok(theme)
    }

    /// Delete a theme. Callers confirm with the user before calling.
    pub fn delete(&mut self, id: i64) -> Result<Theme> {
        let index = self
            .themes
            .iter()
            .position(|t| t.id == id)
            .ok_or(ThemeError::ThemeNotFound(id))?;

        let removed = self.themes.remove(index);
        self.persist()?;
        info!("Deleted theme '{}'", removed.name);
        Ok(removed)
    }

    /// Remove every theme. Callers confirm with the user before calling.
    pub fn clear_all(&mut self) -> Result<()> {
        let count = self.themes.len();
        self.themes.clear();
        self.persist()?;
        info!("Cleared {} saved themes", count);
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        write_collection(self.store.as_ref(), SAVED_THEMES_KEY, &self.themes).map_err(|e| {
            warn!("Failed to persist saved themes: {}", e);
            match e {
                ThemeError::Storage(_) => e,
                other => ThemeError::Storage(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use serde_json::Value;

    fn colors(hexes: &[&str]) -> Vec<Color> {
        hexes.iter().filter_map(|h| Color::from_hex(h)).collect()
    }

    fn store() -> (Arc<MemoryStore>, ThemeStore) {
        let mem = Arc::new(MemoryStore::new());
        let themes = ThemeStore::load(mem.clone()).unwrap();
        (mem, themes)
    }

    fn stored_count(mem: &MemoryStore) -> usize {
        match mem.raw(SAVED_THEMES_KEY) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    #[test]
    fn test_save_persists_whole_array() {
        let (mem, mut themes) = store();
        themes.save("Ocean", colors(&["#0077be"]), vec![]).unwrap();
        themes
            .save("Forest", vec![], vec![Font::new("Lato", "16px", "400", "normal")])
            .unwrap();

        assert_eq!(themes.len(), 2);
        assert_eq!(stored_count(&mem), 2);

        let reloaded = ThemeStore::load(mem.clone()).unwrap();
        assert_eq!(reloaded.list(), themes.list());
    }

    #[test]
    fn test_theme_serialized_shape() {
        let (mem, mut themes) = store();
        let theme = themes.save("  Ocean ", colors(&["#0077be"]), vec![]).unwrap();
        assert_eq!(theme.name, "Ocean");

        let raw = mem.raw(SAVED_THEMES_KEY).unwrap();
        assert_eq!(raw[0]["id"], theme.id);
        assert_eq!(raw[0]["colors"][0]["hex"], "#0077be");
        assert!(chrono::DateTime::parse_from_rfc3339(raw[0]["createdAt"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_duplicate_name_ignores_case() {
        let (_, mut themes) = store();
        themes.save("Ocean", colors(&["#0077be"]), vec![]).unwrap();
        let err = themes
            .save("OCEAN", colors(&["#ffffff"]), vec![])
            .unwrap_err();
        assert!(matches!(err, ThemeError::DuplicateName(_)));
        assert!(err.is_input_error());
        assert_eq!(themes.len(), 1);
    }

    #[test]
    fn test_empty_selection_rejected_before_name() {
        let (mem, mut themes) = store();
        assert!(matches!(
            themes.save("", vec![], vec![]),
            Err(ThemeError::NoSelection)
        ));
        assert!(themes.is_empty());
        assert!(mem.raw(SAVED_THEMES_KEY).is_none());
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_, mut themes) = store();
        assert!(matches!(
            themes.save("   ", colors(&["#000000"]), vec![]),
            Err(ThemeError::EmptyName)
        ));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let (_, mut themes) = store();
        let a = themes.save("a", colors(&["#000000"]), vec![]).unwrap();
        let b = themes.save("b", colors(&["#000000"]), vec![]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_delete_and_clear() {
        let (mem, mut themes) = store();
        let a = themes.save("a", colors(&["#000000"]), vec![]).unwrap();
        themes.save("b", colors(&["#ffffff"]), vec![]).unwrap();

        assert_eq!(themes.delete(a.id).unwrap().name, "a");
        assert_eq!(stored_count(&mem), 1);
        assert!(matches!(
            themes.delete(a.id),
            Err(ThemeError::ThemeNotFound(_))
        ));

        themes.clear_all().unwrap();
        assert!(themes.is_empty());
        assert_eq!(stored_count(&mem), 0);
    }

    #[test]
    fn test_failed_write_is_not_rolled_back() {
        let (mem, mut themes) = store();
        mem.set_fail_writes(true);

        let err = themes
            .save("Ocean", colors(&["#0077be"]), vec![])
            .unwrap_err();
        assert!(matches!(err, ThemeError::Storage(_)));

        // Memory and storage now disagree
        assert_eq!(themes.len(), 1);
        assert_eq!(stored_count(&mem), 0);
    }

    #[test]
    fn test_find_by_name() {
        let (_, mut themes) = store();
        themes.save("Ocean", colors(&["#0077be"]), vec![]).unwrap();
        assert!(themes.find_by_name(" ocean ").is_some());
        assert!(themes.find_by_name("lake").is_none());
    }
}
