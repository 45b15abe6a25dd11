//! Persisted palettes
//!
//! Palettes are stored as a JSON array under the `palettes` key. Entries written
//! by older versions may carry their colors as plain hex strings, under either
//! `colors` or `palette`; both shapes are accepted on read. Writes always use
//! `{hex}` records.

use crate::color::model::Color;
use crate::core::error::{Result, ThemeError};
use crate::core::storage::{read_collection, write_collection, KeyValueStore, PALETTES_KEY};
use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// A named set of colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Creation time in milliseconds, as a string
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "palette", deserialize_with = "deserialize_colors")]
    pub colors: Vec<Color>,
    /// RFC 3339 creation time
    #[serde(default)]
    pub timestamp: String,
    /// Page the palette was captured from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Palette {
    /// Hex values of the palette's colors
    pub fn hexes(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.hex.clone()).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredColor {
    Hex(String),
    Record(Color),
}

fn deserialize_colors<'de, D>(deserializer: D) -> std::result::Result<Vec<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored: Vec<StoredColor> = Vec::deserialize(deserializer)?;
    Ok(stored
        .into_iter()
        .map(|c| {
            let (hex, original) = match c {
                StoredColor::Record(color) => (color.hex, color.original),
                StoredColor::Hex(hex) => (hex, None),
            };
            let mut color = Color::from_hex(&hex).unwrap_or_else(|| {
                warn!("Malformed palette color '{}', using black", hex);
                Color::from_rgb(0, 0, 0)
            });
            color.original = original;
            color
        })
        .collect())
}

/// Palette collection over a key-value store
#[derive(Clone)]
pub struct PaletteStore {
    store: Arc<dyn KeyValueStore>,
}

impl PaletteStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All palettes, oldest first
    pub fn list(&self) -> Result<Vec<Palette>> {
        read_collection(self.store.as_ref(), PALETTES_KEY)
    }

    /// Palette by id
    pub fn get(&self, id: &str) -> Result<Palette> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ThemeError::PaletteNotFound(id.to_string()))
    }

    /// Append a new palette
    pub fn save(
        &self,
        name: &str,
        colors: Vec<Color>,
        url: Option<String>,
        folder: Option<String>,
        tags: Vec<String>,
    ) -> Result<Palette> {
        let mut palettes = self.list()?;

        let now = Utc::now();
        let mut id_ms = now.timestamp_millis();
        while palettes.iter().any(|p| p.id == id_ms.to_string()) {
            id_ms += 1;
        }

        let palette = Palette {
            id: id_ms.to_string(),
            name: name.trim().to_string(),
            colors,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
            folder,
            tags,
        };

        palettes.push(palette.clone());
        write_collection(self.store.as_ref(), PALETTES_KEY, &palettes)?;

        info!(
            "Saved palette '{}' ({} colors) as {}",
            palette.name,
            palette.colors.len(),
            palette.id
        );
        Ok(palette)
    }

    /// Replace the palette with the same id, or append it
    pub fn upsert(&self, palette: Palette) -> Result<()> {
        let mut palettes = self.list()?;
        match palettes.iter_mut().find(|p| p.id == palette.id) {
            Some(existing) => *existing = palette,
            None => palettes.push(palette),
        }
        write_collection(self.store.as_ref(), PALETTES_KEY, &palettes)
    }

    /// Delete by id. Unknown ids are an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut palettes = self.list()?;
        let before = palettes.len();
        palettes.retain(|p| p.id != id);
        if palettes.len() == before {
            return Err(ThemeError::PaletteNotFound(id.to_string()));
        }
        write_collection(self.store.as_ref(), PALETTES_KEY, &palettes)?;
        debug!("Deleted palette {}", id);
        Ok(())
    }

    /// Remove every palette
    pub fn clear_all(&self) -> Result<()> {
        write_collection::<Palette>(self.store.as_ref(), PALETTES_KEY, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use serde_json::json;

    fn colors(hexes: &[&str]) -> Vec<Color> {
        hexes.iter().filter_map(|h| Color::from_hex(h)).collect()
    }

    fn store() -> (Arc<MemoryStore>, PaletteStore) {
        let mem = Arc::new(MemoryStore::new());
        let palettes = PaletteStore::new(mem.clone());
        (mem, palettes)
    }

    #[test]
    fn test_save_and_list() {
        let (_, palettes) = store();
        let saved = palettes
            .save(
                " Sunset ",
                colors(&["#ff5733", "#c70039"]),
                Some("https://example.com".to_string()),
                None,
                vec!["warm".to_string()],
            )
            .unwrap();

        assert_eq!(saved.name, "Sunset");
        assert!(saved.id.parse::<i64>().is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&saved.timestamp).is_ok());

        let listed = palettes.list().unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_, palettes) = store();
        let a = palettes.save("a", vec![], None, None, vec![]).unwrap();
        let b = palettes.save("b", vec![], None, None, vec![]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let (_, palettes) = store();
        assert!(palettes.list().unwrap().is_empty());
    }

    #[test]
    fn test_reads_plain_hex_colors() {
        let (mem, palettes) = store();
        let mut items = serde_json::Map::new();
        items.insert(
            PALETTES_KEY.to_string(),
            json!([
                {"id": "1", "name": "old", "colors": ["#FF0000", {"hex": "#00ff00"}], "timestamp": ""},
                {"id": "palette_2", "palette": ["#0000ff", "bogus"], "folder": "web"}
            ]),
        );
        mem.set(items).unwrap();

        let listed = palettes.list().unwrap();
        assert_eq!(listed[0].hexes(), vec!["#ff0000", "#00ff00"]);
        assert_eq!(listed[1].hexes(), vec!["#0000ff", "#000000"]);
        assert_eq!(listed[1].folder.as_deref(), Some("web"));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let (_, palettes) = store();
        let mut saved = palettes.save("first", vec![], None, None, vec![]).unwrap();
        saved.name = "renamed".to_string();
        palettes.upsert(saved.clone()).unwrap();

        let listed = palettes.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "renamed");
    }

    #[test]
    fn test_delete() {
        let (_, palettes) = store();
        let saved = palettes.save("x", vec![], None, None, vec![]).unwrap();
        palettes.delete(&saved.id).unwrap();
        assert!(palettes.list().unwrap().is_empty());
        assert!(matches!(
            palettes.delete(&saved.id),
            Err(ThemeError::PaletteNotFound(_))
        ));
    }

    #[test]
    fn test_clear_all_and_write_failure() {
        let (mem, palettes) = store();
        palettes.save("x", vec![], None, None, vec![]).unwrap();
        palettes.clear_all().unwrap();
        assert!(palettes.list().unwrap().is_empty());

        mem.set_fail_writes(true);
        assert!(matches!(
            palettes.save("y", vec![], None, None, vec![]),
            Err(ThemeError::Storage(_))
        ));
    }
}
