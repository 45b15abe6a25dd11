//! Export and sharing
//!
//! Themes and palettes export as pretty JSON. A palette can also be shared as a
//! small self-describing payload, either printed as JSON ("share code") or
//! base64-encoded into a link query parameter.

use crate::core::error::{Result, ThemeError};
use crate::palette::store::Palette;
use crate::theme::store::Theme;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Version written into share payloads
pub const SHARE_VERSION: &str = "1.0";

/// Producer tag written into share payloads
pub const SHARE_EXTENSION: &str = "figma-palette";

/// Query parameter carrying the encoded payload
pub const SHARE_QUERY_PARAM: &str = "palette";

/// Portable description of a shared palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub name: String,
    pub colors: Vec<String>,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub version: String,
    pub extension: String,
}

impl SharePayload {
    /// Build a payload. A blank name becomes `palette-<timestamp>`.
    pub fn new(name: &str, colors: Vec<String>) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        let name = match name.trim() {
            "" => format!("palette-{}", timestamp),
            trimmed => trimmed.to_string(),
        };
        Self {
            name,
            colors,
            timestamp,
            version: SHARE_VERSION.to_string(),
            extension: SHARE_EXTENSION.to_string(),
        }
    }

    pub fn from_palette(palette: &Palette) -> Self {
        Self::new(&palette.name, palette.hexes())
    }

    /// Pretty JSON, as shown for copy/paste
    pub fn to_code(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `<base>?palette=<base64 json>`
    pub fn to_link(&self, base: &str) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            "{}?{}={}",
            base.trim_end_matches('?'),
            SHARE_QUERY_PARAM,
            STANDARD.encode(json)
        ))
    }

    /// Parse a share link produced by [`SharePayload::to_link`]
    pub fn from_link(link: &str) -> Result<Self> {
        let marker = format!("{}=", SHARE_QUERY_PARAM);
        let encoded = link
            .split(['?', '&'])
            .find_map(|part| part.strip_prefix(marker.as_str()))
            .ok_or_else(|| ThemeError::Parse("Link has no palette parameter".to_string()))?;

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| ThemeError::Parse(format!("Invalid share data: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Default download file name
    pub fn file_name(&self) -> String {
        format!("{}-palette.json", self.name)
    }
}

/// Themes as pretty JSON
pub fn themes_to_json(themes: &[Theme]) -> Result<String> {
    Ok(serde_json::to_string_pretty(themes)?)
}

/// Palettes as pretty JSON
pub fn palettes_to_json(palettes: &[Palette]) -> Result<String> {
    Ok(serde_json::to_string_pretty(palettes)?)
}

/// Write exported JSON to `path`, creating parent directories
pub fn write_export<P: AsRef<Path>>(path: P, json: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;
    Ok(())
}
