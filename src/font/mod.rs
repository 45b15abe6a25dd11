//! Font model
//!
//! Fonts are read from computed styles during a page scan. Each element yields
//! one candidate `Font`; candidates are normalized (first family name, quotes
//! stripped, `normal`/`bold` weights mapped to `400`/`700`) and de-duplicated
//! by `(lowercase name, size, weight, style)`, keeping encounter order.

use crate::page::ComputedStyle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Fonts served by Google Fonts that the picker links to directly
const GOOGLE_FONTS: &[&str] = &[
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Oswald",
    "Poppins",
    "Inter",
];

/// A normalized font record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    /// Primary family name, quotes stripped
    pub name: String,
    /// Computed size, e.g. `16px`
    pub size: String,
    /// Normalized weight (`400`, `700`, or the computed value)
    pub weight: String,
    /// `normal`, `italic`, `oblique`, ...
    pub style: String,
}

/// De-duplication key of a font
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontKey {
    pub name: String,
    pub size: String,
    pub weight: String,
    pub style: String,
}

impl Font {
    /// Build a font, normalizing the weight
    pub fn new(name: &str, size: &str, weight: &str, style: &str) -> Self {
        Self {
            name: name.to_string(),
            size: size.to_string(),
            weight: normalize_weight(weight),
            style: style.to_string(),
        }
    }

    /// Build a font from raw computed values.
    ///
    /// Returns `None` when the family is empty, `inherit` or `initial`.
    pub fn from_computed(family: &str, size: &str, weight: &str, style: &str) -> Option<Self> {
        let family = family.trim();
        if family.is_empty() || family == "inherit" || family == "initial" {
            return None;
        }

        let name = primary_family(family);
        if name.is_empty() {
            return None;
        }

        Some(Self::new(&name, size.trim(), weight.trim(), style.trim()))
    }

    /// Identity key used for de-duplication
    pub fn key(&self) -> FontKey {
        FontKey {
            name: self.name.to_lowercase(),
            size: self.size.clone(),
            weight: normalize_weight(&self.weight),
            style: self.style.clone(),
        }
    }

    /// Whether the font is available from Google Fonts
    pub fn is_google_font(&self) -> bool {
        is_google_font(&self.name)
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.name, self.size, self.weight, self.style)
    }
}

/// Map `normal` to `400` and `bold` to `700`; other weights pass through
pub fn normalize_weight(weight: &str) -> String {
    match weight.trim() {
        "400" | "normal" => "400".to_string(),
        "700" | "bold" => "700".to_string(),
        other => other.to_string(),
    }
}

/// First name of a `font-family` list, quotes stripped
pub fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .next()
        .unwrap_or("")
        .replace(['"', '\''], "")
        .trim()
        .to_string()
}

/// Extract unique fonts from computed styles, in encounter order
pub fn extract_fonts(styles: &[ComputedStyle]) -> Vec<Font> {
    let mut inventory = FontInventory::new();
    for style in styles {
        if let Some(font) = Font::from_computed(
            style.get("font-family"),
            style.get("font-size"),
            style.get("font-weight"),
            style.get("font-style"),
        ) {
            inventory.add(font);
        }
    }
    inventory.into_fonts()
}

/// Ordered, de-duplicated collection of fonts
#[derive(Debug, Clone, Default)]
pub struct FontInventory {
    fonts: Vec<Font>,
    keys: HashSet<FontKey>,
}

impl FontInventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font. Returns `false` if an equivalent font was already present.
    pub fn add(&mut self, font: Font) -> bool {
        if self.keys.insert(font.key()) {
            self.fonts.push(font);
            true
        } else {
            false
        }
    }

    /// Fonts in encounter order
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Consume the inventory
    pub fn into_fonts(self) -> Vec<Font> {
        self.fonts
    }
}

/// Whether `name` is one of the known Google Fonts families
pub fn is_google_font(name: &str) -> bool {
    GOOGLE_FONTS.iter().any(|f| f.eq_ignore_ascii_case(name.trim()))
}

/// Google Fonts specimen page for `name`
pub fn google_font_link(name: &str) -> String {
    let encoded: String = name
        .trim()
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("https://fonts.google.com/specimen/{}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(family: &str, size: &str, weight: &str, font_style: &str) -> ComputedStyle {
        ComputedStyle::new()
            .with("font-family", family)
            .with("font-size", size)
            .with("font-weight", weight)
            .with("font-style", font_style)
    }

    #[test]
    fn test_normalize_weight() {
        assert_eq!(normalize_weight("normal"), "400");
        assert_eq!(normalize_weight("400"), "400");
        assert_eq!(normalize_weight("bold"), "700");
        assert_eq!(normalize_weight("700"), "700");
        assert_eq!(normalize_weight("300"), "300");
        assert_eq!(normalize_weight("bolder"), "bolder");
    }

    #[test]
    fn test_primary_family() {
        assert_eq!(primary_family("\"Open Sans\", Arial, sans-serif"), "Open Sans");
        assert_eq!(primary_family("'Inter'"), "Inter");
        assert_eq!(primary_family("  Georgia , serif"), "Georgia");
    }

    #[test]
    fn test_same_tuple_twice_yields_one_font() {
        let styles = vec![
            style("Roboto, sans-serif", "16px", "400", "normal"),
            style("Roboto, sans-serif", "16px", "400", "normal"),
        ];
        assert_eq!(extract_fonts(&styles).len(), 1);
    }

    #[test]
    fn test_dedup_normalizes_name_case_and_weight() {
        let styles = vec![
            style("Roboto", "16px", "normal", "normal"),
            style("roboto", "16px", "400", "normal"),
            style("ROBOTO", "16px", "bold", "normal"),
            style("Roboto", "16px", "700", "normal"),
        ];
        let fonts = extract_fonts(&styles);
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].name, "Roboto");
        assert_eq!(fonts[0].weight, "400");
        assert_eq!(fonts[1].name, "ROBOTO");
        assert_eq!(fonts[1].weight, "700");
    }

    #[test]
    fn test_style_and_size_distinguish_fonts() {
        let styles = vec![
            style("Lato", "16px", "400", "normal"),
            style("Lato", "16px", "400", "italic"),
            style("Lato", "18px", "400", "normal"),
        ];
        assert_eq!(extract_fonts(&styles).len(), 3);
    }

    #[test]
    fn test_inherit_and_initial_skipped() {
        let styles = vec![
            style("inherit", "16px", "400", "normal"),
            style("initial", "16px", "400", "normal"),
            style("", "16px", "400", "normal"),
            style("Georgia", "16px", "400", "normal"),
        ];
        let fonts = extract_fonts(&styles);
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].name, "Georgia");
    }

    #[test]
    fn test_inventory_add_reports_duplicates() {
        let mut inventory = FontInventory::new();
        assert!(inventory.add(Font::new("Inter", "14px", "normal", "normal")));
        assert!(!inventory.add(Font::new("inter", "14px", "400", "normal")));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_google_fonts() {
        assert!(is_google_font("Open Sans"));
        assert!(is_google_font("poppins"));
        assert!(!is_google_font("Comic Sans MS"));
        assert_eq!(
            google_font_link("Open Sans"),
            "https://fonts.google.com/specimen/Open%20Sans"
        );
    }
}
