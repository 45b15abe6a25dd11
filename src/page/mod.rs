//! Page abstraction
//!
//! The engine never touches a DOM directly. A host page is reached through two
//! traits so that every component can be exercised headless against an in-memory [`PageDump`]:
//!
//! - [`PageInspector`] - read-only: element enumeration, computed styles,
//!   pixel sampling for the color picker and area snap
//! - [`PageDocument`] - writable inline styles, used when applying a theme
//!
//! # Submodules
//!
//! - `scanner` - Turns raw computed styles into de-duplicated colors and fonts
//! - `dump` - In-memory page implementing both traits, loadable from JSON

pub mod dump;
pub mod scanner;

pub use dump::{DumpElement, PageDump};
pub use scanner::{scan_page, ScanResult};

use crate::color::model::StyleResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style properties that can carry a color
pub const COLOR_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "outline-color",
    "text-decoration-color",
];

/// Opaque handle to an element of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef(pub usize);

/// Computed style properties of one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedStyle {
    properties: BTreeMap<String, String>,
}

impl ComputedStyle {
    /// Create an empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, property: &str, value: &str) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property value
    pub fn set(&mut self, property: &str, value: &str) {
        self.properties
            .insert(property.to_string(), value.to_string());
    }

    /// Property value, empty when unset
    pub fn get(&self, property: &str) -> &str {
        self.properties
            .get(property)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterate over all properties
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.width)
            && y < self.y.saturating_add(self.height)
    }
}

/// Read access to a rendered page
pub trait PageInspector: Send + Sync {
    /// Every element in document order
    fn elements(&self) -> Vec<ElementRef>;

    /// Computed style of `element`, `None` if it no longer exists
    fn computed_style_of(&self, element: ElementRef) -> Option<ComputedStyle>;

    /// Host style computation used to resolve color names
    fn style_resolver(&self) -> &dyn StyleResolver;

    /// Rendered color at a viewport position
    fn color_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)>;

    /// Rendered pixels inside `rect`, row by row
    fn pixels_in(&self, rect: Rect) -> Vec<(u8, u8, u8)>;

    /// Raw color values of every color property of every element
    fn scan_colors(&self) -> Vec<String> {
        self.elements()
            .into_iter()
            .filter_map(|el| self.computed_style_of(el))
            .flat_map(|style| {
                COLOR_PROPERTIES
                    .iter()
                    .map(|prop| style.get(prop).to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Computed styles of every element, for font extraction
    fn scan_fonts(&self) -> Vec<ComputedStyle> {
        self.elements()
            .into_iter()
            .filter_map(|el| self.computed_style_of(el))
            .collect()
    }
}

/// Groups of elements a theme is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    /// The document body
    Body,
    /// Sections and container-like blocks
    Sections,
    /// Headings and inline/block text elements (color application)
    Text,
    /// Buttons and submit/button inputs
    Buttons,
    /// `h1` - `h6`
    Headings,
    /// Paragraphs, spans, divs and links (font application)
    BodyText,
}

impl ElementClass {
    /// CSS selector a browser host uses to query this class
    pub fn selector(&self) -> &'static str {
        match self {
            ElementClass::Body => "body",
            ElementClass::Sections => {
                "section, div[class*=\"section\"], div[class*=\"container\"]"
            }
            ElementClass::Text => "h1, h2, h3, h4, h5, h6, p, span, div, a",
            ElementClass::Buttons => "button, input[type=\"button\"], input[type=\"submit\"]",
            ElementClass::Headings => "h1, h2, h3, h4, h5, h6",
            ElementClass::BodyText => "p, span, div, a",
        }
    }
}

/// Write access to a page's inline styles
pub trait PageDocument {
    /// Elements of `class`, in document order
    fn query(&self, class: ElementClass) -> Vec<ElementRef>;

    /// Current inline value of `property`, empty when unset
    fn inline_style(&self, element: ElementRef, property: &str) -> String;

    /// Set an inline style property
    fn set_inline_style(&mut self, element: ElementRef, property: &str, value: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_style_defaults_to_empty() {
        let style = ComputedStyle::new().with("color", "red");
        assert_eq!(style.get("color"), "red");
        assert_eq!(style.get("background-color"), "");
        assert_eq!(style.iter().count(), 1);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(14, 14));
        assert!(!rect.contains(15, 10));
        assert!(!rect.contains(9, 12));
    }

    #[test]
    fn test_selectors() {
        assert_eq!(ElementClass::Body.selector(), "body");
        assert!(ElementClass::Buttons.selector().contains("button"));
    }

    #[test]
    fn test_computed_style_serializes_as_map() {
        let style = ComputedStyle::new().with("font-size", "16px");
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r#"{"font-size":"16px"}"#);
    }
}
