//! Page dumps
//!
//! `PageDump` is a captured page: a flat list of elements with computed and
//! inline styles plus an optional rendered pixel buffer. It implements both
//! [`PageInspector`] and [`PageDocument`], so the CLI can scan, snap and theme
//! a page saved as JSON, and tests can build pages without a browser.

use crate::color::model::StyleResolver;
use crate::color::named::CssNamedColors;
use crate::page::{ComputedStyle, ElementClass, ElementRef, PageDocument, PageInspector, Rect};
use serde::Deserialize;
use std::collections::BTreeMap;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const BODY_TEXT_TAGS: &[&str] = &["p", "span", "div", "a"];

/// One captured element
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpElement {
    /// Lowercase tag name
    pub tag: String,
    /// Space separated class list
    #[serde(rename = "class")]
    pub class_name: String,
    /// `type` attribute for inputs
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    /// Computed style as reported by the host
    #[serde(rename = "style")]
    pub computed: ComputedStyle,
    /// Inline style set on the element
    pub inline: BTreeMap<String, String>,
}

impl DumpElement {
    /// Create an element with the given tag
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn input_type(mut self, input_type: &str) -> Self {
        self.input_type = Some(input_type.to_string());
        self
    }

    pub fn computed(mut self, style: ComputedStyle) -> Self {
        self.computed = style;
        self
    }

    /// Pre-set an inline style (author styling)
    pub fn inline(mut self, property: &str, value: &str) -> Self {
        self.inline.insert(property.to_string(), value.to_string());
        self
    }

    fn matches(&self, class: ElementClass) -> bool {
        let tag = self.tag.as_str();
        match class {
            ElementClass::Body => tag == "body",
            ElementClass::Sections => {
                tag == "section"
                    || (tag == "div"
                        && (self.class_name.contains("section")
                            || self.class_name.contains("container")))
            }
            ElementClass::Text => HEADING_TAGS.contains(&tag) || BODY_TEXT_TAGS.contains(&tag),
            ElementClass::Buttons => {
                tag == "button"
                    || (tag == "input"
                        && matches!(self.input_type.as_deref(), Some("button") | Some("submit")))
            }
            ElementClass::Headings => HEADING_TAGS.contains(&tag),
            ElementClass::BodyText => BODY_TEXT_TAGS.contains(&tag),
        }
    }
}

/// In-memory page, built in code or loaded from JSON:
///
/// ```json
/// {
///   "elements": [{"tag": "body", "style": {"background-color": "#fff"}}],
///   "width": 1, "height": 1, "pixels": [[255, 255, 255]]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageDump {
    elements: Vec<DumpElement>,
    width: u32,
    height: u32,
    pixels: Vec<(u8, u8, u8)>,
}

impl PageDump {
    /// Create an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `div` with the given computed style
    pub fn with_element(self, style: ComputedStyle) -> Self {
        self.with(DumpElement::new("div").computed(style))
    }

    /// Add an element
    pub fn with(mut self, element: DumpElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Attach a rendered pixel buffer (row-major, `width * height` entries)
    pub fn with_pixels(mut self, width: u32, height: u32, pixels: Vec<(u8, u8, u8)>) -> Self {
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        self
    }

    /// Parse a JSON page dump
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut page: PageDump = serde_json::from_str(json)?;
        for element in &mut page.elements {
            element.tag = element.tag.to_ascii_lowercase();
        }
        Ok(page)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// A small landing page used across tests
    pub fn sample() -> Self {
        let text = |family: &str, size: &str, weight: &str| {
            ComputedStyle::new()
                .with("color", "rgb(33, 37, 41)")
                .with("font-family", family)
                .with("font-size", size)
                .with("font-weight", weight)
                .with("font-style", "normal")
        };

        Self::new()
            .with(
                DumpElement::new("body").computed(
                    text("Inter, sans-serif", "16px", "normal")
                        .with("background-color", "#FFFFFF"),
                ),
            )
            .with(DumpElement::new("section").computed(
                text("Inter, sans-serif", "16px", "400").with("background-color", "rgb(248, 249, 250)"),
            ))
            .with(DumpElement::new("h1").computed(text("\"Playfair Display\", serif", "32px", "bold")))
            .with(DumpElement::new("p").computed(text("Inter, sans-serif", "16px", "400")))
            .with(
                DumpElement::new("a")
                    .computed(text("Inter, sans-serif", "16px", "400").with("color", "royalblue")),
            )
            .with(
                DumpElement::new("button").computed(
                    text("Inter, sans-serif", "14px", "600")
                        .with("background-color", "rgba(13, 110, 253, 1)")
                        .with("border-color", "rgba(0, 0, 0, 0)"),
                ),
            )
    }

    /// Element by handle
    pub fn element(&self, element: ElementRef) -> Option<&DumpElement> {
        self.elements.get(element.0)
    }

    /// Inline style of an element, if set
    pub fn inline_of(&self, element: ElementRef, property: &str) -> Option<&str> {
        self.element(element)
            .and_then(|el| el.inline.get(property))
            .map(String::as_str)
    }
}

impl PageInspector for PageDump {
    fn elements(&self) -> Vec<ElementRef> {
        (0..self.elements.len()).map(ElementRef).collect()
    }

    fn computed_style_of(&self, element: ElementRef) -> Option<ComputedStyle> {
        self.elements.get(element.0).map(|el| el.computed.clone())
    }

    fn style_resolver(&self) -> &dyn StyleResolver {
        &CssNamedColors
    }

    fn color_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    fn pixels_in(&self, rect: Rect) -> Vec<(u8, u8, u8)> {
        let mut out = Vec::new();
        for y in rect.y..rect.y.saturating_add(rect.height).min(self.height) {
            for x in rect.x..rect.x.saturating_add(rect.width).min(self.width) {
                if let Some(px) = self.color_at(x, y) {
                    out.push(px);
                }
            }
        }
        out
    }
}

impl PageDocument for PageDump {
    fn query(&self, class: ElementClass) -> Vec<ElementRef> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(class))
            .map(|(i, _)| ElementRef(i))
            .collect()
    }

    fn inline_style(&self, element: ElementRef, property: &str) -> String {
        self.inline_of(element, property).unwrap_or("").to_string()
    }

    fn set_inline_style(&mut self, element: ElementRef, property: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(element.0) {
            el.inline.insert(property.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_classes() {
        let page = PageDump::new()
            .with(DumpElement::new("body"))
            .with(DumpElement::new("div").class("main-container"))
            .with(DumpElement::new("h2"))
            .with(DumpElement::new("input").input_type("submit"))
            .with(DumpElement::new("input").input_type("text"));

        assert_eq!(page.query(ElementClass::Body), vec![ElementRef(0)]);
        assert_eq!(page.query(ElementClass::Sections), vec![ElementRef(1)]);
        assert_eq!(
            page.query(ElementClass::Text),
            vec![ElementRef(1), ElementRef(2)]
        );
        assert_eq!(page.query(ElementClass::Buttons), vec![ElementRef(3)]);
        assert_eq!(page.query(ElementClass::Headings), vec![ElementRef(2)]);
    }

    #[test]
    fn test_pixels() {
        let page = PageDump::new().with_pixels(
            2,
            2,
            vec![(1, 1, 1), (2, 2, 2), (3, 3, 3), (4, 4, 4)],
        );
        assert_eq!(page.color_at(1, 1), Some((4, 4, 4)));
        assert_eq!(page.color_at(2, 0), None);
        assert_eq!(
            page.pixels_in(Rect::new(1, 0, 5, 5)),
            vec![(2, 2, 2), (4, 4, 4)]
        );
    }

    #[test]
    fn test_inline_styles() {
        let mut page = PageDump::new().with(DumpElement::new("p").inline("color", "red"));
        assert_eq!(page.inline_style(ElementRef(0), "color"), "red");
        page.set_inline_style(ElementRef(0), "color", "#000000");
        assert_eq!(page.inline_of(ElementRef(0), "color"), Some("#000000"));
        assert_eq!(page.inline_style(ElementRef(0), "font-family"), "");
    }

    #[test]
    fn test_from_json() {
        let page = PageDump::from_json(
            r##"{
                "elements": [
                    {"tag": "BODY", "style": {"background-color": "#FFFFFF"}},
                    {"tag": "input", "type": "submit", "class": "cta"}
                ],
                "width": 1,
                "height": 1,
                "pixels": [[10, 20, 30]]
            }"##,
        )
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.query(ElementClass::Body), vec![ElementRef(0)]);
        assert_eq!(page.query(ElementClass::Buttons), vec![ElementRef(1)]);
        assert_eq!(page.color_at(0, 0), Some((10, 20, 30)));
        assert_eq!(page.scan_colors(), vec!["#FFFFFF".to_string()]);
    }
}
