//! Page scanning
//!
//! Runs one pass over a [`PageInspector`] and returns the unique colors and fonts
//! found in computed styles. Colors are keyed by hex, the first original
//! spelling wins; fonts follow the de-duplication rules of [`crate::font`].

use crate::color::model::Color;
use crate::font::{extract_fonts, Font};
use crate::page::PageInspector;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Colors and fonts discovered on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub colors: Vec<Color>,
    pub fonts: Vec<Font>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.fonts.is_empty()
    }
}

/// Scan a page for unique colors and fonts
pub fn scan_page(inspector: &dyn PageInspector) -> ScanResult {
    let resolver = inspector.style_resolver();
    let mut seen = HashSet::new();
    let mut colors = Vec::new();

    for value in inspector.scan_colors() {
        if let Some(color) = Color::parse(&value, resolver) {
            if seen.insert(color.hex.clone()) {
                colors.push(color);
            }
        }
    }

    let fonts = extract_fonts(&inspector.scan_fonts());

    debug!(
        "Page scan complete: {} colors, {} fonts",
        colors.len(),
        fonts.len()
    );

    ScanResult { colors, fonts }
}
