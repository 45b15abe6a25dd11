//! Theme application
//!
//! Pushes selected colors and fonts onto a page as inline styles. The first
//! color and the first font are primary and go to the body. Further elements of
//! each class take entries round-robin by their position in the queried list
//! (`index % len`). Text colors are only written where the element has no
//! inline color of its own (empty or `inherit`), so explicit author styling is
//! preserved. Nothing is recorded for undo. [`apply_theme`] is the narrower
//! whole-theme path: primary color and primary font only.

use crate::color::model::Color;
use crate::font::Font;
use crate::page::{ElementClass, PageDocument};
use crate::theme::store::Theme;
use log::debug;
use serde::{Deserialize, Serialize};

/// Text color written on styled buttons
pub const BUTTON_TEXT_COLOR: &str = "#ffffff";

/// Which element groups receive colors. Fonts are always applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOptions {
    pub apply_to_background: bool,
    pub apply_to_text: bool,
    pub apply_to_buttons: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            apply_to_background: true,
            apply_to_text: true,
            apply_to_buttons: true,
        }
    }
}

/// Counts of what an application touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Body and section backgrounds written
    pub backgrounds: usize,
    /// Text elements recolored
    pub text_colored: usize,
    /// Text elements left alone because of an inline color
    pub text_preserved: usize,
    pub buttons: usize,
    /// Elements that received a font family
    pub fonts: usize,
}

impl ApplyReport {
    /// Whether nothing was written
    pub fn is_noop(&self) -> bool {
        self.backgrounds == 0 && self.text_colored == 0 && self.buttons == 0 && self.fonts == 0
    }
}

/// Apply `colors` and `fonts` to `document`.
///
/// An empty selection is a no-op, not a reset.
pub fn apply(
    document: &mut dyn PageDocument,
    colors: &[Color],
    fonts: &[Font],
    options: ApplyOptions,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    if let Some(primary) = colors.first() {
        let secondary = &colors[1..];

        if options.apply_to_background {
            for body in document.query(ElementClass::Body) {
                document.set_inline_style(body, "background-color", &primary.hex);
                report.backgrounds += 1;
            }

            if !secondary.is_empty() {
                for (i, section) in document.query(ElementClass::Sections).into_iter().enumerate() {
                    let color = &secondary[i % secondary.len()];
                    document.set_inline_style(section, "background-color", &color.hex);
                    report.backgrounds += 1;
                }
            }
        }

        if options.apply_to_text {
            for (i, element) in document.query(ElementClass::Text).into_iter().enumerate() {
                let current = document.inline_style(element, "color");
                if current.is_empty() || current == "inherit" {
                    let color = &colors[i % colors.len()];
                    document.set_inline_style(element, "color", &color.hex);
                    report.text_colored += 1;
                } else {
                    report.text_preserved += 1;
                }
            }
        }

        if options.apply_to_buttons {
            for (i, button) in document.query(ElementClass::Buttons).into_iter().enumerate() {
                let color = &colors[i % colors.len()];
                document.set_inline_style(button, "background-color", &color.hex);
                document.set_inline_style(button, "color", BUTTON_TEXT_COLOR);
                report.buttons += 1;
            }
        }
    }

    apply_fonts(document, fonts, true, &mut report);

    debug!("Theme applied: {:?}", report);
    report
}

fn apply_fonts(
    document: &mut dyn PageDocument,
    fonts: &[Font],
    heading_size: bool,
    report: &mut ApplyReport,
) {
    if let Some(primary) = fonts.first() {
        for body in document.query(ElementClass::Body) {
            document.set_inline_style(body, "font-family", &primary.name);
            document.set_inline_style(body, "font-size", &primary.size);
            document.set_inline_style(body, "font-weight", &primary.weight);
            document.set_inline_style(body, "font-style", &primary.style);
            report.fonts += 1;
        }

        for (i, heading) in document.query(ElementClass::Headings).into_iter().enumerate() {
            let font = &fonts[i % fonts.len()];
            document.set_inline_style(heading, "font-family", &font.name);
            document.set_inline_style(heading, "font-weight", &font.weight);
            if heading_size {
                document.set_inline_style(heading, "font-size", &font.size);
            }
            report.fonts += 1;
        }

        for (i, element) in document.query(ElementClass::BodyText).into_iter().enumerate() {
            let font = &fonts[i % fonts.len()];
            document.set_inline_style(element, "font-family", &font.name);
            report.fonts += 1;
        }
    }
}

/// Apply a whole theme through its primary color and primary font only.
///
/// Every element group is enabled. Sections keep their backgrounds and
/// headings keep their font size.
pub fn apply_theme(document: &mut dyn PageDocument, theme: &Theme) -> ApplyReport {
    let mut report = apply(
        document,
        &theme.colors[..theme.colors.len().min(1)],
        &[],
        ApplyOptions::default(),
    );
    apply_fonts(
        document,
        &theme.fonts[..theme.fonts.len().min(1)],
        false,
        &mut report,
    );

    debug!("Whole theme '{}' applied: {:?}", theme.name, report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{DumpElement, ElementRef, PageDump};

    fn colors(hexes: &[&str]) -> Vec<Color> {
        hexes.iter().filter_map(|h| Color::from_hex(h)).collect()
    }

    fn page() -> PageDump {
        PageDump::new()
            .with(DumpElement::new("body")) // 0
            .with(DumpElement::new("section")) // 1
            .with(DumpElement::new("div").class("container")) // 2
            .with(DumpElement::new("h1")) // 3
            .with(DumpElement::new("p").inline("color", "red")) // 4
            .with(DumpElement::new("span").inline("color", "inherit")) // 5
            .with(DumpElement::new("button")) // 6
            .with(DumpElement::new("input").input_type("submit")) // 7
    }

    #[test]
    fn test_background_primary_and_secondary() {
        let mut page = page();
        apply(
            &mut page,
            &colors(&["#111111", "#222222", "#333333"]),
            &[],
            ApplyOptions::default(),
        );
        assert_eq!(page.inline_of(ElementRef(0), "background-color"), Some("#111111"));
        assert_eq!(page.inline_of(ElementRef(1), "background-color"), Some("#222222"));
        assert_eq!(page.inline_of(ElementRef(2), "background-color"), Some("#333333"));
    }

    #[test]
    fn test_single_color_leaves_sections() {
        let mut page = page();
        let report = apply(&mut page, &colors(&["#111111"]), &[], ApplyOptions::default());
        assert_eq!(page.inline_of(ElementRef(1), "background-color"), None);
        assert_eq!(report.backgrounds, 1);
    }

    #[test]
    fn test_text_respects_inline_color() {
        let mut page = page();
        let report = apply(
            &mut page,
            &colors(&["#111111", "#222222"]),
            &[],
            ApplyOptions::default(),
        );
        // Text list: div(2), h1(3), p(4), span(5)
        assert_eq!(page.inline_of(ElementRef(2), "color"), Some("#111111"));
        assert_eq!(page.inline_of(ElementRef(3), "color"), Some("#222222"));
        assert_eq!(page.inline_of(ElementRef(4), "color"), Some("red"));
        assert_eq!(page.inline_of(ElementRef(5), "color"), Some("#222222"));
        assert_eq!(report.text_colored, 3);
        assert_eq!(report.text_preserved, 1);
    }

    #[test]
    fn test_buttons_cycle_colors() {
        let mut page = page();
        apply(
            &mut page,
            &colors(&["#111111", "#222222"]),
            &[],
            ApplyOptions::default(),
        );
        assert_eq!(page.inline_of(ElementRef(6), "background-color"), Some("#111111"));
        assert_eq!(page.inline_of(ElementRef(7), "background-color"), Some("#222222"));
        assert_eq!(page.inline_of(ElementRef(7), "color"), Some(BUTTON_TEXT_COLOR));
    }

    #[test]
    fn test_options_disable_groups() {
        let mut page = page();
        let report = apply(
            &mut page,
            &colors(&["#111111"]),
            &[],
            ApplyOptions {
                apply_to_background: false,
                apply_to_text: true,
                apply_to_buttons: false,
            },
        );
        assert_eq!(page.inline_of(ElementRef(0), "background-color"), None);
        assert_eq!(page.inline_of(ElementRef(6), "background-color"), None);
        assert_eq!(report.buttons, 0);
        assert!(report.text_colored > 0);
    }

    #[test]
    fn test_fonts() {
        let mut page = page();
        let fonts = vec![
            Font::new("Inter", "16px", "normal", "normal"),
            Font::new("Playfair Display", "32px", "bold", "italic"),
        ];
        apply(&mut page, &[], &fonts, ApplyOptions::default());

        assert_eq!(page.inline_of(ElementRef(0), "font-family"), Some("Inter"));
        assert_eq!(page.inline_of(ElementRef(0), "font-weight"), Some("400"));
        assert_eq!(page.inline_of(ElementRef(0), "font-style"), Some("normal"));

        // First heading takes fonts[0]
        assert_eq!(page.inline_of(ElementRef(3), "font-family"), Some("Inter"));
        assert_eq!(page.inline_of(ElementRef(3), "font-size"), Some("16px"));

        // Body text list: div(2), p(4), span(5)
        assert_eq!(page.inline_of(ElementRef(4), "font-family"), Some("Playfair Display"));
        assert_eq!(page.inline_of(ElementRef(5), "font-family"), Some("Inter"));
        assert_eq!(page.inline_of(ElementRef(4), "font-size"), None);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut page = page();
        let report = apply(&mut page, &[], &[], ApplyOptions::default());
        assert!(report.is_noop());
        assert_eq!(page.inline_of(ElementRef(0), "background-color"), None);
        assert_eq!(page.inline_of(ElementRef(4), "color"), Some("red"));
    }

    #[test]
    fn test_apply_theme_uses_primary_entries_only() {
        let mut page = page();
        let theme = Theme {
            id: 2,
            name: "Dusk".to_string(),
            colors: colors(&["#111111", "#222222", "#333333"]),
            fonts: vec![
                Font::new("Inter", "16px", "400", "normal"),
                Font::new("Lora", "32px", "700", "italic"),
            ],
            created_at: String::new(),
        };
        let report = apply_theme(&mut page, &theme);

        assert_eq!(page.inline_of(ElementRef(0), "background-color"), Some("#111111"));
        assert_eq!(page.inline_of(ElementRef(1), "background-color"), None);
        assert_eq!(page.inline_of(ElementRef(3), "color"), Some("#111111"));
        assert_eq!(page.inline_of(ElementRef(7), "background-color"), Some("#111111"));
        assert_eq!(report.backgrounds, 1);

        assert_eq!(page.inline_of(ElementRef(4), "font-family"), Some("Inter"));
        assert_eq!(page.inline_of(ElementRef(3), "font-family"), Some("Inter"));
        assert_eq!(page.inline_of(ElementRef(3), "font-size"), None);
        assert_eq!(page.inline_of(ElementRef(0), "font-size"), Some("16px"));
    }

    #[test]
    fn test_apply_theme() {
        let mut page = page();
        let theme = Theme {
            id: 1,
            name: "Ocean".to_string(),
            colors: colors(&["#0077be"]),
            fonts: vec![Font::new("Lato", "16px", "400", "normal")],
            created_at: String::new(),
        };
        let report = apply_theme(&mut page, &theme);
        assert_eq!(report.buttons, 2);
        assert_eq!(page.inline_of(ElementRef(0), "background-color"), Some("#0077be"));
        assert_eq!(page.inline_of(ElementRef(3), "font-family"), Some("Lato"));
    }
}
