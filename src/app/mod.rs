//! Application controller
//!
//! All popup state lives in one [`AppState`] owned by [`AppController`]. Every
//! user action is a method that mutates the state and returns a
//! [`RenderInstruction`] telling the front-end what to redraw.
//!
//! Selection sets hold indices into the array they select from. They are
//! cleared when a new extraction replaces the arrays, when another theme is
//! opened, and after a successful save or apply.

use crate::color::model::Color;
use crate::core::error::ThemeError;
use crate::font::Font;
use crate::page::{scan_page, PageDocument, PageInspector};
use crate::theme::applier::{apply, ApplyOptions};
use crate::theme::store::{Theme, ThemeStore};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeSet;

// =============================================================================
// State
// =============================================================================

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Loading,
    Success,
    Error,
}

/// Explicit popup state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub extracted_colors: Vec<Color>,
    pub extracted_fonts: Vec<Font>,
    pub selected_colors: BTreeSet<usize>,
    pub selected_fonts: BTreeSet<usize>,
    /// Id of the theme under view
    pub current_theme: Option<i64>,
    pub selected_theme_colors: BTreeSet<usize>,
    pub selected_theme_fonts: BTreeSet<usize>,
    /// Last status line
    pub status: Option<(StatusLevel, String)>,
}

impl AppState {
    /// Colors picked from the extraction, in index order
    pub fn selected_colors(&self) -> Vec<Color> {
        pick(&self.extracted_colors, &self.selected_colors)
    }

    /// Fonts picked from the extraction, in index order
    pub fn selected_fonts(&self) -> Vec<Font> {
        pick(&self.extracted_fonts, &self.selected_fonts)
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_colors.is_empty() || !self.selected_fonts.is_empty()
    }

    fn clear_selection(&mut self) {
        self.selected_colors.clear();
        self.selected_fonts.clear();
    }

    fn clear_theme_selection(&mut self) {
        self.selected_theme_colors.clear();
        self.selected_theme_fonts.clear();
    }
}

fn pick<T: Clone>(items: &[T], indices: &BTreeSet<usize>) -> Vec<T> {
    indices.iter().filter_map(|&i| items.get(i).cloned()).collect()
}

fn toggle(set: &mut BTreeSet<usize>, index: usize, len: usize) {
    if index >= len {
        return;
    }
    if !set.remove(&index) {
        set.insert(index);
    }
}

/// What the front-end should redraw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "render", rename_all = "camelCase")]
pub enum RenderInstruction {
    /// New extraction results
    Extracted { colors: Vec<Color>, fonts: Vec<Font> },
    /// Selection highlights changed
    Selection {
        colors: BTreeSet<usize>,
        fonts: BTreeSet<usize>,
    },
    /// The saved theme list changed
    SavedThemes { themes: Vec<Theme> },
    /// A theme is open, with its own selection
    ThemeDetails {
        theme: Theme,
        colors: BTreeSet<usize>,
        fonts: BTreeSet<usize>,
    },
    /// Show a status line only
    Status { level: StatusLevel, message: String },
}

// =============================================================================
// Controller
// =============================================================================

/// Owns the state and the theme store
pub struct AppController {
    state: AppState,
    themes: ThemeStore,
}

impl AppController {
    pub fn new(themes: ThemeStore) -> Self {
        Self {
            state: AppState::default(),
            themes,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn themes(&self) -> &[Theme] {
        self.themes.list()
    }

    fn status(&mut self, level: StatusLevel, message: impl Into<String>) -> RenderInstruction {
        let message = message.into();
        self.state.status = Some((level, message.clone()));
        RenderInstruction::Status { level, message }
    }

    fn selection(&self) -> RenderInstruction {
        RenderInstruction::Selection {
            colors: self.state.selected_colors.clone(),
            fonts: self.state.selected_fonts.clone(),
        }
    }

    fn saved_themes(&self) -> RenderInstruction {
        RenderInstruction::SavedThemes {
            themes: self.themes.list().to_vec(),
        }
    }

    fn current_theme(&self) -> Option<&Theme> {
        self.state.current_theme.and_then(|id| self.themes.get(id))
    }

    fn theme_details(&self) -> RenderInstruction {
        match self.current_theme() {
            Some(theme) => RenderInstruction::ThemeDetails {
                theme: theme.clone(),
                colors: self.state.selected_theme_colors.clone(),
                fonts: self.state.selected_theme_fonts.clone(),
            },
            None => self.saved_themes(),
        }
    }

    // -------------------------------------------------------------------------
    // Extraction
    // -------------------------------------------------------------------------

    /// Scan the page and replace the extracted arrays
    pub fn extract(&mut self, inspector: &dyn PageInspector) -> RenderInstruction {
        let result = scan_page(inspector);
        let message = format!(
            "Extracted {} colors and {} fonts!",
            result.colors.len(),
            result.fonts.len()
        );
        info!("{}", message);

        self.state.extracted_colors = result.colors;
        self.state.extracted_fonts = result.fonts;
        self.state.clear_selection();
        self.state.status = Some((StatusLevel::Success, message));

        RenderInstruction::Extracted {
            colors: self.state.extracted_colors.clone(),
            fonts: self.state.extracted_fonts.clone(),
        }
    }

    pub fn toggle_color(&mut self, index: usize) -> RenderInstruction {
        let len = self.state.extracted_colors.len();
        toggle(&mut self.state.selected_colors, index, len);
        self.selection()
    }

    pub fn toggle_font(&mut self, index: usize) -> RenderInstruction {
        let len = self.state.extracted_fonts.len();
        toggle(&mut self.state.selected_fonts, index, len);
        self.selection()
    }

    pub fn select_all_colors(&mut self) -> RenderInstruction {
        self.state.selected_colors = (0..self.state.extracted_colors.len()).collect();
        self.selection()
    }

    pub fn deselect_all_colors(&mut self) -> RenderInstruction {
        self.state.selected_colors.clear();
        self.selection()
    }

    pub fn select_all_fonts(&mut self) -> RenderInstruction {
        self.state.selected_fonts = (0..self.state.extracted_fonts.len()).collect();
        self.selection()
    }

    pub fn deselect_all_fonts(&mut self) -> RenderInstruction {
        self.state.selected_fonts.clear();
        self.selection()
    }

    // -------------------------------------------------------------------------
    // Saved themes
    // -------------------------------------------------------------------------

    /// Save the current selection as a theme
    pub fn save_theme(&mut self, name: &str) -> RenderInstruction {
        let colors = self.state.selected_colors();
        let fonts = self.state.selected_fonts();

        match self.themes.save(name, colors, fonts) {
            Ok(theme) => {
                self.state.clear_selection();
                self.state.status = Some((
                    StatusLevel::Success,
                    format!("Theme \"{}\" saved successfully!", theme.name),
                ));
                self.saved_themes()
            }
            Err(ThemeError::DuplicateName(_)) => {
                self.status(StatusLevel::Error, "Theme name already exists!")
            }
            Err(e) if e.is_input_error() => self.status(StatusLevel::Error, e.to_string()),
            Err(e) => {
                warn!("Theme save not persisted: {}", e);
                self.status(StatusLevel::Error, format!("Failed to save theme: {}", e))
            }
        }
    }

    /// Open a theme; its selection starts empty
    pub fn view_theme(&mut self, id: i64) -> RenderInstruction {
        if self.themes.get(id).is_none() {
            return self.status(StatusLevel::Error, ThemeError::ThemeNotFound(id).to_string());
        }
        self.state.current_theme = Some(id);
        self.state.clear_theme_selection();
        self.theme_details()
    }

    pub fn toggle_theme_color(&mut self, index: usize) -> RenderInstruction {
        let len = self.current_theme().map_or(0, |t| t.colors.len());
        toggle(&mut self.state.selected_theme_colors, index, len);
        self.theme_details()
    }

    pub fn toggle_theme_font(&mut self, index: usize) -> RenderInstruction {
        let len = self.current_theme().map_or(0, |t| t.fonts.len());
        toggle(&mut self.state.selected_theme_fonts, index, len);
        self.theme_details()
    }

    pub fn select_all_theme_colors(&mut self) -> RenderInstruction {
        let len = self.current_theme().map_or(0, |t| t.colors.len());
        self.state.selected_theme_colors = (0..len).collect();
        self.theme_details()
    }

    pub fn deselect_all_theme_colors(&mut self) -> RenderInstruction {
        self.state.selected_theme_colors.clear();
        self.theme_details()
    }

    pub fn select_all_theme_fonts(&mut self) -> RenderInstruction {
        let len = self.current_theme().map_or(0, |t| t.fonts.len());
        self.state.selected_theme_fonts = (0..len).collect();
        self.theme_details()
    }

    pub fn deselect_all_theme_fonts(&mut self) -> RenderInstruction {
        self.state.selected_theme_fonts.clear();
        self.theme_details()
    }

    /// Apply the selected part of the open theme to `document`
    pub fn apply_selected(
        &mut self,
        document: &mut dyn PageDocument,
        options: ApplyOptions,
    ) -> RenderInstruction {
        let Some(theme) = self.current_theme() else {
            return self.status(StatusLevel::Error, "No theme selected to apply!");
        };

        let colors = pick(&theme.colors, &self.state.selected_theme_colors);
        let fonts = pick(&theme.fonts, &self.state.selected_theme_fonts);
        if colors.is_empty() && fonts.is_empty() {
            return self.status(
                StatusLevel::Error,
                "Please select at least one color or font to apply!",
            );
        }

        apply(document, &colors, &fonts, options);
        self.state.clear_theme_selection();
        self.status(
            StatusLevel::Success,
            format!(
                "Applied {} colors and {} fonts successfully!",
                colors.len(),
                fonts.len()
            ),
        )
    }

    /// Delete a theme. The caller has already confirmed.
    pub fn delete_theme(&mut self, id: i64) -> RenderInstruction {
        match self.themes.delete(id) {
            Ok(_) => {
                if self.state.current_theme == Some(id) {
                    self.state.current_theme = None;
                    self.state.clear_theme_selection();
                }
                self.state.status =
                    Some((StatusLevel::Success, "Theme deleted successfully!".to_string()));
                self.saved_themes()
            }
            Err(e) => self.status(StatusLevel::Error, e.to_string()),
        }
    }

    /// Delete every theme. The caller has already confirmed.
    pub fn clear_all(&mut self) -> RenderInstruction {
        self.state.current_theme = None;
        self.state.clear_theme_selection();
        match self.themes.clear_all() {
            Ok(()) => {
                self.state.status = Some((StatusLevel::Success, "All themes cleared!".to_string()));
                self.saved_themes()
            }
            Err(e) => self.status(StatusLevel::Error, e.to_string()),
        }
    }
}
