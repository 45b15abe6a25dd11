//! Theme Picker Library
//!
//! Extracts the colors and fonts a web page uses, audits them for WCAG
//! contrast, generates harmonic palettes, and stores named themes and
//! palettes that can be re-applied to other pages.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration, error handling and key-value storage
//! - [`color`] - Color parsing, format conversions, contrast, vision simulation
//! - [`font`] - Font normalization and de-duplication
//! - [`page`] - Page abstraction (`PageInspector`, `PageDocument`), JSON page dumps and scanning
//! - [`palette`] - Quantizer, harmonic generator and palette store
//! - [`audit`] - WCAG contrast audit of a color set
//! - [`theme`] - Theme store, theme application and export/sharing
//! - [`messaging`] - Request/response bus and the background service
//! - [`app`] - Popup state and the controller driving it
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - Seeded pixel generators for headless testing
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use theme_picker::app::AppController;
//! use theme_picker::core::config::Config;
//! use theme_picker::core::storage::JsonFileStore;
//! use theme_picker::page::PageDump;
//! use theme_picker::theme::ThemeStore;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let store = Arc::new(JsonFileStore::new(&config.storage.path));
//!
//!     let mut app = AppController::new(ThemeStore::load(store)?);
//!     app.extract(&PageDump::sample());
//!     app.select_all_colors();
//!     app.save_theme("Landing");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Palettes
//!
//! ```rust
//! use theme_picker::palette::{generate, quantize};
//!
//! let harmonies = generate("#3366cc");
//! assert_eq!(harmonies.complementary[1], "#cc9933");
//!
//! let dominant = quantize(&[(255, 0, 0), (0, 0, 255), (250, 5, 5)], 2);
//! assert_eq!(dominant.len(), 2);
//! ```

pub mod app;
pub mod audit;
pub mod cli;
pub mod color;
pub mod core;
pub mod font;
pub mod messaging;
pub mod page;
pub mod palette;
pub mod testdb;
pub mod theme;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
