//! Themes
//!
//! # Submodules
//!
//! - `store` - Named themes persisted under `savedThemes`
//! - `applier` - Writes a selection of colors/fonts onto a page
//! - `export` - JSON export and palette sharing

pub mod applier;
pub mod export;
pub mod store;

pub use applier::{apply, apply_theme, ApplyOptions, ApplyReport};
pub use export::SharePayload;
pub use store::{Theme, ThemeStore};
