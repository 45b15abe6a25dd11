//! Palettes
//!
//! # Submodules
//!
//! - `quantizer` - Dominant colors of a pixel buffer or image (k-means)
//! - `generator` - Harmonic palettes derived from one base color
//! - `store` - The persisted `palettes` collection
//! - `history` - Recently picked colors

pub mod generator;
pub mod history;
pub mod quantizer;
pub mod store;

pub use generator::{generate, generate_scheme, HarmonyPalettes, HarmonyScheme};
pub use history::{ColorHistory, HistoryEntry, HISTORY_LIMIT};
pub use quantizer::{palette_from_image, palette_from_rgba, quantize};
pub use store::{Palette, PaletteStore};
