//! Color module
//!
//! Everything that deals with individual colors:
//!
//! - `model` - `Color` record, CSS parsing, hex/RGB/HSL/CMYK conversions, contrast
//! - `named` - CSS named-color resolver used when no page is available
//! - `vision` - Color vision deficiency simulation

pub mod model;
pub mod named;
pub mod vision;

pub use model::{contrast_ratio, to_hex, Color, ColorFormats, Hsl, StyleResolver};
pub use named::CssNamedColors;
pub use vision::ColorVision;
