//! Test Database Module
//!
//! Synthetic inputs for headless testing. Pages are built with
//! [`crate::page::PageDump`]; this module adds seeded pixel clusters for
//! quantizer and area-snap tests.
//!
//! # Quick Start
//!
//! ```rust
//! use theme_picker::palette::quantize;
//! use theme_picker::testdb::PixelGenerator;
//!
//! let pixels = PixelGenerator::new().clustered(&[(255, 0, 0), (0, 0, 255)], 50);
//! assert_eq!(pixels.len(), 100);
//! assert!(!quantize(&pixels, 2).is_empty());
//! ```

pub mod generator;

pub use generator::{PixelGenerator, PixelGeneratorConfig};
