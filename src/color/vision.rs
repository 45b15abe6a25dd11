//! Color vision deficiency simulation
//!
//! Applies the classic 3x3 dichromacy matrices to an sRGB triple. The result is
//! an approximation good enough for previewing how a palette reads to users with
//! protanopia, deuteranopia or tritanopia.

use crate::color::model::{rgb_to_hex, Color};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of color vision deficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorVision {
    /// Missing long-wavelength (red) cones
    #[default]
    Protanopia,
    /// Missing medium-wavelength (green) cones
    Deuteranopia,
    /// Missing short-wavelength (blue) cones
    Tritanopia,
}

impl ColorVision {
    /// All supported deficiencies
    pub const ALL: [ColorVision; 3] = [
        ColorVision::Protanopia,
        ColorVision::Deuteranopia,
        ColorVision::Tritanopia,
    ];

    fn matrix(&self) -> [[f64; 3]; 3] {
        match self {
            ColorVision::Protanopia => [
                [0.56667, 0.43333, 0.0],
                [0.55833, 0.44167, 0.0],
                [0.0, 0.24167, 0.75833],
            ],
            ColorVision::Deuteranopia => [
                [0.625, 0.375, 0.0],
                [0.7, 0.3, 0.0],
                [0.0, 0.3, 0.7],
            ],
            ColorVision::Tritanopia => [
                [0.95, 0.05, 0.0],
                [0.0, 0.43333, 0.56667],
                [0.0, 0.475, 0.525],
            ],
        }
    }

    /// Simulate how `rgb` appears
    pub fn simulate(&self, (r, g, b): (u8, u8, u8)) -> (u8, u8, u8) {
        let m = self.matrix();
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let row = |i: usize| {
            (r * m[i][0] + g * m[i][1] + b * m[i][2])
                .round()
                .clamp(0.0, 255.0) as u8
        };
        (row(0), row(1), row(2))
    }

    /// Simulate a whole color record
    pub fn simulate_color(&self, color: &Color) -> Color {
        let (r, g, b) = self.simulate(color.rgb());
        Color {
            hex: rgb_to_hex(r, g, b),
            original: Some(color.hex.clone()),
        }
    }
}

impl fmt::Display for ColorVision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorVision::Protanopia => "protanopia",
            ColorVision::Deuteranopia => "deuteranopia",
            ColorVision::Tritanopia => "tritanopia",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ColorVision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "protanopia" => Ok(ColorVision::Protanopia),
            "deuteranopia" => Ok(ColorVision::Deuteranopia),
            "tritanopia" => Ok(ColorVision::Tritanopia),
            other => Err(format!("Unknown color vision type: {}", other)),
        }
    }
}
