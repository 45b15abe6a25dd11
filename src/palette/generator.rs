//! Harmonic palette generation
//!
//! From one base color, five 5-color palettes are derived by rotating the hue
//! and shifting saturation/lightness. All arithmetic happens on unrounded HSL;
//! only the final conversion to hex rounds.

use crate::color::model::Hsl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color harmony scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonyScheme {
    /// Base and its opposite hue
    #[default]
    Complementary,
    /// Neighbors at 30 and 60 degrees
    Analogous,
    /// Three hues 120 degrees apart
    Triadic,
    /// One hue, five lightness steps
    Monochromatic,
    /// Base plus the two neighbors of its complement
    #[serde(alias = "splitComplementary")]
    SplitComplementary,
}

impl HarmonyScheme {
    pub const ALL: [HarmonyScheme; 5] = [
        HarmonyScheme::Complementary,
        HarmonyScheme::Analogous,
        HarmonyScheme::Triadic,
        HarmonyScheme::Monochromatic,
        HarmonyScheme::SplitComplementary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HarmonyScheme::Complementary => "complementary",
            HarmonyScheme::Analogous => "analogous",
            HarmonyScheme::Triadic => "triadic",
            HarmonyScheme::Monochromatic => "monochromatic",
            HarmonyScheme::SplitComplementary => "split-complementary",
        }
    }

    /// Build the scheme's palette from a base color
    fn build(&self, base: Hsl) -> Vec<String> {
        let palette = match self {
            HarmonyScheme::Complementary => {
                let comp = base.rotate(180.0);
                [
                    base,
                    comp,
                    base.adjust(-20.0, -20.0),
                    comp.adjust(-20.0, -20.0),
                    base.adjust(20.0, 20.0),
                ]
            }
            HarmonyScheme::Analogous => [
                base,
                base.rotate(30.0),
                base.rotate(-30.0),
                base.rotate(60.0),
                base.rotate(-60.0),
            ],
            HarmonyScheme::Triadic => {
                let second = base.rotate(120.0);
                [
                    base,
                    second,
                    base.rotate(240.0),
                    base.adjust(-15.0, -15.0),
                    second.adjust(-15.0, -15.0),
                ]
            }
            HarmonyScheme::Monochromatic => [
                base,
                base.adjust(0.0, 20.0),
                base.adjust(0.0, 40.0),
                base.adjust(0.0, -20.0),
                base.adjust(0.0, -40.0),
            ],
            HarmonyScheme::SplitComplementary => {
                let left = base.rotate(150.0);
                [
                    base,
                    left,
                    base.rotate(210.0),
                    base.adjust(-25.0, -25.0),
                    left.adjust(-25.0, -25.0),
                ]
            }
        };

        palette.iter().map(Hsl::to_hex).collect()
    }
}

impl fmt::Display for HarmonyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HarmonyScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "complementary" => Ok(HarmonyScheme::Complementary),
            "analogous" => Ok(HarmonyScheme::Analogous),
            "triadic" => Ok(HarmonyScheme::Triadic),
            "monochromatic" => Ok(HarmonyScheme::Monochromatic),
            "split-complementary" | "splitcomplementary" => Ok(HarmonyScheme::SplitComplementary),
            _ => Err(format!("Unknown harmony scheme: {}", s)),
        }
    }
}

/// The five palettes derived from one base color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyPalettes {
    pub complementary: Vec<String>,
    pub analogous: Vec<String>,
    pub triadic: Vec<String>,
    pub monochromatic: Vec<String>,
    pub split_complementary: Vec<String>,
}

impl HarmonyPalettes {
    /// Palette of one scheme
    pub fn get(&self, scheme: HarmonyScheme) -> &[String] {
        match scheme {
            HarmonyScheme::Complementary => &self.complementary,
            HarmonyScheme::Analogous => &self.analogous,
            HarmonyScheme::Triadic => &self.triadic,
            HarmonyScheme::Monochromatic => &self.monochromatic,
            HarmonyScheme::SplitComplementary => &self.split_complementary,
        }
    }

    /// All palettes in scheme order
    pub fn iter(&self) -> impl Iterator<Item = (HarmonyScheme, &[String])> {
        HarmonyScheme::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Generate every harmonic palette for `base_hex` (malformed input is black)
pub fn generate(base_hex: &str) -> HarmonyPalettes {
    let base = Hsl::from_hex(base_hex);
    HarmonyPalettes {
        complementary: HarmonyScheme::Complementary.build(base),
        analogous: HarmonyScheme::Analogous.build(base),
        triadic: HarmonyScheme::Triadic.build(base),
        monochromatic: HarmonyScheme::Monochromatic.build(base),
        split_complementary: HarmonyScheme::SplitComplementary.build(base),
    }
}

/// Generate a single scheme
pub fn generate_scheme(base_hex: &str, scheme: HarmonyScheme) -> Vec<String> {
    scheme.build(Hsl::from_hex(base_hex))
}
