//! Color model - parsing, conversions and contrast
//!
//! Colors scraped from a page arrive as CSS strings (`#abc`, `rgb(1, 2, 3)`,
//! `rgba(...)`, `steelblue`). They are normalized to a lowercase `#rrggbb`
//! [`Color`], which is the identity used everywhere else: two colors are equal
//! when their hex values are equal, whatever their original spelling.
//!
//! # Example
//!
//! ```rust
//! use theme_picker::color::model::{to_hex, contrast_ratio, rgb_to_hsl};
//! use theme_picker::color::named::CssNamedColors;
//!
//! assert_eq!(to_hex("rgb(51, 102, 204)", &CssNamedColors).as_deref(), Some("#3366cc"));
//! assert_eq!(to_hex("transparent", &CssNamedColors), None);
//! assert_eq!(rgb_to_hsl(51, 102, 204), (220, 60, 50));
//! assert!((contrast_ratio("#000000", "#ffffff") - 21.0).abs() < 1e-9);
//! ```

use crate::core::error::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Host style computation, used to resolve CSS color names.
///
/// Given any CSS color value the resolver returns the computed `rgb()` /
/// `rgba()` string, the way a browser reports `getComputedStyle(el).color`.
pub trait StyleResolver {
    /// Resolve `value` to a computed `rgb(...)` string
    fn computed_color(&self, value: &str) -> Result<String>;
}

// =============================================================================
// Color
// =============================================================================

/// A normalized color record
///
/// `hex` is always lowercase `#rrggbb`. `original` keeps the source spelling
/// when the color came from a page scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Color {
    /// Lowercase `#rrggbb`
    pub hex: String,

    /// CSS value the color was parsed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl Color {
    /// Create a color from a hex string (`#rgb` or `#rrggbb`, case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        parse_hex(hex).map(|(r, g, b)| Self::from_rgb(r, g, b))
    }

    /// Create a color from RGB channels
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            hex: rgb_to_hex(r, g, b),
            original: None,
        }
    }

    /// Parse any CSS color value, remembering the original spelling
    pub fn parse(value: &str, resolver: &dyn StyleResolver) -> Option<Self> {
        to_hex(value, resolver).map(|hex| Self {
            hex,
            original: Some(value.to_string()),
        })
    }

    /// RGB channels of this color
    pub fn rgb(&self) -> (u8, u8, u8) {
        hex_to_rgb(&self.hex)
    }

    /// WCAG relative luminance (0.0 - 1.0)
    pub fn luminance(&self) -> f64 {
        relative_luminance(self.rgb())
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.hex == other.hex
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hex.hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Normalize a CSS color value to lowercase `#rrggbb`.
///
/// Returns `None` for `transparent`, `inherit`, `initial`, fully transparent
/// colors and anything that cannot be parsed. Names are resolved through the
/// host `resolver`; a resolver failure is logged and yields `None`.
pub fn to_hex(value: &str, resolver: &dyn StyleResolver) -> Option<String> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    if lower.is_empty() || matches!(lower.as_str(), "transparent" | "inherit" | "initial") {
        return None;
    }

    if lower.starts_with('#') {
        return parse_css_hex(&lower);
    }

    if lower.starts_with("rgb") {
        return parse_rgb_function(&lower).map(|(r, g, b)| rgb_to_hex(r, g, b));
    }

    match resolver.computed_color(&lower) {
        Ok(computed) => {
            let computed = computed.trim().to_ascii_lowercase();
            if computed.starts_with("rgb") {
                parse_rgb_function(&computed).map(|(r, g, b)| rgb_to_hex(r, g, b))
            } else {
                None
            }
        }
        Err(e) => {
            warn!("Failed to convert color '{}': {}", value, e);
            None
        }
    }
}

/// Parse `#rgb` / `#rrggbb` (with or without `#`) into channels.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        3 => {
            let mut channels = digits
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        6 => Some((
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        )),
        _ => None,
    }
}

/// Hex forms a stylesheet may contain, including the alpha variants.
fn parse_css_hex(lower: &str) -> Option<String> {
    let digits = lower.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 | 6 => parse_hex(digits).map(|(r, g, b)| rgb_to_hex(r, g, b)),
        4 | 8 => {
            let split = digits.len() / 4 * 3;
            let alpha = &digits[split..];
            if alpha.chars().all(|c| c == '0') {
                return None;
            }
            parse_hex(&digits[..split]).map(|(r, g, b)| rgb_to_hex(r, g, b))
        }
        _ => None,
    }
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)` / `rgb(r g b / a)`.
///
/// Channels may be integers, decimals or percentages. A zero alpha means the
/// color is invisible and yields `None`.
fn parse_rgb_function(lower: &str) -> Option<(u8, u8, u8)> {
    let open = lower.find('(')?;
    let close = lower.rfind(')')?;
    if close <= open {
        return None;
    }

    let parts: Vec<&str> = lower[open + 1..close]
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() < 3 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v = if let Some(pct) = s.strip_suffix('%') {
            pct.parse::<f64>().ok()? * 255.0 / 100.0
        } else {
            s.parse::<f64>().ok()?
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };

    if let Some(alpha) = parts.get(3) {
        let a = if let Some(pct) = alpha.strip_suffix('%') {
            pct.parse::<f64>().ok()? / 100.0
        } else {
            alpha.parse::<f64>().ok()?
        };
        if a <= 0.0 {
            return None;
        }
    }

    Some((channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}

/// Lenient parse used by contrast checks: hex or `rgb()`, anything else is black.
pub fn parse_lenient(value: &str) -> (u8, u8, u8) {
    let lower = value.trim().to_ascii_lowercase();
    if lower.starts_with("rgb") {
        if let Some(rgb) = parse_rgb_function(&lower) {
            return rgb;
        }
    }
    hex_to_rgb(&lower)
}

// =============================================================================
// Conversions
// =============================================================================

/// Hex to RGB. Malformed input is treated as black.
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    parse_hex(hex).unwrap_or((0, 0, 0))
}

/// RGB to lowercase `#rrggbb`
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Unrounded HSL: hue in degrees `[0, 360)`, saturation and lightness `0..=100`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Build an HSL value, wrapping the hue and clamping the percentages
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    /// Convert from RGB without rounding
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = r as f64 / 255.0;
        let g = g as f64 / 255.0;
        let b = b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Self {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self::new(h * 60.0, s * 100.0, l * 100.0)
    }

    /// Convert from a hex string (malformed input is black)
    pub fn from_hex(hex: &str) -> Self {
        let (r, g, b) = hex_to_rgb(hex);
        Self::from_rgb(r, g, b)
    }

    /// Rotate the hue by `degrees`
    pub fn rotate(&self, degrees: f64) -> Self {
        Self::new(self.h + degrees, self.s, self.l)
    }

    /// Shift saturation and lightness, clamped to `[0, 100]`
    pub fn adjust(&self, ds: f64, dl: f64) -> Self {
        Self::new(self.h, self.s + ds, self.l + dl)
    }

    /// Convert to RGB
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        hsl_to_rgb(self.h, self.s, self.l)
    }

    /// Convert to lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        rgb_to_hex(r, g, b)
    }
}

/// RGB to HSL, rounded: hue in degrees `[0, 360)`, saturation/lightness in percent
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (u16, u8, u8) {
    let hsl = Hsl::from_rgb(r, g, b);
    (
        (hsl.h.round() as u16) % 360,
        hsl.s.round() as u8,
        hsl.l.round() as u8,
    )
}

/// Standard HSL to RGB (hue in degrees, saturation/lightness in percent)
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 100.0) / 100.0;
    let l = l.clamp(0.0, 100.0) / 100.0;

    let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        to_byte(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_channel(p, q, h)),
        to_byte(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// HSL to lowercase `#rrggbb`
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let (r, g, b) = hsl_to_rgb(h, s, l);
    rgb_to_hex(r, g, b)
}

/// RGB to CMYK, each component a rounded percentage
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> (u8, u8, u8, u8) {
    if r == 0 && g == 0 && b == 0 {
        return (0, 0, 0, 100);
    }

    let c = 1.0 - r as f64 / 255.0;
    let m = 1.0 - g as f64 / 255.0;
    let y = 1.0 - b as f64 / 255.0;
    let k = c.min(m).min(y);

    let pct = |v: f64| (v * 100.0).round() as u8;
    (
        pct((c - k) / (1.0 - k)),
        pct((m - k) / (1.0 - k)),
        pct((y - k) / (1.0 - k)),
        pct(k),
    )
}

// =============================================================================
// Formatting
// =============================================================================

/// `rgb(r, g, b)`
pub fn format_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({}, {}, {})", r, g, b)
}

/// `hsl(h, s%, l%)`
pub fn format_hsl((h, s, l): (u16, u8, u8)) -> String {
    format!("hsl({}, {}%, {}%)", h, s, l)
}

/// `cmyk(c%, m%, y%, k%)`
pub fn format_cmyk((c, m, y, k): (u8, u8, u8, u8)) -> String {
    format!("cmyk({}%, {}%, {}%, {}%)", c, m, y, k)
}

/// Every display format of one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFormats {
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
    pub cmyk: String,
}

impl ColorFormats {
    /// Compute every format of `color`
    pub fn of(color: &Color) -> Self {
        let (r, g, b) = color.rgb();
        Self {
            hex: color.hex.clone(),
            rgb: format_rgb((r, g, b)),
            hsl: format_hsl(rgb_to_hsl(r, g, b)),
            cmyk: format_cmyk(rgb_to_cmyk(r, g, b)),
        }
    }
}

// =============================================================================
// Luminance and contrast
// =============================================================================

/// WCAG relative luminance of an sRGB color
pub fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Contrast ratio between two RGB colors, in `[1, 21]`
pub fn contrast_ratio_rgb(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (bright, dark) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    ((bright + 0.05) / (dark + 0.05)).clamp(1.0, 21.0)
}

/// Contrast ratio between two color strings.
///
/// Malformed colors are treated as black, so a typo can hide a real failure.
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    contrast_ratio_rgb(parse_lenient(a), parse_lenient(b))
}
