//! Accessibility audit
//!
//! Scores a set of colors against the WCAG 2 contrast thresholds. Every
//! unordered pair is tested, then every color against white and against black.
//! Each test earns up to 6 points:
//!
//! | Check      | Threshold | Points |
//! |------------|-----------|--------|
//! | AA normal  | 4.5:1     | 2      |
//! | AA large   | 3:1       | 1      |
//! | AAA normal | 7:1       | 2      |
//! | AAA large  | 4.5:1     | 1      |
//!
//! Colors may be hex or `rgb()`/`rgba()` strings. Malformed colors are audited
//! as black.

use crate::color::model::{contrast_ratio, parse_lenient, rgb_to_hex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum points per test
pub const MAX_SCORE: u32 = 6;

const WHITE: &str = "#ffffff";
const BLACK: &str = "#000000";

/// Pass/fail for normal and large text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSizeCheck {
    pub normal: bool,
    pub large: bool,
}

/// WCAG results of one contrast ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WcagCompliance {
    #[serde(rename = "AA")]
    pub aa: TextSizeCheck,
    #[serde(rename = "AAA")]
    pub aaa: TextSizeCheck,
}

impl WcagCompliance {
    pub fn check(ratio: f64) -> Self {
        Self {
            aa: TextSizeCheck {
                normal: ratio >= 4.5,
                large: ratio >= 3.0,
            },
            aaa: TextSizeCheck {
                normal: ratio >= 7.0,
                large: ratio >= 4.5,
            },
        }
    }

    /// Points earned, 0 to [`MAX_SCORE`]
    pub fn score(&self) -> u32 {
        let mut score = 0;
        if self.aa.normal {
            score += 2;
        }
        if self.aa.large {
            score += 1;
        }
        if self.aaa.normal {
            score += 2;
        }
        if self.aaa.large {
            score += 1;
        }
        score
    }

    /// Passed levels, e.g. `["AA Normal", "AA Large"]`
    pub fn passed(&self) -> Vec<&'static str> {
        let mut status = Vec::new();
        if self.aa.normal {
            status.push("AA Normal");
        }
        if self.aa.large {
            status.push("AA Large");
        }
        if self.aaa.normal {
            status.push("AAA Normal");
        }
        if self.aaa.large {
            status.push("AAA Large");
        }
        status
    }

    /// Human-readable status line
    pub fn status(&self) -> String {
        let passed = self.passed();
        if passed.is_empty() {
            "Fails WCAG".to_string()
        } else {
            passed.join(", ")
        }
    }
}

/// Coarse classification of a contrast ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ContrastLevel {
    pub fn of(ratio: f64) -> Self {
        if ratio >= 7.0 {
            ContrastLevel::Excellent
        } else if ratio >= 4.5 {
            ContrastLevel::Good
        } else if ratio >= 3.0 {
            ContrastLevel::Fair
        } else {
            ContrastLevel::Poor
        }
    }
}

impl fmt::Display for ContrastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContrastLevel::Excellent => "excellent",
            ContrastLevel::Good => "good",
            ContrastLevel::Fair => "fair",
            ContrastLevel::Poor => "poor",
        };
        write!(f, "{}", s)
    }
}

/// What a result compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContrastKind {
    /// Two colors of the set
    Pair,
    /// A color against `#ffffff`
    WhiteBackground,
    /// A color against `#000000`
    BlackBackground,
}

/// One contrast test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastResult {
    pub color1: String,
    pub color2: String,
    /// In `[1, 21]`
    pub contrast_ratio: f64,
    pub wcag: WcagCompliance,
    pub score: u32,
    pub kind: ContrastKind,
}

impl ContrastResult {
    fn new(color1: &str, color2: &str, kind: ContrastKind) -> Self {
        let ratio = contrast_ratio(color1, color2);
        let wcag = WcagCompliance::check(ratio);
        Self {
            color1: color1.to_string(),
            color2: color2.to_string(),
            contrast_ratio: ratio,
            wcag,
            score: wcag.score(),
            kind,
        }
    }

    pub fn level(&self) -> ContrastLevel {
        ContrastLevel::of(self.contrast_ratio)
    }

    /// Whether normal text passes AA
    pub fn passes_aa(&self) -> bool {
        self.wcag.aa.normal
    }
}

/// Full audit of a color set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub results: Vec<ContrastResult>,
    /// `None` when nothing was tested
    pub overall_score_percent: Option<u32>,
}

impl AuditReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results that fail AA for normal text
    pub fn failing(&self) -> impl Iterator<Item = &ContrastResult> {
        self.results.iter().filter(|r| !r.passes_aa())
    }
}

/// Audit `colors`. Each value is normalized to lowercase hex first.
pub fn audit<S: AsRef<str>>(colors: &[S]) -> AuditReport {
    let colors: Vec<String> = colors
        .iter()
        .map(|c| {
            let (r, g, b) = parse_lenient(c.as_ref());
            rgb_to_hex(r, g, b)
        })
        .collect();

    let mut results = Vec::with_capacity(colors.len() * (colors.len() + 3) / 2);

    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            results.push(ContrastResult::new(a, b, ContrastKind::Pair));
        }
    }

    for color in &colors {
        results.push(ContrastResult::new(color, WHITE, ContrastKind::WhiteBackground));
        results.push(ContrastResult::new(color, BLACK, ContrastKind::BlackBackground));
    }

    let overall_score_percent = if results.is_empty() {
        None
    } else {
        let total: u32 = results.iter().map(|r| r.score).sum();
        let max = MAX_SCORE * results.len() as u32;
        Some((100.0 * total as f64 / max as f64).round() as u32)
    };

    AuditReport {
        results,
        overall_score_percent,
    }
}
