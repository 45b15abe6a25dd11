//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use crate::color::ColorVision;
use crate::palette::HarmonyScheme;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extract, audit and reuse the colors and fonts of web pages
#[derive(Parser, Debug)]
#[command(name = "theme-picker")]
#[command(author = "Vihaan Reddy M")]
#[command(version = "1.0.0")]
#[command(about = "Color and font extraction, theme storage and harmonic palette generation", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage file for themes and palettes (overrides config)
    #[arg(short, long, global = true)]
    pub storage: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a color as hex, RGB, HSL and CMYK
    Convert {
        /// Any CSS color: hex, rgb(), rgba() or a named color
        color: String,
    },

    /// Contrast ratio and WCAG levels of two colors
    Contrast {
        /// Foreground color
        first: String,
        /// Background color
        second: String,
    },

    /// Generate harmonic palettes from a base color
    Generate {
        /// Base color in hex
        base: String,

        /// Only print this scheme: complementary, analogous, triadic,
        /// monochromatic, split-complementary
        #[arg(long)]
        scheme: Option<HarmonyScheme>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Extract dominant colors from an image
    Quantize {
        /// PNG or JPEG file
        image: PathBuf,

        /// Number of colors (overrides config)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Audit the contrast of a set of colors
    Audit {
        /// Colors to audit
        #[arg(required = true)]
        colors: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Scan a JSON page dump for colors and fonts
    Scan {
        /// Page dump (see `PageDump` for the format)
        page: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Simulate color vision deficiencies
    Simulate {
        /// Color to simulate
        color: String,

        /// protanopia, deuteranopia or tritanopia (all when omitted)
        #[arg(long)]
        vision: Option<ColorVision>,
    },

    /// Manage saved themes
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Manage saved palettes
    Palette {
        #[command(subcommand)]
        command: PaletteCommands,
    },

    /// Configuration file helpers
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\theme_picker\config.toml
    /// - Linux/macOS: ~/.config/theme_picker/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Save a theme from explicit colors or from every color and font of a page
    Save {
        /// Theme name (unique, case-insensitive)
        name: String,

        /// Colors to include (comma-separated)
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,

        /// Page dump to extract colors and fonts from
        #[arg(long, conflicts_with = "colors")]
        page: Option<PathBuf>,
    },

    /// List saved themes
    List,

    /// Show one theme
    Show {
        /// Theme id
        id: i64,
    },

    /// Apply a theme to a page dump and print what changed
    Apply {
        /// Theme id
        id: i64,

        /// Page dump to apply to
        page: PathBuf,

        /// Leave backgrounds alone
        #[arg(long)]
        no_background: bool,

        /// Leave text colors alone
        #[arg(long)]
        no_text: bool,

        /// Leave buttons alone
        #[arg(long)]
        no_buttons: bool,
    },

    /// Delete one theme
    Delete {
        /// Theme id
        id: i64,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every saved theme
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Export all themes as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PaletteCommands {
    /// Save a palette
    Save {
        /// Palette name
        name: String,

        /// Colors in hex
        #[arg(required = true)]
        colors: Vec<String>,

        /// Page the colors came from
        #[arg(long)]
        url: Option<String>,
    },

    /// Snap an image into a palette through the background service
    Snap {
        /// PNG or JPEG file
        image: PathBuf,

        /// Palette name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Number of colors (overrides config)
        #[arg(short)]
        k: Option<usize>,
    },

    /// List saved palettes
    List,

    /// Delete one palette
    Delete {
        /// Palette id
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Print a share code and link for a palette
    Share {
        /// Palette id
        id: String,

        /// Base URL of the share link
        #[arg(long, default_value = "https://www.figma.com/community/plugin")]
        base: String,

        /// Also copy the link to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Export all palettes as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recently picked colors, newest first
    History {
        /// Forget every remembered color
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the active config file path
    Path,

    /// Show the current configuration
    Show,

    /// Write a default config file
    Generate {
        /// Output path (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
