//! Error types for the theme picker
//!
//! This module defines the error types used throughout the library. Variants
//! fall into three groups: input errors (bad names, empty selections), transport
//! errors (storage and message bus failures) and parse errors (corrupt stored
//! JSON, unreadable images).

use thiserror::Error;

/// Main error type for the theme picker
#[derive(Error, Debug)]
pub enum ThemeError {
    /// Theme name was empty or whitespace only
    #[error("Theme name is required!")]
    EmptyName,

    /// A theme with the same name (ignoring case) already exists
    #[error("Theme name already exists: '{0}'")]
    DuplicateName(String),

    /// Neither colors nor fonts were selected
    #[error("Please select colors and/or fonts to save!")]
    NoSelection,

    /// No theme with the given id
    #[error("Theme not found: {0}")]
    ThemeNotFound(i64),

    /// No palette with the given id
    #[error("Palette not found: {0}")]
    PaletteNotFound(String),

    /// A color string could not be interpreted
    #[error("Invalid color: '{0}'")]
    InvalidColor(String),

    /// Reading or writing the key-value store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Message bus request failed or timed out
    #[error("Message bus error: {0}")]
    Bus(String),

    /// Stored or imported data could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Image could not be decoded
    #[error("Image error: {0}")]
    Image(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl ThemeError {
    /// Whether this error is caused by user input rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ThemeError::EmptyName
                | ThemeError::DuplicateName(_)
                | ThemeError::NoSelection
                | ThemeError::ThemeNotFound(_)
                | ThemeError::PaletteNotFound(_)
                | ThemeError::InvalidColor(_)
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ThemeError>;

impl From<std::io::Error> for ThemeError {
    fn from(err: std::io::Error) -> Self {
        ThemeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ThemeError {
    fn from(err: serde_json::Error) -> Self {
        ThemeError::Parse(err.to_string())
    }
}

impl From<image::ImageError> for ThemeError {
    fn from(err: image::ImageError) -> Self {
        ThemeError::Image(err.to_string())
    }
}
