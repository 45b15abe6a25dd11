//! Clipboard access for the `copyToClipboard` action

use crate::core::error::{Result, ThemeError};
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Destination for copied text
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard
///
/// A fresh handle is opened per copy, so the service thread never holds a
/// platform clipboard object between requests.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            warn!("Clipboard not available: {}", e);
            ThemeError::Bus(format!("Clipboard not available: {}", e))
        })?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ThemeError::Bus(format!("Failed to copy to clipboard: {}", e)))?;
        info!("Copied {} characters to clipboard", text.len());
        Ok(())
    }
}

/// Clipboard that records copies in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text copied so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Most recent copy
    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.history
            .lock()
            .map_err(|_| ThemeError::Bus("Clipboard lock poisoned".to_string()))?
            .push(text.to_string());
        Ok(())
    }
}
