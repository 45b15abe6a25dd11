//! Message bus
//!
//! Popup, background and page contexts talk through action-tagged requests.
//! Each request carries its own bounded(1) reply channel, so exactly one
//! [`Response`] comes back per request. Callers may wait forever
//! ([`BusClient::request`]) or give up after a deadline
//! ([`BusClient::request_timeout`]).
//!
//! # Submodules
//!
//! - `service` - The background service that answers requests
//! - `clipboard` - Clipboard backends for `copyToClipboard`

pub mod clipboard;
pub mod service;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use service::{BackgroundService, ServiceHandle};

use crate::core::error::ThemeError;
use crate::font::Font;
use crate::page::Rect;
use crate::palette::history::HistoryEntry;
use crate::palette::store::Palette;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::trace;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Vocabulary
// =============================================================================

/// Requests understood by the background service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Enter color-picking mode
    StartColorPicker,
    /// Enter area-snap mode
    StartAreaSnap,
    /// Report the fonts used on the page
    InspectFonts,
    /// Rendered color under a point
    GetColorAtPosition { x: u32, y: u32 },
    /// Dominant colors of a region
    SnapArea { rect: Rect },
    /// Unique fonts of the page
    GetPageFonts,
    CopyToClipboard { text: String },
    SavePalette {
        name: String,
        colors: Vec<String>,
        #[serde(default)]
        url: Option<String>,
    },
    GetPalettes,
    DeletePalette { id: String },
    /// Recently picked colors, newest first
    GetColorHistory,
    ClearColorHistory,
}

impl Action {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartColorPicker => "startColorPicker",
            Action::StartAreaSnap => "startAreaSnap",
            Action::InspectFonts => "inspectFonts",
            Action::GetColorAtPosition { .. } => "getColorAtPosition",
            Action::SnapArea { .. } => "snapArea",
            Action::GetPageFonts => "getPageFonts",
            Action::CopyToClipboard { .. } => "copyToClipboard",
            Action::SavePalette { .. } => "savePalette",
            Action::GetPalettes => "getPalettes",
            Action::DeletePalette { .. } => "deletePalette",
            Action::GetColorHistory => "getColorHistory",
            Action::ClearColorHistory => "clearColorHistory",
        }
    }
}

/// Reply to an [`Action`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    /// The action was carried out
    Ack,
    /// Picked color, `None` outside the page
    Color(Option<String>),
    Colors(Vec<String>),
    Fonts(Vec<Font>),
    Palette(Palette),
    Palettes(Vec<Palette>),
    History(Vec<HistoryEntry>),
    /// The action failed
    Error(String),
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

/// Keyboard input forwarded from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Escape,
    Other,
}

impl KeyEvent {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Self {
        if key == "Escape" {
            KeyEvent::Escape
        } else {
            KeyEvent::Other
        }
    }
}

/// Interactive overlay currently active on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractiveMode {
    #[default]
    Idle,
    ColorPicker,
    AreaSnap,
}

impl InteractiveMode {
    pub fn is_active(&self) -> bool {
        *self != InteractiveMode::Idle
    }

    /// Apply a key press. Returns `true` when it cancelled an active mode.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key == KeyEvent::Escape && self.is_active() {
            *self = InteractiveMode::Idle;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Failures of the transport itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Background service is not running")]
    Disconnected,

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

impl From<BusError> for ThemeError {
    fn from(err: BusError) -> Self {
        ThemeError::Bus(err.to_string())
    }
}

/// A request in flight
#[derive(Debug)]
pub struct Request {
    pub action: Action,
    pub reply: Sender<Response>,
}

/// Messages consumed by the service loop
#[derive(Debug)]
pub enum BusMessage {
    Request(Request),
    Key(KeyEvent),
    Shutdown,
}

/// Sending side of the bus
#[derive(Debug, Clone)]
pub struct BusClient {
    tx: Sender<BusMessage>,
}

impl BusClient {
    pub fn new(tx: Sender<BusMessage>) -> Self {
        Self { tx }
    }

    fn send(&self, action: Action) -> Result<crossbeam_channel::Receiver<Response>, BusError> {
        let (reply, rx) = bounded(1);
        trace!("Sending {}", action.name());
        self.tx
            .send(BusMessage::Request(Request { action, reply }))
            .map_err(|_| BusError::Disconnected)?;
        Ok(rx)
    }

    /// Send `action` and block until the response arrives
    pub fn request(&self, action: Action) -> Result<Response, BusError> {
        self.send(action)?.recv().map_err(|_| BusError::Disconnected)
    }

    /// Send `action` and wait at most `timeout`
    pub fn request_timeout(&self, action: Action, timeout: Duration) -> Result<Response, BusError> {
        self.send(action)?.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => BusError::Timeout(timeout),
            RecvTimeoutError::Disconnected => BusError::Disconnected,
        })
    }

    /// Wait with an optional deadline (`None` waits forever)
    pub fn request_with(&self, action: Action, timeout: Option<Duration>) -> Result<Response, BusError> {
        match timeout {
            Some(timeout) => self.request_timeout(action, timeout),
            None => self.request(action),
        }
    }

    /// Forward a key press to the page context
    pub fn press_key(&self, key: KeyEvent) -> Result<(), BusError> {
        self.tx
            .send(BusMessage::Key(key))
            .map_err(|_| BusError::Disconnected)
    }

    /// Ask the service loop to exit
    pub fn shutdown(&self) {
        let _ = self.tx.send(BusMessage::Shutdown);
    }
}
