//! Background service
//!
//! Owns the page inspector, the clipboard, the palette store and (optionally)
//! the color history, and answers [`Action`]s. Picked colors are prepended to
//! the history; an area snap replaces it. `handle` is synchronous so it can be driven directly; `spawn`
//! runs the same dispatch on a worker thread behind a [`BusClient`].

use super::{Action, BusClient, BusMessage, Clipboard, InteractiveMode, KeyEvent, Response};
use crate::color::model::Color;
use crate::font::extract_fonts;
use crate::page::PageInspector;
use crate::palette::quantizer::{quantize, DEFAULT_COLOR_COUNT};
use crate::palette::history::ColorHistory;
use crate::palette::store::PaletteStore;
use crossbeam_channel::{unbounded, Receiver};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Answers bus requests against one page
pub struct BackgroundService {
    inspector: Arc<dyn PageInspector>,
    clipboard: Box<dyn Clipboard>,
    palettes: PaletteStore,
    history: Option<ColorHistory>,
    mode: InteractiveMode,
    snap_colors: usize,
}

impl BackgroundService {
    pub fn new(
        inspector: Arc<dyn PageInspector>,
        clipboard: Box<dyn Clipboard>,
        palettes: PaletteStore,
    ) -> Self {
        Self {
            inspector,
            clipboard,
            palettes,
            history: None,
            mode: InteractiveMode::Idle,
            snap_colors: DEFAULT_COLOR_COUNT,
        }
    }

    /// Number of colors an area snap produces
    pub fn with_snap_colors(mut self, k: usize) -> Self {
        self.snap_colors = k;
        self
    }

    /// Record picked and snapped colors in `history`
    pub fn with_history(mut self, history: ColorHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn history(&self) -> Option<&ColorHistory> {
        self.history.as_ref()
    }

    pub fn mode(&self) -> InteractiveMode {
        self.mode
    }

    /// Handle a key press forwarded from the page
    pub fn handle_key(&mut self, key: KeyEvent) {
        let previous = self.mode;
        if self.mode.handle_key(key) {
            debug!("{:?} cancelled by Escape", previous);
        }
    }

    /// Dispatch one action
    pub fn handle(&mut self, action: Action) -> Response {
        debug!("Handling {}", action.name());

        match action {
            Action::StartColorPicker => {
                self.mode = InteractiveMode::ColorPicker;
                Response::Ack
            }
            Action::StartAreaSnap => {
                self.mode = InteractiveMode::AreaSnap;
                Response::Ack
            }
            Action::GetColorAtPosition { x, y } => {
                let color = self
                    .inspector
                    .color_at(x, y)
                    .map(|(r, g, b)| Color::from_rgb(r, g, b).hex);
                if self.mode == InteractiveMode::ColorPicker {
                    self.mode = InteractiveMode::Idle;
                }
                if let (Some(history), Some(hex)) = (self.history.as_mut(), color.as_deref()) {
                    if let Err(e) = history.push(hex) {
                        warn!("Failed to record picked color: {}", e);
                    }
                }
                Response::Color(color)
            }
            Action::SnapArea { rect } => {
                let pixels = self.inspector.pixels_in(rect);
                let mut colors = quantize(&pixels, self.snap_colors);
                let mut seen = std::collections::HashSet::new();
                colors.retain(|c| seen.insert(c.clone()));
                if self.mode == InteractiveMode::AreaSnap {
                    self.mode = InteractiveMode::Idle;
                }
                if let Some(history) = self.history.as_mut() {
                    if let Err(e) = history.replace(&colors) {
                        warn!("Failed to record snapped colors: {}", e);
                    }
                }
                Response::Colors(colors)
            }
            Action::InspectFonts | Action::GetPageFonts => {
                Response::Fonts(extract_fonts(&self.inspector.scan_fonts()))
            }
            Action::CopyToClipboard { text } => match self.clipboard.set_text(&text) {
                Ok(()) => Response::Ack,
                Err(e) => Response::Error(e.to_string()),
            },
            Action::SavePalette { name, colors, url } => {
                let mut parsed = Vec::with_capacity(colors.len());
                for hex in &colors {
                    match Color::from_hex(hex) {
                        Some(color) => parsed.push(color),
                        None => return Response::Error(format!("Invalid color: {}", hex)),
                    }
                }
                match self.palettes.save(&name, parsed, url, None, Vec::new()) {
                    Ok(palette) => Response::Palette(palette),
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Action::GetPalettes => match self.palettes.list() {
                Ok(palettes) => Response::Palettes(palettes),
                Err(e) => Response::Error(e.to_string()),
            },
            Action::DeletePalette { id } => match self.palettes.delete(&id) {
                Ok(()) => Response::Ack,
                Err(e) => Response::Error(e.to_string()),
            },
            Action::GetColorHistory => Response::History(
                self.history
                    .as_ref()
                    .map(|h| h.entries().to_vec())
                    .unwrap_or_default(),
            ),
            Action::ClearColorHistory => match self.history.as_mut().map(ColorHistory::clear) {
                Some(Err(e)) => Response::Error(e.to_string()),
                _ => Response::Ack,
            },
        }
    }

    /// Run the service on a worker thread
    pub fn spawn(self) -> ServiceHandle {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || self.run(rx));
        info!("Background service started");
        ServiceHandle {
            client: BusClient::new(tx),
            worker: Some(worker),
        }
    }

    fn run(mut self, rx: Receiver<BusMessage>) {
        while let Ok(message) = rx.recv() {
            match message {
                BusMessage::Request(request) => {
                    let response = self.handle(request.action);
                    if request.reply.send(response).is_err() {
                        warn!("Requester went away before the response was sent");
                    }
                }
                BusMessage::Key(key) => self.handle_key(key),
                BusMessage::Shutdown => break,
            }
        }
        debug!("Background service stopped");
    }
}

/// A running service
pub struct ServiceHandle {
    client: BusClient,
    worker: Option<JoinHandle<()>>,
}

impl ServiceHandle {
    /// A client connected to the service
    pub fn client(&self) -> BusClient {
        self.client.clone()
    }

    /// Stop the worker and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.client.shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Background service panicked");
            }
        }
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::messaging::MemoryClipboard;
    use crate::page::{ComputedStyle, PageDump, Rect};
    use std::time::Duration;

    fn page() -> PageDump {
        PageDump::new()
            .with_element(
                ComputedStyle::new()
                    .with("font-family", "Inter, sans-serif")
                    .with("font-size", "16px")
                    .with("font-weight", "400")
                    .with("font-style", "normal"),
            )
            .with_pixels(
                2,
                2,
                vec![(255, 0, 0), (255, 0, 0), (0, 0, 255), (0, 0, 255)],
            )
    }

    fn service() -> (BackgroundService, MemoryClipboard) {
        let clipboard = MemoryClipboard::new();
        let service = BackgroundService::new(
            Arc::new(page()),
            Box::new(clipboard.clone()),
            PaletteStore::new(Arc::new(MemoryStore::new())),
        )
        .with_snap_colors(3);
        (service, clipboard)
    }

    #[test]
    fn test_color_pick_ends_picker() {
        let (mut service, _) = service();
        assert_eq!(service.handle(Action::StartColorPicker), Response::Ack);
        assert_eq!(service.mode(), InteractiveMode::ColorPicker);

        let response = service.handle(Action::GetColorAtPosition { x: 0, y: 1 });
        assert_eq!(response, Response::Color(Some("#0000ff".to_string())));
        assert_eq!(service.mode(), InteractiveMode::Idle);

        assert_eq!(
            service.handle(Action::GetColorAtPosition { x: 9, y: 9 }),
            Response::Color(None)
        );
    }

    #[test]
    fn test_escape_cancels_area_snap() {
        let (mut service, _) = service();
        service.handle(Action::StartAreaSnap);
        service.handle_key(KeyEvent::Escape);
        assert_eq!(service.mode(), InteractiveMode::Idle);
    }

    #[test]
    fn test_snap_area_dedups() {
        let (mut service, _) = service();
        let response = service.handle(Action::SnapArea {
            rect: Rect::new(0, 0, 2, 2),
        });
        assert_eq!(
            response,
            Response::Colors(vec!["#ff0000".to_string(), "#0000ff".to_string()])
        );
    }

    #[test]
    fn test_fonts_and_clipboard() {
        let (mut service, clipboard) = service();
        match service.handle(Action::GetPageFonts) {
            Response::Fonts(fonts) => assert_eq!(fonts[0].name, "Inter"),
            other => panic!("unexpected response: {:?}", other),
        }

        let response = service.handle(Action::CopyToClipboard {
            text: "#3366cc".to_string(),
        });
        assert_eq!(response, Response::Ack);
        assert_eq!(clipboard.last().as_deref(), Some("#3366cc"));
    }

    #[test]
    fn test_palette_actions() {
        let (mut service, _) = service();
        let saved = match service.handle(Action::SavePalette {
            name: "Snap".to_string(),
            colors: vec!["#FF0000".to_string()],
            url: Some("https://example.com".to_string()),
        }) {
            Response::Palette(p) => p,
            other => panic!("unexpected response: {:?}", other),
        };
        assert_eq!(saved.hexes(), vec!["#ff0000"]);

        match service.handle(Action::GetPalettes) {
            Response::Palettes(list) => assert_eq!(list.len(), 1),
            other => panic!("unexpected response: {:?}", other),
        }

        assert_eq!(
            service.handle(Action::DeletePalette { id: saved.id.clone() }),
            Response::Ack
        );
        assert!(service
            .handle(Action::DeletePalette { id: saved.id })
            .is_error());
        assert!(service
            .handle(Action::SavePalette {
                name: "bad".to_string(),
                colors: vec!["nope".to_string()],
                url: None,
            })
            .is_error());
    }

    fn history_service() -> (Arc<MemoryStore>, BackgroundService) {
        let mem = Arc::new(MemoryStore::new());
        let (service, _) = service();
        let service = service.with_history(ColorHistory::load(mem.clone()).unwrap());
        (mem, service)
    }

    fn history_colors(service: &mut BackgroundService) -> Vec<String> {
        match service.handle(Action::GetColorHistory) {
            Response::History(entries) => entries.into_iter().map(|e| e.color).collect(),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_picked_colors_enter_history() {
        let (mem, mut service) = history_service();
        service.handle(Action::GetColorAtPosition { x: 0, y: 0 });
        service.handle(Action::GetColorAtPosition { x: 9, y: 9 });
        service.handle(Action::GetColorAtPosition { x: 0, y: 1 });
        assert_eq!(history_colors(&mut service), vec!["#0000ff", "#ff0000"]);

        let stored = ColorHistory::load(mem).unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn test_snap_replaces_history() {
        let (_, mut service) = history_service();
        service.handle(Action::GetColorAtPosition { x: 0, y: 0 });
        service.handle(Action::GetColorAtPosition { x: 1, y: 0 });
        service.handle(Action::SnapArea {
            rect: Rect::new(0, 0, 2, 2),
        });
        assert_eq!(history_colors(&mut service), vec!["#ff0000", "#0000ff"]);

        assert_eq!(service.handle(Action::ClearColorHistory), Response::Ack);
        assert!(history_colors(&mut service).is_empty());
    }

    #[test]
    fn test_history_is_empty_when_not_configured() {
        let (mut service, _) = service();
        service.handle(Action::GetColorAtPosition { x: 0, y: 0 });
        assert!(service.history().is_none());
        assert!(history_colors(&mut service).is_empty());
        assert_eq!(service.handle(Action::ClearColorHistory), Response::Ack);
    }

    #[test]
    fn test_spawned_service_answers_each_request_once() {
        let (service, clipboard) = service();
        let handle = service.spawn();
        let client = handle.client();

        for i in 0..5 {
            let response = client
                .request_timeout(
                    Action::CopyToClipboard {
                        text: i.to_string(),
                    },
                    Duration::from_secs(5),
                )
                .unwrap();
            assert_eq!(response, Response::Ack);
        }
        assert_eq!(clipboard.history().len(), 5);

        client.press_key(KeyEvent::Escape).unwrap();
        handle.shutdown();
        assert!(client.request(Action::GetPalettes).is_err());
    }
}
