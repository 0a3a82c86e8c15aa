//! Event bridge: turns a picked element into a locator message on a socket.
//!
//! The socket is owned elsewhere and only observed through [`Socket`]. When
//! it is open the payload goes out immediately; otherwise a one-time open
//! listener is registered per pick, and each of those fires at most once.
//! There is no acknowledgement and no retry, and a socket that never opens
//! simply never delivers.

use crate::dom::DomNode;
use crate::error::Result;
use crate::locator::Locator;
use std::sync::atomic::{AtomicBool, Ordering};

/// Endpoint the browser side connects to
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";

/// Port of [`DEFAULT_ENDPOINT`]
pub const DEFAULT_PORT: u16 = 8765;

/// WebSocket `readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl From<u16> for ReadyState {
    fn from(value: u16) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

/// The socket capabilities the bridge relies on
pub trait Socket: Clone + 'static {
    fn ready_state(&self) -> ReadyState;

    /// Send one text frame
    fn send_text(&self, data: &str) -> Result<()>;

    /// Run `callback` the next time the socket opens, then forget it
    fn on_open_once(&self, callback: Box<dyn FnOnce()>) -> Result<()>;
}

/// What happened to a pick's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent on an open socket
    Sent,
    /// Waiting for the socket to open
    Deferred,
}

/// Context-menu handler bound to one socket
#[derive(Debug, Clone)]
pub struct EventBridge<S> {
    socket: S,
}

impl<S: Socket> EventBridge<S> {
    pub fn new(socket: S) -> Self {
        Self { socket }
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    /// Derive the locator for a right-clicked element and ship it
    pub fn handle_context_menu<N: DomNode>(&self, target: &N) -> Result<Dispatch> {
        let locator = Locator::derive(target)?;
        log::debug!("picked css={} xpath={}", locator.css, locator.xpath);
        self.dispatch(locator.to_json()?)
    }

    /// Send `payload` now, or once the socket opens
    pub fn dispatch(&self, payload: String) -> Result<Dispatch> {
        if self.socket.ready_state() == ReadyState::Open {
            self.socket.send_text(&payload)?;
            return Ok(Dispatch::Sent);
        }

        let socket = self.socket.clone();
        self.socket.on_open_once(Box::new(move || {
            if let Err(e) = socket.send_text(&payload) {
                log::warn!("Deferred locator send failed: {}", e);
            }
        }))?;
        Ok(Dispatch::Deferred)
    }
}

/// One-shot install flag. The first [`try_install`](Self::try_install)
/// wins; every later call is a no-op. There is no teardown.
#[derive(Debug, Default)]
pub struct Installation {
    installed: AtomicBool,
}

impl Installation {
    pub const fn new() -> Self {
        Self {
            installed: AtomicBool::new(false),
        }
    }

    /// Returns `true` only for the first caller
    pub fn try_install(&self) -> bool {
        self.installed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }
}

/// Guards the page-wide context-menu listener
pub static BRIDGE_INSTALL: Installation = Installation::new();
