//! The receiving end of the locator socket (feature `listener`).
//!
//! Accepts WebSocket connections at `/` and turns every text frame into a
//! [`Locator`] on an unbounded channel. Malformed frames are logged and
//! dropped; nothing is ever sent back.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::bridge::DEFAULT_PORT;
use crate::error::{InspectorError, Result};
use crate::locator::Locator;

/// Where the listener binds
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ListenerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

}

/// Decode one wire message
pub fn parse_payload(raw: &str) -> Result<Locator> {
    Ok(serde_json::from_str(raw)?)
}

/// A bound, not yet serving, locator listener
pub struct LocatorListener {
    listener: TcpListener,
}

impl LocatorListener {
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| {
                InspectorError::ListenerFailed(format!("Failed to bind {}:{}: {}", config.host, config.port, e))
            })?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, forwarding every decoded locator to `sink`
    pub async fn serve<F>(self, sink: mpsc::UnboundedSender<Locator>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Router::new()
            .route(
                "/",
                get(
                    |ws: WebSocketUpgrade, State(sink): State<mpsc::UnboundedSender<Locator>>| async move {
                        ws.on_upgrade(move |socket| handle_socket(socket, sink))
                    },
                ),
            )
            .with_state(sink);

        log::info!("listening for locators on ws://{}", self.local_addr()?);

        axum::serve(self.listener, app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| InspectorError::ListenerFailed(e.to_string()))
    }
}

async fn handle_socket(mut socket: WebSocket, sink: mpsc::UnboundedSender<Locator>) {
    log::debug!("picker connected");

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => match parse_payload(text.as_str()) {
                Ok(locator) => {
                    if sink.send(locator).is_err() {
                        log::debug!("locator receiver dropped, closing connection");
                        break;
                    }
                }
                Err(e) => log::warn!("Ignoring malformed locator message: {}", e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!("picker websocket error: {}", e);
                break;
            }
        }
    }

    log::debug!("picker disconnected");
}
