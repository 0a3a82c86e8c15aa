//! Content script entry point (feature `wasm`)
//!
//! Loaded into a page, [`start`] opens the locator socket and installs a
//! capturing `contextmenu` listener on the document. The native context menu
//! still appears: the listener never calls `preventDefault`.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, Node, WebSocket};

use crate::bridge::{BRIDGE_INSTALL, DEFAULT_ENDPOINT, EventBridge, ReadyState, Socket};
use crate::dom::{DomNode, NodeType};
use crate::error::{InspectorError, Result};

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    ConsoleLogger::install();

    if !BRIDGE_INSTALL.try_install() {
        log::debug!("selector bridge already installed");
        return Ok(());
    }

    install(DEFAULT_ENDPOINT).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn install(endpoint: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| InspectorError::ConnectionFailed("no document in this context".to_string()))?;

    let ws = WebSocket::new(endpoint).map_err(|e| InspectorError::ConnectionFailed(js_error(e)))?;
    let bridge = EventBridge::new(WebSocketChannel::new(ws));

    let on_context_menu = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
            return;
        };
        match bridge.handle_context_menu(&WebNode(target)) {
            Ok(dispatch) => log::debug!("locator {:?}", dispatch),
            Err(e) => log::warn!("pick dropped: {}", e),
        }
    });

    document
        .add_event_listener_with_callback_and_bool("contextmenu", on_context_menu.as_ref().unchecked_ref(), true)
        .map_err(|e| InspectorError::ConnectionFailed(js_error(e)))?;
    on_context_menu.forget();

    log::info!("selector bridge listening, sending to {}", endpoint);
    Ok(())
}

fn js_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(&err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

/// A live DOM node
#[derive(Debug, Clone)]
pub struct WebNode(pub Node);

impl DomNode for WebNode {
    fn node_type(&self) -> NodeType {
        NodeType::from(self.0.node_type())
    }

    fn tag_name(&self) -> String {
        self.0.node_name()
    }

    fn id(&self) -> Option<String> {
        self.0
            .dyn_ref::<web_sys::Element>()
            .map(|el| el.id())
            .filter(|id| !id.is_empty())
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_node().map(WebNode)
    }

    fn previous_element_sibling(&self) -> Option<Self> {
        self.0
            .dyn_ref::<web_sys::Element>()?
            .previous_element_sibling()
            .map(|el| WebNode(el.into()))
    }

    fn child_nodes(&self) -> Vec<Self> {
        let list = self.0.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).map(WebNode).collect()
    }

    fn is_document_body(&self) -> bool {
        self.0
            .owner_document()
            .and_then(|doc| doc.body())
            .is_some_and(|body| self.0.is_same_node(Some(AsRef::<Node>::as_ref(&body))))
    }

    fn is_same(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }
}

/// [`Socket`] over a browser `WebSocket`
#[derive(Debug, Clone)]
pub struct WebSocketChannel(Rc<WebSocket>);

impl WebSocketChannel {
    pub fn new(ws: WebSocket) -> Self {
        Self(Rc::new(ws))
    }
}

impl Socket for WebSocketChannel {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.0.ready_state())
    }

    fn send_text(&self, data: &str) -> Result<()> {
        self.0
            .send_with_str(data)
            .map_err(|e| InspectorError::SocketSendFailed(js_error(e)))
    }

    fn on_open_once(&self, callback: Box<dyn FnOnce()>) -> Result<()> {
        let options = AddEventListenerOptions::new();
        options.set_once(true);

        let listener = Closure::once_into_js(move || callback());
        self.0
            .add_event_listener_with_callback_and_add_event_listener_options(
                "open",
                listener.unchecked_ref(),
                &options,
            )
            .map_err(|e| InspectorError::SocketSendFailed(js_error(e)))
    }
}

/// `log` backend writing to the browser console
struct ConsoleLogger;

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

impl ConsoleLogger {
    fn install() {
        if log::set_logger(&CONSOLE_LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}
