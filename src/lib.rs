//! # selector-inspector
//!
//! Right-click element picking for external inspection tools. For the
//! picked element two locators are derived, a CSS selector path and an
//! XPath, and sent as `{"css": ..., "xpath": ...}` over a local WebSocket
//! (`ws://localhost:8765`).
//!
//! ## Features
//!
//! - **Locator derivation**: [`locator::css_path`] and [`locator::xpath`], pure tree walks
//!   over the [`dom::DomNode`] capability interface
//! - **Event bridge**: send-now-or-when-open dispatch with a one-shot install guard
//! - **Content script** (`wasm`): the bridge wired to the live page through `web-sys`
//! - **Listener** (`listener`): the receiving WebSocket endpoint
//! - **Headless locate** (`browser`): derive locators on a Chrome page via CDP
//! - **Link export**: resolve the `href` of picked elements and write them as TXT or CSV
//!
//! ## Building the content script
//!
//! ```bash
//! wasm-pack build --target web --no-default-features --features wasm
//! ```
//!
//! ## Receiving picks
//!
//! ```bash
//! cargo run -- listen --json
//! ```
//!
//! ## Library Usage
//!
//! ```rust
//! use selector_inspector::dom::{DomTree, ElementNode};
//! use selector_inspector::Locator;
//!
//! # fn main() -> selector_inspector::Result<()> {
//! let tree = DomTree::new(ElementNode::new("html").with_children(vec![
//!     ElementNode::new("body").with_children(vec![
//!         ElementNode::new("div").with_id("x").with_children(vec![
//!             ElementNode::new("p"),
//!             ElementNode::new("p"),
//!         ]),
//!     ]),
//! ]));
//!
//! let second = tree.find_by_id("x").unwrap().element_children()[1];
//! let locator = Locator::derive(&second)?;
//!
//! assert_eq!(locator.css, "div#x > p:nth-of-type(2)");
//! assert_eq!(locator.xpath, r#"//div[@id="x"]/p[2]"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: DOM capability interface and the owned tree
//! - [`locator`]: CSS path / XPath derivation and replay
//! - [`bridge`]: socket dispatch and install guard
//! - [`error`]: Error types and result aliases
//! - [`links`]: link collection and export
//! - `browser`: Chrome session management (requires `browser` feature)
//! - `listener`: locator WebSocket server (requires `listener` feature)
//! - `web`: content script entry point (requires `wasm` feature)

pub mod bridge;
pub mod dom;
pub mod error;
pub mod links;
pub mod locator;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "listener")]
pub mod listener;

#[cfg(feature = "wasm")]
pub mod web;

pub use bridge::{DEFAULT_ENDPOINT, Dispatch, EventBridge, ReadyState, Socket};
pub use dom::{DomNode, DomTree, ElementNode, NodeType};
pub use error::{InspectorError, Result};
pub use links::{LinkFormat, collect_links, write_links};
pub use locator::{LocatedElement, Locator};

#[cfg(feature = "browser")]
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};

#[cfg(feature = "listener")]
pub use listener::{ListenerConfig, LocatorListener};
