//! DOM model used by the locator derivers
//!
//! This module provides:
//! - DomNode: the capability interface the derivers are written against
//! - ElementNode: nested node for hand-built documents
//! - SnapshotNode: flat page snapshot entry, parent by index
//! - DomTree: owned, arena-backed DOM implementing DomNode

pub mod element;
pub mod node;
pub mod tree;

pub use element::ElementNode;
pub use node::{DomNode, NodeType};
pub use tree::{DomTree, NodeId, SnapshotNode, TreeNode};
