use crate::dom::node::NodeType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A nested DOM node.
///
/// Used to describe documents by hand. [`DomTree`](super::DomTree) flattens
/// it into an arena with parent links; page snapshots arrive flat as
/// [`SnapshotNode`](super::SnapshotNode)s instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// DOM node type (element, text, comment, ...)
    #[serde(default)]
    pub node_type: NodeType,

    /// Raw node name (e.g. "DIV" from a live page, "div" in hand-built trees, "#text")
    pub tag_name: String,

    /// Attributes in document order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    /// Node value of text and comment nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child nodes, including text and comment nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Whether the element matched the selector the snapshot was taken with
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub picked: bool,
}

impl ElementNode {
    /// Create a new element node
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Element,
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            text_content: None,
            children: Vec::new(),
            picked: false,
        }
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Text,
            tag_name: "#text".to_string(),
            text_content: Some(content.into()),
            ..Self::new("")
        }
    }

    /// Create a comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Comment,
            tag_name: "#comment".to_string(),
            text_content: Some(content.into()),
            ..Self::new("")
        }
    }

    /// Builder method: set the id attribute
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Builder method: add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: mark as picked
    pub fn picked(mut self) -> Self {
        self.picked = true;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child node
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.node_type == NodeType::Element && self.tag_name.eq_ignore_ascii_case(tag)
    }
}
