use serde::{Deserialize, Serialize};

/// DOM node type, serialized as the numeric `Node.nodeType` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum NodeType {
    #[default]
    Element,
    Text,
    Comment,
    Document,
    Other(u16),
}

impl From<u16> for NodeType {
    fn from(value: u16) -> Self {
        match value {
            1 => NodeType::Element,
            3 => NodeType::Text,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            other => NodeType::Other(other),
        }
    }
}

impl From<NodeType> for u16 {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::Element => 1,
            NodeType::Text => 3,
            NodeType::Comment => 8,
            NodeType::Document => 9,
            NodeType::Other(other) => other,
        }
    }
}

/// The capabilities the locator derivers need from a DOM node.
///
/// Implemented over the live browser DOM (`web::WebNode`, feature `wasm`)
/// and over the owned [`DomTree`](super::DomTree), so the derivers can be
/// exercised without a browser.
pub trait DomNode: Clone {
    /// The `nodeType` of this node
    fn node_type(&self) -> NodeType;

    /// The raw `nodeName` as the DOM reports it (uppercase for HTML elements)
    fn tag_name(&self) -> String;

    /// The `id` attribute; `None` when absent, empty, or not an element
    fn id(&self) -> Option<String>;

    /// The parent node, including the document
    fn parent(&self) -> Option<Self>;

    /// The closest preceding sibling that is an element
    fn previous_element_sibling(&self) -> Option<Self>;

    /// All child nodes in order, including text and comment nodes
    fn child_nodes(&self) -> Vec<Self>;

    /// Whether this node is the body of its owning document
    fn is_document_body(&self) -> bool;

    /// Node identity
    fn is_same(&self, other: &Self) -> bool;

    fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }
}
