use crate::dom::element::ElementNode;
use crate::dom::node::{DomNode, NodeType};
use crate::error::{InspectorError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "browser")]
use headless_chrome::Tab;
#[cfg(feature = "browser")]
use std::sync::Arc;

/// Index of a node inside a [`DomTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    node_type: NodeType,
    tag_name: String,
    attributes: IndexMap<String, String>,
    text_content: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    picked: bool,
}

/// One node of a flat page snapshot.
///
/// Nodes are listed in document order; `parent` is the index of the parent
/// within the same list, or `None` for the document element.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotNode {
    #[serde(default)]
    pub parent: Option<usize>,

    #[serde(default)]
    pub node_type: NodeType,

    pub tag_name: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub picked: bool,
}

/// An owned DOM with parent links.
///
/// Node 0 is a synthetic `#document`; the snapshot root is appended as its
/// only child, so the root element's parent is not an element, exactly like
/// `<html>` in a browser. Nodes are stored in document order.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<NodeData>,
}

impl DomTree {
    /// Build a tree whose document element is `root`
    pub fn new(root: ElementNode) -> Self {
        let mut tree = Self::empty();

        // Explicit stack so nesting depth is not bounded by the call stack
        let mut pending = vec![(NodeId(0), root)];
        while let Some((parent, node)) = pending.pop() {
            let ElementNode {
                node_type,
                tag_name,
                attributes,
                text_content,
                children,
                picked,
            } = node;
            let id = tree.push(NodeData {
                node_type,
                tag_name,
                attributes,
                text_content,
                parent: Some(parent),
                children: Vec::new(),
                picked,
            });
            pending.extend(children.into_iter().rev().map(|child| (id, child)));
        }
        tree
    }

    /// Build a tree from a flat snapshot.
    ///
    /// Every `parent` index must point at an earlier node.
    pub fn from_snapshot(nodes: Vec<SnapshotNode>) -> Result<Self> {
        let mut tree = Self::empty();
        for (index, node) in nodes.into_iter().enumerate() {
            let parent = match node.parent {
                None => NodeId(0),
                Some(p) if p < index => NodeId(p + 1),
                Some(p) => {
                    return Err(InspectorError::DomParseFailed(format!(
                        "node {} has parent {} which does not precede it",
                        index, p
                    )));
                }
            };
            tree.push(NodeData {
                node_type: node.node_type,
                tag_name: node.tag_name,
                attributes: node.attributes,
                text_content: node.text_content,
                parent: Some(parent),
                children: Vec::new(),
                picked: node.picked,
            });
        }
        Ok(tree)
    }

    fn empty() -> Self {
        Self {
            nodes: vec![NodeData {
                node_type: NodeType::Document,
                tag_name: "#document".to_string(),
                attributes: IndexMap::new(),
                text_content: None,
                parent: None,
                children: Vec::new(),
                picked: false,
            }],
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = data.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(data);
        id
    }

    /// Snapshot the DOM of a browser tab, marking every element matching `pick`
    #[cfg(feature = "browser")]
    pub fn from_tab(tab: &Arc<Tab>, pick: Option<&str>) -> Result<Self> {
        let selector_arg = serde_json::to_string(&pick)?;
        let js_code = format!("({})({})", include_str!("snapshot_dom.js"), selector_arg);

        let result = tab
            .evaluate(&js_code, false)
            .map_err(|e| InspectorError::DomParseFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| InspectorError::DomParseFailed("No value returned from DOM snapshot".to_string()))?;

        // The script returns a JSON string rather than an object
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| InspectorError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let nodes: Vec<SnapshotNode> = serde_json::from_str(&json_str)
            .map_err(|e| InspectorError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;

        let tree = Self::from_snapshot(nodes)?;
        log::debug!(
            "DOM snapshot: {} elements, {} picked",
            tree.count_elements(),
            tree.picked().len()
        );
        Ok(tree)
    }

    /// Handle for a node
    ///
    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> TreeNode<'_> {
        assert!(id.0 < self.nodes.len(), "node {:?} is not part of this tree", id);
        TreeNode { tree: self, id }
    }

    /// The synthetic document node
    pub fn document(&self) -> TreeNode<'_> {
        self.node(NodeId(0))
    }

    /// The first element child of the document (`<html>`)
    pub fn document_element(&self) -> Option<TreeNode<'_>> {
        self.document().child_nodes().into_iter().find(|n| n.is_element())
    }

    /// The first `body` element child of the document element
    pub fn body(&self) -> Option<TreeNode<'_>> {
        self.document_element()?
            .child_nodes()
            .into_iter()
            .find(|n| n.is_element() && n.tag_name().eq_ignore_ascii_case("body"))
    }

    /// All element nodes in document order
    pub fn elements(&self) -> impl Iterator<Item = TreeNode<'_>> + '_ {
        (0..self.nodes.len())
            .map(move |i| self.node(NodeId(i)))
            .filter(|n| n.is_element())
    }

    /// First element whose id attribute equals `id`
    pub fn find_by_id(&self, id: &str) -> Option<TreeNode<'_>> {
        self.elements().find(|n| n.id().as_deref() == Some(id))
    }

    /// Elements marked as picked by the snapshot
    pub fn picked(&self) -> Vec<TreeNode<'_>> {
        self.elements().filter(|n| self.nodes[n.id.0].picked).collect()
    }

    /// Count element nodes
    pub fn count_elements(&self) -> usize {
        self.elements().count()
    }
}

/// A borrowed handle to one node of a [`DomTree`]
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> TreeNode<'a> {
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a DomTree {
        self.tree
    }

    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    /// Attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.data().attributes.get(key).map(String::as_str)
    }

    /// Node value of text and comment nodes
    pub fn text_content(&self) -> Option<&'a str> {
        self.data().text_content.as_deref()
    }

    /// Element children only
    pub fn element_children(&self) -> Vec<TreeNode<'a>> {
        self.child_nodes().into_iter().filter(|n| n.is_element()).collect()
    }
}

impl PartialEq for TreeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for TreeNode<'_> {}

impl DomNode for TreeNode<'_> {
    fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    fn tag_name(&self) -> String {
        self.data().tag_name.clone()
    }

    fn id(&self) -> Option<String> {
        if !self.is_element() {
            return None;
        }
        self.attribute("id").filter(|id| !id.is_empty()).map(str::to_string)
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    fn previous_element_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let position = siblings.iter().position(|&id| id == self.id)?;
        siblings[..position]
            .iter()
            .rev()
            .map(|&id| self.tree.node(id))
            .find(|n| n.is_element())
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.data().children.iter().map(|&id| self.tree.node(id)).collect()
    }

    fn is_document_body(&self) -> bool {
        self.tree.body().is_some_and(|body| body.id == self.id)
    }

    fn is_same(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}
