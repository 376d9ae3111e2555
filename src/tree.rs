use std::fmt::Debug;

use crate::Result;
use crate::dom::{Document, NodeId};

/// The tree operations selector resolution needs.
///
/// Queries from `root` only return descendants of `root`, but compound
/// selectors on the left of a combinator may match `root` itself or anything
/// above it, as `Element.querySelectorAll` does.
pub trait ElementTree {
    type Node: Copy + Eq + Debug;

    fn document(&self) -> Self::Node;

    fn is_document(&self, node: Self::Node) -> bool;

    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, node: Self::Node, name: &str) -> Result<()>;

    fn query_selector(&self, root: Self::Node, selector: &str) -> Result<Option<Self::Node>>;

    fn query_selector_all(&self, root: Self::Node, selector: &str) -> Result<Vec<Self::Node>>;
}

impl ElementTree for Document {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn is_document(&self, node: NodeId) -> bool {
        Document::is_document(self, node)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attr(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.set_attr(node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.remove_attr(node, name)
    }

    fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector_from(root, selector)
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(root, selector)
    }
}
