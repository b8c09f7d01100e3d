//! DOM tree operations.
//!
//! The [`Document`] owns every node and provides tree-manipulation methods
//! that keep the intrusive parent/child/sibling links consistent. Nodes are
//! never freed; a removed subtree simply becomes detached.

use crate::node::{Attr, ElementData, Node, NodeData, NodeId};

/// Attribute that carries an element's inline style override.
pub const STYLE_ATTRIBUTE: &str = "style";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The complete DOM tree. Node `0` is always the document node.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only its root document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element payload of `id`, or `None` for missing and non-element nodes.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(id).and_then(Node::as_element_mut)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The document node itself is always present.
        self.nodes.len() <= 1
    }

    // =======================================================================
    // Node creation
    // =======================================================================

    fn allocate(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.allocate(NodeData::DocumentType {
            name: name.to_string(),
        })
    }

    /// Create a detached element. `id` and `classes` caches are extracted from `attrs`.
    pub fn create_element(&mut self, tag_name: &str, attrs: Vec<Attr>) -> NodeId {
        self.allocate(NodeData::Element(ElementData::new(tag_name, attrs)))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Text {
            data: data.to_string(),
        })
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Comment {
            data: data.to_string(),
        })
    }

    // =======================================================================
    // Tree mutation
    // =======================================================================

    /// Append `child` as the last child of `parent`.
    ///
    /// If `child` already has a parent it is first removed from its current
    /// position.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(child).and_then(|n| n.parent).is_some() {
            self.detach(child);
        }

        let old_last = self.node(parent).and_then(|n| n.last_child);

        if let Some(old_last_node) = old_last.and_then(|id| self.node_mut(id)) {
            old_last_node.next_sibling = Some(child);
        }

        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = old_last;
            child_node.next_sibling = None;
        }

        if let Some(parent_node) = self.node_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = Some(child);
            }
            parent_node.last_child = Some(child);
        }
    }

    /// Remove `child` from `parent`'s child list. No-op when `child` belongs
    /// to another parent.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let belongs = self
            .node(child)
            .map(|n| n.parent == Some(parent))
            .unwrap_or(false);
        if belongs {
            self.detach(child);
        }
    }

    fn detach(&mut self, node_id: NodeId) {
        let (parent_id, prev, next) = match self.node(node_id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if let Some(prev_node) = prev.and_then(|id| self.node_mut(id)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|id| self.node_mut(id)) {
            next_node.prev_sibling = prev;
        }
        if let Some(parent_node) = parent_id.and_then(|id| self.node_mut(id)) {
            if parent_node.first_child == Some(node_id) {
                parent_node.first_child = next;
            }
            if parent_node.last_child == Some(node_id) {
                parent_node.last_child = prev;
            }
        }

        if let Some(node) = self.node_mut(node_id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Return the immediate children of `parent` in document order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(parent).and_then(|n| n.first_child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id).and_then(|n| n.next_sibling);
        }
        out
    }

    /// Return the chain of ancestors from `node` up to (and including) the root.
    /// The first element is the direct parent, the last is the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.parent(id);
        }
        out
    }

    /// Return all descendants of `node` in pre-order DFS (not including `node` itself).
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Element descendants of `node` in document order.
    pub fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(Node::is_element))
            .collect()
    }

    /// `true` when `node` is `ancestor` or lies somewhere beneath it.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// `true` when `node` is connected to the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_descendant(node, self.root())
    }

    // =======================================================================
    // Queries
    // =======================================================================

    /// Return all elements whose tag name matches `tag` (ASCII case-insensitive)
    /// in the subtree rooted at `root`, root included, in document order.
    pub fn get_elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|&id| self.node(id).is_some_and(|n| n.is_element_named(tag)))
            .collect()
    }

    /// Find the first element with the given `id` attribute under `root`.
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    // =======================================================================
    // Attributes
    // =======================================================================

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute. Returns `false` when `node` is not an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        match self.element_mut(node) {
            Some(e) => {
                e.set_attr(name, value);
                true
            }
            None => false,
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.element_mut(node).and_then(|e| e.remove_attr(name))
    }

    // =======================================================================
    // Inline style override
    // =======================================================================

    /// The element's inline style override text, if any.
    pub fn inline_style(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, STYLE_ATTRIBUTE)
    }

    /// Replace the inline style override. Empty text removes the attribute.
    pub fn set_inline_style(&mut self, node: NodeId, text: &str) -> bool {
        if text.trim().is_empty() {
            self.remove_attribute(node, STYLE_ATTRIBUTE);
            self.element(node).is_some()
        } else {
            self.set_attribute(node, STYLE_ATTRIBUTE, text)
        }
    }

    // =======================================================================
    // Text content
    // =======================================================================

    /// Concatenated data of all text descendants, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeData::Text { data }) = self.node(node).map(|n| &n.data) {
            out.push_str(data);
            return out;
        }
        for id in self.descendants(node) {
            if let Some(NodeData::Text { data }) = self.node(id).map(|n| &n.data) {
                out.push_str(data);
            }
        }
        out
    }

    /// Replace all children of `node` with a single text node holding `text`
    /// (or with nothing when `text` is empty).
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let Some(Node {
            data: NodeData::Text { data },
            ..
        }) = self.node_mut(node)
        {
            *data = text.to_string();
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
