//! DOM node model.
//!
//! All nodes live in the document's node list and are referenced by [`NodeId`].
//! The tree structure is encoded via parent/child/sibling links stored directly on each node.

/// A handle into the document's node list that uniquely identifies a DOM node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// A single attribute on an element (e.g. `class="foo"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element data
// ---------------------------------------------------------------------------

/// Data specific to element nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    pub tag_name: String,
    pub attrs: Vec<Attr>,
    /// Cached `id` attribute value for fast lookup.
    pub id: Option<String>,
    /// Cached list of class names (split from the `class` attribute).
    pub classes: Vec<String>,
}

impl ElementData {
    /// Build element data, extracting the `id` and `classes` caches from `attrs`.
    pub fn new(tag_name: &str, attrs: Vec<Attr>) -> Self {
        let mut data = Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            id: None,
            classes: Vec::new(),
        };
        data.refresh_caches();
        data
    }

    /// Value of the attribute `name` (ASCII case-insensitive), if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Presence test. Boolean attributes count regardless of their value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attr::new(name.to_ascii_lowercase(), value)),
        }
        self.refresh_caches();
    }

    /// Remove the attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        let removed = self.attrs.remove(pos);
        self.refresh_caches();
        Some(removed.value)
    }

    fn refresh_caches(&mut self) {
        self.id = self.attr("id").map(String::from);
        self.classes = self
            .attr("class")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
    }
}

// ---------------------------------------------------------------------------
// Node data (variant per node type)
// ---------------------------------------------------------------------------

/// The payload that distinguishes different kinds of DOM nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    DocumentType { name: String },
    Element(ElementData),
    Text { data: String },
    Comment { data: String },
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single node in the DOM tree.
///
/// Tree links (`parent`, `first_child`, …) form an intrusive doubly-linked
/// child list so that insertions and removals are O(1).
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,

    // -- tree links ----------------------------------------------------------
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Create a new detached node.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    /// If this is an element, return a reference to its [`ElementData`].
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// If this is an element, return a mutable reference to its [`ElementData`].
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` for an element whose tag name is `tag` (ASCII case-insensitive).
    pub fn is_element_named(&self, tag: &str) -> bool {
        self.as_element()
            .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_caches_follow_attribute_edits() {
        let mut el = ElementData::new("DIV", vec![Attr::new("class", "a b")]);
        assert_eq!(el.tag_name, "div");
        assert_eq!(el.classes, vec!["a", "b"]);

        el.set_attr("id", "main");
        el.set_attr("class", "c");
        assert_eq!(el.id.as_deref(), Some("main"));
        assert_eq!(el.classes, vec!["c"]);

        assert_eq!(el.remove_attr("ID"), Some("main".to_string()));
        assert_eq!(el.id, None);
        assert_eq!(el.remove_attr("id"), None);
    }

    #[test]
    fn boolean_attribute_presence_ignores_value() {
        let el = ElementData::new(
            "style",
            vec![Attr::new("scoped", ""), Attr::new("media", "screen")],
        );
        assert!(el.has_attr("scoped"));
        assert!(el.has_attr("SCOPED"));
        assert_eq!(el.attr("scoped"), Some(""));
        assert!(!el.has_attr("disabled"));
    }
}
