//! Style block discovery — every `<style>` element of a document, in order.

use std::collections::BTreeSet;

use dom::{Document, NodeId};

use crate::options::ScopeOptions;

/// One style element, identified by its position in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    pub index: usize,
    pub node: NodeId,
    /// Root of the block's scope: the element's parent.
    pub scope_root: Option<NodeId>,
    /// Whether the block carries the scope marker attribute.
    pub scoped: bool,
    /// Indices of the scoped blocks whose scope contains this block.
    pub depends_on: BTreeSet<usize>,
}

/// Arena of the style blocks found in one pass, indexed by `StyleBlock::index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleBlocks {
    blocks: Vec<StyleBlock>,
}

impl StyleBlocks {
    /// Collect every style element of `doc` in document order.
    pub fn discover(doc: &Document, options: &ScopeOptions) -> Self {
        let blocks = doc
            .get_elements_by_tag(doc.root(), &options.style_tag)
            .into_iter()
            .enumerate()
            .map(|(index, node)| StyleBlock {
                index,
                node,
                scope_root: doc.parent(node),
                scoped: doc.has_attribute(node, &options.marker_attribute),
                depends_on: BTreeSet::new(),
            })
            .collect();
        Self { blocks }
    }

    pub fn get(&self, index: usize) -> Option<&StyleBlock> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StyleBlock> {
        self.blocks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, StyleBlock> {
        self.blocks.iter_mut()
    }

    /// Scoped blocks only, in document order.
    pub fn scoped(&self) -> impl Iterator<Item = &StyleBlock> + '_ {
        self.blocks.iter().filter(|b| b.scoped)
    }

    /// Index of the first scoped block after `index`.
    pub fn next_scoped_after(&self, index: Option<usize>) -> Option<usize> {
        self.scoped()
            .map(|b| b.index)
            .find(|&i| index.is_none_or(|after| i > after))
    }
}

impl<'a> IntoIterator for &'a StyleBlocks {
    type Item = &'a StyleBlock;
    type IntoIter = std::slice::Iter<'a, StyleBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_blocks_in_document_order() {
        let doc = html::parse(
            r#"<style>body {}</style>
            <div id="a"><style scoped>p {}</style><p>x</p></div>
            <div id="b"><style scoped="false">p {}</style></div>"#,
        );
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks.iter().map(|b| (b.index, b.scoped)).collect::<Vec<_>>(),
            vec![(0, false), (1, true), (2, true)]
        );
        let a = doc.get_element_by_id(doc.root(), "a");
        assert_eq!(blocks.get(1).unwrap().scope_root, a);
        assert_eq!(blocks.scoped().count(), 2);
    }

    #[test]
    fn next_scoped_after_skips_unscoped() {
        let doc = html::parse(
            "<div><style scoped></style></div><style></style><div><style scoped></style></div>",
        );
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        assert_eq!(blocks.next_scoped_after(None), Some(0));
        assert_eq!(blocks.next_scoped_after(Some(0)), Some(2));
        assert_eq!(blocks.next_scoped_after(Some(2)), None);
    }

    #[test]
    fn custom_marker_attribute() {
        let doc = html::parse("<div><style data-scoped>p {}</style><style scoped></style></div>");
        let options = ScopeOptions::new().with_marker_attribute("data-scoped");
        let blocks = StyleBlocks::discover(&doc, &options);
        assert!(blocks.get(0).unwrap().scoped);
        assert!(!blocks.get(1).unwrap().scoped);
    }

    #[test]
    fn no_style_elements() {
        let doc = html::parse("<p>plain</p>");
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        assert!(blocks.is_empty());
        assert_eq!(blocks.next_scoped_after(None), None);
    }
}
