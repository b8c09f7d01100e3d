//! Dependency analysis — which scopes contain which style blocks.
//!
//! For every scoped block `i`, each style block inside the subtree of `i`'s
//! parent (block `i` itself, its siblings and anything nested deeper) is
//! marked as depending on `i`. While scope `k` is measured, a scoped block
//! `j` may stay active only when `j` is in the dependency set of `k`, i.e.
//! when `j`'s scope contains the block being measured.

use std::collections::BTreeSet;

use dom::Document;
use tracing::debug;

use crate::block::StyleBlocks;

/// `block index → indices of the scopes containing that block`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRelation {
    sets: Vec<BTreeSet<usize>>,
}

impl DependencyRelation {
    /// The scopes containing block `index`.
    pub fn depends_on(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.sets.get(index)
    }

    /// Whether block `index` lies inside the scope of block `scope`.
    pub fn contains(&self, index: usize, scope: usize) -> bool {
        self.depends_on(index).is_some_and(|set| set.contains(&scope))
    }

    /// Number of blocks covered.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Annotate every block's `depends_on` set and return the finished relation.
pub fn analyze(doc: &Document, blocks: &mut StyleBlocks) -> DependencyRelation {
    let scopes: Vec<_> = blocks
        .scoped()
        .filter_map(|b| b.scope_root.map(|root| (b.index, root)))
        .collect();

    for block in blocks.iter_mut() {
        block.depends_on.clear();
    }
    for &(scope, root) in &scopes {
        for block in blocks.iter_mut() {
            if doc.is_inclusive_descendant(block.node, root) {
                block.depends_on.insert(scope);
            }
        }
    }

    let sets: Vec<_> = blocks.iter().map(|b| b.depends_on.clone()).collect();
    debug!(blocks = sets.len(), scopes = scopes.len(), "analyzed scope dependencies");
    DependencyRelation { sets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScopeOptions;

    fn relation_for(source: &str) -> (StyleBlocks, DependencyRelation) {
        let doc = html::parse(source);
        let mut blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let relation = analyze(&doc, &mut blocks);
        (blocks, relation)
    }

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn sibling_scopes_are_independent() {
        let (_, relation) = relation_for(
            "<div><style scoped>.a{}</style><div class=a></div></div>\
             <div><style scoped>.a{}</style><div class=a></div></div>",
        );
        assert_eq!(relation.depends_on(0), Some(&set(&[0])));
        assert_eq!(relation.depends_on(1), Some(&set(&[1])));
    }

    #[test]
    fn nested_scope_depends_on_enclosing_scope() {
        let (blocks, relation) = relation_for(
            "<div id=p><style scoped>p{}</style>\
               <div id=c><style scoped>p{}</style><p>x</p></div>\
             </div>",
        );
        assert_eq!(relation.depends_on(0), Some(&set(&[0])));
        assert_eq!(relation.depends_on(1), Some(&set(&[0, 1])));
        assert!(relation.contains(1, 0));
        assert!(!relation.contains(0, 1));
        assert_eq!(blocks.get(1).unwrap().depends_on, set(&[0, 1]));
    }

    #[test]
    fn blocks_sharing_a_parent_depend_on_each_other() {
        let (_, relation) =
            relation_for("<div><style scoped>a{}</style><style scoped>b{}</style></div>");
        assert_eq!(relation.depends_on(0), Some(&set(&[0, 1])));
        assert_eq!(relation.depends_on(1), Some(&set(&[0, 1])));
    }

    #[test]
    fn unscoped_blocks_are_marked_but_never_scopes() {
        let (_, relation) = relation_for(
            "<style>body{}</style><div><style scoped>p{}</style><style>em{}</style></div>",
        );
        assert_eq!(relation.depends_on(0), Some(&set(&[])));
        assert_eq!(relation.depends_on(1), Some(&set(&[1])));
        assert_eq!(relation.depends_on(2), Some(&set(&[1])));
        assert_eq!(relation.len(), 3);
    }
}
