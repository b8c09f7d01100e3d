//! The active rule set — which style blocks currently take part in the cascade.
//!
//! Measurements never read rule text from the document; they go through an
//! [`ActiveRuleSet`], where suppressing a scoped block is a flag flip and
//! reactivating it yields its backed-up text unchanged.

use css::{Stylesheet, parse_stylesheet};
use dom::Document;

use crate::backup::StyleBackupStore;
use crate::block::StyleBlocks;
use crate::error::{Result, ScopeError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct RuleBlock {
    scoped: bool,
    active: bool,
    text: String,
    sheet: Stylesheet,
}

/// Parsed rules of every style block in document order, each with an
/// `active` flag. Only scoped blocks can be deactivated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveRuleSet {
    blocks: Vec<RuleBlock>,
}

impl ActiveRuleSet {
    /// Build the set from the backups of scoped blocks and the live text of
    /// unscoped ones. Every block starts active.
    pub fn build(doc: &Document, blocks: &StyleBlocks, backup: &StyleBackupStore) -> Result<Self> {
        let blocks = blocks
            .iter()
            .map(|block| {
                let text = if block.scoped {
                    backup
                        .original(block.index)
                        .ok_or(ScopeError::MissingBackup(block.index))?
                        .to_string()
                } else {
                    if doc.element(block.node).is_none() {
                        return Err(ScopeError::MissingNode(block.node));
                    }
                    doc.text_content(block.node)
                };
                Ok(RuleBlock {
                    scoped: block.scoped,
                    active: true,
                    sheet: parse_stylesheet(&text),
                    text,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_scoped(&self, index: usize) -> bool {
        self.blocks.get(index).is_some_and(|b| b.scoped)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.blocks.get(index).is_some_and(|b| b.active)
    }

    /// Switch block `index` on or off. Unscoped blocks ignore deactivation.
    pub fn set_active(&mut self, index: usize, active: bool) -> Result<()> {
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(ScopeError::UnknownBlock(index))?;
        if block.scoped {
            block.active = active;
        }
        Ok(())
    }

    pub fn activate_all(&mut self) {
        for block in &mut self.blocks {
            block.active = true;
        }
    }

    /// Indices of the blocks currently switched off.
    pub fn inactive(&self) -> Vec<usize> {
        (0..self.blocks.len())
            .filter(|&i| !self.blocks[i].active)
            .collect()
    }

    /// The rule text block `index` contributes right now: its original text
    /// when active, empty when suppressed.
    pub fn current_text(&self, index: usize) -> Option<&str> {
        self.blocks
            .get(index)
            .map(|b| if b.active { b.text.as_str() } else { "" })
    }

    /// Stylesheets of the active blocks, in cascade order.
    pub fn active_sheets(&self) -> Vec<&Stylesheet> {
        self.blocks
            .iter()
            .filter(|b| b.active)
            .map(|b| &b.sheet)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScopeOptions;

    fn build(source: &str) -> ActiveRuleSet {
        let doc = html::parse(source);
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let mut backup = StyleBackupStore::new();
        backup.backup(&doc, &blocks).unwrap();
        ActiveRuleSet::build(&doc, &blocks, &backup).unwrap()
    }

    #[test]
    fn everything_starts_active() {
        let rules = build("<style>p { margin: 0 }</style><div><style scoped>.a { color: red }</style></div>");
        assert_eq!(rules.len(), 2);
        assert!(rules.is_active(0) && rules.is_active(1));
        assert_eq!(rules.active_sheets().len(), 2);
        assert_eq!(rules.current_text(1), Some(".a { color: red }"));
    }

    #[test]
    fn only_scoped_blocks_can_be_suppressed() {
        let mut rules =
            build("<style>p { margin: 0 }</style><div><style scoped>.a { color: red }</style></div>");
        rules.set_active(0, false).unwrap();
        rules.set_active(1, false).unwrap();
        assert!(rules.is_active(0));
        assert!(!rules.is_active(1));
        assert_eq!(rules.current_text(1), Some(""));
        assert_eq!(rules.inactive(), vec![1]);
        assert_eq!(rules.active_sheets().len(), 1);

        rules.activate_all();
        assert_eq!(rules.current_text(1), Some(".a { color: red }"));
        assert!(rules.inactive().is_empty());
    }

    #[test]
    fn unknown_index_is_an_error() {
        let mut rules = build("<p>no styles</p>");
        assert!(rules.is_empty());
        assert_eq!(rules.set_active(3, false), Err(ScopeError::UnknownBlock(3)));
        assert_eq!(rules.current_text(3), None);
    }

    #[test]
    fn scoped_block_without_backup_is_rejected() {
        let doc = html::parse("<div><style scoped>p {}</style></div>");
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let backup = StyleBackupStore::new();
        assert_eq!(
            ActiveRuleSet::build(&doc, &blocks, &backup),
            Err(ScopeError::MissingBackup(0))
        );
    }
}
