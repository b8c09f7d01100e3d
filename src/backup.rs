//! Original rule text of the scoped blocks, kept for one resolution pass.

use dom::Document;
use tracing::trace;

use crate::block::{StyleBlock, StyleBlocks};
use crate::error::{Result, ScopeError};

/// Per-block backups indexed by `StyleBlock::index`.
///
/// `None` means the block was never backed up; `Some("")` is a block that
/// was backed up while empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleBackupStore {
    originals: Vec<Option<String>>,
}

impl StyleBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current text of every scoped block that has no backup yet.
    /// Returns how many blocks were recorded by this call.
    pub fn backup(&mut self, doc: &Document, blocks: &StyleBlocks) -> Result<usize> {
        let mut recorded = 0;
        for block in blocks.scoped() {
            if self.backup_block(doc, block)? {
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    /// Record one block. An existing backup is kept and `false` returned.
    pub fn backup_block(&mut self, doc: &Document, block: &StyleBlock) -> Result<bool> {
        if self.has_backup(block.index) {
            return Ok(false);
        }
        if doc.element(block.node).is_none() {
            return Err(ScopeError::MissingNode(block.node));
        }
        if self.originals.len() <= block.index {
            self.originals.resize(block.index + 1, None);
        }
        let text = doc.text_content(block.node);
        trace!(index = block.index, len = text.len(), "backed up style block");
        self.originals[block.index] = Some(text);
        Ok(true)
    }

    pub fn has_backup(&self, index: usize) -> bool {
        self.original(index).is_some()
    }

    /// The backed-up text of block `index`.
    pub fn original(&self, index: usize) -> Option<&str> {
        self.originals.get(index).and_then(Option::as_deref)
    }

    /// Write the backed-up text back into `block`'s element.
    pub fn restore(&self, doc: &mut Document, block: &StyleBlock) -> Result<()> {
        let original = self
            .original(block.index)
            .ok_or(ScopeError::MissingBackup(block.index))?;
        if doc.element(block.node).is_none() {
            return Err(ScopeError::MissingNode(block.node));
        }
        doc.set_text_content(block.node, original);
        Ok(())
    }

    /// Restore every backed-up block. Returns how many were restored.
    pub fn restore_all(&self, doc: &mut Document, blocks: &StyleBlocks) -> Result<usize> {
        let mut restored = 0;
        for block in blocks.iter().filter(|b| self.has_backup(b.index)) {
            self.restore(doc, block)?;
            restored += 1;
        }
        Ok(restored)
    }

    /// Forget every backup.
    pub fn clear(&mut self) {
        self.originals.clear();
    }
}
