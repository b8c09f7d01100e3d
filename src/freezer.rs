//! Freezing — writing snapshots back as inline overrides.

use std::collections::VecDeque;

use dom::{Document, NodeId};
use tracing::warn;

use crate::error::{Result, ScopeError};
use crate::isolator::ScopeIsolator;
use crate::rules::ActiveRuleSet;
use crate::snapshot::ElementSnapshot;

/// Holds the snapshots of one scope until they are applied.
#[derive(Debug, Default)]
pub struct StyleFreezer {
    holding: VecDeque<ElementSnapshot>,
}

impl StyleFreezer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every snapshot of `snapshots`, stopping at the first error.
    /// Returns the number queued.
    pub fn hold(
        &mut self,
        snapshots: impl IntoIterator<Item = Result<ElementSnapshot>>,
    ) -> Result<usize> {
        let before = self.holding.len();
        for snapshot in snapshots {
            self.holding.push_back(snapshot?);
        }
        Ok(self.holding.len() - before)
    }

    pub fn held(&self) -> usize {
        self.holding.len()
    }

    /// Pop held snapshots front to back onto `targets`, setting each target's
    /// inline style to the snapshot text. Returns how many non-empty
    /// overrides were written.
    pub fn apply(&mut self, doc: &mut Document, targets: &[NodeId]) -> Result<usize> {
        let mut written = 0;
        for &target in targets {
            let Some(snapshot) = self.holding.pop_front() else {
                break;
            };
            if snapshot.node() != target {
                self.holding.clear();
                return Err(ScopeError::SnapshotMismatch {
                    expected: target,
                    found: snapshot.node(),
                });
            }
            if doc.set_inline_style(target, &snapshot.css_text()) && !snapshot.is_empty() {
                written += 1;
            }
        }
        if !self.holding.is_empty() {
            warn!(left = self.holding.len(), "snapshots left over after apply");
            self.holding.clear();
        }
        Ok(written)
    }

    /// Reactivate every block suppressed for the scope just frozen.
    pub fn unisolate(&self, rules: &mut ActiveRuleSet) {
        ScopeIsolator::restore_all(rules);
    }
}
