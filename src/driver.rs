//! The resolution pass: back up, analyze, freeze each scope, finalize.
//!
//! A [`Resolution`] is a small state machine over one document. [`step`]
//! advances it by exactly one phase, so callers (and tests) can observe the
//! rule set and the document between scopes; [`run`] drives it to the end.
//!
//! [`step`]: Resolution::step
//! [`run`]: Resolution::run

use dom::{Document, NodeId};
use style::StyleEngine;
use tracing::{debug, debug_span, warn};

use crate::analyzer::{DependencyRelation, analyze};
use crate::backup::StyleBackupStore;
use crate::block::StyleBlocks;
use crate::engine::{CascadeEngine, StyleQuery};
use crate::error::{Result, ScopeError};
use crate::freezer::StyleFreezer;
use crate::isolator::ScopeIsolator;
use crate::options::ScopeOptions;
use crate::rules::ActiveRuleSet;
use crate::snapshot::{StyleSnapshotEngine, scope_elements};

/// The last phase a [`Resolution`] completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    BackingUp,
    Analyzing,
    /// Block index of the scope just frozen.
    ResolvingScopes(usize),
    Finalizing,
}

/// Summary of a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Style blocks found, scoped or not.
    pub blocks: usize,
    pub scoped_blocks: usize,
    pub scopes_resolved: usize,
    /// Non-empty inline overrides written across all scopes.
    pub overrides_written: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// ScopedStyles
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point: options plus the cascade engine measurements go through.
#[derive(Debug, Clone)]
pub struct ScopedStyles<E = StyleEngine> {
    options: ScopeOptions,
    engine: E,
}

impl ScopedStyles {
    /// Resolve with the bundled cascade engine and its user-agent sheet.
    pub fn new(options: ScopeOptions) -> Self {
        Self::with_engine(options, StyleEngine::new())
    }
}

impl Default for ScopedStyles {
    fn default() -> Self {
        Self::new(ScopeOptions::default())
    }
}

impl<E: CascadeEngine> ScopedStyles<E> {
    pub fn with_engine(options: ScopeOptions, engine: E) -> Self {
        Self { options, engine }
    }

    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// Query form used for every measurement of a pass.
    pub fn query(&self) -> StyleQuery {
        self.options.style_query()
    }

    /// Start a pass over `doc` without running it.
    pub fn resolution<'a>(&'a self, doc: &'a mut Document) -> Resolution<'a> {
        Resolution {
            doc,
            engine: &self.engine,
            options: &self.options,
            query: self.query(),
            phase: Phase::Idle,
            finished: false,
            blocks: StyleBlocks::default(),
            backup: StyleBackupStore::new(),
            relation: DependencyRelation::default(),
            rules: ActiveRuleSet::default(),
            resolved: Vec::new(),
            report: Report::default(),
        }
    }

    /// Run a complete pass over `doc`.
    pub fn resolve(&self, doc: &mut Document) -> Result<Report> {
        self.resolution(doc).run()
    }

    /// Parse `source`, resolve it and serialize the result.
    pub fn resolve_html(&self, source: &str) -> Result<String> {
        let mut doc = html::parse(source);
        self.resolve(&mut doc)?;
        Ok(html::serialize(&doc))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// One pass over one document.
pub struct Resolution<'a> {
    doc: &'a mut Document,
    engine: &'a dyn CascadeEngine,
    options: &'a ScopeOptions,
    query: StyleQuery,
    phase: Phase,
    finished: bool,
    blocks: StyleBlocks,
    backup: StyleBackupStore,
    relation: DependencyRelation,
    rules: ActiveRuleSet,
    /// Scopes frozen so far, in resolution order.
    resolved: Vec<usize>,
    report: Report,
}

impl Resolution<'_> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn report(&self) -> Report {
        self.report
    }

    pub fn blocks(&self) -> &StyleBlocks {
        &self.blocks
    }

    pub fn relation(&self) -> &DependencyRelation {
        &self.relation
    }

    pub fn rules(&self) -> &ActiveRuleSet {
        &self.rules
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    /// Complete the next phase and return it. Once the pass is over this
    /// keeps returning [`Phase::Idle`].
    pub fn step(&mut self) -> Result<Phase> {
        if self.finished {
            return Ok(Phase::Idle);
        }
        let next = match self.phase {
            Phase::Idle => {
                self.back_up()?;
                Phase::BackingUp
            }
            Phase::BackingUp => {
                self.analyze()?;
                Phase::Analyzing
            }
            Phase::Analyzing => self.next_scope(None)?,
            Phase::ResolvingScopes(index) => self.next_scope(Some(index))?,
            Phase::Finalizing => {
                self.finished = true;
                debug!(report = ?self.report, "resolution finished");
                Phase::Idle
            }
        };
        self.phase = next;
        Ok(next)
    }

    /// Drive the pass to completion.
    pub fn run(mut self) -> Result<Report> {
        while !self.finished {
            self.step()?;
        }
        Ok(self.report)
    }

    fn back_up(&mut self) -> Result<()> {
        self.blocks = StyleBlocks::discover(self.doc, self.options);
        let saved = self.backup.backup(self.doc, &self.blocks)?;
        self.report.blocks = self.blocks.len();
        self.report.scoped_blocks = self.blocks.scoped().count();
        debug!(blocks = self.report.blocks, saved, "backed up scoped blocks");
        Ok(())
    }

    fn analyze(&mut self) -> Result<()> {
        self.relation = analyze(self.doc, &mut self.blocks);
        self.rules = ActiveRuleSet::build(self.doc, &self.blocks, &self.backup)?;
        Ok(())
    }

    fn next_scope(&mut self, after: Option<usize>) -> Result<Phase> {
        match self.blocks.next_scoped_after(after) {
            Some(index) => {
                let written = self.resolve_scope(index)?;
                self.resolved.push(index);
                self.report.scopes_resolved += 1;
                self.report.overrides_written += written;
                Ok(Phase::ResolvingScopes(index))
            }
            None => {
                self.finalize()?;
                Ok(Phase::Finalizing)
            }
        }
    }

    fn resolve_scope(&mut self, index: usize) -> Result<usize> {
        let _span = debug_span!("scope", index).entered();
        let block = self.blocks.get(index).ok_or(ScopeError::UnknownBlock(index))?;
        if self.doc.element(block.node).is_none() {
            return Err(ScopeError::MissingNode(block.node));
        }
        let Some(root) = block.scope_root else {
            warn!(node = %block.node, "scoped block has no parent, nothing to resolve");
            return Ok(0);
        };

        ScopeIsolator::new(&self.relation).isolate(&mut self.rules, index)?;
        let nested = self.frozen_nested_roots(index);
        let targets: Vec<_> = scope_elements(self.doc, root, &self.options.style_tag)
            .into_iter()
            .filter(|&id| {
                !nested
                    .iter()
                    .any(|&r| id != r && self.doc.is_inclusive_descendant(id, r))
            })
            .collect();
        let mut freezer = StyleFreezer::new();
        let frozen = self.freeze(&mut freezer, targets.clone());
        freezer.unisolate(&mut self.rules);
        let written = frozen?;

        debug!(elements = targets.len(), written, "froze scope");
        Ok(written)
    }

    /// Roots of the already frozen scopes nested in scope `index`. Their
    /// elements were measured with `index` active and are left as they are.
    fn frozen_nested_roots(&self, index: usize) -> Vec<NodeId> {
        self.resolved
            .iter()
            .filter(|&&j| j != index && self.relation.contains(j, index))
            .filter_map(|&j| self.blocks.get(j)?.scope_root)
            .collect()
    }

    fn freeze(&mut self, freezer: &mut StyleFreezer, targets: Vec<NodeId>) -> Result<usize> {
        let snapshots = StyleSnapshotEngine::new(self.engine, self.query);
        freezer.hold(snapshots.snapshot(self.doc, targets.clone(), &self.rules))?;
        freezer.apply(self.doc, &targets)
    }

    fn finalize(&mut self) -> Result<()> {
        if !self.options.finalize {
            debug!("finalization disabled, scoped blocks keep their text");
            return Ok(());
        }
        let mut emptied = 0;
        for block in self.blocks.scoped() {
            if self.doc.element(block.node).is_none() {
                return Err(ScopeError::MissingNode(block.node));
            }
            self.doc.set_text_content(block.node, "");
            emptied += 1;
        }
        debug!(emptied, "emptied scoped blocks");
        Ok(())
    }
}
