//! Style snapshots — the computed style of every element in a scope, taken
//! under the current active rule set.

use dom::{Document, NodeId};
use style::{IndexedDeclarations, camel_case};
use tracing::{debug, trace};

use crate::engine::{CascadeEngine, StyleQuery};
use crate::error::Result;
use crate::rules::ActiveRuleSet;

/// Declarations captured for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    node: NodeId,
    declarations: Vec<(String, String)>,
}

impl ElementSnapshot {
    pub fn new(node: NodeId, declarations: Vec<(String, String)>) -> Self {
        Self { node, declarations }
    }

    pub fn empty(node: NodeId) -> Self {
        Self::new(node, Vec::new())
    }

    /// Element the snapshot was taken from.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn declarations(&self) -> &[(String, String)] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// `property: value;` pairs joined by single spaces.
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Rebuild name-keyed declarations from the legacy index-keyed form.
///
/// Only entries with a numeric key count; their value names a property whose
/// camel-cased key holds the value. Names with no such key are skipped.
pub fn normalize_indexed(node: NodeId, raw: &IndexedDeclarations) -> ElementSnapshot {
    let declarations = raw
        .entries()
        .iter()
        .filter(|(key, _)| key.parse::<usize>().is_ok())
        .filter_map(|(_, property)| {
            raw.get(&camel_case(property))
                .map(|value| (property.clone(), value.to_string()))
        })
        .collect();
    ElementSnapshot::new(node, declarations)
}

/// Elements of the scope rooted at `scope_root`: every element descendant in
/// document order, style blocks excluded.
pub fn scope_elements(doc: &Document, scope_root: NodeId, style_tag: &str) -> Vec<NodeId> {
    doc.descendant_elements(scope_root)
        .into_iter()
        .filter(|&id| {
            doc.element(id)
                .is_some_and(|e| !e.tag_name.eq_ignore_ascii_case(style_tag))
        })
        .collect()
}

/// Remove the inline override of every target. Returns how many were removed.
pub fn clear_overrides(doc: &mut Document, targets: &[NodeId]) -> usize {
    targets
        .iter()
        .filter(|&&id| doc.remove_attribute(id, dom::STYLE_ATTRIBUTE).is_some())
        .count()
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleSnapshotEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Takes snapshots through a [`CascadeEngine`] with a fixed [`StyleQuery`].
pub struct StyleSnapshotEngine<'e> {
    engine: &'e dyn CascadeEngine,
    query: StyleQuery,
}

impl<'e> StyleSnapshotEngine<'e> {
    pub fn new(engine: &'e dyn CascadeEngine, query: StyleQuery) -> Self {
        Self { engine, query }
    }

    pub fn query(&self) -> StyleQuery {
        self.query
    }

    /// Clear the overrides of `targets`, then return a lazy sequence of their
    /// snapshots in the order given.
    pub fn snapshot<'a>(
        &self,
        doc: &'a mut Document,
        targets: Vec<NodeId>,
        rules: &'a ActiveRuleSet,
    ) -> Snapshots<'a>
    where
        'e: 'a,
    {
        let cleared = clear_overrides(doc, &targets);
        trace!(targets = targets.len(), cleared, "cleared overrides before snapshot");
        Snapshots {
            engine: self.engine,
            query: self.query,
            doc,
            rules,
            targets,
            next: 0,
        }
    }
}

fn capture(
    engine: &dyn CascadeEngine,
    query: StyleQuery,
    doc: &Document,
    node: NodeId,
    rules: &ActiveRuleSet,
) -> Result<ElementSnapshot> {
    let snapshot = match query {
        StyleQuery::NameKeyed => engine
            .named_style(doc, node, rules)?
            .map(|declarations| ElementSnapshot::new(node, declarations)),
        StyleQuery::IndexKeyed => engine
            .indexed_style(doc, node, rules)?
            .map(|raw| normalize_indexed(node, &raw)),
    };
    Ok(snapshot.unwrap_or_else(|| {
        debug!(%node, "no computed style available, snapshot left empty");
        ElementSnapshot::empty(node)
    }))
}

/// Lazy, restartable sequence of snapshots, one per target element.
#[derive(Clone)]
pub struct Snapshots<'a> {
    engine: &'a dyn CascadeEngine,
    query: StyleQuery,
    doc: &'a Document,
    rules: &'a ActiveRuleSet,
    targets: Vec<NodeId>,
    next: usize,
}

impl Snapshots<'_> {
    /// Start over from the first target.
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Snapshots<'_> {
    type Item = Result<ElementSnapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = *self.targets.get(self.next)?;
        self.next += 1;
        let snapshot = capture(self.engine, self.query, self.doc, node, self.rules);
        if let Ok(s) = &snapshot {
            trace!(%node, declarations = s.declarations().len(), "captured snapshot");
        }
        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.targets.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Snapshots<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StyleBackupStore;
    use crate::block::StyleBlocks;
    use crate::options::ScopeOptions;
    use style::StyleEngine;

    const FIXTURE: &str = r#"<div id="scope"><style scoped>.a { color: red }</style>
        <p class="a" style="color: green">one</p><section><em class="a">two</em></section></div>
        <p id="outside">three</p>"#;

    fn setup() -> (Document, ActiveRuleSet, NodeId) {
        let doc = html::parse(FIXTURE);
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let mut backup = StyleBackupStore::new();
        backup.backup(&doc, &blocks).unwrap();
        let rules = ActiveRuleSet::build(&doc, &blocks, &backup).unwrap();
        let scope = doc.get_element_by_id(doc.root(), "scope").unwrap();
        (doc, rules, scope)
    }

    fn tags(doc: &Document, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| doc.element(id).unwrap().tag_name.clone())
            .collect()
    }

    #[test]
    fn scope_elements_skip_style_blocks_and_root() {
        let (doc, _, scope) = setup();
        let elements = scope_elements(&doc, scope, "style");
        assert_eq!(tags(&doc, &elements), vec!["p", "section", "em"]);
    }

    #[test]
    fn css_text_format() {
        let snapshot = ElementSnapshot::new(
            NodeId(1),
            vec![("color".into(), "red".into()), ("font-size".into(), "12px".into())],
        );
        assert_eq!(snapshot.css_text(), "color: red; font-size: 12px;");
        assert_eq!(ElementSnapshot::empty(NodeId(1)).css_text(), "");
    }

    #[test]
    fn snapshot_clears_overrides_first_and_follows_target_order() {
        let (mut doc, rules, scope) = setup();
        let engine = StyleEngine::new();
        let snapshots = StyleSnapshotEngine::new(&engine, StyleQuery::NameKeyed);
        let targets = scope_elements(&doc, scope, "style");

        let taken: Vec<_> = snapshots
            .snapshot(&mut doc, targets.clone(), &rules)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(taken.iter().map(ElementSnapshot::node).collect::<Vec<_>>(), targets);
        // The inline `color: green` is gone before measuring.
        assert_eq!(taken[0].get("color"), Some("red"));
        assert_eq!(taken[1].get("color"), Some("black"));
        assert_eq!(taken[2].get("color"), Some("red"));
        assert_eq!(doc.inline_style(targets[0]), None);
    }

    #[test]
    fn snapshots_are_lazy_and_restartable() {
        let (mut doc, rules, scope) = setup();
        let engine = StyleEngine::new();
        let snapshots = StyleSnapshotEngine::new(&engine, StyleQuery::NameKeyed);
        let targets = scope_elements(&doc, scope, "style");

        let mut seq = snapshots.snapshot(&mut doc, targets, &rules);
        assert_eq!(seq.len(), 3);
        let first = seq.next().unwrap().unwrap();
        assert_eq!(seq.len(), 2);
        let copy = seq.clone();
        assert_eq!(copy.count(), 2);
        seq.restart();
        assert_eq!(seq.next().unwrap().unwrap(), first);
    }

    #[test]
    fn index_keyed_query_matches_name_keyed() {
        let (mut doc, rules, scope) = setup();
        let engine = StyleEngine::new();
        let targets = scope_elements(&doc, scope, "style");

        let named: Vec<_> = StyleSnapshotEngine::new(&engine, StyleQuery::NameKeyed)
            .snapshot(&mut doc, targets.clone(), &rules)
            .collect::<Result<_>>()
            .unwrap();
        let indexed: Vec<_> = StyleSnapshotEngine::new(&engine, StyleQuery::IndexKeyed)
            .snapshot(&mut doc, targets, &rules)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(named, indexed);
    }

    #[test]
    fn normalize_skips_undefined_and_non_index_entries() {
        let raw = IndexedDeclarations::new(vec![
            ("0".into(), "color".into()),
            ("1".into(), "font-size".into()),
            ("2".into(), "-moz-box-sizing".into()),
            ("3".into(), "not-defined".into()),
            ("color".into(), "red".into()),
            ("fontSize".into(), "12px".into()),
            ("MozBoxSizing".into(), "border-box".into()),
            ("length".into(), "4".into()),
            ("cssText".into(), "ignored".into()),
        ]);
        let snapshot = normalize_indexed(NodeId(7), &raw);
        assert_eq!(
            snapshot.declarations(),
            &[
                ("color".to_string(), "red".to_string()),
                ("font-size".to_string(), "12px".to_string()),
                ("-moz-box-sizing".to_string(), "border-box".to_string()),
            ]
        );
        assert_eq!(snapshot.node(), NodeId(7));
    }
}
