//! The cascade capability the core measures through, and the query forms
//! different rendering engines expose.

use dom::{Document, NodeId};
use style::{IndexedDeclarations, StyleEngine, StyleError};

use crate::rules::ActiveRuleSet;

/// Computed-style queries under an explicit set of active rules.
///
/// `Ok(None)` means the engine has nothing usable for the element; the
/// snapshot for it is then empty.
pub trait CascadeEngine {
    /// Computed style as `(property, value)` pairs in enumeration order.
    fn named_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<Vec<(String, String)>>, StyleError>;

    /// Computed style in the legacy index-keyed enumeration form.
    fn indexed_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<IndexedDeclarations>, StyleError>;
}

impl<E: CascadeEngine + ?Sized> CascadeEngine for &E {
    fn named_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<Vec<(String, String)>>, StyleError> {
        (**self).named_style(doc, node, rules)
    }

    fn indexed_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<IndexedDeclarations>, StyleError> {
        (**self).indexed_style(doc, node, rules)
    }
}

impl CascadeEngine for StyleEngine {
    fn named_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<Vec<(String, String)>>, StyleError> {
        let style = self.compute(doc, node, &rules.active_sheets())?;
        Ok(style.map(|s| {
            s.iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        }))
    }

    fn indexed_style(
        &self,
        doc: &Document,
        node: NodeId,
        rules: &ActiveRuleSet,
    ) -> Result<Option<IndexedDeclarations>, StyleError> {
        let style = self.compute(doc, node, &rules.active_sheets())?;
        Ok(style.map(|s| s.indexed()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query selection
// ─────────────────────────────────────────────────────────────────────────────

/// How computed style is read from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleQuery {
    /// Property name → value mapping.
    #[default]
    NameKeyed,
    /// Index → property name entries resolved through camel-cased keys.
    IndexKeyed,
}

/// Rendering engine family, as far as the query form is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Gecko,
    Trident,
    Other,
}

impl EngineKind {
    /// Classify a user-agent string. Anything unrecognized, including an
    /// empty string, is [`EngineKind::Other`].
    pub fn detect(user_agent: &str) -> Self {
        if user_agent.contains("Firefox") {
            EngineKind::Gecko
        } else if user_agent.contains("MSIE") || user_agent.contains("Trident/") {
            EngineKind::Trident
        } else {
            EngineKind::Other
        }
    }

    pub fn query(self) -> StyleQuery {
        match self {
            EngineKind::Gecko => StyleQuery::IndexKeyed,
            EngineKind::Trident | EngineKind::Other => StyleQuery::NameKeyed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StyleBackupStore;
    use crate::block::StyleBlocks;
    use crate::options::ScopeOptions;

    #[test]
    fn user_agent_detection() {
        let firefox = "Mozilla/5.0 (Windows NT 6.1; rv:3.6) Gecko/20100101 Firefox/3.6";
        let ie8 = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)";
        let ie11 = "Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko";
        let webkit = "Mozilla/5.0 (Macintosh) AppleWebKit/533.16 (KHTML, like Gecko) Safari/533.16";
        assert_eq!(EngineKind::detect(firefox), EngineKind::Gecko);
        assert_eq!(EngineKind::detect(ie8), EngineKind::Trident);
        assert_eq!(EngineKind::detect(ie11), EngineKind::Trident);
        assert_eq!(EngineKind::detect(webkit), EngineKind::Other);
        assert_eq!(EngineKind::detect(""), EngineKind::Other);
        assert_eq!(EngineKind::detect(firefox).query(), StyleQuery::IndexKeyed);
        assert_eq!(EngineKind::detect(ie8).query(), StyleQuery::NameKeyed);
        assert_eq!(EngineKind::detect("").query(), StyleQuery::NameKeyed);
    }

    #[test]
    fn style_engine_honours_the_active_rule_set() {
        let doc = html::parse(
            r#"<div><style scoped>.a { color: red }</style><p class="a">x</p></div>"#,
        );
        let blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let mut backup = StyleBackupStore::new();
        backup.backup(&doc, &blocks).unwrap();
        let mut rules = ActiveRuleSet::build(&doc, &blocks, &backup).unwrap();
        let p = doc.get_elements_by_tag(doc.root(), "p")[0];
        let engine = StyleEngine::new();

        let color = |rules: &ActiveRuleSet| {
            engine
                .named_style(&doc, p, rules)
                .unwrap()
                .unwrap()
                .into_iter()
                .find(|(name, _)| name == "color")
                .map(|(_, value)| value)
        };
        assert_eq!(color(&rules).as_deref(), Some("red"));
        rules.set_active(0, false).unwrap();
        assert_eq!(color(&rules).as_deref(), Some("black"));

        let indexed = engine.indexed_style(&doc, p, &rules).unwrap().unwrap();
        assert_eq!(indexed.get("color"), Some("black"));
    }

    #[test]
    fn style_engine_errors_pass_through() {
        let doc = html::parse("<p>x</p>");
        let rules = ActiveRuleSet::default();
        let text = doc.descendants(doc.root())
            .into_iter()
            .find(|&id| doc.node(id).is_some_and(|n| n.is_text()))
            .unwrap();
        assert_eq!(
            StyleEngine::new().named_style(&doc, text, &rules),
            Err(StyleError::NotAnElement(text))
        );
    }
}
