//! Scope isolation — suppress the scoped blocks that do not govern a scope.

use tracing::debug;

use crate::analyzer::DependencyRelation;
use crate::error::{Result, ScopeError};
use crate::rules::ActiveRuleSet;

/// Switches scoped blocks on and off for one scope at a time.
#[derive(Debug, Clone, Copy)]
pub struct ScopeIsolator<'r> {
    relation: &'r DependencyRelation,
}

impl<'r> ScopeIsolator<'r> {
    pub fn new(relation: &'r DependencyRelation) -> Self {
        Self { relation }
    }

    /// Leave active exactly the scoped blocks whose scope contains block
    /// `scope`, and suppress every other scoped block. Returns the number of
    /// suppressed blocks.
    pub fn isolate(&self, rules: &mut ActiveRuleSet, scope: usize) -> Result<usize> {
        let governing = self
            .relation
            .depends_on(scope)
            .ok_or(ScopeError::UnknownBlock(scope))?;
        if scope >= rules.len() {
            return Err(ScopeError::UnknownBlock(scope));
        }

        let mut suppressed = 0;
        for index in 0..rules.len() {
            if !rules.is_scoped(index) {
                continue;
            }
            let keep = governing.contains(&index);
            rules.set_active(index, keep)?;
            if !keep {
                suppressed += 1;
            }
        }
        debug!(scope, suppressed, "isolated scope");
        Ok(suppressed)
    }

    /// Reactivate every block.
    pub fn restore_all(rules: &mut ActiveRuleSet) {
        rules.activate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::backup::StyleBackupStore;
    use crate::block::StyleBlocks;
    use crate::options::ScopeOptions;

    /// 0: unscoped in head, 1: scope P, 2: scope C nested in P, 3: sibling scope S.
    const FIXTURE: &str = "<style>body { margin: 0 }</style>\
        <div id=p><style scoped>p { color: red }</style>\
          <div id=c><style scoped>p { font-weight: bold }</style><p>c</p></div></div>\
        <div id=s><style scoped>p { color: blue }</style><p>s</p></div>";

    fn setup() -> (DependencyRelation, ActiveRuleSet) {
        let doc = html::parse(FIXTURE);
        let mut blocks = StyleBlocks::discover(&doc, &ScopeOptions::default());
        let relation = analyze(&doc, &mut blocks);
        let mut backup = StyleBackupStore::new();
        backup.backup(&doc, &blocks).unwrap();
        let rules = ActiveRuleSet::build(&doc, &blocks, &backup).unwrap();
        (relation, rules)
    }

    #[test]
    fn measuring_parent_suppresses_nested_and_sibling_scopes() {
        let (relation, mut rules) = setup();
        let isolator = ScopeIsolator::new(&relation);
        assert_eq!(isolator.isolate(&mut rules, 1).unwrap(), 2);
        assert_eq!(rules.inactive(), vec![2, 3]);
        assert!(rules.is_active(0));
    }

    #[test]
    fn measuring_nested_scope_keeps_enclosing_scope() {
        let (relation, mut rules) = setup();
        let isolator = ScopeIsolator::new(&relation);
        assert_eq!(isolator.isolate(&mut rules, 2).unwrap(), 1);
        assert_eq!(rules.inactive(), vec![3]);
    }

    #[test]
    fn isolation_is_idempotent_and_restorable() {
        let (relation, mut rules) = setup();
        let original: Vec<_> = (0..rules.len())
            .map(|i| rules.current_text(i).map(str::to_string))
            .collect();
        let isolator = ScopeIsolator::new(&relation);
        isolator.isolate(&mut rules, 3).unwrap();
        let once = rules.clone();
        isolator.isolate(&mut rules, 3).unwrap();
        assert_eq!(rules, once);
        assert_eq!(rules.current_text(1), Some(""));

        ScopeIsolator::restore_all(&mut rules);
        let restored: Vec<_> = (0..rules.len())
            .map(|i| rules.current_text(i).map(str::to_string))
            .collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn unknown_scope_is_rejected() {
        let (relation, mut rules) = setup();
        assert_eq!(
            ScopeIsolator::new(&relation).isolate(&mut rules, 9),
            Err(ScopeError::UnknownBlock(9))
        );
    }
}
