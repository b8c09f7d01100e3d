//! Scoped style resolution
//!
//! Emulates `<style scoped>`: the rules of a scoped style block should only
//! reach the subtree of the block's parent. A resolution pass measures, one
//! scope at a time, the computed style of every element in the scope with all
//! unrelated scoped blocks switched off, writes the result back as inline
//! overrides and finally empties the scoped blocks.
//!
//! ```ignore
//! let mut doc = html::parse(source);
//! let report = scoped_style::apply_scoped_styles(&mut doc)?;
//! ```

pub mod analyzer;
pub mod backup;
pub mod block;
pub mod driver;
pub mod engine;
pub mod error;
pub mod freezer;
pub mod isolator;
pub mod options;
pub mod rules;
pub mod snapshot;

pub use analyzer::{DependencyRelation, analyze};
pub use backup::StyleBackupStore;
pub use block::{StyleBlock, StyleBlocks};
pub use driver::{Phase, Report, Resolution, ScopedStyles};
pub use engine::{CascadeEngine, EngineKind, StyleQuery};
pub use error::{Result, ScopeError};
pub use freezer::StyleFreezer;
pub use isolator::ScopeIsolator;
pub use options::ScopeOptions;
pub use rules::ActiveRuleSet;
pub use snapshot::{ElementSnapshot, Snapshots, StyleSnapshotEngine};

use dom::Document;

/// Resolve every scoped style block of `doc` with default options and the
/// bundled cascade engine.
pub fn apply_scoped_styles(doc: &mut Document) -> Result<Report> {
    ScopedStyles::default().resolve(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_with_defaults() {
        let mut doc = html::parse(
            "<section><style scoped>h1 { color: red }</style><h1 id=t>t</h1></section><h1 id=u>u</h1>",
        );
        let report = apply_scoped_styles(&mut doc).unwrap();
        assert_eq!(report.scopes_resolved, 1);
        assert_eq!(report.overrides_written, 1);

        let t = doc.get_element_by_id(doc.root(), "t").unwrap();
        let u = doc.get_element_by_id(doc.root(), "u").unwrap();
        assert!(doc.inline_style(t).is_some_and(|s| s.starts_with("background-color:")));
        assert_eq!(doc.inline_style(u), None);
    }
}
