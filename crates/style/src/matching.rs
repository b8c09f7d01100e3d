//! Selector matching — determine whether a DOM element matches a CSS selector.
//!
//! Complex selectors are matched **right-to-left**: we start with the rightmost
//! (subject) compound selector, then walk up/sideways through the DOM tree
//! following each combinator.

use css::{AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector};
use dom::{Document, ElementData, NodeData, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Test whether the element `node` matches a full complex selector.
///
/// Returns `false` if `node` does not refer to an element.
pub fn matches_selector(doc: &Document, node: NodeId, selector: &ComplexSelector) -> bool {
    let Some((subject, first_combinator)) = selector.parts.first() else {
        return false;
    };
    if !matches_compound(doc, node, subject) {
        return false;
    }

    let mut combinator = *first_combinator;
    let mut current = node;
    for (compound, next_combinator) in &selector.parts[1..] {
        let found = match combinator {
            Some(Combinator::Descendant) => {
                find_along(doc, current, compound, parent_element, true)
            }
            Some(Combinator::Child) => {
                find_along(doc, current, compound, parent_element, false)
            }
            Some(Combinator::NextSibling) => {
                find_along(doc, current, compound, prev_sibling_element, false)
            }
            Some(Combinator::SubsequentSibling) => {
                find_along(doc, current, compound, prev_sibling_element, true)
            }
            None => None,
        };
        match found {
            Some(id) => current = id,
            None => return false,
        }
        combinator = *next_combinator;
    }
    true
}

/// Test whether the element `node` matches a compound selector (all simples must match).
pub fn matches_compound(doc: &Document, node: NodeId, compound: &CompoundSelector) -> bool {
    let Some(elem) = doc.element(node) else {
        return false;
    };
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(doc, node, elem, simple))
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Step from `start` with `step` until a node matching `compound` is found.
/// With `repeat == false` only the first step is tried.
fn find_along(
    doc: &Document,
    start: NodeId,
    compound: &CompoundSelector,
    step: impl Fn(&Document, NodeId) -> Option<NodeId>,
    repeat: bool,
) -> Option<NodeId> {
    let mut cursor = step(doc, start);
    while let Some(id) = cursor {
        if matches_compound(doc, id, compound) {
            return Some(id);
        }
        if !repeat {
            return None;
        }
        cursor = step(doc, id);
    }
    None
}

fn matches_simple(doc: &Document, node: NodeId, elem: &ElementData, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => elem.tag_name.eq_ignore_ascii_case(tag),
        SimpleSelector::Id(id) => elem.id.as_deref() == Some(id.as_str()),
        SimpleSelector::Class(cls) => elem.classes.iter().any(|c| c == cls),
        SimpleSelector::Attribute { name, op, value } => {
            matches_attribute(elem, name, *op, value.as_deref())
        }
        SimpleSelector::PseudoClass(pc) => matches_pseudo_class(doc, node, elem, pc),
        // Pseudo-element rules style generated boxes, never the element.
        SimpleSelector::PseudoElement(_) => false,
    }
}

fn matches_attribute(elem: &ElementData, name: &str, op: AttrOp, value: Option<&str>) -> bool {
    let Some(actual) = elem.attr(name) else {
        return false;
    };
    let Some(expected) = value else {
        return op == AttrOp::Exists;
    };

    match op {
        AttrOp::Exists => true,
        AttrOp::Eq => actual == expected,
        AttrOp::Includes => actual.split_whitespace().any(|word| word == expected),
        AttrOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

fn matches_pseudo_class(doc: &Document, node: NodeId, elem: &ElementData, pc: &PseudoClass) -> bool {
    match pc {
        // Interaction state never exists in a static document.
        PseudoClass::Dynamic(_) => false,
        PseudoClass::Link => {
            matches!(elem.tag_name.as_str(), "a" | "area") && elem.has_attr("href")
        }
        PseudoClass::Root => doc
            .parent(node)
            .and_then(|p| doc.node(p))
            .is_some_and(|p| matches!(p.data, NodeData::Document)),
        PseudoClass::FirstChild => prev_sibling_element(doc, node).is_none(),
        PseudoClass::LastChild => next_sibling_element(doc, node).is_none(),
        PseudoClass::OnlyChild => {
            prev_sibling_element(doc, node).is_none() && next_sibling_element(doc, node).is_none()
        }
        PseudoClass::Empty => doc.children(node).iter().all(|&child| {
            doc.node(child).is_some_and(|n| match &n.data {
                NodeData::Comment { .. } => true,
                NodeData::Text { data } => data.is_empty(),
                _ => false,
            })
        }),
        PseudoClass::Not(inner) => !matches_compound(doc, node, inner),
    }
}

/// Walk up to the nearest ancestor that is an element.
fn parent_element(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.parent(node).filter(|&p| doc.element(p).is_some())
}

fn prev_sibling_element(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut cursor = doc.node(node)?.prev_sibling;
    while let Some(id) = cursor {
        if doc.element(id).is_some() {
            return Some(id);
        }
        cursor = doc.node(id)?.prev_sibling;
    }
    None
}

fn next_sibling_element(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut cursor = doc.node(node)?.next_sibling;
    while let Some(id) = cursor {
        if doc.element(id).is_some() {
            return Some(id);
        }
        cursor = doc.node(id)?.next_sibling;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::parse_selector_list;
    use dom::Attr;

    /// html > body > (div#main.box > (span.x, em), p[lang=en-US])
    fn sample() -> (Document, [NodeId; 6]) {
        let mut doc = Document::new();
        let html = doc.create_element("html", vec![]);
        let body = doc.create_element("body", vec![]);
        let div = doc.create_element(
            "div",
            vec![Attr::new("id", "main"), Attr::new("class", "box wide")],
        );
        let span = doc.create_element("span", vec![Attr::new("class", "x")]);
        let em = doc.create_element("em", vec![]);
        let p = doc.create_element("p", vec![Attr::new("lang", "en-US")]);
        let root = doc.root();
        doc.append_child(root, html);
        doc.append_child(html, body);
        doc.append_child(body, div);
        doc.append_child(div, span);
        doc.append_child(div, em);
        doc.append_child(body, p);
        (doc, [html, body, div, span, em, p])
    }

    fn matches(doc: &Document, node: NodeId, selector: &str) -> bool {
        parse_selector_list(selector)
            .unwrap()
            .iter()
            .any(|s| matches_selector(doc, node, s))
    }

    #[test]
    fn simple_selectors() {
        let (doc, [_, _, div, span, _, _]) = sample();
        assert!(matches(&doc, div, "div"));
        assert!(matches(&doc, div, "#main"));
        assert!(matches(&doc, div, ".wide.box"));
        assert!(matches(&doc, div, "*"));
        assert!(!matches(&doc, span, "div"));
    }

    #[test]
    fn combinators() {
        let (doc, [_, _, _, span, em, p]) = sample();
        assert!(matches(&doc, span, "body span"));
        assert!(matches(&doc, span, "#main > .x"));
        assert!(!matches(&doc, span, "body > span"));
        assert!(matches(&doc, em, "span + em"));
        assert!(matches(&doc, p, "div ~ p"));
        assert!(!matches(&doc, p, "span ~ p"));
    }

    #[test]
    fn attribute_selectors() {
        let (doc, [_, _, div, _, _, p]) = sample();
        assert!(matches(&doc, p, "[lang]"));
        assert!(matches(&doc, p, "[lang|=en]"));
        assert!(matches(&doc, p, "[lang^=en]"));
        assert!(!matches(&doc, p, "[lang=en]"));
        assert!(matches(&doc, div, "[class~=wide]"));
    }

    #[test]
    fn structural_pseudo_classes() {
        let (doc, [html, body, _, span, em, _]) = sample();
        assert!(matches(&doc, html, ":root"));
        assert!(!matches(&doc, body, ":root"));
        assert!(matches(&doc, span, ":first-child"));
        assert!(matches(&doc, em, ":last-child:empty"));
        assert!(matches(&doc, em, ":not(.x)"));
    }

    #[test]
    fn dynamic_state_and_pseudo_elements_never_match() {
        let (doc, [_, _, div, _, _, _]) = sample();
        assert!(!matches(&doc, div, "div:hover"));
        assert!(!matches(&doc, div, "div::before"));
    }
}
