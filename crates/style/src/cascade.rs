//! Cascade resolution — collect matching rules, sort, and resolve computed values.
//!
//! Implements the CSS cascade: importance → origin → specificity → source order.
//! Inherited properties flow from the parent's computed style; shorthands are
//! expanded to the longhands in [`PROPERTIES`](crate::computed::PROPERTIES).

use css::{
    CssToken, Declaration, Specificity, Stylesheet, compute_specificity, parse_declaration_list,
    parse_stylesheet, serialize_tokens, tokenize,
};
use dom::{Document, NodeId};

use crate::computed::{ComputedStyle, PROPERTIES, property_index};
use crate::error::StyleError;
use crate::matching::matches_selector;

/// Default presentation for common HTML elements.
pub const UA_CSS: &str = "
    html, body, div, p, h1, h2, h3, h4, h5, h6, ul, ol, section, article,
    nav, header, footer, main, aside, figure, blockquote, pre, form,
    address, dl, dt, dd, fieldset { display: block; }
    head, title, meta, link, style, script, template { display: none; }
    li { display: list-item; }
    table { display: table; }
    tr { display: table-row; }
    td, th { display: table-cell; }
    body { margin: 8px; }
    h1 { font-size: 32px; font-weight: bold; margin: 21px 0; }
    h2 { font-size: 24px; font-weight: bold; margin: 20px 0; }
    h3 { font-size: 19px; font-weight: bold; margin: 19px 0; }
    h4, h5, h6 { font-weight: bold; }
    p, ul, ol, blockquote, dl { margin: 16px 0; }
    ul, ol { padding-left: 40px; }
    ol { list-style-type: decimal; }
    a:link { color: #0000ee; text-decoration: underline; cursor: pointer; }
    b, strong, th { font-weight: bold; }
    i, em, cite, var { font-style: italic; }
    pre, code, kbd, samp, tt { font-family: monospace; }
    pre { white-space: pre; }
    center { text-align: center; }
    [hidden] { display: none; }
";

// ─────────────────────────────────────────────────────────────────────────────
// Origin
// ─────────────────────────────────────────────────────────────────────────────

/// Where a declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StyleOrigin {
    UserAgent,
    Author,
    /// The element's own `style` attribute.
    Inline,
}

/// A declaration that applies to a particular element, annotated with cascade
/// metadata.
#[derive(Debug, Clone)]
pub struct MatchedDeclaration<'a> {
    pub declaration: &'a Declaration,
    pub origin: StyleOrigin,
    pub specificity: Specificity,
    pub source_order: usize,
}

impl MatchedDeclaration<'_> {
    /// Rank of the (origin, importance) pair; higher wins.
    fn precedence(&self) -> u8 {
        match (self.declaration.important, self.origin) {
            (false, StyleOrigin::UserAgent) => 0,
            (false, StyleOrigin::Author) => 1,
            (false, StyleOrigin::Inline) => 2,
            (true, StyleOrigin::Author) => 3,
            (true, StyleOrigin::Inline) => 4,
            (true, StyleOrigin::UserAgent) => 5,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Computes element styles from a user-agent sheet, caller-supplied author
/// sheets and inline `style` attributes.
#[derive(Debug, Clone)]
pub struct StyleEngine {
    user_agent: Stylesheet,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleEngine {
    /// Engine with the built-in [`UA_CSS`] defaults.
    pub fn new() -> Self {
        Self::with_user_agent_sheet(parse_stylesheet(UA_CSS))
    }

    pub fn with_user_agent_sheet(user_agent: Stylesheet) -> Self {
        Self { user_agent }
    }

    /// Compute the style of `node` against `author` sheets (in cascade order).
    ///
    /// Returns `Ok(None)` for elements that are not connected to the document.
    pub fn compute(
        &self,
        doc: &Document,
        node: NodeId,
        author: &[&Stylesheet],
    ) -> Result<Option<ComputedStyle>, StyleError> {
        let target = doc.node(node).ok_or(StyleError::UnknownNode(node))?;
        if !target.is_element() {
            return Err(StyleError::NotAnElement(node));
        }
        if !doc.is_connected(node) {
            return Ok(None);
        }

        // Resolve from the outermost element down so inheritance sees
        // computed parents.
        let mut chain: Vec<NodeId> = doc
            .ancestors(node)
            .into_iter()
            .filter(|&id| doc.element(id).is_some())
            .collect();
        chain.reverse();
        chain.push(node);

        let mut style: Option<ComputedStyle> = None;
        for element in chain {
            style = Some(self.cascade(doc, element, author, style.as_ref()));
        }
        Ok(style)
    }

    fn cascade(
        &self,
        doc: &Document,
        node: NodeId,
        author: &[&Stylesheet],
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        let inline = doc
            .inline_style(node)
            .map(parse_declaration_list)
            .unwrap_or_default();

        let mut matched = collect_matching_declarations(doc, node, &self.user_agent, author);
        let order_base = matched.len();
        matched.extend(inline.iter().enumerate().map(|(i, declaration)| {
            MatchedDeclaration {
                declaration,
                origin: StyleOrigin::Inline,
                specificity: Specificity::default(),
                source_order: order_base + i,
            }
        }));
        matched.sort_by_key(|m| (m.precedence(), m.specificity, m.source_order));

        let mut style = parent.map_or_else(ComputedStyle::initial, ComputedStyle::inherit_from);
        for m in &matched {
            for (name, value) in expand_shorthand(&m.declaration.name, &m.declaration.value) {
                apply_longhand(&mut style, parent, &name, &value);
            }
        }
        resolve_current_color(&mut style, parent);
        style
    }
}

/// Every declaration from `user_agent` and `author` whose rule matches `node`,
/// in source order. A rule counts with its most specific matching selector.
pub fn collect_matching_declarations<'a>(
    doc: &Document,
    node: NodeId,
    user_agent: &'a Stylesheet,
    author: &[&'a Stylesheet],
) -> Vec<MatchedDeclaration<'a>> {
    let sheets = std::iter::once((user_agent, StyleOrigin::UserAgent))
        .chain(author.iter().map(|&sheet| (sheet, StyleOrigin::Author)));

    let mut out = Vec::new();
    for (sheet, origin) in sheets {
        for rule in &sheet.rules {
            let Some(specificity) = rule
                .selectors
                .iter()
                .filter(|sel| matches_selector(doc, node, sel))
                .map(compute_specificity)
                .max()
            else {
                continue;
            };
            for declaration in &rule.declarations {
                let source_order = out.len();
                out.push(MatchedDeclaration {
                    declaration,
                    origin,
                    specificity,
                    source_order,
                });
            }
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Value application
// ─────────────────────────────────────────────────────────────────────────────

fn is_wide_keyword(value: &str) -> bool {
    ["inherit", "initial", "unset"]
        .iter()
        .any(|k| value.eq_ignore_ascii_case(k))
}

fn apply_longhand(style: &mut ComputedStyle, parent: Option<&ComputedStyle>, name: &str, value: &str) {
    let Some(def) = property_index(name).map(|i| PROPERTIES[i]) else {
        return;
    };
    let inherited = || parent.and_then(|p| p.get(name)).unwrap_or(def.initial).to_string();

    let resolved = match value.to_ascii_lowercase().as_str() {
        "inherit" => inherited(),
        "initial" => def.initial.to_string(),
        "unset" if def.inherited => inherited(),
        "unset" => def.initial.to_string(),
        _ => value.to_string(),
    };
    style.set(name, &resolved);
}

/// Replace `currentcolor` with the element's own computed `color`.
fn resolve_current_color(style: &mut ComputedStyle, parent: Option<&ComputedStyle>) {
    if style
        .get("color")
        .is_some_and(|c| c.eq_ignore_ascii_case("currentcolor"))
    {
        let inherited = parent.and_then(|p| p.get("color")).unwrap_or("black").to_string();
        style.set("color", &inherited);
    }
    let color = style.get("color").unwrap_or("black").to_string();
    for side in SIDES {
        let name = format!("border-{side}-color");
        if style
            .get(&name)
            .is_some_and(|c| c.eq_ignore_ascii_case("currentcolor"))
        {
            style.set(&name, &color);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shorthand expansion
// ─────────────────────────────────────────────────────────────────────────────

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Expand `name: value` into longhand `(property, value)` pairs.
///
/// Non-shorthands pass through unchanged; an invalid shorthand value expands
/// to nothing. Longhands a shorthand leaves unspecified are reset to
/// `initial`.
pub fn expand_shorthand(name: &str, value: &str) -> Vec<(String, String)> {
    if is_wide_keyword(value) {
        let longhands = shorthand_longhands(name);
        if !longhands.is_empty() {
            return longhands.into_iter().map(|l| (l, value.to_string())).collect();
        }
    }

    match name {
        "margin" | "padding" => box_sides(value)
            .map(|vals| side_pairs(|side| format!("{name}-{side}"), vals))
            .unwrap_or_default(),
        "border-width" | "border-style" | "border-color" => {
            let suffix = &name["border-".len()..];
            box_sides(value)
                .map(|vals| side_pairs(|side| format!("border-{side}-{suffix}"), vals))
                .unwrap_or_default()
        }
        "border" => SIDES
            .iter()
            .flat_map(|side| border_side(side, value))
            .collect(),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            border_side(&name["border-".len()..], value)
        }
        "background" => background(value),
        _ => vec![(name.to_string(), value.to_string())],
    }
}

fn shorthand_longhands(name: &str) -> Vec<String> {
    let per_side = |f: &dyn Fn(&str) -> String| SIDES.iter().map(|s| f(s)).collect::<Vec<_>>();
    match name {
        "margin" | "padding" => per_side(&|side| format!("{name}-{side}")),
        "border-width" | "border-style" | "border-color" => {
            let suffix = &name["border-".len()..];
            per_side(&|side| format!("border-{side}-{suffix}"))
        }
        "border" => SIDES
            .iter()
            .flat_map(|side| border_longhands(side))
            .collect(),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            border_longhands(&name["border-".len()..]).to_vec()
        }
        "background" => vec!["background-color".into(), "background-image".into()],
        _ => Vec::new(),
    }
}

fn border_longhands(side: &str) -> [String; 3] {
    [
        format!("border-{side}-width"),
        format!("border-{side}-style"),
        format!("border-{side}-color"),
    ]
}

fn side_pairs(name: impl Fn(&str) -> String, values: [String; 4]) -> Vec<(String, String)> {
    SIDES.iter().map(|side| name(side)).zip(values).collect()
}

/// The 1–4 value box model shorthand, as `[top, right, bottom, left]`.
fn box_sides(value: &str) -> Option<[String; 4]> {
    let parts = split_components(value);
    let [top, right, bottom, left] = match parts.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some([top.clone(), right.clone(), bottom.clone(), left.clone()])
}

fn border_side(side: &str, value: &str) -> Vec<(String, String)> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for part in split_components(value) {
        let lower = part.to_ascii_lowercase();
        let slot = if BORDER_STYLES.contains(&lower.as_str()) {
            &mut style
        } else if looks_like_length(&lower) {
            &mut width
        } else {
            &mut color
        };
        if slot.replace(part).is_some() {
            return Vec::new();
        }
    }

    let [w, s, c] = border_longhands(side);
    let or_initial = |v: Option<String>| v.unwrap_or_else(|| "initial".to_string());
    vec![(w, or_initial(width)), (s, or_initial(style)), (c, or_initial(color))]
}

fn background(value: &str) -> Vec<(String, String)> {
    let mut image = None;
    let mut color = None;
    for part in split_components(value) {
        let lower = part.to_ascii_lowercase();
        if lower.starts_with("url(") || lower == "none" || lower.contains("gradient(") {
            image = Some(part);
        } else {
            color = Some(part);
        }
    }
    vec![
        ("background-color".into(), color.unwrap_or_else(|| "initial".into())),
        ("background-image".into(), image.unwrap_or_else(|| "initial".into())),
    ]
}

fn looks_like_length(value: &str) -> bool {
    matches!(value, "thin" | "medium" | "thick")
        || value.starts_with("calc(")
        || value
            .trim_start_matches(['-', '+'])
            .starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Split a value into its top-level space-separated components; function
/// arguments stay together.
fn split_components(value: &str) -> Vec<String> {
    let tokens = tokenize(value);
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            CssToken::Function(_) | CssToken::LParen | CssToken::LBracket => depth += 1,
            CssToken::RParen | CssToken::RBracket => depth = depth.saturating_sub(1),
            CssToken::Whitespace if depth == 0 => {
                parts.push(serialize_tokens(&tokens[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(serialize_tokens(&tokens[start..]));
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;

    /// html > body > div.box > (p#first, span)
    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.create_element("html", vec![]);
        let body = doc.create_element("body", vec![]);
        let div = doc.create_element("div", vec![Attr::new("class", "box")]);
        let p = doc.create_element("p", vec![Attr::new("id", "first")]);
        let span = doc.create_element("span", vec![]);
        let root = doc.root();
        doc.append_child(root, html);
        doc.append_child(html, body);
        doc.append_child(body, div);
        doc.append_child(div, p);
        doc.append_child(div, span);
        (doc, div, p, span)
    }

    fn compute(doc: &Document, node: NodeId, css: &str) -> ComputedStyle {
        let sheet = parse_stylesheet(css);
        StyleEngine::new()
            .compute(doc, node, &[&sheet])
            .unwrap()
            .unwrap()
    }

    #[test]
    fn user_agent_defaults_apply() {
        let (doc, div, p, span) = sample();
        let div_style = compute(&doc, div, "");
        assert_eq!(div_style.get("display"), Some("block"));
        assert_eq!(compute(&doc, span, "").get("display"), Some("inline"));
        assert_eq!(compute(&doc, p, "").get("margin-top"), Some("16px"));
    }

    #[test]
    fn specificity_then_source_order() {
        let (doc, _, p, _) = sample();
        let style = compute(&doc, p, "#first { color: red } p { color: blue } p { color: green }");
        assert_eq!(style.get("color"), Some("red"));
        let style = compute(&doc, p, "p { color: blue } p { color: green }");
        assert_eq!(style.get("color"), Some("green"));
    }

    #[test]
    fn later_author_sheets_win_ties() {
        let (doc, _, p, _) = sample();
        let first = parse_stylesheet("p { color: red }");
        let second = parse_stylesheet("p { color: blue }");
        let style = StyleEngine::new()
            .compute(&doc, p, &[&first, &second])
            .unwrap()
            .unwrap();
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn inheritance_and_explicit_keywords() {
        let (doc, _, p, span) = sample();
        let css = ".box { color: purple; margin: 3px } span { margin: inherit } p { color: initial }";
        let span_style = compute(&doc, span, css);
        assert_eq!(span_style.get("color"), Some("purple"));
        assert_eq!(span_style.get("margin-left"), Some("3px"));
        assert_eq!(compute(&doc, p, css).get("color"), Some("black"));
    }

    #[test]
    fn inline_style_beats_author_unless_important() {
        let (mut doc, _, p, _) = sample();
        doc.set_inline_style(p, "color: orange; font-size: 20px");
        let style = compute(&doc, p, "#first { color: red; font-size: 10px !important }");
        assert_eq!(style.get("color"), Some("orange"));
        assert_eq!(style.get("font-size"), Some("10px"));
    }

    #[test]
    fn shorthands_expand_to_longhands() {
        assert_eq!(
            expand_shorthand("margin", "1px 2px 3px"),
            vec![
                ("margin-top".to_string(), "1px".to_string()),
                ("margin-right".to_string(), "2px".to_string()),
                ("margin-bottom".to_string(), "3px".to_string()),
                ("margin-left".to_string(), "2px".to_string()),
            ]
        );
        let border = expand_shorthand("border-top", "solid 2px red");
        assert_eq!(border[0], ("border-top-width".to_string(), "2px".to_string()));
        assert_eq!(border[1], ("border-top-style".to_string(), "solid".to_string()));
        assert_eq!(border[2], ("border-top-color".to_string(), "red".to_string()));
        assert!(expand_shorthand("padding", "1px 2px 3px 4px 5px").is_empty());
        assert_eq!(expand_shorthand("border", "inherit").len(), 12);
    }

    #[test]
    fn function_values_stay_whole() {
        assert_eq!(
            split_components("calc(1px + 2px) rgb(0, 0, 0)"),
            vec!["calc(1px + 2px)".to_string(), "rgb(0, 0, 0)".to_string()]
        );
    }

    #[test]
    fn current_color_resolves_to_color() {
        let (doc, div, _, _) = sample();
        let style = compute(&doc, div, ".box { color: teal; border: 1px solid }");
        assert_eq!(style.get("border-left-color"), Some("teal"));
        assert_eq!(style.get("border-left-width"), Some("1px"));
    }

    #[test]
    fn pseudo_element_rules_do_not_leak() {
        let (doc, _, p, _) = sample();
        let style = compute(&doc, p, "p::before { color: red }");
        assert_eq!(style.get("color"), Some("black"));
    }

    #[test]
    fn errors_and_detached_elements() {
        let (mut doc, _, _, _) = sample();
        let engine = StyleEngine::new();
        let text = doc.create_text("loose");
        let detached = doc.create_element("p", vec![]);
        assert!(matches!(
            engine.compute(&doc, NodeId(999), &[]),
            Err(StyleError::UnknownNode(_))
        ));
        assert!(matches!(
            engine.compute(&doc, text, &[]),
            Err(StyleError::NotAnElement(_))
        ));
        assert_eq!(engine.compute(&doc, detached, &[]).unwrap(), None);
    }
}
