use crate::selector::{ComplexSelector, parse_selector_list_from_tokens};
use crate::token::{CssToken, serialize_tokens, tokenize};

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lower-cased property name, e.g. `color`, `margin-left`.
    pub name: String,
    /// Value text with whitespace normalized and `!important` stripped.
    pub value: String,
    /// Whether `!important` was specified.
    pub important: bool,
}

impl Declaration {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
            important: false,
        }
    }
}

/// A CSS style rule: selectors + declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selectors: Vec<ComplexSelector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed CSS stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// All rules in the stylesheet, in source order.
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse a complete CSS stylesheet from a string.
///
/// Conditional group rules (`@media`, `@supports`, …) are flattened into the
/// outer rule list; every other at-rule is skipped. Rules with an invalid
/// selector are dropped.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let tokens = tokenize(input);
    Stylesheet {
        rules: parse_rules(&tokens),
    }
}

/// Parse the body of a `style="…"` attribute.
pub fn parse_declaration_list(input: &str) -> Vec<Declaration> {
    parse_declaration_block(&tokenize(input))
}

fn parse_rules(tokens: &[CssToken]) -> Vec<CssRule> {
    let mut rules = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match &tokens[pos] {
            CssToken::Whitespace | CssToken::CDO | CssToken::CDC => pos += 1,
            CssToken::AtKeyword(name) => {
                let lower = name.to_ascii_lowercase();
                let (block, next) = at_rule_block(tokens, pos);
                if matches!(
                    lower.as_str(),
                    "media" | "supports" | "document" | "-moz-document" | "layer" | "container"
                ) {
                    if let Some(block) = block {
                        rules.extend(parse_rules(block));
                    }
                }
                pos = next;
            }
            _ => {
                let (rule, next) = parse_qualified_rule(tokens, pos);
                rules.extend(rule);
                pos = next;
            }
        }
    }
    rules
}

/// Locate the `{ … }` body of the at-rule starting at `start`.
///
/// Returns the block contents (if the rule has one) and the position just
/// past the rule.
fn at_rule_block(tokens: &[CssToken], start: usize) -> (Option<&[CssToken]>, usize) {
    let mut pos = start + 1;
    while pos < tokens.len() {
        match tokens[pos] {
            CssToken::Semicolon => return (None, pos + 1),
            CssToken::LBrace => {
                let end = matching_brace(tokens, pos);
                let close = end.min(tokens.len());
                return (Some(&tokens[pos + 1..close]), (end + 1).min(tokens.len()));
            }
            _ => pos += 1,
        }
    }
    (None, pos)
}

/// Index of the `}` matching the `{` at `open`, or `tokens.len()` if unclosed.
fn matching_brace(tokens: &[CssToken], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            CssToken::LBrace => depth += 1,
            CssToken::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

/// Parse `selectors { declarations }`. An invalid prelude consumes the rule
/// and yields nothing.
fn parse_qualified_rule(tokens: &[CssToken], start: usize) -> (Option<CssRule>, usize) {
    let Some(open) = tokens[start..]
        .iter()
        .position(|t| *t == CssToken::LBrace)
        .map(|i| start + i)
    else {
        return (None, tokens.len());
    };

    let close = matching_brace(tokens, open);
    let next = (close + 1).min(tokens.len());
    let body = &tokens[open + 1..close.min(tokens.len())];

    let rule = parse_selector_list_from_tokens(&tokens[start..open]).map(|selectors| CssRule {
        selectors,
        declarations: parse_declaration_block(body),
    });
    (rule, next)
}

/// Parse a declaration block (the content between `{` and `}`).
pub fn parse_declaration_block(tokens: &[CssToken]) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    // Split on top-level semicolons; nested blocks/functions keep theirs.
    for (i, token) in tokens.iter().enumerate() {
        match token {
            CssToken::LBrace | CssToken::LParen | CssToken::LBracket | CssToken::Function(_) => {
                depth += 1
            }
            CssToken::RBrace | CssToken::RParen | CssToken::RBracket => {
                depth = depth.saturating_sub(1)
            }
            CssToken::Semicolon if depth == 0 => {
                declarations.extend(parse_declaration(&tokens[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    declarations.extend(parse_declaration(&tokens[start..]));
    declarations
}

/// Parse a single declaration: `property: value [!important]`.
fn parse_declaration(tokens: &[CssToken]) -> Option<Declaration> {
    let mut iter = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t != CssToken::Whitespace);

    let name = match iter.next()? {
        (_, CssToken::Ident(name)) => name.to_ascii_lowercase(),
        _ => return None,
    };
    let colon = match iter.next()? {
        (i, CssToken::Colon) => i,
        _ => return None,
    };

    let (value_tokens, important) = strip_important(&tokens[colon + 1..]);
    let value = serialize_tokens(value_tokens);
    if value.is_empty() {
        return None;
    }
    Some(Declaration {
        name,
        value,
        important,
    })
}

/// Check if the value tokens end with `!important`, and strip it if so.
fn strip_important(tokens: &[CssToken]) -> (&[CssToken], bool) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t != CssToken::Whitespace)
        .map(|(i, _)| i)
        .collect();

    if let [.., bang, last] = significant.as_slice() {
        let is_important =
            matches!(&tokens[*last], CssToken::Ident(s) if s.eq_ignore_ascii_case("important"));
        if is_important && tokens[*bang] == CssToken::Delim('!') {
            return (&tokens[..*bang], true);
        }
    }
    (tokens, false)
}
