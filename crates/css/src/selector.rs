//! Selector model and parser.
//!
//! Complex selectors are stored right-to-left so matching can start at the
//! subject element and walk outwards.

use crate::token::{CssToken, tokenize};

/// Combinator between compound selectors in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

/// Pseudo-classes understood by static style resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Link,
    /// `:hover`, `:focus`, `:visited`, … need interaction state and never match here.
    Dynamic(String),
    /// `:not(...)` containing a compound selector.
    Not(Box<CompoundSelector>),
}

/// A single simple selector component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector, e.g. `div`, `p`.
    Type(String),
    /// Universal selector `*`.
    Universal,
    /// ID selector `#foo`.
    Id(String),
    /// Class selector `.bar`.
    Class(String),
    /// Attribute selector `[name op value]`.
    Attribute {
        name: String,
        op: AttrOp,
        value: Option<String>,
    },
    PseudoClass(PseudoClass),
    /// `::before`, `::after`, … Rules targeting pseudo-elements never style
    /// the element itself.
    PseudoElement(String),
}

/// A sequence of simple selectors without combinators (e.g. `div.foo#bar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// A chain of compound selectors separated by combinators.
///
/// `parts[0]` is the rightmost (subject) compound. Each entry carries the
/// combinator that leads to the next entry; the last one carries `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

/// CSS specificity `(ids, classes, types)`, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }
}

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity::new(self.a + other.a, self.b + other.b, self.c + other.c)
    }
}

/// Compute the specificity of a complex selector.
pub fn compute_specificity(selector: &ComplexSelector) -> Specificity {
    selector
        .parts
        .iter()
        .fold(Specificity::default(), |acc, (compound, _)| {
            acc + compound_specificity(compound)
        })
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .fold(Specificity::default(), |acc, simple| {
            acc + match simple {
                SimpleSelector::Id(_) => Specificity::new(1, 0, 0),
                SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => {
                    Specificity::new(0, 1, 0)
                }
                // :not() counts its argument.
                SimpleSelector::PseudoClass(PseudoClass::Not(inner)) => {
                    compound_specificity(inner)
                }
                SimpleSelector::PseudoClass(_) => Specificity::new(0, 1, 0),
                SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => {
                    Specificity::new(0, 0, 1)
                }
                SimpleSelector::Universal => Specificity::default(),
            }
        })
}

/// Parse a selector list string such as `h1, .note > p`.
///
/// Returns `None` when any selector in the list is invalid, which drops the
/// whole rule the way browsers do.
pub fn parse_selector_list(input: &str) -> Option<Vec<ComplexSelector>> {
    parse_selector_list_from_tokens(&tokenize(input))
}

/// Parse a selector list from a slice of tokens (the prelude of a rule).
pub fn parse_selector_list_from_tokens(tokens: &[CssToken]) -> Option<Vec<ComplexSelector>> {
    let mut selectors = Vec::new();
    for group in tokens.split(|t| *t == CssToken::Comma) {
        let mut parser = SelectorParser { tokens: group, pos: 0 };
        selectors.push(parser.complex()?);
    }
    Some(selectors)
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

struct SelectorParser<'a> {
    tokens: &'a [CssToken],
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn peek(&self) -> Option<&'a CssToken> {
        self.tokens.get(self.pos)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek() == Some(&CssToken::Whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn complex(&mut self) -> Option<ComplexSelector> {
        self.skip_whitespace();
        let mut ltr: Vec<(Combinator, CompoundSelector)> = Vec::new();
        let first = self.compound()?;

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None => break,
                Some(CssToken::Delim('>')) => Combinator::Child,
                Some(CssToken::Delim('+')) => Combinator::NextSibling,
                Some(CssToken::Delim('~')) => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return None,
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            ltr.push((combinator, self.compound()?));
        }

        // Right-to-left: each compound carries the combinator leading further left.
        let mut parts = Vec::with_capacity(ltr.len() + 1);
        while let Some((combinator, compound)) = ltr.pop() {
            parts.push((compound, Some(combinator)));
        }
        parts.push((first, None));
        Some(ComplexSelector { parts })
    }

    fn compound(&mut self) -> Option<CompoundSelector> {
        let mut simples = Vec::new();

        match self.peek() {
            Some(CssToken::Ident(name)) => {
                simples.push(SimpleSelector::Type(name.to_ascii_lowercase()));
                self.pos += 1;
            }
            Some(CssToken::Delim('*')) => {
                simples.push(SimpleSelector::Universal);
                self.pos += 1;
            }
            _ => {}
        }

        while let Some(token) = self.peek() {
            let simple = match token {
                CssToken::Hash(id) => {
                    self.pos += 1;
                    SimpleSelector::Id(id.clone())
                }
                CssToken::Delim('.') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(CssToken::Ident(class)) => {
                            self.pos += 1;
                            SimpleSelector::Class(class.clone())
                        }
                        _ => return None,
                    }
                }
                CssToken::LBracket => self.attribute()?,
                CssToken::Colon => self.pseudo()?,
                _ => break,
            };
            simples.push(simple);
        }

        if simples.is_empty() {
            None
        } else {
            Some(CompoundSelector { simples })
        }
    }

    fn attribute(&mut self) -> Option<SimpleSelector> {
        self.pos += 1; // '['
        self.skip_whitespace();
        let name = match self.peek() {
            Some(CssToken::Ident(n)) => n.to_ascii_lowercase(),
            _ => return None,
        };
        self.pos += 1;
        self.skip_whitespace();

        if self.peek() == Some(&CssToken::RBracket) {
            self.pos += 1;
            return Some(SimpleSelector::Attribute {
                name,
                op: AttrOp::Exists,
                value: None,
            });
        }

        let op = match self.peek() {
            Some(CssToken::Delim('=')) => {
                self.pos += 1;
                AttrOp::Eq
            }
            Some(CssToken::Delim(c)) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return None,
                };
                if self.tokens.get(self.pos + 1) != Some(&CssToken::Delim('=')) {
                    return None;
                }
                self.pos += 2;
                op
            }
            _ => return None,
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(CssToken::Ident(v)) | Some(CssToken::String(v)) => v.clone(),
            _ => return None,
        };
        self.pos += 1;
        self.skip_whitespace();
        if self.peek() != Some(&CssToken::RBracket) {
            return None;
        }
        self.pos += 1;
        Some(SimpleSelector::Attribute {
            name,
            op,
            value: Some(value),
        })
    }

    fn pseudo(&mut self) -> Option<SimpleSelector> {
        self.pos += 1; // ':'
        if self.peek() == Some(&CssToken::Colon) {
            self.pos += 1;
            return match self.peek() {
                Some(CssToken::Ident(name)) => {
                    self.pos += 1;
                    Some(SimpleSelector::PseudoElement(name.to_ascii_lowercase()))
                }
                _ => None,
            };
        }

        match self.peek()? {
            CssToken::Ident(name) => {
                self.pos += 1;
                let lower = name.to_ascii_lowercase();
                let pc = match lower.as_str() {
                    "root" => PseudoClass::Root,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "empty" => PseudoClass::Empty,
                    "link" | "any-link" => PseudoClass::Link,
                    "hover" | "active" | "focus" | "focus-within" | "focus-visible"
                    | "visited" | "target" | "checked" | "disabled" | "enabled" => {
                        PseudoClass::Dynamic(lower)
                    }
                    // Legacy single-colon pseudo-elements.
                    "before" | "after" | "first-line" | "first-letter" => {
                        return Some(SimpleSelector::PseudoElement(lower));
                    }
                    _ => return None,
                };
                Some(SimpleSelector::PseudoClass(pc))
            }
            CssToken::Function(name) if name.eq_ignore_ascii_case("not") => {
                self.pos += 1;
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                if self.peek() != Some(&CssToken::RParen) {
                    return None;
                }
                self.pos += 1;
                Some(SimpleSelector::PseudoClass(PseudoClass::Not(Box::new(inner))))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> ComplexSelector {
        let mut list = parse_selector_list(input).expect("valid selector");
        assert_eq!(list.len(), 1);
        list.remove(0)
    }

    #[test]
    fn compound_type_class_id() {
        let sel = single("div.note#main");
        assert_eq!(sel.parts.len(), 1);
        assert_eq!(
            sel.parts[0].0.simples,
            vec![
                SimpleSelector::Type("div".into()),
                SimpleSelector::Class("note".into()),
                SimpleSelector::Id("main".into()),
            ]
        );
        assert_eq!(sel.parts[0].1, None);
    }

    #[test]
    fn combinators_are_stored_right_to_left() {
        let sel = single("section > div p");
        assert_eq!(sel.parts.len(), 3);
        assert_eq!(sel.parts[0].0.simples, vec![SimpleSelector::Type("p".into())]);
        assert_eq!(sel.parts[0].1, Some(Combinator::Descendant));
        assert_eq!(sel.parts[1].0.simples, vec![SimpleSelector::Type("div".into())]);
        assert_eq!(sel.parts[1].1, Some(Combinator::Child));
        assert_eq!(sel.parts[2].0.simples, vec![SimpleSelector::Type("section".into())]);
        assert_eq!(sel.parts[2].1, None);
    }

    #[test]
    fn sibling_combinators() {
        let sel = single("h1 + p ~ span");
        assert_eq!(sel.parts[0].1, Some(Combinator::SubsequentSibling));
        assert_eq!(sel.parts[1].1, Some(Combinator::NextSibling));
    }

    #[test]
    fn selector_list_and_attributes() {
        let list = parse_selector_list("style[scoped], a[href^=\"http\"]").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list[0].parts[0].0.simples[1],
            SimpleSelector::Attribute {
                name: "scoped".into(),
                op: AttrOp::Exists,
                value: None
            }
        );
        assert_eq!(
            list[1].parts[0].0.simples[1],
            SimpleSelector::Attribute {
                name: "href".into(),
                op: AttrOp::Prefix,
                value: Some("http".into())
            }
        );
    }

    #[test]
    fn invalid_selectors_drop_the_list() {
        assert!(parse_selector_list("p, :unknown-thing").is_none());
        assert!(parse_selector_list(".").is_none());
        assert!(parse_selector_list("a >").is_none());
        assert!(parse_selector_list("").is_none());
    }

    #[test]
    fn specificity_ordering() {
        assert_eq!(compute_specificity(&single("div.foo#bar")), Specificity::new(1, 1, 1));
        assert_eq!(compute_specificity(&single("*")), Specificity::default());
        assert_eq!(compute_specificity(&single("p:not(.x)")), Specificity::new(0, 1, 1));
        assert!(compute_specificity(&single("#a")) > compute_specificity(&single(".a .b .c")));
        assert!(compute_specificity(&single("ul li")) > compute_specificity(&single("li")));
    }

    #[test]
    fn pseudo_elements_and_dynamic_classes() {
        let sel = single("p::before");
        assert_eq!(
            sel.parts[0].0.simples[1],
            SimpleSelector::PseudoElement("before".into())
        );
        let sel = single("a:hover");
        assert_eq!(
            sel.parts[0].0.simples[1],
            SimpleSelector::PseudoClass(PseudoClass::Dynamic("hover".into()))
        );
    }
}
