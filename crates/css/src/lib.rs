//! CSS crate — tokenizer, selector parser and stylesheet parser.
//!
//! Declaration values are kept as normalized text; interpreting them is the
//! style engine's job.

pub mod token;
pub mod selector;
pub mod parser;

pub use token::{CssToken, CssTokenizer, serialize_tokens, tokenize};
pub use selector::{
    AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector,
    Specificity, compute_specificity, parse_selector_list,
};
pub use parser::{
    CssRule, Declaration, Stylesheet, parse_declaration_block, parse_declaration_list,
    parse_stylesheet,
};
