//! HTML parser crate — tokenizer, tree builder and serializer.
//!
//! Parses HTML into a [`dom::Document`] using a WHATWG-inspired tokenizer
//! and a simplified tree construction algorithm.

pub mod serialize;
pub mod token;
pub mod tokenizer;
pub mod tree_builder;

pub use serialize::{inner_html, outer_html, serialize};
pub use token::HtmlToken;
pub use tokenizer::{Tokenizer, decode_entities};
pub use tree_builder::TreeBuilder;

/// Convenience function: parse an HTML string into a document.
///
/// ```
/// let doc = html::parse("<p>Hello</p>");
/// assert_eq!(doc.get_elements_by_tag(doc.root(), "p").len(), 1);
/// ```
pub fn parse(html: &str) -> dom::Document {
    tree_builder::parse(html)
}
