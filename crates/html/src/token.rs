//! HTML token types produced by the tokenizer.

/// A single token emitted by the HTML tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    /// A `<!DOCTYPE …>` token.
    Doctype { name: Option<String> },
    /// A start tag like `<div class="x">`.
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    /// An end tag like `</div>`.
    EndTag { name: String },
    /// A comment like `<!-- text -->`.
    Comment(String),
    /// A run of text with character references already decoded.
    Text(String),
    /// End of file.
    EOF,
}
