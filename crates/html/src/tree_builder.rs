//! HTML tree builder — constructs a [`Document`] from a stream of [`HtmlToken`]s.
//!
//! Implements a simplified version of the WHATWG tree construction algorithm:
//! implied `html`/`head`/`body` elements, void elements, automatic closing of
//! paragraphs and list items, and the generic end-tag recovery steps.

use crate::token::HtmlToken;
use crate::tokenizer::{ESCAPABLE_RAW_TEXT_ELEMENTS, RAW_TEXT_ELEMENTS, Tokenizer};
use dom::{Attr, Document, NodeData, NodeId};

// ---------------------------------------------------------------------------
// Insertion mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    AfterHead,
    InBody,
    /// Inside a raw-text element; only text and its end tag arrive here.
    Text,
    AfterBody,
}

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Start tags that belong in `<head>` when seen before `<body>`.
const HEAD_ELEMENTS: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Block-level start tags that close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Elements that stop the generic end-tag search.
const SPECIAL: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "html", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

/// Builds a DOM tree from HTML tokens.
pub struct TreeBuilder {
    pub document: Document,
    mode: InsertionMode,
    original_mode: InsertionMode,
    open_elements: Vec<NodeId>,
    head: Option<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a new tree builder with an empty document.
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            open_elements: Vec::new(),
            head: None,
        }
    }

    // =======================================================================
    // Helpers
    // =======================================================================

    /// Return the tag name of a node, or "" if it isn't an element.
    fn tag_name(&self, node: NodeId) -> &str {
        self.document
            .element(node)
            .map(|e| e.tag_name.as_str())
            .unwrap_or("")
    }

    /// Current node = last element on the open elements stack.
    fn current_node(&self) -> NodeId {
        self.open_elements
            .last()
            .copied()
            .unwrap_or(self.document.root())
    }

    fn current_node_is(&self, tag: &str) -> bool {
        self.tag_name(self.current_node()) == tag
    }

    /// Insert an element at the current node and push it onto the open
    /// elements stack (void elements are popped straight away).
    fn insert_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        let attrs = attrs.into_iter().map(|(n, v)| Attr::new(n, v)).collect();
        let id = self.document.create_element(tag, attrs);
        let parent = self.current_node();
        self.document.append_child(parent, id);
        if !VOID_ELEMENTS.contains(&tag) {
            self.open_elements.push(id);
        }
        if RAW_TEXT_ELEMENTS.contains(&tag) || ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&tag) {
            self.original_mode = self.mode;
            self.mode = InsertionMode::Text;
        }
        id
    }

    /// Append text to the current node, merging with a preceding text node.
    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current_node();
        let last = self.document.node(parent).and_then(|n| n.last_child);
        if let Some(last) = last {
            if let Some(NodeData::Text { data }) = self.document.node_mut(last).map(|n| &mut n.data) {
                data.push_str(text);
                return;
            }
        }
        let id = self.document.create_text(text);
        self.document.append_child(parent, id);
    }

    fn insert_comment(&mut self, parent: NodeId, data: &str) {
        let id = self.document.create_comment(data);
        self.document.append_child(parent, id);
    }

    /// Pop elements until one named `tag` has been popped.
    fn pop_until_tag(&mut self, tag: &str) {
        while let Some(id) = self.open_elements.pop() {
            if self.tag_name(id) == tag {
                break;
            }
        }
    }

    /// Whether `tag` is open, looking down the stack no further than an
    /// element in `boundary`.
    fn has_in_scope(&self, tag: &str, boundary: &[&str]) -> bool {
        for &id in self.open_elements.iter().rev() {
            let name = self.tag_name(id);
            if name == tag {
                return true;
            }
            if boundary.contains(&name) {
                return false;
            }
        }
        false
    }

    fn has_p_in_button_scope(&self) -> bool {
        self.has_in_scope("p", &["html", "table", "td", "th", "button"])
    }

    fn close_p_element(&mut self) {
        if self.has_p_in_button_scope() {
            self.pop_until_tag("p");
        }
    }

    fn ensure_html(&mut self) {
        if self.open_elements.is_empty() {
            self.insert_element("html", Vec::new());
        }
    }

    // =======================================================================
    // Token dispatch
    // =======================================================================

    /// Process one token in the current insertion mode.
    pub fn process_token(&mut self, token: HtmlToken) {
        match self.mode {
            InsertionMode::Initial => self.handle_initial(token),
            InsertionMode::BeforeHtml => self.handle_before_html(token),
            InsertionMode::BeforeHead => self.handle_before_head(token),
            InsertionMode::InHead => self.handle_in_head(token),
            InsertionMode::AfterHead => self.handle_after_head(token),
            InsertionMode::InBody => self.handle_in_body(token),
            InsertionMode::Text => self.handle_text(token),
            InsertionMode::AfterBody => self.handle_after_body(token),
        }
    }

    /// Reprocess `token` in `mode`.
    fn reprocess(&mut self, mode: InsertionMode, token: HtmlToken) {
        self.mode = mode;
        self.process_token(token);
    }

    /// Split leading inter-element whitespace off a text token. The
    /// whitespace is handed to `keep`; the remainder (if any) is returned.
    fn leading_whitespace(token: HtmlToken, keep: impl FnOnce(&str)) -> Option<HtmlToken> {
        match token {
            HtmlToken::Text(text) => {
                let rest = text.trim_start_matches([' ', '\t', '\n', '\r', '\x0C']);
                keep(&text[..text.len() - rest.len()]);
                (!rest.is_empty()).then(|| HtmlToken::Text(rest.to_string()))
            }
            other => Some(other),
        }
    }

    fn handle_initial(&mut self, token: HtmlToken) {
        let root = self.document.root();
        match token {
            HtmlToken::Doctype { name } => {
                let id = self.document.create_doctype(name.as_deref().unwrap_or(""));
                self.document.append_child(root, id);
                self.mode = InsertionMode::BeforeHtml;
            }
            HtmlToken::Comment(data) => self.insert_comment(root, &data),
            other => {
                if let Some(token) = Self::leading_whitespace(other, |_| {}) {
                    self.reprocess(InsertionMode::BeforeHtml, token);
                }
            }
        }
    }

    fn handle_before_html(&mut self, token: HtmlToken) {
        let root = self.document.root();
        let Some(token) = Self::leading_whitespace(token, |_| {}) else {
            return;
        };
        match token {
            HtmlToken::Doctype { .. } => {}
            HtmlToken::Comment(data) => self.insert_comment(root, &data),
            HtmlToken::StartTag { name, attrs, .. } if name == "html" => {
                self.insert_element("html", attrs);
                self.mode = InsertionMode::BeforeHead;
            }
            HtmlToken::EndTag { ref name }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {}
            other => {
                self.ensure_html();
                self.reprocess(InsertionMode::BeforeHead, other);
            }
        }
    }

    fn handle_before_head(&mut self, token: HtmlToken) {
        let Some(token) = Self::leading_whitespace(token, |_| {}) else {
            return;
        };
        match token {
            HtmlToken::Doctype { .. } => {}
            HtmlToken::Comment(data) => {
                let parent = self.current_node();
                self.insert_comment(parent, &data);
            }
            HtmlToken::StartTag { name, .. } if name == "html" => {}
            HtmlToken::StartTag { name, attrs, .. } if name == "head" => {
                self.head = Some(self.insert_element("head", attrs));
                self.mode = InsertionMode::InHead;
            }
            HtmlToken::EndTag { ref name }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {}
            other => {
                self.head = Some(self.insert_element("head", Vec::new()));
                self.reprocess(InsertionMode::InHead, other);
            }
        }
    }

    fn handle_in_head(&mut self, token: HtmlToken) {
        let mut whitespace = String::new();
        let Some(token) = Self::leading_whitespace(token, |ws| whitespace.push_str(ws)) else {
            self.insert_text(&whitespace);
            return;
        };
        self.insert_text(&whitespace);
        match token {
            HtmlToken::Doctype { .. } => {}
            HtmlToken::Comment(data) => {
                let parent = self.current_node();
                self.insert_comment(parent, &data);
            }
            HtmlToken::StartTag { name, attrs, .. } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                self.insert_element(&name, attrs);
            }
            HtmlToken::EndTag { name } if name == "head" => {
                self.pop_until_tag("head");
                self.mode = InsertionMode::AfterHead;
            }
            HtmlToken::EndTag { name } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                if self.current_node_is(&name) {
                    self.open_elements.pop();
                }
            }
            other => {
                self.pop_until_tag("head");
                self.reprocess(InsertionMode::AfterHead, other);
            }
        }
    }

    fn handle_after_head(&mut self, token: HtmlToken) {
        let mut whitespace = String::new();
        let Some(token) = Self::leading_whitespace(token, |ws| whitespace.push_str(ws)) else {
            self.insert_text(&whitespace);
            return;
        };
        self.insert_text(&whitespace);
        match token {
            HtmlToken::Doctype { .. } => {}
            HtmlToken::Comment(data) => {
                let parent = self.current_node();
                self.insert_comment(parent, &data);
            }
            HtmlToken::StartTag { name, attrs, .. } if name == "body" => {
                self.insert_element("body", attrs);
                self.mode = InsertionMode::InBody;
            }
            HtmlToken::StartTag {
                name,
                attrs,
                self_closing,
            } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                // Late head content goes back into <head>.
                if let Some(head) = self.head {
                    self.open_elements.push(head);
                    self.handle_in_head(HtmlToken::StartTag {
                        name,
                        attrs,
                        self_closing,
                    });
                    self.open_elements.retain(|&id| id != head);
                }
            }
            HtmlToken::EndTag { ref name } if !matches!(name.as_str(), "body" | "html" | "br") => {}
            other => {
                self.insert_element("body", Vec::new());
                self.reprocess(InsertionMode::InBody, other);
            }
        }
    }

    fn handle_in_body(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Text(text) => self.insert_text(&text),
            HtmlToken::Comment(data) => {
                let parent = self.current_node();
                self.insert_comment(parent, &data);
            }
            HtmlToken::Doctype { .. } => {}
            HtmlToken::StartTag { name, attrs, .. } => self.in_body_start_tag(name, attrs),
            HtmlToken::EndTag { name } => self.in_body_end_tag(&name),
            HtmlToken::EOF => {}
        }
    }

    fn in_body_start_tag(&mut self, name: String, attrs: Vec<(String, String)>) {
        match name.as_str() {
            "html" | "body" | "head" => {}
            "li" | "dd" | "dt" => {
                let closes: &[&str] = if name == "li" { &["li"] } else { &["dd", "dt"] };
                let mut implied = None;
                for &id in self.open_elements.iter().rev() {
                    let open = self.tag_name(id);
                    if closes.contains(&open) {
                        implied = Some(open.to_string());
                        break;
                    }
                    if SPECIAL.contains(&open) && !matches!(open, "address" | "div" | "p") {
                        break;
                    }
                }
                if let Some(open) = implied {
                    self.pop_until_tag(&open);
                }
                self.close_p_element();
                self.insert_element(&name, attrs);
            }
            _ if HEADINGS.contains(&name.as_str()) => {
                self.close_p_element();
                if HEADINGS.contains(&self.tag_name(self.current_node())) {
                    self.open_elements.pop();
                }
                self.insert_element(&name, attrs);
            }
            _ => {
                if CLOSES_P.contains(&name.as_str()) {
                    self.close_p_element();
                }
                self.insert_element(&name, attrs);
            }
        }
    }

    fn in_body_end_tag(&mut self, name: &str) {
        match name {
            "body" | "html" => {
                if self.has_in_scope("body", &["html"]) {
                    self.mode = InsertionMode::AfterBody;
                }
            }
            "p" => {
                if !self.has_p_in_button_scope() {
                    self.insert_element("p", Vec::new());
                }
                self.pop_until_tag("p");
            }
            "br" => {
                self.insert_element("br", Vec::new());
            }
            _ if SPECIAL.contains(&name) => {
                let boundary: &[&str] = if name == "li" {
                    &["html", "table", "td", "th", "ol", "ul"]
                } else {
                    &["html", "table", "td", "th"]
                };
                // Popping through also closes implied children like <li>.
                if self.has_in_scope(name, boundary) {
                    self.pop_until_tag(name);
                }
            }
            _ => self.any_other_end_tag(name),
        }
    }

    /// Pop up to and including the nearest open element named `name`, unless
    /// a special element is found first.
    fn any_other_end_tag(&mut self, name: &str) {
        for index in (0..self.open_elements.len()).rev() {
            let tag = self.tag_name(self.open_elements[index]);
            if tag == name {
                self.open_elements.truncate(index);
                return;
            }
            if SPECIAL.contains(&tag) {
                return;
            }
        }
    }

    fn handle_text(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Text(text) => self.insert_text(&text),
            HtmlToken::EndTag { .. } => {
                self.open_elements.pop();
                self.mode = self.original_mode;
            }
            HtmlToken::EOF => {
                self.open_elements.pop();
                self.reprocess(self.original_mode, HtmlToken::EOF);
            }
            _ => {}
        }
    }

    fn handle_after_body(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Comment(data) => {
                let html = self.open_elements.first().copied().unwrap_or(self.document.root());
                self.insert_comment(html, &data);
            }
            HtmlToken::EndTag { ref name } if name == "html" || name == "body" => {}
            HtmlToken::Doctype { .. } | HtmlToken::EOF => {}
            // Content after </body> still belongs to the body.
            other => self.reprocess(InsertionMode::InBody, other),
        }
    }

    /// Finish parsing and hand back the document.
    pub fn finish(self) -> Document {
        self.document
    }
}

// ===========================================================================
// Public convenience function
// ===========================================================================

/// Parse an HTML string into a document.
pub fn parse(input: &str) -> Document {
    let mut builder = TreeBuilder::new();
    for token in Tokenizer::new(input) {
        builder.process_token(token);
    }
    if builder.mode == InsertionMode::Text {
        builder.process_token(HtmlToken::EOF);
    }
    if !matches!(builder.mode, InsertionMode::InBody | InsertionMode::AfterBody) {
        // Complete the skeleton for documents that never reach the body.
        builder.process_token(HtmlToken::StartTag {
            name: "body".into(),
            attrs: Vec::new(),
            self_closing: false,
        });
    }
    builder.finish()
}

// ===========================================================================
// Tests
// ===========================================================================
