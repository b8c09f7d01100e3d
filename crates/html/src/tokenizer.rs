//! HTML tokenizer.
//!
//! Converts a stream of characters into [`HtmlToken`]s. Text is emitted in
//! runs rather than per character. After a `<style>`, `<script>`, `<title>` or
//! `<textarea>` start tag the tokenizer switches itself into raw-text mode and
//! emits everything up to the matching end tag as a single text token.

use crate::token::HtmlToken;

/// Elements whose content is never parsed as markup.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script", "xmp", "iframe", "noembed", "noframes"];
/// Elements whose content is text with character references.
pub(crate) const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["title", "textarea"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Data,
    /// Inside the content of the named element; `bool` = decode references.
    RawText(String, bool),
    Done,
}

/// HTML tokenizer – call [`next_token`](Tokenizer::next_token) repeatedly
/// until you receive [`HtmlToken::EOF`].
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
}

impl Iterator for Tokenizer {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<HtmlToken> {
        match self.next_token() {
            HtmlToken::EOF => None,
            token => Some(token),
        }
    }
}

impl Tokenizer {
    /// Create a new tokenizer for the given HTML source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            state: State::Data,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Check if the upcoming characters (case-insensitive) match `s`.
    /// Does NOT consume them.
    fn lookahead_ci(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, expected)| {
                self.peek_at(i)
                    .is_some_and(|actual| actual.eq_ignore_ascii_case(&expected))
            })
    }

    fn consume_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_html_whitespace) {
            self.pos += 1;
        }
    }

    /// Consume characters until `stop` matches or input ends.
    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if stop(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    /// Consume through the next occurrence of `terminator`, returning what
    /// came before it.
    fn take_through(&mut self, terminator: &str) -> String {
        let mut out = String::new();
        while self.peek().is_some() {
            if self.lookahead_ci(terminator) {
                self.consume_n(terminator.chars().count());
                return out;
            }
            out.extend(self.consume());
        }
        out
    }

    // -----------------------------------------------------------------------
    // Public interface
    // -----------------------------------------------------------------------

    /// Return the next HTML token, or `HtmlToken::EOF` when done.
    pub fn next_token(&mut self) -> HtmlToken {
        loop {
            let token = match self.state.clone() {
                State::Done => return HtmlToken::EOF,
                State::RawText(tag, decode) => {
                    self.state = State::Data;
                    let text = self.raw_text(&tag);
                    if text.is_empty() {
                        continue;
                    }
                    HtmlToken::Text(if decode { decode_entities(&text) } else { text })
                }
                State::Data => match self.peek() {
                    None => {
                        self.state = State::Done;
                        return HtmlToken::EOF;
                    }
                    Some('<') => match self.tag_open() {
                        Some(token) => token,
                        None => continue,
                    },
                    Some(_) => HtmlToken::Text(decode_entities(&self.take_until(|c| c == '<'))),
                },
            };
            return token;
        }
    }

    /// Content of a raw-text element, up to (not including) its end tag.
    fn raw_text(&mut self, tag: &str) -> String {
        let close = format!("</{tag}");
        let mut out = String::new();
        while self.peek().is_some() {
            if self.lookahead_ci(&close) {
                let after = self.peek_at(close.chars().count());
                if after.is_none_or(|c| is_html_whitespace(c) || c == '/' || c == '>') {
                    break;
                }
            }
            out.extend(self.consume());
        }
        out
    }

    /// Handle `<` in the data state. `None` means the construct produced no
    /// token (e.g. `</>`).
    fn tag_open(&mut self) -> Option<HtmlToken> {
        match self.peek_at(1) {
            Some('!') => Some(self.markup_declaration()),
            Some('/') => match self.peek_at(2) {
                Some(c) if c.is_ascii_alphabetic() => Some(self.end_tag()),
                Some('>') => {
                    self.consume_n(3);
                    None
                }
                None => {
                    self.consume_n(2);
                    Some(HtmlToken::Text("</".into()))
                }
                Some(_) => {
                    self.consume_n(2);
                    Some(HtmlToken::Comment(self.take_through(">")))
                }
            },
            Some('?') => {
                self.consume_n(1);
                Some(HtmlToken::Comment(self.take_through(">")))
            }
            Some(c) if c.is_ascii_alphabetic() => Some(self.start_tag()),
            _ => {
                self.consume_n(1);
                Some(HtmlToken::Text("<".into()))
            }
        }
    }

    fn markup_declaration(&mut self) -> HtmlToken {
        if self.lookahead_ci("<!--") {
            self.consume_n(4);
            // `<!-->` and `<!--->` are complete (empty) comments.
            if self.peek() == Some('>') {
                self.consume_n(1);
                return HtmlToken::Comment(String::new());
            }
            if self.lookahead_ci("->") {
                self.consume_n(2);
                return HtmlToken::Comment(String::new());
            }
            return HtmlToken::Comment(self.take_through("-->"));
        }
        if self.lookahead_ci("<!doctype") {
            self.consume_n(9);
            self.skip_whitespace();
            let name = self.take_until(|c| is_html_whitespace(c) || c == '>');
            self.take_through(">");
            return HtmlToken::Doctype {
                name: (!name.is_empty()).then(|| name.to_ascii_lowercase()),
            };
        }
        self.consume_n(2);
        HtmlToken::Comment(self.take_through(">"))
    }

    fn end_tag(&mut self) -> HtmlToken {
        self.consume_n(2);
        let name = self
            .take_until(|c| is_html_whitespace(c) || c == '/' || c == '>')
            .to_ascii_lowercase();
        // Attributes on end tags are parse errors and are dropped.
        self.take_through(">");
        HtmlToken::EndTag { name }
    }

    fn start_tag(&mut self) -> HtmlToken {
        self.consume_n(1);
        let name = self
            .take_until(|c| is_html_whitespace(c) || c == '/' || c == '>')
            .to_ascii_lowercase();
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.consume_n(1);
                    break;
                }
                Some('/') => {
                    self.consume_n(1);
                    if self.peek() == Some('>') {
                        self.consume_n(1);
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let (attr_name, value) = self.attribute();
                    // Only the first occurrence of an attribute counts.
                    if !attr_name.is_empty() && !attrs.iter().any(|(n, _)| *n == attr_name) {
                        attrs.push((attr_name, value));
                    }
                }
            }
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.state = State::RawText(name.clone(), false);
        } else if ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.state = State::RawText(name.clone(), true);
        }

        HtmlToken::StartTag {
            name,
            attrs,
            self_closing,
        }
    }

    fn attribute(&mut self) -> (String, String) {
        let first = self.consume().map(String::from).unwrap_or_default();
        let rest = self.take_until(|c| is_html_whitespace(c) || matches!(c, '/' | '>' | '='));
        let name = (first + &rest).to_ascii_lowercase();

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return (name, String::new());
        }
        self.consume_n(1);
        self.skip_whitespace();

        let raw = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.consume_n(1);
                let value = self.take_until(|c| c == quote);
                self.consume_n(1);
                value
            }
            _ => self.take_until(|c| is_html_whitespace(c) || c == '>'),
        };
        (name, decode_entities(&raw))
    }
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

// ---------------------------------------------------------------------------
// Character references
// ---------------------------------------------------------------------------

const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '©'),
    ("reg", '®'),
    ("hellip", '…'),
    ("mdash", '—'),
    ("ndash", '–'),
];

/// Decode `&name;`, `&#NN;` and `&#xHH;` references. Unknown or malformed
/// references are left as written.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the reference at the start of `s` (which begins with `&`),
/// returning the character and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';')?;
    let body = &s[1..semi];
    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}')
    } else {
        NAMED_REFERENCES
            .iter()
            .find(|(name, _)| *name == body)
            .map(|&(_, c)| c)?
    };
    Some((ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<HtmlToken> {
        Tokenizer::new(input).collect()
    }

    fn start(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> HtmlToken {
        HtmlToken::StartTag {
            name: name.into(),
            attrs: attrs
                .iter()
                .map(|&(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn simple_text() {
        assert_eq!(tokenize("Hello"), vec![HtmlToken::Text("Hello".into())]);
    }

    #[test]
    fn tags_and_text() {
        assert_eq!(
            tokenize("<p>Hi</P>"),
            vec![
                start("p", &[], false),
                HtmlToken::Text("Hi".into()),
                HtmlToken::EndTag { name: "p".into() },
            ]
        );
    }

    #[test]
    fn attribute_forms() {
        assert_eq!(
            tokenize(r#"<div id="main" class='a b' data-x=1 hidden ID=dup>"#),
            vec![start(
                "div",
                &[("id", "main"), ("class", "a b"), ("data-x", "1"), ("hidden", "")],
                false
            )]
        );
    }

    #[test]
    fn self_closing_with_attr() {
        assert_eq!(
            tokenize(r#"<img src="test"/>"#),
            vec![start("img", &[("src", "test")], true)]
        );
    }

    #[test]
    fn comments_and_doctype() {
        assert_eq!(
            tokenize("<!DOCTYPE html><!-- hello --><!---->"),
            vec![
                HtmlToken::Doctype {
                    name: Some("html".into())
                },
                HtmlToken::Comment(" hello ".into()),
                HtmlToken::Comment(String::new()),
            ]
        );
    }

    #[test]
    fn style_content_is_raw_text() {
        assert_eq!(
            tokenize("<style scoped>p > a { color: red } /* <b> &amp; */</style>x"),
            vec![
                start("style", &[("scoped", "")], false),
                HtmlToken::Text("p > a { color: red } /* <b> &amp; */".into()),
                HtmlToken::EndTag {
                    name: "style".into()
                },
                HtmlToken::Text("x".into()),
            ]
        );
    }

    #[test]
    fn empty_style_emits_no_text() {
        assert_eq!(
            tokenize("<style></style>"),
            vec![
                start("style", &[], false),
                HtmlToken::EndTag {
                    name: "style".into()
                },
            ]
        );
    }

    #[test]
    fn character_references() {
        assert_eq!(decode_entities("&amp;&lt;&gt;&quot;&#65;&#x41;"), "&<>\"AA");
        assert_eq!(decode_entities("a & b &bogus; &#xZZ;"), "a & b &bogus; &#xZZ;");
        assert_eq!(
            tokenize(r#"<a title="a&amp;b">"#),
            vec![start("a", &[("title", "a&b")], false)]
        );
    }

    #[test]
    fn stray_less_than_is_text() {
        assert_eq!(
            tokenize("1 < 2"),
            vec![
                HtmlToken::Text("1 ".into()),
                HtmlToken::Text("<".into()),
                HtmlToken::Text(" 2".into()),
            ]
        );
    }
}
