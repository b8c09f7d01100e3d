//! CSS tokenizer (a pragmatic subset of CSS Syntax Level 3).
//!
//! Numeric tokens keep the text they were written with so that declaration
//! values can be serialized back exactly (`1.50em` stays `1.50em`).

/// CSS token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssToken {
    Ident(String),
    Function(String),
    AtKeyword(String),
    Hash(String),
    String(String),
    Url(String),
    Number(String),
    Percentage(String),
    Dimension { value: String, unit: String },
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Delim(char),
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
}

impl CssToken {
    /// Append the CSS text of this token to `out`.
    pub fn write_css(&self, out: &mut String) {
        match self {
            CssToken::Ident(s) => out.push_str(s),
            CssToken::Function(name) => {
                out.push_str(name);
                out.push('(');
            }
            CssToken::AtKeyword(name) => {
                out.push('@');
                out.push_str(name);
            }
            CssToken::Hash(s) => {
                out.push('#');
                out.push_str(s);
            }
            CssToken::String(s) => {
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' || ch == '\\' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('"');
            }
            CssToken::Url(s) => {
                out.push_str("url(");
                out.push_str(s);
                out.push(')');
            }
            CssToken::Number(n) => out.push_str(n),
            CssToken::Percentage(n) => {
                out.push_str(n);
                out.push('%');
            }
            CssToken::Dimension { value, unit } => {
                out.push_str(value);
                out.push_str(unit);
            }
            CssToken::Whitespace => out.push(' '),
            CssToken::Colon => out.push(':'),
            CssToken::Semicolon => out.push(';'),
            CssToken::Comma => out.push(','),
            CssToken::LBracket => out.push('['),
            CssToken::RBracket => out.push(']'),
            CssToken::LParen => out.push('('),
            CssToken::RParen => out.push(')'),
            CssToken::LBrace => out.push('{'),
            CssToken::RBrace => out.push('}'),
            CssToken::Delim(c) => out.push(*c),
            CssToken::CDO => out.push_str("<!--"),
            CssToken::CDC => out.push_str("-->"),
        }
    }
}

/// Serialize a token run back to CSS text, trimming outer whitespace.
/// Whitespace runs are already collapsed by the tokenizer.
pub fn serialize_tokens(tokens: &[CssToken]) -> String {
    let start = tokens
        .iter()
        .position(|t| *t != CssToken::Whitespace)
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| *t != CssToken::Whitespace)
        .map_or(start, |i| i + 1);

    let mut out = String::new();
    for token in &tokens[start..end] {
        token.write_css(&mut out);
    }
    out
}

/// Tokenize a whole input string.
pub fn tokenize(input: &str) -> Vec<CssToken> {
    CssTokenizer::new(input).collect()
}

/// A CSS tokenizer that yields [`CssToken`]s until the input is exhausted.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl Iterator for CssTokenizer {
    type Item = CssToken;

    fn next(&mut self) -> Option<CssToken> {
        self.next_token()
    }
}

impl CssTokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Consume and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<CssToken> {
        self.skip_comments();
        let ch = self.peek()?;

        if is_whitespace(ch) {
            while self.peek().is_some_and(is_whitespace) {
                self.pos += 1;
                self.skip_comments();
            }
            return Some(CssToken::Whitespace);
        }

        if ch == '"' || ch == '\'' {
            return Some(self.consume_string(ch));
        }

        if ch.is_ascii_digit() || ((ch == '+' || ch == '-' || ch == '.') && self.starts_number()) {
            return Some(self.consume_numeric());
        }

        let token = match ch {
            '#' => {
                self.pos += 1;
                if self.peek().is_some_and(is_name_char) || self.starts_escape(self.pos) {
                    CssToken::Hash(self.consume_name())
                } else {
                    CssToken::Delim('#')
                }
            }
            '-' if self.matches_ahead("-->") => {
                self.pos += 3;
                CssToken::CDC
            }
            '-' if self.starts_ident(self.pos) => self.consume_ident_like(),
            '@' => {
                self.pos += 1;
                if self.starts_ident(self.pos) {
                    CssToken::AtKeyword(self.consume_name())
                } else {
                    CssToken::Delim('@')
                }
            }
            '<' if self.matches_ahead("<!--") => {
                self.pos += 4;
                CssToken::CDO
            }
            ':' => self.single(CssToken::Colon),
            ';' => self.single(CssToken::Semicolon),
            ',' => self.single(CssToken::Comma),
            '[' => self.single(CssToken::LBracket),
            ']' => self.single(CssToken::RBracket),
            '(' => self.single(CssToken::LParen),
            ')' => self.single(CssToken::RParen),
            '{' => self.single(CssToken::LBrace),
            '}' => self.single(CssToken::RBrace),
            c if is_name_start_char(c) || self.starts_escape(self.pos) => {
                self.consume_ident_like()
            }
            c => self.single(CssToken::Delim(c)),
        };
        Some(token)
    }

    // --- Helper methods ---

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, idx: usize) -> Option<char> {
        self.input.get(idx).copied()
    }

    fn single(&mut self, token: CssToken) -> CssToken {
        self.pos += 1;
        token
    }

    fn matches_ahead(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(self.pos + i) == Some(c))
    }

    fn skip_comments(&mut self) {
        while self.matches_ahead("/*") {
            self.pos += 2;
            while self.pos < self.input.len() && !self.matches_ahead("*/") {
                self.pos += 1;
            }
            self.pos = (self.pos + 2).min(self.input.len());
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        self.pos += 1;
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                c if c == quote => break,
                // Unescaped newline ends the string (parse error, keep what we have).
                '\n' => break,
                '\\' => match self.peek() {
                    None => break,
                    Some('\n') => self.pos += 1,
                    Some(_) => value.push(self.consume_escape()),
                },
                c => value.push(c),
            }
        }
        CssToken::String(value)
    }

    /// Consume the code point after a backslash.
    fn consume_escape(&mut self) -> char {
        let Some(ch) = self.peek() else {
            return '\u{FFFD}';
        };
        self.pos += 1;
        if !ch.is_ascii_hexdigit() {
            return ch;
        }
        let mut hex = String::from(ch);
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            hex.push(self.input[self.pos]);
            self.pos += 1;
        }
        if self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    fn starts_escape(&self, idx: usize) -> bool {
        self.peek_at(idx) == Some('\\') && self.peek_at(idx + 1).is_some_and(|c| c != '\n')
    }

    fn starts_ident(&self, idx: usize) -> bool {
        match self.peek_at(idx) {
            Some('-') => match self.peek_at(idx + 1) {
                Some(next) if is_name_start_char(next) || next == '-' => true,
                _ => self.starts_escape(idx + 1),
            },
            Some(c) if is_name_start_char(c) => true,
            _ => self.starts_escape(idx),
        }
    }

    fn starts_number(&self) -> bool {
        let digit_at = |i: usize| self.peek_at(i).is_some_and(|c| c.is_ascii_digit());
        match self.peek() {
            Some('+') | Some('-') => {
                digit_at(self.pos + 1)
                    || (self.peek_at(self.pos + 1) == Some('.') && digit_at(self.pos + 2))
            }
            Some('.') => digit_at(self.pos + 1),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if is_name_char(ch) {
                name.push(ch);
                self.pos += 1;
            } else if self.starts_escape(self.pos) {
                self.pos += 1;
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            repr.push(c);
            self.pos += 1;
        }
    }

    fn consume_numeric(&mut self) -> CssToken {
        let mut repr = String::new();
        if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
            repr.push(sign);
            self.pos += 1;
        }
        self.consume_digits(&mut repr);
        if self.peek() == Some('.') && self.peek_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            self.pos += 1;
            self.consume_digits(&mut repr);
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_at(self.pos + 1), Some('+') | Some('-'));
            let digit_idx = if sign { self.pos + 2 } else { self.pos + 1 };
            if self.peek_at(digit_idx).is_some_and(|c| c.is_ascii_digit()) {
                for _ in self.pos..digit_idx {
                    repr.push(self.input[self.pos]);
                    self.pos += 1;
                }
                self.consume_digits(&mut repr);
            }
        }

        if self.starts_ident(self.pos) {
            let unit = self.consume_name();
            return CssToken::Dimension { value: repr, unit };
        }
        if self.peek() == Some('%') {
            self.pos += 1;
            return CssToken::Percentage(repr);
        }
        CssToken::Number(repr)
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();
        if self.peek() != Some('(') {
            return CssToken::Ident(name);
        }
        self.pos += 1;
        if name.eq_ignore_ascii_case("url") {
            return self.consume_url();
        }
        CssToken::Function(name)
    }

    fn consume_url(&mut self) -> CssToken {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        // url("...") keeps the quoted form as a function token.
        if matches!(self.peek(), Some('"') | Some('\'')) {
            return CssToken::Function("url".to_string());
        }

        let mut url = String::new();
        while let Some(ch) = self.peek() {
            if ch == ')' {
                self.pos += 1;
                break;
            }
            if is_whitespace(ch) {
                while self.peek().is_some_and(is_whitespace) {
                    self.pos += 1;
                }
                if self.peek() == Some(')') {
                    self.pos += 1;
                }
                break;
            }
            if self.starts_escape(self.pos) {
                self.pos += 1;
                url.push(self.consume_escape());
            } else {
                url.push(ch);
                self.pos += 1;
            }
        }
        CssToken::Url(url)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}
