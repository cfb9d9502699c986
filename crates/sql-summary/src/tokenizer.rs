//! SQL tokenizer.
//!
//! A single left-to-right pass over the input bytes that classifies every
//! byte into exactly one [`Token`]. It never fails: unterminated literals and
//! comments swallow the rest of the input, unexpected bytes become
//! [`TokenKind::Unknown`], and input that is not valid UTF-8 is carried
//! through opaquely.
//!
//! ## Precedence
//!
//! At each position the scanner tries, in order: block comment, line
//! comment, single-quoted string, double-quoted identifier, backtick
//! identifier, number, whitespace, bareword, punctuation.
//!
//! Whitespace includes non-ASCII whitespace such as U+00A0 (no-break space)
//! and U+3000 when it decodes as valid UTF-8. Any other byte at or above
//! 0x80 is part of a bareword.
//!
//! ## `#`
//!
//! With [`TokenizerOptions::hash_comments`] (the default) `#` starts a MySQL
//! line comment, except where it begins one of the PostgreSQL operators
//! `#>>`, `#>` or `#-`, which are always punctuation.
//!
//! ## Usage
//!
//! ```rust
//! use sql_summary::{tokenize, TokenKind, Keyword};
//!
//! let kinds: Vec<_> = tokenize("SELECT 1").map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Keyword(Keyword::Select),
//!         TokenKind::Whitespace,
//!         TokenKind::NumericLiteral,
//!     ]
//! );
//! ```

use crate::token::{Keyword, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::str;
use std::iter::FusedIterator;

/// Multi-byte operators, longest first.
const OPERATORS: &[&str] = &[
    "->>", "#>>", "<=>", "#>", "#-", "<>", "<=", ">=", "!=", "::", "||", "&&", "->", "<<", ">>",
];

/// Dialect switches for the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Treat `#` as a line comment (MySQL). Disable for dialects where `#`
    /// is an operator.
    pub hash_comments: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            hash_comments: true,
        }
    }
}

/// Tokenize SQL text.
pub fn tokenize(query: &str) -> Tokenizer<'_> {
    Tokenizer::new(query)
}

/// Tokenize raw bytes that may not be valid UTF-8.
pub fn tokenize_bytes(query: &[u8]) -> Tokenizer<'_> {
    Tokenizer::from_bytes(query)
}

/// Forward-only token stream over a query.
///
/// Deliberately not `Clone`: re-scanning requires a new tokenizer.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    options: TokenizerOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    pub fn from_bytes(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            options: TokenizerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    /// Byte offset of the next token.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current(&self) -> u8 {
        self.input[self.pos]
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        if self.is_eof() {
            return None;
        }

        let start = self.pos;
        let ch = self.current();
        let next = self.peek_byte();

        let kind = match ch {
            b'/' if next == Some(b'*') => self.scan_block_comment(),
            b'-' if next == Some(b'-') => self.scan_line_comment(),
            b'#' if is_hash_operator(&self.input[start..]) => self.scan_punctuation(),
            b'#' if self.options.hash_comments => self.scan_line_comment(),
            b'\'' => self.scan_quoted(b'\'', true, TokenKind::StringLiteral),
            b'"' => self.scan_quoted(b'"', true, TokenKind::QuotedIdentifier),
            b'`' => self.scan_quoted(b'`', false, TokenKind::QuotedIdentifier),
            b'0'..=b'9' => self.scan_number(),
            b'.' if next.is_some_and(|b| b.is_ascii_digit()) => self.scan_number(),
            _ if whitespace_width(self.input, start).is_some() => self.scan_whitespace(),
            c if is_word_start(c) => self.scan_word(),
            c if is_punctuation(c) => self.scan_punctuation(),
            _ => {
                self.advance(1);
                TokenKind::Unknown
            }
        };

        Some(Token {
            kind,
            text: String::from_utf8_lossy(&self.input[start..self.pos]),
            start,
        })
    }

    /// `/* ... */`; an unterminated comment runs to end of input.
    fn scan_block_comment(&mut self) -> TokenKind {
        self.advance(2);
        match find(&self.input[self.pos..], b"*/") {
            Some(offset) => self.advance(offset + 2),
            None => self.pos = self.input.len(),
        }
        TokenKind::Comment
    }

    /// `-- ...` or `# ...` up to (not including) the newline.
    fn scan_line_comment(&mut self) -> TokenKind {
        while !self.is_eof() && self.current() != b'\n' {
            self.advance(1);
        }
        TokenKind::Comment
    }

    /// Quoted literal or identifier. A doubled delimiter, and a backslash
    /// escape when `backslash` is set, never close the literal.
    fn scan_quoted(&mut self, delim: u8, backslash: bool, kind: TokenKind) -> TokenKind {
        self.advance(1);
        while !self.is_eof() {
            let ch = self.current();
            if backslash && ch == b'\\' {
                self.advance(2);
            } else if ch == delim {
                if self.peek_byte() == Some(delim) {
                    self.advance(2);
                } else {
                    self.advance(1);
                    return kind;
                }
            } else {
                self.advance(1);
            }
        }
        kind
    }

    fn scan_number(&mut self) -> TokenKind {
        if self.current() == b'0'
            && matches!(self.peek_byte(), Some(b'x' | b'X'))
            && self
                .input
                .get(self.pos + 2)
                .is_some_and(|b| b.is_ascii_hexdigit())
        {
            self.advance(2);
            self.skip_while(|b| b.is_ascii_hexdigit());
            return TokenKind::NumericLiteral;
        }

        self.skip_while(|b| b.is_ascii_digit());
        if !self.is_eof() && self.current() == b'.' {
            self.advance(1);
            self.skip_while(|b| b.is_ascii_digit());
        }

        // Exponent only when digits follow, so `1e` stays number + word.
        if !self.is_eof() && matches!(self.current(), b'e' | b'E') {
            let mut lookahead = self.pos + 1;
            if matches!(self.input.get(lookahead), Some(b'+' | b'-')) {
                lookahead += 1;
            }
            if self
                .input
                .get(lookahead)
                .is_some_and(|b| b.is_ascii_digit())
            {
                self.pos = lookahead;
                self.skip_while(|b| b.is_ascii_digit());
            }
        }

        TokenKind::NumericLiteral
    }

    /// Bareword, classified as keyword or identifier. Two-word keywords are
    /// matched as one token when the second word follows after whitespace
    /// and comments; the token then spans both words and everything between.
    fn scan_word(&mut self) -> TokenKind {
        let input = self.input;
        let start = self.pos;
        self.pos = word_end(input, start);
        let word = &input[start..self.pos];

        if Keyword::starts_compound(word) {
            let second_start = self.skip_trivia(self.pos);
            if second_start > self.pos {
                let second_end = word_end(input, second_start);
                let second = &input[second_start..second_end];
                if let Some(kw) = Keyword::lookup_compound(word, second) {
                    self.pos = second_end;
                    return TokenKind::Keyword(kw);
                }
            }
        }

        match Keyword::lookup(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier,
        }
    }

    fn scan_punctuation(&mut self) -> TokenKind {
        let rest = &self.input[self.pos..];
        let width = OPERATORS
            .iter()
            .find(|op| rest.starts_with(op.as_bytes()))
            .map_or(1, |op| op.len());
        self.advance(width);
        TokenKind::Punctuation
    }

    fn scan_whitespace(&mut self) -> TokenKind {
        while let Some(width) = whitespace_width(self.input, self.pos) {
            self.advance(width);
        }
        TokenKind::Whitespace
    }

    /// Offset of the first byte at or after `pos` that is not whitespace or
    /// a comment. Unterminated block comments run to end of input.
    fn skip_trivia(&self, mut pos: usize) -> usize {
        let input = self.input;
        loop {
            let rest = &input[pos..];
            if let Some(width) = whitespace_width(input, pos) {
                pos += width;
            } else if rest.starts_with(b"/*") {
                pos = match find(&rest[2..], b"*/") {
                    Some(offset) => pos + 2 + offset + 2,
                    None => return input.len(),
                };
            } else if rest.starts_with(b"--")
                || (self.options.hash_comments
                    && rest.first() == Some(&b'#')
                    && !is_hash_operator(rest))
            {
                pos += rest.iter().take_while(|b| **b != b'\n').count();
            } else {
                return pos;
            }
        }
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.advance(1);
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Non-ASCII bytes are word bytes so multi-byte characters, valid or not,
/// stay inside a single token.
fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// End of the bareword starting at `pos`. Stops before non-ASCII
/// whitespace even though its bytes are word bytes.
fn word_end(input: &[u8], mut pos: usize) -> usize {
    while input.get(pos).is_some_and(|b| is_word_byte(*b)) {
        if whitespace_width(input, pos).is_some() {
            break;
        }
        pos += 1;
    }
    pos
}

/// Byte width of the whitespace character at `pos`, if there is one.
fn whitespace_width(input: &[u8], pos: usize) -> Option<usize> {
    let first = *input.get(pos)?;
    if first.is_ascii_whitespace() {
        return Some(1);
    }
    if first.is_ascii() {
        return None;
    }
    let head = &input[pos..input.len().min(pos + 4)];
    let valid = match str::from_utf8(head) {
        Ok(text) => text,
        Err(err) => str::from_utf8(&head[..err.valid_up_to()]).ok()?,
    };
    valid
        .chars()
        .next()
        .filter(|c| c.is_whitespace())
        .map(char::len_utf8)
}

fn is_hash_operator(rest: &[u8]) -> bool {
    rest.starts_with(b"#>") || rest.starts_with(b"#-")
}

fn is_punctuation(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')'
            | b','
            | b';'
            | b'.'
            | b'*'
            | b'='
            | b'<'
            | b'>'
            | b'!'
            | b'+'
            | b'-'
            | b'/'
            | b'%'
            | b'|'
            | b'&'
            | b'^'
            | b'~'
            | b'?'
            | b':'
            | b'@'
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b'$'
            | b'#'
    )
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
