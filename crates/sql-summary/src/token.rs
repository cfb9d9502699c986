//! Token types produced by the tokenizer.

use std::borrow::Cow;
use std::fmt;

/// Keywords the summary engine recognises.
///
/// Only operation keywords and the clause words the parser navigates by are
/// listed; every other bareword is an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Operations
    Select,
    Insert,
    Update,
    Delete,
    Begin,
    Commit,
    Rollback,
    Savepoint,
    ReleaseSavepoint,
    Explain,
    DropDatabase,
    DropTable,
    CreateDatabase,
    CreateTable,

    // Clauses and modifiers
    From,
    Into,
    Join,
    Where,
    Set,
    Values,
    As,
    On,
    If,
    Not,
    Exists,
    Only,
    Ignore,
    With,
    Union,
    Group,
    Order,
    Having,
    Limit,
}

/// Single-word keywords, matched case-insensitively.
const WORDS: &[(&str, Keyword)] = &[
    ("select", Keyword::Select),
    ("insert", Keyword::Insert),
    ("update", Keyword::Update),
    ("delete", Keyword::Delete),
    ("begin", Keyword::Begin),
    ("commit", Keyword::Commit),
    ("rollback", Keyword::Rollback),
    ("savepoint", Keyword::Savepoint),
    ("explain", Keyword::Explain),
    ("from", Keyword::From),
    ("into", Keyword::Into),
    ("join", Keyword::Join),
    ("where", Keyword::Where),
    ("set", Keyword::Set),
    ("values", Keyword::Values),
    ("as", Keyword::As),
    ("on", Keyword::On),
    ("if", Keyword::If),
    ("not", Keyword::Not),
    ("exists", Keyword::Exists),
    ("only", Keyword::Only),
    ("ignore", Keyword::Ignore),
    ("with", Keyword::With),
    ("union", Keyword::Union),
    ("group", Keyword::Group),
    ("order", Keyword::Order),
    ("having", Keyword::Having),
    ("limit", Keyword::Limit),
];

/// Two-word keywords. Tried before [`WORDS`] so the longest match wins.
const COMPOUNDS: &[(&str, &str, Keyword)] = &[
    ("release", "savepoint", Keyword::ReleaseSavepoint),
    ("drop", "database", Keyword::DropDatabase),
    ("drop", "table", Keyword::DropTable),
    ("create", "database", Keyword::CreateDatabase),
    ("create", "table", Keyword::CreateTable),
];

impl Keyword {
    /// Look up a single bareword.
    pub fn lookup(word: &[u8]) -> Option<Keyword> {
        WORDS
            .iter()
            .find(|(w, _)| w.as_bytes().eq_ignore_ascii_case(word))
            .map(|(_, kw)| *kw)
    }

    /// Look up a two-word keyword from its parts.
    pub fn lookup_compound(first: &[u8], second: &[u8]) -> Option<Keyword> {
        COMPOUNDS
            .iter()
            .find(|(a, b, _)| {
                a.as_bytes().eq_ignore_ascii_case(first) && b.as_bytes().eq_ignore_ascii_case(second)
            })
            .map(|(_, _, kw)| *kw)
    }

    /// True if `word` can begin a two-word keyword.
    pub fn starts_compound(word: &[u8]) -> bool {
        COMPOUNDS
            .iter()
            .any(|(a, _, _)| a.as_bytes().eq_ignore_ascii_case(word))
    }

    /// Canonical uppercase spelling, single-spaced.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::Insert => "INSERT",
            Keyword::Update => "UPDATE",
            Keyword::Delete => "DELETE",
            Keyword::Begin => "BEGIN",
            Keyword::Commit => "COMMIT",
            Keyword::Rollback => "ROLLBACK",
            Keyword::Savepoint => "SAVEPOINT",
            Keyword::ReleaseSavepoint => "RELEASE SAVEPOINT",
            Keyword::Explain => "EXPLAIN",
            Keyword::DropDatabase => "DROP DATABASE",
            Keyword::DropTable => "DROP TABLE",
            Keyword::CreateDatabase => "CREATE DATABASE",
            Keyword::CreateTable => "CREATE TABLE",
            Keyword::From => "FROM",
            Keyword::Into => "INTO",
            Keyword::Join => "JOIN",
            Keyword::Where => "WHERE",
            Keyword::Set => "SET",
            Keyword::Values => "VALUES",
            Keyword::As => "AS",
            Keyword::On => "ON",
            Keyword::If => "IF",
            Keyword::Not => "NOT",
            Keyword::Exists => "EXISTS",
            Keyword::Only => "ONLY",
            Keyword::Ignore => "IGNORE",
            Keyword::With => "WITH",
            Keyword::Union => "UNION",
            Keyword::Group => "GROUP",
            Keyword::Order => "ORDER",
            Keyword::Having => "HAVING",
            Keyword::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    /// `"name"` or `` `name` ``
    QuotedIdentifier,
    StringLiteral,
    NumericLiteral,
    Comment,
    Punctuation,
    Whitespace,
    Unknown,
}

impl TokenKind {
    /// Comments and whitespace carry no meaning for summaries.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Whitespace)
    }
}

/// A classified slice of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Exact source text, decoded lossily only if the input was not UTF-8
    pub text: Cow<'a, str>,
    /// Byte offset of the first byte of this token
    pub start: usize,
}

impl<'a> Token<'a> {
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    /// Borrowed text if the source slice was valid UTF-8.
    pub fn as_borrowed(&self) -> Option<&'a str> {
        match self.text {
            Cow::Borrowed(text) => Some(text),
            Cow::Owned(_) => None,
        }
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }

    /// Identifier text with surrounding quote characters removed.
    ///
    /// Doubled delimiters inside quoted identifiers collapse to one.
    pub fn identifier_name(&self) -> Option<String> {
        match self.kind {
            TokenKind::Identifier => Some(self.text.to_string()),
            TokenKind::QuotedIdentifier => {
                let text = self.text.as_ref();
                let quote = text.chars().next()?;
                let inner = text.strip_prefix(quote)?;
                let inner = inner.strip_suffix(quote).unwrap_or(inner);
                let doubled: String = [quote, quote].iter().collect();
                Some(inner.replace(&doubled, &quote.to_string()))
            }
            _ => None,
        }
    }
}
