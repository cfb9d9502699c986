//! Summary parser.
//!
//! Walks a token stream once and derives `"<OPERATION> <table>"`,
//! `"<OPERATION>"` or [`UNKNOWN`]. This is not a SQL grammar: it only finds
//! the statement's operation keyword and the table reference that clause
//! introduces, and degrades to the bare operation whenever the shape is
//! unexpected.
//!
//! ```text
//! ExpectOperation ──► ExpectClauseKeyword ──► ExpectTableIdentifier ──► Done
//!        │                     │                                        ▲
//!        │                     └────────────────────────────────────────┘
//!        └──► Bail (UNKNOWN)
//!
//! EXPLAIN ──► ExpectExplainedStatement ──► ExpectClauseKeyword ──► ...
//! ```

use crate::token::{Keyword, Token, TokenKind};

/// Summary used when the operation cannot be determined.
pub const UNKNOWN: &str = "UNKNOWN";

/// Keywords that may sit between an operation and its table name.
const TABLE_MODIFIERS: &[Keyword] = &[
    Keyword::If,
    Keyword::Not,
    Keyword::Exists,
    Keyword::Only,
    Keyword::Ignore,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectOperation,
    /// Scanning forward for the keyword that introduces the table
    ExpectClauseKeyword(Keyword),
    /// After `EXPLAIN`, looking for the DML statement being explained
    ExpectExplainedStatement,
    ExpectTableIdentifier,
    Done,
    Bail,
}

/// Derive a summary from a token stream.
///
/// Trivia (comments, whitespace) is ignored wherever it appears. Only the
/// first statement of multi-statement text is summarized.
pub fn build_summary_from_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token<'a>>,
{
    SummaryParser::new(tokens.into_iter()).run()
}

struct SummaryParser<'a, I: Iterator<Item = Token<'a>>> {
    tokens: I,
    peeked: Option<Token<'a>>,
    operation: Option<Keyword>,
    tables: Vec<String>,
}

impl<'a, I: Iterator<Item = Token<'a>>> SummaryParser<'a, I> {
    fn new(tokens: I) -> Self {
        Self {
            tokens,
            peeked: None,
            operation: None,
            tables: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        let mut state = State::ExpectOperation;
        loop {
            state = match state {
                State::ExpectOperation => self.expect_operation(),
                State::ExpectClauseKeyword(clause) => self.expect_clause_keyword(clause),
                State::ExpectExplainedStatement => self.expect_explained_statement(),
                State::ExpectTableIdentifier => self.expect_table_identifier(),
                State::Done => return self.render(),
                State::Bail => return UNKNOWN.to_string(),
            };
        }
    }

    fn next_significant(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.peeked.take() {
            return Some(token);
        }
        self.tokens.by_ref().find(|t| !t.kind.is_trivia())
    }

    fn peek(&mut self) -> Option<&Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.by_ref().find(|t| !t.kind.is_trivia());
        }
        self.peeked.as_ref()
    }

    fn expect_operation(&mut self) -> State {
        let Some(op) = self.next_significant().and_then(|t| t.keyword()) else {
            return State::Bail;
        };
        match after_operation(op) {
            Some(next) => {
                self.operation = Some(op);
                next
            }
            None => State::Bail,
        }
    }

    /// Scan for `clause` outside parentheses. A top-level `;` ends the
    /// statement.
    fn expect_clause_keyword(&mut self, clause: Keyword) -> State {
        let mut depth = 0usize;
        while let Some(token) = self.next_significant() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 {
                if token.is_punct(";") {
                    return State::Done;
                }
                if token.keyword() == Some(clause) {
                    return State::ExpectTableIdentifier;
                }
            }
        }
        State::Done
    }

    /// Skip `EXPLAIN` options until a DML keyword; its clause rule then
    /// supplies the table while the operation stays `EXPLAIN`.
    fn expect_explained_statement(&mut self) -> State {
        while let Some(token) = self.next_significant() {
            if token.is_punct(";") {
                break;
            }
            if let Some(next) = token.keyword().and_then(explained_statement) {
                return next;
            }
        }
        State::Done
    }

    /// Collect `name [[AS] alias] [, name [[AS] alias] ...]`.
    fn expect_table_identifier(&mut self) -> State {
        while self
            .peek()
            .and_then(|t| t.keyword())
            .is_some_and(|kw| TABLE_MODIFIERS.contains(&kw))
        {
            self.next_significant();
        }

        while let Some(name) = self.table_name() {
            self.tables.push(name);
            self.skip_alias();
            if self.peek().is_some_and(|t| t.is_punct(",")) {
                self.next_significant();
            } else {
                break;
            }
        }
        State::Done
    }

    /// Possibly schema-qualified name with quotes stripped.
    fn table_name(&mut self) -> Option<String> {
        let mut name = self.peek().and_then(Token::identifier_name)?;
        if name.is_empty() {
            return None;
        }
        self.next_significant();

        while self.peek().is_some_and(|t| t.is_punct(".")) {
            self.next_significant();
            match self.peek().and_then(Token::identifier_name) {
                Some(part) if !part.is_empty() => {
                    self.next_significant();
                    name.push('.');
                    name.push_str(&part);
                }
                _ => break,
            }
        }
        Some(name)
    }

    fn skip_alias(&mut self) {
        if self.peek().and_then(|t| t.keyword()) == Some(Keyword::As) {
            self.next_significant();
        }
        if self.peek().is_some_and(|t| {
            matches!(
                t.kind,
                TokenKind::Identifier | TokenKind::QuotedIdentifier
            )
        }) {
            self.next_significant();
        }
    }

    fn render(&self) -> String {
        let Some(op) = self.operation else {
            return UNKNOWN.to_string();
        };
        if self.tables.is_empty() {
            op.as_str().to_string()
        } else {
            format!("{} {}", op.as_str(), self.tables.join(","))
        }
    }
}

/// State following an operation keyword; `None` if `op` is not an operation.
fn after_operation(op: Keyword) -> Option<State> {
    let state = match op {
        Keyword::Select | Keyword::Delete => State::ExpectClauseKeyword(Keyword::From),
        Keyword::Insert => State::ExpectClauseKeyword(Keyword::Into),
        Keyword::Update
        | Keyword::DropTable
        | Keyword::DropDatabase
        | Keyword::CreateTable
        | Keyword::CreateDatabase => State::ExpectTableIdentifier,
        Keyword::Explain => State::ExpectExplainedStatement,
        Keyword::Begin
        | Keyword::Commit
        | Keyword::Rollback
        | Keyword::Savepoint
        | Keyword::ReleaseSavepoint => State::Done,
        _ => return None,
    };
    Some(state)
}

/// Clause state for a DML statement nested under `EXPLAIN`.
fn explained_statement(kw: Keyword) -> Option<State> {
    match kw {
        Keyword::Select | Keyword::Delete | Keyword::Insert | Keyword::Update => {
            after_operation(kw)
        }
        _ => None,
    }
}
