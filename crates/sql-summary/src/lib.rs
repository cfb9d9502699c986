//! Low-cardinality SQL query summaries
//!
//! Turns arbitrary, possibly malformed SQL into a short, stable descriptor
//! suitable for a span name or attribute:
//!
//! | Query                                    | Summary          |
//! |------------------------------------------|------------------|
//! | `SELECT * FROM users WHERE id = 1`       | `SELECT users`   |
//! | `/* app=web */ DELETE FROM sessions`     | `DELETE sessions`|
//! | `COMMIT`                                 | `COMMIT`         |
//! | `DESELECT 1`                             | `UNKNOWN`        |
//!
//! ## Pipeline
//!
//! - **Tokenizer**: single-pass lexer that never fails
//! - **Parser**: finds the operation and the table its clause introduces
//! - **Cache**: bounded, thread-safe memoization keyed by raw query text
//! - **Facade**: [`generate_summary`] ties them together and absorbs every
//!   failure into [`UNKNOWN`]
//!
//! ## Usage
//!
//! ```rust
//! use sql_summary::{generate_summary, SummaryCache};
//!
//! // One long-lived cache per process
//! let cache = SummaryCache::default();
//!
//! let summary = generate_summary(Some("INSERT INTO logs (msg) VALUES ('hi')"), &cache);
//! assert_eq!(summary, "INSERT logs");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod parser;
pub mod summary;
pub mod token;
pub mod tokenizer;

// Re-exports
pub use cache::{CacheStats, SummaryCache, DEFAULT_CAPACITY};
pub use config::SummaryConfig;
pub use error::{SummaryError, SummaryResult};
pub use parser::{build_summary_from_tokens, UNKNOWN};
pub use summary::{generate_summary, generate_summary_bytes, summarize_uncached, QuerySummary};
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::{tokenize, tokenize_bytes, Tokenizer, TokenizerOptions};
