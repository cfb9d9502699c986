//! Query summary facade.
//!
//! The only entry points instrumentation code should call. Every failure
//! below this line, an error or a panic, becomes [`UNKNOWN`].

use crate::cache::SummaryCache;
use crate::config::SummaryConfig;
use crate::error::{SummaryError, SummaryResult};
use crate::parser::{build_summary_from_tokens, UNKNOWN};
use crate::tokenizer::{Tokenizer, TokenizerOptions};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// Summarize `query`, memoized in `cache`. Never panics, never fails.
///
/// ```rust
/// use sql_summary::{generate_summary, SummaryCache};
///
/// let cache = SummaryCache::default();
/// assert_eq!(
///     generate_summary(Some("SELECT * FROM users WHERE id = 1"), &cache),
///     "SELECT users"
/// );
/// assert_eq!(generate_summary(None, &cache), "UNKNOWN");
/// ```
pub fn generate_summary(query: Option<&str>, cache: &SummaryCache) -> String {
    summarize_cached(query, cache, TokenizerOptions::default())
}

/// Summarize driver-supplied bytes that may not be valid UTF-8.
///
/// The cache key is the lossily decoded text.
pub fn generate_summary_bytes(query: &[u8], cache: &SummaryCache) -> String {
    summarize_bytes_cached(query, cache, TokenizerOptions::default())
}

/// Summarize without consulting a cache.
pub fn summarize_uncached(query: Option<&str>, options: TokenizerOptions) -> SummaryResult<String> {
    let query = query.ok_or(SummaryError::MissingQuery)?;
    Ok(build_summary_from_tokens(
        Tokenizer::new(query).with_options(options),
    ))
}

fn summarize_cached(query: Option<&str>, cache: &SummaryCache, options: TokenizerOptions) -> String {
    guarded(|| cache.try_fetch(query, || summarize_uncached(query, options)))
}

fn summarize_bytes_cached(query: &[u8], cache: &SummaryCache, options: TokenizerOptions) -> String {
    guarded(|| {
        let key = String::from_utf8_lossy(query);
        cache.try_fetch(Some(key.as_ref()), || {
            Ok(build_summary_from_tokens(
                Tokenizer::from_bytes(query).with_options(options),
            ))
        })
    })
}

/// Run `f`, mapping errors and panics to [`UNKNOWN`].
fn guarded<F>(f: F) -> String
where
    F: FnOnce() -> SummaryResult<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(summary)) => {
            trace!(%summary, "Generated query summary");
            summary
        }
        Ok(Err(SummaryError::MissingQuery)) => {
            debug!("No query text to summarize");
            UNKNOWN.to_string()
        }
        Ok(Err(err)) => {
            warn!(error = %err, "Query summary failed");
            UNKNOWN.to_string()
        }
        Err(payload) => {
            let err = SummaryError::Internal(panic_message(payload.as_ref()));
            warn!(error = %err, "Query summary panicked");
            UNKNOWN.to_string()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A summarizer that owns its cache and dialect options.
#[derive(Debug, Default)]
pub struct QuerySummary {
    cache: SummaryCache,
    options: TokenizerOptions,
}

impl QuerySummary {
    pub fn new(config: &SummaryConfig) -> SummaryResult<Self> {
        config.validate()?;
        Ok(Self {
            cache: SummaryCache::new(config.cache_capacity)?,
            options: config.tokenizer_options(),
        })
    }

    pub fn summarize(&self, query: Option<&str>) -> String {
        summarize_cached(query, &self.cache, self.options)
    }

    pub fn summarize_bytes(&self, query: &[u8]) -> String {
        summarize_bytes_cached(query, &self.cache, self.options)
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }
}
