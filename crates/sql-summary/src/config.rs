//! Summary engine configuration
//!
//! ```toml
//! cache_capacity = 5000
//! hash_comments = false
//! ```

use crate::cache::DEFAULT_CAPACITY;
use crate::error::{SummaryError, SummaryResult};
use crate::tokenizer::TokenizerOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Summary engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum number of cached summaries
    pub cache_capacity: usize,
    /// Tokenizer dialect switches, read from the top level of the document
    #[serde(flatten)]
    pub tokenizer: TokenizerOptions,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            tokenizer: TokenizerOptions::default(),
        }
    }
}

impl SummaryConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> SummaryResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> SummaryResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading summary configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> SummaryResult<()> {
        if self.cache_capacity == 0 {
            return Err(SummaryError::InvalidCapacity(self.cache_capacity));
        }
        Ok(())
    }

    pub fn tokenizer_options(&self) -> TokenizerOptions {
        self.tokenizer
    }
}
