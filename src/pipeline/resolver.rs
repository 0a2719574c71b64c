//! Localized-name resolver.
//!
//! Epistemic foundation:
//! - K_i: Every sub-resource lists its names as (language, name) pairs
//! - B_i: The requested language is among them (might not be)
//! - I^R: Fallback languages are tried in configured order

use crate::client::JsonFetcher;
use crate::models::{DexError, LocalizationConfig, LocalizedNameSet, Result};
use std::sync::Arc;

/// Resolves sub-resource URLs to display names.
///
/// Holds no mutable state: the same URL and language always give the same
/// answer for the same catalog contents.
#[derive(Clone)]
pub struct NameResolver {
    fetcher: Arc<dyn JsonFetcher>,
    /// Preferred language first, then fallbacks
    languages: Vec<String>,
}

impl NameResolver {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, localization: &LocalizationConfig) -> Self {
        Self {
            fetcher,
            languages: localization.chain(),
        }
    }

    /// Fetch `url` and return the name for exactly `language`.
    pub async fn resolve_name(&self, url: &str, language: &str) -> Result<String> {
        let names = self.fetch_names(url).await?;
        names
            .find(language)
            .map(str::to_string)
            .ok_or_else(|| DexError::NameNotFound {
                url: url.to_string(),
                languages: vec![language.to_string()],
            })
    }

    /// Fetch `url` once and return the first name along the language chain.
    pub async fn resolve(&self, url: &str) -> Result<String> {
        let names = self.fetch_names(url).await?;
        names
            .find_first(self.languages.iter().map(String::as_str))
            .map(str::to_string)
            .ok_or_else(|| DexError::NameNotFound {
                url: url.to_string(),
                languages: self.languages.clone(),
            })
    }

    async fn fetch_names(&self, url: &str) -> Result<LocalizedNameSet> {
        let value = self.fetcher.fetch_json(url).await?;
        serde_json::from_value(value).map_err(|e| DexError::parse(url, e))
    }
}
