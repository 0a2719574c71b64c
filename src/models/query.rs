//! Caller input: identifiers, free-text parsing and random draws.

use super::{DexError, RandomConfig, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token naming one catalog entry (numeric id or slug).
///
/// K_i: Never empty, never padded with whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Build from caller text, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DexError::InvalidInput("empty identifier".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<String> for Identifier {
    type Error = DexError;

    fn try_from(raw: String) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Split comma-separated text into identifiers, discarding blank entries.
pub fn parse_identifiers(text: &str) -> Vec<Identifier> {
    text.split(',')
        .filter_map(|part| Identifier::new(part).ok())
        .collect()
}

/// Draw `count` distinct identifiers from `[min, max]` without replacement.
pub fn random_identifiers<R: Rng + ?Sized>(
    rng: &mut R,
    min: u32,
    max: u32,
    count: usize,
) -> Result<Vec<Identifier>> {
    if min > max {
        return Err(DexError::InvalidInput(format!(
            "empty range [{min}, {max}]"
        )));
    }

    let span = (max - min) as usize + 1;
    if count > span {
        return Err(DexError::InvalidInput(format!(
            "cannot draw {count} distinct identifiers from [{min}, {max}]"
        )));
    }

    Ok(rand::seq::index::sample(rng, span, count)
        .into_iter()
        .map(|offset| Identifier::from(min + offset as u32))
        .collect())
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free text, comma-separated identifiers
    Explicit(String),
    /// N random identifiers from the configured range (None = configured count)
    Random { count: Option<usize> },
}

impl Query {
    /// Turn the query into identifiers.
    ///
    /// Explicit text with no identifiers yields an empty list.
    pub fn identifiers<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        random: &RandomConfig,
    ) -> Result<Vec<Identifier>> {
        match self {
            Self::Explicit(text) => Ok(parse_identifiers(text)),
            Self::Random { count } => random_identifiers(
                rng,
                random.min_id,
                random.max_id,
                count.unwrap_or(random.count),
            ),
        }
    }
}

/// A query plus the output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Query,
    /// Accumulate onto previous results instead of replacing them
    pub append: bool,
}

impl SearchRequest {
    pub fn explicit(text: impl Into<String>) -> Self {
        Self {
            query: Query::Explicit(text.into()),
            append: false,
        }
    }

    pub fn random(count: Option<usize>) -> Self {
        Self {
            query: Query::Random { count },
            append: false,
        }
    }

    pub fn appending(mut self) -> Self {
        self.append = true;
        self
    }
}
