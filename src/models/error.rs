//! Error types for dexcards.
//!
//! Epistemic taxonomy:
//! - B_i falsified: Expected failures (record not found, name missing, bad input)
//! - I^B materialized: Infrastructure failures (network, status, unparseable body)
//! - K_i violated: Internal invariant violations (bugs)

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for dexcards.
#[derive(Debug, Error)]
pub enum DexError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED - Belief proven wrong (expected failures)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pokemon with ID {identifier} not found: {cause}")]
    RecordNotFound { identifier: String, cause: String },

    #[error("No localized name for [{}] at {url}", .languages.join(", "))]
    NameNotFound { url: String, languages: Vec<String> },

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED - Transport or parse failure at the fetch boundary
    // ═══════════════════════════════════════════════════════════════════

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // K_i VIOLATED - Invariant broken (bug, should not happen)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DexError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for the given URL.
    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error came from the fetch boundary (network, status or body).
    pub fn is_transport_or_parse(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Parse { .. } | Self::Timeout(_)
        )
    }
}

/// Result type alias for dexcards.
pub type Result<T> = std::result::Result<T, DexError>;
