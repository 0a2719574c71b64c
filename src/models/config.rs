//! Configuration models for dexcards.
//!
//! All I^R (resolvable ignorance) is parameterized here.
//! Every section is optional; an empty file yields the reference behavior
//! against the public catalog.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for dexcards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoint configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Name localization settings
    #[serde(default)]
    pub localization: LocalizationConfig,

    /// Sub-resource batching and fault isolation
    #[serde(default)]
    pub batching: BatchingConfig,

    /// Random draw settings
    #[serde(default)]
    pub random: RandomConfig,
}

/// Catalog API configuration.
///
/// K_i: Primary records live at `{base_url}/{identifier}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the primary endpoint (supports ${ENV_VAR} expansion)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (0 waits forever)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2/pokemon".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("dexcards/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl CatalogConfig {
    /// Base URL with environment variables expanded and trailing slashes removed.
    pub fn resolved_base_url(&self) -> String {
        expand_env_vars(&self.base_url)
            .trim_end_matches('/')
            .to_string()
    }

    /// Request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Localization configuration.
///
/// B_i: The requested language exists for every sub-resource (might not).
/// I^R: The fallback chain is tried in order when it does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// Preferred language tag
    #[serde(default = "default_language")]
    pub language: String,

    /// Tags tried in order when the preferred one is missing (empty = strict)
    #[serde(default = "default_fallback_languages")]
    pub fallback_languages: Vec<String>,
}

fn default_language() -> String {
    "es".to_string()
}

fn default_fallback_languages() -> Vec<String> {
    vec!["en".to_string()]
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            fallback_languages: default_fallback_languages(),
        }
    }
}

impl LocalizationConfig {
    /// Full lookup chain: preferred language first, then fallbacks, without duplicates.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.language.clone()];
        for tag in &self.fallback_languages {
            if !chain.contains(tag) {
                chain.push(tag.clone());
            }
        }
        chain
    }
}

/// How failed type/ability lookups affect their record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Every failed lookup becomes the placeholder (default)
    #[default]
    Uniform,
    /// A failed type/ability lookup degrades the whole record to a tombstone
    Strict,
}

/// Batching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Maximum concurrent move lookups per record
    #[serde(default = "default_move_batch_size")]
    pub move_batch_size: usize,

    /// Text shown in place of a name that could not be resolved
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Fault isolation for type/ability lookups
    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

fn default_move_batch_size() -> usize {
    10
}

fn default_placeholder() -> String {
    "Nombre no encontrado".to_string()
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            move_batch_size: default_move_batch_size(),
            placeholder: default_placeholder(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

/// Random draw configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomConfig {
    /// Smallest valid identifier (inclusive)
    #[serde(default = "default_min_id")]
    pub min_id: u32,

    /// Largest valid identifier (inclusive)
    #[serde(default = "default_max_id")]
    pub max_id: u32,

    /// Identifiers drawn per random request
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_min_id() -> u32 {
    1
}

fn default_max_id() -> u32 {
    1302
}

fn default_count() -> usize {
    4
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            min_id: default_min_id(),
            max_id: default_max_id(),
            count: default_count(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.resolved_base_url().is_empty() {
            return Err(ConfigError::Invalid("catalog.base_url is empty".to_string()));
        }
        if self.localization.language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "localization.language is empty".to_string(),
            ));
        }
        if self.random.min_id > self.random.max_id {
            return Err(ConfigError::Invalid(format!(
                "random.min_id ({}) is greater than random.max_id ({})",
                self.random.min_id, self.random.max_id
            )));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };

    re.replace_all(s, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
