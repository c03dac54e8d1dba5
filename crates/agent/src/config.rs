//! Agent configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `AGENT_HOST` - Bind address (default: 127.0.0.1)
//! - `AGENT_PORT` - Listen port (default: 8000)
//! - `REQUEST_TIMEOUT_SECS` - Upper bound on one `/chat` request (default: 60)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: local front ends)
//!
//! ## Claude
//! - `CLAUDE_API_KEY` - Anthropic API key (enables the language-model classifier
//!   and the web fetch backend)
//! - `CLAUDE_MODEL` - Model for data fetching (default: claude-sonnet-4-20250514)
//! - `CLASSIFIER_MODEL` - Model for intent classification (default: claude-3-5-haiku-latest)
//!
//! ## Agent
//! - `CLASSIFIER` - `keyword` or `llm` (default: `llm` with an API key, else `keyword`)
//! - `FETCH_BACKEND` - `catalog` or `claude` (default: catalog)
//! - `CATALOG_PATH` - Catalog YAML file (default: crates/agent/data/catalog.yaml)
//! - `RETAILER_BASE_URL` - Retailer site (default: <https://www.partselect.com>)
//! - `SEARCH_MAX_RESULTS` - Search result window, clamped to 3..=8 (default: 8)
//! - `HISTORY_WINDOW` - Prior turns considered per message (default: 3)
//! - `FETCH_TIMEOUT_SECS` - Upper bound on one data-fetch call (default: 20)
//!
//! ## Observability
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_CLASSIFIER_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_CATALOG_PATH: &str = "crates/agent/data/catalog.yaml";
const DEFAULT_RETAILER_BASE_URL: &str = "https://www.partselect.com";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

/// Smallest and largest search result window.
pub const SEARCH_RESULTS_RANGE: std::ops::RangeInclusive<usize> = 3..=8;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which intent classifier serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Deterministic keyword and regex rules.
    Keyword,
    /// Claude-backed classification.
    Llm,
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "llm" => Ok(Self::Llm),
            other => Err(format!("expected 'keyword' or 'llm', got '{other}'")),
        }
    }
}

/// Which data source backs the fetch tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBackend {
    /// Local YAML catalog.
    Catalog,
    /// Claude with web tools against the retailer site.
    Claude,
}

impl FromStr for FetchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "claude" => Ok(Self::Claude),
            other => Err(format!("expected 'catalog' or 'claude', got '{other}'")),
        }
    }
}

/// Agent application configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Claude configuration (absent without an API key)
    pub claude: Option<ClaudeConfig>,
    /// Classification and dispatch settings
    pub agent: AgentSettings,
    /// Allowed CORS origins
    pub cors_allowed_origins: Vec<String>,
    /// Upper bound on a whole chat request
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Claude API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model used for data fetching
    pub model: String,
    /// Model used for intent classification
    pub classifier_model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("classifier_model", &self.classifier_model)
            .finish()
    }
}

/// Settings that shape classification and handler behavior.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub classifier: ClassifierKind,
    pub fetch_backend: FetchBackend,
    pub catalog_path: PathBuf,
    /// Retailer site; relative catalog URLs resolve against it
    pub retailer_base_url: Url,
    /// Search result window, always within [`SEARCH_RESULTS_RANGE`]
    pub search_max_results: usize,
    /// Prior turns handed to the classifier
    pub history_window: usize,
    /// Upper bound on one data-fetch call
    pub fetch_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Keyword,
            fetch_backend: FetchBackend::Catalog,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            retailer_base_url: Url::parse(DEFAULT_RETAILER_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default retailer URL is valid")),
            search_max_results: *SEARCH_RESULTS_RANGE.end(),
            history_window: 3,
            fetch_timeout: Duration::from_secs(20),
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, if `CLASSIFIER=llm` or
    /// `FETCH_BACKEND=claude` is requested without an API key, or if the API
    /// key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("AGENT_HOST", "127.0.0.1")?;
        let port = parse_env("AGENT_PORT", "8000")?;
        let claude = ClaudeConfig::from_env()?;
        let agent = AgentSettings::from_env(claude.is_some())?;
        let cors_allowed_origins = parse_origins(&get_env_or_default(
            "CORS_ALLOWED_ORIGINS",
            DEFAULT_CORS_ORIGINS,
        ));
        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", "60")?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            claude,
            agent,
            cors_allowed_origins,
            request_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns a reference to the Claude configuration, if available.
    #[must_use]
    pub const fn claude(&self) -> Option<&ClaudeConfig> {
        self.claude.as_ref()
    }
}

impl ClaudeConfig {
    /// Returns `None` if `CLAUDE_API_KEY` is not set.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(key) = get_optional_env("CLAUDE_API_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&key, "CLAUDE_API_KEY")?;

        Ok(Some(Self {
            api_key: SecretString::from(key),
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
            classifier_model: get_env_or_default("CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL),
        }))
    }
}

impl AgentSettings {
    fn from_env(has_api_key: bool) -> Result<Self, ConfigError> {
        let default_classifier = if has_api_key { "llm" } else { "keyword" };
        let classifier: ClassifierKind = parse_env("CLASSIFIER", default_classifier)?;
        let fetch_backend: FetchBackend = parse_env("FETCH_BACKEND", "catalog")?;

        if !has_api_key && classifier == ClassifierKind::Llm {
            return Err(ConfigError::MissingEnvVar(
                "CLAUDE_API_KEY (required by CLASSIFIER=llm)".to_string(),
            ));
        }
        if !has_api_key && fetch_backend == FetchBackend::Claude {
            return Err(ConfigError::MissingEnvVar(
                "CLAUDE_API_KEY (required by FETCH_BACKEND=claude)".to_string(),
            ));
        }

        let retailer_base_url = get_env_or_default("RETAILER_BASE_URL", DEFAULT_RETAILER_BASE_URL);
        let retailer_base_url = Url::parse(&retailer_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("RETAILER_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            classifier,
            fetch_backend,
            catalog_path: PathBuf::from(get_env_or_default("CATALOG_PATH", DEFAULT_CATALOG_PATH)),
            retailer_base_url,
            search_max_results: clamp_search_results(parse_env("SEARCH_MAX_RESULTS", "8")?),
            history_window: parse_env("HISTORY_WINDOW", "3")?,
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", "20")?),
        })
    }
}

/// Clamp a requested result window into [`SEARCH_RESULTS_RANGE`].
#[must_use]
pub fn clamp_search_results(requested: usize) -> usize {
    requested.clamp(*SEARCH_RESULTS_RANGE.start(), *SEARCH_RESULTS_RANGE.end())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "CLAUDE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result =
            validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "CLAUDE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result =
            validate_secret_strength("sk-ant-aB3$xY9!mK2@nL5#pQ7&rT0*uW4", "CLAUDE_API_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_clamp_search_results() {
        assert_eq!(clamp_search_results(1), 3);
        assert_eq!(clamp_search_results(5), 5);
        assert_eq!(clamp_search_results(50), 8);
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" http://a.test , ,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_classifier_kind_from_str() {
        assert_eq!("LLM".parse::<ClassifierKind>().unwrap(), ClassifierKind::Llm);
        assert_eq!(
            " keyword ".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::Keyword
        );
        assert!("regex".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_fetch_backend_from_str() {
        assert_eq!("claude".parse::<FetchBackend>().unwrap(), FetchBackend::Claude);
        assert!("scraper".parse::<FetchBackend>().is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = AgentSettings::default();
        assert_eq!(settings.search_max_results, 8);
        assert_eq!(settings.history_window, 3);
        assert_eq!(settings.retailer_base_url.as_str(), "https://www.partselect.com/");
    }

    #[test]
    fn test_socket_addr() {
        let config = AgentConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            claude: None,
            agent: AgentSettings::default(),
            cors_allowed_origins: vec![],
            request_timeout: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_claude_config_debug_redacts_secrets() {
        let config = ClaudeConfig {
            api_key: SecretString::from("sk-ant-super-secret-key"),
            model: DEFAULT_CLAUDE_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("claude-sonnet-4-20250514"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-ant-super-secret-key"));
    }
}
