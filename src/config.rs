use crate::domain::errors::KrakenError;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.kraken.com";
pub const DEFAULT_API_VERSION: &str = "0";
pub const DEFAULT_USER_AGENT: &str = concat!("kraken-rest/", env!("CARGO_PKG_VERSION"));

/// API errors Kraken returns while overloaded; these are worth another attempt
pub const DEFAULT_TRANSIENT_API_ERRORS: &[&str] = &["EService:Unavailable", "EService:Busy"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid API version '{0}': must be a non-empty alphanumeric string")]
    InvalidVersion(String),

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}

/// Spacing between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed,
    /// Delay grows with the attempt number: `delay * attempt`
    Linear,
}

/// How many times to attempt a request and which failures to retry
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
    pub transient_api_errors: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
            transient_api_errors: DEFAULT_TRANSIENT_API_ERRORS
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether `error` is expected to clear up on its own
    pub fn is_transient(&self, error: &KrakenError) -> bool {
        match error {
            KrakenError::Api(errors) => errors.iter().any(|message| {
                self.transient_api_errors
                    .iter()
                    .any(|pattern| message.contains(pattern.as_str()))
            }),
            other => other.is_retryable(),
        }
    }

    /// Sleep before retry number `attempt` (1-based: the wait after the first failure is `delay_for(1)`)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Linear => self.delay.saturating_mul(attempt.max(1)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, keeping defaults for anything unset or invalid
    pub fn from_env() -> ClientConfig {
        let mut config = ClientConfig::default();

        if let Ok(url) = std::env::var("KRAKEN_API_URL") {
            match url::Url::parse(&url) {
                Ok(_) => config.api_url = url.trim_end_matches('/').to_string(),
                Err(e) => {
                    tracing::warn!(
                        "Invalid KRAKEN_API_URL '{}': {}, using default: {}",
                        url,
                        e,
                        config.api_url
                    );
                }
            }
        }

        if let Ok(version) = std::env::var("KRAKEN_API_VERSION") {
            if is_valid_version(&version) {
                config.api_version = version;
            } else {
                tracing::warn!(
                    "Invalid KRAKEN_API_VERSION '{}', using default: {}",
                    version,
                    config.api_version
                );
            }
        }

        if let Ok(agent) = std::env::var("KRAKEN_USER_AGENT") {
            if !agent.trim().is_empty() {
                config.user_agent = agent;
            }
        }

        if let Ok(attempts) = std::env::var("KRAKEN_MAX_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(value) if (1..=10).contains(&value) => {
                    config.retry.max_attempts = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid KRAKEN_MAX_ATTEMPTS value: {} (must be between 1 and 10), using default: {}",
                        value,
                        config.retry.max_attempts
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse KRAKEN_MAX_ATTEMPTS '{}': {}, using default: {}",
                        attempts,
                        e,
                        config.retry.max_attempts
                    );
                }
            }
        }

        if let Ok(delay) = std::env::var("KRAKEN_RETRY_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(value) if value <= 60_000 => {
                    config.retry.delay = Duration::from_millis(value);
                }
                _ => {
                    tracing::warn!(
                        "Invalid KRAKEN_RETRY_DELAY_MS '{}' (must be between 0 and 60000), using default: {:?}",
                        delay,
                        config.retry.delay
                    );
                }
            }
        }

        if let Ok(backoff) = std::env::var("KRAKEN_RETRY_BACKOFF") {
            match backoff.to_lowercase().as_str() {
                "fixed" => config.retry.backoff = Backoff::Fixed,
                "linear" => config.retry.backoff = Backoff::Linear,
                other => {
                    tracing::warn!(
                        "Unknown KRAKEN_RETRY_BACKOFF '{}' (expected fixed or linear), using default: {:?}",
                        other,
                        config.retry.backoff
                    );
                }
            }
        }

        if let Ok(timeout) = std::env::var("KRAKEN_REQUEST_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(value) if (1000..=120_000).contains(&value) => {
                    config.request_timeout = Duration::from_millis(value);
                }
                _ => {
                    tracing::warn!(
                        "Invalid KRAKEN_REQUEST_TIMEOUT_MS '{}' (must be between 1000 and 120000), using default: {:?}",
                        timeout,
                        config.request_timeout
                    );
                }
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !is_valid_version(&self.api_version) {
            return Err(ConfigError::InvalidVersion(self.api_version.clone()));
        }
        self.retry.validate()
    }
}

fn is_valid_version(version: &str) -> bool {
    !version.is_empty() && version.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Load a `.env` file from the working directory (or a parent) if one exists
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Load a specific env file; a missing file is not an error
pub fn load_dotenv_from(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Smallest order volume Kraken accepts per base asset
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumOrderSizes {
    sizes: HashMap<String, f64>,
}

impl Default for MinimumOrderSizes {
    fn default() -> Self {
        let sizes = [
            ("REP", 0.3),
            ("XBT", 0.002),
            ("BCH", 0.002),
            ("DASH", 0.03),
            ("DOGE", 3000.0),
            ("EOS", 3.0),
            ("ETH", 0.02),
            ("ETC", 0.3),
            ("GNO", 0.03),
            ("ICN", 2.0),
            ("LTC", 0.1),
            ("MLN", 0.1),
            ("XMR", 0.1),
            ("XRP", 30.0),
            ("XLM", 300.0),
            ("ZEC", 0.02),
            ("USDT", 5.0),
        ];
        Self::from_pairs(sizes)
    }
}

impl MinimumOrderSizes {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            sizes: pairs
                .into_iter()
                .map(|(asset, size)| (asset.into().to_uppercase(), size))
                .collect(),
        }
    }

    pub fn get(&self, asset: &str) -> Option<f64> {
        self.sizes.get(&asset.to_uppercase()).copied()
    }

    /// Assets without a listed minimum always pass
    pub fn meets_minimum(&self, asset: &str, volume: f64) -> bool {
        match self.get(asset) {
            Some(minimum) => volume >= minimum,
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
