//! API credential handling
//!
//! The decoded signing secret lives in a `Zeroizing` buffer so it is wiped from
//! memory when the credentials are dropped. Neither the key nor the secret is
//! ever logged or serialized.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::env;
use tracing::{info, warn};
use zeroize::Zeroizing;

pub const API_KEY_VAR: &str = "KRAKEN_API_KEY";
pub const API_SECRET_VAR: &str = "KRAKEN_API_SECRET";

/// Error type for credential loading
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Secret validation failed: {0}")]
    ValidationFailed(String),
}

/// API key plus the decoded signing secret
#[derive(Clone)]
pub struct Credentials {
    api_key: Zeroizing<String>,
    secret: Zeroizing<Vec<u8>>,
}

impl Credentials {
    /// Build credentials from the key and the base64 secret shown by Kraken
    pub fn new(api_key: impl Into<String>, encoded_secret: &str) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.into()),
            secret: decode_secret(encoded_secret),
        }
    }

    /// Read `KRAKEN_API_KEY` / `KRAKEN_API_SECRET`
    pub fn from_env() -> Result<Self, SecretError> {
        load_credentials(API_KEY_VAR, API_SECRET_VAR)
    }

    /// Sent verbatim in the `API-Key` header
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<REDACTED>")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Base64-decode a secret, keeping every complete group before the first malformed one
///
/// A malformed secret yields a signature Kraken rejects rather than an error here.
pub fn decode_secret(encoded: &str) -> Zeroizing<Vec<u8>> {
    if let Ok(bytes) = STANDARD.decode(encoded) {
        return Zeroizing::new(bytes);
    }

    warn!("API secret is not valid base64, signing with its decodable prefix");

    let bytes = encoded.as_bytes();
    let mut end = bytes.len() - bytes.len() % 4;
    while end > 0 {
        if let Ok(decoded) = STANDARD.decode(&bytes[..end]) {
            return Zeroizing::new(decoded);
        }
        end -= 4;
    }
    Zeroizing::new(Vec::new())
}

fn load_from_env(env_var_name: &str) -> Result<Zeroizing<String>, SecretError> {
    env::var(env_var_name)
        .map(Zeroizing::new)
        .map_err(|_| SecretError::EnvVarNotSet(env_var_name.to_string()))
}

/// Load credentials from two environment variables
pub fn load_credentials(key_var: &str, secret_var: &str) -> Result<Credentials, SecretError> {
    let api_key = load_from_env(key_var)?;
    let secret = load_from_env(secret_var)?;

    if api_key.trim().is_empty() {
        return Err(SecretError::ValidationFailed(format!("{} is empty", key_var)));
    }
    if secret.trim().is_empty() {
        return Err(SecretError::ValidationFailed(format!("{} is empty", secret_var)));
    }

    info!("Loaded Kraken credentials from {} / {}", key_var, secret_var);
    Ok(Credentials::new(api_key.trim(), secret.trim()))
}
