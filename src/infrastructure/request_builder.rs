use crate::config::ClientConfig;
use crate::domain::errors::{KrakenError, KrakenResult};
use crate::domain::methods::Visibility;
use crate::domain::repositories::http_transport::SignedRequest;
use crate::domain::services::nonce::NonceGenerator;
use crate::domain::value_objects::params::{encode_params, Params, NONCE_PARAM};
use crate::infrastructure::signer::sign;
use crate::secrets::Credentials;
use tracing::debug;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Assembles public and private requests for one API endpoint
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    version: String,
    user_agent: String,
}

impl RequestBuilder {
    pub fn new(
        base_url: impl Into<String>,
        version: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_url, &config.api_version, &config.user_agent)
    }

    fn path(&self, visibility: Visibility, method: &str) -> KrakenResult<String> {
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(KrakenError::Construction(format!(
                "Invalid method name '{}'",
                method
            )));
        }
        Ok(format!("/{}/{}/{}", self.version, visibility.segment(), method))
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ]
    }

    /// Unauthenticated request: encoded params, no auth headers
    pub fn public(&self, method: &str, params: &Params) -> KrakenResult<SignedRequest> {
        let path = self.path(Visibility::Public, method)?;
        debug!(method, visibility = "public", "Building request");

        Ok(SignedRequest {
            method: method.to_string(),
            visibility: Visibility::Public,
            url: format!("{}{}", self.base_url, path),
            path,
            body: encode_params(params),
            headers: self.base_headers(),
        })
    }

    /// Signed request; a fresh nonce replaces any `nonce` already in `params`
    pub fn private(
        &self,
        method: &str,
        params: &mut Params,
        credentials: &Credentials,
        nonces: &NonceGenerator,
    ) -> KrakenResult<SignedRequest> {
        let path = self.path(Visibility::Private, method)?;

        let nonce = nonces.next().to_string();
        params.insert(NONCE_PARAM.to_string(), nonce.clone());
        let body = encode_params(params);
        let signature = sign(&path, &body, credentials.secret(), &nonce)?;
        debug!(method, visibility = "private", "Building signed request");

        let mut headers = self.base_headers();
        headers.push(("API-Key".to_string(), credentials.api_key().to_string()));
        headers.push(("API-Sign".to_string(), signature));

        Ok(SignedRequest {
            method: method.to_string(),
            visibility: Visibility::Private,
            url: format!("{}{}", self.base_url, path),
            path,
            body,
            headers,
        })
    }
}
