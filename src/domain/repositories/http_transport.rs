//! HTTP transport seam
//!
//! The pipeline hands a fully built [`SignedRequest`] to an [`HttpTransport`] and
//! gets raw status, content type and body back. Production code uses the pooled
//! reqwest implementation; tests substitute scripted stubs.

use crate::domain::errors::KrakenResult;
use crate::domain::methods::Visibility;
use async_trait::async_trait;

/// One ready-to-send POST request
///
/// Built fresh for every attempt and never reused.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    pub visibility: Visibility,
    /// Absolute URL
    pub url: String,
    /// `/{version}/{public|private}/{method}`, the part covered by the signature
    pub path: String,
    /// Form-encoded parameters
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case("API-Key") || key.eq_ignore_ascii_case("API-Sign") {
                    (key.as_str(), "<REDACTED>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("visibility", &self.visibility)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("headers", &headers)
            .finish()
    }
}

/// Raw response as read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Media type without parameters, lowercased (`application/json; charset=utf-8` -> `application/json`)
    pub fn media_type(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// Sends signed requests
///
/// Implementations must be safe to share across tasks; one client may issue
/// many concurrent calls through the same transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one POST; network-level failures map to `KrakenError::Transport`
    async fn send(&self, request: &SignedRequest) -> KrakenResult<HttpResponse>;
}
