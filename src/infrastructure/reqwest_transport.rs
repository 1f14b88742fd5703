use crate::domain::errors::{KrakenError, KrakenResult};
use crate::domain::repositories::http_transport::{HttpResponse, HttpTransport, SignedRequest};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Pooled HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// `timeout` bounds each attempt, connect through body read
    pub fn new(timeout: Duration) -> KrakenResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KrakenError::Construction(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuse an existing client and its connection pool
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(error: reqwest::Error) -> KrakenError {
    if error.is_builder() {
        KrakenError::Construction(error.to_string())
    } else {
        KrakenError::Transport(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &SignedRequest) -> KrakenResult<HttpResponse> {
        let mut builder = self.client.post(&request.url).body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
