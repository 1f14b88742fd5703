//! Scripted in-memory transport shared by the end-to-end tests

#![allow(dead_code)]

use async_trait::async_trait;
use kraken_rest::{
    ClientConfig, Credentials, HttpResponse, HttpTransport, KrakenClient, KrakenError,
    KrakenResult, RetryPolicy, SignedRequest,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub enum Reply {
    Json(&'static str),
    Html,
    Status(u16),
    NetworkDown,
}

impl Reply {
    fn to_response(&self) -> KrakenResult<HttpResponse> {
        match self {
            Reply::Json(body) => Ok(HttpResponse {
                status: 200,
                content_type: Some("application/json; charset=utf-8".to_string()),
                body: body.as_bytes().to_vec(),
            }),
            Reply::Html => Ok(HttpResponse {
                status: 200,
                content_type: Some("text/html; charset=UTF-8".to_string()),
                body: b"<!DOCTYPE html><title>Just a moment...</title>".to_vec(),
            }),
            Reply::Status(status) => Ok(HttpResponse {
                status: *status,
                content_type: Some("text/plain".to_string()),
                body: Vec::new(),
            }),
            Reply::NetworkDown => Err(KrakenError::Transport("connection refused".to_string())),
        }
    }
}

/// Answers with scripted replies in order, repeating the last one forever
pub struct StubTransport {
    replies: Mutex<Vec<Reply>>,
    requests: Mutex<Vec<SignedRequest>>,
}

impl StubTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        assert!(!replies.is_empty(), "stub needs at least one reply");
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: &SignedRequest) -> KrakenResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        };
        reply.to_response()
    }
}

pub const API_KEY: &str = "test-api-key";
/// base64 of "kraken-test-secret"
pub const API_SECRET: &str = "a3Jha2VuLXRlc3Qtc2VjcmV0";

pub fn test_config() -> ClientConfig {
    ClientConfig {
        retry: RetryPolicy::default().with_delay(Duration::ZERO),
        ..ClientConfig::default()
    }
}

pub fn private_client(transport: Arc<StubTransport>) -> KrakenClient {
    KrakenClient::with_transport(
        test_config(),
        Some(Credentials::new(API_KEY, API_SECRET)),
        transport,
    )
}

pub fn public_client(transport: Arc<StubTransport>) -> KrakenClient {
    KrakenClient::with_transport(test_config(), None, transport)
}

/// Value of `name` in a form-encoded body
pub fn form_value(body: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
