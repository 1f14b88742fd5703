//! Sends requests, validates responses and retries transient failures
//!
//! Each attempt rebuilds the request through the supplied closure, so a retried
//! private call is re-signed with a fresh nonce.

use crate::config::RetryPolicy;
use crate::domain::errors::{KrakenError, KrakenResult};
use crate::domain::repositories::http_transport::{HttpResponse, HttpTransport, SignedRequest};
use crate::domain::services::envelope::parse_envelope;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct RetryExecutor {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run one logical call and return the envelope's result payload
    ///
    /// Non-transient failures return immediately as-is, as does any failure when
    /// the policy allows a single attempt. When every attempt fails transiently
    /// the last error comes back inside `RetriesExhausted`.
    pub async fn execute<F>(&self, mut build: F) -> KrakenResult<Value>
    where
        F: FnMut() -> KrakenResult<SignedRequest> + Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let request = build()?;
            let error = match self.attempt(&request).await {
                Ok(payload) => return Ok(payload),
                Err(error) => error,
            };

            if !self.policy.is_transient(&error) {
                debug!(method = %request.method, attempt, error = %error, "Request failed permanently");
                return Err(error);
            }
            if max_attempts == 1 {
                debug!(method = %request.method, error = %error, "Retries disabled, returning transient error");
                return Err(error);
            }
            if attempt >= max_attempts {
                warn!(
                    method = %request.method,
                    attempts = attempt,
                    error = %error,
                    "Giving up after {} attempts",
                    attempt
                );
                return Err(KrakenError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                method = %request.method,
                attempt,
                max_attempts,
                error = %error,
                "Retry #{} after error: {}",
                attempt,
                error
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &SignedRequest) -> KrakenResult<Value> {
        let response = self.transport.send(request).await?;
        validate_response(&response)?;
        parse_envelope(&response.body)
    }
}

/// Status line and content type checks, in that order
fn validate_response(response: &HttpResponse) -> KrakenResult<()> {
    if response.is_server_error() {
        return Err(KrakenError::ServerStatus {
            status: response.status,
        });
    }

    let media_type = response.media_type();
    if media_type != JSON_MEDIA_TYPE {
        return Err(KrakenError::UnexpectedContentType {
            content_type: media_type,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::methods::Visibility;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Transport that replays canned responses, repeating the final one
    struct CannedTransport {
        responses: Mutex<Vec<KrakenResult<HttpResponse>>>,
        calls: AtomicUsize,
    }

    impl CannedTransport {
        fn new(mut responses: Vec<KrakenResult<HttpResponse>>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn clone_result(result: &KrakenResult<HttpResponse>) -> KrakenResult<HttpResponse> {
        match result {
            Ok(response) => Ok(response.clone()),
            Err(error) => Err(KrakenError::Transport(error.to_string())),
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn send(&self, _request: &SignedRequest) -> KrakenResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop().unwrap()
            } else {
                clone_result(&responses[0])
            }
        }
    }

    fn json(body: &str) -> KrakenResult<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.as_bytes().to_vec(),
        })
    }

    fn html() -> KrakenResult<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: b"<html>Checking your browser</html>".to_vec(),
        })
    }

    fn request() -> KrakenResult<SignedRequest> {
        Ok(SignedRequest {
            method: "Time".to_string(),
            visibility: Visibility::Public,
            url: "https://api.kraken.com/0/public/Time".to_string(),
            path: "/0/public/Time".to_string(),
            body: String::new(),
            headers: Vec::new(),
        })
    }

    fn executor(transport: Arc<CannedTransport>) -> RetryExecutor {
        RetryExecutor::new(transport, RetryPolicy::default().with_delay(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let transport = CannedTransport::new(vec![json(r#"{"error":[],"result":{"unixtime":1}}"#)]);
        let payload = executor(transport.clone()).execute(request).await.unwrap();
        assert_eq!(payload["unixtime"], 1);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_html_then_success() {
        let transport = CannedTransport::new(vec![
            html(),
            json(r#"{"error":[],"result":{"unixtime":2}}"#),
        ]);
        let payload = executor(transport.clone()).execute(request).await.unwrap();
        assert_eq!(payload["unixtime"], 2);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_always_transient_stops_at_max_attempts() {
        let transport = CannedTransport::new(vec![json(r#"{"error":["EService:Unavailable"]}"#)]);
        let err = executor(transport.clone()).execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 3);
        assert_eq!(err.attempts(), Some(3));
        assert_eq!(err.api_errors(), Some(&["EService:Unavailable".to_string()][..]));
    }

    #[tokio::test]
    async fn test_unrecognized_api_error_is_not_retried() {
        let transport = CannedTransport::new(vec![json(r#"{"error":["EQuery:Unknown asset pair"]}"#)]);
        let err = executor(transport.clone()).execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 1);
        assert!(matches!(err, KrakenError::Api(_)));
    }

    #[tokio::test]
    async fn test_server_error_status_checked_before_content_type() {
        let transport = CannedTransport::new(vec![
            Ok(HttpResponse {
                status: 502,
                content_type: Some("text/plain".to_string()),
                body: Vec::new(),
            }),
            json(r#"{"error":[],"result":{"unixtime":3}}"#),
        ]);
        let payload = executor(transport.clone()).execute(request).await.unwrap();
        assert_eq!(payload["unixtime"], 3);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_other_content_type_is_fatal() {
        let transport = CannedTransport::new(vec![Ok(HttpResponse {
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: b"oops".to_vec(),
        })]);
        let err = executor(transport.clone()).execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 1);
        assert!(matches!(err, KrakenError::UnexpectedContentType { .. }));
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let transport = CannedTransport::new(vec![Err(KrakenError::Transport(
            "connection reset".to_string(),
        ))]);
        let executor = RetryExecutor::new(
            transport.clone(),
            RetryPolicy::default()
                .with_max_attempts(5)
                .with_delay(Duration::ZERO),
        );
        let err = executor.execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 5);
        assert!(matches!(
            err,
            KrakenError::RetriesExhausted { attempts: 5, ref last } if matches!(**last, KrakenError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_single_attempt_policy_returns_error_unwrapped() {
        let transport = CannedTransport::new(vec![html()]);
        let executor = RetryExecutor::new(transport.clone(), RetryPolicy::no_retry());
        let err = executor.execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 1);
        assert_eq!(err.attempts(), None);
        assert!(matches!(
            err,
            KrakenError::UnexpectedContentType { ref content_type } if content_type == "text/html"
        ));
    }

    #[tokio::test]
    async fn test_two_attempts_are_reported_as_exhausted() {
        let transport = CannedTransport::new(vec![Err(KrakenError::Transport("reset".to_string()))]);
        let executor = RetryExecutor::new(
            transport.clone(),
            RetryPolicy::default()
                .with_max_attempts(2)
                .with_delay(Duration::ZERO),
        );
        let err = executor.execute(request).await.unwrap_err();
        assert_eq!(transport.calls(), 2);
        assert_eq!(err.attempts(), Some(2));
    }

    #[tokio::test]
    async fn test_build_failure_sends_nothing() {
        let transport = CannedTransport::new(vec![json(r#"{"error":[],"result":{}}"#)]);
        let err = executor(transport.clone())
            .execute(|| Err(KrakenError::Construction("bad".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, KrakenError::Construction(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_linear_backoff_waits_between_attempts() {
        let transport = CannedTransport::new(vec![html()]);
        let executor = RetryExecutor::new(
            transport.clone(),
            RetryPolicy::default()
                .with_delay(Duration::from_millis(20))
                .with_backoff(crate::config::Backoff::Linear),
        );
        let started = tokio::time::Instant::now();
        let err = executor.execute(request).await.unwrap_err();
        assert_eq!(err.attempts(), Some(3));
        // 20ms after the first failure, 40ms after the second
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
