use crate::config::DEFAULT_TRANSIENT_API_ERRORS;
use thiserror::Error;

/// Common result type for Kraken pipeline operations
pub type KrakenResult<T> = Result<T, KrakenError>;

/// Failure to turn a positionally-encoded array or numeric string into a named field
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{what}: expected at least {expected} elements, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what}[{index}]: expected a numeric value, got {value}")]
    InvalidNumber {
        what: &'static str,
        index: usize,
        value: String,
    },

    #[error("{what}[{index}]: expected {expected}, got {value}")]
    UnexpectedType {
        what: &'static str,
        index: usize,
        expected: &'static str,
        value: String,
    },

    #[error("{what}: missing field '{field}'")]
    MissingField { what: &'static str, field: String },

    #[error("{what}: expected a JSON array, got {value}")]
    NotAnArray { what: &'static str, value: String },

    #[error("{what}: expected a JSON object, got {value}")]
    NotAnObject { what: &'static str, value: String },
}

/// Errors produced while building, sending or decoding a Kraken API request
#[derive(Debug, Error)]
pub enum KrakenError {
    /// The request could not be assembled
    #[error("Request construction failed: {0}")]
    Construction(String),

    /// Network-level failure reported by the transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a 5xx status line
    #[error("Response status is an error: {status}")]
    ServerStatus { status: u16 },

    /// The response did not declare a JSON body
    #[error("Response Content-Type is '{content_type}', but should be 'application/json'")]
    UnexpectedContentType { content_type: String },

    /// The body was JSON but not a `{error, result}` envelope
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// Kraken reported one or more errors in the envelope
    #[error("Kraken API error: [{}]", .0.join(", "))]
    Api(Vec<String>),

    /// The result payload did not match the requested type
    #[error("Failed to decode {target}: {source}")]
    Decode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A positional array or numeric string failed validation
    #[error("Unexpected result shape: {0}")]
    Shape(#[from] DecodeError),

    #[error("Method '{0}' is not valid")]
    UnknownMethod(String),

    #[error("Private method '{0}' requires API credentials")]
    MissingCredentials(String),

    /// Every allowed attempt failed with a transient error
    #[error("Request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<KrakenError>,
    },
}

impl KrakenError {
    /// Short error code for logging/monitoring
    pub fn error_code(&self) -> &'static str {
        match self {
            KrakenError::Construction(_) => "ERR_CONSTRUCTION",
            KrakenError::Transport(_) => "ERR_TRANSPORT",
            KrakenError::ServerStatus { .. } => "ERR_SERVER_STATUS",
            KrakenError::UnexpectedContentType { .. } => "ERR_PROTOCOL_CONTENT_TYPE",
            KrakenError::MalformedEnvelope(_) => "ERR_PROTOCOL_ENVELOPE",
            KrakenError::Api(_) => "ERR_API",
            KrakenError::Decode { .. } | KrakenError::Shape(_) => "ERR_DECODE",
            KrakenError::UnknownMethod(_) => "ERR_UNKNOWN_METHOD",
            KrakenError::MissingCredentials(_) => "ERR_MISSING_CREDENTIALS",
            KrakenError::RetriesExhausted { .. } => "ERR_RETRIES_EXHAUSTED",
        }
    }

    /// Whether the failure is transient under the default API error patterns
    pub fn is_retryable(&self) -> bool {
        match self {
            KrakenError::Transport(_) | KrakenError::ServerStatus { .. } => true,
            KrakenError::UnexpectedContentType { content_type } => content_type == "text/html",
            KrakenError::Api(errors) => errors.iter().any(|message| {
                DEFAULT_TRANSIENT_API_ERRORS
                    .iter()
                    .any(|pattern| message.contains(pattern))
            }),
            _ => false,
        }
    }

    /// Errors reported by Kraken itself, looking through a retry wrapper
    pub fn api_errors(&self) -> Option<&[String]> {
        match self {
            KrakenError::Api(errors) => Some(errors),
            KrakenError::RetriesExhausted { last, .. } => last.api_errors(),
            _ => None,
        }
    }

    /// Number of attempts made before this error was returned, when retries ran out
    pub fn attempts(&self) -> Option<u32> {
        match self {
            KrakenError::RetriesExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

impl From<KrakenError> for String {
    fn from(error: KrakenError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_keeps_messages_verbatim() {
        let error = KrakenError::Api(vec![
            "EGeneral:Invalid arguments".to_string(),
            "EQuery:Unknown asset pair".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "Kraken API error: [EGeneral:Invalid arguments, EQuery:Unknown asset pair]"
        );
    }

    #[test]
    fn test_content_type_error_display() {
        let error = KrakenError::UnexpectedContentType {
            content_type: "text/html".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Response Content-Type is 'text/html', but should be 'application/json'"
        );
    }

    #[test]
    fn test_retries_exhausted_exposes_attempts_and_cause() {
        let error = KrakenError::RetriesExhausted {
            attempts: 3,
            last: Box::new(KrakenError::Api(vec!["EService:Unavailable".to_string()])),
        };
        assert_eq!(error.attempts(), Some(3));
        assert_eq!(
            error.api_errors(),
            Some(&["EService:Unavailable".to_string()][..])
        );
        assert!(error.to_string().starts_with("Request failed after 3 attempts"));
        assert_eq!(error.error_code(), "ERR_RETRIES_EXHAUSTED");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(KrakenError::Transport("connection reset".to_string()).is_retryable());
        assert!(KrakenError::ServerStatus { status: 503 }.is_retryable());
        assert!(KrakenError::Api(vec!["EService:Unavailable".to_string()]).is_retryable());
        assert!(!KrakenError::Api(vec!["EOrder:Insufficient funds".to_string()]).is_retryable());
        assert!(!KrakenError::MalformedEnvelope("no result".to_string()).is_retryable());
        assert!(!KrakenError::Construction("bad key".to_string()).is_retryable());
    }

    #[test]
    fn test_length_mismatch_display() {
        let error = DecodeError::LengthMismatch {
            what: "order book entry",
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            error.to_string(),
            "order book entry: expected at least 3 elements, got 2"
        );
    }

    #[test]
    fn test_immediate_errors_have_no_attempt_count() {
        let error = KrakenError::UnknownMethod("NotARealMethod".to_string());
        assert_eq!(error.attempts(), None);
        assert_eq!(error.to_string(), "Method 'NotARealMethod' is not valid");
    }
}
