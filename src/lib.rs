//! Kraken REST API client
//!
//! Signed-request pipeline for the Kraken spot REST API: nonce generation,
//! HMAC-SHA512 request signing, bounded retry of transient failures and typed
//! decoding of the `{error, result}` response envelope.
//!
//! ```no_run
//! use kraken_rest::KrakenClient;
//!
//! # async fn run() -> kraken_rest::KrakenResult<()> {
//! let client = KrakenClient::new_public()?;
//! let time = client.time().await?;
//! println!("server time: {}", time.unixtime);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod secrets;

pub use config::{Backoff, ClientConfig, ConfigError, MinimumOrderSizes, RetryPolicy};
pub use domain::entities::query::QueryResult;
pub use domain::errors::{DecodeError, KrakenError, KrakenResult};
pub use domain::methods::{MethodClass, MethodRegistry, Visibility};
pub use domain::repositories::http_transport::{HttpResponse, HttpTransport, SignedRequest};
pub use domain::services::nonce::{Clock, NonceGenerator, SystemClock};
pub use domain::value_objects::amount::Amount;
pub use domain::value_objects::order::{Direction, OrderType};
pub use domain::value_objects::params::Params;
pub use infrastructure::kraken_client::{Args, KrakenClient};
pub use infrastructure::reqwest_transport::ReqwestTransport;
pub use secrets::{Credentials, SecretError};
