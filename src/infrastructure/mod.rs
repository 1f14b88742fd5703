pub mod kraken_client;
pub mod request_builder;
pub mod reqwest_transport;
pub mod retry_executor;
pub mod signer;
