pub mod envelope;
pub mod nonce;
