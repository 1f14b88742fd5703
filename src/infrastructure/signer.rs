//! `API-Sign` computation
//!
//! `base64(HMAC-SHA512(secret, path ++ SHA256(nonce ++ body)))`

use crate::domain::errors::{KrakenError, KrakenResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Sign a private request
///
/// `encoded_body` is the form-encoded parameter string, nonce included;
/// `nonce` is the same value as a decimal string.
pub fn sign(path: &str, encoded_body: &str, secret: &[u8], nonce: &str) -> KrakenResult<String> {
    let mut sha = Sha256::new();
    sha.update(nonce.as_bytes());
    sha.update(encoded_body.as_bytes());
    let digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(secret)
        .map_err(|e| KrakenError::Construction(format!("Invalid signing key: {}", e)))?;
    mac.update(path.as_bytes());
    mac.update(&digest);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::params::{encode_params, Params};
    use crate::secrets::decode_secret;

    #[test]
    fn test_regression_vector() {
        let mut params = Params::new();
        params.insert("TestKey".to_string(), "TestValue".to_string());
        let secret = decode_secret("SECRET");

        let signature = sign("/0/private/", &encode_params(&params), &secret, "").unwrap();
        assert_eq!(
            signature,
            "Uog0MyIKZmXZ4/VFOh0g1u2U+A0ohuK8oCh0HFUiHLE2Csm23CuPCDaPquh/hpnAg/pSQLeXyBELpJejgOftCQ=="
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let secret = decode_secret("c2VjcmV0");
        let first = sign("/0/private/Balance", "nonce=1", &secret, "1").unwrap();
        let second = sign("/0/private/Balance", "nonce=1", &secret, "1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_signature_covers_path_body_and_nonce() {
        let secret = decode_secret("c2VjcmV0");
        let base = sign("/0/private/Balance", "nonce=1", &secret, "1").unwrap();
        assert_ne!(base, sign("/0/private/TradeBalance", "nonce=1", &secret, "1").unwrap());
        assert_ne!(base, sign("/0/private/Balance", "nonce=2", &secret, "1").unwrap());
        assert_ne!(base, sign("/0/private/Balance", "nonce=1", &secret, "2").unwrap());
    }
}
