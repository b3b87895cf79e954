//! Encrypted prop hand-off between server render and client hydration.
//!
//! Payload layout (base64, standard alphabet):
//!
//! ```text
//! version (1 byte) | nonce (12 bytes) | AES-256-GCM ciphertext + tag
//! ```
//!
//! The key is the SHA-256 digest of the shared secret. The base64 alphabet
//! contains no quote, angle bracket or backslash, so the payload is safe to
//! embed inside a `<script>` string literal.
//!
//! The secret ships to the browser with the client bundle. This keeps the
//! props out of the literal page source for scrapers; it is obfuscation,
//! not confidentiality.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::Props;

/// Development-only fallback secret. Provides no confidentiality.
pub const DEFAULT_SECRET_SALT: &str = "\"7-!~9tdMYa=;Ps3";

/// Global binding the server page assigns the payload to.
pub const PROPS_GLOBAL: &str = "$$props";

const PAYLOAD_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// Symmetric encoder/decoder bound to one secret.
#[derive(Clone)]
pub struct PropCodec {
    key: [u8; 32],
}

impl std::fmt::Debug for PropCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropCodec").finish_non_exhaustive()
    }
}

impl PropCodec {
    /// Derive a codec from a non-empty secret.
    pub fn new(secret: &str) -> Result<Self, CodecError> {
        if secret.is_empty() {
            return Err(CodecError::EmptySecret);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        Ok(Self { key })
    }

    /// Serialize and encrypt `props`.
    pub fn encode(&self, props: &Props) -> Result<String, CodecError> {
        let plaintext = serde_json::to_vec(props)?;
        let cipher = Aes256Gcm::new_from_slice(&self.key).map_err(|_| CodecError::Encrypt)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|_| CodecError::Encrypt)?;

        let mut raw = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        raw.push(PAYLOAD_VERSION);
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(raw))
    }

    /// Decrypt and deserialize a payload produced by [`PropCodec::encode`].
    ///
    /// Fails closed: a wrong secret fails authentication and yields no props.
    pub fn decode(&self, payload: &str) -> Result<Props, CodecError> {
        let raw = STANDARD
            .decode(payload.trim())
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let (version, rest) = raw
            .split_first()
            .ok_or_else(|| CodecError::Decode("empty payload".to_string()))?;
        if *version != PAYLOAD_VERSION {
            return Err(CodecError::Decode(format!("unsupported payload version {}", version)));
        }
        if rest.len() < NONCE_LEN {
            return Err(CodecError::Decode("payload too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CodecError::Decode("authentication failed".to_string()))?;

        serde_json::from_slice(&plaintext).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Encrypt `props` with `secret`.
pub fn encode(props: &Props, secret: &str) -> Result<String, CodecError> {
    PropCodec::new(secret)?.encode(props)
}

/// Decrypt a payload with `secret`.
pub fn decode(payload: &str, secret: &str) -> Result<Props, CodecError> {
    PropCodec::new(secret)?.decode(payload)
}

/// Script tag assigning the payload to [`PROPS_GLOBAL`].
pub fn props_script(payload: &str) -> String {
    format!(
        "<script type=\"text/javascript\">window.{} = \"{}\";</script>",
        PROPS_GLOBAL, payload
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = props(json!({
            "inner": "/x",
            "greeting": "hi",
            "nested": { "list": [1, 2, 3], "flag": true, "none": null },
        }));
        let payload = encode(&original, "s3cret").unwrap();
        assert_eq!(decode(&payload, "s3cret").unwrap(), original);
    }

    #[test]
    fn test_wrong_secret_fails_closed() {
        let original = props(json!({ "greeting": "hi" }));
        let payload = encode(&original, "secret-one").unwrap();
        let err = decode(&payload, "secret-two").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_payload_hides_plain_json() {
        let payload = encode(&props(json!({ "email": "a@b.c" })), DEFAULT_SECRET_SALT).unwrap();
        assert!(!payload.contains("email"));
        assert!(!payload.contains('"'));
        assert!(!payload.contains('<'));
    }

    #[test]
    fn test_nonce_varies_between_encodings() {
        let original = props(json!({ "a": 1 }));
        let first = encode(&original, "k").unwrap();
        let second = encode(&original, "k").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(PropCodec::new(""), Err(CodecError::EmptySecret)));
    }

    #[test]
    fn test_malformed_payloads() {
        let codec = PropCodec::new("k").unwrap();
        assert!(codec.decode("not base64!").is_err());
        assert!(codec.decode("").is_err());
        // Unknown version byte
        assert!(codec.decode(&STANDARD.encode([9u8; 40])).is_err());
        // Truncated after the version byte
        assert!(codec.decode(&STANDARD.encode([PAYLOAD_VERSION, 1, 2])).is_err());
    }

    #[test]
    fn test_props_script() {
        assert_eq!(
            props_script("abc="),
            "<script type=\"text/javascript\">window.$$props = \"abc=\";</script>"
        );
    }
}
