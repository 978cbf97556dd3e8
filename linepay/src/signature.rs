//! Request signing for the LINE Pay v3 authentication scheme.
//!
//! The signed bytes are the canonical message
//!
//! ```text
//! channelSecret + "/" + path + (query | body) + nonce
//! ```
//!
//! where `query` is the encoded query string placed on the URL (GET/DELETE)
//! and `body` is the JSON body placed on the wire (POST/PUT). The digest is
//! HMAC-SHA256 keyed with the channel secret, sent as standard base64.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Generates a fresh nonce for one request.
#[must_use]
pub fn new_nonce() -> String {
    Uuid::new_v4().to_string()
}

/// Builds the canonical message for a request.
///
/// `path` is the request path relative to the endpoint base, without a
/// leading `/` and without the query string. `content` is the encoded query
/// string (without `?`) or the JSON body, and is empty when the request
/// carries neither.
#[must_use]
pub fn canonical_message(secret: &str, path: &str, content: &[u8], nonce: &str) -> Vec<u8> {
    let mut message =
        Vec::with_capacity(secret.len() + 1 + path.len() + content.len() + nonce.len());
    message.extend_from_slice(secret.as_bytes());
    message.push(b'/');
    message.extend_from_slice(path.as_bytes());
    message.extend_from_slice(content);
    message.extend_from_slice(nonce.as_bytes());
    message
}

/// Computes the base64 HMAC-SHA256 signature of `message`.
#[must_use]
pub fn sign(secret: &str, message: &[u8]) -> String {
    BASE64_STANDARD.encode(mac(secret, message).finalize().into_bytes())
}

/// Checks `signature` against `message` in constant time.
///
/// Returns `false` for signatures that are not valid base64.
#[must_use]
pub fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature) else {
        return false;
    };
    mac(secret, message).verify_slice(&expected).is_ok()
}

fn mac(secret: &str, message: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac
}
