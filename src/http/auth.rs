//! HTTP Basic Auth gate
//!
//! Projects may list `user:pass` credentials in their config. When the list
//! is non-empty every request to the project must carry one of them.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Realm sent in the `WWW-Authenticate` challenge
pub const REALM: &str = "Authorization Required";

/// Check an `Authorization` header against the configured credentials
///
/// An empty credential list lets every request through.
pub fn is_authorized(credentials: &[String], authorization: Option<&str>) -> bool {
    if credentials.is_empty() {
        return true;
    }

    let Some(presented) = authorization.and_then(decode_basic) else {
        return false;
    };
    if !presented.contains(':') {
        return false;
    }

    credentials
        .iter()
        .any(|cred| constant_time_compare(cred.as_bytes(), presented.as_bytes()))
}

/// Decode the `user:pass` pair of a Basic `Authorization` header
fn decode_basic(header: &str) -> Option<String> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    String::from_utf8(decoded).ok()
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
