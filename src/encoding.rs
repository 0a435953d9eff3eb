//! Canonical encoding and digest primitives shared by both signing schemes.
//!
//! Everything here is pure. The percent-encoder follows the AWS
//! canonicalization rules, which differ from form encoding: a space becomes
//! `%20` and only `A-Za-z0-9_.-~` are left untouched.

use base64::Engine as _;
use hmac::{Hmac, Mac as _};
use sha1::Sha1;
use sha2::{Digest as _, Sha256};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

fn is_unreserved(byte: u8) -> bool {
    matches!(byte, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~')
}

/// Percent-encodes `input` byte by byte.
///
/// `/` is encoded as `%2F` when `encode_slash` is true and kept verbatim
/// otherwise, which is what object-key path segments need.
pub fn percent_encode(input: &str, encode_slash: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if is_unreserved(b) || (!encode_slash && b == b'/') {
            out.push(b as char);
            continue;
        }

        out.push('%');
        out.push(hex_upper(b >> 4));
        out.push(hex_upper(b & 0x0F));
    }
    out
}

fn hex_upper(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        10..=15 => (b'A' + (nibble - 10)) as char,
        _ => '0',
    }
}

/// Encodes and sorts query pairs into an AWS canonical query string.
pub fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut items = params
        .iter()
        .map(|(k, v)| (percent_encode(k, true), percent_encode(v, true)))
        .collect::<Vec<_>>();

    items.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut out = String::new();
    for (idx, (k, v)) in items.into_iter().enumerate() {
        if idx > 0 {
            out.push('&');
        }
        out.push_str(&k);
        out.push('=');
        out.push_str(&v);
    }
    out
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|_| Error::signing("invalid HMAC key"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC-SHA1 of `data` under `key`, used by the legacy `AWS` scheme.
pub fn hmac_sha1(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|_| Error::signing("invalid HMAC key"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// MD5 digest of `data`, used for `Content-MD5`.
pub fn md5(data: &[u8]) -> [u8; 16] {
    use md5::Digest as _;

    let mut out = [0u8; 16];
    out.copy_from_slice(&md5::Md5::digest(data));
    out
}

/// Lowercase hex encoding.
pub fn hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Standard (padded) base64 encoding.
pub fn base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encoding_handles_slash_modes() {
        assert_eq!(percent_encode("a b/c", true), "a%20b%2Fc");
        assert_eq!(percent_encode("a b/c", false), "a%20b/c");
    }

    #[test]
    fn percent_encoding_keeps_unreserved_characters() {
        let unreserved = "ABCXYZabcxyz0189_.-~";
        assert_eq!(percent_encode(unreserved, true), unreserved);
        assert_eq!(percent_encode(unreserved, false), unreserved);
    }

    #[test]
    fn percent_encoding_uses_uppercase_utf8_bytes() {
        assert_eq!(percent_encode("a+b", true), "a%2Bb");
        assert_eq!(percent_encode("é", true), "%C3%A9");
        assert_eq!(percent_encode("*", true), "%2A");
    }

    #[test]
    fn canonical_query_string_sorts_and_encodes() {
        let params = vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "0".to_string()),
            ("space".to_string(), "a b".to_string()),
        ];
        assert_eq!(canonical_query_string(&params), "a=0&a=1&b=2&space=a%20b");
    }

    #[test]
    fn digests_match_known_vectors() {
        assert_eq!(
            hex(&sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hex(&md5(b"")), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(base64(&md5(b"")), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn hmac_sha256_matches_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex(&mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_sha1_matches_rfc2202_case_2() {
        let mac = hmac_sha1(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(hex(&mac), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(hex(&[0xAB, 0x01]), "ab01");
    }
}
