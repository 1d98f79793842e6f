//! The keyed-hash primitive shared by both halves of CRAM-MD5.

use base64::{engine::general_purpose::STANDARD as Base64, Engine};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use md5::Md5;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacMd5 = Hmac<Md5>;

/// Number of hexadecimal digits in the digest part of a response.
pub const DIGEST_HEX_LEN: usize = 32;

/// Generate a challenge for CRAM-MD5 authentication.
///
/// The challenge has the msg-id shape suggested by RFC 2195, `<nonce.timestamp@realm>`, where the
/// nonce is 32 bytes from the operating system's RNG.
pub fn generate_challenge(realm: &str) -> Result<Vec<u8>, getrandom::Error> {
    let mut data = [0u8; 32];
    getrandom::getrandom(&mut data)?;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    Ok(format!("<{}.{}@{}>", Base64.encode(data), timestamp, realm).into_bytes())
}

/// HMAC-MD5 of `challenge`, keyed with `secret`.
pub fn hmac(secret: &[u8], challenge: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacMd5::new_from_slice(secret)?;
    mac.update(challenge);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds the client response, `principal SP hex(HMAC-MD5(secret, challenge))`.
pub fn respond(principal: &str, secret: &[u8], challenge: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let digest = hmac(secret, challenge)?;
    let mut ret = Vec::with_capacity(principal.len() + 1 + DIGEST_HEX_LEN);
    ret.extend(principal.bytes());
    ret.push(b' ');
    ret.extend(hex::encode(digest).bytes());
    Ok(ret)
}

/// Checks a raw (already hex decoded) digest in constant time.
pub fn verify(secret: &[u8], challenge: &[u8], digest: &[u8]) -> Result<bool, InvalidLength> {
    let mut mac = HmacMd5::new_from_slice(secret)?;
    mac.update(challenge);
    Ok(mac.verify_slice(digest).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Source: RFC 2195, section 2.
    const CHALLENGE: &[u8] = b"<1896.697170952@postoffice.reston.mci.net>";
    const SECRET: &[u8] = b"tanstaaftanstaaf";

    #[test]
    fn rfc2195_digest() {
        let digest = hmac(SECRET, CHALLENGE).unwrap();
        assert_eq!(hex::encode(digest), "b913a602c7eda7a495b4e6e7334d3890");
    }

    #[test]
    fn rfc2195_response() {
        let response = respond("tim", SECRET, CHALLENGE).unwrap();
        assert_eq!(response, b"tim b913a602c7eda7a495b4e6e7334d3890");
    }

    #[test]
    fn verify_accepts_only_matching_secret() {
        let digest = hmac(SECRET, CHALLENGE).unwrap();
        assert!(verify(SECRET, CHALLENGE, &digest).unwrap());
        assert!(!verify(b"tanstaaf", CHALLENGE, &digest).unwrap());
        assert!(!verify(SECRET, b"<other@challenge>", &digest).unwrap());
        assert!(!verify(SECRET, CHALLENGE, &digest[..8]).unwrap());
    }

    #[test]
    fn challenges_are_fresh() {
        let first = generate_challenge("localhost").unwrap();
        let second = generate_challenge("localhost").unwrap();
        assert_ne!(first, second);

        let first = String::from_utf8(first).unwrap();
        assert!(first.starts_with('<'));
        assert!(first.ends_with("@localhost>"));
    }

    #[test]
    fn same_secret_different_challenge_different_response() {
        let first = generate_challenge("localhost").unwrap();
        let second = generate_challenge("localhost").unwrap();
        assert_ne!(
            respond("benh", b"secret", &first).unwrap(),
            respond("benh", b"secret", &second).unwrap()
        );
    }
}
