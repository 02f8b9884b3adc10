// internal_crypto.rs - internal cryptographic functions
// Copyright (C) 2018  David Stainton.

//! Sphinx crypto primitives

use chacha::ChaCha;
use digest::Digest;
use hmac::{Hmac, Mac};
use keystream::KeyStream;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::constants::{HMAC_SIZE, STREAM_NONCE};
use super::error::{Result, SphinxError};

pub const HASH_SIZE: usize = 32;
pub const STREAM_KEY_SIZE: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// given a key return a cipher stream of length n
pub fn stream(key: &[u8; STREAM_KEY_SIZE], n: usize) -> Result<Vec<u8>> {
    let mut cipher = ChaCha::new_chacha20(key, &STREAM_NONCE);
    let mut output = vec![0u8; n];
    cipher
        .xor_read(&mut output)
        .map_err(|_| SphinxError::KeystreamExhausted)?;
    Ok(output)
}

/// SHA256 over the concatenation of `parts`.
pub fn sha256(parts: &[&[u8]]) -> [u8; HASH_SIZE] {
    let mut h = Sha256::new();
    for part in parts {
        h.update(part);
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&h.finalize());
    out
}

/// HMAC-SHA256 over `data`, followed by `associated_data` when given.
pub fn hmac(key: &[u8], data: &[u8], associated_data: Option<&[u8]>) -> [u8; HMAC_SIZE] {
    let mut m = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    m.update(data);
    if let Some(ad) = associated_data {
        m.update(ad);
    }
    let mut out = [0u8; HMAC_SIZE];
    out.copy_from_slice(&m.finalize().into_bytes());
    out
}

pub fn hmac_eq(a: &[u8; HMAC_SIZE], b: &[u8; HMAC_SIZE]) -> bool {
    a[..].ct_eq(&b[..]).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_test() {
        // RFC 7539 section 2.3.2 style all zero key and nonce vector.
        let key = [0u8; STREAM_KEY_SIZE];
        let out = stream(&key, 64).unwrap();
        assert_eq!(
            hex::encode(&out[..32]),
            "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7"
        );
        let longer = stream(&key, 2600).unwrap();
        assert_eq!(&longer[..64], &out[..]);
    }

    #[test]
    fn sha256_test() {
        assert_eq!(
            hex::encode(sha256(&[&b"ab"[..], &b"c"[..]])),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hmac_associated_data_test() {
        let key = b"mu";
        let joined = hmac(key, b"onionad", None);
        let split = hmac(key, b"onion", Some(&b"ad"[..]));
        assert_eq!(joined, split);
        assert!(hmac_eq(&joined, &split));
        assert!(!hmac_eq(&joined, &hmac(key, b"onion", None)));
    }

    #[test]
    fn subtle_test() {
        let mac1 = [1u8; HMAC_SIZE];
        let mut mac2 = mac1;
        mac2[HMAC_SIZE - 1] ^= 0x80;
        assert!(!hmac_eq(&mac1, &mac2));
        assert!(hmac_eq(&mac1, &mac1));
    }
}
