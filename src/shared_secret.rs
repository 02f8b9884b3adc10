// shared_secret.rs - per hop shared secret derivation
// Copyright (C) 2018  David Stainton.

//! Shared secret derivation.
//!
//! The sender walks the whole route once with its session key, ratcheting
//! the ephemeral scalar forward at every hop. A relay only ever sees the
//! packet's current ephemeral public key and re-derives its own secret from
//! that and its private key; both paths produce identical secrets.

use std::fmt;

use tracing::trace;

use super::constants::{MU_KEY_TAG, RHO_KEY_TAG, SHARED_SECRET_SIZE, UM_KEY_TAG};
use super::ecdh::{PrivateKey, PublicKey};
use super::error::Result;
use super::internal_crypto::{hmac, sha256, HASH_SIZE, STREAM_KEY_SIZE};

/// The 32 byte secret shared between the sender and a single hop.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    pub fn from_bytes(b: [u8; SHARED_SECRET_SIZE]) -> SharedSecret {
        SharedSecret(b)
    }

    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SharedSecret(..)")
    }
}

/// The subkeys derivable from a shared secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    /// stream cipher key
    Rho,
    /// HMAC key
    Mu,
    /// reserved, unused by packet processing
    Um,
}

impl KeyType {
    fn tag(&self) -> &'static [u8] {
        match *self {
            KeyType::Rho => RHO_KEY_TAG,
            KeyType::Mu => MU_KEY_TAG,
            KeyType::Um => UM_KEY_TAG,
        }
    }
}

/// Derive a subkey, HMAC-SHA256 keyed with the textual tag over the secret.
pub fn derive_subkey(shared_secret: &SharedSecret, key_type: KeyType) -> [u8; STREAM_KEY_SIZE] {
    hmac(key_type.tag(), shared_secret.as_bytes(), None)
}

/// SHA256(ephemeral public key || shared secret)
pub fn blinding_factor(ephemeral_public_key: &PublicKey, shared_secret: &SharedSecret) -> [u8; HASH_SIZE] {
    sha256(&[&ephemeral_public_key.to_bytes()[..], &shared_secret.as_bytes()[..]])
}

/// Compute one secret per hop, in route order, from the sender's session key.
pub fn derive_route_secrets(session_key: &PrivateKey, hop_public_keys: &[PublicKey]) -> Result<Vec<SharedSecret>> {
    let mut ephemeral_key = *session_key;
    let mut secrets = Vec::with_capacity(hop_public_keys.len());

    for (i, hop_public_key) in hop_public_keys.iter().enumerate() {
        trace!(round = i, "deriving hop shared secret");
        let secret = SharedSecret(ephemeral_key.exp(hop_public_key)?);
        secrets.push(secret);

        if i == hop_public_keys.len() - 1 {
            break;
        }
        let factor = blinding_factor(&ephemeral_key.public_key(), &secret);
        ephemeral_key = ephemeral_key.blind(&factor)?;
    }
    Ok(secrets)
}

/// A relay's view: ECDH between its own private key and the packet's
/// ephemeral public key.
pub fn derive_hop_secret(private_key: &PrivateKey, ephemeral_public_key: &PublicKey) -> Result<SharedSecret> {
    Ok(SharedSecret(private_key.exp(ephemeral_public_key)?))
}

/// Blind the ephemeral public key for the next hop. No private scalar is
/// needed, so a relay can do this on its own.
pub fn next_ephemeral_public_key(ephemeral_public_key: &PublicKey, shared_secret: &SharedSecret) -> Result<PublicKey> {
    let factor = blinding_factor(ephemeral_public_key, shared_secret);
    ephemeral_public_key.blind(&factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRIVATE_KEY_SIZE;

    const HOP_PUBLIC_KEYS: [&str; 5] = [
        "02eec7245d6b7d2ccb30380bfbe2a3648cd7a942653f5aa340edcea1f283686619",
        "0324653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c",
        "027f31ebc5462c1fdce1b737ecff52d37d75dea43ce11c74d25aa297165faa2007",
        "032c0b7cf95324a07d05398b240174dc0c2be444d96b159aa6c7f7b1e668680991",
        "02edabbd16b41c8371b92ef2f04c1185b4f03b6dcd52ba9b78d9d7c89c8f221145",
    ];

    const HOP_SHARED_SECRETS: [&str; 5] = [
        "53eb63ea8a3fec3b3cd433b85cd62a4b145e1dda09391b348c4e1cd36a03ea66",
        "a6519e98832a0b179f62123b3567c106db99ee37bef036e783263602f3488fae",
        "3a6b412548762f0dbccce5c7ae7bb8147d1caf9b5471c34120b30bc9c04891cc",
        "21e13c2d7cfe7e18836df50872466117a295783ab8aab0e7ecc8c725503ad02d",
        "b5756b9b542727dbafc6765a49488b023a725d631af688fc031217e90770c328",
    ];

    fn hop_public_keys() -> Vec<PublicKey> {
        HOP_PUBLIC_KEYS
            .iter()
            .map(|h| PublicKey::from_bytes(&hex::decode(h).unwrap()).unwrap())
            .collect()
    }

    fn secret_from_hex(h: &str) -> SharedSecret {
        let mut raw = [0u8; SHARED_SECRET_SIZE];
        raw.copy_from_slice(&hex::decode(h).unwrap());
        SharedSecret::from_bytes(raw)
    }

    #[test]
    fn route_secrets_vector_test() {
        let session_key = PrivateKey::from_bytes(&[0x41; PRIVATE_KEY_SIZE]).unwrap();
        let secrets = derive_route_secrets(&session_key, &hop_public_keys()).unwrap();
        assert_eq!(secrets.len(), 5);
        for (secret, want) in secrets.iter().zip(HOP_SHARED_SECRETS.iter()) {
            assert_eq!(hex::encode(secret.as_bytes()), *want);
        }

        // Deterministic for fixed inputs.
        let again = derive_route_secrets(&session_key, &hop_public_keys()).unwrap();
        assert_eq!(secrets, again);
    }

    #[test]
    fn relay_secrets_match_sender_test() {
        let session_key = PrivateKey::from_bytes(&[0x41; PRIVATE_KEY_SIZE]).unwrap();
        let secrets = derive_route_secrets(&session_key, &hop_public_keys()).unwrap();

        let mut ephemeral_key = session_key.public_key();
        for (i, want) in secrets.iter().enumerate() {
            let hop_key = PrivateKey::from_bytes(&[0x41 + i as u8; PRIVATE_KEY_SIZE]).unwrap();
            let secret = derive_hop_secret(&hop_key, &ephemeral_key).unwrap();
            assert_eq!(&secret, want);
            ephemeral_key = next_ephemeral_public_key(&ephemeral_key, &secret).unwrap();
        }
    }

    #[test]
    fn derive_subkey_test() {
        let secret = secret_from_hex(HOP_SHARED_SECRETS[4]);
        let rho = derive_subkey(&secret, KeyType::Rho);
        assert_eq!(
            hex::encode(rho),
            "034e18b8cc718e8af6339106e706c52d8df89e2b1f7e9142d996acf88df8799b"
        );
        let mu = derive_subkey(&secret, KeyType::Mu);
        let um = derive_subkey(&secret, KeyType::Um);
        assert_ne!(rho, mu);
        assert_ne!(mu, um);
    }

    #[test]
    fn empty_route_test() {
        let session_key = PrivateKey::from_bytes(&[0x41; PRIVATE_KEY_SIZE]).unwrap();
        assert!(derive_route_secrets(&session_key, &[]).unwrap().is_empty());
    }
}
