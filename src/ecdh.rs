// ecdh.rs - wrapping library for secp256k1 dh operations
// Copyright (C) 2018  David Stainton.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use secp256k1::{All, Scalar, Secp256k1, SECP256K1};

use super::constants::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
use super::error::{Result, SphinxError};
use super::internal_crypto::{sha256, HASH_SIZE};

fn secp() -> &'static Secp256k1<All> {
    SECP256K1
}

/// Multiply `point` by the scalar `x`.
pub fn exp(point: &secp256k1::PublicKey, x: &Scalar) -> Result<secp256k1::PublicKey> {
    point
        .mul_tweak(secp(), x)
        .map_err(|_| SphinxError::InvalidKeyEncoding)
}

/// Multiply the generator by `x`.
pub fn exp_g(x: &secp256k1::SecretKey) -> secp256k1::PublicKey {
    secp256k1::PublicKey::from_secret_key(secp(), x)
}

fn scalar_from_hash(h: &[u8; HASH_SIZE]) -> Result<Scalar> {
    Scalar::from_be_bytes(*h).map_err(|_| SphinxError::InvalidKeyEncoding)
}

/// A compressed secp256k1 point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key: secp256k1::PublicKey,
}

impl PublicKey {
    pub fn from_bytes(b: &[u8]) -> Result<PublicKey> {
        if b.len() != PUBLIC_KEY_SIZE {
            return Err(SphinxError::InvalidKeyEncoding);
        }
        let key = secp256k1::PublicKey::from_slice(b).map_err(|_| SphinxError::InvalidKeyEncoding)?;
        Ok(PublicKey { key })
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.key.serialize()
    }

    /// Multiply this point by a 32 byte big endian scalar, usually a
    /// blinding factor. Returns a new key, the receiver is untouched.
    pub fn blind(&self, blinding_factor: &[u8; HASH_SIZE]) -> Result<PublicKey> {
        let tweak = scalar_from_hash(blinding_factor)?;
        Ok(PublicKey {
            key: exp(&self.key, &tweak)?,
        })
    }

    pub(crate) fn as_point(&self) -> &secp256k1::PublicKey {
        &self.key
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey(")?;
        for b in self.to_bytes().iter() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// A secp256k1 scalar along with its public key.
#[derive(Clone, Copy)]
pub struct PrivateKey {
    public_key: PublicKey,
    scalar: secp256k1::SecretKey,
}

impl PrivateKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> PrivateKey {
        loop {
            let mut raw = [0u8; PRIVATE_KEY_SIZE];
            rng.fill_bytes(&mut raw);
            // Out of range draws are astronomically rare, just draw again.
            if let Ok(key) = PrivateKey::from_bytes(&raw) {
                return key;
            }
        }
    }

    pub fn from_bytes(b: &[u8]) -> Result<PrivateKey> {
        if b.len() != PRIVATE_KEY_SIZE {
            return Err(SphinxError::InvalidKeyEncoding);
        }
        let scalar = secp256k1::SecretKey::from_slice(b).map_err(|_| SphinxError::InvalidKeyEncoding)?;
        Ok(PrivateKey {
            public_key: PublicKey { key: exp_g(&scalar) },
            scalar,
        })
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.scalar.secret_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Exp calculates the hashed shared secret with the provided public key,
    /// SHA256 over the compressed encoding of `public_key * self`.
    pub fn exp(&self, public_key: &PublicKey) -> Result<[u8; HASH_SIZE]> {
        let point = exp(public_key.as_point(), &Scalar::from(self.scalar))?;
        Ok(sha256(&[&point.serialize()[..]]))
    }

    /// Multiply this scalar by a 32 byte big endian factor modulo the
    /// curve order.
    pub fn blind(&self, blinding_factor: &[u8; HASH_SIZE]) -> Result<PrivateKey> {
        let tweak = scalar_from_hash(blinding_factor)?;
        let scalar = self
            .scalar
            .mul_tweak(&tweak)
            .map_err(|_| SphinxError::InvalidKeyEncoding)?;
        Ok(PrivateKey {
            public_key: PublicKey { key: exp_g(&scalar) },
            scalar,
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
