// sphinx.rs - sphinx onion packet format
// Copyright (C) 2018  David Stainton.

use std::fmt;

use tracing::trace;

use super::constants::{HMAC_SIZE, HOP_PAYLOADS_SIZE, PACKET_SIZE, PUBLIC_KEY_SIZE};
use super::ecdh::PublicKey;
use super::error::{Result, SphinxError};
use super::filler::generate_filler;
use super::hop_payload::HopPayload;
use super::internal_crypto::{hmac, stream};
use super::shared_secret::{derive_subkey, KeyType, SharedSecret};
use super::utils::{shift_right, xor};

/// An onion packet. Peeling never modifies a packet, it yields a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct OnionPacket {
    pub version: u8,
    pub ephemeral_public_key: [u8; PUBLIC_KEY_SIZE],
    pub hop_payloads: [u8; HOP_PAYLOADS_SIZE],
    pub hmac: [u8; HMAC_SIZE],
}

impl OnionPacket {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PACKET_SIZE);
        out.push(self.version);
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.hop_payloads);
        out.extend_from_slice(&self.hmac);
        out
    }

    pub fn from_bytes(b: &[u8]) -> Result<OnionPacket> {
        if b.len() != PACKET_SIZE {
            return Err(SphinxError::MalformedPacket { length: b.len() });
        }
        let b = array_ref![b, 0, PACKET_SIZE];
        let (version, ephemeral_public_key, hop_payloads, hmac) =
            array_refs![b, 1, PUBLIC_KEY_SIZE, HOP_PAYLOADS_SIZE, HMAC_SIZE];
        Ok(OnionPacket {
            version: version[0],
            ephemeral_public_key: *ephemeral_public_key,
            hop_payloads: *hop_payloads,
            hmac: *hmac,
        })
    }

    pub fn ephemeral_key(&self) -> Result<PublicKey> {
        PublicKey::from_bytes(&self.ephemeral_public_key)
    }
}

impl fmt::Debug for OnionPacket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OnionPacket")
            .field("version", &self.version)
            .field("ephemeral_public_key", &self.ephemeral_public_key)
            .field("hmac", &self.hmac)
            .finish_non_exhaustive()
    }
}

pub(crate) fn to_array<const N: usize>(b: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(b);
    out
}

/// Fold the hops into `hop_payloads`, innermost first, and return the
/// wrapped payload region along with the HMAC the first hop will check.
///
/// A fresh onion starts from zeros and an all zero HMAC, which is how the
/// final hop recognizes itself. Re-wrapping starts from an existing
/// packet's region and HMAC instead.
pub(crate) fn wrap_layers(
    shared_secrets: &[SharedSecret],
    payloads: &[HopPayload],
    associated_data: Option<&[u8]>,
    hop_payloads: [u8; HOP_PAYLOADS_SIZE],
    hmac_seed: [u8; HMAC_SIZE],
) -> Result<([u8; HOP_PAYLOADS_SIZE], [u8; HMAC_SIZE])> {
    let filler = generate_filler(shared_secrets, payloads)?;

    let mut packet = hop_payloads.to_vec();
    let mut next_hmac = hmac_seed;
    for i in (0..shared_secrets.len()).rev() {
        trace!(round = i, "onion round");
        let rho = derive_subkey(&shared_secrets[i], KeyType::Rho);
        let mu = derive_subkey(&shared_secrets[i], KeyType::Mu);

        let mut hop_data = payloads[i].to_sphinx_bytes();
        hop_data.extend_from_slice(&next_hmac);
        let shifted = shift_right(&packet, &hop_data);

        packet = xor(&shifted, &stream(&rho, HOP_PAYLOADS_SIZE)?);
        if i == shared_secrets.len() - 1 {
            let tail = HOP_PAYLOADS_SIZE - filler.len();
            packet[tail..].copy_from_slice(&filler);
        }
        next_hmac = hmac(&mu, &packet, associated_data);
    }
    Ok((to_array(&packet), next_hmac))
}
