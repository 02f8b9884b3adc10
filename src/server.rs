// server.rs - Sphinx server side function(s)
// Copyright (C) 2018  David Anthony Stainton.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Relay side packet processing.
//!
//! A relay checks the HMAC over the encrypted payload region, decrypts the
//! region after appending 1300 zero bytes, reads its own payload and the
//! next HMAC off the front, and passes the following 1300 bytes on with a
//! blinded ephemeral key. An all zero next HMAC marks the final hop.

use tracing::{debug, trace};

use super::constants::{HMAC_SIZE, HOP_PAYLOADS_SIZE};
use super::ecdh::PrivateKey;
use super::error::{Result, SphinxError};
use super::hop_payload::HopPayload;
use super::internal_crypto::{hmac, hmac_eq, stream};
use super::shared_secret::{derive_hop_secret, derive_subkey, next_ephemeral_public_key, KeyType, SharedSecret};
use super::sphinx::{to_array, OnionPacket};
use super::utils::xor;

/// The key material a relay peels with. Either its private key, from which
/// the shared secret is derived against the packet's ephemeral key, or a
/// shared secret it already has.
#[derive(Clone, Copy, Debug)]
pub enum KeyMaterial<'a> {
    PrivateKey(&'a PrivateKey),
    SharedSecret(&'a SharedSecret),
}

/// The result of peeling one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeeledHop {
    /// this hop's forwarding instructions
    pub payload: HopPayload,
    /// the packet to forward, `None` at the final hop
    pub next: Option<OnionPacket>,
}

impl PeeledHop {
    pub fn is_final(&self) -> bool {
        self.next.is_none()
    }
}

/// unwrap a layer of sphinx packet encryption
///
/// # Arguments
///
/// * `packet` - an onion packet
/// * `key_material` - the relay's private key or its shared secret
/// * `associated_data` - the data the sender bound to every HMAC
///
/// # Errors
///
/// * `SphinxError::InvalidKeyEncoding` - the packet's ephemeral key is not a valid point
/// * `SphinxError::HmacMismatch` - tampering, the wrong key or a misrouted packet
/// * `SphinxError::MalformedPayload` / `UnsupportedEncoding` - the decrypted payload is unusable
pub fn peel_onion(packet: &OnionPacket, key_material: KeyMaterial, associated_data: Option<&[u8]>) -> Result<PeeledHop> {
    let shared_secret = match key_material {
        KeyMaterial::PrivateKey(private_key) => derive_hop_secret(private_key, &packet.ephemeral_key()?)?,
        KeyMaterial::SharedSecret(secret) => *secret,
    };

    let rho = derive_subkey(&shared_secret, KeyType::Rho);
    let mu = derive_subkey(&shared_secret, KeyType::Mu);

    let mac = hmac(&mu, &packet.hop_payloads, associated_data);
    if !hmac_eq(&mac, &packet.hmac) {
        debug!("onion HMAC mismatch");
        return Err(SphinxError::HmacMismatch);
    }

    let mut padded = packet.hop_payloads.to_vec();
    padded.extend_from_slice(&[0u8; HOP_PAYLOADS_SIZE]);
    let decrypted = xor(&padded, &stream(&rho, 2 * HOP_PAYLOADS_SIZE)?);

    let payload = HopPayload::from_sphinx_bytes(&decrypted).map_err(|e| {
        debug!(error = %e, "undecodable hop payload");
        e
    })?;
    let payload_size = payload.sphinx_size();
    let next_offset = payload_size + HMAC_SIZE;
    if next_offset > HOP_PAYLOADS_SIZE {
        debug!(payload_size, "hop payload overruns the payload region");
        return Err(SphinxError::MalformedPayload("hop payload too large"));
    }
    let next_hmac: [u8; HMAC_SIZE] = to_array(&decrypted[payload_size..next_offset]);

    if next_hmac == [0u8; HMAC_SIZE] {
        trace!("final hop reached");
        return Ok(PeeledHop { payload, next: None });
    }

    let next_ephemeral_key = next_ephemeral_public_key(&packet.ephemeral_key()?, &shared_secret)?;
    let next = OnionPacket {
        version: packet.version,
        ephemeral_public_key: next_ephemeral_key.to_bytes(),
        hop_payloads: to_array(&decrypted[next_offset..next_offset + HOP_PAYLOADS_SIZE]),
        hmac: next_hmac,
    };
    Ok(PeeledHop {
        payload,
        next: Some(next),
    })
}
