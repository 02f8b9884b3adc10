// client.rs - sphinx onion packet construction
// Copyright (C) 2018  David Stainton.

//! Sender side operations: building an onion from per hop secrets and
//! payloads, and wrapping an existing onion inside a new outer route.

use tracing::debug;

use super::constants::{HMAC_SIZE, HOP_PAYLOADS_SIZE, PACKET_VERSION};
use super::ecdh::{PrivateKey, PublicKey};
use super::error::Result;
use super::hop_payload::HopPayload;
use super::shared_secret::{derive_route_secrets, SharedSecret};
use super::sphinx::{wrap_layers, OnionPacket};

/// A single hop of a route as known to the sender.
#[derive(Clone, Debug)]
pub struct PathHop {
    pub public_key: PublicKey,
    pub payload: HopPayload,
}

/// Build an onion packet.
///
/// # Arguments
///
/// * `shared_secrets` - one secret per hop, in route order
/// * `payloads` - one payload per hop, in route order
/// * `first_hop_public_key` - the ephemeral public key the first hop sees
/// * `associated_data` - optional data covered by every hop's HMAC
///
/// # Errors
///
/// * `SphinxError::InvalidArgument` - empty route, mismatched lengths, or
///   payloads which do not fit in the packet
pub fn construct_onion(
    shared_secrets: &[SharedSecret],
    payloads: &[HopPayload],
    first_hop_public_key: &PublicKey,
    associated_data: Option<&[u8]>,
) -> Result<OnionPacket> {
    let (hop_payloads, hmac) = wrap_layers(
        shared_secrets,
        payloads,
        associated_data,
        [0u8; HOP_PAYLOADS_SIZE],
        [0u8; HMAC_SIZE],
    )?;
    debug!(hops = payloads.len(), "constructed onion");
    Ok(OnionPacket {
        version: PACKET_VERSION,
        ephemeral_public_key: first_hop_public_key.to_bytes(),
        hop_payloads,
        hmac,
    })
}

/// Wrap `inner_packet` in a new outer route.
///
/// The outer layers are built exactly as `construct_onion` builds them but
/// start from the inner packet's payload region and HMAC, so the inner
/// packet's construction secrets are never needed. Peeling the last outer
/// hop yields the inner packet's HMAC unchanged, along with the front of
/// its payload region. The outer hops take their space from the end of
/// that region, so only its first `HOP_PAYLOADS_SIZE` minus the outer
/// route size bytes survive. The inner ephemeral key is not part of the
/// region; carry it in the last outer hop's payload if the exit needs it.
pub fn rewrap_onion(
    shared_secrets: &[SharedSecret],
    payloads: &[HopPayload],
    first_hop_public_key: &PublicKey,
    associated_data: Option<&[u8]>,
    inner_packet: &OnionPacket,
) -> Result<OnionPacket> {
    let (hop_payloads, hmac) = wrap_layers(
        shared_secrets,
        payloads,
        associated_data,
        inner_packet.hop_payloads,
        inner_packet.hmac,
    )?;
    debug!(hops = payloads.len(), "rewrapped onion");
    Ok(OnionPacket {
        version: PACKET_VERSION,
        ephemeral_public_key: first_hop_public_key.to_bytes(),
        hop_payloads,
        hmac,
    })
}

/// Derive the route secrets from a session key and build the onion.
pub fn new_packet(session_key: &PrivateKey, path: &[PathHop], associated_data: Option<&[u8]>) -> Result<OnionPacket> {
    let public_keys: Vec<PublicKey> = path.iter().map(|hop| hop.public_key).collect();
    let payloads: Vec<HopPayload> = path.iter().map(|hop| hop.payload.clone()).collect();
    let shared_secrets = derive_route_secrets(session_key, &public_keys)?;
    construct_onion(&shared_secrets, &payloads, &session_key.public_key(), associated_data)
}
