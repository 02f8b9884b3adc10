// filler.rs - sphinx filler generation
// Copyright (C) 2018  David Stainton.

use tracing::trace;

use super::constants::{HMAC_SIZE, HOP_PAYLOADS_SIZE};
use super::error::{Result, SphinxError};
use super::hop_payload::HopPayload;
use super::internal_crypto::stream;
use super::shared_secret::{derive_subkey, KeyType, SharedSecret};
use super::utils::xor_assign;

/// Generate the filler which the final layer carries at its tail.
///
/// Every relay appends zeros before decrypting and so exposes keystream at
/// the end of the next hop's payload region. The filler is exactly that
/// accumulated keystream, so the tail looks the same whatever the route
/// length. Its length is the sum of every hop's payload and HMAC size
/// except the last.
pub fn generate_filler(shared_secrets: &[SharedSecret], payloads: &[HopPayload]) -> Result<Vec<u8>> {
    if shared_secrets.len() != payloads.len() || payloads.is_empty() {
        return Err(SphinxError::InvalidArgument(format!(
            "need one payload per shared secret, got {} secrets and {} payloads",
            shared_secrets.len(),
            payloads.len()
        )));
    }
    let hop_sizes: Vec<usize> = payloads.iter().map(|p| p.sphinx_size() + HMAC_SIZE).collect();
    let total: usize = hop_sizes.iter().sum();
    if total > HOP_PAYLOADS_SIZE {
        return Err(SphinxError::InvalidArgument(format!(
            "route needs {} bytes but only {} are available",
            total, HOP_PAYLOADS_SIZE
        )));
    }
    let filler_size = total - hop_sizes[hop_sizes.len() - 1];
    let mut filler = vec![0u8; filler_size];

    let mut trailing_payload_size = 0;
    for (i, (secret, &hop_size)) in shared_secrets.iter().zip(hop_sizes.iter()).enumerate() {
        if i == shared_secrets.len() - 1 {
            break;
        }
        trace!(round = i, trailing_payload_size, "filler round");
        let rho = derive_subkey(secret, KeyType::Rho);
        let keystream = stream(&rho, 2 * HOP_PAYLOADS_SIZE)?;
        let start = HOP_PAYLOADS_SIZE - trailing_payload_size;
        let end = HOP_PAYLOADS_SIZE + hop_size;
        let window = end - start;
        xor_assign(&mut filler[..window], &keystream[start..end]);
        trailing_payload_size += hop_size;
    }
    Ok(filler)
}
