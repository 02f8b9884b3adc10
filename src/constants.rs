// constants.rs - sphinx onion packet format constants
// Copyright (C) 2018  David Anthony Stainton.
//
// MIT License
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

/// The version byte written by packet construction.
pub const PACKET_VERSION: u8 = 0;

/// The size of the version field in bytes.
pub const VERSION_SIZE: usize = 1;

/// The size of a compressed secp256k1 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 33;

/// The size of a secp256k1 private key in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// The size of a per hop shared secret in bytes.
pub const SHARED_SECRET_SIZE: usize = 32;

/// The size of an HMAC-SHA256 tag in bytes.
pub const HMAC_SIZE: usize = 32;

/// The size of the encrypted per hop payload region. This never
/// changes between hops, which hides the route length.
pub const HOP_PAYLOADS_SIZE: usize = 1300;

/// The size of a serialized onion packet in bytes.
pub const PACKET_SIZE: usize = VERSION_SIZE + PUBLIC_KEY_SIZE + HOP_PAYLOADS_SIZE + HMAC_SIZE;

/// Field offsets within a serialized onion packet.
pub const PUBLIC_KEY_OFFSET: usize = VERSION_SIZE;
pub const HOP_PAYLOADS_OFFSET: usize = PUBLIC_KEY_OFFSET + PUBLIC_KEY_SIZE;
pub const HMAC_OFFSET: usize = HOP_PAYLOADS_OFFSET + HOP_PAYLOADS_SIZE;

/// The size of a legacy hop payload body.
pub const LEGACY_PAYLOAD_SIZE: usize = 32;

/// The size of a legacy hop payload on the wire, realm byte included.
pub const LEGACY_WIRE_SIZE: usize = 1 + LEGACY_PAYLOAD_SIZE;

/// The leading byte which selects legacy framing.
pub const LEGACY_REALM: u8 = 0;

/// The size of a short channel identifier in bytes.
pub const SHORT_CHANNEL_ID_SIZE: usize = 8;

/// The size of a payment secret in bytes.
pub const PAYMENT_SECRET_SIZE: usize = 32;

/// The stream cipher is always keyed freshly per hop, so the nonce is fixed.
pub const STREAM_NONCE: [u8; 8] = [0u8; 8];

/// Key derivation tags.
pub const RHO_KEY_TAG: &[u8] = b"rho";
pub const MU_KEY_TAG: &[u8] = b"mu";
pub const UM_KEY_TAG: &[u8] = b"um";

/// TLV record types understood by the hop payload codec.
pub const AMOUNT_TO_FORWARD_TYPE: u64 = 2;
pub const OUTGOING_CLTV_VALUE_TYPE: u64 = 4;
pub const SHORT_CHANNEL_ID_TYPE: u64 = 6;
pub const PAYMENT_DATA_TYPE: u64 = 8;

/// TLV types at or above this value are custom extension records.
pub const CUSTOM_RECORD_TYPE_MIN: u64 = 1 << 16;
