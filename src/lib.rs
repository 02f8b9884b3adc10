// lib.rs - The Sphinx cryptographic packet library
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


//! An implementation of the Sphinx onion packet format used for
//! source routed payments.
//!
//! # The Onion Packet
//!
//! A sender layers one encrypted forwarding instruction per hop into a
//! fixed size packet. Each relay can decrypt exactly its own layer, check
//! its integrity and forward the unreadable remainder.
//!
//! * constant 1366 byte packets, whatever the route length
//! * per hop unlinkability through ephemeral key blinding
//! * hidden route length and relay position
//! * tamper detection with per hop HMACs over optional associated data
//! * re-wrapping an existing packet inside a new outer route
//!
//! # Example
//!
//! ```
//! use bolt04_sphinx::client::{new_packet, PathHop};
//! use bolt04_sphinx::ecdh::PrivateKey;
//! use bolt04_sphinx::hop_payload::{HopPayload, TlvPayload};
//! use bolt04_sphinx::server::{peel_onion, KeyMaterial};
//!
//! let mut rng = rand::rngs::OsRng;
//! let session_key = PrivateKey::generate(&mut rng);
//! let relay = PrivateKey::generate(&mut rng);
//! let recipient = PrivateKey::generate(&mut rng);
//! let path = vec![
//!     PathHop {
//!         public_key: relay.public_key(),
//!         payload: HopPayload::legacy(Some(&[0, 0, 1, 0, 0, 2, 0, 3][..]), 1000, 150).unwrap(),
//!     },
//!     PathHop {
//!         public_key: recipient.public_key(),
//!         payload: TlvPayload::new(1000, 144).into(),
//!     },
//! ];
//! let packet = new_packet(&session_key, &path, Some(&[0x42; 32][..])).unwrap();
//!
//! let hop = peel_onion(&packet, KeyMaterial::PrivateKey(&relay), Some(&[0x42; 32][..])).unwrap();
//! let next = hop.next.unwrap();
//! let last = peel_onion(&next, KeyMaterial::PrivateKey(&recipient), Some(&[0x42; 32][..])).unwrap();
//! assert!(last.is_final());
//! assert_eq!(last.payload.outgoing_cltv_value(), 144);
//! ```
//!
//! **BOLT #4: Onion Routing Protocol**\
//! https://github.com/lightning/bolts/blob/master/04-onion-routing.md
//!
//! **Sphinx: A Compact and Provably Secure Mix Format**\
//! https://cypherpunks.ca/~iang/pubs/Sphinx_Oakland09.pdf

#[macro_use]
extern crate arrayref;

pub mod client;
pub mod constants;
pub mod ecdh;
pub mod error;
pub mod filler;
pub mod hop_payload;
pub mod server;
pub mod shared_secret;
pub mod sphinx;
pub mod tlv;

mod internal_crypto;
mod utils;

pub use client::{construct_onion, new_packet, rewrap_onion, PathHop};
pub use error::{Result, SphinxError};
pub use hop_payload::HopPayload;
pub use server::{peel_onion, KeyMaterial, PeeledHop};
pub use shared_secret::SharedSecret;
pub use sphinx::OnionPacket;
