// error.rs - Sphinx error types
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

/// Errors produced while building, parsing or peeling onion packets.
///
/// None of these are transient. Retrying an operation with the same
/// inputs after any of them will fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SphinxError {
    /// A public or private key could not be decoded, or a blinding
    /// operation produced an invalid key.
    #[error("invalid key encoding")]
    InvalidKeyEncoding,

    /// Caller supplied arguments which can never produce a valid packet.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialized packet had the wrong total length.
    #[error("malformed packet: expected 1366 bytes, got {length}")]
    MalformedPacket { length: usize },

    /// A hop payload could not be decoded.
    #[error("malformed hop payload: {0}")]
    MalformedPayload(&'static str),

    /// The packet HMAC did not verify. This means tampering, the wrong
    /// key or a misrouted packet.
    #[error("HMAC mismatch")]
    HmacMismatch,

    /// A TLV record type which is neither understood nor allowed to pass
    /// through.
    #[error("unsupported TLV record type {tlv_type}")]
    UnsupportedEncoding { tlv_type: u64 },

    /// The stream cipher could not produce the requested keystream.
    #[error("stream cipher keystream exhausted")]
    KeystreamExhausted,
}

pub type Result<T> = std::result::Result<T, SphinxError>;
