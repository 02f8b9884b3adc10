// tlv.rs - TLV record stream encoding
// Copyright (C) 2018  David Stainton.

//! BigSize varints, minimal width integers and TLV record streams.

use byteorder::{BigEndian, ByteOrder};

use super::error::{Result, SphinxError};

/// A single type-length-value record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlvRecord {
    pub tlv_type: u64,
    pub value: Vec<u8>,
}

impl TlvRecord {
    pub fn new(tlv_type: u64, value: Vec<u8>) -> TlvRecord {
        TlvRecord { tlv_type, value }
    }

    fn encoded_len(&self) -> usize {
        bigsize_len(self.tlv_type) + bigsize_len(self.value.len() as u64) + self.value.len()
    }
}

pub fn bigsize_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

pub fn write_bigsize(out: &mut Vec<u8>, n: u64) {
    match bigsize_len(n) {
        1 => out.push(n as u8),
        3 => {
            out.push(0xfd);
            let mut b = [0u8; 2];
            BigEndian::write_u16(&mut b, n as u16);
            out.extend_from_slice(&b);
        }
        5 => {
            out.push(0xfe);
            let mut b = [0u8; 4];
            BigEndian::write_u32(&mut b, n as u32);
            out.extend_from_slice(&b);
        }
        _ => {
            out.push(0xff);
            let mut b = [0u8; 8];
            BigEndian::write_u64(&mut b, n);
            out.extend_from_slice(&b);
        }
    }
}

/// Read a canonically encoded BigSize, returning the value and the number
/// of bytes consumed.
pub fn read_bigsize(b: &[u8]) -> Result<(u64, usize)> {
    let first = *b.first().ok_or(SphinxError::MalformedPayload("truncated bigsize"))?;
    let (value, len) = match first {
        0xfd => (BigEndian::read_u16(take(b, 1, 2)?) as u64, 3),
        0xfe => (BigEndian::read_u32(take(b, 1, 4)?) as u64, 5),
        0xff => (BigEndian::read_u64(take(b, 1, 8)?), 9),
        n => (n as u64, 1),
    };
    if bigsize_len(value) != len {
        return Err(SphinxError::MalformedPayload("non-canonical bigsize"));
    }
    Ok((value, len))
}

fn take(b: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    b.get(offset..offset + len)
        .ok_or(SphinxError::MalformedPayload("truncated bigsize"))
}

/// Big endian with leading zero bytes stripped. Zero encodes as nothing.
pub fn encode_tu64(n: u64) -> Vec<u8> {
    let mut b = [0u8; 8];
    BigEndian::write_u64(&mut b, n);
    let skip = (n.leading_zeros() / 8) as usize;
    b[skip..].to_vec()
}

pub fn decode_tu64(b: &[u8]) -> Result<u64> {
    if b.len() > 8 {
        return Err(SphinxError::MalformedPayload("truncated integer too long"));
    }
    if b.first() == Some(&0) {
        return Err(SphinxError::MalformedPayload("truncated integer not minimal"));
    }
    Ok(b.iter().fold(0u64, |acc, &x| (acc << 8) | x as u64))
}

pub fn encode_tu32(n: u32) -> Vec<u8> {
    encode_tu64(n as u64)
}

pub fn decode_tu32(b: &[u8]) -> Result<u32> {
    if b.len() > 4 {
        return Err(SphinxError::MalformedPayload("truncated integer too long"));
    }
    Ok(decode_tu64(b)? as u32)
}

/// Size of a record stream once encoded.
pub fn stream_len(records: &[TlvRecord]) -> usize {
    records.iter().map(TlvRecord::encoded_len).sum()
}

/// Encode records in the order given. Callers keep them sorted by type.
pub fn encode_stream(records: &[TlvRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(stream_len(records));
    for record in records {
        write_bigsize(&mut out, record.tlv_type);
        write_bigsize(&mut out, record.value.len() as u64);
        out.extend_from_slice(&record.value);
    }
    out
}

/// Decode a whole record stream. Types must be strictly increasing.
pub fn decode_stream(mut b: &[u8]) -> Result<Vec<TlvRecord>> {
    let mut records: Vec<TlvRecord> = Vec::new();
    while !b.is_empty() {
        let (tlv_type, n) = read_bigsize(b)?;
        b = &b[n..];
        let (len, n) = read_bigsize(b)?;
        b = &b[n..];
        if len > b.len() as u64 {
            return Err(SphinxError::MalformedPayload("truncated TLV value"));
        }
        let (value, rest) = b.split_at(len as usize);
        if let Some(last) = records.last() {
            if tlv_type <= last.tlv_type {
                return Err(SphinxError::MalformedPayload("TLV types not strictly increasing"));
            }
        }
        records.push(TlvRecord::new(tlv_type, value.to_vec()));
        b = rest;
    }
    Ok(records)
}
