// hop_payload.rs - per hop forwarding instructions
// Copyright (C) 2018  David Stainton.

//! Per hop payloads.
//!
//! A payload is either the fixed 32 byte legacy body behind a zero realm
//! byte, or a BigSize length prefixed TLV stream. The first byte is the
//! only discriminator between the two framings.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use super::constants::{
    AMOUNT_TO_FORWARD_TYPE, CUSTOM_RECORD_TYPE_MIN, LEGACY_PAYLOAD_SIZE, LEGACY_REALM, LEGACY_WIRE_SIZE,
    OUTGOING_CLTV_VALUE_TYPE, PAYMENT_DATA_TYPE, PAYMENT_SECRET_SIZE, SHORT_CHANNEL_ID_SIZE,
    SHORT_CHANNEL_ID_TYPE,
};
use super::error::{Result, SphinxError};
use super::tlv::{
    bigsize_len, decode_stream, decode_tu32, decode_tu64, encode_stream, encode_tu32, encode_tu64,
    read_bigsize, stream_len, write_bigsize, TlvRecord,
};

/// The 8 byte identifier of the outgoing channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortChannelId([u8; SHORT_CHANNEL_ID_SIZE]);

impl ShortChannelId {
    pub fn from_u64(id: u64) -> ShortChannelId {
        let mut raw = [0u8; SHORT_CHANNEL_ID_SIZE];
        BigEndian::write_u64(&mut raw, id);
        ShortChannelId(raw)
    }

    pub fn to_u64(&self) -> u64 {
        BigEndian::read_u64(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SHORT_CHANNEL_ID_SIZE] {
        &self.0
    }

    pub fn block_height(&self) -> u32 {
        (self.to_u64() >> 40) as u32
    }

    pub fn tx_index(&self) -> u32 {
        ((self.to_u64() >> 16) & 0xff_ffff) as u32
    }

    pub fn output_index(&self) -> u16 {
        self.to_u64() as u16
    }
}

impl TryFrom<&[u8]> for ShortChannelId {
    type Error = SphinxError;

    fn try_from(b: &[u8]) -> Result<ShortChannelId> {
        if b.len() != SHORT_CHANNEL_ID_SIZE {
            return Err(SphinxError::InvalidArgument(format!(
                "channel id must be {} bytes, got {}",
                SHORT_CHANNEL_ID_SIZE,
                b.len()
            )));
        }
        let mut raw = [0u8; SHORT_CHANNEL_ID_SIZE];
        raw.copy_from_slice(b);
        Ok(ShortChannelId(raw))
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}x{}", self.block_height(), self.tx_index(), self.output_index())
    }
}

impl fmt::Debug for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ShortChannelId({})", self)
    }
}

/// Final hop payment data, TLV type 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentData {
    pub payment_secret: [u8; PAYMENT_SECRET_SIZE],
    pub total_msat: u64,
}

impl PaymentData {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.payment_secret.to_vec();
        out.extend(encode_tu64(self.total_msat));
        out
    }

    fn from_bytes(b: &[u8]) -> Result<PaymentData> {
        if b.len() < PAYMENT_SECRET_SIZE {
            return Err(SphinxError::MalformedPayload("truncated payment data"));
        }
        let (secret, total) = b.split_at(PAYMENT_SECRET_SIZE);
        let mut payment_secret = [0u8; PAYMENT_SECRET_SIZE];
        payment_secret.copy_from_slice(secret);
        Ok(PaymentData {
            payment_secret,
            total_msat: decode_tu64(total)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyPayload {
    /// `None` travels as eight zero bytes.
    pub short_channel_id: Option<ShortChannelId>,
    pub amount_to_forward: u64,
    pub outgoing_cltv_value: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlvPayload {
    pub amount_to_forward: u64,
    pub outgoing_cltv_value: u32,
    pub short_channel_id: Option<ShortChannelId>,
    pub payment_data: Option<PaymentData>,
    /// Records this codec does not interpret, kept verbatim and ordered by type.
    extra_records: Vec<TlvRecord>,
}

/// Whether an uninterpreted record type may be carried through.
fn is_pass_through(tlv_type: u64) -> bool {
    tlv_type % 2 == 1 || tlv_type >= CUSTOM_RECORD_TYPE_MIN
}

fn is_known(tlv_type: u64) -> bool {
    matches!(
        tlv_type,
        AMOUNT_TO_FORWARD_TYPE | OUTGOING_CLTV_VALUE_TYPE | SHORT_CHANNEL_ID_TYPE | PAYMENT_DATA_TYPE
    )
}

impl TlvPayload {
    pub fn new(amount_to_forward: u64, outgoing_cltv_value: u32) -> TlvPayload {
        TlvPayload {
            amount_to_forward,
            outgoing_cltv_value,
            short_channel_id: None,
            payment_data: None,
            extra_records: Vec::new(),
        }
    }

    pub fn with_short_channel_id(mut self, short_channel_id: ShortChannelId) -> TlvPayload {
        self.short_channel_id = Some(short_channel_id);
        self
    }

    pub fn with_payment_data(mut self, payment_data: PaymentData) -> TlvPayload {
        self.payment_data = Some(payment_data);
        self
    }

    /// Attach an extension record to be carried opaquely.
    pub fn with_record(mut self, record: TlvRecord) -> Result<TlvPayload> {
        if is_known(record.tlv_type) {
            return Err(SphinxError::InvalidArgument(format!(
                "TLV type {} is a known field",
                record.tlv_type
            )));
        }
        if !is_pass_through(record.tlv_type) {
            return Err(SphinxError::UnsupportedEncoding {
                tlv_type: record.tlv_type,
            });
        }
        match self
            .extra_records
            .binary_search_by_key(&record.tlv_type, |r| r.tlv_type)
        {
            Ok(_) => Err(SphinxError::InvalidArgument(format!(
                "duplicate TLV type {}",
                record.tlv_type
            ))),
            Err(i) => {
                self.extra_records.insert(i, record);
                Ok(self)
            }
        }
    }

    pub fn extra_records(&self) -> &[TlvRecord] {
        &self.extra_records
    }

    fn records(&self) -> Vec<TlvRecord> {
        let mut records = vec![
            TlvRecord::new(AMOUNT_TO_FORWARD_TYPE, encode_tu64(self.amount_to_forward)),
            TlvRecord::new(OUTGOING_CLTV_VALUE_TYPE, encode_tu32(self.outgoing_cltv_value)),
        ];
        if let Some(scid) = self.short_channel_id {
            records.push(TlvRecord::new(SHORT_CHANNEL_ID_TYPE, scid.as_bytes().to_vec()));
        }
        if let Some(data) = self.payment_data {
            records.push(TlvRecord::new(PAYMENT_DATA_TYPE, data.to_bytes()));
        }
        records.extend(self.extra_records.iter().cloned());
        records.sort_by_key(|r| r.tlv_type);
        records
    }

    fn from_records(records: Vec<TlvRecord>) -> Result<TlvPayload> {
        let mut amount_to_forward = None;
        let mut outgoing_cltv_value = None;
        let mut short_channel_id = None;
        let mut payment_data = None;
        let mut extra_records = Vec::new();

        for record in records {
            let tlv_type = record.tlv_type;
            match tlv_type {
                AMOUNT_TO_FORWARD_TYPE => amount_to_forward = Some(decode_tu64(&record.value)?),
                OUTGOING_CLTV_VALUE_TYPE => outgoing_cltv_value = Some(decode_tu32(&record.value)?),
                SHORT_CHANNEL_ID_TYPE => {
                    let scid = ShortChannelId::try_from(&record.value[..])
                        .map_err(|_| SphinxError::MalformedPayload("bad short channel id length"))?;
                    short_channel_id = Some(scid);
                }
                PAYMENT_DATA_TYPE => payment_data = Some(PaymentData::from_bytes(&record.value)?),
                t if is_pass_through(t) => extra_records.push(record),
                t => {
                    debug!(tlv_type = t, "unknown even TLV type in hop payload");
                    return Err(SphinxError::UnsupportedEncoding { tlv_type: t });
                }
            }
        }

        Ok(TlvPayload {
            amount_to_forward: amount_to_forward.ok_or(SphinxError::MalformedPayload("missing amount_to_forward"))?,
            outgoing_cltv_value: outgoing_cltv_value
                .ok_or(SphinxError::MalformedPayload("missing outgoing_cltv_value"))?,
            short_channel_id,
            payment_data,
            extra_records,
        })
    }
}

/// The forwarding instructions for a single hop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HopPayload {
    Legacy(LegacyPayload),
    Tlv(TlvPayload),
}

impl HopPayload {
    /// Build a legacy payload. `channel_id` must be exactly 8 bytes if given.
    ///
    /// The wire form cannot tell an absent channel id from eight zero bytes,
    /// so an all zero `channel_id` is stored as `None`.
    pub fn legacy(channel_id: Option<&[u8]>, amount_to_forward: u64, outgoing_cltv_value: u32) -> Result<HopPayload> {
        let short_channel_id = channel_id
            .map(ShortChannelId::try_from)
            .transpose()?
            .filter(|scid| scid.to_u64() != 0);
        Ok(HopPayload::Legacy(LegacyPayload {
            short_channel_id,
            amount_to_forward,
            outgoing_cltv_value,
        }))
    }

    pub fn amount_to_forward(&self) -> u64 {
        match self {
            HopPayload::Legacy(p) => p.amount_to_forward,
            HopPayload::Tlv(p) => p.amount_to_forward,
        }
    }

    pub fn outgoing_cltv_value(&self) -> u32 {
        match self {
            HopPayload::Legacy(p) => p.outgoing_cltv_value,
            HopPayload::Tlv(p) => p.outgoing_cltv_value,
        }
    }

    pub fn short_channel_id(&self) -> Option<ShortChannelId> {
        match self {
            HopPayload::Legacy(p) => p.short_channel_id,
            HopPayload::Tlv(p) => p.short_channel_id,
        }
    }

    /// The number of bytes this payload occupies inside the onion.
    pub fn sphinx_size(&self) -> usize {
        match self {
            HopPayload::Legacy(_) => LEGACY_WIRE_SIZE,
            HopPayload::Tlv(p) => {
                let len = stream_len(&p.records());
                bigsize_len(len as u64) + len
            }
        }
    }

    /// The payload as it sits inside the onion, framing included.
    pub fn to_sphinx_bytes(&self) -> Vec<u8> {
        match self {
            HopPayload::Legacy(p) => {
                let mut out = vec![0u8; LEGACY_WIRE_SIZE];
                out[0] = LEGACY_REALM;
                let body = &mut out[1..];
                if let Some(scid) = p.short_channel_id {
                    body[..8].copy_from_slice(scid.as_bytes());
                }
                BigEndian::write_u64(&mut body[8..16], p.amount_to_forward);
                BigEndian::write_u32(&mut body[16..20], p.outgoing_cltv_value);
                // body[20..32] is padding and stays zero
                out
            }
            HopPayload::Tlv(p) => {
                let body = encode_stream(&p.records());
                // amount and cltv are always present, so the length prefix
                // can never collide with the legacy realm byte
                assert!(!body.is_empty());
                let mut out = Vec::with_capacity(bigsize_len(body.len() as u64) + body.len());
                write_bigsize(&mut out, body.len() as u64);
                out.extend_from_slice(&body);
                out
            }
        }
    }

    /// Parse a payload from the front of `b`. Trailing bytes are ignored;
    /// use `sphinx_size` on the result to find where the payload ends.
    pub fn from_sphinx_bytes(b: &[u8]) -> Result<HopPayload> {
        let first = *b.first().ok_or(SphinxError::MalformedPayload("empty hop payload"))?;
        if first == LEGACY_REALM {
            if b.len() < LEGACY_WIRE_SIZE {
                return Err(SphinxError::MalformedPayload("truncated legacy payload"));
            }
            let body = array_ref![b, 1, LEGACY_PAYLOAD_SIZE];
            let (channel_id, amount, cltv, _padding) = array_refs![body, 8, 8, 4, 12];
            let short_channel_id = if channel_id.iter().all(|&x| x == 0) {
                None
            } else {
                Some(ShortChannelId(*channel_id))
            };
            return Ok(HopPayload::Legacy(LegacyPayload {
                short_channel_id,
                amount_to_forward: BigEndian::read_u64(amount),
                outgoing_cltv_value: BigEndian::read_u32(cltv),
            }));
        }

        let (len, prefix) = read_bigsize(b)?;
        let end = (prefix as u64)
            .checked_add(len)
            .filter(|&end| end <= b.len() as u64)
            .ok_or(SphinxError::MalformedPayload("TLV payload overruns buffer"))?;
        let records = decode_stream(&b[prefix..end as usize])?;
        Ok(HopPayload::Tlv(TlvPayload::from_records(records)?))
    }
}

impl From<LegacyPayload> for HopPayload {
    fn from(p: LegacyPayload) -> HopPayload {
        HopPayload::Legacy(p)
    }
}

impl From<TlvPayload> for HopPayload {
    fn from(p: TlvPayload) -> HopPayload {
        HopPayload::Tlv(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_encoding_test() {
        let channel_id = hex::decode("0000010000020003").unwrap();
        let payload = HopPayload::legacy(Some(&channel_id[..]), 1000500, 650144).unwrap();
        let raw = payload.to_sphinx_bytes();
        assert_eq!(raw.len(), payload.sphinx_size());
        assert_eq!(
            hex::encode(&raw),
            "00000001000002000300000000000f44340009eba0000000000000000000000000"
        );
        assert_eq!(HopPayload::from_sphinx_bytes(&raw).unwrap(), payload);
    }

    #[test]
    fn legacy_channel_id_length_test() {
        let err = HopPayload::legacy(Some(&[1u8, 2, 3][..]), 1, 1).unwrap_err();
        assert!(matches!(err, SphinxError::InvalidArgument(_)));
    }

    #[test]
    fn legacy_padding_ignored_test() {
        let payload = HopPayload::legacy(None, 7, 9).unwrap();
        let mut raw = payload.to_sphinx_bytes();
        assert!(raw[21..].iter().all(|&x| x == 0));
        raw[25] = 0xff;
        raw.extend_from_slice(&[0xaa; 10]);
        assert_eq!(HopPayload::from_sphinx_bytes(&raw).unwrap(), payload);
    }

    #[test]
    fn legacy_zero_channel_id_test() {
        let zero = HopPayload::legacy(Some(&[0u8; 8][..]), 5, 6).unwrap();
        assert_eq!(zero, HopPayload::legacy(None, 5, 6).unwrap());
        assert_eq!(zero.short_channel_id(), None);
        let raw = zero.to_sphinx_bytes();
        assert!(raw[1..9].iter().all(|&x| x == 0));
        assert_eq!(HopPayload::from_sphinx_bytes(&raw).unwrap(), zero);
    }

    #[test]
    fn tlv_encoding_test() {
        let scid = ShortChannelId::try_from(&hex::decode("0000020000050001").unwrap()[..]).unwrap();
        let payload: HopPayload = TlvPayload::new(1000400, 650104).with_short_channel_id(scid).into();
        let raw = payload.to_sphinx_bytes();
        assert_eq!(hex::encode(&raw), "1402030f43d0040309eb7806080000020000050001");
        assert_eq!(raw.len(), payload.sphinx_size());
        assert_eq!(HopPayload::from_sphinx_bytes(&raw).unwrap(), payload);
    }

    #[test]
    fn tlv_extension_records_round_trip_test() {
        let payload: HopPayload = TlvPayload::new(1000000, 650000)
            .with_payment_data(PaymentData {
                payment_secret: [0x23; PAYMENT_SECRET_SIZE],
                total_msat: 1000000,
            })
            .with_record(TlvRecord::new(65537, vec![0xca, 0xfe]))
            .unwrap()
            .with_record(TlvRecord::new(5, vec![0x01, 0x02]))
            .unwrap()
            .into();
        let raw = payload.to_sphinx_bytes();
        let decoded = HopPayload::from_sphinx_bytes(&raw).unwrap();
        assert_eq!(decoded, payload);
        match decoded {
            HopPayload::Tlv(p) => {
                let types: Vec<u64> = p.extra_records().iter().map(|r| r.tlv_type).collect();
                assert_eq!(types, vec![5, 65537]);
                assert_eq!(p.extra_records()[1].value, vec![0xca, 0xfe]);
            }
            _ => panic!("expected a TLV payload"),
        }
    }

    #[test]
    fn tlv_record_rules_test() {
        let base = TlvPayload::new(1, 1);
        assert_eq!(
            base.clone().with_record(TlvRecord::new(10, vec![])).unwrap_err(),
            SphinxError::UnsupportedEncoding { tlv_type: 10 }
        );
        assert!(matches!(
            base.clone().with_record(TlvRecord::new(2, vec![])).unwrap_err(),
            SphinxError::InvalidArgument(_)
        ));
        assert!(matches!(
            base.with_record(TlvRecord::new(7, vec![]))
                .unwrap()
                .with_record(TlvRecord::new(7, vec![1]))
                .unwrap_err(),
            SphinxError::InvalidArgument(_)
        ));
    }

    #[test]
    fn tlv_unknown_even_type_rejected_test() {
        // amount, cltv and an even type 10 record nobody understands
        let raw = hex::decode("090201010401010a0100").unwrap();
        assert_eq!(
            HopPayload::from_sphinx_bytes(&raw),
            Err(SphinxError::UnsupportedEncoding { tlv_type: 10 })
        );
    }

    #[test]
    fn tlv_missing_required_fields_test() {
        let raw = hex::decode("03020101").unwrap();
        assert_eq!(
            HopPayload::from_sphinx_bytes(&raw),
            Err(SphinxError::MalformedPayload("missing outgoing_cltv_value"))
        );
    }

    #[test]
    fn tlv_truncated_test() {
        let raw = hex::decode("0a0201010401").unwrap();
        assert_eq!(
            HopPayload::from_sphinx_bytes(&raw),
            Err(SphinxError::MalformedPayload("TLV payload overruns buffer"))
        );
    }

    #[test]
    fn tlv_length_prefix_never_zero_test() {
        // The smallest possible TLV payload still carries four body bytes.
        let payload: HopPayload = TlvPayload::new(0, 0).into();
        let raw = payload.to_sphinx_bytes();
        assert_eq!(hex::encode(&raw), "0402000400");
        assert_ne!(raw[0], LEGACY_REALM);
        assert_eq!(HopPayload::from_sphinx_bytes(&raw).unwrap(), payload);
    }

    #[test]
    fn short_channel_id_test() {
        let scid = ShortChannelId::from_u64((539268 << 40) | (845 << 16) | 1);
        assert_eq!(scid.block_height(), 539268);
        assert_eq!(scid.tx_index(), 845);
        assert_eq!(scid.output_index(), 1);
        assert_eq!(scid.to_string(), "539268x845x1");
        assert!(ShortChannelId::try_from(&[0u8; 9][..]).is_err());
    }
}
