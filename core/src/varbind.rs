//! `Varbind`: an `(OID, value)` pair, the atomic unit exchanged in every PDU.

use crate::ber::{self, Class, TAG_SEQUENCE};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::SmiValue;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Varbind {
    pub oid: Oid,
    pub value: SmiValue,
}

impl Varbind {
    pub fn new(oid: Oid, value: SmiValue) -> Varbind {
        Varbind { oid, value }
    }

    /// A varbind with a NULL value, as used in the request varbind list of
    /// `GetRequest`/`GetNextRequest`/`GetBulkRequest`.
    pub fn placeholder(oid: Oid) -> Varbind {
        Varbind { oid, value: SmiValue::Null }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        content.extend_from_slice(&self.oid.encode());
        content.extend_from_slice(&self.value.encode());
        let mut out = Vec::new();
        ber::encode_tlv(Class::Universal, true, TAG_SEQUENCE, &content, &mut out);
        out
    }

    pub fn decode(buf: &[u8], offset: usize) -> Result<(Varbind, usize)> {
        let tlv = ber::parse_tlv(buf, offset)?;
        if tlv.class != Class::Universal || tlv.tag != TAG_SEQUENCE || !tlv.constructed {
            return Err(Error::MalformedMessage {
                offset,
                detail: "expected a varbind SEQUENCE".to_string(),
            });
        }
        let oid_tlv = ber::parse_tlv(tlv.content, 0)?;
        let oid = Oid::decode_tlv(&oid_tlv)?;
        let (value, value_end) = crate::value::decode_any(tlv.content, oid_tlv.next_offset)?;
        if value_end != tlv.content.len() {
            return Err(Error::MalformedMessage {
                offset: tlv.offset,
                detail: "trailing bytes after varbind value".to_string(),
            });
        }
        Ok((Varbind::new(oid, value), tlv.next_offset))
    }
}

/// Encode a `SEQUENCE OF Varbind`.
pub fn encode_varbind_list(varbinds: &[Varbind]) -> Vec<u8> {
    let mut content = Vec::new();
    for vb in varbinds {
        content.extend_from_slice(&vb.encode());
    }
    let mut out = Vec::new();
    ber::encode_tlv(Class::Universal, true, TAG_SEQUENCE, &content, &mut out);
    out
}

/// Decode a `SEQUENCE OF Varbind` starting at `offset`, returning the
/// varbinds and the offset immediately following the outer SEQUENCE.
pub fn decode_varbind_list(buf: &[u8], offset: usize) -> Result<(Vec<Varbind>, usize)> {
    let tlv = ber::parse_tlv(buf, offset)?;
    if tlv.class != Class::Universal || tlv.tag != TAG_SEQUENCE || !tlv.constructed {
        return Err(Error::MalformedMessage {
            offset,
            detail: "expected variable-bindings SEQUENCE OF".to_string(),
        });
    }
    let mut varbinds = Vec::new();
    let mut pos = 0;
    while pos < tlv.content.len() {
        let (vb, next) = Varbind::decode(tlv.content, pos)?;
        varbinds.push(vb);
        pos = next;
    }
    Ok((varbinds, tlv.next_offset))
}
