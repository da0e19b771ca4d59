//! The SNMPv2c PDU set: `GetRequest`, `GetNextRequest`, `GetResponse`,
//! `SetRequest`, `GetBulkRequest`, `SNMPv2-Trap`.

use crate::ber::{self, Class};
use crate::error::{Error, Result};
use crate::varbind::{self, Varbind};

pub const TAG_GET_REQUEST: u8 = 0;
pub const TAG_GET_NEXT_REQUEST: u8 = 1;
pub const TAG_GET_RESPONSE: u8 = 2;
pub const TAG_SET_REQUEST: u8 = 3;
pub const TAG_GET_BULK_REQUEST: u8 = 5;
pub const TAG_SNMPV2_TRAP: u8 = 7;

/// One SNMPv2c PDU. The three standard-response fields (`error-status`,
/// `error-index`) are repurposed as (`non-repeaters`, `max-repetitions`) on
/// `GetBulkRequest` only; everywhere else they carry the RFC 1905 §3
/// error-status vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    GetRequest {
        request_id: i32,
        varbinds: Vec<Varbind>,
    },
    GetNextRequest {
        request_id: i32,
        varbinds: Vec<Varbind>,
    },
    GetResponse {
        request_id: i32,
        error_status: i64,
        error_index: i64,
        varbinds: Vec<Varbind>,
    },
    SetRequest {
        request_id: i32,
        varbinds: Vec<Varbind>,
    },
    GetBulkRequest {
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        varbinds: Vec<Varbind>,
    },
    Trap {
        request_id: i32,
        varbinds: Vec<Varbind>,
    },
}

impl Pdu {
    pub fn request_id(&self) -> i32 {
        match self {
            Pdu::GetRequest { request_id, .. }
            | Pdu::GetNextRequest { request_id, .. }
            | Pdu::GetResponse { request_id, .. }
            | Pdu::SetRequest { request_id, .. }
            | Pdu::GetBulkRequest { request_id, .. }
            | Pdu::Trap { request_id, .. } => *request_id,
        }
    }

    pub fn varbinds(&self) -> &[Varbind] {
        match self {
            Pdu::GetRequest { varbinds, .. }
            | Pdu::GetNextRequest { varbinds, .. }
            | Pdu::GetResponse { varbinds, .. }
            | Pdu::SetRequest { varbinds, .. }
            | Pdu::GetBulkRequest { varbinds, .. }
            | Pdu::Trap { varbinds, .. } => varbinds,
        }
    }

    fn context_tag(&self) -> u8 {
        match self {
            Pdu::GetRequest { .. } => TAG_GET_REQUEST,
            Pdu::GetNextRequest { .. } => TAG_GET_NEXT_REQUEST,
            Pdu::GetResponse { .. } => TAG_GET_RESPONSE,
            Pdu::SetRequest { .. } => TAG_SET_REQUEST,
            Pdu::GetBulkRequest { .. } => TAG_GET_BULK_REQUEST,
            Pdu::Trap { .. } => TAG_SNMPV2_TRAP,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let (request_id, second, third, varbinds) = match self {
            Pdu::GetRequest { request_id, varbinds } => (*request_id, 0i64, 0i64, varbinds),
            Pdu::GetNextRequest { request_id, varbinds } => (*request_id, 0, 0, varbinds),
            Pdu::GetResponse {
                request_id,
                error_status,
                error_index,
                varbinds,
            } => (*request_id, *error_status, *error_index, varbinds),
            Pdu::SetRequest { request_id, varbinds } => (*request_id, 0, 0, varbinds),
            Pdu::GetBulkRequest {
                request_id,
                non_repeaters,
                max_repetitions,
                varbinds,
            } => (*request_id, *non_repeaters as i64, *max_repetitions as i64, varbinds),
            Pdu::Trap { request_id, varbinds } => (*request_id, 0, 0, varbinds),
        };

        let mut content = Vec::new();
        ber::encode_tlv(Class::Universal, false, crate::ber::TAG_INTEGER, &ber::encode_integer(request_id as i64), &mut content);
        ber::encode_tlv(Class::Universal, false, crate::ber::TAG_INTEGER, &ber::encode_integer(second), &mut content);
        ber::encode_tlv(Class::Universal, false, crate::ber::TAG_INTEGER, &ber::encode_integer(third), &mut content);
        content.extend_from_slice(&varbind::encode_varbind_list(varbinds));

        let mut out = Vec::new();
        ber::encode_tlv(Class::Context, true, self.context_tag(), &content, &mut out);
        out
    }

    pub fn decode(buf: &[u8], offset: usize) -> Result<(Pdu, usize)> {
        let tlv = ber::parse_tlv(buf, offset)?;
        if tlv.class != Class::Context || !tlv.constructed {
            return Err(Error::MalformedMessage {
                offset,
                detail: "expected a context-tagged constructed PDU".to_string(),
            });
        }

        let id_tlv = ber::parse_tlv(tlv.content, 0)?;
        let request_id = expect_integer(&id_tlv)? as i32;

        let second_tlv = ber::parse_tlv(tlv.content, id_tlv.next_offset)?;
        let second = expect_integer(&second_tlv)?;

        let third_tlv = ber::parse_tlv(tlv.content, second_tlv.next_offset)?;
        let third = expect_integer(&third_tlv)?;

        let (varbinds, end) = varbind::decode_varbind_list(tlv.content, third_tlv.next_offset)?;
        if end != tlv.content.len() {
            return Err(Error::MalformedMessage {
                offset: tlv.offset,
                detail: "trailing bytes after PDU variable-bindings".to_string(),
            });
        }

        let pdu = match tlv.tag {
            TAG_GET_REQUEST => Pdu::GetRequest { request_id, varbinds },
            TAG_GET_NEXT_REQUEST => Pdu::GetNextRequest { request_id, varbinds },
            TAG_GET_RESPONSE => Pdu::GetResponse {
                request_id,
                error_status: second,
                error_index: third,
                varbinds,
            },
            TAG_SET_REQUEST => Pdu::SetRequest { request_id, varbinds },
            TAG_GET_BULK_REQUEST => Pdu::GetBulkRequest {
                request_id,
                non_repeaters: second as i32,
                max_repetitions: third as i32,
                varbinds,
            },
            TAG_SNMPV2_TRAP => Pdu::Trap { request_id, varbinds },
            other => {
                return Err(Error::MalformedMessage {
                    offset: tlv.offset,
                    detail: format!("unrecognized PDU context tag {other}"),
                })
            }
        };

        Ok((pdu, tlv.next_offset))
    }
}

fn expect_integer(tlv: &ber::Tlv<'_>) -> Result<i64> {
    if tlv.class != Class::Universal || tlv.tag != crate::ber::TAG_INTEGER {
        return Err(Error::MalformedMessage {
            offset: tlv.offset,
            detail: "expected an INTEGER PDU field".to_string(),
        });
    }
    ber::decode_integer(tlv.content, tlv.offset)
}
