//! `Message { version, community, pdu }`: the outermost SNMPv2c envelope.

use crate::ber::{self, Class, TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE};
use crate::error::{Error, Result};
use crate::pdu::Pdu;

/// `version = 1` is the wire value for SNMPv2c (RFC 1901 §2).
pub const SNMPV2C_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: i64,
    pub community: Vec<u8>,
    pub pdu: Pdu,
}

impl Message {
    pub fn new(community: impl Into<Vec<u8>>, pdu: Pdu) -> Message {
        Message {
            version: SNMPV2C_VERSION,
            community: community.into(),
            pdu,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        ber::encode_tlv(Class::Universal, false, TAG_INTEGER, &ber::encode_integer(self.version), &mut content);
        ber::encode_tlv(Class::Universal, false, TAG_OCTET_STRING, &self.community, &mut content);
        content.extend_from_slice(&self.pdu.encode());

        let mut out = Vec::new();
        ber::encode_tlv(Class::Universal, true, TAG_SEQUENCE, &content, &mut out);
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Message> {
        let outer = ber::parse_tlv(buf, 0)?;
        if outer.class != Class::Universal || outer.tag != TAG_SEQUENCE || !outer.constructed {
            return Err(Error::MalformedMessage {
                offset: 0,
                detail: "expected outer SEQUENCE".to_string(),
            });
        }
        if outer.next_offset != buf.len() {
            return Err(Error::MalformedMessage {
                offset: outer.next_offset,
                detail: "trailing bytes after message".to_string(),
            });
        }

        let version_tlv = ber::parse_tlv(outer.content, 0)?;
        if version_tlv.class != Class::Universal || version_tlv.tag != TAG_INTEGER {
            return Err(Error::MalformedMessage {
                offset: version_tlv.offset,
                detail: "expected version INTEGER".to_string(),
            });
        }
        let version = ber::decode_integer(version_tlv.content, version_tlv.offset)?;
        if version != SNMPV2C_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let community_tlv = ber::parse_tlv(outer.content, version_tlv.next_offset)?;
        if community_tlv.class != Class::Universal || community_tlv.tag != TAG_OCTET_STRING {
            return Err(Error::MalformedMessage {
                offset: community_tlv.offset,
                detail: "expected community OCTET STRING".to_string(),
            });
        }
        let community = community_tlv.content.to_vec();

        let (pdu, pdu_end) = Pdu::decode(outer.content, community_tlv.next_offset)?;
        if pdu_end != outer.content.len() {
            return Err(Error::MalformedMessage {
                offset: pdu_end,
                detail: "trailing bytes after PDU".to_string(),
            });
        }

        Ok(Message { version, community, pdu })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varbind::Varbind;

    #[test]
    fn get_request_matches_spec_bytes() {
        let msg = Message::new(
            "public",
            Pdu::GetRequest {
                request_id: 1,
                varbinds: vec![Varbind::placeholder("1.3.6.1.2.1.1.5.0".parse().unwrap())],
            },
        );
        let enc = msg.encode();
        // outer SEQUENCE, version=1, community="public", context-tag 0 PDU
        assert_eq!(enc[0], 0x30);
        assert_eq!(&enc[2..7], &[0x02, 0x01, 0x01, 0x04, 0x06]);
        assert_eq!(&enc[7..13], b"public");
        assert_eq!(enc[13], 0xA0);
    }

    #[test]
    fn message_round_trips() {
        let msg = Message::new(
            "public",
            Pdu::GetNextRequest {
                request_id: 99,
                varbinds: vec![Varbind::placeholder("1.3.6.1.2.1.1".parse().unwrap())],
            },
        );
        let enc = msg.encode();
        let decoded = Message::decode(&enc).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn rejects_unsupported_version() {
        // version = 3 (SNMPv3) should be rejected outright.
        let msg = Message {
            version: 3,
            community: b"public".to_vec(),
            pdu: Pdu::GetRequest { request_id: 1, varbinds: vec![] },
        };
        let enc = msg.encode();
        let err = Message::decode(&enc).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(3)));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let msg = Message::new("public", Pdu::GetRequest { request_id: 1, varbinds: vec![] });
        let mut enc = msg.encode();
        enc.push(0x00);
        let err = Message::decode(&enc).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage { .. }));
    }
}
