//! SMIv2-tagged value union (`SmiValue`) and its BER (de)serialization.

use crate::ber::{self, Class, Tlv, TAG_BOOLEAN, TAG_INTEGER, TAG_NULL, TAG_OBJECT_IDENTIFIER, TAG_OCTET_STRING};
use crate::error::{Error, Result};
use crate::oid::Oid;

pub const TAG_IP_ADDRESS: u8 = 0x00;
pub const TAG_COUNTER32: u8 = 0x01;
pub const TAG_GAUGE32: u8 = 0x02;
pub const TAG_TIME_TICKS: u8 = 0x03;
pub const TAG_OPAQUE: u8 = 0x04;
pub const TAG_COUNTER64: u8 = 0x06;

pub const TAG_NO_SUCH_OBJECT: u8 = 0x00;
pub const TAG_NO_SUCH_INSTANCE: u8 = 0x01;
pub const TAG_END_OF_MIB_VIEW: u8 = 0x02;

/// A single SMIv2 value, tagged by the ASN.1 identifier it was decoded
/// from (or will be encoded as). Exception values (`NoSuchObject`,
/// `NoSuchInstance`, `EndOfMibView`) are first-class variants rather than
/// errors: callers need to tell a per-instance absence apart from a
/// whole-request failure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmiValue {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
    Boolean(bool),
}

impl SmiValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SmiValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_octet_string(&self) -> Option<&[u8]> {
        match self {
            SmiValue::OctetString(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_identifier(&self) -> Option<&Oid> {
        match self {
            SmiValue::ObjectIdentifier(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ip_address(&self) -> Option<[u8; 4]> {
        match self {
            SmiValue::IpAddress(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_counter32(&self) -> Option<u32> {
        match self {
            SmiValue::Counter32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_gauge32(&self) -> Option<u32> {
        match self {
            SmiValue::Gauge32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time_ticks(&self) -> Option<u32> {
        match self {
            SmiValue::TimeTicks(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&[u8]> {
        match self {
            SmiValue::Opaque(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_counter64(&self) -> Option<u64> {
        match self {
            SmiValue::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SmiValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// True for the three walk-terminating exception values.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            SmiValue::NoSuchObject | SmiValue::NoSuchInstance | SmiValue::EndOfMibView
        )
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            SmiValue::Integer(v) => {
                ber::encode_tlv(Class::Universal, false, TAG_INTEGER, &ber::encode_integer(*v), &mut out)
            }
            SmiValue::OctetString(bytes) => {
                ber::encode_tlv(Class::Universal, false, TAG_OCTET_STRING, bytes, &mut out)
            }
            SmiValue::Null => ber::encode_tlv(Class::Universal, false, TAG_NULL, &[], &mut out),
            SmiValue::ObjectIdentifier(oid) => return oid.encode(),
            SmiValue::IpAddress(bytes) => {
                ber::encode_tlv(Class::Application, false, TAG_IP_ADDRESS, bytes, &mut out)
            }
            SmiValue::Counter32(v) => ber::encode_tlv(
                Class::Application,
                false,
                TAG_COUNTER32,
                &ber::encode_unsigned(*v as u64),
                &mut out,
            ),
            SmiValue::Gauge32(v) => ber::encode_tlv(
                Class::Application,
                false,
                TAG_GAUGE32,
                &ber::encode_unsigned(*v as u64),
                &mut out,
            ),
            SmiValue::TimeTicks(v) => ber::encode_tlv(
                Class::Application,
                false,
                TAG_TIME_TICKS,
                &ber::encode_unsigned(*v as u64),
                &mut out,
            ),
            SmiValue::Opaque(bytes) => {
                ber::encode_tlv(Class::Application, false, TAG_OPAQUE, bytes, &mut out)
            }
            SmiValue::Counter64(v) => ber::encode_tlv(
                Class::Application,
                false,
                TAG_COUNTER64,
                &ber::encode_unsigned(*v),
                &mut out,
            ),
            SmiValue::NoSuchObject => {
                ber::encode_tlv(Class::Context, false, TAG_NO_SUCH_OBJECT, &[], &mut out)
            }
            SmiValue::NoSuchInstance => {
                ber::encode_tlv(Class::Context, false, TAG_NO_SUCH_INSTANCE, &[], &mut out)
            }
            SmiValue::EndOfMibView => {
                ber::encode_tlv(Class::Context, false, TAG_END_OF_MIB_VIEW, &[], &mut out)
            }
            SmiValue::Boolean(b) => ber::encode_tlv(
                Class::Universal,
                false,
                TAG_BOOLEAN,
                &[if *b { 0xff } else { 0x00 }],
                &mut out,
            ),
        }
        out
    }

    pub(crate) fn decode_tlv(tlv: &Tlv<'_>) -> Result<SmiValue> {
        let offset = tlv.offset;
        match (tlv.class, tlv.tag) {
            (Class::Universal, TAG_INTEGER) => Ok(SmiValue::Integer(ber::decode_integer(tlv.content, offset)?)),
            (Class::Universal, TAG_OCTET_STRING) => Ok(SmiValue::OctetString(tlv.content.to_vec())),
            (Class::Universal, TAG_NULL) => {
                if !tlv.content.is_empty() {
                    return Err(Error::MalformedMessage {
                        offset,
                        detail: "NULL must have zero-length content".to_string(),
                    });
                }
                Ok(SmiValue::Null)
            }
            (Class::Universal, TAG_OBJECT_IDENTIFIER) => Ok(SmiValue::ObjectIdentifier(Oid::decode_content(tlv.content, offset)?)),
            (Class::Universal, TAG_BOOLEAN) => {
                let b = tlv.content.first().copied().ok_or(Error::MalformedMessage {
                    offset,
                    detail: "zero-length BOOLEAN".to_string(),
                })?;
                Ok(SmiValue::Boolean(b != 0))
            }
            (Class::Application, TAG_IP_ADDRESS) => {
                if tlv.content.len() != 4 {
                    return Err(Error::MalformedMessage {
                        offset,
                        detail: format!("IpAddress must be 4 bytes, got {}", tlv.content.len()),
                    });
                }
                let mut a = [0u8; 4];
                a.copy_from_slice(tlv.content);
                Ok(SmiValue::IpAddress(a))
            }
            (Class::Application, TAG_COUNTER32) => Ok(SmiValue::Counter32(ber::decode_unsigned(tlv.content, offset)? as u32)),
            (Class::Application, TAG_GAUGE32) => Ok(SmiValue::Gauge32(ber::decode_unsigned(tlv.content, offset)? as u32)),
            (Class::Application, TAG_TIME_TICKS) => Ok(SmiValue::TimeTicks(ber::decode_unsigned(tlv.content, offset)? as u32)),
            (Class::Application, TAG_OPAQUE) => Ok(SmiValue::Opaque(tlv.content.to_vec())),
            (Class::Application, TAG_COUNTER64) => Ok(SmiValue::Counter64(ber::decode_unsigned(tlv.content, offset)?)),
            (Class::Context, TAG_NO_SUCH_OBJECT) if !tlv.constructed => Ok(SmiValue::NoSuchObject),
            (Class::Context, TAG_NO_SUCH_INSTANCE) if !tlv.constructed => Ok(SmiValue::NoSuchInstance),
            (Class::Context, TAG_END_OF_MIB_VIEW) if !tlv.constructed => Ok(SmiValue::EndOfMibView),
            (class, tag) => Err(Error::UnsupportedValueType { class, tag, offset }),
        }
    }
}

/// Decode a single tagged value starting at `offset`, returning the value
/// and the offset immediately following it. This is the "generic `decode_any`"
/// entry point higher layers branch on.
pub fn decode_any(buf: &[u8], offset: usize) -> Result<(SmiValue, usize)> {
    let tlv = ber::parse_tlv(buf, offset)?;
    let value = SmiValue::decode_tlv(&tlv)?;
    Ok((value, tlv.next_offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(v: SmiValue) -> SmiValue {
        let enc = v.encode();
        let (decoded, next) = decode_any(&enc, 0).unwrap();
        assert_eq!(next, enc.len());
        decoded
    }

    #[test]
    fn integer_round_trips() {
        assert_eq!(round_trip(SmiValue::Integer(-1)), SmiValue::Integer(-1));
        assert_eq!(round_trip(SmiValue::Integer(70000)), SmiValue::Integer(70000));
    }

    #[test]
    fn octet_string_round_trips() {
        let v = SmiValue::OctetString(b"hello snmp".to_vec());
        assert_eq!(round_trip(v.clone()), v);
    }

    #[test]
    fn null_round_trips() {
        assert_eq!(round_trip(SmiValue::Null), SmiValue::Null);
    }

    #[test]
    fn unsigned_types_round_trip() {
        assert_eq!(round_trip(SmiValue::Counter32(u32::MAX)), SmiValue::Counter32(u32::MAX));
        assert_eq!(round_trip(SmiValue::Gauge32(1234)), SmiValue::Gauge32(1234));
        assert_eq!(round_trip(SmiValue::TimeTicks(987654)), SmiValue::TimeTicks(987654));
        assert_eq!(
            round_trip(SmiValue::Counter64(u64::MAX)),
            SmiValue::Counter64(u64::MAX)
        );
    }

    #[test]
    fn ip_address_round_trips() {
        let v = SmiValue::IpAddress([192, 168, 1, 1]);
        assert_eq!(round_trip(v.clone()), v);
    }

    #[test]
    fn exception_values_round_trip() {
        assert_eq!(round_trip(SmiValue::NoSuchObject), SmiValue::NoSuchObject);
        assert_eq!(round_trip(SmiValue::NoSuchInstance), SmiValue::NoSuchInstance);
        assert_eq!(round_trip(SmiValue::EndOfMibView), SmiValue::EndOfMibView);
    }

    #[test]
    fn unsupported_tag_is_rejected() {
        // UNIVERSAL tag 10 (ENUMERATED) is not in the SMIv2 set.
        let buf = [0x0a, 0x01, 0x01];
        let err = decode_any(&buf, 0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType { .. }));
    }

    #[test]
    fn constructed_context_tag_is_not_mistaken_for_an_exception_value() {
        // 0xA0 is CONTEXT class, constructed, tag 0: a GetRequest PDU, not
        // the primitive NoSuchObject exception value that shares tag 0.
        let buf = [0xa0, 0x02, 0x02, 0x00];
        let err = decode_any(&buf, 0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType { .. }));
    }
}
