//! Object Identifiers: parsing, canonical text form, and BER (de)serialization.

use std::fmt;
use std::str::FromStr;

use crate::ber::{self, Class, Tlv, TAG_OBJECT_IDENTIFIER};
use crate::error::{Error, Result};

/// A non-empty sequence of non-negative sub-identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(Vec<u32>);

/// Serializes as its dotted text form (`"1.3.6.1.2.1.1.1.0"`), not as a
/// bare integer array, so it round-trips through config files and JSON
/// logs the way operators already write OIDs.
#[cfg(feature = "serde")]
impl serde::Serialize for Oid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Oid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Oid, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Oid {
    /// Build an OID from sub-identifiers. Rejects the empty sequence: an
    /// OID always names at least one arc.
    pub fn new(subids: Vec<u32>) -> Result<Oid> {
        if subids.is_empty() {
            return Err(Error::InvalidOid("OID must have at least one sub-identifier".into()));
        }
        Ok(Oid(subids))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// `self` is a prefix of (or equal to) `other`: `|self| <= |other|` and
    /// the first `|self|` sub-identifiers match.
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        self.0.len() <= other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    /// Append a trailing sub-identifier, producing a child OID (e.g. turning
    /// a column OID into a scalar instance by appending `.0`).
    pub fn child(&self, subid: u32) -> Oid {
        let mut v = self.0.clone();
        v.push(subid);
        Oid(v)
    }

    pub fn encode(&self) -> Vec<u8> {
        let payload = encode_subids(&self.0);
        let mut out = Vec::new();
        ber::encode_tlv(Class::Universal, false, TAG_OBJECT_IDENTIFIER, &payload, &mut out);
        out
    }

    pub(crate) fn decode_content(content: &[u8], offset: usize) -> Result<Oid> {
        let subids = decode_subids(content, offset)?;
        Oid::new(subids)
    }

    pub(crate) fn decode_tlv(tlv: &Tlv<'_>) -> Result<Oid> {
        if tlv.class != Class::Universal || tlv.tag != TAG_OBJECT_IDENTIFIER || tlv.constructed {
            return Err(Error::MalformedMessage {
                offset: tlv.offset,
                detail: "expected a primitive universal OBJECT IDENTIFIER".to_string(),
            });
        }
        Oid::decode_content(tlv.content, tlv.offset)
    }
}

fn encode_subids(subids: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    if subids.len() == 1 {
        // A lone sub-identifier has no `b` arc to fold into the first
        // octet; X.690's `a/b` split assumes two logical arcs. There is no
        // encoding of a single value that a conformant decoder reads back
        // as one sub-identifier (decode_subids always yields the `a, b`
        // pair from the first octet), so base-128 encode the raw value so
        // at least large values survive intact instead of being silently
        // truncated to 7 bits.
        encode_base128(subids[0], &mut out);
        return out;
    }
    out.push((subids[0] * 40 + subids[1]) as u8);
    for &sub in &subids[2..] {
        encode_base128(sub, &mut out);
    }
    out
}

fn encode_base128(mut v: u32, out: &mut Vec<u8>) {
    let mut stack = [0u8; 5];
    let mut i = 5;
    stack[4] = (v & 0x7f) as u8;
    i -= 1;
    v >>= 7;
    while v > 0 {
        i -= 1;
        stack[i] = ((v & 0x7f) as u8) | 0x80;
        v >>= 7;
    }
    out.extend_from_slice(&stack[i..]);
}

fn decode_subids(content: &[u8], offset: usize) -> Result<Vec<u32>> {
    if content.is_empty() {
        return Err(Error::MalformedMessage {
            offset,
            detail: "zero-length OBJECT IDENTIFIER".to_string(),
        });
    }
    let mut subids = Vec::new();
    let first = content[0];
    let (a, b) = if first < 80 {
        ((first / 40) as u32, (first % 40) as u32)
    } else {
        (2u32, (first - 80) as u32)
    };
    subids.push(a);
    subids.push(b);

    let mut i = 1;
    while i < content.len() {
        let mut v: u64 = 0;
        let mut more = true;
        while more {
            if i >= content.len() {
                return Err(Error::MalformedMessage {
                    offset,
                    detail: "truncated OBJECT IDENTIFIER sub-identifier".to_string(),
                });
            }
            let b = content[i];
            v = (v << 7) | (b & 0x7f) as u64;
            more = b & 0x80 != 0;
            i += 1;
            if v > u32::MAX as u64 {
                return Err(Error::MalformedMessage {
                    offset,
                    detail: "OBJECT IDENTIFIER sub-identifier exceeds 32 bits".to_string(),
                });
            }
        }
        subids.push(v as u32);
    }
    Ok(subids)
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Oid> {
        let s = s.strip_prefix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(Error::InvalidOid("empty OID string".into()));
        }
        let mut subids = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(Error::InvalidOid(format!("empty sub-identifier in {s:?}")));
            }
            let n: u32 = part
                .parse()
                .map_err(|_| Error::InvalidOid(format!("non-numeric sub-identifier {part:?} (symbolic OID names are not supported)")))?;
            subids.push(n);
        }
        Oid::new(subids)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.iter();
        if let Some(first) = parts.next() {
            write!(f, "{first}")?;
        }
        for p in parts {
            write!(f, ".{p}")?;
        }
        Ok(())
    }
}

impl From<&[u32]> for Oid {
    fn from(v: &[u32]) -> Oid {
        Oid(v.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(v: [u32; N]) -> Oid {
        Oid(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_dot_and_bare_forms() {
        let a: Oid = ".1.3.6.1.2.1".parse().unwrap();
        let b: Oid = "1.3.6.1.2.1".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), &[1, 3, 6, 1, 2, 1]);
    }

    #[test]
    fn rejects_symbolic_prefix() {
        assert!("iso.3.6.1".parse::<Oid>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let oid: Oid = "1.3.6.1.2.1.1.1.0".parse().unwrap();
        let text = oid.to_string();
        let reparsed: Oid = text.parse().unwrap();
        assert_eq!(oid, reparsed);
    }

    #[test]
    fn sys_descr_encodes_to_spec_bytes() {
        let oid: Oid = ".1.3.6.1.2.1.1.1.0".parse().unwrap();
        let encoded = oid.encode();
        assert_eq!(
            encoded,
            vec![0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x01, 0x00]
        );
    }

    #[test]
    fn oid_round_trips_through_ber() {
        for subids in [
            vec![1, 3, 6, 1, 2, 1],
            vec![0, 0],
            vec![2, 999, 3],
            vec![1, 3, 6, 1, 4, 1, 8072, 3, 2, 10],
        ] {
            let oid = Oid::new(subids.clone()).unwrap();
            let encoded = oid.encode();
            let tlv = ber::parse_tlv(&encoded, 0).unwrap();
            let decoded = Oid::decode_tlv(&tlv).unwrap();
            assert_eq!(decoded.as_slice(), &subids[..]);
        }
    }

    #[test]
    fn single_subid_oid_encodes_without_truncation() {
        // A one-element Oid has no standard BER encoding a decoder reads
        // back as one element (see DESIGN.md); the codec still must not
        // silently truncate sub-identifiers above 127 into a single byte.
        let oid = Oid::new(vec![300]).unwrap();
        let encoded = oid.encode();
        assert_eq!(&encoded[2..], &[0x82, 0x2c]);
    }

    #[test]
    fn prefix_semantics() {
        let root: Oid = "1.3.6.1.2.1.1".parse().unwrap();
        let child: Oid = "1.3.6.1.2.1.1.1.0".parse().unwrap();
        let sibling: Oid = "1.3.6.1.2.1.2".parse().unwrap();
        assert!(root.is_prefix_of(&child));
        assert!(root.is_prefix_of(&root));
        assert!(!root.is_prefix_of(&sibling));
        assert!(!child.is_prefix_of(&root));
    }

    #[test]
    fn lexicographic_ordering() {
        let a: Oid = "1.3.6.1.2.1.1.1.0".parse().unwrap();
        let b: Oid = "1.3.6.1.2.1.1.2.0".parse().unwrap();
        assert!(a < b);
    }
}
