//! BER/DER codec and SNMPv2c message model.
//!
//! This crate covers the wire format only: a restricted ASN.1/BER subset
//! (tag/length/value parsing, SMI-specific APPLICATION and CONTEXT tags)
//! and the typed `Message`/`Pdu`/`Varbind`/`SmiValue` hierarchy built on
//! top of it. It has no knowledge of sockets, retries, or sessions - see
//! the `snmp2c-client` crate for that.

pub mod ber;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod value;
pub mod varbind;

pub use error::{AgentErrorStatus, Class, Error, Result};
pub use message::Message;
pub use oid::Oid;
pub use pdu::Pdu;
pub use value::SmiValue;
pub use varbind::Varbind;
