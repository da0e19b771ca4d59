//! An asynchronous SNMPv2c manager/trap-receiver client built on `tokio`.
//!
//! `Snmp` is the per-agent session: `get`, `get_next`, `get_bulk`, `set`,
//! and the `walk`/`bulk_walk` traversals. `TrapListener` is a standalone
//! receiver for unsolicited `SNMPv2-Trap` notifications. The wire codec
//! (BER/DER, the SMIv2 value union, OIDs) lives in the sibling
//! `snmp2c-core` crate and is re-exported here for convenience.
//!
//! This crate has no binary target and does no file I/O; an embedding
//! application supplies its own CLI/config/main loop and `tracing`
//! subscriber.

pub mod config;
pub mod error;
mod reqid;
pub mod session;
mod transport;
pub mod trap;
pub mod walk;

pub use config::{SessionConfig, TrapListenerConfig};
pub use error::{Error, Result};
pub use session::Snmp;
pub use trap::{TrapListener, TrapMessage};
pub use walk::{BulkWalk, Walk};

pub use snmp2c_core::{AgentErrorStatus, Message, Oid, Pdu, SmiValue, Varbind};
