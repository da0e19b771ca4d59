//! Error taxonomy for the session dispatcher, transport, and trap listener.

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("timed out waiting for a reply after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("operation attempted on a closed session")]
    Closed,

    #[error("failed to resolve {host}:{port}")]
    ResolveFailed { host: String, port: u16 },

    #[error("encoded message of {size} bytes exceeds the UDP payload limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("agent at {addr} returned non-increasing OID during walk: {previous} -> {next}")]
    NonIncreasingOid {
        addr: SocketAddr,
        previous: String,
        next: String,
    },

    #[error(transparent)]
    Codec(#[from] snmp2c_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
