//! Error taxonomy for the BER codec and SNMPv2c message model.

use thiserror::Error;

/// ASN.1 tag class, per the top two bits of an identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    pub(crate) fn from_bits(bits: u8) -> Class {
        match bits {
            0b00 => Class::Universal,
            0b01 => Class::Application,
            0b10 => Class::Context,
            _ => Class::Private,
        }
    }
}

/// One of the SNMPv2 `error-status` values, or a standard-PDU reservation.
///
/// Mirrors RFC 1905 §3 table; every non-zero value maps to a caller-visible
/// failure (see [`Error::agent_error`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentErrorStatus {
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
}

impl AgentErrorStatus {
    pub fn from_code(code: i64) -> Option<AgentErrorStatus> {
        use AgentErrorStatus::*;
        Some(match code {
            1 => TooBig,
            2 => NoSuchName,
            3 => BadValue,
            4 => ReadOnly,
            5 => GenErr,
            6 => NoAccess,
            7 => WrongType,
            8 => WrongLength,
            9 => WrongEncoding,
            10 => WrongValue,
            11 => NoCreation,
            12 => InconsistentValue,
            13 => ResourceUnavailable,
            14 => CommitFailed,
            15 => UndoFailed,
            16 => AuthorizationError,
            17 => NotWritable,
            18 => InconsistentName,
            _ => return None,
        })
    }

    pub fn code(self) -> i64 {
        use AgentErrorStatus::*;
        match self {
            TooBig => 1,
            NoSuchName => 2,
            BadValue => 3,
            ReadOnly => 4,
            GenErr => 5,
            NoAccess => 6,
            WrongType => 7,
            WrongLength => 8,
            WrongEncoding => 9,
            WrongValue => 10,
            NoCreation => 11,
            InconsistentValue => 12,
            ResourceUnavailable => 13,
            CommitFailed => 14,
            UndoFailed => 15,
            AuthorizationError => 16,
            NotWritable => 17,
            InconsistentName => 18,
        }
    }
}

impl std::fmt::Display for AgentErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer too short at offset {offset}: need {needed} byte(s), have {available}")]
    BufferTooShort {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid tag at offset {offset}: {detail}")]
    InvalidTag { offset: usize, detail: String },

    #[error("indefinite length is not supported (offset {offset})")]
    IndefiniteLength { offset: usize },

    #[error("unsupported value type: class {class:?} tag {tag} at offset {offset}")]
    UnsupportedValueType {
        class: Class,
        tag: u8,
        offset: usize,
    },

    #[error("malformed message at offset {offset}: {detail}")]
    MalformedMessage { offset: usize, detail: String },

    #[error("unsupported SNMP version {0} (only SNMPv2c, version=1, is supported)")]
    UnsupportedVersion(i64),

    #[error("invalid object identifier: {0}")]
    InvalidOid(String),

    #[error("agent returned {status} at variable-binding index {index}")]
    Agent {
        status: AgentErrorStatus,
        index: i64,
    },
}

impl Error {
    /// Convert a non-zero `error-status`/`error-index` pair from a GetResponse
    /// into a typed agent failure. Returns `None` for `error-status == 0`
    /// and for out-of-range codes (reported as a malformed message instead).
    pub fn agent_error(error_status: i64, error_index: i64) -> Option<Error> {
        if error_status == 0 {
            return None;
        }
        AgentErrorStatus::from_code(error_status).map(|status| Error::Agent {
            status,
            index: error_index,
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
