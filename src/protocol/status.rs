//! GATT reply policy.
//!
//! Handlers decide *what* to say to the peer ("read succeeded with this
//! value", "reject: invalid length"); this module decides which response
//! command and status code carry it.

use super::command::Command;
use super::event::AttributeValueView;
use serde::{Deserialize, Serialize};

/// Status code returned to the remote GATT client.
///
/// Error codes live in the application-defined `0x80..=0xff` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GattStatus {
    Success,
    InvalidLength,
    InvalidCharacteristic,
}

impl GattStatus {
    /// Wire value of the status byte.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::InvalidLength => 0x80,
            Self::InvalidCharacteristic => 0x81,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Reason a user request is refused. Recoverable: the peer gets an error
/// status and the session carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The request targets a characteristic this device does not serve.
    InvalidCharacteristic,
    /// The written payload is not exactly one byte.
    InvalidLength,
}

impl Rejection {
    pub fn status(self) -> GattStatus {
        match self {
            Self::InvalidCharacteristic => GattStatus::InvalidCharacteristic,
            Self::InvalidLength => GattStatus::InvalidLength,
        }
    }
}

/// Answer to a user read or write request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Read {
        connection: u8,
        characteristic: u16,
        status: GattStatus,
        payload: Vec<u8>,
    },
    Write {
        connection: u8,
        characteristic: u16,
        status: GattStatus,
    },
}

impl Reply {
    /// Successful read carrying `payload`.
    pub fn read(connection: u8, characteristic: u16, payload: Vec<u8>) -> Self {
        Self::Read {
            connection,
            characteristic,
            status: GattStatus::Success,
            payload,
        }
    }

    /// Successful write acknowledgement.
    pub fn write(connection: u8, characteristic: u16) -> Self {
        Self::Write {
            connection,
            characteristic,
            status: GattStatus::Success,
        }
    }

    /// Refusal of a read or write request.
    ///
    /// Always answered with a write response, addressed through the
    /// attribute-value view of the request.
    pub fn reject(target: AttributeValueView, rejection: Rejection) -> Self {
        Self::Write {
            connection: target.connection,
            characteristic: target.attribute,
            status: rejection.status(),
        }
    }

    pub fn status(&self) -> GattStatus {
        match self {
            Self::Read { status, .. } | Self::Write { status, .. } => *status,
        }
    }

    pub fn into_command(self) -> Command {
        match self {
            Self::Read {
                connection,
                characteristic,
                status,
                payload,
            } => Command::RespondRead {
                connection,
                characteristic,
                status,
                payload,
            },
            Self::Write {
                connection,
                characteristic,
                status,
            } => Command::RespondWrite {
                connection,
                characteristic,
                status,
            },
        }
    }
}
