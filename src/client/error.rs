//! Transport and protocol client errors.

use crate::protocol::CommandKind;
use thiserror::Error;

/// Failure of the serial link or its framing layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Link I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Link closed while waiting for the {0} response")]
    Closed(CommandKind),

    /// Raised by framing transports when a packet cannot be decoded.
    #[error("Malformed packet from firmware: {0}")]
    Malformed(String),
}

/// Errors raised while exchanging a command with the firmware.
///
/// None of them is retried; all are fatal for the session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Response mismatch: sent {sent}, firmware answered {received}")]
    ResponseMismatch {
        sent: CommandKind,
        received: CommandKind,
    },

    #[error("{command} failed with firmware result 0x{result:04x}")]
    CommandFailed { command: CommandKind, result: u16 },
}
