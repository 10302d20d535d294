//! Commands sent to the firmware and the responses that answer them.

use super::status::GattStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Firmware soft timer clock (Hz).
pub const SOFT_TIMER_CLOCK_HZ: u64 = 32_768;

/// Advertising discoverability: general discoverable.
pub const GENERAL_DISCOVERABLE: u8 = 2;
/// Advertising connectability: undirected connectable.
pub const UNDIRECTED_CONNECTABLE: u8 = 2;

/// Convert a timer interval to firmware soft timer ticks, saturating at `u32::MAX`.
///
/// Framing transports encode `StartPollTimer` intervals with it.
pub fn soft_timer_ticks(interval: Duration) -> u32 {
    let ticks = interval.as_micros() * u128::from(SOFT_TIMER_CLOCK_HZ) / 1_000_000;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

/// Which command a request or response belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    SystemReset,
    SetDeviceName,
    StartAdvertising,
    StartPollTimer,
    StopPollTimer,
    ReadSensePort,
    WriteSensePort,
    SendNotification,
    RespondRead,
    RespondWrite,
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::SystemReset => "SystemReset",
            Self::SetDeviceName => "SetDeviceName",
            Self::StartAdvertising => "StartAdvertising",
            Self::StartPollTimer => "StartPollTimer",
            Self::StopPollTimer => "StopPollTimer",
            Self::ReadSensePort => "ReadSensePort",
            Self::WriteSensePort => "WriteSensePort",
            Self::SendNotification => "SendNotification",
            Self::RespondRead => "RespondRead",
            Self::RespondWrite => "RespondWrite",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outgoing one-shot command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Reboot the firmware. Not answered by a response; a `Boot` event follows.
    SystemReset,
    SetDeviceName {
        attribute: u16,
        name: String,
    },
    StartAdvertising {
        discoverable: u8,
        connectable: u8,
    },
    StartPollTimer {
        interval: Duration,
        timer_id: u8,
        single_shot: bool,
    },
    StopPollTimer {
        timer_id: u8,
    },
    ReadSensePort {
        port: u8,
        mask: u16,
    },
    WriteSensePort {
        port: u8,
        mask: u16,
        value: u16,
    },
    SendNotification {
        connection: u8,
        characteristic: u16,
        value: Vec<u8>,
    },
    RespondRead {
        connection: u8,
        characteristic: u16,
        status: GattStatus,
        payload: Vec<u8>,
    },
    RespondWrite {
        connection: u8,
        characteristic: u16,
        status: GattStatus,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::SystemReset => CommandKind::SystemReset,
            Self::SetDeviceName { .. } => CommandKind::SetDeviceName,
            Self::StartAdvertising { .. } => CommandKind::StartAdvertising,
            Self::StartPollTimer { .. } => CommandKind::StartPollTimer,
            Self::StopPollTimer { .. } => CommandKind::StopPollTimer,
            Self::ReadSensePort { .. } => CommandKind::ReadSensePort,
            Self::WriteSensePort { .. } => CommandKind::WriteSensePort,
            Self::SendNotification { .. } => CommandKind::SendNotification,
            Self::RespondRead { .. } => CommandKind::RespondRead,
            Self::RespondWrite { .. } => CommandKind::RespondWrite,
        }
    }
}

/// Firmware answer to a [`Command`].
///
/// `result` is the firmware result code; zero means success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    DeviceNameSet { result: u16 },
    AdvertisingStarted { result: u16 },
    PollTimerStarted { result: u16 },
    PollTimerStopped { result: u16 },
    SensePortRead { result: u16, port: u8, data: u16 },
    SensePortWritten { result: u16 },
    NotificationSent { result: u16 },
    ReadResponded { result: u16 },
    WriteResponded { result: u16 },
}

impl Response {
    /// Kind of command this response answers.
    pub fn answers(&self) -> CommandKind {
        match self {
            Self::DeviceNameSet { .. } => CommandKind::SetDeviceName,
            Self::AdvertisingStarted { .. } => CommandKind::StartAdvertising,
            Self::PollTimerStarted { .. } => CommandKind::StartPollTimer,
            Self::PollTimerStopped { .. } => CommandKind::StopPollTimer,
            Self::SensePortRead { .. } => CommandKind::ReadSensePort,
            Self::SensePortWritten { .. } => CommandKind::WriteSensePort,
            Self::NotificationSent { .. } => CommandKind::SendNotification,
            Self::ReadResponded { .. } => CommandKind::RespondRead,
            Self::WriteResponded { .. } => CommandKind::RespondWrite,
        }
    }

    pub fn result(&self) -> u16 {
        match *self {
            Self::DeviceNameSet { result }
            | Self::AdvertisingStarted { result }
            | Self::PollTimerStarted { result }
            | Self::PollTimerStopped { result }
            | Self::SensePortRead { result, .. }
            | Self::SensePortWritten { result }
            | Self::NotificationSent { result }
            | Self::ReadResponded { result }
            | Self::WriteResponded { result } => result,
        }
    }

    /// Successful response for `command` with default payload, or `None` for
    /// commands that are never answered.
    pub fn success_for(command: &Command) -> Option<Self> {
        Self::with_result(command, 0)
    }

    /// Response for `command` carrying the given result code.
    pub fn with_result(command: &Command, result: u16) -> Option<Self> {
        let response = match *command {
            Command::SystemReset => return None,
            Command::SetDeviceName { .. } => Self::DeviceNameSet { result },
            Command::StartAdvertising { .. } => Self::AdvertisingStarted { result },
            Command::StartPollTimer { .. } => Self::PollTimerStarted { result },
            Command::StopPollTimer { .. } => Self::PollTimerStopped { result },
            Command::ReadSensePort { port, .. } => Self::SensePortRead {
                result,
                port,
                data: 0,
            },
            Command::WriteSensePort { .. } => Self::SensePortWritten { result },
            Command::SendNotification { .. } => Self::NotificationSent { result },
            Command::RespondRead { .. } => Self::ReadResponded { result },
            Command::RespondWrite { .. } => Self::WriteResponded { result },
        };
        Some(response)
    }
}
