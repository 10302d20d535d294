//! Events pushed by the firmware.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `status_flags` value reporting a client characteristic configuration change.
pub const STATUS_CLIENT_CONFIG: u8 = 0x01;
/// `status_flags` value reporting an indication confirmation.
pub const STATUS_CONFIRMATION: u8 = 0x02;

/// Client configuration bit: notifications enabled.
pub const CONFIG_NOTIFICATION: u16 = 0x0001;
/// Client configuration bit: indications enabled.
pub const CONFIG_INDICATION: u16 = 0x0002;

/// Firmware build reported at boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
    pub bootloader: u32,
    pub hw: u16,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{} build {} (bootloader {}, hw {})",
            self.major, self.minor, self.patch, self.build, self.bootloader, self.hw
        )
    }
}

/// Bluetooth device address, little-endian as received on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BdAddr(pub [u8; 6]);

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

/// Remote side of a freshly opened connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub address: BdAddr,
    pub address_type: u8,
    /// True when the local device is the link master.
    pub master: bool,
    /// Bonding handle, `0xff` when not bonded.
    pub bonding: u8,
}

/// Inbound firmware event.
///
/// The set is closed: the session machine matches on it exhaustively, so a
/// new kind cannot be forgotten silently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Boot {
        version: FirmwareVersion,
    },
    ConnectionOpened {
        handle: u8,
        peer: Peer,
    },
    ConnectionClosed {
        handle: u8,
        reason: u16,
    },
    CharacteristicStatusChanged {
        connection: u8,
        characteristic: u16,
        status_flags: u8,
        config_flags: u16,
    },
    UserReadRequest {
        connection: u8,
        characteristic: u16,
    },
    UserWriteRequest {
        connection: u8,
        characteristic: u16,
        payload: Vec<u8>,
    },
    TimerTick {
        timer_id: u8,
    },
}

impl Event {
    /// Stable kind name used in logs and history records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boot { .. } => "Boot",
            Self::ConnectionOpened { .. } => "ConnectionOpened",
            Self::ConnectionClosed { .. } => "ConnectionClosed",
            Self::CharacteristicStatusChanged { .. } => "CharacteristicStatusChanged",
            Self::UserReadRequest { .. } => "UserReadRequest",
            Self::UserWriteRequest { .. } => "UserWriteRequest",
            Self::TimerTick { .. } => "TimerTick",
        }
    }
}

/// Attribute-value event layout laid over a user request.
///
/// User read and write requests start with the same `connection: u8,
/// characteristic: u16` header as the attribute-value event's
/// `connection: u8, attribute: u16`. Error replies to user requests are
/// addressed through this view rather than through the request's own
/// fields, and the write handler validates its characteristic through the
/// read-request view of the same header. Both views resolve to the request
/// header today; the coupling is kept explicit so it stays visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeValueView {
    pub connection: u8,
    pub attribute: u16,
}

impl AttributeValueView {
    /// Lay the view over a user request header.
    pub fn from_request(connection: u8, characteristic: u16) -> Self {
        Self {
            connection,
            attribute: characteristic,
        }
    }

    /// View the leading header of a user request; `None` for other events.
    pub fn of(event: &Event) -> Option<Self> {
        match *event {
            Event::UserReadRequest {
                connection,
                characteristic,
            }
            | Event::UserWriteRequest {
                connection,
                characteristic,
                ..
            } => Some(Self::from_request(connection, characteristic)),
            _ => None,
        }
    }
}

/// Characteristic field of a user request read through the read-request
/// layout. Shares the header with [`AttributeValueView`].
pub fn read_request_characteristic(event: &Event) -> Option<u16> {
    AttributeValueView::of(event).map(|view| view.attribute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_displays_most_significant_byte_first() {
        let addr = BdAddr([0x01, 0x02, 0x03, 0x04, 0x05, 0xab]);
        assert_eq!(addr.to_string(), "ab:05:04:03:02:01");
    }

    #[test]
    fn firmware_version_display() {
        let version = FirmwareVersion {
            major: 2,
            minor: 13,
            patch: 4,
            build: 150,
            bootloader: 17563648,
            hw: 1,
        };
        assert_eq!(
            version.to_string(),
            "2.13.4 build 150 (bootloader 17563648, hw 1)"
        );
    }

    #[test]
    fn attribute_value_view_covers_user_requests_only() {
        let read = Event::UserReadRequest {
            connection: 3,
            characteristic: 11,
        };
        let write = Event::UserWriteRequest {
            connection: 4,
            characteristic: 12,
            payload: vec![1],
        };
        assert_eq!(
            AttributeValueView::of(&read),
            Some(AttributeValueView {
                connection: 3,
                attribute: 11
            })
        );
        assert_eq!(
            AttributeValueView::of(&write),
            Some(AttributeValueView {
                connection: 4,
                attribute: 12
            })
        );
        assert_eq!(AttributeValueView::of(&Event::TimerTick { timer_id: 0 }), None);
        assert_eq!(read_request_characteristic(&write), Some(12));
    }

    #[test]
    fn view_from_request_matches_view_of_event() {
        let read = Event::UserReadRequest {
            connection: 2,
            characteristic: 40,
        };
        assert_eq!(
            AttributeValueView::of(&read),
            Some(AttributeValueView::from_request(2, 40))
        );
    }

    #[test]
    fn event_names_are_stable() {
        assert_eq!(Event::TimerTick { timer_id: 0 }.name(), "TimerTick");
        assert_eq!(
            Event::ConnectionClosed {
                handle: 1,
                reason: 0x0213
            }
            .name(),
            "ConnectionClosed"
        );
    }
}
