//! Mutable session state owned by the event loop.

use crate::core::Phase;
use serde::{Deserialize, Serialize};

/// Link state. `subscribed` only exists while a peer is connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connection {
    #[default]
    Disconnected,
    Connected { handle: u8, subscribed: bool },
}

/// Connection, subscription and sensed-value state of the peripheral.
///
/// Fields are private so the subscription invariant can only be changed
/// through the transition methods below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    connection: Connection,
    sensed_value: Option<bool>,
    advertising: bool,
    booted: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Last value read from the sense input; `None` before the first read.
    pub fn sensed_value(&self) -> Option<bool> {
        self.sensed_value
    }

    pub fn handle(&self) -> Option<u8> {
        match self.connection {
            Connection::Connected { handle, .. } => Some(handle),
            Connection::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Connected { .. })
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(
            self.connection,
            Connection::Connected {
                subscribed: true,
                ..
            }
        )
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising
    }

    pub fn phase(&self) -> Phase {
        match self.connection {
            Connection::Connected {
                subscribed: true, ..
            } => Phase::Subscribed,
            Connection::Connected { .. } => Phase::Connected,
            Connection::Disconnected if self.booted => Phase::Advertising,
            Connection::Disconnected => Phase::Idle,
        }
    }

    /// Firmware has booted and advertising was started. Once booted, a
    /// disconnected session never reads as `Idle` again.
    pub(crate) fn start_advertising(&mut self) {
        self.advertising = true;
        self.booted = true;
    }

    /// Enter `Connected` unsubscribed; advertising stops with the link.
    pub(crate) fn open(&mut self, handle: u8) {
        self.connection = Connection::Connected {
            handle,
            subscribed: false,
        };
        self.advertising = false;
    }

    /// Drop the link and with it any subscription.
    pub(crate) fn close(&mut self) {
        self.connection = Connection::Disconnected;
    }

    /// Change the subscription flag. Ignored while disconnected.
    pub(crate) fn set_subscribed(&mut self, value: bool) {
        if let Connection::Connected { subscribed, .. } = &mut self.connection {
            *subscribed = value;
        }
    }

    /// Store a freshly read value; returns whether it differs from the cache.
    pub(crate) fn observe(&mut self, value: bool) -> bool {
        let changed = self.sensed_value != Some(value);
        self.sensed_value = Some(value);
        changed
    }
}
