//! Message types exchanged with the BLE firmware.
//!
//! - [`Event`]: firmware-pushed, one variant per event kind
//! - [`Command`] / [`Response`]: one-shot requests and their typed answers
//! - [`Reply`]: policy mapping request outcomes to GATT response commands

mod command;
mod event;
mod status;

pub use command::{
    soft_timer_ticks, Command, CommandKind, Response, GENERAL_DISCOVERABLE, SOFT_TIMER_CLOCK_HZ,
    UNDIRECTED_CONNECTABLE,
};
pub use event::{
    read_request_characteristic, AttributeValueView, BdAddr, Event, FirmwareVersion, Peer,
    CONFIG_INDICATION, CONFIG_NOTIFICATION, STATUS_CLIENT_CONFIG, STATUS_CONFIRMATION,
};
pub use status::{GattStatus, Rejection, Reply};
