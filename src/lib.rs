//! bgapi-gpio: a BLE peripheral that exposes one GPIO input and one GPIO
//! output over a single GATT characteristic.
//!
//! The crate drives a BGAPI-style firmware over an ordered link of commands,
//! responses and events. The session logic is a plain state machine: it
//! consumes one [`Event`] at a time, issues synchronous commands through a
//! [`Client`], and records every phase change in an immutable history.
//!
//! # Core Concepts
//!
//! - **Protocol**: Typed events, commands and responses ([`protocol`])
//! - **Client**: One request in flight over a pluggable [`Transport`]
//! - **Session**: Connection, subscription and sensed-value state ([`session`])
//! - **History**: Immutable tracking of phase transitions over time
//!
//! # Example
//!
//! ```rust
//! use bgapi_gpio::client::{Client, SimulatedFirmware};
//! use bgapi_gpio::config::SessionConfig;
//! use bgapi_gpio::core::Phase;
//! use bgapi_gpio::protocol::{Event, FirmwareVersion, Peer};
//! use bgapi_gpio::session::SessionMachine;
//!
//! let mut firmware = SimulatedFirmware::booting(FirmwareVersion::default());
//! firmware.push_event(Event::ConnectionOpened {
//!     handle: 1,
//!     peer: Peer::default(),
//! });
//!
//! let mut client = Client::new(firmware);
//! let mut machine = SessionMachine::new(SessionConfig::default());
//! machine.run(&mut client).unwrap();
//!
//! assert_eq!(machine.phase(), Phase::Connected);
//! assert_eq!(
//!     machine.history().get_path(),
//!     vec![&Phase::Idle, &Phase::Advertising, &Phase::Connected]
//! );
//! ```

pub mod checkpoint;
pub mod client;
pub mod config;
pub mod core;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointError};
pub use client::{Client, ClientError, Transport, TransportError};
pub use config::{ConfigError, SessionConfig};
pub use core::{Phase, State, StateHistory, StateTransition};
pub use protocol::{Command, Event, Response};
pub use session::{Session, SessionError, SessionMachine};
