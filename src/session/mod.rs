//! BLE peripheral session.
//!
//! [`Session`] holds connection, subscription and sensed-value state.
//! [`SessionMachine`] owns it and applies firmware events one at a time,
//! issuing commands through a [`Client`](crate::client::Client).

mod error;
mod machine;
mod state;

pub use error::SessionError;
pub use machine::SessionMachine;
pub use state::{Connection, Session};
