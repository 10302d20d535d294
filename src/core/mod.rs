//! Core state types.
//!
//! This module contains the pure part of the session machine:
//! - State definitions via the `State` trait and the session [`Phase`]
//! - Immutable, optionally bounded history tracking
//!
//! Nothing here talks to the firmware.

mod history;
mod state;

pub use history::{StateHistory, StateTransition};
pub use state::{Phase, State};
