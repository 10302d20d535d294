//! Core State trait and the session phases.
//!
//! States are plain values describing where the session machine currently
//! is. They carry no behaviour of their own; the machine derives them from
//! the [`Session`](crate::session::Session) it owns.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure - no side effects.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable to detect transitions
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for checkpoints
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Observable phase of the peripheral session.
///
/// ```text
/// Idle --Boot--> Advertising --ConnectionOpened--> Connected <--> Subscribed
///                     ^                                |              |
///                     +-------- ConnectionClosed ------+--------------+
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Phase {
    /// Firmware has not reported boot yet.
    Idle,
    /// Booted with no peer; advertising is (re)started on entry.
    Advertising,
    /// A peer is connected but has not enabled notifications.
    Connected,
    /// A peer is connected and subscribed to the sense characteristic.
    Subscribed,
}

impl Phase {
    /// True while a peer link exists.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Subscribed)
    }
}

impl State for Phase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Advertising => "Advertising",
            Self::Connected => "Connected",
            Self::Subscribed => "Subscribed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_name_returns_correct_value() {
        assert_eq!(Phase::Idle.name(), "Idle");
        assert_eq!(Phase::Advertising.name(), "Advertising");
        assert_eq!(Phase::Connected.name(), "Connected");
        assert_eq!(Phase::Subscribed.name(), "Subscribed");
    }

    #[test]
    fn no_phase_is_final() {
        for phase in [
            Phase::Idle,
            Phase::Advertising,
            Phase::Connected,
            Phase::Subscribed,
        ] {
            assert!(!phase.is_final());
        }
    }

    #[test]
    fn is_connected_covers_both_link_phases() {
        assert!(!Phase::Idle.is_connected());
        assert!(!Phase::Advertising.is_connected());
        assert!(Phase::Connected.is_connected());
        assert!(Phase::Subscribed.is_connected());
    }

    #[test]
    fn phase_serializes_correctly() {
        let json = serde_json::to_string(&Phase::Subscribed).unwrap();
        assert_eq!(json, "\"Subscribed\"");
        let deserialized: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Phase::Subscribed);
    }
}
