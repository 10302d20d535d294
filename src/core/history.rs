//! State transition history tracking.
//!
//! Provides immutable tracking of phase transitions over time. The session
//! runs for the lifetime of the process, so histories can be bounded: once
//! the capacity is reached the oldest transition is dropped.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use bgapi_gpio::core::{Phase, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Phase::Idle,
///     to: Phase::Advertising,
///     timestamp: Utc::now(),
///     trigger: "Boot".to_string(),
/// };
/// assert_eq!(transition.trigger, "Boot");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Name of the event that caused the transition
    pub trigger: String,
}

/// Ordered history of state transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use bgapi_gpio::core::{Phase, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: Phase::Idle,
///         to: Phase::Advertising,
///         timestamp: Utc::now(),
///         trigger: "Boot".to_string(),
///     })
///     .record(StateTransition {
///         from: Phase::Advertising,
///         to: Phase::Connected,
///         timestamp: Utc::now(),
///         trigger: "ConnectionOpened".to_string(),
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&Phase::Idle, &Phase::Advertising, &Phase::Connected]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
    capacity: Option<usize>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            capacity: None,
        }
    }

    /// Create an empty history that keeps at most `capacity` transitions.
    ///
    /// A capacity of zero keeps nothing.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity.min(1024)),
            capacity: Some(capacity),
        }
    }

    /// Maximum number of transitions retained, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Record a transition, returning a new history.
    ///
    /// Does not mutate the existing history. When the history is bounded
    /// and full, the oldest transition is evicted.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        if let Some(capacity) = self.capacity {
            let excess = transitions.len().saturating_sub(capacity);
            transitions.drain(..excess);
        }
        Self {
            transitions,
            capacity: self.capacity,
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the `from` state of the
    /// oldest retained transition, then the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last retained transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Get all retained transitions, oldest first.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
