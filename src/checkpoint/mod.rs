//! Session snapshots for diagnostics.
//!
//! A checkpoint captures the session state and its phase history so a run
//! can be inspected after the fact or attached to a bug report. Snapshots
//! are written as JSON for humans and as bincode for compact storage.

use crate::core::{Phase, StateHistory};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a running session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Session state at capture time
    pub session: Session,

    /// Phase transitions up to capture time
    pub history: StateHistory<Phase>,
}

impl Checkpoint {
    pub fn new(session: Session, history: StateHistory<Phase>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session,
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Phase the session was in when captured.
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        // The last recorded transition must land on the captured phase.
        if let Some(last) = self.history.last() {
            if last.to != self.phase() {
                return Err(CheckpointError::ValidationFailed(format!(
                    "history ends in {:?} but session is {:?}",
                    last.to,
                    self.phase()
                )));
            }
        }
        Ok(())
    }
}
