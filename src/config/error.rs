//! Configuration errors.

use thiserror::Error;

/// Errors that can occur when loading or building a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Device name must not be empty")]
    EmptyDeviceName,

    #[error("Device name is {len} bytes, at most {max} allowed")]
    DeviceNameTooLong { len: usize, max: usize },

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("GPIO mask for the {line} line selects no pins")]
    EmptyMask { line: &'static str },

    #[error("Sense characteristic and device name share attribute handle {handle}")]
    AttributeClash { handle: u16 },

    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
