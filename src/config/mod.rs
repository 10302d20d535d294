//! Session configuration.
//!
//! Defaults describe the stock GPIO demo: the PB1 button on PF7 (active
//! low) as the sense input, LED0 on PF6 (active low) as the output, and the
//! attribute handles assigned by the demo's GATT database.

pub mod builder;
pub mod error;

pub use builder::SessionConfigBuilder;
pub use error::ConfigError;

use crate::protocol::{GENERAL_DISCOVERABLE, UNDIRECTED_CONNECTABLE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name written to the device-name attribute at boot.
pub const DEFAULT_DEVICE_NAME: &str = "BGM111 GPIO Demo";
/// GATT database handle of the device-name characteristic.
pub const DEFAULT_DEVICE_NAME_ATTRIBUTE: u16 = 3;
/// GATT database handle of the sense characteristic.
pub const DEFAULT_SENSE_CHARACTERISTIC: u16 = 11;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_POLL_TIMER: u8 = 0;
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;
/// Longest device name the GAP device-name characteristic accepts.
pub const MAX_DEVICE_NAME_LEN: usize = 248;

/// One or more pins of a firmware GPIO port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioLine {
    pub port: u8,
    pub mask: u16,
    /// Low electrical level means "asserted".
    pub active_low: bool,
}

impl GpioLine {
    /// Whether the line is asserted in the sampled port `bits`.
    pub fn is_asserted(&self, bits: u16) -> bool {
        let high = bits & self.mask != 0;
        high != self.active_low
    }

    /// Port value that drives the line to `asserted`.
    pub fn pattern(&self, asserted: bool) -> u16 {
        if asserted != self.active_low {
            self.mask
        } else {
            0
        }
    }
}

/// Advertising parameters used at boot and after every disconnect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisingMode {
    pub discoverable: u8,
    pub connectable: u8,
}

impl Default for AdvertisingMode {
    fn default() -> Self {
        Self {
            discoverable: GENERAL_DISCOVERABLE,
            connectable: UNDIRECTED_CONNECTABLE,
        }
    }
}

/// Everything the session machine needs to know about the device layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub device_name: String,
    pub device_name_attribute: u16,
    pub sense_characteristic: u16,
    pub poll_interval: Duration,
    pub poll_timer: u8,
    pub input: GpioLine,
    pub output: GpioLine,
    pub advertising: AdvertisingMode,
    /// Post a firmware reset before consuming events.
    pub reset_on_start: bool,
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            device_name_attribute: DEFAULT_DEVICE_NAME_ATTRIBUTE,
            sense_characteristic: DEFAULT_SENSE_CHARACTERISTIC,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timer: DEFAULT_POLL_TIMER,
            input: GpioLine {
                port: 5,
                mask: 0x0080,
                active_low: true,
            },
            output: GpioLine {
                port: 5,
                mask: 0x0040,
                active_low: true,
            },
            advertising: AdvertisingMode::default(),
            reset_on_start: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_name.is_empty() {
            return Err(ConfigError::EmptyDeviceName);
        }
        if self.device_name.len() > MAX_DEVICE_NAME_LEN {
            return Err(ConfigError::DeviceNameTooLong {
                len: self.device_name.len(),
                max: MAX_DEVICE_NAME_LEN,
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.input.mask == 0 {
            return Err(ConfigError::EmptyMask { line: "input" });
        }
        if self.output.mask == 0 {
            return Err(ConfigError::EmptyMask { line: "output" });
        }
        if self.sense_characteristic == self.device_name_attribute {
            return Err(ConfigError::AttributeClash {
                handle: self.sense_characteristic,
            });
        }
        Ok(())
    }
}
