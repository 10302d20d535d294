//! Builder for constructing session configurations.

use super::{AdvertisingMode, ConfigError, GpioLine, SessionConfig};
use std::time::Duration;

/// Builder for [`SessionConfig`] with a fluent API.
///
/// Starts from the demo defaults; `build()` validates the result.
///
/// ```
/// use bgapi_gpio::config::SessionConfigBuilder;
/// use std::time::Duration;
///
/// let config = SessionConfigBuilder::new()
///     .device_name("Bench Rig")
///     .poll_interval(Duration::from_millis(20))
///     .build()
///     .unwrap();
/// assert_eq!(config.device_name, "Bench Rig");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.config.device_name = name.into();
        self
    }

    pub fn device_name_attribute(mut self, handle: u16) -> Self {
        self.config.device_name_attribute = handle;
        self
    }

    pub fn sense_characteristic(mut self, handle: u16) -> Self {
        self.config.sense_characteristic = handle;
        self
    }

    /// Interval of the repeating soft timer that drives sense polling.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn poll_timer(mut self, timer_id: u8) -> Self {
        self.config.poll_timer = timer_id;
        self
    }

    pub fn input(mut self, line: GpioLine) -> Self {
        self.config.input = line;
        self
    }

    pub fn output(mut self, line: GpioLine) -> Self {
        self.config.output = line;
        self
    }

    pub fn advertising(mut self, mode: AdvertisingMode) -> Self {
        self.config.advertising = mode;
        self
    }

    pub fn reset_on_start(mut self, reset: bool) -> Self {
        self.config.reset_on_start = reset;
        self
    }

    /// Number of phase transitions retained in the session history.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Build the configuration.
    /// Returns an error if any field fails validation.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
