//! Protocol client.
//!
//! [`Transport`] is the seam to the external framing layer. [`Client`] owns
//! a transport and exposes one method per command; each method sends its
//! command, waits for the answer and checks both its shape and its result
//! code before returning. Taking `&mut self` keeps a single request in
//! flight.

pub mod error;
pub mod simulated;

pub use error::{ClientError, TransportError};
pub use simulated::SimulatedFirmware;

use crate::config::{AdvertisingMode, GpioLine};
use crate::protocol::{soft_timer_ticks, Command, CommandKind, Event, Reply, Response};
use std::time::Duration;
use tracing::{debug, error};

/// Ordered request/response/event link to the firmware.
///
/// Events and responses share one stream; implementations must deliver
/// them in the order the firmware produced them.
pub trait Transport {
    /// Send a command and block until its response arrives.
    fn request(&mut self, command: &Command) -> Result<Response, TransportError>;

    /// Send a command that the firmware never answers.
    fn post(&mut self, command: &Command) -> Result<(), TransportError>;

    /// Block until the next event. `Ok(None)` means the stream has ended.
    fn next_event(&mut self) -> Result<Option<Event>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn request(&mut self, command: &Command) -> Result<Response, TransportError> {
        (**self).request(command)
    }

    fn post(&mut self, command: &Command) -> Result<(), TransportError> {
        (**self).post(command)
    }

    fn next_event(&mut self) -> Result<Option<Event>, TransportError> {
        (**self).next_event()
    }
}

/// Typed command interface over a [`Transport`].
pub struct Client<T: Transport> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    pub fn next_event(&mut self) -> Result<Option<Event>, ClientError> {
        let event = self.transport.next_event()?;
        if let Some(event) = &event {
            debug!(?event, "<- event");
        }
        Ok(event)
    }

    /// Reboot the firmware; the answer is a `Boot` event, not a response.
    pub fn reset_system(&mut self) -> Result<(), ClientError> {
        debug!("-> SystemReset");
        self.transport.post(&Command::SystemReset)?;
        Ok(())
    }

    pub fn set_device_name(&mut self, attribute: u16, name: &str) -> Result<(), ClientError> {
        self.exchange(Command::SetDeviceName {
            attribute,
            name: name.to_string(),
        })
        .map(drop)
    }

    pub fn start_advertising(&mut self, mode: AdvertisingMode) -> Result<(), ClientError> {
        self.exchange(Command::StartAdvertising {
            discoverable: mode.discoverable,
            connectable: mode.connectable,
        })
        .map(drop)
    }

    /// Start a repeating soft timer that fires `TimerTick { timer_id }`.
    pub fn start_poll_timer(&mut self, interval: Duration, timer_id: u8) -> Result<(), ClientError> {
        debug!(ticks = soft_timer_ticks(interval), timer_id, "poll timer interval");
        self.exchange(Command::StartPollTimer {
            interval,
            timer_id,
            single_shot: false,
        })
        .map(drop)
    }

    pub fn stop_poll_timer(&mut self, timer_id: u8) -> Result<(), ClientError> {
        self.exchange(Command::StopPollTimer { timer_id }).map(drop)
    }

    /// Sample the pins of `line`; returns the raw port bits.
    pub fn read_sense_port(&mut self, line: &GpioLine) -> Result<u16, ClientError> {
        let command = Command::ReadSensePort {
            port: line.port,
            mask: line.mask,
        };
        match self.exchange(command)? {
            Response::SensePortRead { data, .. } => Ok(data),
            other => Err(ClientError::ResponseMismatch {
                sent: CommandKind::ReadSensePort,
                received: other.answers(),
            }),
        }
    }

    pub fn write_sense_port(&mut self, line: &GpioLine, value: u16) -> Result<(), ClientError> {
        self.exchange(Command::WriteSensePort {
            port: line.port,
            mask: line.mask,
            value,
        })
        .map(drop)
    }

    pub fn send_notification(
        &mut self,
        connection: u8,
        characteristic: u16,
        value: &[u8],
    ) -> Result<(), ClientError> {
        self.exchange(Command::SendNotification {
            connection,
            characteristic,
            value: value.to_vec(),
        })
        .map(drop)
    }

    /// Answer a user read or write request. Both reply shapes map onto
    /// their response command through [`Reply::into_command`].
    pub fn reply(&mut self, reply: Reply) -> Result<(), ClientError> {
        self.exchange(reply.into_command()).map(drop)
    }

    fn exchange(&mut self, command: Command) -> Result<Response, ClientError> {
        let sent = command.kind();
        debug!(?command, "-> command");
        let response = self.transport.request(&command)?;
        debug!(?response, "<- response");

        let received = response.answers();
        if received != sent {
            error!(%sent, %received, "response does not answer the command");
            return Err(ClientError::ResponseMismatch { sent, received });
        }

        let result = response.result();
        if result != 0 {
            error!(command = %sent, result, "firmware rejected command");
            return Err(ClientError::CommandFailed {
                command: sent,
                result,
            });
        }

        Ok(response)
    }
}
