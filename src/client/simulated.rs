//! In-process firmware stand-in used by tests and demos.
//!
//! Events are scripted up front, port reads can be scripted or served from
//! simulated port state, and every command received is recorded so callers
//! can assert on exactly what was sent.

use super::{Transport, TransportError};
use crate::protocol::{Command, CommandKind, Event, FirmwareVersion, Response};
use std::collections::{HashMap, VecDeque};
use std::io;

/// Scriptable firmware simulation implementing [`Transport`].
#[derive(Debug, Default)]
pub struct SimulatedFirmware {
    events: VecDeque<Event>,
    reads: VecDeque<u16>,
    ports: HashMap<u8, u16>,
    commands: Vec<Command>,
    failures: HashMap<CommandKind, u16>,
    overrides: VecDeque<Response>,
    boot_version: Option<FirmwareVersion>,
    link_broken: bool,
}

impl SimulatedFirmware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Firmware that pushes a `Boot` event after `SystemReset`.
    pub fn booting(version: FirmwareVersion) -> Self {
        Self {
            boot_version: Some(version),
            ..Self::default()
        }
    }

    pub fn push_event(&mut self, event: Event) -> &mut Self {
        self.events.push_back(event);
        self
    }

    pub fn push_events(&mut self, events: impl IntoIterator<Item = Event>) -> &mut Self {
        self.events.extend(events);
        self
    }

    /// Queue raw port values returned by the next port reads, in order.
    /// Once exhausted, reads fall back to the simulated port state.
    pub fn push_reads(&mut self, reads: impl IntoIterator<Item = u16>) -> &mut Self {
        self.reads.extend(reads);
        self
    }

    pub fn set_port(&mut self, port: u8, bits: u16) -> &mut Self {
        self.ports.insert(port, bits);
        self
    }

    pub fn port(&self, port: u8) -> u16 {
        self.ports.get(&port).copied().unwrap_or(0)
    }

    /// Answer the next command of `kind` with a non-zero result code.
    pub fn fail_next(&mut self, kind: CommandKind, result: u16) -> &mut Self {
        self.failures.insert(kind, result);
        self
    }

    /// Answer the next request with `response`, whatever was asked.
    pub fn answer_next_with(&mut self, response: Response) -> &mut Self {
        self.overrides.push_back(response);
        self
    }

    /// Make every further exchange fail as if the serial link dropped.
    pub fn break_link(&mut self) -> &mut Self {
        self.link_broken = true;
        self
    }

    /// Every command received so far, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn answer(&mut self, command: &Command) -> Option<Response> {
        if let Some(response) = self.overrides.pop_front() {
            return Some(response);
        }
        if let Some(result) = self.failures.remove(&command.kind()) {
            return Response::with_result(command, result);
        }

        match *command {
            Command::ReadSensePort { port, mask } => {
                let bits = self.reads.pop_front().unwrap_or_else(|| self.port(port));
                Some(Response::SensePortRead {
                    result: 0,
                    port,
                    data: bits & mask,
                })
            }
            Command::WriteSensePort { port, mask, value } => {
                let bits = (self.port(port) & !mask) | (value & mask);
                self.ports.insert(port, bits);
                Some(Response::SensePortWritten { result: 0 })
            }
            _ => Response::success_for(command),
        }
    }
}

impl Transport for SimulatedFirmware {
    fn request(&mut self, command: &Command) -> Result<Response, TransportError> {
        if self.link_broken {
            return Err(TransportError::Closed(command.kind()));
        }
        self.commands.push(command.clone());
        self.answer(command)
            .ok_or_else(|| TransportError::Closed(command.kind()))
    }

    fn post(&mut self, command: &Command) -> Result<(), TransportError> {
        if self.link_broken {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        self.commands.push(command.clone());
        if let (Command::SystemReset, Some(version)) = (command, self.boot_version) {
            self.events.push_front(Event::Boot { version });
        }
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<Event>, TransportError> {
        if self.link_broken {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        Ok(self.events.pop_front())
    }
}
