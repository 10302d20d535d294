//! Event-driven session machine.

use super::error::SessionError;
use super::state::Session;
use crate::checkpoint::Checkpoint;
use crate::client::{Client, ClientError, Transport};
use crate::config::SessionConfig;
use crate::core::{Phase, State, StateHistory, StateTransition};
use crate::protocol::{
    read_request_characteristic, AttributeValueView, Event, FirmwareVersion, Peer,
    Rejection, Reply, CONFIG_INDICATION, CONFIG_NOTIFICATION, STATUS_CLIENT_CONFIG,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Drives a [`Session`] from firmware events.
///
/// Every command a handler issues completes before `handle` returns, so
/// the session is never observed half-updated by the next event.
pub struct SessionMachine {
    config: SessionConfig,
    session: Session,
    history: StateHistory<Phase>,
}

impl SessionMachine {
    pub fn new(config: SessionConfig) -> Self {
        let history = StateHistory::bounded(config.history_capacity);
        Self {
            config,
            session: Session::new(),
            history,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Phase transitions, oldest first, bounded by `history_capacity`.
    pub fn history(&self) -> &StateHistory<Phase> {
        &self.history
    }

    /// Snapshot of the session and its history for diagnostics.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.session.clone(), self.history.clone())
    }

    /// Consume events until the stream ends or a command fails.
    ///
    /// Posts a firmware reset first when `reset_on_start` is set; the
    /// firmware answers it with the `Boot` event that starts advertising.
    pub fn run<T: Transport>(&mut self, client: &mut Client<T>) -> Result<(), SessionError> {
        if self.config.reset_on_start {
            info!("resetting firmware");
            client.reset_system()?;
        }

        while let Some(event) = client.next_event()? {
            self.handle(client, &event)?;
        }

        info!(phase = self.phase().name(), "event stream ended");
        Ok(())
    }

    /// Apply one event, issuing whatever commands it calls for.
    pub fn handle<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        event: &Event,
    ) -> Result<(), SessionError> {
        let before = self.session.phase();
        let outcome = self.dispatch(client, event);
        self.record_transition(before, event);

        outcome.map_err(|source| {
            error!(event = event.name(), %source, "handler failed");
            SessionError::Handler {
                event: event.name(),
                source,
            }
        })
    }

    fn dispatch<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        event: &Event,
    ) -> Result<(), ClientError> {
        match event {
            Event::Boot { version } => self.on_boot(client, version),
            Event::ConnectionOpened { handle, peer } => {
                self.on_connection_opened(client, *handle, peer)
            }
            Event::ConnectionClosed { handle, reason } => {
                self.on_connection_closed(client, *handle, *reason)
            }
            Event::CharacteristicStatusChanged {
                connection,
                characteristic,
                status_flags,
                config_flags,
            } => self.on_status_changed(
                client,
                *connection,
                *characteristic,
                *status_flags,
                *config_flags,
            ),
            Event::UserReadRequest {
                connection,
                characteristic,
            } => self.on_read_request(
                client,
                AttributeValueView::from_request(*connection, *characteristic),
                *connection,
                *characteristic,
            ),
            Event::UserWriteRequest {
                connection,
                characteristic,
                payload,
            } => self.on_write_request(
                client,
                event,
                AttributeValueView::from_request(*connection, *characteristic),
                *connection,
                *characteristic,
                payload,
            ),
            Event::TimerTick { timer_id } => self.on_timer_tick(client, *timer_id),
        }
    }

    fn on_boot<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        version: &FirmwareVersion,
    ) -> Result<(), ClientError> {
        info!(%version, "firmware booted");
        client.set_device_name(self.config.device_name_attribute, &self.config.device_name)?;
        client.start_advertising(self.config.advertising)?;
        self.session.start_advertising();
        info!(name = %self.config.device_name, "advertising, awaiting connection");
        Ok(())
    }

    fn on_connection_opened<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        handle: u8,
        peer: &Peer,
    ) -> Result<(), ClientError> {
        info!(
            handle,
            address = %peer.address,
            address_type = peer.address_type,
            master = peer.master,
            bonding = peer.bonding,
            "connection opened"
        );
        self.session.open(handle);
        client.start_poll_timer(self.config.poll_interval, self.config.poll_timer)
    }

    fn on_connection_closed<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        handle: u8,
        reason: u16,
    ) -> Result<(), ClientError> {
        info!(handle, reason = format_args!("0x{reason:04x}"), "connection closed");
        self.session.close();
        client.stop_poll_timer(self.config.poll_timer)?;
        client.start_advertising(self.config.advertising)?;
        self.session.start_advertising();
        Ok(())
    }

    fn on_status_changed<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        connection: u8,
        characteristic: u16,
        status_flags: u8,
        config_flags: u16,
    ) -> Result<(), ClientError> {
        if characteristic != self.config.sense_characteristic {
            warn!(characteristic, "status changed on unexpected characteristic");
            return Ok(());
        }
        if status_flags != STATUS_CLIENT_CONFIG {
            return Ok(());
        }

        if config_flags & (CONFIG_NOTIFICATION | CONFIG_INDICATION) == 0 {
            self.session.set_subscribed(false);
            info!("sense updates disabled by client");
            return Ok(());
        }

        self.session.set_subscribed(true);
        info!("sense updates enabled by client");

        // Push the current value right away, changed or not.
        let (value, _) = self.sample(client)?;
        client.send_notification(connection, characteristic, &[u8::from(value)])
    }

    fn on_read_request<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        view: AttributeValueView,
        connection: u8,
        characteristic: u16,
    ) -> Result<(), ClientError> {
        if characteristic != self.config.sense_characteristic {
            return reject(client, view, Rejection::InvalidCharacteristic);
        }

        let (value, _) = self.sample(client)?;
        debug!(connection, value, "answering sense read");
        client.reply(Reply::read(
            connection,
            characteristic,
            vec![u8::from(value)],
        ))
    }

    fn on_write_request<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        event: &Event,
        view: AttributeValueView,
        connection: u8,
        characteristic: u16,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        if read_request_characteristic(event) != Some(self.config.sense_characteristic) {
            return reject(client, view, Rejection::InvalidCharacteristic);
        }
        let [byte] = payload else {
            return reject(client, view, Rejection::InvalidLength);
        };

        let on = *byte != 0;
        let output = self.config.output;
        client.write_sense_port(&output, output.pattern(on))?;
        info!(on, "output updated");
        client.reply(Reply::write(connection, characteristic))
    }

    fn on_timer_tick<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        timer_id: u8,
    ) -> Result<(), ClientError> {
        // Ticks already queued when the link dropped still arrive.
        let Some(handle) = self.session.handle() else {
            debug!(timer_id, "tick while disconnected ignored");
            return Ok(());
        };
        if timer_id != self.config.poll_timer {
            return Ok(());
        }

        let (value, changed) = self.sample(client)?;
        if changed && self.session.is_subscribed() {
            debug!(value, "sense changed, notifying");
            client.send_notification(
                handle,
                self.config.sense_characteristic,
                &[u8::from(value)],
            )?;
        }
        Ok(())
    }

    /// Read the sense input and update the cache.
    /// Returns the value and whether it differs from the cached one.
    fn sample<T: Transport>(&mut self, client: &mut Client<T>) -> Result<(bool, bool), ClientError> {
        let bits = client.read_sense_port(&self.config.input)?;
        let value = self.config.input.is_asserted(bits);
        let changed = self.session.observe(value);
        Ok((value, changed))
    }

    fn record_transition(&mut self, before: Phase, event: &Event) {
        let after = self.session.phase();
        if after == before {
            return;
        }
        info!(
            from = before.name(),
            to = after.name(),
            trigger = event.name(),
            "phase changed"
        );
        self.history = self.history.record(StateTransition {
            from: before,
            to: after,
            timestamp: Utc::now(),
            trigger: event.name().to_string(),
        });
    }
}

/// Refuse a user request with an error status on a write response.
fn reject<T: Transport>(
    client: &mut Client<T>,
    target: AttributeValueView,
    rejection: Rejection,
) -> Result<(), ClientError> {
    warn!(
        connection = target.connection,
        attribute = target.attribute,
        status = format_args!("0x{:02x}", rejection.status().code()),
        ?rejection,
        "rejecting user request"
    );
    client.reply(Reply::reject(target, rejection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SimulatedFirmware;

    fn machine_with_capacity(capacity: usize) -> SessionMachine {
        let config = SessionConfig::builder()
            .history_capacity(capacity)
            .build()
            .unwrap();
        SessionMachine::new(config)
    }

    #[test]
    fn new_machine_is_idle_with_empty_history() {
        let machine = SessionMachine::new(SessionConfig::default());
        assert_eq!(machine.phase(), Phase::Idle);
        assert!(machine.history().is_empty());
        assert_eq!(machine.history().capacity(), Some(64));
    }

    #[test]
    fn events_that_keep_the_phase_leave_no_record() {
        let mut machine = SessionMachine::new(SessionConfig::default());
        let mut client = Client::new(SimulatedFirmware::new());

        machine
            .handle(
                &mut client,
                &Event::Boot {
                    version: FirmwareVersion::default(),
                },
            )
            .unwrap();
        machine
            .handle(&mut client, &Event::TimerTick { timer_id: 0 })
            .unwrap();
        machine
            .handle(
                &mut client,
                &Event::UserReadRequest {
                    connection: 1,
                    characteristic: 11,
                },
            )
            .unwrap();

        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.history().last().unwrap().trigger, "Boot");
    }

    #[test]
    fn history_drops_oldest_past_capacity() {
        let mut machine = machine_with_capacity(2);
        let mut client = Client::new(SimulatedFirmware::new());
        let events = [
            Event::Boot {
                version: FirmwareVersion::default(),
            },
            Event::ConnectionOpened {
                handle: 1,
                peer: Peer::default(),
            },
            Event::ConnectionClosed {
                handle: 1,
                reason: 0,
            },
        ];
        for event in &events {
            machine.handle(&mut client, event).unwrap();
        }

        assert_eq!(
            machine.history().get_path(),
            vec![&Phase::Advertising, &Phase::Connected, &Phase::Advertising]
        );
    }

    #[test]
    fn checkpoint_reflects_current_session() {
        let mut machine = SessionMachine::new(SessionConfig::default());
        let mut client = Client::new(SimulatedFirmware::new());
        machine
            .handle(
                &mut client,
                &Event::Boot {
                    version: FirmwareVersion::default(),
                },
            )
            .unwrap();

        let checkpoint = machine.checkpoint();
        assert_eq!(checkpoint.phase(), Phase::Advertising);
        assert_eq!(&checkpoint.session, machine.session());
        assert_eq!(checkpoint.history.len(), 1);
    }

    #[test]
    fn failed_stop_on_disconnect_lands_in_advertising() {
        let mut machine = SessionMachine::new(SessionConfig::default());
        let mut firmware = SimulatedFirmware::new();
        firmware.fail_next(crate::protocol::CommandKind::StopPollTimer, 0x0101);
        let mut client = Client::new(firmware);
        let events = [
            Event::Boot {
                version: FirmwareVersion::default(),
            },
            Event::ConnectionOpened {
                handle: 1,
                peer: Peer::default(),
            },
        ];
        for event in &events {
            machine.handle(&mut client, event).unwrap();
        }

        let closed = Event::ConnectionClosed {
            handle: 1,
            reason: 0x0213,
        };
        assert!(machine.handle(&mut client, &closed).is_err());

        assert_eq!(machine.phase(), Phase::Advertising);
        assert!(!machine.session().is_advertising());
        assert_eq!(
            machine.history().get_path(),
            vec![&Phase::Idle, &Phase::Advertising, &Phase::Connected, &Phase::Advertising]
        );
        assert_eq!(machine.checkpoint().phase(), Phase::Advertising);
    }
}
