//! Property-based tests for the session machine and its history.
//!
//! These tests use proptest to drive the machine with random event
//! sequences against the simulated firmware and check that the session
//! invariants hold after every step.

use bgapi_gpio::client::{Client, SimulatedFirmware};
use bgapi_gpio::config::SessionConfig;
use bgapi_gpio::core::{Phase, State, StateHistory, StateTransition};
use bgapi_gpio::protocol::{Command, Event, FirmwareVersion, Peer};
use bgapi_gpio::session::SessionMachine;
use chrono::Utc;
use proptest::prelude::*;

const SENSE: u16 = 11;

prop_compose! {
    fn arbitrary_phase()(variant in 0..4u8) -> Phase {
        match variant {
            0 => Phase::Idle,
            1 => Phase::Advertising,
            2 => Phase::Connected,
            _ => Phase::Subscribed,
        }
    }
}

prop_compose! {
    fn arbitrary_characteristic()(other in any::<bool>()) -> u16 {
        if other { SENSE + 1 } else { SENSE }
    }
}

prop_compose! {
    /// Raw samples of the sense port: input pin high or low.
    fn port_samples()(
        samples in prop::collection::vec(prop_oneof![Just(0x0000u16), Just(0x0080u16)], 0..64)
    ) -> Vec<u16> {
        samples
    }
}

fn arbitrary_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Boot {
            version: FirmwareVersion::default()
        }),
        (1u8..4).prop_map(|handle| Event::ConnectionOpened {
            handle,
            peer: Peer::default()
        }),
        (1u8..4, any::<u16>()).prop_map(|(handle, reason)| Event::ConnectionClosed {
            handle,
            reason
        }),
        (arbitrary_characteristic(), 0u8..3, 0u16..4).prop_map(
            |(characteristic, status_flags, config_flags)| {
                Event::CharacteristicStatusChanged {
                    connection: 1,
                    characteristic,
                    status_flags,
                    config_flags,
                }
            }
        ),
        arbitrary_characteristic().prop_map(|characteristic| Event::UserReadRequest {
            connection: 1,
            characteristic
        }),
        (
            arbitrary_characteristic(),
            prop::collection::vec(any::<u8>(), 0..3)
        )
            .prop_map(|(characteristic, payload)| Event::UserWriteRequest {
                connection: 1,
                characteristic,
                payload
            }),
        (0u8..2).prop_map(|timer_id| Event::TimerTick { timer_id }),
        (0u8..2).prop_map(|timer_id| Event::TimerTick { timer_id }),
    ]
}

fn client_with(samples: Vec<u16>) -> Client<SimulatedFirmware> {
    let mut firmware = SimulatedFirmware::new();
    firmware.set_port(5, 0x00c0).push_reads(samples);
    Client::new(firmware)
}

fn count(commands: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
    commands.iter().filter(|c| pred(c)).count()
}

proptest! {
    #[test]
    fn subscription_implies_connection(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        samples in port_samples()
    ) {
        let mut client = client_with(samples);
        let mut machine = SessionMachine::new(SessionConfig::default());

        for event in &events {
            machine.handle(&mut client, event).unwrap();
            let session = machine.session();
            if session.is_subscribed() {
                prop_assert!(session.handle().is_some());
                prop_assert_eq!(machine.phase(), Phase::Subscribed);
            }
            if !session.is_connected() {
                prop_assert!(!session.is_subscribed());
            }
        }
    }

    #[test]
    fn connection_events_drive_the_poll_timer(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        samples in port_samples()
    ) {
        let mut client = client_with(samples);
        let mut machine = SessionMachine::new(SessionConfig::default());

        for event in &events {
            machine.handle(&mut client, event).unwrap();
            let sent = client.transport_mut().take_commands();
            let starts = count(&sent, |c| matches!(c, Command::StartPollTimer { .. }));
            let stops = count(&sent, |c| matches!(c, Command::StopPollTimer { .. }));
            let adverts = count(&sent, |c| matches!(c, Command::StartAdvertising { .. }));

            match event {
                Event::ConnectionOpened { .. } => {
                    prop_assert_eq!(starts, 1);
                    prop_assert_eq!(stops, 0);
                }
                Event::ConnectionClosed { .. } => {
                    prop_assert_eq!(stops, 1);
                    prop_assert_eq!(adverts, 1);
                    prop_assert_eq!(machine.phase(), Phase::Advertising);
                }
                Event::Boot { .. } => {
                    prop_assert_eq!(adverts, 1);
                }
                _ => {
                    prop_assert_eq!(starts + stops + adverts, 0);
                }
            }
        }
    }

    #[test]
    fn tick_notifies_only_on_subscribed_change(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        samples in port_samples()
    ) {
        let mut client = client_with(samples);
        let mut machine = SessionMachine::new(SessionConfig::default());

        for event in &events {
            let cached = machine.session().sensed_value();
            let subscribed = machine.session().is_subscribed();
            machine.handle(&mut client, event).unwrap();
            let sent = client.transport_mut().take_commands();

            if let Event::TimerTick { timer_id } = event {
                let notified = count(&sent, |c| matches!(c, Command::SendNotification { .. }));
                let polled = *timer_id == 0 && machine.session().is_connected();
                let changed = polled && machine.session().sensed_value() != cached;
                prop_assert_eq!(notified, usize::from(subscribed && changed));
                if !polled {
                    prop_assert!(sent.is_empty());
                }
            }
        }
    }

    #[test]
    fn every_request_gets_exactly_one_reply(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        samples in port_samples()
    ) {
        let mut client = client_with(samples);
        let mut machine = SessionMachine::new(SessionConfig::default());

        for event in &events {
            machine.handle(&mut client, event).unwrap();
            let sent = client.transport_mut().take_commands();
            let replies = count(&sent, |c| {
                matches!(c, Command::RespondRead { .. } | Command::RespondWrite { .. })
            });
            let is_request = matches!(
                event,
                Event::UserReadRequest { .. } | Event::UserWriteRequest { .. }
            );
            prop_assert_eq!(replies, usize::from(is_request));
        }
    }

    #[test]
    fn recorded_history_is_a_connected_path(
        events in prop::collection::vec(arbitrary_event(), 0..60),
        samples in port_samples(),
        capacity in 1usize..8
    ) {
        let mut client = client_with(samples);
        let config = SessionConfig::builder().history_capacity(capacity).build().unwrap();
        let mut machine = SessionMachine::new(config);

        for event in &events {
            machine.handle(&mut client, event).unwrap();
        }

        let history = machine.history();
        prop_assert!(history.len() <= capacity);
        for pair in history.transitions().windows(2) {
            prop_assert_eq!(pair[0].to, pair[1].from);
        }
        for transition in history.transitions() {
            prop_assert_ne!(transition.from, transition.to);
        }
        if let Some(last) = history.last() {
            prop_assert_eq!(last.to, machine.phase());
        }
    }

    #[test]
    fn phase_serializes_under_its_name(phase in arbitrary_phase()) {
        let json = serde_json::to_string(&phase).unwrap();
        prop_assert_eq!(&json, &format!("\"{}\"", phase.name()));
        let deserialized: Phase = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(deserialized, phase);
        prop_assert!(!phase.is_final());
    }

    #[test]
    fn history_record_is_pure(from in arbitrary_phase(), to in arbitrary_phase()) {
        let history = StateHistory::new();

        let new_history = history.record(StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            trigger: "TimerTick".to_string(),
        });

        // Original history unchanged
        prop_assert_eq!(history.transitions().len(), 0);
        // New history has the transition
        prop_assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn history_roundtrip_serialization(
        phases in prop::collection::vec(arbitrary_phase(), 0..5)
    ) {
        let mut history = StateHistory::new();
        let mut from = Phase::Idle;
        for to in phases {
            history = history.record(StateTransition {
                from,
                to,
                timestamp: Utc::now(),
                trigger: "Boot".to_string(),
            });
            from = to;
        }

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<Phase> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(history, deserialized);
    }
}
