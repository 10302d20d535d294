//! Simulated GPIO Session
//!
//! This example runs the session machine against an in-process firmware
//! simulation: the device boots, a phone connects and subscribes, the
//! button is pressed and released, the phone toggles the LED and then
//! disconnects.
//!
//! Key concepts:
//! - Driving the machine from a scripted event stream
//! - Push notifications on sensed-value changes only
//! - Phase history and checkpoints for diagnostics
//!
//! Run with: RUST_LOG=debug cargo run --example simulated_session

use bgapi_gpio::client::{Client, SimulatedFirmware};
use bgapi_gpio::config::SessionConfig;
use bgapi_gpio::protocol::{
    BdAddr, Command, Event, FirmwareVersion, Peer, CONFIG_NOTIFICATION, STATUS_CLIENT_CONFIG,
};
use bgapi_gpio::session::SessionMachine;
use tracing_subscriber::EnvFilter;

const SENSE: u16 = 11;
const RELEASED: u16 = 0x0080;
const PRESSED: u16 = 0x0000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Simulated GPIO Session ===\n");

    let version = FirmwareVersion {
        major: 2,
        minor: 13,
        patch: 4,
        build: 150,
        bootloader: 17563648,
        hw: 1,
    };
    let mut firmware = SimulatedFirmware::booting(version);
    firmware
        .set_port(5, RELEASED)
        .push_reads([RELEASED, RELEASED, PRESSED, PRESSED, RELEASED])
        .push_events([
            Event::ConnectionOpened {
                handle: 1,
                peer: Peer {
                    address: BdAddr([0x5e, 0x3a, 0x11, 0x7c, 0x0b, 0x00]),
                    ..Peer::default()
                },
            },
            Event::CharacteristicStatusChanged {
                connection: 1,
                characteristic: SENSE,
                status_flags: STATUS_CLIENT_CONFIG,
                config_flags: CONFIG_NOTIFICATION,
            },
            Event::TimerTick { timer_id: 0 },
            Event::TimerTick { timer_id: 0 },
            Event::TimerTick { timer_id: 0 },
            Event::TimerTick { timer_id: 0 },
            Event::UserWriteRequest {
                connection: 1,
                characteristic: SENSE,
                payload: vec![1],
            },
            Event::ConnectionClosed {
                handle: 1,
                reason: 0x0213,
            },
        ]);

    let mut client = Client::new(firmware);
    let mut machine = SessionMachine::new(SessionConfig::default());
    machine.run(&mut client)?;

    println!("\nCommands sent:");
    for command in client.transport().commands() {
        println!("  {command:?}");
    }

    let notifications = client
        .transport()
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::SendNotification { .. }))
        .count();
    println!("\nNotifications pushed: {notifications}");

    println!("\nPhase path:");
    for phase in machine.history().get_path() {
        println!("  {phase:?}");
    }

    let checkpoint = machine.checkpoint();
    println!("\nCheckpoint {}:", checkpoint.id);
    println!("{}", checkpoint.to_json()?);

    println!("\n=== Example Complete ===");
    Ok(())
}
