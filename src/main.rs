//! # Padlink
//!
//! Drive a wireless signal network with a gamepad.
//!
//! This binary runs the whole pipeline in one process as a loopback demo:
//! a controller session samples the local gamepad, encodes and throttles
//! state messages, and the authoritative side decodes them off the wire
//! framing and feeds the transmitter source registry.

use std::collections::VecDeque;

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use padlink::codec::decoder::{decode_axes, decode_buttons};
use padlink::codec::protocol::TRIGGER_AXIS_BASE;
use padlink::config::Config;
use padlink::controller::device::{EvdevGamepad, Gamepad, NoGamepad};
use padlink::network::{
    FrequencyPair, Location, SignalNetwork, TransmitterSource, UsageListener, UserId,
};
use padlink::profile::storage;
use padlink::profile::BindingProfile;
use padlink::registry::SourceRegistry;
use padlink::session::LinkSession;
use padlink::transport::frame::{decode_frame, encode_frame};
use padlink::transport::{LoopbackTransport, Message};

/// Number of auxiliary slots driven directly by the leading buttons.
const BUTTON_AUX_SLOTS: usize = 8;

/// The single demo user every loopback message is attributed to.
const DEMO_USER: UserId = UserId(1);

/// Signal network stand-in that logs registrations and reports one listener
/// on every frequency, so the demo exercises the usage award path.
#[derive(Debug, Default)]
struct LogNetwork {
    registrations: usize,
}

impl SignalNetwork for LogNetwork {
    fn add_entry(&mut self, source: &dyn TransmitterSource) {
        self.registrations += 1;
        info!(
            "network add: {:?} at strength {}",
            source.frequency(),
            source.strength()
        );
    }

    fn remove_entry(&mut self, source: &dyn TransmitterSource) {
        self.registrations = self.registrations.saturating_sub(1);
        info!("network remove: {:?}", source.frequency());
    }

    fn update_entry(&mut self, source: &dyn TransmitterSource) {
        debug!(
            "network update: {:?} -> {}",
            source.frequency(),
            source.strength()
        );
    }

    fn members_of(&self, _frequency: &FrequencyPair) -> usize {
        1
    }
}

/// Usage listener that just logs the award.
#[derive(Debug, Default)]
struct LogUsage;

impl UsageListener for LogUsage {
    fn award_usage(&mut self, user: UserId) {
        info!("usage awarded to user {:?}", user.0);
    }
}

/// Main entry point.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first CLI argument, defaults otherwise)
///    - Load the binding profile record, migrating a legacy one if present
///    - Open the configured gamepad, falling back to a rest-state stub
///
/// 2. **Main Loop** (one tick per period)
///    - Run the client session tick: sample, encode, throttled transmit
///    - Drain the loopback transport, round-tripping every message through
///      the wire framing
///    - Feed decoded messages into the source registry
///    - Run the registry decay pass
///
/// 3. **Graceful Shutdown** (Ctrl+C)
///    - Flush zeroed controller state
///    - Persist the binding profile record
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Padlink v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let mut record = load_record(&config.profile.path);
    let mut profile = storage::load(&record);

    // Give the demo something to transmit on when the profile is blank.
    if !profile.aux_slots().iter().any(|slot| slot.is_complete()) {
        profile.set_aux_frequency(0, FrequencyPair::new("padlink", "demo"));
        info!("assigned demo frequency to aux slot 0");
    }

    let mut gamepad: Box<dyn Gamepad> = match EvdevGamepad::open_index(config.controller.device_index)
    {
        Ok(pad) => Box::new(pad),
        Err(e) => {
            warn!("no gamepad available ({}), running with rest state", e);
            Box::new(NoGamepad)
        }
    };

    let mut transport = LoopbackTransport::new();
    let mut session = LinkSession::new();
    session.start_active(&mut transport)?;

    let mut registry = SourceRegistry::new();
    let mut net = LogNetwork::default();
    let mut usage = LogUsage;

    let period_ms = 1000 / config.runtime.tick_rate_hz;
    let mut tick_interval = interval(Duration::from_millis(period_ms));
    let status_every = config.runtime.tick_rate_hz * config.runtime.status_interval_secs;

    info!(
        "tick loop running at {}Hz, press Ctrl+C to exit",
        config.runtime.tick_rate_hz
    );

    let mut tick_count: u64 = 0;
    let mut inbound: VecDeque<Message> = VecDeque::new();

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                session.tick(gamepad.as_mut(), false, &mut transport)?;

                // The loopback "wire": every message gets framed, checked
                // and decoded exactly as a remote receiver would see it.
                for message in transport.drain() {
                    let bytes = encode_frame(&message);
                    match decode_frame(&bytes) {
                        Ok(decoded) => inbound.push_back(decoded),
                        Err(e) => warn!("dropping malformed frame: {}", e),
                    }
                }

                while let Some(message) = inbound.pop_front() {
                    handle_message(
                        &message,
                        &mut profile,
                        &mut registry,
                        &mut net,
                        &mut record,
                        &config.profile.path,
                    );
                }

                registry.tick(&mut net, &mut usage);

                tick_count += 1;
                if tick_count % status_every == 0 {
                    info!(
                        "tick {}: {} live sources, {} network registrations",
                        tick_count,
                        registry.source_count(),
                        net.registrations
                    );
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                session.cancel(&mut transport)?;
                storage::save(&profile, &mut record);
                save_record(&config.profile.path, &record);
                info!("Total ticks: {}", tick_count);
                break;
            }
        }
    }

    Ok(())
}

/// Routes one decoded message into profile and registry state.
fn handle_message(
    message: &Message,
    profile: &mut BindingProfile,
    registry: &mut SourceRegistry,
    net: &mut LogNetwork,
    record: &mut serde_json::Value,
    record_path: &str,
) {
    match message {
        Message::ButtonState { mask } => {
            apply_buttons(registry, net, profile, *mask, Location::default());
        }
        Message::AxisState { mask, location, .. } => {
            apply_axes(registry, net, profile, *mask, location.unwrap_or_default());
        }
        Message::SeatInput {
            location,
            button_mask,
            axis_mask,
        } => {
            apply_buttons(registry, net, profile, *button_mask, *location);
            apply_axes(registry, net, profile, *axis_mask, *location);
        }
        Message::BindRequest {
            input_index,
            location,
        } => {
            if profile.apply_bind(*input_index, *location, "block") {
                storage::save(profile, record);
                save_record(record_path, record);
            }
        }
    }
}

/// Buttons drive the fixed sources of the leading auxiliary slots.
fn apply_buttons(
    registry: &mut SourceRegistry,
    net: &mut LogNetwork,
    profile: &BindingProfile,
    mask: u16,
    location: Location,
) {
    let buttons = decode_buttons(mask);
    for (index, pressed) in buttons.iter().copied().take(BUTTON_AUX_SLOTS).enumerate() {
        let Some(slot) = profile.aux(index) else {
            continue;
        };
        if slot.is_complete() {
            registry.receive_button_event(net, DEMO_USER, &slot.frequency, location, pressed);
        }
    }
}

/// Trigger travel drives variable sources on the first two auxiliary slots.
fn apply_axes(
    registry: &mut SourceRegistry,
    net: &mut LogNetwork,
    profile: &BindingProfile,
    mask: u32,
    location: Location,
) {
    let axes = decode_axes(mask);
    for (slot_index, axis) in (TRIGGER_AXIS_BASE..axes.len()).enumerate() {
        let Some(slot) = profile.aux(slot_index) else {
            continue;
        };
        if !slot.is_complete() {
            continue;
        }
        let level = (axes[axis].unsigned_abs()).min(slot.power);
        registry.receive_axis_level(net, DEMO_USER, &slot.frequency, location, level);
    }
}

/// Reads the profile record file, yielding an empty record when absent or
/// unreadable.
fn load_record(path: &str) -> serde_json::Value {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("profile record {} is not valid JSON ({}), starting fresh", path, e);
                serde_json::Value::Object(Default::default())
            }
        },
        Err(_) => serde_json::Value::Object(Default::default()),
    }
}

/// Writes the profile record file; persistence failures are logged, never
/// fatal.
fn save_record(path: &str, record: &serde_json::Value) {
    match serde_json::to_string_pretty(record) {
        Ok(content) => {
            if let Err(e) = std::fs::write(path, content) {
                warn!("could not persist profile record {}: {}", path, e);
            }
        }
        Err(e) => warn!("could not serialize profile record: {}", e),
    }
}
