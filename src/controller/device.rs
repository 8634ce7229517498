//! # Gamepad Device Adapter
//!
//! The polling seam between the core and the physical input device.
//!
//! The core only ever asks for the current state: [`Gamepad::poll_buttons`]
//! and [`Gamepad::poll_axes`]. The evdev-backed adapter below maintains a
//! cached state from the device's event stream and answers polls from it.
//! Device absence is not a fault: [`NoGamepad`] answers with all-released
//! buttons and the axis rest state.
//!
//! ## Button Indices
//!
//! | Index | evdev Code | Name |
//! |-------|------------|------|
//! | 0 | BTN_SOUTH | South (A / Cross) |
//! | 1 | BTN_EAST | East (B / Circle) |
//! | 2 | BTN_WEST | West (X / Square) |
//! | 3 | BTN_NORTH | North (Y / Triangle) |
//! | 4 | BTN_TL | Left bumper |
//! | 5 | BTN_TR | Right bumper |
//! | 6 | BTN_TL2 | Left trigger click |
//! | 7 | BTN_TR2 | Right trigger click |
//! | 8 | BTN_SELECT | Select |
//! | 9 | BTN_START | Start |
//! | 10 | BTN_MODE | Guide |
//! | 11 | BTN_THUMBL | Left stick click |
//! | 12 | BTN_THUMBR | Right stick click |
//! | 13 | BTN_TOUCH | Touchpad |
//! | 14 | BTN_Z | Extra |
//!
//! ## Axis Indices
//!
//! Axes 0..3 are left X/Y and right X/Y sticks (−1..1); axes 4..5 are the
//! analog triggers (−1 at rest, 1 fully pressed).

use evdev::{AbsoluteAxisType, Device, InputEvent, Key};
use tracing::{debug, info};

use crate::codec::protocol::{AXIS_COUNT, BUTTON_COUNT};
use crate::controller::state::AXIS_REST;
use crate::error::{PadlinkError, Result};

/// Button indices for semantic access.
pub mod buttons {
    /// South face button (A / Cross).
    pub const SOUTH: usize = 0;
    /// East face button (B / Circle).
    pub const EAST: usize = 1;
    /// West face button (X / Square).
    pub const WEST: usize = 2;
    /// North face button (Y / Triangle).
    pub const NORTH: usize = 3;
    /// Left bumper.
    pub const BUMPER_LEFT: usize = 4;
    /// Right bumper.
    pub const BUMPER_RIGHT: usize = 5;
    /// Left trigger digital click.
    pub const TRIGGER_LEFT_CLICK: usize = 6;
    /// Right trigger digital click.
    pub const TRIGGER_RIGHT_CLICK: usize = 7;
    /// Select button.
    pub const SELECT: usize = 8;
    /// Start button.
    pub const START: usize = 9;
    /// Guide button.
    pub const MODE: usize = 10;
    /// Left stick click.
    pub const THUMB_LEFT: usize = 11;
    /// Right stick click.
    pub const THUMB_RIGHT: usize = 12;
    /// Touchpad click.
    pub const TOUCHPAD: usize = 13;
    /// Extra button (device dependent).
    pub const EXTRA: usize = 14;
}

/// Axis indices for semantic access.
pub mod axes {
    /// Left stick X.
    pub const LEFT_X: usize = 0;
    /// Left stick Y.
    pub const LEFT_Y: usize = 1;
    /// Right stick X.
    pub const RIGHT_X: usize = 2;
    /// Right stick Y.
    pub const RIGHT_Y: usize = 3;
    /// Left analog trigger.
    pub const TRIGGER_LEFT: usize = 4;
    /// Right analog trigger.
    pub const TRIGGER_RIGHT: usize = 5;
}

/// Polling interface for the current input device state.
///
/// Implementations must never block: a poll answers from whatever state the
/// device last reported.
pub trait Gamepad {
    /// Current pressed flag for every button.
    fn poll_buttons(&mut self) -> [bool; BUTTON_COUNT];

    /// Current raw axis values: sticks −1..1, triggers −1 (rest) to 1.
    fn poll_axes(&mut self) -> [f32; AXIS_COUNT];
}

/// The absent device: all buttons released, axes at rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepad;

impl Gamepad for NoGamepad {
    fn poll_buttons(&mut self) -> [bool; BUTTON_COUNT] {
        [false; BUTTON_COUNT]
    }

    fn poll_axes(&mut self) -> [f32; AXIS_COUNT] {
        AXIS_REST
    }
}

/// Raw evdev axis range for sticks and triggers.
const RAW_AXIS_MIN: i32 = 0;
/// Raw evdev axis range for sticks and triggers.
const RAW_AXIS_MAX: i32 = 255;
/// Raw evdev stick center value.
const RAW_AXIS_CENTER: i32 = 128;

/// Evdev-backed gamepad with cached state.
///
/// Each poll drains the device's pending events into the cache first, so the
/// answer reflects everything the device has reported up to the poll.
pub struct EvdevGamepad {
    device: Device,
    buttons: [bool; BUTTON_COUNT],
    axes: [f32; AXIS_COUNT],
}

impl std::fmt::Debug for EvdevGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevGamepad")
            .field("buttons", &self.buttons)
            .field("axes", &self.axes)
            .finish()
    }
}

impl EvdevGamepad {
    /// Opens the nth gamepad-capable input device on the system.
    ///
    /// A device qualifies when it reports BTN_SOUTH among its supported
    /// keys. Enumeration order follows the kernel's device order.
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based index among detected gamepads
    ///
    /// # Errors
    ///
    /// Returns [`PadlinkError::Device`] when fewer than `index + 1` gamepads
    /// are present.
    pub fn open_index(index: usize) -> Result<Self> {
        let mut found = 0usize;
        for (path, device) in evdev::enumerate() {
            let is_gamepad = device
                .supported_keys()
                .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
            if !is_gamepad {
                continue;
            }
            if found == index {
                info!(
                    "using gamepad {} at {}: {}",
                    index,
                    path.display(),
                    device.name().unwrap_or("unknown")
                );
                return Ok(Self {
                    device,
                    buttons: [false; BUTTON_COUNT],
                    axes: AXIS_REST,
                });
            }
            found += 1;
        }
        Err(PadlinkError::Device(format!(
            "no gamepad at index {} ({} detected)",
            index, found
        )))
    }

    /// Applies every pending device event to the cached state.
    fn drain_events(&mut self) {
        let events: Vec<InputEvent> = match self.device.fetch_events() {
            Ok(events) => events.collect(),
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => return,
            Err(err) => {
                // Mid-session disconnect: fall back to the rest state.
                debug!("gamepad read failed, reporting rest state: {}", err);
                self.buttons = [false; BUTTON_COUNT];
                self.axes = AXIS_REST;
                return;
            }
        };
        for event in &events {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: &InputEvent) {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => self.apply_axis(axis, event.value()),
            evdev::InputEventKind::Key(key) => self.apply_key(key, event.value() != 0),
            _ => {
                // Sync and misc events carry no state.
            }
        }
    }

    fn apply_axis(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_X => self.axes[axes::LEFT_X] = scale_stick(value),
            AbsoluteAxisType::ABS_Y => self.axes[axes::LEFT_Y] = scale_stick(value),
            AbsoluteAxisType::ABS_Z => self.axes[axes::RIGHT_X] = scale_stick(value),
            AbsoluteAxisType::ABS_RZ => self.axes[axes::RIGHT_Y] = scale_stick(value),
            AbsoluteAxisType::ABS_RX => self.axes[axes::TRIGGER_LEFT] = scale_trigger(value),
            AbsoluteAxisType::ABS_RY => self.axes[axes::TRIGGER_RIGHT] = scale_trigger(value),
            _ => {
                // Hats, gyro and the rest are not part of the axis set.
            }
        }
    }

    fn apply_key(&mut self, key: Key, pressed: bool) {
        let index = match key {
            Key::BTN_SOUTH => buttons::SOUTH,
            Key::BTN_EAST => buttons::EAST,
            Key::BTN_WEST => buttons::WEST,
            Key::BTN_NORTH => buttons::NORTH,
            Key::BTN_TL => buttons::BUMPER_LEFT,
            Key::BTN_TR => buttons::BUMPER_RIGHT,
            Key::BTN_TL2 => buttons::TRIGGER_LEFT_CLICK,
            Key::BTN_TR2 => buttons::TRIGGER_RIGHT_CLICK,
            Key::BTN_SELECT => buttons::SELECT,
            Key::BTN_START => buttons::START,
            Key::BTN_MODE => buttons::MODE,
            Key::BTN_THUMBL => buttons::THUMB_LEFT,
            Key::BTN_THUMBR => buttons::THUMB_RIGHT,
            Key::BTN_TOUCH => buttons::TOUCHPAD,
            Key::BTN_Z => buttons::EXTRA,
            _ => return,
        };
        self.buttons[index] = pressed;
    }
}

impl Gamepad for EvdevGamepad {
    fn poll_buttons(&mut self) -> [bool; BUTTON_COUNT] {
        self.drain_events();
        self.buttons
    }

    fn poll_axes(&mut self) -> [f32; AXIS_COUNT] {
        self.drain_events();
        self.axes
    }
}

/// Scales a raw stick value (0..255, 128 center) to −1..1.
#[inline]
fn scale_stick(value: i32) -> f32 {
    let clamped = value.clamp(RAW_AXIS_MIN, RAW_AXIS_MAX);
    ((clamped - RAW_AXIS_CENTER) as f32 / 127.0).clamp(-1.0, 1.0)
}

/// Scales a raw trigger value (0..255) to −1 (rest) .. 1 (full).
#[inline]
fn scale_trigger(value: i32) -> f32 {
    let clamped = value.clamp(RAW_AXIS_MIN, RAW_AXIS_MAX);
    (clamped as f32 / 127.5 - 1.0).clamp(-1.0, 1.0)
}
