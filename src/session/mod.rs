//! # Link Session
//!
//! The client-side state machine and per-tick driver.
//!
//! A session is `Idle` until the player either starts controlling
//! (`Active`: sample, encode, throttled transmit every tick) or starts a
//! bind capture (`Bind`: the next qualifying input event becomes a binding).
//! At most one mode is active; entering a mode tears the previous one down,
//! and every exit from a non-idle mode synchronously flushes zeroed state so
//! the authoritative side decays instead of holding a stuck input.
//!
//! ## Rate limiting
//!
//! Each category (buttons, axes) transmits at most once every
//! [`SEND_INTERVAL_TICKS`] ticks, unless its encoded value changed, which
//! sends immediately and restarts the window.

use tracing::{debug, info};

use crate::codec::encoder::{encode_axes, encode_buttons};
use crate::codec::protocol::{
    stick_bind_index, trigger_bind_index, AxisMask, ButtonMask, AXIS_COUNT, BUTTON_COUNT,
    STICK_AXES, TRIGGER_AXIS_BASE,
};
use crate::controller::device::Gamepad;
use crate::controller::state::ControllerState;
use crate::error::Result;
use crate::network::Location;
use crate::transport::{Message, Transport};

/// Ticks between transmissions of an unchanged encoded value.
pub const SEND_INTERVAL_TICKS: u32 = 5;

/// Raw stick deflection that completes a bind capture.
pub const STICK_BIND_THRESHOLD: f32 = 0.8;

/// Session modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Nothing sampled, nothing transmitted.
    #[default]
    Idle,
    /// Input is continuously sampled and transmitted.
    Active,
    /// The next qualifying input event becomes a binding.
    Bind,
}

/// Client-side controller session.
///
/// Owned by the client tick loop; every operation is synchronous and
/// bounded. Never share across threads.
#[derive(Debug, Default)]
pub struct LinkSession {
    mode: Mode,
    /// Target the next completed bind points at; binds without a target are
    /// ignored (network resolution happens downstream).
    bind_target: Option<Location>,
    /// The activating "use" click must be released before bind input is
    /// accepted, so the click itself is never captured.
    await_use_release: bool,
    prev_buttons: [bool; BUTTON_COUNT],
    seat: Option<Location>,
    last_button_mask: ButtonMask,
    last_axis_mask: AxisMask,
    ticks_since_button_send: u32,
    ticks_since_axis_send: u32,
    state: ControllerState,
}

impl LinkSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last sampled controller state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Enters `Active` mode, tearing down whatever mode was running.
    pub fn start_active<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        self.teardown(transport)?;
        self.mode = Mode::Active;
        // First tick transmits immediately.
        self.ticks_since_button_send = SEND_INTERVAL_TICKS;
        self.ticks_since_axis_send = SEND_INTERVAL_TICKS;
        debug!("session active");
        Ok(())
    }

    /// Enters `Bind` mode, tearing down whatever mode was running.
    ///
    /// The capture waits for the activating "use" action to be released
    /// before accepting input.
    pub fn start_bind<T: Transport + ?Sized>(
        &mut self,
        target: Option<Location>,
        transport: &mut T,
    ) -> Result<()> {
        self.teardown(transport)?;
        self.mode = Mode::Bind;
        self.bind_target = target;
        self.await_use_release = true;
        self.prev_buttons = [false; BUTTON_COUNT];
        debug!("bind capture armed, target {:?}", target);
        Ok(())
    }

    /// Updates the target the next completed bind will point at.
    pub fn set_bind_target(&mut self, target: Option<Location>) {
        self.bind_target = target;
    }

    /// Marks the session as seated-control at a location (or unseated).
    ///
    /// Seated sessions transmit the combined seat message instead of the
    /// separate button/axis messages.
    pub fn set_seat(&mut self, seat: Option<Location>) {
        self.seat = seat;
    }

    /// Returns to `Idle`, flushing zeroed state when a mode was running.
    ///
    /// Covers explicit cancels, loss of the controlling item, loss of focus
    /// and spectator status alike; all are normal transitions.
    pub fn cancel<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        if self.mode != Mode::Idle {
            debug!("session cancelled from {:?}", self.mode);
        }
        self.teardown(transport)
    }

    /// Runs one client tick.
    ///
    /// # Arguments
    ///
    /// * `gamepad` - Device to poll (absent devices report rest state)
    /// * `use_held` - Whether the manual "use" action is currently held
    /// * `transport` - Outbound message sink
    pub fn tick<G, T>(&mut self, gamepad: &mut G, use_held: bool, transport: &mut T) -> Result<()>
    where
        G: Gamepad + ?Sized,
        T: Transport + ?Sized,
    {
        match self.mode {
            Mode::Idle => Ok(()),
            Mode::Active => self.tick_active(gamepad, transport),
            Mode::Bind => self.tick_bind(gamepad, use_held, transport),
        }
    }

    fn tick_active<G, T>(&mut self, gamepad: &mut G, transport: &mut T) -> Result<()>
    where
        G: Gamepad + ?Sized,
        T: Transport + ?Sized,
    {
        let buttons = gamepad.poll_buttons();
        let axes = gamepad.poll_axes();
        self.state.fill_from_gamepad(buttons, axes);

        let button_mask = encode_buttons(&self.state);
        let axis_mask = encode_axes(&self.state);

        if let Some(seat) = self.seat {
            // Seated variant: one combined message, one throttle window.
            self.ticks_since_button_send += 1;
            let changed =
                button_mask != self.last_button_mask || axis_mask != self.last_axis_mask;
            if changed || self.ticks_since_button_send >= SEND_INTERVAL_TICKS {
                transport.send(&Message::SeatInput {
                    location: seat,
                    button_mask,
                    axis_mask,
                })?;
                self.last_button_mask = button_mask;
                self.last_axis_mask = axis_mask;
                self.ticks_since_button_send = 0;
                self.ticks_since_axis_send = 0;
            }
            return Ok(());
        }

        self.ticks_since_button_send += 1;
        if button_mask != self.last_button_mask
            || self.ticks_since_button_send >= SEND_INTERVAL_TICKS
        {
            transport.send(&Message::ButtonState { mask: button_mask })?;
            self.last_button_mask = button_mask;
            self.ticks_since_button_send = 0;
        }

        self.ticks_since_axis_send += 1;
        if axis_mask != self.last_axis_mask || self.ticks_since_axis_send >= SEND_INTERVAL_TICKS {
            transport.send(&Message::AxisState {
                mask: axis_mask,
                seat_input: false,
                location: None,
            })?;
            self.last_axis_mask = axis_mask;
            self.ticks_since_axis_send = 0;
        }

        Ok(())
    }

    fn tick_bind<G, T>(&mut self, gamepad: &mut G, use_held: bool, transport: &mut T) -> Result<()>
    where
        G: Gamepad + ?Sized,
        T: Transport + ?Sized,
    {
        let buttons = gamepad.poll_buttons();
        let axes = gamepad.poll_axes();
        self.state.fill_from_gamepad(buttons, axes);

        if self.await_use_release {
            self.prev_buttons = buttons;
            if !use_held {
                self.await_use_release = false;
            }
            return Ok(());
        }

        let captured = self.capture_input(&buttons, &axes);
        self.prev_buttons = buttons;

        let (Some(input_index), Some(location)) = (captured, self.bind_target) else {
            return Ok(());
        };

        info!("bind captured input {} at {:?}", input_index, location);
        transport.send(&Message::BindRequest { input_index, location })?;
        self.teardown(transport)
    }

    /// Picks the first qualifying input event, if any.
    fn capture_input(&self, buttons: &[bool; BUTTON_COUNT], axes: &[f32; AXIS_COUNT]) -> Option<u8> {
        for (i, (&now, &before)) in buttons.iter().zip(self.prev_buttons.iter()).enumerate() {
            if now && !before {
                return Some(i as u8);
            }
        }
        for (i, &raw) in axes.iter().take(STICK_AXES).enumerate() {
            if raw.abs() > STICK_BIND_THRESHOLD {
                return Some(stick_bind_index(i, raw < 0.0));
            }
        }
        for axis in TRIGGER_AXIS_BASE..AXIS_COUNT {
            let travel = (axes[axis] + 1.0) / 2.0;
            if travel > 0.0 {
                return Some(trigger_bind_index(axis));
            }
        }
        None
    }

    /// Returns to `Idle`; flushes zeroed state if a mode was running.
    fn teardown<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        if self.mode != Mode::Idle {
            self.flush_zero(transport)?;
        }
        self.mode = Mode::Idle;
        self.bind_target = None;
        self.await_use_release = false;
        Ok(())
    }

    /// Synchronously transmits all-zero state and resets the throttle.
    fn flush_zero<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        if let Some(seat) = self.seat {
            transport.send(&Message::SeatInput {
                location: seat,
                button_mask: 0,
                axis_mask: 0,
            })?;
        } else {
            transport.send(&Message::ButtonState { mask: 0 })?;
            transport.send(&Message::AxisState {
                mask: 0,
                seat_input: false,
                location: None,
            })?;
        }
        self.last_button_mask = 0;
        self.last_axis_mask = 0;
        self.ticks_since_button_send = 0;
        self.ticks_since_axis_send = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::AXIS_REST;
    use crate::transport::LoopbackTransport;

    /// Scripted gamepad for driving the session by hand.
    struct TestPad {
        buttons: [bool; BUTTON_COUNT],
        axes: [f32; AXIS_COUNT],
    }

    impl TestPad {
        fn new() -> Self {
            Self {
                buttons: [false; BUTTON_COUNT],
                axes: AXIS_REST,
            }
        }
    }

    impl Gamepad for TestPad {
        fn poll_buttons(&mut self) -> [bool; BUTTON_COUNT] {
            self.buttons
        }

        fn poll_axes(&mut self) -> [f32; AXIS_COUNT] {
            self.axes
        }
    }

    fn button_messages(messages: &[Message]) -> Vec<ButtonMask> {
        messages
            .iter()
            .filter_map(|m| match m {
                Message::ButtonState { mask } => Some(*mask),
                _ => None,
            })
            .collect()
    }

    // ==================== Mode Transition Tests ====================

    #[test]
    fn test_starts_idle_and_idle_tick_sends_nothing() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        assert_eq!(session.mode(), Mode::Idle);
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport.drain().is_empty());
    }

    #[test]
    fn test_start_active_from_idle_does_not_flush() {
        let mut session = LinkSession::new();
        let mut transport = LoopbackTransport::new();
        session.start_active(&mut transport).unwrap();
        assert_eq!(session.mode(), Mode::Active);
        assert!(transport.drain().is_empty());
    }

    #[test]
    fn test_switching_modes_flushes_zero_state() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        pad.buttons[2] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();
        transport.drain();

        // Active -> Bind must zero the remote state first.
        session.start_bind(None, &mut transport).unwrap();
        let flushed = transport.drain();
        assert!(flushed.contains(&Message::ButtonState { mask: 0 }));
        assert!(flushed.contains(&Message::AxisState { mask: 0, seat_input: false, location: None }));
        assert_eq!(session.mode(), Mode::Bind);
    }

    #[test]
    fn test_cancel_flushes_and_returns_to_idle() {
        let mut session = LinkSession::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        session.cancel(&mut transport).unwrap();
        assert_eq!(session.mode(), Mode::Idle);
        assert_eq!(button_messages(&transport.drain()), vec![0]);

        // Cancelling an idle session is a no-op.
        session.cancel(&mut transport).unwrap();
        assert!(transport.drain().is_empty());
    }

    // ==================== Active Mode Throttle Tests ====================

    #[test]
    fn test_first_active_tick_transmits_both_categories() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        let sent = transport.drain();
        assert_eq!(sent.len(), 2);
    }

    #[test]
    fn test_unchanged_state_sends_every_fifth_tick() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        transport.drain();

        for _ in 0..SEND_INTERVAL_TICKS - 1 {
            session.tick(&mut pad, false, &mut transport).unwrap();
            assert!(transport.drain().is_empty(), "throttled tick must not send");
        }
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert_eq!(transport.drain().len(), 2);
    }

    #[test]
    fn test_changed_mask_bypasses_throttle() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        transport.drain();

        // One throttled tick, then press a button mid-window.
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport.drain().is_empty());

        pad.buttons[3] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert_eq!(button_messages(&transport.drain()), vec![0b1000]);
    }

    #[test]
    fn test_axis_change_sends_axis_only() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_active(&mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        transport.drain();

        pad.axes[0] = -0.9;
        session.tick(&mut pad, false, &mut transport).unwrap();
        let sent = transport.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            Message::AxisState { mask: 30, seat_input: false, location: None }
        );
    }

    #[test]
    fn test_seated_session_sends_combined_message() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();
        let seat = Location::new(4, 70, 4);

        session.set_seat(Some(seat));
        session.start_active(&mut transport).unwrap();
        pad.buttons[0] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();

        let sent = transport.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            Message::SeatInput { location: seat, button_mask: 1, axis_mask: 0 }
        );
    }

    #[test]
    fn test_seated_cancel_flushes_seat_message() {
        let mut session = LinkSession::new();
        let mut transport = LoopbackTransport::new();
        let seat = Location::new(0, 0, 0);

        session.set_seat(Some(seat));
        session.start_active(&mut transport).unwrap();
        session.cancel(&mut transport).unwrap();
        assert_eq!(
            transport.drain(),
            vec![Message::SeatInput { location: seat, button_mask: 0, axis_mask: 0 }]
        );
    }

    // ==================== Bind Mode Tests ====================

    fn bind_session(target: Location) -> (LinkSession, TestPad, LoopbackTransport) {
        let mut session = LinkSession::new();
        let mut transport = LoopbackTransport::new();
        session.start_bind(Some(target), &mut transport).unwrap();
        // Release the activating use click.
        let mut pad = TestPad::new();
        session.tick(&mut pad, false, &mut transport).unwrap();
        transport.drain();
        (session, TestPad::new(), transport)
    }

    #[test]
    fn test_bind_captures_button_press() {
        let target = Location::new(1, 2, 3);
        let (mut session, mut pad, mut transport) = bind_session(target);

        pad.buttons[3] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();

        let sent = transport.drain();
        assert!(sent.contains(&Message::BindRequest { input_index: 3, location: target }));
        assert_eq!(
            sent.iter().filter(|m| matches!(m, Message::BindRequest { .. })).count(),
            1
        );
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_bind_captures_trigger_at_any_positive_travel() {
        // Trigger axis 4 barely off rest: input index 15 + 8 = 23.
        let target = Location::new(0, 0, 0);
        let (mut session, mut pad, mut transport) = bind_session(target);

        pad.axes[4] = -0.8;
        session.tick(&mut pad, false, &mut transport).unwrap();

        let sent = transport.drain();
        assert!(sent.contains(&Message::BindRequest { input_index: 23, location: target }));
        assert_eq!(session.mode(), Mode::Idle);
    }

    #[test]
    fn test_bind_captures_stick_direction_beyond_deadzone() {
        let target = Location::new(9, 9, 9);
        let (mut session, mut pad, mut transport) = bind_session(target);

        pad.axes[1] = -0.85;
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport
            .drain()
            .contains(&Message::BindRequest { input_index: 18, location: target }));
    }

    #[test]
    fn test_bind_ignores_stick_inside_deadzone() {
        let (mut session, mut pad, mut transport) = bind_session(Location::new(0, 0, 0));

        pad.axes[0] = 0.5;
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport.drain().is_empty());
        assert_eq!(session.mode(), Mode::Bind);
    }

    #[test]
    fn test_bind_without_target_ignores_input() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();

        session.start_bind(None, &mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        pad.buttons[0] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();

        assert!(transport.drain().is_empty());
        assert_eq!(session.mode(), Mode::Bind);
    }

    #[test]
    fn test_bind_waits_for_use_release() {
        let mut session = LinkSession::new();
        let mut pad = TestPad::new();
        let mut transport = LoopbackTransport::new();
        let target = Location::new(1, 1, 1);

        session.start_bind(Some(target), &mut transport).unwrap();

        // Use still held: nothing may be captured, even with a button down.
        pad.buttons[5] = true;
        session.tick(&mut pad, true, &mut transport).unwrap();
        assert!(transport.drain().is_empty());

        // Use released while the button is still held: no transition, so
        // the held button is not captured either.
        session.tick(&mut pad, false, &mut transport).unwrap();
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport.drain().is_empty());

        // Release and press again: now it binds.
        pad.buttons[5] = false;
        session.tick(&mut pad, false, &mut transport).unwrap();
        pad.buttons[5] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();
        assert!(transport
            .drain()
            .contains(&Message::BindRequest { input_index: 5, location: target }));
    }

    #[test]
    fn test_bind_completion_flushes_zero_state() {
        let target = Location::new(2, 2, 2);
        let (mut session, mut pad, mut transport) = bind_session(target);

        pad.buttons[0] = true;
        session.tick(&mut pad, false, &mut transport).unwrap();
        let sent = transport.drain();
        assert!(sent.contains(&Message::ButtonState { mask: 0 }));
    }
}
