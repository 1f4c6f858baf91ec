//! Control knob: rotary encoder, push-button and toggle switch
//!
//! [`ControlKnob::open`] claims the four lines and returns the shared state
//! together with the [`KnobLines`] that [`ControlKnob::run`] consumes. `run`
//! drives one processor per input concurrently; each processor owns its line
//! and its state machine, so an edge is always fully decided before the next
//! one is looked at.
//!
//! ```text
//!  button line ─▶ DebouncedLine(10 ms) ─▶ GestureRecognizer ─┐
//!  switch line ─▶ DebouncedLine(40 ms) ─▶ SwitchMonitor ─────┼─▶ EventSender
//!  A/B lines ──▶ QuadratureCounter ────▶ RotationDecoder ───┘
//! ```

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select3, Either3};
use embassy_time::Instant;
use platform::config::timing;
use platform::{
    ButtonGesture, EdgeKind, InputEvent, InputLine, KnobConfig, PinController, PulseCounter,
};
use tracing::{debug, error};

use crate::debounce::DebouncedLine;
use crate::error::{InitError, PinRole};
use crate::events::{try_send_event, EventSender};
use crate::gesture::GestureRecognizer;
use crate::rotation::{QuadratureCounter, RotationDecoder};
use crate::switch::SwitchMonitor;

/// Lines owned by the knob processors.
pub struct KnobLines<I, P = QuadratureCounter<I, I>> {
    /// Push-button, debounced
    pub button: DebouncedLine<I>,
    /// Toggle switch, debounced
    pub switch: DebouncedLine<I>,
    /// Pulse counter fed by the encoder
    pub counter: P,
}

/// Knob state shared between the processors and the controller.
#[derive(Debug, Default)]
pub struct ControlKnob {
    button_pressed: AtomicBool,
    switch_on: AtomicBool,
}

impl ControlKnob {
    /// Knob state with the given initial levels.
    pub const fn new(button_pressed: bool, switch_on: bool) -> Self {
        Self {
            button_pressed: AtomicBool::new(button_pressed),
            switch_on: AtomicBool::new(switch_on),
        }
    }

    /// Open A, B, button and switch in that order and read the initial
    /// button and switch levels.
    ///
    /// On failure the error names the role and pin that failed; lines that
    /// were already opened are dropped, which releases them.
    pub fn open<C: PinController>(
        controller: &mut C,
        config: &KnobConfig,
    ) -> Result<(Self, KnobLines<C::Input>), InitError<C::Error>> {
        let a = open_input(controller, PinRole::A, config.pin_a)?;
        let b = open_input(controller, PinRole::B, config.pin_b)?;
        let mut button = open_input(controller, PinRole::Button, config.button)?;
        let mut switch = open_input(controller, PinRole::Switch, config.switch)?;
        debug!(
            a = config.pin_a.get(),
            b = config.pin_b.get(),
            button = config.button.get(),
            switch = config.switch.get(),
            "opened knob pins"
        );

        let pressed = button
            .is_high()
            .map_err(InitError::new(PinRole::Button, config.button))?;
        let on = switch
            .is_high()
            .map_err(InitError::new(PinRole::Switch, config.switch))?;

        let lines = KnobLines {
            button: DebouncedLine::new(button, timing::BUTTON_DEBOUNCE),
            switch: DebouncedLine::new(switch, timing::SWITCH_DEBOUNCE),
            counter: QuadratureCounter::new(a, b, EdgeKind::Rising, config.pulses_per_rotation),
        };
        Ok((Self::new(pressed, on), lines))
    }

    /// Button state as of the last stable edge (or the level read at open).
    pub fn is_button_pressed(&self) -> bool {
        self.button_pressed.load(Ordering::Acquire)
    }

    /// Switch state as of the last stable edge (or the level read at open).
    pub fn is_switch_on(&self) -> bool {
        self.switch_on.load(Ordering::Acquire)
    }

    /// Run the button, switch and rotation processors until one of the
    /// lines fails.
    pub async fn run<I, P>(
        &self,
        lines: KnobLines<I, P>,
        sender: EventSender<'_>,
    ) -> Result<Infallible, I::Error>
    where
        I: InputLine,
        P: PulseCounter<Error = I::Error>,
    {
        let KnobLines {
            mut button,
            mut switch,
            mut counter,
        } = lines;
        match select3(
            self.button_loop(&mut button, &sender),
            self.switch_loop(&mut switch, &sender),
            self.rotation_loop(&mut counter, &sender),
        )
        .await
        {
            Either3::First(result) | Either3::Second(result) | Either3::Third(result) => result,
        }
    }

    async fn button_loop<I: InputLine>(
        &self,
        line: &mut DebouncedLine<I>,
        sender: &EventSender<'_>,
    ) -> Result<Infallible, I::Error> {
        let mut gestures = GestureRecognizer::new();
        loop {
            let stable = line.next_stable_until(gestures.next_deadline()).await?;
            let now = stable.map_or_else(Instant::now, |edge| edge.at);
            for gesture in gestures.poll(now) {
                publish_gesture(sender, gesture);
            }
            if let Some(edge) = stable {
                self.button_pressed
                    .store(edge.kind == EdgeKind::Rising, Ordering::Release);
                if let Some(gesture) = gestures.on_edge(edge) {
                    publish_gesture(sender, gesture);
                }
            }
        }
    }

    async fn switch_loop<I: InputLine>(
        &self,
        line: &mut DebouncedLine<I>,
        sender: &EventSender<'_>,
    ) -> Result<Infallible, I::Error> {
        let mut monitor = SwitchMonitor::new(self.is_switch_on());
        loop {
            let edge = line.next_stable().await?;
            let event = monitor.on_edge(edge);
            self.switch_on.store(monitor.is_on(), Ordering::Release);
            debug!(on = monitor.is_on(), "switch");
            try_send_event(sender, InputEvent::Switch(event));
        }
    }

    async fn rotation_loop<P: PulseCounter>(
        &self,
        counter: &mut P,
        sender: &EventSender<'_>,
    ) -> Result<Infallible, P::Error> {
        let mut decoder = RotationDecoder::new();
        loop {
            let count = counter.wait_for_change().await?;
            let Some(event) =
                decoder.observe(count, self.is_button_pressed(), self.is_switch_on())
            else {
                continue;
            };
            debug!(value = event.value, delta = event.delta(), "knob rotated");
            try_send_event(sender, InputEvent::Rotation(event));
        }
    }
}

fn open_input<C: PinController>(
    controller: &mut C,
    role: PinRole,
    pin: platform::PinNumber,
) -> Result<C::Input, InitError<C::Error>> {
    controller.open_input(pin).map_err(|e| {
        error!(pin = pin.get(), role = role.as_str(), "failed to open GPIO pin");
        InitError::new(role, pin)(e)
    })
}

fn publish_gesture(sender: &EventSender<'_>, gesture: ButtonGesture) {
    debug!(gesture = gesture.as_str(), "button");
    try_send_event(sender, InputEvent::Button(gesture));
}
