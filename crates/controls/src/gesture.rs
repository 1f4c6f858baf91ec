//! Push-button gesture recognition
//!
//! Pure state machine over stable button edges and three alarms:
//!
//! | Alarm          | Started                              | On expiry                 |
//! |----------------|--------------------------------------|---------------------------|
//! | `first_click`  | press, when no click alarm runs      | nothing                   |
//! | `second_click` | release while `first_click` runs     | [`ButtonGesture::Click`]  |
//! | `long_press`   | together with `first_click`          | [`ButtonGesture::LongPress`] |
//!
//! A release while `second_click` runs is a [`ButtonGesture::DoubleClick`];
//! a release with no click alarm running is a plain
//! [`ButtonGesture::Released`]. The double-click window opens on the first
//! release, not on the first press.
//!
//! The owner feeds edges through [`GestureRecognizer::on_edge`], sleeps until
//! [`GestureRecognizer::next_deadline`], and calls
//! [`GestureRecognizer::poll`] on every wake-up. Alarms due at or before an
//! edge's timestamp must be polled before that edge is fed.

use embassy_time::Instant;
use platform::config::timing;
use platform::{ButtonGesture, Edge, EdgeKind};

use crate::alarm::Alarm;
use crate::debounce::earliest;

/// Alarms whose expiry raises a gesture: `second_click` and `long_press`.
pub const RAISING_ALARMS: usize = 2;

/// Gestures raised by one [`GestureRecognizer::poll`], one slot per
/// raising alarm.
pub type Gestures = heapless::Vec<ButtonGesture, RAISING_ALARMS>;

/// Button gesture state.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    first_click: Alarm,
    second_click: Alarm,
    long_press: Alarm,
    pressed: bool,
}

impl GestureRecognizer {
    /// Idle recognizer with the fixed 250/350/2500 ms alarms.
    pub const fn new() -> Self {
        Self {
            first_click: Alarm::new(timing::FIRST_CLICK),
            second_click: Alarm::new(timing::SECOND_CLICK),
            long_press: Alarm::new(timing::LONG_PRESS),
            pressed: false,
        }
    }

    /// Button state as of the last stable edge.
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// `true` when no alarm is running.
    pub const fn is_idle(&self) -> bool {
        !self.first_click.is_running()
            && !self.second_click.is_running()
            && !self.long_press.is_running()
    }

    /// Single-click candidate alarm.
    pub const fn first_click(&self) -> &Alarm {
        &self.first_click
    }

    /// Double-click window alarm.
    pub const fn second_click(&self) -> &Alarm {
        &self.second_click
    }

    /// Long-press alarm.
    pub const fn long_press(&self) -> &Alarm {
        &self.long_press
    }

    /// Earliest running alarm deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            earliest(self.first_click.deadline(), self.second_click.deadline()),
            self.long_press.deadline(),
        )
    }

    /// Feed one stable edge.
    pub fn on_edge(&mut self, edge: Edge) -> Option<ButtonGesture> {
        match edge.kind {
            EdgeKind::Rising => {
                self.pressed = true;
                if !self.first_click.is_running() && !self.second_click.is_running() {
                    self.first_click.start(edge.at);
                    self.long_press.start(edge.at);
                }
                Some(ButtonGesture::Pressed)
            }
            EdgeKind::Falling => {
                self.pressed = false;
                self.long_press.stop();
                if self.first_click.is_running() {
                    self.first_click.stop();
                    self.second_click.start(edge.at);
                    None
                } else if self.second_click.is_running() {
                    self.second_click.stop();
                    Some(ButtonGesture::DoubleClick)
                } else {
                    Some(ButtonGesture::Released)
                }
            }
        }
    }

    /// Expire every alarm due at `now`.
    pub fn poll(&mut self, now: Instant) -> Gestures {
        // Expires silently: the press outlived a click.
        self.first_click.take_expired(now);
        let expired: [(bool, ButtonGesture); RAISING_ALARMS] = [
            (self.second_click.take_expired(now), ButtonGesture::Click),
            (self.long_press.take_expired(now), ButtonGesture::LongPress),
        ];
        // Never more entries than slots: the array length is the capacity.
        expired
            .into_iter()
            .filter_map(|(fired, gesture)| fired.then_some(gesture))
            .collect()
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
