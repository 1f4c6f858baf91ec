//! GPIO and pin abstraction layer
//!
//! Models the pin-controller collaborator: opening lines for input or output,
//! synchronous reads and writes, and edge notification.
//!
//! Edge notification is message-based rather than callback-based. A line
//! implementation queues every raw transition (from an interrupt, a kernel
//! event fd, or a test) and [`InputLine::wait_for_edge`] hands them out one
//! at a time to the single processor that owns the line. Dropping that
//! processor is the equivalent of unregistering the callback.

use core::future::Future;

use embassy_time::Instant;

/// Controller-level pin number (BCM numbering on the reference board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PinNumber(pub u8);

impl PinNumber {
    /// Raw pin number.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for PinNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// Direction of a level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Low → high
    Rising,
    /// High → low
    Falling,
}

impl EdgeKind {
    /// Level the line settles at after this transition.
    pub const fn level(self) -> PinState {
        match self {
            Self::Rising => PinState::High,
            Self::Falling => PinState::Low,
        }
    }

    /// Short label for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
        }
    }
}

impl From<PinState> for EdgeKind {
    /// The transition that ends in `state`.
    fn from(state: PinState) -> Self {
        match state {
            PinState::High => Self::Rising,
            PinState::Low => Self::Falling,
        }
    }
}

/// A timestamped transition on one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Polarity of the transition.
    pub kind: EdgeKind,
    /// When the transition was observed.
    pub at: Instant,
}

impl Edge {
    /// Create an edge observed at `at`.
    pub const fn new(kind: EdgeKind, at: Instant) -> Self {
        Self { kind, at }
    }

    /// Rising edge at `at`.
    pub const fn rising(at: Instant) -> Self {
        Self::new(EdgeKind::Rising, at)
    }

    /// Falling edge at `at`.
    pub const fn falling(at: Instant) -> Self {
        Self::new(EdgeKind::Falling, at)
    }
}

/// Input line operations
pub trait InputLine {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read pin state
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Read pin state (inverted)
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|v| !v)
    }

    /// Wait for the next raw transition, rising or falling.
    ///
    /// Must be cancel-safe: dropping the future before it resolves must not
    /// lose an edge that has already been queued. Processors race this
    /// future against their own timers.
    fn wait_for_edge(&mut self) -> impl Future<Output = Result<Edge, Self::Error>>;
}

/// Output line operations
pub trait OutputLine {
    /// Error type
    type Error: core::fmt::Debug;

    /// Set pin high
    fn set_high(&mut self) -> Result<(), Self::Error>;

    /// Set pin low
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Set pin state
    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        match state {
            PinState::High => self.set_high(),
            PinState::Low => self.set_low(),
        }
    }

    /// Read back the driven level.
    fn is_set_high(&mut self) -> Result<bool, Self::Error>;
}

/// The pin-controller collaborator.
///
/// Opening a line claims it; the returned handle releases the pin when it is
/// dropped, so a component that fails half-way through its own
/// initialization releases exactly what it had already opened.
pub trait PinController {
    /// Error type shared by the controller and its lines.
    type Error: core::fmt::Debug;
    /// Line handle returned by [`PinController::open_input`].
    type Input: InputLine<Error = Self::Error>;
    /// Line handle returned by [`PinController::open_output`].
    type Output: OutputLine<Error = Self::Error>;

    /// Open `pin` as an input with both-edge notification enabled.
    fn open_input(&mut self, pin: PinNumber) -> Result<Self::Input, Self::Error>;

    /// Open `pin` as a push-pull output.
    fn open_output(&mut self, pin: PinNumber) -> Result<Self::Output, Self::Error>;
}
