//! `embedded-hal` adapters
//!
//! Wrap board pins so the pipeline can run on any HAL that implements the
//! embedded-hal 1.0 digital traits.
//!
//! [`HalInput`] timestamps an edge when `wait_for_any_edge` resolves and
//! classifies it by reading the level right after. It holds no queue of its
//! own, so it remembers the last level it reported instead: if the pin has
//! moved while no wait was armed, the next call reports that change at once,
//! stamped with the time it was noticed. Pulses shorter than the gap between
//! two waits are still invisible. Board crates with an interrupt-fed edge
//! queue should implement [`InputLine`] directly instead.

use embassy_time::Instant;
use embedded_hal::digital::{InputPin, StatefulOutputPin};
use embedded_hal_async::digital::Wait;
use platform::{Edge, EdgeKind, InputLine, OutputLine};

/// Input line over an `InputPin + Wait` pin.
pub struct HalInput<P> {
    pin: P,
    // Level behind the last reported edge; `None` until the first wait.
    reported: Option<bool>,
}

impl<P> HalInput<P> {
    /// Wrap `pin`.
    pub const fn new(pin: P) -> Self {
        Self {
            pin,
            reported: None,
        }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin + Wait> InputLine for HalInput<P> {
    type Error = P::Error;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    async fn wait_for_edge(&mut self) -> Result<Edge, Self::Error> {
        let level = self.pin.is_high()?;
        match self.reported {
            // Moved while nobody was waiting.
            Some(reported) if reported != level => return Ok(self.report(level)),
            Some(_) => {}
            None => self.reported = Some(level),
        }

        self.pin.wait_for_any_edge().await?;
        let level = self.pin.is_high()?;
        Ok(self.report(level))
    }
}

impl<P> HalInput<P> {
    fn report(&mut self, high: bool) -> Edge {
        self.reported = Some(high);
        let kind = if high {
            EdgeKind::Rising
        } else {
            EdgeKind::Falling
        };
        Edge::new(kind, Instant::now())
    }
}

/// Output line over a `StatefulOutputPin`.
pub struct HalOutput<P> {
    pin: P,
}

impl<P> HalOutput<P> {
    /// Wrap `pin`.
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> OutputLine for HalOutput<P> {
    type Error = P::Error;

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Edge as MockEdge, Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn input_reads_delegate_to_pin() {
        let mut mock = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ]);
        let mut line = HalInput::new(mock.clone());
        assert!(line.is_high().unwrap());
        assert!(line.is_low().unwrap());
        mock.done();
    }

    #[tokio::test]
    async fn edge_kind_comes_from_level_after_wait() {
        let mut mock = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::wait_for_edge(MockEdge::Any),
            PinTransaction::get(PinState::Low),
        ]);
        let mut line = HalInput::new(mock.clone());
        let edge = line.wait_for_edge().await.unwrap();
        assert_eq!(edge.kind, EdgeKind::Falling);
        mock.done();
    }

    #[tokio::test]
    async fn change_between_waits_is_reported_without_waiting() {
        let mut mock = PinMock::new(&[
            // First wait: starts low, released by a rising edge.
            PinTransaction::get(PinState::Low),
            PinTransaction::wait_for_edge(MockEdge::Any),
            PinTransaction::get(PinState::High),
            // The pin fell while no wait was armed.
            PinTransaction::get(PinState::Low),
            // Level now matches what was reported, so the next call arms a wait.
            PinTransaction::get(PinState::Low),
            PinTransaction::wait_for_edge(MockEdge::Any),
            PinTransaction::get(PinState::High),
        ]);
        let mut line = HalInput::new(mock.clone());

        assert_eq!(line.wait_for_edge().await.unwrap().kind, EdgeKind::Rising);
        assert_eq!(line.wait_for_edge().await.unwrap().kind, EdgeKind::Falling);
        assert_eq!(line.wait_for_edge().await.unwrap().kind, EdgeKind::Rising);
        mock.done();
    }

    #[test]
    fn output_writes_delegate_to_pin() {
        let mut mock = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut line = HalOutput::new(mock.clone());
        line.set_state(platform::PinState::High).unwrap();
        line.set_low().unwrap();
        mock.done();
    }
}
