//! Knob rotation
//!
//! [`QuadratureCounter`] turns the encoder's A/B lines into a signed pulse
//! count; [`RotationDecoder`] turns count changes into [`RotationEvent`]s.

use embassy_time::Duration;
use platform::config::timing;
use platform::{EdgeKind, InputLine, PulseCounter, RotationEvent};

use crate::debounce::DebouncedLine;

/// Quadrature decoder over two input lines.
///
/// Counts on stable edges of one polarity on line A; the level of line B at
/// that moment gives the direction: low is clockwise (+1), high is
/// counter-clockwise (−1).
pub struct QuadratureCounter<A, B> {
    a: DebouncedLine<A>,
    b: B,
    counted: EdgeKind,
    count: i32,
    pulses_per_rotation: u16,
}

impl<A, B> QuadratureCounter<A, B>
where
    A: InputLine,
    B: InputLine<Error = A::Error>,
{
    /// Counter on `counted` edges of `a`, debounced by the rotary window.
    pub fn new(a: A, b: B, counted: EdgeKind, pulses_per_rotation: u16) -> Self {
        Self::with_debounce(a, b, counted, pulses_per_rotation, timing::ROTARY_DEBOUNCE)
    }

    /// Counter with an explicit debounce window on line A.
    pub fn with_debounce(
        a: A,
        b: B,
        counted: EdgeKind,
        pulses_per_rotation: u16,
        window: Duration,
    ) -> Self {
        Self {
            a: DebouncedLine::new(a, window),
            b,
            counted,
            count: 0,
            pulses_per_rotation,
        }
    }
}

impl<A, B> PulseCounter for QuadratureCounter<A, B>
where
    A: InputLine,
    B: InputLine<Error = A::Error>,
{
    type Error = A::Error;

    async fn wait_for_change(&mut self) -> Result<i32, Self::Error> {
        loop {
            let edge = self.a.next_stable().await?;
            if edge.kind != self.counted {
                continue;
            }
            self.count = if self.b.is_high()? {
                self.count.saturating_sub(1)
            } else {
                self.count.saturating_add(1)
            };
            return Ok(self.count);
        }
    }

    fn count(&self) -> i32 {
        self.count
    }

    fn pulses_per_rotation(&self) -> u16 {
        self.pulses_per_rotation
    }
}

/// Turns absolute counts into rotation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationDecoder {
    previous: i32,
}

impl RotationDecoder {
    /// Decoder whose previous count is zero.
    pub const fn new() -> Self {
        Self { previous: 0 }
    }

    /// Count reported with the last event.
    pub const fn previous(&self) -> i32 {
        self.previous
    }

    /// Observe a new count with the modifier state at that moment.
    ///
    /// Returns `None` when the count did not change.
    pub fn observe(
        &mut self,
        count: i32,
        button_pressed: bool,
        switch_on: bool,
    ) -> Option<RotationEvent> {
        if count == self.previous {
            return None;
        }
        let event = RotationEvent {
            value: count,
            previous: self.previous,
            button_pressed,
            switch_on,
        };
        self.previous = count;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Instant;
    use platform::mocks::MockLineHandle;
    use platform::Edge;

    #[test]
    fn unchanged_count_is_suppressed() {
        let mut decoder = RotationDecoder::new();
        let deltas: Vec<i32> = [0, 3, 3, 7]
            .into_iter()
            .filter_map(|c| decoder.observe(c, false, false))
            .map(|ev| ev.delta())
            .collect();
        assert_eq!(deltas, vec![3, 4]);
        assert_eq!(decoder.previous(), 7);
    }

    #[test]
    fn event_carries_modifier_snapshot() {
        let mut decoder = RotationDecoder::new();
        let ev = decoder.observe(-1, true, false).unwrap();
        assert_eq!(ev.value, -1);
        assert_eq!(ev.previous, 0);
        assert!(ev.button_pressed);
        assert!(!ev.switch_on);
    }

    #[tokio::test]
    async fn direction_follows_line_b() {
        let a = MockLineHandle::new(false);
        let b = MockLineHandle::new(false);
        let mut counter = QuadratureCounter::new(a.line(), b.line(), EdgeKind::Rising, 20);

        // Far enough past construction that every edge is decided immediately.
        let base = Instant::now() + Duration::from_secs(1);
        let at = |ms: u64| base + Duration::from_millis(ms);

        a.edge(Edge::rising(at(0)));
        assert_eq!(counter.wait_for_change().await, Ok(1));
        a.edge(Edge::falling(at(10)));
        a.edge(Edge::rising(at(20)));
        assert_eq!(counter.wait_for_change().await, Ok(2));

        b.set_level(true);
        a.edge(Edge::falling(at(30)));
        a.edge(Edge::rising(at(40)));
        assert_eq!(counter.wait_for_change().await, Ok(1));
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.pulses_per_rotation(), 20);
    }
}
