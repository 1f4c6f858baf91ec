//! Quadrature pulse-counter abstraction

use core::future::Future;

/// A pulse counter fed by a quadrature encoder.
///
/// The count is signed and monotonically adjusted: clockwise pulses add one,
/// counter-clockwise pulses subtract one.
pub trait PulseCounter {
    /// Error type
    type Error: core::fmt::Debug;

    /// Wait until the count changes and return the new absolute count.
    ///
    /// Must be cancel-safe, like [`crate::InputLine::wait_for_edge`].
    fn wait_for_change(&mut self) -> impl Future<Output = Result<i32, Self::Error>>;

    /// Current absolute count.
    fn count(&self) -> i32;

    /// Pulses the encoder produces per full revolution.
    fn pulses_per_rotation(&self) -> u16;

    /// Count expressed in revolutions.
    #[allow(clippy::cast_precision_loss)]
    fn rotations(&self) -> f32 {
        let ppr = self.pulses_per_rotation().max(1);
        self.count() as f32 / f32::from(ppr)
    }
}
