//! Contactless tag-reader abstraction
//!
//! Only the two operations the reader loop needs are modelled: a bounded
//! presence scan and field enable. Chip bring-up (reset pulse, SPI clocking,
//! antenna gain) belongs to the concrete driver.

use core::future::Future;

use embassy_time::Duration;

use crate::input::TagId;

/// Bounded-duration ISO 14443 type A scanner.
pub trait TagScanner {
    /// Error type
    type Error: core::fmt::Debug;

    /// Listen for a card for at most `window`.
    ///
    /// `Ok(None)` is the normal "no tag present" outcome, not an error.
    fn listen(
        &mut self,
        window: Duration,
    ) -> impl Future<Output = Result<Option<TagId>, Self::Error>>;

    /// Switch the RF field on or off.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Put the chip into its low-power state before the handle is dropped.
    ///
    /// Called exactly once, by the reader worker, after its last scan.
    fn power_down(&mut self) -> Result<(), Self::Error>;
}
