//! Release-counted resume gate
//!
//! Each [`ResumeGate::release`] lets exactly one [`ResumeGate::acquire`]
//! through. Releases are counted, so releasing twice before the waiter gets
//! round to acquiring lets it through twice. Releasing never blocks and is
//! safe from any context.
//!
//! Only one task may wait on a gate at a time.

use core::sync::atomic::{AtomicUsize, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Counting gate with a single waiter.
pub struct ResumeGate {
    permits: AtomicUsize,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl ResumeGate {
    /// Closed gate.
    pub const fn new() -> Self {
        Self {
            permits: AtomicUsize::new(0),
            wake: Signal::new(),
        }
    }

    /// Add one permit and wake the waiter.
    pub fn release(&self) {
        self.permits.fetch_add(1, Ordering::AcqRel);
        self.wake.signal(());
    }

    /// Take a permit if one is available.
    pub fn try_acquire(&self) -> bool {
        self.permits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Wait for and take one permit.
    pub async fn acquire(&self) {
        loop {
            if self.try_acquire() {
                return;
            }
            // A release between the failed take and this wait leaves the
            // signal set, so the wake-up is not lost.
            self.wake.wait().await;
        }
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        self.permits.load(Ordering::Acquire)
    }
}

impl Default for ResumeGate {
    fn default() -> Self {
        Self::new()
    }
}
