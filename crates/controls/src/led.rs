//! Status LED with a cancellable blink cycle
//!
//! [`Led::start_blinking`] runs the high 200 ms / low 500 ms cycle until
//! [`Led::stop_blinking`] cancels it. Cancellation is only observed at the
//! two pauses, never in the middle of a pin write, and `stop_blinking`
//! returns once the cycle has ended with the pin driven low.
//!
//! Direct writes ([`Led::on`], [`Led::off`], [`Led::blink_once`]) go through
//! the same pin lock as the cycle but do not coordinate with it: issuing them
//! while a cycle runs is allowed and the last writer wins.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use platform::config::timing;
use platform::{LedConfig, OutputLine, PinController, PinState};
use tracing::{debug, error};

use crate::error::{InitError, PinRole};

/// Status LED on one output line.
pub struct Led<P> {
    pin: Mutex<CriticalSectionRawMutex, RefCell<P>>,
    blinking: AtomicBool,
    cancel: Signal<CriticalSectionRawMutex, ()>,
    cycle_done: Signal<CriticalSectionRawMutex, ()>,
}

impl<P: OutputLine> Led<P> {
    /// LED on an already opened line.
    pub fn new(pin: P) -> Self {
        Self {
            pin: Mutex::new(RefCell::new(pin)),
            blinking: AtomicBool::new(false),
            cancel: Signal::new(),
            cycle_done: Signal::new(),
        }
    }

    /// Open the configured pin as an output.
    pub fn open<C>(controller: &mut C, config: &LedConfig) -> Result<Self, InitError<C::Error>>
    where
        C: PinController<Output = P>,
    {
        let pin = controller.open_output(config.pin).map_err(|e| {
            error!(pin = config.pin.get(), "failed to open LED pin");
            InitError::new(PinRole::Led, config.pin)(e)
        })?;
        Ok(Self::new(pin))
    }

    fn write(&self, state: PinState) -> Result<(), P::Error> {
        self.pin.lock(|pin| pin.borrow_mut().set_state(state))
    }

    /// Drive the pin high.
    pub fn on(&self) -> Result<(), P::Error> {
        self.write(PinState::High)
    }

    /// Drive the pin low.
    pub fn off(&self) -> Result<(), P::Error> {
        self.write(PinState::Low)
    }

    /// Read back the driven level.
    pub fn is_on(&self) -> Result<bool, P::Error> {
        self.pin.lock(|pin| pin.borrow_mut().is_set_high())
    }

    /// `true` while a blink cycle runs.
    pub fn is_blinking(&self) -> bool {
        self.blinking.load(Ordering::Acquire)
    }

    /// Single 200 ms flash. Independent of the blink cycle.
    pub async fn blink_once(&self) -> Result<(), P::Error> {
        self.on()?;
        Timer::after(timing::BLINK_ON).await;
        self.off()
    }

    /// Blink until [`Led::stop_blinking`].
    ///
    /// Resolves when the cycle ends. Returns immediately if a cycle is
    /// already running. Dropping the future also ends the cycle.
    pub async fn start_blinking(&self) -> Result<(), P::Error> {
        if self.blinking.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.cycle_done.reset();
        let _cycle = CycleGuard {
            blinking: &self.blinking,
            done: &self.cycle_done,
        };
        debug!("blink cycle started");

        loop {
            self.on()?;
            if self.pause(timing::BLINK_ON).await {
                break;
            }
            self.off()?;
            if self.pause(timing::BLINK_OFF).await {
                break;
            }
        }
        debug!("blink cycle cancelled");
        Ok(())
    }

    /// Sleep for `period`; `true` if cancelled first.
    async fn pause(&self, period: Duration) -> bool {
        matches!(
            select(Timer::after(period), self.cancel.wait()).await,
            Either::Second(())
        )
    }

    /// Cancel the blink cycle, wait for it to end and drive the pin low.
    ///
    /// Does nothing if no cycle is running.
    pub async fn stop_blinking(&self) -> Result<(), P::Error> {
        if !self.is_blinking() {
            return Ok(());
        }
        self.cancel.signal(());
        self.cycle_done.wait().await;
        // Waiting consumed the signal; leave it set for any other stopper.
        self.cycle_done.signal(());
        self.cancel.reset();
        self.off()
    }
}

/// Marks the cycle finished however it ends.
struct CycleGuard<'a> {
    blinking: &'a AtomicBool,
    done: &'a Signal<CriticalSectionRawMutex, ()>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.blinking.store(false, Ordering::Release);
        self.done.signal(());
    }
}
