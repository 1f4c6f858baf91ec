//! Tag reader worker
//!
//! One worker ([`TagReader::run`]) owns the scanner for its whole life. It
//! sleeps on a [`ResumeGate`] and performs one reading cycle per
//! [`TagReader::resume_reading`]: back off while scanning is disabled, then
//! scan in short windows until a tag is found or scanning is disabled. A
//! found tag is published and the worker goes back to the gate, so the
//! controller decides when (and whether) the next read happens.
//!
//! [`TagReader::shutdown`] sets the quit flag, resumes the worker once and
//! waits until it has powered the scanner down and dropped it. That holds even
//! when shutdown is requested before the worker was first polled: the worker
//! then exits on its first pass through the gate. The quit flag
//! is also checked during backoff and between scan attempts, so shutdown
//! never waits for a tag to appear.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use platform::config::timing;
use platform::{InputEvent, TagId, TagRead, TagScanner};
use tracing::{debug, info, warn};

use crate::events::{try_send_event, EventSender};
use crate::gate::ResumeGate;

/// Reader state shared between the worker and the controller.
pub struct TagReader {
    enabled: AtomicBool,
    quit: AtomicBool,
    running: AtomicBool,
    exited: AtomicBool,
    gate: ResumeGate,
    stopped: Signal<CriticalSectionRawMutex, ()>,
}

impl TagReader {
    /// Reader with scanning enabled and the gate closed.
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            quit: AtomicBool::new(false),
            running: AtomicBool::new(false),
            exited: AtomicBool::new(false),
            gate: ResumeGate::new(),
            stopped: Signal::new(),
        }
    }

    /// Let the worker start one reading cycle. Never blocks.
    pub fn resume_reading(&self) {
        self.gate.release();
    }

    /// Whether scanning is permitted.
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Permit or forbid scanning. The worker picks the change up at its
    /// next check; it does not need to be awake.
    ///
    /// The RF field follows the flag only while the worker is inside a
    /// reading cycle. A worker parked on the gate leaves the field as it was
    /// and applies the change when the next [`TagReader::resume_reading`]
    /// lets it through, before any scan.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// `true` while a worker is inside [`TagReader::run`].
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// Worker body. Returns after [`TagReader::shutdown`], having powered
    /// down and dropped `scanner`.
    ///
    /// Only one worker may run; a second concurrent call returns at once.
    pub async fn run<S: TagScanner>(&self, mut scanner: S, sender: EventSender<'_>) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("tag reader worker already running");
            return;
        }
        info!("tag reader worker started");

        self.read_loop(&mut scanner, &sender).await;

        if let Err(e) = scanner.power_down() {
            warn!(error = ?e, "tag scanner power-down failed");
        }
        drop(scanner);

        self.running.store(false, Ordering::Release);
        self.exited.store(true, Ordering::Release);
        self.stopped.signal(());
        info!("tag reader worker stopped");
    }

    async fn read_loop<S: TagScanner>(&self, scanner: &mut S, sender: &EventSender<'_>) {
        let mut field = Field::default();
        loop {
            self.gate.acquire().await;
            if self.quit_requested() {
                return;
            }

            while !self.enabled() {
                field.apply(scanner, false);
                Timer::after(timing::READER_BACKOFF).await;
                if self.quit_requested() {
                    return;
                }
            }

            let Some(id) = self.scan_until_found(scanner, &mut field).await else {
                if self.quit_requested() {
                    return;
                }
                continue;
            };
            debug!(tag = %id, "tag read");
            try_send_event(sender, InputEvent::TagRead(TagRead { id }));
        }
    }

    /// Scan until a tag is found. `None` if scanning was disabled or
    /// shutdown was requested first.
    async fn scan_until_found<S: TagScanner>(
        &self,
        scanner: &mut S,
        field: &mut Field,
    ) -> Option<TagId> {
        loop {
            if self.quit_requested() {
                return None;
            }
            if !self.enabled() {
                field.apply(scanner, false);
                return None;
            }
            field.apply(scanner, true);
            match scanner.listen(timing::SCAN_WINDOW).await {
                Ok(Some(id)) => return Some(id),
                Ok(None) => {}
                // A failed attempt is treated like an empty field.
                Err(e) => warn!(error = ?e, "tag scan failed"),
            }
            Timer::after(timing::READER_BACKOFF).await;
        }
    }

    /// Stop the worker and wait until it has released the scanner.
    ///
    /// Pending until [`TagReader::run`] has returned, so the worker must be
    /// driven alongside; it may not have been polled yet. Returns at once
    /// if the worker already exited. No reader operation is valid
    /// afterwards.
    pub async fn shutdown(&self) {
        self.quit.store(true, Ordering::Release);
        self.resume_reading();
        if !self.exited.load(Ordering::Acquire) {
            self.stopped.wait().await;
            // Leave the signal set for a concurrent caller.
            self.stopped.signal(());
        }
    }
}

impl Default for TagReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Last RF-field state pushed to the scanner.
#[derive(Default)]
struct Field {
    applied: Option<bool>,
}

impl Field {
    fn apply<S: TagScanner>(&mut self, scanner: &mut S, enabled: bool) {
        if self.applied == Some(enabled) {
            return;
        }
        match scanner.set_enabled(enabled) {
            Ok(()) => self.applied = Some(enabled),
            Err(e) => warn!(error = ?e, enabled, "tag scanner enable failed"),
        }
    }
}
