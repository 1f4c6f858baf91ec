//! Mock implementations for testing
//!
//! Host-side doubles for every collaborator trait. Each mock hands out a
//! cloneable handle so a test can keep driving (or inspecting) a line after
//! the line itself was moved into the component under test.

#![cfg(any(test, feature = "std"))]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::vec::Vec;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};

use crate::*;

type Shared<T> = Mutex<CriticalSectionRawMutex, RefCell<T>>;

fn shared<T>(value: T) -> Arc<Shared<T>> {
    Arc::new(Mutex::new(RefCell::new(value)))
}

/// Errors produced by the mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// The controller was told to refuse this pin
    Unavailable(PinNumber),
    /// A scripted scan failure
    ScanFailed,
    /// A scripted line read failure
    ReadFailed,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(pin) => write!(f, "{pin} unavailable"),
            Self::ScanFailed => write!(f, "scan failed"),
            Self::ReadFailed => write!(f, "line read failed"),
        }
    }
}

impl std::error::Error for MockError {}

// -----------------------------------------------------------------------------
// Input lines
// -----------------------------------------------------------------------------

struct LineState {
    level: AtomicBool,
    fail_reads: AtomicBool,
    edges: Channel<CriticalSectionRawMutex, Edge, 64>,
}

/// Test-side control of a [`MockInputLine`].
#[derive(Clone)]
pub struct MockLineHandle {
    state: Arc<LineState>,
}

impl MockLineHandle {
    /// New handle with the line resting at `level`.
    pub fn new(level: bool) -> Self {
        Self {
            state: Arc::new(LineState {
                level: AtomicBool::new(level),
                fail_reads: AtomicBool::new(false),
                edges: Channel::new(),
            }),
        }
    }

    /// Line endpoint for the component under test.
    pub fn line(&self) -> MockInputLine {
        MockInputLine {
            state: Arc::clone(&self.state),
        }
    }

    /// Change the level without reporting an edge.
    pub fn set_level(&self, high: bool) {
        self.state.level.store(high, Ordering::SeqCst);
    }

    /// Current level.
    pub fn level(&self) -> bool {
        self.state.level.load(Ordering::SeqCst)
    }

    /// Make subsequent `is_high` reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.state.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Report an edge and move the level accordingly.
    ///
    /// Returns `false` if the edge queue is full.
    pub fn edge(&self, edge: Edge) -> bool {
        self.set_level(edge.kind.level().into());
        self.state.edges.try_send(edge).is_ok()
    }

    /// Rising edge stamped now.
    pub fn rise(&self) -> bool {
        self.edge(Edge::rising(Instant::now()))
    }

    /// Falling edge stamped now.
    pub fn fall(&self) -> bool {
        self.edge(Edge::falling(Instant::now()))
    }

    /// Edges reported but not yet consumed.
    pub fn pending_edges(&self) -> usize {
        self.state.edges.len()
    }
}

/// Mock input line
pub struct MockInputLine {
    state: Arc<LineState>,
}

impl InputLine for MockInputLine {
    type Error = MockError;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Err(MockError::ReadFailed);
        }
        Ok(self.state.level.load(Ordering::SeqCst))
    }

    async fn wait_for_edge(&mut self) -> Result<Edge, Self::Error> {
        Ok(self.state.edges.receive().await)
    }
}

// -----------------------------------------------------------------------------
// Output lines
// -----------------------------------------------------------------------------

/// Test-side view of a [`MockOutputLine`].
#[derive(Clone)]
pub struct MockOutputHandle {
    writes: Arc<Shared<Vec<PinState>>>,
}

impl MockOutputHandle {
    /// New handle with no writes recorded.
    pub fn new() -> Self {
        Self {
            writes: shared(Vec::new()),
        }
    }

    /// Line endpoint for the component under test.
    pub fn line(&self) -> MockOutputLine {
        MockOutputLine {
            writes: Arc::clone(&self.writes),
        }
    }

    /// Every level written, oldest first.
    pub fn writes(&self) -> Vec<PinState> {
        self.writes.lock(|w| w.borrow().clone())
    }

    /// Last written level (`Low` before any write).
    pub fn level(&self) -> PinState {
        self.writes
            .lock(|w| w.borrow().last().copied())
            .unwrap_or(PinState::Low)
    }

    /// Forget recorded writes.
    pub fn clear(&self) {
        self.writes.lock(|w| w.borrow_mut().clear());
    }
}

impl Default for MockOutputHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock output line; records every write.
pub struct MockOutputLine {
    writes: Arc<Shared<Vec<PinState>>>,
}

impl OutputLine for MockOutputLine {
    type Error = MockError;

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.lock(|w| w.borrow_mut().push(PinState::High));
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.lock(|w| w.borrow_mut().push(PinState::Low));
        Ok(())
    }

    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        let last = self.writes.lock(|w| w.borrow().last().copied());
        Ok(last == Some(PinState::High))
    }
}

// -----------------------------------------------------------------------------
// Pin controller
// -----------------------------------------------------------------------------

/// Mock pin controller.
///
/// Input lines are backed by handles created on demand with
/// [`MockPinController::input`]; lines opened without a handle rest low.
#[derive(Default)]
pub struct MockPinController {
    inputs: BTreeMap<PinNumber, MockLineHandle>,
    outputs: BTreeMap<PinNumber, MockOutputHandle>,
    failing: BTreeSet<PinNumber>,
    opened: Vec<PinNumber>,
}

impl MockPinController {
    /// Controller with every pin available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to open `pin`.
    pub fn fail_on(&mut self, pin: PinNumber) -> &mut Self {
        self.failing.insert(pin);
        self
    }

    /// Handle for input `pin`, created resting low if it does not exist yet.
    pub fn input(&mut self, pin: PinNumber) -> MockLineHandle {
        self.inputs
            .entry(pin)
            .or_insert_with(|| MockLineHandle::new(false))
            .clone()
    }

    /// Handle for output `pin`.
    pub fn output(&mut self, pin: PinNumber) -> MockOutputHandle {
        self.outputs.entry(pin).or_default().clone()
    }

    /// Pins successfully opened, in order.
    pub fn opened(&self) -> &[PinNumber] {
        &self.opened
    }

    fn claim(&mut self, pin: PinNumber) -> Result<(), MockError> {
        if self.failing.contains(&pin) {
            return Err(MockError::Unavailable(pin));
        }
        self.opened.push(pin);
        Ok(())
    }
}

impl PinController for MockPinController {
    type Error = MockError;
    type Input = MockInputLine;
    type Output = MockOutputLine;

    fn open_input(&mut self, pin: PinNumber) -> Result<Self::Input, Self::Error> {
        self.claim(pin)?;
        Ok(self.input(pin).line())
    }

    fn open_output(&mut self, pin: PinNumber) -> Result<Self::Output, Self::Error> {
        self.claim(pin)?;
        Ok(self.output(pin).line())
    }
}

// -----------------------------------------------------------------------------
// Tag scanner
// -----------------------------------------------------------------------------

struct ScannerState {
    script: Shared<VecDeque<Result<Option<TagId>, MockError>>>,
    enabled_calls: Shared<Vec<bool>>,
    attempts: AtomicUsize,
    power_downs: AtomicUsize,
}

/// Scripted tag scanner.
///
/// Each `listen` pops the next scripted outcome; an exhausted script behaves
/// like an empty field and waits out the whole window. Clones share state.
#[derive(Clone)]
pub struct MockTagScanner {
    state: Arc<ScannerState>,
}

impl MockTagScanner {
    /// Scanner with an empty script.
    pub fn new() -> Self {
        Self {
            state: Arc::new(ScannerState {
                script: Mutex::new(RefCell::new(VecDeque::new())),
                enabled_calls: Mutex::new(RefCell::new(Vec::new())),
                attempts: AtomicUsize::new(0),
                power_downs: AtomicUsize::new(0),
            }),
        }
    }

    /// Queue a tag to be found on a future attempt.
    pub fn present(&self, id: TagId) {
        self.push(Ok(Some(id)));
    }

    /// Queue an attempt that finds nothing.
    pub fn absent(&self) {
        self.push(Ok(None));
    }

    /// Queue a failing attempt.
    pub fn fail(&self) {
        self.push(Err(MockError::ScanFailed));
    }

    fn push(&self, outcome: Result<Option<TagId>, MockError>) {
        self.state
            .script
            .lock(|s| s.borrow_mut().push_back(outcome));
    }

    /// Number of `listen` calls so far.
    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    /// Arguments of every `set_enabled` call.
    pub fn enabled_calls(&self) -> Vec<bool> {
        self.state.enabled_calls.lock(|c| c.borrow().clone())
    }

    /// Number of `power_down` calls so far.
    pub fn power_downs(&self) -> usize {
        self.state.power_downs.load(Ordering::SeqCst)
    }
}

impl Default for MockTagScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TagScanner for MockTagScanner {
    type Error = MockError;

    async fn listen(&mut self, window: Duration) -> Result<Option<TagId>, Self::Error> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.state.script.lock(|s| s.borrow_mut().pop_front());
        match next {
            Some(outcome) => outcome,
            None => {
                Timer::after(window).await;
                Ok(None)
            }
        }
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.state
            .enabled_calls
            .lock(|c| c.borrow_mut().push(enabled));
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), Self::Error> {
        self.state.power_downs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Pulse counter
// -----------------------------------------------------------------------------

struct CounterState {
    count: AtomicI32,
    changes: Channel<CriticalSectionRawMutex, i32, 32>,
}

/// Scripted pulse counter. Clones share state.
#[derive(Clone)]
pub struct MockPulseCounter {
    state: Arc<CounterState>,
    ppr: u16,
}

impl MockPulseCounter {
    /// Counter at zero with `ppr` pulses per rotation.
    pub fn new(ppr: u16) -> Self {
        Self {
            state: Arc::new(CounterState {
                count: AtomicI32::new(0),
                changes: Channel::new(),
            }),
            ppr,
        }
    }

    /// Report a new absolute count. Returns `false` if the queue is full.
    pub fn set(&self, count: i32) -> bool {
        self.state.changes.try_send(count).is_ok()
    }
}

impl PulseCounter for MockPulseCounter {
    type Error = MockError;

    async fn wait_for_change(&mut self) -> Result<i32, Self::Error> {
        let count = self.state.changes.receive().await;
        self.state.count.store(count, Ordering::SeqCst);
        Ok(count)
    }

    fn count(&self) -> i32 {
        self.state.count.load(Ordering::SeqCst)
    }

    fn pulses_per_rotation(&self) -> u16 {
        self.ppr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn input_line_delivers_edges_in_order() {
        let handle = MockLineHandle::new(false);
        let mut line = handle.line();
        let t0 = Instant::now();
        assert!(handle.edge(Edge::rising(t0)));
        assert!(handle.edge(Edge::falling(t0)));
        assert!(!line.is_high().unwrap());
        assert_eq!(line.wait_for_edge().await.unwrap().kind, EdgeKind::Rising);
        assert_eq!(line.wait_for_edge().await.unwrap().kind, EdgeKind::Falling);
        assert_eq!(handle.pending_edges(), 0);
    }

    #[test]
    fn controller_records_opens_and_refuses_failing_pins() {
        let mut controller = MockPinController::new();
        controller.fail_on(PinNumber(12));
        assert!(controller.open_input(PinNumber(16)).is_ok());
        assert_eq!(
            controller.open_input(PinNumber(12)).err(),
            Some(MockError::Unavailable(PinNumber(12)))
        );
        assert!(controller.open_output(PinNumber(26)).is_ok());
        assert_eq!(controller.opened(), &[PinNumber(16), PinNumber(26)]);
    }

    #[test]
    fn output_line_records_writes() {
        let handle = MockOutputHandle::new();
        let mut line = handle.line();
        line.set_high().unwrap();
        assert!(line.is_set_high().unwrap());
        line.set_state(PinState::Low).unwrap();
        assert_eq!(handle.writes(), vec![PinState::High, PinState::Low]);
        assert_eq!(handle.level(), PinState::Low);
    }

    #[tokio::test]
    async fn scanner_plays_script_then_waits_out_window() {
        let id = TagId::from_bytes(&[1, 2, 3, 4]).unwrap();
        let mut scanner = MockTagScanner::new();
        scanner.fail();
        scanner.present(id);
        let window = Duration::from_millis(1);
        assert_eq!(scanner.listen(window).await, Err(MockError::ScanFailed));
        assert_eq!(scanner.listen(window).await, Ok(Some(id)));
        assert_eq!(scanner.listen(window).await, Ok(None));
        assert_eq!(scanner.attempts(), 3);
    }

    #[tokio::test]
    async fn pulse_counter_reports_scripted_counts() {
        let mut counter = MockPulseCounter::new(20);
        counter.set(3);
        assert_eq!(counter.wait_for_change().await, Ok(3));
        assert_eq!(counter.count(), 3);
        counter.set(23);
        counter.wait_for_change().await.unwrap();
        assert!((counter.rotations() - 1.15).abs() < 1e-6);
    }
}
