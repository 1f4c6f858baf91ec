//! Edge debouncing
//!
//! [`Debouncer`] is the pure decision logic: it is fed raw edges and the
//! current time and answers with stable edges. [`DebouncedLine`] owns an
//! [`InputLine`] and drives a debouncer from it, racing the line against the
//! pending decision's deadline.
//!
//! # Decision rule
//!
//! Every raw edge first cancels a pending decision. If at least one window
//! has elapsed since the last immediately accepted edge, the new edge is
//! decided on the spot and the elapsed-time reference restarts. Otherwise
//! the decision is deferred by one window; a newer edge arriving before
//! then supersedes it. Either way an edge whose polarity equals the last
//! stable polarity is bounce and is dropped.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use platform::{Edge, EdgeKind, InputLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    edge: Edge,
    due: Instant,
}

/// Debounce state of one line.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    reset_at: Instant,
    last_stable: Option<EdgeKind>,
    pending: Option<Pending>,
}

impl Debouncer {
    /// New debouncer whose elapsed-time reference starts at `started_at`.
    ///
    /// The last stable polarity starts unknown, so the first decided edge is
    /// accepted whatever its polarity.
    pub const fn new(window: Duration, started_at: Instant) -> Self {
        Self {
            window,
            reset_at: started_at,
            last_stable: None,
            pending: None,
        }
    }

    /// Debounce window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Polarity of the last accepted edge, `None` before the first.
    pub const fn last_stable(&self) -> Option<EdgeKind> {
        self.last_stable
    }

    /// When the deferred decision falls due, if one is pending.
    pub fn pending_due(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Feed a raw edge. Returns the edge if it is accepted immediately.
    pub fn on_edge(&mut self, edge: Edge) -> Option<Edge> {
        // Superseded before anything else is decided.
        self.pending = None;

        if edge.at.saturating_duration_since(self.reset_at) < self.window {
            let due = edge.at.checked_add(self.window).unwrap_or(Instant::MAX);
            self.pending = Some(Pending { edge, due });
            return None;
        }

        self.reset_at = edge.at;
        self.accept(edge)
    }

    /// Decide the deferred edge if it is due at `now`.
    ///
    /// An accepted deferred edge is stamped with the instant it fell due.
    pub fn poll(&mut self, now: Instant) -> Option<Edge> {
        let pending = self.pending.filter(|p| p.due <= now)?;
        self.pending = None;
        self.accept(Edge::new(pending.edge.kind, pending.due))
    }

    fn accept(&mut self, edge: Edge) -> Option<Edge> {
        if self.last_stable == Some(edge.kind) {
            return None;
        }
        self.last_stable = Some(edge.kind);
        Some(edge)
    }
}

/// Earlier of two optional instants.
pub(crate) fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// An input line with a debouncer in front of it.
pub struct DebouncedLine<L> {
    line: L,
    debouncer: Debouncer,
    // Raw edge held back while an older deferred decision is delivered.
    held: Option<Edge>,
}

impl<L: InputLine> DebouncedLine<L> {
    /// Wrap `line`; the elapsed-time reference starts now.
    pub fn new(line: L, window: Duration) -> Self {
        Self {
            line,
            debouncer: Debouncer::new(window, Instant::now()),
            held: None,
        }
    }

    /// The underlying line, for synchronous reads.
    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }

    /// Debounce state.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Wait for the next stable edge.
    pub async fn next_stable(&mut self) -> Result<Edge, L::Error> {
        loop {
            if let Some(edge) = self.next_stable_until(None).await? {
                return Ok(edge);
            }
        }
    }

    /// Wait for the next stable edge, giving up at `deadline`.
    ///
    /// Resolves to `Ok(None)` once `deadline` has passed without a stable
    /// edge. Decisions are delivered in event-time order: a deferred edge
    /// that fell due before a newer raw edge was observed is delivered
    /// first, and the raw edge is processed on the next call.
    ///
    /// Cancel-safe as long as the line's `wait_for_edge` is.
    pub async fn next_stable_until(
        &mut self,
        deadline: Option<Instant>,
    ) -> Result<Option<Edge>, L::Error> {
        loop {
            if let Some(edge) = self.held.take() {
                if let Some(stable) = self.debouncer.on_edge(edge) {
                    return Ok(Some(stable));
                }
                continue;
            }

            let wake = earliest(self.debouncer.pending_due(), deadline);
            let raw = match wake {
                Some(at) => match select(self.line.wait_for_edge(), Timer::at(at)).await {
                    Either::First(edge) => Some(edge?),
                    Either::Second(()) => None,
                },
                None => Some(self.line.wait_for_edge().await?),
            };

            if let Some(edge) = raw {
                if let Some(stable) = self.debouncer.poll(edge.at) {
                    self.held = Some(edge);
                    return Ok(Some(stable));
                }
                if let Some(stable) = self.debouncer.on_edge(edge) {
                    return Ok(Some(stable));
                }
                continue;
            }

            let now = Instant::now();
            if let Some(stable) = self.debouncer.poll(now) {
                return Ok(Some(stable));
            }
            if deadline.is_some_and(|d| d <= now) {
                return Ok(None);
            }
        }
    }
}
