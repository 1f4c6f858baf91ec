//! Toggle switch monitor

use platform::{Edge, EdgeKind, SwitchEvent};

/// Two-state watcher over stable switch edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchMonitor {
    on: bool,
}

impl SwitchMonitor {
    /// Monitor starting in the given position (the level read at open).
    pub const fn new(on: bool) -> Self {
        Self { on }
    }

    /// Current position.
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Feed one stable edge: rising is `On`, falling is `Off`.
    pub fn on_edge(&mut self, edge: Edge) -> SwitchEvent {
        self.on = edge.kind == EdgeKind::Rising;
        if self.on {
            SwitchEvent::On
        } else {
            SwitchEvent::Off
        }
    }
}
