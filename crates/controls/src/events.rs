//! Event channel between the pipeline and the controller
//!
//! Producers (knob processors, the tag reader worker) publish with
//! [`try_send_event`], which never waits: if the consumer stalls and the
//! channel reaches [`EVENT_CHANNEL_DEPTH`], new events are dropped and
//! logged instead of stalling edge processing. The consumer side is
//! [`EventStream`], an [`InputDevice`].
//!
//! ```no_run
//! use controls::events::{EventChannel, EventStream};
//!
//! static EVENTS: EventChannel = EventChannel::new();
//!
//! let sender = EVENTS.sender();
//! let mut stream = EventStream::new(&EVENTS);
//! # let _ = (sender, &mut stream);
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use platform::{InputDevice, InputEvent};

/// Depth of the event channel.
pub const EVENT_CHANNEL_DEPTH: usize = 16;

/// Bounded channel carrying [`InputEvent`]s.
pub type EventChannel = Channel<CriticalSectionRawMutex, InputEvent, EVENT_CHANNEL_DEPTH>;

/// Producer endpoint of an [`EventChannel`].
pub type EventSender<'a> = Sender<'a, CriticalSectionRawMutex, InputEvent, EVENT_CHANNEL_DEPTH>;

/// Attempt to publish an event without blocking.
///
/// Returns `true` if the event was enqueued, `false` if the channel was full
/// and the event was dropped.
pub fn try_send_event(tx: &EventSender<'_>, event: InputEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!(kind = event_kind(&event), "event channel full, event dropped");
            false
        }
    }
}

fn event_kind(event: &InputEvent) -> &'static str {
    match event {
        InputEvent::Button(gesture) => gesture.as_str(),
        InputEvent::Switch(_) => "switch",
        InputEvent::Rotation(_) => "rotation",
        InputEvent::TagRead(_) => "tag",
    }
}

/// Consumer endpoint of an [`EventChannel`].
pub struct EventStream<'a> {
    rx: Receiver<'a, CriticalSectionRawMutex, InputEvent, EVENT_CHANNEL_DEPTH>,
}

impl<'a> EventStream<'a> {
    /// Stream reading from `channel`.
    pub fn new(channel: &'a EventChannel) -> Self {
        Self {
            rx: channel.receiver(),
        }
    }
}

impl InputDevice for EventStream<'_> {
    async fn wait_for_event(&mut self) -> InputEvent {
        self.rx.receive().await
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        self.rx.try_receive().ok() // Empty maps to None; the channel never closes
    }
}
