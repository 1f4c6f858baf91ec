//! Input-event pipeline for the record-player controls
//!
//! Turns noisy edges from a rotary knob, its push-button, a toggle switch and
//! a contactless tag reader into a small vocabulary of [`InputEvent`]s, and
//! drives the status LED.
//!
//! # Architecture
//!
//! ```text
//! pin controller ─▶ DebouncedLine ─▶ GestureRecognizer / SwitchMonitor ─┐
//! A/B lines ─────▶ QuadratureCounter ─▶ RotationDecoder ────────────────┤
//! TagScanner ────▶ TagReader worker (ResumeGate) ───────────────────────┼─▶ EventChannel ─▶ controller
//!                                                                        │
//! controller ─▶ Led (on/off/blink) , TagReader (resume/enable/shutdown) ◀┘
//! ```
//!
//! Every line has exactly one processor task. Raw edges reach it as
//! messages, and its timers are deadlines it computes itself, so "cancel the
//! pending decision, then decide the new edge" is plain sequential code.
//!
//! # Features
//!
//! - `std`: host time driver and critical section, plus `platform` mocks
//!
//! [`InputEvent`]: platform::InputEvent

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(async_fn_in_trait)]

pub mod alarm;
pub mod debounce;
pub mod error;
pub mod events;
pub mod gate;
pub mod gesture;
pub mod hal;
pub mod knob;
pub mod led;
pub mod rotation;
pub mod switch;
pub mod tag_reader;

pub use alarm::Alarm;
pub use debounce::{DebouncedLine, Debouncer};
pub use error::{InitError, PinRole};
pub use events::{try_send_event, EventChannel, EventSender, EventStream, EVENT_CHANNEL_DEPTH};
pub use gate::ResumeGate;
pub use gesture::GestureRecognizer;
pub use hal::{HalInput, HalOutput};
pub use knob::{ControlKnob, KnobLines};
pub use led::Led;
pub use rotation::{QuadratureCounter, RotationDecoder};
pub use switch::SwitchMonitor;
pub use tag_reader::TagReader;
