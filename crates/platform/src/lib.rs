//! Hardware abstraction layer for the record-player input controls
//!
//! This crate provides the trait boundaries of the input pipeline so the
//! pipeline can be developed and tested without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Controller (board crate: tag → content, playback)
//!         ↓
//! Input pipeline (controls crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Pin controller / SPI reader driver (board crate)
//! ```
//!
//! # Boundaries
//!
//! - [`PinController`], [`InputLine`], [`OutputLine`] - GPIO with edge delivery
//! - [`PulseCounter`] - quadrature encoder count
//! - [`TagScanner`] - contactless tag reader
//! - [`InputDevice`] - consumer side of the [`InputEvent`] stream
//!
//! # Features
//!
//! - `std`: JSON configuration, `std::error::Error` impls and [`mocks`]
//!
//! # Example
//!
//! ```no_run
//! use platform::{InputDevice, InputEvent};
//!
//! async fn example<D: InputDevice>(input: &mut D) {
//!     if let InputEvent::TagRead(tag) = input.wait_for_event().await {
//!         let _key = tag.hex();
//!     }
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)] // accessors: callers decide
#![allow(async_fn_in_trait)] // single-threaded executors, Send bounds not needed

pub mod config;
pub mod encoder;
pub mod gpio;
pub mod input;
pub mod mocks;
pub mod peripheral;
pub mod rfid;

pub use config::{ConfigError, HardwareConfig, KnobConfig, LedConfig, ReaderConfig};
pub use encoder::PulseCounter;
pub use gpio::{Edge, EdgeKind, InputLine, OutputLine, PinController, PinNumber, PinState};
pub use input::{
    ButtonGesture, InputDevice, InputEvent, RotationEvent, SwitchEvent, TagId, TagRead,
};
pub use peripheral::{BitOrder, SpiAddress, SpiConfig, SpiMode};
pub use rfid::TagScanner;
