//! Hardware device abstraction layer for the card-lock controller.
//!
//! This crate provides trait-based abstractions for the peripherals of a
//! card-operated door: the proximity card reader, the lock relay and light
//! circuit, the buzzer, the addressable LED strip and the character display.
//! The traits allow the control loop to run unchanged against real drivers
//! or against the in-memory mocks used for development and testing.
//!
//! # Design Philosophy
//!
//! - **Synchronous**: the controller is a single polling loop; every trait
//!   method is a plain blocking call.
//! - **Object-safe**: every trait can be boxed (`Box<dyn CardReader>`), which
//!   is how [`ActuatorBank`] and the control loop hold their devices.
//! - **Error-aware**: device operations return [`Result<T>`] with a
//!   [`HardwareError`]. The reader and the actuator bank decide how much of
//!   that reaches the caller (see below).
//!
//! # Card Readers
//!
//! The [`CardReader`] trait splits a poll into reset, request and select.
//! Its provided [`poll`](traits::CardReader::poll) method turns any failure
//! into "no card", which is how the control loop consumes it:
//!
//! ```
//! # #[cfg(feature = "mock")] {
//! use cardlock_core::PollResult;
//! use cardlock_hardware::{CardReader, HardwareError};
//! use cardlock_hardware::mock::MockCardReader;
//!
//! let (mut reader, handle) = MockCardReader::new();
//! handle.fail_next_poll(HardwareError::communication("SPI timeout"));
//!
//! assert!(reader.try_poll().is_err());
//! assert_eq!(reader.poll(), PollResult::NoCard);
//! # }
//! ```
//!
//! # Actuators
//!
//! Output devices are grouped in an [`ActuatorBank`], which exposes
//! infallible primitives (set relay, fill strip, show text, sleep, ...).
//! Device errors are logged with `tracing` and otherwise ignored, so a
//! feedback sequence always runs to its end.
//!
//! # Mock Implementations
//!
//! With the `mock` feature, the `mock` module provides a scripted
//! `MockCardReader` and a `MockBench` that builds a complete simulated
//! [`ActuatorBank`] with an inspection handle. The feature is off by default;
//! tests and the host simulator turn it on.

pub mod bank;
pub mod delay;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use bank::{ActuatorBank, Tone};
pub use delay::ThreadDelay;
pub use error::{HardwareError, Result};
pub use traits::{Buzzer, CardReader, CharacterDisplay, Delay, LedStrip, SwitchOutput};
pub use types::{Device, ReaderInfo};
