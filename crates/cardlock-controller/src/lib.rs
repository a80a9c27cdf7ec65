//! Card-lock controller.
//!
//! This crate contains the decision logic and the main loop of the
//! controller: the allow-list lookup, the debounce of a card held in front of
//! the reader, the timed feedback sequences and the polling loop that ties
//! them to the hardware.
//!
//! # Examples
//!
//! ```
//! use cardlock_core::{CardId, Decision};
//! use cardlock_controller::ControlLoop;
//! use cardlock_hardware::mock::{MockBench, MockCardReader};
//!
//! let (reader, reader_handle) = MockCardReader::new();
//! let (bank, bench) = MockBench::new(12);
//!
//! let mut controller = ControlLoop::builder()
//!     .reader(Box::new(reader))
//!     .actuators(bank)
//!     .build()
//!     .unwrap();
//!
//! reader_handle.present(CardId::new([0x93, 0x13, 0xF9, 0x02]));
//! let cycle = controller.step();
//!
//! assert_eq!(cycle.decision, Some(Decision::Granted));
//! assert!(!bench.relay_on());
//! assert_eq!(bench.display_text(), "Please identify");
//! ```

pub mod config;
pub mod control_loop;
pub mod debounce;
pub mod policy;
pub mod sequencer;

pub use config::ControllerConfig;
pub use control_loop::{AccessEvent, ControlLoop, ControlLoopBuilder, Cycle, LoopPhase};
pub use debounce::{Action, DebounceGate};
pub use policy::{AccessPolicy, AllowListEntry, BUILTIN_ALLOW_LIST};
pub use sequencer::{FeedbackSequencer, Step};
