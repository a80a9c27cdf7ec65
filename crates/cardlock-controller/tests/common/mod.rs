//! Common test utilities for controller integration tests.
//!
//! [`Rig`] wires a [`ControlLoop`] to a mock reader and a mock actuator bench
//! and keeps both handles, so a test can script card presentations and then
//! inspect every hardware operation the loop performed.

#![allow(dead_code)]

use cardlock_controller::{ControlLoop, Cycle};
use cardlock_core::{CardId, PollResult};
use cardlock_hardware::mock::{MockBench, MockBenchHandle, MockCardReader, MockCardReaderHandle};

/// Cards of the built-in allow-list.
pub mod cards {
    use cardlock_core::CardId;

    pub const GRANTED: CardId = CardId::new([0x93, 0x13, 0xF9, 0x02]);
    pub const SECRET: CardId = CardId::new([0x34, 0x83, 0xE9, 0x74]);
    pub const LIGHTS: CardId = CardId::new([0x2C, 0x4E, 0xA8, 0x17]);

    /// Not on any list.
    pub const UNKNOWN: CardId = CardId::new([0xAA, 0xBB, 0xCC, 0xDD]);
}

pub struct Rig {
    pub controller: ControlLoop,
    pub reader: MockCardReaderHandle,
    pub bench: MockBenchHandle,
}

impl Rig {
    /// Default controller over a 12-pixel strip.
    pub fn new() -> Self {
        Self::with_pixels(12)
    }

    pub fn with_pixels(pixel_count: usize) -> Self {
        let (reader, reader_handle) = MockCardReader::new();
        let (bank, bench) = MockBench::new(pixel_count);
        let controller = ControlLoop::builder()
            .reader(Box::new(reader))
            .actuators(bank)
            .build()
            .unwrap();

        Self {
            controller,
            reader: reader_handle,
            bench,
        }
    }

    /// Start the loop and forget the startup operations.
    pub fn started() -> Self {
        let mut rig = Self::new();
        rig.controller.start();
        rig.bench.clear_operations();
        rig
    }

    /// Script `polls` and run one iteration per poll.
    pub fn run_script(&mut self, polls: &[PollResult]) -> Vec<Cycle> {
        self.reader.script(polls.iter().copied());
        polls.iter().map(|_| self.controller.step()).collect()
    }
}

/// Shorthand for a poll that sees `card`.
pub fn seen(card: CardId) -> PollResult {
    PollResult::Card(card)
}
