//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled and
//! inspected programmatically without requiring physical hardware.

pub mod bench;
pub mod lcd;
pub mod reader;

// Re-export commonly used types
pub use bench::{MockBench, MockBenchHandle, Operation};
pub use lcd::VirtualLcd;
pub use reader::{MockCardReader, MockCardReaderHandle};
