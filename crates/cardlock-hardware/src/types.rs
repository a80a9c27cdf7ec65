//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card reader information.
///
/// Contains reader-specific metadata such as the chip name and the
/// supported card protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Optional firmware/chip version byte reported by the reader.
    pub firmware_version: Option<u8>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            firmware_version: None,
        }
    }

    /// Set the firmware version byte.
    pub fn with_firmware_version(mut self, version: u8) -> Self {
        self.firmware_version = Some(version);
        self
    }
}

/// Actuator identification, used in logs and for fault injection in mocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Electromechanical lock relay.
    Relay,
    /// Auxiliary light circuit.
    Light,
    /// PWM buzzer.
    Buzzer,
    /// Addressable LED strip.
    LedStrip,
    /// Character display.
    Display,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Device::Relay => "relay",
            Device::Light => "light",
            Device::Buzzer => "buzzer",
            Device::LedStrip => "led-strip",
            Device::Display => "display",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()])
            .with_firmware_version(0x92);

        assert_eq!(info.name, "MFRC522");
        assert_eq!(info.protocols, vec!["ISO14443A"]);
        assert_eq!(info.firmware_version, Some(0x92));
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::LedStrip.to_string(), "led-strip");
        assert_eq!(Device::Relay.to_string(), "relay");
    }

    #[test]
    fn test_device_serialization() {
        let json = serde_json::to_string(&Device::LedStrip).unwrap();
        assert_eq!(json, "\"led_strip\"");
        let back: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Device::LedStrip);
    }
}
