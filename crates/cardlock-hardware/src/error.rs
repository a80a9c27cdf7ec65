//! Error types for hardware operations.
//!
//! This module defines the errors the peripherals report: bus communication
//! failures, failed card reads and out-of-range strip writes.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device communication error (SPI/I2C transfer failed).
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Card reading error (request, anti-collision or select).
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Pixel index outside the LED strip.
    #[error("Pixel {index} out of range for strip of {len} pixels")]
    PixelOutOfRange { index: usize, len: usize },
}

impl HardwareError {
    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new pixel out of range error.
    pub fn pixel_out_of_range(index: usize, len: usize) -> Self {
        Self::PixelOutOfRange { index, len }
    }
}
