//! Hardware device trait definitions.
//!
//! This module defines the interfaces between the control loop and the
//! peripherals it drives: the card reader, the switched outputs (lock relay
//! and auxiliary light), the buzzer, the LED strip, the character display and
//! the delay source. Bus setup and the devices' wire protocols live behind
//! these traits.
//!
//! All traits are synchronous. The controller is a single polling loop and
//! every call is expected to complete (or fail) within a few milliseconds,
//! except [`Delay::sleep`], which blocks for exactly the requested time.
//!
//! Traits only require `Send` so that a fully built controller can be moved
//! onto a dedicated thread by the host simulator.

use std::time::Duration;

use cardlock_core::{CardId, Color, PollResult};
use tracing::debug;

use crate::error::Result;
use crate::types::ReaderInfo;

/// Proximity card reader.
///
/// A poll is the three-step exchange of an ISO 14443A reader: reinitialize
/// the chip, send a request to idle cards in the field and, if one answers,
/// run anti-collision and select to obtain its identifier.
///
/// Implementors provide the three steps; [`poll`](CardReader::poll) composes
/// them and folds every failure into [`PollResult::NoCard`]. A reader never
/// retries on its own. The control loop polls again on its next tick.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "mock")] {
/// use cardlock_core::{CardId, PollResult};
/// use cardlock_hardware::mock::MockCardReader;
/// use cardlock_hardware::traits::CardReader;
///
/// let (mut reader, handle) = MockCardReader::new();
/// assert_eq!(reader.poll(), PollResult::NoCard);
///
/// let card = CardId::new([0x93, 0x13, 0xF9, 0x02]);
/// handle.present(card);
/// assert_eq!(reader.poll(), PollResult::Card(card));
/// # }
/// ```
pub trait CardReader: Send {
    /// Reinitialize the reader before a new request.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond on its bus.
    fn reset(&mut self) -> Result<()>;

    /// Ask idle cards in the field to answer.
    ///
    /// Returns `Ok(false)` when no card answered. A timeout waiting for an
    /// answer is reported as `Ok(false)` by well-behaved drivers, but callers
    /// must also accept an error here.
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure or a garbled answer.
    fn request(&mut self) -> Result<bool>;

    /// Run anti-collision and select the answering card.
    ///
    /// # Errors
    ///
    /// Returns an error if the card left the field, a collision could not be
    /// resolved or the returned identifier failed its check byte.
    fn select(&mut self) -> Result<CardId>;

    /// Get reader information.
    fn reader_info(&self) -> ReaderInfo;

    /// Run one full poll, propagating the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step failed.
    fn try_poll(&mut self) -> Result<PollResult> {
        self.reset()?;
        if !self.request()? {
            return Ok(PollResult::NoCard);
        }
        Ok(PollResult::Card(self.select()?))
    }

    /// Run one full poll, reporting any failure as [`PollResult::NoCard`].
    fn poll(&mut self) -> PollResult {
        match self.try_poll() {
            Ok(result) => result,
            Err(e) => {
                debug!(error = %e, "card poll failed, treating as no card");
                PollResult::NoCard
            }
        }
    }
}

/// A digital output that is either on or off (relay coil, light circuit).
pub trait SwitchOutput: Send {
    /// Drive the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin (or port expander) cannot be written.
    fn set(&mut self, on: bool) -> Result<()>;

    /// Read back the current output level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level cannot be read.
    fn is_on(&self) -> Result<bool>;

    /// Invert the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the level cannot be read or written.
    fn toggle(&mut self) -> Result<()> {
        let on = self.is_on()?;
        self.set(!on)
    }
}

/// PWM-driven piezo buzzer.
pub trait Buzzer: Send {
    /// Start a continuous tone.
    ///
    /// `duty` is on a 16-bit scale (`32768` is 50 %).
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM slice cannot be configured.
    fn start_tone(&mut self, frequency_hz: u32, duty: u16) -> Result<()>;

    /// Stop the tone and release the PWM slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM slice cannot be released.
    fn stop(&mut self) -> Result<()>;
}

/// Addressable RGB LED strip with a frame buffer.
///
/// Pixel writes only touch the buffer; nothing changes on the strip until
/// [`write`](LedStrip::write) is called.
pub trait LedStrip: Send {
    /// Number of pixels on the strip.
    fn pixel_count(&self) -> usize;

    /// Set one pixel in the frame buffer.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::PixelOutOfRange` for an index past the end.
    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()>;

    /// Set every pixel in the frame buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if any pixel cannot be set.
    fn fill(&mut self, color: Color) -> Result<()> {
        for index in 0..self.pixel_count() {
            self.set_pixel(index, color)?;
        }
        Ok(())
    }

    /// Push the frame buffer to the strip.
    ///
    /// # Errors
    ///
    /// Returns an error if the data line cannot be driven.
    fn write(&mut self) -> Result<()>;
}

/// Character display (HD44780-style, behind an I2C backpack).
pub trait CharacterDisplay: Send {
    /// Blank the display and home the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the display does not acknowledge.
    fn clear(&mut self) -> Result<()>;

    /// Write text at the cursor, wrapping at the end of each line.
    ///
    /// # Errors
    ///
    /// Returns an error if the display does not acknowledge.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Blocking delay source.
///
/// All waiting the controller does goes through this trait, so tests can
/// substitute an implementation that records the requested time instead of
/// sleeping.
pub trait Delay: Send {
    /// Block for `duration`.
    fn sleep(&mut self, duration: Duration);
}
