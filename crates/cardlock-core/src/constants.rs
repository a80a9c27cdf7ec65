//! Core constants for the card-lock controller.
//!
//! This module collects every fixed value the controller relies on: the
//! identifier width, the wiring of the reference board (LED count, display
//! geometry, buzzer tone), the texts shown on the display and the timings of
//! the feedback sequences.
//!
//! # Usage
//!
//! ```
//! use cardlock_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(UID_LENGTH, 4);
//! let cadence = Duration::from_millis(POLL_INTERVAL_MS);
//! assert_eq!(cadence.as_millis(), 50);
//! ```
//!
//! The feedback timings are part of the observable behaviour of the
//! controller (users learn to read them), so they are constants and not
//! configuration.

// ============================================================================
// Card Identifiers
// ============================================================================

/// Number of bytes in a card identifier (single-size ISO 14443A UID).
pub const UID_LENGTH: usize = 4;

// ============================================================================
// Board Wiring
// ============================================================================

/// Number of pixels on the addressable LED strip.
pub const LED_COUNT: usize = 12;

/// Number of lines on the character display.
pub const DISPLAY_LINES: usize = 2;

/// Number of columns per display line.
pub const DISPLAY_COLUMNS: usize = 16;

/// Buzzer PWM frequency in hertz.
pub const BUZZER_FREQUENCY_HZ: u32 = 2000;

/// Buzzer PWM duty cycle on a 16-bit scale (50 %).
pub const BUZZER_DUTY: u16 = 32768;

// ============================================================================
// Display Texts
// ============================================================================

/// Text shown while the controller waits for a card.
pub const IDLE_PROMPT: &str = "Please identify";

/// Shown for [`Decision::Granted`](crate::Decision::Granted).
pub const MSG_ACCESS_GRANTED: &str = "Access granted";

/// Shown for [`Decision::SecretGranted`](crate::Decision::SecretGranted).
pub const MSG_SECRET_ACCESS: &str = "Secret access activated :)";

/// Shown for [`Decision::ToggleLights`](crate::Decision::ToggleLights).
pub const MSG_LIGHTING_SWITCHED: &str = "Lighting switched";

/// Shown for [`Decision::Denied`](crate::Decision::Denied).
pub const MSG_ACCESS_DENIED: &str = "Access denied";

// ============================================================================
// Timing (milliseconds)
// ============================================================================

/// Delay between two polls of the card reader.
pub const POLL_INTERVAL_MS: u64 = 50;

/// Tone length of one short beep (two are played on grant).
pub const SHORT_BEEP_MS: u64 = 100;

/// Tone length of the long beep (denied and light toggle).
pub const LONG_BEEP_MS: u64 = 1000;

/// Silence after each beep.
pub const BEEP_GAP_MS: u64 = 100;

/// Number of short beeps played on grant.
pub const SHORT_BEEP_COUNT: usize = 2;

/// Each half of an LED strip blink (dark, then coloured).
pub const BLINK_PHASE_MS: u64 = 500;

/// Number of dark/coloured cycles in an LED strip blink.
pub const BLINK_CYCLES: usize = 2;

/// Pause after the strip turns green (or after the blue blink).
pub const SETTLE_MS: u64 = 1000;

/// Half period of the auxiliary light blink.
pub const LIGHT_BLINK_MS: u64 = 200;

/// Light blink cycles for a regular grant.
pub const GRANTED_LIGHT_BLINKS: usize = 1;

/// Light blink cycles for the secret grant.
pub const SECRET_LIGHT_BLINKS: usize = 4;

/// Length of the red countdown for a regular grant.
pub const GRANTED_COUNTDOWN_MS: u64 = 2000;

/// Length of the red countdown for the secret grant.
pub const SECRET_COUNTDOWN_MS: u64 = 3000;

// ============================================================================
// Bookkeeping
// ============================================================================

/// Maximum number of access events kept in the controller history.
pub const MAX_HISTORY_SIZE: usize = 100;
