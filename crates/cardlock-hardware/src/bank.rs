//! The actuator bank.
//!
//! [`ActuatorBank`] owns every output device of the controller plus the delay
//! source, and exposes the small set of primitive operations the feedback
//! sequences are written in. Those operations cannot fail: a device error is
//! logged at `warn` and the sequence carries on, because a half-played
//! sequence (for example a relay left energized after a display error) is
//! worse than a missing beep.

use std::time::Duration;

use cardlock_core::Color;
use cardlock_core::constants::{BUZZER_DUTY, BUZZER_FREQUENCY_HZ};
use tracing::{trace, warn};

use crate::error::Result;
use crate::traits::{Buzzer, CharacterDisplay, Delay, LedStrip, SwitchOutput};
use crate::types::Device;

/// Buzzer tone parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// PWM frequency in hertz.
    pub frequency_hz: u32,
    /// Duty cycle on a 16-bit scale.
    pub duty: u16,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: BUZZER_FREQUENCY_HZ,
            duty: BUZZER_DUTY,
        }
    }
}

/// Output devices of the controller, driven through infallible primitives.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "mock")] {
/// use cardlock_core::Color;
/// use cardlock_hardware::mock::MockBench;
///
/// let (mut bank, handle) = MockBench::new(12);
///
/// bank.set_relay(true);
/// bank.fill(Color::GREEN);
/// bank.show_text("Access granted");
///
/// assert!(handle.relay_on());
/// assert!(handle.pixels().iter().all(|c| *c == Color::GREEN));
/// assert_eq!(handle.display_text(), "Access granted");
/// # }
/// ```
pub struct ActuatorBank {
    relay: Box<dyn SwitchOutput>,
    light: Box<dyn SwitchOutput>,
    buzzer: Box<dyn Buzzer>,
    strip: Box<dyn LedStrip>,
    display: Box<dyn CharacterDisplay>,
    delay: Box<dyn Delay>,
    tone: Tone,
}

impl ActuatorBank {
    /// Assemble a bank from its devices, using the default tone.
    pub fn new(
        relay: Box<dyn SwitchOutput>,
        light: Box<dyn SwitchOutput>,
        buzzer: Box<dyn Buzzer>,
        strip: Box<dyn LedStrip>,
        display: Box<dyn CharacterDisplay>,
        delay: Box<dyn Delay>,
    ) -> Self {
        Self {
            relay,
            light,
            buzzer,
            strip,
            display,
            delay,
            tone: Tone::default(),
        }
    }

    /// Replace the buzzer tone.
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    /// Current buzzer tone.
    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Number of pixels on the LED strip.
    pub fn pixel_count(&self) -> usize {
        self.strip.pixel_count()
    }

    /// Energize or release the lock relay.
    pub fn set_relay(&mut self, on: bool) {
        trace!(on, "relay");
        let result = self.relay.set(on);
        report(Device::Relay, "set", result);
    }

    /// Invert the auxiliary light.
    pub fn toggle_light(&mut self) {
        trace!("light toggle");
        let result = self.light.toggle();
        report(Device::Light, "toggle", result);
    }

    /// Start the buzzer with the configured tone.
    pub fn tone_on(&mut self) {
        let Tone { frequency_hz, duty } = self.tone;
        let result = self.buzzer.start_tone(frequency_hz, duty);
        report(Device::Buzzer, "start", result);
    }

    /// Silence the buzzer.
    pub fn tone_off(&mut self) {
        let result = self.buzzer.stop();
        report(Device::Buzzer, "stop", result);
    }

    /// Fill the whole strip with one colour and show it.
    pub fn fill(&mut self, color: Color) {
        trace!(?color, "strip fill");
        let result = self.strip.fill(color).and_then(|()| self.strip.write());
        report(Device::LedStrip, "fill", result);
    }

    /// Set one pixel and show the strip.
    pub fn set_pixel(&mut self, index: usize, color: Color) {
        let result = self
            .strip
            .set_pixel(index, color)
            .and_then(|()| self.strip.write());
        report(Device::LedStrip, "set pixel", result);
    }

    /// Blank the display.
    pub fn clear_display(&mut self) {
        let result = self.display.clear();
        report(Device::Display, "clear", result);
    }

    /// Write text at the display cursor.
    pub fn write_text(&mut self, text: &str) {
        let result = self.display.write_text(text);
        report(Device::Display, "write", result);
    }

    /// Blank the display, then show `text` from the top-left corner.
    pub fn show_text(&mut self, text: &str) {
        trace!(text, "display");
        self.clear_display();
        self.write_text(text);
    }

    /// Block for `duration`.
    pub fn sleep(&mut self, duration: Duration) {
        self.delay.sleep(duration);
    }
}

impl std::fmt::Debug for ActuatorBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorBank")
            .field("pixels", &self.strip.pixel_count())
            .field("tone", &self.tone)
            .finish_non_exhaustive()
    }
}

fn report(device: Device, operation: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!(%device, operation, error = %e, "actuator operation failed, continuing");
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::{MockBench, Operation};

    #[test]
    fn test_default_tone() {
        let tone = Tone::default();
        assert_eq!(tone.frequency_hz, 2000);
        assert_eq!(tone.duty, 32768);
    }

    #[test]
    fn test_show_text_clears_first() {
        let (mut bank, handle) = MockBench::new(4);
        bank.write_text("junk");
        handle.clear_operations();

        bank.show_text("Please identify");

        assert_eq!(
            handle.operations(),
            vec![
                Operation::DisplayClear,
                Operation::DisplayWrite("Please identify".to_string()),
            ]
        );
        assert_eq!(handle.display_text(), "Please identify");
    }

    #[test]
    fn test_tone_uses_configured_parameters() {
        let (bank, handle) = MockBench::new(4);
        let mut bank = bank.with_tone(Tone {
            frequency_hz: 4000,
            duty: 1000,
        });

        bank.tone_on();
        assert_eq!(handle.tone(), Some((4000, 1000)));
        bank.tone_off();
        assert_eq!(handle.tone(), None);
    }

    #[test]
    fn test_set_pixel_writes_strip() {
        let (mut bank, handle) = MockBench::new(3);

        bank.set_pixel(1, Color::RED);

        assert_eq!(handle.pixels(), vec![Color::BLACK, Color::RED, Color::BLACK]);
        assert_eq!(
            handle.operations(),
            vec![
                Operation::SetPixel {
                    index: 1,
                    color: Color::RED
                },
                Operation::StripWrite,
            ]
        );
    }

    #[test]
    fn test_device_failure_is_swallowed() {
        let (mut bank, handle) = MockBench::new(3);
        handle.fail_next(Device::Relay);

        bank.set_relay(true);
        assert!(!handle.relay_on());

        bank.set_relay(true);
        assert!(handle.relay_on());
    }

    #[test]
    fn test_out_of_range_pixel_is_swallowed() {
        let (mut bank, handle) = MockBench::new(3);
        bank.set_pixel(7, Color::RED);
        assert_eq!(handle.pixels(), vec![Color::BLACK; 3]);
    }

    #[test]
    fn test_sleep_goes_through_delay() {
        let (mut bank, handle) = MockBench::new(3);
        bank.sleep(Duration::from_millis(500));
        assert_eq!(handle.total_sleep(), Duration::from_millis(500));
    }
}
