//! Mock actuators for testing and development.
//!
//! [`MockBench`] builds a complete [`ActuatorBank`] whose devices are
//! simulated in memory, plus a [`MockBenchHandle`] through which tests
//! inspect what the devices are doing: relay and light levels, the buzzer
//! tone, the pixels currently shown on the strip, the display contents and an
//! ordered log of every operation (sleeps included).
//!
//! All devices of one bench share a single operation log, so the log is the
//! exact order in which the controller touched the hardware.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use cardlock_hardware::mock::{MockBench, Operation};
//!
//! let (mut bank, handle) = MockBench::new(12);
//!
//! bank.tone_on();
//! bank.sleep(Duration::from_millis(100));
//! bank.tone_off();
//!
//! assert_eq!(
//!     handle.operations(),
//!     vec![
//!         Operation::ToneStart { frequency_hz: 2000, duty: 32768 },
//!         Operation::Sleep(Duration::from_millis(100)),
//!         Operation::ToneStop,
//!     ]
//! );
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cardlock_core::Color;

use crate::bank::ActuatorBank;
use crate::error::{HardwareError, Result};
use crate::mock::lcd::VirtualLcd;
use crate::traits::{Buzzer, CharacterDisplay, Delay, LedStrip, SwitchOutput};
use crate::types::Device;

/// One recorded hardware operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Relay driven to the given level.
    Relay(bool),
    /// Light driven to the given level.
    Light(bool),
    /// Buzzer started.
    ToneStart { frequency_hz: u32, duty: u16 },
    /// Buzzer stopped.
    ToneStop,
    /// One pixel set in the strip buffer.
    SetPixel { index: usize, color: Color },
    /// Whole strip buffer set to one colour.
    Fill(Color),
    /// Strip buffer pushed to the LEDs.
    StripWrite,
    /// Display cleared.
    DisplayClear,
    /// Text written to the display.
    DisplayWrite(String),
    /// Delay requested.
    Sleep(Duration),
}

#[derive(Debug)]
struct BenchState {
    relay: bool,
    light: bool,
    tone: Option<(u32, u16)>,
    buffer: Vec<Color>,
    shown: Vec<Color>,
    lcd: VirtualLcd,
    operations: Vec<Operation>,
    faults: HashSet<Device>,
}

impl BenchState {
    /// Consume a pending fault for `device`, if one was injected.
    fn check_fault(&mut self, device: Device) -> Result<()> {
        if self.faults.remove(&device) {
            return Err(HardwareError::communication(format!(
                "injected {device} fault"
            )));
        }
        Ok(())
    }
}

type Shared = Arc<Mutex<BenchState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BenchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Factory for a fully simulated actuator bank.
pub struct MockBench;

impl MockBench {
    /// Build a bank with a strip of `pixel_count` pixels and a delay that
    /// records instead of sleeping.
    ///
    /// Returns a tuple of (ActuatorBank, MockBenchHandle).
    #[allow(clippy::new_ret_no_self)]
    pub fn new(pixel_count: usize) -> (ActuatorBank, MockBenchHandle) {
        Self::build(pixel_count, None)
    }

    /// Build a bank whose sleeps are recorded and then forwarded to `delay`.
    ///
    /// The host simulator uses this with a real thread delay so that the
    /// feedback sequences play at their true speed.
    pub fn with_delay(
        pixel_count: usize,
        delay: Box<dyn Delay>,
    ) -> (ActuatorBank, MockBenchHandle) {
        Self::build(pixel_count, Some(delay))
    }

    fn build(pixel_count: usize, inner: Option<Box<dyn Delay>>) -> (ActuatorBank, MockBenchHandle) {
        let state: Shared = Arc::new(Mutex::new(BenchState {
            relay: false,
            light: false,
            tone: None,
            buffer: vec![Color::BLACK; pixel_count],
            shown: vec![Color::BLACK; pixel_count],
            lcd: VirtualLcd::default(),
            operations: Vec::new(),
            faults: HashSet::new(),
        }));

        let bank = ActuatorBank::new(
            Box::new(MockRelay(state.clone())),
            Box::new(MockLight(state.clone())),
            Box::new(MockBuzzer(state.clone())),
            Box::new(MockLedStrip(state.clone())),
            Box::new(MockDisplay(state.clone())),
            Box::new(MockDelay {
                state: state.clone(),
                inner,
            }),
        );

        (bank, MockBenchHandle { state })
    }
}

/// Handle for inspecting a mock actuator bank.
#[derive(Debug, Clone)]
pub struct MockBenchHandle {
    state: Shared,
}

impl MockBenchHandle {
    /// Returns `true` while the relay is energized.
    pub fn relay_on(&self) -> bool {
        lock(&self.state).relay
    }

    /// Returns `true` while the auxiliary light is on.
    pub fn light_on(&self) -> bool {
        lock(&self.state).light
    }

    /// Current tone as `(frequency_hz, duty)`, or `None` when silent.
    pub fn tone(&self) -> Option<(u32, u16)> {
        lock(&self.state).tone
    }

    /// Pixels currently shown on the strip (last written frame).
    pub fn pixels(&self) -> Vec<Color> {
        lock(&self.state).shown.clone()
    }

    /// Display contents read as one string (see [`VirtualLcd::contents`]).
    pub fn display_text(&self) -> String {
        lock(&self.state).lcd.contents()
    }

    /// Display lines, padded to full width.
    pub fn display_lines(&self) -> Vec<String> {
        lock(&self.state).lcd.all_lines()
    }

    /// Every operation recorded so far, in order.
    pub fn operations(&self) -> Vec<Operation> {
        lock(&self.state).operations.clone()
    }

    /// Remove and return every operation recorded so far.
    pub fn take_operations(&self) -> Vec<Operation> {
        std::mem::take(&mut lock(&self.state).operations)
    }

    /// Forget the recorded operations.
    pub fn clear_operations(&self) {
        lock(&self.state).operations.clear();
    }

    /// Sum of all recorded sleeps.
    pub fn total_sleep(&self) -> Duration {
        lock(&self.state)
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Sleep(d) => Some(*d),
                _ => None,
            })
            .sum()
    }

    /// Make the next operation on `device` fail with a communication error.
    pub fn fail_next(&self, device: Device) {
        lock(&self.state).faults.insert(device);
    }
}

struct MockRelay(Shared);

impl SwitchOutput for MockRelay {
    fn set(&mut self, on: bool) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Relay)?;
        state.relay = on;
        state.operations.push(Operation::Relay(on));
        Ok(())
    }

    fn is_on(&self) -> Result<bool> {
        Ok(lock(&self.0).relay)
    }
}

struct MockLight(Shared);

impl SwitchOutput for MockLight {
    fn set(&mut self, on: bool) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Light)?;
        state.light = on;
        state.operations.push(Operation::Light(on));
        Ok(())
    }

    fn is_on(&self) -> Result<bool> {
        Ok(lock(&self.0).light)
    }
}

struct MockBuzzer(Shared);

impl Buzzer for MockBuzzer {
    fn start_tone(&mut self, frequency_hz: u32, duty: u16) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Buzzer)?;
        state.tone = Some((frequency_hz, duty));
        state
            .operations
            .push(Operation::ToneStart { frequency_hz, duty });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Buzzer)?;
        state.tone = None;
        state.operations.push(Operation::ToneStop);
        Ok(())
    }
}

struct MockLedStrip(Shared);

impl LedStrip for MockLedStrip {
    fn pixel_count(&self) -> usize {
        lock(&self.0).buffer.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::LedStrip)?;
        let len = state.buffer.len();
        let pixel = state
            .buffer
            .get_mut(index)
            .ok_or(HardwareError::pixel_out_of_range(index, len))?;
        *pixel = color;
        state.operations.push(Operation::SetPixel { index, color });
        Ok(())
    }

    fn fill(&mut self, color: Color) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::LedStrip)?;
        state.buffer.fill(color);
        state.operations.push(Operation::Fill(color));
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::LedStrip)?;
        state.shown = state.buffer.clone();
        state.operations.push(Operation::StripWrite);
        Ok(())
    }
}

struct MockDisplay(Shared);

impl CharacterDisplay for MockDisplay {
    fn clear(&mut self) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Display)?;
        state.lcd.clear();
        state.operations.push(Operation::DisplayClear);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut state = lock(&self.0);
        state.check_fault(Device::Display)?;
        state.lcd.put_str(text);
        state
            .operations
            .push(Operation::DisplayWrite(text.to_string()));
        Ok(())
    }
}

struct MockDelay {
    state: Shared,
    inner: Option<Box<dyn Delay>>,
}

impl Delay for MockDelay {
    fn sleep(&mut self, duration: Duration) {
        lock(&self.state).operations.push(Operation::Sleep(duration));
        if let Some(inner) = self.inner.as_mut() {
            inner.sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let (bank, handle) = MockBench::new(12);

        assert_eq!(bank.pixel_count(), 12);
        assert!(!handle.relay_on());
        assert!(!handle.light_on());
        assert_eq!(handle.tone(), None);
        assert_eq!(handle.pixels(), vec![Color::BLACK; 12]);
        assert_eq!(handle.display_text(), "");
        assert!(handle.operations().is_empty());
    }

    #[test]
    fn test_strip_buffer_not_shown_until_write() {
        let (_bank, handle) = MockBench::new(2);
        let mut strip = MockLedStrip(handle.state.clone());

        strip.set_pixel(0, Color::GREEN).unwrap();
        assert_eq!(handle.pixels(), vec![Color::BLACK; 2]);

        strip.write().unwrap();
        assert_eq!(handle.pixels(), vec![Color::GREEN, Color::BLACK]);
    }

    #[test]
    fn test_light_toggle_flips_level() {
        let (mut bank, handle) = MockBench::new(2);

        bank.toggle_light();
        assert!(handle.light_on());
        bank.toggle_light();
        assert!(!handle.light_on());
        assert_eq!(
            handle.operations(),
            vec![Operation::Light(true), Operation::Light(false)]
        );
    }

    #[test]
    fn test_fault_is_one_shot() {
        let (_bank, handle) = MockBench::new(2);
        let mut display = MockDisplay(handle.state.clone());
        handle.fail_next(Device::Display);

        assert!(display.clear().is_err());
        assert!(display.clear().is_ok());
    }

    #[test]
    fn test_take_operations_drains_log() {
        let (mut bank, handle) = MockBench::new(2);
        bank.set_relay(true);

        assert_eq!(handle.take_operations(), vec![Operation::Relay(true)]);
        assert!(handle.operations().is_empty());
    }

    struct CountingDelay(Arc<Mutex<Duration>>);

    impl Delay for CountingDelay {
        fn sleep(&mut self, duration: Duration) {
            *self.0.lock().unwrap() += duration;
        }
    }

    #[test]
    fn test_with_delay_forwards_sleeps() {
        let slept = Arc::new(Mutex::new(Duration::ZERO));
        let (mut bank, handle) =
            MockBench::with_delay(2, Box::new(CountingDelay(slept.clone())));

        bank.sleep(Duration::from_millis(30));
        bank.sleep(Duration::from_millis(20));

        assert_eq!(*slept.lock().unwrap(), Duration::from_millis(50));
        assert_eq!(handle.total_sleep(), Duration::from_millis(50));
    }
}
