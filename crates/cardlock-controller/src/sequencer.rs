//! Timed feedback sequences.
//!
//! Each [`Decision`] maps to a fixed list of primitive [`Step`]s: beeps,
//! display text, relay and light changes, strip colours and sleeps. The list
//! is built by [`FeedbackSequencer::plan`] and played by
//! [`FeedbackSequencer::run`], so a sequence can be inspected without being
//! played.
//!
//! # Sequences
//!
//! | Decision        | Sequence                                                                 |
//! |-----------------|--------------------------------------------------------------------------|
//! | `Granted`       | short beep, text, relay on, green, 1 s, light blink x1, 2 s countdown     |
//! | `SecretGranted` | short beep, text, relay on, green, 1 s, green blink, light blink x4, 3 s countdown |
//! | `ToggleLights`  | long beep, text, light toggle, blue blink, 1 s, red                       |
//! | `Denied`        | long beep, text, red blink                                                |
//!
//! Every sequence then releases the relay and puts the idle prompt back on the
//! display. The strip always ends red.

use std::fmt;
use std::time::Duration;

use cardlock_core::constants::{
    BEEP_GAP_MS, BLINK_CYCLES, BLINK_PHASE_MS, GRANTED_COUNTDOWN_MS, GRANTED_LIGHT_BLINKS,
    IDLE_PROMPT, LED_COUNT, LIGHT_BLINK_MS, LONG_BEEP_MS, MSG_ACCESS_DENIED,
    MSG_ACCESS_GRANTED, MSG_LIGHTING_SWITCHED, MSG_SECRET_ACCESS, SECRET_COUNTDOWN_MS,
    SECRET_LIGHT_BLINKS, SETTLE_MS, SHORT_BEEP_COUNT, SHORT_BEEP_MS,
};
use cardlock_core::{Color, Decision};
use cardlock_hardware::ActuatorBank;
use tracing::debug;

/// One primitive actuator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Start the buzzer.
    ToneOn,
    /// Silence the buzzer.
    ToneOff,
    /// Block for the given time.
    Sleep(Duration),
    /// Clear the display and write the text.
    Show(String),
    /// Drive the lock relay.
    Relay(bool),
    /// Invert the auxiliary light.
    ToggleLight,
    /// Fill the whole strip and show it.
    Fill(Color),
    /// Set one pixel and show the strip.
    SetPixel(usize, Color),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::ToneOn => write!(f, "tone on"),
            Step::ToneOff => write!(f, "tone off"),
            Step::Sleep(d) => write!(f, "sleep {}ms", d.as_millis()),
            Step::Show(text) => write!(f, "show {text:?}"),
            Step::Relay(on) => write!(f, "relay {}", if *on { "on" } else { "off" }),
            Step::ToggleLight => write!(f, "light toggle"),
            Step::Fill(c) => write!(f, "fill {:?}", c.as_rgb()),
            Step::SetPixel(i, c) => write!(f, "pixel {i} {:?}", c.as_rgb()),
        }
    }
}

/// Builds and plays the feedback sequence of each decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSequencer {
    idle_prompt: String,
    pixel_count: usize,
}

impl Default for FeedbackSequencer {
    fn default() -> Self {
        Self::new(IDLE_PROMPT, LED_COUNT)
    }
}

impl FeedbackSequencer {
    /// Create a sequencer for a strip of `pixel_count` pixels.
    pub fn new(idle_prompt: impl Into<String>, pixel_count: usize) -> Self {
        Self {
            idle_prompt: idle_prompt.into(),
            pixel_count,
        }
    }

    pub fn idle_prompt(&self) -> &str {
        &self.idle_prompt
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// The ordered steps for `decision`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use cardlock_core::Decision;
    /// use cardlock_controller::{FeedbackSequencer, Step};
    ///
    /// let sequencer = FeedbackSequencer::default();
    /// let plan = sequencer.plan(Decision::Denied);
    ///
    /// assert_eq!(plan[0], Step::ToneOn);
    /// assert_eq!(plan[1], Step::Sleep(Duration::from_millis(1000)));
    /// assert_eq!(plan.last(), Some(&Step::Show("Please identify".to_string())));
    /// ```
    pub fn plan(&self, decision: Decision) -> Vec<Step> {
        let mut steps = Vec::new();

        match decision {
            Decision::Granted => {
                short_beep(&mut steps);
                steps.push(Step::Show(MSG_ACCESS_GRANTED.to_string()));
                steps.push(Step::Relay(true));
                steps.push(Step::Fill(Color::GREEN));
                steps.push(Step::Sleep(ms(SETTLE_MS)));
                light_blink(&mut steps, ms(LIGHT_BLINK_MS), GRANTED_LIGHT_BLINKS);
                self.countdown(&mut steps, ms(GRANTED_COUNTDOWN_MS));
            }
            Decision::SecretGranted => {
                short_beep(&mut steps);
                steps.push(Step::Show(MSG_SECRET_ACCESS.to_string()));
                steps.push(Step::Relay(true));
                steps.push(Step::Fill(Color::GREEN));
                steps.push(Step::Sleep(ms(SETTLE_MS)));
                blink(&mut steps, Color::GREEN);
                light_blink(&mut steps, ms(LIGHT_BLINK_MS), SECRET_LIGHT_BLINKS);
                self.countdown(&mut steps, ms(SECRET_COUNTDOWN_MS));
            }
            // Same long beep as a denial.
            Decision::ToggleLights => {
                long_beep(&mut steps);
                steps.push(Step::Show(MSG_LIGHTING_SWITCHED.to_string()));
                steps.push(Step::ToggleLight);
                blink(&mut steps, Color::BLUE);
                steps.push(Step::Sleep(ms(SETTLE_MS)));
                steps.push(Step::Fill(Color::RED));
            }
            Decision::Denied => {
                long_beep(&mut steps);
                steps.push(Step::Show(MSG_ACCESS_DENIED.to_string()));
                blink(&mut steps, Color::RED);
            }
        }

        steps.push(Step::Relay(false));
        steps.push(Step::Show(self.idle_prompt.clone()));
        steps
    }

    /// Play the sequence of `decision` on `bank`. Blocks for
    /// [`duration`](Self::duration).
    pub fn run(&self, decision: Decision, bank: &mut ActuatorBank) {
        debug!(%decision, "feedback sequence start");
        for step in self.plan(decision) {
            apply(&step, bank);
        }
        debug!(%decision, "feedback sequence done");
    }

    /// Total time spent sleeping by the sequence of `decision`.
    pub fn duration(&self, decision: Decision) -> Duration {
        self.plan(decision)
            .iter()
            .filter_map(|step| match step {
                Step::Sleep(d) => Some(*d),
                _ => None,
            })
            .sum()
    }

    /// Light the strip red pixel by pixel over `total`.
    ///
    /// Per-pixel sleeps are rounded so that they add up to exactly `total`.
    fn countdown(&self, steps: &mut Vec<Step>, total: Duration) {
        let n = match u32::try_from(self.pixel_count) {
            Ok(0) | Err(_) => {
                steps.push(Step::Sleep(total));
                return;
            }
            Ok(n) => n,
        };

        let mut elapsed = Duration::ZERO;
        for i in 0..n {
            let until = total * (i + 1) / n;
            steps.push(Step::SetPixel(i as usize, Color::RED));
            steps.push(Step::Sleep(until - elapsed));
            elapsed = until;
        }
    }
}

fn apply(step: &Step, bank: &mut ActuatorBank) {
    match step {
        Step::ToneOn => bank.tone_on(),
        Step::ToneOff => bank.tone_off(),
        Step::Sleep(d) => bank.sleep(*d),
        Step::Show(text) => bank.show_text(text),
        Step::Relay(on) => bank.set_relay(*on),
        Step::ToggleLight => bank.toggle_light(),
        Step::Fill(color) => bank.fill(*color),
        Step::SetPixel(index, color) => bank.set_pixel(*index, *color),
    }
}

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn short_beep(steps: &mut Vec<Step>) {
    for _ in 0..SHORT_BEEP_COUNT {
        steps.push(Step::ToneOn);
        steps.push(Step::Sleep(ms(SHORT_BEEP_MS)));
        steps.push(Step::ToneOff);
        steps.push(Step::Sleep(ms(BEEP_GAP_MS)));
    }
}

fn long_beep(steps: &mut Vec<Step>) {
    steps.push(Step::ToneOn);
    steps.push(Step::Sleep(ms(LONG_BEEP_MS)));
    steps.push(Step::ToneOff);
    steps.push(Step::Sleep(ms(BEEP_GAP_MS)));
}

fn blink(steps: &mut Vec<Step>, color: Color) {
    for _ in 0..BLINK_CYCLES {
        steps.push(Step::Fill(Color::BLACK));
        steps.push(Step::Sleep(ms(BLINK_PHASE_MS)));
        steps.push(Step::Fill(color));
        steps.push(Step::Sleep(ms(BLINK_PHASE_MS)));
    }
}

fn light_blink(steps: &mut Vec<Step>, speed: Duration, count: usize) {
    for _ in 0..count {
        steps.push(Step::ToggleLight);
        steps.push(Step::Sleep(speed));
        steps.push(Step::ToggleLight);
        steps.push(Step::Sleep(speed));
    }
}
