//! The polling loop.
//!
//! # Phases
//!
//! - `Idle`: startup. Relay released, idle prompt shown, strip red.
//! - `Polling`: waiting for the next poll result.
//! - `Ignoring`: the card already processed is still in the field.
//! - `Processing`: a new card is being decided and its sequence played.
//!
//! # Valid Transitions
//!
//! - Idle → Polling
//! - Polling → Polling | Ignoring | Processing
//! - Ignoring → Polling
//! - Processing → Polling
//!
//! Every iteration ends with the poll interval delay, whatever happened in it.
//! A feedback sequence blocks the loop for its whole duration.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use cardlock_core::constants::{IDLE_PROMPT, MAX_HISTORY_SIZE, POLL_INTERVAL_MS};
use cardlock_core::{CardId, Color, Decision, Error, PollResult, Result};
use cardlock_hardware::{ActuatorBank, CardReader, ReaderInfo, Tone};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::ControllerConfig;
use crate::debounce::{Action, DebounceGate};
use crate::policy::AccessPolicy;
use crate::sequencer::FeedbackSequencer;

/// Phase of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Idle,
    Polling,
    Ignoring,
    Processing,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            LoopPhase::Idle => "Idle",
            LoopPhase::Polling => "Polling",
            LoopPhase::Ignoring => "Ignoring",
            LoopPhase::Processing => "Processing",
        };
        write!(f, "{phase}")
    }
}

impl LoopPhase {
    /// Check if moving to `target` is allowed from this phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardlock_controller::LoopPhase;
    ///
    /// assert!(LoopPhase::Idle.can_transition_to(&LoopPhase::Polling));
    /// assert!(!LoopPhase::Idle.can_transition_to(&LoopPhase::Processing));
    /// ```
    pub fn can_transition_to(&self, target: &LoopPhase) -> bool {
        matches!(
            (self, target),
            (LoopPhase::Idle, LoopPhase::Polling)
                | (
                    LoopPhase::Polling,
                    LoopPhase::Polling | LoopPhase::Ignoring | LoopPhase::Processing
                )
                | (LoopPhase::Ignoring, LoopPhase::Polling)
                | (LoopPhase::Processing, LoopPhase::Polling)
        )
    }
}

/// Report of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// What the reader returned.
    pub poll: PollResult,
    /// What the debounce gate made of it.
    pub action: Action,
    /// The decision, when a card was processed.
    pub decision: Option<Decision>,
}

/// A processed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessEvent {
    pub card: CardId,
    pub decision: Decision,
    /// When the card was decided (before its sequence played).
    pub at: DateTime<Utc>,
}

/// The card-lock control loop.
///
/// Owns the reader, the actuators and the only piece of mutable state the
/// controller has: the card processed last, kept while it stays in the field.
pub struct ControlLoop {
    reader: Box<dyn CardReader>,
    bank: ActuatorBank,
    policy: AccessPolicy,
    sequencer: FeedbackSequencer,
    poll_interval: Duration,

    previous_card: Option<CardId>,
    phase: LoopPhase,

    /// Processed cards, oldest first (limited to MAX_HISTORY_SIZE).
    history: VecDeque<AccessEvent>,
}

impl ControlLoop {
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::default()
    }

    /// Put the hardware in its idle state: relay released, idle prompt on
    /// the display, strip red.
    ///
    /// Called by the first [`step`](Self::step) if not called before.
    pub fn start(&mut self) {
        let info = self.reader.reader_info();
        info!(
            reader = %info.name,
            pixels = self.bank.pixel_count(),
            cards = self.policy.len(),
            "controller starting"
        );

        self.previous_card = None;
        self.bank.set_relay(false);
        self.bank.show_text(self.sequencer.idle_prompt());
        self.bank.fill(Color::RED);
        self.transition(LoopPhase::Polling);
    }

    /// Run one iteration: poll, debounce, act, then wait the poll interval.
    pub fn step(&mut self) -> Cycle {
        if self.phase == LoopPhase::Idle {
            self.start();
        }

        let poll = self.reader.poll();
        trace!(%poll, "poll");

        let action = DebounceGate::admit(poll, self.previous_card);
        let mut decision = None;

        match action {
            Action::ClearPrevious => {
                if let Some(card) = self.previous_card.take() {
                    debug!(%card, "card left the field");
                }
                self.transition(LoopPhase::Polling);
            }
            Action::Ignore => {
                self.transition(LoopPhase::Ignoring);
                debug!(card = ?self.previous_card, "card still in field, ignoring");
                self.transition(LoopPhase::Polling);
            }
            Action::Process(card) => {
                self.transition(LoopPhase::Processing);
                let decided = self.process(card);
                decision = Some(decided);
                self.transition(LoopPhase::Polling);
            }
        }

        self.bank.sleep(self.poll_interval);

        Cycle {
            poll,
            action,
            decision,
        }
    }

    /// Iterate until `stop` returns `true`. `stop` is checked before every
    /// iteration, never during a feedback sequence.
    ///
    /// Returns the number of iterations run.
    pub fn run_until(&mut self, mut stop: impl FnMut() -> bool) -> usize {
        let mut iterations = 0;
        while !stop() {
            self.step();
            iterations += 1;
        }
        info!(iterations, "control loop stopped");
        iterations
    }

    /// Iterate forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    fn process(&mut self, card: CardId) -> Decision {
        let decision = self.policy.decide(card);

        match decision {
            Decision::Denied => warn!(%card, "access denied"),
            _ => info!(%card, %decision, "card recognized"),
        }

        self.record(card, decision);
        self.sequencer.run(decision, &mut self.bank);
        self.previous_card = Some(card);
        decision
    }

    fn record(&mut self, card: CardId, decision: Decision) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(AccessEvent {
            card,
            decision,
            at: Utc::now(),
        });
    }

    fn transition(&mut self, next: LoopPhase) {
        if !self.phase.can_transition_to(&next) {
            warn!(from = %self.phase, to = %next, "unexpected phase transition");
        }
        self.phase = next;
    }

    /// The card processed last, while it stays in the field.
    pub fn previous_card(&self) -> Option<CardId> {
        self.previous_card
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Processed cards, oldest first.
    pub fn history(&self) -> &VecDeque<AccessEvent> {
        &self.history
    }

    /// The last `count` processed cards, oldest first.
    pub fn last_events(&self, count: usize) -> Vec<AccessEvent> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn sequencer(&self) -> &FeedbackSequencer {
        &self.sequencer
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn reader_info(&self) -> ReaderInfo {
        self.reader.reader_info()
    }
}

impl fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("phase", &self.phase)
            .field("previous_card", &self.previous_card)
            .field("policy", &self.policy)
            .field("poll_interval", &self.poll_interval)
            .field("bank", &self.bank)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ControlLoop`].
///
/// The reader and the actuators are required. Everything else defaults to
/// the compiled-in values.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cardlock_controller::{ControlLoop, ControllerConfig};
/// use cardlock_hardware::mock::{MockBench, MockCardReader};
///
/// let config = ControllerConfig {
///     poll_interval_ms: 20,
///     ..Default::default()
/// };
/// let (reader, _reader_handle) = MockCardReader::new();
/// let (bank, _bench) = MockBench::new(config.led_count);
///
/// let controller = ControlLoop::builder()
///     .config(&config)
///     .unwrap()
///     .reader(Box::new(reader))
///     .actuators(bank)
///     .build()
///     .unwrap();
///
/// assert_eq!(controller.poll_interval(), Duration::from_millis(20));
/// ```
#[derive(Default)]
pub struct ControlLoopBuilder {
    reader: Option<Box<dyn CardReader>>,
    bank: Option<ActuatorBank>,
    policy: Option<AccessPolicy>,
    idle_prompt: Option<String>,
    poll_interval: Option<Duration>,
    tone: Option<Tone>,
    led_count: Option<usize>,
}

impl ControlLoopBuilder {
    pub fn reader(mut self, reader: Box<dyn CardReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn actuators(mut self, bank: ActuatorBank) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn idle_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.idle_prompt = Some(prompt.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    /// Take policy, idle prompt, poll interval and tone from `config`.
    ///
    /// The configured LED count is checked against the actuator bank's strip
    /// in [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is invalid.
    pub fn config(self, config: &ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(self
            .policy(config.policy()?)
            .idle_prompt(config.idle_prompt.clone())
            .poll_interval(config.poll_interval())
            .tone(config.tone())
            .expect_led_count(config.led_count))
    }

    fn expect_led_count(mut self, led_count: usize) -> Self {
        self.led_count = Some(led_count);
        self
    }

    /// Assemble the loop. It starts in the `Idle` phase.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the reader or the actuators are missing, if
    /// the poll interval is zero, or if the strip length differs from the
    /// configured LED count.
    pub fn build(self) -> Result<ControlLoop> {
        let reader = self
            .reader
            .ok_or_else(|| Error::Config("card reader not set".into()))?;
        let mut bank = self
            .bank
            .ok_or_else(|| Error::Config("actuators not set".into()))?;

        let poll_interval = self
            .poll_interval
            .unwrap_or(Duration::from_millis(POLL_INTERVAL_MS));
        if poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be > 0".into()));
        }

        if let Some(expected) = self.led_count
            && expected != bank.pixel_count()
        {
            return Err(Error::Config(format!(
                "led_count is {expected} but the strip has {} pixels",
                bank.pixel_count()
            )));
        }

        if let Some(tone) = self.tone {
            bank = bank.with_tone(tone);
        }

        let sequencer = FeedbackSequencer::new(
            self.idle_prompt.unwrap_or_else(|| IDLE_PROMPT.to_string()),
            bank.pixel_count(),
        );

        Ok(ControlLoop {
            reader,
            bank,
            policy: self.policy.unwrap_or_default(),
            sequencer,
            poll_interval,
            previous_card: None,
            phase: LoopPhase::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        })
    }
}
