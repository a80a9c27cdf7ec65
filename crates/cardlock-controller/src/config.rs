//! Controller configuration.
//!
//! Every field has a default equal to the compiled-in constant, so an empty
//! JSON object (or no configuration file at all) gives the stock controller.
//! The sequence texts and timings are not configurable.
//!
//! ```json
//! {
//!   "poll_interval_ms": 50,
//!   "idle_prompt": "Please identify",
//!   "led_count": 12,
//!   "allow_list": [
//!     { "card": "[0x93, 0x13, 0xF9, 0x02]", "decision": "granted" }
//!   ]
//! }
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use cardlock_core::constants::{
    BUZZER_DUTY, BUZZER_FREQUENCY_HZ, IDLE_PROMPT, LED_COUNT, POLL_INTERVAL_MS,
};
use cardlock_core::{Error, Result};
use cardlock_hardware::Tone;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::policy::{AccessPolicy, AllowListEntry, BUILTIN_ALLOW_LIST};

/// Environment variable holding the path of the JSON configuration file.
pub const ENV_VAR: &str = "CARDLOCK_CONFIG";

/// Runtime configuration of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Delay at the end of every loop iteration, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Text shown while waiting for a card.
    #[serde(default = "default_idle_prompt")]
    pub idle_prompt: String,

    /// Number of pixels on the LED strip. The control loop refuses to build
    /// when the actuator bank's strip has a different length.
    #[serde(default = "default_led_count")]
    pub led_count: usize,

    #[serde(default = "default_buzzer_frequency_hz")]
    pub buzzer_frequency_hz: u32,

    /// PWM duty cycle on a 16-bit scale.
    #[serde(default = "default_buzzer_duty")]
    pub buzzer_duty: u16,

    /// Recognized cards. Anything else is denied.
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<AllowListEntry>,
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}

fn default_idle_prompt() -> String {
    IDLE_PROMPT.to_string()
}

fn default_led_count() -> usize {
    LED_COUNT
}

fn default_buzzer_frequency_hz() -> u32 {
    BUZZER_FREQUENCY_HZ
}

fn default_buzzer_duty() -> u16 {
    BUZZER_DUTY
}

fn default_allow_list() -> Vec<AllowListEntry> {
    BUILTIN_ALLOW_LIST.to_vec()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            idle_prompt: default_idle_prompt(),
            led_count: default_led_count(),
            buzzer_frequency_hz: default_buzzer_frequency_hz(),
            buzzer_duty: default_buzzer_duty(),
            allow_list: default_allow_list(),
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for malformed JSON, an unknown field or an
    /// unparseable card identifier, and the errors of
    /// [`validate`](Self::validate) otherwise.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, and `Error::Config`
    /// (prefixed with the path) if its contents are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load the file named by `CARDLOCK_CONFIG`, or the defaults when the
    /// variable is not set.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn from_env() -> Result<Self> {
        Self::resolve(std::env::var_os(ENV_VAR))
    }

    /// [`from_env`](Self::from_env) with the variable's value passed in.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingConfig` if the variable is set but empty, and
    /// the errors of [`load`](Self::load) otherwise.
    pub fn resolve(value: Option<OsString>) -> Result<Self> {
        match value {
            None => {
                info!("{ENV_VAR} not set, using built-in configuration");
                Ok(Self::default())
            }
            Some(path) if path.is_empty() => Err(Error::MissingConfig(ENV_VAR.to_string())),
            Some(path) => {
                let path = Path::new(&path);
                info!(path = %path.display(), "loading configuration");
                Self::load(path)
            }
        }
    }

    /// Check value ranges and the allow-list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero poll interval, LED count or buzzer
    /// frequency, and the errors of [`AccessPolicy::new`] for a bad
    /// allow-list.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be > 0".into()));
        }
        if self.led_count == 0 {
            return Err(Error::Config("led_count must be >= 1".into()));
        }
        if self.buzzer_frequency_hz == 0 {
            return Err(Error::Config("buzzer_frequency_hz must be > 0".into()));
        }
        self.policy().map(|_| ())
    }

    /// The allow-list as a validated policy.
    ///
    /// # Errors
    ///
    /// See [`AccessPolicy::new`].
    pub fn policy(&self) -> Result<AccessPolicy> {
        AccessPolicy::new(self.allow_list.iter().copied())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn tone(&self) -> Tone {
        Tone {
            frequency_hz: self.buzzer_frequency_hz,
            duty: self.buzzer_duty,
        }
    }
}
