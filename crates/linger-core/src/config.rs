use web_time::Duration;

use crate::error::ConfigError;

/// Exit delay used when none is given: long enough for a default tween.
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_millis(300);

/// How a [`DelayUnmount`](crate::DelayUnmount) is set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DelayUnmountConfig {
    /// How long `mounted` stays true after visibility is withdrawn.
    pub delay: Duration,
    pub initially_mounted: bool,
    pub initially_requested: bool,
}

impl Default for DelayUnmountConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_EXIT_DELAY,
            initially_mounted: false,
            initially_requested: false,
        }
    }
}

impl DelayUnmountConfig {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Builds a config from a float millisecond count, the way host timers
    /// take it: negative values clamp to zero; NaN and infinities are rejected.
    pub fn from_millis_f64(millis: f64) -> Result<Self, ConfigError> {
        if millis.is_nan() {
            return Err(ConfigError::InvalidDelay { millis });
        }
        let delay = Duration::try_from_secs_f64(millis.max(0.0) / 1000.0)
            .map_err(|_| ConfigError::InvalidDelay { millis })?;
        Ok(Self::new(delay))
    }

    pub fn fast() -> Self {
        Self::from_millis(150)
    }

    pub fn slow() -> Self {
        Self::from_millis(600)
    }

    /// Starts both flags as visible.
    pub fn shown(self) -> Self {
        Self {
            initially_mounted: true,
            initially_requested: true,
            ..self
        }
    }

    pub fn initially_mounted(self, mounted: bool) -> Self {
        Self {
            initially_mounted: mounted,
            ..self
        }
    }

    pub fn initially_requested(self, requested: bool) -> Self {
        Self {
            initially_requested: requested,
            ..self
        }
    }
}
