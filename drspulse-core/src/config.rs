//! Analysis configuration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default DRS channel carrying the analysed signal.
pub const DEFAULT_SIGNAL_CHANNEL: usize = 2;
/// DRS channel that records the trigger pulse.
pub const DEFAULT_REFERENCE_CHANNEL: usize = 8;
/// Nominal sample index of the trigger extremum.
pub const DEFAULT_TRIGGER_SETPOINT: usize = 820;
/// Samples per channel of a DRS4 record.
pub const DEFAULT_CANONICAL_LENGTH: usize = 1000;
/// Half-width of the charge-integration window (samples).
pub const DEFAULT_INTEGRATION_HALF_WIDTH: usize = 25;
/// Number of leading events overlaid to decide the signal polarity.
pub const DEFAULT_POLARITY_SAMPLE_EVENTS: usize = 200;

/// Configuration for one analysis run.
///
/// All values are fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Channel whose pulse is analysed.
    pub signal_channel: usize,
    /// Trigger-reference channel (diagnostic accumulator only).
    pub reference_channel: usize,
    /// Sample index the trigger extremum is aligned to.
    pub trigger_setpoint: usize,
    /// Length of the canonical sample axis.
    pub canonical_length: usize,
    /// Half-width of the integration window around the peak.
    pub integration_half_width: usize,
    /// Number of leading events used for polarity detection.
    pub polarity_sample_events: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            signal_channel: DEFAULT_SIGNAL_CHANNEL,
            reference_channel: DEFAULT_REFERENCE_CHANNEL,
            trigger_setpoint: DEFAULT_TRIGGER_SETPOINT,
            canonical_length: DEFAULT_CANONICAL_LENGTH,
            integration_half_width: DEFAULT_INTEGRATION_HALF_WIDTH,
            polarity_sample_events: DEFAULT_POLARITY_SAMPLE_EVENTS,
        }
    }
}

impl AnalysisConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal channel.
    #[must_use]
    pub fn with_signal_channel(mut self, channel: usize) -> Self {
        self.signal_channel = channel;
        self
    }

    /// Sets the trigger-reference channel.
    #[must_use]
    pub fn with_reference_channel(mut self, channel: usize) -> Self {
        self.reference_channel = channel;
        self
    }

    /// Sets the trigger set-point.
    #[must_use]
    pub fn with_trigger_setpoint(mut self, setpoint: usize) -> Self {
        self.trigger_setpoint = setpoint;
        self
    }

    /// Sets the canonical axis length.
    #[must_use]
    pub fn with_canonical_length(mut self, length: usize) -> Self {
        self.canonical_length = length;
        self
    }

    /// Sets the integration half-width.
    #[must_use]
    pub fn with_integration_half_width(mut self, half_width: usize) -> Self {
        self.integration_half_width = half_width;
        self
    }

    /// Sets the number of events overlaid for polarity detection.
    #[must_use]
    pub fn with_polarity_sample_events(mut self, events: usize) -> Self {
        self.polarity_sample_events = events;
        self
    }

    /// Checks the configuration for values that can never produce a result.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.canonical_length == 0 {
            return Err(Error::ConfigError(
                "canonical length must be positive".to_string(),
            ));
        }
        if self.integration_half_width == 0 {
            return Err(Error::ConfigError(
                "integration half-width must be positive".to_string(),
            ));
        }
        if self.integration_half_width >= self.trigger_setpoint {
            return Err(Error::ConfigError(format!(
                "integration half-width {} must be smaller than the trigger set-point {}",
                self.integration_half_width, self.trigger_setpoint
            )));
        }
        if self.polarity_sample_events == 0 {
            return Err(Error::ConfigError(
                "polarity detection needs at least one event".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.signal_channel, 2);
        assert_eq!(config.reference_channel, 8);
        assert_eq!(config.trigger_setpoint, 820);
        assert_eq!(config.canonical_length, 1000);
        assert_eq!(config.integration_half_width, 25);
        assert_eq!(config.polarity_sample_events, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::new()
            .with_signal_channel(4)
            .with_reference_channel(7)
            .with_trigger_setpoint(270)
            .with_canonical_length(1024)
            .with_integration_half_width(10)
            .with_polarity_sample_events(50);

        assert_eq!(config.signal_channel, 4);
        assert_eq!(config.reference_channel, 7);
        assert_eq!(config.trigger_setpoint, 270);
        assert_eq!(config.canonical_length, 1024);
        assert_eq!(config.integration_half_width, 10);
        assert_eq!(config.polarity_sample_events, 50);
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = AnalysisConfig::new()
            .with_canonical_length(0)
            .validate()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_half_width_must_be_below_setpoint() {
        let config = AnalysisConfig::new()
            .with_trigger_setpoint(5)
            .with_canonical_length(10);
        assert!(config.validate().unwrap_err().is_configuration());
        assert!(config.with_integration_half_width(4).validate().is_ok());
    }

    #[test]
    fn test_zero_half_width_and_polarity_events_rejected() {
        assert!(AnalysisConfig::new()
            .with_integration_half_width(0)
            .validate()
            .is_err());
        assert!(AnalysisConfig::new()
            .with_polarity_sample_events(0)
            .validate()
            .is_err());
    }
}
