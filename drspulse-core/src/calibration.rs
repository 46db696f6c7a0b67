//! Frozen results of the first analysis pass.

#![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

use std::fmt;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sign of the analysed pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Polarity {
    /// Pulses rise above the baseline.
    #[default]
    Positive,
    /// Pulses fall below the baseline.
    Negative,
}

impl Polarity {
    /// Returns the multiplier that turns the pulse positive-going.
    #[inline]
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }

    /// Applies the polarity correction to a raw sample.
    #[inline]
    #[must_use]
    pub fn apply(self, sample: f32) -> f64 {
        self.sign() * f64::from(sample)
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "+1"),
            Polarity::Negative => write!(f, "-1"),
        }
    }
}

/// Half-open window `[start, stop)` on the canonical axis.
///
/// Bounds are signed because a window centred close to the start of the axis
/// may begin before index zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrationWindow {
    /// First index in the window.
    pub start: i64,
    /// One past the last index in the window.
    pub stop: i64,
}

impl IntegrationWindow {
    /// Creates the window `[peak - half_width, peak + half_width)`.
    #[must_use]
    pub fn around(peak_index: usize, half_width: usize) -> Self {
        let peak = peak_index as i64;
        let half = half_width as i64;
        Self {
            start: peak - half,
            stop: peak + half,
        }
    }

    /// Returns the number of indices in the window.
    #[must_use]
    pub fn width(&self) -> usize {
        usize::try_from(self.stop - self.start).unwrap_or(0)
    }

    /// Returns the window as an index range.
    #[must_use]
    pub fn range(&self) -> Range<i64> {
        self.start..self.stop
    }
}

/// Calibration established by the first pass and used read-only by the
/// second.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// Signal polarity.
    pub polarity: Polarity,
    /// Flat pre-pulse level of the mean waveform.
    pub baseline: f64,
    /// Canonical index of the mean-waveform maximum.
    pub peak_index: usize,
    /// Value of the mean waveform at the peak.
    pub peak_value: f64,
    /// Charge-integration window around the peak.
    pub window: IntegrationWindow,
}

impl Calibration {
    /// Returns the baseline-subtracted height of the mean pulse.
    #[must_use]
    pub fn mean_pulse_height(&self) -> f64 {
        self.peak_value - self.baseline
    }
}
