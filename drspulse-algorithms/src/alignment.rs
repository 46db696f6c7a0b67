//! Trigger-jitter alignment onto the canonical sample axis.
//!
//! Each event is shifted by `dt = floor(extremum_index) - trigger_setpoint`
//! so that canonical index `n` reads raw sample `n + dt`. Reads that leave
//! the axis are absent rather than clamped.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use drspulse_core::{AnalysisConfig, WaveformEvent};

/// Reads `samples[index]` if `index` lies on the axis `[0, axis_len)` and
/// inside the buffer.
///
/// This is the single bounds check shared by the averaging and the metrics
/// stages.
#[inline]
#[must_use]
pub fn read_sample(samples: &[f32], index: i64, axis_len: usize) -> Option<f32> {
    let index = usize::try_from(index).ok()?;
    if index >= axis_len {
        return None;
    }
    samples.get(index).copied()
}

/// Maps raw event samples onto the canonical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentEngine {
    trigger_setpoint: i64,
    length: usize,
}

impl AlignmentEngine {
    /// Creates an engine for the given set-point and axis length.
    #[must_use]
    pub fn new(trigger_setpoint: usize, length: usize) -> Self {
        Self {
            trigger_setpoint: trigger_setpoint as i64,
            length,
        }
    }

    /// Creates an engine from an analysis configuration.
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.trigger_setpoint, config.canonical_length)
    }

    /// Returns the shift of an event, `None` if its extremum index is not
    /// finite.
    #[must_use]
    pub fn shift(&self, event: &WaveformEvent) -> Option<i64> {
        let extremum = event.extremum_index;
        if !extremum.is_finite() {
            return None;
        }
        // Float-to-int casts saturate, so absurd indices just land far off-axis.
        Some((extremum.floor() as i64).saturating_sub(self.trigger_setpoint))
    }

    /// Reads the sample that canonical index `n` maps to under shift `dt`.
    #[inline]
    #[must_use]
    pub fn read(&self, samples: &[f32], n: i64, dt: i64) -> Option<f32> {
        read_sample(samples, n.checked_add(dt)?, self.length)
    }

    /// Iterates over `(n, sample)` for every canonical index that receives a
    /// sample under shift `dt`.
    pub fn align<'a>(&self, samples: &'a [f32], dt: i64) -> impl Iterator<Item = (usize, f32)> + 'a {
        let engine = *self;
        (0..self.length).filter_map(move |n| engine.read(samples, n as i64, dt).map(|v| (n, v)))
    }
}
