//! Flat baseline fit in front of the mean pulse.

#![allow(clippy::cast_precision_loss)]

use drspulse_core::{Error, MeanWaveform, Result};
use std::ops::Range;

/// Least-squares fit of a constant to `waveform` over `range`.
///
/// Each index is weighted by its contribution count, so the result is the
/// count-weighted mean of the filled indices. Returns `None` when the range
/// holds no filled index.
#[must_use]
pub fn fit_constant(waveform: &MeanWaveform, range: Range<usize>) -> Option<f64> {
    let mut level = 0.0;
    let mut total_weight = 0.0;
    for index in range {
        let weight = waveform.count(index) as f64;
        if weight == 0.0 {
            continue;
        }
        total_weight += weight;
        level += weight / total_weight * (waveform.mean(index) - level);
    }
    (total_weight > 0.0).then_some(level)
}

/// Fits the baseline over `[0, peak_index - half_width)`.
///
/// # Errors
/// Returns [`Error::DegenerateBaselineWindow`] if the window is empty or
/// contains no filled index.
pub fn estimate_baseline(
    waveform: &MeanWaveform,
    peak_index: usize,
    half_width: usize,
) -> Result<f64> {
    let degenerate = Error::DegenerateBaselineWindow {
        peak_index,
        half_width,
    };
    match peak_index.checked_sub(half_width) {
        Some(end) if end > 0 => fit_constant(waveform, 0..end).ok_or(degenerate),
        _ => Err(degenerate),
    }
}
