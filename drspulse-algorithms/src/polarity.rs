//! Pulse polarity detection from an unaligned overlay of leading events.

#![allow(clippy::cast_precision_loss)]

use drspulse_core::{AnalysisConfig, EventSource, Polarity, Result};
use log::info;

/// Summary of every sample in an overlay of raw waveforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStats {
    /// Number of samples in the overlay.
    pub samples: usize,
    /// Mean amplitude.
    pub mean: f64,
    /// Smallest amplitude.
    pub min: f64,
    /// Largest amplitude.
    pub max: f64,
}

impl OverlayStats {
    /// Computes the overlay statistics of a set of sample buffers.
    ///
    /// Non-finite samples are skipped. Returns `None` if no finite sample
    /// remains.
    pub fn from_buffers<'a, I>(buffers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut samples = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in buffers.into_iter().flatten().copied().map(f64::from) {
            if !value.is_finite() {
                continue;
            }
            samples += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (samples > 0).then(|| Self {
            samples,
            mean: sum / samples as f64,
            min,
            max,
        })
    }

    /// Decides the polarity of the overlay.
    ///
    /// The pulse is negative-going when the maximum sits closer to the mean
    /// than the minimum does. Equal distances resolve to positive.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        if (self.max - self.mean).abs() < (self.mean - self.min).abs() {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }
}

/// Detects the signal polarity from the first
/// `config.polarity_sample_events` events of the signal channel.
///
/// An overlay without any finite sample resolves to [`Polarity::Positive`].
///
/// # Errors
/// Returns an error if one of the sampled events lacks the signal channel.
pub fn detect_polarity<S>(source: &S, config: &AnalysisConfig) -> Result<Polarity>
where
    S: EventSource + ?Sized,
{
    let buffers = source
        .events()
        .take(config.polarity_sample_events)
        .enumerate()
        .map(|(index, event)| event.require_channel(config.signal_channel, index))
        .collect::<Result<Vec<_>>>()?;

    let polarity = OverlayStats::from_buffers(buffers).map_or(Polarity::Positive, |stats| {
        info!(
            "Polarity overlay: {} samples, mean {:.2}, min {:.2}, max {:.2}",
            stats.samples, stats.mean, stats.min, stats.max
        );
        stats.polarity()
    });
    info!("Signal polarity = {polarity}");
    Ok(polarity)
}
