//! Mean pulse shape accumulation (first pass).

use crate::AlignmentEngine;
use drspulse_core::{AnalysisConfig, MeanWaveform, Polarity, Result, WaveformEvent};
use log::debug;

/// Accumulates aligned, polarity-corrected samples into a [`MeanWaveform`].
///
/// A second accumulator collects the aligned trigger-reference channel
/// without polarity correction. It is diagnostic output only.
#[derive(Debug, Clone)]
pub struct AverageWaveformBuilder {
    engine: AlignmentEngine,
    polarity: Polarity,
    signal_channel: usize,
    reference_channel: usize,
    signal: MeanWaveform,
    reference: MeanWaveform,
    events: usize,
    events_without_shift: usize,
    events_without_reference: usize,
}

/// Output of the first pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageWaveforms {
    /// Mean aligned signal pulse.
    pub signal: MeanWaveform,
    /// Mean aligned trigger-reference waveform.
    pub reference: MeanWaveform,
    /// Number of accumulated events.
    pub events: usize,
    /// Events skipped because their extremum index was not finite.
    pub events_without_shift: usize,
    /// Events that did not carry the reference channel.
    pub events_without_reference: usize,
}

impl AverageWaveformBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(config: &AnalysisConfig, polarity: Polarity) -> Self {
        Self {
            engine: AlignmentEngine::from_config(config),
            polarity,
            signal_channel: config.signal_channel,
            reference_channel: config.reference_channel,
            signal: MeanWaveform::new(config.canonical_length),
            reference: MeanWaveform::new(config.canonical_length),
            events: 0,
            events_without_shift: 0,
            events_without_reference: 0,
        }
    }

    /// Adds one event. Returns the number of signal samples it contributed.
    ///
    /// # Errors
    /// Returns an error if the event lacks the signal channel.
    pub fn accumulate(&mut self, event_index: usize, event: &WaveformEvent) -> Result<usize> {
        let signal = event.require_channel(self.signal_channel, event_index)?;
        self.events += 1;

        let Some(dt) = self.engine.shift(event) else {
            debug!(
                "event {event_index}: extremum index {} is not finite, skipped",
                event.extremum_index
            );
            self.events_without_shift += 1;
            return Ok(0);
        };

        let mut contributed = 0;
        for (n, sample) in self.engine.align(signal, dt) {
            if self.signal.update(n, self.polarity.apply(sample)) {
                contributed += 1;
            }
        }

        match event.channel(self.reference_channel) {
            Some(reference) => {
                for (n, sample) in self.engine.align(reference, dt) {
                    self.reference.update(n, f64::from(sample));
                }
            }
            None => self.events_without_reference += 1,
        }

        Ok(contributed)
    }

    /// Finishes accumulation.
    #[must_use]
    pub fn finish(self) -> AverageWaveforms {
        AverageWaveforms {
            signal: self.signal,
            reference: self.reference,
            events: self.events,
            events_without_shift: self.events_without_shift,
            events_without_reference: self.events_without_reference,
        }
    }
}
