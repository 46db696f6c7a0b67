//! Per-event pulse height and integral (second pass).

#![allow(clippy::cast_possible_wrap)]

use crate::AlignmentEngine;
use drspulse_core::{
    AnalysisConfig, Calibration, EventMetrics, EventSource, PulseMetrics, Result, WaveformEvent,
};
use log::debug;

/// Measures every event against a frozen [`Calibration`].
#[derive(Debug, Clone)]
pub struct PulseMetricsExtractor {
    engine: AlignmentEngine,
    calibration: Calibration,
    signal_channel: usize,
}

impl PulseMetricsExtractor {
    /// Creates an extractor.
    #[must_use]
    pub fn new(config: &AnalysisConfig, calibration: Calibration) -> Self {
        Self {
            engine: AlignmentEngine::from_config(config),
            calibration,
            signal_channel: config.signal_channel,
        }
    }

    /// Measures one event.
    ///
    /// The height is absent if the shifted peak index leaves the sample
    /// buffer. Integration terms outside the buffer contribute zero and are
    /// counted in [`EventMetrics::clipped_terms`].
    ///
    /// # Errors
    /// Returns an error if the event lacks the signal channel.
    pub fn measure(&self, event_index: usize, event: &WaveformEvent) -> Result<EventMetrics> {
        let samples = event.require_channel(self.signal_channel, event_index)?;
        let Calibration {
            polarity,
            baseline,
            peak_index,
            window,
            ..
        } = self.calibration;

        let Some(dt) = self.engine.shift(event) else {
            debug!("event {event_index}: no alignment shift, metrics undefined");
            return Ok(EventMetrics {
                event_index,
                shift: None,
                height: None,
                integral: 0.0,
                clipped_terms: window.width(),
            });
        };

        let height = self
            .engine
            .read(samples, peak_index as i64, dt)
            .map(|sample| polarity.apply(sample) - baseline);
        if height.is_none() {
            debug!("event {event_index}: peak index {peak_index} shifted by {dt} is out of range");
        }

        let mut integral = 0.0;
        let mut clipped_terms = 0;
        for n in window.range() {
            match self.engine.read(samples, n, dt) {
                Some(sample) => integral += polarity.apply(sample) - baseline,
                None => clipped_terms += 1,
            }
        }

        Ok(EventMetrics {
            event_index,
            shift: Some(dt),
            height,
            integral,
            clipped_terms,
        })
    }

    /// Measures every event of a source, in source order.
    ///
    /// # Errors
    /// Returns the first per-event error.
    pub fn extract<S>(&self, source: &S) -> Result<PulseMetrics>
    where
        S: EventSource + ?Sized,
    {
        let mut metrics = PulseMetrics::with_capacity(source.len());
        for (index, event) in source.events().enumerate() {
            metrics.push(self.measure(index, event)?);
        }
        Ok(metrics)
    }
}
