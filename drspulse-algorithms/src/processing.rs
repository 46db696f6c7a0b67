//! Two-pass analysis driver.
//!
//! Pass 1 ([`calibrate`]) decides the polarity, builds the mean pulse and
//! freezes peak index and baseline into a [`Calibration`]. Pass 2
//! ([`extract_metrics`]) measures every event against that calibration.

#![allow(clippy::cast_possible_truncation)]

use crate::{
    detect_polarity, estimate_baseline, locate_peak, AverageWaveformBuilder, PulseMetricsExtractor,
};
use drspulse_core::{
    AnalysisConfig, Binning, Calibration, Error, EventSource, Histogram1D, IntegrationWindow,
    MeanWaveform, PulseMetrics, Result,
};
use log::{info, warn};

/// Output of the first pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationStage {
    /// Frozen calibration for the second pass.
    pub calibration: Calibration,
    /// Mean aligned signal pulse.
    pub mean_waveform: MeanWaveform,
    /// Mean aligned trigger-reference waveform.
    pub reference_waveform: MeanWaveform,
    /// Number of events accumulated.
    pub events: usize,
}

/// Complete result of an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Frozen calibration.
    pub calibration: Calibration,
    /// Mean aligned signal pulse.
    pub mean_waveform: MeanWaveform,
    /// Mean aligned trigger-reference waveform.
    pub reference_waveform: MeanWaveform,
    /// Per-event metrics in source order.
    pub metrics: PulseMetrics,
    /// Pulse-height spectrum.
    pub height_histogram: Histogram1D,
    /// Pulse-integral spectrum.
    pub integral_histogram: Histogram1D,
}

impl AnalysisResult {
    /// Returns the truncated height of the mean pulse used for binning.
    #[must_use]
    pub fn mean_pulse(&self) -> i64 {
        mean_pulse(&self.calibration)
    }
}

fn mean_pulse(calibration: &Calibration) -> i64 {
    calibration.mean_pulse_height().trunc() as i64
}

/// Runs the first pass: polarity, mean waveform, peak and baseline.
///
/// # Errors
/// Returns an error if the configuration is invalid, the source is empty, an
/// event lacks the signal channel, or the baseline window is degenerate.
pub fn calibrate<S>(source: &S, config: &AnalysisConfig) -> Result<CalibrationStage>
where
    S: EventSource + ?Sized,
{
    config.validate()?;
    if source.is_empty() {
        return Err(Error::SourceExhausted);
    }

    let polarity = detect_polarity(source, config)?;

    let mut builder = AverageWaveformBuilder::new(config, polarity);
    for (index, event) in source.events().enumerate() {
        builder.accumulate(index, event)?;
    }
    let averages = builder.finish();
    if averages.events_without_shift > 0 {
        warn!(
            "{} of {} events had a non-finite extremum index and were not averaged",
            averages.events_without_shift, averages.events
        );
    }

    let peak_index = locate_peak(&averages.signal).ok_or_else(|| {
        Error::ConfigError("mean waveform has no finite sample to locate a peak".to_string())
    })?;
    info!("Signal peak is at sample: {peak_index}");

    let baseline = estimate_baseline(&averages.signal, peak_index, config.integration_half_width)?;
    let calibration = Calibration {
        polarity,
        baseline,
        peak_index,
        peak_value: averages.signal.mean(peak_index),
        window: IntegrationWindow::around(peak_index, config.integration_half_width),
    };
    info!("Baseline: {baseline:.3}");
    info!("mean pulse height: {}", mean_pulse(&calibration));

    Ok(CalibrationStage {
        calibration,
        mean_waveform: averages.signal,
        reference_waveform: averages.reference,
        events: averages.events,
    })
}

/// Runs the second pass with a frozen calibration.
///
/// # Errors
/// Returns an error if the source is empty or an event lacks the signal
/// channel.
pub fn extract_metrics<S>(
    source: &S,
    config: &AnalysisConfig,
    calibration: &Calibration,
) -> Result<PulseMetrics>
where
    S: EventSource + ?Sized,
{
    if source.is_empty() {
        return Err(Error::SourceExhausted);
    }
    let metrics = PulseMetricsExtractor::new(config, *calibration).extract(source)?;
    if metrics.warnings.is_clean() {
        info!("All {} events aligned inside the sample window", metrics.len());
    } else {
        warn!("{}", metrics.warnings);
    }
    Ok(metrics)
}

/// Fills the height and integral spectra with binning derived from the mean
/// pulse height.
#[must_use]
pub fn build_histograms(
    calibration: &Calibration,
    metrics: &PulseMetrics,
) -> (Histogram1D, Histogram1D) {
    let mean_pulse = mean_pulse(calibration);

    let mut heights = Histogram1D::new("PulseHeights", Binning::for_heights(mean_pulse));
    heights.fill_all(metrics.heights());

    let mut integrals = Histogram1D::new(
        "PulseIntegral",
        Binning::for_integrals(mean_pulse, calibration.window.width()),
    );
    integrals.fill_all(metrics.integrals());

    (heights, integrals)
}

/// Runs both passes and fills the output spectra.
///
/// # Errors
/// Returns any error of [`calibrate`] or [`extract_metrics`]; no partial
/// metrics are returned.
pub fn analyze<S>(source: &S, config: &AnalysisConfig) -> Result<AnalysisResult>
where
    S: EventSource + ?Sized,
{
    let stage = calibrate(source, config)?;
    let metrics = extract_metrics(source, config, &stage.calibration)?;
    let (height_histogram, integral_histogram) = build_histograms(&stage.calibration, &metrics);

    Ok(AnalysisResult {
        calibration: stage.calibration,
        mean_waveform: stage.mean_waveform,
        reference_waveform: stage.reference_waveform,
        metrics,
        height_histogram,
        integral_histogram,
    })
}
