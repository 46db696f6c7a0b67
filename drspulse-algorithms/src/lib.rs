//! drspulse-algorithms: Waveform alignment and pulse-metrics extraction.
//!
//! This crate implements the two-pass pulse analysis:
//! - **Polarity** - decided from an unaligned overlay of leading events
//! - **Alignment** - per-event trigger-jitter shift onto a canonical axis
//! - **Mean pulse** - running average of aligned, polarity-corrected samples
//! - **Baseline / peak** - flat pre-pulse fit and maximum of the mean pulse
//! - **Metrics** - per-event height and windowed integral
//!
#![warn(missing_docs)]

mod alignment;
mod average;
mod baseline;
mod metrics;
mod peak;
mod polarity;
mod processing;

pub use alignment::{read_sample, AlignmentEngine};
pub use average::{AverageWaveformBuilder, AverageWaveforms};
pub use baseline::{estimate_baseline, fit_constant};
pub use metrics::PulseMetricsExtractor;
pub use peak::locate_peak;
pub use polarity::{detect_polarity, OverlayStats};
pub use processing::{
    analyze, build_histograms, calibrate, extract_metrics, AnalysisResult, CalibrationStage,
};

// Re-export core configuration for convenience
pub use drspulse_core::{AnalysisConfig, Calibration, Polarity};
