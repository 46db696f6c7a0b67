//! drspulse-core: Core types for DRS4 waveform pulse analysis.
//!
//! This crate provides the event model, the analysis configuration, the
//! running-mean waveform accumulator, histograms and the records passed
//! between the two analysis passes.
//!

pub mod calibration;
pub mod config;
pub mod error;
pub mod event;
pub mod histogram;
pub mod metrics;
pub mod waveform;

pub use calibration::{Calibration, IntegrationWindow, Polarity};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use event::{EventBatch, EventSource, Events, WaveformEvent};
pub use histogram::{Binning, Histogram1D};
pub use metrics::{AlignmentWarnings, EventMetrics, PulseMetrics};
pub use waveform::MeanWaveform;
