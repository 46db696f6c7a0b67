//! JSON run summary.

use crate::Result;
use drspulse_algorithms::AnalysisResult;
use drspulse_core::{AlignmentWarnings, AnalysisConfig, Binning, Calibration, Histogram1D};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Shape and fill statistics of one histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Histogram name.
    pub name: String,
    /// Bin layout.
    pub binning: Binning,
    /// Entries inside the range.
    pub entries: u64,
    /// Entries below the range.
    pub underflow: u64,
    /// Entries at or above the range.
    pub overflow: u64,
}

impl From<&Histogram1D> for HistogramSummary {
    fn from(histogram: &Histogram1D) -> Self {
        Self {
            name: histogram.name.clone(),
            binning: *histogram.binning(),
            entries: histogram.entries(),
            underflow: histogram.underflow(),
            overflow: histogram.overflow(),
        }
    }
}

/// Everything needed to reproduce or audit a run, without per-event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Input file the run was made on.
    pub input: String,
    /// Configuration used.
    pub config: AnalysisConfig,
    /// Frozen calibration.
    pub calibration: Calibration,
    /// Truncated mean pulse height used for binning.
    pub mean_pulse: i64,
    /// Number of events measured.
    pub events: usize,
    /// Out-of-range accounting.
    pub warnings: AlignmentWarnings,
    /// Pulse-height spectrum statistics.
    pub heights: HistogramSummary,
    /// Pulse-integral spectrum statistics.
    pub integrals: HistogramSummary,
}

impl RunSummary {
    /// Builds a summary of `result`.
    #[must_use]
    pub fn new(input: &Path, config: &AnalysisConfig, result: &AnalysisResult) -> Self {
        Self {
            input: input.display().to_string(),
            config: config.clone(),
            calibration: result.calibration,
            mean_pulse: result.mean_pulse(),
            events: result.metrics.len(),
            warnings: result.metrics.warnings,
            heights: HistogramSummary::from(&result.height_histogram),
            integrals: HistogramSummary::from(&result.integral_histogram),
        }
    }

    /// Writes the summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
