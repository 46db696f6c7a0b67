//! File writers for DRS waveform data and analysis results.

use crate::format::DrsHeader;
use crate::{Error, Result};
use drspulse_algorithms::AnalysisResult;
use drspulse_core::{Histogram1D, MeanWaveform, PulseMetrics, WaveformEvent};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer for DRS binary waveform files.
///
/// The header is written on creation; events are appended one record at a
/// time.
pub struct DrsFileWriter {
    writer: BufWriter<File>,
    header: DrsHeader,
    record: Vec<u8>,
    events: usize,
}

impl DrsFileWriter {
    /// Creates a file with the given record shape and writes its header.
    ///
    /// # Errors
    /// Returns an error if the shape is empty or the file cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        num_channels: u32,
        samples_per_channel: u32,
    ) -> Result<Self> {
        let header = DrsHeader::new(num_channels, samples_per_channel);
        let record_len = header
            .record_len()
            .filter(|_| num_channels > 0 && samples_per_channel > 0)
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "cannot write records of {num_channels} channels x {samples_per_channel} samples"
                ))
            })?;

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&header.to_bytes())?;
        Ok(Self {
            writer,
            header,
            record: Vec::with_capacity(record_len),
            events: 0,
        })
    }

    /// Appends one event.
    ///
    /// # Errors
    /// Returns an error if the event shape differs from the file shape or the
    /// write fails.
    pub fn write_event(&mut self, event: &WaveformEvent) -> Result<()> {
        self.record.clear();
        self.header.encode_record(event, &mut self.record)?;
        self.writer.write_all(&self.record)?;
        self.events += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of events written.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.events)
    }
}

/// Output file names derived from the input file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
    stem: String,
}

impl OutputPaths {
    /// Derives output names for `input` inside `output_dir`.
    #[must_use]
    pub fn new<D: AsRef<Path>, I: AsRef<Path>>(output_dir: D, input: I) -> Self {
        let stem = input
            .as_ref()
            .file_stem()
            .map_or_else(|| "drspulse".to_string(), |s| s.to_string_lossy().into_owned());
        Self {
            dir: output_dir.as_ref().to_path_buf(),
            stem,
        }
    }

    /// Returns the input stem.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{suffix}", self.stem))
    }

    /// `<stem>_metrics.csv`
    #[must_use]
    pub fn metrics(&self) -> PathBuf {
        self.with_suffix("_metrics.csv")
    }

    /// `<stem>_mean.csv`
    #[must_use]
    pub fn mean_waveform(&self) -> PathBuf {
        self.with_suffix("_mean.csv")
    }

    /// `<stem>_hist.csv`
    #[must_use]
    pub fn histograms(&self) -> PathBuf {
        self.with_suffix("_hist.csv")
    }

    /// `<stem>_summary.json`
    #[must_use]
    pub fn summary(&self) -> PathBuf {
        self.with_suffix("_summary.json")
    }

    /// `<stem>_out.h5`
    #[must_use]
    pub fn hdf5(&self) -> PathBuf {
        self.with_suffix("_out.h5")
    }
}

/// Writer for analysis results as CSV.
pub struct AnalysisFileWriter {
    writer: BufWriter<File>,
}

impl AnalysisFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes per-event metrics. An absent height leaves its cell empty.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_metrics_csv(&mut self, metrics: &PulseMetrics) -> Result<()> {
        writeln!(self.writer, "event,shift,height,integral,clipped_terms")?;

        for m in &metrics.events {
            let shift = m.shift.map(|s| s.to_string()).unwrap_or_default();
            let height = m.height.map(|h| h.to_string()).unwrap_or_default();
            writeln!(
                self.writer,
                "{},{shift},{height},{},{}",
                m.event_index, m.integral, m.clipped_terms
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes the mean signal pulse beside the mean reference waveform.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_mean_waveform_csv(
        &mut self,
        signal: &MeanWaveform,
        reference: &MeanWaveform,
    ) -> Result<()> {
        writeln!(self.writer, "sample,mean,count,reference_mean")?;

        for (n, mean, count) in signal.iter() {
            let reference_mean = reference.means().get(n).copied().unwrap_or(0.0);
            writeln!(self.writer, "{n},{mean},{count},{reference_mean}")?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes histograms, one row per bin, tagged with `label`.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn write_histograms_csv(&mut self, histograms: &[(&str, &Histogram1D)]) -> Result<()> {
        writeln!(self.writer, "histogram,bin,low,high,count")?;

        for (label, histogram) in histograms {
            let binning = histogram.binning();
            for (bin, count) in histogram.counts().iter().enumerate() {
                writeln!(
                    self.writer,
                    "{label},{bin},{},{},{count}",
                    binning.lower_edge(bin),
                    binning.lower_edge(bin + 1)
                )?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the metrics, mean-waveform and histogram CSV files for a run.
///
/// # Errors
/// Returns an error if any file cannot be written.
pub fn write_analysis_csv(result: &AnalysisResult, paths: &OutputPaths) -> Result<Vec<PathBuf>> {
    AnalysisFileWriter::create(paths.metrics())?.write_metrics_csv(&result.metrics)?;
    AnalysisFileWriter::create(paths.mean_waveform())?
        .write_mean_waveform_csv(&result.mean_waveform, &result.reference_waveform)?;
    AnalysisFileWriter::create(paths.histograms())?.write_histograms_csv(&[
        ("heights", &result.height_histogram),
        ("integrals", &result.integral_histogram),
    ])?;
    Ok(vec![paths.metrics(), paths.mean_waveform(), paths.histograms()])
}
