//! HDF5 waveform input and analysis output.
//!
//! Waveforms live in group `waves`: dataset `chs` (`f32`, `[events,
//! channels, samples]`) and dataset `min` (`f32`, `[events]`) holding the
//! extremum index of each event.

#![allow(clippy::cast_precision_loss)]

use crate::{Error, Result};
use drspulse_algorithms::AnalysisResult;
use drspulse_core::{AnalysisConfig, EventBatch, Histogram1D, WaveformEvent};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::{ArrayView, ArrayView1};
use std::path::Path;
use std::str::FromStr;

const FORMAT_VERSION: &str = "0.1";

/// Reads all events of an HDF5 waveform file.
///
/// # Errors
/// Returns an error if HDF5 I/O fails, a dataset is missing, or the `chs`
/// and `min` shapes disagree.
pub fn read_events_hdf5<P: AsRef<Path>>(path: P) -> Result<EventBatch> {
    let file = File::open(path)?;
    let waves = file.group("waves")?;

    let chs = waves.dataset("chs")?;
    let shape = chs.shape();
    let &[events, channels, samples] = shape.as_slice() else {
        return Err(Error::InvalidFormat(format!(
            "dataset chs must be 3-dimensional, got shape {shape:?}"
        )));
    };
    let extrema = read_dataset_vec::<f32>(&waves, "min")?;
    if extrema.len() != events {
        return Err(Error::InvalidFormat(format!(
            "dataset min has {} entries for {events} events",
            extrema.len()
        )));
    }
    if channels == 0 || samples == 0 {
        return Err(Error::InvalidFormat(format!(
            "empty record shape: {channels} channels x {samples} samples"
        )));
    }

    let flat = chs.read_raw::<f32>()?;
    let mut batch = EventBatch::with_capacity(channels, samples, events);
    for (record, &extremum_index) in flat.chunks_exact(channels * samples).zip(&extrema) {
        let waveforms = record.chunks_exact(samples).map(<[f32]>::to_vec).collect();
        batch.push(WaveformEvent::new(waveforms, extremum_index));
    }
    Ok(batch)
}

/// Writes events to an HDF5 waveform file.
///
/// # Errors
/// Returns an error if an event shape differs from the batch shape or HDF5
/// I/O fails.
pub fn write_events_hdf5<P: AsRef<Path>>(path: P, batch: &EventBatch) -> Result<()> {
    let (channels, samples) = (batch.num_channels, batch.samples_per_channel);
    let mut flat = Vec::with_capacity(batch.events.len() * channels * samples);
    for (index, event) in batch.events.iter().enumerate() {
        if event.channels.len() != channels || event.channels.iter().any(|c| c.len() != samples)
        {
            return Err(Error::InvalidFormat(format!(
                "event {index} does not match batch shape {channels} x {samples}"
            )));
        }
        flat.extend(event.channels.iter().flatten());
    }
    let extrema: Vec<f32> = batch.events.iter().map(|e| e.extremum_index).collect();

    let file = File::create(path)?;
    set_attr_str(&file, "drspulse_format_version", FORMAT_VERSION)?;
    let waves = file.create_group("waves")?;

    let shape = (batch.events.len(), channels, samples);
    let chs = create_fixed_dataset::<f32, _>(&waves, "chs", shape)?;
    let view = ArrayView::from_shape(shape, flat.as_slice())
        .map_err(|e| Error::InvalidFormat(format!("chs shape mismatch: {e}")))?;
    chs.write(view)?;
    write_vec(&waves, "min", &extrema)?;
    Ok(())
}

/// Writes calibration, mean waveforms, per-event metrics and histograms to a
/// single HDF5 file.
///
/// Absent shifts and heights are stored as NaN.
///
/// # Errors
/// Returns an error if HDF5 I/O fails.
pub fn write_analysis_hdf5<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
    result: &AnalysisResult,
) -> Result<()> {
    let file = File::create(path)?;
    set_attr_str(&file, "drspulse_format_version", FORMAT_VERSION)?;

    let calibration = file.create_group("calibration")?;
    let c = &result.calibration;
    set_attr_str(&calibration, "polarity", &c.polarity.to_string())?;
    set_attr(&calibration, "baseline", c.baseline)?;
    set_attr(&calibration, "peak_index", c.peak_index as u64)?;
    set_attr(&calibration, "peak_value", c.peak_value)?;
    set_attr(&calibration, "window_start", c.window.start)?;
    set_attr(&calibration, "window_stop", c.window.stop)?;
    set_attr(&calibration, "mean_pulse", result.mean_pulse())?;
    set_attr(&calibration, "signal_channel", config.signal_channel as u64)?;
    set_attr(&calibration, "trigger_setpoint", config.trigger_setpoint as u64)?;

    let mean = file.create_group("mean_waveform")?;
    write_vec(&mean, "mean", result.mean_waveform.means())?;
    write_vec(&mean, "count", result.mean_waveform.counts())?;
    write_vec(&mean, "reference_mean", result.reference_waveform.means())?;

    let metrics = file.create_group("metrics")?;
    let events = &result.metrics.events;
    let index: Vec<u64> = events.iter().map(|m| m.event_index as u64).collect();
    let shift: Vec<f64> = events
        .iter()
        .map(|m| m.shift.map_or(f64::NAN, |s| s as f64))
        .collect();
    let height: Vec<f64> = events.iter().map(|m| m.height.unwrap_or(f64::NAN)).collect();
    let integral: Vec<f64> = events.iter().map(|m| m.integral).collect();
    let clipped: Vec<u64> = events.iter().map(|m| m.clipped_terms as u64).collect();
    write_vec(&metrics, "event", &index)?;
    write_vec(&metrics, "shift", &shift)?;
    write_vec(&metrics, "height", &height)?;
    write_vec(&metrics, "integral", &integral)?;
    write_vec(&metrics, "clipped_terms", &clipped)?;

    let histograms = file.create_group("histograms")?;
    write_histogram(&histograms, "heights", &result.height_histogram)?;
    write_histogram(&histograms, "integrals", &result.integral_histogram)?;
    Ok(())
}

fn write_histogram(parent: &Group, name: &str, histogram: &Histogram1D) -> Result<()> {
    let group = parent.create_group(name)?;
    set_attr_str(&group, "name", &histogram.name)?;
    set_attr(&group, "underflow", histogram.underflow())?;
    set_attr(&group, "overflow", histogram.overflow())?;

    let binning = histogram.binning();
    let edges: Vec<f64> = (0..=binning.nbins).map(|i| binning.lower_edge(i)).collect();
    write_vec(&group, "counts", histogram.counts())?;
    write_vec(&group, "edges", &edges)?;
    Ok(())
}

fn create_fixed_dataset<T: H5Type, S>(group: &Group, name: &str, shape: S) -> Result<Dataset>
where
    S: Into<hdf5::Extents>,
{
    Ok(group.new_dataset::<T>().shape(shape).create(name)?)
}

fn write_vec<T: H5Type>(group: &Group, name: &str, data: &[T]) -> Result<()> {
    let dataset = create_fixed_dataset::<T, _>(group, name, data.len())?;
    dataset.write(ArrayView1::from(data))?;
    Ok(())
}

fn set_attr<T: H5Type>(group: &Group, name: &str, value: T) -> Result<()> {
    group.new_attr::<T>().create(name)?.write_scalar(&value)?;
    Ok(())
}

fn set_attr_str(group: &Group, name: &str, value: &str) -> Result<()> {
    let value = VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))?;
    group
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn read_dataset_vec<T: H5Type>(group: &Group, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    Ok(dataset.read_raw::<T>()?)
}
