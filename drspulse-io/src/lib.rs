//! drspulse-io: Waveform file I/O for drspulse.
//!
//! This crate provides memory-mapped reading of DRS binary waveform files,
//! optional HDF5 input/output, and writers for analysis results (CSV and a
//! JSON run summary).
//!

mod error;
pub mod format;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod reader;
mod summary;
mod writer;

pub use error::{Error, Result};
pub use format::DrsHeader;
#[cfg(feature = "hdf5")]
pub use hdf5::{read_events_hdf5, write_analysis_hdf5, write_events_hdf5};
pub use reader::{DrsFileReader, MappedFileReader};
pub use summary::{HistogramSummary, RunSummary};
pub use writer::{write_analysis_csv, AnalysisFileWriter, DrsFileWriter, OutputPaths};

use drspulse_core::EventBatch;
use std::path::Path;

/// Loads all events of a waveform file, choosing the reader by extension.
///
/// `.h5`/`.hdf5` files need the `hdf5` feature; anything else is read as a
/// DRS binary file.
///
/// # Errors
/// Returns an error if the file cannot be read or has an invalid format.
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<EventBatch> {
    let path = path.as_ref();
    let is_hdf5 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("h5") || e.eq_ignore_ascii_case("hdf5"));

    if is_hdf5 {
        #[cfg(feature = "hdf5")]
        return read_events_hdf5(path);
        #[cfg(not(feature = "hdf5"))]
        return Err(Error::InvalidFormat(format!(
            "{} is an HDF5 file; rebuild with the `hdf5` feature to read it",
            path.display()
        )));
    }

    Ok(DrsFileReader::open(path)?.read_batch())
}
