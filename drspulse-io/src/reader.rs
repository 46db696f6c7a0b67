//! Memory-mapped file readers.
//!

use crate::format::{DrsHeader, HEADER_LEN};
use crate::{Error, Result};
use drspulse_core::{EventBatch, WaveformEvent};
use log::debug;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to efficiently access file contents without
/// loading the entire file into memory.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Returns the path the reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A DRS waveform file reader with memory-mapped I/O.
pub struct DrsFileReader {
    reader: MappedFileReader,
    header: DrsHeader,
    record_len: usize,
}

impl DrsFileReader {
    /// Opens a DRS file and validates its header and size.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped, the header is invalid,
    /// or the payload is not a whole number of records.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        let header = DrsHeader::parse(reader.as_bytes())?;
        let record_len = header.record_len().ok_or_else(|| {
            Error::InvalidFormat(format!(
                "record shape {} x {} overflows (file: {})",
                header.num_channels,
                header.samples_per_channel,
                reader.path().display()
            ))
        })?;

        let payload = reader.len() - HEADER_LEN;
        if payload % record_len != 0 {
            return Err(Error::InvalidFormat(format!(
                "payload of {payload} bytes is not a multiple of the {record_len}-byte record (file: {})",
                reader.path().display()
            )));
        }

        debug!(
            "Opened {}: {} events of {} channels x {} samples",
            reader.path().display(),
            payload / record_len,
            header.num_channels,
            header.samples_per_channel
        );
        Ok(Self {
            reader,
            header,
            record_len,
        })
    }

    /// Returns the parsed header.
    #[must_use]
    pub fn header(&self) -> &DrsHeader {
        &self.header
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Returns the number of events in the file.
    #[must_use]
    pub fn num_events(&self) -> usize {
        (self.reader.len() - HEADER_LEN) / self.record_len
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    fn records(&self) -> &[u8] {
        &self.reader.as_bytes()[HEADER_LEN..]
    }

    /// Decodes all events into an [`EventBatch`], in file order.
    ///
    /// Records are decoded in parallel; shape and size were checked on open.
    #[must_use]
    pub fn read_batch(&self) -> EventBatch {
        let header = self.header;
        let events: Vec<WaveformEvent> = self
            .records()
            .par_chunks_exact(self.record_len)
            .map(|record| header.decode_record(record))
            .collect();

        let mut batch =
            EventBatch::with_capacity(header.channels(), header.samples(), events.len());
        batch.events = events;
        batch
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::DrsFileWriter;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn event(base: f32, extremum: f32) -> WaveformEvent {
        WaveformEvent::new(
            vec![vec![base, base + 1.0, base + 2.0], vec![-base; 3]],
            extremum,
        )
    }

    #[test]
    fn test_mapped_file_reader() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..64).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let reader = MappedFileReader::open(file.path()).unwrap();
        assert_eq!(reader.len(), 64);
        assert!(!reader.is_empty());
        assert_eq!(reader.as_bytes(), &data[..]);
    }

    #[test]
    fn test_drs_file_reader_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let events = vec![event(1.0, 820.0), event(4.0, 818.5), event(7.0, 823.9)];

        let mut writer = DrsFileWriter::create(file.path(), 2, 3).unwrap();
        for e in &events {
            writer.write_event(e).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), 3);

        let reader = DrsFileReader::open(file.path()).unwrap();
        assert_eq!(reader.num_events(), 3);
        assert_eq!(reader.header().channels(), 2);
        assert_eq!(reader.file_size(), HEADER_LEN + 3 * (4 + 4 * 6));

        let batch = reader.read_batch();
        assert_eq!(batch.num_channels, 2);
        assert_eq!(batch.samples_per_channel, 3);
        assert_eq!(batch.events, events);
    }

    #[test]
    fn test_drs_file_reader_header_only() {
        let file = NamedTempFile::new().unwrap();
        DrsFileWriter::create(file.path(), 9, 1024)
            .unwrap()
            .finish()
            .unwrap();

        let reader = DrsFileReader::open(file.path()).unwrap();
        assert_eq!(reader.num_events(), 0);
        assert!(reader.read_batch().events.is_empty());
    }

    #[test]
    fn test_drs_file_reader_truncated_record() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&DrsHeader::new(2, 3).to_bytes()).unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            DrsFileReader::open(file.path()),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_drs_file_reader_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            DrsFileReader::open(file.path()),
            Err(Error::InvalidFormat(_))
        ));
    }
}
