//! DRS binary record format.
//!
//! Layout (little-endian):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | magic `DRSW` |
//! | 4 | 4 | format version (`u32`) |
//! | 8 | 4 | channels per event `C` (`u32`) |
//! | 12 | 4 | samples per channel `L` (`u32`) |
//!
//! followed by records of `4 + 4 * C * L` bytes: the `f32` extremum index,
//! then `C` channels of `L` `f32` samples.

use crate::{Error, Result};
use drspulse_core::WaveformEvent;

/// File magic.
pub const MAGIC: [u8; 4] = *b"DRSW";
/// Current format version.
pub const FORMAT_VERSION: u32 = 1;
/// Size of the file header in bytes.
pub const HEADER_LEN: usize = 16;

/// Parsed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrsHeader {
    /// Format version.
    pub version: u32,
    /// Channels per event.
    pub num_channels: u32,
    /// Samples per channel.
    pub samples_per_channel: u32,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn decode_f32s(bytes: &[u8]) -> impl Iterator<Item = f32> + '_ {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

impl DrsHeader {
    /// Creates a header for the current format version.
    #[must_use]
    pub fn new(num_channels: u32, samples_per_channel: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            num_channels,
            samples_per_channel,
        }
    }

    /// Parses and validates a header from the start of `bytes`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] for a short buffer, bad magic, an
    /// unsupported version or an empty record shape.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidFormat(format!(
                "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic {:02x?}",
                &bytes[..4]
            )));
        }
        let header = Self {
            version: read_u32(bytes, 4),
            num_channels: read_u32(bytes, 8),
            samples_per_channel: read_u32(bytes, 12),
        };
        if header.version != FORMAT_VERSION {
            return Err(Error::InvalidFormat(format!(
                "unsupported format version {}",
                header.version
            )));
        }
        if header.num_channels == 0 || header.samples_per_channel == 0 {
            return Err(Error::InvalidFormat(format!(
                "empty record shape: {} channels x {} samples",
                header.num_channels, header.samples_per_channel
            )));
        }
        Ok(header)
    }

    /// Encodes the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.num_channels.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.samples_per_channel.to_le_bytes());
        bytes
    }

    /// Returns the number of channels as `usize`.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.num_channels as usize
    }

    /// Returns the number of samples per channel as `usize`.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples_per_channel as usize
    }

    /// Returns the size of one record in bytes, `None` on overflow.
    #[must_use]
    pub fn record_len(&self) -> Option<usize> {
        self.channels()
            .checked_mul(self.samples())?
            .checked_mul(4)?
            .checked_add(4)
    }

    /// Decodes one record. `record` must be exactly [`Self::record_len`]
    /// bytes long.
    #[must_use]
    pub fn decode_record(&self, record: &[u8]) -> WaveformEvent {
        let (extremum, payload) = record.split_at(4);
        let extremum_index = f32::from_le_bytes([extremum[0], extremum[1], extremum[2], extremum[3]]);
        let channel_bytes = self.samples() * 4;
        let channels = payload
            .chunks_exact(channel_bytes)
            .map(|channel| decode_f32s(channel).collect())
            .collect();
        WaveformEvent::new(channels, extremum_index)
    }

    /// Encodes one event, checking it matches the header shape.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the event shape differs from the
    /// header.
    pub fn encode_record(&self, event: &WaveformEvent, out: &mut Vec<u8>) -> Result<()> {
        if event.channels.len() != self.channels()
            || event.channels.iter().any(|c| c.len() != self.samples())
        {
            return Err(Error::InvalidFormat(format!(
                "event shape does not match file shape {} x {}",
                self.num_channels, self.samples_per_channel
            )));
        }
        out.extend_from_slice(&event.extremum_index.to_le_bytes());
        for sample in event.channels.iter().flatten() {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        Ok(())
    }
}
