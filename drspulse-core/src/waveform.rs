//! Running-mean waveform accumulator.
//!
//! `MeanWaveform` stores, per canonical sample index, the running mean of
//! every value contributed to that index and the number of contributions.
//! Indices that never receive a contribution read as zero.

#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-sample running mean over a fixed-length canonical axis.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeanWaveform {
    means: Vec<f64>,
    counts: Vec<u64>,
}

impl MeanWaveform {
    /// Creates an empty accumulator over `[0, len)`.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            means: vec![0.0; len],
            counts: vec![0; len],
        }
    }

    /// Adds one contribution at `index`.
    ///
    /// Returns `false`, leaving the accumulator untouched, if `index` is
    /// outside the axis.
    pub fn update(&mut self, index: usize, value: f64) -> bool {
        let (Some(mean), Some(count)) = (self.means.get_mut(index), self.counts.get_mut(index))
        else {
            return false;
        };
        *count += 1;
        *mean += (value - *mean) / *count as f64;
        true
    }

    /// Returns the length of the canonical axis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Returns true if the axis has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Returns the mean at `index`, zero for empty or out-of-range indices.
    #[must_use]
    pub fn mean(&self, index: usize) -> f64 {
        self.means.get(index).copied().unwrap_or(0.0)
    }

    /// Returns the number of contributions at `index`.
    #[must_use]
    pub fn count(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Returns all per-index means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Returns all per-index contribution counts.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Returns the total number of contributions over the whole axis.
    #[must_use]
    pub fn total_contributions(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterates over `(index, mean, count)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64, u64)> + '_ {
        self.means
            .iter()
            .zip(&self.counts)
            .enumerate()
            .map(|(index, (&mean, &count))| (index, mean, count))
    }
}
