//! Fixed-binning 1D histograms for pulse-height and pulse-integral spectra.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Uniform binning over `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binning {
    /// Number of bins.
    pub nbins: usize,
    /// Lower edge of the first bin.
    pub low: f64,
    /// Upper edge of the last bin.
    pub high: f64,
}

impl Binning {
    /// Fallback used when the derived binning is degenerate.
    pub const FALLBACK: Binning = Binning {
        nbins: 1,
        low: -1.0,
        high: 1.0,
    };

    /// Upper limit on the number of bins; larger requests keep their range
    /// and are clamped to this.
    pub const MAX_BINS: usize = 1 << 20;

    /// Creates a binning, falling back to [`Binning::FALLBACK`] for zero
    /// bins or an empty/inverted range.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn new(nbins: i64, low: f64, high: f64) -> Self {
        if nbins <= 0 || !(low < high) {
            return Self::FALLBACK;
        }
        Self {
            nbins: usize::try_from(nbins).map_or(Self::MAX_BINS, |n| n.min(Self::MAX_BINS)),
            low,
            high,
        }
    }

    /// Binning for the pulse-height spectrum.
    ///
    /// `mean_pulse` is the truncated height of the mean pulse; the range
    /// covers a third of it below zero and three times it above.
    #[must_use]
    pub fn for_heights(mean_pulse: i64) -> Self {
        let Some(high) = mean_pulse.checked_mul(3) else {
            return Self::FALLBACK;
        };
        let Some(nbins) = high.checked_add(50) else {
            return Self::FALLBACK;
        };
        Self::new(nbins, (-mean_pulse / 3) as f64, high as f64)
    }

    /// Binning for the pulse-integral spectrum over a window of `width`
    /// samples.
    #[must_use]
    pub fn for_integrals(mean_pulse: i64, width: usize) -> Self {
        let span = i64::try_from(width)
            .ok()
            .and_then(|width| mean_pulse.checked_mul(width));
        match span {
            Some(span) if span > 0 => Self::new(span / 40, (-span / 10) as f64, span as f64),
            _ => Self::FALLBACK,
        }
    }

    /// Returns the width of one bin.
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.nbins as f64
    }

    /// Returns the lower edge of bin `index`.
    #[must_use]
    pub fn lower_edge(&self, index: usize) -> f64 {
        self.low + index as f64 * self.bin_width()
    }
}

/// A 1D histogram with under- and overflow counters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram1D {
    /// Title shown next to the histogram in outputs.
    pub name: String,
    binning: Binning,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl Histogram1D {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        Self {
            name: name.into(),
            binning,
            counts: vec![0; binning.nbins],
            underflow: 0,
            overflow: 0,
        }
    }

    /// Adds one entry. Non-finite values are ignored.
    pub fn fill(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.binning.low {
            self.underflow += 1;
            return;
        }
        if value >= self.binning.high {
            self.overflow += 1;
            return;
        }
        let bin = ((value - self.binning.low) / self.binning.bin_width()) as usize;
        let bin = bin.min(self.binning.nbins - 1);
        self.counts[bin] += 1;
    }

    /// Adds every value of an iterator.
    pub fn fill_all<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        for value in values {
            self.fill(value);
        }
    }

    /// Returns the binning.
    #[must_use]
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Returns the in-range bin counts.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Returns the number of entries below the first bin.
    #[must_use]
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Returns the number of entries at or above the upper edge.
    #[must_use]
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Returns the number of entries including under- and overflow.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.underflow + self.overflow
    }
}
