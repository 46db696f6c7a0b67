//! Per-event pulse metrics and out-of-range bookkeeping.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Height and integral measured for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventMetrics {
    /// Position of the event in the source.
    pub event_index: usize,
    /// Alignment shift applied to the event, `None` for a non-finite
    /// extremum index.
    pub shift: Option<i64>,
    /// Baseline-subtracted amplitude at the peak index.
    ///
    /// `None` when the shifted peak index falls outside the sample buffer.
    pub height: Option<f64>,
    /// Baseline-subtracted sum over the integration window.
    pub integral: f64,
    /// Number of integration terms that fell outside the buffer and
    /// contributed zero.
    pub clipped_terms: usize,
}

/// Aggregate count of events whose alignment left the canonical axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlignmentWarnings {
    /// Events processed.
    pub events: usize,
    /// Events whose shifted peak index fell outside the buffer.
    pub height_out_of_range: usize,
    /// Events with at least one clipped integration term.
    pub integral_clipped: usize,
    /// Total number of clipped integration terms.
    pub clipped_terms: usize,
}

impl AlignmentWarnings {
    /// Records the outcome of one event.
    pub fn record(&mut self, metrics: &EventMetrics) {
        self.events += 1;
        if metrics.height.is_none() {
            self.height_out_of_range += 1;
        }
        if metrics.clipped_terms > 0 {
            self.integral_clipped += 1;
            self.clipped_terms += metrics.clipped_terms;
        }
    }

    /// Returns true if no event produced a warning.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.height_out_of_range == 0 && self.integral_clipped == 0
    }
}

impl fmt::Display for AlignmentWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} events had out-of-range alignment at peak index, \
             {} had a clipped integration window ({} terms)",
            self.height_out_of_range, self.events, self.integral_clipped, self.clipped_terms
        )
    }
}

/// Metrics of every event of a run, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseMetrics {
    /// One entry per event.
    pub events: Vec<EventMetrics>,
    /// Aggregated out-of-range counts.
    pub warnings: AlignmentWarnings,
}

impl PulseMetrics {
    /// Creates an empty collection with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            warnings: AlignmentWarnings::default(),
        }
    }

    /// Appends the metrics of one event.
    pub fn push(&mut self, metrics: EventMetrics) {
        self.warnings.record(&metrics);
        self.events.push(metrics);
    }

    /// Returns the number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no event was measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the defined pulse heights in event order.
    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().filter_map(|m| m.height)
    }

    /// Returns the pulse integrals in event order.
    pub fn integrals(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().map(|m| m.integral)
    }
}
