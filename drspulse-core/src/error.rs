//! Error types for drspulse-core.

use thiserror::Error;

/// Result type alias for drspulse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the pulse analysis pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The event source did not yield a single event.
    #[error("event source yielded no events")]
    SourceExhausted,

    /// Invalid configuration value or combination.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The baseline fit window in front of the peak is empty or inverted.
    #[error(
        "degenerate baseline window: peak at sample {peak_index} with half-width {half_width} leaves no samples to fit"
    )]
    DegenerateBaselineWindow {
        /// Canonical index of the mean-waveform peak.
        peak_index: usize,
        /// Integration half-width that was subtracted from the peak index.
        half_width: usize,
    },

    /// An event does not carry a channel the analysis needs.
    #[error("event {event} has no channel {channel} ({available} channels present)")]
    MissingChannel {
        /// Position of the event in the source.
        event: usize,
        /// Requested channel index.
        channel: usize,
        /// Number of channels in the event.
        available: usize,
    },
}

impl Error {
    /// Returns true for errors caused by the run configuration.
    ///
    /// A degenerate baseline window is a configuration problem even though
    /// it can only be detected once the peak position is known.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_) | Error::DegenerateBaselineWindow { .. }
        )
    }
}
