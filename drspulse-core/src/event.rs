//! Waveform event types and the event source abstraction.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single digitizer record.
///
/// Holds one fixed-length sample buffer per channel plus the sample index at
/// which the trigger-reference channel reached its extremum.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaveformEvent {
    /// Per-channel amplitude samples (ADC units).
    pub channels: Vec<Vec<f32>>,
    /// Sample index of the trigger-reference extremum.
    pub extremum_index: f32,
}

impl WaveformEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(channels: Vec<Vec<f32>>, extremum_index: f32) -> Self {
        Self {
            channels,
            extremum_index,
        }
    }

    /// Returns the number of channels in the event.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Returns the samples of a channel, if present.
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Returns the samples of a channel or a [`Error::MissingChannel`] error
    /// tagged with the event position.
    ///
    /// # Errors
    /// Returns an error if the channel does not exist.
    pub fn require_channel(&self, index: usize, event: usize) -> Result<&[f32]> {
        self.channel(index).ok_or(Error::MissingChannel {
            event,
            channel: index,
            available: self.channels.len(),
        })
    }

    /// Returns the length of the longest channel buffer.
    #[must_use]
    pub fn samples_per_channel(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A finite, indexable sequence of events.
///
/// The analysis traverses a source twice, so implementations must return the
/// same event for the same index on every call.
pub trait EventSource {
    /// Returns the number of events.
    fn len(&self) -> usize;

    /// Returns the event at `index`, or `None` past the end.
    fn event(&self, index: usize) -> Option<&WaveformEvent>;

    /// Returns true if the source has no events.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the events in source order.
    fn events(&self) -> Events<'_, Self> {
        Events {
            source: self,
            next: 0,
        }
    }
}

/// Iterator over the events of an [`EventSource`].
pub struct Events<'a, S: ?Sized> {
    source: &'a S,
    next: usize,
}

impl<'a, S: EventSource + ?Sized> Iterator for Events<'a, S> {
    type Item = &'a WaveformEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.source.event(self.next)?;
        self.next += 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl EventSource for [WaveformEvent] {
    fn len(&self) -> usize {
        <[WaveformEvent]>::len(self)
    }

    fn event(&self, index: usize) -> Option<&WaveformEvent> {
        self.get(index)
    }
}

impl EventSource for Vec<WaveformEvent> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn event(&self, index: usize) -> Option<&WaveformEvent> {
        self.get(index)
    }
}

/// An in-memory batch of events loaded from a data file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventBatch {
    /// Events in file order.
    pub events: Vec<WaveformEvent>,
    /// Number of channels per event declared by the file.
    pub num_channels: usize,
    /// Number of samples per channel declared by the file.
    pub samples_per_channel: usize,
}

impl EventBatch {
    /// Creates an empty batch with the given shape and capacity.
    #[must_use]
    pub fn with_capacity(num_channels: usize, samples_per_channel: usize, capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            num_channels,
            samples_per_channel,
        }
    }

    /// Appends an event.
    pub fn push(&mut self, event: WaveformEvent) {
        self.events.push(event);
    }

    /// Returns the smallest and largest extremum index in the batch.
    #[must_use]
    pub fn extremum_range(&self) -> Option<(f32, f32)> {
        self.events
            .iter()
            .map(|event| event.extremum_index)
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            })
    }
}

impl EventSource for EventBatch {
    fn len(&self) -> usize {
        self.events.len()
    }

    fn event(&self, index: usize) -> Option<&WaveformEvent> {
        self.events.get(index)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn event(value: f32, extremum: f32) -> WaveformEvent {
        WaveformEvent::new(vec![vec![value; 4], vec![value + 1.0; 4]], extremum)
    }

    #[test]
    fn test_channel_access() {
        let ev = event(1.0, 2.0);
        assert_eq!(ev.num_channels(), 2);
        assert_eq!(ev.channel(1), Some(&[2.0_f32; 4][..]));
        assert!(ev.channel(2).is_none());
        assert_eq!(ev.samples_per_channel(), 4);
    }

    #[test]
    fn test_require_channel_reports_event() {
        let ev = event(1.0, 2.0);
        match ev.require_channel(8, 17) {
            Err(Error::MissingChannel {
                event,
                channel,
                available,
            }) => {
                assert_eq!(event, 17);
                assert_eq!(channel, 8);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_event_source_iteration() {
        let events = vec![event(1.0, 3.0), event(2.0, 4.0), event(3.0, 5.0)];
        let source = events.as_slice();
        assert_eq!(EventSource::len(source), 3);
        let extrema: Vec<f32> = source.events().map(|e| e.extremum_index).collect();
        assert_eq!(extrema, vec![3.0, 4.0, 5.0]);
        assert_eq!(source.events().size_hint(), (3, Some(3)));
        assert!(source.event(3).is_none());
    }

    #[test]
    fn test_event_batch() {
        let mut batch = EventBatch::with_capacity(2, 4, 3);
        assert!(batch.is_empty());
        assert!(batch.extremum_range().is_none());

        batch.push(event(1.0, 810.0));
        batch.push(event(1.0, f32::NAN));
        batch.push(event(1.0, 823.5));

        assert_eq!(EventSource::len(&batch), 3);
        assert_eq!(batch.extremum_range(), Some((810.0, 823.5)));
    }
}
