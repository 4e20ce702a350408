//! Trigger events and per-channel event sets.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::segments::SegmentList;

/// A single detected trigger.
///
/// Events are immutable once created. Times are seconds with an arbitrary
/// fixed epoch (GPS time in practice).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Central time of the trigger in seconds.
    pub time: f64,
    /// Central frequency in Hz.
    pub frequency: f64,
    /// Signal-to-noise ratio of the trigger.
    pub snr: f64,
}

impl Event {
    /// Create a new event.
    pub fn new(time: f64, frequency: f64, snr: f64) -> Self {
        Self { time, frequency, snr }
    }
}

/// The events of one channel, kept sorted by time.
///
/// Sorting by time is what makes the windowed coincidence search a binary
/// search rather than a nested scan, so every constructor sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSet {
    channel: String,
    events: Vec<Event>,
}

impl EventSet {
    /// Create an event set for `channel`, sorting the events by time.
    pub fn new(channel: impl Into<String>, mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { channel: channel.into(), events }
    }

    /// Create an event set applying the retrieval-time filters: an SNR floor
    /// and an optional frequency range.
    pub fn filtered(
        channel: impl Into<String>,
        events: Vec<Event>,
        snr_floor: f64,
        frequency_range: Option<RangeInclusive<f64>>,
    ) -> Self {
        let events = events
            .into_iter()
            .filter(|e| e.snr >= snr_floor)
            .filter(|e| {
                frequency_range
                    .as_ref()
                    .map_or(true, |r| r.contains(&e.frequency))
            })
            .collect();
        Self::new(channel, events)
    }

    /// The channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The events, in ascending time order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the set holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event times, in ascending order.
    pub fn times(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.time).collect()
    }

    /// Events with `snr >= threshold`, preserving time order.
    pub fn above_snr(&self, threshold: f64) -> Vec<Event> {
        self.events
            .iter()
            .copied()
            .filter(|e| e.snr >= threshold)
            .collect()
    }

    /// Times of events with `snr >= threshold`, in ascending order.
    pub fn times_above_snr(&self, threshold: f64) -> Vec<f64> {
        self.events
            .iter()
            .filter(|e| e.snr >= threshold)
            .map(|e| e.time)
            .collect()
    }

    /// Mean trigger rate over `livetime` seconds, 0.0 for zero livetime.
    pub fn rate(&self, livetime: f64) -> f64 {
        if livetime > 0.0 {
            self.events.len() as f64 / livetime
        } else {
            0.0
        }
    }

    /// Restrict to events inside the given active segments.
    pub fn restrict_to(&self, segments: &SegmentList) -> Self {
        Self {
            channel: self.channel.clone(),
            events: self
                .events
                .iter()
                .copied()
                .filter(|e| segments.contains(e.time))
                .collect(),
        }
    }
}

/// Mapping from channel name to its event set.
///
/// One entry (held separately by the caller) is the primary channel; the
/// map holds the auxiliaries, which shrink round over round as vetoes are
/// applied.
pub type ChannelEvents = HashMap<String, EventSet>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{Segment, SegmentList};

    fn set(times_snrs: &[(f64, f64)]) -> EventSet {
        EventSet::new(
            "X1:TEST",
            times_snrs
                .iter()
                .map(|&(t, s)| Event::new(t, 100.0, s))
                .collect(),
        )
    }

    #[test]
    fn test_new_sorts_by_time() {
        let s = set(&[(3.0, 8.0), (1.0, 5.0), (2.0, 6.0)]);
        assert_eq!(s.times(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_above_snr() {
        let s = set(&[(1.0, 5.0), (2.0, 8.0), (3.0, 12.0)]);
        assert_eq!(s.times_above_snr(8.0), vec![2.0, 3.0]);
        assert_eq!(s.above_snr(100.0).len(), 0);
        assert_eq!(s.above_snr(0.0).len(), 3);
    }

    #[test]
    fn test_rate() {
        let s = set(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]);
        assert!((s.rate(1000.0) - 0.003).abs() < 1e-12);
        assert_eq!(s.rate(0.0), 0.0);
    }

    #[test]
    fn test_filtered() {
        let events = vec![
            Event::new(1.0, 50.0, 4.0),
            Event::new(2.0, 150.0, 9.0),
            Event::new(3.0, 5000.0, 9.0),
        ];
        let s = EventSet::filtered("X1:TEST", events, 5.0, Some(10.0..=2048.0));
        assert_eq!(s.times(), vec![2.0]);
    }

    #[test]
    fn test_restrict_to() {
        let s = set(&[(1.0, 5.0), (2.5, 5.0), (4.0, 5.0)]);
        let active = SegmentList::from_segments([Segment::new(0.0, 2.0), Segment::new(3.5, 5.0)]);
        assert_eq!(s.restrict_to(&active).times(), vec![1.0, 4.0]);
    }
}
