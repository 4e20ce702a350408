//! Time segments and segment lists.
//!
//! A [`Segment`] is a half-open interval `[start, end)` of seconds (GPS or
//! any other fixed epoch). A [`SegmentList`] is an ordered, non-overlapping,
//! coalesced set of segments representing active (analysable) or vetoed
//! time, with the usual set algebra: union, difference, intersection,
//! total duration, and membership testing.

use serde::{Deserialize, Serialize};

use crate::error::HvetoError;

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Inclusive start time in seconds.
    pub start: f64,
    /// Exclusive end time in seconds.
    pub end: f64,
}

impl Segment {
    /// Create a segment, ordering the endpoints if given reversed.
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Length of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether two segments overlap or touch (share an endpoint).
    fn joinable(&self, other: &Segment) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// An ordered, coalesced list of non-overlapping segments.
///
/// The coalesced invariant is maintained by every constructor and set
/// operation: segments are sorted by start time, pairwise disjoint, and
/// adjacent segments are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    /// Create an empty segment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a coalesced list from arbitrary (possibly overlapping) segments.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut segs: Vec<Segment> = segments
            .into_iter()
            .filter(|s| s.duration() > 0.0)
            .collect();
        segs.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut out: Vec<Segment> = Vec::with_capacity(segs.len());
        for seg in segs {
            match out.last_mut() {
                Some(last) if last.joinable(&seg) => {
                    last.end = last.end.max(seg.end);
                }
                _ => out.push(seg),
            }
        }
        Self { segments: out }
    }

    /// Build the union of windows `[t - window, t + window)` around each time.
    ///
    /// This is how a round's veto segments are constructed from the winning
    /// channel's qualifying event times.
    pub fn around_times(times: &[f64], window: f64) -> Self {
        Self::from_segments(
            times
                .iter()
                .map(|&t| Segment::new(t - window, t + window)),
        )
    }

    /// The segments, in ascending time order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of disjoint segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the list holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total duration in seconds (the livetime if this is an active list).
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Whether `t` falls inside any segment.
    ///
    /// Binary search over the ordered segments, O(log n).
    pub fn contains(&self, t: f64) -> bool {
        let idx = self.segments.partition_point(|s| s.end <= t);
        self.segments.get(idx).is_some_and(|s| s.contains(t))
    }

    /// Set union with another list.
    pub fn union(&self, other: &SegmentList) -> Self {
        Self::from_segments(
            self.segments
                .iter()
                .chain(other.segments.iter())
                .copied(),
        )
    }

    /// Set intersection with another list.
    pub fn intersection(&self, other: &SegmentList) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.segments.len() && j < other.segments.len() {
            let a = self.segments[i];
            let b = other.segments[j];
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                out.push(Segment { start, end });
            }
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { segments: out }
    }

    /// Set difference: time in `self` but not in `other`.
    pub fn difference(&self, other: &SegmentList) -> Self {
        let mut out = Vec::new();
        let mut j = 0;
        for &seg in &self.segments {
            let mut cursor = seg.start;
            // skip subtrahend segments entirely before this one
            while j < other.segments.len() && other.segments[j].end <= seg.start {
                j += 1;
            }
            let mut k = j;
            while k < other.segments.len() && other.segments[k].start < seg.end {
                let b = other.segments[k];
                if b.start > cursor {
                    out.push(Segment { start: cursor, end: b.start.min(seg.end) });
                }
                cursor = cursor.max(b.end);
                k += 1;
            }
            if cursor < seg.end {
                out.push(Segment { start: cursor, end: seg.end });
            }
        }
        Self { segments: out }
    }

    /// Format as ASCII, two (`start end`) or four (`index start end duration`)
    /// columns per line.
    ///
    /// # Panics
    ///
    /// Panics if `ncol` is not 2 or 4.
    pub fn to_ascii(&self, ncol: usize) -> String {
        assert!(ncol == 2 || ncol == 4, "invalid number of columns: {ncol}");
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if ncol == 2 {
                out.push_str(&format!("{:.6} {:.6}\n", seg.start, seg.end));
            } else {
                out.push_str(&format!(
                    "{}\t{:.6}\t{:.6}\t{:.6}\n",
                    i,
                    seg.start,
                    seg.end,
                    seg.duration()
                ));
            }
        }
        out
    }

    /// Parse an ASCII segment listing in either two- or four-column form.
    pub fn from_ascii(text: &str) -> Result<Self, HvetoError> {
        let mut segs = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split_whitespace().collect();
            let (start, end) = match cols.len() {
                2 => (cols[0], cols[1]),
                4 => (cols[1], cols[2]),
                n => {
                    return Err(HvetoError::SegmentParse(format!(
                        "expected 2 or 4 columns, found {n}: {line:?}"
                    )))
                }
            };
            let start: f64 = start
                .parse()
                .map_err(|e| HvetoError::SegmentParse(format!("{e}: {line:?}")))?;
            let end: f64 = end
                .parse()
                .map_err(|e| HvetoError::SegmentParse(format!("{e}: {line:?}")))?;
            segs.push(Segment::new(start, end));
        }
        Ok(Self::from_segments(segs))
    }
}

impl From<Segment> for SegmentList {
    fn from(seg: Segment) -> Self {
        Self::from_segments([seg])
    }
}

impl FromIterator<Segment> for SegmentList {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}
