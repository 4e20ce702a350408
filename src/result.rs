//! Round records and the analysis report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::segments::SegmentList;

/// The winning (channel, SNR threshold, time window) combination of one
/// round's search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Winner {
    /// Winning auxiliary channel name.
    pub name: String,

    /// Winning SNR threshold.
    pub snr: f64,

    /// Winning coincidence half-window in seconds.
    pub window: f64,

    /// The maximum significance over all combinations evaluated this round.
    pub significance: f64,

    /// Expected accidental-coincidence count under the null model.
    pub mu: f64,
}

impl Winner {
    /// Placeholder winner used before any combination has been scored.
    ///
    /// The negative sentinel significance guarantees that any real score,
    /// including 0, displaces it.
    pub(crate) fn none() -> Self {
        Self {
            name: "none".to_string(),
            snr: 0.0,
            window: 0.0,
            significance: -1.0,
            mu: 0.0,
        }
    }
}

/// The record of one completed veto round.
///
/// Rounds are mutated while the loop processes them and become immutable
/// once appended to the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub n: usize,

    /// Name of the primary channel under analysis.
    pub primary_channel: String,

    /// Event attribute used for significance ranking (typically `"snr"`).
    pub rank_column: String,

    /// The active segments defining the livetime entering this round.
    pub segments: SegmentList,

    /// Winning channel, threshold, and window.
    pub winner: Winner,

    /// Veto segments produced this round: coalesced `[t - w, t + w)`
    /// windows around the winning channel's qualifying events.
    pub vetoes: SegmentList,

    /// `(primary events vetoed this round, primary events before the veto)`.
    pub efficiency: (u64, u64),

    /// `(qualifying auxiliary events coincident with the primary,
    /// qualifying auxiliary events in total)`.
    pub use_percentage: (u64, u64),

    /// `(seconds removed by this round's vetoes, livetime entering this
    /// round)`.
    pub deadtime: (f64, f64),

    /// Cumulative efficiency over rounds 1..=n, against the round-1 primary
    /// count.
    pub cum_efficiency: (u64, u64),

    /// Cumulative deadtime over rounds 1..=n, against the full analysis
    /// livetime.
    pub cum_deadtime: (f64, f64),

    /// Each channel's own best significance this round, for the
    /// round-over-round significance-drop diagnostic.
    pub significances: BTreeMap<String, f64>,
}

impl Round {
    /// Livetime entering this round, in seconds.
    pub fn livetime(&self) -> f64 {
        self.segments.duration()
    }

    /// Fraction of primary events removed this round, 0.0 if none were
    /// present.
    pub fn efficiency_fraction(&self) -> f64 {
        ratio(self.efficiency.0 as f64, self.efficiency.1 as f64)
    }

    /// Fraction of qualifying auxiliary events that coincided with the
    /// primary, 0.0 if there were none.
    pub fn use_fraction(&self) -> f64 {
        ratio(self.use_percentage.0 as f64, self.use_percentage.1 as f64)
    }

    /// Fraction of this round's livetime removed by its vetoes.
    pub fn deadtime_fraction(&self) -> f64 {
        ratio(self.deadtime.0, self.deadtime.1)
    }

    /// Cumulative efficiency fraction over rounds 1..=n.
    pub fn cum_efficiency_fraction(&self) -> f64 {
        ratio(self.cum_efficiency.0 as f64, self.cum_efficiency.1 as f64)
    }

    /// Cumulative deadtime fraction over rounds 1..=n.
    pub fn cum_deadtime_fraction(&self) -> f64 {
        ratio(self.cum_deadtime.0, self.cum_deadtime.1)
    }
}

/// Guarded ratio: zero denominators yield 0.0 rather than NaN, since rounds
/// can legitimately veto nothing.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// The complete output of a hierarchical veto analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Name of the primary channel.
    pub primary_channel: String,

    /// The full pre-analysis active segments.
    pub analysis_segments: SegmentList,

    /// Total analysis livetime in seconds.
    pub livetime: f64,

    /// Primary events present before round 1.
    pub primary_count: u64,

    /// Completed rounds, in order.
    pub rounds: Vec<Round>,
}

impl Report {
    /// Overall efficiency: primary events vetoed across all rounds against
    /// the round-1 count.
    pub fn total_efficiency(&self) -> f64 {
        self.rounds
            .last()
            .map_or(0.0, Round::cum_efficiency_fraction)
    }

    /// Overall deadtime fraction across all rounds.
    pub fn total_deadtime(&self) -> f64 {
        self.rounds.last().map_or(0.0, Round::cum_deadtime_fraction)
    }

    /// The union of every round's veto segments.
    pub fn veto_segments(&self) -> SegmentList {
        self.rounds
            .iter()
            .fold(SegmentList::new(), |acc, r| acc.union(&r.vetoes))
    }

    /// Whether `t` falls inside any round's veto segments.
    ///
    /// This is the membership test a downstream consumer uses to re-derive
    /// whether an external timestamp was vetoed.
    pub fn is_vetoed(&self, t: f64) -> bool {
        self.rounds.iter().any(|r| r.vetoes.contains(t))
    }
}
