//! The round loop: repeated winner search, veto construction, and veto
//! application until the stopping condition fires.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::analysis::{count_coincidences, find_max_significance, veto, veto_all};
use crate::config::Config;
use crate::error::HvetoError;
use crate::events::{ChannelEvents, EventSet};
use crate::result::{Report, Round, Winner};
use crate::segments::SegmentList;

/// Main entry point for a hierarchical veto analysis.
///
/// Use the builder pattern to configure and run the round loop.
///
/// # Example
///
/// ```ignore
/// use hveto::Hveto;
///
/// let report = Hveto::new()
///     .snr_thresholds(vec![8.0, 10.0, 20.0])
///     .time_windows(vec![0.1, 0.5, 1.0])
///     .minimum_significance(5.0)
///     .run(primary, auxiliary, analysis_segments)?;
///
/// println!("{} rounds, {:.1}% efficiency",
///          report.rounds.len(), report.total_efficiency() * 100.0);
/// ```
///
/// The loop is strictly sequential round over round: each round's veto
/// segments redefine the livetime and event sets of the next. Within a
/// round the search and the veto application are parallel across channels
/// (with the `parallel` feature, on by default).
#[derive(Debug, Clone, Default)]
pub struct Hveto {
    config: Config,
}

impl Hveto {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the SNR thresholds to scan (strictly ascending).
    pub fn snr_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.config.snr_thresholds = thresholds;
        self
    }

    /// Set the coincidence half-windows to scan, in seconds (strictly
    /// ascending).
    pub fn time_windows(mut self, windows: Vec<f64>) -> Self {
        self.config.time_windows = windows;
        self
    }

    /// Set the significance below which the analysis stops.
    pub fn minimum_significance(mut self, significance: f64) -> Self {
        self.config.minimum_significance = significance;
        self
    }

    /// Set the name of the ranking attribute recorded in round reports.
    pub fn rank_column(mut self, column: impl Into<String>) -> Self {
        self.config.rank_column = column.into();
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full round loop.
    ///
    /// Events outside `analysis_segments` are discarded up front; the
    /// caller is expected to have applied any retrieval-time SNR floor and
    /// frequency filters already.
    ///
    /// # Arguments
    ///
    /// * `primary` - The primary channel's events
    /// * `auxiliary` - Every auxiliary channel's events
    /// * `analysis_segments` - The analysable (known-good) segments
    ///
    /// # Errors
    ///
    /// Returns [`HvetoError::NoLivetime`] if `analysis_segments` is empty,
    /// or a validation error for a malformed configuration. An empty
    /// primary event set is not an error: the report simply has no rounds.
    pub fn run(
        &self,
        primary: EventSet,
        auxiliary: ChannelEvents,
        analysis_segments: SegmentList,
    ) -> Result<Report, HvetoError> {
        self.config.validate()?;

        let livetime = analysis_segments.duration();
        if livetime <= 0.0 {
            return Err(HvetoError::NoLivetime);
        }

        let mut primary = primary.restrict_to(&analysis_segments);
        let mut auxiliary: ChannelEvents = auxiliary
            .into_iter()
            .map(|(name, set)| {
                let set = set.restrict_to(&analysis_segments);
                (name, set)
            })
            .collect();

        let mut report = Report {
            primary_channel: primary.channel().to_string(),
            analysis_segments: analysis_segments.clone(),
            livetime,
            primary_count: primary.len() as u64,
            rounds: Vec::new(),
        };

        if primary.is_empty() {
            info!("No primary events in the analysis segments, nothing to do");
            return Ok(report);
        }

        let mut segments = analysis_segments;
        let mut n = 1usize;

        loop {
            info!("-- Processing round {n} --");
            let round_livetime = segments.duration();

            // AWAITING_SEARCH -> SEARCHED
            let (winner, significances) = find_max_significance(
                &primary,
                &auxiliary,
                &self.config.snr_thresholds,
                &self.config.time_windows,
                round_livetime,
            );
            info!("Round {n} winner: {}", winner.name);

            // SEARCHED -> STOPPED: this round is discarded, the analysis
            // finishes with the rounds completed so far
            if winner.significance < self.config.minimum_significance {
                info!(
                    "Maximum significance below stopping point ({:.2} < {:.2})",
                    winner.significance, self.config.minimum_significance
                );
                info!("-- Rounds complete! --");
                break;
            }
            let Some(winning_set) = auxiliary.get(&winner.name) else {
                break;
            };

            // SEARCHED -> VETOED: build this round's veto segments from the
            // winning channel's qualifying events
            let qualifying = winning_set.times_above_snr(winner.snr);
            let coincident =
                count_coincidences(&qualifying, &primary.times(), winner.window);
            let vetoes = SegmentList::around_times(&qualifying, winner.window);
            debug!("Generated veto segments for round {n}");

            let (surviving, vetoed) = veto(&primary, &vetoes);
            debug!("Applied vetoes to primary");

            // VETOED -> RECORDED
            let round = self.record_round(
                n,
                &report,
                &segments,
                winner,
                vetoes,
                round_livetime,
                livetime,
                primary.len() as u64,
                vetoed.len() as u64,
                coincident,
                qualifying.len() as u64,
                significances,
            );
            log_round(&round);

            auxiliary = veto_all(&auxiliary, &round.vetoes);
            debug!("Applied vetoes to auxiliary channels");

            // RECORDED -> next round's AWAITING_SEARCH
            segments = segments.difference(&round.vetoes);
            primary = surviving;
            report.rounds.push(round);
            n += 1;
        }

        Ok(report)
    }

    /// Assemble the immutable record of a finished round, accumulating the
    /// running totals from the previously completed rounds.
    #[allow(clippy::too_many_arguments)]
    fn record_round(
        &self,
        n: usize,
        report: &Report,
        segments: &SegmentList,
        winner: Winner,
        vetoes: SegmentList,
        round_livetime: f64,
        livetime: f64,
        primary_before: u64,
        primary_vetoed: u64,
        coincident: u64,
        qualifying: u64,
        significances: BTreeMap<String, f64>,
    ) -> Round {
        let efficiency = (primary_vetoed, primary_before);
        let deadtime = (vetoes.duration(), round_livetime);
        let (cum_efficiency, cum_deadtime) = match report.rounds.last() {
            Some(prev) => (
                (
                    primary_vetoed + prev.cum_efficiency.0,
                    report.rounds[0].efficiency.1,
                ),
                (deadtime.0 + prev.cum_deadtime.0, livetime),
            ),
            None => (efficiency, (deadtime.0, livetime)),
        };
        Round {
            n,
            primary_channel: report.primary_channel.clone(),
            rank_column: self.config.rank_column.clone(),
            segments: segments.clone(),
            winner,
            vetoes,
            efficiency,
            use_percentage: (coincident, qualifying),
            deadtime,
            cum_efficiency,
            cum_deadtime,
            significances,
        }
    }
}

fn log_round(round: &Round) {
    info!(
        "Results for round {}: winner={} significance={:.2} mu={:.4} snr={} dt={} \
         use_percentage={:?} efficiency={:?} deadtime=({:.2}, {:.2}) \
         cum_efficiency={:?} cum_deadtime=({:.2}, {:.2})",
        round.n,
        round.winner.name,
        round.winner.significance,
        round.winner.mu,
        round.winner.snr,
        round.winner.window,
        round.use_percentage,
        round.efficiency,
        round.deadtime.0,
        round.deadtime.1,
        round.cum_efficiency,
        round.cum_deadtime.0,
        round.cum_deadtime.1,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::segments::Segment;

    fn channel(name: &str, times_snrs: &[(f64, f64)]) -> EventSet {
        EventSet::new(
            name,
            times_snrs
                .iter()
                .map(|&(t, s)| Event::new(t, 100.0, s))
                .collect(),
        )
    }

    fn full_segments() -> SegmentList {
        SegmentList::from(Segment::new(0.0, 1000.0))
    }

    #[test]
    fn test_no_livetime_is_fatal() {
        let err = Hveto::new()
            .run(
                channel("X1:PRIMARY", &[(1.0, 8.0)]),
                ChannelEvents::new(),
                SegmentList::new(),
            )
            .unwrap_err();
        assert!(matches!(err, HvetoError::NoLivetime));
    }

    #[test]
    fn test_empty_primary_reports_zero_rounds() {
        let report = Hveto::new()
            .run(
                channel("X1:PRIMARY", &[]),
                ChannelEvents::new(),
                full_segments(),
            )
            .unwrap();
        assert!(report.rounds.is_empty());
        assert_eq!(report.primary_count, 0);
    }

    #[test]
    fn test_no_auxiliary_reports_zero_rounds() {
        let report = Hveto::new()
            .run(
                channel("X1:PRIMARY", &[(1.0, 8.0), (2.0, 8.0)]),
                ChannelEvents::new(),
                full_segments(),
            )
            .unwrap();
        assert!(report.rounds.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Hveto::new()
            .snr_thresholds(vec![])
            .run(
                channel("X1:PRIMARY", &[(1.0, 8.0)]),
                ChannelEvents::new(),
                full_segments(),
            )
            .unwrap_err();
        assert!(matches!(err, HvetoError::InvalidThresholds(_)));
    }

    #[test]
    fn test_scenario_round() {
        // Primary [1, 2, 3, 100], aux [1.05, 2.02, 50] at snr 10,
        // thresholds [5], windows [0.1], livetime 1000.
        let primary = channel(
            "X1:PRIMARY",
            &[(1.0, 8.0), (2.0, 8.0), (3.0, 8.0), (100.0, 8.0)],
        );
        let mut aux = ChannelEvents::new();
        aux.insert(
            "X1:AUX-A".into(),
            channel("X1:AUX-A", &[(1.05, 10.0), (2.02, 10.0), (50.0, 10.0)]),
        );

        let report = Hveto::new()
            .snr_thresholds(vec![5.0])
            .time_windows(vec![0.1])
            .minimum_significance(3.0)
            .run(primary, aux, full_segments())
            .unwrap();

        assert!(!report.rounds.is_empty());
        let r1 = &report.rounds[0];
        assert_eq!(r1.winner.name, "X1:AUX-A");
        assert!((r1.winner.mu - 0.0024).abs() < 1e-12);
        // vetoed primary events: 1.0 and 2.0; surviving: 3.0 and 100.0
        assert_eq!(r1.efficiency, (2, 4));
        assert_eq!(r1.use_percentage, (2, 3));
        // three disjoint 0.2 s windows
        assert_eq!(r1.vetoes.len(), 3);
        assert!((r1.vetoes.duration() - 0.6).abs() < 1e-9);
        assert!(r1.vetoes.contains(1.05));
        assert!(r1.vetoes.contains(2.02));
        assert!(r1.vetoes.contains(50.0));
        assert!(!r1.vetoes.contains(3.0));
    }

    #[test]
    fn test_stopping_above_max_significance() {
        let primary = channel("X1:PRIMARY", &[(1.0, 8.0), (2.0, 8.0)]);
        let mut aux = ChannelEvents::new();
        aux.insert(
            "X1:AUX-A".into(),
            channel("X1:AUX-A", &[(1.01, 10.0), (2.01, 10.0)]),
        );
        let report = Hveto::new()
            .snr_thresholds(vec![5.0])
            .time_windows(vec![0.1])
            .minimum_significance(1e9)
            .run(primary, aux, full_segments())
            .unwrap();
        assert!(report.rounds.is_empty());
    }

    #[test]
    fn test_primary_count_non_increasing_and_cumulative_bookkeeping() {
        // two correlated channels explaining disjoint subsets of the primary
        let mut primary_events: Vec<(f64, f64)> = Vec::new();
        let mut aux_a = Vec::new();
        let mut aux_b = Vec::new();
        for i in 0..40 {
            let t = 10.0 + i as f64 * 20.0;
            primary_events.push((t, 8.0));
            if i < 25 {
                aux_a.push((t + 0.02, 12.0));
            } else {
                aux_b.push((t - 0.03, 12.0));
            }
        }
        let mut aux = ChannelEvents::new();
        aux.insert("X1:AUX-A".into(), channel("X1:AUX-A", &aux_a));
        aux.insert("X1:AUX-B".into(), channel("X1:AUX-B", &aux_b));

        let report = Hveto::new()
            .snr_thresholds(vec![5.0])
            .time_windows(vec![0.1])
            .minimum_significance(3.0)
            .run(
                channel("X1:PRIMARY", &primary_events),
                aux,
                full_segments(),
            )
            .unwrap();

        assert_eq!(report.rounds.len(), 2);
        // the stronger channel wins round 1
        assert_eq!(report.rounds[0].winner.name, "X1:AUX-A");
        assert_eq!(report.rounds[0].efficiency, (25, 40));
        assert_eq!(report.rounds[1].winner.name, "X1:AUX-B");
        assert_eq!(report.rounds[1].efficiency, (15, 15));

        // cumulative efficiency is against the round-1 denominator
        assert_eq!(report.rounds[1].cum_efficiency, (40, 40));
        assert!((report.total_efficiency() - 1.0).abs() < 1e-12);

        // cumulative deadtime equals the sum of per-round veto durations
        let total_vetoed: f64 = report.rounds.iter().map(|r| r.vetoes.duration()).sum();
        assert!(
            (report.rounds.last().unwrap().cum_deadtime.0 - total_vetoed).abs() < 1e-9
        );

        // livetime shrinks round over round
        assert!(report.rounds[1].livetime() < report.rounds[0].livetime());
    }

    #[test]
    fn test_events_outside_segments_are_discarded() {
        let primary = channel("X1:PRIMARY", &[(1.0, 8.0), (2000.0, 8.0)]);
        let report = Hveto::new()
            .run(primary, ChannelEvents::new(), full_segments())
            .unwrap();
        assert_eq!(report.primary_count, 1);
    }
}
