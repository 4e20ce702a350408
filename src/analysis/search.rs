//! The per-round winner search over (channel, SNR threshold, window).

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analysis::coincidence::count_coincidences;
use crate::events::{ChannelEvents, EventSet};
use crate::result::Winner;
use crate::statistics::significance;
use crate::thread_pool;

/// Find the (channel, SNR threshold, time window) combination with the
/// highest Poisson significance for this round.
///
/// For every auxiliary channel, every threshold, and every window, the
/// channel's events are cut at `snr >= threshold`, the expected accidental
/// count is `mu = n_aux * 2 * window * n_primary / livetime`, the observed
/// count is the number of primary events within `window` of a qualifying
/// auxiliary event, and the significance of observed-vs-expected is scored.
///
/// Tie-breaking is deterministic and documented: channels are scanned in
/// ascending name order, thresholds then windows in ascending order, and a
/// candidate only displaces the incumbent on *strictly* greater
/// significance. The first combination reached in that order therefore wins
/// exact ties, independent of how many worker threads ran the scan.
///
/// # Arguments
///
/// * `primary` - Primary-channel events, already restricted to this round's
///   livetime
/// * `auxiliary` - Surviving auxiliary event sets
/// * `snr_thresholds` - Ascending SNR thresholds to test
/// * `time_windows` - Ascending coincidence half-windows in seconds
/// * `livetime` - Active seconds entering this round (must be positive)
///
/// # Returns
///
/// The global [`Winner`] and each channel's own best significance (the
/// grid used for the round-over-round significance-drop diagnostic).
/// Channels with no events score 0 rather than erroring.
pub fn find_max_significance(
    primary: &EventSet,
    auxiliary: &ChannelEvents,
    snr_thresholds: &[f64],
    time_windows: &[f64],
    livetime: f64,
) -> (Winner, BTreeMap<String, f64>) {
    let primary_times = primary.times();

    let mut channels: Vec<&EventSet> = auxiliary.values().collect();
    channels.sort_by(|a, b| a.channel().cmp(b.channel()));

    let scan = |aux: &EventSet| {
        channel_best(aux, &primary_times, snr_thresholds, time_windows, livetime)
    };

    let partials: Vec<Winner> = thread_pool::install(|| {
        #[cfg(feature = "parallel")]
        {
            channels.par_iter().map(|aux| scan(aux)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            channels.iter().map(|aux| scan(aux)).collect()
        }
    });

    let mut significances = BTreeMap::new();
    let mut winner = Winner::none();
    // channels are in name order, so strict comparison keeps the
    // lexicographically first channel on exact ties
    for partial in partials {
        significances.insert(partial.name.clone(), partial.significance);
        if partial.significance > winner.significance {
            winner = partial;
        }
    }
    // an empty auxiliary map leaves the placeholder winner in place
    if winner.significance < 0.0 {
        winner.significance = 0.0;
    }
    (winner, significances)
}

/// Scan one channel's full threshold x window grid and return its best
/// combination.
fn channel_best(
    aux: &EventSet,
    primary_times: &[f64],
    snr_thresholds: &[f64],
    time_windows: &[f64],
    livetime: f64,
) -> Winner {
    let mut best = Winner {
        name: aux.channel().to_string(),
        ..Winner::none()
    };
    for &snr in snr_thresholds {
        let aux_times = aux.times_above_snr(snr);
        if aux_times.is_empty() {
            // higher thresholds only shrink the set further
            break;
        }
        for &window in time_windows {
            let mu = aux_times.len() as f64 * 2.0 * window * primary_times.len() as f64
                / livetime;
            let observed = count_coincidences(primary_times, &aux_times, window);
            let sig = significance(observed, mu);
            if sig > best.significance {
                best.significance = sig;
                best.snr = snr;
                best.window = window;
                best.mu = mu;
            }
        }
    }
    // empty grids report significance 0, never a negative sentinel
    if best.significance < 0.0 {
        best.significance = 0.0;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use std::collections::HashMap;

    fn channel(name: &str, times_snrs: &[(f64, f64)]) -> EventSet {
        EventSet::new(
            name,
            times_snrs
                .iter()
                .map(|&(t, s)| Event::new(t, 100.0, s))
                .collect(),
        )
    }

    fn aux_map(sets: Vec<EventSet>) -> ChannelEvents {
        sets.into_iter()
            .map(|s| (s.channel().to_string(), s))
            .collect()
    }

    #[test]
    fn test_scenario_single_channel() {
        // primary at [1, 2, 3, 100]; aux at [1.05, 2.02, 50] all snr 10
        let primary = channel("X1:PRIMARY", &[(1.0, 8.0), (2.0, 8.0), (3.0, 8.0), (100.0, 8.0)]);
        let aux = aux_map(vec![channel(
            "X1:AUX-A",
            &[(1.05, 10.0), (2.02, 10.0), (50.0, 10.0)],
        )]);

        let (winner, sigs) = find_max_significance(&primary, &aux, &[5.0], &[0.1], 1000.0);

        assert_eq!(winner.name, "X1:AUX-A");
        assert_eq!(winner.snr, 5.0);
        assert_eq!(winner.window, 0.1);
        // mu = 3 * 0.2 * 4 / 1000
        assert!((winner.mu - 0.0024).abs() < 1e-12);
        // observed(2) >> expected(0.0024)
        assert!(winner.significance > 4.0);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs["X1:AUX-A"], winner.significance);
    }

    #[test]
    fn test_correlated_channel_beats_background() {
        // B fires within 10ms of every primary event; C is uncorrelated
        let primary_times: Vec<f64> = (0..50).map(|i| i as f64 * 10.0).collect();
        let primary = channel(
            "X1:PRIMARY",
            &primary_times.iter().map(|&t| (t, 8.0)).collect::<Vec<_>>(),
        );
        let correlated: Vec<(f64, f64)> =
            primary_times.iter().map(|&t| (t + 0.01, 12.0)).collect();
        let background: Vec<(f64, f64)> =
            (0..50).map(|i| (i as f64 * 9.7 + 3.3, 12.0)).collect();
        let aux = aux_map(vec![
            channel("X1:AUX-CORR", &correlated),
            channel("X1:AUX-RAND", &background),
        ]);

        let (winner, sigs) =
            find_max_significance(&primary, &aux, &[5.0, 10.0], &[0.1, 1.0], 500.0);

        assert_eq!(winner.name, "X1:AUX-CORR");
        assert!(winner.significance > sigs["X1:AUX-RAND"]);
        // the tighter window wins: same count, smaller mu
        assert_eq!(winner.window, 0.1);
        assert_eq!(sigs.len(), 2);
    }

    #[test]
    fn test_empty_auxiliary_channel_scores_zero() {
        let primary = channel("X1:PRIMARY", &[(1.0, 8.0), (2.0, 8.0)]);
        let aux = aux_map(vec![
            channel("X1:AUX-EMPTY", &[]),
            channel("X1:AUX-LOW", &[(1.01, 4.0)]),
        ]);
        let (winner, sigs) =
            find_max_significance(&primary, &aux, &[5.0], &[0.1], 100.0);
        // no channel has a qualifying event, nothing to win
        assert_eq!(winner.significance, 0.0);
        assert_eq!(sigs["X1:AUX-EMPTY"], 0.0);
        assert_eq!(sigs["X1:AUX-LOW"], 0.0);
    }

    #[test]
    fn test_tie_break_is_first_channel_by_name() {
        // identical channels produce identical grids; the lexicographically
        // first name must win
        let events = [(1.0, 10.0), (2.0, 10.0)];
        let primary = channel("X1:PRIMARY", &[(1.0, 8.0), (2.0, 8.0)]);
        let aux = aux_map(vec![
            channel("X1:AUX-B", &events),
            channel("X1:AUX-A", &events),
            channel("X1:AUX-C", &events),
        ]);
        let (winner, _) = find_max_significance(&primary, &aux, &[5.0], &[0.5], 1000.0);
        assert_eq!(winner.name, "X1:AUX-A");
    }

    #[test]
    fn test_tie_break_prefers_lowest_threshold_and_window() {
        // a channel whose events all pass both thresholds and both windows
        // produces the same count everywhere above some floor; the first
        // (threshold, window) pair scanned must be kept among equals
        let primary = channel("X1:PRIMARY", &[(10.0, 8.0)]);
        let aux = aux_map(vec![channel("X1:AUX-A", &[(10.0, 50.0)])]);
        let (winner, _) =
            find_max_significance(&primary, &aux, &[5.0, 10.0], &[0.1, 0.2], 1000.0);
        // mu doubles with the window, so 0.1 strictly wins; both thresholds
        // give identical (count, mu), so the lower one is kept
        assert_eq!(winner.snr, 5.0);
        assert_eq!(winner.window, 0.1);
    }

    #[test]
    fn test_empty_primary_scores_zero() {
        let primary = channel("X1:PRIMARY", &[]);
        let aux = aux_map(vec![channel("X1:AUX-A", &[(1.0, 10.0)])]);
        let (winner, _) = find_max_significance(&primary, &aux, &[5.0], &[0.1], 100.0);
        assert_eq!(winner.significance, 0.0);
    }
}
