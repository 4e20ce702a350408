//! Windowed coincidence matching between two sorted time sequences.

/// Flag which elements of `times_a` lie within `window` seconds of any
/// element of `times_b`.
///
/// The window is symmetric and closed: `a` coincides with `b` when
/// `|a - b| <= window`. Both inputs must be in ascending order (event sets
/// maintain this invariant); each lookup is then a binary search, keeping
/// the full scan O((n + m) log m) even for >10^5 events per side.
///
/// # Arguments
///
/// * `times_a` - Ascending times to classify
/// * `times_b` - Ascending times to match against
/// * `window` - Half-width of the coincidence window in seconds
///
/// # Returns
///
/// One boolean per element of `times_a`, true iff it has a coincident
/// partner in `times_b`.
pub fn find_coincidences(times_a: &[f64], times_b: &[f64], window: f64) -> Vec<bool> {
    debug_assert!(window >= 0.0);
    times_a
        .iter()
        .map(|&a| {
            let idx = times_b.partition_point(|&b| b < a - window);
            times_b.get(idx).map_or(false, |&b| b <= a + window)
        })
        .collect()
}

/// Count the elements of `times_a` with a coincident partner in `times_b`.
pub fn count_coincidences(times_a: &[f64], times_b: &[f64], window: f64) -> u64 {
    find_coincidences(times_a, times_b, window)
        .into_iter()
        .filter(|&c| c)
        .count() as u64
}
