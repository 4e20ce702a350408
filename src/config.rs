//! Configuration for the hierarchical veto analysis.

use crate::error::HvetoError;

/// Configuration options for [`Hveto`](crate::Hveto).
///
/// The defaults are the stock production tunings: a dense threshold ladder
/// from just above the retrieval SNR floor up to loud-glitch territory, and
/// sub-second to one-second coincidence windows.
#[derive(Debug, Clone)]
pub struct Config {
    /// SNR thresholds to test, strictly ascending (pass `>=`).
    pub snr_thresholds: Vec<f64>,

    /// Coincidence half-windows in seconds, strictly ascending.
    pub time_windows: Vec<f64>,

    /// The significance below which the analysis stops.
    pub minimum_significance: f64,

    /// Name of the event attribute used for ranking (reporting only).
    pub rank_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snr_thresholds: vec![
                7.75, 8.0, 8.5, 9.0, 10.0, 11.0, 12.0, 15.0, 20.0, 40.0, 100.0, 300.0,
            ],
            time_windows: vec![0.1, 0.2, 0.4, 0.8, 1.0],
            minimum_significance: 5.0,
            rank_column: "snr".to_string(),
        }
    }
}

impl Config {
    /// Validate the configuration before the round loop starts.
    ///
    /// Threshold and window lists must be non-empty, finite, and strictly
    /// ascending; windows must be positive; thresholds non-negative; the
    /// stopping significance finite.
    pub fn validate(&self) -> Result<(), HvetoError> {
        if self.snr_thresholds.is_empty() {
            return Err(HvetoError::InvalidThresholds("empty list".into()));
        }
        if self
            .snr_thresholds
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(HvetoError::InvalidThresholds(
                "thresholds must be finite and non-negative".into(),
            ));
        }
        if !is_strictly_ascending(&self.snr_thresholds) {
            return Err(HvetoError::InvalidThresholds(
                "thresholds must be strictly ascending".into(),
            ));
        }
        if self.time_windows.is_empty() {
            return Err(HvetoError::InvalidWindows("empty list".into()));
        }
        if self.time_windows.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(HvetoError::InvalidWindows(
                "windows must be finite and positive".into(),
            ));
        }
        if !is_strictly_ascending(&self.time_windows) {
            return Err(HvetoError::InvalidWindows(
                "windows must be strictly ascending".into(),
            ));
        }
        if !self.minimum_significance.is_finite() {
            return Err(HvetoError::InvalidMinimumSignificance(
                self.minimum_significance,
            ));
        }
        Ok(())
    }
}

fn is_strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}
