//! Error types for the hveto analysis.

use thiserror::Error;

/// Errors raised when configuring or running a hierarchical veto analysis.
#[derive(Debug, Error)]
pub enum HvetoError {
    /// The SNR threshold list is empty or not strictly ascending.
    #[error("invalid snr-thresholds: {0}")]
    InvalidThresholds(String),

    /// The time window list is empty, non-positive, or not strictly ascending.
    #[error("invalid time-windows: {0}")]
    InvalidWindows(String),

    /// The minimum significance is not a finite number.
    #[error("invalid minimum-significance: {0}")]
    InvalidMinimumSignificance(f64),

    /// The analysis segment list carries no livetime, so no round can run.
    #[error("analysis segments contain no livetime")]
    NoLivetime,

    /// A segment file or string could not be parsed.
    #[error("failed to parse segments: {0}")]
    SegmentParse(String),
}
