//! # hveto
//!
//! The Hierarchical Veto (hveto) algorithm for gravitational-wave detector
//! characterisation.
//!
//! Given a primary channel's glitch events and a collection of auxiliary
//! channel event streams, the analysis repeatedly finds the (auxiliary
//! channel, SNR threshold, time window) combination that most statistically
//! explains primary-channel noise, removes the explained events and the
//! associated time, and repeats until no combination's Poisson significance
//! exceeds a stopping threshold.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hveto::{Hveto, EventSet, ChannelEvents, Segment, SegmentList};
//!
//! # let primary = EventSet::new("X1:PRIMARY", vec![]);
//! # let auxiliary = ChannelEvents::new();
//! let analysis = SegmentList::from(Segment::new(0.0, 3600.0));
//!
//! let report = Hveto::new()
//!     .minimum_significance(5.0)
//!     .run(primary, auxiliary, analysis)
//!     .unwrap();
//!
//! for round in &report.rounds {
//!     println!(
//!         "round {}: {} at snr>={} dt={} (significance {:.2})",
//!         round.n, round.winner.name, round.winner.snr,
//!         round.winner.window, round.winner.significance,
//!     );
//! }
//! ```
//!
//! ## Structure
//!
//! Trigger retrieval, data-quality flag queries, and report rendering to
//! HTML live outside this crate: the caller supplies [`EventSet`]s and a
//! [`SegmentList`] of analysable time, and consumes the serializable
//! [`Report`]. The round loop is strictly sequential; within each round
//! the search over channels is parallel (feature `parallel`, on by
//! default).

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod engine;
mod error;
mod result;

// Functional modules
pub mod analysis;
pub mod events;
pub mod output;
pub mod segments;
pub mod statistics;
mod thread_pool;

// Re-exports for public API
pub use config::Config;
pub use engine::Hveto;
pub use error::HvetoError;
pub use events::{ChannelEvents, Event, EventSet};
pub use result::{Report, Round, Winner};
pub use segments::{Segment, SegmentList};
pub use statistics::significance;

/// Convenience function running a full analysis with default configuration.
///
/// Equivalent to `Hveto::new().run(primary, auxiliary, analysis_segments)`.
///
/// # Errors
///
/// Returns [`HvetoError::NoLivetime`] for empty analysis segments; see
/// [`Hveto::run`].
pub fn run(
    primary: EventSet,
    auxiliary: ChannelEvents,
    analysis_segments: SegmentList,
) -> Result<Report, HvetoError> {
    Hveto::new().run(primary, auxiliary, analysis_segments)
}
