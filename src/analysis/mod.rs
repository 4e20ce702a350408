//! The algorithmic layers of one veto round.
//!
//! 1. **Coincidence** ([`coincidence`]): windowed matching of two sorted
//!    time sequences.
//! 2. **Winner search** ([`search`]): the (channel x SNR threshold x time
//!    window) grid scan, parallel across channels.
//! 3. **Veto application** ([`veto`]): partitioning event sets by segment
//!    membership.

mod coincidence;
mod search;
mod veto;

pub use coincidence::{count_coincidences, find_coincidences};
pub use search::find_max_significance;
pub use veto::{veto, veto_all};
