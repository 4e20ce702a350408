//! Applying veto segments to event sets.

use crate::events::{ChannelEvents, EventSet};
use crate::segments::SegmentList;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::thread_pool;

/// Partition an event set into (surviving, vetoed) by segment membership.
///
/// The partition is total and disjoint: every event lands in exactly one of
/// the two outputs, decided by whether its time falls inside any veto
/// segment. Both outputs keep the input's time order.
pub fn veto(events: &EventSet, veto_segments: &SegmentList) -> (EventSet, EventSet) {
    let (vetoed, surviving): (Vec<_>, Vec<_>) = events
        .events()
        .iter()
        .copied()
        .partition(|e| veto_segments.contains(e.time));
    (
        EventSet::new(events.channel(), surviving),
        EventSet::new(events.channel(), vetoed),
    )
}

/// Apply vetoes to every channel, keeping only the surviving events.
///
/// The vetoed side is discarded here: only the primary channel's vetoed
/// events matter for reporting, and the primary is handled separately by
/// the round loop.
pub fn veto_all(channels: &ChannelEvents, veto_segments: &SegmentList) -> ChannelEvents {
    thread_pool::install(|| {
        #[cfg(feature = "parallel")]
        {
            channels
                .par_iter()
                .map(|(name, events)| (name.clone(), veto(events, veto_segments).0))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            channels
                .iter()
                .map(|(name, events)| (name.clone(), veto(events, veto_segments).0))
                .collect()
        }
    })
}
