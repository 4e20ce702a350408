//! Statistical kernels for the veto search.
//!
//! The round search reduces to one numeric primitive: the Poisson
//! significance of an observed coincidence count against the accidental
//! count expected under an independence null hypothesis.

mod poisson;

pub use poisson::significance;
