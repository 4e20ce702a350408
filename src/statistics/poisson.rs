//! Poisson significance of coincidence counts.

use statrs::function::gamma::{gamma_lr, ln_gamma};

use std::f64::consts::LN_10;

/// Significance of observing `n` coincidences when `mu` were expected.
///
/// Under an independence (Poisson) null hypothesis the survival probability
/// of seeing `n` or more events with mean `mu` is the regularised lower
/// incomplete gamma function `P(n, mu)`. The significance is its negative
/// base-10 logarithm: larger means less likely to be accidental.
///
/// Sub-chance counts earn no veto credit: the result is exactly `0.0`
/// whenever `n == 0` or `n < mu`. Counting exactly the expected number
/// still scores positive, since the survival probability is below one.
///
/// When the survival probability underflows to zero (huge `n`, small `mu`)
/// the score is continued with the Stirling form of the leading term of the
/// survival sum, keeping the result large but finite. `mu == 0` is clamped
/// to the smallest positive double for the same reason.
///
/// # Examples
///
/// ```
/// use hveto::statistics::significance;
///
/// assert_eq!(significance(1, 100.0), 0.0);
/// assert!((significance(1, 1.0) - 0.19920008462778135).abs() < 1e-9);
/// ```
pub fn significance(n: u64, mu: f64) -> f64 {
    let nf = n as f64;
    if n == 0 || nf < mu {
        return 0.0;
    }
    let mu = mu.max(f64::MIN_POSITIVE);
    let survival = gamma_lr(nf, mu);
    let sig = -survival.log10();
    if sig.is_finite() {
        sig
    } else {
        // -log10 of the first term of the survival sum, e^-mu mu^n / n!
        (mu - nf * mu.ln() + ln_gamma(nf + 1.0)) / LN_10
    }
}
