//! Optional process-wide floating-point-operation counter.
//!
//! Compiled in only under the `flop-count` feature: each bulk pass performs
//! a single atomic add. Disabled builds change no numeric result, they only
//! omit the counter update.

#[cfg(feature = "flop-count")]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "flop-count")]
static FLOP_COUNT: AtomicU64 = AtomicU64::new(0);

/// Record `n` floating-point operations. One call per bulk pass.
#[inline]
pub(crate) fn add_flops(n: u64) {
    #[cfg(feature = "flop-count")]
    FLOP_COUNT.fetch_add(n, Ordering::Relaxed);
    #[cfg(not(feature = "flop-count"))]
    let _ = n;
}

/// Total floating-point operations recorded since start or last reset.
#[cfg(feature = "flop-count")]
pub fn flop_count() -> u64 {
    FLOP_COUNT.load(Ordering::Relaxed)
}

/// Reset the counter to zero.
#[cfg(feature = "flop-count")]
pub fn reset_flop_count() {
    FLOP_COUNT.store(0, Ordering::Relaxed);
}
