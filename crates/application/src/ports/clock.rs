use std::time::Instant;

/// Source of "now" for expiry decisions.
///
/// Grant and cache expiry read time through this port so tests can move it
/// by hand instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by the tokio timer, so a paused test runtime also
/// pauses expiry.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
