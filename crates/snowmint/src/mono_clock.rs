use alloc::sync::Arc;
use core::time::Duration;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::{Instant, SystemTime},
};

use crate::time::{TimeSource, unix_millis};

/// Shared ticker state updated once per millisecond.
#[derive(Debug)]
struct SharedTicker {
    current: AtomicU64,
}

/// A time source that never moves backwards.
///
/// The clock captures the wall-clock time once at construction and from then
/// on advances it using a monotonic timer (`Instant`). It reports Unix epoch
/// milliseconds like [`SystemClock`], but host clock adjustments (e.g., NTP
/// steps) made after construction are not observed, so generators driven by it
/// never hit [`Error::ClockMovedBackwards`].
///
/// A background thread updates a shared atomic counter once per millisecond,
/// which keeps syscalls off the hot path. The thread exits once every clone
/// of the clock has been dropped.
///
/// [`SystemClock`]: crate::SystemClock
/// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTicker>,
    offset: u64, // wall-clock millis at construction
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new ticker anchored to the current wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let a = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    /// assert!(clock.current_millis() >= a);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let offset = unix_millis(SystemTime::now());

        let inner = Arc::new(SharedTicker {
            current: AtomicU64::new(0),
        });

        let weak_inner = Arc::downgrade(&inner);
        thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Sleep until the absolute target time of the next tick
                let target = start + Duration::from_millis(tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to the next tick after the actual time
                tick = now_ms + 1;
            }
        });

        Self { inner, offset }
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the construction-time wall clock plus the monotonic time
    /// elapsed since then.
    fn current_millis(&self) -> u64 {
        self.offset + self.inner.current.load(Ordering::Relaxed)
    }
}
