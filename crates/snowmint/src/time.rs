use alloc::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::id::SnowflakeId;

/// A fixed reference instant, in milliseconds since the Unix epoch.
///
/// Timestamps inside a [`SnowflakeId`] are stored as an offset from the
/// generator's epoch, which keeps the 41-bit field valid for roughly 69 years
/// after it.
///
/// [`SnowflakeId`]: crate::SnowflakeId
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    /// Project epoch: Wednesday, January 1, 2025 00:00:00 UTC
    pub const CUSTOM: Self = Self(1_735_689_600_000);

    /// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
    pub const TWITTER: Self = Self(1_288_834_974_657);

    /// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
    pub const DISCORD: Self = Self(1_420_070_400_000);

    /// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
    pub const UNIX: Self = Self(0);

    /// Latest epoch for which every 41-bit timestamp still maps to a `u64`
    /// Unix millisecond.
    pub const MAX: Self = Self(u64::MAX - SnowflakeId::max_timestamp());

    /// Creates an epoch from Unix epoch milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the epoch in Unix epoch milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Converts a timestamp field measured from this epoch back to Unix epoch
    /// milliseconds, or `None` if the sum overflows.
    pub const fn to_unix_millis(self, timestamp: u64) -> Option<u64> {
        self.0.checked_add(timestamp)
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::CUSTOM
    }
}

impl From<u64> for Epoch {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// This abstraction allows you to plug in the system clock, a non-regressing
/// ticker, or a mocked time source in tests.
///
/// # Example
///
/// ```
/// use snowmint::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// The host wall clock, sampled on every call.
///
/// This clock follows the system time and can therefore move backwards when
/// the host clock is stepped (e.g., by NTP). Generators report such a step as
/// [`Error::ClockMovedBackwards`]. Use [`MonotonicClock`] when that is not
/// acceptable.
///
/// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_millis(SystemTime::now())
    }
}

/// Milliseconds between the Unix epoch and `time`, saturating at zero for
/// times before it.
pub(crate) fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
