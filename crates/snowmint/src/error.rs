#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `snowmint` can emit.
///
/// Configuration errors ([`Error::InvalidMachineId`], [`Error::InvalidEpoch`])
/// are raised at construction time. Clock errors are raised per call and never
/// mutate the generator state, so a later call proceeds normally once the
/// clock is sane again.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The machine ID does not fit in the 10-bit machine field.
    #[error("machine id {machine_id} is out of range (must be between 0 and {max})")]
    InvalidMachineId {
        /// The rejected value.
        machine_id: i64,
        /// The largest accepted machine ID.
        max: u16,
    },

    /// The epoch is so late that adding a 41-bit timestamp to it would
    /// overflow a `u64`.
    #[error("epoch {epoch} ms is out of range (must be at most {max})")]
    InvalidEpoch {
        /// The rejected epoch, in Unix epoch milliseconds.
        epoch: u64,
        /// The latest accepted epoch.
        max: u64,
    },

    /// The time source reported a time earlier than the last timestamp used
    /// to mint an ID.
    ///
    /// The generator refuses to mint rather than risk reissuing an ID.
    #[error("clock moved backwards, refusing to generate id for {behind_by} milliseconds")]
    ClockMovedBackwards {
        /// Last timestamp used, in Unix epoch milliseconds.
        last: u64,
        /// The sampled time, in Unix epoch milliseconds.
        now: u64,
        /// `last - now`.
        behind_by: u64,
    },

    /// The time source reported a time before the configured epoch.
    #[error("clock ({now} ms) is before the configured epoch ({epoch} ms)")]
    ClockBeforeEpoch {
        /// The sampled time, in Unix epoch milliseconds.
        now: u64,
        /// The configured epoch, in Unix epoch milliseconds.
        epoch: u64,
    },

    /// The elapsed time since the epoch no longer fits the 41-bit timestamp
    /// field.
    #[error("timestamp {timestamp} exceeds the maximum encodable value {max}")]
    TimestampOverflow {
        /// Milliseconds since the configured epoch.
        timestamp: u64,
        /// The largest encodable timestamp.
        max: u64,
    },

    /// The generator lock was poisoned by a panicking holder.
    ///
    /// Not available with the `parking-lot` feature, whose mutexes do not
    /// poison.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A string could not be parsed as an ID.
    #[error("invalid snowflake id {input:?}")]
    InvalidId {
        /// The rejected input.
        input: String,
    },

    /// A string could not be parsed as an ISO-8601 date-time.
    #[error("invalid date-time {input:?}: {reason}")]
    InvalidDateTime {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
