use crate::{
    error::Result,
    generator::IdGenStatus,
    id::{MachineId, SnowflakeId},
    time::{Epoch, TimeSource},
};

/// A thread-safe Snowflake ID generator.
///
/// Implementations serialize concurrent callers so that no two calls on the
/// same instance observe the same `(timestamp, sequence)` pair, and IDs from
/// calls that complete one after another strictly increase.
pub trait SnowflakeGenerator<T: TimeSource> {
    /// Creates a generator for `machine_id` using the default [`Epoch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is outside
    /// `[0, 1023]`.
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    fn new(machine_id: i64, time: T) -> Result<Self>
    where
        Self: Sized,
    {
        Self::with_epoch(machine_id, Epoch::default(), time)
    }

    /// Creates a generator for `machine_id` with a custom epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is outside
    /// `[0, 1023]`, or [`Error::InvalidEpoch`] if `epoch` is past
    /// [`Epoch::MAX`].
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    /// [`Error::InvalidEpoch`]: crate::Error::InvalidEpoch
    fn with_epoch(machine_id: i64, epoch: Epoch, time: T) -> Result<Self>
    where
        Self: Sized;

    /// The machine ID encoded into every ID.
    fn machine_id(&self) -> MachineId;

    /// The reference instant timestamps are measured from.
    fn epoch(&self) -> Epoch;

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock is behind the last
    ///   timestamp used
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] if the
    ///   current time cannot be encoded
    /// - [`Error::LockPoisoned`] for the lock-based generator
    ///
    /// The generator state is left untouched on every error path.
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Generates the next ID, spinning until the clock advances if the
    /// sequence for the current millisecond is exhausted.
    ///
    /// The busy-wait has no timeout and yields the thread between attempts;
    /// the generator is not held while yielding.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::try_poll_id`].
    fn next_id(&self) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { .. } => std::thread::yield_now(),
            }
        }
    }

    /// Returns the Unix epoch milliseconds at which `id` was minted.
    ///
    /// Saturates at `u64::MAX` for epochs past [`Epoch::MAX`], which the
    /// generators in this crate refuse at construction.
    fn extract_timestamp(&self, id: SnowflakeId) -> u64 {
        self.epoch()
            .to_unix_millis(id.timestamp())
            .unwrap_or(u64::MAX)
    }

    /// Returns the machine ID encoded in `id`.
    fn extract_machine_id(&self, id: SnowflakeId) -> u16 {
        id.machine_id() as u16
    }

    /// Returns the sequence number encoded in `id`.
    fn extract_sequence(&self, id: SnowflakeId) -> u16 {
        id.sequence() as u16
    }

    /// Returns the UTC date-time at which `id` was minted.
    #[cfg(feature = "chrono")]
    fn extract_datetime(&self, id: SnowflakeId) -> Option<chrono::DateTime<chrono::Utc>> {
        let millis = i64::try_from(self.extract_timestamp(id)).ok()?;
        crate::datetime::to_utc(millis)
    }
}
