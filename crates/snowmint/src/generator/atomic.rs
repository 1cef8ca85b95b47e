use core::cmp;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        IdGenStatus, SnowflakeGenerator, cold_clock_behind, timestamp_since_epoch, validate_epoch,
    },
    id::{MachineId, SnowflakeId},
    time::{Epoch, TimeSource},
};

/// State word before the first ID is minted. The reserved bit is set, so no
/// valid ID can collide with it.
const UNSET: u64 = u64::MAX;

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last minted ID doubles as the generator state: its timestamp and
/// sequence fields are the `(last_timestamp, sequence)` pair, stored in one
/// [`AtomicU64`] and advanced with a single compare-and-swap.
///
/// ## Recommended When
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    machine_id: MachineId,
    epoch: Epoch,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `machine_id` using the default
    /// [`Epoch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is outside
    /// `[0, 1023]`.
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    pub fn new(machine_id: i64, time: T) -> Result<Self> {
        Self::with_epoch(machine_id, Epoch::default(), time)
    }

    /// Creates a new [`AtomicSnowflakeGenerator`] for `machine_id`, measuring
    /// timestamps from `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` is outside
    /// `[0, 1023]`, or [`Error::InvalidEpoch`] if `epoch` is past
    /// [`Epoch::MAX`].
    ///
    /// # Example
    /// ```
    /// use snowmint::{AtomicSnowflakeGenerator, Epoch, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = AtomicSnowflakeGenerator::with_epoch(3, Epoch::DISCORD, SystemClock).unwrap();
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    /// ```
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    /// [`Error::InvalidEpoch`]: crate::Error::InvalidEpoch
    pub fn with_epoch(machine_id: i64, epoch: Epoch, time: T) -> Result<Self> {
        let machine_id = MachineId::new(machine_id)?;
        let epoch = validate_epoch(epoch)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%machine_id, epoch = epoch.as_millis(), "created atomic generator");
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(UNSET)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(UNSET),
            machine_id,
            epoch,
            time,
        })
    }

    /// Attempts to generate the next available ID.
    ///
    /// The state is loaded before the clock is sampled, so a competing
    /// thread's newer timestamp is either visible here or makes our CAS fail.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for: 1 })`: The sequence is
    ///   exhausted for the current millisecond
    /// - `Ok(IdGenStatus::Pending { yield_for: 0 })`: Another thread won the
    ///   CAS; retry immediately
    ///
    /// # Errors
    /// - [`Error::ClockMovedBackwards`] when the clock regressed
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] when the
    ///   current time cannot be encoded
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();

        let next_id = if current_raw == UNSET {
            SnowflakeId::from_components(
                timestamp_since_epoch(now, self.epoch)?,
                u64::from(self.machine_id.get()),
                0,
            )
        } else {
            let current_id = SnowflakeId::from_raw(current_raw);
            let last = current_id.timestamp() + self.epoch.as_millis();
            match now.cmp(&last) {
                cmp::Ordering::Equal => {
                    if current_id.has_sequence_room() {
                        current_id.increment_sequence()
                    } else {
                        return Ok(IdGenStatus::Pending { yield_for: 1 });
                    }
                }
                cmp::Ordering::Greater => {
                    current_id.rollover_to_timestamp(timestamp_since_epoch(now, self.epoch)?)
                }
                cmp::Ordering::Less => return Err(cold_clock_behind(last, now)),
            }
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next_id })
        } else {
            // CAS failed - another thread won the race. Yield 0 to retry
            // immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T> SnowflakeGenerator<T> for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn with_epoch(machine_id: i64, epoch: Epoch, time: T) -> Result<Self> {
        Self::with_epoch(machine_id, epoch, time)
    }

    fn machine_id(&self) -> MachineId {
        self.machine_id
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id()
    }
}
