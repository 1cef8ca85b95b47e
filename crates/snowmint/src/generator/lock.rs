use alloc::sync::Arc;
use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        IdGenStatus, SnowflakeGenerator, cold_clock_behind, timestamp_since_epoch, validate_epoch,
    },
    id::{MachineId, SnowflakeId},
    mutex::{Mutex, MutexGuard},
    time::{Epoch, TimeSource},
};

/// Mutable generation state, guarded by the generator lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct GeneratorState {
    /// Last Unix epoch millisecond an ID was minted for; `None` until the
    /// first ID.
    last_timestamp: Option<u64>,
    sequence: u64,
}

impl GeneratorState {
    const fn starting_at(now: u64) -> Self {
        Self {
            last_timestamp: Some(now),
            sequence: 0,
        }
    }
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// This generator wraps its state in an [`Arc<Mutex<_>>`], allowing safe
/// shared use across threads. Cloning the generator shares the state.
///
/// ## Recommended When
/// - Fair access across threads is important
/// - Your target doesn't support 64-bit atomics
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<GeneratorState>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<GeneratorState>>,
    machine_id: MachineId,
    epoch: Epoch,
    time: T,
}

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            machine_id: self.machine_id,
            epoch: self.epoch,
            time: self.time.clone(),
        }
    }
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `machine_id` using the default
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

    /// Creates a new [`LockSnowflakeGenerator`] for `machine_id`, measuring
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
    /// use snowmint::{Epoch, LockSnowflakeGenerator, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::with_epoch(7, Epoch::TWITTER, SystemClock).unwrap();
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(generator.extract_machine_id(id), 7);
    /// ```
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    /// [`Error::InvalidEpoch`]: crate::Error::InvalidEpoch
    pub fn with_epoch(machine_id: i64, epoch: Epoch, time: T) -> Result<Self> {
        let machine_id = MachineId::new(machine_id)?;
        let epoch = validate_epoch(epoch)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%machine_id, epoch = epoch.as_millis(), "created lock generator");
        let state = Mutex::new(GeneratorState::default());
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(state),
            machine_id,
            epoch,
            time,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Attempts to generate the next available ID.
    ///
    /// The clock is sampled while holding the lock, so a caller that waited
    /// on the lock never sees a time older than the one its predecessor
    /// recorded.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The sequence is exhausted
    ///   for the current millisecond
    ///
    /// # Errors
    /// - [`Error::ClockMovedBackwards`] when the clock regressed
    /// - [`Error::ClockBeforeEpoch`] / [`Error::TimestampOverflow`] when the
    ///   current time cannot be encoded
    /// - [`Error::LockPoisoned`] if the lock has been poisoned
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();

        let next = match state.last_timestamp {
            Some(last) => match now.cmp(&last) {
                Ordering::Equal => {
                    if state.sequence < SnowflakeId::max_sequence() {
                        GeneratorState {
                            last_timestamp: Some(last),
                            sequence: state.sequence + 1,
                        }
                    } else {
                        return Ok(IdGenStatus::Pending { yield_for: 1 });
                    }
                }
                Ordering::Greater => GeneratorState::starting_at(now),
                Ordering::Less => return Err(cold_clock_behind(last, now)),
            },
            None => GeneratorState::starting_at(now),
        };

        // Validate before committing so a failure leaves the state untouched.
        let timestamp = timestamp_since_epoch(now, self.epoch)?;
        *state = next;

        Ok(IdGenStatus::Ready {
            id: SnowflakeId::from_components(
                timestamp,
                u64::from(self.machine_id.get()),
                next.sequence,
            ),
        })
    }
}

impl<T> SnowflakeGenerator<T> for LockSnowflakeGenerator<T>
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
