use crate::id::SnowflakeId;

/// Represents the result of polling a generator for a new ID.
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce a new ID
///   until the clock advances (or, for the atomic generator, until a lost
///   race is retried).
///
/// This allows non-blocking generation loops and custom backoff strategies.
/// [`SnowflakeGenerator::next_id`] is the blocking loop most callers want.
///
/// # Example
///
/// ```
/// use snowmint::{Epoch, IdGenStatus, LockSnowflakeGenerator, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::with_epoch(0, Epoch::UNIX, FixedTime).unwrap();
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {}", id.timestamp()),
///     IdGenStatus::Pending { yield_for } => println!("Back off for: {yield_for} ms"),
/// }
/// ```
///
/// [`SnowflakeGenerator::next_id`]: crate::SnowflakeGenerator::next_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated right now.
    Pending {
        /// Milliseconds to wait before polling again. `0` means retry
        /// immediately.
        yield_for: u64,
    },
}
