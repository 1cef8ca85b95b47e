use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{
    error::Result,
    generator::{IdGenStatus, SnowflakeGenerator},
    id::SnowflakeId,
    time::TimeSource,
};

/// Extension trait for asynchronously generating Snowflake IDs.
///
/// Instead of spinning the thread while the sequence is exhausted, the future
/// sleeps (via a [`SleepProvider`]) for the interval the generator asks for
/// and retries.
pub trait SnowflakeGeneratorAsyncExt<T>
where
    T: TimeSource,
{
    /// Returns a future that resolves to the next available Snowflake ID.
    ///
    /// Dropping the future cancels the wait; no generator state is held
    /// across await points.
    ///
    /// # Errors
    ///
    /// Resolves to an error if the generator returns one, e.g.
    /// [`Error::ClockMovedBackwards`].
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider;
}

impl<G, T> SnowflakeGeneratorAsyncExt<T> for G
where
    G: SnowflakeGenerator<T> + Sync,
    T: TimeSource,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => break Ok(id),
                    IdGenStatus::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
