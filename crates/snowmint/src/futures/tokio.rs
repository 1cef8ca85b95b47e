use core::{future::Future, time::Duration};

use crate::{
    error::Result,
    futures::{SleepProvider, SnowflakeGeneratorAsyncExt},
    generator::SnowflakeGenerator,
    id::SnowflakeId,
    time::TimeSource,
};

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        ::tokio::time::sleep(dur)
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately, which can improve responsiveness in low-concurrency scenarios
/// at the cost of tighter polling loops and higher CPU usage under load.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        ::tokio::task::yield_now()
    }
}

/// Convenience wrapper over [`SnowflakeGeneratorAsyncExt`] that sleeps on the
/// Tokio timer.
pub trait SnowflakeGeneratorTokioExt<T>: SnowflakeGeneratorAsyncExt<T>
where
    T: TimeSource,
{
    /// Returns a future that resolves to the next available Snowflake ID,
    /// sleeping with [`TokioSleep`] while the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// Resolves to an error if the generator returns one.
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>> + Send {
        self.try_next_id_async::<TokioSleep>()
    }
}

impl<G, T> SnowflakeGeneratorTokioExt<T> for G
where
    G: SnowflakeGenerator<T> + Sync,
    T: TimeSource,
{
}
