use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// This keeps the async generator loop independent of the runtime.
pub trait SleepProvider {
    /// Returns a future that completes after roughly `dur`. The future must be
    /// `Send` so generation can move across worker threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
