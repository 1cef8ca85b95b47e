mod atomic;
mod interface;
mod lock;
mod status;
#[cfg(test)]
mod tests;

pub use atomic::*;
pub use interface::*;
pub use lock::*;
pub use status::*;

use crate::{error::Error, id::SnowflakeId, time::Epoch};

/// Converts Unix epoch milliseconds into the 41-bit timestamp field.
///
/// Fails instead of wrapping when `now` predates the epoch or is too far past
/// it.
pub(crate) fn timestamp_since_epoch(now: u64, epoch: Epoch) -> Result<u64, Error> {
    let epoch = epoch.as_millis();
    let timestamp = now
        .checked_sub(epoch)
        .ok_or(Error::ClockBeforeEpoch { now, epoch })?;
    if timestamp > SnowflakeId::max_timestamp() {
        return Err(Error::TimestampOverflow {
            timestamp,
            max: SnowflakeId::max_timestamp(),
        });
    }
    Ok(timestamp)
}

/// Rejects epochs past [`Epoch::MAX`], so `epoch + timestamp` never overflows
/// for any ID the generator can mint or decode.
pub(crate) fn validate_epoch(epoch: Epoch) -> Result<Epoch, Error> {
    if epoch > Epoch::MAX {
        return Err(Error::InvalidEpoch {
            epoch: epoch.as_millis(),
            max: Epoch::MAX.as_millis(),
        });
    }
    Ok(epoch)
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind(last: u64, now: u64) -> Error {
    let behind_by = last - now;
    #[cfg(feature = "tracing")]
    tracing::warn!(last, now, behind_by, "clock moved backwards, refusing to generate id");
    Error::ClockMovedBackwards {
        last,
        now,
        behind_by,
    }
}
