use std::io::Write;

use anyhow::{Context, bail};
use snowmint::{
    AtomicSnowflakeGenerator, Epoch, LockSnowflakeGenerator, MachineId, MonotonicClock,
    SnowflakeGenerator, SnowflakeId, TimeSource, datetime,
};

use crate::config::GeneratorKind;

/// Mints `count` IDs with the requested generator and writes one per line.
pub fn generate(
    out: &mut impl Write,
    kind: GeneratorKind,
    machine_id: MachineId,
    epoch: Epoch,
    count: usize,
) -> anyhow::Result<()> {
    let machine_id = i64::from(machine_id.get());
    let clock = MonotonicClock::default();
    match kind {
        GeneratorKind::Lock => write_ids(
            out,
            &LockSnowflakeGenerator::with_epoch(machine_id, epoch, clock)?,
            count,
        ),
        GeneratorKind::Atomic => write_ids(
            out,
            &AtomicSnowflakeGenerator::with_epoch(machine_id, epoch, clock)?,
            count,
        ),
    }
}

fn write_ids<G, T>(out: &mut impl Write, generator: &G, count: usize) -> anyhow::Result<()>
where
    G: SnowflakeGenerator<T>,
    T: TimeSource,
{
    tracing::info!(count, machine_id = %generator.machine_id(), "generating ids");
    for _ in 0..count {
        writeln!(out, "{}", generator.next_id()?)?;
    }
    out.flush()?;
    Ok(())
}

/// Decodes each input and writes one line per ID. Invalid inputs are logged
/// and skipped; the command fails afterwards if any were seen.
pub fn decode(out: &mut impl Write, ids: &[String], epoch: Epoch) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for input in ids {
        match input.parse::<SnowflakeId>() {
            Ok(id) => writeln!(out, "{}", describe(id, epoch))?,
            Err(e) => {
                tracing::error!(input = %input, "{e}");
                failed += 1;
            }
        }
    }
    out.flush().context("failed to flush output")?;

    if failed > 0 {
        bail!("{failed} of {} ids could not be decoded", ids.len());
    }
    Ok(())
}

fn describe(id: SnowflakeId, epoch: Epoch) -> String {
    let millis = epoch.to_unix_millis(id.timestamp());
    let iso = millis
        .and_then(|ms| i64::try_from(ms).ok())
        .and_then(datetime::to_iso_string)
        .unwrap_or_else(|| "-".to_owned());
    let millis = millis.map_or_else(|| "-".to_owned(), |ms| ms.to_string());
    format!(
        "{id}\ttimestamp={millis}\tdatetime={iso}\tmachine_id={}\tsequence={}",
        id.machine_id(),
        id.sequence()
    )
}
