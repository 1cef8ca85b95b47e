//! Log output for the CLI.
//!
//! Events are written to stderr so stdout carries only command output. The
//! filter is taken from `RUST_LOG` and defaults to `warn`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let (text, json) = match format {
        LogFormat::Text => (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_timer(fmt::time::ChronoLocal::rfc_3339()),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339()),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(text)
        .with(json)
        .try_init()?;

    Ok(())
}
