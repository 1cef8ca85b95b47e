use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use snowmint::{Epoch, MachineId, SnowflakeId, SystemClock, TimeSource};

/// Runtime configuration for the `snowmint` binary.
///
/// Global settings are parsed from CLI arguments or environment variables
/// (including any loaded from `.env`).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint",
    version,
    about = "Mint and decode 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Machine ID embedded in minted IDs, between 0 and 1023.
    ///
    /// Every process generating IDs concurrently must use a distinct value.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(
        long,
        global = true,
        env = "MACHINE_ID",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub machine_id: i64,

    /// Custom epoch in Unix milliseconds. Defaults to 2025-01-01T00:00:00Z.
    ///
    /// Decoding must use the same epoch the IDs were minted with.
    ///
    /// Environment variable: `SNOWFLAKE_EPOCH`
    #[arg(long, global = true, env = "SNOWFLAKE_EPOCH")]
    pub epoch: Option<u64>,

    /// Log output format. Logs go to stderr; filter with `RUST_LOG`.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(
        long,
        global = true,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint new IDs, one per line.
    Generate {
        /// Number of IDs to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Generator strategy.
        #[arg(short, long, value_enum, default_value_t = GeneratorKind::Lock)]
        generator: GeneratorKind,
    },
    /// Decode existing IDs into their timestamp, machine ID and sequence.
    Decode {
        /// Decimal IDs to decode.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Mutex-guarded state.
    Lock,
    /// Lock-free compare-and-swap state.
    Atomic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub machine_id: MachineId,
    pub epoch: Epoch,
    pub log_format: LogFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let Ok(machine_id) = MachineId::new(args.machine_id) else {
            bail!(
                "MACHINE_ID ({}) must be between 0 and {}",
                args.machine_id,
                MachineId::MAX
            );
        };

        let epoch = args.epoch.map_or_else(Epoch::default, Epoch::from_millis);
        if epoch > Epoch::MAX {
            bail!(
                "SNOWFLAKE_EPOCH ({}) must be at most {}",
                epoch.as_millis(),
                Epoch::MAX.as_millis()
            );
        }

        if let Command::Generate { count, .. } = args.command {
            if count == 0 {
                bail!("--count must be greater than 0");
            }

            let now = SystemClock.current_millis();
            if epoch.as_millis() > now {
                bail!(
                    "SNOWFLAKE_EPOCH ({}) is in the future (now = {})",
                    epoch.as_millis(),
                    now
                );
            }
            if now - epoch.as_millis() > SnowflakeId::max_timestamp() {
                bail!(
                    "SNOWFLAKE_EPOCH ({}) is too far in the past to encode the current time",
                    epoch.as_millis()
                );
            }
        }

        Ok(Self {
            machine_id,
            epoch,
            log_format: args.log_format,
            command: args.command,
        })
    }
}
