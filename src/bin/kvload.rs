//! kvload Binary
//!
//! Loads the key space, then runs the workload until killed (or for
//! `--duration-secs`). Exits non-zero on the first fatal failure.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use kvload::config::WorkloadConfigBuilder;
use kvload::{Durability, Harness, Preset, ReadMode, Store, WriteMode};
use tracing_subscriber::{fmt, EnvFilter};

/// kvload workload harness
#[derive(Parser, Debug)]
#[command(name = "kvload")]
#[command(about = "Concurrent read/write workload and consistency harness for the embedded store")]
#[command(version)]
struct Args {
    /// Data directory for the store
    #[arg(default_value = "./kvload_data")]
    data_dir: String,

    /// Starting point for every other flag
    #[arg(short, long, value_enum, default_value = "verify")]
    preset: PresetArg,

    /// Number of ids to load, [0, N)
    #[arg(short = 'n', long)]
    population: Option<u64>,

    /// Value size in bytes
    #[arg(short = 's', long)]
    value_size: Option<usize>,

    /// Number of concurrent readers
    #[arg(short, long)]
    readers: Option<usize>,

    /// Writer pause after each write, in microseconds (0 = uncapped)
    #[arg(short = 'w', long)]
    write_delay_us: Option<u64>,

    /// Throughput reporting interval in seconds
    #[arg(short, long)]
    interval_secs: Option<u64>,

    #[arg(long, value_enum)]
    read_mode: Option<ReadModeArg>,

    #[arg(long, value_enum)]
    write_mode: Option<WriteModeArg>,

    #[arg(long, value_enum)]
    durability: Option<DurabilityArg>,

    /// Base RNG seed for reproducible key sequences
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds instead of running until killed
    #[arg(short, long)]
    duration_secs: Option<u64>,

    /// Filler character for values
    #[arg(long)]
    fill: Option<char>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Verify,
    Seek,
    Throughput,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReadModeArg {
    Point,
    Verify,
    Seek,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WriteModeArg {
    Point,
    Batch,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DurabilityArg {
    Wal,
    NoWal,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvload=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("kvload v{}", kvload::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            std::process::exit(2);
        }
    };

    let harness = match Harness::open(config) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };
    let store = harness.store().clone();

    let outcome = harness.run();
    if let Err(e) = store.close() {
        tracing::error!("Failed to close store: {}", e);
    }

    match outcome {
        Ok(summary) => {
            tracing::info!(
                writes = summary.totals.writes,
                reads = summary.totals.reads,
                "run complete"
            );
        }
        Err(e) if e.is_worker_failure() => {
            tracing::info!("exiting after fatal worker failure");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build_config(args: &Args) -> Result<kvload::WorkloadConfig, String> {
    let preset = match args.preset {
        PresetArg::Verify => Preset::Verify,
        PresetArg::Seek => Preset::Seek,
        PresetArg::Throughput => Preset::Throughput,
    };

    let mut builder = WorkloadConfigBuilder::preset(preset).data_dir(&args.data_dir);

    if let Some(n) = args.population {
        builder = builder.population(n);
    }
    if let Some(size) = args.value_size {
        builder = builder.value_size(size);
    }
    if let Some(readers) = args.readers {
        builder = builder.readers(readers);
    }
    if let Some(us) = args.write_delay_us {
        builder = builder.write_delay(Duration::from_micros(us));
    }
    if let Some(secs) = args.interval_secs {
        builder = builder.interval(Duration::from_secs(secs));
    }
    if let Some(mode) = args.read_mode {
        builder = builder.read_mode(match mode {
            ReadModeArg::Point => ReadMode::Point,
            ReadModeArg::Verify => ReadMode::VerifiedPoint,
            ReadModeArg::Seek => ReadMode::Seek,
        });
    }
    if let Some(mode) = args.write_mode {
        builder = builder.write_mode(match mode {
            WriteModeArg::Point => WriteMode::Point,
            WriteModeArg::Batch => WriteMode::Batch,
        });
    }
    if let Some(durability) = args.durability {
        builder = builder.durability(match durability {
            DurabilityArg::Wal => Durability::Wal,
            DurabilityArg::NoWal => Durability::NoWal,
        });
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(secs) = args.duration_secs {
        builder = builder.run_for(Duration::from_secs(secs));
    }
    if let Some(fill) = args.fill {
        let byte = u8::try_from(fill)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| format!("fill character {fill:?} is not ASCII"))?;
        builder = builder.fill(byte);
    }

    let config = builder.build();
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
