//! Configuration for kvload
//!
//! Centralized configuration with sensible defaults. Everything here is
//! built once at startup and never mutated during a run.

use std::path::PathBuf;
use std::time::Duration;

use crate::codec::{self, DEFAULT_FILL, DEFAULT_VALUE_SIZE};
use crate::error::{HarnessError, Result};

/// Default number of ids loaded before the workload starts
pub const DEFAULT_POPULATION: u64 = 1000 * 1000;

/// Default throughput reporting interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// Store Configuration
// =============================================================================

/// Whether the bundled store keeps a write-ahead log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// Every mutation is appended to `{data_dir}/wal.log` and replayed on open
    #[default]
    Wal,

    /// Nothing touches disk; contents live only as long as the handle
    NoWal,
}

/// Configuration for opening the bundled store
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub durability: Durability,
}

// =============================================================================
// Workload Configuration
// =============================================================================

/// How readers look keys up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Point lookup; a miss is tolerated and values are not checked
    Point,

    /// Point lookup; the value must match the sampled id exactly
    VerifiedPoint,

    /// Iterator positioned with `seek_ge`; the first entry is inspected
    Seek,
}

/// How the writer submits each write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// `Store::set`
    Point,

    /// A single-entry batch committed per write
    Batch,
}

/// Main configuration for a workload run
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    // -------------------------------------------------------------------------
    // Store
    // -------------------------------------------------------------------------
    /// Directory handed to the store on open
    pub data_dir: PathBuf,

    pub durability: Durability,

    // -------------------------------------------------------------------------
    // Key Space
    // -------------------------------------------------------------------------
    /// Number of ids, `[0, population)`
    pub population: u64,

    /// Exact length of every value in bytes
    pub value_size: usize,

    /// Byte used to pad values after the id prefix
    pub fill: u8,

    // -------------------------------------------------------------------------
    // Workers
    // -------------------------------------------------------------------------
    /// Pause after each write; zero means uncapped
    pub write_delay: Duration,

    pub write_mode: WriteMode,

    /// Number of concurrent readers
    pub readers: usize,

    pub read_mode: ReadMode,

    /// Base seed for per-worker RNGs; `None` seeds from the OS
    pub seed: Option<u64>,

    // -------------------------------------------------------------------------
    // Reporting / Lifetime
    // -------------------------------------------------------------------------
    /// Throughput aggregation interval
    pub interval: Duration,

    /// Stop after this long; `None` runs until the process is killed
    pub run_for: Option<Duration>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Preset::Verify.config()
    }
}

impl WorkloadConfig {
    /// Create a new config builder
    pub fn builder() -> WorkloadConfigBuilder {
        WorkloadConfigBuilder::default()
    }

    /// Reject configurations the workload cannot run against
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(HarnessError::Config("population must be at least 1".into()));
        }
        let width = codec::key_width(self.population);
        if self.value_size < width {
            return Err(HarnessError::Config(format!(
                "value size {} cannot hold a {}-digit id",
                self.value_size, width
            )));
        }
        if self.fill.is_ascii_digit() {
            return Err(HarnessError::Config(format!(
                "fill byte {:?} is a digit and would merge with the id prefix",
                self.fill as char
            )));
        }
        if self.readers == 0 {
            return Err(HarnessError::Config("at least one reader is required".into()));
        }
        if self.interval.is_zero() {
            return Err(HarnessError::Config("aggregation interval must be non-zero".into()));
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            durability: self.durability,
        }
    }
}

/// Builder for WorkloadConfig
#[derive(Default)]
pub struct WorkloadConfigBuilder {
    config: WorkloadConfig,
}

impl WorkloadConfigBuilder {
    /// Start from a named preset instead of the default
    pub fn preset(preset: Preset) -> Self {
        Self {
            config: preset.config(),
        }
    }

    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn durability(mut self, durability: Durability) -> Self {
        self.config.durability = durability;
        self
    }

    pub fn population(mut self, population: u64) -> Self {
        self.config.population = population;
        self
    }

    pub fn value_size(mut self, size: usize) -> Self {
        self.config.value_size = size;
        self
    }

    pub fn fill(mut self, fill: u8) -> Self {
        self.config.fill = fill;
        self
    }

    pub fn write_delay(mut self, delay: Duration) -> Self {
        self.config.write_delay = delay;
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.config.write_mode = mode;
        self
    }

    pub fn readers(mut self, count: usize) -> Self {
        self.config.readers = count;
        self
    }

    pub fn read_mode(mut self, mode: ReadMode) -> Self {
        self.config.read_mode = mode;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn run_for(mut self, duration: Duration) -> Self {
        self.config.run_for = Some(duration);
        self
    }

    pub fn build(self) -> WorkloadConfig {
        self.config
    }
}

// =============================================================================
// Presets
// =============================================================================

/// Named workload shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Verified point reads from 5 readers, writer paced at 100ms, no WAL
    Verify,

    /// Seek reads from 1 reader, batch writes paced at 10µs
    Seek,

    /// Unverified point reads from 5 readers, uncapped writer, no WAL
    Throughput,
}

impl Preset {
    pub fn config(self) -> WorkloadConfig {
        let base = WorkloadConfig {
            data_dir: PathBuf::from("./kvload_data"),
            durability: Durability::NoWal,
            population: DEFAULT_POPULATION,
            value_size: DEFAULT_VALUE_SIZE,
            fill: DEFAULT_FILL,
            write_delay: Duration::from_millis(100),
            write_mode: WriteMode::Point,
            readers: 5,
            read_mode: ReadMode::VerifiedPoint,
            seed: None,
            interval: DEFAULT_INTERVAL,
            run_for: None,
        };

        match self {
            Preset::Verify => base,
            Preset::Seek => WorkloadConfig {
                durability: Durability::Wal,
                fill: b'x',
                write_delay: Duration::from_micros(10),
                write_mode: WriteMode::Batch,
                readers: 1,
                read_mode: ReadMode::Seek,
                ..base
            },
            Preset::Throughput => WorkloadConfig {
                write_delay: Duration::ZERO,
                read_mode: ReadMode::Point,
                ..base
            },
        }
    }
}
