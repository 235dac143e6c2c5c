//! # kvload
//!
//! A workload and consistency harness for embedded key-value stores:
//! - Deterministic key/value encoding, verifiable from the id alone
//! - Single-batch bulk load of the whole key space
//! - One paced writer and N readers (point, verified point, or seek)
//! - Lock-free throughput counters drained on a fixed interval
//! - Pluggable failure policy: fail fast, or collect and report
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Harness                             │
//! │          (WorkloadConfig, Shutdown, FailurePolicy)          │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │ once                 │ threads              │ tick
//!        ▼                      ▼                      ▼
//!  ┌─────────────┐      ┌──────────────┐       ┌─────────────┐
//!  │ Bulk Loader │      │ Writer       │──────▶│  Counters   │
//!  └──────┬──────┘      │ Readers x N  │ incr  │ (Aggregator)│
//!         │             └──────┬───────┘       └─────────────┘
//!         └──────────┬─────────┘
//!                    ▼
//!           ┌─────────────────┐
//!           │  impl Store     │  Engine = MemTable + optional WAL
//!           └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod codec;

pub mod wal;
pub mod memtable;
pub mod store;
pub mod engine;

pub mod loader;
pub mod stats;
pub mod workload;
pub mod harness;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{decode_id_prefix, encode_key, ValueCodec};
pub use config::{Durability, Preset, ReadMode, StoreConfig, WorkloadConfig, WriteMode};
pub use engine::Engine;
pub use error::{HarnessError, Result, VerificationFailure};
pub use harness::{Harness, RunSummary};
pub use loader::{bulk_load, LoadReport};
pub use stats::{Aggregator, Counters, ThroughputSample};
pub use store::{Store, StoreIterator, WriteBatch, WriteOptions};
pub use workload::{CollectFailures, FailFast, FailurePolicy, Shutdown};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvload
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
