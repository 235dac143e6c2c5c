//! Bulk Loader
//!
//! Populates the whole key space in one batch before any worker starts.

use std::time::{Duration, Instant};

use tracing::info;

use crate::codec::{encode_key, ValueCodec};
use crate::error::{HarnessError, Result};
use crate::store::{Store, WriteBatch, WriteOptions};

/// What a bulk load wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub entries: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Write every id in `[0, population)` as a single atomic batch, then flush
///
/// Never retried: any failure comes back as `HarnessError::Load` and the
/// harness must not start workers against a partial key space.
pub fn bulk_load<S: Store>(store: &S, population: u64, codec: &ValueCodec) -> Result<LoadReport> {
    let start = Instant::now();
    let mut batch = store.new_batch();
    let mut bytes = 0u64;

    for id in 0..population {
        let key = encode_key(id);
        let value = codec.encode(id);
        bytes += (key.len() + value.len()) as u64;
        batch.set(&key, &value);
    }

    batch.commit(WriteOptions::NO_SYNC).map_err(HarnessError::load)?;
    store.flush().map_err(HarnessError::load)?;

    let report = LoadReport {
        entries: population,
        bytes,
        elapsed: start.elapsed(),
    };
    info!(
        entries = report.entries,
        bytes = report.bytes,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "bulk load committed"
    );
    Ok(report)
}
