//! Writer role

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;

use crate::codec::{encode_key, ValueCodec};
use crate::config::WriteMode;
use crate::error::{HarnessError, Result};
use crate::stats::Counters;
use crate::store::{Store, WriteBatch, WriteOptions};

use super::{drive, FailurePolicy, KeySampler, Role, Shutdown, WorkerExit};

/// Rewrites randomly sampled ids with their canonical value
///
/// Values are a pure function of the id, so rewriting never changes what a
/// verifying reader expects to see.
pub struct Writer<S: Store> {
    store: Arc<S>,
    codec: ValueCodec,
    sampler: KeySampler,
    rng: StdRng,
    mode: WriteMode,
    delay: Duration,
    counters: Arc<Counters>,
}

impl<S: Store> Writer<S> {
    pub fn new(
        store: Arc<S>,
        codec: ValueCodec,
        sampler: KeySampler,
        rng: StdRng,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            store,
            codec,
            sampler,
            rng,
            mode: WriteMode::Point,
            delay: Duration::ZERO,
            counters,
        }
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Pause after every write; zero leaves the writer uncapped
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// One write; returns the id written
    ///
    /// The write counter is bumped only after the store accepts the write.
    pub fn step(&mut self) -> Result<u64> {
        let id = self.sampler.sample(&mut self.rng);
        let key = encode_key(id);
        let value = self.codec.encode(id);

        let written = match self.mode {
            WriteMode::Point => self.store.set(&key, &value, WriteOptions::NO_SYNC),
            WriteMode::Batch => {
                let mut batch = self.store.new_batch();
                batch.set(&key, &value);
                batch.commit(WriteOptions::NO_SYNC)
            }
        };
        written.map_err(|e| HarnessError::write(id, e))?;

        self.counters.record_write();
        Ok(id)
    }

    /// Loop until `shutdown` fires or the policy halts the run
    pub fn run(mut self, shutdown: &Shutdown, policy: &dyn FailurePolicy) -> WorkerExit {
        let delay = self.delay;
        drive(Role::Writer, delay, shutdown, policy, || self.step())
    }
}
