//! Reader role

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;

use crate::codec::{encode_key, ValueCodec};
use crate::config::ReadMode;
use crate::error::{HarnessError, Result, VerificationFailure};
use crate::stats::Counters;
use crate::store::{Store, StoreIterator};

use super::{drive, FailurePolicy, KeySampler, Role, Shutdown, WorkerExit};

/// Looks up randomly sampled ids as fast as the store allows
pub struct Reader<S: Store> {
    index: usize,
    store: Arc<S>,
    codec: ValueCodec,
    sampler: KeySampler,
    rng: StdRng,
    mode: ReadMode,
    counters: Arc<Counters>,
}

impl<S: Store> Reader<S> {
    pub fn new(
        index: usize,
        store: Arc<S>,
        codec: ValueCodec,
        sampler: KeySampler,
        rng: StdRng,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            index,
            store,
            codec,
            sampler,
            rng,
            mode: ReadMode::Point,
            counters,
        }
    }

    pub fn with_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn role(&self) -> Role {
        Role::Reader(self.index)
    }

    /// One lookup; returns the sampled id
    pub fn step(&mut self) -> Result<u64> {
        let id = self.sampler.sample(&mut self.rng);
        let key = encode_key(id);

        match self.mode {
            ReadMode::Point => {
                let found = self.store.get(&key).map_err(|e| HarnessError::read(id, e))?;
                black_box(found);
            }
            ReadMode::VerifiedPoint => self.verified_get(id, &key)?,
            ReadMode::Seek => self.seek(id, &key)?,
        }

        self.counters.record_read();
        Ok(id)
    }

    /// Check the value against the sampled id
    ///
    /// Relies only on same-key visibility: the writer only ever stores the
    /// canonical value for an id, so any committed state must verify.
    fn verified_get(&self, id: u64, key: &[u8]) -> Result<()> {
        let found = self.store.get(key).map_err(|e| HarnessError::read(id, e))?;
        let Some(observed) = found else {
            return Err(VerificationFailure::Missing { id }.into());
        };
        if !self.codec.verify(id, &observed) {
            return Err(VerificationFailure::Mismatch {
                id,
                observed: observed.to_vec(),
                expected: self.codec.encode(id),
            }
            .into());
        }
        Ok(())
    }

    /// Inspect the first entry at or after `key`
    ///
    /// An exhausted iterator is fine; the landing entry may belong to another
    /// id, so values are not checked.
    fn seek(&self, id: u64, key: &[u8]) -> Result<()> {
        let mut iter = self.store.iter();
        iter.seek_ge(key);
        if iter.valid() {
            black_box((iter.key(), iter.value()));
        }
        iter.close().map_err(|e| HarnessError::release(id, e))
    }

    /// Loop until `shutdown` fires or the policy halts the run
    pub fn run(mut self, shutdown: &Shutdown, policy: &dyn FailurePolicy) -> WorkerExit {
        let role = self.role();
        drive(role, Duration::ZERO, shutdown, policy, || self.step())
    }
}
