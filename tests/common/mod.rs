//! Shared test stores

#![allow(dead_code)]

use bytes::Bytes;
use kvload::engine::{EngineBatch, EngineIter};
use kvload::{Engine, Result, Store, WriteOptions};

/// Serves values with their last byte overwritten
///
/// Either every key is corrupted, or only one target key.
pub struct CorruptingStore {
    inner: Engine,
    target: Option<Vec<u8>>,
}

impl CorruptingStore {
    pub fn all(inner: Engine) -> Self {
        Self { inner, target: None }
    }

    pub fn only(inner: Engine, key: &[u8]) -> Self {
        Self {
            inner,
            target: Some(key.to_vec()),
        }
    }

    fn corrupts(&self, key: &[u8]) -> bool {
        self.target.as_deref().map_or(true, |target| target == key)
    }
}

impl Store for CorruptingStore {
    type Batch = EngineBatch;
    type Iter = EngineIter;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let found = self.inner.get(key)?;
        if !self.corrupts(key) {
            return Ok(found);
        }
        Ok(found.map(|value| {
            let mut value = value.to_vec();
            if let Some(last) = value.last_mut() {
                *last = b'z';
            }
            Bytes::from(value)
        }))
    }

    fn set(&self, key: &[u8], value: &[u8], opts: WriteOptions) -> Result<()> {
        self.inner.set(key, value, opts)
    }

    fn new_batch(&self) -> EngineBatch {
        self.inner.new_batch()
    }

    fn iter(&self) -> EngineIter {
        self.inner.iter()
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

/// Panics on every point lookup; writes and iteration pass through
pub struct PanickingStore {
    inner: Engine,
}

impl PanickingStore {
    pub fn new(inner: Engine) -> Self {
        Self { inner }
    }
}

impl Store for PanickingStore {
    type Batch = EngineBatch;
    type Iter = EngineIter;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        panic!("lookup of {:?} panicked", String::from_utf8_lossy(key));
    }

    fn set(&self, key: &[u8], value: &[u8], opts: WriteOptions) -> Result<()> {
        self.inner.set(key, value, opts)
    }

    fn new_batch(&self) -> EngineBatch {
        self.inner.new_batch()
    }

    fn iter(&self) -> EngineIter {
        self.inner.iter()
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
