//! Store Handle contract
//!
//! The harness only ever talks to a store through these traits. The bundled
//! [`Engine`](crate::engine::Engine) implements them; any other embedded
//! engine can be driven by implementing them too.
//!
//! ## Value lifetime
//! `get` hands back a [`Bytes`]. Dropping it is the release; there is no
//! separate release call that could fail. Iterators hold store resources and
//! must be given back with [`StoreIterator::close`], which can fail.

use bytes::Bytes;

use crate::error::Result;

/// Options for a single write or batch commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Block until the write is durably persisted
    pub sync: bool,
}

impl WriteOptions {
    pub const NO_SYNC: WriteOptions = WriteOptions { sync: false };
    pub const SYNC: WriteOptions = WriteOptions { sync: true };
}

/// A shared handle to an open key-value store
///
/// All methods take `&self`; the handle is shared across worker threads.
pub trait Store: Send + Sync + 'static {
    type Batch: WriteBatch;
    type Iter: StoreIterator;

    /// Point lookup; `Ok(None)` when the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Point write
    fn set(&self, key: &[u8], value: &[u8], opts: WriteOptions) -> Result<()>;

    /// Start an empty batch
    fn new_batch(&self) -> Self::Batch;

    /// Unpositioned forward iterator
    fn iter(&self) -> Self::Iter;

    /// Push buffered writes down to the store's persistence layer
    fn flush(&self) -> Result<()>;

    /// End the handle's lifecycle; later operations fail
    fn close(&self) -> Result<()>;
}

/// Writes committed as a single atomic unit
pub trait WriteBatch {
    fn set(&mut self, key: &[u8], value: &[u8]);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every write in the batch; all become visible together
    fn commit(self, opts: WriteOptions) -> Result<()>;
}

/// Forward iterator over the store's key order
pub trait StoreIterator {
    /// Position at the first key >= `key`
    fn seek_ge(&mut self, key: &[u8]);

    /// True while positioned at an entry
    fn valid(&self) -> bool;

    /// Current key; only meaningful while `valid()`
    fn key(&self) -> &[u8];

    /// Current value; only meaningful while `valid()`
    fn value(&self) -> &[u8];

    /// Advance to the next key
    fn next(&mut self);

    /// Release the iterator's resources
    fn close(self) -> Result<()>;
}
