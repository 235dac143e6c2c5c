//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

/// In-memory table of live key-value pairs
pub struct MemTable {
    data: RwLock<BTreeMap<Bytes, Bytes>>,

    /// Sum of key and value lengths
    size: AtomicUsize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Put a key-value pair (write lock), returning the new table size
    pub fn put(&self, key: Bytes, value: Bytes) -> usize {
        let mut data = self.data.write();
        self.insert_locked(&mut data, key, value);
        self.size.load(Ordering::Relaxed)
    }

    /// Apply every pair under a single write lock, returning the new size
    pub fn put_batch(&self, entries: impl IntoIterator<Item = (Bytes, Bytes)>) -> usize {
        let mut data = self.data.write();
        for (key, value) in entries {
            self.insert_locked(&mut data, key, value);
        }
        self.size.load(Ordering::Relaxed)
    }

    fn insert_locked(&self, data: &mut BTreeMap<Bytes, Bytes>, key: Bytes, value: Bytes) {
        let added = key.len() + value.len();
        match data.insert(key.clone(), value) {
            Some(old) => {
                let removed = key.len() + old.len();
                if added >= removed {
                    self.size.fetch_add(added - removed, Ordering::Relaxed);
                } else {
                    self.size.fetch_sub(removed - added, Ordering::Relaxed);
                }
            }
            None => {
                self.size.fetch_add(added, Ordering::Relaxed);
            }
        }
    }

    /// First entry with key >= `key`
    pub fn seek_ge(&self, key: &[u8]) -> Option<(Bytes, Bytes)> {
        self.first_in((Bound::Included(key), Bound::Unbounded))
    }

    /// First entry with key > `key`
    pub fn next_after(&self, key: &[u8]) -> Option<(Bytes, Bytes)> {
        self.first_in((Bound::Excluded(key), Bound::Unbounded))
    }

    fn first_in(&self, range: (Bound<&[u8]>, Bound<&[u8]>)) -> Option<(Bytes, Bytes)> {
        self.data
            .read()
            .range::<[u8], _>(range)
            .next()
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
