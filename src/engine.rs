//! Engine Module
//!
//! The bundled embedded store the harness drives by default.
//!
//! ## Responsibilities
//! - Coordinate the WAL and the MemTable
//! - Implement the `Store` contract: get / set / batch / iterator
//! - Replay the WAL on open when running with `Durability::Wal`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::{Durability, StoreConfig};
use crate::error::{HarnessError, Result};
use crate::memtable::MemTable;
use crate::store::{Store, StoreIterator, WriteBatch, WriteOptions};
use crate::wal::{Operation, WalRecovery, WalWriter};

/// The bundled storage engine
///
/// ## Concurrency Model
///
/// - **Writes** (set / batch commit): serialized by the WAL mutex when a WAL
///   is present, so log order matches apply order. Without a WAL the
///   MemTable's own write lock is the only serialization.
/// - **Reads** (get / iterator steps): MemTable read lock only.
///
/// A committed write is visible to every later `get` of the same key.
///
/// ## Batch Limits
///
/// With `Durability::Wal` a batch commit is logged as one WAL record, whose
/// serialized payload must stay under 4 GiB; larger batches fail with
/// `HarnessError::Serialization` and nothing is applied. While committing,
/// the pending entries, the logged operation and its serialized payload are
/// all held in memory, so peak usage is roughly three times the batch's key
/// and value bytes. A bulk load of 1M ids at 4 KiB values is past the
/// limit; run such loads with `Durability::NoWal` or a smaller value size.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

struct Shared {
    config: StoreConfig,
    data_dir: PathBuf,
    memtable: MemTable,

    /// `None` under `Durability::NoWal`
    wal: Option<Mutex<WalWriter>>,

    closed: AtomicBool,
    open_iterators: AtomicUsize,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine rooted at `path`
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Replay `wal.log` into the MemTable if the WAL is enabled
    /// 3. Reopen the WAL for appends after the last valid record
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let memtable = MemTable::new();
        let wal = match config.durability {
            Durability::NoWal => None,
            Durability::Wal => {
                let wal_path = data_dir.join(Self::WAL_FILENAME);
                let mut last_lsn = 0;

                if wal_path.exists() {
                    let (entries, result) = WalRecovery::recover(&wal_path)?;
                    if result.entries_recovered > 0 || result.was_truncated {
                        info!(
                            recovered = result.entries_recovered,
                            corrupted = result.entries_corrupted,
                            last_lsn = result.last_lsn,
                            "WAL recovery"
                        );
                    }
                    for entry in entries {
                        replay(&memtable, entry.operation);
                    }
                    last_lsn = result.last_lsn;
                }

                Some(Mutex::new(WalWriter::open(&wal_path, last_lsn)?))
            }
        };

        debug!(
            data_dir = %data_dir.display(),
            durability = ?config.durability,
            entries = memtable.entry_count(),
            "engine opened"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                data_dir,
                memtable,
                wal,
                closed: AtomicBool::new(false),
                open_iterators: AtomicUsize::new(0),
            }),
        })
    }

    fn check_open(&self) -> Result<()> {
        self.shared.check_open()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.shared.data_dir
    }

    pub fn durability(&self) -> Durability {
        self.shared.config.durability
    }

    pub fn entry_count(&self) -> usize {
        self.shared.memtable.entry_count()
    }

    pub fn memtable_size(&self) -> usize {
        self.shared.memtable.size()
    }

    /// Iterators handed out and not yet closed or dropped
    pub fn open_iterators(&self) -> usize {
        self.shared.open_iterators.load(Ordering::Acquire)
    }
}

impl Shared {
    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HarnessError::StoreClosed);
        }
        Ok(())
    }

    /// Log (if enabled) then apply a batch as one unit
    fn apply(&self, entries: Vec<(Bytes, Bytes)>, opts: WriteOptions) -> Result<()> {
        self.check_open()?;
        match &self.wal {
            Some(wal) => {
                let mut wal = wal.lock();
                let operation = if entries.len() == 1 {
                    let (key, value) = &entries[0];
                    Operation::Put {
                        key: key.to_vec(),
                        value: value.to_vec(),
                    }
                } else {
                    Operation::Batch {
                        entries: entries.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect(),
                    }
                };
                wal.append(&operation, opts.sync)?;
                self.memtable.put_batch(entries);
            }
            None => {
                self.memtable.put_batch(entries);
            }
        }
        Ok(())
    }
}

fn replay(memtable: &MemTable, operation: Operation) {
    match operation {
        Operation::Put { key, value } => {
            memtable.put(Bytes::from(key), Bytes::from(value));
        }
        Operation::Batch { entries } => {
            memtable.put_batch(
                entries
                    .into_iter()
                    .map(|(k, v)| (Bytes::from(k), Bytes::from(v))),
            );
        }
    }
}

impl Store for Engine {
    type Batch = EngineBatch;
    type Iter = EngineIter;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.check_open()?;
        Ok(self.shared.memtable.get(key))
    }

    fn set(&self, key: &[u8], value: &[u8], opts: WriteOptions) -> Result<()> {
        self.shared.apply(
            vec![(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value))],
            opts,
        )
    }

    fn new_batch(&self) -> EngineBatch {
        EngineBatch {
            shared: Arc::clone(&self.shared),
            entries: Vec::new(),
        }
    }

    fn iter(&self) -> EngineIter {
        self.shared.open_iterators.fetch_add(1, Ordering::AcqRel);
        EngineIter {
            shared: Arc::clone(&self.shared),
            current: None,
            released: false,
        }
    }

    fn flush(&self) -> Result<()> {
        self.check_open()?;
        if let Some(wal) = &self.shared.wal {
            wal.lock().flush()?;
        }
        Ok(())
    }

    /// Syncs the WAL. Every later operation on any clone of this handle,
    /// including closing an iterator opened earlier, fails with
    /// `StoreClosed`. Closing twice is a no-op.
    fn close(&self) -> Result<()> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Some(wal) = &self.shared.wal {
            wal.lock().sync()?;
        }
        Ok(())
    }
}

// =============================================================================
// Batch
// =============================================================================

/// A pending batch against an `Engine`
pub struct EngineBatch {
    shared: Arc<Shared>,
    entries: Vec<(Bytes, Bytes)>,
}

impl WriteBatch for EngineBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.entries
            .push((Bytes::copy_from_slice(key), Bytes::copy_from_slice(value)));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn commit(self, opts: WriteOptions) -> Result<()> {
        if self.entries.is_empty() {
            return self.shared.check_open();
        }
        self.shared.apply(self.entries, opts)
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Forward iterator over an `Engine`
///
/// Each step takes the MemTable read lock briefly and keeps a copy of the
/// entry it lands on, so an open iterator never blocks writers.
pub struct EngineIter {
    shared: Arc<Shared>,
    current: Option<(Bytes, Bytes)>,
    released: bool,
}

impl EngineIter {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.shared.open_iterators.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl StoreIterator for EngineIter {
    fn seek_ge(&mut self, key: &[u8]) {
        self.current = match self.shared.check_open() {
            Ok(()) => self.shared.memtable.seek_ge(key),
            Err(_) => None,
        };
    }

    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn key(&self) -> &[u8] {
        self.current.as_ref().map(|(k, _)| k.as_ref()).unwrap_or_default()
    }

    fn value(&self) -> &[u8] {
        self.current.as_ref().map(|(_, v)| v.as_ref()).unwrap_or_default()
    }

    fn next(&mut self) {
        self.current = match (&self.current, self.shared.check_open()) {
            (Some((key, _)), Ok(())) => self.shared.memtable.next_after(key),
            _ => None,
        };
    }

    fn close(mut self) -> Result<()> {
        self.release();
        self.shared.check_open()
    }
}

impl Drop for EngineIter {
    fn drop(&mut self) {
        self.release();
    }
}
