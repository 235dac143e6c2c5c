//! WAL Writer
//!
//! Appends records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

use super::{Operation, WalEntry};

/// Writes records to the WAL file
///
/// Records go through a `BufWriter`; they reach the OS on `flush` and the
/// disk on `sync` or a synchronous append.
pub struct WalWriter {
    writer: BufWriter<File>,
    next_lsn: u64,
}

impl WalWriter {
    /// Open or create a WAL file, appending after existing records
    ///
    /// `last_lsn` is the highest LSN already in the file (0 for a new file).
    pub fn open(path: &Path, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            next_lsn: last_lsn + 1,
        })
    }

    /// Append an operation, returning its LSN
    ///
    /// With `sync` the record is on disk before this returns. The payload is
    /// written after its header without being copied into a framed record.
    pub fn append(&mut self, operation: &Operation, sync: bool) -> Result<u64> {
        let lsn = self.next_lsn;
        let payload = bincode::serialize(operation)?;
        self.writer.write_all(&WalEntry::header(lsn, &payload)?)?;
        self.writer.write_all(&payload)?;
        self.next_lsn += 1;

        if sync {
            self.sync()?;
        }
        Ok(lsn)
    }

    /// Push buffered records to the OS
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Force buffered records to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }
}
