//! WAL Reader
//!
//! Walks the records of a WAL file in order.

use std::fs;
use std::path::Path;

use crate::error::Result;

use super::entry::{parse_header, HEADER_SIZE};
use super::WalEntry;

/// What the reader found at its current position
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete, checksummed record
    Entry(WalEntry),

    /// Clean end of file
    End,

    /// The file ends part-way through a record (crash mid-append)
    TornTail,

    /// A complete record whose checksum or payload is bad
    Corrupt(String),
}

/// Reads records from the WAL file
///
/// The whole file is read up front; a WAL only ever holds what was written
/// since the store was opened.
pub struct WalReader {
    data: Vec<u8>,
    position: usize,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            data: fs::read(path)?,
            position: 0,
        })
    }

    /// Read the next record
    ///
    /// After anything other than `Entry`, the position stays at the start of
    /// the offending record.
    pub fn next_record(&mut self) -> ReadOutcome {
        let rest = &self.data[self.position..];
        if rest.is_empty() {
            return ReadOutcome::End;
        }
        if rest.len() < HEADER_SIZE {
            return ReadOutcome::TornTail;
        }

        let (_, _, len) = parse_header(rest);
        let Some(record) = rest.get(..HEADER_SIZE + len) else {
            return ReadOutcome::TornTail;
        };

        match WalEntry::deserialize(record) {
            Ok(entry) => {
                self.position += record.len();
                ReadOutcome::Entry(entry)
            }
            Err(e) => ReadOutcome::Corrupt(e.to_string()),
        }
    }

    /// Byte offset just past the last record returned
    pub fn position(&self) -> u64 {
        self.position as u64
    }

    /// Total size of the file as read
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
