//! WAL Recovery
//!
//! Replays the WAL on open and cuts off anything after the last good record.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

use super::{ReadOutcome, WalEntry, WalReader};

/// Handles WAL recovery after a crash or clean shutdown
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully recovered
    pub entries_recovered: u64,

    /// Number of complete records rejected by checksum or decoding
    pub entries_corrupted: u64,

    /// Last valid LSN (0 when nothing was recovered)
    pub last_lsn: u64,

    /// Byte length of the valid prefix
    pub valid_len: u64,

    /// Whether bytes past the valid prefix were (or would be) removed
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Recover records from a WAL file
    ///
    /// Reads records until the first torn or corrupt one, then truncates the
    /// file to the valid prefix so new appends follow the last good record.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, result) = Self::scan(path)?;

        if result.was_truncated {
            warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                corrupted = result.entries_corrupted,
                "truncating WAL after last valid record"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
        }

        debug!(
            recovered = result.entries_recovered,
            last_lsn = result.last_lsn,
            "WAL recovery complete"
        );
        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_record() {
                ReadOutcome::Entry(entry) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                ReadOutcome::End => break,
                ReadOutcome::TornTail => {
                    result.was_truncated = true;
                    break;
                }
                ReadOutcome::Corrupt(reason) => {
                    debug!(%reason, "corrupt WAL record");
                    result.entries_corrupted += 1;
                    result.was_truncated = true;
                    break;
                }
            }
        }

        result.valid_len = reader.position();
        Ok((entries, result))
    }
}
