//! WAL Entry definitions
//!
//! Defines the structure of individual WAL records and their encoding.

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing, starts at 1
    pub lsn: u64,

    /// The operation to replay
    pub operation: Operation,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a single key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// A batch; replayed all-or-nothing since it is one record
    Batch { entries: Vec<(Vec<u8>, Vec<u8>)> },
}

impl WalEntry {
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self { lsn, operation }
    }

    /// Encode header and payload into one record
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Self::encode(self.lsn, &self.operation)
    }

    /// Encode a record without taking ownership of the operation
    pub fn encode(lsn: u64, operation: &Operation) -> Result<Vec<u8>> {
        let payload = bincode::serialize(operation)?;
        let header = Self::header(lsn, &payload)?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Frame header for an already-serialized payload
    ///
    /// Payloads of 4 GiB or more cannot be framed and are rejected.
    pub fn header(lsn: u64, payload: &[u8]) -> Result<[u8; HEADER_SIZE]> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            HarnessError::Serialization(format!(
                "WAL record of {} bytes exceeds the 4 GiB record limit",
                payload.len()
            ))
        })?;

        let mut header = [0u8; HEADER_SIZE];
        header[..8].copy_from_slice(&lsn.to_le_bytes());
        header[8..12].copy_from_slice(&crc32fast::hash(payload).to_le_bytes());
        header[12..].copy_from_slice(&len.to_le_bytes());
        Ok(header)
    }

    /// Decode one complete record
    ///
    /// `bytes` must hold exactly one record. Short input and checksum
    /// mismatches are reported as `WalCorruption`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(HarnessError::WalCorruption(format!(
                "record of {} bytes is shorter than the header",
                bytes.len()
            )));
        }
        let (lsn, crc, len) = parse_header(bytes);
        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != len {
            return Err(HarnessError::WalCorruption(format!(
                "lsn {lsn}: payload is {} bytes, header says {len}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != crc {
            return Err(HarnessError::WalCorruption(format!("lsn {lsn}: checksum mismatch")));
        }
        let operation = bincode::deserialize(payload)?;
        Ok(Self { lsn, operation })
    }
}

/// Split a header into (lsn, crc, payload length)
pub(super) fn parse_header(bytes: &[u8]) -> (u64, u32, usize) {
    let mut lsn = [0u8; 8];
    let mut crc = [0u8; 4];
    let mut len = [0u8; 4];
    lsn.copy_from_slice(&bytes[0..8]);
    crc.copy_from_slice(&bytes[8..12]);
    len.copy_from_slice(&bytes[12..16]);
    (
        u64::from_le_bytes(lsn),
        u32::from_le_bytes(crc),
        u32::from_le_bytes(len) as usize,
    )
}
