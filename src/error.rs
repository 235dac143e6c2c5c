//! Error types for kvload
//!
//! Provides a unified error type for the harness and the bundled store.

use thiserror::Error;

/// Result type alias using HarnessError
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Unified error type for kvload operations
#[derive(Debug, Error)]
pub enum HarnessError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store is closed")]
    StoreClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Workload Errors
    // -------------------------------------------------------------------------
    #[error("Bulk load failed: {0}")]
    Load(#[source] Box<HarnessError>),

    #[error("Write of id {id} failed: {source}")]
    Write {
        id: u64,
        #[source]
        source: Box<HarnessError>,
    },

    #[error("Read of id {id} failed: {source}")]
    Read {
        id: u64,
        #[source]
        source: Box<HarnessError>,
    },

    #[error("Releasing read handle for id {id} failed: {source}")]
    Release {
        id: u64,
        #[source]
        source: Box<HarnessError>,
    },

    #[error(transparent)]
    Verification(#[from] VerificationFailure),

    #[error("Worker thread {0} panicked")]
    WorkerPanicked(String),
}

impl HarnessError {
    /// True for failures already logged by the worker that hit them
    pub fn is_worker_failure(&self) -> bool {
        matches!(
            self,
            HarnessError::Write { .. }
                | HarnessError::Read { .. }
                | HarnessError::Release { .. }
                | HarnessError::Verification(_)
                | HarnessError::WorkerPanicked(_)
        )
    }

    pub(crate) fn load(source: HarnessError) -> Self {
        HarnessError::Load(Box::new(source))
    }

    pub(crate) fn write(id: u64, source: HarnessError) -> Self {
        HarnessError::Write { id, source: Box::new(source) }
    }

    pub(crate) fn read(id: u64, source: HarnessError) -> Self {
        HarnessError::Read { id, source: Box::new(source) }
    }

    pub(crate) fn release(id: u64, source: HarnessError) -> Self {
        HarnessError::Release { id, source: Box::new(source) }
    }
}

/// A value observed by a verifying reader that does not match its id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// Every id in the population was loaded, so a miss is a lost row
    #[error("id {id}: key missing after load")]
    Missing { id: u64 },

    #[error(
        "id {id}: value mismatch\nobserved: {}\nexpected: {}",
        String::from_utf8_lossy(.observed),
        String::from_utf8_lossy(.expected)
    )]
    Mismatch {
        id: u64,
        observed: Vec<u8>,
        expected: Vec<u8>,
    },
}

impl VerificationFailure {
    pub fn id(&self) -> u64 {
        match self {
            VerificationFailure::Missing { id } => *id,
            VerificationFailure::Mismatch { id, .. } => *id,
        }
    }
}

impl From<bincode::Error> for HarnessError {
    fn from(err: bincode::Error) -> Self {
        HarnessError::Serialization(err.to_string())
    }
}
