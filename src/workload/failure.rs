//! Failure policies
//!
//! Workers never decide for themselves what a failure means for the run;
//! they hand it to the policy and obey its `Disposition`.

use parking_lot::Mutex;
use tracing::{error, warn};

use crate::error::HarnessError;

use super::Role;

/// A failed operation and the worker that hit it
#[derive(Debug)]
pub struct Failure {
    pub role: Role,
    pub error: HarnessError,
}

/// What the worker should do after reporting a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Halt,
}

/// Strategy for handling worker failures
pub trait FailurePolicy: Send + Sync {
    fn report(&self, failure: Failure) -> Disposition;

    /// Take every failure recorded so far, oldest first
    fn drain(&self) -> Vec<Failure>;
}

/// Log the first failure loudly and stop the run
///
/// Later failures from workers still winding down are recorded behind it.
#[derive(Debug, Default)]
pub struct FailFast {
    failures: Mutex<Vec<Failure>>,
}

impl FailFast {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailurePolicy for FailFast {
    fn report(&self, failure: Failure) -> Disposition {
        error!(role = %failure.role, "fatal: {}", failure.error);
        self.failures.lock().push(failure);
        Disposition::Halt
    }

    fn drain(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.lock())
    }
}

/// Record every failure and keep going
#[derive(Debug, Default)]
pub struct CollectFailures {
    failures: Mutex<Vec<Failure>>,
}

impl CollectFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailurePolicy for CollectFailures {
    fn report(&self, failure: Failure) -> Disposition {
        warn!(role = %failure.role, "{}", failure.error);
        self.failures.lock().push(failure);
        Disposition::Continue
    }

    fn drain(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.lock())
    }
}
