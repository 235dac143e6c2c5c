//! Workload Module
//!
//! The concurrent workers that keep the store under pressure.
//!
//! ## Roles
//! - One writer: sample an id, write its value, pause
//! - N readers: sample an id, look it up (point or seek), optionally verify
//!
//! Every worker loops until its `Shutdown` fires. Failures go to a shared
//! `FailurePolicy`, which decides whether the run halts.

mod failure;
mod reader;
mod sampler;
mod shutdown;
mod writer;

use std::fmt;
use std::time::Duration;

pub use failure::{CollectFailures, Disposition, FailFast, Failure, FailurePolicy};
pub use reader::Reader;
pub use sampler::{worker_rng, KeySampler};
pub use shutdown::Shutdown;
pub use writer::Writer;

use crate::error::Result;

/// Which worker an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Writer,
    Reader(usize),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Writer => write!(f, "writer"),
            Role::Reader(index) => write!(f, "reader-{index}"),
        }
    }
}

/// How a worker loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    pub role: Role,

    /// Operations that completed successfully
    pub completed: u64,

    /// True if this worker's failure stopped the run
    pub halted: bool,
}

/// Shared worker loop: run `step` until shutdown, pausing `pause` after each
pub(crate) fn drive<F>(
    role: Role,
    pause: Duration,
    shutdown: &Shutdown,
    policy: &dyn FailurePolicy,
    mut step: F,
) -> WorkerExit
where
    F: FnMut() -> Result<u64>,
{
    let mut exit = WorkerExit {
        role,
        completed: 0,
        halted: false,
    };

    while !shutdown.is_triggered() {
        match step() {
            Ok(_) => exit.completed += 1,
            Err(error) => {
                if policy.report(Failure { role, error }) == Disposition::Halt {
                    exit.halted = true;
                    shutdown.trigger();
                    break;
                }
            }
        }

        if shutdown.pause(pause) {
            break;
        }
    }

    exit
}
