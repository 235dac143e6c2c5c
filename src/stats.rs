//! Throughput Aggregator
//!
//! Workers bump a pair of atomic counters; the aggregator swaps them to zero
//! on every tick and reports the rate.
//!
//! ```text
//!  writer ──┐ record_write()
//!  reader ──┤ record_read()      ┌────────────┐  tick  ┌────────────┐
//!  reader ──┴──────────────────▶ │  Counters  │ ◀───── │ Aggregator │──▶ log
//!                                └────────────┘  swap  └────────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, select};
use tracing::info;

use crate::workload::Shutdown;

/// Per-class operation counters shared by every worker
#[derive(Debug, Default)]
pub struct Counters {
    writes: AtomicU64,
    reads: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Current (writes, reads) without clearing
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.writes.load(Ordering::Acquire),
            self.reads.load(Ordering::Acquire),
        )
    }

    /// Read and clear both counters
    ///
    /// Each counter is swapped individually, so an increment racing with the
    /// drain lands either in this drain or the next, never both or neither.
    pub fn drain(&self) -> (u64, u64) {
        (
            self.writes.swap(0, Ordering::AcqRel),
            self.reads.swap(0, Ordering::AcqRel),
        )
    }
}

/// Counts drained at one interval boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub writes: u64,
    pub reads: u64,
    pub interval: Duration,
}

impl ThroughputSample {
    pub fn write_rate(&self) -> f64 {
        per_second(self.writes, self.interval)
    }

    pub fn read_rate(&self) -> f64 {
        per_second(self.reads, self.interval)
    }

    pub fn write_line(&self) -> RateLine {
        RateLine {
            role: "write",
            count: self.writes,
            interval: self.interval,
        }
    }

    pub fn read_line(&self) -> RateLine {
        RateLine {
            role: "read",
            count: self.reads,
            interval: self.interval,
        }
    }
}

fn per_second(count: u64, interval: Duration) -> f64 {
    let secs = interval.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        count as f64 / secs
    }
}

/// One human-readable throughput line, e.g. `write 512 ops/5s (102 ops/s)`
#[derive(Debug, Clone, Copy)]
pub struct RateLine {
    role: &'static str,
    count: u64,
    interval: Duration,
}

impl fmt::Display for RateLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ops/{}s ({:.0} ops/s)",
            self.role,
            self.count,
            self.interval.as_secs_f64(),
            per_second(self.count, self.interval)
        )
    }
}

/// Totals over the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub writes: u64,
    pub reads: u64,
    pub intervals: u64,
}

/// Periodic reporter over a shared `Counters`
pub struct Aggregator {
    counters: Arc<Counters>,
    interval: Duration,
    totals: Totals,
}

impl Aggregator {
    pub fn new(counters: Arc<Counters>, interval: Duration) -> Self {
        Self {
            counters,
            interval,
            totals: Totals::default(),
        }
    }

    /// Drain the counters as one interval's sample
    pub fn drain(&mut self) -> ThroughputSample {
        let (writes, reads) = self.counters.drain();
        self.totals.writes += writes;
        self.totals.reads += reads;
        self.totals.intervals += 1;
        ThroughputSample {
            writes,
            reads,
            interval: self.interval,
        }
    }

    /// Report once per interval until `shutdown` fires
    ///
    /// Whatever was counted after the last full tick is folded into the
    /// returned totals but not reported as a rate.
    pub fn run(mut self, shutdown: &Shutdown) -> Totals {
        let ticker = channel::tick(self.interval);
        let stopped = shutdown.receiver();

        loop {
            select! {
                recv(ticker) -> _ => {
                    let sample = self.drain();
                    info!("{}", sample.write_line());
                    info!("{}", sample.read_line());
                }
                recv(stopped) -> _ => break,
            }
        }

        let (writes, reads) = self.counters.drain();
        self.totals.writes += writes;
        self.totals.reads += reads;
        self.totals
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }
}
